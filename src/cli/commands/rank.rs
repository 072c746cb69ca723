//! Rank command implementation.

use crate::cli::preflight::{self, Operation};
use crate::cli::Output;
use crate::config::Settings;
use crate::language::Lang;
use crate::orchestrator::Orchestrator;
use crate::ranking::ScoringStrategy;
use anyhow::Result;

/// Run the rank command.
pub async fn run_rank(
    question: &str,
    context_id: &str,
    strategy: Option<ScoringStrategy>,
    lang: Option<Lang>,
    settings: Settings,
) -> Result<()> {
    preflight::check(Operation::Rank, &settings)?;
    let orchestrator = Orchestrator::new(settings)?;

    let result = match orchestrator.rank(question, context_id, strategy, lang).await {
        Ok(result) => result,
        Err(e) => {
            Output::error(&format!("Failed to rank: {}", e));
            return Err(e.into());
        }
    };

    Output::header(&format!("Ranking ({})", result.strategy));
    Output::kv("Language", result.lang.name());
    Output::kv("Keywords", &result.keywords.join(", "));

    if result.chunks.iter().all(|c| c.score <= 0.0) {
        Output::warning("No chunk matched; showing the leading chunks instead.");
    }
    for (position, scored) in result.chunks.iter().enumerate() {
        Output::ranked_chunk(position + 1, scored.chunk.index, scored.score, &scored.chunk.content);
    }

    Ok(())
}
