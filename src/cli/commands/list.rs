//! List command implementation.

use crate::cli::Output;
use crate::config::Settings;
use crate::orchestrator::Orchestrator;
use anyhow::Result;
use console::style;

/// Run the list command.
pub async fn run_list(settings: Settings) -> Result<()> {
    let orchestrator = Orchestrator::new(settings)?;

    let contexts = match orchestrator.list().await {
        Ok(contexts) => contexts,
        Err(e) => {
            Output::error(&format!("Failed to list contexts: {}", e));
            return Err(e.into());
        }
    };

    if contexts.is_empty() {
        Output::info("No transcripts yet. Use 'deenbot ingest <file>' to add one.");
        return Ok(());
    }

    Output::header(&format!("Contexts ({})", contexts.len()));
    println!();

    for context in &contexts {
        let indexed = match (context.chunk_count, context.indexed_at) {
            (Some(count), Some(at)) => format!("{} chunks, indexed {}", count, at.format("%Y-%m-%d %H:%M")),
            _ => "not indexed".to_string(),
        };
        let transcript = if context.has_transcript { "" } else { ", transcript missing" };
        Output::list_item(&format!(
            "{} ({}{})",
            style(&context.context_id).bold(),
            style(indexed).dim(),
            transcript
        ));
    }

    let total_chunks: usize = contexts.iter().filter_map(|c| c.chunk_count).sum();
    println!();
    Output::kv("Total contexts", &contexts.len().to_string());
    Output::kv("Total chunks", &total_chunks.to_string());

    Ok(())
}
