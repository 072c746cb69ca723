//! Ask command implementation.

use crate::cli::preflight::{self, Operation};
use crate::cli::Output;
use crate::config::Settings;
use crate::language::Lang;
use crate::orchestrator::Orchestrator;
use crate::rag::AskOptions;
use anyhow::Result;

/// Run the ask command.
pub async fn run_ask(
    question: &str,
    context_id: &str,
    no_llm: bool,
    lang: Option<Lang>,
    json: bool,
    settings: Settings,
) -> Result<()> {
    if !no_llm {
        if let Err(e) = preflight::check(Operation::Ask, &settings) {
            Output::warning(&format!("{}", e));
        }
    }

    let orchestrator = Orchestrator::new(settings)?;
    let options = AskOptions {
        use_llm: !no_llm,
        lang,
    };

    let spinner = Output::spinner("Searching transcript...");
    let answer = orchestrator.ask(question, context_id, &options).await;
    spinner.finish_and_clear();

    if json {
        println!("{}", serde_json::to_string_pretty(&answer)?);
    } else {
        Output::answer(&answer);
    }

    Ok(())
}
