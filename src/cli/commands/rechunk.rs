//! Rechunk command implementation.

use crate::cli::Output;
use crate::config::Settings;
use crate::orchestrator::Orchestrator;
use anyhow::Result;

/// Run the rechunk command.
pub async fn run_rechunk(context_id: &str, settings: Settings) -> Result<()> {
    let orchestrator = Orchestrator::new(settings)?;

    if context_id != "all" {
        Output::info(&format!("Rechunking: {}", context_id));
        let spinner = Output::spinner("Rechunking...");

        match orchestrator.rechunk(context_id).await {
            Ok(result) => {
                spinner.finish_and_clear();
                Output::success(&format!(
                    "Rechunked '{}' ({} chunks)",
                    result.context_id, result.chunk_count
                ));
            }
            Err(e) => {
                spinner.finish_and_clear();
                Output::error(&format!("Failed to rechunk: {}", e));
                return Err(e.into());
            }
        }
        return Ok(());
    }

    let contexts: Vec<String> = orchestrator
        .list()
        .await?
        .into_iter()
        .filter(|c| c.has_transcript)
        .map(|c| c.context_id)
        .collect();

    if contexts.is_empty() {
        Output::warning("No stored transcripts found.");
        return Ok(());
    }

    let progress = Output::progress_bar(contexts.len() as u64, "Rechunking");
    let mut success_count = 0;
    let mut error_count = 0;

    for id in &contexts {
        progress.set_message(id.clone());
        match orchestrator.rechunk(id).await {
            Ok(_) => success_count += 1,
            Err(e) => {
                progress.println(format!("  Failed {}: {}", id, e));
                error_count += 1;
            }
        }
        progress.inc(1);
    }
    progress.finish_and_clear();

    Output::info(&format!(
        "Rechunking complete: {} succeeded, {} failed",
        success_count, error_count
    ));

    Ok(())
}
