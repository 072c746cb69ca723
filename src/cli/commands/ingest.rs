//! Ingest command implementation.

use crate::cli::preflight::{self, Operation};
use crate::cli::Output;
use crate::config::Settings;
use crate::orchestrator::Orchestrator;
use crate::transcript::decode_text;
use anyhow::{Context, Result};
use std::path::Path;
use tokio::io::AsyncReadExt;

/// Run the ingest command.
pub async fn run_ingest(file: &Path, context_id: Option<&str>, settings: Settings) -> Result<()> {
    if let Err(e) = preflight::check(Operation::Ingest(file), &settings) {
        Output::error(&format!("{}", e));
        return Err(e.into());
    }

    let bytes = if file == Path::new("-") {
        let mut buf = Vec::new();
        tokio::io::stdin()
            .read_to_end(&mut buf)
            .await
            .context("Failed to read transcript from stdin")?;
        buf
    } else {
        tokio::fs::read(file)
            .await
            .with_context(|| format!("Failed to read {}", file.display()))?
    };
    let text = decode_text(&bytes);

    let orchestrator = Orchestrator::new(settings)?;
    let spinner = Output::spinner("Chunking and indexing transcript...");

    match orchestrator.ingest(&text, context_id).await {
        Ok(result) => {
            spinner.finish_and_clear();
            Output::success(&format!("Stored transcript as {}", result.context_id));
            Output::kv("Chunks", &result.chunk_count.to_string());
            match result.chunks_indexed {
                Some(count) => Output::kv("Indexed", &count.to_string()),
                None => Output::warning(
                    "Indexing failed; answers will be built from the stored transcript. \
                     Run 'deenbot rechunk' to retry.",
                ),
            }
            // Bare id on stdout for scripting.
            println!("{}", result.context_id);
        }
        Err(e) => {
            spinner.finish_and_clear();
            Output::error(&format!("Failed to ingest transcript: {}", e));
            return Err(e.into());
        }
    }

    Ok(())
}
