//! Pre-flight checks before running commands.
//!
//! Catches missing inputs and degraded configuration up front instead of
//! letting a command fail or quietly fall back midway.

use crate::config::Settings;
use crate::error::{DeenbotError, Result};
use std::path::Path;

/// Requirements for different operations.
#[derive(Debug, Clone, Copy)]
pub enum Operation<'a> {
    /// Ingesting needs a readable transcript file ('-' means stdin).
    Ingest(&'a Path),
    /// Asking works without an LLM, but only extractively.
    Ask,
    /// Ranking is purely local.
    Rank,
}

/// Run pre-flight checks for the given operation.
///
/// Returns Ok(()) if all checks pass, or an error describing what's missing.
pub fn check(operation: Operation<'_>, settings: &Settings) -> Result<()> {
    match operation {
        Operation::Ingest(path) => check_input_file(path),
        Operation::Ask => check_llm_key(settings),
        Operation::Rank => Ok(()),
    }
}

fn check_input_file(path: &Path) -> Result<()> {
    if path == Path::new("-") || path.is_file() {
        Ok(())
    } else {
        Err(DeenbotError::InvalidInput(format!(
            "Transcript file not found: {}",
            path.display()
        )))
    }
}

/// Check if the LLM API key is configured when the rewrite stage is on.
fn check_llm_key(settings: &Settings) -> Result<()> {
    if !settings.llm.enabled || settings.llm.api_key().is_some() {
        return Ok(());
    }
    Err(DeenbotError::Config(format!(
        "{} not set, answers will be extractive only. Set it with: export {}='...'",
        settings.llm.api_key_env, settings.llm.api_key_env
    )))
}
