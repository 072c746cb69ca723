//! Detect command implementation.

use crate::language::detect;
use anyhow::Result;

/// Run the detect command. Prints the language code.
pub fn run_detect(text: &str) -> Result<()> {
    println!("{}", detect(text).code());
    Ok(())
}
