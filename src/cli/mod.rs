//! CLI module for DeenBot.

pub mod commands;
mod output;
pub mod preflight;

pub use output::Output;

use crate::language::Lang;
use crate::ranking::ScoringStrategy;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// DeenBot - Questions and answers over lecture transcripts
///
/// Ingest transcribed lectures, then ask questions about them in Arabic,
/// French, English, Spanish or German.
#[derive(Parser, Debug)]
#[command(name = "deenbot")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Increase verbosity (-v for info, -vv for debug, -vvv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Path to configuration file
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Store a transcript and index it for questions
    Ingest {
        /// Transcript text file, or '-' to read stdin
        file: PathBuf,

        /// Context id to store under (generated when omitted)
        #[arg(long)]
        context_id: Option<String>,
    },

    /// Ask a question about an ingested transcript
    Ask {
        /// The question to ask
        question: String,

        /// Context id of the transcript
        #[arg(long = "context")]
        context_id: String,

        /// Skip the LLM rewrite and answer from the transcript only
        #[arg(long)]
        no_llm: bool,

        /// Answer language (ar, fr, en, es, de); detected when omitted
        #[arg(long)]
        lang: Option<Lang>,

        /// Print the answer as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show how transcript chunks rank against a question
    Rank {
        /// The question to rank against
        question: String,

        /// Context id of the transcript
        #[arg(long = "context")]
        context_id: String,

        /// Scoring strategy (keyword, proximity); configured default when omitted
        #[arg(short, long)]
        strategy: Option<ScoringStrategy>,

        /// Question language; detected when omitted
        #[arg(long)]
        lang: Option<Lang>,
    },

    /// Detect the language of a piece of text
    Detect {
        /// Text to classify
        text: String,
    },

    /// List stored transcripts and indexed contexts
    List,

    /// Re-chunk and re-index a stored transcript
    Rechunk {
        /// Context id to rechunk (use 'all' to rechunk everything)
        context_id: String,
    },

    /// Start HTTP API server
    Serve {
        /// Host to bind to
        #[arg(long, default_value = "127.0.0.1")]
        host: String,

        /// Port to bind to
        #[arg(short, long, default_value = "3000")]
        port: u16,
    },

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Show current configuration
    Show,

    /// Show configuration file path
    Path,

    /// Write the default configuration to the config file
    Init {
        /// Overwrite an existing file
        #[arg(short, long)]
        force: bool,
    },
}
