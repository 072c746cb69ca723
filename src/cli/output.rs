//! CLI output formatting utilities.

use crate::rag::{Answer, AnswerOrigin};
use console::style;
use indicatif::{ProgressBar, ProgressStyle};

/// Output helper for CLI formatting.
pub struct Output;

impl Output {
    /// Print an info message.
    pub fn info(msg: &str) {
        println!("{} {}", style(">>").cyan().bold(), msg);
    }

    /// Print a success message.
    pub fn success(msg: &str) {
        println!("{} {}", style(">>").green().bold(), msg);
    }

    /// Print a warning message.
    pub fn warning(msg: &str) {
        eprintln!("{} {}", style(">>").yellow().bold(), msg);
    }

    /// Print an error message.
    pub fn error(msg: &str) {
        eprintln!("{} {}", style(">>").red().bold(), msg);
    }

    /// Print a header.
    pub fn header(msg: &str) {
        println!("\n{}", style(msg).bold().underlined());
    }

    /// Print a key-value pair.
    pub fn kv(key: &str, value: &str) {
        println!("  {}: {}", style(key).dim(), value);
    }

    /// Print a list item.
    pub fn list_item(msg: &str) {
        println!("  {} {}", style("*").cyan(), msg);
    }

    /// Print an answer with its sources.
    pub fn answer(answer: &Answer) {
        println!("\n{}\n", answer.text);

        let origin = match answer.origin {
            AnswerOrigin::Llm => "llm".to_string(),
            AnswerOrigin::Extractive => "extractive".to_string(),
            AnswerOrigin::Template(key) => format!("template ({:?})", key),
        };
        Output::kv("Language", answer.lang.name());
        Output::kv("Origin", &origin);

        if !answer.sources.is_empty() {
            Output::header("Sources");
            for chunk in &answer.sources {
                println!(
                    "  {} {} {}",
                    style("*").cyan(),
                    style(format!("#{}", chunk.index)).dim(),
                    content_preview(&chunk.content, 120)
                );
            }
        }
    }

    /// Print one ranked chunk.
    pub fn ranked_chunk(position: usize, index: usize, score: f64, content: &str) {
        println!(
            "\n{} {} chunk #{} (score: {:.3})",
            style(">>").green(),
            style(position).bold(),
            index,
            score
        );
        println!("   {}", content_preview(content, 200));
    }

    /// Create a progress bar.
    pub fn progress_bar(len: u64, msg: &str) -> ProgressBar {
        let pb = ProgressBar::new(len);
        let style = ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")
            .map(|s| s.progress_chars("#>-"))
            .unwrap_or_else(|_| ProgressStyle::default_bar());
        pb.set_style(style);
        pb.set_message(msg.to_string());
        pb
    }

    /// Create a spinner.
    pub fn spinner(msg: &str) -> ProgressBar {
        let pb = ProgressBar::new_spinner();
        pb.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.green} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        pb.set_message(msg.to_string());
        pb.enable_steady_tick(std::time::Duration::from_millis(100));
        pb
    }
}

/// Truncate content with ellipsis, on character boundaries.
fn content_preview(content: &str, max_chars: usize) -> String {
    let content = content.replace('\n', " ");
    if content.chars().count() <= max_chars {
        content
    } else {
        let head: String = content.chars().take(max_chars).collect();
        format!("{}...", head)
    }
}
