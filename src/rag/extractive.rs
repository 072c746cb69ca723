//! Rule-based answer assembly from ranked chunks.

use super::{Answer, AnswerOrigin};
use crate::chunking::{char_len, Chunk};
use crate::language::{Lang, TemplateKey};
use tracing::{debug, warn};

const SENTENCE_TERMINALS: [char; 4] = ['.', '!', '?', '؟'];
const ELLIPSIS: &str = "...";

/// Limit text to `max_len` characters.
///
/// Cuts after the last sentence terminal inside the limit when that terminal
/// lies past one third of the limit; otherwise hard-cuts and appends `...`.
pub fn truncate_at_sentence(text: &str, max_len: usize) -> String {
    if char_len(text) <= max_len {
        return text.to_string();
    }

    let head: Vec<char> = text.chars().take(max_len).collect();
    let last_terminal = head.iter().rposition(|c| SENTENCE_TERMINALS.contains(c));

    match last_terminal {
        Some(pos) if pos > max_len / 3 => head[..=pos].iter().collect(),
        _ => {
            let mut cut: String = head.into_iter().collect();
            cut.push_str(ELLIPSIS);
            cut
        }
    }
}

/// Join up to `max_sources` chunks, truncate, and fall back to the
/// no-answer template when fewer than `min_chars` characters remain.
pub fn extractive_answer(
    chunks: &[Chunk],
    lang: Lang,
    max_len: usize,
    min_chars: usize,
    max_sources: usize,
) -> Answer {
    let sources: Vec<Chunk> = chunks.iter().take(max_sources).cloned().collect();
    let joined = sources
        .iter()
        .map(|c| c.content.as_str())
        .collect::<Vec<_>>()
        .join(" ");
    let text = truncate_at_sentence(&joined, max_len);

    if char_len(text.trim()) < min_chars {
        warn!("Extractive answer too short ({} chars), using template", char_len(text.trim()));
        let mut answer = Answer::from_template(lang, TemplateKey::NoAnswer);
        answer.sources = sources.into_iter().take(1).collect();
        return answer;
    }

    debug!(chars = char_len(&text), sources = sources.len(), "Built extractive answer");
    Answer {
        text,
        sources,
        lang,
        origin: AnswerOrigin::Extractive,
    }
}
