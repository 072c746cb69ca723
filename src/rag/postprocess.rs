//! Cleanup of model output and prompt context.

use crate::chunking::char_len;
use crate::language::Lang;
use regex::Regex;
use std::sync::LazyLock;

static REASONING: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<think>.*?(</think>|$)").expect("valid regex"));
/// Latin (basic and extended) and Cyrillic letters.
static NON_ARABIC_LETTERS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[a-zA-Z\x{0100}-\x{024F}\x{0400}-\x{052F}\x{2DE0}-\x{2DFF}\x{A640}-\x{A69F}]")
        .expect("valid regex")
});
/// Anything that is not Arabic, a digit, whitespace or common punctuation.
static NOT_ARABIC_TEXT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[^\x{0600}-\x{06FF}\x{0750}-\x{077F}\x{08A0}-\x{08FF}0-9\s.,،:;()؟!\-«»]")
        .expect("valid regex")
});
static SPACE_RUNS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[ \t]{2,}").expect("valid regex"));

const MIN_ARABIC_RATIO: f64 = 0.7;
const MIN_FILTERED_CHARS: usize = 5;

fn is_arabic(c: char) -> bool {
    matches!(c, '\u{0600}'..='\u{06FF}' | '\u{0750}'..='\u{077F}' | '\u{08A0}'..='\u{08FF}')
}

fn is_mostly_arabic(text: &str) -> bool {
    let significant: Vec<char> = text
        .chars()
        .filter(|c| !c.is_whitespace() && !".,،:;()؟!-".contains(*c))
        .collect();
    if significant.is_empty() {
        return false;
    }
    let arabic = significant.iter().filter(|c| is_arabic(**c)).count();
    arabic as f64 / significant.len() as f64 >= MIN_ARABIC_RATIO
}

/// Remove `<think>` reasoning blocks, including an unterminated trailing one.
pub fn strip_reasoning(text: &str) -> String {
    REASONING.replace_all(text, "").trim().to_string()
}

fn tidy(text: &str) -> String {
    SPACE_RUNS.replace_all(text, " ").trim().to_string()
}

/// Clean a model answer for the target language.
///
/// Arabic answers lose stray Latin and Cyrillic letters; if that is not
/// enough to make the text mostly Arabic, everything outside the Arabic
/// script is removed. Returns `None` when nothing usable is left.
pub fn clean_llm_answer(raw: &str, lang: Lang) -> Option<String> {
    let answer = strip_reasoning(raw);
    if answer.is_empty() {
        return None;
    }
    if lang != Lang::Ar {
        return Some(answer);
    }

    let minimal = tidy(&NON_ARABIC_LETTERS.replace_all(&answer, ""));
    if is_mostly_arabic(&minimal) {
        return Some(minimal);
    }

    let aggressive = tidy(&NOT_ARABIC_TEXT.replace_all(&answer, ""));
    (char_len(&aggressive) >= MIN_FILTERED_CHARS).then_some(aggressive)
}

/// Cap prompt context at `max_chars` characters, marking the cut with `...`.
pub fn truncate_context(context: &str, max_chars: usize) -> String {
    if char_len(context) <= max_chars {
        return context.to_string();
    }
    let mut cut: String = context.chars().take(max_chars).collect();
    cut.push_str("...");
    cut
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_reasoning() {
        assert_eq!(strip_reasoning("<think>plan\nsteps</think>\nAnswer."), "Answer.");
        assert_eq!(strip_reasoning("Answer. <think>never closed"), "Answer.");
        assert_eq!(strip_reasoning("plain"), "plain");
    }

    #[test]
    fn test_arabic_answer_drops_latin_letters() {
        let cleaned = clean_llm_answer("الصلوات خمس (five) في اليوم.", Lang::Ar).unwrap();
        assert_eq!(cleaned, "الصلوات خمس () في اليوم.");
    }

    #[test]
    fn test_non_arabic_answers_pass_through() {
        assert_eq!(
            clean_llm_answer("<think>x</think>There are five prayers.", Lang::En).as_deref(),
            Some("There are five prayers.")
        );
    }

    #[test]
    fn test_unusable_answers() {
        assert!(clean_llm_answer("<think>only reasoning</think>", Lang::En).is_none());
        assert!(clean_llm_answer("entirely english text", Lang::Ar).is_none());
    }

    #[test]
    fn test_truncate_context() {
        assert_eq!(truncate_context("abcdef", 10), "abcdef");
        assert_eq!(truncate_context("abcdef", 3), "abc...");
    }
}
