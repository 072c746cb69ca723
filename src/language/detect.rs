//! Rule-based language detection from script and lexical cues.

use super::Lang;
use regex::Regex;
use std::sync::LazyLock;
use tracing::debug;

static NON_WORD: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[^\w\s]").expect("valid regex"));
static WORD: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\w+").expect("valid regex"));

/// Informal French greetings and phrases, matched on whole words.
const FRENCH_PHRASES: &[&str] = &[
    "bonjour", "salut", "bonsoir", "merci", "au revoir", "comment ca va", "comment ça va",
    "ca va", "ça va", "cava", "çava", "enchanté", "s'il vous plait", "s'il te plait", "pardon",
    "oui", "je suis", "je ne", "je veux", "je peux", "pouvez-vous", "pourriez-vous", "j'ai",
    "c'est", "français", "francais",
];

const GERMAN_WORDS: &[&str] = &[
    "wie", "viele", "gibt", "ist", "und", "der", "die", "das", "ein", "eine", "zu", "im", "für",
    "mit", "was", "wer", "wo", "wann", "warum", "bitte", "danke", "hallo", "guten", "morgen",
    "tag", "abend",
];

const FRENCH_WORDS: &[&str] = &[
    "je", "tu", "il", "elle", "nous", "vous", "ils", "elles", "est", "sont", "et", "ou", "mais",
    "donc", "car", "pour", "avec", "sans", "dans", "sur", "sous", "combien", "pourquoi",
    "comment", "quand", "où", "qui", "que", "quoi", "lequel", "mon", "ton", "son", "ce",
    "cette", "ces", "mes", "tes", "ses", "notre", "votre", "leur", "moi", "toi", "lui", "eux",
    "veux", "peux", "doit", "parle", "dit", "fait",
];

const SPANISH_WORDS: &[&str] = &[
    "yo", "tu", "el", "ella", "nosotros", "vosotros", "ellos", "ellas", "es", "son", "y", "o",
    "pero", "para", "con", "sin", "en", "sobre", "bajo", "cuantos", "porque", "como", "cuando",
    "donde", "quien", "que", "cual", "mi", "su", "este", "esta", "estos", "estas", "hola",
    "gracias", "adios", "buenos", "dias", "tardes", "noches",
];

const ENGLISH_WORDS: &[&str] = &[
    "i", "you", "he", "she", "we", "they", "is", "are", "and", "or", "but", "for", "with",
    "without", "in", "on", "under", "how", "why", "what", "when", "where", "who", "which",
    "hello", "hi", "thanks", "thank", "please", "goodbye", "bye", "good", "morning",
    "afternoon", "evening", "night",
];

/// Diacritics that point to French rather than Spanish.
const FRENCH_CHARS: &str = "àâäæçèêëîïôœùûÿ";
/// Characters that point to Spanish rather than French.
const SPANISH_CHARS: &str = "áíóúñ¿¡";

fn is_arabic(c: char) -> bool {
    matches!(c, '\u{0600}'..='\u{06FF}' | '\u{0750}'..='\u{077F}' | '\u{08A0}'..='\u{08FF}')
}

/// Strip punctuation and collapse whitespace, keeping word characters.
fn clean(text: &str) -> String {
    NON_WORD
        .replace_all(text, "")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

fn has_french_phrase(cleaned: &str) -> bool {
    let padded = format!(" {} ", cleaned);
    FRENCH_PHRASES
        .iter()
        .any(|phrase| padded.contains(&format!(" {} ", clean(phrase))))
}

#[derive(Debug, Default)]
struct WordHits {
    german: usize,
    french: usize,
    spanish: usize,
    english: usize,
}

fn count_word_hits(lower: &str) -> WordHits {
    let mut hits = WordHits::default();
    for word in WORD.find_iter(lower).map(|m| m.as_str()) {
        if GERMAN_WORDS.contains(&word) {
            hits.german += 1;
        }
        if FRENCH_WORDS.contains(&word) {
            hits.french += 1;
        }
        if SPANISH_WORDS.contains(&word) {
            hits.spanish += 1;
        }
        if ENGLISH_WORDS.contains(&word) {
            hits.english += 1;
        }
    }
    hits
}

/// Detect the language of a text.
///
/// Priority: informal French phrases, then Arabic script dominance, then
/// diacritics and common-word hits. Always returns a supported language.
pub fn detect(text: &str) -> Lang {
    if text.trim().chars().count() < 2 {
        return Lang::En;
    }

    let lower = text.to_lowercase();
    let cleaned = clean(&lower);

    if has_french_phrase(&cleaned) {
        debug!("Detected French from a common phrase");
        return Lang::Fr;
    }

    let arabic_chars = lower.chars().filter(|c| is_arabic(*c)).count();
    let latin_chars = lower.chars().filter(|c| c.is_ascii_alphabetic()).count();
    let french_chars = lower.chars().filter(|c| FRENCH_CHARS.contains(*c)).count();
    let spanish_chars = lower.chars().filter(|c| SPANISH_CHARS.contains(*c)).count();
    let hits = count_word_hits(&lower);

    debug!(
        arabic_chars,
        latin_chars,
        french_chars,
        spanish_chars,
        ?hits,
        "Language detection signals"
    );

    if arabic_chars > 0 && arabic_chars as f64 > latin_chars as f64 * 0.5 {
        Lang::Ar
    } else if french_chars > 0 || hits.french > 0 {
        Lang::Fr
    } else if hits.german >= 1
        && hits.german >= hits.french
        && hits.german >= hits.spanish
        && hits.german >= hits.english
    {
        Lang::De
    } else if spanish_chars > 0 || hits.spanish >= 1 {
        Lang::Es
    } else {
        Lang::En
    }
}
