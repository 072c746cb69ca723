//! Language handling for questions and answers.
//!
//! Detects the language of a question and selects the stopword set,
//! prompt and response templates that go with it.

mod detect;
mod stopwords;
mod templates;

pub use detect::detect;
pub use stopwords::{stopwords, FALLBACK_STOPWORDS};
pub use templates::{template, TemplateKey};

use serde::{Deserialize, Serialize};

/// Salutations matched anywhere inside an Arabic word, so "السلام" and
/// "وعليكم السلام" both count.
const ARABIC_SALUTATIONS: [&str; 6] = ["سلام", "مرحبا", "أهلا", "اهلا", "صباح", "مساء"];

/// Salutations matched as whole lowercase words.
const LATIN_SALUTATIONS: [&str; 14] = [
    "salam", "assalamu", "salaam", "bonjour", "bonsoir", "salut", "hello", "hi", "hey", "hola",
    "buenos", "buenas", "hallo", "guten",
];

/// Longest message still treated as a bare greeting.
const MAX_GREETING_WORDS: usize = 6;

/// Supported language codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Lang {
    Ar,
    Fr,
    #[default]
    En,
    Es,
    De,
}

impl Lang {
    /// All supported languages.
    pub const ALL: [Lang; 5] = [Lang::Ar, Lang::Fr, Lang::En, Lang::Es, Lang::De];

    /// ISO 639-1 code.
    pub fn code(&self) -> &'static str {
        match self {
            Lang::Ar => "ar",
            Lang::Fr => "fr",
            Lang::En => "en",
            Lang::Es => "es",
            Lang::De => "de",
        }
    }

    /// Resolve a language code, defaulting to English for anything unknown.
    pub fn from_code(code: &str) -> Self {
        code.parse().unwrap_or_default()
    }

    /// English name of the language, used in prompts.
    pub fn name(&self) -> &'static str {
        match self {
            Lang::Ar => "Arabic",
            Lang::Fr => "French",
            Lang::En => "English",
            Lang::Es => "Spanish",
            Lang::De => "German",
        }
    }
}

impl std::str::FromStr for Lang {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "ar" | "arabic" => Ok(Lang::Ar),
            "fr" | "french" => Ok(Lang::Fr),
            "en" | "english" | "default" => Ok(Lang::En),
            "es" | "spanish" => Ok(Lang::Es),
            "de" | "german" => Ok(Lang::De),
            _ => Err(format!("Unknown language code: {}", s)),
        }
    }
}

impl std::fmt::Display for Lang {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.code())
    }
}

/// A user question with its detected or declared language.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Question {
    pub text: String,
    pub lang: Lang,
}

impl Question {
    /// Build a question, detecting its language.
    pub fn new(text: impl Into<String>) -> Self {
        let text = text.into();
        let lang = detect(&text);
        Self { text, lang }
    }

    /// Build a question with a declared language.
    pub fn with_lang(text: impl Into<String>, lang: Lang) -> Self {
        Self {
            text: text.into(),
            lang,
        }
    }

    pub fn is_blank(&self) -> bool {
        self.text.trim().is_empty()
    }

    /// A short message that opens with a salutation and asks nothing.
    pub fn is_greeting(&self) -> bool {
        if self.text.contains(['?', '؟']) {
            return false;
        }
        let words: Vec<String> = self
            .text
            .split(|c: char| !c.is_alphanumeric())
            .filter(|w| !w.is_empty())
            .map(str::to_lowercase)
            .collect();
        let Some(first) = words.first() else {
            return false;
        };
        words.len() <= MAX_GREETING_WORDS
            && (ARABIC_SALUTATIONS.iter().any(|s| first.contains(s))
                || LATIN_SALUTATIONS.contains(&first.as_str()))
    }
}
