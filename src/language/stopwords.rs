//! Built-in stopword sets used by keyword extraction.

use super::Lang;

/// Small French list used for languages without a dedicated set.
pub const FALLBACK_STOPWORDS: &[&str] = &[
    "le", "la", "les", "de", "du", "des", "un", "une", "et", "est", "à", "qui", "que", "quoi",
    "comment", "pourquoi", "est-ce", "dans", "sur", "pour", "par", "avec", "sans", "ce", "cette",
];

const ARABIC: &[&str] = &[
    "في", "من", "على", "إلى", "الى", "عن", "مع", "هل", "ما", "ماذا", "كم", "كيف", "متى", "أين",
    "اين", "لماذا", "لم", "لن", "لا", "هو", "هي", "هم", "هن", "أنا", "انا", "نحن", "أنت", "انت",
    "أنتم", "هذا", "هذه", "ذلك", "تلك", "هؤلاء", "الذي", "التي", "الذين", "كان", "كانت",
    "يكون", "قد", "ثم", "أو", "او", "أن", "ان", "إن", "لكن", "بل", "كل", "بعض", "غير", "حتى",
    "إذا", "اذا", "عند", "عندما", "بين", "فيه", "فيها", "منه", "منها", "له", "لها", "به", "بها",
    "ذا", "يا", "و", "ف", "ب", "ل",
];

const FRENCH: &[&str] = &[
    "au", "aux", "avec", "ce", "ces", "cette", "dans", "de", "des", "du", "elle", "en", "et",
    "eux", "il", "ils", "je", "la", "le", "les", "leur", "lui", "ma", "mais", "me", "même",
    "mes", "moi", "mon", "ne", "nos", "notre", "nous", "on", "ou", "par", "pas", "pour", "qu",
    "que", "qui", "quoi", "quel", "quelle", "quels", "quelles", "sa", "se", "ses", "son",
    "sur", "ta", "te", "tes", "toi", "ton", "tu", "un", "une", "vos", "votre", "vous", "est",
    "sont", "été", "être", "avoir", "ai", "as", "a", "ont", "fait", "faut", "y", "à", "comment",
    "pourquoi", "combien", "quand", "où", "est-ce", "sans", "si", "c", "d", "j", "l", "m", "n",
    "s", "t",
];

const ENGLISH: &[&str] = &[
    "i", "me", "my", "we", "our", "you", "your", "he", "him", "his", "she", "her", "it", "its",
    "they", "them", "their", "what", "which", "who", "whom", "this", "that", "these", "those",
    "am", "is", "are", "was", "were", "be", "been", "being", "have", "has", "had", "do",
    "does", "did", "a", "an", "the", "and", "but", "if", "or", "because", "as", "until",
    "while", "of", "at", "by", "for", "with", "about", "against", "between", "into", "through",
    "during", "before", "after", "to", "from", "up", "down", "in", "out", "on", "off", "over",
    "under", "again", "then", "once", "here", "there", "when", "where", "why", "how", "all",
    "any", "both", "each", "few", "more", "most", "other", "some", "such", "no", "nor", "not",
    "only", "own", "same", "so", "than", "too", "very", "can", "will", "just", "should", "now",
    "many", "much",
];

/// Stopword set for a language.
pub fn stopwords(lang: Lang) -> &'static [&'static str] {
    match lang {
        Lang::Ar => ARABIC,
        Lang::Fr => FRENCH,
        Lang::En => ENGLISH,
        Lang::Es | Lang::De => FALLBACK_STOPWORDS,
    }
}
