//! Fixed response templates per language.

use super::Lang;
use serde::{Deserialize, Serialize};

/// Kinds of canned response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TemplateKey {
    /// Nothing usable was found in the context.
    NoAnswer,
    /// An internal failure occurred.
    Error,
    /// The message is only a salutation.
    Greeting,
    /// No answer strategy was allowed to run.
    Fallback,
    /// The requested context does not exist.
    NoContext,
    /// The question is empty or too short to process.
    Insufficient,
}

/// Look up a template. Every (language, key) pair has a value.
pub fn template(lang: Lang, key: TemplateKey) -> &'static str {
    use TemplateKey::*;
    match (lang, key) {
        (Lang::Ar, NoAnswer) => "لم أجد إجابة محددة لسؤالك في النص المتوفر. يرجى طرح سؤال أكثر تحديداً أو إعادة صياغته.",
        (Lang::Ar, Error) => "عذراً، حدث خطأ أثناء معالجة طلبك. يرجى المحاولة مرة أخرى.",
        (Lang::Ar, Greeting) => "وعليكم السلام ورحمة الله وبركاته. كيف يمكنني مساعدتك اليوم؟",
        (Lang::Ar, Fallback) => "عذراً، لا يمكنني الإجابة على هذا السؤال حالياً. يرجى طرح سؤال آخر.",
        (Lang::Ar, NoContext) => "لم يتم العثور على النص المطلوب. يرجى التحقق من المعرّف والمحاولة مرة أخرى.",
        (Lang::Ar, Insufficient) => "السؤال غير كافٍ. يرجى كتابة سؤال أوضح.",

        (Lang::En, NoAnswer) => "I couldn't find a specific answer to your question in the available text. Please ask a more specific question or rephrase it.",
        (Lang::En, Error) => "Sorry, an error occurred while processing your request. Please try again.",
        (Lang::En, Greeting) => "Peace be upon you. How can I assist you today?",
        (Lang::En, Fallback) => "Sorry, I cannot answer this question at the moment. Please ask another question.",
        (Lang::En, NoContext) => "The requested text could not be found. Please check the identifier and try again.",
        (Lang::En, Insufficient) => "Your question is too short. Please ask a more complete question.",

        (Lang::Fr, NoAnswer) => "Je n'ai pas trouvé de réponse précise à votre question dans le texte disponible. Veuillez poser une question plus spécifique ou la reformuler.",
        (Lang::Fr, Error) => "Désolé, une erreur s'est produite lors du traitement de votre demande. Veuillez réessayer.",
        (Lang::Fr, Greeting) => "Que la paix soit sur vous. Comment puis-je vous aider aujourd'hui ?",
        (Lang::Fr, Fallback) => "Désolé, je ne peux pas répondre à cette question pour le moment. Veuillez poser une autre question.",
        (Lang::Fr, NoContext) => "Le texte demandé est introuvable. Veuillez vérifier l'identifiant et réessayer.",
        (Lang::Fr, Insufficient) => "Votre question est trop courte. Veuillez poser une question plus complète.",

        (Lang::Es, NoAnswer) => "No encontré una respuesta específica a tu pregunta en el texto disponible. Por favor, haz una pregunta más específica o reformúlala.",
        (Lang::Es, Error) => "Lo siento, ocurrió un error al procesar tu solicitud. Por favor, inténtalo de nuevo.",
        (Lang::Es, Greeting) => "La paz sea contigo. ¿Cómo puedo ayudarte hoy?",
        (Lang::Es, Fallback) => "Lo siento, no puedo responder a esta pregunta en este momento. Por favor, haz otra pregunta.",
        (Lang::Es, NoContext) => "No se encontró el texto solicitado. Por favor, verifica el identificador e inténtalo de nuevo.",
        (Lang::Es, Insufficient) => "Tu pregunta es demasiado corta. Por favor, haz una pregunta más completa.",

        (Lang::De, NoAnswer) => "Ich konnte keine spezifische Antwort auf Ihre Frage im verfügbaren Text finden. Bitte stellen Sie eine spezifischere Frage oder formulieren Sie sie um.",
        (Lang::De, Error) => "Entschuldigung, bei der Bearbeitung Ihrer Anfrage ist ein Fehler aufgetreten. Bitte versuchen Sie es erneut.",
        (Lang::De, Greeting) => "Friede sei mit dir. Wie kann ich dir heute helfen?",
        (Lang::De, Fallback) => "Es tut mir leid, ich kann diese Frage im Moment nicht beantworten. Bitte stellen Sie eine andere Frage.",
        (Lang::De, NoContext) => "Der angeforderte Text wurde nicht gefunden. Bitte überprüfen Sie die Kennung und versuchen Sie es erneut.",
        (Lang::De, Insufficient) => "Ihre Frage ist zu kurz. Bitte stellen Sie eine vollständigere Frage.",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const KEYS: [TemplateKey; 6] = [
        TemplateKey::NoAnswer,
        TemplateKey::Error,
        TemplateKey::Greeting,
        TemplateKey::Fallback,
        TemplateKey::NoContext,
        TemplateKey::Insufficient,
    ];

    #[test]
    fn test_every_pair_is_populated() {
        for lang in Lang::ALL {
            for key in KEYS {
                assert!(!template(lang, key).trim().is_empty(), "{lang} {key:?}");
            }
        }
    }

    #[test]
    fn test_no_answer_differs_across_languages() {
        assert_ne!(
            template(Lang::Ar, TemplateKey::NoAnswer),
            template(Lang::En, TemplateKey::NoAnswer)
        );
    }
}
