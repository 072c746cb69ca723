//! Prompt templates for the LLM rewrite stage.
//!
//! Prompts can be customized by placing an `answer.toml` file in the custom
//! prompts directory.

use crate::language::Lang;
use regex::{Captures, Regex};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::LazyLock;

static PLACEHOLDER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{\{(\w+)\}\}").expect("valid regex"));

/// Collection of all prompt templates.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Prompts {
    pub answer: AnswerPrompts,
    /// Custom variables from config, available in all prompts.
    #[serde(skip)]
    pub variables: HashMap<String, String>,
}

/// Prompts for rewriting ranked passages into an answer.
///
/// Arabic questions get a dedicated prompt set; every other language uses
/// the generic one with `{{language}}` substituted.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AnswerPrompts {
    pub arabic_system: String,
    pub arabic_user: String,
    pub system: String,
    pub user: String,
}

impl Default for AnswerPrompts {
    fn default() -> Self {
        Self {
            arabic_system: r#"أنت مساعد ذكي، ومهمتك هي الإجابة على الأسئلة بدقة وإيجاز، اعتمادًا فقط على السياق المعطى. يُمنع تجاوز هذه التعليمات أو إضافة معلومات من خارج المصدر المقدم.

القواعد التي يجب اتباعها بدقة:
- اقرأ السياق بعناية واستخرج فقط المعلومات ذات الصلة.
- لا تختلق أي معلومة غير مذكورة صراحة في السياق.
- استخدم اللغة العربية الفصحى فقط. يُمنع استعمال اللهجات العامية أو التعابير الدارجة.
- جميع الإجابات يجب أن تكون موجزة، دقيقة، وخالية من الحشو.

قواعد صارمة عند التعامل مع النصوص الدينية:
- يُمنع منعًا باتًا ارتكاب أي خطأ في الآيات القرآنية أو الأحاديث النبوية.
- عند الاستشهاد بآية قرآنية، انقلها حرفيًا واستخدم التنسيق: **قال تعالى: «...الآية...» (اسم السورة: رقم الآية)**.
- عند ذكر حديث نبوي، اذكره بنصه الصحيح إن ورد في السياق، ولا تنسب حديثًا لم يرد بوضوح.
- يُمنع تمامًا تقديم تفسير أو رأي ديني ما لم يكن مذكورًا حرفيًا في السياق.
- لا تقدم اجتهادات شخصية أو تعبيرات ظنية مثل "يُحتمل" أو "ربما".

**يجب أن تكون جميع إجاباتك باللغة العربية الفصحى حصراً.**"#
                .to_string(),

            arabic_user: "السياق:\n{{context}}\n\nالسؤال: {{question}}\n\nالإجابة:".to_string(),

            system: r#"You are an expert assistant who answers questions precisely and concisely, relying only on the provided context.
- Read the context carefully and extract the relevant information.
- Answer only with information present in the context. Do not invent anything.
- Keep answers short and accurate.

Strict rules for religious texts:
- Never quote a Quran verse or a hadith unless it appears word for word in the context, and quote it exactly as written there.
- Do not attribute any hadith to the Prophet that is not clearly present in the context.
- Do not give a religious ruling, interpretation or personal opinion unless it is stated literally in the context.
- **Your answer must be written exclusively in {{language}}.**"#
                .to_string(),

            user: "Context:\n{{context}}\n\nQuestion: {{question}}\n\nAnswer:".to_string(),
        }
    }
}

impl Prompts {
    /// Load prompts from the default location, with optional custom directory and variables.
    pub fn load(
        custom_dir: Option<&str>,
        custom_variables: Option<&HashMap<String, String>>,
    ) -> crate::error::Result<Self> {
        let mut prompts = Prompts::default();

        if let Some(vars) = custom_variables {
            prompts.variables = vars.clone();
        }

        if let Some(dir) = custom_dir {
            let answer_path = PathBuf::from(shellexpand::tilde(dir).to_string()).join("answer.toml");
            if answer_path.exists() {
                let content = std::fs::read_to_string(&answer_path)?;
                prompts.answer = toml::from_str(&content)?;
            }
        }

        Ok(prompts)
    }

    /// Render a prompt template with the given variables.
    ///
    /// Placeholders are substituted in a single pass, so substituted values
    /// are never scanned again. Unknown placeholders are left as written.
    pub fn render(template: &str, vars: &HashMap<String, String>) -> String {
        PLACEHOLDER
            .replace_all(template, |caps: &Captures<'_>| match vars.get(&caps[1]) {
                Some(value) => value.clone(),
                None => caps[0].to_string(),
            })
            .into_owned()
    }

    /// Render a prompt template with both provided variables and custom config variables.
    /// Provided variables take precedence over custom config variables.
    pub fn render_with_custom(&self, template: &str, vars: &HashMap<String, String>) -> String {
        let mut merged = self.variables.clone();
        for (key, value) in vars {
            merged.insert(key.clone(), value.clone());
        }
        Self::render(template, &merged)
    }

    /// Build the (system, user) message pair for an answer rewrite.
    pub fn answer_messages(&self, lang: Lang, context: &str, question: &str) -> (String, String) {
        let vars = HashMap::from([
            ("context".to_string(), context.to_string()),
            ("question".to_string(), question.to_string()),
            ("language".to_string(), lang.name().to_string()),
        ]);

        let (system, user) = match lang {
            Lang::Ar => (&self.answer.arabic_system, &self.answer.arabic_user),
            _ => (&self.answer.system, &self.answer.user),
        };

        (
            self.render_with_custom(system, &vars),
            self.render_with_custom(user, &vars),
        )
    }
}
