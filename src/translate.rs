//! Best-effort translation of titles and snippets.
//!
//! [`Translator::translate`] never fails: without a credential, with empty
//! input, or when the call errors, the input comes back unchanged.

use crate::api::AskAsync;
use tracing::{debug, warn};

pub struct Translator<C> {
    client: Option<C>,
    target_language: String,
}

impl<C> Translator<C>
where
    C: AskAsync,
{
    pub fn new(client: Option<C>, target_language: impl Into<String>) -> Self {
        Self {
            client,
            target_language: target_language.into(),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.client.is_some()
    }

    pub fn target_language(&self) -> &str {
        &self.target_language
    }

    fn system_prompt(&self) -> String {
        format!(
            "You are a professional technical translator. Translate the following text to {}. \
             Keep technical terms accurate (e.g., LLM, Transformer, Agent). \
             Return ONLY the translated text, no explanations.",
            self.target_language
        )
    }

    /// Translate `text`, returning it unchanged when translation is unavailable.
    pub async fn translate(&self, text: &str) -> String {
        if text.trim().is_empty() {
            return text.to_string();
        }
        let Some(client) = &self.client else {
            return text.to_string();
        };

        match client.ask(&self.system_prompt(), text).await {
            Ok(translated) => {
                let translated = translated.trim();
                if translated.is_empty() {
                    debug!("Translation came back empty; keeping original");
                    text.to_string()
                } else {
                    translated.to_string()
                }
            }
            Err(e) => {
                warn!(error = %e, "Translation failed; keeping original text");
                text.to_string()
            }
        }
    }

    /// Translate an optional text; `None` stays `None` without a call.
    pub async fn translate_opt(&self, text: Option<&str>) -> Option<String> {
        match text {
            Some(text) => Some(self.translate(text).await),
            None => None,
        }
    }
}
