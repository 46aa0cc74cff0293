//! Machine-translation helper
//!
//! Best-effort per-field translation through a LibreTranslate-compatible
//! endpoint: one POST per missing target language, failed fields stay
//! empty, nothing raised.

use serde::Deserialize;
use serde_json::json;
use std::time::Duration;
use tracing::warn;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

/// The three language renderings of one piece of text
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Translations {
    pub en: String,
    pub bn: String,
    pub de: String,
}

#[derive(Deserialize)]
struct TranslateResponse {
    #[serde(rename = "translatedText")]
    translated_text: String,
}

/// LibreTranslate-backed translator
pub struct Translator {
    client: reqwest::Client,
    endpoint: String,
}

impl Translator {
    pub fn new(endpoint: impl Into<String>) -> Self {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .unwrap_or_default();
        Self {
            client,
            endpoint: endpoint.into(),
        }
    }

    /// Translate `text` from `source_lang` ("en" or "bn") into the other
    /// two languages. The source field is backfilled with the input; a
    /// failed target is left empty.
    pub async fn translate(&self, text: &str, source_lang: &str) -> Translations {
        let targets: &[&str] = match source_lang {
            "en" => &["bn", "de"],
            "bn" => &["en", "de"],
            _ => &["en", "bn", "de"],
        };

        let mut result = Translations::default();
        for target in targets {
            match self.translate_one(text, source_lang, target).await {
                Ok(translated) => *result.field_mut(target) = translated,
                Err(e) => warn!(target, error = %e, "translation failed"),
            }
        }

        match source_lang {
            "en" => result.en = text.to_string(),
            "bn" => result.bn = text.to_string(),
            _ => {}
        }

        result
    }

    async fn translate_one(
        &self,
        text: &str,
        source: &str,
        target: &str,
    ) -> anyhow::Result<String> {
        let body = json!({
            "q": text,
            "source": source,
            "target": target,
            "format": "text",
        });

        let response: TranslateResponse = self
            .client
            .post(&self.endpoint)
            .json(&body)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        Ok(response.translated_text)
    }
}

impl Translations {
    fn field_mut(&mut self, lang: &str) -> &mut String {
        match lang {
            "bn" => &mut self.bn,
            "de" => &mut self.de,
            _ => &mut self.en,
        }
    }
}
