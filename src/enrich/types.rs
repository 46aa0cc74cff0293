//! Enrichment result types and the persisted cache entry

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Canonical placeholder for absent enrichment data
pub const PLACEHOLDER: &str = "–";

/// How many synonyms/antonyms a cached entry keeps
pub const MAX_ITEMS: usize = 3;

/// One synonym or antonym with its three language renderings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LexEntry {
    #[serde(default = "placeholder_string")]
    pub en: String,
    #[serde(default = "placeholder_string")]
    pub de: String,
    #[serde(default = "placeholder_string")]
    pub bn: String,
}

fn placeholder_string() -> String {
    PLACEHOLDER.to_string()
}

impl LexEntry {
    pub fn placeholder() -> Self {
        Self {
            en: placeholder_string(),
            de: placeholder_string(),
            bn: placeholder_string(),
        }
    }
}

/// Enrichment for one word: an example sentence plus up to
/// [`MAX_ITEMS`] synonyms and antonyms
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Enrichment {
    #[serde(default = "placeholder_string")]
    pub example: String,
    #[serde(default)]
    pub synonyms: Vec<LexEntry>,
    #[serde(default)]
    pub antonyms: Vec<LexEntry>,
}

impl Enrichment {
    /// The canonical empty result: one placeholder synonym, one
    /// placeholder antonym, placeholder example
    pub fn placeholder() -> Self {
        Self {
            example: placeholder_string(),
            synonyms: vec![LexEntry::placeholder()],
            antonyms: vec![LexEntry::placeholder()],
        }
    }

    /// Sanitize a model-produced JSON object: truncate the lists to
    /// [`MAX_ITEMS`] and merge every entry against the placeholder so
    /// missing sub-fields never break downstream reads.
    pub fn from_model_value(value: &Value) -> Self {
        Self {
            example: string_field(value, "example"),
            synonyms: pick_entries(value.get("synonyms")),
            antonyms: pick_entries(value.get("antonyms")),
        }
    }
}

fn string_field(value: &Value, field: &str) -> String {
    value
        .get(field)
        .and_then(|v| v.as_str())
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .unwrap_or_else(placeholder_string)
}

fn pick_entries(value: Option<&Value>) -> Vec<LexEntry> {
    let entries: Vec<LexEntry> = value
        .and_then(|v| v.as_array())
        .map(|arr| {
            arr.iter()
                .take(MAX_ITEMS)
                .map(|item| LexEntry {
                    en: string_field(item, "en"),
                    de: string_field(item, "de"),
                    bn: string_field(item, "bn"),
                })
                .collect()
        })
        .unwrap_or_default();

    if entries.is_empty() {
        vec![LexEntry::placeholder()]
    } else {
        entries
    }
}

/// What the durable cache stores per normalized word. `fetched_at` is
/// informational only — entries never expire.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheEntry {
    #[serde(flatten)]
    pub enrichment: Enrichment,
    pub fetched_at: DateTime<Utc>,
}

impl CacheEntry {
    pub fn new(enrichment: Enrichment) -> Self {
        Self {
            enrichment,
            fetched_at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_model_value_is_truncated_and_merged() {
        let value = json!({
            "example": "Das Haus ist groß.",
            "synonyms": [
                {"en": "home", "de": "Heim", "bn": "গৃহ"},
                {"en": "dwelling"},
                {"de": "Gebäude", "bn": "ভবন"},
                {"en": "residence", "de": "Residenz", "bn": "বাসা"},
                {"en": "abode", "de": "Wohnsitz", "bn": "আবাস"}
            ],
            "antonyms": []
        });

        let enrichment = Enrichment::from_model_value(&value);
        assert_eq!(enrichment.example, "Das Haus ist groß.");
        assert_eq!(enrichment.synonyms.len(), MAX_ITEMS);
        // Missing sub-fields fall back to the placeholder
        assert_eq!(enrichment.synonyms[1].en, "dwelling");
        assert_eq!(enrichment.synonyms[1].de, PLACEHOLDER);
        assert_eq!(enrichment.synonyms[2].en, PLACEHOLDER);
        // Empty lists collapse to one placeholder entry
        assert_eq!(enrichment.antonyms, vec![LexEntry::placeholder()]);
    }

    #[test]
    fn test_garbage_value_degrades_to_placeholders() {
        let enrichment = Enrichment::from_model_value(&json!({"synonyms": "not-a-list"}));
        assert_eq!(enrichment, Enrichment::placeholder());
    }

    #[test]
    fn test_cache_entry_roundtrip_tolerates_missing_timestamp_fields() {
        let entry = CacheEntry::new(Enrichment::placeholder());
        let json = serde_json::to_string(&entry).unwrap();
        let loaded: CacheEntry = serde_json::from_str(&json).unwrap();
        assert_eq!(loaded.enrichment, entry.enrichment);
    }
}
