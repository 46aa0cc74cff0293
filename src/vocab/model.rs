//! Vocabulary data model
//!
//! Categories and words carry stable UUID identities, so progress and
//! selection survive deletions without any index renumbering. Consumers
//! still address entries by list position; positions are resolved to ids
//! at the store's API boundary.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use uuid::Uuid;

/// A single vocabulary entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Word {
    pub id: Uuid,
    /// The text as originally entered
    #[serde(default)]
    pub original: String,
    /// Language tag of the original text ("en" or "bn")
    #[serde(default = "default_lang")]
    pub lang: String,
    #[serde(default)]
    pub en: String,
    #[serde(default)]
    pub bn: String,
    #[serde(default)]
    pub de: String,
}

fn default_lang() -> String {
    "en".to_string()
}

impl Word {
    /// Create a word from an English/German pair (fields pre-trimmed by the caller)
    pub fn new(english: impl Into<String>, german: impl Into<String>) -> Self {
        let english = english.into();
        Self {
            id: Uuid::new_v4(),
            original: english.clone(),
            lang: default_lang(),
            en: english,
            bn: String::new(),
            de: german.into(),
        }
    }

    /// A word can appear in a quiz only when both quiz-facing fields are filled
    pub fn is_eligible(&self) -> bool {
        !self.en.is_empty() && !self.de.is_empty()
    }
}

/// Partial update for a word; `None` fields are left untouched
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WordPatch {
    pub original: Option<String>,
    pub en: Option<String>,
    pub bn: Option<String>,
    pub de: Option<String>,
}

impl WordPatch {
    /// Merge the present fields into `word`, trimming each
    pub fn apply(&self, word: &mut Word) {
        if let Some(original) = &self.original {
            word.original = original.trim().to_string();
        }
        if let Some(en) = &self.en {
            word.en = en.trim().to_string();
        }
        if let Some(bn) = &self.bn {
            word.bn = bn.trim().to_string();
        }
        if let Some(de) = &self.de {
            word.de = de.trim().to_string();
        }
    }
}

/// A named group of words with its own quiz progress
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Category {
    pub id: Uuid,
    pub name: String,
    #[serde(default)]
    pub words: Vec<Word>,
    /// Word ids answered correctly in the current cycle.
    /// Maintained transactionally alongside word mutations: adding a word
    /// clears the set, deleting a word drops only its own id.
    #[serde(default)]
    pub progress: HashSet<Uuid>,
}

impl Category {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            words: Vec::new(),
            progress: HashSet::new(),
        }
    }

    /// Words with both quiz-facing fields filled, in list order
    pub fn eligible_words(&self) -> Vec<&Word> {
        self.words.iter().filter(|w| w.is_eligible()).collect()
    }
}

/// The full persisted state: category list plus the selection
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    #[serde(default)]
    pub categories: Vec<Category>,
    /// Id of the selected category; resolved to a position on read
    #[serde(default)]
    pub selected: Option<Uuid>,
}

impl Snapshot {
    /// Position of the selected category, if it still exists
    pub fn selected_index(&self) -> Option<usize> {
        let selected = self.selected?;
        self.categories.iter().position(|c| c.id == selected)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_eligibility_requires_both_fields() {
        let mut word = Word::new("house", "Haus");
        assert!(word.is_eligible());

        word.de.clear();
        assert!(!word.is_eligible());

        word.de = "Haus".to_string();
        word.en.clear();
        assert!(!word.is_eligible());
    }

    #[test]
    fn test_patch_merges_only_present_fields() {
        let mut word = Word::new("house", "Haus");
        let patch = WordPatch {
            bn: Some(" বাড়ি ".to_string()),
            ..Default::default()
        };
        patch.apply(&mut word);

        assert_eq!(word.bn, "বাড়ি");
        assert_eq!(word.en, "house");
        assert_eq!(word.de, "Haus");
    }

    #[test]
    fn test_selected_index_tracks_id_not_position() {
        let a = Category::new("A");
        let b = Category::new("B");
        let snapshot = Snapshot {
            selected: Some(b.id),
            categories: vec![a, b],
        };
        assert_eq!(snapshot.selected_index(), Some(1));
    }

    #[test]
    fn test_old_snapshots_without_progress_still_load() {
        let json = r#"{"categories":[{"id":"6f9fd981-86b8-4adf-8938-1ae8aafc5f9a","name":"Default","words":[]}]}"#;
        let snapshot: Snapshot = serde_json::from_str(json).unwrap();
        assert_eq!(snapshot.categories.len(), 1);
        assert!(snapshot.categories[0].progress.is_empty());
        assert!(snapshot.selected.is_none());
    }
}
