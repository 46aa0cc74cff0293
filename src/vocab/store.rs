//! The vocabulary store
//!
//! Owns the in-memory snapshot and synchronizes it to the durable store
//! on every mutation. Mutators take `&mut self`, so concurrent mutation
//! is structurally impossible for safe callers; readers get cheap
//! borrows of the current snapshot. Consumers subscribe to a watch
//! channel carrying a revision counter and re-read on change.

use std::sync::Arc;
use tokio::sync::watch;
use tracing::debug;
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::storage::KeyValueStore;

use super::model::{Category, Snapshot, Word, WordPatch};

/// Storage namespace for the vocabulary snapshot
pub const VOCAB_NAMESPACE: &str = "vocab";
/// Key holding the serialized category collection
pub const CATEGORIES_KEY: &str = "categories";

/// Name of the category seeded on first run
const DEFAULT_CATEGORY: &str = "Default";

/// Authoritative category/word store, synchronized to durable storage
pub struct VocabStore {
    store: Arc<dyn KeyValueStore>,
    snapshot: Snapshot,
    revision: watch::Sender<u64>,
}

impl VocabStore {
    /// Load the snapshot from the durable store, seeding one empty
    /// default category (selected) if nothing is stored yet.
    pub async fn open(store: Arc<dyn KeyValueStore>) -> Result<Self> {
        let stored = store
            .get(VOCAB_NAMESPACE, CATEGORIES_KEY)
            .await
            .map_err(|e| Error::storage(e.to_string()))?;

        let mut snapshot = match stored {
            Some(ref json) => serde_json::from_str::<Snapshot>(json)?,
            None => Snapshot::default(),
        };

        let mut dirty = stored.is_none();

        if snapshot.categories.is_empty() {
            snapshot.categories.push(Category::new(DEFAULT_CATEGORY));
            dirty = true;
        }

        // Selection always points at a live category when one exists
        if snapshot.selected_index().is_none() {
            snapshot.selected = Some(snapshot.categories[0].id);
            dirty = true;
        }

        let (revision, _) = watch::channel(0);
        let mut vocab = Self {
            store,
            snapshot,
            revision,
        };

        if dirty {
            let seeded = vocab.snapshot.clone();
            vocab.persist(seeded).await?;
        }

        Ok(vocab)
    }

    // ============ Read access ============

    pub fn categories(&self) -> &[Category] {
        &self.snapshot.categories
    }

    pub fn category(&self, index: usize) -> Option<&Category> {
        self.snapshot.categories.get(index)
    }

    /// Position of the selected category, if any exists
    pub fn selected_index(&self) -> Option<usize> {
        self.snapshot.selected_index()
    }

    pub fn selected_category(&self) -> Option<&Category> {
        self.category(self.selected_index()?)
    }

    /// Count of words answered correctly this cycle in the given category
    pub fn progress_count(&self, index: usize) -> usize {
        self.category(index).map(|c| c.progress.len()).unwrap_or(0)
    }

    /// Subscribe to snapshot changes. The receiver carries a revision
    /// counter bumped after every successful publish; re-read the
    /// snapshot when it changes.
    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.revision.subscribe()
    }

    // ============ Category mutators ============

    /// Append a new empty category
    pub async fn create_category(&mut self, name: &str) -> Result<()> {
        let trimmed = name.trim();
        if trimmed.is_empty() {
            return Err(Error::validation("category name must not be empty"));
        }

        let mut next = self.snapshot.clone();
        next.categories.push(Category::new(trimmed));
        if next.selected.is_none() {
            next.selected = next.categories.first().map(|c| c.id);
        }
        self.persist(next).await
    }

    /// Rename the category at `index`
    pub async fn rename_category(&mut self, index: usize, name: &str) -> Result<()> {
        if index >= self.snapshot.categories.len() {
            return Err(Error::InvalidIndex(index));
        }
        let trimmed = name.trim();
        if trimmed.is_empty() {
            return Err(Error::validation("category name must not be empty"));
        }

        let mut next = self.snapshot.clone();
        next.categories[index].name = trimmed.to_string();
        self.persist(next).await
    }

    /// Delete the category at `index`; out-of-range is a no-op.
    /// Its progress dies with it. If it was selected, selection moves to
    /// the first remaining category.
    pub async fn delete_category(&mut self, index: usize) -> Result<()> {
        if index >= self.snapshot.categories.len() {
            return Ok(());
        }

        let mut next = self.snapshot.clone();
        let removed = next.categories.remove(index);
        if next.selected == Some(removed.id) {
            next.selected = next.categories.first().map(|c| c.id);
        }
        self.persist(next).await
    }

    /// Select the category at `index`
    pub async fn select_category(&mut self, index: usize) -> Result<()> {
        let id = self
            .snapshot
            .categories
            .get(index)
            .map(|c| c.id)
            .ok_or(Error::InvalidIndex(index))?;

        let mut next = self.snapshot.clone();
        next.selected = Some(id);
        self.persist(next).await
    }

    // ============ Word mutators ============

    /// Add a word to the category at `category` (or the selected one when
    /// `None`). Both fields are trimmed; the category's progress set is
    /// cleared since the cycle's word list changed.
    pub async fn add_word(
        &mut self,
        category: Option<usize>,
        english: &str,
        german: &str,
    ) -> Result<Uuid> {
        let index = category
            .or_else(|| self.selected_index())
            .filter(|&i| i < self.snapshot.categories.len())
            .ok_or(Error::NoCategorySelected)?;

        let word = Word::new(english.trim(), german.trim());
        let id = word.id;

        let mut next = self.snapshot.clone();
        let cat = &mut next.categories[index];
        cat.words.push(word);
        cat.progress.clear();
        self.persist(next).await?;
        Ok(id)
    }

    /// Merge `patch` into the word at the given position; a missing
    /// category or word is a no-op.
    pub async fn update_word(
        &mut self,
        category_index: usize,
        word_index: usize,
        patch: WordPatch,
    ) -> Result<()> {
        let mut next = self.snapshot.clone();
        let Some(cat) = next.categories.get_mut(category_index) else {
            return Ok(());
        };
        let Some(word) = cat.words.get_mut(word_index) else {
            return Ok(());
        };

        patch.apply(word);
        self.persist(next).await
    }

    /// Remove the word at the given position; a missing category or word
    /// is a no-op. Only the removed word's id leaves the progress set —
    /// the remaining entries stay valid.
    pub async fn delete_word(&mut self, category_index: usize, word_index: usize) -> Result<()> {
        let mut next = self.snapshot.clone();
        let Some(cat) = next.categories.get_mut(category_index) else {
            return Ok(());
        };
        if word_index >= cat.words.len() {
            return Ok(());
        }

        let removed = cat.words.remove(word_index);
        cat.progress.remove(&removed.id);
        self.persist(next).await
    }

    // ============ Progress bookkeeping ============

    /// Record a correct answer; a missing category is a no-op
    pub async fn mark_answered(&mut self, category_index: usize, word_id: Uuid) -> Result<()> {
        let mut next = self.snapshot.clone();
        let Some(cat) = next.categories.get_mut(category_index) else {
            return Ok(());
        };
        cat.progress.insert(word_id);
        self.persist(next).await
    }

    /// Clear a category's progress (cycle restart); a missing category is
    /// a no-op
    pub async fn reset_progress(&mut self, category_index: usize) -> Result<()> {
        let mut next = self.snapshot.clone();
        let Some(cat) = next.categories.get_mut(category_index) else {
            return Ok(());
        };
        cat.progress.clear();
        self.persist(next).await
    }

    // ============ Persistence ============

    /// Persist the full new snapshot, then publish it. On write failure
    /// the in-memory snapshot stays at its last persisted value.
    async fn persist(&mut self, next: Snapshot) -> Result<()> {
        let json = serde_json::to_string(&next)?;
        self.store
            .set(VOCAB_NAMESPACE, CATEGORIES_KEY, &json)
            .await
            .map_err(|e| Error::storage(e.to_string()))?;

        self.snapshot = next;
        self.revision.send_modify(|r| *r += 1);
        debug!(
            categories = self.snapshot.categories.len(),
            "vocabulary snapshot persisted"
        );
        Ok(())
    }
}
