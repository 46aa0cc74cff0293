//! Cross-component test: vocabulary store + quiz engine over SQLite

use std::collections::HashSet;
use std::sync::Arc;
use tempfile::tempdir;

use vocab_trainer::quiz::{AnswerOutcome, QuizEngine, SessionState};
use vocab_trainer::storage::{KeyValueStore, SqliteStore};
use vocab_trainer::vocab::store::{CATEGORIES_KEY, VOCAB_NAMESPACE};
use vocab_trainer::vocab::{Snapshot, VocabStore};

async fn open(path: &std::path::Path) -> (VocabStore, Arc<SqliteStore>) {
    let store = Arc::new(SqliteStore::open(path).await.unwrap());
    let kv: Arc<dyn KeyValueStore> = store.clone();
    (VocabStore::open(kv).await.unwrap(), store)
}

fn answer_correctly(engine: &mut QuizEngine) -> AnswerOutcome {
    let prompt = engine.current_prompt().unwrap();
    let correct = prompt
        .options
        .iter()
        .position(|o| *o == prompt.answer)
        .unwrap();
    engine.answer(correct).unwrap()
}

#[tokio::test]
async fn full_quiz_cycle_persists_progress_across_restarts() {
    let dir = tempdir().unwrap();
    let db = dir.path().join("vocab.db");

    {
        let (mut vocab, _) = open(&db).await;
        vocab.create_category("Basics").await.unwrap();
        vocab.select_category(1).await.unwrap();
        vocab.add_word(None, "one", "eins").await.unwrap();
        vocab.add_word(None, "two", "zwei").await.unwrap();
        vocab.add_word(None, "three", "drei").await.unwrap();

        let index = vocab.selected_index().unwrap();
        let mut engine = QuizEngine::with_seed(11);
        engine.sync(vocab.category(index).unwrap());

        // Answer the whole cycle, writing progress back per answer
        let mut seen = HashSet::new();
        loop {
            seen.insert(engine.current_prompt().unwrap().word_id);
            match answer_correctly(&mut engine) {
                AnswerOutcome::Correct { word_id, exhausted } => {
                    vocab.mark_answered(index, word_id).await.unwrap();
                    if exhausted {
                        break;
                    }
                }
                AnswerOutcome::Incorrect => unreachable!(),
            }
        }
        assert_eq!(seen.len(), 3);
        assert!(engine.take_exhaustion_notice());
        assert_eq!(vocab.progress_count(index), 3);
    }

    // Progress and selection survive a process restart
    let (vocab, store) = open(&db).await;
    let index = vocab.selected_index().unwrap();
    assert_eq!(vocab.category(index).unwrap().name, "Basics");
    assert_eq!(vocab.progress_count(index), 3);

    // Durable bytes deserialize to exactly the in-memory collection
    let json = store
        .get(VOCAB_NAMESPACE, CATEGORIES_KEY)
        .await
        .unwrap()
        .unwrap();
    let stored: Snapshot = serde_json::from_str(&json).unwrap();
    assert_eq!(stored.categories.as_slice(), vocab.categories());
}

#[tokio::test]
async fn restart_clears_progress_and_runs_a_fresh_cycle() {
    let dir = tempdir().unwrap();
    let (mut vocab, _) = open(&dir.path().join("vocab.db")).await;
    vocab.add_word(None, "one", "eins").await.unwrap();
    vocab.add_word(None, "two", "zwei").await.unwrap();
    let index = vocab.selected_index().unwrap();

    let mut engine = QuizEngine::with_seed(5);
    engine.sync(vocab.category(index).unwrap());
    loop {
        let outcome = answer_correctly(&mut engine);
        if let AnswerOutcome::Correct { word_id, exhausted } = outcome {
            vocab.mark_answered(index, word_id).await.unwrap();
            if exhausted {
                break;
            }
        }
    }
    assert_eq!(vocab.progress_count(index), 2);
    assert!(engine.take_exhaustion_notice());

    // Accepting the restart offer clears the answered set
    vocab.reset_progress(index).await.unwrap();
    engine.restart();
    assert_eq!(vocab.progress_count(index), 0);
    assert_eq!(engine.state(), SessionState::InProgress);

    let mut seen = HashSet::new();
    loop {
        seen.insert(engine.current_prompt().unwrap().word_id);
        if let AnswerOutcome::Correct { exhausted: true, .. } = answer_correctly(&mut engine) {
            break;
        }
    }
    assert_eq!(seen.len(), 2);
}

#[tokio::test]
async fn editing_words_invalidates_the_running_session() {
    let dir = tempdir().unwrap();
    let (mut vocab, _) = open(&dir.path().join("vocab.db")).await;
    vocab.add_word(None, "one", "eins").await.unwrap();
    vocab.add_word(None, "two", "zwei").await.unwrap();
    let index = vocab.selected_index().unwrap();

    let mut engine = QuizEngine::with_seed(2);
    engine.sync(vocab.category(index).unwrap());
    answer_correctly(&mut engine);

    // Adding a word changes the eligible-list identity and clears progress
    vocab.add_word(None, "three", "drei").await.unwrap();
    engine.sync(vocab.category(index).unwrap());
    assert_eq!(vocab.progress_count(index), 0);

    let mut seen = HashSet::new();
    loop {
        seen.insert(engine.current_prompt().unwrap().word_id);
        if let AnswerOutcome::Correct { exhausted: true, .. } = answer_correctly(&mut engine) {
            break;
        }
    }
    assert_eq!(seen.len(), 3, "fresh cycle covers all three words");
}
