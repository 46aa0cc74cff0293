//! Quiz session engine
//!
//! Runs one session over the active category's eligible words: a
//! uniformly-shuffled draw-without-replacement pool, a current prompt
//! with four answer options, and an edge-triggered exhaustion notice
//! offering a cycle restart. The engine never returns errors — an empty
//! eligible-word list is a first-class "no data" state, not a failure.
//!
//! Correct answers are reported back to the caller as word ids; the
//! session runner writes them into the vocabulary store's progress set.

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use uuid::Uuid;

use crate::vocab::Category;

/// Every option set has exactly this many entries
pub const OPTION_COUNT: usize = 4;

/// Suffix appended to the correct answer to synthesize decoy options
/// when a category has too few real distractors. Decoys are
/// near-duplicate strings, not semantic distractors.
const DECOY_SUFFIX: &str = " ’";

/// Session lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// No pool built yet (also the terminal state when no word is eligible)
    Uninitialized,
    /// A prompt is live and the pool may hold more
    InProgress,
    /// The pool ran dry; awaiting a restart decision
    Exhausted,
}

/// Minimal per-word data the session needs
#[derive(Debug, Clone)]
struct QuizWord {
    id: Uuid,
    en: String,
    de: String,
}

/// The question currently shown to the user
#[derive(Debug, Clone)]
pub struct Prompt {
    pub word_id: Uuid,
    /// English form, shown as the question
    pub question: String,
    /// German form, the correct answer
    pub answer: String,
    /// Exactly [`OPTION_COUNT`] choices, correct answer included once
    pub options: Vec<String>,
}

/// Result of answering the current prompt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AnswerOutcome {
    /// Right answer; `word_id` should be marked answered in the store
    Correct { word_id: Uuid, exhausted: bool },
    /// Wrong answer; the prompt stays as-is
    Incorrect,
}

/// One quiz session over a category's eligible words
pub struct QuizEngine {
    rng: StdRng,
    state: SessionState,
    /// Identity of the eligible list the session was built against
    identity: Vec<Uuid>,
    /// All eligible words (distractor source)
    eligible: Vec<QuizWord>,
    /// Pending words, drawn from the front
    pool: Vec<QuizWord>,
    current: Option<Prompt>,
    exhaustion_notified: bool,
}

impl QuizEngine {
    pub fn new() -> Self {
        Self::with_rng(StdRng::from_os_rng())
    }

    /// Deterministic engine for tests
    pub fn with_seed(seed: u64) -> Self {
        Self::with_rng(StdRng::seed_from_u64(seed))
    }

    fn with_rng(rng: StdRng) -> Self {
        Self {
            rng,
            state: SessionState::Uninitialized,
            identity: Vec::new(),
            eligible: Vec::new(),
            pool: Vec::new(),
            current: None,
            exhaustion_notified: false,
        }
    }

    /// Align the session with the category's current eligible words.
    ///
    /// If the identity of the eligible list changed (word added/removed,
    /// category switched), the pool and prompt are discarded and a fresh
    /// session starts against the new list. An unchanged list leaves the
    /// session untouched.
    pub fn sync(&mut self, category: &Category) {
        let eligible: Vec<QuizWord> = category
            .eligible_words()
            .into_iter()
            .map(|w| QuizWord {
                id: w.id,
                en: w.en.clone(),
                de: w.de.clone(),
            })
            .collect();
        let identity: Vec<Uuid> = eligible.iter().map(|w| w.id).collect();

        if identity == self.identity && self.state != SessionState::Uninitialized {
            return;
        }

        self.identity = identity;
        self.eligible = eligible;
        self.start_cycle();
    }

    /// Build a fresh shuffled pool and pop the first prompt
    fn start_cycle(&mut self) {
        self.exhaustion_notified = false;
        self.current = None;
        self.pool = self.eligible.clone();
        self.pool.shuffle(&mut self.rng);

        if self.pool.is_empty() {
            self.state = SessionState::Uninitialized;
            return;
        }

        self.state = SessionState::InProgress;
        self.advance();
    }

    /// Pop the pool head into the current prompt, or exhaust
    fn advance(&mut self) {
        if self.pool.is_empty() {
            self.state = SessionState::Exhausted;
            self.current = None;
            self.exhaustion_notified = false;
            return;
        }

        let word = self.pool.remove(0);
        let options = self.build_options(&word);
        self.current = Some(Prompt {
            word_id: word.id,
            question: word.en,
            answer: word.de,
            options,
        });
    }

    /// Assemble the option set for one prompt: the correct answer once,
    /// up to three shuffled distractors from the other eligible words,
    /// decoy-padded to exactly [`OPTION_COUNT`], then re-shuffled so the
    /// correct answer's position carries no bias.
    fn build_options(&mut self, word: &QuizWord) -> Vec<String> {
        let mut others: Vec<String> = self
            .eligible
            .iter()
            .filter(|w| w.id != word.id)
            .map(|w| w.de.clone())
            .collect();
        others.shuffle(&mut self.rng);
        others.truncate(OPTION_COUNT - 1);

        let mut options = vec![word.de.clone()];
        options.extend(others);
        while options.len() < OPTION_COUNT {
            options.push(format!("{}{}", word.de, DECOY_SUFFIX));
        }

        options.shuffle(&mut self.rng);
        options
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn current_prompt(&self) -> Option<&Prompt> {
        self.current.as_ref()
    }

    /// Answer the current prompt by option index. Returns `None` when no
    /// prompt is live. A correct answer advances the session; a wrong
    /// one leaves the prompt in place for another try.
    pub fn answer(&mut self, option_index: usize) -> Option<AnswerOutcome> {
        let prompt = self.current.as_ref()?;
        let chosen = prompt.options.get(option_index)?;

        if *chosen != prompt.answer {
            return Some(AnswerOutcome::Incorrect);
        }

        let word_id = prompt.word_id;
        self.advance();
        Some(AnswerOutcome::Correct {
            word_id,
            exhausted: self.state == SessionState::Exhausted,
        })
    }

    /// Edge-triggered exhaustion notice: returns `true` exactly once per
    /// transition into [`SessionState::Exhausted`].
    pub fn take_exhaustion_notice(&mut self) -> bool {
        if self.state == SessionState::Exhausted && !self.exhaustion_notified {
            self.exhaustion_notified = true;
            return true;
        }
        false
    }

    /// Accept the restart offer: a fresh permutation over the same
    /// eligible list. The caller clears the category's progress set.
    pub fn restart(&mut self) {
        self.start_cycle();
    }
}

impl Default for QuizEngine {
    fn default() -> Self {
        Self::new()
    }
}
