//! Session state and the vocabulary store.
//!
//! Every transition consumes the current [`SessionState`] and returns the
//! next one; callers never mutate sentences in place.

use crate::model::{IdentityKey, Sentence, VocabularyEntry};
use tracing::debug;

const DEFAULT_ERROR: &str = "Request failed";

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SessionState {
    pub text: String,
    pub loading: bool,
    pub error: String,
    pub sentences: Vec<Sentence>,
}

/// Transitions understood by [`SessionState::apply`].
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    SetText(String),
    Clear,
    TranslateStart,
    TranslateSuccess(Vec<Sentence>),
    TranslateError(String),
    Upsert {
        sentence_index: usize,
        entry: VocabularyEntry,
    },
    Remove {
        sentence_index: usize,
        lemma: String,
        part_of_speech: String,
    },
}

impl SessionState {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Self::default()
        }
    }

    pub fn with_sentences(sentences: Vec<Sentence>) -> Self {
        Self {
            sentences,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn apply(self, action: Action) -> Self {
        match action {
            Action::SetText(text) => self.set_text(text),
            Action::Clear => self.clear(),
            Action::TranslateStart => self.translate_start(),
            Action::TranslateSuccess(sentences) => self.translate_success(sentences),
            Action::TranslateError(message) => self.translate_error(message),
            Action::Upsert {
                sentence_index,
                entry,
            } => self.upsert(sentence_index, entry),
            Action::Remove {
                sentence_index,
                lemma,
                part_of_speech,
            } => self.remove(sentence_index, &lemma, &part_of_speech),
        }
    }

    #[must_use]
    pub fn set_text(self, text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..self
        }
    }

    #[must_use]
    pub fn clear(self) -> Self {
        Self {
            text: String::new(),
            error: String::new(),
            sentences: Vec::new(),
            ..self
        }
    }

    #[must_use]
    pub fn translate_start(self) -> Self {
        Self {
            loading: true,
            error: String::new(),
            sentences: Vec::new(),
            ..self
        }
    }

    #[must_use]
    pub fn translate_success(self, sentences: Vec<Sentence>) -> Self {
        Self {
            loading: false,
            sentences,
            ..self
        }
    }

    #[must_use]
    pub fn translate_error(self, message: impl Into<String>) -> Self {
        let message = message.into();
        let error = if message.trim().is_empty() {
            DEFAULT_ERROR.to_string()
        } else {
            message
        };
        Self {
            loading: false,
            error,
            ..self
        }
    }

    /// Inserts `entry` into sentence `sentence_index`, merging it into an
    /// existing entry with the same identity key. Out-of-range indexes leave
    /// the state unchanged.
    #[must_use]
    pub fn upsert(mut self, sentence_index: usize, entry: VocabularyEntry) -> Self {
        let Some(sentence) = self.sentences.get_mut(sentence_index) else {
            debug!(sentence_index, "upsert ignored, sentence index out of range");
            return self;
        };
        let key = entry.key();
        match sentence.vocabulary.iter_mut().find(|e| e.key() == key) {
            Some(existing) => existing.merge_from(entry),
            None => sentence.vocabulary.push(entry),
        }
        self
    }

    /// Deletes the queried entry matching the identity key. Entries that were
    /// never enriched are not deletable and stay put.
    #[must_use]
    pub fn remove(mut self, sentence_index: usize, lemma: &str, part_of_speech: &str) -> Self {
        let key = IdentityKey::new(lemma, part_of_speech);
        if let Some(sentence) = self.sentences.get_mut(sentence_index) {
            sentence.vocabulary.retain(|entry| !(entry.queried && entry.key() == key));
        }
        self
    }

    pub fn sentence(&self, index: usize) -> Option<&Sentence> {
        self.sentences.get(index)
    }
}
