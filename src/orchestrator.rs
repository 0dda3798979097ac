//! Drives a single lookup interaction from selection to store commit.

use crate::client::{ClientError, NoteService, TranslateRequest};
use crate::model::{
    DetailCategory, DetailFields, RequestedOptions, SelectionCandidate, VocabularyEntry,
};
use crate::placement::{MenuGeometry, Point, Viewport};
use crate::request::{self, DetailRequest, RequestError};
use crate::selection::{self, DocumentTree, NodeId, SelectionError, SelectionSnapshot};
use crate::store::SessionState;
use tracing::{info, warn};

pub const PICK_AN_OPTION: &str = "Pick at least one lookup option.";
pub const LOOKUP_FAILED: &str = "Lookup failed, please try again.";

#[derive(Debug, thiserror::Error)]
pub enum LookupError {
    #[error("selection is empty")]
    NoSelection,
    #[error("selection is outside the sentence list")]
    OutsideContainer,
    #[error("no detail category selected")]
    NoOptionsSelected,
    #[error("a lookup is already in flight")]
    Busy,
    #[error("vocabulary lookup failed: {0}")]
    RemoteLookupFailed(#[source] ClientError),
}

impl LookupError {
    /// Message to surface to the learner; `None` for silently ignored errors.
    pub fn notice(&self) -> Option<&'static str> {
        match self {
            LookupError::NoOptionsSelected => Some(PICK_AN_OPTION),
            LookupError::RemoteLookupFailed(_) => Some(LOOKUP_FAILED),
            _ => None,
        }
    }
}

impl From<SelectionError> for LookupError {
    fn from(value: SelectionError) -> Self {
        match value {
            SelectionError::NoSelection => LookupError::NoSelection,
            SelectionError::OutsideContainer => LookupError::OutsideContainer,
        }
    }
}

impl From<RequestError> for LookupError {
    fn from(value: RequestError) -> Self {
        match value {
            RequestError::NoCandidate => LookupError::NoSelection,
            RequestError::NoOptionsSelected => LookupError::NoOptionsSelected,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LookupPhase {
    Idle,
    Selecting,
    OptionsChosen,
    LookingUp,
}

/// A lookup that has been submitted and awaits the remote response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingLookup {
    pub sentence_index: usize,
    pub text: String,
    pub request: DetailRequest,
}

/// Ephemeral interaction state. Vocabulary itself lives in [`SessionState`].
#[derive(Debug, Clone, Default)]
pub struct LookupSession {
    candidate: Option<SelectionCandidate>,
    options: RequestedOptions,
    loading: bool,
    anchor: Option<Point>,
}

impl LookupSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn phase(&self) -> LookupPhase {
        if self.loading {
            LookupPhase::LookingUp
        } else if self.candidate.is_none() {
            LookupPhase::Idle
        } else if self.options.is_empty() {
            LookupPhase::Selecting
        } else {
            LookupPhase::OptionsChosen
        }
    }

    pub fn candidate(&self) -> Option<&SelectionCandidate> {
        self.candidate.as_ref()
    }

    pub fn options(&self) -> &RequestedOptions {
        &self.options
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    /// Where the menu is drawn; `None` while it is closed.
    pub fn menu_anchor(&self) -> Option<Point> {
        self.anchor
    }

    /// Handles a selection event: resolves the owning sentence and opens the
    /// menu next to it. Unactionable selections close the menu.
    pub fn select<T: DocumentTree>(
        &mut self,
        snapshot: &SelectionSnapshot,
        tree: &T,
        container: NodeId,
        viewport: Viewport,
        geometry: &MenuGeometry,
    ) -> Result<Point, SelectionError> {
        match selection::resolve(snapshot, tree, container) {
            Ok(candidate) => {
                let anchor = geometry.place(snapshot.bounds, viewport);
                self.candidate = Some(candidate);
                self.options.clear();
                self.anchor = Some(anchor);
                Ok(anchor)
            }
            Err(err) => {
                self.candidate = None;
                self.options.clear();
                self.anchor = None;
                Err(err)
            }
        }
    }

    /// Sets the candidate directly, bypassing the resolver.
    pub fn set_candidate(&mut self, candidate: SelectionCandidate) {
        self.candidate = Some(candidate);
    }

    pub fn toggle_option(&mut self, category: DetailCategory) {
        self.options.toggle(category);
    }

    /// Menu closed or click outside.
    pub fn dismiss(&mut self) {
        self.candidate = None;
        self.options.clear();
        self.anchor = None;
    }

    /// Validates the interaction and marks it in flight. Rejections leave the
    /// session untouched so the learner can fix the options and retry.
    pub fn begin_lookup(&mut self, state: &SessionState) -> Result<PendingLookup, LookupError> {
        if self.loading {
            return Err(LookupError::Busy);
        }
        let candidate = match &self.candidate {
            Some(candidate) if !candidate.text.trim().is_empty() => candidate,
            _ => return Err(LookupError::NoSelection),
        };
        if self.options.is_empty() {
            return Err(LookupError::NoOptionsSelected);
        }
        let sentence_index = candidate.sentence_index.ok_or(LookupError::NoSelection)?;
        let sentence = state
            .sentence(sentence_index)
            .ok_or(LookupError::OutsideContainer)?;
        let request = request::build(candidate, &sentence.tokens, &self.options)?;
        let pending = PendingLookup {
            sentence_index,
            text: candidate.text.trim().to_string(),
            request,
        };
        self.loading = true;
        Ok(pending)
    }

    /// Completes a submitted lookup. Transient state is reset whatever the
    /// outcome; the store is only written on success.
    pub fn finish_lookup(
        &mut self,
        pending: PendingLookup,
        result: Result<DetailFields, ClientError>,
        state: &mut SessionState,
    ) -> Result<VocabularyEntry, LookupError> {
        self.loading = false;
        self.dismiss();
        match result {
            Ok(detail) => {
                let entry = VocabularyEntry {
                    queried: true,
                    ..VocabularyEntry::new(
                        pending.text,
                        pending.request.lemma,
                        pending.request.part_of_speech,
                    )
                }
                .with_detail(detail);
                info!(
                    sentence = pending.sentence_index,
                    lemma = %entry.lemma,
                    pos = %entry.part_of_speech,
                    "vocabulary lookup stored"
                );
                *state = std::mem::take(state).upsert(pending.sentence_index, entry.clone());
                Ok(entry)
            }
            Err(err) => {
                warn!(error = %err, lemma = %pending.request.lemma, "vocabulary lookup failed");
                Err(LookupError::RemoteLookupFailed(err))
            }
        }
    }

    pub async fn lookup<S>(
        &mut self,
        state: &mut SessionState,
        service: &S,
    ) -> Result<VocabularyEntry, LookupError>
    where
        S: NoteService + ?Sized,
    {
        let pending = self.begin_lookup(state)?;
        let result = service.vocab_detail(&pending.request).await;
        self.finish_lookup(pending, result, state)
    }
}

/// Runs the translation call through the session reducer.
pub async fn translate<S>(state: &mut SessionState, service: &S)
where
    S: NoteService + ?Sized,
{
    *state = std::mem::take(state).translate_start();
    let request = TranslateRequest::new(state.text.clone());
    *state = match service.translate(&request).await {
        Ok(sentences) => {
            info!(count = sentences.len(), "translation received");
            std::mem::take(state).translate_success(sentences)
        }
        Err(err) => {
            warn!(error = %err, "translation failed");
            std::mem::take(state).translate_error(err.to_string())
        }
    };
}
