pub mod client;
pub mod model;
pub mod orchestrator;
pub mod placement;
pub mod request;
pub mod selection;
pub mod store;

#[cfg(feature = "web")]
pub mod cache;
#[cfg(feature = "web")]
pub mod gemini;
#[cfg(feature = "web")]
pub mod nlp;
#[cfg(feature = "web")]
pub mod web;

pub use client::{ClientConfig, ClientError, HttpClient, NoteService, TranslateRequest};
pub use model::{
    DetailCategory, DetailFields, DetailFlags, IdentityKey, RequestedOptions, SelectionCandidate,
    Sentence, Token, VocabularyEntry,
};
pub use orchestrator::{LookupError, LookupPhase, LookupSession, PendingLookup};
pub use placement::{MenuGeometry, Point, Rect, Viewport};
pub use request::{DetailRequest, RequestError};
pub use selection::{DocumentTree, ElementTree, NodeId, SelectionError, SelectionSnapshot};
pub use store::{Action, SessionState};
