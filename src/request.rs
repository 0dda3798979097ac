use crate::model::{
    DetailFlags, IdentityKey, RequestedOptions, SelectionCandidate, Token, UNKNOWN_POS, normalize,
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum RequestError {
    #[error("no selection to look up")]
    NoCandidate,
    #[error("no detail category selected")]
    NoOptionsSelected,
}

/// Payload for `POST /api/vocab/detail`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DetailRequest {
    pub lemma: String,
    #[serde(rename = "pos")]
    pub part_of_speech: String,
    pub options: DetailFlags,
}

impl DetailRequest {
    pub fn key(&self) -> IdentityKey {
        IdentityKey::new(&self.lemma, &self.part_of_speech)
    }
}

/// Canonical `(lemma, part of speech)` for a selection. Surface text matches
/// are checked across all tokens before any lemma match is considered.
pub fn resolve_identity(text: &str, tokens: &[Token]) -> (String, String) {
    let needle = normalize(text);
    tokens
        .iter()
        .find(|token| normalize(&token.surface_text) == needle)
        .or_else(|| tokens.iter().find(|token| normalize(&token.lemma) == needle))
        .map(|token| (token.lemma.clone(), token.part_of_speech.clone()))
        .unwrap_or_else(|| (needle, UNKNOWN_POS.to_string()))
}

pub fn build(
    candidate: &SelectionCandidate,
    tokens: &[Token],
    options: &RequestedOptions,
) -> Result<DetailRequest, RequestError> {
    if candidate.text.trim().is_empty() || candidate.sentence_index.is_none() {
        return Err(RequestError::NoCandidate);
    }
    if options.is_empty() {
        return Err(RequestError::NoOptionsSelected);
    }
    let (lemma, part_of_speech) = resolve_identity(&candidate.text, tokens);
    Ok(DetailRequest {
        lemma,
        part_of_speech,
        options: options.flags(),
    })
}
