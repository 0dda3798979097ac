use crate::gemini::{LanguageModel, ModelError};
use crate::model::{DetailCategory, DetailFields, IdentityKey};
use crate::request::DetailRequest;
use lru::LruCache;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::num::NonZeroUsize;
use std::sync::Arc;
use tracing::{debug, info};

const DEFAULT_CAPACITY: usize = 4096;

/// Body of a `POST /api/vocab/detail` response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DetailResponse {
    pub lemma: String,
    pub pos: String,
    #[serde(flatten)]
    pub fields: DetailFields,
}

/// Detail fields collected so far for one `lemma|pos`, shared across requests.
#[derive(Clone)]
pub struct VocabCache {
    inner: Arc<Mutex<LruCache<String, DetailFields>>>,
}

impl VocabCache {
    pub fn new(capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity.max(1)).unwrap_or(NonZeroUsize::MIN);
        Self {
            inner: Arc::new(Mutex::new(LruCache::new(capacity))),
        }
    }

    pub fn len(&self) -> usize {
        self.inner.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.lock().is_empty()
    }

    pub fn peek(&self, lemma: &str, part_of_speech: &str) -> Option<DetailFields> {
        let key = IdentityKey::new(lemma, part_of_speech).cache_key();
        self.inner.lock().peek(&key).cloned()
    }

    /// Answers a detail request, asking `model` only for requested fields
    /// the cache does not hold yet. Only requested fields are returned.
    pub async fn get_vocab_detail<M>(
        &self,
        request: &DetailRequest,
        model: &M,
    ) -> Result<DetailResponse, ModelError>
    where
        M: LanguageModel + ?Sized,
    {
        let key = request.key().cache_key();
        let mut cached = self.inner.lock().get(&key).cloned().unwrap_or_default();

        let missing = DetailCategory::ALL
            .iter()
            .any(|c| request.options.wants(*c) && cached.get(*c).is_none());
        if missing {
            debug!(%key, "vocab cache miss, asking language model");
            let filled = model
                .fill_vocab_fields(&request.lemma, &request.part_of_speech, request.options)
                .await?;
            for category in DetailCategory::ALL {
                if let Some(value) = filled.get(category) {
                    cached.set(category, Some(value.to_string()));
                }
            }
            self.inner.lock().put(key.clone(), cached.clone());
            info!(%key, "vocab cache updated");
        }

        Ok(DetailResponse {
            lemma: request.lemma.clone(),
            pos: request.part_of_speech.clone(),
            fields: cached.restricted_to(request.options),
        })
    }
}

impl Default for VocabCache {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}
