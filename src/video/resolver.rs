use std::sync::Arc;
use std::time::Duration;

use super::cache::CacheLayer;
use super::youtube::VideoSearch;

pub const PLACEHOLDER_PREFIX: &str = "search:";
pub const CACHE_PREFIX: &str = "youtube:";

/// Why a placeholder was left as is.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UnresolvedReason {
    NoApiKey,
    NoResults,
    SearchFailed(String),
}

/// Outcome of resolving one subtopic's video reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VideoResolution {
    /// The reference was not a placeholder.
    Passthrough(String),
    Resolved { url: String, cached: bool },
    Unresolved {
        placeholder: String,
        reason: UnresolvedReason,
    },
}

impl VideoResolution {
    /// The string to store on the subtopic.
    pub fn into_reference(self) -> String {
        match self {
            Self::Passthrough(reference) => reference,
            Self::Resolved { url, .. } => url,
            Self::Unresolved { placeholder, .. } => placeholder,
        }
    }

    pub fn is_resolved(&self) -> bool {
        matches!(self, Self::Resolved { .. })
    }
}

/// Search term of a `search:<term>` placeholder, trimmed.
pub fn parse_placeholder(reference: &str) -> Option<&str> {
    reference.strip_prefix(PLACEHOLDER_PREFIX).map(str::trim)
}

pub fn cache_key(term: &str) -> String {
    format!("{CACHE_PREFIX}{}", term.trim().to_lowercase())
}

#[derive(Clone)]
pub struct VideoResolver {
    search: Option<Arc<dyn VideoSearch>>,
    cache: CacheLayer,
    ttl: Duration,
}

impl std::fmt::Debug for VideoResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VideoResolver")
            .field("search", &self.search.is_some())
            .field("cache", &self.cache)
            .field("ttl", &self.ttl)
            .finish()
    }
}

impl VideoResolver {
    /// `search` is `None` when no API key is configured.
    pub fn new(search: Option<Arc<dyn VideoSearch>>, cache: CacheLayer, ttl: Duration) -> Self {
        Self { search, cache, ttl }
    }

    /// Resolves `search:<term>` references to a concrete URL. Never fails:
    /// every error path yields [`VideoResolution::Unresolved`] carrying the
    /// original reference.
    #[tracing::instrument(skip(self))]
    pub async fn resolve(&self, reference: &str) -> VideoResolution {
        let Some(term) = parse_placeholder(reference) else {
            return VideoResolution::Passthrough(reference.to_string());
        };

        let unresolved = |reason| VideoResolution::Unresolved {
            placeholder: reference.to_string(),
            reason,
        };

        let Some(search) = self.search.as_ref() else {
            tracing::warn!("video search key not set, keeping search term.");
            return unresolved(UnresolvedReason::NoApiKey);
        };

        if term.is_empty() {
            tracing::warn!("empty search term, nothing to look up.");
            return unresolved(UnresolvedReason::NoResults);
        }

        let key = cache_key(term);
        if let Some(url) = self.cache.get(&key).await {
            tracing::info!("cache hit: {term}");
            return VideoResolution::Resolved { url, cached: true };
        }
        if self.cache.is_enabled() {
            tracing::info!("cache miss: {term}");
        }

        match search.search(term).await {
            Ok(Some(url)) => {
                self.cache.set(&key, &url, self.ttl).await;
                VideoResolution::Resolved { url, cached: false }
            }
            Ok(None) => {
                tracing::warn!("no videos found for: {term}");
                unresolved(UnresolvedReason::NoResults)
            }
            Err(e) => {
                tracing::error!("video search error: {e}");
                unresolved(UnresolvedReason::SearchFailed(e.to_string()))
            }
        }
    }
}
