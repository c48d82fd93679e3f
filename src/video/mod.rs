//! Video reference resolution: placeholder terms to concrete URLs.

mod cache;
pub use cache::{CacheLayer, MemoryVideoCache, PgVideoCache, VideoCache};

mod error;
pub use error::{CacheError, CacheResult, SearchError, SearchResult};

mod resolver;
pub use resolver::{
    CACHE_PREFIX, PLACEHOLDER_PREFIX, UnresolvedReason, VideoResolution, VideoResolver, cache_key,
    parse_placeholder,
};

mod youtube;
pub use youtube::{VideoSearch, YouTubeSearch, watch_url};
