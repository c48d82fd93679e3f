use async_trait::async_trait;
use serde::Deserialize;

use super::error::{SearchError, SearchResult};
use crate::config;

/// External video lookup. Returns the watch URL of the best match, if any.
#[async_trait]
pub trait VideoSearch: Send + Sync {
    async fn search(&self, term: &str) -> SearchResult<Option<String>>;
}

pub fn watch_url(video_id: &str) -> String {
    format!("https://www.youtube.com/watch?v={video_id}")
}

/// YouTube Data API v3 `search.list`.
pub struct YouTubeSearch {
    client: reqwest::Client,
    endpoint: String,
    api_key: String,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    items: Vec<SearchItem>,
}

#[derive(Debug, Deserialize)]
struct SearchItem {
    id: SearchItemId,
}

#[derive(Debug, Deserialize)]
struct SearchItemId {
    #[serde(rename = "videoId")]
    video_id: Option<String>,
}

impl SearchResponse {
    fn first_video_url(self) -> SearchResult<Option<String>> {
        match self.items.into_iter().next() {
            None => Ok(None),
            Some(item) => item
                .id
                .video_id
                .map(|id| Some(watch_url(&id)))
                .ok_or(SearchError::MissingVideoId),
        }
    }
}

impl YouTubeSearch {
    pub fn new(config: &config::Video, api_key: String) -> SearchResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout())
            .build()?;

        Ok(Self {
            client,
            endpoint: config.base_url().to_string(),
            api_key,
        })
    }

    /// Fixed `search.list` filters. The key travels in a header so it never
    /// shows up in a URL.
    fn query(term: &str) -> [(&'static str, &str); 10] {
        [
            ("part", "snippet"),
            ("q", term),
            ("type", "video"),
            ("maxResults", "1"),
            ("videoEmbeddable", "true"),
            ("videoSyndicated", "true"),
            ("relevanceLanguage", "en"),
            ("safeSearch", "strict"),
            ("order", "relevance"),
            ("fields", "items(id/videoId)"),
        ]
    }
}

#[async_trait]
impl VideoSearch for YouTubeSearch {
    #[tracing::instrument(skip(self))]
    async fn search(&self, term: &str) -> SearchResult<Option<String>> {
        let response = self
            .client
            .get(&self.endpoint)
            .header("x-goog-api-key", &self.api_key)
            .query(&Self::query(term))
            .send()
            .await
            .map_err(reqwest::Error::without_url)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(SearchError::UpstreamError {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: SearchResponse = response.json().await.map_err(reqwest::Error::without_url)?;
        parsed.first_video_url()
    }
}
