//! YouTube Data API v3 client: `search.list` for ids, `videos.list` for details.

use anyhow::{Context, Result};
use log::{debug, warn};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use std::time::Duration;
use ureq::Agent;

use super::VideoSource;
use crate::utils::config::{PAGE_SIZE, SOURCE_CALL_TIMEOUT, YOUTUBE_API_BASE};
use crate::{Thumbnail, VideoId, VideoPage, VideoRecord};

/// Blocking Data API client. Every call carries a global deadline.
pub struct YouTubeSource {
    agent: Agent,
    api_key: String,
    base_url: String,
}

impl YouTubeSource {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self::with_base_url(api_key, YOUTUBE_API_BASE, SOURCE_CALL_TIMEOUT)
    }

    /// Client against another API root (proxies, test servers).
    pub fn with_base_url(
        api_key: impl Into<String>,
        base_url: impl Into<String>,
        timeout: Duration,
    ) -> Self {
        let config = Agent::config_builder()
            .timeout_global(Some(timeout))
            .build();
        Self {
            agent: config.into(),
            api_key: api_key.into(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    fn get_json<T: DeserializeOwned>(&self, endpoint: &str, query: &[(&str, &str)]) -> Result<T> {
        let url = format!("{}/{}", self.base_url, endpoint);
        let mut request = self.agent.get(&url).query("key", &self.api_key);
        for (name, value) in query {
            request = request.query(*name, *value);
        }
        let response = request
            .call()
            .with_context(|| format!("GET {endpoint}"))?;
        let body = response
            .into_body()
            .read_to_string()
            .with_context(|| format!("read {endpoint} response body"))?;
        serde_json::from_str(&body).with_context(|| format!("parse {endpoint} response"))
    }
}

impl VideoSource for YouTubeSource {
    fn list_page(&self, channel_id: &str, cursor: &str) -> Result<VideoPage> {
        let max_results = PAGE_SIZE.to_string();
        let mut query = vec![
            ("part", "id"),
            ("channelId", channel_id),
            ("order", "date"),
            ("type", "video"),
            ("maxResults", max_results.as_str()),
        ];
        if !cursor.is_empty() {
            query.push(("pageToken", cursor));
        }
        let response: SearchListResponse = self.get_json("search", &query)?;
        Ok(response.into_page())
    }

    fn lookup_videos(&self, ids: &[VideoId]) -> Result<Vec<VideoRecord>> {
        let joined = ids.join(",");
        let response: VideoListResponse = self.get_json(
            "videos",
            &[("part", "id,snippet,statistics"), ("id", joined.as_str())],
        )?;
        let records = response.into_records();
        debug!("lookup of {} ids returned {} videos", ids.len(), records.len());
        Ok(records)
    }
}

// ---- Wire types ----

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SearchListResponse {
    #[serde(default)]
    next_page_token: Option<String>,
    #[serde(default)]
    items: Vec<SearchResult>,
}

#[derive(Debug, Deserialize)]
struct SearchResult {
    id: SearchResultId,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SearchResultId {
    #[serde(default)]
    video_id: Option<String>,
}

impl SearchListResponse {
    fn into_page(self) -> VideoPage {
        VideoPage {
            ids: self
                .items
                .into_iter()
                .filter_map(|item| item.id.video_id)
                .collect(),
            next_cursor: self.next_page_token.unwrap_or_default(),
        }
    }
}

/// Items stay raw so one malformed video cannot fail the whole lookup.
#[derive(Debug, Deserialize)]
struct VideoListResponse {
    #[serde(default)]
    items: Vec<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
struct VideoResource {
    id: String,
    #[serde(default)]
    snippet: Snippet,
    #[serde(default)]
    statistics: Statistics,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Snippet {
    #[serde(default)]
    title: String,
    #[serde(default)]
    published_at: String,
    #[serde(default)]
    thumbnails: Thumbnails,
}

#[derive(Debug, Default, Deserialize)]
struct Thumbnails {
    standard: Option<ThumbnailResource>,
    high: Option<ThumbnailResource>,
    medium: Option<ThumbnailResource>,
    default: Option<ThumbnailResource>,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct ThumbnailResource {
    #[serde(default)]
    url: String,
    #[serde(default)]
    width: u32,
    #[serde(default)]
    height: u32,
}

/// Counts arrive as decimal strings; hidden counts are omitted.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Statistics {
    #[serde(default, deserialize_with = "count_from_string")]
    view_count: u64,
    #[serde(default, deserialize_with = "count_from_string")]
    like_count: u64,
    #[serde(default, deserialize_with = "count_from_string")]
    dislike_count: u64,
}

fn count_from_string<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Count {
        Text(String),
        Number(u64),
    }
    match Count::deserialize(deserializer)? {
        Count::Number(n) => Ok(n),
        Count::Text(s) => s.trim().parse().map_err(serde::de::Error::custom),
    }
}

impl Thumbnails {
    /// Standard size, then the next best the service offers.
    fn best(self) -> Thumbnail {
        self.standard
            .or(self.high)
            .or(self.medium)
            .or(self.default)
            .map(|t| Thumbnail {
                url: t.url,
                width: t.width,
                height: t.height,
            })
            .unwrap_or_default()
    }
}

impl VideoListResponse {
    fn into_records(self) -> Vec<VideoRecord> {
        self.items
            .into_iter()
            .filter_map(|raw| match serde_json::from_value::<VideoResource>(raw) {
                Ok(item) => Some(item.into_record()),
                Err(e) => {
                    warn!("Skipping malformed video in lookup response: {}", e);
                    None
                }
            })
            .collect()
    }
}

impl VideoResource {
    fn into_record(self) -> VideoRecord {
        VideoRecord {
            id: self.id,
            title: self.snippet.title,
            thumbnail: self.snippet.thumbnails.best(),
            like_count: self.statistics.like_count,
            dislike_count: self.statistics.dislike_count,
            view_count: self.statistics.view_count,
            published_at: self.snippet.published_at,
        }
    }
}
