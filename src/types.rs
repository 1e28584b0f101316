//! Public and internal types for the ytharvest API and pipeline.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Opaque id of one video in the source system. Not deduplicated by the pipeline.
pub type VideoId = String;

/// Thumbnail picked for a video (standard size when the source has one).
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Thumbnail {
    pub url: String,
    pub width: u32,
    pub height: u32,
}

/// Normalized metadata for one video. Serialized as the value of a stored row.
///
/// Field names on the wire (`likes`, `views`, `published_date`, ...) are the ones the
/// site reads back from the store.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct VideoRecord {
    pub id: VideoId,
    pub title: String,
    pub thumbnail: Thumbnail,
    #[serde(rename = "likes")]
    pub like_count: u64,
    #[serde(rename = "dislikes")]
    pub dislike_count: u64,
    #[serde(rename = "views")]
    pub view_count: u64,
    /// RFC 3339 timestamp exactly as the source returned it.
    #[serde(rename = "published_date")]
    pub published_at: String,
}

/// One page of the channel listing: ids in source order and the cursor for the next page.
/// An empty `next_cursor` means the listing is exhausted.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct VideoPage {
    pub ids: Vec<VideoId>,
    pub next_cursor: String,
}

/// How the listing stage of a pass ended.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ListingEnd {
    /// The source reported no further pages.
    Exhausted,
    /// A listing call failed; pages after `cursor` were never seen.
    Failed { cursor: String, error: String },
}

impl ListingEnd {
    pub fn is_partial(&self) -> bool {
        matches!(self, ListingEnd::Failed { .. })
    }
}

/// Counters for one pass, filled in by the stage workers.
#[derive(Clone, Debug)]
pub struct PassReport {
    /// Identifier batches the lister emitted.
    pub pages: usize,
    pub ids_listed: usize,
    /// Detail lookups that failed (their whole batch yielded no records).
    pub lookups_failed: usize,
    pub records_detailed: usize,
    /// Records that passed serialization and timestamp parsing.
    pub writes_attempted: usize,
    pub writes_failed: usize,
    pub listing_end: ListingEnd,
    pub elapsed: Duration,
}

/// Outcome of persisting one record batch.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct BatchWrite {
    /// Writes launched (records that serialized and had a parseable timestamp).
    pub attempted: usize,
    /// Launched writes the store rejected.
    pub failed: usize,
}

/// Full options (CLI and lib).
#[derive(Clone, Debug)]
pub struct Opts {
    /// Channel whose videos are harvested.
    pub channel_id: String,
    /// SQLite file backing the keyed store.
    pub store_path: PathBuf,
    /// Max concurrent store writes inside one record batch.
    pub write_concurrency: usize,
    /// Sleep between completed passes.
    pub pass_interval: Duration,
    /// Sleep after a pass whose listing failed part way.
    pub retry_interval: Duration,
    /// Stop after the first pass.
    pub once: bool,
    /// Debug logging and a progress counter.
    pub verbose: bool,
}
