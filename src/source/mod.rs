//! Source of channel listings and video details.

mod youtube;

pub use youtube::YouTubeSource;

use anyhow::Result;

use crate::{VideoId, VideoPage, VideoRecord};

/// Listing and bulk-detail calls against the external video service.
///
/// Both calls may fail; the pipeline treats a failure as "no results for this call".
pub trait VideoSource: Send + Sync {
    /// One page of `channel_id`'s video ids, newest first. `cursor` is empty for the first page.
    fn list_page(&self, channel_id: &str, cursor: &str) -> Result<VideoPage>;

    /// Details for `ids` (at most [`MAX_LOOKUP_IDS`](crate::utils::config::MAX_LOOKUP_IDS)).
    /// Ids the service no longer knows are simply absent from the result.
    fn lookup_videos(&self, ids: &[VideoId]) -> Result<Vec<VideoRecord>>;
}
