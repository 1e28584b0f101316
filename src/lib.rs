//! ytharvest: periodic channel harvester with a three-stage ingestion pipeline.
//!
//! Lister (paginated ids) → Batcher (bulk details) → Persister (concurrent upserts),
//! joined by unbounded channels so listing overlaps with lookups and writes.

pub mod engine;
pub mod pipeline;
pub mod source;
pub mod store;
pub mod types;
pub mod utils;

/// Re-export types for API
pub use types::*;

use std::sync::Arc;

use crate::source::VideoSource;
use crate::store::KeyedStore;

/// Result alias used by public ytharvest API
pub use anyhow::Error;
pub type Result<T> = std::result::Result<T, Error>;

/// Run one harvesting pass for `channel_id` with explicit collaborators and return its counters.
///
/// ```ignore
/// let store = Arc::new(ytharvest::store::open_store(Path::new("yt.db"))?);
/// let source = Arc::new(ytharvest::source::YouTubeSource::new(api_key));
/// let report = ytharvest::harvest_once("UC...", source, store, 8)?;
/// ```
pub fn harvest_once(
    channel_id: &str,
    source: Arc<dyn VideoSource>,
    store: Arc<dyn KeyedStore>,
    write_concurrency: usize,
) -> Result<PassReport> {
    let ctx = pipeline::PipelineContext::new(channel_id, source, store, write_concurrency);
    pipeline::run_pass(&ctx, None)
}
