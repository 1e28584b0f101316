//! Pipeline context: collaborators and channel id handed to every stage, plus the hand-off channels.

use crossbeam_channel::{Receiver, Sender, unbounded};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::source::VideoSource;
use crate::store::KeyedStore;
use crate::utils::config::channel_store_key;
use crate::{VideoId, VideoRecord};

/// Everything a pass needs. Cheap to clone; each stage thread gets its own copy.
#[derive(Clone)]
pub struct PipelineContext {
    pub channel_id: String,
    pub source: Arc<dyn VideoSource>,
    pub store: Arc<dyn KeyedStore>,
    /// Max concurrent store writes per record batch.
    pub write_concurrency: usize,
}

impl PipelineContext {
    pub fn new(
        channel_id: impl Into<String>,
        source: Arc<dyn VideoSource>,
        store: Arc<dyn KeyedStore>,
        write_concurrency: usize,
    ) -> Self {
        Self {
            channel_id: channel_id.into(),
            source,
            store,
            write_concurrency: write_concurrency.max(1),
        }
    }

    /// Store key of this channel's collection.
    pub fn store_key(&self) -> String {
        channel_store_key(&self.channel_id)
    }
}

/// Counters shared by the stage workers of one pass.
#[derive(Default)]
pub struct PassCounters {
    pub pages: AtomicUsize,
    pub ids_listed: AtomicUsize,
    pub lookups_failed: AtomicUsize,
    pub records_detailed: AtomicUsize,
    pub writes_attempted: AtomicUsize,
    pub writes_failed: AtomicUsize,
}

impl PassCounters {
    pub fn add(counter: &AtomicUsize, n: usize) {
        counter.fetch_add(n, Ordering::Relaxed);
    }

    pub fn get(counter: &AtomicUsize) -> usize {
        counter.load(Ordering::Relaxed)
    }
}

/// Hand-off channels for one pass. Lister gets `id_tx`; batcher gets `id_rx` and `record_tx`;
/// persister gets `record_rx`. Unbounded: closing (dropping the sender) is the only completion signal.
pub struct PipelineChannels {
    pub id_tx: Sender<Vec<VideoId>>,
    pub id_rx: Receiver<Vec<VideoId>>,
    pub record_tx: Sender<Vec<VideoRecord>>,
    pub record_rx: Receiver<Vec<VideoRecord>>,
    pub counters: Arc<PassCounters>,
}

pub fn create_pipeline_channels() -> PipelineChannels {
    let (id_tx, id_rx) = unbounded::<Vec<VideoId>>();
    let (record_tx, record_rx) = unbounded::<Vec<VideoRecord>>();
    PipelineChannels {
        id_tx,
        id_rx,
        record_tx,
        record_rx,
        counters: Arc::new(PassCounters::default()),
    }
}
