//! Persister: upserts each record of a batch as one independent store write.
//!
//! Writes of a batch run concurrently on a bounded pool and are joined before the next batch.
//! Field key is the Unix-seconds publish time, so two videos published in the same second
//! overwrite each other (last write wins).

use anyhow::{Context, Result};
use chrono::DateTime;
use crossbeam_channel::Receiver;
use log::{debug, info, warn};
use rayon::{ThreadPool, ThreadPoolBuilder};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::thread::{self, JoinHandle};

use super::context::{PassCounters, PipelineContext};
use crate::store::KeyedStore;
use crate::{BatchWrite, VideoRecord};

/// Callback told how many writes finished after each batch (progress display).
pub type BatchProgress = Box<dyn Fn(usize) + Send + Sync>;

/// One prepared store write: field key and serialized record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreparedWrite {
    pub video_id: String,
    pub field: String,
    pub value: String,
}

/// Serialize `record` and derive its field key from `published_at` (RFC 3339 → Unix seconds).
pub fn prepare_write(record: &VideoRecord) -> Result<PreparedWrite> {
    let value = serde_json::to_string(record).context("serialize record")?;
    let published = DateTime::parse_from_rfc3339(record.published_at.trim())
        .with_context(|| format!("parse publish date {:?}", record.published_at))?;
    Ok(PreparedWrite {
        video_id: record.id.clone(),
        field: published.timestamp().to_string(),
        value,
    })
}

pub struct Persister {
    store: Arc<dyn KeyedStore>,
    key: String,
    pool: ThreadPool,
}

impl Persister {
    /// Persister writing into the collection at `key` with at most `concurrency` writes in flight.
    pub fn new(store: Arc<dyn KeyedStore>, key: String, concurrency: usize) -> Result<Self> {
        let pool = ThreadPoolBuilder::new()
            .num_threads(concurrency.max(1))
            .thread_name(|i| format!("store-writer-{i}"))
            .build()
            .context("build store writer pool")?;
        Ok(Self { store, key, pool })
    }

    pub fn from_context(ctx: &PipelineContext) -> Result<Self> {
        Self::new(Arc::clone(&ctx.store), ctx.store_key(), ctx.write_concurrency)
    }

    /// Write every record of `records`. Records that fail to serialize or carry a malformed
    /// publish date are skipped; store errors are logged. Blocks until all writes finish.
    pub fn persist_batch(&self, records: &[VideoRecord]) -> BatchWrite {
        let writes: Vec<PreparedWrite> = records
            .iter()
            .filter_map(|record| match prepare_write(record) {
                Ok(w) => Some(w),
                Err(e) => {
                    warn!("Skipping video {}: {:#}", record.id, e);
                    None
                }
            })
            .collect();

        let failed = AtomicUsize::new(0);
        self.pool.scope(|s| {
            for write in &writes {
                let failed = &failed;
                let store = self.store.as_ref();
                let key = self.key.as_str();
                s.spawn(move |_| {
                    if let Err(e) = store.set_field(key, &write.field, &write.value) {
                        warn!("Failed to save video {}: {:#}", write.video_id, e);
                        failed.fetch_add(1, Ordering::Relaxed);
                    }
                });
            }
        });

        let outcome = BatchWrite {
            attempted: writes.len(),
            failed: failed.into_inner(),
        };
        debug!(
            "Wrote {} of {} records to {} ({} failed)",
            outcome.attempted - outcome.failed,
            records.len(),
            self.key,
            outcome.failed
        );
        outcome
    }
}

/// Drain `record_rx`, persisting one batch at a time in arrival order.
pub fn run_persister(
    persister: &Persister,
    record_rx: Receiver<Vec<VideoRecord>>,
    counters: &PassCounters,
    on_batch_progress: Option<&BatchProgress>,
) {
    while let Ok(records) = record_rx.recv() {
        let outcome = persister.persist_batch(&records);
        PassCounters::add(&counters.writes_attempted, outcome.attempted);
        PassCounters::add(&counters.writes_failed, outcome.failed);
        if let Some(cb) = on_batch_progress {
            cb(outcome.attempted - outcome.failed);
        }
    }
}

pub fn spawn_persister_thread(
    persister: Persister,
    record_rx: Receiver<Vec<VideoRecord>>,
    counters: Arc<PassCounters>,
    on_batch_progress: Option<BatchProgress>,
) -> JoinHandle<()> {
    thread::spawn(move || {
        info!("Store writer started");
        run_persister(
            &persister,
            record_rx,
            &counters,
            on_batch_progress.as_ref(),
        );
        info!(
            "Store writer finished: {} writes ({} failed)",
            PassCounters::get(&counters.writes_attempted),
            PassCounters::get(&counters.writes_failed)
        );
    })
}
