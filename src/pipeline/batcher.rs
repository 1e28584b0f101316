//! Detail batcher: one bulk lookup per id batch, producing normalized records.

use anyhow::Result;
use crossbeam_channel::{Receiver, Sender};
use log::{debug, info, warn};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use super::context::{PassCounters, PipelineContext};
use crate::source::VideoSource;
use crate::utils::config::MAX_LOOKUP_IDS;
use crate::{VideoId, VideoRecord};

/// Look up details for `ids`, at most [`MAX_LOOKUP_IDS`] per call, in source order.
/// Ids the source does not return are dropped; the result is never longer than `ids`.
pub fn fetch_details(source: &dyn VideoSource, ids: &[VideoId]) -> Result<Vec<VideoRecord>> {
    let mut records = Vec::with_capacity(ids.len());
    for chunk in ids.chunks(MAX_LOOKUP_IDS) {
        let mut fetched = source.lookup_videos(chunk)?;
        fetched.truncate(chunk.len());
        records.append(&mut fetched);
    }
    debug!("Fetched {} videos for {} ids", records.len(), ids.len());
    Ok(records)
}

/// Drain `id_rx`, look up each batch and send its records on `record_tx`.
/// A failed lookup yields no records for that batch. Drops `record_tx` when `id_rx` closes.
pub fn run_batcher(
    ctx: &PipelineContext,
    id_rx: Receiver<Vec<VideoId>>,
    record_tx: Sender<Vec<VideoRecord>>,
    counters: &PassCounters,
) {
    while let Ok(ids) = id_rx.recv() {
        let records = match fetch_details(ctx.source.as_ref(), &ids) {
            Ok(records) => records,
            Err(e) => {
                warn!("Failed to fetch details for {} videos: {:#}", ids.len(), e);
                PassCounters::add(&counters.lookups_failed, 1);
                continue;
            }
        };
        if records.len() < ids.len() {
            debug!(
                "{} of {} ids had no details (deleted or private)",
                ids.len() - records.len(),
                ids.len()
            );
        }
        if records.is_empty() {
            continue;
        }
        PassCounters::add(&counters.records_detailed, records.len());
        if record_tx.send(records).is_err() {
            break;
        }
    }
    drop(record_tx);
}

pub fn spawn_batcher_thread(
    ctx: PipelineContext,
    id_rx: Receiver<Vec<VideoId>>,
    record_tx: Sender<Vec<VideoRecord>>,
    counters: Arc<PassCounters>,
) -> JoinHandle<()> {
    thread::spawn(move || {
        info!("Video details fetcher started");
        run_batcher(&ctx, id_rx, record_tx, &counters);
        info!(
            "Video details fetcher finished: {} records",
            PassCounters::get(&counters.records_detailed)
        );
    })
}
