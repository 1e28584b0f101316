use anyhow::Result;
use crossbeam_channel::{Receiver, RecvTimeoutError};
use log::{debug, info};
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

use crate::pipeline::{self, BatchProgress, PassCounters, PipelineContext, Persister};
use crate::{ListingEnd, Opts, PassReport};

/// Thread handles of one running pass.
pub struct PassHandles {
    pub lister_handle: JoinHandle<ListingEnd>,
    pub batcher_handle: JoinHandle<()>,
    pub persister_handle: JoinHandle<()>,
    pub counters: Arc<PassCounters>,
}

/// Start lister, batcher and persister threads for one pass. Caller joins via [`finish_pass`].
pub fn start_pass(
    ctx: &PipelineContext,
    on_batch_progress: Option<BatchProgress>,
) -> Result<PassHandles> {
    // Built first so a pool failure leaves no stage threads behind.
    let persister = Persister::from_context(ctx)?;
    let channels = pipeline::create_pipeline_channels();

    let lister_handle = pipeline::spawn_lister_thread(
        ctx.clone(),
        channels.id_tx,
        Arc::clone(&channels.counters),
    );
    let batcher_handle = pipeline::spawn_batcher_thread(
        ctx.clone(),
        channels.id_rx,
        channels.record_tx,
        Arc::clone(&channels.counters),
    );
    let persister_handle = pipeline::spawn_persister_thread(
        persister,
        channels.record_rx,
        Arc::clone(&channels.counters),
        on_batch_progress,
    );

    Ok(PassHandles {
        lister_handle,
        batcher_handle,
        persister_handle,
        counters: channels.counters,
    })
}

/// Join all stage threads of a pass and collect its counters.
pub fn finish_pass(handles: PassHandles, started: Instant) -> Result<PassReport> {
    let PassHandles {
        lister_handle,
        batcher_handle,
        persister_handle,
        counters,
    } = handles;
    let listing_end = lister_handle
        .join()
        .map_err(|_| anyhow::anyhow!("lister thread panicked"))?;
    batcher_handle
        .join()
        .map_err(|_| anyhow::anyhow!("batcher thread panicked"))?;
    persister_handle
        .join()
        .map_err(|_| anyhow::anyhow!("persister thread panicked"))?;

    Ok(PassReport {
        pages: PassCounters::get(&counters.pages),
        ids_listed: PassCounters::get(&counters.ids_listed),
        lookups_failed: PassCounters::get(&counters.lookups_failed),
        records_detailed: PassCounters::get(&counters.records_detailed),
        writes_attempted: PassCounters::get(&counters.writes_attempted),
        writes_failed: PassCounters::get(&counters.writes_failed),
        listing_end,
        elapsed: started.elapsed(),
    })
}

/// One full pass: Lister → id channel → Batcher → record channel → Persister.
/// Returns once every stage has drained.
pub fn run_pass(
    ctx: &PipelineContext,
    on_batch_progress: Option<BatchProgress>,
) -> Result<PassReport> {
    let started = Instant::now();
    info!("Starting pass for channel {}", ctx.channel_id);
    let handles = start_pass(ctx, on_batch_progress)?;
    let report = finish_pass(handles, started)?;
    pipeline::log_pass_report(&ctx.channel_id, &report);
    Ok(report)
}

/// Sleep before the next pass: the full interval, or the retry interval after a partial scan.
pub fn next_pass_delay(report: &PassReport, opts: &Opts) -> Duration {
    if report.listing_end.is_partial() {
        opts.retry_interval.min(opts.pass_interval)
    } else {
        opts.pass_interval
    }
}

/// Run passes forever, sleeping between them. A message on `shutdown` (or its sender going
/// away) stops the loop: at once while sleeping, after the current pass while one is running.
/// `progress` builds the per-pass progress callback.
pub fn run_forever<F>(
    ctx: &PipelineContext,
    opts: &Opts,
    shutdown: &Receiver<()>,
    mut progress: F,
) -> Result<()>
where
    F: FnMut() -> Option<BatchProgress>,
{
    loop {
        let report = run_pass(ctx, progress())?;
        if opts.once {
            return Ok(());
        }
        if shutdown.try_recv().is_ok() {
            info!("Stop requested during pass; exiting");
            return Ok(());
        }
        let delay = next_pass_delay(&report, opts);
        info!("Sleeping {:?} until next pass...", delay);
        match shutdown.recv_timeout(delay) {
            Err(RecvTimeoutError::Timeout) => debug!("Woke up for next pass"),
            Ok(()) | Err(RecvTimeoutError::Disconnected) => {
                info!("Stop requested; exiting");
                return Ok(());
            }
        }
    }
}
