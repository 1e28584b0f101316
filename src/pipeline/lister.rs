//! Page lister: walks the channel listing cursor by cursor and emits id batches.

use anyhow::Result;
use crossbeam_channel::Sender;
use log::{debug, info, warn};
use std::collections::HashSet;
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use super::context::{PassCounters, PipelineContext};
use crate::source::VideoSource;
use crate::{ListingEnd, VideoId, VideoPage};

/// One listing call. Empty `cursor` asks for the first page.
pub fn list_page(source: &dyn VideoSource, channel_id: &str, cursor: &str) -> Result<VideoPage> {
    let page = source.list_page(channel_id, cursor)?;
    debug!(
        "Fetched {} ids for channel {} with cursor {:?}",
        page.ids.len(),
        channel_id,
        cursor
    );
    Ok(page)
}

/// Call [`list_page`] until the cursor runs out, sending every non-empty page on `id_tx`.
/// Drops `id_tx` when done so the batcher sees the channel close.
///
/// A failed call ends the walk with [`ListingEnd::Failed`]; pages sent before it stay sent.
pub fn run_lister(
    ctx: &PipelineContext,
    id_tx: Sender<Vec<VideoId>>,
    counters: &PassCounters,
) -> ListingEnd {
    let mut cursor = String::new();
    let mut seen_cursors: HashSet<String> = HashSet::new();
    let end = loop {
        let page = match list_page(ctx.source.as_ref(), &ctx.channel_id, &cursor) {
            Ok(page) => page,
            Err(e) => {
                warn!(
                    "Listing failed for channel {} at cursor {:?}: {:#}",
                    ctx.channel_id, cursor, e
                );
                break ListingEnd::Failed {
                    cursor,
                    error: format!("{:#}", e),
                };
            }
        };
        let VideoPage { ids, next_cursor } = page;
        if !ids.is_empty() {
            PassCounters::add(&counters.pages, 1);
            PassCounters::add(&counters.ids_listed, ids.len());
            if id_tx.send(ids).is_err() {
                // Receiver gone: nothing downstream left to feed.
                break ListingEnd::Exhausted;
            }
        }
        if next_cursor.is_empty() {
            break ListingEnd::Exhausted;
        }
        seen_cursors.insert(cursor);
        if seen_cursors.contains(&next_cursor) {
            warn!(
                "Listing cursor {:?} was already visited this pass; stopping",
                next_cursor
            );
            break ListingEnd::Exhausted;
        }
        cursor = next_cursor;
    };
    drop(id_tx);
    end
}

pub fn spawn_lister_thread(
    ctx: PipelineContext,
    id_tx: Sender<Vec<VideoId>>,
    counters: Arc<PassCounters>,
) -> JoinHandle<ListingEnd> {
    thread::spawn(move || {
        info!("Video id lister started");
        let end = run_lister(&ctx, id_tx, &counters);
        info!(
            "Video id lister finished: {} ids in {} batches",
            PassCounters::get(&counters.ids_listed),
            PassCounters::get(&counters.pages)
        );
        end
    })
}
