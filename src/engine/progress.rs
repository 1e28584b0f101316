//! Progress counter for persisted records (verbose mode).

use kdam::{Animation, Bar, BarExt};
use std::sync::{Arc, Mutex};

use crate::pipeline::BatchProgress;

pub type ProgressBar = Arc<Mutex<Bar>>;

/// Create a counter for unknown total (shows count without percentage)
pub fn create_counter(desc: &'static str) -> ProgressBar {
    Arc::new(Mutex::new(kdam::tqdm!(
        total = 0,
        desc = desc,
        animation = Animation::Classic,
        position = 0,
        unit = " videos"
    )))
}

/// Force a refresh of the bar (e.g. so the counter shows "0 videos" immediately).
pub fn refresh_bar(pb: &ProgressBar) {
    if let Ok(mut bar) = pb.try_lock() {
        let _ = bar.refresh();
    }
}

/// Update progress bar if available.
/// Uses try_lock so a contended bar never blocks the writer; the count catches up next time.
pub fn update_progress_bar(pb: &ProgressBar, n: usize) {
    if let Ok(mut pb) = pb.try_lock() {
        let _ = pb.update(n);
    }
}

/// Callback for the persister that bumps `bar` by each batch's successful writes.
pub fn progress_callback(bar: &Option<ProgressBar>) -> Option<BatchProgress> {
    bar.as_ref().map(|bar| {
        let bar = Arc::clone(bar);
        Box::new(move |n: usize| update_progress_bar(&bar, n)) as BatchProgress
    })
}

/// Fresh counter per pass when verbose, so each pass starts at zero.
pub fn pass_progress(verbose: bool) -> Option<BatchProgress> {
    let bar = verbose.then(|| {
        let b = create_counter("Persisted");
        refresh_bar(&b);
        b
    });
    progress_callback(&bar)
}
