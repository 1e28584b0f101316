use log::{info, warn};

use crate::{ListingEnd, PassReport};

/// Log a finished pass: summary line, then a warning for each kind of partial result.
/// Steady-state failures never abort a pass; this is their only surface besides per-item logs.
pub fn log_pass_report(channel_id: &str, report: &PassReport) {
    info!(
        "Pass for channel {} done in {:.1?}: {} ids in {} batches, {} records, {} writes ({} failed)",
        channel_id,
        report.elapsed,
        report.ids_listed,
        report.pages,
        report.records_detailed,
        report.writes_attempted,
        report.writes_failed
    );
    if let ListingEnd::Failed { cursor, error } = &report.listing_end {
        warn!(
            "Partial scan: listing stopped at cursor {:?} ({}); older videos were not refreshed",
            cursor, error
        );
    }
    if report.lookups_failed > 0 {
        warn!(
            "{} detail lookups failed; their videos were not refreshed",
            report.lookups_failed
        );
    }
    let skipped = report.records_detailed.saturating_sub(report.writes_attempted);
    if skipped > 0 {
        warn!("Skipped {} records with unserializable data or bad publish dates", skipped);
    }
    if report.writes_failed > 0 {
        warn!("{} store writes failed", report.writes_failed);
    }
}
