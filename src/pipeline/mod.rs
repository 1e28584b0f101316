//! Ingestion pipeline: lister → batcher → persister, joined by two hand-off channels.

pub mod batcher;
pub mod context;
pub mod error_handler;
pub mod lister;
pub mod orchestrator;
pub mod persister;

pub use batcher::{fetch_details, run_batcher, spawn_batcher_thread};
pub use context::{PassCounters, PipelineChannels, PipelineContext, create_pipeline_channels};
pub use error_handler::log_pass_report;
pub use lister::{list_page, run_lister, spawn_lister_thread};
pub use orchestrator::{
    PassHandles, finish_pass, next_pass_delay, run_forever, run_pass, start_pass,
};
pub use persister::{
    BatchProgress, Persister, PreparedWrite, prepare_write, run_persister, spawn_persister_thread,
};
