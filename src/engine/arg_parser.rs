use clap::Parser;
use std::path::PathBuf;

/// Harvest every video of a YouTube channel into a keyed SQLite store, once a day.
#[derive(Clone, Parser)]
#[command(name = "ytharvest")]
#[command(about = "Harvest a channel's videos into the store; repeats every 24 hours.")]
pub struct Cli {
    /// Channel id to harvest. Default: YTHARVEST_CHANNEL_ID, settings file, then built-in default.
    #[arg(long, short = 'c', value_name = "ID")]
    pub channel: Option<String>,

    /// Path to the store database. Default: YTHARVEST_STORE or `ytharvest.db`.
    #[arg(long, short = 's', value_name = "PATH")]
    pub store: Option<PathBuf>,

    /// Env file holding YOUTUBE_API_KEY. Default: `.env` in the working directory, if present.
    #[arg(long, value_name = "PATH")]
    pub env_file: Option<PathBuf>,

    /// Run a single pass and exit.
    #[arg(long)]
    pub once: bool,

    /// Print the channel's stored collection as JSON and exit (no harvesting).
    #[arg(long)]
    pub dump: bool,

    /// Max concurrent store writes per batch.
    #[arg(long, short = 'j', value_parser = clap::value_parser!(u16).range(1..))]
    pub jobs: Option<u16>,

    /// Verbose output.
    #[arg(long, short = 'v', num_args = 0..=1, default_missing_value = "true", value_parser = clap::value_parser!(bool))]
    pub verbose: Option<bool>,
}
