//! Application configuration constants.
//! Source limits, cadence and store naming in one place.

use std::sync::OnceLock;
use std::time::Duration;

// ---- Package names (from CARGO_PKG_NAME, cached) ----

/// Package-derived names: built once from `CARGO_PKG_NAME`, then cached.
pub struct PackagePaths {
    pkg_name: &'static str,
    settings_filename: String,
    default_store_filename: String,
}

static PACKAGE_PATHS: OnceLock<PackagePaths> = OnceLock::new();

impl PackagePaths {
    /// Build and cache names from `CARGO_PKG_NAME`. Called once on first use.
    pub fn get() -> &'static PackagePaths {
        PACKAGE_PATHS.get_or_init(|| {
            let pkg = env!("CARGO_PKG_NAME");
            PackagePaths {
                pkg_name: pkg,
                settings_filename: format!(".{pkg}.toml"),
                default_store_filename: format!("{pkg}.db"),
            }
        })
    }

    pub fn pkg_name(&self) -> &str {
        self.pkg_name
    }

    pub fn settings_filename(&self) -> &str {
        &self.settings_filename
    }

    pub fn default_store_filename(&self) -> &str {
        &self.default_store_filename
    }
}

// ---- Source API limits ----

/// Ids requested per listing call.
pub const PAGE_SIZE: usize = 50;

/// Max ids per bulk detail lookup (source API limit).
pub const MAX_LOOKUP_IDS: usize = 50;

/// Deadline for a single call to the source API.
pub const SOURCE_CALL_TIMEOUT: Duration = Duration::from_secs(30);

/// Base URL of the YouTube Data API v3.
pub const YOUTUBE_API_BASE: &str = "https://www.googleapis.com/youtube/v3";

// ---- Cadence ----

/// Sleep between completed passes.
pub const PASS_INTERVAL: Duration = Duration::from_secs(24 * 60 * 60);

/// Sleep after a pass whose listing stopped on an error.
pub const PASS_RETRY_INTERVAL: Duration = Duration::from_secs(60 * 60);

// ---- Store ----

/// Prefix of the per-channel store key (`yt-data:<channel id>`).
pub const STORAGE_PREFIX: &str = "yt-data";

/// Concurrent store writes per record batch unless overridden.
pub const DEFAULT_WRITE_CONCURRENCY: usize = 8;

// ---- Environment ----

/// Environment variable names read at startup.
pub struct EnvKeys;

impl EnvKeys {
    pub const API_KEY: &'static str = "YOUTUBE_API_KEY";
    pub const CHANNEL_ID: &'static str = "YTHARVEST_CHANNEL_ID";
    pub const STORE_PATH: &'static str = "YTHARVEST_STORE";
}

/// Channel harvested when neither env, settings file nor CLI names one.
pub const DEFAULT_CHANNEL_ID: &str = "UCWu4IYWg9JpBurse8e-udPA";

/// Store key for a channel's collection.
pub fn channel_store_key(channel_id: &str) -> String {
    format!("{STORAGE_PREFIX}:{channel_id}")
}
