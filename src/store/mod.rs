//! Keyed store: per-key field/value collections with independent field upserts.

mod sqlite;

pub use sqlite::{SqliteStore, open_store, open_store_in_memory, open_store_read_only};

use anyhow::Result;
use std::collections::BTreeMap;

/// A store of per-key field maps. Writes to different fields never conflict; a write to an
/// existing field replaces its value.
pub trait KeyedStore: Send + Sync {
    /// Upsert `value` at (`key`, `field`).
    fn set_field(&self, key: &str, field: &str, value: &str) -> Result<()>;

    /// Every field of `key` (empty map when the key has none).
    fn get_all_fields(&self, key: &str) -> Result<BTreeMap<String, String>>;
}
