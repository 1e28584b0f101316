//! Shared fakes for pipeline tests: scripted source and a store that can reject fields.

#![allow(dead_code)]

use anyhow::{Result, bail};
use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use ytharvest::source::VideoSource;
use ytharvest::store::{KeyedStore, SqliteStore, open_store_in_memory};
use ytharvest::{Thumbnail, VideoId, VideoPage, VideoRecord};

pub const CHANNEL: &str = "UCtestchannel";
pub const CHANNEL_KEY: &str = "yt-data:UCtestchannel";

pub fn record(id: &str, published_at: &str) -> VideoRecord {
    VideoRecord {
        id: id.to_string(),
        title: format!("Video {id}"),
        thumbnail: Thumbnail {
            url: format!("https://i.ytimg.com/vi/{id}/sddefault.jpg"),
            width: 640,
            height: 480,
        },
        like_count: 10,
        dislike_count: 1,
        view_count: 100,
        published_at: published_at.to_string(),
    }
}

/// `n` ids `prefix-0 .. prefix-(n-1)`.
pub fn ids(prefix: &str, n: usize) -> Vec<VideoId> {
    (0..n).map(|i| format!("{prefix}-{i}")).collect()
}

/// Distinct publish second per index.
pub fn published(i: usize) -> String {
    let base = chrono::DateTime::parse_from_rfc3339("2023-01-01T00:00:00Z").unwrap();
    (base + chrono::Duration::seconds(i as i64)).to_rfc3339()
}

/// Source with pages keyed by cursor and a catalog of known videos.
#[derive(Default)]
pub struct FakeSource {
    pages: HashMap<String, VideoPage>,
    failing_cursors: HashSet<String>,
    catalog: HashMap<VideoId, VideoRecord>,
    failing_ids: HashSet<VideoId>,
    pub lookup_sizes: Mutex<Vec<usize>>,
    pub listed_cursors: Mutex<Vec<String>>,
}

impl FakeSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn page(mut self, cursor: &str, ids: Vec<VideoId>, next: &str) -> Self {
        self.pages.insert(
            cursor.to_string(),
            VideoPage {
                ids,
                next_cursor: next.to_string(),
            },
        );
        self
    }

    pub fn failing_page(mut self, cursor: &str) -> Self {
        self.failing_cursors.insert(cursor.to_string());
        self
    }

    /// Make every id known, each with its own publish second.
    pub fn with_catalog(mut self, all_ids: &[VideoId]) -> Self {
        for (i, id) in all_ids.iter().enumerate() {
            self.catalog.insert(id.clone(), record(id, &published(i)));
        }
        self
    }

    pub fn with_record(mut self, record: VideoRecord) -> Self {
        self.catalog.insert(record.id.clone(), record);
        self
    }

    pub fn without(mut self, id: &str) -> Self {
        self.catalog.remove(id);
        self
    }

    /// Any lookup containing `id` fails.
    pub fn failing_lookup(mut self, id: &str) -> Self {
        self.failing_ids.insert(id.to_string());
        self
    }
}

impl VideoSource for FakeSource {
    fn list_page(&self, _channel_id: &str, cursor: &str) -> Result<VideoPage> {
        self.listed_cursors.lock().unwrap().push(cursor.to_string());
        if self.failing_cursors.contains(cursor) {
            bail!("quota exceeded");
        }
        match self.pages.get(cursor) {
            Some(page) => Ok(page.clone()),
            None => bail!("unknown cursor {cursor:?}"),
        }
    }

    fn lookup_videos(&self, ids: &[VideoId]) -> Result<Vec<VideoRecord>> {
        self.lookup_sizes.lock().unwrap().push(ids.len());
        if ids.iter().any(|id| self.failing_ids.contains(id)) {
            bail!("backend error");
        }
        Ok(ids
            .iter()
            .filter_map(|id| self.catalog.get(id).cloned())
            .collect())
    }
}

/// In-memory SQLite store that rejects writes to chosen fields.
pub struct FlakyStore {
    pub inner: SqliteStore,
    failing_fields: HashSet<String>,
}

impl FlakyStore {
    pub fn new(failing_fields: &[&str]) -> Self {
        Self {
            inner: open_store_in_memory().unwrap(),
            failing_fields: failing_fields.iter().map(|s| s.to_string()).collect(),
        }
    }
}

impl KeyedStore for FlakyStore {
    fn set_field(&self, key: &str, field: &str, value: &str) -> Result<()> {
        if self.failing_fields.contains(field) {
            bail!("connection reset");
        }
        self.inner.set_field(key, field, value)
    }

    fn get_all_fields(&self, key: &str) -> Result<BTreeMap<String, String>> {
        self.inner.get_all_fields(key)
    }
}

/// Field key the persister uses for `published_at`.
pub fn field_for(published_at: &str) -> String {
    chrono::DateTime::parse_from_rfc3339(published_at)
        .unwrap()
        .timestamp()
        .to_string()
}

/// Store whose writes take `delay` and which records the peak number of writes in flight.
pub struct SlowStore {
    pub inner: SqliteStore,
    delay: Duration,
    in_flight: AtomicUsize,
    pub peak_in_flight: AtomicUsize,
    pub completed: AtomicUsize,
}

impl SlowStore {
    pub fn new(delay: Duration) -> Self {
        Self {
            inner: open_store_in_memory().unwrap(),
            delay,
            in_flight: AtomicUsize::new(0),
            peak_in_flight: AtomicUsize::new(0),
            completed: AtomicUsize::new(0),
        }
    }
}

impl KeyedStore for SlowStore {
    fn set_field(&self, key: &str, field: &str, value: &str) -> Result<()> {
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak_in_flight.fetch_max(now, Ordering::SeqCst);
        std::thread::sleep(self.delay);
        let result = self.inner.set_field(key, field, value);
        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        self.completed.fetch_add(1, Ordering::SeqCst);
        result
    }

    fn get_all_fields(&self, key: &str) -> Result<BTreeMap<String, String>> {
        self.inner.get_all_fields(key)
    }
}
