//! SQLite-backed [`KeyedStore`]: one `fields` table, WAL mode, one statement per field write.

use anyhow::{Context, Result, bail};
use rusqlite::{Connection, OpenFlags};
use std::collections::BTreeMap;
use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use super::KeyedStore;

/// WAL tuning pragmas. Use after PRAGMA journal_mode = WAL.
const WAL_PRAGMAS: &str = r#"
        PRAGMA synchronous = NORMAL;
        PRAGMA busy_timeout = 5000;
        "#;

const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS fields (
    key TEXT NOT NULL,
    field TEXT NOT NULL,
    value TEXT NOT NULL,
    PRIMARY KEY (key, field)
);
"#;

const UPSERT_FIELD_SQL: &str = "INSERT OR REPLACE INTO fields (key, field, value) VALUES (?1, ?2, ?3)";

const SELECT_FIELDS_SQL: &str = "SELECT field, value FROM fields WHERE key = ?1";

/// Keyed store over a single SQLite connection. Shared between writer threads behind a mutex.
pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    fn lock(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| anyhow::anyhow!("store connection mutex poisoned"))
    }

    /// Number of fields stored under `key`.
    pub fn field_count(&self, key: &str) -> Result<usize> {
        let conn = self.lock()?;
        let n: i64 = conn
            .query_row("SELECT COUNT(*) FROM fields WHERE key = ?1", [key], |row| {
                row.get(0)
            })
            .context("count fields")?;
        Ok(n.max(0) as usize)
    }
}

/// Open or create the store file and ensure schema + WAL.
pub fn open_store(path: &Path) -> Result<SqliteStore> {
    let conn = Connection::open(path)
        .with_context(|| format!("open store at {}", path.display()))?;
    conn.query_row("PRAGMA journal_mode = WAL", [], |_| Ok(()))
        .context("enable WAL")?;
    conn.execute_batch(WAL_PRAGMAS).context("set WAL pragmas")?;
    conn.execute_batch(SCHEMA).context("create schema")?;
    Ok(SqliteStore {
        conn: Mutex::new(conn),
    })
}

/// Open an existing store file for reading only. Never creates the file or changes its mode.
pub fn open_store_read_only(path: &Path) -> Result<SqliteStore> {
    if !path.is_file() {
        bail!("store {} does not exist", path.display());
    }
    let conn = Connection::open_with_flags(
        path,
        OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
    )
    .with_context(|| format!("open store at {} read-only", path.display()))?;
    Ok(SqliteStore {
        conn: Mutex::new(conn),
    })
}

/// Open an in-memory store with the same schema (tests and dry runs).
pub fn open_store_in_memory() -> Result<SqliteStore> {
    let conn = Connection::open_in_memory().context("open in-memory store")?;
    conn.execute_batch(SCHEMA).context("create schema")?;
    Ok(SqliteStore {
        conn: Mutex::new(conn),
    })
}

impl KeyedStore for SqliteStore {
    fn set_field(&self, key: &str, field: &str, value: &str) -> Result<()> {
        let conn = self.lock()?;
        let mut stmt = conn
            .prepare_cached(UPSERT_FIELD_SQL)
            .context("prepare upsert")?;
        stmt.execute((key, field, value)).context("upsert field")?;
        Ok(())
    }

    fn get_all_fields(&self, key: &str) -> Result<BTreeMap<String, String>> {
        let conn = self.lock()?;
        let mut stmt = conn
            .prepare_cached(SELECT_FIELDS_SQL)
            .context("prepare select")?;
        let rows = stmt.query_map([key], |row| {
            let field: String = row.get(0)?;
            let value: String = row.get(1)?;
            Ok((field, value))
        })?;
        let mut map = BTreeMap::new();
        for row in rows {
            let (field, value) = row?;
            map.insert(field, value);
        }
        Ok(map)
    }
}
