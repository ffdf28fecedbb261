//! SQLite storage implementation.
//!
//! A single connection guarded by a mutex; every call runs on tokio's
//! blocking pool so the async tasks are never stalled by disk I/O.

use std::path::Path;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rusqlite::{Connection, params};

use crate::error::{AppError, Result};
use crate::models::{Item, NewsItem};
use crate::storage::ItemStorage;

const SCHEMA: &str = "
    CREATE TABLE IF NOT EXISTS news (
        id          INTEGER PRIMARY KEY AUTOINCREMENT,
        link        TEXT    NOT NULL UNIQUE,
        title       TEXT    NOT NULL,
        first_seen  INTEGER NOT NULL
    );
    CREATE INDEX IF NOT EXISTS idx_news_first_seen ON news (first_seen DESC, id DESC);
";

const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// SQLite-backed [`ItemStorage`].
#[derive(Clone)]
pub struct SqliteStorage {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteStorage {
    /// Open (creating if needed) the database file at `path`.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }

        let conn = Connection::open(path)?;
        conn.busy_timeout(BUSY_TIMEOUT)?;
        let mode: String =
            conn.pragma_update_and_check(None, "journal_mode", "WAL", |row| row.get(0))?;
        log::debug!("Opened {} (journal_mode={})", path.display(), mode);

        Self::from_connection(conn)
    }

    /// Open a private in-memory database.
    pub fn open_in_memory() -> Result<Self> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    fn from_connection(conn: Connection) -> Result<Self> {
        Self::init_schema(&conn)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Create the table and index if they do not exist yet.
    fn init_schema(conn: &Connection) -> Result<()> {
        conn.execute_batch(SCHEMA)?;
        Ok(())
    }

    /// Insert with an explicit `first_seen`.
    ///
    /// [`ItemStorage::insert`] stamps the current time through this.
    pub async fn insert_at(&self, item: &NewsItem, first_seen: DateTime<Utc>) -> Result<bool> {
        let link = item.link.clone();
        let title = item.title.clone();
        let micros = first_seen.timestamp_micros();

        self.with_conn(move |conn| {
            let changed = conn.execute(
                "INSERT INTO news (link, title, first_seen) VALUES (?1, ?2, ?3)
                 ON CONFLICT(link) DO NOTHING",
                params![link, title, micros],
            )?;
            Ok(changed == 1)
        })
        .await
    }

    #[cfg(test)]
    async fn get(&self, link: &str) -> Result<Option<Item>> {
        use rusqlite::OptionalExtension;

        let link = link.to_string();
        self.with_conn(move |conn| {
            let item = conn
                .query_row(
                    "SELECT link, title, first_seen FROM news WHERE link = ?1",
                    params![link],
                    row_to_item,
                )
                .optional()?;
            Ok(item)
        })
        .await
    }

    async fn with_conn<F, T>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&Connection) -> Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let conn = Arc::clone(&self.conn);
        tokio::task::spawn_blocking(move || {
            let guard = conn
                .lock()
                .map_err(|_| AppError::store("connection mutex poisoned"))?;
            f(&guard)
        })
        .await
        .map_err(|e| AppError::store(format!("storage task failed: {e}")))?
    }
}

fn row_to_item(row: &rusqlite::Row<'_>) -> rusqlite::Result<Item> {
    let micros: i64 = row.get(2)?;
    let first_seen = DateTime::<Utc>::from_timestamp_micros(micros)
        .ok_or(rusqlite::Error::IntegralValueOutOfRange(2, micros))?;
    Ok(Item {
        link: row.get(0)?,
        title: row.get(1)?,
        first_seen,
    })
}

#[async_trait]
impl ItemStorage for SqliteStorage {
    async fn insert(&self, item: &NewsItem) -> Result<bool> {
        self.insert_at(item, Utc::now()).await
    }

    async fn query(&self, term: Option<&str>) -> Result<Vec<Item>> {
        let term = term.filter(|t| !t.is_empty()).map(str::to_string);

        self.with_conn(move |conn| {
            let mut stmt = conn.prepare_cached(
                "SELECT link, title, first_seen FROM news
                 WHERE ?1 IS NULL OR instr(title, ?1) > 0
                 ORDER BY first_seen DESC, id DESC",
            )?;
            let items = stmt
                .query_map(params![term], row_to_item)?
                .collect::<rusqlite::Result<Vec<_>>>()?;
            Ok(items)
        })
        .await
    }

    async fn count(&self) -> Result<usize> {
        self.with_conn(|conn| {
            let count: i64 = conn.query_row("SELECT COUNT(*) FROM news", [], |row| row.get(0))?;
            Ok(usize::try_from(count).unwrap_or_default())
        })
        .await
    }
}
