use std::path::{Path, PathBuf};
use std::{env, fmt};

use rusqlite::{Connection, params};

use coherence_core::{Entry, now_unix_ms};

use crate::error::{Result, StoreError};
use crate::schema;

/// File name of the journal database inside the data directory.
pub const JOURNAL_FILE: &str = "journal.db";

/// Change callback. Receives the full oldest-first snapshot after an append.
pub type Listener = Box<dyn FnMut(&[Entry]) + Send>;

/// Default base directory for all coherence storage.
pub fn default_base_dir() -> PathBuf {
    dirs_home().join(".coherence")
}

fn dirs_home() -> PathBuf {
    env::var("HOME")
        .or_else(|_| env::var("USERPROFILE"))
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("."))
}

/// Append-only journal.
///
/// Entry ids are strictly increasing: a new entry takes its creation time in
/// epoch ms as id, or `last_id + 1` when that would not be larger. Every
/// successful append notifies subscribed listeners once with the new
/// snapshot, batches included.
pub struct Store {
    conn: Connection,
    listeners: Vec<Listener>,
}

impl fmt::Debug for Store {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Store")
            .field("listeners", &self.listeners.len())
            .finish_non_exhaustive()
    }
}

impl Store {
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)?;
        }
        let conn = Connection::open(path)?;
        schema::initialize(&conn)?;
        tracing::info!("opened journal at {}", path.display());
        Ok(Self {
            conn,
            listeners: Vec::new(),
        })
    }

    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        schema::initialize(&conn)?;
        Ok(Self {
            conn,
            listeners: Vec::new(),
        })
    }

    pub fn conn(&self) -> &Connection {
        &self.conn
    }

    /// Register a change listener. Listeners run synchronously, in
    /// registration order, after the append has committed.
    pub fn subscribe(&mut self, listener: impl FnMut(&[Entry]) + Send + 'static) {
        self.listeners.push(Box::new(listener));
    }

    // --- Append ---

    /// Append one entry stamped with the current time.
    pub fn append(&mut self, text: &str) -> Result<Entry> {
        self.append_at(text, now_unix_ms())
    }

    /// Append one entry with an explicit timestamp.
    pub fn append_at(&mut self, text: &str, timestamp: i64) -> Result<Entry> {
        let entry = {
            let tx = self.conn.unchecked_transaction()?;
            let id = next_id(&tx, timestamp)?;
            insert_on(&tx, id, text, timestamp)?;
            tx.commit()?;
            Entry::new(id, text, timestamp)
        };
        tracing::debug!(id = entry.id, "appended entry");
        self.notify()?;
        Ok(entry)
    }

    /// Append several `(text, timestamp)` pairs atomically, in order.
    /// Listeners see one notification for the whole batch.
    pub fn append_batch<S: AsRef<str>>(&mut self, items: &[(S, i64)]) -> Result<Vec<Entry>> {
        if items.is_empty() {
            return Ok(Vec::new());
        }

        let appended = {
            let tx = self.conn.unchecked_transaction()?;
            let mut appended = Vec::with_capacity(items.len());
            for (text, timestamp) in items {
                let text = text.as_ref();
                let id = next_id(&tx, *timestamp)?;
                insert_on(&tx, id, text, *timestamp)?;
                appended.push(Entry::new(id, text, *timestamp));
            }
            tx.commit()?;
            appended
        };
        tracing::debug!(count = appended.len(), "appended entry batch");
        self.notify()?;
        Ok(appended)
    }

    fn notify(&mut self) -> Result<()> {
        if self.listeners.is_empty() {
            return Ok(());
        }
        let snapshot = self.snapshot()?;
        for listener in &mut self.listeners {
            listener(&snapshot);
        }
        Ok(())
    }

    // --- Read ---

    /// All entries, oldest first.
    pub fn snapshot(&self) -> Result<Vec<Entry>> {
        let mut stmt = self
            .conn
            .prepare("SELECT id, text, timestamp FROM entries ORDER BY id")?;
        let entries = stmt
            .query_map([], |row| {
                Ok(Entry::new(
                    row.get::<_, i64>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, i64>(2)?,
                ))
            })?
            .collect::<std::result::Result<_, _>>()?;
        Ok(entries)
    }

    /// The newest `limit` entries, oldest first.
    pub fn tail(&self, limit: usize) -> Result<Vec<Entry>> {
        let limit = i64::try_from(limit)
            .map_err(|_| StoreError::InvalidData(format!("limit too large: {limit}")))?;
        let mut stmt = self.conn.prepare(
            "SELECT id, text, timestamp FROM (
                 SELECT id, text, timestamp FROM entries ORDER BY id DESC LIMIT ?1
             ) ORDER BY id",
        )?;
        let entries = stmt
            .query_map([limit], |row| {
                Ok(Entry::new(row.get(0)?, row.get::<_, String>(1)?, row.get(2)?))
            })?
            .collect::<std::result::Result<_, _>>()?;
        Ok(entries)
    }

    pub fn len(&self) -> Result<usize> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM entries", [], |row| row.get(0))?;
        Ok(count as usize)
    }

    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.len()? == 0)
    }

    /// Flush the WAL into the main database file.
    pub fn checkpoint_truncate(&self) -> Result<()> {
        self.conn.execute_batch("PRAGMA wal_checkpoint(TRUNCATE);")?;
        Ok(())
    }
}

impl Drop for Store {
    fn drop(&mut self) {
        if let Err(e) = self.checkpoint_truncate() {
            tracing::debug!("WAL checkpoint on close failed: {e}");
        }
    }
}

fn next_id(conn: &Connection, timestamp: i64) -> Result<i64> {
    let last: Option<i64> = conn.query_row("SELECT MAX(id) FROM entries", [], |row| row.get(0))?;
    Ok(match last {
        Some(last) if timestamp <= last => last + 1,
        _ => timestamp,
    })
}

fn insert_on(conn: &Connection, id: i64, text: &str, timestamp: i64) -> Result<()> {
    conn.execute(
        "INSERT INTO entries (id, text, timestamp) VALUES (?1, ?2, ?3)",
        params![id, text, timestamp],
    )?;
    Ok(())
}
