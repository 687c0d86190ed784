//! JSON export/import of the journal.
//!
//! The export carries a format version, the export time and the entries
//! oldest-first. Import appends as one batch, skipping entries whose
//! `(timestamp, text)` already exist so re-importing a file is a no-op.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use coherence_core::{Entry, now_unix_ms, unix_ms_to_iso8601};

use crate::error::{Result, StoreError};
use crate::store::Store;

pub const EXPORT_VERSION: &str = "1";

#[derive(Serialize, Deserialize, Debug)]
pub struct JournalExport {
    pub version: String,
    #[serde(rename = "exportedAt", default)]
    pub exported_at: String,
    pub entries: Vec<Entry>,
}

impl Store {
    /// Export the journal as a JSON string.
    pub fn export_json_string(&self) -> Result<String> {
        let export = JournalExport {
            version: EXPORT_VERSION.to_string(),
            exported_at: unix_ms_to_iso8601(now_unix_ms()),
            entries: self.snapshot()?,
        };
        serde_json::to_string_pretty(&export)
            .map_err(|e| StoreError::InvalidData(format!("JSON export failed: {e}")))
    }

    /// Export the journal to a JSON file.
    pub fn export_json_file(&self, path: &Path) -> Result<()> {
        let json = self.export_json_string()?;
        fs::write(path, json).map_err(|e| {
            StoreError::InvalidData(format!("failed to write {}: {e}", path.display()))
        })
    }

    /// Import entries from a JSON export string. Returns the entries that
    /// were actually appended.
    pub fn import_json_str(&mut self, json: &str) -> Result<Vec<Entry>> {
        let export: JournalExport = serde_json::from_str(json)
            .map_err(|e| StoreError::InvalidData(format!("invalid JSON: {e}")))?;
        if export.version != EXPORT_VERSION {
            return Err(StoreError::InvalidData(format!(
                "unsupported export version '{}'",
                export.version
            )));
        }

        let mut incoming = export.entries;
        incoming.sort_by_key(|e| e.id);

        let mut fresh = Vec::with_capacity(incoming.len());
        for entry in incoming {
            if !self.contains(&entry)? {
                fresh.push((entry.text, entry.timestamp));
            }
        }
        let appended = self.append_batch(&fresh)?;
        tracing::info!("imported {} new entries", appended.len());
        Ok(appended)
    }

    /// Import entries from a JSON export file.
    pub fn import_json_file(&mut self, path: &Path) -> Result<Vec<Entry>> {
        let json = fs::read_to_string(path).map_err(|e| {
            StoreError::InvalidData(format!("failed to read {}: {e}", path.display()))
        })?;
        self.import_json_str(&json)
    }

    fn contains(&self, entry: &Entry) -> Result<bool> {
        let found: i64 = self.conn().query_row(
            "SELECT COUNT(*) FROM entries WHERE timestamp = ?1 AND text = ?2",
            rusqlite::params![entry.timestamp, entry.text],
            |row| row.get(0),
        )?;
        Ok(found > 0)
    }
}
