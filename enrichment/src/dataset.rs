use std::collections::HashMap;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde_json::Value;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DatasetError {
    #[error("failed to read dataset file {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse dataset file {path}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
}

/// Read-only record lookup shared by the request handlers.
pub trait RecordStore: Send + Sync {
    /// Resolve a record by exact transaction id, falling back to the most
    /// recent record for the given email.
    fn find(&self, transaction_id: &str, email: &str) -> Option<&Value>;

    fn count(&self) -> usize;

    /// Where the records came from, for diagnostics.
    fn source(&self) -> &str;
}

/// In-memory store over a JSON dataset file. Write-once on load, read-only
/// afterwards, so handlers can share it without synchronization.
pub struct DatasetStore {
    source: String,
    by_txid: HashMap<String, Value>,
    email_index: HashMap<String, Vec<String>>,
}

impl DatasetStore {
    /// Load records from a JSON file holding an array of record objects.
    /// A missing file yields an empty store; an unreadable or malformed file
    /// is an error the caller treats as startup-fatal.
    pub async fn load(path: impl AsRef<Path>) -> Result<Self, DatasetError> {
        let path = path.as_ref();
        let source = path.display().to_string();

        if !path.exists() {
            tracing::warn!(path = %source, "dataset file not found, starting with an empty store");
            return Ok(Self::from_rows(Vec::new(), source));
        }

        let raw = tokio::fs::read_to_string(path)
            .await
            .map_err(|source| DatasetError::Io {
                path: path.to_path_buf(),
                source,
            })?;
        let rows: Vec<Value> = serde_json::from_str(&raw).map_err(|source| DatasetError::Parse {
            path: path.to_path_buf(),
            source,
        })?;

        Ok(Self::from_rows(rows, source))
    }

    /// Build the primary and secondary indexes from raw record rows.
    /// Rows without a transaction id are skipped; duplicate ids
    /// last-write-wins.
    pub fn from_rows(rows: Vec<Value>, source: String) -> Self {
        let mut by_txid = HashMap::new();
        let mut email_index: HashMap<String, Vec<String>> = HashMap::new();

        for row in rows {
            let Some(txid) = row
                .pointer("/transaction/transaction_id")
                .and_then(Value::as_str)
            else {
                tracing::warn!("skipping dataset row without a transaction id");
                continue;
            };
            let txid = txid.to_string();

            if let Some(email) = row.pointer("/customer/email").and_then(Value::as_str) {
                let email = normalize_email(email);
                if !email.is_empty() {
                    email_index.entry(email).or_default().push(txid.clone());
                }
            }

            by_txid.insert(txid, row);
        }

        tracing::info!(records = by_txid.len(), source = %source, "dataset store loaded");

        Self {
            source,
            by_txid,
            email_index,
        }
    }
}

impl RecordStore for DatasetStore {
    fn find(&self, transaction_id: &str, email: &str) -> Option<&Value> {
        if let Some(row) = self.by_txid.get(transaction_id) {
            return Some(row);
        }

        let candidates = self.email_index.get(&normalize_email(email))?;

        // Most recent parseable transaction_time wins; unparsable or missing
        // times sort as the oldest possible value. Ties keep the earliest
        // candidate.
        let mut best: Option<(&Value, Option<DateTime<Utc>>)> = None;
        for txid in candidates {
            let Some(row) = self.by_txid.get(txid) else {
                continue;
            };
            let time = transaction_time(row);
            match &best {
                Some((_, best_time)) if time <= *best_time => {}
                _ => best = Some((row, time)),
            }
        }

        best.map(|(row, _)| row)
    }

    fn count(&self) -> usize {
        self.by_txid.len()
    }

    fn source(&self) -> &str {
        &self.source
    }
}

fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

fn transaction_time(row: &Value) -> Option<DateTime<Utc>> {
    let raw = row
        .pointer("/transaction/transaction_time")
        .and_then(Value::as_str)?;
    DateTime::parse_from_rfc3339(raw)
        .ok()
        .map(|t| t.with_timezone(&Utc))
}
