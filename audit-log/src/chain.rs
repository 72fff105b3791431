//! Hash-chained audit log implementation

use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use tracing::debug;

use crate::error::{AuditError, Result};
use crate::types::{AuditKind, AuditRecord, AuditSink};

struct ChainState {
    records: Vec<AuditRecord>,
    last_hash: String,
    file: Option<File>,
}

/// Append-only audit log with a SHA-256 hash chain.
///
/// Runs fully in memory by default; `with_file` additionally appends every
/// record as one JSON line so the chain survives the process.
pub struct HashChainLog {
    state: Mutex<ChainState>,
    path: Option<PathBuf>,
}

impl HashChainLog {
    /// Create an in-memory log.
    pub fn in_memory() -> Self {
        Self {
            state: Mutex::new(ChainState {
                records: Vec::new(),
                last_hash: String::new(),
                file: None,
            }),
            path: None,
        }
    }

    /// Create a file-backed log, resuming the chain from existing records.
    pub fn with_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let records = Self::load_records(&path)?;
        let last_hash = records.last().map(|r| r.hash.clone()).unwrap_or_default();

        let file = OpenOptions::new().create(true).append(true).open(&path)?;

        Ok(Self {
            state: Mutex::new(ChainState {
                records,
                last_hash,
                file: Some(file),
            }),
            path: Some(path),
        })
    }

    fn load_records(path: &Path) -> Result<Vec<AuditRecord>> {
        if !path.exists() {
            return Ok(Vec::new());
        }
        let reader = BufReader::new(File::open(path)?);
        let mut records = Vec::new();
        for line in reader.lines() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            let record: AuditRecord = serde_json::from_str(&line)
                .map_err(|e| AuditError::Serialization(e.to_string()))?;
            records.push(record);
        }
        Ok(records)
    }

    /// Number of records in the chain.
    pub fn len(&self) -> usize {
        self.state.lock().records.len()
    }

    /// True when nothing has been appended yet.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Clone of the full chain, oldest first.
    pub fn records(&self) -> Vec<AuditRecord> {
        self.state.lock().records.clone()
    }

    /// Records matching the given filters, oldest first.
    pub fn search(
        &self,
        kind: Option<AuditKind>,
        actor: Option<&str>,
        since: Option<DateTime<Utc>>,
    ) -> Vec<AuditRecord> {
        self.state
            .lock()
            .records
            .iter()
            .filter(|r| kind.map_or(true, |k| r.kind == k))
            .filter(|r| actor.map_or(true, |a| r.actor == a))
            .filter(|r| since.map_or(true, |s| r.recorded_at >= s))
            .cloned()
            .collect()
    }

    /// Recompute the whole chain and verify every link.
    ///
    /// Returns `Ok(())` for an intact chain; an `IntegrityFailure` names the
    /// first record where either the content hash or the link is broken.
    pub fn verify_integrity(&self) -> Result<()> {
        let state = self.state.lock();
        let mut previous_hash = String::new();
        for (i, record) in state.records.iter().enumerate() {
            if !record.verify_hash() {
                return Err(AuditError::IntegrityFailure(format!(
                    "record hash mismatch at index {}",
                    i
                )));
            }
            if record.previous_hash != previous_hash {
                return Err(AuditError::IntegrityFailure(format!(
                    "hash chain broken at index {}",
                    i
                )));
            }
            previous_hash = record.hash.clone();
        }
        Ok(())
    }
}

impl AuditSink for HashChainLog {
    fn append(
        &self,
        kind: AuditKind,
        actor: &str,
        detail: serde_json::Value,
    ) -> Result<AuditRecord> {
        let mut state = self.state.lock();

        let record = AuditRecord::new(kind, actor, detail, state.last_hash.clone());

        if let Some(file) = state.file.as_mut() {
            let mut line = serde_json::to_string(&record)
                .map_err(|e| AuditError::Serialization(e.to_string()))?;
            line.push('\n');
            file.write_all(line.as_bytes())?;
            file.flush()?;
        }

        state.last_hash = record.hash.clone();
        state.records.push(record.clone());

        debug!(kind = ?kind, actor, path = ?self.path, "audit record appended");
        Ok(record)
    }
}
