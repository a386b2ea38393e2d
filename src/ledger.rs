//! Processing ledger.
//!
//! A persisted mapping from input filename to the output it produced, used to
//! skip inputs that were already processed. The ledger is read fully before
//! each check and rewritten fully after each successful update; concurrent
//! writers are not supported and must be serialized by the caller.
//!
//! Entries are keyed by the input's base filename only, so two same-named
//! inputs in different directories collide. This matches the original data
//! on disk and is kept deliberately.

use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::debug;

/// One ledger entry: where the output went and when.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LedgerEntry {
    pub output_path: String,
    pub processed_date: String,
}

/// Result of checking an input against the ledger.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LedgerCheck {
    /// No entry for this filename; process it.
    NotProcessed,
    /// Entry exists and the output file is still on disk; skip.
    Processed { output_path: String },
    /// Entry exists but the output file is missing; reprocess.
    Stale { output_path: String },
}

/// Persisted processing ledger.
pub struct ProcessingLedger {
    path: PathBuf,
}

impl ProcessingLedger {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the full ledger. A missing or unparsable file yields an empty
    /// map; any other read failure is surfaced, since rewriting on top of an
    /// unreadable ledger would discard its entries.
    pub fn load(&self) -> Result<BTreeMap<String, LedgerEntry>> {
        let content = match std::fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(BTreeMap::new()),
            Err(e) => return Err(e.into()),
        };
        Ok(serde_json::from_str(&content).unwrap_or_else(|e| {
            debug!("Ledger at {} is unparsable ({}), starting fresh", self.path.display(), e);
            BTreeMap::new()
        }))
    }

    /// Check whether the input (by base filename) was already processed.
    pub fn check(&self, input_filename: &str) -> Result<LedgerCheck> {
        let entries = self.load()?;
        let check = match entries.get(input_filename) {
            None => LedgerCheck::NotProcessed,
            Some(entry) => {
                if Path::new(&entry.output_path).exists() {
                    LedgerCheck::Processed {
                        output_path: entry.output_path.clone(),
                    }
                } else {
                    LedgerCheck::Stale {
                        output_path: entry.output_path.clone(),
                    }
                }
            }
        };
        Ok(check)
    }

    /// Record a successful transformation, rewriting the entire ledger file.
    ///
    /// Overwrites any existing entry for the same filename (the stale case).
    pub fn record_success(&self, input_filename: &str, output_path: &str) -> Result<()> {
        let mut entries = self.load()?;
        entries.insert(
            input_filename.to_string(),
            LedgerEntry {
                output_path: output_path.to_string(),
                processed_date: chrono::Local::now().to_string(),
            },
        );

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let content = serde_json::to_string_pretty(&entries)?;
        std::fs::write(&self.path, content)?;
        Ok(())
    }
}
