//! Durable, append-only progress ledger.
//!
//! The ledger is the only state that survives a run. It is a plain
//! UTF-8 text file, one identifier per line, never compacted or edited
//! in place. [`ProgressLedger::load`] collapses duplicate lines into a
//! set, so re-recording an identifier is harmless, and
//! [`ProgressLedger::record`] does not return until the line has been
//! flushed and synced - a fresh process that loads the same file
//! afterwards is guaranteed to see it.
//!
//! Each logical ledger purpose (per destination account, per migration
//! type) gets its own file; the path is injected at construction, there
//! is no process-wide default.

use std::collections::HashSet;
use std::fs::{self, File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::error::LedgerError;

/// Append-only record of already-processed item identifiers.
#[derive(Debug)]
pub struct ProgressLedger {
    path: PathBuf,
    writer: BufWriter<File>,
}

impl ProgressLedger {
    /// Open (or create) the ledger at `path` for appending.
    ///
    /// Parent directories are created as needed. The file is only ever
    /// opened in append mode; existing entries are never touched.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::OpenFailed`] if the file cannot be
    /// created or opened.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, LedgerError> {
        let path = path.into();

        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent).map_err(|e| LedgerError::OpenFailed {
                path: path.clone(),
                reason: e.to_string(),
            })?;
        }

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .map_err(|e| LedgerError::OpenFailed {
                path: path.clone(),
                reason: e.to_string(),
            })?;

        debug!(path = %path.display(), "opened progress ledger");
        Ok(Self {
            path,
            writer: BufWriter::new(file),
        })
    }

    /// Path of the backing file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reconstruct the processed set from the full log.
    ///
    /// A missing file is an empty set, never an error. Duplicate lines
    /// collapse; blank lines are ignored.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::ReadFailed`] if the file exists but
    /// cannot be read.
    pub fn load(&self) -> Result<HashSet<String>, LedgerError> {
        let contents = match fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(HashSet::new()),
            Err(e) => {
                return Err(LedgerError::ReadFailed {
                    path: self.path.clone(),
                    reason: e.to_string(),
                });
            }
        };

        let set: HashSet<String> = contents
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(String::from)
            .collect();

        info!(
            path = %self.path.display(),
            entries = set.len(),
            "loaded progress ledger"
        );
        Ok(set)
    }

    /// Durably append one identifier.
    ///
    /// The entry is written, flushed, and synced to disk before this
    /// returns. Recording the same identifier twice is harmless.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::AppendFailed`] if the write, flush, or
    /// sync fails.
    pub fn record(&mut self, identifier: &str) -> Result<(), LedgerError> {
        let append_err = |e: std::io::Error| LedgerError::AppendFailed {
            path: self.path.clone(),
            reason: e.to_string(),
        };

        writeln!(self.writer, "{identifier}").map_err(append_err)?;
        self.writer.flush().map_err(append_err)?;
        self.writer.get_ref().sync_data().map_err(append_err)?;

        debug!(identifier, "recorded ledger entry");
        Ok(())
    }
}
