// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Download sinks: where a finished document goes.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use quickscan_core::error::{QuickscanError, Result};
use tempfile::NamedTempFile;
use tracing::{debug, info};

/// Receives a finished document under a file name.
pub trait DocumentSink {
    /// Deliver `bytes` as `file_name` and return where it ended up.
    fn deliver(&self, file_name: &str, mime_type: &str, bytes: &[u8]) -> Result<PathBuf>;
}

/// Writes documents into a directory (normally the user's downloads).
///
/// The payload is written to a temporary file next to the target and renamed
/// into place, so a failed write never leaves a truncated document behind and
/// the temporary file is removed on every path.
#[derive(Debug, Clone)]
pub struct DirectorySink {
    dir: PathBuf,
}

impl DirectorySink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

impl DocumentSink for DirectorySink {
    fn deliver(&self, file_name: &str, mime_type: &str, bytes: &[u8]) -> Result<PathBuf> {
        validate_file_name(file_name)?;
        std::fs::create_dir_all(&self.dir)?;

        let mut staging = NamedTempFile::new_in(&self.dir)?;
        debug!(staging = %staging.path().display(), "staging download");
        staging.write_all(bytes)?;
        staging.as_file().sync_all()?;

        let target = self.dir.join(file_name);
        staging
            .persist(&target)
            .map_err(|err| QuickscanError::Io(err.error))?;

        info!(path = %target.display(), mime_type, bytes = bytes.len(), "document saved");
        Ok(target)
    }
}

/// A document captured by `MemorySink`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeliveredFile {
    pub name: String,
    pub mime_type: String,
    pub bytes: Vec<u8>,
}

/// Keeps delivered documents in memory. Clones share the same store.
#[derive(Debug, Clone, Default)]
pub struct MemorySink {
    files: Arc<Mutex<Vec<DeliveredFile>>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Everything delivered so far, oldest first.
    pub fn files(&self) -> Vec<DeliveredFile> {
        self.files.lock().map(|f| f.clone()).unwrap_or_default()
    }
}

impl DocumentSink for MemorySink {
    fn deliver(&self, file_name: &str, mime_type: &str, bytes: &[u8]) -> Result<PathBuf> {
        validate_file_name(file_name)?;
        if let Ok(mut files) = self.files.lock() {
            files.push(DeliveredFile {
                name: file_name.to_string(),
                mime_type: mime_type.to_string(),
                bytes: bytes.to_vec(),
            });
        }
        Ok(PathBuf::from(file_name))
    }
}

/// Only bare file names are accepted; directories come from the sink.
fn validate_file_name(file_name: &str) -> Result<()> {
    let bare = Path::new(file_name)
        .file_name()
        .is_some_and(|name| name == file_name);
    if file_name.is_empty() || !bare || file_name.contains(['/', '\\']) {
        return Err(QuickscanError::Io(std::io::Error::new(
            std::io::ErrorKind::InvalidInput,
            format!("not a plain file name: {file_name:?}"),
        )));
    }
    Ok(())
}
