//! SD card journal adapter.
//!
//! Implements [`LogPort`] as an append-only text file on the FAT volume
//! (mounted through ESP-IDF VFS, so plain `std::fs` works on both targets).
//! A new file starts with a banner carrying the timestamp of its first
//! entry.

use std::fs::{File, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use log::{info, warn};

use crate::app::ports::LogPort;
use crate::clock::UNSET_TIMESTAMP;
use crate::error::IoError;

pub const JOURNAL_FILE: &str = "logs.txt";

const BANNER: &str = "===== VAPOR SYSTEM LOG FILE =====";
const RULE: &str = "====================================";

fn map_err(e: &std::io::Error) -> IoError {
    match e.kind() {
        ErrorKind::NotFound => IoError::NotFound,
        _ => IoError::WriteFailed,
    }
}

/// Timestamp between the leading brackets of a journal line.
fn line_timestamp(line: &str) -> &str {
    line.strip_prefix('[')
        .and_then(|rest| rest.split_once(']'))
        .map_or(UNSET_TIMESTAMP, |(ts, _)| ts)
}

pub struct SdJournal {
    path: PathBuf,
}

impl SdJournal {
    /// Journal at `<mount_point>/logs.txt`.
    pub fn new(mount_point: impl AsRef<Path>) -> Self {
        Self {
            path: mount_point.as_ref().join(JOURNAL_FILE),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn create(&self, first_line: &str) -> std::io::Result<File> {
        let mut file = OpenOptions::new()
            .create_new(true)
            .append(true)
            .open(&self.path)?;
        writeln!(file, "{}", BANNER)?;
        writeln!(file, "Created: {}", line_timestamp(first_line))?;
        writeln!(file, "{}", RULE)?;
        info!("Journal created at {}", self.path.display());
        Ok(file)
    }
}

impl LogPort for SdJournal {
    fn append(&mut self, line: &str) -> Result<(), IoError> {
        let opened = match OpenOptions::new().append(true).open(&self.path) {
            Err(e) if e.kind() == ErrorKind::NotFound => self.create(line),
            other => other,
        };
        let mut file = opened.map_err(|e| {
            warn!("Journal open failed: {}", e);
            map_err(&e)
        })?;
        writeln!(file, "{}", line).map_err(|e| map_err(&e))
    }
}
