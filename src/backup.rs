//! Backup management for copies of the data file.

use crate::error::Res;
use crate::utils;
use anyhow::Context;
use chrono::Local;
use std::path::{Path, PathBuf};

/// Prefix for copies of the data file taken before it is replaced.
pub const EXPENSES: &str = "expenses";

/// Prefix for data files that could not be parsed.
pub const CORRUPT: &str = "corrupt";

const EXTENSION: &str = "json";

/// Manages backup file creation and rotation.
///
/// The `Backup` struct is immutable and owns copies of the paths and settings it needs.
/// Create a new instance via `Config::backup()` or `Backup::new()`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Backup {
    backups_dir: PathBuf,
    backup_copies: u32,
}

impl Backup {
    pub fn new(backups_dir: impl Into<PathBuf>, backup_copies: u32) -> Self {
        Self {
            backups_dir: backups_dir.into(),
            backup_copies,
        }
    }

    pub fn backups_dir(&self) -> &Path {
        &self.backups_dir
    }

    pub fn backup_copies(&self) -> u32 {
        self.backup_copies
    }

    /// Copies `source` into the backups directory and rotates old copies, keeping only
    /// `backup_copies` files with this prefix. Does nothing when `backup_copies` is zero.
    ///
    /// The filename format is `{prefix}.YYYY-MM-DD-NNN.json` where NNN is a sequence number.
    pub fn snapshot(&self, prefix: &str, source: &Path) -> Res<Option<PathBuf>> {
        if self.backup_copies == 0 {
            return Ok(None);
        }
        let path = self.copy_in(prefix, source)?;
        self.rotate(prefix)?;
        Ok(Some(path))
    }

    /// Copies `source` into the backups directory without rotation, so the copy is never removed
    /// automatically.
    pub fn keep(&self, prefix: &str, source: &Path) -> Res<PathBuf> {
        self.copy_in(prefix, source)
    }

    fn copy_in(&self, prefix: &str, source: &Path) -> Res<PathBuf> {
        let date = today();
        let seq = self.next_sequence_number(prefix, &date)?;
        let filename = format!("{prefix}.{date}-{seq:03}.{EXTENSION}");
        let path = self.backups_dir.join(&filename);
        utils::copy(source, &path)?;
        Ok(path)
    }

    /// Scans the backups directory for existing files with the given prefix and date,
    /// and returns the next sequence number.
    fn next_sequence_number(&self, prefix: &str, date: &str) -> Res<u32> {
        let mut max_seq: u32 = 0;
        for entry in utils::read_dir(&self.backups_dir)? {
            let entry = entry.context("Failed to read directory entry")?;
            let file_name = entry.file_name();
            let name = file_name.to_string_lossy();
            if let Some(seq) = parse_sequence_number(&name, prefix, date) {
                max_seq = max_seq.max(seq);
            }
        }
        Ok(max_seq + 1)
    }

    /// Rotates old backup files, keeping only `backup_copies` files with the given prefix.
    fn rotate(&self, prefix: &str) -> Res<()> {
        let mut files: Vec<(PathBuf, String)> = Vec::new();
        for entry in utils::read_dir(&self.backups_dir)? {
            let entry = entry.context("Failed to read directory entry")?;
            let name = entry.file_name().to_string_lossy().to_string();
            if is_backup_file(&name, prefix) {
                files.push((entry.path(), name));
            }
        }

        // Sort by filename (which sorts by date and sequence number due to format)
        files.sort_by(|a, b| a.1.cmp(&b.1));

        let to_delete = files.len().saturating_sub(self.backup_copies as usize);
        for (path, _) in files.into_iter().take(to_delete) {
            utils::remove(&path)?;
        }
        Ok(())
    }
}

/// Returns today's date in YYYY-MM-DD format.
fn today() -> String {
    Local::now().format("%Y-%m-%d").to_string()
}

/// Parses the sequence number from a backup filename.
/// Returns None if the filename doesn't match the expected pattern.
fn parse_sequence_number(filename: &str, prefix: &str, date: &str) -> Option<u32> {
    let remainder = filename.strip_prefix(&format!("{prefix}.{date}-"))?;
    remainder
        .strip_suffix(&format!(".{EXTENSION}"))?
        .parse()
        .ok()
}

/// Checks if a filename is a backup file with the given prefix.
fn is_backup_file(filename: &str, prefix: &str) -> bool {
    filename.starts_with(&format!("{prefix}.")) && filename.ends_with(&format!(".{EXTENSION}"))
}
