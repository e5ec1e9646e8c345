//! Implements the `Storage` trait with a JSON document on disk.

use crate::backup::{Backup, CORRUPT, EXPENSES};
use crate::error::{ErrorType, IntoResult};
use crate::model::{Expense, ExpenseId};
use crate::storage::{parse_document, render_document, Document, Storage};
use crate::{utils, Result};
use anyhow::Context;
use std::ffi::OsString;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::{debug, trace, warn};

/// Stores the expense list as a pretty-printed JSON document at `path`.
///
/// Saving writes a sibling `.tmp` file and renames it over `path`, so the file on disk always
/// holds either the previous or the new list in full. When a `Backup` is attached, the previous
/// file is copied into the backups directory before it is replaced.
#[derive(Debug, Clone)]
pub struct JsonFile {
    path: PathBuf,
    backup: Option<Backup>,
}

impl JsonFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            backup: None,
        }
    }

    pub fn with_backup(mut self, backup: Backup) -> Self {
        self.backup = Some(backup);
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn sibling(&self, suffix: &str) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(OsString::from)
            .unwrap_or_else(|| OsString::from("expenses.json"));
        name.push(suffix);
        self.path.with_file_name(name)
    }
}

impl Storage for JsonFile {
    fn load(&self) -> Result<Document> {
        let content = match std::fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!("No data file at {}, starting empty", self.path.display());
                return Ok(Document::default());
            }
            Err(e) => {
                return Err(e)
                    .with_context(|| format!("Failed to read file at {}", self.path.display()))
                    .pub_result(ErrorType::Storage)
            }
        };
        let document = parse_document(&content)
            .with_context(|| format!("Failed to parse expenses file at {}", self.path.display()))
            .pub_result(ErrorType::Corrupt)?;
        trace!(
            "Loaded {} expenses from {}",
            document.expenses().len(),
            self.path.display()
        );
        Ok(document)
    }

    fn save(&mut self, next_id: Option<ExpenseId>, expenses: &[Expense]) -> Result<()> {
        let json = render_document(next_id, expenses, true).pub_result(ErrorType::Internal)?;

        if let Some(backup) = &self.backup {
            if self.path.is_file() {
                match backup.snapshot(EXPENSES, &self.path) {
                    Ok(Some(copy)) => trace!("Saved backup to {}", copy.display()),
                    Ok(None) => {}
                    Err(e) => warn!("Unable to back up {}: {e:#}", self.path.display()),
                }
            }
        }

        let tmp = self.sibling(".tmp");
        utils::write(&tmp, json)
            .and_then(|_| utils::rename(&tmp, &self.path))
            .with_context(|| format!("Changes not saved to {}", self.path.display()))
            .pub_result(ErrorType::Storage)?;
        debug!("Saved {} expenses to {}", expenses.len(), self.path.display());
        Ok(())
    }

    fn preserve(&mut self) -> Result<Option<PathBuf>> {
        if !self.path.is_file() {
            return Ok(None);
        }
        let kept = match &self.backup {
            Some(backup) => backup.keep(CORRUPT, &self.path),
            None => {
                let copy = self.sibling(".corrupt");
                utils::copy(&self.path, &copy).map(|_| copy)
            }
        }
        .pub_result(ErrorType::Storage)?;
        Ok(Some(kept))
    }
}
