//! Implements the `Storage` trait in memory.
//!
//! The document is kept as serialized JSON so that a `Ledger` backed by this storage goes through
//! the same serialization as one backed by a `JsonFile`.

use crate::error::{ErrorType, IntoResult};
use crate::model::{Expense, ExpenseId};
use crate::storage::{parse_document, render_document, Document, Storage};
use crate::Result;
use anyhow::{anyhow, Context};
use std::path::PathBuf;

/// An implementation of `Storage` that holds the document in memory. It can be told to fail
/// writes, which is how callers exercise the unsaved-changes path.
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    document: Option<String>,
    preserved: Vec<String>,
    fail_writes: bool,
    saves: usize,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts with `document` as the stored content, which need not be valid.
    pub fn with_document(document: impl Into<String>) -> Self {
        Self {
            document: Some(document.into()),
            ..Self::default()
        }
    }

    /// When `fail` is true, every `save` returns a storage error and leaves the document alone.
    pub fn set_fail_writes(&mut self, fail: bool) {
        self.fail_writes = fail;
    }

    pub fn document(&self) -> Option<&str> {
        self.document.as_deref()
    }

    /// Documents set aside by `preserve`.
    pub fn preserved(&self) -> &[String] {
        &self.preserved
    }

    /// The number of successful saves.
    pub fn saves(&self) -> usize {
        self.saves
    }
}

impl Storage for MemoryStorage {
    fn load(&self) -> Result<Document> {
        match &self.document {
            None => Ok(Document::default()),
            Some(document) => parse_document(document)
                .context("Failed to parse in-memory expenses document")
                .pub_result(ErrorType::Corrupt),
        }
    }

    fn save(&mut self, next_id: Option<ExpenseId>, expenses: &[Expense]) -> Result<()> {
        if self.fail_writes {
            return Err(anyhow!("Changes not saved: storage is unwritable"))
                .pub_result(ErrorType::Storage);
        }
        let document =
            render_document(next_id, expenses, false).pub_result(ErrorType::Internal)?;
        self.document = Some(document);
        self.saves += 1;
        Ok(())
    }

    fn preserve(&mut self) -> Result<Option<PathBuf>> {
        if let Some(document) = &self.document {
            self.preserved.push(document.clone());
        }
        Ok(None)
    }
}
