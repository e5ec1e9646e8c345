//! Durable storage for the expense list.
//!
//! The whole list is read and written as a single document on every call. There is no incremental
//! persistence.
//!
//! The document is a JSON object holding the list and the id counter:
//! ```json
//! {
//!   "next_id": 4,
//!   "expenses": [
//!     { "id": 1, "amount": 152.56, "name": "Groceries", "date": "2026-10-19T09:00:00Z" }
//!   ]
//! }
//! ```
//! A bare JSON array of expenses, as written by earlier versions, is still read.

mod json_file;
mod memory;

use crate::error::Res;
use crate::model::{Expense, ExpenseId};
use crate::Result;
use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

pub use json_file::JsonFile;
pub use memory::MemoryStorage;

/// Loads and saves the full list of expenses.
pub trait Storage {
    /// Returns the stored document, or an empty one if nothing has been stored yet.
    ///
    /// A document that exists but cannot be parsed is reported with `ErrorType::Corrupt`.
    fn load(&self) -> Result<Document>;

    /// Replaces the stored document with `expenses` and the id counter `next_id`.
    fn save(&mut self, next_id: Option<ExpenseId>, expenses: &[Expense]) -> Result<()>;

    /// Keeps a copy of the current stored document for later inspection, returning where it went.
    /// Returns `None` when there is nothing to keep or the storage has no place to keep it.
    fn preserve(&mut self) -> Result<Option<PathBuf>>;
}

/// The stored expense list.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct Document {
    /// The lowest id that has never been handed out. `None` in legacy documents and once the id
    /// space is used up.
    #[serde(default)]
    next_id: Option<ExpenseId>,
    expenses: Vec<Expense>,
}

impl Document {
    pub fn new(next_id: Option<ExpenseId>, expenses: Vec<Expense>) -> Self {
        Self { next_id, expenses }
    }

    pub fn next_id(&self) -> Option<ExpenseId> {
        self.next_id
    }

    pub fn expenses(&self) -> &[Expense] {
        &self.expenses
    }

    pub fn into_expenses(self) -> Vec<Expense> {
        self.expenses
    }
}

#[derive(Serialize)]
struct DocumentRef<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    next_id: Option<ExpenseId>,
    expenses: &'a [Expense],
}

/// Parses a stored document, accepting either the current object form or a bare array.
pub(crate) fn parse_document(content: &str) -> Res<Document> {
    if content.trim_start().starts_with('[') {
        let expenses: Vec<Expense> =
            serde_json::from_str(content).context("Unable to parse the expense list")?;
        return Ok(Document::new(None, expenses));
    }
    serde_json::from_str(content).context("Unable to parse the expenses document")
}

pub(crate) fn render_document(
    next_id: Option<ExpenseId>,
    expenses: &[Expense],
    pretty: bool,
) -> Res<String> {
    let document = DocumentRef { next_id, expenses };
    if pretty {
        serde_json::to_string_pretty(&document)
    } else {
        serde_json::to_string(&document)
    }
    .context("Unable to serialize expenses")
}
