//! The expense store.
//!
//! A `Ledger` owns the in-memory list of expenses and the `Storage` it came from. Every mutation
//! is written through to storage immediately. Readers get the list through `expenses()` and never
//! mutate it directly.

use crate::error::{Error, ErrorType};
use crate::model::{Amount, Expense, ExpenseId};
use crate::storage::{Document, Storage};
use crate::Result;
use anyhow::anyhow;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Describes how a ledger was opened from a document that could not be parsed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Recovery {
    reason: String,
    preserved: Option<PathBuf>,
}

impl Recovery {
    /// Why the stored document was rejected.
    pub fn reason(&self) -> &str {
        &self.reason
    }

    /// Where the rejected document was copied. This is `None` until the first write, and stays
    /// `None` if the storage has no place to keep copies.
    pub fn preserved(&self) -> Option<&Path> {
        self.preserved.as_deref()
    }
}

/// The in-memory expense list backed by a `Storage`.
#[derive(Debug)]
pub struct Ledger<S: Storage> {
    storage: S,
    expenses: Vec<Expense>,
    /// `None` once every id has been handed out.
    next_id: Option<ExpenseId>,
    saved: bool,
    recovery: Option<Recovery>,
    /// The unreadable document still has to be copied aside before it is replaced.
    preserve_pending: bool,
}

impl<S: Storage> Ledger<S> {
    /// Loads the expense list from `storage`.
    ///
    /// A missing document gives an empty ledger. A document that cannot be parsed gives an empty
    /// ledger too, and `recovery()` describes what happened. The unreadable document is left
    /// alone until the first write, which copies it aside with `Storage::preserve` before
    /// replacing it. Any other load error is returned.
    ///
    /// Records without an id, or with an id already used by an earlier record, are given fresh
    /// ids in list order.
    ///
    /// # Errors
    /// `ErrorType::Internal` if a record needs a fresh id and none are left.
    pub fn open(storage: S) -> Result<Self> {
        let (document, recovery) = match storage.load() {
            Ok(document) => (document, None),
            Err(e) if e.error_type() == ErrorType::Corrupt => {
                let reason = format!("{e:#}");
                warn!("{reason}. Starting with no expenses");
                let recovery = Recovery {
                    reason,
                    preserved: None,
                };
                (Document::default(), Some(recovery))
            }
            Err(e) => return Err(e),
        };

        let stored_next = document.next_id();
        let loaded = document.into_expenses();
        let max_id = loaded
            .iter()
            .filter_map(|expense| expense.id)
            .max()
            .unwrap_or_default();
        // The stored counter never goes down, even when the expenses holding the highest ids
        // were deleted.
        let mut next_id = match (max_id.next(), stored_next) {
            (Some(after_max), Some(stored)) => Some(after_max.max(stored)),
            (after_max, _) => after_max,
        };

        let mut seen = HashSet::new();
        let mut expenses = Vec::with_capacity(loaded.len());
        for mut expense in loaded {
            match expense.id {
                Some(id) if seen.insert(id) => {}
                _ => {
                    let id = next_id.ok_or_else(ids_exhausted)?;
                    next_id = id.next();
                    debug!("Assigning id {id} to '{}'", expense.name());
                    seen.insert(id);
                    expense.id = Some(id);
                }
            }
            expenses.push(expense);
        }

        let preserve_pending = recovery.is_some();
        Ok(Self {
            storage,
            expenses,
            next_id,
            saved: true,
            recovery,
            preserve_pending,
        })
    }

    /// The expenses in insertion order.
    pub fn expenses(&self) -> &[Expense] {
        &self.expenses
    }

    pub fn get(&self, id: ExpenseId) -> Option<&Expense> {
        self.expenses.iter().find(|expense| expense.id() == id)
    }

    pub fn len(&self) -> usize {
        self.expenses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.expenses.is_empty()
    }

    /// False after a write failed and until a later write succeeds.
    pub fn is_saved(&self) -> bool {
        self.saved
    }

    /// `Some` when the stored document was unreadable and the ledger started empty.
    pub fn recovery(&self) -> Option<&Recovery> {
        self.recovery.as_ref()
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    pub fn storage_mut(&mut self) -> &mut S {
        &mut self.storage
    }

    pub fn into_storage(self) -> S {
        self.storage
    }

    /// Appends a new expense with a fresh id and writes the list.
    ///
    /// # Errors
    /// - `ErrorType::Request` if `name` is blank. Nothing changes.
    /// - `ErrorType::Internal` if no ids are left. Nothing changes.
    /// - `ErrorType::Storage` if the write fails. The expense stays in memory, `is_saved()` turns
    ///   false and `flush()` can retry.
    pub fn add(&mut self, amount: Amount, name: &str, timestamp: DateTime<Utc>) -> Result<Expense> {
        let name = validate_name(name)?;
        let id = self.next_id.ok_or_else(ids_exhausted)?;
        let expense = Expense::new(id, amount, name, timestamp);
        self.next_id = id.next();
        self.expenses.push(expense.clone());
        debug!("Added expense {id} '{}'", expense.name());
        self.persist()?;
        Ok(expense)
    }

    /// Replaces the expense with `id` by one with the new amount and name, keeping its id and
    /// timestamp, and writes the list. Returns the replacement, or `None` without writing anything
    /// if no expense has that id.
    ///
    /// # Errors
    /// Same as `add`.
    pub fn update(&mut self, id: ExpenseId, amount: Amount, name: &str) -> Result<Option<Expense>> {
        let name = validate_name(name)?;
        let Some(slot) = self.expenses.iter_mut().find(|expense| expense.id() == id) else {
            debug!("No expense with id {id} to update");
            return Ok(None);
        };
        let replacement = slot.with_changes(amount, name);
        *slot = replacement.clone();
        debug!("Updated expense {id}");
        self.persist()?;
        Ok(Some(replacement))
    }

    /// Removes the expense with `id` and writes the list. Returns the removed expense, or `None`
    /// without writing anything if no expense has that id.
    ///
    /// # Errors
    /// `ErrorType::Storage` if the write fails; the expense stays removed in memory.
    pub fn remove(&mut self, id: ExpenseId) -> Result<Option<Expense>> {
        let Some(index) = self.expenses.iter().position(|expense| expense.id() == id) else {
            debug!("No expense with id {id} to remove");
            return Ok(None);
        };
        let removed = self.expenses.remove(index);
        debug!("Removed expense {id}");
        self.persist()?;
        Ok(Some(removed))
    }

    /// Writes the list if an earlier write failed.
    pub fn flush(&mut self) -> Result<()> {
        if self.saved {
            return Ok(());
        }
        self.persist()
    }

    fn persist(&mut self) -> Result<()> {
        let result = self
            .preserve_unreadable()
            .and_then(|()| self.storage.save(self.next_id, &self.expenses));
        match result {
            Ok(()) => {
                self.saved = true;
                Ok(())
            }
            Err(e) => {
                self.saved = false;
                warn!("Changes not saved: {e:#}");
                Err(e)
            }
        }
    }

    /// Copies an unreadable document aside, once, before the first write replaces it.
    fn preserve_unreadable(&mut self) -> Result<()> {
        if !self.preserve_pending {
            return Ok(());
        }
        let preserved = self.storage.preserve()?;
        if let Some(path) = &preserved {
            info!("Copied the unreadable data file to {}", path.display());
        }
        if let Some(recovery) = self.recovery.as_mut() {
            recovery.preserved = preserved;
        }
        self.preserve_pending = false;
        Ok(())
    }
}

fn validate_name(name: &str) -> Result<&str> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(Error::new(
            ErrorType::Request,
            anyhow!("The expense name must not be empty"),
        ));
    }
    Ok(trimmed)
}

fn ids_exhausted() -> Error {
    Error::new(ErrorType::Internal, anyhow!("No expense ids are left"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStorage;
    use chrono::{Duration, TimeZone};

    fn ts(hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 10, 19, hour, 0, 0).unwrap()
    }

    fn amount(s: &str) -> Amount {
        s.parse().unwrap()
    }

    fn ledger_with(names: &[&str]) -> Ledger<MemoryStorage> {
        let mut ledger = Ledger::open(MemoryStorage::new()).unwrap();
        for (i, name) in names.iter().enumerate() {
            ledger.add(amount("10"), name, ts(i as u32)).unwrap();
        }
        ledger
    }

    fn reopen(ledger: Ledger<MemoryStorage>) -> Ledger<MemoryStorage> {
        Ledger::open(ledger.into_storage()).unwrap()
    }

    #[test]
    fn test_open_empty() {
        let ledger = Ledger::open(MemoryStorage::new()).unwrap();
        assert!(ledger.is_empty());
        assert!(ledger.is_saved());
        assert!(ledger.recovery().is_none());
    }

    #[test]
    fn test_add_appends_and_saves() {
        let mut ledger = ledger_with(&[]);
        let a = ledger.add(amount("100.00"), "A", ts(9)).unwrap();
        let b = ledger.add(amount("50.50"), "  B  ", ts(23)).unwrap();
        assert_eq!(a.id(), ExpenseId::new(1));
        assert_eq!(b.id(), ExpenseId::new(2));
        assert_eq!(b.name(), "B");
        assert_eq!(ledger.storage().saves(), 2);

        let names: Vec<&str> = ledger.expenses().iter().map(|e| e.name()).collect();
        assert_eq!(names, vec!["A", "B"]);
    }

    #[test]
    fn test_add_rejects_blank_name() {
        let mut ledger = ledger_with(&["A"]);
        let err = ledger.add(amount("1"), "   ", ts(1)).unwrap_err();
        assert_eq!(err.error_type(), ErrorType::Request);
        assert_eq!(ledger.len(), 1);
        assert_eq!(ledger.storage().saves(), 1);
    }

    #[test]
    fn test_update_keeps_timestamp_after_reload() {
        let mut ledger = ledger_with(&["A", "B"]);
        let original = ledger.get(ExpenseId::new(2)).unwrap().clone();

        let updated = ledger
            .update(ExpenseId::new(2), amount("75.25"), "B2")
            .unwrap()
            .unwrap();
        assert_eq!(updated.timestamp(), original.timestamp());

        let ledger = reopen(ledger);
        let reloaded = ledger.get(ExpenseId::new(2)).unwrap();
        assert_eq!(reloaded.name(), "B2");
        assert_eq!(reloaded.amount(), amount("75.25"));
        assert_eq!(reloaded.timestamp(), original.timestamp());
        assert_eq!(ledger.len(), 2);
        // Position is unchanged.
        assert_eq!(ledger.expenses()[1].id(), ExpenseId::new(2));
    }

    #[test]
    fn test_update_missing_is_noop() {
        let mut ledger = ledger_with(&["A"]);
        let before = ledger.storage().saves();
        let result = ledger.update(ExpenseId::new(42), amount("1"), "X").unwrap();
        assert!(result.is_none());
        assert_eq!(ledger.storage().saves(), before);
        assert_eq!(ledger.expenses()[0].name(), "A");
    }

    #[test]
    fn test_update_after_remove_is_noop() {
        let mut ledger = ledger_with(&["A", "B"]);
        ledger.remove(ExpenseId::new(1)).unwrap();
        assert!(ledger
            .update(ExpenseId::new(1), amount("3"), "A again")
            .unwrap()
            .is_none());
        assert_eq!(ledger.len(), 1);
    }

    #[test]
    fn test_remove_and_reload() {
        let mut ledger = ledger_with(&["A", "B", "C"]);
        let removed = ledger.remove(ExpenseId::new(2)).unwrap().unwrap();
        assert_eq!(removed.name(), "B");

        let ledger = reopen(ledger);
        assert_eq!(ledger.len(), 2);
        assert!(ledger.get(ExpenseId::new(2)).is_none());
        let names: Vec<&str> = ledger.expenses().iter().map(|e| e.name()).collect();
        assert_eq!(names, vec!["A", "C"]);
    }

    #[test]
    fn test_remove_missing_is_noop() {
        let mut ledger = ledger_with(&["A"]);
        assert!(ledger.remove(ExpenseId::new(9)).unwrap().is_none());
        assert_eq!(ledger.len(), 1);
        assert_eq!(ledger.storage().saves(), 1);
    }

    #[test]
    fn test_identical_expenses_are_distinct() {
        let mut ledger = ledger_with(&[]);
        let first = ledger.add(amount("5"), "Coffee", ts(8)).unwrap();
        let second = ledger.add(amount("5"), "Coffee", ts(8)).unwrap();
        assert_ne!(first.id(), second.id());
        ledger.remove(second.id()).unwrap();
        assert_eq!(ledger.len(), 1);
        assert_eq!(ledger.expenses()[0].id(), first.id());
    }

    #[test]
    fn test_ids_continue_after_reload() {
        let ledger = reopen(ledger_with(&["A", "B"]));
        let mut ledger = ledger;
        let c = ledger.add(amount("1"), "C", ts(5)).unwrap();
        assert_eq!(c.id(), ExpenseId::new(3));
    }

    #[test]
    fn test_write_failure_keeps_memory_state() {
        let mut ledger = ledger_with(&["A"]);
        ledger.storage_mut().set_fail_writes(true);

        let err = ledger.add(amount("2"), "B", ts(2)).unwrap_err();
        assert_eq!(err.error_type(), ErrorType::Storage);
        assert!(err.to_string().contains("Changes not saved"));
        assert!(!ledger.is_saved());
        assert_eq!(ledger.len(), 2);

        // The storage still holds the old list.
        let stored = Ledger::open(ledger.storage().clone()).unwrap();
        assert_eq!(stored.len(), 1);

        assert!(ledger.flush().is_err());
        ledger.storage_mut().set_fail_writes(false);
        ledger.flush().unwrap();
        assert!(ledger.is_saved());

        let ledger = reopen(ledger);
        assert_eq!(ledger.len(), 2);
    }

    #[test]
    fn test_flush_when_saved_does_nothing() {
        let mut ledger = ledger_with(&["A"]);
        ledger.flush().unwrap();
        assert_eq!(ledger.storage().saves(), 1);
    }

    #[test]
    fn test_open_corrupt_document_recovers() {
        let storage = MemoryStorage::with_document("[{\"amount\": oops");
        let mut ledger = Ledger::open(storage).unwrap();
        assert!(ledger.is_empty());
        let recovery = ledger.recovery().unwrap();
        assert!(recovery.reason().contains("Failed to parse"));
        assert!(recovery.preserved().is_none());
        // Nothing is copied until the document is about to be replaced.
        assert!(ledger.storage().preserved().is_empty());

        ledger.add(amount("1"), "A", ts(1)).unwrap();
        assert_eq!(
            ledger.storage().preserved().to_vec(),
            vec!["[{\"amount\": oops".to_string()]
        );
        ledger.add(amount("2"), "B", ts(2)).unwrap();
        assert_eq!(ledger.storage().preserved().len(), 1);

        let ledger = reopen(ledger);
        assert_eq!(ledger.len(), 2);
        assert!(ledger.recovery().is_none());
    }

    #[test]
    fn test_reading_corrupt_document_does_not_copy_it() {
        let mut storage = MemoryStorage::with_document("not json");
        for _ in 0..5 {
            let ledger = Ledger::open(storage).unwrap();
            assert!(ledger.recovery().is_some());
            storage = ledger.into_storage();
        }
        assert!(storage.preserved().is_empty());
        assert_eq!(storage.document(), Some("not json"));
    }

    #[test]
    fn test_failed_write_after_corruption_retries_the_copy() {
        let mut ledger = Ledger::open(MemoryStorage::with_document("not json")).unwrap();
        ledger.storage_mut().set_fail_writes(true);
        assert!(ledger.add(amount("1"), "A", ts(1)).is_err());
        assert_eq!(ledger.storage().document(), Some("not json"));

        ledger.storage_mut().set_fail_writes(false);
        ledger.flush().unwrap();
        assert_eq!(ledger.storage().preserved().len(), 1);
        assert_eq!(reopen(ledger).len(), 1);
    }

    #[test]
    fn test_deleted_ids_are_not_reused_after_reload() {
        let mut ledger = ledger_with(&["A", "B"]);
        ledger.remove(ExpenseId::new(2)).unwrap();

        let mut ledger = reopen(ledger);
        let c = ledger.add(amount("3"), "C", ts(3)).unwrap();
        assert_eq!(c.id(), ExpenseId::new(3));

        // An update aimed at the deleted expense must not touch the new one.
        let mut ledger = reopen(ledger);
        let stale = ledger.update(ExpenseId::new(2), amount("999"), "C").unwrap();
        assert!(stale.is_none());
        assert_eq!(ledger.get(c.id()).unwrap().amount(), amount("3"));
        assert!(ledger.remove(ExpenseId::new(2)).unwrap().is_none());
        assert_eq!(ledger.len(), 2);
    }

    #[test]
    fn test_legacy_document_without_counter() {
        let storage = MemoryStorage::with_document(
            r#"[{"id": 4, "amount": 1, "name": "four", "date": "2026-10-19T01:00:00Z"}]"#,
        );
        let mut ledger = Ledger::open(storage).unwrap();
        let next = ledger.add(amount("2"), "five", ts(2)).unwrap();
        assert_eq!(next.id(), ExpenseId::new(5));
        assert!(ledger.storage().document().unwrap().contains("\"next_id\":6"));
    }

    #[test]
    fn test_open_fails_when_ids_run_out() {
        let storage = MemoryStorage::with_document(format!(
            r#"[
                {{"id": {}, "amount": 1, "name": "last", "date": "2026-10-19T01:00:00Z"}},
                {{"amount": 2, "name": "no id", "date": "2026-10-19T02:00:00Z"}}
            ]"#,
            u64::MAX
        ));
        let err = Ledger::open(storage).unwrap_err();
        assert_eq!(err.error_type(), ErrorType::Internal);
    }

    #[test]
    fn test_add_fails_when_ids_run_out() {
        let storage = MemoryStorage::with_document(format!(
            r#"[{{"id": {}, "amount": 1, "name": "last", "date": "2026-10-19T01:00:00Z"}}]"#,
            u64::MAX
        ));
        let mut ledger = Ledger::open(storage).unwrap();
        let err = ledger.add(amount("1"), "A", ts(1)).unwrap_err();
        assert_eq!(err.error_type(), ErrorType::Internal);
        assert_eq!(ledger.len(), 1);
    }

    #[test]
    fn test_open_assigns_missing_and_duplicate_ids() {
        let storage = MemoryStorage::with_document(
            r#"[
                {"amount": 1, "name": "no id", "date": "2026-10-19T01:00:00Z"},
                {"id": 5, "amount": 2, "name": "five", "date": "2026-10-19T02:00:00Z"},
                {"id": 5, "amount": 3, "name": "dup", "date": "2026-10-19T03:00:00Z"}
            ]"#,
        );
        let mut ledger = Ledger::open(storage).unwrap();
        let ids: Vec<u64> = ledger.expenses().iter().map(|e| e.id().get()).collect();
        assert_eq!(ids, vec![6, 5, 7]);
        let next = ledger.add(amount("4"), "next", ts(4)).unwrap();
        assert_eq!(next.id(), ExpenseId::new(8));
    }

    #[test]
    fn test_round_trip_preserves_everything() {
        let mut ledger = ledger_with(&[]);
        let base = ts(0);
        for i in 0..5 {
            ledger
                .add(
                    amount(&format!("{i}.333")),
                    &format!("item {i}"),
                    base + Duration::milliseconds(i * 1_001),
                )
                .unwrap();
        }
        let original = ledger.expenses().to_vec();
        let ledger = reopen(ledger);
        assert_eq!(ledger.expenses(), original.as_slice());
    }
}
