use crate::model::Amount;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use std::num::ParseIntError;
use std::str::FromStr;

/// The stable identifier of an `Expense`.
///
/// Ids are handed out by the `Ledger` from a counter that is stored with the list and never goes
/// down, so an id is never reused, even after the expense holding it was deleted.
#[derive(
    Debug, Default, Clone, Copy, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct ExpenseId(u64);

impl ExpenseId {
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    pub fn get(&self) -> u64 {
        self.0
    }

    /// The id after this one, or `None` when the id space is used up.
    pub(crate) fn next(&self) -> Option<Self> {
        self.0.checked_add(1).map(Self)
    }
}

impl Display for ExpenseId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        Display::fmt(&self.0, f)
    }
}

impl FromStr for ExpenseId {
    type Err = ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim().parse().map(Self)
    }
}

impl From<u64> for ExpenseId {
    fn from(value: u64) -> Self {
        Self(value)
    }
}

/// A single recorded expense.
///
/// Expenses are values: an edit produces a new `Expense` through `with_changes`, which keeps the
/// id and the timestamp of the original.
///
/// Serialized form, one element of the data file:
/// ```json
/// { "id": 3, "amount": 152.56, "name": "Groceries", "date": "2026-10-19T09:00:00Z" }
/// ```
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct Expense {
    /// Files written before ids existed have no `id`, these are assigned on load.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub(crate) id: Option<ExpenseId>,
    amount: Amount,
    name: String,
    #[serde(rename = "date")]
    timestamp: DateTime<Utc>,
}

impl Expense {
    pub fn new(
        id: ExpenseId,
        amount: Amount,
        name: impl Into<String>,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Some(id),
            amount,
            name: name.into(),
            timestamp,
        }
    }

    /// Returns the id. Expenses obtained from a `Ledger` always have one.
    pub fn id(&self) -> ExpenseId {
        self.id.unwrap_or_default()
    }

    pub fn amount(&self) -> Amount {
        self.amount
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    /// Returns a replacement for this expense with a new amount and name. The id and timestamp
    /// are carried over unchanged.
    pub fn with_changes(&self, amount: Amount, name: impl Into<String>) -> Self {
        Self {
            id: self.id,
            amount,
            name: name.into(),
            timestamp: self.timestamp,
        }
    }
}
