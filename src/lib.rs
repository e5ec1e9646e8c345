//! expense-tracker: a small personal expense tracker.
//!
//! Expenses live in a single JSON file. The `Ledger` loads that file, applies additions, updates
//! and removals, and writes the whole list back after each change. `Period` and `Summary` select
//! and total the expenses of the current day, week or month.

pub mod args;
pub mod backup;
pub mod commands;
mod config;
mod error;
pub mod ledger;
pub mod model;
pub mod period;
pub mod storage;
pub mod summary;
mod utils;


pub use config::Config;
pub use error::{Error, ErrorType, Result};
pub use ledger::Ledger;
pub use model::{parse_amount, Amount, Expense, ExpenseId};
pub use period::{filter_by_period, Period};
pub use summary::{sum, Summary};
