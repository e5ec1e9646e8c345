//! Types that represent the core data model, such as `Expense` and `Amount`.
mod amount;
mod expense;

pub use amount::{
    parse_amount, Amount, InvalidAmountFormat, MoneyFormat, SymbolPosition,
    INVALID_AMOUNT_MESSAGE,
};
pub use expense::{Expense, ExpenseId};
