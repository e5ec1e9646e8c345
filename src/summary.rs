//! Totals over a set of expenses.

use crate::model::{Amount, Expense, MoneyFormat};
use crate::period::{filter_by_period, Period, Window};
use chrono::{DateTime, TimeZone};
use rust_decimal::Decimal;
use serde::Serialize;

/// Sums the amounts of `expenses`. An empty input sums to zero.
///
/// The sum is exact; it saturates at the bounds of `Decimal` rather than overflowing.
pub fn sum<'a>(expenses: impl IntoIterator<Item = &'a Expense>) -> Amount {
    let total = expenses
        .into_iter()
        .fold(Decimal::ZERO, |acc, expense| {
            acc.saturating_add(expense.amount().value())
        });
    Amount::new(total)
}

/// The running total for a period, or for everything when `period` is `None`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Summary {
    period: Option<Period>,
    window: Option<Window>,
    count: usize,
    total: Amount,
}

impl Summary {
    /// Totals the expenses that fall in the `period` window ending at `now`.
    pub fn for_period<Tz: TimeZone>(
        expenses: &[Expense],
        period: Period,
        now: &DateTime<Tz>,
    ) -> Self {
        let selected = filter_by_period(expenses, period, now);
        Self {
            period: Some(period),
            window: Some(period.window(now)),
            count: selected.len(),
            total: sum(selected),
        }
    }

    /// Totals every expense.
    pub fn all(expenses: &[Expense]) -> Self {
        Self {
            period: None,
            window: None,
            count: expenses.len(),
            total: sum(expenses),
        }
    }

    pub fn period(&self) -> Option<Period> {
        self.period
    }

    pub fn window(&self) -> Option<&Window> {
        self.window.as_ref()
    }

    pub fn count(&self) -> usize {
        self.count
    }

    pub fn total(&self) -> Amount {
        self.total
    }

    /// e.g. `Total for the day: 150.50 ₽`
    pub fn line(&self, style: &MoneyFormat) -> String {
        match self.period {
            Some(period) => format!(
                "Total for the {}: {}",
                period.label(),
                self.total.format(style)
            ),
            None => format!("Total: {}", self.total.format(style)),
        }
    }
}
