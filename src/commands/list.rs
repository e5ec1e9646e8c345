use crate::args::ListArgs;
use crate::commands::{plural, Out};
use crate::ledger::Ledger;
use crate::model::{Expense, MoneyFormat};
use crate::period::filter_by_period;
use crate::summary::Summary;
use crate::{Config, Result};
use chrono::{DateTime, Local, TimeZone};
use serde::Serialize;
use std::fmt::Display;

const DATE_FORMAT: &str = "%Y-%m-%d %H:%M";

/// The expenses shown by `expenses list`, with their total.
#[derive(Debug, Clone, Serialize)]
pub struct Listing {
    expenses: Vec<Expense>,
    summary: Summary,
}

impl Listing {
    pub fn expenses(&self) -> &[Expense] {
        &self.expenses
    }

    pub fn summary(&self) -> &Summary {
        &self.summary
    }
}

/// Shows the expenses of the current period, oldest first in insertion order, followed by the
/// period total.
pub fn list(config: Config, args: ListArgs) -> Result<Out<Listing>> {
    list_at(config, args, &Local::now())
}

pub(crate) fn list_at<Tz>(
    config: Config,
    args: ListArgs,
    now: &DateTime<Tz>,
) -> Result<Out<Listing>>
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    let ledger = Ledger::open(config.storage())?;
    let (expenses, summary) = match args.period() {
        Some(period) => (
            filter_by_period(ledger.expenses(), period, now)
                .into_iter()
                .cloned()
                .collect::<Vec<_>>(),
            Summary::for_period(ledger.expenses(), period, now),
        ),
        None => (ledger.expenses().to_vec(), Summary::all(ledger.expenses())),
    };

    let style = config.money_format();
    let mut message = if expenses.is_empty() {
        match summary.period() {
            Some(period) => format!("No expenses for the {}\n", period.label()),
            None => "No expenses\n".to_string(),
        }
    } else {
        render(&expenses, style, &now.timezone())
    };
    message.push('\n');
    message.push_str(&summary.line(style));
    if !expenses.is_empty() {
        message.push_str(&format!(" ({})", plural(expenses.len(), "expense")));
    }

    let listing = Listing { expenses, summary };
    Ok(Out::new(message, listing).with_recovery(ledger.recovery()))
}

/// Lays the expenses out as a table with the ids and amounts right-aligned and dates shown in
/// `tz`.
fn render<Tz>(expenses: &[Expense], style: &MoneyFormat, tz: &Tz) -> String
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    let rows: Vec<[String; 4]> = expenses
        .iter()
        .map(|expense| {
            [
                expense.id().to_string(),
                expense
                    .timestamp()
                    .with_timezone(tz)
                    .format(DATE_FORMAT)
                    .to_string(),
                expense.amount().format(style),
                expense.name().to_string(),
            ]
        })
        .collect();

    let header = ["ID", "Date", "Amount", "Name"];
    let width = |col: usize| {
        rows.iter()
            .map(|row| row[col].chars().count())
            .chain(std::iter::once(header[col].len()))
            .max()
            .unwrap_or_default()
    };
    let (id_w, date_w, amount_w) = (width(0), width(1), width(2));

    let mut out = format!(
        "{:>id_w$}  {:<date_w$}  {:>amount_w$}  {}\n",
        header[0], header[1], header[2], header[3]
    );
    for [id, date, amount, name] in &rows {
        // Pad by chars so that currency symbols outside ASCII line up.
        let pad = amount_w - amount.chars().count();
        out.push_str(&format!(
            "{id:>id_w$}  {date:<date_w$}  {}{amount}  {name}\n",
            " ".repeat(pad)
        ));
    }
    out
}
