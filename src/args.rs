//! These structs provide the CLI interface for the expenses CLI.

use crate::model::{ExpenseId, SymbolPosition};
use crate::period::Period;
use clap::{Parser, Subcommand};
use std::convert::Infallible;
use std::fmt::{Display, Formatter};
use std::ops::Deref;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::error;
use tracing_subscriber::filter::LevelFilter;

/// expenses: A command-line tool for tracking personal expenses.
///
/// Record what you spend with `add`, correct or remove entries with `update` and `delete`, and see
/// what you spent today, this week or this month with `list` and `total`.
///
/// Everything is kept in a single JSON file in the expenses home directory. Run `expenses init`
/// once to create it.
#[derive(Debug, Parser, Clone)]
#[command(version)]
pub struct Args {
    #[clap(flatten)]
    common: Common,

    #[command(subcommand)]
    command: Command,
}

impl Args {
    pub fn new(common: Common, command: Command) -> Self {
        Self { common, command }
    }

    pub fn common(&self) -> &Common {
        &self.common
    }

    pub fn command(&self) -> &Command {
        &self.command
    }
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Create the home directory and the configuration file.
    ///
    /// This is the first command you should run. By default the home directory is
    /// $HOME/expenses; pass --expenses-home or set EXPENSES_HOME to put it somewhere else.
    Init(InitArgs),
    /// Record a new expense, timestamped now.
    Add(AddArgs),
    /// Change the amount and/or name of an expense. Its date never changes.
    Update(UpdateArgs),
    /// Delete one or more expenses by ID.
    Delete(DeleteArgs),
    /// Show the expenses of the current day, week or month, with their total.
    List(ListArgs),
    /// Show the total for the current day, week or month.
    Total(TotalArgs),
}

/// Arguments common to all subcommands.
#[derive(Debug, Parser, Clone)]
pub struct Common {
    /// The logging verbosity. One of, from least to most verbose:
    /// off, error, warn, info, debug, trace
    ///
    /// This can be overridden by RUST_LOG.
    #[arg(long, default_value_t = LevelFilter::INFO)]
    log_level: LevelFilter,

    /// The directory where the expenses data and configuration are held. Defaults to ~/expenses
    #[arg(long, env = "EXPENSES_HOME", default_value_t = default_expenses_home())]
    expenses_home: DisplayPath,

    /// Print command output as JSON instead of text.
    #[arg(long)]
    json: bool,
}

impl Common {
    pub fn new(log_level: LevelFilter, expenses_home: PathBuf, json: bool) -> Self {
        Self {
            log_level,
            expenses_home: expenses_home.into(),
            json,
        }
    }

    pub fn log_level(&self) -> LevelFilter {
        self.log_level
    }

    pub fn expenses_home(&self) -> &DisplayPath {
        &self.expenses_home
    }

    pub fn json(&self) -> bool {
        self.json
    }
}

/// Args for the `expenses init` command.
#[derive(Debug, Parser, Clone)]
pub struct InitArgs {
    /// The currency symbol shown next to amounts.
    #[arg(long, default_value = "₽")]
    currency_symbol: String,

    /// Whether the currency symbol goes before ("prefix") or after ("suffix") the number.
    #[arg(long, default_value_t = SymbolPosition::Suffix)]
    symbol_position: SymbolPosition,

    /// Do not separate thousands with commas.
    #[arg(long)]
    no_grouping: bool,
}

impl InitArgs {
    pub fn new(
        currency_symbol: impl Into<String>,
        symbol_position: SymbolPosition,
        no_grouping: bool,
    ) -> Self {
        Self {
            currency_symbol: currency_symbol.into(),
            symbol_position,
            no_grouping,
        }
    }

    pub fn currency_symbol(&self) -> &str {
        &self.currency_symbol
    }

    pub fn symbol_position(&self) -> SymbolPosition {
        self.symbol_position
    }

    pub fn grouping(&self) -> bool {
        !self.no_grouping
    }
}

/// Args for the `expenses add` command.
#[derive(Debug, Parser, Clone)]
pub struct AddArgs {
    /// The amount, e.g. 152.56. Negative amounts are allowed.
    #[arg(long, allow_hyphen_values = true)]
    amount: String,

    /// What the money was spent on.
    #[arg(long)]
    name: String,
}

impl AddArgs {
    pub fn new(amount: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            amount: amount.into(),
            name: name.into(),
        }
    }

    pub fn amount(&self) -> &str {
        &self.amount
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

/// Args for the `expenses update` command.
#[derive(Debug, Parser, Clone)]
pub struct UpdateArgs {
    /// The ID of the expense, as shown by `expenses list`.
    id: ExpenseId,

    /// The new amount. Keeps the current amount when omitted.
    #[arg(long, allow_hyphen_values = true)]
    amount: Option<String>,

    /// The new name. Keeps the current name when omitted.
    #[arg(long)]
    name: Option<String>,
}

impl UpdateArgs {
    pub fn new(id: ExpenseId, amount: Option<String>, name: Option<String>) -> Self {
        Self { id, amount, name }
    }

    pub fn id(&self) -> ExpenseId {
        self.id
    }

    pub fn amount(&self) -> Option<&str> {
        self.amount.as_deref()
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }
}

/// Args for the `expenses delete` command.
#[derive(Debug, Parser, Clone)]
pub struct DeleteArgs {
    /// The IDs of the expenses to delete, as shown by `expenses list`.
    #[arg(required = true)]
    ids: Vec<ExpenseId>,
}

impl DeleteArgs {
    pub fn new(ids: impl IntoIterator<Item = ExpenseId>) -> Self {
        Self {
            ids: ids.into_iter().collect(),
        }
    }

    pub fn ids(&self) -> &[ExpenseId] {
        &self.ids
    }
}

/// Args for the `expenses list` command.
#[derive(Debug, Parser, Clone)]
pub struct ListArgs {
    /// The period to show.
    #[arg(long, value_enum, default_value_t = Period::Daily)]
    period: Period,

    /// Show every expense regardless of date.
    #[arg(long, conflicts_with = "period")]
    all: bool,
}

impl ListArgs {
    pub fn new(period: Period, all: bool) -> Self {
        Self { period, all }
    }

    /// The selected period, or `None` when `--all` was given.
    pub fn period(&self) -> Option<Period> {
        if self.all {
            None
        } else {
            Some(self.period)
        }
    }
}

/// Args for the `expenses total` command.
#[derive(Debug, Parser, Clone)]
pub struct TotalArgs {
    /// The period to total.
    #[arg(long, value_enum, default_value_t = Period::Daily)]
    period: Period,
}

impl TotalArgs {
    pub fn new(period: Period) -> Self {
        Self { period }
    }

    pub fn period(&self) -> Period {
        self.period
    }
}

fn default_expenses_home() -> DisplayPath {
    DisplayPath(match dirs::home_dir() {
        Some(home) => home.join("expenses"),
        None => {
            error!(
                "There was an error when trying to get your home directory. You can get around \
                this by providing --expenses-home or EXPENSES_HOME instead of relying on the \
                default expenses home directory. If you continue using the program right now, you \
                may have problems!",
            );
            PathBuf::from("expenses")
        }
    })
}

#[derive(Debug, Default, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct DisplayPath(PathBuf);

impl From<PathBuf> for DisplayPath {
    fn from(value: PathBuf) -> Self {
        DisplayPath(value)
    }
}

impl Deref for DisplayPath {
    type Target = Path;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl AsRef<Path> for DisplayPath {
    fn as_ref(&self) -> &Path {
        &self.0
    }
}

impl Display for DisplayPath {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.to_string_lossy())
    }
}

impl FromStr for DisplayPath {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(PathBuf::from(s)))
    }
}

impl DisplayPath {
    pub fn new(path: PathBuf) -> Self {
        Self(path)
    }

    pub fn path(&self) -> &Path {
        &self.0
    }
}
