//! Command handlers for the expenses CLI.
//!
//! This module contains implementations for all CLI subcommands.

mod add;
mod delete;
mod init;
mod list;
mod total;
mod update;

use crate::ledger::Recovery;
use serde::Serialize;
use std::fmt::Debug;
use tracing::{debug, error};

pub use add::add;
pub use delete::delete;
pub use init::init;
pub use list::{list, Listing};
pub use total::total;
pub use update::update;

/// The output type for a command. This allows the command to return a consistent message and,
/// optionally, structured data.
#[derive(Debug, Clone, Serialize)]
pub struct Out<T>
where
    T: Serialize + Clone + Debug,
{
    /// A message that can be printed to the user regarding the outcome of the command execution.
    message: String,

    /// Any structured data that needs to be output from the call.
    structure: Option<T>,

    /// Set when the data file could not be read and the command ran against an empty list.
    #[serde(skip_serializing_if = "Option::is_none")]
    recovery: Option<Recovery>,
}

impl<T, S> From<S> for Out<T>
where
    T: Debug + Clone + Serialize,
    S: Into<String>,
{
    fn from(value: S) -> Self {
        Out::new_message(value)
    }
}

impl<T> Out<T>
where
    T: Serialize + Clone + Debug,
{
    /// Create a new `Out` object that has `Some(structure)`.
    pub fn new<S>(message: S, structure: T) -> Self
    where
        S: Into<String>,
    {
        Self {
            message: message.into(),
            structure: Some(structure),
            recovery: None,
        }
    }

    /// Create a new `Out` object that has `None` for `structure`.
    pub fn new_message<S>(message: S) -> Self
    where
        S: Into<String>,
    {
        Self {
            message: message.into(),
            structure: None,
            recovery: None,
        }
    }

    /// Get the `message`.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Get the structured data stored in `structure`.
    pub fn structure(&self) -> Option<&T> {
        self.structure.as_ref()
    }

    /// Get the description of a recovery from an unreadable data file, if there was one.
    pub fn recovery(&self) -> Option<&Recovery> {
        self.recovery.as_ref()
    }

    /// Attaches `recovery` and puts a warning about it in front of the message.
    pub fn with_recovery(mut self, recovery: Option<&Recovery>) -> Self {
        if let Some(recovery) = recovery {
            self.message = format!("{}\n\n{}", recovery_notice(recovery), self.message);
            self.recovery = Some(recovery.clone());
        }
        self
    }

    /// Print the message to stdout and the structured data (if it exists) as JSON to `debug!`.
    /// With `json`, print the whole `Out` as JSON to stdout instead.
    pub fn print(&self, json: bool) {
        if json {
            match serde_json::to_string_pretty(self) {
                Ok(s) => println!("{s}"),
                Err(e) => error!("Unable to serialize command output: {e}"),
            }
            return;
        }
        println!("{}", self.message);
        if let Some(structure) = self.structure() {
            if let Ok(json) = serde_json::to_string_pretty(structure) {
                debug!("Command output:\n\n{json}\n\n");
            }
        }
    }
}

fn recovery_notice(recovery: &Recovery) -> String {
    match recovery.preserved() {
        Some(path) => format!(
            "Warning: {}. The unreadable file was copied to {} and a new expense list was \
            started.",
            recovery.reason(),
            path.display()
        ),
        None => format!(
            "Warning: {}. Showing an empty expense list. The file is left as it is until the next \
            change, which copies it to the backups directory first.",
            recovery.reason()
        ),
    }
}

/// "1 expense", "2 expenses"
fn plural(count: usize, word: &str) -> String {
    format!("{count} {word}{}", if count == 1 { "" } else { "s" })
}
