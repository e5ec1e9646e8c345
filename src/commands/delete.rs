use crate::args::DeleteArgs;
use crate::commands::{plural, Out};
use crate::ledger::Ledger;
use crate::model::ExpenseId;
use crate::{Config, Result};
use tracing::warn;

/// Deletes the expenses with the given ids. Ids that match nothing are skipped and listed in the
/// message. The structured output holds the ids that were deleted.
pub fn delete(config: Config, args: DeleteArgs) -> Result<Out<Vec<ExpenseId>>> {
    let mut ledger = Ledger::open(config.storage())?;
    let mut deleted = Vec::new();
    let mut missing = Vec::new();
    for &id in args.ids() {
        match ledger.remove(id)? {
            Some(_) => deleted.push(id),
            None => {
                warn!("No expense with ID {id}");
                missing.push(id.to_string());
            }
        }
    }

    let mut message = format!("Deleted {}", plural(deleted.len(), "expense"));
    if !missing.is_empty() {
        message.push_str(&format!("; no expense with ID {}", missing.join(", ")));
    }
    Ok(Out::new(message, deleted).with_recovery(ledger.recovery()))
}
