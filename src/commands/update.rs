use crate::args::UpdateArgs;
use crate::commands::Out;
use crate::error::{Error, ErrorType, IntoResult};
use crate::ledger::Ledger;
use crate::model::{parse_amount, Expense};
use crate::{Config, Result};
use anyhow::anyhow;
use tracing::warn;

/// Changes the amount and/or name of an expense. Omitted fields keep their current value and the
/// timestamp never changes. An unknown id changes nothing and is reported in the message.
pub fn update(config: Config, args: UpdateArgs) -> Result<Out<Expense>> {
    if args.amount().is_none() && args.name().is_none() {
        return Err(Error::new(
            ErrorType::Request,
            anyhow!("Nothing to update, provide --amount and/or --name"),
        ));
    }
    let amount = args
        .amount()
        .map(parse_amount)
        .transpose()
        .pub_result(ErrorType::Request)?;

    let id = args.id();
    let mut ledger = Ledger::open(config.storage())?;
    let updated = match ledger.get(id).cloned() {
        Some(current) => {
            let amount = amount.unwrap_or(current.amount());
            let name = args.name().unwrap_or(current.name());
            ledger.update(id, amount, name)?
        }
        None => None,
    };

    let out = match updated {
        Some(updated) => {
            let message = format!(
                "Updated expense {id}: {} {}",
                updated.name(),
                updated.amount().format(config.money_format())
            );
            Out::new(message, updated)
        }
        None => {
            warn!("No expense with ID {id}");
            Out::new_message(format!("No expense with ID {id}, nothing was changed"))
        }
    };
    Ok(out.with_recovery(ledger.recovery()))
}
