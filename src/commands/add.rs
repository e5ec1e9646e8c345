use crate::args::AddArgs;
use crate::commands::Out;
use crate::error::{ErrorType, IntoResult};
use crate::ledger::Ledger;
use crate::model::{parse_amount, Expense};
use crate::{Config, Result};
use chrono::Utc;

/// Records a new expense timestamped now.
///
/// The amount is validated before the data file is touched, so a bad amount never changes the
/// stored list.
pub fn add(config: Config, args: AddArgs) -> Result<Out<Expense>> {
    let amount = parse_amount(args.amount()).pub_result(ErrorType::Request)?;
    let mut ledger = Ledger::open(config.storage())?;
    let expense = ledger.add(amount, args.name(), Utc::now())?;
    let message = format!(
        "Added expense {}: {} {}",
        expense.id(),
        expense.name(),
        expense.amount().format(config.money_format())
    );
    Ok(Out::new(message, expense).with_recovery(ledger.recovery()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ExpenseId, INVALID_AMOUNT_MESSAGE};
    use crate::test::TestEnv;

    #[test]
    fn test_add() {
        let env = TestEnv::new();
        let out = add(env.config(), AddArgs::new("152.56", "Groceries")).unwrap();
        assert_eq!(out.message(), "Added expense 1: Groceries 152.56 ₽");

        let expense = out.structure().unwrap();
        assert_eq!(expense.id(), ExpenseId::new(1));

        let ledger = env.ledger();
        assert_eq!(ledger.len(), 1);
        assert_eq!(ledger.expenses()[0], *expense);
    }

    #[test]
    fn test_add_invalid_amount_leaves_store_alone() {
        let env = TestEnv::new();
        add(env.config(), AddArgs::new("1", "First")).unwrap();
        let before = std::fs::read_to_string(env.config().data_path()).unwrap();

        for bad in ["abc", "", "1,5", "1e3"] {
            let err = add(env.config(), AddArgs::new(bad, "Bad")).unwrap_err();
            assert_eq!(err.error_type(), ErrorType::Request);
            assert_eq!(err.to_string(), INVALID_AMOUNT_MESSAGE);
        }

        let after = std::fs::read_to_string(env.config().data_path()).unwrap();
        assert_eq!(before, after);
    }

    #[test]
    fn test_add_blank_name() {
        let env = TestEnv::new();
        let err = add(env.config(), AddArgs::new("5", " ")).unwrap_err();
        assert_eq!(err.error_type(), ErrorType::Request);
        assert!(!env.config().data_path().exists());
    }

    #[test]
    fn test_add_recovers_from_corrupt_file() {
        let env = TestEnv::new();
        env.write_data("not json at all");

        let out = add(env.config(), AddArgs::new("-3", "Refund")).unwrap();
        assert!(out.message().starts_with("Warning: Failed to parse expenses file"));
        assert!(out.message().ends_with("Added expense 1: Refund -3.00 ₽"));
        assert!(out.recovery().unwrap().preserved().is_some());

        let ledger = env.ledger();
        assert_eq!(ledger.len(), 1);
        assert!(ledger.expenses()[0].amount().is_negative());

        let preserved: Vec<_> = std::fs::read_dir(env.config().backups())
            .unwrap()
            .map(|entry| entry.unwrap().file_name().to_string_lossy().to_string())
            .filter(|name| name.starts_with("corrupt."))
            .collect();
        assert_eq!(preserved.len(), 1);
        let kept = std::fs::read_to_string(env.config().backups().join(&preserved[0])).unwrap();
        assert_eq!(kept, "not json at all");
    }
}
