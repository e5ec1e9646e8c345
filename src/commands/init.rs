use crate::args::InitArgs;
use crate::commands::Out;
use crate::model::MoneyFormat;
use crate::{Config, Result};
use std::path::Path;

/// Creates the home directory, its backups directory and an initial `config.json` holding the
/// display settings from `args`.
///
/// # Errors
/// - Returns an error if the directory is already initialized.
/// - Returns an error if any file operations fail.
pub fn init(expenses_home: &Path, args: InitArgs) -> Result<Out<()>> {
    let currency = MoneyFormat::new(
        args.currency_symbol(),
        args.symbol_position(),
        args.grouping(),
    );
    let config = Config::create(expenses_home, currency)?;
    Ok(format!(
        "Successfully created the expenses directory at {}",
        config.root().display()
    )
    .into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorType;
    use crate::model::SymbolPosition;
    use tempfile::TempDir;

    #[test]
    fn test_init() {
        let dir = TempDir::new().unwrap();
        let home = dir.path().join("expenses");
        let out = init(&home, InitArgs::new("$", SymbolPosition::Prefix, false)).unwrap();
        assert!(out.message().contains("Successfully created"));

        let config = Config::load(&home).unwrap();
        assert_eq!(config.money_format().symbol(), "$");
        assert_eq!(config.money_format().position(), SymbolPosition::Prefix);
        assert!(!config.money_format().grouping());
    }

    #[test]
    fn test_init_twice() {
        let dir = TempDir::new().unwrap();
        let args = InitArgs::new("₽", SymbolPosition::Suffix, false);
        init(dir.path(), args.clone()).unwrap();
        let err = init(dir.path(), args).unwrap_err();
        assert_eq!(err.error_type(), ErrorType::Config);
    }
}
