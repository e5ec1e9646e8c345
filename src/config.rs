//! Configuration file handling.
//!
//! The configuration file is stored at `$EXPENSES_HOME/config.json` and contains settings such as
//! how amounts are displayed, how many backup copies to keep and, optionally, where the data file
//! lives.

use crate::backup::Backup;
use crate::error::{ErrorType, IntoResult, Res};
use crate::model::MoneyFormat;
use crate::storage::JsonFile;
use crate::{utils, Result};
use anyhow::{bail, Context};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

const APP_NAME: &str = "expenses";
const CONFIG_VERSION: u8 = 1;
const BACKUP_COPIES: u32 = 5;
const BACKUPS: &str = ".backups";
const CONFIG_JSON: &str = "config.json";
const EXPENSES_JSON: &str = "expenses.json";

/// The `Config` object represents the configuration of the app. You instantiate it by providing
/// the path to `$EXPENSES_HOME` and from there it loads `$EXPENSES_HOME/config.json`. It provides
/// paths to other items that are either configurable or are expected in a certain location within
/// the home directory.
#[derive(Debug, Clone)]
pub struct Config {
    root: PathBuf,
    backups: PathBuf,
    config_path: PathBuf,
    config_file: ConfigFile,
    data_path: PathBuf,
}

impl Config {
    /// Creates the home directory and its backups directory, and writes an initial `config.json`
    /// that uses `currency` for display and default settings otherwise.
    ///
    /// # Errors
    /// - Returns an error if the directory already holds a `config.json`.
    /// - Returns an error if any file operations fail.
    pub fn create(dir: impl Into<PathBuf>, currency: MoneyFormat) -> Result<Self> {
        Self::create_inner(dir.into(), currency).pub_result(ErrorType::Config)
    }

    fn create_inner(maybe_relative: PathBuf, currency: MoneyFormat) -> Res<Self> {
        utils::make_dir(&maybe_relative).context("Unable to create the expenses home directory")?;
        let root = utils::canonicalize(&maybe_relative)?;

        let config_path = root.join(CONFIG_JSON);
        if config_path.exists() {
            bail!(
                "The config file already exists '{}'",
                config_path.display()
            )
        }

        let backups = root.join(BACKUPS);
        utils::make_dir(&backups)?;

        let config_file = ConfigFile {
            currency,
            ..ConfigFile::default()
        };
        config_file.save(&config_path)?;

        let data_path = config_file.data_path(&root);
        Ok(Self {
            root,
            backups,
            config_path,
            config_file,
            data_path,
        })
    }

    /// This will
    /// - validate that the `expenses_home` exists and that the config file exists
    /// - load the config file
    /// - validate that the backups directory exists
    /// - return the loaded configuration object
    pub fn load(expenses_home: impl Into<PathBuf>) -> Result<Self> {
        Self::load_inner(expenses_home.into()).pub_result(ErrorType::Config)
    }

    fn load_inner(maybe_relative: PathBuf) -> Res<Self> {
        let root = utils::canonicalize(&maybe_relative).with_context(|| {
            format!(
                "The expenses home is missing '{}', run 'expenses init' to create it",
                maybe_relative.display()
            )
        })?;

        let config_path = root.join(CONFIG_JSON);
        if !config_path.is_file() {
            bail!(
                "The config file is missing '{}', run 'expenses init' to create it",
                config_path.display()
            )
        }
        let config_file = ConfigFile::load(&config_path)?;

        let backups = root.join(BACKUPS);
        if !backups.is_dir() {
            bail!("The backups directory is missing '{}'", backups.display())
        }

        let data_path = config_file.data_path(&root);
        Ok(Self {
            root,
            backups,
            config_path,
            config_file,
            data_path,
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    pub fn backups(&self) -> &Path {
        &self.backups
    }

    pub fn backup_copies(&self) -> u32 {
        self.config_file.backup_copies
    }

    /// The expenses data file.
    pub fn data_path(&self) -> &Path {
        &self.data_path
    }

    pub fn money_format(&self) -> &MoneyFormat {
        &self.config_file.currency
    }

    /// Creates a new `Backup` instance for managing backup files.
    pub fn backup(&self) -> Backup {
        Backup::new(&self.backups, self.backup_copies())
    }

    /// The storage for the expense list, with backups enabled.
    pub fn storage(&self) -> JsonFile {
        JsonFile::new(&self.data_path).with_backup(self.backup())
    }
}

/// Represents the serialization and deserialization format of the configuration file.
///
/// Example configuration:
/// ```json
/// {
///   "app_name": "expenses",
///   "config_version": 1,
///   "backup_copies": 5,
///   "currency": { "symbol": "₽", "position": "suffix", "grouping": true }
/// }
/// ```
///
/// `data_path` is only present when the data file lives somewhere other than
/// `$EXPENSES_HOME/expenses.json`.
#[derive(Debug, Clone, Serialize, Deserialize, Eq, PartialEq)]
struct ConfigFile {
    /// Application name, should always be "expenses"
    app_name: String,

    /// Configuration file version
    config_version: u8,

    /// Number of backup copies of the data file to keep, zero disables them
    #[serde(default = "backup_copies_default")]
    backup_copies: u32,

    /// How amounts are displayed
    #[serde(default)]
    currency: MoneyFormat,

    /// Path to the data file (optional, relative to config.json or absolute)
    /// Defaults to $EXPENSES_HOME/expenses.json if not specified
    #[serde(default, skip_serializing_if = "Option::is_none")]
    data_path: Option<PathBuf>,
}

fn backup_copies_default() -> u32 {
    BACKUP_COPIES
}

impl Default for ConfigFile {
    fn default() -> Self {
        Self {
            app_name: APP_NAME.to_string(),
            config_version: CONFIG_VERSION,
            backup_copies: BACKUP_COPIES,
            currency: MoneyFormat::default(),
            data_path: None,
        }
    }
}

impl ConfigFile {
    /// Loads a ConfigFile from the specified path.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read or parsed, or names another application.
    fn load(path: impl AsRef<Path>) -> Res<Self> {
        let path = path.as_ref();
        let content = utils::read(path)?;
        let config: ConfigFile = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse config file at {}", path.display()))?;

        anyhow::ensure!(
            config.app_name == APP_NAME,
            "Invalid app_name in config file: expected '{}', got '{}'",
            APP_NAME,
            config.app_name
        );

        Ok(config)
    }

    /// Saves the ConfigFile to the specified path.
    fn save(&self, path: impl AsRef<Path>) -> Res<()> {
        let p = path.as_ref();
        let data = serde_json::to_string_pretty(self).context("Unable to serialize config")?;
        utils::write(p, data).context("Unable to write config file")
    }

    /// Returns the stored `data_path` if it is absolute, otherwise resolves it against `root`.
    fn data_path(&self, root: &Path) -> PathBuf {
        match &self.data_path {
            Some(p) if p.is_absolute() => p.clone(),
            Some(p) => root.join(p),
            None => root.join(EXPENSES_JSON),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::SymbolPosition;
    use tempfile::TempDir;

    #[test]
    fn test_config_create() {
        let dir = TempDir::new().unwrap();
        let home_dir = dir.path().join("expenses_home");
        let currency = MoneyFormat::new("$", SymbolPosition::Prefix, false);

        let config = Config::create(&home_dir, currency.clone()).unwrap();

        assert!(config.backups().is_dir());
        assert!(config.config_path().is_file());
        assert_eq!(config.money_format(), &currency);
        assert_eq!(config.backup_copies(), BACKUP_COPIES);
        assert_eq!(config.data_path(), config.root().join(EXPENSES_JSON));
        // The data file is only written on the first save.
        assert!(!config.data_path().exists());
    }

    #[test]
    fn test_config_create_then_load() {
        let dir = TempDir::new().unwrap();
        let created = Config::create(dir.path(), MoneyFormat::default()).unwrap();
        let loaded = Config::load(dir.path()).unwrap();
        assert_eq!(created.config_file, loaded.config_file);
        assert_eq!(created.data_path(), loaded.data_path());
    }

    #[test]
    fn test_config_create_twice_fails() {
        let dir = TempDir::new().unwrap();
        Config::create(dir.path(), MoneyFormat::default()).unwrap();
        let err = Config::create(dir.path(), MoneyFormat::default()).unwrap_err();
        assert_eq!(err.error_type(), ErrorType::Config);
        assert!(err.to_string().contains("already exists"));
    }

    #[test]
    fn test_config_load_missing_home() {
        let dir = TempDir::new().unwrap();
        let err = Config::load(dir.path().join("nope")).unwrap_err();
        assert_eq!(err.error_type(), ErrorType::Config);
        assert!(err.to_string().contains("expenses init"));
    }

    #[test]
    fn test_config_load_missing_config_file() {
        let dir = TempDir::new().unwrap();
        let err = Config::load(dir.path()).unwrap_err();
        assert!(err.to_string().contains("The config file is missing"));
    }

    #[test]
    fn test_config_load_missing_backups() {
        let dir = TempDir::new().unwrap();
        let config = Config::create(dir.path(), MoneyFormat::default()).unwrap();
        std::fs::remove_dir(config.backups()).unwrap();
        let err = Config::load(dir.path()).unwrap_err();
        assert!(err.to_string().contains("backups directory is missing"));
    }

    #[test]
    fn test_config_file_default() {
        let config = ConfigFile::default();
        assert_eq!(config.app_name, "expenses");
        assert_eq!(config.backup_copies, 5);
        assert_eq!(config.currency, MoneyFormat::default());
        assert_eq!(
            config.data_path(Path::new("/home")),
            PathBuf::from("/home").join(EXPENSES_JSON)
        );
    }

    #[test]
    fn test_config_file_save_and_load() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("config.json");
        let original = ConfigFile {
            backup_copies: 2,
            currency: MoneyFormat::new("€", SymbolPosition::Suffix, true),
            data_path: Some(PathBuf::from("data/spending.json")),
            ..ConfigFile::default()
        };
        original.save(&config_path).unwrap();
        let loaded = ConfigFile::load(&config_path).unwrap();
        assert_eq!(original, loaded);
    }

    #[test]
    fn test_config_file_load_with_minimal_config() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("config.json");
        let json = r#"{
            "app_name": "expenses",
            "config_version": 1
        }"#;
        std::fs::write(&config_path, json).unwrap();

        let config = ConfigFile::load(&config_path).unwrap();
        assert_eq!(config.backup_copies, BACKUP_COPIES);
        assert_eq!(config.currency, MoneyFormat::default());
        assert!(config.data_path.is_none());
    }

    #[test]
    fn test_config_file_load_invalid_app_name() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("config.json");
        let json = r#"{ "app_name": "wrong_app", "config_version": 1 }"#;
        std::fs::write(&config_path, json).unwrap();

        let result = ConfigFile::load(&config_path);
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("Invalid app_name"));
    }

    #[test]
    fn test_config_file_serialization_omits_none_fields() {
        let json = serde_json::to_string(&ConfigFile::default()).unwrap();
        assert!(!json.contains("data_path"));
    }

    #[test]
    fn test_data_path_resolution() {
        let root = Path::new("/root/expenses");
        let relative = ConfigFile {
            data_path: Some(PathBuf::from("other.json")),
            ..ConfigFile::default()
        };
        assert_eq!(relative.data_path(root), root.join("other.json"));

        let absolute = ConfigFile {
            data_path: Some(PathBuf::from("/var/data/expenses.json")),
            ..ConfigFile::default()
        };
        assert_eq!(
            absolute.data_path(root),
            PathBuf::from("/var/data/expenses.json")
        );
    }
}
