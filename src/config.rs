//! Configuration file handling for the budget workbook.
//!
//! The configuration file is stored at `$BUDGET_HOME/config.json` and contains settings such as the
//! number of backups to keep, where the workbook lives, the chart color schemes and, optionally,
//! a replacement set of investment plans.

use crate::api::MemoryWorkbook;
use crate::backup::Backup;
use crate::model::{ColorScheme, PlanBook, SchemePreset};
use crate::{utils, Result};
use anyhow::{bail, Context};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

const APP_NAME: &str = "budget";
const CONFIG_VERSION: u8 = 1;
const BACKUP_COPIES: u32 = 5;
const BACKUPS: &str = ".backups";
const CONFIG_JSON: &str = "config.json";
const WORKBOOK_JSON: &str = "workbook.json";

/// The `Config` object represents the configuration of the app. You instantiate it by providing
/// the path to `$BUDGET_HOME` and from there it loads `$BUDGET_HOME/config.json`. It provides
/// paths to other items that are either configurable or are expected in a certain location within
/// the budget home directory.
#[derive(Debug, Clone)]
pub struct Config {
    root: PathBuf,
    backups: PathBuf,
    config_path: PathBuf,
    config_file: ConfigFile,
    plans: PlanBook,
}

impl Config {
    /// Creates the home directory, its backups subdirectory and an initial `config.json` with
    /// default settings. The workbook itself is not created here.
    ///
    /// # Errors
    /// - Returns an error if any file operations fail.
    pub async fn create(dir: impl Into<PathBuf>) -> Result<Self> {
        let maybe_relative = dir.into();
        utils::make_dir(&maybe_relative)
            .await
            .context("Unable to create the budget home directory")?;
        let root = utils::canonicalize(&maybe_relative).await?;

        let backups = root.join(BACKUPS);
        utils::make_dir(&backups).await?;

        let config_path = root.join(CONFIG_JSON);
        let config_file = ConfigFile::default();
        config_file.save(&config_path).await?;

        Ok(Self {
            root,
            backups,
            config_path,
            config_file,
            plans: PlanBook::default(),
        })
    }

    /// This will
    /// - validate that `budget_home` and its config file exist
    /// - load the config file and validate any investment plans it defines
    /// - validate that the backups directory exists
    /// - return the loaded configuration object
    pub async fn load(budget_home: impl Into<PathBuf>) -> Result<Self> {
        let maybe_relative = budget_home.into();
        let root = utils::canonicalize(&maybe_relative)
            .await
            .context("Budget Home is missing, run 'budget init' first")?;

        let config_path = root.join(CONFIG_JSON);
        if !config_path.is_file() {
            bail!("The config file is missing '{}'", config_path.display())
        }
        let config_file = ConfigFile::load(&config_path).await?;
        let plans = match &config_file.plans {
            Some(plans) => {
                plans
                    .validate()
                    .with_context(|| format!("Invalid plans in {}", config_path.display()))?;
                plans.clone()
            }
            None => PlanBook::default(),
        };

        let config = Self {
            root: root.clone(),
            backups: root.join(BACKUPS),
            config_path,
            config_file,
            plans,
        };
        if !config.backups.is_dir() {
            bail!(
                "The backups directory is missing '{}'",
                config.backups.display()
            )
        }
        Ok(config)
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

    /// Creates a new `Backup` instance for managing backup files.
    pub fn backup(&self) -> Backup {
        Backup::new(self)
    }

    /// Returns the stored `workbook_path` if it is absolute, resolves it against the home directory
    /// if it is relative, and defaults to `$BUDGET_HOME/workbook.json`.
    pub fn workbook_path(&self) -> PathBuf {
        let p = self.config_file.workbook_path();
        if p.is_absolute() {
            return p;
        }
        self.root.join(p)
    }

    pub fn expenses_scheme(&self) -> ColorScheme {
        self.config_file.expenses_scheme.scheme()
    }

    pub fn earnings_scheme(&self) -> ColorScheme {
        self.config_file.earnings_scheme.scheme()
    }

    pub fn plans(&self) -> &PlanBook {
        &self.plans
    }

    pub async fn load_workbook(&self) -> Result<MemoryWorkbook> {
        let path = self.workbook_path();
        if !path.is_file() {
            bail!("The workbook is missing '{}'", path.display())
        }
        MemoryWorkbook::load(&path).await
    }

    pub async fn save_workbook(&self, workbook: &MemoryWorkbook) -> Result<()> {
        workbook.save(&self.workbook_path()).await
    }
}

/// A chart color scheme given either by preset name or as three explicit colors.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SchemeSetting {
    Preset(SchemePreset),
    Custom(ColorScheme),
}

impl SchemeSetting {
    pub fn scheme(&self) -> ColorScheme {
        match self {
            SchemeSetting::Preset(preset) => preset.scheme(),
            SchemeSetting::Custom(scheme) => *scheme,
        }
    }
}

fn default_expenses_scheme() -> SchemeSetting {
    SchemeSetting::Preset(SchemePreset::RedToYellow)
}

fn default_earnings_scheme() -> SchemeSetting {
    SchemeSetting::Preset(SchemePreset::GreenToLightGreen)
}

/// Represents the serialization and deserialization format of the configuration file.
///
/// Example configuration:
/// ```json
/// {
///   "app_name": "budget",
///   "config_version": 1,
///   "backup_copies": 5,
///   "workbook_path": "workbook.json",
///   "expenses_scheme": "red-to-yellow",
///   "earnings_scheme": { "low": "#adff2f", "mid": "#7cfc7c", "high": "#32cd32" }
/// }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, Eq, PartialEq)]
struct ConfigFile {
    /// Application name, should always be "budget"
    app_name: String,

    /// Configuration file version
    config_version: u8,

    /// Number of backup copies to keep
    backup_copies: u32,

    /// Path to the workbook JSON (optional, relative to the home directory or absolute)
    /// Defaults to $BUDGET_HOME/workbook.json if not specified
    #[serde(default, skip_serializing_if = "Option::is_none")]
    workbook_path: Option<PathBuf>,

    /// Color scheme of the expenses chart
    #[serde(default = "default_expenses_scheme")]
    expenses_scheme: SchemeSetting,

    /// Color scheme of the earnings chart
    #[serde(default = "default_earnings_scheme")]
    earnings_scheme: SchemeSetting,

    /// Replaces the built-in investment plans when present
    #[serde(default, skip_serializing_if = "Option::is_none")]
    plans: Option<PlanBook>,
}

impl Default for ConfigFile {
    fn default() -> Self {
        Self {
            app_name: APP_NAME.to_string(),
            config_version: CONFIG_VERSION,
            backup_copies: BACKUP_COPIES,
            workbook_path: None,
            expenses_scheme: default_expenses_scheme(),
            earnings_scheme: default_earnings_scheme(),
            plans: None,
        }
    }
}

impl ConfigFile {
    /// Loads a ConfigFile asynchronously from the specified path.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read or parsed, or is for another app or a newer
    /// version of this one.
    pub async fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read config file at {}", path.display()))?;

        let config: ConfigFile = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse config file at {}", path.display()))?;

        anyhow::ensure!(
            config.app_name == APP_NAME,
            "Invalid app_name in config file: expected '{}', got '{}'",
            APP_NAME,
            config.app_name
        );
        anyhow::ensure!(
            config.config_version <= CONFIG_VERSION,
            "Unsupported config_version {}, this program understands up to {}",
            config.config_version,
            CONFIG_VERSION
        );

        Ok(config)
    }

    /// Saves the ConfigFile to the specified path.
    pub async fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let p = path.as_ref();
        let data = serde_json::to_string_pretty(self).context("Unable to serialize config")?;
        utils::write(p, data)
            .await
            .context("Unable to write config file")
    }

    pub fn workbook_path(&self) -> PathBuf {
        self.workbook_path
            .clone()
            .unwrap_or_else(|| PathBuf::from(WORKBOOK_JSON))
    }
}
