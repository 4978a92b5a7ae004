//! Folder layout configuration.
//!
//! Resolution order, later wins: built-in defaults rooted at the current
//! directory, a JSON config file, then the `TS_ORGANIZER_ROOT` variable.

use crate::error::{OrganizerError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Component, Path, PathBuf};

/// Overrides the root folder
pub const ROOT_ENV: &str = "TS_ORGANIZER_ROOT";

/// Points at a JSON config file
pub const CONFIG_ENV: &str = "TS_ORGANIZER_CONFIG";

/// Where the organizer reads and writes
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct OrganizerConfig {
    /// Project root holding all the folders below
    pub root: PathBuf,
    /// Drop folder for incoming PDFs
    pub data_in: String,
    /// Staging subfolder, used both under `data_in` and under `data_work`
    pub staging: String,
    pub data_work: String,
    pub archive: String,
}

impl Default for OrganizerConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from("."),
            data_in: "Data_in".to_string(),
            staging: "TS".to_string(),
            data_work: "Data_work".to_string(),
            archive: "TS_archive".to_string(),
        }
    }
}

impl OrganizerConfig {
    /// Defaults rooted at `root`
    pub fn with_root(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            ..Self::default()
        }
    }

    /// Resolve from the environment and the optional config file
    pub fn load() -> Result<Self> {
        let file = std::env::var_os(CONFIG_ENV)
            .map(PathBuf::from)
            .or_else(Self::default_config_file);
        let root = std::env::var_os(ROOT_ENV).map(PathBuf::from);
        Self::resolve(file.as_deref(), root)
    }

    /// `<config dir>/ts-organizer/config.json`
    fn default_config_file() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join("ts-organizer").join("config.json"))
    }

    /// Merge a config file (when present) and a root override over defaults
    pub fn resolve(file: Option<&Path>, root_override: Option<PathBuf>) -> Result<Self> {
        let mut config = match file {
            Some(path) if path.exists() => Self::from_file(path)?,
            _ => Self::default(),
        };
        if let Some(root) = root_override {
            config.root = root;
        }
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path).map_err(|e| OrganizerError::io("read config", path, e))?;
        serde_json::from_str(&json)
            .map_err(|e| OrganizerError::Config(format!("{}: {}", path.display(), e)))
    }

    /// Folder names must be single, ordinary path components
    pub fn validate(&self) -> Result<()> {
        for (field, value) in [
            ("dataIn", &self.data_in),
            ("staging", &self.staging),
            ("dataWork", &self.data_work),
            ("archive", &self.archive),
        ] {
            let mut components = Path::new(value).components();
            let single = matches!(components.next(), Some(Component::Normal(_)))
                && components.next().is_none();
            if !single {
                return Err(OrganizerError::Config(format!(
                    "{} must be a plain folder name, got '{}'",
                    field, value
                )));
            }
        }
        Ok(())
    }

    /// `<root>/Data_in`
    pub fn data_in_dir(&self) -> PathBuf {
        self.root.join(&self.data_in)
    }

    /// `<root>/Data_in/TS`
    pub fn staging_dir(&self) -> PathBuf {
        self.data_in_dir().join(&self.staging)
    }

    /// `<root>/Data_work`
    pub fn data_work_dir(&self) -> PathBuf {
        self.root.join(&self.data_work)
    }

    /// `<root>/Data_work/TS`
    pub fn final_dir(&self) -> PathBuf {
        self.data_work_dir().join(&self.staging)
    }

    /// `<root>/TS_archive`
    pub fn archive_dir(&self) -> PathBuf {
        self.root.join(&self.archive)
    }
}
