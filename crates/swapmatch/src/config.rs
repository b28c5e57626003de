use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use swapmatch_core::{EngineConfig, DEFAULT_CONTACT_PLACEHOLDER};

/// File name of the store inside the data directory.
pub const DB_FILE_NAME: &str = "swapmatch.redb";

/// Contents of `swapmatch.toml`. Every section and key is optional.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SwapConfig {
    pub storage: StorageSection,
    pub engine: EngineSection,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageSection {
    pub data_dir: PathBuf,
}

impl Default for StorageSection {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("./data"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineSection {
    pub contact_placeholder: String,
    pub disclose_cycle_contacts: bool,
}

impl Default for EngineSection {
    fn default() -> Self {
        Self {
            contact_placeholder: DEFAULT_CONTACT_PLACEHOLDER.to_string(),
            disclose_cycle_contacts: true,
        }
    }
}

impl SwapConfig {
    /// Parse the file at `path`.
    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("reading {}", path.display()))?;
        let config = toml::from_str(&raw).with_context(|| format!("parsing {}", path.display()))?;
        Ok(config)
    }

    /// Parse the file at `path`, falling back to defaults when it is absent
    /// or unreadable.
    pub fn load_or_default(path: &Path) -> Self {
        if !path.exists() {
            return Self::default();
        }
        match Self::load(path) {
            Ok(config) => config,
            Err(e) => {
                tracing::warn!("Ignoring {}: {:#}", path.display(), e);
                Self::default()
            }
        }
    }

    /// Apply the command-line data directory override, if any.
    pub fn with_data_dir(mut self, data_dir: Option<PathBuf>) -> Self {
        if let Some(dir) = data_dir {
            self.storage.data_dir = dir;
        }
        self
    }

    pub fn db_path(&self) -> PathBuf {
        self.storage.data_dir.join(DB_FILE_NAME)
    }

    pub fn engine_config(&self) -> EngineConfig {
        EngineConfig::new()
            .with_contact_placeholder(self.engine.contact_placeholder.clone())
            .with_disclose_cycle_contacts(self.engine.disclose_cycle_contacts)
    }

    /// Human-readable problems; empty when the config is usable.
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();
        if self.storage.data_dir.as_os_str().is_empty() {
            errors.push("storage.data_dir must not be empty".to_string());
        }
        if self.storage.data_dir.is_file() {
            errors.push(format!(
                "storage.data_dir {} is a file, not a directory",
                self.storage.data_dir.display()
            ));
        }
        if let Err(e) = self.engine_config().validate() {
            errors.push(format!("engine.{}", e));
        }
        errors
    }

    /// Create the data directory if needed.
    pub fn ensure_data_dir(&self) -> Result<()> {
        if !self.storage.data_dir.exists() {
            std::fs::create_dir_all(&self.storage.data_dir).with_context(|| {
                format!("creating data dir {}", self.storage.data_dir.display())
            })?;
        }
        Ok(())
    }
}
