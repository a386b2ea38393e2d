//! Configuration settings for Notat.

use crate::document::ParserStrategy;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Root configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub general: GeneralSettings,
    pub processing: ProcessingSettings,
    pub stores: StoreSettings,
}

/// General application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralSettings {
    /// Directory for storing application data.
    pub data_dir: String,
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,
}

impl Default for GeneralSettings {
    fn default() -> Self {
        Self {
            data_dir: "~/.notat".to_string(),
            log_level: "info".to_string(),
        }
    }
}

/// Settings for the transformation pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProcessingSettings {
    /// Root directory for reformatted documents.
    pub output_dir: String,
    /// Path to the processing ledger file.
    pub ledger_path: String,
    /// Total attempts for retryable AI-call failures (timeouts, empty
    /// replies, unparsable replies).
    pub max_retries: u32,
    /// Per-call timeout in seconds.
    pub timeout_seconds: u64,
    /// Fixed delay between retry attempts, in milliseconds.
    pub retry_delay_ms: u64,
    /// How raw model replies are parsed (json, labeled).
    pub parser: ParserStrategy,
    /// Model to use when the provider entry does not name one.
    pub default_model: String,
    /// Minimum title length (chars, strict >) for the quality gate.
    pub min_title_length: usize,
    /// Minimum summary length (chars, strict >).
    pub min_summary_length: usize,
    /// Minimum content length (chars, strict >).
    pub min_content_length: usize,
}

impl Default for ProcessingSettings {
    fn default() -> Self {
        Self {
            output_dir: "processed".to_string(),
            ledger_path: ".processed_files.json".to_string(),
            max_retries: 3,
            timeout_seconds: 30,
            retry_delay_ms: 1000,
            parser: ParserStrategy::Json,
            default_model: "o1".to_string(),
            min_title_length: 20,
            min_summary_length: 100,
            min_content_length: 500,
        }
    }
}

/// Locations of the provider and prompt stores.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreSettings {
    /// Path to the provider credentials store.
    pub providers_path: String,
    /// Path to the prompt templates store.
    pub prompts_path: String,
}

impl Default for StoreSettings {
    fn default() -> Self {
        Self {
            providers_path: ".api-keys.json".to_string(),
            prompts_path: ".prompts.json".to_string(),
        }
    }
}

impl Settings {
    /// Load settings from the default configuration file.
    pub fn load() -> crate::error::Result<Self> {
        Self::load_from(None)
    }

    /// Load settings from a specific path, or default location if None.
    pub fn load_from(path: Option<&PathBuf>) -> crate::error::Result<Self> {
        let config_path = match path {
            Some(p) => p.clone(),
            None => Self::default_config_path(),
        };

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            let settings: Settings = toml::from_str(&content)?;
            Ok(settings)
        } else {
            Ok(Settings::default())
        }
    }

    /// Save settings to the default configuration file.
    pub fn save(&self) -> crate::error::Result<()> {
        self.save_to(&Self::default_config_path())
    }

    /// Save settings to a specific path.
    pub fn save_to(&self, path: &PathBuf) -> crate::error::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)
            .map_err(|e| crate::error::NotatError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Get the default configuration file path.
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("notat")
            .join("config.toml")
    }

    /// Expand shell variables in paths (e.g., ~).
    pub fn expand_path(path: &str) -> PathBuf {
        PathBuf::from(shellexpand::tilde(path).to_string())
    }

    /// Get the expanded data directory path.
    pub fn data_dir(&self) -> PathBuf {
        Self::expand_path(&self.general.data_dir)
    }

    /// Get the expanded output directory path.
    pub fn output_dir(&self) -> PathBuf {
        Self::expand_path(&self.processing.output_dir)
    }

    /// Get the expanded ledger path.
    pub fn ledger_path(&self) -> PathBuf {
        Self::expand_path(&self.processing.ledger_path)
    }

    /// Get the expanded provider store path.
    pub fn providers_path(&self) -> PathBuf {
        Self::expand_path(&self.stores.providers_path)
    }

    /// Get the expanded prompt store path.
    pub fn prompts_path(&self) -> PathBuf {
        Self::expand_path(&self.stores.prompts_path)
    }
}
