//! AI provider registry.
//!
//! Provider credentials live in a small keyed JSON store:
//!
//! ```json
//! {
//!   "ai-providers": {
//!     "openai": { "name": "OpenAI", "api_key": "...", "base_url": "...", "model": "..." },
//!     "default": { ...copy of one of the above... }
//!   }
//! }
//! ```
//!
//! The `"default"` entry is a persisted copy, not a reference: later edits to
//! the original provider do not retroactively change the default.

use crate::error::{NotatError, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Key under which the default provider copy is stored.
pub const DEFAULT_PROVIDER: &str = "default";

/// A named AI backend configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProviderConfig {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub api_key: String,
    #[serde(default)]
    pub base_url: String,
    #[serde(default)]
    pub model: Option<String>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct ProviderStore {
    #[serde(rename = "ai-providers", default)]
    providers: BTreeMap<String, ProviderConfig>,
}

/// Loads and selects provider configurations from the keyed store.
pub struct ProviderRegistry {
    path: PathBuf,
    store: ProviderStore,
}

impl ProviderRegistry {
    /// Load the registry from the given store file.
    pub fn load(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let store = if path.exists() {
            let content = std::fs::read_to_string(&path)?;
            serde_json::from_str(&content)?
        } else {
            ProviderStore::default()
        };
        Ok(Self { path, store })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Select a provider by id.
    pub fn select(&self, provider_id: &str) -> Result<ProviderConfig> {
        self.store
            .providers
            .get(provider_id)
            .cloned()
            .ok_or_else(|| NotatError::Provider(format!("Provider '{}' not found", provider_id)))
    }

    /// All provider ids in the store, excluding the default alias.
    pub fn provider_ids(&self) -> Vec<String> {
        self.store
            .providers
            .keys()
            .filter(|k| k.as_str() != DEFAULT_PROVIDER)
            .cloned()
            .collect()
    }

    /// Persist a copy of the named provider under the `"default"` key.
    pub fn set_default(&mut self, provider_id: &str) -> Result<()> {
        let config = self.select(provider_id)?;
        self.store
            .providers
            .insert(DEFAULT_PROVIDER.to_string(), config);
        self.persist()
    }

    /// Insert or replace a provider entry and persist the store.
    pub fn upsert(&mut self, provider_id: &str, config: ProviderConfig) -> Result<()> {
        self.store
            .providers
            .insert(provider_id.to_string(), config);
        self.persist()
    }

    fn persist(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let content = serde_json::to_string_pretty(&self.store)?;
        std::fs::write(&self.path, content)?;
        Ok(())
    }
}
