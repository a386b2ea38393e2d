//! Configuration module for Notat.
//!
//! Handles application settings, the provider credential store, and the
//! prompt template store.

mod prompts;
mod providers;
mod settings;

pub use prompts::PromptConfig;
pub use providers::{ProviderConfig, ProviderRegistry, DEFAULT_PROVIDER};
pub use settings::{GeneralSettings, ProcessingSettings, Settings, StoreSettings};
