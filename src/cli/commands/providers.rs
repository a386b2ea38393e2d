//! Providers command implementation.

use crate::cli::{Output, ProvidersAction};
use crate::config::{ProviderRegistry, Settings, DEFAULT_PROVIDER};
use anyhow::Result;

/// Run the providers command.
pub fn run_providers(action: &ProvidersAction, settings: Settings) -> Result<()> {
    let mut registry = ProviderRegistry::load(settings.providers_path())?;

    match action {
        ProvidersAction::List => {
            let ids = registry.provider_ids();
            if ids.is_empty() {
                Output::warning("No providers configured.");
                Output::info(&format!(
                    "Add entries to {} under the \"ai-providers\" key.",
                    settings.providers_path().display()
                ));
                return Ok(());
            }

            let default = registry.select(DEFAULT_PROVIDER).ok();
            Output::header("Configured providers");
            for id in ids {
                let provider = registry.select(&id)?;
                let is_default = default
                    .as_ref()
                    .is_some_and(|d| d.name == provider.name && d.base_url == provider.base_url);
                let marker = if is_default { " (default)" } else { "" };
                Output::list_item(&format!(
                    "{} - {} [{}]{}",
                    id,
                    provider.name,
                    provider.model.as_deref().unwrap_or("default model"),
                    marker
                ));
            }
        }

        ProvidersAction::SetDefault { provider_id } => {
            registry.set_default(provider_id)?;
            Output::success(&format!("'{}' is now the default provider.", provider_id));
        }
    }

    Ok(())
}
