//! Init command - first-run setup.

use crate::cli::Output;
use crate::config::{PromptConfig, ProviderRegistry, Settings};
use anyhow::Result;

/// Run the init command.
pub fn run_init(settings: &Settings) -> Result<()> {
    Output::header("Notat Setup");

    // Config file
    let config_path = Settings::default_config_path();
    if config_path.exists() {
        Output::info(&format!("Config already exists at {}", config_path.display()));
    } else {
        settings.save()?;
        Output::success(&format!("Created config at {}", config_path.display()));
    }

    // Prompt store
    let prompts_path = settings.prompts_path();
    let prompts = PromptConfig::load(&prompts_path);
    if prompts.is_incomplete() {
        if PromptConfig::seed().save(&prompts_path) {
            Output::success(&format!("Seeded prompt templates at {}", prompts_path.display()));
        } else {
            Output::error(&format!(
                "Failed to write prompt store {}",
                prompts_path.display()
            ));
        }
    } else {
        Output::info(&format!("Prompt store already set up at {}", prompts_path.display()));
    }

    // Provider store
    let registry = ProviderRegistry::load(settings.providers_path())?;
    if registry.provider_ids().is_empty() {
        Output::warning("No AI providers configured yet.");
        Output::info(&format!(
            "Add credentials to {} under the \"ai-providers\" key:",
            settings.providers_path().display()
        ));
        Output::kv("name", "display name");
        Output::kv("api_key", "provider API key");
        Output::kv("base_url", "OpenAI-compatible endpoint");
        Output::kv("model", "model identifier (optional)");
    } else {
        Output::success(&format!(
            "{} provider(s) configured.",
            registry.provider_ids().len()
        ));
    }

    Ok(())
}
