//! Process command implementation.

use crate::cli::{ConsoleObserver, Output};
use crate::config::{PromptConfig, ProviderRegistry, Settings, DEFAULT_PROVIDER};
use crate::error::NotatError;
use crate::transformer::TranscriptTransformer;
use anyhow::Result;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Run the process command.
pub async fn run_process(
    paths: &[PathBuf],
    recursive: bool,
    provider_id: Option<String>,
    settings: Settings,
) -> Result<()> {
    for path in paths {
        if !path.exists() {
            Output::error(&format!("Path does not exist: {}", path.display()));
            return Err(anyhow::anyhow!("invalid input path"));
        }
    }

    let registry = ProviderRegistry::load(settings.providers_path())?;
    let provider_id = provider_id.as_deref().unwrap_or(DEFAULT_PROVIDER);
    let provider = registry.select(provider_id).map_err(|e| {
        Output::error(&format!("{}", e));
        Output::info("Add provider credentials to the provider store, or pick one with --provider.");
        e
    })?;

    let prompts = PromptConfig::load(&settings.prompts_path());
    if prompts.is_incomplete() {
        Output::error("Prompt templates are empty.");
        Output::info("Run 'notat prompts reset' to install the stock templates.");
        return Err(anyhow::anyhow!("prompts not configured"));
    }

    let observer = Arc::new(ConsoleObserver);
    let transformer = TranscriptTransformer::new(&settings, &provider, prompts, observer)?;

    // Ctrl-C requests cancellation; it takes effect between files.
    let cancel = Arc::new(AtomicBool::new(false));
    {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                cancel.store(true, Ordering::Relaxed);
            }
        });
    }

    match transformer.process_batch(paths, recursive, Some(&cancel)).await {
        Ok(summary) => {
            // Partial failure exits non-zero so scripted callers can detect it.
            if summary.failed > 0 {
                Output::warning(&format!("{} file(s) failed", summary.failed));
                return Err(anyhow::anyhow!("{} file(s) failed to process", summary.failed));
            }
            Ok(())
        }
        Err(NotatError::Cancelled) => Ok(()),
        Err(e) => {
            Output::error(&format!("Processing failed: {}", e));
            Err(e.into())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PromptConfig;

    fn settings_in(dir: &std::path::Path) -> Settings {
        let mut settings = Settings::default();
        settings.processing.output_dir = dir.join("processed").to_string_lossy().into_owned();
        settings.processing.ledger_path = dir.join("ledger.json").to_string_lossy().into_owned();
        settings.stores.providers_path = dir.join("keys.json").to_string_lossy().into_owned();
        settings.stores.prompts_path = dir.join("prompts.json").to_string_lossy().into_owned();
        settings
    }

    fn write_default_provider(settings: &Settings) {
        let store = serde_json::json!({
            "ai-providers": {
                "default": {
                    "name": "Acme AI",
                    "api_key": "sk-test",
                    "base_url": "https://api.acme.test/v1",
                    "model": "acme-large"
                }
            }
        });
        std::fs::write(settings.providers_path(), store.to_string()).unwrap();
    }

    #[tokio::test]
    async fn test_batch_with_failures_exits_nonzero() {
        let dir = tempfile::tempdir().unwrap();
        let settings = settings_in(dir.path());
        write_default_provider(&settings);
        assert!(PromptConfig::seed().save(&settings.prompts_path()));

        // Malformed input fails before any provider call is made.
        let input = dir.path().join("bad.json");
        std::fs::write(&input, "not a transcript record").unwrap();

        let result = run_process(&[input], false, None, settings).await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_missing_prompts_exit_nonzero() {
        let dir = tempfile::tempdir().unwrap();
        let settings = settings_in(dir.path());
        write_default_provider(&settings);

        let input = dir.path().join("input.json");
        std::fs::write(&input, "{}").unwrap();

        let result = run_process(&[input], false, None, settings).await;
        assert!(result.is_err());
    }
}
