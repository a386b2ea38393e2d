//! Prompts command implementation.

use crate::cli::{Output, PromptsAction};
use crate::config::{PromptConfig, Settings};
use anyhow::Result;

/// Run the prompts command.
pub fn run_prompts(action: &PromptsAction, settings: Settings) -> Result<()> {
    let path = settings.prompts_path();

    match action {
        PromptsAction::Show => {
            let prompts = PromptConfig::load(&path);
            if prompts.is_incomplete() {
                Output::warning("Prompt templates are missing or empty.");
                Output::info("Run 'notat prompts reset' to install the stock templates.");
            }
            Output::header("System prompt");
            println!("{}", prompts.system_prompt);
            Output::header("User prompt");
            println!("{}", prompts.user_prompt);
        }

        PromptsAction::Reset => {
            if PromptConfig::seed().save(&path) {
                Output::success(&format!("Wrote stock templates to {}", path.display()));
            } else {
                Output::error(&format!("Failed to write prompt store {}", path.display()));
            }
        }
    }

    Ok(())
}
