//! Prompt templates for the transformation pipeline.
//!
//! The two templates (system instruction and user instruction) are persisted
//! as a small JSON document: `{"system_prompt": "...", "user_prompt": "..."}`.
//! A missing or unparsable store is a configuration warning, not a hard
//! failure; the pipeline itself refuses to run with empty prompts.

use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::warn;

/// The system and user instruction templates driving the AI call.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct PromptConfig {
    pub system_prompt: String,
    pub user_prompt: String,
}

impl PromptConfig {
    /// Load from the given store file.
    ///
    /// Returns empty templates (with a logged warning) when the store is
    /// absent or unparsable.
    pub fn load(path: &Path) -> Self {
        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) => {
                warn!("Prompt store {} could not be read: {}", path.display(), e);
                return Self::default();
            }
        };

        match serde_json::from_str(&content) {
            Ok(prompts) => prompts,
            Err(e) => {
                warn!("Prompt store {} is unparsable: {}", path.display(), e);
                Self::default()
            }
        }
    }

    /// Persist to the given store file.
    ///
    /// I/O failures are reported (logged, `false`) rather than raised, so a
    /// caller can retry or alert the user without unwinding.
    pub fn save(&self, path: &Path) -> bool {
        let content = match serde_json::to_string_pretty(self) {
            Ok(content) => content,
            Err(e) => {
                warn!("Failed to serialize prompts: {}", e);
                return false;
            }
        };

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                if let Err(e) = std::fs::create_dir_all(parent) {
                    warn!("Failed to create {}: {}", parent.display(), e);
                    return false;
                }
            }
        }

        match std::fs::write(path, content) {
            Ok(()) => true,
            Err(e) => {
                warn!("Failed to write prompt store {}: {}", path.display(), e);
                false
            }
        }
    }

    /// True when either template is empty, in which case a transformation
    /// attempt must fail fast instead of calling the provider.
    pub fn is_incomplete(&self) -> bool {
        self.system_prompt.trim().is_empty() || self.user_prompt.trim().is_empty()
    }

    /// The stock templates, used to seed a fresh store.
    pub fn seed() -> Self {
        Self {
            system_prompt: r#"You are an expert technical instructor creating detailed educational content. You will teach complex technical topics in a clear, systematic way that complete beginners can understand and follow successfully.

For any technical content you explain, you will:

1. Break it down into small, logical steps that build upon each other
2. Include complete, well-commented code examples for every programming task
3. Explain both HOW to perform each step and WHY it is necessary
4. Define technical terms and concepts when first introduced
5. Use clear language accessible to beginners
6. Provide extensive context and background information
7. Include troubleshooting guidance for common issues
8. Cover every relevant detail comprehensively
9. Never skip steps or make assumptions about prior knowledge

Your explanations will feature:
- Step-by-step instructions with reasoning
- Detailed code samples with line-by-line comments
- Clear explanations of technical concepts
- Examples that reinforce learning
- Common pitfalls to avoid
- Best practices and tips
- Verification steps to ensure success"#
                .to_string(),
            user_prompt: r#"Based on the included transcript, please provide:
A title which is concise yet descriptive (plain-text) (12 words max)

A summary which is accurate and covers every topic (plain-text) (50 words max).

A content section which is well-structured, extremely detailed and contains:
- Clear formatting and grammar
- Removal of filler phrases ('um', 'actually')
- Organized sections with appropriate headings
- Thorough examples and explanations, without skipping or glossing over any steps
- If the original content is part of a larger series (part 1, part 2, etc.), ensure the new content notes that fact, and note the part at the beginning of the title (eg: "Part 1: Adding data to your RAG AI")

Content section MUST include:
- Main concepts with explanations
- Clear code examples with language tags
- Bold for key points
- Italics for technical terms
- Tables for data/comparisons
- Top-level heading organization
- Bulleted lists for steps/items
- Full step-by-step details
- No skipped concepts
- Series information if applicable"#
                .to_string(),
        }
    }
}
