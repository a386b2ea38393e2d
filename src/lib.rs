//! Notat - Transcript Reformatting
//!
//! A CLI tool for turning downloaded video-transcript records into structured
//! educational documents with an AI provider.
//!
//! The name "Notat" comes from the Norwegian word for "note."
//!
//! # Overview
//!
//! Notat allows you to:
//! - Reformat transcript JSON files into {title, summary, content} documents
//! - Skip inputs that were already processed (idempotent re-runs)
//! - Manage multiple AI provider configurations with a default alias
//! - Customize the prompt templates driving the reformatting
//!
//! # Architecture
//!
//! The library is organized into several modules:
//!
//! - `config` - Settings, provider registry and prompt store
//! - `sanitize` - Filename sanitization for output paths
//! - `document` - Document model and response parsing strategies
//! - `client` - AI request client with timeout and bounded retry
//! - `ledger` - Idempotent processing ledger
//! - `progress` - Progress event interface
//! - `transformer` - Pipeline coordination
//!
//! # Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use notat::config::{PromptConfig, ProviderRegistry, Settings, DEFAULT_PROVIDER};
//! use notat::progress::NullObserver;
//! use notat::transformer::TranscriptTransformer;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let settings = Settings::load()?;
//!     let registry = ProviderRegistry::load(settings.providers_path())?;
//!     let provider = registry.select(DEFAULT_PROVIDER)?;
//!     let prompts = PromptConfig::load(&settings.prompts_path());
//!
//!     let transformer =
//!         TranscriptTransformer::new(&settings, &provider, prompts, Arc::new(NullObserver))?;
//!     let outcome = transformer.process_file("transcripts/video.json".as_ref()).await?;
//!     println!("{:?}", outcome);
//!
//!     Ok(())
//! }
//! ```

pub mod cli;
pub mod client;
pub mod config;
pub mod document;
pub mod error;
pub mod ledger;
pub mod progress;
pub mod sanitize;
pub mod transformer;

pub use error::{NotatError, ProcessingError, Result};
