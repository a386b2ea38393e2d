//! CLI module for Notat.

pub mod commands;
mod output;

pub use output::{ConsoleObserver, Output};

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Notat - Transcript Reformatting
///
/// Turn downloaded video-transcript JSON files into structured educational
/// documents with an AI provider. The name "Notat" comes from the Norwegian
/// word for "note."
#[derive(Parser, Debug)]
#[command(name = "notat")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Increase verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Path to configuration file
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Initialize Notat: create the config file and seed the prompt store
    Init,

    /// Reformat transcript files and/or directories of transcript files
    Process {
        /// Transcript JSON files or directories containing them
        #[arg(required = true)]
        paths: Vec<PathBuf>,

        /// Descend into subdirectories when a directory is given
        #[arg(short, long)]
        recursive: bool,

        /// Provider id from the provider store (defaults to "default")
        #[arg(short, long)]
        provider: Option<String>,
    },

    /// Manage AI provider configurations
    Providers {
        #[command(subcommand)]
        action: ProvidersAction,
    },

    /// Manage the prompt templates driving the reformatting
    Prompts {
        #[command(subcommand)]
        action: PromptsAction,
    },

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand, Debug)]
pub enum ProvidersAction {
    /// List provider ids in the store
    List,

    /// Persist a copy of a provider's config under the "default" alias
    SetDefault {
        /// Provider id to make the default
        provider_id: String,
    },
}

#[derive(Subcommand, Debug)]
pub enum PromptsAction {
    /// Show the current prompt templates
    Show,

    /// Reset the prompt store to the stock templates
    Reset,
}

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Show current configuration
    Show,

    /// Show configuration file path
    Path,
}
