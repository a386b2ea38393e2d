//! CLI output formatting utilities.

use crate::progress::{ProcessingStatus, ProgressEvent, ProgressObserver};
use console::style;

/// Output helper for CLI formatting.
pub struct Output;

impl Output {
    /// Print an info message.
    pub fn info(msg: &str) {
        println!("{} {}", style(">>").cyan().bold(), msg);
    }

    /// Print a success message.
    pub fn success(msg: &str) {
        println!("{} {}", style(">>").green().bold(), msg);
    }

    /// Print a warning message.
    pub fn warning(msg: &str) {
        eprintln!("{} {}", style(">>").yellow().bold(), msg);
    }

    /// Print an error message.
    pub fn error(msg: &str) {
        eprintln!("{} {}", style(">>").red().bold(), msg);
    }

    /// Print a header.
    pub fn header(msg: &str) {
        println!("\n{}", style(msg).bold().underlined());
    }

    /// Print a key-value pair.
    pub fn kv(key: &str, value: &str) {
        println!("  {}: {}", style(key).dim(), value);
    }

    /// Print a list item.
    pub fn list_item(msg: &str) {
        println!("  {} {}", style("*").cyan(), msg);
    }
}

/// Progress observer that renders pipeline events to the console.
pub struct ConsoleObserver;

impl ProgressObserver for ConsoleObserver {
    fn notify(&self, event: &ProgressEvent) {
        match event.status {
            ProcessingStatus::Started => Output::header(&event.message),
            ProcessingStatus::AttemptingRequest | ProcessingStatus::ResponseReceived => {
                Output::info(&event.message)
            }
            ProcessingStatus::Retrying
            | ProcessingStatus::StaleEntry
            | ProcessingStatus::AlreadyProcessed
            | ProcessingStatus::ContentTooShort
            | ProcessingStatus::Cancelled => Output::warning(&event.message),
            ProcessingStatus::Failed => Output::error(&event.message),
            ProcessingStatus::FileCompleted | ProcessingStatus::BatchCompleted => {
                Output::success(&event.message)
            }
        }
    }
}
