//! CLI command implementations.

mod config;
mod init;
mod process;
mod prompts;
mod providers;

pub use config::run_config;
pub use init::run_init;
pub use process::run_process;
pub use prompts::run_prompts;
pub use providers::run_providers;
