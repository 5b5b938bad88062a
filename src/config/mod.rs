//! Configuration: TOML file plus defaults.

mod loader;
mod types;

pub use loader::ConfigError;
pub use types::{Config, LoggingConfig, ShellConfig, TerminalConfig, MAX_FRAME_RATE};
