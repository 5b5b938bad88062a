use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Root configuration container.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub shell: ShellConfig,
    #[serde(default)]
    pub terminal: TerminalConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Process started inside the pseudo-terminal.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShellConfig {
    /// Program to run (default: `$SHELL`, falling back to `bash`).
    #[serde(default)]
    pub program: Option<String>,
    /// Extra arguments passed to the program.
    #[serde(default)]
    pub args: Vec<String>,
    /// Value for `$TERM` (default: `xterm-256color`).
    #[serde(default)]
    pub term: Option<String>,
    /// Working directory (default: current directory).
    #[serde(default)]
    pub cwd: Option<PathBuf>,
}

/// Rendering and grid settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TerminalConfig {
    /// Display refresh rate in frames per second (default: 60).
    #[serde(default = "default_frame_rate")]
    pub frame_rate: u32,
    /// Lines of history kept by the emulator (default: 10000).
    #[serde(default = "default_scrollback_lines")]
    pub scrollback_lines: usize,
    /// Grid rows used when the pseudo-terminal is opened (default: 24).
    #[serde(default = "default_initial_rows")]
    pub initial_rows: u16,
    /// Grid columns used when the pseudo-terminal is opened (default: 80).
    #[serde(default = "default_initial_cols")]
    pub initial_cols: u16,
}

/// Diagnostic log settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// `tracing` filter directive. `RUST_LOG` takes precedence.
    #[serde(default = "default_log_filter")]
    pub filter: String,
    /// Log file path (default: `<cache dir>/frameterm/frameterm.log`).
    #[serde(default)]
    pub file: Option<PathBuf>,
}

pub const MAX_FRAME_RATE: u32 = 240;

fn default_frame_rate() -> u32 {
    60
}

fn default_scrollback_lines() -> usize {
    10_000
}

fn default_initial_rows() -> u16 {
    24
}

fn default_initial_cols() -> u16 {
    80
}

fn default_log_filter() -> String {
    "info".to_string()
}

impl Default for TerminalConfig {
    fn default() -> Self {
        Self {
            frame_rate: default_frame_rate(),
            scrollback_lines: default_scrollback_lines(),
            initial_rows: default_initial_rows(),
            initial_cols: default_initial_cols(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: default_log_filter(),
            file: None,
        }
    }
}
