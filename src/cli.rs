use clap::Parser;
use std::path::PathBuf;

use crate::config::Config;

/// A frame-paced terminal that runs your shell inside the current terminal
#[derive(Parser, Debug, Default, PartialEq, Eq)]
#[command(name = "frameterm")]
#[command(version, long_about = None)]
pub struct Cli {
    /// Path to configuration file (default: <config dir>/frameterm/config.toml)
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Shell program to run instead of the configured one
    #[arg(long, value_name = "PROGRAM")]
    pub shell: Option<String>,

    /// Output frame rate in frames per second (1-240)
    #[arg(long, value_name = "N")]
    pub fps: Option<u32>,

    /// Path to log file (default: <cache dir>/frameterm/frameterm.log)
    #[arg(long, value_name = "PATH")]
    pub log_file: Option<PathBuf>,

    /// Arguments passed to the shell; replaces `shell.args` from the config
    #[arg(last = true, value_name = "ARGS")]
    pub args: Vec<String>,
}

impl Cli {
    /// Overlay command-line overrides on a loaded config.
    pub fn apply(&self, config: &mut Config) {
        if let Some(shell) = &self.shell {
            config.shell.program = Some(shell.clone());
        }
        if let Some(fps) = self.fps {
            config.terminal.frame_rate = fps;
        }
        if let Some(path) = &self.log_file {
            config.logging.file = Some(path.clone());
        }
        if !self.args.is_empty() {
            config.shell.args = self.args.clone();
        }
    }
}
