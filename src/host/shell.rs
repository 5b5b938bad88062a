use portable_pty::CommandBuilder;
use std::path::{Path, PathBuf};

use crate::config::ShellConfig;

#[cfg(windows)]
const DEFAULT_TERM: &str = "cygwin";
#[cfg(not(windows))]
const DEFAULT_TERM: &str = "xterm-256color";

/// Fully resolved command for the session's shell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShellCommand {
    program: String,
    args: Vec<String>,
    env: Vec<(String, String)>,
    cwd: Option<PathBuf>,
}

impl ShellCommand {
    /// Resolve from config and the process environment.
    pub fn resolve(config: &ShellConfig) -> Self {
        Self::resolve_with(config, std::env::var("SHELL").ok())
    }

    /// Resolve with an explicit `$SHELL` value.
    ///
    /// Precedence for the program: config, then `$SHELL`, then the platform
    /// default (`bash`, or `powershell.exe` on Windows).
    pub fn resolve_with(config: &ShellConfig, env_shell: Option<String>) -> Self {
        let program = config
            .program
            .clone()
            .unwrap_or_else(|| default_program(env_shell));
        let term = config
            .term
            .clone()
            .unwrap_or_else(|| DEFAULT_TERM.to_string());

        Self {
            program,
            args: config.args.clone(),
            env: vec![("TERM".to_string(), term)],
            cwd: config.cwd.clone(),
        }
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    pub fn args(&self) -> &[String] {
        &self.args
    }

    pub fn env(&self) -> &[(String, String)] {
        &self.env
    }

    pub fn cwd(&self) -> Option<&Path> {
        self.cwd.as_deref()
    }

    pub fn to_command_builder(&self) -> CommandBuilder {
        let mut cmd = CommandBuilder::new(&self.program);
        cmd.args(&self.args);
        for (key, value) in &self.env {
            cmd.env(key, value);
        }
        match &self.cwd {
            Some(cwd) => cmd.cwd(cwd),
            None => {
                if let Ok(dir) = std::env::current_dir() {
                    cmd.cwd(dir);
                }
            }
        }
        cmd
    }
}

#[cfg(windows)]
fn default_program(_env_shell: Option<String>) -> String {
    "powershell.exe".to_string()
}

#[cfg(not(windows))]
fn default_program(env_shell: Option<String>) -> String {
    env_shell
        .filter(|shell| !shell.trim().is_empty())
        .unwrap_or_else(|| "bash".to_string())
}
