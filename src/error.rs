use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

use crate::config::ConfigError;

/// Everything that can stop a launch before tmux takes over.
#[derive(Debug, Error)]
pub enum LaunchError {
    /// Argument shape not understood
    #[error("{0}")]
    Usage(String),

    #[error("socket directory '{}' does not exist", .0.display())]
    NoSocketDirectory(PathBuf),

    #[error("no interactive menu available (install dialog or whiptail, or run from a terminal)")]
    NoInteractiveTool,

    #[error("all 100 server slots in '{}' are held by live or unresponsive servers", .0.display())]
    ServerSlotsExhausted(PathBuf),

    #[error("tmux server at '{}' did not answer within {}ms", .socket.display(), .after.as_millis())]
    ProbeTimeout { socket: PathBuf, after: Duration },

    #[error("failed to run tmux: {0}")]
    Tmux(#[source] std::io::Error),

    #[error("tmux {command} failed: {stderr}")]
    TmuxFailed { command: String, stderr: String },

    #[error("interactive menu failed: {0:#}")]
    Menu(anyhow::Error),

    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl LaunchError {
    /// Process exit code for this error
    pub fn exit_code(&self) -> u8 {
        match self {
            LaunchError::Usage(_) => 2,
            _ => 1,
        }
    }
}
