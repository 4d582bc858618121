mod client;
#[cfg(test)]
pub mod fake;

pub use client::{render_command, TmuxClient};

use std::path::Path;
use std::time::Duration;

use crate::error::LaunchError;

/// A session as reported by `list-sessions`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionInfo {
    pub name: String,
    /// Number of windows
    pub windows: usize,
    /// Number of attached clients
    pub attached: usize,
}

impl SessionInfo {
    #[cfg(test)]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            windows: 1,
            attached: 0,
        }
    }

    /// Short description for menus, e.g. "3 windows, attached"
    pub fn label(&self) -> String {
        let windows = if self.windows == 1 {
            "1 window".to_string()
        } else {
            format!("{} windows", self.windows)
        };
        if self.attached > 0 {
            format!("{}, attached", windows)
        } else {
            windows
        }
    }
}

/// Outcome of asking a socket whether a server is behind it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Probe {
    /// Server answered, with or without sessions
    Live,
    /// Nothing answered; the socket file is stale
    Dead,
    /// Server did not answer within the given bound
    TimedOut(Duration),
}

/// What the resolvers need from the multiplexer daemon.
#[allow(async_fn_in_trait)]
pub trait Multiplexer {
    /// Is a server listening on `socket`?
    ///
    /// Errors only when tmux itself cannot be run.
    async fn probe(&self, socket: &Path) -> Result<Probe, LaunchError>;

    /// Does the server on `socket` have a session named exactly `name`?
    async fn has_session(&self, socket: &Path, name: &str) -> Result<bool, LaunchError>;

    /// Sessions on the server at `socket`, empty if no server is running
    async fn list_sessions(&self, socket: &Path) -> Result<Vec<SessionInfo>, LaunchError>;
}
