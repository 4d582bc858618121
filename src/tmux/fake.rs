//! Scripted stand-in for tmux used by the resolver tests.

use std::cell::RefCell;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use super::{Multiplexer, Probe, SessionInfo};
use crate::error::LaunchError;

#[derive(Default)]
pub struct FakeMux {
    servers: HashMap<PathBuf, (Probe, Vec<String>)>,
    probes: RefCell<Vec<PathBuf>>,
}

impl FakeMux {
    pub fn new() -> Self {
        Self::default()
    }

    /// A live server on `socket` with the given session names
    pub fn live(mut self, socket: impl Into<PathBuf>, sessions: &[&str]) -> Self {
        let sessions = sessions.iter().map(|s| s.to_string()).collect();
        self.servers.insert(socket.into(), (Probe::Live, sessions));
        self
    }

    /// A server on `socket` that never answers
    pub fn hung(mut self, socket: impl Into<PathBuf>) -> Self {
        self.servers.insert(
            socket.into(),
            (Probe::TimedOut(Duration::from_millis(10)), Vec::new()),
        );
        self
    }

    /// Sockets probed so far, in order
    pub fn probed(&self) -> Vec<PathBuf> {
        self.probes.borrow().clone()
    }

    fn server(&self, socket: &Path) -> Result<Option<&Vec<String>>, LaunchError> {
        match self.servers.get(socket) {
            Some((Probe::Live, sessions)) => Ok(Some(sessions)),
            Some((Probe::TimedOut(after), _)) => Err(LaunchError::ProbeTimeout {
                socket: socket.to_path_buf(),
                after: *after,
            }),
            _ => Ok(None),
        }
    }
}

impl Multiplexer for FakeMux {
    async fn probe(&self, socket: &Path) -> Result<Probe, LaunchError> {
        self.probes.borrow_mut().push(socket.to_path_buf());
        Ok(self
            .servers
            .get(socket)
            .map(|(probe, _)| *probe)
            .unwrap_or(Probe::Dead))
    }

    async fn has_session(&self, socket: &Path, name: &str) -> Result<bool, LaunchError> {
        Ok(self
            .server(socket)?
            .is_some_and(|sessions| sessions.iter().any(|s| s == name)))
    }

    async fn list_sessions(&self, socket: &Path) -> Result<Vec<SessionInfo>, LaunchError> {
        Ok(self
            .server(socket)?
            .map(|sessions| sessions.iter().map(SessionInfo::new).collect())
            .unwrap_or_default())
    }
}
