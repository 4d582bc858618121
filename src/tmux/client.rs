use std::path::Path;
use std::process::{Output, Stdio};
use std::time::Duration;

use tokio::process::Command;
use tracing::debug;

use super::{Multiplexer, Probe, SessionInfo};
use crate::error::LaunchError;

/// Client for talking to tmux servers by socket path via CLI
pub struct TmuxClient {
    /// Path to tmux binary
    tmux_path: String,
    /// Upper bound for any single query
    timeout: Duration,
}

impl TmuxClient {
    pub fn new(tmux_path: impl Into<String>, timeout: Duration) -> Self {
        Self {
            tmux_path: tmux_path.into(),
            timeout,
        }
    }

    fn command(&self, socket: &Path) -> Command {
        let mut cmd = Command::new(&self.tmux_path);
        cmd.arg("-S").arg(socket);
        cmd
    }

    /// Run a short query against one server, bounded by the probe timeout
    async fn query(&self, socket: &Path, args: &[&str]) -> Result<Output, LaunchError> {
        let mut cmd = self.command(socket);
        cmd.args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        match tokio::time::timeout(self.timeout, cmd.output()).await {
            Ok(output) => output.map_err(LaunchError::Tmux),
            Err(_) => Err(LaunchError::ProbeTimeout {
                socket: socket.to_path_buf(),
                after: self.timeout,
            }),
        }
    }

    /// Get the command to attach to a session, or to the server's own pick
    pub fn attach_command(&self, socket: &Path, session: Option<&str>) -> Vec<String> {
        let mut cmd = self.base_args(socket);
        cmd.push("attach-session".to_string());
        if let Some(name) = session {
            cmd.push("-t".to_string());
            cmd.push(exact_target(name));
        }
        cmd
    }

    /// Get the command that creates (and attaches to) a session.
    ///
    /// Starts the server too when nothing listens on `socket` yet.
    pub fn new_session_command(
        &self,
        socket: &Path,
        session: Option<&str>,
        work_dir: &Path,
    ) -> Vec<String> {
        let mut cmd = self.base_args(socket);
        cmd.push("new-session".to_string());
        if let Some(name) = session {
            cmd.push("-s".to_string());
            cmd.push(name.to_string());
        }
        cmd.push("-c".to_string());
        cmd.push(work_dir.to_string_lossy().to_string());
        cmd
    }

    fn base_args(&self, socket: &Path) -> Vec<String> {
        vec![
            self.tmux_path.clone(),
            "-S".to_string(),
            socket.to_string_lossy().to_string(),
        ]
    }
}

impl Multiplexer for TmuxClient {
    async fn probe(&self, socket: &Path) -> Result<Probe, LaunchError> {
        let output = match self.query(socket, &["list-sessions", "-F", "#{session_name}"]).await {
            Ok(output) => output,
            Err(LaunchError::ProbeTimeout { after, .. }) => return Ok(Probe::TimedOut(after)),
            Err(e) => return Err(e),
        };

        if output.status.success() {
            return Ok(Probe::Live);
        }

        let stderr = String::from_utf8_lossy(&output.stderr);
        debug!(socket = %socket.display(), stderr = %stderr.trim(), "probe failed");
        // A server with exit-empty off answers but has nothing to list
        if stderr.contains("no sessions") {
            Ok(Probe::Live)
        } else {
            Ok(Probe::Dead)
        }
    }

    async fn has_session(&self, socket: &Path, name: &str) -> Result<bool, LaunchError> {
        let target = exact_target(name);
        let output = self
            .query(socket, &["has-session", "-t", target.as_str()])
            .await?;
        Ok(output.status.success())
    }

    async fn list_sessions(&self, socket: &Path) -> Result<Vec<SessionInfo>, LaunchError> {
        // Format: session_name|session_windows|session_attached
        let output = self
            .query(
                socket,
                &[
                    "list-sessions",
                    "-F",
                    "#{session_name}|#{session_windows}|#{session_attached}",
                ],
            )
            .await?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            if stderr.contains("no server running")
                || stderr.contains("no sessions")
                || stderr.contains("error connecting")
            {
                return Ok(Vec::new());
            }
            return Err(LaunchError::TmuxFailed {
                command: "list-sessions".to_string(),
                stderr: stderr.trim().to_string(),
            });
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        Ok(stdout.lines().filter_map(parse_session_line).collect())
    }
}

/// `=name` makes tmux match the session name exactly instead of by prefix
fn exact_target(name: &str) -> String {
    format!("={}", name)
}

fn parse_session_line(line: &str) -> Option<SessionInfo> {
    // Split from the right: session names may themselves contain '|'
    let mut parts = line.rsplitn(3, '|');
    let attached = parts.next()?.parse().ok()?;
    let windows = parts.next()?.parse().ok()?;
    let name = parts.next()?;
    if name.is_empty() {
        return None;
    }

    Some(SessionInfo {
        name: name.to_string(),
        windows,
        attached,
    })
}

#[cfg(test)]
impl Default for TmuxClient {
    fn default() -> Self {
        Self::new("tmux", Duration::from_secs(2))
    }
}

/// Display form of a command line for dry runs and logs
pub fn render_command(cmd: &[String]) -> String {
    cmd.iter()
        .map(|arg| {
            if arg.is_empty() || arg.contains(|c: char| c.is_whitespace() || c == '\'') {
                format!("'{}'", arg.replace('\'', r"'\''"))
            } else {
                arg.clone()
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}
