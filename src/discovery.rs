use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};
use walkdir::WalkDir;

use crate::error::LaunchError;
use crate::tmux::{Multiplexer, Probe};

/// Number of server slots per host
pub const SLOT_COUNT: u8 = 100;

/// A server slot on this host
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Server {
    pub index: u8,
    pub socket: PathBuf,
}

impl Server {
    pub fn new(socket_dir: &Path, index: u8, host: &str) -> Self {
        Self {
            index,
            socket: socket_path(socket_dir, index, host),
        }
    }
}

/// Live servers found in the socket directory
#[derive(Debug, Clone, Default)]
pub struct Discovery {
    /// Ascending by index
    pub live: Vec<Server>,
    /// Stale sockets removed during the scan
    pub pruned: Vec<PathBuf>,
}

impl Discovery {
    /// Lowest-numbered live server
    pub fn default_server(&self) -> Option<&Server> {
        self.live.first()
    }
}

/// `{dir}/{NN}_{host}`
pub fn socket_path(socket_dir: &Path, index: u8, host: &str) -> PathBuf {
    socket_dir.join(format!("{:02}_{}", index, host))
}

/// Slot index encoded in a socket file name, if it belongs to `host`
pub fn socket_index(file_name: &str, host: &str) -> Option<u8> {
    let (digits, rest) = file_name.split_once('_')?;
    if rest != host || digits.len() != 2 || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    digits.parse().ok()
}

pub fn ensure_socket_dir(socket_dir: &Path) -> Result<(), LaunchError> {
    if socket_dir.is_dir() {
        Ok(())
    } else {
        Err(LaunchError::NoSocketDirectory(socket_dir.to_path_buf()))
    }
}

/// Probe every socket for `host`, pruning the ones nothing answers on.
pub async fn discover<M: Multiplexer>(
    mux: &M,
    socket_dir: &Path,
    host: &str,
) -> Result<Discovery, LaunchError> {
    ensure_socket_dir(socket_dir)?;

    let mut candidates: Vec<Server> = WalkDir::new(socket_dir)
        .min_depth(1)
        .max_depth(1)
        .into_iter()
        .filter_map(|entry| entry.ok())
        .filter_map(|entry| {
            let index = socket_index(entry.file_name().to_str()?, host)?;
            Some(Server::new(socket_dir, index, host))
        })
        .collect();
    candidates.sort_by_key(|server| server.index);

    let mut discovery = Discovery::default();
    for server in candidates {
        match mux.probe(&server.socket).await? {
            Probe::Live => {
                debug!(socket = %server.socket.display(), "live server");
                discovery.live.push(server);
            }
            Probe::Dead => {
                if prune(&server.socket) {
                    discovery.pruned.push(server.socket);
                }
            }
            Probe::TimedOut(_) => {
                warn!(socket = %server.socket.display(), "server not answering, skipping");
            }
        }
    }

    Ok(discovery)
}

/// Remove a stale socket. Already gone counts as removed.
fn prune(socket: &Path) -> bool {
    match std::fs::remove_file(socket) {
        Ok(()) => {
            warn!(socket = %socket.display(), "removed stale socket");
            true
        }
        Err(e) if e.kind() == ErrorKind::NotFound => true,
        Err(e) => {
            warn!(socket = %socket.display(), error = %e, "could not remove stale socket");
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tmux::fake::FakeMux;
    use std::fs;
    use tempfile::tempdir;

    fn touch(dir: &Path, name: &str) -> PathBuf {
        let path = dir.join(name);
        fs::write(&path, b"").unwrap();
        path
    }

    #[test]
    fn test_socket_index() {
        assert_eq!(socket_index("00_box", "box"), Some(0));
        assert_eq!(socket_index("42_box", "box"), Some(42));
        assert_eq!(socket_index("42_other", "box"), None);
        assert_eq!(socket_index("4_box", "box"), None);
        assert_eq!(socket_index("100_box", "box"), None);
        assert_eq!(socket_index("ab_box", "box"), None);
        assert_eq!(socket_index("default", "box"), None);
    }

    #[test]
    fn test_socket_path_is_zero_padded() {
        assert_eq!(
            socket_path(Path::new("/s"), 7, "box"),
            PathBuf::from("/s/07_box")
        );
    }

    #[tokio::test]
    async fn test_missing_directory() {
        let dir = tempdir().unwrap();
        let missing = dir.path().join("nope");
        let err = discover(&FakeMux::new(), &missing, "box").await.unwrap_err();
        assert!(matches!(err, LaunchError::NoSocketDirectory(p) if p == missing));
    }

    #[tokio::test]
    async fn test_live_sorted_and_stale_pruned() {
        let dir = tempdir().unwrap();
        let s03 = touch(dir.path(), "03_box");
        let s01 = touch(dir.path(), "01_box");
        let stale = touch(dir.path(), "00_box");
        let foreign = touch(dir.path(), "00_otherhost");
        touch(dir.path(), "notes.txt");

        let mux = FakeMux::new().live(&s03, &[]).live(&s01, &["a"]);
        let found = discover(&mux, dir.path(), "box").await.unwrap();

        let indices: Vec<u8> = found.live.iter().map(|s| s.index).collect();
        assert_eq!(indices, vec![1, 3]);
        assert_eq!(found.default_server().unwrap().socket, s01);
        assert_eq!(found.pruned, vec![stale.clone()]);
        assert!(!stale.exists());
        assert!(foreign.exists());
        // ascending probe order
        assert_eq!(mux.probed(), vec![stale, s01, s03]);
    }

    #[tokio::test]
    async fn test_pruning_is_idempotent() {
        let dir = tempdir().unwrap();
        let live = touch(dir.path(), "02_box");
        touch(dir.path(), "05_box");
        touch(dir.path(), "09_box");

        let mux = FakeMux::new().live(&live, &["x"]);
        let first = discover(&mux, dir.path(), "box").await.unwrap();
        let second = discover(&mux, dir.path(), "box").await.unwrap();

        assert_eq!(first.pruned.len(), 2);
        assert!(second.pruned.is_empty());
        assert_eq!(first.live, second.live);
    }

    #[tokio::test]
    async fn test_hung_server_neither_live_nor_pruned() {
        let dir = tempdir().unwrap();
        let hung = touch(dir.path(), "00_box");

        let mux = FakeMux::new().hung(&hung);
        let found = discover(&mux, dir.path(), "box").await.unwrap();

        assert!(found.live.is_empty());
        assert!(found.pruned.is_empty());
        assert!(hung.exists());
    }
}
