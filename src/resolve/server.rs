use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use super::Inputs;
use crate::discovery::{ensure_socket_dir, socket_path, Discovery, SLOT_COUNT};
use crate::error::LaunchError;
use crate::menu::{Choice, Chooser, NEW};
use crate::request::{Code, Selector};
use crate::tmux::{Multiplexer, Probe};

/// Which server socket to use and whether it has to be started
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerChoice {
    pub socket: PathBuf,
    pub create: bool,
}

impl ServerChoice {
    fn existing(socket: PathBuf) -> Self {
        Self {
            socket,
            create: false,
        }
    }

    fn new_server(socket: PathBuf) -> Self {
        Self {
            socket,
            create: true,
        }
    }
}

/// Turn the server selector into a socket. `Ok(None)` when the menu was cancelled.
pub async fn resolve_server<M: Multiplexer>(
    mux: &M,
    chooser: Option<&dyn Chooser>,
    inputs: &Inputs,
    selector: &Selector,
    discovery: &Discovery,
) -> Result<Option<ServerChoice>, LaunchError> {
    ensure_socket_dir(&inputs.socket_dir)?;

    let selector = match selector {
        Selector::Char(Code::Default | Code::Query) if discovery.live.is_empty() => {
            debug!(%selector, "no live server, treating as n");
            Selector::Char(Code::New)
        }
        other => other.clone(),
    };

    match selector {
        Selector::Number(index) => explicit_slot(mux, inputs, index).await.map(Some),
        Selector::Char(Code::Default) => match discovery.default_server() {
            Some(server) => Ok(Some(ServerChoice::existing(server.socket.clone()))),
            None => allocate(mux, inputs).await.map(Some),
        },
        Selector::Char(Code::New) => allocate(mux, inputs).await.map(Some),
        Selector::Char(Code::Query) => query(mux, chooser, inputs, discovery).await,
        Selector::Name(name) => Err(LaunchError::Usage(format!(
            "invalid server '{}': expected n, d, q or a number from 0 to 99",
            name
        ))),
    }
}

async fn explicit_slot<M: Multiplexer>(
    mux: &M,
    inputs: &Inputs,
    index: u8,
) -> Result<ServerChoice, LaunchError> {
    if index >= SLOT_COUNT {
        return Err(LaunchError::Usage(format!(
            "server number {} out of range 0..99",
            index
        )));
    }

    let socket = socket_path(&inputs.socket_dir, index, &inputs.host);
    if !socket.exists() {
        return Ok(ServerChoice::new_server(socket));
    }
    match mux.probe(&socket).await? {
        Probe::Live => Ok(ServerChoice::existing(socket)),
        Probe::Dead => Ok(ServerChoice::new_server(socket)),
        Probe::TimedOut(after) => Err(LaunchError::ProbeTimeout { socket, after }),
    }
}

/// First slot without a socket file, else first slot whose socket is stale
async fn allocate<M: Multiplexer>(mux: &M, inputs: &Inputs) -> Result<ServerChoice, LaunchError> {
    let slots = || (0..SLOT_COUNT).map(|i| socket_path(&inputs.socket_dir, i, &inputs.host));

    if let Some(socket) = slots().find(|socket| !socket.exists()) {
        return Ok(ServerChoice::new_server(socket));
    }

    for socket in slots() {
        match mux.probe(&socket).await? {
            Probe::Dead => {
                debug!(socket = %socket.display(), "reusing stale slot");
                return Ok(ServerChoice::new_server(socket));
            }
            Probe::Live => {}
            Probe::TimedOut(_) => warn!(socket = %socket.display(), "server not answering, skipping slot"),
        }
    }

    Err(LaunchError::ServerSlotsExhausted(inputs.socket_dir.clone()))
}

async fn query<M: Multiplexer>(
    mux: &M,
    chooser: Option<&dyn Chooser>,
    inputs: &Inputs,
    discovery: &Discovery,
) -> Result<Option<ServerChoice>, LaunchError> {
    let chooser = chooser.ok_or(LaunchError::NoInteractiveTool)?;

    let mut choices = vec![Choice::new(NEW, "new server")];
    for server in &discovery.live {
        choices.push(Choice::new(
            format!("{:02}", server.index),
            server_label(mux, &server.socket).await,
        ));
    }

    let picked = chooser
        .choose("Pick a tmux server", &choices)
        .map_err(LaunchError::Menu)?;
    let Some(picked) = picked else {
        return Ok(None);
    };

    if picked == NEW {
        return allocate(mux, inputs).await.map(Some);
    }
    discovery
        .live
        .iter()
        .find(|server| format!("{:02}", server.index) == picked)
        .map(|server| Some(ServerChoice::existing(server.socket.clone())))
        .ok_or_else(|| LaunchError::Menu(anyhow::anyhow!("unknown server '{}'", picked)))
}

/// Session names on a server, for the menu
async fn server_label<M: Multiplexer>(mux: &M, socket: &Path) -> String {
    match mux.list_sessions(socket).await {
        Ok(sessions) if sessions.is_empty() => "no sessions".to_string(),
        Ok(sessions) => sessions
            .iter()
            .map(|s| s.name.as_str())
            .collect::<Vec<_>>()
            .join(", "),
        Err(e) => {
            warn!(socket = %socket.display(), error = %e, "could not list sessions");
            "?".to_string()
        }
    }
}
