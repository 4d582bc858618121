//! Maps a normalized request plus live tmux state to a concrete plan.

mod server;
mod session;

use server::resolve_server;
use session::resolve_session;

use std::path::PathBuf;

use tracing::debug;

use crate::discovery::Discovery;
use crate::error::LaunchError;
use crate::menu::Chooser;
use crate::request::{Code, Request, Selector};
use crate::tmux::Multiplexer;

/// Fixed inputs for one run
#[derive(Debug, Clone)]
pub struct Inputs {
    pub socket_dir: PathBuf,
    pub host: String,
    /// Sanitized base name of the invocation directory, empty at `/`
    pub dir_name: String,
}

/// What to hand to tmux
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Plan {
    pub socket: PathBuf,
    pub create_server: bool,
    /// `None` lets tmux pick
    pub session: Option<String>,
    pub create_session: bool,
}

/// Resolve server then session. `Ok(None)` means the user cancelled a menu.
pub async fn resolve<M: Multiplexer>(
    mux: &M,
    chooser: Option<&dyn Chooser>,
    inputs: &Inputs,
    request: &Request,
    discovery: &Discovery,
) -> Result<Option<Plan>, LaunchError> {
    let Some(server) = resolve_server(mux, chooser, inputs, &request.server, discovery).await?
    else {
        debug!("server menu cancelled");
        return Ok(None);
    };
    debug!(socket = %server.socket.display(), create = server.create, "resolved server");

    let session_selector = downgrade_for_new_server(&request.session, server.create);
    debug!(selector = %session_selector, "session selector");

    let Some(session) = resolve_session(
        mux,
        chooser,
        &session_selector,
        &server.socket,
        server.create,
        &inputs.dir_name,
    )
    .await?
    else {
        debug!("session menu cancelled");
        return Ok(None);
    };
    debug!(name = ?session.name, create = session.create, "resolved session");

    Ok(Some(Plan {
        socket: server.socket,
        create_server: server.create,
        session: session.name,
        create_session: session.create,
    }))
}

/// A server that does not exist yet has nothing to query or default to
fn downgrade_for_new_server(selector: &Selector, create_server: bool) -> Selector {
    match selector {
        Selector::Char(Code::Query | Code::Default) if create_server => Selector::Char(Code::New),
        other => other.clone(),
    }
}
