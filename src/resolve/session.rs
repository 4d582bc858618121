use std::path::Path;

use tracing::debug;

use crate::error::LaunchError;
use crate::menu::{Choice, Chooser, NEW};
use crate::request::{Code, Selector};
use crate::sanitize::sanitize;
use crate::tmux::Multiplexer;

/// Session to attach to or create. `name: None` leaves the pick to tmux.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionChoice {
    pub name: Option<String>,
    pub create: bool,
}

/// Turn the session selector into a name on `socket`. `Ok(None)` when the menu was cancelled.
///
/// `dir_name` is the sanitized invocation directory name used when no name
/// was given.
pub async fn resolve_session<M: Multiplexer>(
    mux: &M,
    chooser: Option<&dyn Chooser>,
    selector: &Selector,
    socket: &Path,
    create_server: bool,
    dir_name: &str,
) -> Result<Option<SessionChoice>, LaunchError> {
    let (name, create) = match selector {
        Selector::Name(raw) => {
            // existence is checked against the name tmux will actually see
            let name = sanitize(raw);
            if name.is_empty() {
                (None, create_server)
            } else {
                let create = create_server || !mux.has_session(socket, &name).await?;
                return Ok(Some(SessionChoice {
                    name: Some(name),
                    create,
                }));
            }
        }
        Selector::Char(Code::Default) => (None, create_server),
        Selector::Char(Code::New) => (None, true),
        Selector::Char(Code::Query) if create_server => (None, true),
        Selector::Char(Code::Query) => {
            let chooser = chooser.ok_or(LaunchError::NoInteractiveTool)?;
            let mut choices = vec![Choice::new(NEW, "new session")];
            choices.extend(
                mux.list_sessions(socket)
                    .await?
                    .into_iter()
                    .map(|s| Choice::new(s.name.clone(), s.label())),
            );

            match chooser
                .choose("Pick a session", &choices)
                .map_err(LaunchError::Menu)?
            {
                None => return Ok(None),
                Some(picked) if picked == NEW => (None, true),
                // an existing session is used exactly as tmux reported it
                Some(picked) => (Some(picked), false),
            }
        }
        Selector::Number(n) => {
            return Err(LaunchError::Usage(format!(
                "'{}' is a server number, not a session",
                n
            )))
        }
    };

    if name.is_some() {
        return Ok(Some(SessionChoice { name, create }));
    }

    let name = fallback_name(mux, socket, create_server, create, dir_name).await?;
    debug!(?name, create, "session name from working directory");
    Ok(Some(SessionChoice { name, create }))
}

/// Name an unnamed session after the working directory unless that clashes.
///
/// New session: use it unless the server already has one by that name.
/// Attach: use it only if such a session already exists.
async fn fallback_name<M: Multiplexer>(
    mux: &M,
    socket: &Path,
    create_server: bool,
    create: bool,
    dir_name: &str,
) -> Result<Option<String>, LaunchError> {
    if dir_name.is_empty() {
        return Ok(None);
    }
    if create && create_server {
        return Ok(Some(dir_name.to_string()));
    }

    let exists = mux.has_session(socket, dir_name).await?;
    let usable = if create { !exists } else { exists };
    Ok(usable.then(|| dir_name.to_string()))
}
