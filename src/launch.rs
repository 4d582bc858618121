use std::path::Path;
use std::process::{Command, Stdio};

use tracing::{debug, info};

use crate::error::LaunchError;
use crate::resolve::Plan;
use crate::tmux::{render_command, TmuxClient};

/// tmux command line that carries out `plan`
pub fn command_for(client: &TmuxClient, plan: &Plan, work_dir: &Path) -> Vec<String> {
    let session = plan.session.as_deref();
    if plan.create_session {
        client.new_session_command(&plan.socket, session, work_dir)
    } else {
        client.attach_command(&plan.socket, session)
    }
}

/// Hand the terminal to tmux and return its exit code.
///
/// In dry-run mode only prints what would run.
pub fn dispatch(
    client: &TmuxClient,
    plan: &Plan,
    work_dir: &Path,
    dry_run: bool,
) -> Result<u8, LaunchError> {
    let cmd = command_for(client, plan, work_dir);
    debug!(command = %render_command(&cmd), create_server = plan.create_server, "dispatch");

    if dry_run {
        println!("would run: {}", render_command(&cmd));
        return Ok(0);
    }

    let status = Command::new(&cmd[0])
        .args(&cmd[1..])
        .stdin(Stdio::inherit())
        .stdout(Stdio::inherit())
        .stderr(Stdio::inherit())
        .status()
        .map_err(LaunchError::Tmux)?;

    info!(?status, "tmux exited");
    Ok(status
        .code()
        .and_then(|c| u8::try_from(c).ok())
        .unwrap_or(1))
}
