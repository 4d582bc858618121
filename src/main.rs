use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::Parser;
use tracing::debug;
use tracing_subscriber::EnvFilter;

mod cli;
mod config;
mod discovery;
mod error;
mod launch;
mod menu;
mod request;
mod resolve;
mod sanitize;
mod tmux;

use cli::Cli;
use config::{Config, Settings};
use error::LaunchError;
use resolve::Inputs;
use tmux::TmuxClient;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(cli).await {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            eprintln!("tmux-hop: {}", e);
            ExitCode::from(e.exit_code())
        }
    }
}

async fn run(cli: Cli) -> Result<u8, LaunchError> {
    let settings = Settings::resolve(Config::load()?);

    // Initialize logging
    let rust_log = std::env::var("RUST_LOG").ok();
    tracing_subscriber::fmt()
        .with_env_filter(log_filter(rust_log.as_deref(), settings.debug))
        .with_writer(std::io::stderr)
        .init();

    let request = request::normalize(&cli.args)?;

    let work_dir = std::env::current_dir()
        .unwrap_or_else(|_| dirs::home_dir().unwrap_or_else(|| PathBuf::from("/")));
    let inputs = Inputs {
        socket_dir: settings.socket_dir.clone(),
        host: settings.host.clone(),
        dir_name: dir_name(&work_dir),
    };
    debug!(
        host = %inputs.host,
        socket_dir = %inputs.socket_dir.display(),
        dir_name = %inputs.dir_name,
        server = %request.server,
        session = %request.session,
        "inputs"
    );

    let client = TmuxClient::new(settings.tmux.clone(), settings.probe_timeout);
    let found = discovery::discover(&client, &inputs.socket_dir, &inputs.host).await?;
    debug!(
        live = ?found.live.iter().map(|s| s.index).collect::<Vec<_>>(),
        pruned = found.pruned.len(),
        "discovery"
    );

    let chooser = menu::detect(settings.menu);
    let Some(plan) =
        resolve::resolve(&client, chooser.as_deref(), &inputs, &request, &found).await?
    else {
        debug!("cancelled, nothing to do");
        return Ok(0);
    };
    debug!(?plan, "plan");

    launch::dispatch(&client, &plan, &work_dir, settings.debug)
}

/// `RUST_LOG` when set and valid, otherwise WARN, or DEBUG under the debug flag
fn log_filter(rust_log: Option<&str>, debug: bool) -> EnvFilter {
    rust_log
        .filter(|directives| !directives.trim().is_empty())
        .and_then(|directives| EnvFilter::try_new(directives).ok())
        .unwrap_or_else(|| EnvFilter::new(if debug { "debug" } else { "warn" }))
}

/// Sanitized last path component, empty for `/`
fn dir_name(work_dir: &Path) -> String {
    work_dir
        .file_name()
        .map(|name| sanitize::sanitize(&name.to_string_lossy()))
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dir_name() {
        assert_eq!(dir_name(Path::new("/home/me/2024-05-01_build")), "build");
        assert_eq!(dir_name(Path::new("/home/me/my.proj")), "my_proj");
        assert_eq!(dir_name(Path::new("/")), "");
    }

    #[test]
    fn test_log_filter_prefers_rust_log() {
        assert_eq!(log_filter(Some("debug"), false).to_string(), "debug");
        assert_eq!(log_filter(Some("tmux_hop=trace"), true).to_string(), "tmux_hop=trace");
    }

    #[test]
    fn test_log_filter_defaults() {
        assert_eq!(log_filter(None, false).to_string(), "warn");
        assert_eq!(log_filter(None, true).to_string(), "debug");
        assert_eq!(log_filter(Some("  "), false).to_string(), "warn");
    }
}
