//! Runs the binary against temp socket directories.
//!
//! Every scenario here resolves without contacting a tmux server, and debug
//! mode turns the final tmux call into a printed dry run.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};

use tempfile::{tempdir, TempDir};

struct Sandbox {
    _root: TempDir,
    sockets: PathBuf,
    work: PathBuf,
    config: PathBuf,
}

impl Sandbox {
    fn new() -> Self {
        let root = tempdir().unwrap();
        let sockets = root.path().join("sockets");
        let work = root.path().join("myproj");
        let config = root.path().join("config.toml");
        fs::create_dir(&sockets).unwrap();
        fs::create_dir(&work).unwrap();
        fs::write(&config, "host = \"testbox\"\n").unwrap();
        Self {
            _root: root,
            sockets,
            work,
            config,
        }
    }

    fn cmd(&self) -> Command {
        let mut cmd = Command::new(env!("CARGO_BIN_EXE_tmux-hop"));
        cmd.current_dir(&self.work)
            .env("TMUX_HOP_CONFIG", &self.config)
            .env("TMUX_HOP_SOCKET_DIR", &self.sockets)
            .env("TMUX_HOP_DEBUG", "1")
            .env_remove("RUST_LOG");
        cmd
    }

    fn run(&self, args: &[&str]) -> Output {
        self.cmd()
            .args(args)
            .output()
            .expect("Failed to execute command")
    }

    fn slot(&self, name: &str) -> String {
        self.sockets.join(name).display().to_string()
    }
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).to_string()
}

fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).to_string()
}

fn work_dir(sandbox: &Sandbox) -> String {
    // the child sees the canonical path as its cwd
    fs::canonicalize(&sandbox.work)
        .unwrap_or_else(|_| sandbox.work.clone())
        .display()
        .to_string()
}

#[test]
fn test_help_shows_selectors() {
    let sandbox = Sandbox::new();
    let output = sandbox.run(&["--help"]);

    assert!(output.status.success());
    let out = stdout(&output);
    assert!(out.contains("SERVER:"));
    assert!(out.contains("COMBINED:"));
}

#[test]
fn test_no_servers_no_args_creates_server_and_session() {
    let sandbox = Sandbox::new();
    let output = sandbox.run(&[]);

    assert!(output.status.success(), "stderr: {}", stderr(&output));
    let out = stdout(&output);
    assert!(out.starts_with("would run: tmux -S "), "{}", out);
    assert!(out.contains(&sandbox.slot("00_testbox")), "{}", out);
    assert!(
        out.contains(&format!("new-session -s myproj -c {}", work_dir(&sandbox))),
        "{}",
        out
    );
}

#[test]
fn test_explicit_slot_and_name() {
    let sandbox = Sandbox::new();
    let output = sandbox.run(&["7", "2024-05-01_build", "ignored"]);

    assert!(output.status.success(), "stderr: {}", stderr(&output));
    let out = stdout(&output);
    assert!(out.contains(&sandbox.slot("07_testbox")), "{}", out);
    assert!(out.contains("new-session -s build "), "{}", out);
}

#[test]
fn test_bad_explicit_server_is_usage_error() {
    let sandbox = Sandbox::new();
    let output = sandbox.run(&["abc", "work"]);

    assert_eq!(output.status.code(), Some(2));
    assert!(stderr(&output).contains("invalid server 'abc'"));
    assert!(stdout(&output).is_empty());
}

#[test]
fn test_missing_socket_dir() {
    let sandbox = Sandbox::new();
    let missing = sandbox.sockets.join("nope");
    let output = sandbox
        .cmd()
        .env("TMUX_HOP_SOCKET_DIR", &missing)
        .arg("n")
        .output()
        .expect("Failed to execute command");

    assert_eq!(output.status.code(), Some(1));
    let err = stderr(&output);
    assert!(err.contains("socket directory"), "{}", err);
    assert!(err.contains("does not exist"), "{}", err);
}

#[test]
fn test_broken_config_reported() {
    let sandbox = Sandbox::new();
    fs::write(&sandbox.config, "probe_timeout_ms = \"soon\"\n").unwrap();
    let output = sandbox.run(&["n"]);

    assert_eq!(output.status.code(), Some(1));
    assert!(stderr(&output).contains("Failed to parse config file"));
}

#[test]
fn test_foreign_host_sockets_ignored() {
    let sandbox = Sandbox::new();
    fs::write(Path::new(&sandbox.slot("00_otherhost")), b"").unwrap();
    let output = sandbox.run(&["nn"]);

    assert!(output.status.success(), "stderr: {}", stderr(&output));
    assert!(stdout(&output).contains(&sandbox.slot("00_testbox")));
    assert!(Path::new(&sandbox.slot("00_otherhost")).exists());
}
