use clap::Parser;

#[derive(Parser, Debug)]
#[command(name = "tmux-hop")]
#[command(about = "Attach to or start a tmux server and session")]
#[command(version)]
#[command(override_usage = "tmux-hop [SERVER] [SESSION]\n       tmux-hop [COMBINED]")]
#[command(after_help = "\
SERVER:   n (new), d (default: lowest live), q (menu) or a slot number 0-99
SESSION:  n (new), d (default), q (menu) or a session name
COMBINED: one or two letters from n/d/q, e.g. `q` (pick a session) or `nq`

With no arguments: pick a server from a menu, then the default session.
A single argument that is not n/d/q or a pair of them is a session name.

Environment:
  TMUX_HOP_DEBUG       trace every decision and print the tmux command instead of running it
  TMUX_HOP_SOCKET_DIR  directory holding the NN_host sockets
  TMUX_HOP_CONFIG      config file path")]
pub struct Cli {
    /// Server and session selectors, see below
    #[arg(value_name = "ARGS")]
    pub args: Vec<String>,
}
