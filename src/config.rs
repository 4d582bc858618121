use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;

const CONFIG_ENV: &str = "TMUX_HOP_CONFIG";
const SOCKET_DIR_ENV: &str = "TMUX_HOP_SOCKET_DIR";
const DEBUG_ENV: &str = "TMUX_HOP_DEBUG";

const DEFAULT_PROBE_TIMEOUT_MS: u64 = 2000;

/// Errors that can occur when loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file '{path}': {source}")]
    ReadError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config file '{path}': {source}")]
    ParseError {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("Config validation failed: {message}")]
    ValidationError { message: String },
}

/// Which interactive menu to use for the `q` selectors
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MenuPreference {
    /// dialog, then whiptail, then the built-in picker
    #[default]
    Auto,
    Dialog,
    Whiptail,
    Builtin,
}

/// On-disk configuration. Every field is optional.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Directory holding the `NN_host` server sockets
    pub socket_dir: Option<PathBuf>,
    /// tmux binary
    pub tmux: String,
    /// Overrides the short hostname used in socket names
    pub host: Option<String>,
    pub menu: MenuPreference,
    /// Upper bound for a single tmux probe
    pub probe_timeout_ms: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            socket_dir: None,
            tmux: "tmux".to_string(),
            host: None,
            menu: MenuPreference::Auto,
            probe_timeout_ms: DEFAULT_PROBE_TIMEOUT_MS,
        }
    }
}

impl Config {
    /// Returns the path to the configuration file.
    ///
    /// `$TMUX_HOP_CONFIG` wins; otherwise `tmux-hop/config.toml` under
    /// `dirs::config_dir()`, falling back to the current directory.
    pub fn config_path() -> PathBuf {
        if let Some(path) = std::env::var_os(CONFIG_ENV).filter(|p| !p.is_empty()) {
            return PathBuf::from(path);
        }
        let config_dir = dirs::config_dir().unwrap_or_else(|| PathBuf::from("."));
        config_dir.join("tmux-hop").join("config.toml")
    }

    /// Loads configuration from the default config file.
    ///
    /// A missing file yields `Config::default()`.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(&Self::config_path())
    }

    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Ok(Config::default());
        }

        let content = fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            source: e,
        })?;

        let config: Config = toml::from_str(&content).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            source: e,
        })?;

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.probe_timeout_ms == 0 {
            return Err(ConfigError::ValidationError {
                message: "probe_timeout_ms must be greater than zero".to_string(),
            });
        }
        if self.tmux.trim().is_empty() {
            return Err(ConfigError::ValidationError {
                message: "tmux binary must not be empty".to_string(),
            });
        }
        if let Some(host) = &self.host {
            if host.is_empty() || host.contains('/') {
                return Err(ConfigError::ValidationError {
                    message: format!("invalid host override '{}'", host),
                });
            }
        }
        Ok(())
    }
}

/// Immutable inputs for one run: config merged with environment and host identity.
#[derive(Debug, Clone)]
pub struct Settings {
    pub socket_dir: PathBuf,
    pub tmux: String,
    pub host: String,
    pub menu: MenuPreference,
    pub probe_timeout: Duration,
    /// Verbose tracing plus dry-run dispatch
    pub debug: bool,
}

impl Settings {
    pub fn resolve(config: Config) -> Self {
        Self::resolve_with(config, |key| std::env::var(key).ok())
    }

    fn resolve_with(config: Config, env: impl Fn(&str) -> Option<String>) -> Self {
        let socket_dir = env(SOCKET_DIR_ENV)
            .filter(|v| !v.is_empty())
            .map(PathBuf::from)
            .or(config.socket_dir)
            .unwrap_or_else(default_socket_dir);

        let host = config
            .host
            .unwrap_or_else(|| short_host(&gethostname::gethostname().to_string_lossy()));

        let debug = env(DEBUG_ENV)
            .map(|v| !v.is_empty() && v != "0")
            .unwrap_or(false);

        Self {
            socket_dir,
            tmux: config.tmux,
            host,
            menu: config.menu,
            probe_timeout: Duration::from_millis(config.probe_timeout_ms),
            debug,
        }
    }
}

fn default_socket_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_default()
        .join(".tmux")
        .join("sockets")
}

/// First DNS label of a hostname
pub fn short_host(raw: &str) -> String {
    raw.split('.').next().unwrap_or(raw).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tempfile::tempdir;

    #[test]
    fn test_short_host_takes_first_label() {
        assert_eq!(short_host("devbox.example.com"), "devbox");
        assert_eq!(short_host("devbox"), "devbox");
    }

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = tempdir().unwrap();
        let config = Config::load_from(&dir.path().join("nope.toml")).unwrap();
        assert_eq!(config.tmux, "tmux");
        assert_eq!(config.menu, MenuPreference::Auto);
        assert_eq!(config.probe_timeout_ms, DEFAULT_PROBE_TIMEOUT_MS);
    }

    #[test]
    fn test_parse_full_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(
            &path,
            "socket_dir = \"/run/tm\"\ntmux = \"/usr/bin/tmux\"\nhost = \"box\"\nmenu = \"builtin\"\nprobe_timeout_ms = 500\n",
        )
        .unwrap();

        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.socket_dir, Some(PathBuf::from("/run/tm")));
        assert_eq!(config.tmux, "/usr/bin/tmux");
        assert_eq!(config.host.as_deref(), Some("box"));
        assert_eq!(config.menu, MenuPreference::Builtin);
        assert_eq!(config.probe_timeout_ms, 500);
    }

    #[test]
    fn test_zero_timeout_rejected() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "probe_timeout_ms = 0\n").unwrap();

        let err = Config::load_from(&path).unwrap_err();
        assert!(matches!(err, ConfigError::ValidationError { .. }));
    }

    #[test]
    fn test_unknown_key_is_parse_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "sockets = \"/tmp\"\n").unwrap();

        let err = Config::load_from(&path).unwrap_err();
        assert!(matches!(err, ConfigError::ParseError { .. }));
    }

    #[test]
    fn test_env_overrides_socket_dir_and_debug() {
        let env: HashMap<&str, &str> = HashMap::from([
            (SOCKET_DIR_ENV, "/env/sockets"),
            (DEBUG_ENV, "1"),
        ]);
        let config = Config {
            socket_dir: Some(PathBuf::from("/file/sockets")),
            host: Some("box".to_string()),
            ..Config::default()
        };

        let settings = Settings::resolve_with(config, |k| env.get(k).map(|v| v.to_string()));
        assert_eq!(settings.socket_dir, PathBuf::from("/env/sockets"));
        assert_eq!(settings.host, "box");
        assert!(settings.debug);
    }

    #[test]
    fn test_debug_zero_means_off() {
        let settings = Settings::resolve_with(
            Config {
                host: Some("box".to_string()),
                ..Config::default()
            },
            |k| (k == DEBUG_ENV).then(|| "0".to_string()),
        );
        assert!(!settings.debug);
        assert_eq!(settings.probe_timeout, Duration::from_millis(2000));
    }
}
