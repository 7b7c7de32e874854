//! TOML configuration file for the host.
//!
//! Read from `--config <path>` when given, otherwise from the
//! platform-appropriate location:
//! - Windows:  `%APPDATA%\IOBus\host.toml`
//! - Linux:    `~/.config/iobus/host.toml`
//! - macOS:    `~/Library/Application Support/IOBus/host.toml`
//!
//! ```toml
//! [host]
//! log_level = "info"
//! backend = "auto"          # auto | log | macos
//!
//! [network]
//! bind_address = "0.0.0.0"
//! port = 8765
//! max_line_bytes = 65536
//! read_timeout_secs = 0     # 0 = no timeout
//! ```
//!
//! Every field has a serde default, so a partial file (or an empty one) is
//! valid and unspecified values fall back to the built-in defaults.

use std::net::{IpAddr, SocketAddr};
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::config::{ConnectionLimits, HostConfig, DEFAULT_MAX_LINE_BYTES, DEFAULT_PORT};
use crate::infrastructure::injection::BackendKind;

const CONFIG_FILE_NAME: &str = "host.toml";

/// Error type for configuration file operations.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The platform config directory could not be determined.
    #[error("could not determine platform config directory")]
    NoPlatformConfigDir,

    /// A file system I/O error occurred.
    #[error("I/O error accessing config at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The TOML content could not be parsed.
    #[error("failed to parse config TOML: {0}")]
    Parse(#[from] toml::de::Error),

    /// `network.bind_address` is not an IP address.
    #[error("invalid bind address {0:?}")]
    InvalidBindAddress(String),
}

// ── Config schema types ───────────────────────────────────────────────────────

/// Top-level host configuration stored on disk.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct HostFileConfig {
    #[serde(default)]
    pub host: HostSection,
    #[serde(default)]
    pub network: NetworkSection,
}

/// General host behaviour settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct HostSection {
    /// `tracing` log level: `"error"`, `"warn"`, `"info"`, `"debug"`, `"trace"`.
    #[serde(default = "default_log_level")]
    pub log_level: String,
    /// Which injection backend to run.
    #[serde(default)]
    pub backend: BackendKind,
}

/// Listener address and per-connection limits.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NetworkSection {
    /// IP address to bind.  `"0.0.0.0"` binds all interfaces.
    #[serde(default = "default_bind_address")]
    pub bind_address: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_max_line_bytes")]
    pub max_line_bytes: usize,
    /// Idle seconds before a connection is closed.  `0` disables the timeout.
    #[serde(default)]
    pub read_timeout_secs: u64,
}

// ── Default helpers ───────────────────────────────────────────────────────────

fn default_log_level() -> String {
    "info".to_string()
}
fn default_bind_address() -> String {
    "0.0.0.0".to_string()
}
fn default_port() -> u16 {
    DEFAULT_PORT
}
fn default_max_line_bytes() -> usize {
    DEFAULT_MAX_LINE_BYTES
}

impl Default for HostSection {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            backend: BackendKind::default(),
        }
    }
}

impl Default for NetworkSection {
    fn default() -> Self {
        Self {
            bind_address: default_bind_address(),
            port: default_port(),
            max_line_bytes: default_max_line_bytes(),
            read_timeout_secs: 0,
        }
    }
}

impl HostFileConfig {
    /// Converts the file representation into the runtime [`HostConfig`].
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidBindAddress`] if `network.bind_address`
    /// does not parse as an IP address.
    pub fn to_host_config(&self) -> Result<HostConfig, ConfigError> {
        let ip: IpAddr = self
            .network
            .bind_address
            .parse()
            .map_err(|_| ConfigError::InvalidBindAddress(self.network.bind_address.clone()))?;
        let read_timeout = match self.network.read_timeout_secs {
            0 => None,
            secs => Some(Duration::from_secs(secs)),
        };
        Ok(HostConfig {
            bind_addr: SocketAddr::new(ip, self.network.port),
            limits: ConnectionLimits {
                max_line_bytes: self.network.max_line_bytes,
                read_timeout,
            },
        })
    }
}

// ── Config loading ────────────────────────────────────────────────────────────

/// Determines the platform-appropriate directory for the config file.
///
/// # Errors
///
/// Returns [`ConfigError::NoPlatformConfigDir`] when the platform config base
/// directory cannot be determined from the environment.
pub fn config_dir() -> Result<PathBuf, ConfigError> {
    platform_config_dir().ok_or(ConfigError::NoPlatformConfigDir)
}

/// Resolves the full path to the default config file.
///
/// # Errors
///
/// Returns [`ConfigError::NoPlatformConfigDir`] if the base directory cannot be
/// determined.
pub fn config_file_path() -> Result<PathBuf, ConfigError> {
    Ok(config_dir()?.join(CONFIG_FILE_NAME))
}

/// Reads and parses the config file at `path`.
///
/// # Errors
///
/// Returns [`ConfigError::Io`] if the file cannot be read (including when it
/// does not exist) and [`ConfigError::Parse`] if the TOML is malformed.
pub fn read_config(path: &Path) -> Result<HostFileConfig, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(toml::from_str(&content)?)
}

/// Loads the host configuration.
///
/// An explicit path must exist.  The default path may be missing, in which
/// case (or when no platform config directory exists at all) the built-in
/// defaults are returned.
///
/// # Errors
///
/// Returns [`ConfigError::Io`] for file-system errors other than a missing
/// default file, and [`ConfigError::Parse`] if the TOML is malformed.
pub fn load_config(explicit: Option<&Path>) -> Result<HostFileConfig, ConfigError> {
    if let Some(path) = explicit {
        return read_config(path);
    }

    let Ok(path) = config_file_path() else {
        return Ok(HostFileConfig::default());
    };
    match read_config(&path) {
        Err(ConfigError::Io { source, .. }) if source.kind() == std::io::ErrorKind::NotFound => {
            Ok(HostFileConfig::default())
        }
        other => other,
    }
}

/// Resolves the platform config directory, including the `IOBus` subdirectory.
fn platform_config_dir() -> Option<PathBuf> {
    #[cfg(target_os = "windows")]
    {
        // %APPDATA% e.g. C:\Users\<user>\AppData\Roaming
        std::env::var_os("APPDATA").map(|p| PathBuf::from(p).join("IOBus"))
    }

    #[cfg(target_os = "linux")]
    {
        // XDG_CONFIG_HOME or ~/.config
        let base = std::env::var_os("XDG_CONFIG_HOME")
            .map(PathBuf::from)
            .or_else(|| std::env::var_os("HOME").map(|h| PathBuf::from(h).join(".config")))?;
        Some(base.join("iobus"))
    }

    #[cfg(target_os = "macos")]
    {
        // ~/Library/Application Support/IOBus
        std::env::var_os("HOME").map(|h| {
            PathBuf::from(h)
                .join("Library")
                .join("Application Support")
                .join("IOBus")
        })
    }

    #[cfg(not(any(target_os = "windows", target_os = "linux", target_os = "macos")))]
    {
        None
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    /// Writes `content` to a fresh file under the system temp dir.
    fn temp_config(content: &str) -> PathBuf {
        let path = std::env::temp_dir().join(format!("iobus-host-{}.toml", uuid::Uuid::new_v4()));
        std::fs::write(&path, content).expect("write temp config");
        path
    }

    #[test]
    fn test_default_file_config_maps_to_default_host_config() {
        // Arrange / Act
        let cfg = HostFileConfig::default().to_host_config().unwrap();

        // Assert
        assert_eq!(cfg, HostConfig::default());
    }

    #[test]
    fn test_empty_toml_uses_defaults() {
        let cfg: HostFileConfig = toml::from_str("").expect("deserialize empty");
        assert_eq!(cfg, HostFileConfig::default());
        assert_eq!(cfg.host.backend, BackendKind::Auto);
    }

    #[test]
    fn test_partial_network_overrides_defaults() {
        // Arrange
        let toml_str = r#"
[network]
port = 9999
read_timeout_secs = 30
"#;

        // Act
        let cfg: HostFileConfig = toml::from_str(toml_str).expect("deserialize partial");
        let host = cfg.to_host_config().unwrap();

        // Assert
        assert_eq!(host.bind_addr.port(), 9999);
        assert_eq!(host.limits.read_timeout, Some(Duration::from_secs(30)));
        // Unspecified fields keep their defaults
        assert_eq!(host.limits.max_line_bytes, DEFAULT_MAX_LINE_BYTES);
        assert!(host.bind_addr.ip().is_unspecified());
    }

    #[test]
    fn test_backend_is_parsed_lowercase() {
        let cfg: HostFileConfig =
            toml::from_str("[host]\nbackend = \"log\"\n").expect("deserialize backend");
        assert_eq!(cfg.host.backend, BackendKind::Log);
    }

    #[test]
    fn test_unknown_backend_is_a_parse_error() {
        let result: Result<HostFileConfig, _> = toml::from_str("[host]\nbackend = \"x11\"\n");
        assert!(result.is_err());
    }

    #[test]
    fn test_invalid_bind_address_is_rejected() {
        let mut cfg = HostFileConfig::default();
        cfg.network.bind_address = "not-an-ip".to_string();
        assert!(matches!(
            cfg.to_host_config(),
            Err(ConfigError::InvalidBindAddress(a)) if a == "not-an-ip"
        ));
    }

    #[test]
    fn test_load_explicit_path_reads_file() {
        // Arrange
        let path = temp_config("[network]\nbind_address = \"127.0.0.1\"\nport = 4000\n");

        // Act
        let cfg = load_config(Some(&path)).unwrap();
        std::fs::remove_file(&path).ok();

        // Assert
        assert_eq!(cfg.network.bind_address, "127.0.0.1");
        assert_eq!(cfg.network.port, 4000);
    }

    #[test]
    fn test_load_missing_explicit_path_is_an_error() {
        let path = std::env::temp_dir().join("iobus-host-definitely-missing.toml");
        assert!(matches!(
            load_config(Some(&path)),
            Err(ConfigError::Io { .. })
        ));
    }

    #[test]
    fn test_load_malformed_file_is_a_parse_error() {
        let path = temp_config("[[[ not valid toml");
        let result = load_config(Some(&path));
        std::fs::remove_file(&path).ok();
        assert!(matches!(result, Err(ConfigError::Parse(_))));
    }
}
