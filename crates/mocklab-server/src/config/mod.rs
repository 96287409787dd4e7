//! Configuration for the mock server.
//!
//! Settings come from a `mock.conf` file (JSON or YAML) in the working
//! directory, overridden by command-line flags. A missing or broken file is
//! never fatal; the server falls back to defaults.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::fixture::validate_overlay_name;
use crate::history::DEFAULT_HISTORY_LIMIT;

pub const DEFAULT_CONFIG_FILE: &str = "mock.conf";
pub const DEFAULT_HOST: &str = "localhost";
pub const DEFAULT_PORT: u16 = 3232;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Config {
    pub host: String,
    pub port: u16,
    /// Number of requests kept in the history log
    pub history_limit: usize,
    /// Overlay directory name under `overlays_dir`, searched before the mocks
    #[serde(skip_serializing_if = "Option::is_none")]
    pub overlay: Option<String>,
    pub mocks_dir: PathBuf,
    pub overlays_dir: PathBuf,
    /// Port of the admin API; disabled when absent
    #[serde(skip_serializing_if = "Option::is_none")]
    pub admin_port: Option<u16>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            history_limit: DEFAULT_HISTORY_LIMIT,
            overlay: None,
            mocks_dir: PathBuf::from("mocks"),
            overlays_dir: PathBuf::from("overlays"),
            admin_port: None,
        }
    }
}

impl Config {
    /// Read and parse a config file. Errors are returned, not defaulted.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, anyhow::Error> {
        let contents = std::fs::read_to_string(path)?;
        Self::parse(&contents)
    }

    /// Parse config text. YAML is a superset of JSON, so both are accepted.
    pub fn parse(contents: &str) -> Result<Self, anyhow::Error> {
        if contents.trim().is_empty() {
            return Ok(Self::default());
        }
        let config: Config = match serde_yaml::from_str(contents) {
            Ok(config) => config,
            // Some JSON (hard tabs in indentation) is not valid YAML.
            Err(yaml_err) => serde_json::from_str(contents).map_err(|_| yaml_err)?,
        };
        Ok(config.normalized())
    }

    /// Load a config file, falling back to defaults when it is missing or
    /// invalid.
    pub fn load<P: AsRef<Path>>(path: P) -> Self {
        let path = path.as_ref();
        if !path.exists() {
            info!(
                "No config file at {}, using default configuration",
                path.display()
            );
            return Self::default();
        }
        match Self::from_file(path) {
            Ok(config) => config,
            Err(e) => {
                warn!(
                    "Error reading config file {}: {}. Using default configuration",
                    path.display(),
                    e
                );
                Self::default()
            }
        }
    }

    /// Apply command-line overrides on top of file values.
    pub fn with_overrides(mut self, overrides: &ConfigOverrides) -> Self {
        if let Some(ref host) = overrides.host {
            self.host = host.clone();
        }
        if let Some(port) = overrides.port {
            self.port = port;
        }
        if let Some(ref overlay) = overrides.overlay {
            self.overlay = Some(overlay.clone());
        }
        if let Some(ref dir) = overrides.mocks_dir {
            self.mocks_dir = dir.clone();
        }
        if let Some(ref dir) = overrides.overlays_dir {
            self.overlays_dir = dir.clone();
        }
        if let Some(port) = overrides.admin_port {
            self.admin_port = Some(port);
        }
        if let Some(limit) = overrides.history_limit {
            self.history_limit = limit;
        }
        self.normalized()
    }

    /// An empty overlay name means no overlay.
    fn normalized(mut self) -> Self {
        if self.overlay.as_deref().is_some_and(str::is_empty) {
            self.overlay = None;
        }
        self
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), anyhow::Error> {
        if self.host.trim().is_empty() {
            anyhow::bail!("Host must not be empty");
        }

        if let Some(ref overlay) = self.overlay {
            if let Err(e) = validate_overlay_name(overlay) {
                anyhow::bail!("Invalid overlay: {}", e);
            }
        }

        if let Some(admin_port) = self.admin_port {
            if admin_port != 0 && admin_port == self.port {
                anyhow::bail!(
                    "Admin port {} must differ from the mock server port",
                    admin_port
                );
            }
        }

        Ok(())
    }

    /// `host:port` of the mock listener.
    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// `host:port` of the admin listener, when enabled.
    pub fn admin_addr(&self) -> Option<String> {
        self.admin_port.map(|port| format!("{}:{}", self.host, port))
    }
}

/// Command-line flags that override file configuration.
#[derive(Debug, Clone, Default, clap::Args)]
pub struct ConfigOverrides {
    /// Host to bind
    #[arg(long, env = "MOCKLAB_HOST")]
    pub host: Option<String>,

    /// Port for mock requests
    #[arg(short, long, env = "MOCKLAB_PORT")]
    pub port: Option<u16>,

    /// Overlay to activate (empty to disable)
    #[arg(long, env = "MOCKLAB_OVERLAY")]
    pub overlay: Option<String>,

    /// Base fixture directory
    #[arg(long)]
    pub mocks_dir: Option<PathBuf>,

    /// Directory holding overlay directories
    #[arg(long)]
    pub overlays_dir: Option<PathBuf>,

    /// Port for the admin API
    #[arg(long, env = "MOCKLAB_ADMIN_PORT")]
    pub admin_port: Option<u16>,

    /// Number of requests kept in history
    #[arg(long)]
    pub history_limit: Option<usize>,
}
