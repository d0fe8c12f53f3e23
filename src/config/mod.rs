// ABOUTME: Configuration types and parsing for documenso-setup.yml.
// ABOUTME: Every field is optional; defaults describe the stock Documenso layout.

mod certificate;
mod init;
mod layout;

pub use certificate::CertificateConfig;
pub use init::init_config;
pub use layout::Layout;

use crate::error::{Error, Result};
use crate::types::{PortMapping, UnitName};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const CONFIG_FILENAME: &str = "documenso-setup.yml";
pub const CONFIG_FILENAME_ALT: &str = "documenso-setup.yaml";
pub const CONFIG_FILENAME_DIR: &str = ".documenso/setup.yml";

pub const DEFAULT_NAME: &str = "documenso";
pub const DEFAULT_FALLBACK_PORT: &str = "8084:3000";

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Pod name used for manual pod management.
    #[serde(default = "default_name", deserialize_with = "deserialize_unit_name")]
    pub pod: UnitName,

    /// Service started after the unit files are installed.
    #[serde(default = "default_name", deserialize_with = "deserialize_unit_name")]
    pub service: UnitName,

    /// Pre-existing directory holding persistent data, relative to the base directory.
    #[serde(default = "default_volume_dir")]
    pub volume_dir: PathBuf,

    #[serde(default = "default_pod_file")]
    pub pod_file: PathBuf,

    #[serde(default = "default_container_file")]
    pub container_file: PathBuf,

    #[serde(default = "default_env_file")]
    pub env_file: PathBuf,

    /// Overrides `<user config dir>/containers/systemd`.
    #[serde(default)]
    pub unit_dir: Option<PathBuf>,

    #[serde(default)]
    pub certificate: CertificateConfig,

    /// Published port when the pod definition provides none.
    #[serde(
        default = "default_fallback_port",
        deserialize_with = "deserialize_port_mapping"
    )]
    pub fallback_port: PortMapping,

    /// First engine major version that understands Quadlet `.pod` units.
    #[serde(default = "default_quadlet_min_major")]
    pub quadlet_min_major: u32,

    #[serde(default)]
    pub tools: ToolsConfig,

    #[serde(default = "default_command_timeout", with = "humantime_serde")]
    pub command_timeout: Duration,
}

/// External programs, looked up on `PATH` unless absolute.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ToolsConfig {
    #[serde(default = "default_engine")]
    pub engine: String,

    #[serde(default = "default_openssl")]
    pub openssl: String,

    #[serde(default = "default_systemctl")]
    pub systemctl: String,
}

impl Default for ToolsConfig {
    fn default() -> Self {
        Self {
            engine: default_engine(),
            openssl: default_openssl(),
            systemctl: default_systemctl(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            pod: default_name(),
            service: default_name(),
            volume_dir: default_volume_dir(),
            pod_file: default_pod_file(),
            container_file: default_container_file(),
            env_file: default_env_file(),
            unit_dir: None,
            certificate: CertificateConfig::default(),
            fallback_port: default_fallback_port(),
            quadlet_min_major: default_quadlet_min_major(),
            tools: ToolsConfig::default(),
            command_timeout: default_command_timeout(),
        }
    }
}

impl Config {
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        // An empty file means "all defaults".
        if yaml.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_str(yaml)?)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                Error::ConfigNotFound(path.to_path_buf())
            } else {
                Error::Io(e)
            }
        })?;
        let config = Self::from_yaml(&content)?;
        tracing::debug!("loaded configuration from {}", path.display());
        Ok(config)
    }

    /// Look for a config file in `dir`, falling back to defaults when none exists.
    pub fn discover(dir: &Path) -> Result<Self> {
        let candidates = [
            dir.join(CONFIG_FILENAME),
            dir.join(CONFIG_FILENAME_ALT),
            dir.join(CONFIG_FILENAME_DIR),
        ];

        for path in &candidates {
            if path.exists() {
                return Self::load(path);
            }
        }

        tracing::debug!("no configuration file in {}, using defaults", dir.display());
        Ok(Self::default())
    }
}

fn default_name() -> UnitName {
    UnitName::new(DEFAULT_NAME).expect("default unit name is valid")
}

fn default_volume_dir() -> PathBuf {
    PathBuf::from("volumes")
}

fn default_pod_file() -> PathBuf {
    PathBuf::from("documenso.pod")
}

fn default_container_file() -> PathBuf {
    PathBuf::from("documenso.container")
}

fn default_env_file() -> PathBuf {
    PathBuf::from("documenso.env")
}

fn default_fallback_port() -> PortMapping {
    PortMapping::parse(DEFAULT_FALLBACK_PORT).expect("default port mapping is valid")
}

fn default_quadlet_min_major() -> u32 {
    5
}

fn default_engine() -> String {
    "podman".to_string()
}

fn default_openssl() -> String {
    "openssl".to_string()
}

fn default_systemctl() -> String {
    "systemctl".to_string()
}

fn default_command_timeout() -> Duration {
    Duration::from_secs(120)
}

// Custom deserializers

fn deserialize_unit_name<'de, D>(deserializer: D) -> std::result::Result<UnitName, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let s = String::deserialize(deserializer)?;
    UnitName::new(&s).map_err(serde::de::Error::custom)
}

fn deserialize_port_mapping<'de, D>(deserializer: D) -> std::result::Result<PortMapping, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let s = String::deserialize(deserializer)?;
    PortMapping::parse(&s).map_err(serde::de::Error::custom)
}
