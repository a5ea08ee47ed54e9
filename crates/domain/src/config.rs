//! Configuration management

use serde::{Deserialize, Serialize};

use crate::constants::{
    DEFAULT_CONNECT_TIMEOUT_MS, KNOWN_MANUFACTURER, KNOWN_MODEL, PROBE_RETRY_LIMIT,
    PROBE_TIMEOUT_MS, USER_AGENT_SUFFIX,
};

/// Application configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HauthConfig {
    pub server: ServerConfig,
    pub storage: StorageConfig,
    pub identity: IdentityConfig,
    pub login: LoginConfig,
}

/// Server endpoint and transport configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Seed for the stored endpoint; only applied when the store has none.
    pub base_url: Option<String>,
    pub connect_timeout_ms: u64,
    pub user_agent_suffix: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            base_url: None,
            connect_timeout_ms: DEFAULT_CONNECT_TIMEOUT_MS,
            user_agent_suffix: USER_AGENT_SUFFIX.to_string(),
        }
    }
}

/// Which key-value backend holds the credential slots
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StorageBackend {
    #[default]
    File,
    Keyring,
    Memory,
}

impl std::str::FromStr for StorageBackend {
    type Err = crate::HauthError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "file" => Ok(Self::File),
            "keyring" => Ok(Self::Keyring),
            "memory" => Ok(Self::Memory),
            other => {
                Err(crate::HauthError::Config(format!("Unknown storage backend: {other}")))
            }
        }
    }
}

/// Persistent storage configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    pub backend: StorageBackend,
    /// JSON file used by the `file` backend.
    pub path: String,
    /// Service name used by the `keyring` backend.
    pub service: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: StorageBackend::File,
            path: "hauth.json".to_string(),
            service: "hauth".to_string(),
        }
    }
}

/// Manufacturer/model pair that carries a built-in serial probe
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KnownModel {
    pub manufacturer: String,
    pub model: String,
}

/// Device identity resolution configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct IdentityConfig {
    pub probe_command: Vec<String>,
    pub probe_timeout_ms: u64,
    pub retry_limit: u32,
    pub known_models: Vec<KnownModel>,
    /// Root used to locate `sys/class/...` and `etc/machine-id`.
    pub sysfs_root: String,
}

impl Default for IdentityConfig {
    fn default() -> Self {
        Self {
            probe_command: vec!["sh".into(), "-c".into(), "prodid -std".into()],
            probe_timeout_ms: PROBE_TIMEOUT_MS,
            retry_limit: PROBE_RETRY_LIMIT,
            known_models: vec![KnownModel {
                manufacturer: KNOWN_MANUFACTURER.to_string(),
                model: KNOWN_MODEL.to_string(),
            }],
            sysfs_root: "/".to_string(),
        }
    }
}

/// Login derivation configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoginConfig {
    pub max_length: Option<usize>,
    pub suffix: String,
}
