//! Configuration loader
//!
//! Loads [`HauthConfig`] from files and environment variables.
//!
//! ## Loading Strategy
//! 1. Probe the standard locations for a config file (JSON or TOML, chosen
//!    by extension); fall back to built-in defaults when none exists
//! 2. Overlay every `HAUTH_*` environment variable that is set
//!
//! Environment variables therefore always win over file values.
//!
//! ## Environment Variables
//! - `HAUTH_SERVER_URL`: Server base URL seed
//! - `HAUTH_CONNECT_TIMEOUT_MS`: Connect timeout in milliseconds
//! - `HAUTH_STORAGE_BACKEND`: `file`, `keyring` or `memory`
//! - `HAUTH_STORAGE_PATH`: JSON store path for the file backend
//! - `HAUTH_LOGIN_SUFFIX`: Suffix appended to the serial by `init-login`
//! - `HAUTH_LOGIN_MAX_LENGTH`: Default login length limit
//! - `HAUTH_PROBE_RETRY_LIMIT`: Built-in probe attempts
//!
//! ## File Locations
//! The loader probes the following paths (in order):
//! 1. `./hauth.json` or `./hauth.toml` (current working directory)
//! 2. `./config.json` or `./config.toml` (current working directory)
//! 3. The same names next to the executable

use std::path::{Path, PathBuf};
use std::str::FromStr;

use hauth_domain::{HauthConfig, HauthError, Result, StorageBackend};

const CONFIG_FILE_NAMES: [&str; 4] = ["hauth.json", "hauth.toml", "config.json", "config.toml"];

/// Load configuration: file (or defaults), then environment overrides.
///
/// # Errors
/// Returns `HauthError::Config` if a probed file is malformed or an
/// environment variable holds an unparseable value.
pub fn load() -> Result<HauthConfig> {
    let mut config = match probe_config_paths() {
        Some(path) => load_from_file(Some(path))?,
        None => {
            tracing::debug!("config.file_not_found");
            HauthConfig::default()
        }
    };

    apply_env_overrides(&mut config)?;
    Ok(config)
}

/// Load configuration from environment variables over built-in defaults.
///
/// # Errors
/// Returns `HauthError::Config` if a variable has an invalid value.
pub fn load_from_env() -> Result<HauthConfig> {
    let mut config = HauthConfig::default();
    apply_env_overrides(&mut config)?;
    Ok(config)
}

/// Overlay the `HAUTH_*` variables that are set onto `config`.
///
/// # Errors
/// Returns `HauthError::Config` if a variable has an invalid value.
pub fn apply_env_overrides(config: &mut HauthConfig) -> Result<()> {
    if let Some(url) = env_var("HAUTH_SERVER_URL") {
        config.server.base_url = Some(url);
    }
    if let Some(timeout) = env_parse::<u64>("HAUTH_CONNECT_TIMEOUT_MS")? {
        config.server.connect_timeout_ms = timeout;
    }
    if let Some(backend) = env_var("HAUTH_STORAGE_BACKEND") {
        config.storage.backend = StorageBackend::from_str(&backend)?;
    }
    if let Some(path) = env_var("HAUTH_STORAGE_PATH") {
        config.storage.path = path;
    }
    if let Some(suffix) = env_var("HAUTH_LOGIN_SUFFIX") {
        config.login.suffix = suffix;
    }
    if let Some(max_length) = env_parse::<usize>("HAUTH_LOGIN_MAX_LENGTH")? {
        config.login.max_length = Some(max_length);
    }
    if let Some(limit) = env_parse::<u32>("HAUTH_PROBE_RETRY_LIMIT")? {
        config.identity.retry_limit = limit;
    }
    Ok(())
}

/// Load configuration from a file
///
/// If `path` is `None`, probes the standard locations.
///
/// # Errors
/// Returns `HauthError::Config` if the file is missing, unreadable or
/// malformed.
pub fn load_from_file(path: Option<PathBuf>) -> Result<HauthConfig> {
    let config_path = match path {
        Some(p) => {
            if !p.exists() {
                return Err(HauthError::Config(format!("Config file not found: {}", p.display())));
            }
            p
        }
        None => probe_config_paths().ok_or_else(|| {
            HauthError::Config("No config file found in any of the standard locations".into())
        })?,
    };

    tracing::info!(path = %config_path.display(), "config.loading_file");

    let contents = std::fs::read_to_string(&config_path)
        .map_err(|e| HauthError::Config(format!("Failed to read config file: {e}")))?;

    parse_config(&contents, &config_path)
}

fn parse_config(contents: &str, path: &Path) -> Result<HauthConfig> {
    let extension = path.extension().and_then(|e| e.to_str()).unwrap_or("json");

    match extension {
        "toml" => toml::from_str(contents)
            .map_err(|e| HauthError::Config(format!("Invalid TOML format: {e}"))),
        "json" => serde_json::from_str(contents)
            .map_err(|e| HauthError::Config(format!("Invalid JSON format: {e}"))),
        _ => Err(HauthError::Config(format!("Unsupported config format: {extension}"))),
    }
}

/// First existing config file among the standard locations.
pub fn probe_config_paths() -> Option<PathBuf> {
    let mut dirs = Vec::new();
    if let Ok(cwd) = std::env::current_dir() {
        dirs.push(cwd);
    }
    if let Some(exe_dir) = std::env::current_exe().ok().and_then(|p| p.parent().map(Path::to_path_buf)) {
        dirs.push(exe_dir);
    }

    dirs.iter()
        .flat_map(|dir| CONFIG_FILE_NAMES.iter().map(move |name| dir.join(name)))
        .find(|path| path.exists())
}

fn env_var(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|value| !value.trim().is_empty())
}

fn env_parse<T>(key: &str) -> Result<Option<T>>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    env_var(key)
        .map(|raw| {
            raw.trim()
                .parse::<T>()
                .map_err(|e| HauthError::Config(format!("Invalid value for {key}: {e}")))
        })
        .transpose()
}

#[cfg(test)]
mod tests {
    use std::io::Write;
    use std::sync::Mutex;

    use once_cell::sync::Lazy;
    use tempfile::NamedTempFile;

    use super::*;

    static ENV_LOCK: Lazy<Mutex<()>> = Lazy::new(|| Mutex::new(()));

    const ALL_VARS: [&str; 7] = [
        "HAUTH_SERVER_URL",
        "HAUTH_CONNECT_TIMEOUT_MS",
        "HAUTH_STORAGE_BACKEND",
        "HAUTH_STORAGE_PATH",
        "HAUTH_LOGIN_SUFFIX",
        "HAUTH_LOGIN_MAX_LENGTH",
        "HAUTH_PROBE_RETRY_LIMIT",
    ];

    fn clear_env() {
        for key in ALL_VARS {
            std::env::remove_var(key);
        }
    }

    #[test]
    fn test_load_from_env_defaults_when_unset() {
        let _guard = ENV_LOCK.lock().expect("env mutex poisoned");
        clear_env();

        let config = load_from_env().unwrap();
        assert_eq!(config, HauthConfig::default());
    }

    #[test]
    fn test_load_from_env_all_vars_set() {
        let _guard = ENV_LOCK.lock().expect("env mutex poisoned");

        std::env::set_var("HAUTH_SERVER_URL", "https://auth.example.com");
        std::env::set_var("HAUTH_CONNECT_TIMEOUT_MS", "1500");
        std::env::set_var("HAUTH_STORAGE_BACKEND", "memory");
        std::env::set_var("HAUTH_STORAGE_PATH", "/var/lib/hauth/store.json");
        std::env::set_var("HAUTH_LOGIN_SUFFIX", "-T");
        std::env::set_var("HAUTH_LOGIN_MAX_LENGTH", "12");
        std::env::set_var("HAUTH_PROBE_RETRY_LIMIT", "3");

        let result = load_from_env();
        clear_env();

        let config = result.unwrap();
        assert_eq!(config.server.base_url.as_deref(), Some("https://auth.example.com"));
        assert_eq!(config.server.connect_timeout_ms, 1500);
        assert_eq!(config.storage.backend, StorageBackend::Memory);
        assert_eq!(config.storage.path, "/var/lib/hauth/store.json");
        assert_eq!(config.login.suffix, "-T");
        assert_eq!(config.login.max_length, Some(12));
        assert_eq!(config.identity.retry_limit, 3);
    }

    #[test]
    fn test_load_from_env_invalid_number() {
        let _guard = ENV_LOCK.lock().expect("env mutex poisoned");
        clear_env();
        std::env::set_var("HAUTH_CONNECT_TIMEOUT_MS", "soon");

        let result = load_from_env();
        clear_env();

        assert!(matches!(result, Err(HauthError::Config(msg)) if msg.contains("HAUTH_CONNECT_TIMEOUT_MS")));
    }

    #[test]
    fn test_env_overrides_file_values() {
        let _guard = ENV_LOCK.lock().expect("env mutex poisoned");
        clear_env();
        std::env::set_var("HAUTH_LOGIN_SUFFIX", "-ENV");

        let mut config: HauthConfig = toml::from_str("[login]\nsuffix = \"-FILE\"\nmax_length = 9\n").unwrap();
        let result = apply_env_overrides(&mut config);
        clear_env();

        result.unwrap();
        assert_eq!(config.login.suffix, "-ENV");
        assert_eq!(config.login.max_length, Some(9));
    }

    #[test]
    fn test_blank_env_values_are_ignored() {
        let _guard = ENV_LOCK.lock().expect("env mutex poisoned");
        clear_env();
        std::env::set_var("HAUTH_SERVER_URL", "   ");

        let result = load_from_env();
        clear_env();

        assert_eq!(result.unwrap().server.base_url, None);
    }

    #[test]
    fn test_load_from_file_toml() {
        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file
            .write_all(b"[storage]\nbackend = \"keyring\"\nservice = \"fleet\"\n")
            .unwrap();
        let path = temp_file.path().with_extension("toml");
        std::fs::copy(temp_file.path(), &path).unwrap();

        let result = load_from_file(Some(path.clone()));
        std::fs::remove_file(path).ok();

        let config = result.unwrap();
        assert_eq!(config.storage.backend, StorageBackend::Keyring);
        assert_eq!(config.storage.service, "fleet");
        assert_eq!(config.storage.path, "hauth.json");
    }

    #[test]
    fn test_load_from_file_not_found() {
        let result = load_from_file(Some(PathBuf::from("/nonexistent/hauth.json")));
        assert!(matches!(result, Err(HauthError::Config(_))));
    }

    #[test]
    fn test_parse_config_json() {
        let json = r#"{ "server": { "base_url": "https://a.example", "connect_timeout_ms": 250 } }"#;
        let config = parse_config(json, Path::new("hauth.json")).unwrap();
        assert_eq!(config.server.connect_timeout_ms, 250);
        assert_eq!(config.server.user_agent_suffix, "Hauth");
    }

    #[test]
    fn test_parse_config_invalid_json() {
        let result = parse_config(r#"{ "server": "#, Path::new("hauth.json"));
        assert!(matches!(result, Err(HauthError::Config(msg)) if msg.contains("JSON")));
    }

    #[test]
    fn test_parse_config_unsupported_format() {
        let result = parse_config("server: {}", Path::new("hauth.yaml"));
        assert!(result.is_err(), "Should fail with unsupported format");
    }
}
