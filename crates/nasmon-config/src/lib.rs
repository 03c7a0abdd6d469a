//! Shared configuration for nasmon tools.
//!
//! TOML profiles (one per NAS backend), environment overrides, and
//! translation to `nasmon_core::StoreConfig`. The CLI layers its own
//! flag overrides on top.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::Url;

use nasmon_core::config::DEFAULT_API_BASE;
use nasmon_core::{StoreConfig, TlsVerification};

/// Environment variable overriding the backend base URL.
pub const API_BASE_ENV: &str = "NASMON_API_BASE";

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("unknown profile '{profile}'")]
    UnknownProfile { profile: String },

    #[error("failed to serialize config: {0}")]
    Serialization(#[from] toml::ser::Error),

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

// ── TOML config structs ─────────────────────────────────────────────

/// Top-level TOML configuration.
#[derive(Debug, Deserialize, Serialize)]
pub struct Config {
    /// Profile used when none is named on the command line.
    pub default_profile: Option<String>,

    #[serde(default)]
    pub defaults: Defaults,

    /// Named backend profiles.
    #[serde(default)]
    pub profiles: HashMap<String, Profile>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_profile: Some("default".into()),
            defaults: Defaults::default(),
            profiles: HashMap::new(),
        }
    }
}

#[derive(Debug, Deserialize, Serialize)]
pub struct Defaults {
    #[serde(default = "default_output")]
    pub output: String,

    #[serde(default = "default_color")]
    pub color: String,

    #[serde(default)]
    pub insecure: bool,

    /// Per-request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout: u64,

    /// Reconnection probe period in seconds.
    #[serde(default = "default_reconnect_interval")]
    pub reconnect_interval_secs: u64,

    #[serde(default = "default_metrics_window")]
    pub metrics_window_hours: u32,

    #[serde(default = "default_detail_window")]
    pub detail_window_hours: u32,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            output: default_output(),
            color: default_color(),
            insecure: false,
            timeout: default_timeout(),
            reconnect_interval_secs: default_reconnect_interval(),
            metrics_window_hours: default_metrics_window(),
            detail_window_hours: default_detail_window(),
        }
    }
}

fn default_output() -> String {
    "table".into()
}
fn default_color() -> String {
    "auto".into()
}
fn default_timeout() -> u64 {
    30
}
fn default_reconnect_interval() -> u64 {
    3
}
fn default_metrics_window() -> u32 {
    1
}
fn default_detail_window() -> u32 {
    24
}

/// A named NAS backend.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Profile {
    /// Backend root URL (e.g., "http://nas.local:8000").
    pub api_base: String,

    /// Path to custom CA certificate.
    pub ca_cert: Option<PathBuf>,

    /// Override insecure TLS setting.
    pub insecure: Option<bool>,

    /// Override timeout.
    pub timeout: Option<u64>,
}

// ── Config file path ────────────────────────────────────────────────

/// Resolve the config file path via XDG / platform conventions.
pub fn config_path() -> PathBuf {
    ProjectDirs::from("dev", "nasmon", "nasmon").map_or_else(
        || {
            let mut p = PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".into()));
            p.push(".config");
            p.push("nasmon");
            p.push("config.toml");
            p
        },
        |dirs| dirs.config_dir().join("config.toml"),
    )
}

// ── Config loading ──────────────────────────────────────────────────

/// Load the full Config from the canonical file + environment.
pub fn load_config() -> Result<Config, ConfigError> {
    load_config_from(&config_path())
}

/// Load from an explicit file, layered as defaults → file → `NASMON_*` env.
///
/// Nested keys use a double underscore: `NASMON_DEFAULTS__TIMEOUT=10`.
/// A missing file is not an error.
pub fn load_config_from(path: &Path) -> Result<Config, ConfigError> {
    let figment = Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(path))
        .merge(Env::prefixed("NASMON_").split("__"));

    let config: Config = figment.extract()?;
    Ok(config)
}

/// Load config, returning a default if loading fails.
pub fn load_config_or_default() -> Config {
    load_config().unwrap_or_default()
}

// ── Config saving ───────────────────────────────────────────────────

/// Serialize config to TOML and write to the canonical config path.
pub fn save_config(cfg: &Config) -> Result<(), ConfigError> {
    save_config_to(cfg, &config_path())
}

pub fn save_config_to(cfg: &Config, path: &Path) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let toml_str = toml::to_string_pretty(cfg)?;
    std::fs::write(path, toml_str)?;
    Ok(())
}

// ── StoreConfig resolution ──────────────────────────────────────────

/// Build a `StoreConfig` for the named profile, or the default one.
///
/// The base URL comes from `NASMON_API_BASE` when set, else the profile,
/// else `http://localhost:8000`. Naming a profile that doesn't exist is
/// an error; a missing default profile is not.
pub fn resolve_store_config(
    cfg: &Config,
    profile_name: Option<&str>,
) -> Result<StoreConfig, ConfigError> {
    let env_base = std::env::var(API_BASE_ENV).ok().filter(|v| !v.is_empty());
    resolve_with_api_base(cfg, profile_name, env_base.as_deref())
}

/// Like [`resolve_store_config`], with an explicit base URL override in
/// place of the environment.
pub fn resolve_with_api_base(
    cfg: &Config,
    profile_name: Option<&str>,
    api_base: Option<&str>,
) -> Result<StoreConfig, ConfigError> {
    let profile = match profile_name {
        Some(name) => Some(cfg.profiles.get(name).ok_or_else(|| {
            ConfigError::UnknownProfile {
                profile: name.into(),
            }
        })?),
        None => cfg
            .default_profile
            .as_deref()
            .and_then(|name| cfg.profiles.get(name)),
    };

    let raw_base = api_base
        .or(profile.map(|p| p.api_base.as_str()))
        .unwrap_or(DEFAULT_API_BASE);
    let api_base = parse_api_base(raw_base)?;

    let defaults = &cfg.defaults;
    let insecure = profile
        .and_then(|p| p.insecure)
        .unwrap_or(defaults.insecure);
    let tls = if insecure {
        TlsVerification::DangerAcceptInvalid
    } else if let Some(ca_path) = profile.and_then(|p| p.ca_cert.clone()) {
        TlsVerification::CustomCa(ca_path)
    } else {
        TlsVerification::SystemDefaults
    };

    let timeout = profile
        .and_then(|p| p.timeout)
        .unwrap_or(defaults.timeout);

    Ok(StoreConfig {
        api_base,
        tls,
        timeout: Duration::from_secs(timeout),
        reconnect_interval: Duration::from_secs(defaults.reconnect_interval_secs.max(1)),
        metrics_window_hours: defaults.metrics_window_hours,
        detail_window_hours: defaults.detail_window_hours,
    })
}

fn parse_api_base(raw: &str) -> Result<Url, ConfigError> {
    let url = Url::parse(raw).map_err(|e| ConfigError::Validation {
        field: "api_base".into(),
        reason: format!("{raw}: {e}"),
    })?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(ConfigError::Validation {
            field: "api_base".into(),
            reason: format!("expected an http(s) URL, got '{raw}'"),
        });
    }
    Ok(url)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn write_config(contents: &str) -> (tempfile::TempDir, PathBuf) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, contents).unwrap();
        (dir, path)
    }

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = load_config_from(&dir.path().join("absent.toml")).unwrap();
        assert_eq!(cfg.default_profile.as_deref(), Some("default"));
        assert_eq!(cfg.defaults.timeout, 30);
        assert_eq!(cfg.defaults.reconnect_interval_secs, 3);
        assert!(cfg.profiles.is_empty());
    }

    #[test]
    fn file_overrides_defaults_and_adds_profiles() {
        let (_dir, path) = write_config(
            r#"
default_profile = "home"

[defaults]
timeout = 10
detail_window_hours = 48

[profiles.home]
api_base = "http://nas.local:8000"
insecure = true
"#,
        );
        let cfg = load_config_from(&path).unwrap();
        assert_eq!(cfg.defaults.timeout, 10);
        assert_eq!(cfg.defaults.detail_window_hours, 48);
        assert_eq!(cfg.defaults.metrics_window_hours, 1);
        assert_eq!(cfg.profiles["home"].api_base, "http://nas.local:8000");
    }

    #[test]
    fn default_profile_resolves_without_name() {
        let (_dir, path) = write_config(
            r#"
default_profile = "home"

[profiles.home]
api_base = "https://nas.local"
ca_cert = "/etc/nas/ca.pem"
timeout = 5
"#,
        );
        let cfg = load_config_from(&path).unwrap();
        let store = resolve_with_api_base(&cfg, None, None).unwrap();

        assert_eq!(store.api_base.as_str(), "https://nas.local/");
        assert_eq!(store.tls, TlsVerification::CustomCa("/etc/nas/ca.pem".into()));
        assert_eq!(store.timeout, Duration::from_secs(5));
        assert_eq!(store.reconnect_interval, Duration::from_secs(3));
    }

    #[test]
    fn no_profiles_falls_back_to_localhost() {
        let store = resolve_with_api_base(&Config::default(), None, None).unwrap();
        assert_eq!(store.api_base.as_str(), "http://localhost:8000/");
        assert_eq!(store.tls, TlsVerification::SystemDefaults);
        assert_eq!(store.metrics_window_hours, 1);
        assert_eq!(store.detail_window_hours, 24);
    }

    #[test]
    fn explicit_api_base_wins_over_profile() {
        let mut cfg = Config::default();
        cfg.profiles.insert(
            "default".into(),
            Profile {
                api_base: "http://nas.local:8000".into(),
                ca_cert: None,
                insecure: None,
                timeout: None,
            },
        );
        let store = resolve_with_api_base(&cfg, None, Some("http://10.0.0.2:9000")).unwrap();
        assert_eq!(store.api_base.as_str(), "http://10.0.0.2:9000/");
    }

    #[test]
    fn unknown_profile_is_an_error() {
        let err = resolve_with_api_base(&Config::default(), Some("office"), None).unwrap_err();
        assert!(matches!(err, ConfigError::UnknownProfile { profile } if profile == "office"));
    }

    #[test]
    fn invalid_api_base_is_rejected() {
        let err = resolve_with_api_base(&Config::default(), None, Some("not a url")).unwrap_err();
        assert!(matches!(err, ConfigError::Validation { ref field, .. } if field == "api_base"));

        let err =
            resolve_with_api_base(&Config::default(), None, Some("ftp://nas.local")).unwrap_err();
        assert!(matches!(err, ConfigError::Validation { .. }));
    }

    #[test]
    fn save_then_load_keeps_profiles() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let mut cfg = Config::default();
        cfg.defaults.timeout = 12;
        cfg.profiles.insert(
            "default".into(),
            Profile {
                api_base: "http://nas.local:8000".into(),
                ca_cert: None,
                insecure: Some(true),
                timeout: None,
            },
        );
        save_config_to(&cfg, &path).unwrap();

        let loaded = load_config_from(&path).unwrap();
        assert_eq!(loaded.defaults.timeout, 12);
        assert_eq!(loaded.profiles["default"].insecure, Some(true));
    }
}
