use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};

/// Environment variable names read by [`AuthzConfig::from_env`].
pub mod env {
    /// Replacement for the placeholder host.
    pub const XCACHE_HOST: &str = "XCACHE_HOST";
    /// Replacement port; ignored unless it is a positive integer.
    pub const XCACHE_PORT: &str = "XCACHE_PORT";
    /// Raw bearer token.
    pub const BEARER_TOKEN: &str = "BEARER_TOKEN";
    /// Path to a file holding the bearer token.
    pub const BEARER_TOKEN_FILE: &str = "BEARER_TOKEN_FILE";
    /// Per-user runtime directory searched for the well-known token file.
    pub const XDG_RUNTIME_DIR: &str = "XDG_RUNTIME_DIR";
}

/// HTTP backend timeouts (optional `[http]` section in config.toml).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HttpSettings {
    pub connect_timeout_secs: u64,
    /// Per-request timeout used when the caller passes a zero timeout.
    pub timeout_secs: u64,
    pub follow_redirects: bool,
}

impl Default for HttpSettings {
    fn default() -> Self {
        Self {
            connect_timeout_secs: 15,
            timeout_secs: 30,
            follow_redirects: true,
        }
    }
}

/// Static settings loaded from `~/.config/xcauthz/config.toml`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PluginSettings {
    /// Host name callers use as an alias for the local caching proxy.
    pub placeholder_host: String,
    /// Directory searched last for the well-known token file.
    pub fallback_token_dir: PathBuf,
    /// Well-known token file name is this prefix followed by the effective uid.
    pub token_file_prefix: String,
    #[serde(default)]
    pub http: Option<HttpSettings>,
}

impl Default for PluginSettings {
    fn default() -> Self {
        Self {
            placeholder_host: "xcache".to_string(),
            fallback_token_dir: PathBuf::from("/tmp"),
            token_file_prefix: "bt_u".to_string(),
            http: None,
        }
    }
}

impl PluginSettings {
    pub fn http(&self) -> HttpSettings {
        self.http.clone().unwrap_or_default()
    }
}

pub fn config_path() -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("xcauthz")?;
    Ok(xdg_dirs.place_config_file("config.toml")?)
}

/// Load settings from disk, creating a default file if none exists.
pub fn load_or_init() -> Result<PluginSettings> {
    let path = config_path()?;
    if !path.exists() {
        let default_cfg = PluginSettings::default();
        let toml = toml::to_string_pretty(&default_cfg)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, toml)?;
        tracing::info!("created default config at {}", path.display());
        return Ok(default_cfg);
    }
    load_from(&path)
}

/// Load settings from an explicit path.
pub fn load_from(path: &Path) -> Result<PluginSettings> {
    let data =
        fs::read_to_string(path).with_context(|| format!("read config {}", path.display()))?;
    let cfg: PluginSettings =
        toml::from_str(&data).with_context(|| format!("parse config {}", path.display()))?;
    Ok(cfg)
}

/// Snapshot of everything URL customization and token discovery look at.
///
/// Built from the process environment on each customization (see
/// [`ConfigSource::Environment`]) so rotated tokens and changed variables are
/// picked up without a restart. Tests build one directly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthzConfig {
    pub placeholder_host: String,
    pub replacement_host: Option<String>,
    /// Kept as the raw string; [`crate::url_model::parse_port`] decides whether it is usable.
    pub replacement_port: Option<String>,
    pub bearer_token: Option<String>,
    pub bearer_token_file: Option<PathBuf>,
    pub runtime_dir: Option<PathBuf>,
    pub fallback_token_dir: PathBuf,
    pub token_file_prefix: String,
    /// Effective uid used to name the well-known token file; `None` skips those lookups.
    pub euid: Option<u32>,
}

impl AuthzConfig {
    /// Settings only, no environment values.
    pub fn from_settings(settings: &PluginSettings) -> Self {
        Self {
            placeholder_host: settings.placeholder_host.clone(),
            replacement_host: None,
            replacement_port: None,
            bearer_token: None,
            bearer_token_file: None,
            runtime_dir: None,
            fallback_token_dir: settings.fallback_token_dir.clone(),
            token_file_prefix: settings.token_file_prefix.clone(),
            euid: effective_uid(),
        }
    }

    /// Build from the current process environment.
    pub fn from_env(settings: &PluginSettings) -> Self {
        Self::from_lookup(settings, |name| std::env::var_os(name))
    }

    /// Build from an arbitrary variable lookup. Empty and non-UTF-8 values count as unset.
    pub fn from_lookup<F>(settings: &PluginSettings, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<OsString>,
    {
        let string = |name: &str| -> Option<String> {
            let value = lookup(name)?;
            match value.into_string() {
                Ok(s) if !s.is_empty() => Some(s),
                Ok(_) => None,
                Err(_) => {
                    tracing::debug!(var = name, "ignoring non-UTF-8 environment value");
                    None
                }
            }
        };
        let path = |name: &str| -> Option<PathBuf> {
            lookup(name).filter(|v| !v.is_empty()).map(PathBuf::from)
        };

        Self {
            replacement_host: string(env::XCACHE_HOST),
            replacement_port: string(env::XCACHE_PORT),
            bearer_token: string(env::BEARER_TOKEN),
            bearer_token_file: path(env::BEARER_TOKEN_FILE),
            runtime_dir: path(env::XDG_RUNTIME_DIR),
            ..Self::from_settings(settings)
        }
    }

    /// Name of the well-known per-user token file, e.g. `bt_u1000`.
    pub fn token_file_name(&self) -> Option<String> {
        self.euid
            .map(|uid| format!("{}{}", self.token_file_prefix, uid))
    }
}

impl Default for AuthzConfig {
    fn default() -> Self {
        Self::from_settings(&PluginSettings::default())
    }
}

/// Where a factory gets its [`AuthzConfig`] from.
#[derive(Debug, Clone)]
pub enum ConfigSource {
    /// Re-read the process environment on every customization.
    Environment(PluginSettings),
    /// Always use this snapshot.
    Fixed(AuthzConfig),
}

impl ConfigSource {
    pub fn current(&self) -> AuthzConfig {
        match self {
            ConfigSource::Environment(settings) => AuthzConfig::from_env(settings),
            ConfigSource::Fixed(cfg) => cfg.clone(),
        }
    }
}

impl Default for ConfigSource {
    fn default() -> Self {
        ConfigSource::Environment(PluginSettings::default())
    }
}

#[cfg(unix)]
pub fn effective_uid() -> Option<u32> {
    // SAFETY: geteuid has no preconditions and cannot fail.
    Some(unsafe { libc::geteuid() })
}

#[cfg(not(unix))]
pub fn effective_uid() -> Option<u32> {
    None
}
