//! Shared configuration for the Omada CLI.
//!
//! TOML profiles, credential resolution (env + plaintext + keyring),
//! and translation to `omada_api::ClientConfig`. The CLI adds flag-aware
//! wrappers on top.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;

use omada_api::{ClientConfig, Credentials, SiteSelector, TlsMode, TransportConfig};

/// Environment variable holding the controller password.
pub const PASSWORD_ENV: &str = "OMADA_PASSWORD";
/// Environment variable holding the controller username.
pub const USERNAME_ENV: &str = "OMADA_USERNAME";

const KEYRING_SERVICE: &str = "omada";

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("no credentials configured for profile '{profile}'")]
    NoCredentials { profile: String },

    #[error("failed to serialize config: {0}")]
    Serialization(#[from] toml::ser::Error),

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

// ── TOML config structs ─────────────────────────────────────────────

/// Top-level TOML configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    /// Default profile name.
    pub default_profile: Option<String>,

    /// Global defaults.
    #[serde(default)]
    pub defaults: Defaults,

    /// Named controller profiles.
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

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Defaults {
    #[serde(default)]
    pub insecure: bool,

    #[serde(default = "default_timeout")]
    pub timeout: u64,

    #[serde(default = "default_port_concurrency")]
    pub port_concurrency: usize,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            insecure: false,
            timeout: default_timeout(),
            port_concurrency: default_port_concurrency(),
        }
    }
}

fn default_timeout() -> u64 {
    30
}
fn default_port_concurrency() -> usize {
    1
}

/// A named controller profile.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Profile {
    /// Controller base URL (e.g., "https://omada.local:8043").
    pub controller: String,

    /// Username for the controller login.
    pub username: Option<String>,

    /// Password (plaintext — prefer keyring or env var).
    pub password: Option<String>,

    /// Environment variable name containing the password.
    pub password_env: Option<String>,

    /// Controller id (`omadacId`); discovered when absent.
    pub controller_id: Option<String>,

    /// Site name, resolved to an id after login.
    #[serde(default = "default_site")]
    pub site: String,

    /// Site id; skips the name lookup when set.
    pub site_id: Option<String>,

    /// Path to custom CA certificate.
    pub ca_cert: Option<PathBuf>,

    /// Override insecure TLS setting.
    pub insecure: Option<bool>,

    /// Override timeout (seconds).
    pub timeout: Option<u64>,

    /// Override how many switch port fetches may run at once.
    pub port_concurrency: Option<usize>,
}

fn default_site() -> String {
    "Default".into()
}

impl Profile {
    /// A profile pointing at `controller` with every optional field unset.
    pub fn new(controller: impl Into<String>) -> Self {
        Self {
            controller: controller.into(),
            username: None,
            password: None,
            password_env: None,
            controller_id: None,
            site: default_site(),
            site_id: None,
            ca_cert: None,
            insecure: None,
            timeout: None,
            port_concurrency: None,
        }
    }
}

// ── Config file path ────────────────────────────────────────────────

/// Resolve the config file path via XDG / platform conventions.
pub fn config_path() -> PathBuf {
    ProjectDirs::from("com", "omada", "omada").map_or_else(
        || {
            let mut p = dirs_fallback();
            p.push("config.toml");
            p
        },
        |dirs| dirs.config_dir().join("config.toml"),
    )
}

fn dirs_fallback() -> PathBuf {
    let mut p = PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".into()));
    p.push(".config");
    p.push("omada");
    p
}

// ── Config loading ──────────────────────────────────────────────────

/// Load the full Config from the canonical file + environment.
pub fn load_config() -> Result<Config, ConfigError> {
    load_config_from(&config_path())
}

/// Load the Config from `path` + environment.
///
/// A missing file yields the defaults. `OMADA_`-prefixed variables
/// override file values, with `__` separating nested keys
/// (`OMADA_DEFAULTS__TIMEOUT=10`).
pub fn load_config_from(path: &Path) -> Result<Config, ConfigError> {
    let figment = Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(path))
        .merge(Env::prefixed("OMADA_").split("__"));

    let config: Config = figment.extract()?;
    Ok(config)
}

/// Load config, returning a default if the file doesn't exist or is invalid.
///
/// An unreadable or malformed file is reported at `warn` level.
pub fn load_config_or_default() -> Config {
    load_config_or_default_from(&config_path())
}

fn load_config_or_default_from(path: &Path) -> Config {
    load_config_from(path).unwrap_or_else(|e| {
        warn!(path = %path.display(), error = %e, "ignoring unusable config file");
        Config::default()
    })
}

/// Serialize the config as TOML with every plaintext password replaced.
pub fn to_redacted_toml(cfg: &Config) -> Result<String, ConfigError> {
    let mut redacted = cfg.clone();
    for profile in redacted.profiles.values_mut() {
        if profile.password.is_some() {
            profile.password = Some("********".into());
        }
    }
    Ok(toml::to_string_pretty(&redacted)?)
}

// ── Credential resolution ───────────────────────────────────────────

/// Resolve the login credentials for a profile.
///
/// Username: profile, then `OMADA_USERNAME`. Password: the profile's
/// `password_env` variable, `OMADA_PASSWORD`, plaintext in the profile,
/// then the system keyring entry `omada/{profile}/password`.
pub fn resolve_credentials(
    profile: &Profile,
    profile_name: &str,
) -> Result<Credentials, ConfigError> {
    let username = profile
        .username
        .clone()
        .or_else(|| std::env::var(USERNAME_ENV).ok())
        .ok_or_else(|| ConfigError::NoCredentials {
            profile: profile_name.into(),
        })?;

    // 1. Profile's password_env → env var lookup
    if let Some(ref env_name) = profile.password_env {
        if let Ok(pw) = std::env::var(env_name) {
            return Ok(Credentials::new(username, SecretString::from(pw)));
        }
    }

    // 2. Global env var
    if let Ok(pw) = std::env::var(PASSWORD_ENV) {
        return Ok(Credentials::new(username, SecretString::from(pw)));
    }

    // 3. Plaintext in config
    if let Some(ref pw) = profile.password {
        return Ok(Credentials::new(username, SecretString::from(pw.clone())));
    }

    // 4. System keyring
    if let Ok(entry) = keyring::Entry::new(KEYRING_SERVICE, &format!("{profile_name}/password")) {
        if let Ok(pw) = entry.get_password() {
            return Ok(Credentials::new(username, SecretString::from(pw)));
        }
    }

    Err(ConfigError::NoCredentials {
        profile: profile_name.into(),
    })
}

/// Build a `ClientConfig` from a profile and the global defaults.
pub fn profile_to_client_config(
    profile: &Profile,
    profile_name: &str,
    defaults: &Defaults,
) -> Result<ClientConfig, ConfigError> {
    let url: url::Url = profile
        .controller
        .parse()
        .map_err(|_| ConfigError::Validation {
            field: "controller".into(),
            reason: format!("invalid URL: {}", profile.controller),
        })?;

    let port_concurrency = profile
        .port_concurrency
        .unwrap_or(defaults.port_concurrency);
    if port_concurrency == 0 {
        return Err(ConfigError::Validation {
            field: "port_concurrency".into(),
            reason: "must be at least 1".into(),
        });
    }

    let credentials = resolve_credentials(profile, profile_name)?;

    let site = match profile.site_id {
        Some(ref id) => SiteSelector::Id(id.clone()),
        None => SiteSelector::Name(profile.site.clone()),
    };

    let tls = if let Some(ref ca_path) = profile.ca_cert {
        TlsMode::CustomCa(ca_path.clone())
    } else if profile.insecure.unwrap_or(defaults.insecure) {
        TlsMode::DangerAcceptInvalid
    } else {
        TlsMode::System
    };

    let timeout = Duration::from_secs(profile.timeout.unwrap_or(defaults.timeout));

    Ok(ClientConfig {
        url,
        credentials,
        site,
        controller_id: profile.controller_id.clone(),
        port_concurrency,
        transport: TransportConfig {
            tls,
            timeout,
        },
    })
}
