//! CLI error types with miette diagnostics.
//!
//! Maps `omada_api::Error` and `ConfigError` into user-facing errors with
//! actionable help text.

use miette::Diagnostic;
use thiserror::Error;

use omada_api::Error as ApiError;
use omada_config::ConfigError;

/// Process exit codes.
pub mod exit_code {
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const AUTH: i32 = 3;
    pub const NOT_FOUND: i32 = 4;
    pub const CONNECTION: i32 = 7;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Connection ───────────────────────────────────────────────────
    #[error("Could not connect to controller at {url}")]
    #[diagnostic(
        code(omada::connection_failed),
        help(
            "Check that the controller is running and accessible.\n\
             URL: {url}\n\
             Self-signed certificate? Try: omada session --insecure"
        )
    )]
    ConnectionFailed {
        url: String,
        #[source]
        source: ApiError,
    },

    // ── Authentication ───────────────────────────────────────────────
    #[error("Authentication failed: {message}")]
    #[diagnostic(
        code(omada::auth_failed),
        help(
            "Verify the username and password for profile '{profile}'.\n\
             The password is read from OMADA_PASSWORD, the profile's password_env,\n\
             the config file, or the system keyring."
        )
    )]
    AuthFailed { profile: String, message: String },

    #[error("No credentials configured for profile '{profile}'")]
    #[diagnostic(
        code(omada::no_credentials),
        help("Set OMADA_USERNAME and OMADA_PASSWORD, or add username/password to the profile.")
    )]
    NoCredentials { profile: String },

    // ── Resources ────────────────────────────────────────────────────
    #[error("{resource_type} '{identifier}' not found")]
    #[diagnostic(
        code(omada::not_found),
        help("Run: omada {list_command} to see available {resource_type}s")
    )]
    NotFound {
        resource_type: String,
        identifier: String,
        list_command: String,
    },

    // ── API ──────────────────────────────────────────────────────────
    #[error(transparent)]
    #[diagnostic(code(omada::api_error))]
    Api(ApiError),

    // ── Validation ───────────────────────────────────────────────────
    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(omada::validation))]
    Validation { field: String, reason: String },

    // ── Configuration ────────────────────────────────────────────────
    #[error("Profile '{name}' not found in configuration")]
    #[diagnostic(
        code(omada::profile_not_found),
        help("Available profiles: {available}")
    )]
    ProfileNotFound { name: String, available: String },

    #[error("No controller configured")]
    #[diagnostic(
        code(omada::no_config),
        help(
            "Pass --controller (or set OMADA_CONTROLLER), or add a profile to\n\
             {path}"
        )
    )]
    NoConfig { path: String },

    #[error(transparent)]
    #[diagnostic(code(omada::config))]
    Config(ConfigError),
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::ConnectionFailed { .. } => exit_code::CONNECTION,
            Self::AuthFailed { .. } | Self::NoCredentials { .. } => exit_code::AUTH,
            Self::NotFound { .. } => exit_code::NOT_FOUND,
            Self::Validation { .. } | Self::ProfileNotFound { .. } | Self::NoConfig { .. } => {
                exit_code::USAGE
            }
            _ => exit_code::GENERAL,
        }
    }

    /// Attach the active profile and controller URL to a library error.
    pub fn from_api(err: ApiError, profile: &str, url: &str) -> Self {
        match err {
            ApiError::Authentication { message } => Self::AuthFailed {
                profile: profile.into(),
                message,
            },
            ApiError::EmptyToken | ApiError::SessionExpired => Self::AuthFailed {
                profile: profile.into(),
                message: err.to_string(),
            },
            ApiError::SiteNotFound { site } => Self::NotFound {
                resource_type: "site".into(),
                identifier: site,
                list_command: "config show".into(),
            },
            ApiError::Transport(_) | ApiError::Tls(_) | ApiError::ControllerDiscovery { .. } => {
                Self::ConnectionFailed {
                    url: url.into(),
                    source: err,
                }
            }
            other => Self::Api(other),
        }
    }
}

// ── ConfigError → CliError mapping ───────────────────────────────────

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::NoCredentials { profile } => Self::NoCredentials { profile },
            ConfigError::Validation { field, reason } => Self::Validation { field, reason },
            other => Self::Config(other),
        }
    }
}
