use thiserror::Error;

/// Top-level error type for the `omada-api` crate.
///
/// Covers every failure mode of the inventory workflow: session handling,
/// controller discovery, transport, the `{errorCode, msg, result}` envelope,
/// and switch port enrichment. The CLI maps these into user-facing diagnostics.
#[derive(Debug, Error)]
pub enum Error {
    // ── Session ─────────────────────────────────────────────────────
    /// Login failed (wrong credentials, account locked, etc.)
    #[error("Authentication failed: {message}")]
    Authentication { message: String },

    /// Login reported success but the controller issued no usable token.
    #[error("Login succeeded but the controller returned an empty token")]
    EmptyToken,

    /// Session has expired or was revoked by the controller.
    #[error("Session expired -- re-authentication required")]
    SessionExpired,

    // ── Discovery ───────────────────────────────────────────────────
    /// The controller id (`omadacId`) could not be determined.
    #[error("Controller discovery failed: {message}")]
    ControllerDiscovery { message: String },

    /// No site with the configured name is visible to this account.
    #[error("Site '{site}' not found on controller")]
    SiteNotFound { site: String },

    // ── Transport ───────────────────────────────────────────────────
    /// HTTP transport error (connection refused, DNS failure, etc.)
    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// URL parsing error.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// TLS handshake or certificate error.
    #[error("TLS error: {0}")]
    Tls(String),

    /// Non-success HTTP status other than 401.
    #[error("HTTP {status}: {message}")]
    Http { status: u16, message: String },

    // ── Envelope ────────────────────────────────────────────────────
    /// The controller answered with a non-zero `errorCode`.
    #[error("Omada API error ({code}): {message}")]
    Api { code: i64, message: String },

    /// JSON deserialization failed, with the raw body for debugging.
    #[error("Deserialization error: {message}")]
    Deserialization { message: String, body: String },

    // ── Enrichment ──────────────────────────────────────────────────
    /// Fetching the ports of a switch failed; the whole inventory is discarded.
    #[error("failed to get ports for switch {mac}: {source}")]
    PortFetch {
        mac: String,
        #[source]
        source: Box<Error>,
    },
}

impl Error {
    /// Returns `true` if this error indicates auth has expired
    /// and re-authentication might resolve it.
    pub fn is_auth_expired(&self) -> bool {
        match self {
            Self::Authentication { .. } | Self::SessionExpired | Self::EmptyToken => true,
            Self::PortFetch { source, .. } => source.is_auth_expired(),
            _ => false,
        }
    }

    /// Returns `true` if this is a transient error worth retrying.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Transport(e) => e.is_timeout() || e.is_connect(),
            Self::Http { status, .. } => *status >= 500,
            Self::PortFetch { source, .. } => source.is_transient(),
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn port_fetch_delegates_classification_to_source() {
        let err = Error::PortFetch {
            mac: "AA-BB-CC-DD-EE-FF".into(),
            source: Box::new(Error::SessionExpired),
        };
        assert!(err.is_auth_expired());
        assert!(!err.is_transient());

        let err = Error::PortFetch {
            mac: "AA-BB-CC-DD-EE-FF".into(),
            source: Box::new(Error::Http {
                status: 503,
                message: "unavailable".into(),
            }),
        };
        assert!(err.is_transient());
        assert!(err.to_string().contains("failed to get ports"));
    }

    #[test]
    fn api_errors_are_not_transient() {
        let err = Error::Api {
            code: -30109,
            message: "Invalid username or password.".into(),
        };
        assert!(!err.is_transient());
        assert!(!err.is_auth_expired());
    }
}
