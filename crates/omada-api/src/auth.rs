use std::sync::{PoisonError, RwLock};

use secrecy::{ExposeSecret, SecretString};

use crate::error::Error;

/// Username/password pair used by the controller's login endpoint.
#[derive(Debug, Clone)]
pub struct Credentials {
    pub username: String,
    pub password: SecretString,
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: impl Into<SecretString>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }
}

/// Authentication state of a [`Session`].
#[derive(Debug, Clone)]
pub enum SessionState {
    /// No token yet, or the controller revoked it.
    Unauthenticated,
    /// A login issued this token; it is attached to every request.
    Authenticated { token: SecretString },
}

/// Session owned by a single client instance.
///
/// Starts `Unauthenticated`. Only a non-empty token moves it to
/// `Authenticated`; `invalidate` moves it back.
#[derive(Debug)]
pub struct Session {
    state: RwLock<SessionState>,
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

impl Session {
    pub fn new() -> Self {
        Self {
            state: RwLock::new(SessionState::Unauthenticated),
        }
    }

    /// Snapshot of the current state.
    pub fn state(&self) -> SessionState {
        self.state
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// The current token, if authenticated.
    pub fn token(&self) -> Option<SecretString> {
        match self.state() {
            SessionState::Authenticated { token } => Some(token),
            SessionState::Unauthenticated => None,
        }
    }

    pub fn is_authenticated(&self) -> bool {
        matches!(self.state(), SessionState::Authenticated { .. })
    }

    /// Store a freshly issued token.
    ///
    /// An empty (or whitespace-only) token leaves the session untouched and
    /// returns [`Error::EmptyToken`].
    pub fn authenticate(&self, token: SecretString) -> Result<(), Error> {
        if token.expose_secret().trim().is_empty() {
            return Err(Error::EmptyToken);
        }
        *self.state.write().unwrap_or_else(PoisonError::into_inner) =
            SessionState::Authenticated { token };
        Ok(())
    }

    /// Drop the token, returning to `Unauthenticated`.
    pub fn invalidate(&self) {
        *self.state.write().unwrap_or_else(PoisonError::into_inner) = SessionState::Unauthenticated;
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;

    #[test]
    fn starts_unauthenticated() {
        let session = Session::new();
        assert!(!session.is_authenticated());
        assert!(session.token().is_none());
    }

    #[test]
    fn authenticate_stores_token() {
        let session = Session::new();
        session.authenticate("abc123".into()).unwrap();
        assert!(session.is_authenticated());
        assert_eq!(session.token().unwrap().expose_secret(), "abc123");
    }

    #[test]
    fn empty_token_is_rejected() {
        let session = Session::new();
        let err = session.authenticate(String::new().into()).unwrap_err();
        assert!(matches!(err, Error::EmptyToken));
        assert!(!session.is_authenticated());

        let err = session.authenticate("   ".into()).unwrap_err();
        assert!(matches!(err, Error::EmptyToken));
    }

    #[test]
    fn empty_token_keeps_previous_session() {
        let session = Session::new();
        session.authenticate("first".into()).unwrap();
        assert!(session.authenticate(String::new().into()).is_err());
        assert_eq!(session.token().unwrap().expose_secret(), "first");
    }

    #[test]
    fn invalidate_returns_to_unauthenticated() {
        let session = Session::new();
        session.authenticate("abc123".into()).unwrap();
        session.invalidate();
        assert!(matches!(session.state(), SessionState::Unauthenticated));
    }
}
