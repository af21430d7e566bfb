//! Login gate: LoggedOut until a secret is supplied, then LoggedIn for good

use std::fmt;

use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    LoggedOut,
    LoggedIn,
}

/// Keystore password. `Debug` never prints the value.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct Secret(String);

impl Secret {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Secret(<redacted>)")
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Credentials {
    pub have_secret: bool,
    pub secret: Secret,
}

/// What the session-start hooks need to run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionStart {
    pub secret: Secret,
    pub node_url: String,
    pub reset: bool,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SessionError {
    #[error("already logged in")]
    AlreadyLoggedIn,
    #[error("node URL is empty")]
    EmptyNodeUrl,
}

#[derive(Debug, Default)]
pub struct Session {
    credentials: Credentials,
    node_url: String,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> SessionState {
        if self.credentials.have_secret {
            SessionState::LoggedIn
        } else {
            SessionState::LoggedOut
        }
    }

    pub fn is_logged_in(&self) -> bool {
        self.state() == SessionState::LoggedIn
    }

    pub fn credentials(&self) -> &Credentials {
        &self.credentials
    }

    pub fn node_url(&self) -> &str {
        &self.node_url
    }

    /// LoggedOut -> LoggedIn. The returned [`SessionStart`] is produced exactly
    /// once per session.
    pub fn login(
        &mut self,
        secret: &str,
        node_url: &str,
        reset: bool,
    ) -> Result<SessionStart, SessionError> {
        if self.is_logged_in() {
            return Err(SessionError::AlreadyLoggedIn);
        }
        let node_url = node_url.trim();
        if node_url.is_empty() {
            return Err(SessionError::EmptyNodeUrl);
        }

        self.credentials = Credentials {
            have_secret: true,
            secret: Secret::new(secret),
        };
        self.node_url = node_url.to_string();
        Ok(SessionStart {
            secret: Secret::new(secret),
            node_url: self.node_url.clone(),
            reset,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_login_is_one_way() {
        let mut session = Session::new();
        assert_eq!(session.state(), SessionState::LoggedOut);

        let start = session.login("pw", " http://node:8545 ", true).unwrap();
        assert_eq!(start.node_url, "http://node:8545");
        assert!(start.reset);
        assert_eq!(session.state(), SessionState::LoggedIn);
        assert_eq!(session.credentials().secret.expose(), "pw");

        assert_eq!(
            session.login("other", "http://x", false),
            Err(SessionError::AlreadyLoggedIn)
        );
        assert_eq!(session.credentials().secret.expose(), "pw");
    }

    #[test]
    fn test_login_requires_url() {
        let mut session = Session::new();
        assert_eq!(session.login("pw", "  ", false), Err(SessionError::EmptyNodeUrl));
        assert!(!session.is_logged_in());
    }

    #[test]
    fn test_debug_redacts_secret() {
        let mut session = Session::new();
        session.login("hunter2", "http://node", false).unwrap();
        assert!(!format!("{session:?}").contains("hunter2"));
    }
}
