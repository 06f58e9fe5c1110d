//! Operator sessions.
//!
//! Data commands run inside a session opened against the configured
//! credentials. The session only gates access; it carries no permissions.

use chrono::{DateTime, Utc};
use sha2::{Digest, Sha256};
use tracing::info;
use uuid::Uuid;

use crate::config::AuthConfig;
use crate::error::AuthError;

/// An authenticated operator session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    /// Session id.
    pub id: Uuid,
    /// Authenticated username.
    pub username: String,
    /// Host the session was opened on.
    pub host: String,
    /// When the session was opened.
    pub started_at: DateTime<Utc>,
}

impl Session {
    /// Opens a session if the credentials match the configuration.
    ///
    /// # Errors
    ///
    /// Returns `InvalidCredentials` on a username or password mismatch.
    pub fn login(auth: &AuthConfig, username: &str, password: &str) -> Result<Self, AuthError> {
        let digest = password_digest(password);
        if username != auth.username || !digest.eq_ignore_ascii_case(auth.password_sha256.trim()) {
            return Err(AuthError::InvalidCredentials);
        }

        let session = Self {
            id: Uuid::new_v4(),
            username: username.to_string(),
            host: local_host(),
            started_at: Utc::now(),
        };

        info!(
            "Session {} opened for '{}' on {}",
            session.short_id(),
            session.username,
            session.host
        );
        Ok(session)
    }

    /// First eight characters of the session id.
    #[must_use]
    pub fn short_id(&self) -> String {
        self.id.to_string()[..8].to_string()
    }

    /// Closes the session.
    pub fn logout(self) {
        let elapsed = Utc::now() - self.started_at;
        info!(
            "Session {} closed for '{}' after {}ms",
            self.short_id(),
            self.username,
            elapsed.num_milliseconds()
        );
    }
}

/// Hex-encoded SHA-256 digest of a password.
#[must_use]
pub fn password_digest(password: &str) -> String {
    hex::encode(Sha256::digest(password.as_bytes()))
}

fn local_host() -> String {
    hostname::get().map_or_else(
        |_| String::from("unknown"),
        |h| h.to_string_lossy().to_string(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    const PASSWORD_SHA256: &str =
        "ef92b778bafe771e89245b89ecbc08a44a4e166c06659911881f383d4473e94f";

    fn auth() -> AuthConfig {
        AuthConfig {
            username: String::from("admin"),
            password_sha256: String::from(PASSWORD_SHA256),
        }
    }

    #[test]
    fn test_password_digest() {
        assert_eq!(password_digest("password123"), PASSWORD_SHA256);
    }

    #[test]
    fn test_login_success() {
        let session = Session::login(&auth(), "admin", "password123").unwrap();
        assert_eq!(session.username, "admin");
        assert_eq!(session.short_id().len(), 8);
        assert!(!session.host.is_empty());
        session.logout();
    }

    #[test]
    fn test_login_accepts_uppercase_digest() {
        let mut auth = auth();
        auth.password_sha256 = PASSWORD_SHA256.to_uppercase();
        assert!(Session::login(&auth, "admin", "password123").is_ok());
    }

    #[test]
    fn test_login_rejects_mismatch() {
        assert!(matches!(
            Session::login(&auth(), "admin", "wrong"),
            Err(AuthError::InvalidCredentials)
        ));
        assert!(matches!(
            Session::login(&auth(), "Admin", "password123"),
            Err(AuthError::InvalidCredentials)
        ));
    }

    #[test]
    fn test_sessions_are_distinct() {
        let first = Session::login(&auth(), "admin", "password123").unwrap();
        let second = Session::login(&auth(), "admin", "password123").unwrap();
        assert_ne!(first.id, second.id);
    }
}
