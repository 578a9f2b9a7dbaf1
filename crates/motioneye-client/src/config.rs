//! Client configuration

use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::types::{DEFAULT_ADMIN_USERNAME, DEFAULT_SURVEILLANCE_USERNAME};

/// A username/password pair
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
    pub username: String,
    #[serde(default)]
    pub password: String,
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }

    /// Default admin account (`admin`, no password)
    pub fn admin() -> Self {
        Self::new(DEFAULT_ADMIN_USERNAME, "")
    }

    /// Default surveillance account (`user`, no password)
    pub fn surveillance() -> Self {
        Self::new(DEFAULT_SURVEILLANCE_USERNAME, "")
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// motionEye client configuration
///
/// Constructed with [`ClientConfig::new`] and the builder-style setters, or
/// deserialized from any serde format.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Base URL of the motionEye server (e.g. `http://localhost:8765`)
    pub url: String,

    /// Account used for API calls
    #[serde(default = "Credentials::admin")]
    pub admin: Credentials,

    /// Account used to sign media URLs
    #[serde(default = "Credentials::surveillance")]
    pub surveillance: Credentials,

    /// Overall request timeout in milliseconds (transport default if unset)
    #[serde(default)]
    pub request_timeout_ms: Option<u64>,

    /// Connect timeout in milliseconds (transport default if unset)
    #[serde(default)]
    pub connect_timeout_ms: Option<u64>,
}

impl ClientConfig {
    /// Configuration with default credentials and no timeouts
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            admin: Credentials::admin(),
            surveillance: Credentials::surveillance(),
            request_timeout_ms: None,
            connect_timeout_ms: None,
        }
    }

    /// Set the admin credentials
    pub fn admin(mut self, username: impl Into<String>, password: impl Into<String>) -> Self {
        self.admin = Credentials::new(username, password);
        self
    }

    /// Set the surveillance credentials
    pub fn surveillance(
        mut self,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        self.surveillance = Credentials::new(username, password);
        self
    }

    pub fn request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout_ms = Some(timeout.as_millis() as u64);
        self
    }

    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout_ms = Some(timeout.as_millis() as u64);
        self
    }

    pub(crate) fn request_timeout_duration(&self) -> Option<Duration> {
        self.request_timeout_ms.map(Duration::from_millis)
    }

    pub(crate) fn connect_timeout_duration(&self) -> Option<Duration> {
        self.connect_timeout_ms.map(Duration::from_millis)
    }
}
