//! Backend endpoint and credential configuration.
//!
//! An explicit config value handed to each client, never process-global
//! state. The credential is an opaque bearer string: the core attaches it
//! to chat requests and otherwise never inspects it.

use std::fmt;

/// Local development default of the backend.
pub const DEFAULT_BASE_URL: &str = "http://localhost:8000";

/// Opaque bearer credential for the chat proxy.
#[derive(Clone)]
pub struct Credential(String);

impl Credential {
    pub fn new(secret: impl Into<String>) -> Self {
        Self(secret.into())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

// Keep the secret out of logs and debug dumps.
impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Credential(***)")
    }
}

#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub base_url: String,
    pub credential: Option<Credential>,
}

impl ApiConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            credential: None,
        }
    }

    pub fn with_credential(mut self, credential: Credential) -> Self {
        self.credential = Some(credential);
        self
    }

    /// Join a path onto the base url, tolerating a trailing slash.
    pub fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.base_url.trim_end_matches('/'), path)
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self::new(DEFAULT_BASE_URL)
    }
}
