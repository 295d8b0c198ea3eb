use std::sync::Arc;

use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};

use super::store::TokenStore;

/// Credential returned by the login endpoint.
///
/// Only `access_token` is required. The server's token schema also carries
/// `expires_in`, `user_id` and `role`; they are kept when present but nothing
/// depends on them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionToken {
    pub access_token: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_in: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
}

impl SessionToken {
    pub fn new(access_token: impl Into<String>) -> Self {
        Self {
            access_token: access_token.into(),
            token_type: None,
            expires_in: None,
            user_id: None,
            role: None,
        }
    }
}

/// The current session, backed by a token store.
///
/// After [`Session::load`] only the raw token is known; the extra fields are
/// available for sessions established in this process.
pub struct Session {
    store: Arc<dyn TokenStore>,
    pub data: Option<SessionToken>,
}

impl Session {
    pub fn new(store: Arc<dyn TokenStore>) -> Self {
        Self { store, data: None }
    }

    /// Load the stored token, if any
    pub fn load(&mut self) -> Result<bool> {
        match self.store.load()? {
            Some(token) => {
                self.data = Some(SessionToken::new(token));
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Persist a freshly issued token, then adopt it.
    /// An empty token is refused and storage is left untouched.
    pub fn establish(&mut self, token: SessionToken) -> Result<()> {
        if token.access_token.is_empty() {
            bail!("Refusing to store an empty access token");
        }
        self.store.save(&token.access_token)?;
        self.data = Some(token);
        Ok(())
    }

    /// Forget the session and empty the store
    pub fn clear(&mut self) -> Result<()> {
        self.data = None;
        self.store.clear()
    }

    /// Get the bearer token if a session exists
    pub fn token(&self) -> Option<&str> {
        self.data.as_ref().map(|d| d.access_token.as_str())
    }

    pub fn is_authenticated(&self) -> bool {
        self.data.is_some()
    }
}
