use anyhow::{Context, Result};
use base64::Engine;

use super::StoreError;

/// Signed-in user, as needed by authenticated backend calls.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionUser {
    pub id: String,
    pub access_token: String,
}

/// Who is acting. Passed explicitly to every storage operation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Session {
    user: Option<SessionUser>,
}

impl Session {
    pub fn anonymous() -> Self {
        Self { user: None }
    }

    pub fn authenticated(user: SessionUser) -> Self {
        Self { user: Some(user) }
    }

    pub fn user(&self) -> Option<&SessionUser> {
        self.user.as_ref()
    }

    pub fn user_id(&self) -> Option<&str> {
        self.user.as_ref().map(|u| u.id.as_str())
    }

    pub fn require_user(&self) -> Result<&SessionUser, StoreError> {
        self.user.as_ref().ok_or(StoreError::NotAuthenticated)
    }
}

/// Read the `sub` claim (the user id) from a JWT access token.
///
/// The signature is not checked; the backend does that on every request.
pub fn user_id_from_token(token: &str) -> Result<String> {
    let payload = token
        .split('.')
        .nth(1)
        .filter(|p| !p.is_empty())
        .ok_or_else(|| {
            anyhow::anyhow!("Access token is not a JWT (expected header.payload.signature)")
        })?;

    let bytes = base64::engine::general_purpose::URL_SAFE_NO_PAD
        .decode(payload.trim_end_matches('='))
        .context("Failed to decode access token payload")?;

    let claims: serde_json::Value =
        serde_json::from_slice(&bytes).context("Access token payload is not JSON")?;

    claims["sub"]
        .as_str()
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .ok_or_else(|| anyhow::anyhow!("Access token has no 'sub' claim"))
}
