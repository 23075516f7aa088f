use log::{debug, trace};
use ureq::Agent;

use super::{ObjectStore, PortStore, Session, SessionUser, StoreError};
use crate::port::PortRecord;

/// Blocking client for a Supabase project: PostgREST for rows, Storage API for objects.
pub struct SupabaseClient {
    base_url: String,
    anon_key: String,
    access_token: Option<String>,
    agent: Agent,
}

impl SupabaseClient {
    pub fn new(base_url: impl Into<String>, anon_key: impl Into<String>) -> Self {
        // Error responses carry a JSON message we want to surface, so they are
        // read like any other response instead of becoming `ureq::Error`.
        let agent: Agent = Agent::config_builder()
            .http_status_as_error(false)
            .build()
            .into();
        let base_url: String = base_url.into();
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            anon_key: anon_key.into(),
            access_token: None,
            agent,
        }
    }

    /// Authorize row inserts as the session's user instead of the anonymous role.
    pub fn with_session(mut self, session: &Session) -> Self {
        self.access_token = session.user().map(|u| u.access_token.clone());
        self
    }

    #[cfg(test)]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn bearer(&self) -> String {
        let token = self.access_token.as_deref().unwrap_or(&self.anon_key);
        format!("Bearer {token}")
    }

    fn object_url(&self, bucket: &str, path: &str) -> String {
        format!(
            "{}/storage/v1/object/{}/{}",
            self.base_url,
            encode_path(bucket),
            encode_path(path)
        )
    }
}

impl PortStore for SupabaseClient {
    fn insert_ports(&self, table: &str, records: &[PortRecord]) -> Result<(), StoreError> {
        let url = format!("{}/rest/v1/{}", self.base_url, encode_path(table));
        debug!("POST {url} ({} row(s))", records.len());

        let mut response = self
            .agent
            .post(&url)
            .header("apikey", &self.anon_key)
            .header("Authorization", &self.bearer())
            .header("Prefer", "return=minimal")
            .send_json(records)
            .map_err(|e| StoreError::Unreachable(e.to_string()))?;

        let status = response.status().as_u16();
        if response.status().is_success() {
            trace!("Insert into {table} accepted with HTTP {status}");
            return Ok(());
        }
        let body = response.body_mut().read_to_string().unwrap_or_default();
        Err(StoreError::Rejected(error_message(status, &body)))
    }
}

impl ObjectStore for SupabaseClient {
    fn put_object(
        &self,
        user: &SessionUser,
        bucket: &str,
        key: &str,
        bytes: &[u8],
        content_type: &str,
    ) -> Result<String, StoreError> {
        let url = self.object_url(bucket, key);
        debug!("POST {url} ({} byte(s), {content_type})", bytes.len());

        let mut response = self
            .agent
            .post(&url)
            .header("apikey", &self.anon_key)
            .header("Authorization", &format!("Bearer {}", user.access_token))
            .header("Content-Type", content_type)
            .header("cache-control", "max-age=3600")
            .header("x-upsert", "false")
            .send(bytes)
            .map_err(|e| StoreError::Unreachable(e.to_string()))?;

        let status = response.status().as_u16();
        let body = response.body_mut().read_to_string().unwrap_or_default();
        if (200..300).contains(&status) {
            Ok(key.to_string())
        } else {
            Err(StoreError::Rejected(error_message(status, &body)))
        }
    }

    fn remove_object(
        &self,
        user: &SessionUser,
        bucket: &str,
        path: &str,
    ) -> Result<(), StoreError> {
        let url = self.object_url(bucket, path);
        debug!("DELETE {url}");

        let mut response = self
            .agent
            .delete(&url)
            .header("apikey", &self.anon_key)
            .header("Authorization", &format!("Bearer {}", user.access_token))
            .call()
            .map_err(|e| StoreError::Unreachable(e.to_string()))?;

        let status = response.status().as_u16();
        if (200..300).contains(&status) {
            return Ok(());
        }
        let body = response.body_mut().read_to_string().unwrap_or_default();
        Err(StoreError::Rejected(error_message(status, &body)))
    }

    fn public_url(&self, bucket: &str, path: &str) -> String {
        format!(
            "{}/storage/v1/object/public/{}/{}",
            self.base_url,
            encode_path(bucket),
            encode_path(path)
        )
    }
}

/// Pick the human-readable message out of a backend error body.
///
/// PostgREST and the Storage API both use `message`; auth errors use
/// `error_description` or `msg`. Non-JSON bodies are returned trimmed.
pub fn error_message(status: u16, body: &str) -> String {
    if let Ok(json) = serde_json::from_str::<serde_json::Value>(body) {
        for key in ["message", "error_description", "msg", "error"] {
            if let Some(msg) = json[key].as_str().filter(|m| !m.is_empty()) {
                return msg.to_string();
            }
        }
    }
    let trimmed = body.trim();
    if trimmed.is_empty() {
        format!("Request failed with HTTP {status}")
    } else {
        trimmed.to_string()
    }
}

/// Percent-encode a storage path, keeping `/` separators.
fn encode_path(path: &str) -> String {
    let mut out = String::with_capacity(path.len());
    for byte in path.bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' | b'/' => {
                out.push(byte as char)
            }
            _ => out.push_str(&format!("%{byte:02X}")),
        }
    }
    out
}
