//! Remote preference store contract.
//!
//! The engine consumes this interface; it does not own an HTTP client.
//! `RestPreferenceClient` maps the contract onto a narrow transport seam
//! so the host application can plug in whatever client it already uses.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::core::identity::UserId;
use crate::core::wire::PreferenceRecord;

#[derive(Error, Debug)]
pub enum RemoteError {
    #[error("transport failure: {0}")]
    Transport(String),

    #[error("remote returned status {status}")]
    Status { status: u16 },

    #[error("malformed remote payload: {0}")]
    Decode(#[from] serde_json::Error),
}

/// Fetch payload. "No preferences yet" is an empty list, not an error.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct FetchResponse {
    #[serde(default)]
    pub preferences: Vec<PreferenceRecord>,
}

/// The server-side preference store.
///
/// Saves are idempotent from the caller's perspective: repeating the same
/// snapshot is safe.
pub trait PreferenceClient: Send {
    fn fetch_preferences(&self, user: &UserId) -> Result<FetchResponse, RemoteError>;
    fn save_preferences(&self, user: &UserId, records: &[PreferenceRecord])
        -> Result<(), RemoteError>;
}

/// Narrow seam over the host application's HTTP client.
pub trait HttpTransport: Send {
    fn get_json(&self, path: &str) -> Result<serde_json::Value, RemoteError>;
    fn post_json(&self, path: &str, body: serde_json::Value) -> Result<(), RemoteError>;
}

/// REST mapping of the preference contract.
pub struct RestPreferenceClient<T> {
    transport: T,
    base_path: String,
}

impl<T: HttpTransport> RestPreferenceClient<T> {
    pub fn new(transport: T, base_path: impl Into<String>) -> Self {
        let base_path = base_path.into().trim_end_matches('/').to_string();
        Self {
            transport,
            base_path,
        }
    }

    fn preferences_path(&self, user: &UserId) -> String {
        format!("{}/users/{}/navigation", self.base_path, user)
    }
}

impl<T: HttpTransport> PreferenceClient for RestPreferenceClient<T> {
    fn fetch_preferences(&self, user: &UserId) -> Result<FetchResponse, RemoteError> {
        let payload = self.transport.get_json(&self.preferences_path(user))?;
        Ok(serde_json::from_value(payload)?)
    }

    fn save_preferences(
        &self,
        user: &UserId,
        records: &[PreferenceRecord],
    ) -> Result<(), RemoteError> {
        let body = serde_json::json!({ "preferences": records });
        self.transport.post_json(&self.preferences_path(user), body)
    }
}
