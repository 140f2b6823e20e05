//! Session state shared by everything behind the session gate.

use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;

/// Why a session could not be established. Terminal for the session.
#[derive(Clone, Debug, Eq, PartialEq, Error)]
pub enum SessionFailure {
    /// No launch credential: not running inside the expected host.
    #[error("Not running inside the host application")]
    NoCredential,
    /// Backend answered 403.
    #[error("Access denied: user not allowed")]
    AccessDenied,
    /// Any other non-success status or a transport error.
    #[error("Authentication failed: {0}")]
    AuthTransportError(String),
}

/// What the backend returns for a successful credential exchange.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct SessionGrant {
    pub token: String,
    /// User id; the backend sends it as a JSON number.
    #[serde(deserialize_with = "id_from_number_or_string")]
    pub id: String,
}

fn id_from_number_or_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawId {
        Number(i64),
        Text(String),
    }

    Ok(match RawId::deserialize(deserializer)? {
        RawId::Number(n) => n.to_string(),
        RawId::Text(s) => s,
    })
}

/// Lifecycle of one client session.
///
/// Starts `Authenticating` and moves at most once, to `Ready` or `Failed`.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub enum SessionState {
    #[default]
    Authenticating,
    Ready(String),
    Failed(SessionFailure),
}

impl SessionState {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, SessionState::Authenticating)
    }

    /// Bearer token, only when the session is ready.
    pub fn token(&self) -> Option<&str> {
        match self {
            SessionState::Ready(token) => Some(token),
            _ => None,
        }
    }
}
