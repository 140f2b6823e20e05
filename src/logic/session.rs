//! Session gate: one credential exchange per session, before anything else is reachable.

use crate::client::{BackendError, DrawBackend};
use crate::models::{SessionFailure, SessionState};
use thiserror::Error;

/// Owns the [`SessionState`] of one client session.
///
/// The state leaves `Authenticating` exactly once. Later calls to
/// [`SessionGate::authenticate`] return the settled state without touching the network.
#[derive(Clone, Debug, Default)]
pub struct SessionGate {
    state: SessionState,
}

impl SessionGate {
    /// A gate that has not authenticated yet.
    pub fn new() -> Self {
        Self::default()
    }

    /// A gate already in `state`, e.g. to restore or to drive tests.
    pub fn with_state(state: SessionState) -> Self {
        Self { state }
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    /// Exchange the host's launch credential for a bearer token.
    ///
    /// A missing or blank credential fails immediately with no request made.
    /// A 403 is `AccessDenied`; any other failure is `AuthTransportError`. No retries.
    pub async fn authenticate<B>(&mut self, backend: &B, credential: Option<&str>) -> &SessionState
    where
        B: DrawBackend + ?Sized,
    {
        if self.state.is_terminal() {
            return &self.state;
        }

        let credential = match credential.map(str::trim) {
            Some(c) if !c.is_empty() => c,
            _ => {
                log::warn!("No launch credential supplied, refusing session");
                self.state = SessionState::Failed(SessionFailure::NoCredential);
                return &self.state;
            }
        };

        self.state = match backend.exchange_credential(credential).await {
            Ok(grant) => {
                log::info!("Session ready for user {}", grant.id);
                SessionState::Ready(grant.token)
            }
            Err(BackendError::Status(403)) => {
                log::warn!("Session refused: access denied");
                SessionState::Failed(SessionFailure::AccessDenied)
            }
            Err(e) => {
                log::warn!("Session refused: {e}");
                SessionState::Failed(SessionFailure::AuthTransportError(e.to_string()))
            }
        };
        &self.state
    }

    /// Bearer token when ready, otherwise the reason the session is unusable.
    pub fn require_ready(&self) -> Result<&str, SessionError> {
        require_ready(&self.state)
    }
}

/// Bearer token of a ready session, otherwise why the session cannot be used.
pub fn require_ready(state: &SessionState) -> Result<&str, SessionError> {
    match state {
        SessionState::Ready(token) => Ok(token),
        SessionState::Authenticating => Err(SessionError::Pending),
        SessionState::Failed(reason) => Err(SessionError::Failed(reason.clone())),
    }
}

/// Why protected functionality is not reachable right now.
#[derive(Clone, Debug, Eq, PartialEq, Error)]
pub enum SessionError {
    #[error("Validating session...")]
    Pending,
    #[error(transparent)]
    Failed(SessionFailure),
}
