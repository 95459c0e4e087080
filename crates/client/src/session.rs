//! Session Store: the single owner of authentication state.
//!
//! State changes are published on a `watch` channel; views and the route
//! guard read from it and never keep their own copy of "who is signed in".

use tokio::sync::watch;

use stockroom_auth::{Capabilities, Identity, SessionState};

use crate::api::{Credentials, InventoryApi};
use crate::error::SessionError;

pub struct SessionStore {
    api: InventoryApi,
    state: watch::Sender<SessionState>,
}

impl SessionStore {
    pub fn new(api: InventoryApi) -> Self {
        let (state, _) = watch::channel(SessionState::Uninitialized);
        Self { api, state }
    }

    pub fn api(&self) -> &InventoryApi {
        &self.api
    }

    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.state.subscribe()
    }

    pub fn snapshot(&self) -> SessionState {
        self.state.borrow().clone()
    }

    pub fn capabilities(&self) -> Capabilities {
        Capabilities::for_state(&self.state.borrow())
    }

    fn transition(&self, next: SessionState) {
        let previous = self.state.borrow().as_str();
        tracing::info!(from = previous, to = next.as_str(), "session state changed");
        self.state.send_replace(next);
    }

    /// Resolve an existing server-side session.
    ///
    /// Ends `Authenticated` or `Anonymous`; any probe failure means anonymous.
    pub async fn initialize(&self) -> SessionState {
        self.transition(SessionState::Loading);
        let next = match self.api.current_user().await {
            Ok(identity) => SessionState::Authenticated(identity),
            Err(e) => {
                tracing::debug!(error = %e, "no existing session");
                SessionState::Anonymous
            }
        };
        self.transition(next.clone());
        next
    }

    /// Sign in.
    ///
    /// Failure leaves the session anonymous and returns the generic error;
    /// the cause is only logged.
    pub async fn login(&self, username: &str, password: &str) -> Result<Identity, SessionError> {
        let credentials = Credentials::new(username, password);
        if credentials.is_blank() {
            tracing::warn!(username, "login rejected: blank credentials");
            return Err(self.fail_login());
        }

        let identity = match self.api.login(&credentials).await {
            Ok(Some(identity)) => identity,
            Ok(None) => match self.api.current_user().await {
                Ok(identity) => identity,
                Err(e) => {
                    tracing::warn!(username, error = %e, "login accepted but identity probe failed");
                    return Err(self.fail_login());
                }
            },
            Err(e) => {
                tracing::warn!(username, error = %e, "login failed");
                return Err(self.fail_login());
            }
        };

        self.transition(SessionState::Authenticated(identity.clone()));
        Ok(identity)
    }

    fn fail_login(&self) -> SessionError {
        if !matches!(*self.state.borrow(), SessionState::Anonymous) {
            self.transition(SessionState::Anonymous);
        }
        SessionError::AuthenticationFailed
    }

    /// Sign out. Local state is cleared whatever the backend answers.
    pub async fn logout(&self) {
        if let Err(e) = self.api.logout().await {
            tracing::warn!(error = %e, "logout request failed; clearing local session anyway");
        }
        self.transition(SessionState::Anonymous);
    }
}
