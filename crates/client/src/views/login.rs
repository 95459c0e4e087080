use std::sync::Arc;

use stockroom_auth::Route;

use crate::session::SessionStore;

/// Where the shell should go after a login attempt.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum LoginOutcome {
    Navigate(Route),
    Stay,
}

pub struct LoginView {
    session: Arc<SessionStore>,
    submitting: bool,
    error: Option<String>,
}

impl LoginView {
    pub fn new(session: Arc<SessionStore>) -> Self {
        Self {
            session,
            submitting: false,
            error: None,
        }
    }

    pub fn is_submitting(&self) -> bool {
        self.submitting
    }

    /// Message shown under the form after a failed attempt.
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub async fn submit(&mut self, username: &str, password: &str) -> LoginOutcome {
        self.submitting = true;
        self.error = None;
        let result = self.session.login(username, password).await;
        self.submitting = false;

        match result {
            Ok(_) => LoginOutcome::Navigate(Route::Dashboard),
            Err(e) => {
                self.error = Some(e.to_string());
                LoginOutcome::Stay
            }
        }
    }
}
