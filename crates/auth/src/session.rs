//! Session lifecycle: `Uninitialized → Loading → Authenticated | Anonymous`.

use crate::identity::Identity;

/// Process-wide authentication state.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum SessionState {
    /// App started; no session probe has run yet.
    #[default]
    Uninitialized,
    /// A session probe is in flight.
    Loading,
    Authenticated(Identity),
    Anonymous,
}

impl SessionState {
    /// True while the state is not yet resolved either way.
    pub fn is_loading(&self) -> bool {
        matches!(self, SessionState::Uninitialized | SessionState::Loading)
    }

    pub fn is_authenticated(&self) -> bool {
        matches!(self, SessionState::Authenticated(_))
    }

    pub fn identity(&self) -> Option<&Identity> {
        match self {
            SessionState::Authenticated(identity) => Some(identity),
            _ => None,
        }
    }

    /// Staff capability of the signed-in user; `false` when not signed in.
    pub fn is_staff(&self) -> bool {
        self.identity().is_some_and(|identity| identity.is_staff)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SessionState::Uninitialized => "uninitialized",
            SessionState::Loading => "loading",
            SessionState::Authenticated(_) => "authenticated",
            SessionState::Anonymous => "anonymous",
        }
    }
}
