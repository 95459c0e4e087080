use serde::Serialize;
use thiserror::Error;

use crate::session::SessionState;

/// A user-facing operation a view can offer.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    View,
    Create,
    Edit,
    Delete,
    Export,
}

impl Action {
    /// Whether the action changes server state.
    pub fn is_mutation(&self) -> bool {
        matches!(self, Action::Create | Action::Edit | Action::Delete)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Action::View => "view",
            Action::Create => "create",
            Action::Edit => "edit",
            Action::Delete => "delete",
            Action::Export => "export",
        }
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthzError {
    #[error("not signed in")]
    Unauthenticated,

    #[error("forbidden: '{0}' requires staff capability")]
    Forbidden(&'static str),
}

/// Decide whether the current session may perform `action`.
///
/// - No IO
/// - No panics
/// - Reads only the session state (the single source of truth)
pub fn authorize(state: &SessionState, action: Action) -> Result<(), AuthzError> {
    if !state.is_authenticated() {
        return Err(AuthzError::Unauthenticated);
    }
    if action.is_mutation() && !state.is_staff() {
        return Err(AuthzError::Forbidden(action.as_str()));
    }
    Ok(())
}

/// Which affordances a view renders for the current session.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Capabilities {
    pub can_view: bool,
    pub can_create: bool,
    pub can_edit: bool,
    pub can_delete: bool,
    pub can_export: bool,
}

impl Capabilities {
    pub fn for_state(state: &SessionState) -> Self {
        let allowed = |action| authorize(state, action).is_ok();
        Self {
            can_view: allowed(Action::View),
            can_create: allowed(Action::Create),
            can_edit: allowed(Action::Edit),
            can_delete: allowed(Action::Delete),
            can_export: allowed(Action::Export),
        }
    }

    pub fn allows(&self, action: Action) -> bool {
        match action {
            Action::View => self.can_view,
            Action::Create => self.can_create,
            Action::Edit => self.can_edit,
            Action::Delete => self.can_delete,
            Action::Export => self.can_export,
        }
    }

    /// True when any row-level action (edit/delete) is available.
    pub fn has_row_actions(&self) -> bool {
        self.can_edit || self.can_delete
    }
}
