//! Route table and route-level gating.

use crate::session::SessionState;

/// Views reachable in the client.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Route {
    Login,
    Dashboard,
    Inventory,
    Suppliers,
    Transactions,
}

impl Route {
    pub const ALL: [Route; 5] = [
        Route::Login,
        Route::Dashboard,
        Route::Inventory,
        Route::Suppliers,
        Route::Transactions,
    ];

    pub fn path(&self) -> &'static str {
        match self {
            Route::Login => "/login",
            Route::Dashboard => "/",
            Route::Inventory => "/inventory",
            Route::Suppliers => "/suppliers",
            Route::Transactions => "/transactions",
        }
    }

    pub fn from_path(path: &str) -> Option<Route> {
        let trimmed = path.trim_end_matches('/');
        let normalized = if trimmed.is_empty() { "/" } else { trimmed };
        Route::ALL.into_iter().find(|route| route.path() == normalized)
    }

    /// Every route except the login view requires a session.
    pub fn is_protected(&self) -> bool {
        !matches!(self, Route::Login)
    }
}

/// Outcome of gating a navigation.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum RouteDecision {
    Render(Route),
    /// Session not resolved yet; render nothing.
    Pending,
    Redirect(Route),
}

/// Gate `route` on the session state.
pub fn guard(route: Route, state: &SessionState) -> RouteDecision {
    if !route.is_protected() {
        return RouteDecision::Render(route);
    }
    match state {
        SessionState::Authenticated(_) => RouteDecision::Render(route),
        SessionState::Uninitialized | SessionState::Loading => RouteDecision::Pending,
        SessionState::Anonymous => RouteDecision::Redirect(Route::Login),
    }
}
