//! Application shell: session store, current route, and view factories.

use std::sync::Arc;

use stockroom_auth::{guard, Route, RouteDecision};

use crate::api::InventoryApi;
use crate::config::ClientConfig;
use crate::error::TransportError;
use crate::session::SessionStore;
use crate::views::{
    DashboardView, ItemsView, LoginOutcome, LoginView, SuppliersView, TransactionsView,
    ViewContext,
};

pub struct App {
    session: Arc<SessionStore>,
    route: Route,
}

impl App {
    pub fn new(api: InventoryApi) -> Self {
        Self {
            session: Arc::new(SessionStore::new(api)),
            route: Route::Dashboard,
        }
    }

    pub fn from_config(config: &ClientConfig) -> Result<Self, TransportError> {
        Ok(Self::new(InventoryApi::from_config(config)?))
    }

    pub fn session(&self) -> &Arc<SessionStore> {
        &self.session
    }

    pub fn current_route(&self) -> Route {
        self.route
    }

    /// Resolve any existing session, then gate the current route.
    pub async fn start(&mut self) -> RouteDecision {
        self.session.initialize().await;
        self.navigate(self.route)
    }

    pub fn navigate(&mut self, route: Route) -> RouteDecision {
        let decision = guard(route, &self.session.snapshot());
        match decision {
            RouteDecision::Render(route) | RouteDecision::Redirect(route) => self.route = route,
            RouteDecision::Pending => {}
        }
        tracing::debug!(path = route.path(), ?decision, "navigate");
        decision
    }

    /// Navigate by path; `None` for an unknown path.
    pub fn navigate_path(&mut self, path: &str) -> Option<RouteDecision> {
        Route::from_path(path).map(|route| self.navigate(route))
    }

    pub fn login_view(&self) -> LoginView {
        LoginView::new(self.session.clone())
    }

    pub async fn login(&mut self, username: &str, password: &str) -> LoginOutcome {
        let outcome = self.login_view().submit(username, password).await;
        if let LoginOutcome::Navigate(route) = outcome {
            self.navigate(route);
        }
        outcome
    }

    pub async fn logout(&mut self) {
        self.session.logout().await;
        self.route = Route::Login;
    }

    fn context(&self) -> ViewContext {
        ViewContext::from_store(&self.session)
    }

    pub fn dashboard(&self) -> DashboardView {
        DashboardView::new(self.context())
    }

    pub fn items(&self) -> ItemsView {
        ItemsView::new(self.context())
    }

    pub fn suppliers(&self) -> SuppliersView {
        SuppliersView::new(self.context())
    }

    pub fn transactions(&self) -> TransactionsView {
        TransactionsView::new(self.context())
    }
}
