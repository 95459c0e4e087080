//! Headless view controllers.
//!
//! Each controller owns the screen state of one view: fetched collections,
//! pagination, the open form, and which controls are shown. Mutations always
//! re-fetch afterwards; nothing is patched locally.

mod dashboard;
mod items;
mod login;
mod pagination;
mod suppliers;
mod transactions;

use tokio::sync::watch;

use stockroom_auth::{authorize, Action, Capabilities, SessionState};
use stockroom_core::Entity;

use crate::api::InventoryApi;
use crate::error::ViewError;
use crate::session::SessionStore;

pub use dashboard::DashboardView;
pub use items::ItemsView;
pub use login::{LoginOutcome, LoginView};
pub use pagination::{Pagination, DEFAULT_ROWS_PER_PAGE};
pub use suppliers::SuppliersView;
pub use transactions::TransactionsView;

/// Interactive yes/no prompt shown before destructive actions.
pub trait Confirm {
    fn confirm(&self, message: &str) -> bool;
}

impl<F> Confirm for F
where
    F: Fn(&str) -> bool,
{
    fn confirm(&self, message: &str) -> bool {
        self(message)
    }
}

/// What a controller needs from the outside: the API and a read-only view
/// of the session.
#[derive(Clone)]
pub struct ViewContext {
    api: InventoryApi,
    session: watch::Receiver<SessionState>,
}

impl ViewContext {
    pub fn new(api: InventoryApi, session: watch::Receiver<SessionState>) -> Self {
        Self { api, session }
    }

    pub fn from_store(store: &SessionStore) -> Self {
        Self::new(store.api().clone(), store.subscribe())
    }

    pub fn api(&self) -> &InventoryApi {
        &self.api
    }

    pub fn capabilities(&self) -> Capabilities {
        Capabilities::for_state(&self.session.borrow())
    }

    pub(crate) fn authorize(&self, action: Action) -> Result<(), ViewError> {
        let state = self.session.borrow();
        authorize(&state, action).map_err(|e| {
            tracing::warn!(action = action.as_str(), error = %e, "action refused locally");
            ViewError::from(e)
        })
    }
}

/// Visible affordances of a view.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Control {
    Add,
    Edit,
    Delete,
    Export,
}

impl Control {
    /// The permission the control is gated on.
    pub fn action(&self) -> Action {
        match self {
            Control::Add => Action::Create,
            Control::Edit => Action::Edit,
            Control::Delete => Action::Delete,
            Control::Export => Action::Export,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Controls {
    /// Buttons above the table.
    pub toolbar: Vec<Control>,
    /// Per-row actions.
    pub row: Vec<Control>,
}

impl Controls {
    pub(crate) fn for_capabilities(
        caps: Capabilities,
        row_actions: &[Control],
        export: bool,
    ) -> Self {
        let mut toolbar = Vec::new();
        if caps.allows(Action::Create) {
            toolbar.push(Control::Add);
        }
        if export && caps.allows(Action::Export) {
            toolbar.push(Control::Export);
        }
        let row = row_actions
            .iter()
            .copied()
            .filter(|control| caps.allows(control.action()))
            .collect();
        Self { toolbar, row }
    }

    pub fn contains(&self, control: Control) -> bool {
        self.toolbar.contains(&control) || self.row.contains(&control)
    }

    pub fn has_row_actions(&self) -> bool {
        !self.row.is_empty()
    }
}

/// Create/edit modal state, seeded with defaults or the selected record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormModal<D, I> {
    pub draft: D,
    editing: Option<I>,
}

impl<D, I: Copy> FormModal<D, I> {
    pub fn create(draft: D) -> Self {
        Self {
            draft,
            editing: None,
        }
    }

    pub fn edit(id: I, draft: D) -> Self {
        Self {
            draft,
            editing: Some(id),
        }
    }

    /// The record being edited; `None` for a create form.
    pub fn editing(&self) -> Option<I> {
        self.editing
    }

    pub fn is_edit(&self) -> bool {
        self.editing.is_some()
    }
}

/// A fetched collection plus its pagination.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Collection<T> {
    rows: Vec<T>,
    pub pagination: Pagination,
}

impl<T> Default for Collection<T> {
    fn default() -> Self {
        Self {
            rows: Vec::new(),
            pagination: Pagination::default(),
        }
    }
}

impl<T> Collection<T> {
    pub fn all(&self) -> &[T] {
        &self.rows
    }

    pub fn page_rows(&self) -> &[T] {
        self.pagination.slice(&self.rows)
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub(crate) fn replace(&mut self, rows: Vec<T>) {
        self.rows = rows;
    }
}

impl<T: Entity> Collection<T> {
    /// The fetched row with `id`, on any page.
    pub fn find(&self, id: T::Id) -> Option<&T> {
        self.rows.iter().find(|row| row.id() == id)
    }
}

/// Date column format shared by transaction tables.
pub(crate) fn format_timestamp(ts: Option<chrono::DateTime<chrono::Utc>>) -> String {
    ts.map(|t| t.format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_default()
}
