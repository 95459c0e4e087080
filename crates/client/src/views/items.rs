use stockroom_auth::Action;
use stockroom_core::{DomainError, ItemId};
use stockroom_inventory::{InventoryItem, ItemDraft, Supplier};

use crate::api::ItemQuery;
use crate::error::{ApiError, ViewError};
use crate::export::CsvExport;
use crate::table::TextTable;

use super::{Collection, Confirm, Control, Controls, FormModal, ViewContext};

pub const DELETE_ITEM_PROMPT: &str = "Are you sure you want to delete this item?";

/// Inventory list: items plus the supplier list used by the item form.
pub struct ItemsView {
    ctx: ViewContext,
    items: Collection<InventoryItem>,
    suppliers: Vec<Supplier>,
    query: ItemQuery,
    form: Option<FormModal<ItemDraft, ItemId>>,
    last_error: Option<ApiError>,
}

impl ItemsView {
    pub fn new(ctx: ViewContext) -> Self {
        Self {
            ctx,
            items: Collection::default(),
            suppliers: Vec::new(),
            query: ItemQuery::default(),
            form: None,
            last_error: None,
        }
    }

    pub fn with_query(mut self, query: ItemQuery) -> Self {
        self.query = query;
        self
    }

    pub fn items(&self) -> &Collection<InventoryItem> {
        &self.items
    }

    pub fn items_mut(&mut self) -> &mut Collection<InventoryItem> {
        &mut self.items
    }

    pub fn suppliers(&self) -> &[Supplier] {
        &self.suppliers
    }

    pub fn form(&self) -> Option<&FormModal<ItemDraft, ItemId>> {
        self.form.as_ref()
    }

    /// Mutable access to the open form's draft.
    pub fn draft_mut(&mut self) -> Option<&mut ItemDraft> {
        self.form.as_mut().map(|form| &mut form.draft)
    }

    /// Most recent fetch failure, cleared by the next successful fetch.
    pub fn last_error(&self) -> Option<&ApiError> {
        self.last_error.as_ref()
    }

    /// Fetch items and suppliers concurrently.
    pub async fn mount(&mut self) {
        let api = self.ctx.api().clone();
        let (items, suppliers) = tokio::join!(api.list_items(&self.query), api.list_suppliers());
        self.apply_items(items);
        match suppliers {
            Ok(suppliers) => self.suppliers = suppliers,
            Err(e) => {
                tracing::error!(error = %e, "Error fetching suppliers");
                self.last_error = Some(e);
            }
        }
    }

    pub async fn refresh(&mut self) {
        let result = self.ctx.api().list_items(&self.query).await;
        self.apply_items(result);
    }

    fn apply_items(&mut self, result: Result<Vec<InventoryItem>, ApiError>) {
        match result {
            Ok(items) => {
                self.items.replace(items);
                self.last_error = None;
            }
            Err(e) => {
                tracing::error!(error = %e, "Error fetching items");
                self.last_error = Some(e);
            }
        }
    }

    pub fn open_create(&mut self) -> Result<(), ViewError> {
        self.ctx.authorize(Action::Create)?;
        self.form = Some(FormModal::create(ItemDraft::default()));
        Ok(())
    }

    pub fn open_edit(&mut self, id: ItemId) -> Result<(), ViewError> {
        self.ctx.authorize(Action::Edit)?;
        let item = self
            .items
            .find(id)
            .ok_or_else(DomainError::not_found)?;
        self.form = Some(FormModal::edit(id, ItemDraft::from(item)));
        Ok(())
    }

    pub fn close_form(&mut self) {
        self.form = None;
    }

    /// Submit the open form.
    ///
    /// On success the form closes and the list is re-fetched. On failure the
    /// form stays open with the operator's input.
    pub async fn submit(&mut self) -> Result<InventoryItem, ViewError> {
        let form = self.form.as_ref().ok_or(ViewError::NoOpenForm)?;
        let action = if form.is_edit() { Action::Edit } else { Action::Create };
        self.ctx.authorize(action)?;
        form.draft.validate()?;

        let api = self.ctx.api();
        let result = match form.editing() {
            Some(id) => api.update_item(id, &form.draft).await,
            None => api.create_item(&form.draft).await,
        };
        let saved = result.map_err(|e| {
            tracing::error!(error = %e, "Error saving item");
            e
        })?;

        self.close_form();
        self.refresh().await;
        Ok(saved)
    }

    /// Delete after confirmation. Returns `false` when the prompt was declined.
    pub async fn delete(&mut self, id: ItemId, confirm: &impl Confirm) -> Result<bool, ViewError> {
        self.ctx.authorize(Action::Delete)?;
        if !confirm.confirm(DELETE_ITEM_PROMPT) {
            return Ok(false);
        }
        self.ctx.api().delete_item(id).await.map_err(|e| {
            tracing::error!(error = %e, "Error deleting item");
            e
        })?;
        self.refresh().await;
        Ok(true)
    }

    pub async fn export_csv(&self) -> Result<CsvExport, ViewError> {
        self.ctx.authorize(Action::Export)?;
        self.ctx.api().export_csv().await.map_err(|e| {
            tracing::error!(error = %e, "Error exporting CSV");
            ViewError::from(e)
        })
    }

    pub fn controls(&self) -> Controls {
        Controls::for_capabilities(
            self.ctx.capabilities(),
            &[Control::Edit, Control::Delete],
            true,
        )
    }

    fn supplier_label(&self, item: &InventoryItem) -> String {
        if let Some(name) = &item.supplier_name {
            return name.clone();
        }
        item.supplier
            .and_then(|id| self.suppliers.iter().find(|s| s.id == id))
            .map(|s| s.name.clone())
            .unwrap_or_default()
    }

    /// Current page as a table. The `Actions` column exists only for staff.
    pub fn table(&self) -> TextTable {
        let controls = self.controls();
        let mut headers = vec!["ID", "Name", "SKU", "Quantity", "Price", "Supplier", "Status"];
        if controls.has_row_actions() {
            headers.push("Actions");
        }
        let mut table = TextTable::new(headers);
        for item in self.items.page_rows() {
            let mut row = vec![
                item.id.to_string(),
                item.name.clone(),
                item.sku.clone(),
                item.quantity.to_string(),
                format!("${:.2}", item.price),
                self.supplier_label(item),
                item.stock_status().label().to_string(),
            ];
            if controls.has_row_actions() {
                row.push(action_labels(&controls.row));
            }
            table.push_row(row);
        }
        table
    }
}

pub(crate) fn action_labels(controls: &[Control]) -> String {
    controls
        .iter()
        .map(|control| match control {
            Control::Add => "add",
            Control::Edit => "edit",
            Control::Delete => "delete",
            Control::Export => "export",
        })
        .collect::<Vec<_>>()
        .join(" ")
}
