use stockroom_auth::Action;
use stockroom_core::{DomainError, SupplierId};
use stockroom_inventory::{Supplier, SupplierDraft};

use crate::error::{ApiError, ViewError};
use crate::table::TextTable;

use super::items::action_labels;
use super::{Collection, Confirm, Control, Controls, FormModal, ViewContext};

pub const DELETE_SUPPLIER_PROMPT: &str = "Are you sure you want to delete this supplier?";

pub struct SuppliersView {
    ctx: ViewContext,
    suppliers: Collection<Supplier>,
    form: Option<FormModal<SupplierDraft, SupplierId>>,
    last_error: Option<ApiError>,
}

impl SuppliersView {
    pub fn new(ctx: ViewContext) -> Self {
        Self {
            ctx,
            suppliers: Collection::default(),
            form: None,
            last_error: None,
        }
    }

    pub fn suppliers(&self) -> &Collection<Supplier> {
        &self.suppliers
    }

    pub fn suppliers_mut(&mut self) -> &mut Collection<Supplier> {
        &mut self.suppliers
    }

    pub fn form(&self) -> Option<&FormModal<SupplierDraft, SupplierId>> {
        self.form.as_ref()
    }

    pub fn draft_mut(&mut self) -> Option<&mut SupplierDraft> {
        self.form.as_mut().map(|form| &mut form.draft)
    }

    pub fn last_error(&self) -> Option<&ApiError> {
        self.last_error.as_ref()
    }

    pub async fn mount(&mut self) {
        self.refresh().await;
    }

    pub async fn refresh(&mut self) {
        match self.ctx.api().list_suppliers().await {
            Ok(suppliers) => {
                self.suppliers.replace(suppliers);
                self.last_error = None;
            }
            Err(e) => {
                tracing::error!(error = %e, "Error fetching suppliers");
                self.last_error = Some(e);
            }
        }
    }

    pub fn open_create(&mut self) -> Result<(), ViewError> {
        self.ctx.authorize(Action::Create)?;
        self.form = Some(FormModal::create(SupplierDraft::default()));
        Ok(())
    }

    pub fn open_edit(&mut self, id: SupplierId) -> Result<(), ViewError> {
        self.ctx.authorize(Action::Edit)?;
        let supplier = self
            .suppliers
            .find(id)
            .ok_or_else(DomainError::not_found)?;
        self.form = Some(FormModal::edit(id, SupplierDraft::from(supplier)));
        Ok(())
    }

    pub fn close_form(&mut self) {
        self.form = None;
    }

    pub async fn submit(&mut self) -> Result<Supplier, ViewError> {
        let form = self.form.as_ref().ok_or(ViewError::NoOpenForm)?;
        self.ctx
            .authorize(if form.is_edit() { Action::Edit } else { Action::Create })?;
        form.draft.validate()?;

        let api = self.ctx.api();
        let result = match form.editing() {
            Some(id) => api.update_supplier(id, &form.draft).await,
            None => api.create_supplier(&form.draft).await,
        };
        let saved = result.map_err(|e| {
            tracing::error!(error = %e, "Error saving supplier");
            e
        })?;

        self.close_form();
        self.refresh().await;
        Ok(saved)
    }

    pub async fn delete(
        &mut self,
        id: SupplierId,
        confirm: &impl Confirm,
    ) -> Result<bool, ViewError> {
        self.ctx.authorize(Action::Delete)?;
        if !confirm.confirm(DELETE_SUPPLIER_PROMPT) {
            return Ok(false);
        }
        self.ctx.api().delete_supplier(id).await.map_err(|e| {
            tracing::error!(error = %e, "Error deleting supplier");
            e
        })?;
        self.refresh().await;
        Ok(true)
    }

    pub fn controls(&self) -> Controls {
        Controls::for_capabilities(
            self.ctx.capabilities(),
            &[Control::Edit, Control::Delete],
            false,
        )
    }

    pub fn table(&self) -> TextTable {
        let controls = self.controls();
        let mut headers = vec!["ID", "Name", "Contact Person", "Email", "Phone", "Address"];
        if controls.has_row_actions() {
            headers.push("Actions");
        }
        let mut table = TextTable::new(headers);
        for supplier in self.suppliers.page_rows() {
            let mut row = vec![
                supplier.id.to_string(),
                supplier.name.clone(),
                supplier.contact_person.clone(),
                supplier.email.clone(),
                supplier.phone.clone(),
                supplier.address.clone(),
            ];
            if controls.has_row_actions() {
                row.push(action_labels(&controls.row));
            }
            table.push_row(row);
        }
        table
    }
}
