use stockroom_auth::Action;
use stockroom_inventory::{InventoryItem, StockTransaction, TransactionDraft};

use crate::api::{ItemQuery, TransactionQuery};
use crate::error::{ApiError, ViewError};
use crate::table::TextTable;

use super::{format_timestamp, Collection, Controls, FormModal, ViewContext};

/// Transaction history plus the item list feeding the form's item picker.
///
/// Transactions are append-only: no edit or delete.
pub struct TransactionsView {
    ctx: ViewContext,
    transactions: Collection<StockTransaction>,
    items: Vec<InventoryItem>,
    query: TransactionQuery,
    form: Option<FormModal<TransactionDraft, ()>>,
    last_error: Option<ApiError>,
}

impl TransactionsView {
    pub fn new(ctx: ViewContext) -> Self {
        Self {
            ctx,
            transactions: Collection::default(),
            items: Vec::new(),
            query: TransactionQuery::default(),
            form: None,
            last_error: None,
        }
    }

    pub fn with_query(mut self, query: TransactionQuery) -> Self {
        self.query = query;
        self
    }

    pub fn transactions(&self) -> &Collection<StockTransaction> {
        &self.transactions
    }

    pub fn transactions_mut(&mut self) -> &mut Collection<StockTransaction> {
        &mut self.transactions
    }

    pub fn items(&self) -> &[InventoryItem] {
        &self.items
    }

    pub fn form(&self) -> Option<&FormModal<TransactionDraft, ()>> {
        self.form.as_ref()
    }

    pub fn draft_mut(&mut self) -> Option<&mut TransactionDraft> {
        self.form.as_mut().map(|form| &mut form.draft)
    }

    pub fn last_error(&self) -> Option<&ApiError> {
        self.last_error.as_ref()
    }

    /// Fetch transactions and items concurrently.
    pub async fn mount(&mut self) {
        let api = self.ctx.api().clone();
        let all_items = ItemQuery::default();
        let (transactions, items) = tokio::join!(
            api.list_transactions(&self.query),
            api.list_items(&all_items)
        );
        self.last_error = None;
        match transactions {
            Ok(rows) => self.transactions.replace(rows),
            Err(e) => {
                tracing::error!(error = %e, "Error fetching transactions");
                self.last_error = Some(e);
            }
        }
        match items {
            Ok(items) => self.items = items,
            Err(e) => {
                tracing::error!(error = %e, "Error fetching items");
                self.last_error = Some(e);
            }
        }
    }

    pub fn open_create(&mut self) -> Result<(), ViewError> {
        self.ctx.authorize(Action::Create)?;
        self.form = Some(FormModal::create(TransactionDraft::default()));
        Ok(())
    }

    pub fn close_form(&mut self) {
        self.form = None;
    }

    /// Record the movement, then re-fetch both transactions and items.
    ///
    /// The backend applies the quantity change; the refreshed item list is
    /// the only source of the new stock level.
    pub async fn submit(&mut self) -> Result<StockTransaction, ViewError> {
        let form = self.form.as_ref().ok_or(ViewError::NoOpenForm)?;
        self.ctx.authorize(Action::Create)?;
        form.draft.validate()?;

        let created = self
            .ctx
            .api()
            .create_transaction(&form.draft)
            .await
            .map_err(|e| {
                tracing::error!(error = %e, "Error creating transaction");
                e
            })?;

        self.close_form();
        self.mount().await;
        Ok(created)
    }

    pub fn controls(&self) -> Controls {
        Controls::for_capabilities(self.ctx.capabilities(), &[], false)
    }

    fn item_label(&self, tx: &StockTransaction) -> String {
        if let Some(name) = &tx.item_name {
            return name.clone();
        }
        self.items
            .iter()
            .find(|item| item.id == tx.item)
            .map(|item| item.name.clone())
            .unwrap_or_else(|| tx.item.to_string())
    }

    pub fn table(&self) -> TextTable {
        let mut table = TextTable::new(["Date", "Item", "Type", "Quantity", "Notes", "User"]);
        for tx in self.transactions.page_rows() {
            table.push_row(vec![
                format_timestamp(tx.created_at),
                self.item_label(tx),
                tx.transaction_type.label().to_string(),
                tx.quantity.to_string(),
                tx.notes.clone(),
                tx.username.clone().unwrap_or_default(),
            ]);
        }
        table
    }
}
