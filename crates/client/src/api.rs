//! Typed backend API over the [`HttpClient`] adapter.
//!
//! One method per backend endpoint; no state beyond the adapter itself.

use std::fmt;
use std::sync::Arc;

use chrono::Utc;
use serde::Serialize;

use stockroom_auth::Identity;
use stockroom_core::{ItemId, SupplierId};
use stockroom_inventory::{
    DashboardStats, InventoryItem, ItemDraft, StockTransaction, Supplier, SupplierDraft,
    TransactionDraft, TransactionType,
};

use crate::config::ClientConfig;
use crate::error::{ApiError, TransportError};
use crate::export::CsvExport;
use crate::http::{ApiRequest, HttpClient, ReqwestTransport, Transport};

const LOGIN_PATH: &str = "/auth/login/";
const LOGOUT_PATH: &str = "/auth/logout/";
const USER_PATH: &str = "/auth/user/";
const SUPPLIERS_PATH: &str = "/suppliers/";
const ITEMS_PATH: &str = "/items/";
const DASHBOARD_STATS_PATH: &str = "/items/dashboard_stats/";
const EXPORT_CSV_PATH: &str = "/items/export_csv/";
const TRANSACTIONS_PATH: &str = "/transactions/";

fn supplier_path(id: SupplierId) -> String {
    format!("{SUPPLIERS_PATH}{id}/")
}

fn item_path(id: ItemId) -> String {
    format!("{ITEMS_PATH}{id}/")
}

/// Login form body.
#[derive(Clone, Serialize)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }

    pub fn is_blank(&self) -> bool {
        self.username.trim().is_empty() || self.password.is_empty()
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

fn push_opt<T: ToString>(pairs: &mut Vec<(String, String)>, key: &str, value: Option<T>) {
    if let Some(value) = value {
        pairs.push((key.to_string(), value.to_string()));
    }
}

/// Optional filters for `GET /items/`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ItemQuery {
    pub search: Option<String>,
    pub supplier: Option<SupplierId>,
    pub ordering: Option<String>,
    pub page: Option<u32>,
    pub page_size: Option<u32>,
}

impl ItemQuery {
    pub fn to_pairs(&self) -> Vec<(String, String)> {
        let mut pairs = Vec::new();
        push_opt(&mut pairs, "search", self.search.as_deref());
        push_opt(&mut pairs, "supplier", self.supplier);
        push_opt(&mut pairs, "ordering", self.ordering.as_deref());
        push_opt(&mut pairs, "page", self.page);
        push_opt(&mut pairs, "page_size", self.page_size);
        pairs
    }
}

/// Optional filters for `GET /transactions/`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TransactionQuery {
    pub item: Option<ItemId>,
    pub transaction_type: Option<TransactionType>,
    pub ordering: Option<String>,
    pub page: Option<u32>,
    pub page_size: Option<u32>,
}

impl TransactionQuery {
    pub fn to_pairs(&self) -> Vec<(String, String)> {
        let mut pairs = Vec::new();
        push_opt(&mut pairs, "item", self.item);
        push_opt(&mut pairs, "transaction_type", self.transaction_type);
        push_opt(&mut pairs, "ordering", self.ordering.as_deref());
        push_opt(&mut pairs, "page", self.page);
        push_opt(&mut pairs, "page_size", self.page_size);
        pairs
    }
}

#[derive(Clone)]
pub struct InventoryApi {
    http: HttpClient,
}

impl InventoryApi {
    pub fn new(http: HttpClient) -> Self {
        Self { http }
    }

    pub fn with_transport(transport: Arc<dyn Transport>) -> Self {
        Self::new(HttpClient::new(transport))
    }

    /// Production API over `reqwest`.
    pub fn from_config(config: &ClientConfig) -> Result<Self, TransportError> {
        let transport = ReqwestTransport::new(config)?;
        Ok(Self::with_transport(Arc::new(transport)))
    }

    pub fn http(&self) -> &HttpClient {
        &self.http
    }

    // --- auth ---

    pub async fn csrf_token(&self) -> Result<String, ApiError> {
        self.http.fetch_csrf_token().await
    }

    /// Submit credentials.
    ///
    /// Returns the identity from the response body, or `None` when the body
    /// did not carry one.
    pub async fn login(&self, credentials: &Credentials) -> Result<Option<Identity>, ApiError> {
        let response = self
            .http
            .execute(ApiRequest::post(LOGIN_PATH).with_json(credentials)?)
            .await?;
        Ok(response.decode::<Identity>().ok())
    }

    pub async fn logout(&self) -> Result<(), ApiError> {
        self.http.post_empty(LOGOUT_PATH).await.map(|_| ())
    }

    pub async fn current_user(&self) -> Result<Identity, ApiError> {
        self.http.get_json(USER_PATH, Vec::new()).await
    }

    // --- suppliers ---

    pub async fn list_suppliers(&self) -> Result<Vec<Supplier>, ApiError> {
        self.http.get_list(SUPPLIERS_PATH, Vec::new()).await
    }

    pub async fn create_supplier(&self, draft: &SupplierDraft) -> Result<Supplier, ApiError> {
        self.http.post_json(SUPPLIERS_PATH, draft).await
    }

    pub async fn update_supplier(
        &self,
        id: SupplierId,
        draft: &SupplierDraft,
    ) -> Result<Supplier, ApiError> {
        self.http.put_json(&supplier_path(id), draft).await
    }

    pub async fn delete_supplier(&self, id: SupplierId) -> Result<(), ApiError> {
        self.http.delete(&supplier_path(id)).await
    }

    // --- items ---

    pub async fn list_items(&self, query: &ItemQuery) -> Result<Vec<InventoryItem>, ApiError> {
        self.http.get_list(ITEMS_PATH, query.to_pairs()).await
    }

    pub async fn create_item(&self, draft: &ItemDraft) -> Result<InventoryItem, ApiError> {
        self.http.post_json(ITEMS_PATH, draft).await
    }

    pub async fn update_item(
        &self,
        id: ItemId,
        draft: &ItemDraft,
    ) -> Result<InventoryItem, ApiError> {
        self.http.put_json(&item_path(id), draft).await
    }

    pub async fn delete_item(&self, id: ItemId) -> Result<(), ApiError> {
        self.http.delete(&item_path(id)).await
    }

    pub async fn dashboard_stats(&self) -> Result<DashboardStats, ApiError> {
        self.http.get_json(DASHBOARD_STATS_PATH, Vec::new()).await
    }

    pub async fn export_csv(&self) -> Result<CsvExport, ApiError> {
        let response = self.http.get_raw(EXPORT_CSV_PATH).await?;
        Ok(CsvExport::from_response(&response, Utc::now()))
    }

    // --- transactions ---

    pub async fn list_transactions(
        &self,
        query: &TransactionQuery,
    ) -> Result<Vec<StockTransaction>, ApiError> {
        self.http.get_list(TRANSACTIONS_PATH, query.to_pairs()).await
    }

    pub async fn create_transaction(
        &self,
        draft: &TransactionDraft,
    ) -> Result<StockTransaction, ApiError> {
        self.http.post_json(TRANSACTIONS_PATH, draft).await
    }
}
