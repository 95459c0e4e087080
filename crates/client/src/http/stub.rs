//! In-memory transports for unit tests.

use std::collections::{BTreeMap, HashSet};
use std::sync::Mutex;

use async_trait::async_trait;
use reqwest::{Method, StatusCode};
use serde_json::{json, Value};

use crate::error::TransportError;

use super::{ApiRequest, ApiResponse, Transport, CSRF_HEADER, CSRF_PATH};

type Handler = dyn Fn(&ApiRequest) -> Result<ApiResponse, TransportError> + Send + Sync;

/// Records every request and answers with a closure.
pub(crate) struct StubTransport {
    handler: Box<Handler>,
    calls: Mutex<Vec<ApiRequest>>,
}

impl StubTransport {
    pub(crate) fn new<F>(handler: F) -> Self
    where
        F: Fn(&ApiRequest) -> Result<ApiResponse, TransportError> + Send + Sync + 'static,
    {
        Self {
            handler: Box::new(handler),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub(crate) fn calls(&self) -> Vec<ApiRequest> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl Transport for StubTransport {
    async fn send(&self, request: &ApiRequest) -> Result<ApiResponse, TransportError> {
        self.calls.lock().unwrap().push(request.clone());
        (self.handler)(request)
    }
}

struct Account {
    id: i64,
    username: &'static str,
    password: &'static str,
    is_staff: bool,
}

static ACCOUNTS: [Account; 2] = [
    Account {
        id: 1,
        username: "validuser",
        password: "validpass",
        is_staff: true,
    },
    Account {
        id: 2,
        username: "clerk",
        password: "clerkpass",
        is_staff: false,
    },
];

#[derive(Default)]
struct BackendState {
    session: Option<usize>,
    issued_tokens: HashSet<String>,
    token_counter: u64,
    suppliers: BTreeMap<i64, Value>,
    items: BTreeMap<i64, Value>,
    transactions: BTreeMap<i64, Value>,
    next_id: i64,
    wrap_lists: bool,
    offline: bool,
    failures: Vec<(Method, String, StatusCode)>,
    calls: Vec<ApiRequest>,
}

/// A small stateful stand-in for the inventory backend.
///
/// Mirrors the parts of the real server the client relies on: session login,
/// CSRF tokens checked on every mutation, staff-only item and supplier
/// writes, and transactions applied to item quantities server-side.
pub(crate) struct FakeBackend {
    state: Mutex<BackendState>,
}

impl FakeBackend {
    pub(crate) fn new() -> Self {
        Self {
            state: Mutex::new(BackendState {
                next_id: 100,
                ..BackendState::default()
            }),
        }
    }

    /// One supplier, a low-stock `Widget` (id 3) and a well-stocked `Bolt` (id 4).
    pub(crate) fn seeded() -> Self {
        let backend = Self::new();
        {
            let mut state = backend.state.lock().unwrap();
            state.suppliers.insert(
                1,
                json!({
                    "id": 1,
                    "name": "Acme",
                    "contact_person": "Ann",
                    "email": "ann@acme.test",
                    "phone": "555-0100",
                    "address": "1 Main St"
                }),
            );
            state.items.insert(3, item_record(3, "Widget", "W-001", 4, "12.50", 1, 10));
            state.items.insert(4, item_record(4, "Bolt", "B-001", 100, "0.25", 1, 10));
            state.transactions.insert(
                1,
                json!({
                    "id": 1,
                    "item": 4,
                    "item_name": "Bolt",
                    "transaction_type": "IN",
                    "quantity": 100,
                    "notes": "initial stock",
                    "transaction_date": "2024-05-01T09:00:00Z",
                    "username": "validuser"
                }),
            );
        }
        backend
    }

    /// Start with an existing server-side session for `username`.
    pub(crate) fn signed_in(self, username: &str) -> Self {
        {
            let mut state = self.state.lock().unwrap();
            state.session = ACCOUNTS.iter().position(|a| a.username == username);
        }
        self
    }

    /// Answer list endpoints with the paginated `{count, results}` envelope.
    pub(crate) fn wrapping_lists(self) -> Self {
        self.state.lock().unwrap().wrap_lists = true;
        self
    }

    pub(crate) fn set_offline(&self, offline: bool) {
        self.state.lock().unwrap().offline = offline;
    }

    /// Make every `method path` request answer `status` until cleared.
    pub(crate) fn fail(&self, method: Method, path: &str, status: StatusCode) {
        self.state
            .lock()
            .unwrap()
            .failures
            .push((method, path.to_string(), status));
    }

    pub(crate) fn clear_failures(&self) {
        self.state.lock().unwrap().failures.clear();
    }

    pub(crate) fn calls(&self) -> Vec<ApiRequest> {
        self.state.lock().unwrap().calls.clone()
    }

    /// `METHOD path` lines for every recorded call.
    pub(crate) fn call_log(&self) -> Vec<String> {
        self.calls()
            .iter()
            .map(|c| format!("{} {}", c.method, c.path))
            .collect()
    }

    pub(crate) fn clear_calls(&self) {
        self.state.lock().unwrap().calls.clear();
    }

    pub(crate) fn csrf_fetches(&self) -> usize {
        self.calls().iter().filter(|c| c.path == CSRF_PATH).count()
    }

    pub(crate) fn item_quantity(&self, id: i64) -> Option<i64> {
        self.state
            .lock()
            .unwrap()
            .items
            .get(&id)
            .and_then(|item| item["quantity"].as_i64())
    }

    pub(crate) fn has_session(&self) -> bool {
        self.state.lock().unwrap().session.is_some()
    }
}

#[async_trait]
impl Transport for FakeBackend {
    async fn send(&self, request: &ApiRequest) -> Result<ApiResponse, TransportError> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(request.clone());
        if state.offline {
            return Err(TransportError::Connect("backend offline".into()));
        }
        if let Some((_, _, status)) = state
            .failures
            .iter()
            .find(|(m, p, _)| *m == request.method && *p == request.path)
        {
            return Ok(ApiResponse::json(*status, &json!({ "detail": "injected failure" })));
        }
        Ok(state.route(request))
    }
}

fn item_record(
    id: i64,
    name: &str,
    sku: &str,
    quantity: i64,
    price: &str,
    supplier: i64,
    threshold: i64,
) -> Value {
    json!({
        "id": id,
        "name": name,
        "sku": sku,
        "description": "",
        "quantity": quantity,
        "price": price,
        "supplier": supplier,
        "supplier_name": "Acme",
        "threshold": threshold,
        "is_low_stock": quantity <= threshold
    })
}

fn detail(status: StatusCode, message: &str) -> ApiResponse {
    ApiResponse::json(status, &json!({ "detail": message }))
}

fn trailing_id(path: &str, prefix: &str) -> Option<i64> {
    path.strip_prefix(prefix)?
        .strip_suffix('/')?
        .parse()
        .ok()
}

impl BackendState {
    fn route(&mut self, req: &ApiRequest) -> ApiResponse {
        let path = req.path.as_str();

        if req.method == Method::GET && path == CSRF_PATH {
            self.token_counter += 1;
            let token = format!("csrf-{}", self.token_counter);
            self.issued_tokens.insert(token.clone());
            return ApiResponse::json(StatusCode::OK, &json!({ "csrfToken": token }));
        }

        if req.is_mutation() {
            let valid = req
                .header(CSRF_HEADER)
                .is_some_and(|token| self.issued_tokens.contains(token));
            if !valid {
                return detail(StatusCode::FORBIDDEN, "CSRF Failed: CSRF token missing.");
            }
        }

        if path == "/auth/login/" && req.method == Method::POST {
            return self.login(req);
        }
        if path == "/auth/logout/" && req.method == Method::POST {
            self.session = None;
            return ApiResponse::json(StatusCode::OK, &json!({ "message": "Logged out" }));
        }

        let Some(account) = self.session.map(|idx| &ACCOUNTS[idx]) else {
            return detail(
                StatusCode::UNAUTHORIZED,
                "Authentication credentials were not provided.",
            );
        };
        let is_staff = account.is_staff;
        let username = account.username;

        if path == "/auth/user/" {
            return ApiResponse::json(
                StatusCode::OK,
                &json!({ "user_id": account.id, "username": username, "is_staff": is_staff }),
            );
        }

        let staff_write = req.is_mutation()
            && (path.starts_with("/items/") || path.starts_with("/suppliers/"));
        if staff_write && !is_staff {
            return detail(
                StatusCode::FORBIDDEN,
                "You do not have permission to perform this action.",
            );
        }

        let get = req.method == Method::GET;
        let post = req.method == Method::POST;
        if get && path == "/items/dashboard_stats/" {
            return self.dashboard_stats();
        }
        if get && path == "/items/export_csv/" {
            return self.export_csv();
        }
        if get && path == "/items/" {
            let search = query_value(req, "search").map(str::to_lowercase);
            let rows = self
                .items
                .values()
                .filter(|item| match &search {
                    Some(term) => {
                        let name = item["name"].as_str().unwrap_or_default().to_lowercase();
                        let sku = item["sku"].as_str().unwrap_or_default().to_lowercase();
                        name.contains(term) || sku.contains(term)
                    }
                    None => true,
                })
                .cloned()
                .collect();
            return self.list(rows);
        }
        if post && path == "/items/" {
            let id = self.allocate_id();
            let record = self.item_from_body(id, req.body.as_ref());
            self.items.insert(id, record.clone());
            return ApiResponse::json(StatusCode::CREATED, &record);
        }
        if get && path == "/suppliers/" {
            return self.list(self.suppliers.values().cloned().collect());
        }
        if post && path == "/suppliers/" {
            let id = self.allocate_id();
            let mut record = req.body.clone().unwrap_or_else(|| json!({}));
            record["id"] = json!(id);
            self.suppliers.insert(id, record.clone());
            return ApiResponse::json(StatusCode::CREATED, &record);
        }
        if get && path == "/transactions/" {
            let item = query_value(req, "item").and_then(|v| v.parse::<i64>().ok());
            let rows = self
                .transactions
                .values()
                .rev()
                .filter(|tx| item.is_none_or(|id| tx["item"].as_i64() == Some(id)))
                .cloned()
                .collect();
            return self.list(rows);
        }
        if post && path == "/transactions/" {
            return self.create_transaction(req, username);
        }
        if let Some(id) = trailing_id(path, "/items/") {
            return self.item_by_id(&req.method, id, req.body.as_ref());
        }
        if let Some(id) = trailing_id(path, "/suppliers/") {
            return self.supplier_by_id(&req.method, id, req.body.as_ref());
        }
        detail(StatusCode::NOT_FOUND, "Not found.")
    }

    fn login(&mut self, req: &ApiRequest) -> ApiResponse {
        let body = req.body.clone().unwrap_or_default();
        let username = body["username"].as_str();
        let password = body["password"].as_str();
        let (Some(username), Some(password)) = (username, password) else {
            return ApiResponse::json(
                StatusCode::BAD_REQUEST,
                &json!({ "error": "Please provide both username and password" }),
            );
        };
        match ACCOUNTS
            .iter()
            .position(|a| a.username == username && a.password == password)
        {
            Some(idx) => {
                self.session = Some(idx);
                let account = &ACCOUNTS[idx];
                ApiResponse::json(
                    StatusCode::OK,
                    &json!({
                        "user_id": account.id,
                        "username": account.username,
                        "is_staff": account.is_staff
                    }),
                )
            }
            None => ApiResponse::json(
                StatusCode::UNAUTHORIZED,
                &json!({ "error": "Invalid credentials" }),
            ),
        }
    }

    fn allocate_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }

    fn list(&self, rows: Vec<Value>) -> ApiResponse {
        if self.wrap_lists {
            ApiResponse::json(
                StatusCode::OK,
                &json!({ "count": rows.len(), "next": null, "previous": null, "results": rows }),
            )
        } else {
            ApiResponse::json(StatusCode::OK, &rows)
        }
    }

    fn item_from_body(&self, id: i64, body: Option<&Value>) -> Value {
        let body = body.cloned().unwrap_or_default();
        let quantity = body["quantity"].as_i64().unwrap_or_default();
        let threshold = body["threshold"].as_i64().unwrap_or(10);
        let supplier = body["supplier"].as_i64().unwrap_or_default();
        let mut record = body.clone();
        record["id"] = json!(id);
        record["supplier_name"] = self
            .suppliers
            .get(&supplier)
            .map(|s| s["name"].clone())
            .unwrap_or(Value::Null);
        record["is_low_stock"] = json!(quantity <= threshold);
        record
    }

    fn item_by_id(&mut self, method: &Method, id: i64, body: Option<&Value>) -> ApiResponse {
        if !self.items.contains_key(&id) {
            return detail(StatusCode::NOT_FOUND, "Not found.");
        }
        if *method == Method::GET {
            ApiResponse::json(StatusCode::OK, &self.items[&id])
        } else if *method == Method::PUT {
            let record = self.item_from_body(id, body);
            self.items.insert(id, record.clone());
            ApiResponse::json(StatusCode::OK, &record)
        } else if *method == Method::DELETE {
            self.items.remove(&id);
            ApiResponse::new(StatusCode::NO_CONTENT, Vec::new())
        } else {
            detail(StatusCode::METHOD_NOT_ALLOWED, "Method not allowed.")
        }
    }

    fn supplier_by_id(&mut self, method: &Method, id: i64, body: Option<&Value>) -> ApiResponse {
        if !self.suppliers.contains_key(&id) {
            return detail(StatusCode::NOT_FOUND, "Not found.");
        }
        if *method == Method::GET {
            ApiResponse::json(StatusCode::OK, &self.suppliers[&id])
        } else if *method == Method::PUT {
            let mut record = body.cloned().unwrap_or_else(|| json!({}));
            record["id"] = json!(id);
            self.suppliers.insert(id, record.clone());
            ApiResponse::json(StatusCode::OK, &record)
        } else if *method == Method::DELETE {
            self.suppliers.remove(&id);
            ApiResponse::new(StatusCode::NO_CONTENT, Vec::new())
        } else {
            detail(StatusCode::METHOD_NOT_ALLOWED, "Method not allowed.")
        }
    }

    fn create_transaction(&mut self, req: &ApiRequest, username: &str) -> ApiResponse {
        let body = req.body.clone().unwrap_or_default();
        let Some(item_id) = body["item"].as_i64() else {
            return ApiResponse::json(StatusCode::BAD_REQUEST, &json!({ "item": ["required"] }));
        };
        let quantity = body["quantity"].as_i64().unwrap_or_default();
        let kind = body["transaction_type"].as_str().unwrap_or("IN").to_string();

        let Some(item) = self.items.get_mut(&item_id) else {
            return ApiResponse::json(StatusCode::BAD_REQUEST, &json!({ "item": ["invalid"] }));
        };
        let on_hand = item["quantity"].as_i64().unwrap_or_default();
        let updated = if kind == "OUT" { on_hand - quantity } else { on_hand + quantity };
        if updated < 0 {
            return ApiResponse::json(
                StatusCode::BAD_REQUEST,
                &json!({ "quantity": ["Insufficient stock"] }),
            );
        }
        let threshold = item["threshold"].as_i64().unwrap_or(10);
        item["quantity"] = json!(updated);
        item["is_low_stock"] = json!(updated <= threshold);
        let item_name = item["name"].clone();

        let id = self.allocate_id();
        let record = json!({
            "id": id,
            "item": item_id,
            "item_name": item_name,
            "transaction_type": kind,
            "quantity": quantity,
            "notes": body["notes"].as_str().unwrap_or_default(),
            "transaction_date": "2024-05-03T08:30:00Z",
            "username": username
        });
        self.transactions.insert(id, record.clone());
        ApiResponse::json(StatusCode::CREATED, &record)
    }

    fn dashboard_stats(&self) -> ApiResponse {
        let low = self
            .items
            .values()
            .filter(|i| i["is_low_stock"].as_bool().unwrap_or(false))
            .count();
        let total: f64 = self
            .items
            .values()
            .map(|i| {
                let price: f64 = i["price"].as_str().and_then(|p| p.parse().ok()).unwrap_or(0.0);
                price * i["quantity"].as_f64().unwrap_or(0.0)
            })
            .sum();
        let recent: Vec<Value> = self.transactions.values().rev().take(5).cloned().collect();
        ApiResponse::json(
            StatusCode::OK,
            &json!({
                "total_items": self.items.len(),
                "low_stock_items": low,
                "total_stock_value": total,
                "recent_transactions": recent
            }),
        )
    }

    fn export_csv(&self) -> ApiResponse {
        let mut csv = String::from("ID,Name,SKU,Quantity,Price,Threshold\n");
        for item in self.items.values() {
            csv.push_str(&format!(
                "{},{},{},{},{},{}\n",
                item["id"],
                item["name"].as_str().unwrap_or_default(),
                item["sku"].as_str().unwrap_or_default(),
                item["quantity"],
                item["price"].as_str().unwrap_or_default(),
                item["threshold"]
            ));
        }
        ApiResponse::new(StatusCode::OK, csv.into_bytes())
            .with_header("content-type", "text/csv")
            .with_header(
                "content-disposition",
                "attachment; filename=\"inventory_export.csv\"",
            )
    }
}

fn query_value<'a>(req: &'a ApiRequest, key: &str) -> Option<&'a str> {
    req.query
        .iter()
        .find(|(k, _)| k == key)
        .map(|(_, v)| v.as_str())
}
