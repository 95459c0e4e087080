use std::collections::HashSet;
use std::sync::{Arc, Mutex};

use axum::body::Bytes;
use axum::extract::State;
use axum::http::{header, HeaderMap, Method, StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use axum::{Json, Router};
use serde_json::{json, Value};

use stockroom_auth::{Route, RouteDecision, SessionState};
use stockroom_client::views::LoginOutcome;
use stockroom_client::{
    ApiError, App, ClientConfig, Credentials, ErrorKind, InventoryApi, ItemQuery, SessionStore,
};
use stockroom_core::{ItemId, SupplierId};
use stockroom_inventory::{ItemDraft, TransactionType};

const SESSION_COOKIE: &str = "sessionid";

#[derive(Default)]
struct Backend {
    log: Vec<String>,
    tokens: HashSet<String>,
    sessions: HashSet<String>,
    next_token: u32,
    quantity: i64,
    extra_items: Vec<Value>,
    authorization: Vec<String>,
}

type Shared = Arc<Mutex<Backend>>;

struct TestServer {
    api_url: String,
    state: Shared,
    handle: tokio::task::JoinHandle<()>,
}

impl TestServer {
    async fn spawn() -> Self {
        let state: Shared = Arc::new(Mutex::new(Backend {
            quantity: 100,
            ..Backend::default()
        }));
        let app = Router::new().fallback(handle).with_state(state.clone());
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("failed to bind ephemeral port");
        let addr = listener.local_addr().unwrap();

        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            api_url: format!("http://{addr}/api"),
            state,
            handle,
        }
    }

    fn config(&self) -> ClientConfig {
        ClientConfig::new(&self.api_url).unwrap()
    }

    fn store(&self) -> SessionStore {
        SessionStore::new(InventoryApi::from_config(&self.config()).unwrap())
    }

    fn log(&self) -> Vec<String> {
        self.state.lock().unwrap().log.clone()
    }

    fn clear_log(&self) {
        self.state.lock().unwrap().log.clear();
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

fn session_of(headers: &HeaderMap) -> Option<String> {
    let cookies = headers.get(header::COOKIE)?.to_str().ok()?;
    cookies
        .split(';')
        .map(str::trim)
        .find_map(|c| c.strip_prefix(&format!("{SESSION_COOKIE}=")).map(str::to_string))
}

fn item(id: i64, name: &str, quantity: i64) -> Value {
    json!({
        "id": id,
        "name": name,
        "sku": format!("SKU-{id}"),
        "quantity": quantity,
        "price": "2.00",
        "supplier": 1,
        "threshold": 10
    })
}

async fn handle(
    State(state): State<Shared>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let mut backend = state.lock().unwrap();
    let path = uri.path().strip_prefix("/api").unwrap_or(uri.path()).to_string();
    backend.log.push(format!("{method} {path}"));
    if let Some(auth) = headers.get(header::AUTHORIZATION).and_then(|v| v.to_str().ok()) {
        backend.authorization.push(auth.to_string());
    }

    if method == Method::GET && path == "/auth/csrf/" {
        backend.next_token += 1;
        let token = format!("tok-{}", backend.next_token);
        backend.tokens.insert(token.clone());
        return Json(json!({ "csrfToken": token })).into_response();
    }

    if method != Method::GET {
        let token = headers.get("x-csrftoken").and_then(|v| v.to_str().ok());
        // Tokens are single use.
        if !token.is_some_and(|t| backend.tokens.remove(t)) {
            return (StatusCode::FORBIDDEN, Json(json!({ "detail": "CSRF Failed" }))).into_response();
        }
    }

    let body: Value = serde_json::from_slice(&body).unwrap_or(Value::Null);

    if method == Method::POST && path == "/auth/login/" {
        if !body["username"].is_string() || !body["password"].is_string() {
            return (
                StatusCode::BAD_REQUEST,
                Json(json!({ "error": "Please provide both username and password" })),
            )
                .into_response();
        }
        if body["username"] == "validuser" && body["password"] == "validpass" {
            let sid = format!("s{}", backend.sessions.len() + 1);
            backend.sessions.insert(sid.clone());
            return (
                [(header::SET_COOKIE, format!("{SESSION_COOKIE}={sid}; Path=/; HttpOnly"))],
                Json(json!({ "user_id": 1, "username": "validuser", "is_staff": true })),
            )
                .into_response();
        }
        return (StatusCode::UNAUTHORIZED, Json(json!({ "error": "Invalid credentials" })))
            .into_response();
    }

    let session = session_of(&headers).filter(|sid| backend.sessions.contains(sid));
    if method == Method::POST && path == "/auth/logout/" {
        if let Some(sid) = session {
            backend.sessions.remove(&sid);
        }
        return Json(json!({ "message": "Logged out" })).into_response();
    }
    if session.is_none() {
        return (StatusCode::FORBIDDEN, Json(json!({ "detail": "not authenticated" })))
            .into_response();
    }

    match (method.as_str(), path.as_str()) {
        ("GET", "/auth/user/") => {
            Json(json!({ "id": 1, "username": "validuser", "is_staff": true })).into_response()
        }
        ("GET", "/items/") => {
            let mut items = vec![item(1, "Widget", backend.quantity)];
            items.extend(backend.extra_items.iter().cloned());
            Json(Value::Array(items)).into_response()
        }
        ("POST", "/items/") => {
            let mut created = body.clone();
            created["id"] = json!(10 + backend.extra_items.len() as i64);
            backend.extra_items.push(created.clone());
            (StatusCode::CREATED, Json(created)).into_response()
        }
        ("GET", "/transactions/") => Json(json!({
            "count": 0,
            "next": null,
            "previous": null,
            "results": []
        }))
        .into_response(),
        ("POST", "/transactions/") => {
            let quantity = body["quantity"].as_i64().unwrap_or_default();
            if body["transaction_type"] == "OUT" {
                backend.quantity -= quantity;
            } else {
                backend.quantity += quantity;
            }
            (
                StatusCode::CREATED,
                Json(json!({
                    "id": 7,
                    "item": body["item"],
                    "item_name": "Widget",
                    "transaction_type": body["transaction_type"],
                    "quantity": quantity,
                    "notes": body["notes"],
                    "transaction_date": "2024-05-03T08:30:00Z"
                })),
            )
                .into_response()
        }
        ("GET", "/items/export_csv/") => (
            [
                (header::CONTENT_TYPE, "text/csv"),
                (header::CONTENT_DISPOSITION, "attachment; filename=\"inventory.csv\""),
            ],
            "ID,Name\n1,Widget\n",
        )
            .into_response(),
        _ => StatusCode::NOT_FOUND.into_response(),
    }
}

#[tokio::test]
async fn anonymous_start_redirects_to_login() {
    let srv = TestServer::spawn().await;
    let mut app = App::from_config(&srv.config()).unwrap();

    assert_eq!(app.start().await, RouteDecision::Redirect(Route::Login));
    assert_eq!(srv.log(), vec!["GET /auth/user/"]);
}

#[tokio::test]
async fn login_establishes_cookie_session() {
    let srv = TestServer::spawn().await;
    let mut app = App::from_config(&srv.config()).unwrap();
    app.start().await;

    assert_eq!(app.login("validuser", "validpass").await, LoginOutcome::Navigate(Route::Dashboard));
    assert_eq!(app.navigate(Route::Inventory), RouteDecision::Render(Route::Inventory));

    // The session cookie rides along on the probe.
    let state = app.session().initialize().await;
    assert!(state.is_staff());
}

#[tokio::test]
async fn bad_login_fails_generically() {
    let srv = TestServer::spawn().await;
    let store = srv.store();
    store.initialize().await;

    let err = store.login("baduser", "badpass").await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::AuthenticationFailure);
    assert_eq!(store.snapshot(), SessionState::Anonymous);

    let err = store
        .api()
        .login(&Credentials::new("baduser", "badpass"))
        .await
        .unwrap_err();
    assert_eq!(err, ApiError::Unauthorized);
}

#[tokio::test]
async fn each_mutation_carries_a_fresh_token() {
    let srv = TestServer::spawn().await;
    let store = srv.store();
    store.login("validuser", "validpass").await.unwrap();
    srv.clear_log();

    let api = store.api();
    let draft = ItemDraft {
        name: "Nut".into(),
        sku: "N-1".into(),
        supplier: Some(SupplierId::new(1)),
        ..ItemDraft::default()
    };
    api.create_item(&draft).await.unwrap();
    api.create_item(&ItemDraft { sku: "N-2".into(), ..draft }).await.unwrap();
    let items = api.list_items(&ItemQuery::default()).await.unwrap();

    assert_eq!(items.len(), 3);
    assert_eq!(
        srv.log(),
        vec![
            "GET /auth/csrf/",
            "POST /items/",
            "GET /auth/csrf/",
            "POST /items/",
            "GET /items/",
        ]
    );
}

#[tokio::test]
async fn stock_out_is_reflected_after_refetch() {
    let srv = TestServer::spawn().await;
    let mut app = App::from_config(&srv.config()).unwrap();
    app.login("validuser", "validpass").await;

    let mut view = app.transactions();
    view.mount().await;
    assert_eq!(view.items()[0].quantity, 100);
    assert!(view.transactions().is_empty());

    view.open_create().unwrap();
    let draft = view.draft_mut().unwrap();
    draft.item = Some(ItemId::new(1));
    draft.quantity = 5;
    draft.transaction_type = TransactionType::Out;
    srv.clear_log();
    view.submit().await.unwrap();

    assert_eq!(view.items()[0].quantity, 95);
    let log = srv.log();
    assert_eq!(&log[..2], &["GET /auth/csrf/", "POST /transactions/"]);
    assert!(log.contains(&"GET /items/".to_string()));
    assert!(log.contains(&"GET /transactions/".to_string()));
}

#[tokio::test]
async fn export_uses_server_file_name() {
    let srv = TestServer::spawn().await;
    let mut app = App::from_config(&srv.config()).unwrap();
    app.login("validuser", "validpass").await;

    let export = app.items().export_csv().await.unwrap();
    assert_eq!(export.filename, "inventory.csv");
    assert_eq!(export.content_type.as_deref(), Some("text/csv"));
    assert_eq!(export.bytes, b"ID,Name\n1,Widget\n");
}

#[tokio::test]
async fn logout_ends_server_session() {
    let srv = TestServer::spawn().await;
    let mut app = App::from_config(&srv.config()).unwrap();
    app.login("validuser", "validpass").await;

    app.logout().await;
    assert_eq!(app.current_route(), Route::Login);
    assert_eq!(app.session().initialize().await, SessionState::Anonymous);
}

#[tokio::test]
async fn configured_bearer_token_is_sent() {
    let srv = TestServer::spawn().await;
    let config = srv.config().with_bearer_token("service-token");
    let store = SessionStore::new(InventoryApi::from_config(&config).unwrap());
    store.initialize().await;

    let seen = srv.state.lock().unwrap().authorization.clone();
    assert_eq!(seen, vec!["Bearer service-token"]);
}
