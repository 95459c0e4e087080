//! Stockroom client: the backend adapter, session store and headless view
//! controllers for the inventory dashboard.
//!
//! ```text
//! App ─┬─ SessionStore ── watch::Sender<SessionState>
//!      └─ views::* ── ViewContext { InventoryApi, watch::Receiver }
//!                          └─ HttpClient ── dyn Transport (reqwest)
//! ```

pub mod api;
pub mod app;
pub mod config;
pub mod error;
pub mod export;
pub mod http;
pub mod session;
pub mod table;
pub mod views;

pub use api::{Credentials, InventoryApi, ItemQuery, TransactionQuery};
pub use app::App;
pub use config::{ClientConfig, ConfigError};
pub use error::{ApiError, ErrorKind, SessionError, TransportError, ViewError};
pub use export::CsvExport;
pub use http::{ApiRequest, ApiResponse, HttpClient, ReqwestTransport, Transport};
pub use session::SessionStore;
pub use table::TextTable;
