//! `stockroom-auth`: pure authentication/authorization boundary.
//!
//! This crate is intentionally decoupled from HTTP: it models who is signed
//! in, what they may do, and which views they may reach. The client crate's
//! session store drives the state machine defined here.

pub mod authorize;
pub mod identity;
pub mod routes;
pub mod session;

pub use authorize::{authorize, Action, AuthzError, Capabilities};
pub use identity::Identity;
pub use routes::{guard, Route, RouteDecision};
pub use session::SessionState;
