//! HTTP Client Adapter: the single choke point for backend calls.
//!
//! Every request flows through [`HttpClient::execute`], which:
//! - fetches a fresh anti-forgery token before each mutating request and
//!   attaches it as `X-CSRFToken` (reads never fetch one);
//! - logs any failure and returns it unchanged (no retry, no swallowing).
//!
//! The wire is abstracted behind [`Transport`] so the adapter can be driven
//! by `reqwest` in production and by an in-memory backend in tests.

mod listing;
mod transport;

#[cfg(test)]
pub(crate) mod stub;

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::{Method, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::Instrument;
use uuid::Uuid;

use crate::error::{ApiError, TransportError};

pub use listing::normalize_list;
pub use transport::ReqwestTransport;

/// Header carrying the anti-forgery token on mutating requests.
pub const CSRF_HEADER: &str = "X-CSRFToken";

/// Endpoint issuing anti-forgery tokens.
pub const CSRF_PATH: &str = "/auth/csrf/";

/// An outbound request, relative to the configured API base.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiRequest {
    pub method: Method,
    pub path: String,
    pub query: Vec<(String, String)>,
    pub headers: Vec<(String, String)>,
    pub body: Option<serde_json::Value>,
}

impl ApiRequest {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: Vec::new(),
            headers: Vec::new(),
            body: None,
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::POST, path)
    }

    pub fn put(path: impl Into<String>) -> Self {
        Self::new(Method::PUT, path)
    }

    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::DELETE, path)
    }

    pub fn with_query(mut self, query: Vec<(String, String)>) -> Self {
        self.query = query;
        self
    }

    pub fn with_json<B: Serialize>(mut self, body: &B) -> Result<Self, ApiError> {
        self.body = Some(serde_json::to_value(body)?);
        Ok(self)
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Whether the request changes server state (anything but GET/HEAD/OPTIONS).
    pub fn is_mutation(&self) -> bool {
        !matches!(self.method, Method::GET | Method::HEAD | Method::OPTIONS)
    }
}

/// A received response (any status).
#[derive(Debug, Clone, PartialEq)]
pub struct ApiResponse {
    pub status: StatusCode,
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
}

impl ApiResponse {
    pub fn new(status: StatusCode, body: Vec<u8>) -> Self {
        Self {
            status,
            headers: Vec::new(),
            body,
        }
    }

    pub fn json<T: Serialize>(status: StatusCode, value: &T) -> Self {
        let body = serde_json::to_vec(value).unwrap_or_default();
        Self::new(status, body).with_header("content-type", "application/json")
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }

    pub fn decode<T: DeserializeOwned>(&self) -> Result<T, ApiError> {
        Ok(serde_json::from_slice(&self.body)?)
    }
}

/// Wire seam for the adapter.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Send `request` and return whatever response the server produced.
    ///
    /// Non-2xx statuses are *not* errors at this layer.
    async fn send(&self, request: &ApiRequest) -> Result<ApiResponse, TransportError>;
}

#[derive(Debug, Deserialize)]
struct CsrfTokenResponse {
    #[serde(rename = "csrfToken")]
    csrf_token: String,
}

/// The adapter. Cheap to clone; clones share the transport (and its cookies).
#[derive(Clone)]
pub struct HttpClient {
    transport: Arc<dyn Transport>,
}

impl HttpClient {
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self { transport }
    }

    /// Send a request through the adapter.
    ///
    /// Returns `Err` for transport failures and non-2xx responses, after
    /// logging them.
    pub async fn execute(&self, mut request: ApiRequest) -> Result<ApiResponse, ApiError> {
        let request_id = Uuid::now_v7();
        let span = tracing::info_span!(
            "api_request",
            %request_id,
            method = %request.method,
            path = %request.path
        );

        async move {
            if request.is_mutation() {
                match self.fetch_csrf_token().await {
                    Ok(token) => request.headers.push((CSRF_HEADER.to_string(), token)),
                    Err(e) => {
                        tracing::error!(error = %e, "Error fetching CSRF token; sending without it");
                    }
                }
            }

            let response = match self.transport.send(&request).await {
                Ok(response) => response,
                Err(e) => {
                    tracing::error!(error = %e, "API Error");
                    return Err(ApiError::Transport(e));
                }
            };

            if !response.is_success() {
                let err = ApiError::from_status(response.status, &response.body);
                tracing::error!(status = response.status.as_u16(), error = %err, "API Error");
                return Err(err);
            }

            tracing::debug!(status = response.status.as_u16(), "request completed");
            Ok(response)
        }
        .instrument(span)
        .await
    }

    /// Fetch a fresh anti-forgery token. Never cached.
    pub async fn fetch_csrf_token(&self) -> Result<String, ApiError> {
        let response = self.transport.send(&ApiRequest::get(CSRF_PATH)).await?;
        if !response.is_success() {
            return Err(ApiError::from_status(response.status, &response.body));
        }
        let token: CsrfTokenResponse = response.decode()?;
        Ok(token.csrf_token)
    }

    pub async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: Vec<(String, String)>,
    ) -> Result<T, ApiError> {
        let response = self.execute(ApiRequest::get(path).with_query(query)).await?;
        decode_logged(&response, path)
    }

    /// GET a collection, accepting either a bare array or `{results: [...]}`.
    pub async fn get_list<T: DeserializeOwned>(
        &self,
        path: &str,
        query: Vec<(String, String)>,
    ) -> Result<Vec<T>, ApiError> {
        let response = self.execute(ApiRequest::get(path).with_query(query)).await?;
        normalize_list(&response.body).map_err(|e| {
            tracing::error!(path, error = %e, "failed to decode list response");
            e
        })
    }

    /// GET a raw payload (e.g. a CSV download).
    pub async fn get_raw(&self, path: &str) -> Result<ApiResponse, ApiError> {
        self.execute(ApiRequest::get(path)).await
    }

    pub async fn post_json<B, T>(&self, path: &str, body: &B) -> Result<T, ApiError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let response = self.execute(ApiRequest::post(path).with_json(&body)?).await?;
        decode_logged(&response, path)
    }

    pub async fn put_json<B, T>(&self, path: &str, body: &B) -> Result<T, ApiError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let response = self.execute(ApiRequest::put(path).with_json(&body)?).await?;
        decode_logged(&response, path)
    }

    /// POST without a body, ignoring the response payload.
    pub async fn post_empty(&self, path: &str) -> Result<ApiResponse, ApiError> {
        self.execute(ApiRequest::post(path)).await
    }

    pub async fn delete(&self, path: &str) -> Result<(), ApiError> {
        self.execute(ApiRequest::delete(path)).await.map(|_| ())
    }
}

fn decode_logged<T: DeserializeOwned>(response: &ApiResponse, path: &str) -> Result<T, ApiError> {
    response.decode().map_err(|e| {
        tracing::error!(path, error = %e, "failed to decode response");
        e
    })
}
