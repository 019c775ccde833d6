//! HTTP transport abstraction
//!
//! The SDK never talks to reqwest directly. Every remote call goes through a
//! `Transport`, which lets the embedding application inject its own client and
//! lets tests script responses. `ReqwestTransport` is the production
//! implementation.
//!
//! Requests and responses are deliberately small: a method, a URL, a header
//! list and an optional JSON body in; a status code and a JSON body out.

pub mod reqwest_transport;
#[cfg(any(test, feature = "test-util"))]
pub mod scripted;

pub use reqwest::Method;
pub use reqwest::header;
pub use reqwest_transport::ReqwestTransport;
#[cfg(any(test, feature = "test-util"))]
pub use scripted::ScriptedTransport;

use reqwest::header::HeaderName;
use std::fmt;
use std::future::Future;
use std::pin::Pin;

/// An outgoing request.
#[derive(Clone)]
pub struct Request {
    pub method: Method,
    pub url: String,
    pub headers: Vec<(HeaderName, String)>,
    pub body: Option<serde_json::Value>,
}

impl Request {
    pub fn get(url: impl Into<String>) -> Self {
        Self {
            method: Method::GET,
            url: url.into(),
            headers: Vec::new(),
            body: None,
        }
    }

    /// POST with a JSON body and `Content-Type: application/json`.
    pub fn post_json(url: impl Into<String>, body: serde_json::Value) -> Self {
        Self {
            method: Method::POST,
            url: url.into(),
            headers: Vec::new(),
            body: Some(body),
        }
        .header(reqwest::header::CONTENT_TYPE, "application/json")
    }

    /// Append a header. Invalid values surface as a transport error on send.
    pub fn header(mut self, name: HeaderName, value: impl Into<String>) -> Self {
        self.headers.push((name, value.into()));
        self
    }

    /// First value of the named header, if present.
    pub fn header_value(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(n, _)| n.as_str().eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

impl fmt::Debug for Request {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Credential-bearing headers and bodies never reach logs
        let headers: Vec<(&str, &str)> = self
            .headers
            .iter()
            .map(|(name, value)| {
                if *name == header::AUTHORIZATION {
                    (name.as_str(), "[REDACTED]")
                } else {
                    (name.as_str(), value.as_str())
                }
            })
            .collect();
        f.debug_struct("Request")
            .field("method", &self.method)
            .field("url", &self.url)
            .field("headers", &headers)
            .field("body", &self.body.as_ref().map(|_| "[JSON]"))
            .finish()
    }
}

/// A received response. Bodies that are not JSON are kept as a JSON string;
/// empty bodies are `Value::Null`.
#[derive(Debug, Clone, PartialEq)]
pub struct Response {
    pub status: u16,
    pub body: serde_json::Value,
}

impl Response {
    pub fn new(status: u16, body: serde_json::Value) -> Self {
        Self { status, body }
    }
}

/// Failures below the HTTP layer: the request never produced a status code.
#[derive(Debug, Clone, thiserror::Error)]
pub enum TransportError {
    #[error("request could not be built: {0}")]
    Build(String),

    #[error("connection failed: {0}")]
    Connect(String),

    #[error("request timed out")]
    Timeout,

    #[error("failed to read response body: {0}")]
    Body(String),
}

/// Result alias for transport operations.
pub type Result<T> = std::result::Result<T, TransportError>;

/// Fetch-like HTTP client injected into the SDK.
///
/// Uses `Pin<Box<dyn Future>>` so it stays dyn-compatible (`Arc<dyn Transport>`).
pub trait Transport: Send + Sync {
    fn send(&self, request: Request) -> Pin<Box<dyn Future<Output = Result<Response>> + Send + '_>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn post_json_sets_content_type() {
        let req = Request::post_json("http://x/bot/1/stats", serde_json::json!({"servers": 1}));
        assert_eq!(req.method, Method::POST);
        assert_eq!(req.header_value("content-type"), Some("application/json"));
        assert_eq!(req.body.unwrap()["servers"], 1);
    }

    #[test]
    fn header_lookup_is_case_insensitive() {
        let req = Request::get("http://x/users/@me")
            .header(reqwest::header::AUTHORIZATION, "Bot abc");
        assert_eq!(req.header_value("Authorization"), Some("Bot abc"));
        assert!(req.header_value("x-missing").is_none());
        assert!(req.body.is_none());
    }

    #[test]
    fn debug_redacts_authorization() {
        let req = Request::get("http://x/users/@me")
            .header(reqwest::header::AUTHORIZATION, "Bot very-secret-token");
        let debug = format!("{req:?}");
        assert!(!debug.contains("very-secret-token"), "got: {debug}");
        assert!(debug.contains("[REDACTED]"));
    }

    #[test]
    fn debug_hides_body() {
        let req = Request::post_json("http://x/bot/1/stats", serde_json::json!({"key": "api-key"}));
        let debug = format!("{req:?}");
        assert!(!debug.contains("api-key"), "got: {debug}");
        assert!(debug.contains("[JSON]"));
    }

    #[test]
    fn transport_error_messages() {
        assert_eq!(TransportError::Timeout.to_string(), "request timed out");
        assert!(
            TransportError::Connect("refused".into())
                .to_string()
                .contains("refused")
        );
    }
}
