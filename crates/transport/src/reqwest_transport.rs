//! Production transport backed by `reqwest`.

use crate::{Request, Response, Result, Transport, TransportError};
use std::future::Future;
use std::pin::Pin;
use std::time::Duration;
use tracing::debug;

/// Default per-request timeout.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// `Transport` over a shared `reqwest::Client`.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: reqwest::Client,
    timeout: Duration,
}

impl ReqwestTransport {
    pub fn new(client: reqwest::Client) -> Self {
        Self {
            client,
            timeout: DEFAULT_TIMEOUT,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    async fn execute(&self, request: Request) -> Result<Response> {
        let mut builder = self
            .client
            .request(request.method.clone(), &request.url)
            .timeout(self.timeout);
        for (name, value) in &request.headers {
            builder = builder.header(name.clone(), value.as_str());
        }
        if let Some(body) = &request.body {
            let bytes = serde_json::to_vec(body)
                .map_err(|e| TransportError::Build(format!("serializing body: {e}")))?;
            builder = builder.body(bytes);
        }

        let response = builder.send().await.map_err(map_send_error)?;
        let status = response.status().as_u16();
        let bytes = response
            .bytes()
            .await
            .map_err(|e| TransportError::Body(e.to_string()))?;

        debug!(method = %request.method, url = %request.url, status, "response received");
        Ok(Response::new(status, decode_body(&bytes)))
    }
}

impl Default for ReqwestTransport {
    fn default() -> Self {
        Self::new(reqwest::Client::new())
    }
}

impl Transport for ReqwestTransport {
    fn send(&self, request: Request) -> Pin<Box<dyn Future<Output = Result<Response>> + Send + '_>> {
        Box::pin(self.execute(request))
    }
}

fn map_send_error(e: reqwest::Error) -> TransportError {
    if e.is_timeout() {
        TransportError::Timeout
    } else if e.is_builder() {
        TransportError::Build(e.to_string())
    } else {
        TransportError::Connect(e.to_string())
    }
}

/// Empty → `Null`, JSON → parsed, anything else → the text as a JSON string.
fn decode_body(bytes: &[u8]) -> serde_json::Value {
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return serde_json::Value::Null;
    }
    serde_json::from_slice(bytes)
        .unwrap_or_else(|_| serde_json::Value::String(String::from_utf8_lossy(bytes).into_owned()))
}
