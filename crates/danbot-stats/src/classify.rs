//! Stats endpoint response classification
//!
//! Maps the status code and body of a `POST /bot/{id}/stats` response to either
//! the body (success) or a typed `Error`. 400 and 429 are only failures when
//! the body carries an error payload; without one they resolve with the body.

use serde_json::Value;
use tracing::warn;

use crate::error::{Error, ErrorKind, Result};

/// Classify a stats endpoint response.
pub fn classify_stats_response(status: u16, body: Value) -> Result<Value> {
    match status {
        200 => Ok(body),
        s if s >= 500 => Err(Error::new(
            ErrorKind::InternalServerError,
            "An internal DanBot Hosting server error occurred",
        )
        .with_status(s)),
        400 | 429 => match error_message(&body) {
            Some(message) => {
                let kind = if status == 400 {
                    ErrorKind::BadRequest
                } else {
                    ErrorKind::RateLimit
                };
                Err(Error::new(kind, message).with_status(status))
            }
            None => {
                warn!(status, "stats endpoint error status without an error payload, treating as non-fatal");
                Ok(body)
            }
        },
        s => Err(Error::new(ErrorKind::Unknown, "An unknown error occurred").with_status(s)),
    }
}

/// Message from an error payload, if the body carries one.
///
/// An `error` or `message` field counts as present unless it is `null` or
/// `false`. The message prefers `message`, then a string `error`.
fn error_message(body: &Value) -> Option<String> {
    let present = |field: &str| {
        body.get(field)
            .is_some_and(|v| !v.is_null() && *v != Value::Bool(false))
    };
    if !present("error") && !present("message") {
        return None;
    }
    let message = body
        .get("message")
        .and_then(Value::as_str)
        .or_else(|| body.get("error").and_then(Value::as_str))
        .unwrap_or("The stats endpoint rejected the request");
    Some(message.to_owned())
}
