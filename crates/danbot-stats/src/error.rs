//! Error values for the stats SDK
//!
//! Every failure is one `Error` carrying a kind, a human message and, when an
//! HTTP response was involved, its status code. `Display` renders
//! `[CODE] message (status N)`.

use std::fmt;

/// Discriminated failure kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// The supplied runtime client has not finished its own startup
    ClientNotReady,
    /// Malformed user count policy
    InvalidUserCount,
    /// Discord rejected the bot token
    InvalidDiscordToken,
    /// Discord lookup failed for any other reason
    DiscordRequest,
    InternalServerError,
    BadRequest,
    RateLimit,
    Unknown,
    /// The stats request never produced a response (blocked at the edge)
    CloudflareRestricted,
}

impl ErrorKind {
    /// Stable machine-readable code.
    pub fn code(self) -> &'static str {
        match self {
            ErrorKind::ClientNotReady => "CLIENT_NOT_READY",
            ErrorKind::InvalidUserCount => "INVALID_USER_COUNT",
            ErrorKind::InvalidDiscordToken => "INVALID_DISCORD_TOKEN",
            ErrorKind::DiscordRequest => "DISCORD_REQUEST_FAILED",
            ErrorKind::InternalServerError => "INTERNAL_SERVER_ERROR",
            ErrorKind::BadRequest => "BAD_REQUEST",
            ErrorKind::RateLimit => "RATE_LIMIT",
            ErrorKind::Unknown => "UNKNOWN",
            ErrorKind::CloudflareRestricted => "CLOUDFLARE_RESTRICTED",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("[{}] {}{}", .kind, .message, status_suffix(.status))]
pub struct Error {
    kind: ErrorKind,
    message: String,
    status: Option<u16>,
}

fn status_suffix(status: &Option<u16>) -> String {
    status.map(|s| format!(" (status {s})")).unwrap_or_default()
}

impl Error {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            status: None,
        }
    }

    pub fn with_status(mut self, status: u16) -> Self {
        self.status = Some(status);
        self
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn status(&self) -> Option<u16> {
        self.status
    }

    pub(crate) fn client_not_ready() -> Self {
        Self::new(
            ErrorKind::ClientNotReady,
            "The client is not ready. Please run this code in a ready event",
        )
    }

    pub(crate) fn runtime_dropped() -> Self {
        Self::new(
            ErrorKind::ClientNotReady,
            "The runtime was dropped before the client could be normalized",
        )
    }

    pub(crate) fn invalid_user_count(detail: impl fmt::Display) -> Self {
        Self::new(
            ErrorKind::InvalidUserCount,
            format!("The user count provided was invalid: {detail}"),
        )
    }
}

impl From<discord_api::Error> for Error {
    fn from(err: discord_api::Error) -> Self {
        let status = err.status();
        let mapped = match &err {
            discord_api::Error::Unauthorized(endpoint) => Error::new(
                ErrorKind::InvalidDiscordToken,
                format!("The Discord token provided was rejected by {endpoint}"),
            ),
            other => Error::new(ErrorKind::DiscordRequest, other.to_string()),
        };
        match status {
            Some(status) => mapped.with_status(status),
            None => mapped,
        }
    }
}

/// Result alias for SDK operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_includes_code_message_and_status() {
        let err = Error::new(ErrorKind::InternalServerError, "server exploded").with_status(502);
        assert_eq!(
            err.to_string(),
            "[INTERNAL_SERVER_ERROR] server exploded (status 502)"
        );
    }

    #[test]
    fn display_without_status_has_no_suffix() {
        let err = Error::new(ErrorKind::BadRequest, "missing servers");
        assert_eq!(err.to_string(), "[BAD_REQUEST] missing servers");
    }

    #[test]
    fn carries_all_three_fields() {
        let err = Error::new(ErrorKind::Unknown, "teapot").with_status(418);
        assert_eq!(err.kind(), ErrorKind::Unknown);
        assert_eq!(err.message(), "teapot");
        assert_eq!(err.status(), Some(418));
    }

    #[test]
    fn constructors_use_expected_kinds() {
        assert_eq!(Error::client_not_ready().kind(), ErrorKind::ClientNotReady);
        assert!(
            Error::client_not_ready()
                .to_string()
                .starts_with("[CLIENT_NOT_READY]")
        );
        let invalid = Error::invalid_user_count("\"SOME\"");
        assert_eq!(invalid.kind(), ErrorKind::InvalidUserCount);
        assert!(invalid.message().contains("\"SOME\""));
    }

    #[test]
    fn unauthorized_discord_error_maps_to_invalid_token() {
        let err: Error = discord_api::Error::Unauthorized("/users/@me".into()).into();
        assert_eq!(err.kind(), ErrorKind::InvalidDiscordToken);
        assert_eq!(err.status(), Some(401));
    }

    #[test]
    fn other_discord_errors_map_to_discord_request() {
        let err: Error = discord_api::Error::UnexpectedStatus {
            endpoint: "/users/@me/guilds".into(),
            status: 503,
            body: "null".into(),
        }
        .into();
        assert_eq!(err.kind(), ErrorKind::DiscordRequest);
        assert_eq!(err.status(), Some(503));

        let err: Error = discord_api::Error::Http(transport::TransportError::Timeout).into();
        assert_eq!(err.kind(), ErrorKind::DiscordRequest);
        assert_eq!(err.status(), None);
    }

    #[test]
    fn every_kind_has_a_distinct_code() {
        let kinds = [
            ErrorKind::ClientNotReady,
            ErrorKind::InvalidUserCount,
            ErrorKind::InvalidDiscordToken,
            ErrorKind::DiscordRequest,
            ErrorKind::InternalServerError,
            ErrorKind::BadRequest,
            ErrorKind::RateLimit,
            ErrorKind::Unknown,
            ErrorKind::CloudflareRestricted,
        ];
        let codes: std::collections::HashSet<&str> = kinds.iter().map(|k| k.code()).collect();
        assert_eq!(codes.len(), kinds.len());
    }
}
