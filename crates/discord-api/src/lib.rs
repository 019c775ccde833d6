//! Minimal Discord REST client for bot statistics
//!
//! Two lookups, both authenticated with `Authorization: Bot <token>`:
//! 1. `user::fetch_current_user()` resolves the bot's own identity (`/users/@me`)
//! 2. `guilds::fetch_guild_count()` walks `/users/@me/guilds` page by page and
//!    sums the page sizes
//!
//! Every request goes through an injected `transport::Transport`.

pub mod constants;
pub mod error;
pub mod guilds;
pub mod user;

pub use constants::*;
pub use error::{Error, Result};
pub use guilds::fetch_guild_count;
pub use user::{ClientUser, fetch_current_user};

use common::Secret;
use transport::header::{AUTHORIZATION, CONTENT_TYPE};
use transport::{Request, Response};

/// Build an authenticated GET request for the Discord API.
pub(crate) fn authorized_get(url: String, token: &Secret<String>) -> Request {
    Request::get(url)
        .header(CONTENT_TYPE, "application/json")
        .header(
            AUTHORIZATION,
            format!("{AUTHORIZATION_SCHEME} {}", token.expose()),
        )
}

/// Whether a response carries Discord's unauthorized condition.
///
/// Discord answers a bad token with HTTP 401 and `{"message": "401: Unauthorized"}`;
/// either signal is enough.
pub(crate) fn is_unauthorized(response: &Response) -> bool {
    response.status == 401
        || response.body.get("message").and_then(|m| m.as_str()) == Some(UNAUTHORIZED_MESSAGE)
}
