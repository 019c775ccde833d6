//! Discord REST constants
//!
//! The base URL is only a default: callers pass their own so tests and
//! self-hosted gateways can point elsewhere.

/// Default Discord REST base (API v9).
pub const DEFAULT_BASE_URL: &str = "https://discord.com/api/v9";

/// Path of the "authenticated self" lookup.
pub const CURRENT_USER_PATH: &str = "/users/@me";

/// Path of the guild listing for the authenticated user.
pub const CURRENT_USER_GUILDS_PATH: &str = "/users/@me/guilds";

/// Maximum number of guilds Discord returns per page. A page of exactly this
/// size means another page may follow.
pub const GUILD_PAGE_LIMIT: usize = 200;

/// Scheme prefix for bot tokens in the `Authorization` header.
pub const AUTHORIZATION_SCHEME: &str = "Bot";

/// `message` field Discord returns when the token is rejected.
pub const UNAUTHORIZED_MESSAGE: &str = "401: Unauthorized";
