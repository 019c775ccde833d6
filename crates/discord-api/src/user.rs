//! "Authenticated self" lookup
//!
//! Resolves the identity behind a bot token. The stats payload only needs the
//! id, username and avatar hash, so everything else Discord returns is dropped.

use common::Secret;
use serde::{Deserialize, Serialize};
use tracing::debug;
use transport::Transport;

use crate::constants::CURRENT_USER_PATH;
use crate::error::{Error, Result};
use crate::{authorized_get, is_unauthorized};

/// Display identity of a bot account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientUser {
    pub id: String,
    pub username: String,
    /// Avatar hash; `None` for accounts using the default avatar
    #[serde(default)]
    pub avatar: Option<String>,
}

/// Fetch the identity of the account owning `token`.
///
/// Returns `Error::Unauthorized` when Discord rejects the token.
pub async fn fetch_current_user(
    transport: &dyn Transport,
    base_url: &str,
    token: &Secret<String>,
) -> Result<ClientUser> {
    let url = format!("{}{CURRENT_USER_PATH}", base_url.trim_end_matches('/'));
    let response = transport.send(authorized_get(url, token)).await?;

    if is_unauthorized(&response) {
        return Err(Error::Unauthorized(CURRENT_USER_PATH.into()));
    }
    if response.status != 200 {
        return Err(Error::UnexpectedStatus {
            endpoint: CURRENT_USER_PATH.into(),
            status: response.status,
            body: response.body.to_string(),
        });
    }

    let user: ClientUser =
        serde_json::from_value(response.body).map_err(|e| Error::InvalidResponse {
            endpoint: CURRENT_USER_PATH.into(),
            reason: e.to_string(),
        })?;
    debug!(user_id = %user.id, username = %user.username, "resolved current user");
    Ok(user)
}
