//! Paginated guild count
//!
//! `/users/@me/guilds` returns at most `GUILD_PAGE_LIMIT` entries per page.
//! A full page means more may follow, so the next request passes the last
//! guild id as the `after` cursor. The loop stops at the first short page
//! (including an empty one). Pages are fetched one at a time.

use common::Secret;
use tracing::{debug, info};
use transport::Transport;

use crate::constants::{CURRENT_USER_GUILDS_PATH, GUILD_PAGE_LIMIT};
use crate::error::{Error, Result};
use crate::{authorized_get, is_unauthorized};

/// Count every guild the token's account belongs to.
///
/// Returns `Error::Unauthorized` if any page reports the unauthorized condition.
pub async fn fetch_guild_count(
    transport: &dyn Transport,
    base_url: &str,
    token: &Secret<String>,
) -> Result<u64> {
    let base = base_url.trim_end_matches('/');
    let mut total: u64 = 0;
    let mut after: Option<String> = None;
    let mut pages = 0u32;

    loop {
        let url = page_url(base, after.as_deref());
        let response = transport.send(authorized_get(url, token)).await?;
        pages += 1;

        if is_unauthorized(&response) {
            return Err(Error::Unauthorized(CURRENT_USER_GUILDS_PATH.into()));
        }
        if response.status != 200 {
            return Err(Error::UnexpectedStatus {
                endpoint: CURRENT_USER_GUILDS_PATH.into(),
                status: response.status,
                body: response.body.to_string(),
            });
        }

        let page = response
            .body
            .as_array()
            .ok_or_else(|| Error::InvalidResponse {
                endpoint: CURRENT_USER_GUILDS_PATH.into(),
                reason: format!("expected an array page, got {}", response.body),
            })?;

        total += page.len() as u64;
        debug!(page = pages, page_len = page.len(), total, "guild page fetched");

        if page.len() < GUILD_PAGE_LIMIT {
            break;
        }

        // A cursor-less full page would restart from the beginning forever
        let last_id = page
            .last()
            .and_then(|guild| guild.get("id"))
            .and_then(|id| id.as_str())
            .ok_or_else(|| Error::InvalidResponse {
                endpoint: CURRENT_USER_GUILDS_PATH.into(),
                reason: "full page without a guild id to continue from".into(),
            })?;
        after = Some(last_id.to_owned());
    }

    info!(guilds = total, pages, "guild count fetched");
    Ok(total)
}

fn page_url(base: &str, after: Option<&str>) -> String {
    match after {
        Some(after) => format!(
            "{base}{CURRENT_USER_GUILDS_PATH}?limit={GUILD_PAGE_LIMIT}&after={after}"
        ),
        None => format!("{base}{CURRENT_USER_GUILDS_PATH}?limit={GUILD_PAGE_LIMIT}"),
    }
}
