//! Types shared across the DanBot stats workspace

mod error;
mod secret;

pub use error::{Error, Result};
pub use secret::Secret;
