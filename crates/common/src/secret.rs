//! Capability-scoped holder for credentials (bot tokens, stats API keys)
//!
//! A `Secret` has no `Serialize` impl and redacts itself in `Debug` and
//! `Display`, so it cannot leak through logs or generic serialization of the
//! struct that owns it. The inner value is zeroized on drop.

use std::fmt;
use zeroize::Zeroize;

/// Sensitive value - redacted in Debug/Display/logs
pub struct Secret<T: Zeroize>(T);

impl<T: Zeroize> Secret<T> {
    pub fn new(value: T) -> Self {
        Self(value)
    }

    /// Expose the inner value. Only request builders should call this.
    pub fn expose(&self) -> &T {
        &self.0
    }
}

impl Secret<String> {
    /// Whether the held string is empty after trimming whitespace.
    pub fn is_blank(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl From<String> for Secret<String> {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}

impl From<&str> for Secret<String> {
    fn from(value: &str) -> Self {
        Self::new(value.to_owned())
    }
}

impl<T: Zeroize> fmt::Debug for Secret<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[REDACTED]")
    }
}

impl<T: Zeroize> fmt::Display for Secret<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[REDACTED]")
    }
}

impl<T: Zeroize> Drop for Secret<T> {
    fn drop(&mut self) {
        self.0.zeroize();
    }
}

impl<T: Zeroize + Clone> Clone for Secret<T> {
    fn clone(&self) -> Self {
        Self(self.0.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn debug_and_display_are_redacted() {
        let token = Secret::from("MTIzNDU2.bot-token");
        assert_eq!(format!("{token:?}"), "[REDACTED]");
        assert_eq!(format!("{token}"), "[REDACTED]");
    }

    #[test]
    fn redacted_inside_owning_struct() {
        #[derive(Debug)]
        #[allow(dead_code)]
        struct Holder {
            id: &'static str,
            key: Secret<String>,
        }
        let holder = Holder {
            id: "123",
            key: Secret::from("danbot-key-abc"),
        };
        let debug = format!("{holder:?}");
        assert!(debug.contains("123"));
        assert!(!debug.contains("danbot-key-abc"), "got: {debug}");
    }

    #[test]
    fn expose_returns_inner_value() {
        let key = Secret::new(String::from("danbot-key-abc"));
        assert_eq!(key.expose(), "danbot-key-abc");
        assert_eq!(key.clone().expose(), "danbot-key-abc");
    }

    #[test]
    fn blank_detection_ignores_whitespace() {
        assert!(Secret::from("  \n").is_blank());
        assert!(!Secret::from("tok").is_blank());
    }
}
