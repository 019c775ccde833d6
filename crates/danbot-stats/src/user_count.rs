//! User count policies and their resolution to a concrete count
//!
//! Callers without a live runtime describe the user count as a policy:
//! `"ALL"`, `"RANDOM"`, a `[min, max]` range or a literal integer. Policies
//! deserialize from any self-describing format (JSON, TOML) through
//! `serde_json::Value`, so a malformed value is reported as
//! `InvalidUserCount` instead of a format-specific parse error.

use std::cmp::Ordering;

use rand::RngExt;
use serde::{Deserialize, Serialize, Serializer};
use serde_json::Value;

use crate::constants::RANDOM_USER_COUNT_MAX;
use crate::error::{Error, Result};

/// A resolved user count. `Unbounded` is the `"ALL"` sentinel: it compares
/// greater than every finite count and absorbs additions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Count {
    Finite(u64),
    Unbounded,
}

impl Count {
    pub fn as_finite(self) -> Option<u64> {
        match self {
            Count::Finite(n) => Some(n),
            Count::Unbounded => None,
        }
    }

    pub fn is_unbounded(self) -> bool {
        matches!(self, Count::Unbounded)
    }

    pub fn saturating_add(self, by: u64) -> Self {
        match self {
            Count::Finite(n) => Count::Finite(n.saturating_add(by)),
            Count::Unbounded => Count::Unbounded,
        }
    }
}

impl From<u64> for Count {
    fn from(value: u64) -> Self {
        Count::Finite(value)
    }
}

impl PartialOrd for Count {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Count {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Count::Finite(a), Count::Finite(b)) => a.cmp(b),
            (Count::Finite(_), Count::Unbounded) => Ordering::Less,
            (Count::Unbounded, Count::Finite(_)) => Ordering::Greater,
            (Count::Unbounded, Count::Unbounded) => Ordering::Equal,
        }
    }
}

/// JSON has no infinity; `Unbounded` goes over the wire as `null`.
impl Serialize for Count {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            Count::Finite(n) => serializer.serialize_u64(*n),
            Count::Unbounded => serializer.serialize_none(),
        }
    }
}

/// How to produce a user count when no live source exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(try_from = "Value")]
pub enum UserCountPolicy {
    /// `"ALL"`
    All,
    /// `"RANDOM"`: uniform in `[1, 150]`
    Random,
    /// `[min, max]`: uniform in the inclusive range
    Range(u64, u64),
    /// Literal count, used unchanged
    Exact(u64),
}

impl TryFrom<Value> for UserCountPolicy {
    type Error = Error;

    fn try_from(value: Value) -> Result<Self> {
        match &value {
            Value::String(s) if s == "ALL" => Ok(UserCountPolicy::All),
            Value::String(s) if s == "RANDOM" => Ok(UserCountPolicy::Random),
            Value::Number(n) => n
                .as_u64()
                .map(UserCountPolicy::Exact)
                .ok_or_else(|| Error::invalid_user_count(&value)),
            Value::Array(items) => match items.as_slice() {
                [min, max] => match (min.as_u64(), max.as_u64()) {
                    (Some(min), Some(max)) => Ok(UserCountPolicy::Range(min, max)),
                    _ => Err(Error::invalid_user_count(&value)),
                },
                _ => Err(Error::invalid_user_count(&value)),
            },
            _ => Err(Error::invalid_user_count(&value)),
        }
    }
}

impl From<u64> for UserCountPolicy {
    fn from(value: u64) -> Self {
        UserCountPolicy::Exact(value)
    }
}

/// Resolve a policy with an injected random source.
pub fn resolve_with<R: rand::Rng + ?Sized>(policy: UserCountPolicy, rng: &mut R) -> Result<Count> {
    match policy {
        UserCountPolicy::All => Ok(Count::Unbounded),
        UserCountPolicy::Random => Ok(Count::Finite(rng.random_range(1..=RANDOM_USER_COUNT_MAX))),
        UserCountPolicy::Exact(n) => Ok(Count::Finite(n)),
        UserCountPolicy::Range(min, max) if min <= max => {
            Ok(Count::Finite(rng.random_range(min..=max)))
        }
        UserCountPolicy::Range(min, max) => Err(Error::invalid_user_count(format!(
            "range [{min}, {max}] has min greater than max"
        ))),
    }
}

/// Resolve a policy with the thread-local random source.
pub fn resolve_user_count(policy: UserCountPolicy) -> Result<Count> {
    resolve_with(policy, &mut rand::rng())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use serde_json::json;

    fn parse(value: Value) -> Result<UserCountPolicy> {
        UserCountPolicy::try_from(value)
    }

    #[test]
    fn literal_is_returned_unchanged() {
        let mut rng = StdRng::seed_from_u64(1);
        for n in [0, 1, 42, 150, 151, 1_000_000, u64::MAX - 1, u64::MAX] {
            assert_eq!(
                resolve_with(UserCountPolicy::Exact(n), &mut rng).unwrap(),
                Count::Finite(n)
            );
        }
    }

    #[test]
    fn all_is_larger_than_any_finite_count() {
        let all = resolve_user_count(UserCountPolicy::All).unwrap();
        assert!(all.is_unbounded());
        for n in [0, 1, 10_000, u64::MAX - 1] {
            assert!(all > Count::Finite(n));
        }
        assert_eq!(all.saturating_add(5), Count::Unbounded);
    }

    #[test]
    fn random_stays_within_one_and_150() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..2_000 {
            let n = resolve_with(UserCountPolicy::Random, &mut rng)
                .unwrap()
                .as_finite()
                .unwrap();
            assert!((1..=150).contains(&n), "got {n}");
        }
    }

    #[test]
    fn random_is_deterministic_for_a_seed() {
        let a = resolve_with(UserCountPolicy::Random, &mut StdRng::seed_from_u64(99)).unwrap();
        let b = resolve_with(UserCountPolicy::Random, &mut StdRng::seed_from_u64(99)).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn range_stays_within_bounds_even_when_min_is_positive() {
        let mut rng = StdRng::seed_from_u64(3);
        for _ in 0..2_000 {
            let n = resolve_with(UserCountPolicy::Range(100, 120), &mut rng)
                .unwrap()
                .as_finite()
                .unwrap();
            assert!((100..=120).contains(&n), "got {n}");
        }
    }

    #[test]
    fn degenerate_range_returns_its_only_value() {
        let mut rng = StdRng::seed_from_u64(3);
        assert_eq!(
            resolve_with(UserCountPolicy::Range(5, 5), &mut rng).unwrap(),
            Count::Finite(5)
        );
    }

    #[test]
    fn inverted_range_is_invalid() {
        let err = resolve_user_count(UserCountPolicy::Range(10, 1)).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidUserCount);
    }

    #[test]
    fn parses_every_supported_shape() {
        assert_eq!(parse(json!("ALL")).unwrap(), UserCountPolicy::All);
        assert_eq!(parse(json!("RANDOM")).unwrap(), UserCountPolicy::Random);
        assert_eq!(parse(json!(25)).unwrap(), UserCountPolicy::Exact(25));
        assert_eq!(parse(json!([3, 9])).unwrap(), UserCountPolicy::Range(3, 9));
    }

    #[test]
    fn rejects_other_shapes() {
        for value in [
            json!("all"),
            json!("SOME"),
            json!(-4),
            json!(2.5),
            json!([1]),
            json!([1, 2, 3]),
            json!([1, "x"]),
            json!({"min": 1}),
            json!(null),
            json!(true),
        ] {
            let err = parse(value.clone()).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::InvalidUserCount, "value {value}");
        }
    }

    #[test]
    fn deserializes_through_serde() {
        let policy: UserCountPolicy = serde_json::from_str("[10, 20]").unwrap();
        assert_eq!(policy, UserCountPolicy::Range(10, 20));
        let err = serde_json::from_str::<UserCountPolicy>("\"NONE\"").unwrap_err();
        assert!(err.to_string().contains("INVALID_USER_COUNT"), "got: {err}");
    }

    #[test]
    fn unbounded_serializes_as_null() {
        assert_eq!(serde_json::to_value(Count::Unbounded).unwrap(), Value::Null);
        assert_eq!(serde_json::to_value(Count::Finite(12)).unwrap(), json!(12));
    }

    #[test]
    fn finite_addition_saturates_without_becoming_unbounded() {
        assert_eq!(Count::Finite(u64::MAX - 1).saturating_add(5), Count::Finite(u64::MAX));
        assert_eq!(Count::Unbounded.saturating_add(5), Count::Unbounded);
        assert!(Count::Finite(u64::MAX) < Count::Unbounded);
    }

    #[test]
    fn literal_max_resolves_to_finite() {
        let count = resolve_user_count(UserCountPolicy::Exact(u64::MAX)).unwrap();
        assert_eq!(count, Count::Finite(u64::MAX));
        assert_eq!(serde_json::to_value(count).unwrap(), json!(u64::MAX));
    }
}
