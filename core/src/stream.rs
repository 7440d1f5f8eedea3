//! Event stream identification and versioning types.
//!
//! Every aggregate instance owns exactly one stream. A room with id `abc`
//! lives in the stream `room-abc`; its version is the number of events that
//! stream holds.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Error type for `StreamId` parsing.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Invalid stream ID: {0}")]
pub struct ParseStreamIdError(String);

/// Identifier of one event stream (one aggregate instance).
///
/// # Validation
///
/// - `FromStr::from_str()`: rejects empty strings, use for external input
/// - `new()` / `From`: no validation, use for ids the application generated
///
/// # Examples
///
/// ```
/// use fictionary_core::stream::StreamId;
///
/// let stream_id = StreamId::for_aggregate("room", "abc");
/// assert_eq!(stream_id.as_str(), "room-abc");
///
/// let parsed: StreamId = "room-xyz".parse().unwrap();
/// assert_eq!(parsed, StreamId::new("room-xyz"));
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct StreamId(String);

impl StreamId {
    /// Create a new `StreamId` from a string.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Build the stream id of an aggregate instance: `"{kind}-{id}"`.
    #[must_use]
    pub fn for_aggregate(kind: &str, id: &str) -> Self {
        Self(format!("{kind}-{id}"))
    }

    /// Get the stream ID as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Convert the `StreamId` into its inner `String`.
    #[must_use]
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for StreamId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for StreamId {
    type Err = ParseStreamIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().is_empty() {
            return Err(ParseStreamIdError("Stream ID cannot be empty".to_string()));
        }
        Ok(Self(s.to_string()))
    }
}

impl From<String> for StreamId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for StreamId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl AsRef<str> for StreamId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Position in an event stream.
///
/// A stream with no events is at [`Version::INITIAL`] (0). The first event
/// appended carries version 1, the next 2, and so on without gaps, so the
/// version of a stream always equals its length.
///
/// Used two ways:
/// - as the version stamped on each stored event
/// - as the *expected* version a writer passes to the store, which must equal
///   the stream's current length for the append to succeed
///
/// # Examples
///
/// ```
/// use fictionary_core::stream::Version;
///
/// let v0 = Version::INITIAL;
/// let v1 = v0.next();
/// assert_eq!(v1, Version::new(1));
/// assert_eq!(v1.previous(), Some(v0));
/// assert_eq!(v0.previous(), None);
/// ```
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Version(u64);

impl Version {
    /// The version of a stream with no events.
    pub const INITIAL: Self = Self(0);

    /// Create a new `Version` with the given value.
    #[must_use]
    pub const fn new(value: u64) -> Self {
        Self(value)
    }

    /// Get the version number.
    #[must_use]
    pub const fn value(self) -> u64 {
        self.0
    }

    /// The version immediately after this one.
    #[must_use]
    pub const fn next(self) -> Self {
        Self(self.0.saturating_add(1))
    }

    /// The version immediately before this one, or `None` at `INITIAL`.
    #[must_use]
    pub const fn previous(self) -> Option<Self> {
        match self.0.checked_sub(1) {
            Some(value) => Some(Self(value)),
            None => None,
        }
    }

    /// Check if this is the initial version (0).
    #[must_use]
    pub const fn is_initial(self) -> bool {
        self.0 == 0
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for Version {
    fn from(value: u64) -> Self {
        Self(value)
    }
}

impl From<Version> for u64 {
    fn from(version: Version) -> Self {
        version.0
    }
}

/// Advance a version by `rhs` events.
impl std::ops::Add<u64> for Version {
    type Output = Self;

    fn add(self, rhs: u64) -> Self::Output {
        Self(self.0.saturating_add(rhs))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    mod stream_id_tests {
        use super::*;

        #[test]
        fn for_aggregate_prefixes_kind() {
            let id = StreamId::for_aggregate("room", "42");
            assert_eq!(id.as_str(), "room-42");
            assert_eq!(format!("{id}"), "room-42");
        }

        #[test]
        #[allow(clippy::expect_used)] // Panics: Test will fail if parse fails
        fn parse_from_str() {
            let id: StreamId = "room-1".parse().expect("parse should succeed");
            assert_eq!(id, StreamId::new("room-1"));
        }

        #[test]
        fn parse_blank_string_fails() {
            assert!("".parse::<StreamId>().is_err());
            assert!("   ".parse::<StreamId>().is_err());
        }

        #[test]
        fn into_inner_returns_string() {
            assert_eq!(StreamId::from("room-9").into_inner(), "room-9");
        }
    }

    mod version_tests {
        use super::*;

        #[test]
        fn initial_version() {
            assert_eq!(Version::INITIAL, Version::new(0));
            assert!(Version::INITIAL.is_initial());
            assert!(!Version::new(1).is_initial());
        }

        #[test]
        fn next_and_previous_are_inverse() {
            let v3 = Version::new(3);
            assert_eq!(v3.next(), Version::new(4));
            assert_eq!(v3.next().previous(), Some(v3));
            assert_eq!(Version::INITIAL.previous(), None);
        }

        #[test]
        fn version_addition() {
            assert_eq!(Version::new(5) + 3, Version::new(8));
        }

        #[test]
        fn version_ordering() {
            assert!(Version::new(1) < Version::new(2));
            assert!(Version::new(10) > Version::new(9));
        }

        #[test]
        fn version_u64_conversions() {
            let version = Version::from(42_u64);
            let num: u64 = version.into();
            assert_eq!(num, 42);
            assert_eq!(format!("{version}"), "42");
        }

        proptest::proptest! {
            #[test]
            fn adding_n_is_n_nexts(start in 0_u64..1_000, n in 0_u64..50) {
                let mut stepped = Version::new(start);
                for _ in 0..n {
                    stepped = stepped.next();
                }
                proptest::prop_assert_eq!(Version::new(start) + n, stepped);
            }

            #[test]
            fn previous_undoes_next(value in 0_u64..u64::MAX) {
                proptest::prop_assert_eq!(Version::new(value).next().previous(), Some(Version::new(value)));
            }
        }
    }
}
