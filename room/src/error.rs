//! Error types for the game room.
//!
//! - [`DomainError`]: a command was refused. Expected, recoverable, shown to
//!   the player.
//! - [`EvolveError`]: an event cannot follow the state it is applied to. The
//!   stream is corrupted; never retried.
//! - [`RoomError`]: what application-level operations return, one of the two
//!   classes above.

use crate::types::{PlayerId, RoomPhase};
use fictionary_runtime::RepositoryError;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A refused command, with a message for the player.
///
/// Serializes as `{ "type": "DomainError", "message": "..." }`.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename = "DomainError")]
#[error("{message}")]
pub struct DomainError {
    /// Human-readable reason
    pub message: String,
}

impl DomainError {
    /// Create a domain error
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    /// The reason as a string slice
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }
}

/// An event that cannot be applied to the prior state.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EvolveError {
    /// The event needs an existing room
    #[error("{event_type} cannot be applied before the room exists")]
    NoRoom {
        /// The offending event's type name
        event_type: &'static str,
    },

    /// The event cannot follow the room's phase
    #[error("{event_type} cannot be applied to a room in phase {phase}")]
    NotApplicable {
        /// The offending event's type name
        event_type: &'static str,
        /// The phase the room was in
        phase: RoomPhase,
    },

    /// The event references a player who is not seated
    #[error("{event_type} references unknown player {player_id}")]
    UnknownPlayer {
        /// The offending event's type name
        event_type: &'static str,
        /// The missing player
        player_id: PlayerId,
    },
}

/// Error returned by room repository and service operations
#[derive(Error, Debug)]
pub enum RoomError {
    /// The command was refused, or the room changed under it; reload and
    /// resubmit
    #[error(transparent)]
    Domain(#[from] DomainError),

    /// The room's stream is corrupted or storage failed
    #[error("Fatal room error: {0}")]
    Fatal(#[source] RepositoryError<EvolveError>),
}

impl RoomError {
    /// The domain error, if this is one
    #[must_use]
    pub const fn as_domain(&self) -> Option<&DomainError> {
        match self {
            Self::Domain(error) => Some(error),
            Self::Fatal(_) => None,
        }
    }

    /// Whether this is a fatal error
    #[must_use]
    pub const fn is_fatal(&self) -> bool {
        matches!(self, Self::Fatal(_))
    }
}

impl From<RepositoryError<EvolveError>> for RoomError {
    /// Concurrency conflicts are the caller's to resolve; everything else is
    /// fatal.
    fn from(error: RepositoryError<EvolveError>) -> Self {
        if error.is_conflict() {
            Self::Domain(DomainError::new(error.to_string()))
        } else {
            Self::Fatal(error)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fictionary_core::event_store::EventStoreError;
    use fictionary_core::stream::{StreamId, Version};

    #[test]
    #[allow(clippy::unwrap_used)] // Test code
    fn domain_error_wire_shape() {
        let json = serde_json::to_value(DomainError::new("Room is full")).unwrap();
        assert_eq!(
            json,
            serde_json::json!({ "type": "DomainError", "message": "Room is full" })
        );
    }

    #[test]
    fn domain_error_displays_its_message() {
        assert_eq!(DomainError::new("Theme is required").to_string(), "Theme is required");
    }

    #[test]
    fn conflict_becomes_domain_error() {
        let conflict = RepositoryError::<EvolveError>::Store(EventStoreError::ConcurrencyConflict {
            stream_id: StreamId::new("room-1"),
            expected: Version::new(3),
            actual: Version::new(4),
        });

        let error = RoomError::from(conflict);
        let domain = error.as_domain().map(DomainError::message).unwrap_or_default();
        assert!(domain.contains("expected version 3"));
        assert!(!error.is_fatal());
    }

    #[test]
    fn corruption_is_fatal() {
        let corrupted = RepositoryError::Corrupted {
            stream_id: StreamId::new("room-1"),
            source: EvolveError::NoRoom {
                event_type: "GameStarted",
            },
        };

        let error = RoomError::from(corrupted);
        assert!(error.is_fatal());
        assert!(error.to_string().contains("GameStarted cannot be applied"));
    }
}
