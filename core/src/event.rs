//! Event trait, the recorded-event envelope, and the stored wire format.
//!
//! An event is an immutable fact. Deciders produce events wrapped in an
//! [`EventEnvelope`], which stamps each one with the time it occurred and its
//! position (version) in the stream. Before it reaches the event store the
//! envelope is flattened into a [`SerializedEvent`]: a type name, the
//! `bincode` payload, and the same timestamp and version. The store only ever
//! sees that opaque form.
//!
//! # Example
//!
//! ```
//! use fictionary_core::event::{Event, EventEnvelope};
//! use fictionary_core::stream::Version;
//! use chrono::Utc;
//! use serde::{Serialize, Deserialize};
//!
//! #[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
//! enum LobbyEvent {
//!     Opened { name: String },
//!     Closed,
//! }
//!
//! impl Event for LobbyEvent {
//!     fn event_type(&self) -> &'static str {
//!         match self {
//!             LobbyEvent::Opened { .. } => "Opened",
//!             LobbyEvent::Closed => "Closed",
//!         }
//!     }
//! }
//!
//! let recorded = EventEnvelope::new(LobbyEvent::Closed, Utc::now(), Version::new(2));
//! let stored = recorded.to_serialized().unwrap();
//! assert_eq!(stored.event_type, "Closed");
//!
//! let restored = EventEnvelope::<LobbyEvent>::from_serialized(&stored).unwrap();
//! assert_eq!(restored, recorded);
//! ```

use crate::stream::Version;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use std::fmt;
use thiserror::Error;

/// Error types for event operations.
#[derive(Error, Debug)]
pub enum EventError {
    /// Failed to serialize event to bytes.
    #[error("Failed to serialize event: {0}")]
    SerializationError(String),

    /// Failed to deserialize event from bytes.
    #[error("Failed to deserialize event: {0}")]
    DeserializationError(String),

    /// The stored type name does not match the decoded payload.
    #[error("Unknown event type: {0}")]
    UnknownEventType(String),
}

/// An event that can be stored in an event store and replayed to rebuild state.
///
/// # Event Naming Convention
///
/// `event_type()` returns the stable name written next to the payload in
/// storage (`"RoomCreated"`, `"VoteListUpdated"`, ...). Renaming a variant in
/// code must not change this string.
///
/// # Serialization
///
/// Payloads are encoded with `bincode`. The default methods work for any type
/// implementing `Serialize` and `DeserializeOwned`.
pub trait Event: Send + Sync + 'static {
    /// Returns the stable type name of this event.
    fn event_type(&self) -> &'static str;

    /// Serialize this event to bincode bytes.
    ///
    /// # Errors
    ///
    /// Returns `EventError::SerializationError` if the event cannot be serialized.
    fn to_bytes(&self) -> Result<Vec<u8>, EventError>
    where
        Self: Serialize,
    {
        bincode::serialize(self).map_err(|e| EventError::SerializationError(e.to_string()))
    }

    /// Deserialize an event from bincode bytes.
    ///
    /// # Errors
    ///
    /// Returns `EventError::DeserializationError` if the bytes are corrupted or
    /// were written by an incompatible schema.
    fn from_bytes(bytes: &[u8]) -> Result<Self, EventError>
    where
        Self: DeserializeOwned + Sized,
    {
        bincode::deserialize(bytes).map_err(|e| EventError::DeserializationError(e.to_string()))
    }
}

/// A decided event together with when it occurred and where it sits in its
/// stream.
///
/// This is the `{ type, payload, occurredAt, version }` record of the domain:
/// the type comes from [`Event::event_type`], the payload is `event`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventEnvelope<E> {
    /// The event payload
    pub event: E,
    /// When the event was decided
    pub occurred_at: DateTime<Utc>,
    /// 1-based position of the event in its stream
    pub version: Version,
}

impl<E> EventEnvelope<E> {
    /// Wrap an event.
    #[must_use]
    pub const fn new(event: E, occurred_at: DateTime<Utc>, version: Version) -> Self {
        Self {
            event,
            occurred_at,
            version,
        }
    }
}

impl<E: Event> EventEnvelope<E> {
    /// The stable type name of the wrapped event.
    #[must_use]
    pub fn event_type(&self) -> &'static str {
        self.event.event_type()
    }
}

impl<E> EventEnvelope<E>
where
    E: Event + Serialize + DeserializeOwned,
{
    /// Flatten into the stored wire format.
    ///
    /// # Errors
    ///
    /// Returns `EventError::SerializationError` if the payload cannot be encoded.
    pub fn to_serialized(&self) -> Result<SerializedEvent, EventError> {
        Ok(SerializedEvent {
            event_type: self.event.event_type().to_string(),
            data: self.event.to_bytes()?,
            occurred_at: self.occurred_at,
            version: self.version,
        })
    }

    /// Rebuild an envelope from its stored form.
    ///
    /// # Errors
    ///
    /// - `EventError::DeserializationError` if the payload cannot be decoded
    /// - `EventError::UnknownEventType` if the decoded payload's type name
    ///   differs from the stored one
    pub fn from_serialized(stored: &SerializedEvent) -> Result<Self, EventError> {
        let event = E::from_bytes(&stored.data)?;
        if event.event_type() != stored.event_type {
            return Err(EventError::UnknownEventType(stored.event_type.clone()));
        }
        Ok(Self::new(event, stored.occurred_at, stored.version))
    }
}

/// A serialized event ready for storage.
///
/// The event store treats `data` as opaque bytes; it only reads `version`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SerializedEvent {
    /// The event type identifier (e.g., `"PlayerJoined"`).
    pub event_type: String,

    /// The bincode-serialized event payload.
    pub data: Vec<u8>,

    /// When the event was decided.
    pub occurred_at: DateTime<Utc>,

    /// 1-based position of the event in its stream.
    pub version: Version,
}

impl SerializedEvent {
    /// Create a new serialized event.
    ///
    /// # Examples
    ///
    /// ```
    /// use fictionary_core::event::SerializedEvent;
    /// use fictionary_core::stream::Version;
    /// use chrono::Utc;
    ///
    /// let event = SerializedEvent::new(
    ///     "GameEnded".to_string(),
    ///     vec![1, 2, 3, 4],
    ///     Utc::now(),
    ///     Version::new(12),
    /// );
    /// assert_eq!(event.version, Version::new(12));
    /// ```
    #[must_use]
    pub const fn new(
        event_type: String,
        data: Vec<u8>,
        occurred_at: DateTime<Utc>,
        version: Version,
    ) -> Self {
        Self {
            event_type,
            data,
            occurred_at,
            version,
        }
    }
}

impl fmt::Display for SerializedEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "SerializedEvent {{ type: {}, version: {}, size: {} bytes }}",
            self.event_type,
            self.version,
            self.data.len()
        )
    }
}
