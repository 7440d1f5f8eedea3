//! Event store trait and related types for event sourcing.
//!
//! An event store is an append-only log keyed by stream. It offers exactly two
//! operations:
//!
//! - Append a batch of events to a stream, guarded by an expected version
//! - Load every event of a stream, in version order
//!
//! Appends are all-or-nothing: if the stream's current version differs from
//! the expected one, nothing is written and the caller gets
//! [`EventStoreError::ConcurrencyConflict`]. The store never retries.
//!
//! # Implementations
//!
//! - `InMemoryEventStore` (in `fictionary-testing`): `HashMap` backed, used by
//!   tests and the demo binary
//!
//! # Example
//!
//! ```no_run
//! use fictionary_core::event_store::{EventStore, EventStoreError};
//! use fictionary_core::stream::{StreamId, Version};
//! use fictionary_core::event::SerializedEvent;
//!
//! async fn example(store: &dyn EventStore, batch: Vec<SerializedEvent>) -> Result<(), EventStoreError> {
//!     let stream_id = StreamId::new("room-123");
//!
//!     // A new stream is at version 0
//!     let new_version = store.append_events(stream_id.clone(), Version::INITIAL, batch).await?;
//!
//!     // Load everything back, oldest first
//!     let all_events = store.load_events(stream_id).await?;
//!     assert_eq!(all_events.len() as u64, new_version.value());
//!
//!     Ok(())
//! }
//! ```

use crate::event::SerializedEvent;
use crate::stream::{StreamId, Version};
use std::future::Future;
use std::pin::Pin;
use thiserror::Error;

/// Errors that can occur during event store operations.
#[derive(Error, Debug)]
pub enum EventStoreError {
    /// Optimistic concurrency conflict: expected version doesn't match current version.
    ///
    /// Another writer appended to the stream after the caller loaded it. The
    /// stream is left untouched.
    #[error("Concurrency conflict on {stream_id}: expected version {expected}, found {actual}")]
    ConcurrencyConflict {
        /// The stream ID where the conflict occurred.
        stream_id: StreamId,
        /// The version we expected the stream to be at.
        expected: Version,
        /// The actual current version of the stream.
        actual: Version,
    },

    /// The batch is not stamped `expected + 1, expected + 2, ...`.
    ///
    /// The stream is left untouched.
    #[error("Invalid batch for {stream_id}: event {position} carries version {found}, expected {expected}")]
    NonConsecutiveVersion {
        /// The stream the batch was meant for.
        stream_id: StreamId,
        /// Zero-based position of the offending event in the batch.
        position: usize,
        /// The version that event should have carried.
        expected: Version,
        /// The version it actually carried.
        found: Version,
    },

    /// Backend storage failure.
    #[error("Database error: {0}")]
    DatabaseError(String),

    /// Serialization/deserialization error.
    #[error("Serialization error: {0}")]
    SerializationError(String),

    /// General I/O error.
    #[error("I/O error: {0}")]
    IoError(String),
}

impl EventStoreError {
    /// Whether this error is an optimistic concurrency conflict.
    #[must_use]
    pub const fn is_conflict(&self) -> bool {
        matches!(self, Self::ConcurrencyConflict { .. })
    }
}

/// Event store abstraction for storing and retrieving event streams.
///
/// # Thread Safety
///
/// Implementations must be `Send + Sync`; one store is shared by every
/// repository in the process.
///
/// # Dyn Compatibility
///
/// Methods return `Pin<Box<dyn Future>>` instead of using `async fn` so the
/// store can be held as `Arc<dyn EventStore>`.
pub trait EventStore: Send + Sync {
    /// Append events to a stream with optimistic concurrency control.
    ///
    /// # Parameters
    ///
    /// - `stream_id`: The stream to append events to
    /// - `expected_version`: The number of events the caller believes the
    ///   stream currently holds (`Version::INITIAL` for a new stream)
    /// - `events`: Events to append, already stamped with consecutive versions
    ///   starting at `expected_version + 1`
    ///
    /// # Returns
    ///
    /// The stream's version after the append. An empty batch with a matching
    /// expected version succeeds and leaves the stream unchanged.
    ///
    /// # Errors
    ///
    /// - `ConcurrencyConflict`: the stream's current version differs from
    ///   `expected_version`; nothing was appended
    /// - `NonConsecutiveVersion`: the batch is not stamped with consecutive
    ///   versions starting at `expected_version + 1`; nothing was appended
    /// - `DatabaseError`: the backend failed
    fn append_events(
        &self,
        stream_id: StreamId,
        expected_version: Version,
        events: Vec<SerializedEvent>,
    ) -> Pin<Box<dyn Future<Output = Result<Version, EventStoreError>> + Send + '_>>;

    /// Load all events of a stream, ordered by version ascending.
    ///
    /// A stream that was never written returns an empty vector, not an error.
    ///
    /// # Errors
    ///
    /// - `DatabaseError`: the backend failed
    fn load_events(
        &self,
        stream_id: StreamId,
    ) -> Pin<Box<dyn Future<Output = Result<Vec<SerializedEvent>, EventStoreError>> + Send + '_>>;
}
