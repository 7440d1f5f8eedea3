//! # Fictionary Runtime
//!
//! Runtime glue between pure aggregates and the event store.
//!
//! ## Core Components
//!
//! - **Repository**: loads a stream and folds it into state; appends decided
//!   batches under optimistic concurrency
//! - **Metrics**: Prometheus counters and histograms for store traffic,
//!   replays and command outcomes
//!
//! ## Example
//!
//! ```ignore
//! use fictionary_runtime::Repository;
//!
//! let repository = Repository::<RoomAggregate>::new(Arc::new(InMemoryEventStore::new()));
//! repository.save("room-1", &decide_create_room(&room_id, &host_id, "Alice", now)?).await?;
//!
//! let loaded = repository.load("room-1").await?;
//! ```

/// Prometheus metrics for observability
pub mod metrics;

/// Event-sourced repository
pub mod repository;

pub use repository::{Loaded, Repository};

/// Error types for the repository
pub mod error {
    use fictionary_core::event::EventError;
    use fictionary_core::event_store::EventStoreError;
    use fictionary_core::stream::StreamId;
    use thiserror::Error;

    /// Errors that can occur while loading or saving an aggregate
    ///
    /// `E` is the aggregate's evolve error.
    #[derive(Error, Debug)]
    pub enum RepositoryError<E>
    where
        E: std::error::Error + 'static,
    {
        /// The event store rejected or failed the operation
        ///
        /// Includes optimistic concurrency conflicts, see
        /// [`RepositoryError::is_conflict`].
        #[error(transparent)]
        Store(#[from] EventStoreError),

        /// An event could not be encoded or decoded
        #[error(transparent)]
        Codec(#[from] EventError),

        /// A stored event cannot follow the state folded before it
        #[error("Corrupted stream {stream_id}: {source}")]
        Corrupted {
            /// The stream that failed to fold
            stream_id: StreamId,
            /// The evolve failure
            source: E,
        },

        /// The batch handed to `save` is not stamped correctly
        #[error("Invalid event batch for {stream_id}: {reason}")]
        InvalidBatch {
            /// Target stream
            stream_id: StreamId,
            /// What is wrong with the batch
            reason: String,
        },
    }

    impl<E> RepositoryError<E>
    where
        E: std::error::Error + 'static,
    {
        /// Whether the save lost an optimistic concurrency race
        #[must_use]
        pub const fn is_conflict(&self) -> bool {
            matches!(self, Self::Store(EventStoreError::ConcurrencyConflict { .. }))
        }
    }
}

pub use error::RepositoryError;
