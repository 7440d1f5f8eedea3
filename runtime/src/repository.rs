//! Event-sourced repository: the event store plus an aggregate's evolver.
//!
//! Loading reads a stream and folds every event, oldest first, through
//! [`Aggregate::evolve`] starting from `None`. Saving encodes a batch and
//! appends it with the expected version implied by the batch's first event.

use crate::error::RepositoryError;
use crate::metrics::{EventStoreMetrics, ReplayMetrics};
use fictionary_core::aggregate::Aggregate;
use fictionary_core::event::EventEnvelope;
use fictionary_core::event_store::{EventStore, EventStoreError};
use fictionary_core::stream::{StreamId, Version};
use std::marker::PhantomData;
use std::sync::Arc;
use std::time::Instant;

/// Current state of an aggregate and the version it was rebuilt at.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Loaded<S> {
    /// The folded state
    pub state: S,
    /// Number of events the state was folded from
    pub version: Version,
}

/// Repository for one aggregate type over a shared event store.
///
/// # Example
///
/// ```ignore
/// let repository = Repository::<RoomAggregate>::new(store);
///
/// let Some(Loaded { state, version }) = repository.load("room-1").await? else {
///     return Err(not_found());
/// };
/// let events = decide_start_game(&state, &actor, version, now)?;
/// repository.save("room-1", &events).await?;
/// ```
pub struct Repository<A: Aggregate> {
    store: Arc<dyn EventStore>,
    _aggregate: PhantomData<fn() -> A>,
}

impl<A: Aggregate> Clone for Repository<A> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            _aggregate: PhantomData,
        }
    }
}

impl<A: Aggregate> Repository<A> {
    /// Create a repository over `store`
    #[must_use]
    pub fn new(store: Arc<dyn EventStore>) -> Self {
        Self {
            store,
            _aggregate: PhantomData,
        }
    }

    /// The stream holding the events of aggregate `id`
    #[must_use]
    pub fn stream_id(id: &str) -> StreamId {
        StreamId::for_aggregate(A::KIND, id)
    }

    /// Rebuild the current state of aggregate `id`.
    ///
    /// Returns `Ok(None)` when the stream holds no events.
    ///
    /// # Errors
    ///
    /// - `RepositoryError::Store` if the event store fails
    /// - `RepositoryError::Codec` if a stored event cannot be decoded
    /// - `RepositoryError::Corrupted` if an event cannot follow the state
    ///   folded so far
    #[tracing::instrument(skip(self), fields(aggregate = A::KIND))]
    pub async fn load(&self, id: &str) -> Result<Option<Loaded<A::State>>, RepositoryError<A::Error>> {
        let stream_id = Self::stream_id(id);

        let start = Instant::now();
        let stored = self.store.load_events(stream_id.clone()).await?;
        EventStoreMetrics::record_load(stored.len(), start.elapsed());

        let mut state = None;
        for serialized in &stored {
            let envelope = EventEnvelope::<A::Event>::from_serialized(serialized)?;
            state = Some(A::evolve(state, &envelope.event).map_err(|source| {
                tracing::error!(
                    stream_id = %stream_id,
                    version = %serialized.version,
                    event_type = %serialized.event_type,
                    error = %source,
                    "Stored event cannot be applied"
                );
                RepositoryError::Corrupted {
                    stream_id: stream_id.clone(),
                    source,
                }
            })?);
        }

        ReplayMetrics::record_replay(A::KIND, stored.len());
        let version = Version::new(stored.len() as u64);
        tracing::debug!(version = %version, "Rebuilt state");

        Ok(state.map(|state| Loaded { state, version }))
    }

    /// Append a decided batch to the stream of aggregate `id`.
    ///
    /// The expected version is the one just before the first event of the
    /// batch. An empty batch writes nothing.
    ///
    /// # Errors
    ///
    /// - `RepositoryError::Store` with `EventStoreError::ConcurrencyConflict`
    ///   if another writer got there first; nothing was written
    /// - `RepositoryError::InvalidBatch` if the first event is stamped with
    ///   version 0
    /// - `RepositoryError::Store` with `EventStoreError::NonConsecutiveVersion`
    ///   if the batch skips or repeats a version; nothing was written
    /// - `RepositoryError::Codec` if an event cannot be encoded
    #[tracing::instrument(skip(self, events), fields(aggregate = A::KIND, count = events.len()))]
    pub async fn save(
        &self,
        id: &str,
        events: &[EventEnvelope<A::Event>],
    ) -> Result<(), RepositoryError<A::Error>> {
        let stream_id = Self::stream_id(id);

        let Some(first) = events.first() else {
            tracing::debug!("Nothing to save");
            return Ok(());
        };
        let Some(expected_version) = first.version.previous() else {
            return Err(RepositoryError::InvalidBatch {
                stream_id,
                reason: "first event is stamped with version 0".to_string(),
            });
        };

        let serialized = events
            .iter()
            .map(EventEnvelope::to_serialized)
            .collect::<Result<Vec<_>, _>>()?;

        let start = Instant::now();
        match self
            .store
            .append_events(stream_id.clone(), expected_version, serialized)
            .await
        {
            Ok(version) => {
                EventStoreMetrics::record_append(events.len(), start.elapsed());
                tracing::debug!(version = %version, "Saved events");
                Ok(())
            },
            Err(error @ EventStoreError::ConcurrencyConflict { .. }) => {
                EventStoreMetrics::record_conflict();
                tracing::warn!(stream_id = %stream_id, error = %error, "Save lost the race");
                Err(error.into())
            },
            Err(error) => Err(error.into()),
        }
    }
}
