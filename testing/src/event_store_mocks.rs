//! In-memory event store
//!
//! [`InMemoryEventStore`] keeps every stream in a `HashMap` behind a single
//! lock. The version check and the append happen under the same write guard,
//! so a batch is either fully visible or not visible at all. A batch must be
//! stamped with the versions that follow the stream's current length, which
//! keeps every stored stream gapless and in append order.

use fictionary_core::event::SerializedEvent;
use fictionary_core::event_store::{EventStore, EventStoreError};
use fictionary_core::stream::{StreamId, Version};
use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, RwLock};

type Streams = HashMap<StreamId, Vec<SerializedEvent>>;

/// In-memory event store for tests and single-process demos.
///
/// Clones share the same underlying streams.
///
/// # Example
///
/// ```
/// use fictionary_testing::InMemoryEventStore;
/// use fictionary_core::event_store::EventStore;
/// use fictionary_core::stream::{StreamId, Version};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let store = InMemoryEventStore::new();
/// let events = store.load_events(StreamId::new("room-1")).await?;
/// assert!(events.is_empty());
/// # Ok(())
/// # }
/// ```
#[derive(Clone, Debug, Default)]
pub struct InMemoryEventStore {
    streams: Arc<RwLock<Streams>>,
}

impl InMemoryEventStore {
    /// Create a new empty store
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of events currently held by `stream_id` (0 for unknown or
    /// poisoned streams).
    #[must_use]
    pub fn stream_len(&self, stream_id: &StreamId) -> usize {
        self.streams
            .read()
            .map(|streams| streams.get(stream_id).map_or(0, Vec::len))
            .unwrap_or(0)
    }

    /// Number of streams that hold at least one event
    #[must_use]
    pub fn stream_count(&self) -> usize {
        self.streams.read().map(|streams| streams.len()).unwrap_or(0)
    }

    fn append(
        &self,
        stream_id: StreamId,
        expected_version: Version,
        events: Vec<SerializedEvent>,
    ) -> Result<Version, EventStoreError> {
        let mut streams = self
            .streams
            .write()
            .map_err(|_| EventStoreError::DatabaseError("event store lock poisoned".to_string()))?;

        let current = streams
            .get(&stream_id)
            .map_or(Version::INITIAL, |stream| Version::new(stream.len() as u64));

        if current != expected_version {
            tracing::warn!(
                stream_id = %stream_id,
                expected = %expected_version,
                actual = %current,
                "Rejected append: stream moved on"
            );
            return Err(EventStoreError::ConcurrencyConflict {
                stream_id,
                expected: expected_version,
                actual: current,
            });
        }

        if let Some((position, found, expected)) = events
            .iter()
            .zip(1_u64..)
            .enumerate()
            .map(|(position, (event, offset))| (position, event.version, current + offset))
            .find(|(_, found, expected)| found != expected)
        {
            tracing::warn!(
                stream_id = %stream_id,
                position,
                expected = %expected,
                found = %found,
                "Rejected append: batch versions are not consecutive"
            );
            return Err(EventStoreError::NonConsecutiveVersion {
                stream_id,
                position,
                expected,
                found,
            });
        }

        if events.is_empty() {
            return Ok(current);
        }

        let new_version = current + events.len() as u64;
        tracing::debug!(
            stream_id = %stream_id,
            count = events.len(),
            version = %new_version,
            "Appended events"
        );
        streams.entry(stream_id).or_default().extend(events);
        Ok(new_version)
    }

    fn load(&self, stream_id: &StreamId) -> Result<Vec<SerializedEvent>, EventStoreError> {
        let streams = self
            .streams
            .read()
            .map_err(|_| EventStoreError::DatabaseError("event store lock poisoned".to_string()))?;

        Ok(streams.get(stream_id).cloned().unwrap_or_default())
    }
}

impl EventStore for InMemoryEventStore {
    fn append_events(
        &self,
        stream_id: StreamId,
        expected_version: Version,
        events: Vec<SerializedEvent>,
    ) -> Pin<Box<dyn Future<Output = Result<Version, EventStoreError>> + Send + '_>> {
        Box::pin(async move { self.append(stream_id, expected_version, events) })
    }

    fn load_events(
        &self,
        stream_id: StreamId,
    ) -> Pin<Box<dyn Future<Output = Result<Vec<SerializedEvent>, EventStoreError>> + Send + '_>>
    {
        Box::pin(async move { self.load(&stream_id) })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn event(version: u64) -> SerializedEvent {
        SerializedEvent::new(
            "Touched".to_string(),
            vec![version as u8],
            Utc::now(),
            Version::new(version),
        )
    }

    #[tokio::test]
    async fn append_to_new_stream() -> Result<(), EventStoreError> {
        let store = InMemoryEventStore::new();
        let stream_id = StreamId::new("room-1");

        let version = store
            .append_events(stream_id.clone(), Version::INITIAL, vec![event(1), event(2)])
            .await?;

        assert_eq!(version, Version::new(2));
        assert_eq!(store.stream_len(&stream_id), 2);
        assert_eq!(store.stream_count(), 1);
        Ok(())
    }

    #[tokio::test]
    async fn stale_expected_version_is_rejected_and_stream_untouched() -> Result<(), EventStoreError>
    {
        let store = InMemoryEventStore::new();
        let stream_id = StreamId::new("room-1");
        store
            .append_events(stream_id.clone(), Version::INITIAL, vec![event(1)])
            .await?;

        let result = store
            .append_events(stream_id.clone(), Version::INITIAL, vec![event(1)])
            .await;

        assert!(matches!(
            result,
            Err(EventStoreError::ConcurrencyConflict { expected, actual, .. })
                if expected == Version::INITIAL && actual == Version::new(1)
        ));
        assert_eq!(store.stream_len(&stream_id), 1);
        Ok(())
    }

    #[tokio::test]
    async fn mis_stamped_batches_are_rejected_and_history_keeps_its_order()
    -> Result<(), EventStoreError> {
        let store = InMemoryEventStore::new();
        let stream_id = StreamId::new("room-x");

        let result = store
            .append_events(stream_id.clone(), Version::INITIAL, vec![event(7)])
            .await;
        assert!(matches!(
            result,
            Err(EventStoreError::NonConsecutiveVersion { position: 0, expected, found, .. })
                if expected == Version::new(1) && found == Version::new(7)
        ));
        assert_eq!(store.stream_count(), 0);

        store
            .append_events(stream_id.clone(), Version::INITIAL, vec![event(1)])
            .await?;
        let result = store
            .append_events(stream_id.clone(), Version::new(1), vec![event(2), event(4)])
            .await;
        assert!(matches!(
            result,
            Err(EventStoreError::NonConsecutiveVersion { position: 1, .. })
        ));

        let versions: Vec<u64> = store
            .load_events(stream_id)
            .await?
            .iter()
            .map(|e| e.version.value())
            .collect();
        assert_eq!(versions, vec![1]);
        Ok(())
    }

    #[tokio::test]
    async fn empty_batch_with_matching_version_is_a_no_op() -> Result<(), EventStoreError> {
        let store = InMemoryEventStore::new();
        let stream_id = StreamId::new("room-1");

        let version = store
            .append_events(stream_id.clone(), Version::INITIAL, Vec::new())
            .await?;

        assert_eq!(version, Version::INITIAL);
        assert_eq!(store.stream_count(), 0);
        assert!(store.load_events(stream_id).await?.is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn streams_are_independent() -> Result<(), EventStoreError> {
        let store = InMemoryEventStore::new();
        store
            .append_events(StreamId::new("room-a"), Version::INITIAL, vec![event(1)])
            .await?;
        store
            .append_events(StreamId::new("room-b"), Version::INITIAL, vec![event(1)])
            .await?;

        assert_eq!(store.stream_len(&StreamId::new("room-a")), 1);
        assert_eq!(store.stream_len(&StreamId::new("room-b")), 1);
        Ok(())
    }

    #[tokio::test]
    async fn clones_share_streams() -> Result<(), EventStoreError> {
        let store = InMemoryEventStore::new();
        let clone = store.clone();
        clone
            .append_events(StreamId::new("room-1"), Version::INITIAL, vec![event(1)])
            .await?;

        assert_eq!(store.stream_len(&StreamId::new("room-1")), 1);
        Ok(())
    }
}
