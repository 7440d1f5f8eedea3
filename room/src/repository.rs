//! Loading and saving rooms.

use crate::error::{DomainError, RoomError};
use crate::events::RoomEventEnvelope;
use crate::evolver::RoomAggregate;
use crate::types::{Room, RoomId};
use fictionary_core::event_store::EventStore;
use fictionary_runtime::{Loaded, Repository};
use std::sync::Arc;

/// Rooms persisted as event streams named `room-<id>`
#[derive(Clone)]
pub struct RoomRepository {
    inner: Repository<RoomAggregate>,
}

impl RoomRepository {
    /// Create a repository over `store`
    #[must_use]
    pub fn new(store: Arc<dyn EventStore>) -> Self {
        Self {
            inner: Repository::new(store),
        }
    }

    /// Rebuild a room and the version it is at.
    ///
    /// # Errors
    ///
    /// - `RoomError::Domain` "Room not found" if the room has no events
    /// - `RoomError::Fatal` if the stream cannot be read or folded
    pub async fn find_by_id(&self, room_id: &RoomId) -> Result<Loaded<Room>, RoomError> {
        self.inner
            .load(room_id.as_str())
            .await?
            .ok_or_else(|| DomainError::new("Room not found").into())
    }

    /// Append a decided batch.
    ///
    /// # Errors
    ///
    /// - `RoomError::Domain` if another command was saved to the room since
    ///   it was loaded
    /// - `RoomError::Fatal` if storage fails
    pub async fn save(&self, room_id: &RoomId, events: &[RoomEventEnvelope]) -> Result<(), RoomError> {
        self.inner.save(room_id.as_str(), events).await?;
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::expect_used)] // Test code
mod tests {
    use super::*;
    use crate::decider::{decide_create_room, decide_join_room};
    use crate::test_fixtures::{at, pid};
    use fictionary_core::stream::{StreamId, Version};
    use fictionary_testing::InMemoryEventStore;

    fn repository() -> (RoomRepository, InMemoryEventStore) {
        let store = InMemoryEventStore::new();
        (RoomRepository::new(Arc::new(store.clone())), store)
    }

    #[tokio::test]
    async fn unknown_room_is_not_found() {
        let (rooms, _) = repository();
        let error = rooms
            .find_by_id(&RoomId::new("nowhere"))
            .await
            .expect_err("no such room");
        assert_eq!(error.as_domain().map(DomainError::message), Some("Room not found"));
    }

    #[tokio::test]
    async fn saved_room_loads_at_its_version() {
        let (rooms, store) = repository();
        let room_id = RoomId::new("abc");
        let created = decide_create_room(&room_id, &pid("p1"), "Alice", at()).expect("create");
        rooms.save(&room_id, &created).await.expect("save");

        let loaded = rooms.find_by_id(&room_id).await.expect("load");
        assert_eq!(loaded.version, Version::new(1));
        assert_eq!(loaded.state.host_id(), &pid("p1"));
        assert_eq!(store.stream_len(&StreamId::new("room-abc")), 1);
    }

    #[tokio::test]
    async fn stale_save_is_a_domain_error() {
        let (rooms, _) = repository();
        let room_id = RoomId::new("abc");
        let created = decide_create_room(&room_id, &pid("p1"), "Alice", at()).expect("create");
        rooms.save(&room_id, &created).await.expect("save");
        let Loaded { state, version } = rooms.find_by_id(&room_id).await.expect("load");

        let bob = decide_join_room(&state, &pid("p2"), "Bob", version, at()).expect("join");
        let carol = decide_join_room(&state, &pid("p3"), "Carol", version, at()).expect("join");
        rooms.save(&room_id, &bob).await.expect("first writer wins");

        let error = rooms.save(&room_id, &carol).await.expect_err("second writer loses");
        assert!(!error.is_fatal());
        assert!(error.to_string().contains("Concurrency conflict"));

        let reloaded = rooms.find_by_id(&room_id).await.expect("load");
        assert_eq!(reloaded.state.players().len(), 2);
    }
}
