//! # Fictionary Testing
//!
//! Testing utilities for event-sourced aggregates.
//!
//! This crate provides:
//! - [`InMemoryEventStore`]: a `HashMap` backed event store
//! - Deterministic implementations of the environment traits
//!   ([`FixedClock`], [`SequentialIdGenerator`])
//! - [`DeciderTest`]: Given-When-Then harness for deciders
//!
//! ## Example
//!
//! ```ignore
//! use fictionary_testing::{InMemoryEventStore, test_clock};
//!
//! #[tokio::test]
//! async fn test_room_flow() {
//!     let store = Arc::new(InMemoryEventStore::new());
//!     let service = RoomService::new(store, Arc::new(test_clock()), ids, seeds);
//!
//!     let (room, host_id) = service.create_room("Alice").await?;
//!     assert_eq!(room.host_id(), &host_id);
//! }
//! ```

use chrono::{DateTime, Utc};
use fictionary_core::environment::{Clock, IdGenerator};

mod event_store_mocks;

/// Mock implementations of the environment traits and the event store.
pub mod mocks {
    use super::{Clock, DateTime, IdGenerator, Utc};
    use std::sync::atomic::{AtomicU64, Ordering};

    pub use crate::event_store_mocks::InMemoryEventStore;

    /// Fixed clock for deterministic tests
    ///
    /// Always returns the same time, making tests reproducible.
    ///
    /// # Example
    ///
    /// ```
    /// use fictionary_testing::mocks::FixedClock;
    /// use fictionary_core::environment::Clock;
    /// use chrono::Utc;
    ///
    /// let clock = FixedClock::new(Utc::now());
    /// let time1 = clock.now();
    /// let time2 = clock.now();
    /// assert_eq!(time1, time2); // Always the same!
    /// ```
    #[derive(Debug, Clone)]
    pub struct FixedClock {
        time: DateTime<Utc>,
    }

    impl FixedClock {
        /// Create a new fixed clock with the given time
        #[must_use]
        pub const fn new(time: DateTime<Utc>) -> Self {
            Self { time }
        }
    }

    impl Clock for FixedClock {
        fn now(&self) -> DateTime<Utc> {
            self.time
        }
    }

    /// Create a default fixed clock for tests (2025-01-01 00:00:00 UTC)
    ///
    /// # Panics
    ///
    /// This function will panic if the hardcoded timestamp fails to parse,
    /// which should never happen in practice.
    #[must_use]
    #[allow(clippy::expect_used)]
    pub fn test_clock() -> FixedClock {
        FixedClock::new(
            DateTime::parse_from_rfc3339("2025-01-01T00:00:00Z")
                .expect("hardcoded timestamp should always parse")
                .with_timezone(&Utc),
        )
    }

    /// Predictable ids: `"{prefix}-1"`, `"{prefix}-2"`, ...
    ///
    /// # Example
    ///
    /// ```
    /// use fictionary_testing::mocks::SequentialIdGenerator;
    /// use fictionary_core::environment::IdGenerator;
    ///
    /// let ids = SequentialIdGenerator::new("player");
    /// assert_eq!(ids.next_id(), "player-1");
    /// assert_eq!(ids.next_id(), "player-2");
    /// ```
    #[derive(Debug)]
    pub struct SequentialIdGenerator {
        prefix: String,
        counter: AtomicU64,
    }

    impl SequentialIdGenerator {
        /// Create a generator whose first id is `"{prefix}-1"`
        #[must_use]
        pub fn new(prefix: impl Into<String>) -> Self {
            Self {
                prefix: prefix.into(),
                counter: AtomicU64::new(0),
            }
        }
    }

    impl IdGenerator for SequentialIdGenerator {
        fn next_id(&self) -> String {
            let n = self.counter.fetch_add(1, Ordering::SeqCst) + 1;
            format!("{}-{n}", self.prefix)
        }
    }
}

// Re-export commonly used items
pub use decider_test::{DeciderTest, assertions};
pub use mocks::{FixedClock, InMemoryEventStore, SequentialIdGenerator, test_clock};
