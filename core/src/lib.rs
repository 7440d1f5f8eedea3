//! # Fictionary Core
//!
//! Event sourcing primitives shared by every Fictionary crate.
//!
//! A game room is an event-sourced aggregate: commands are validated by a pure
//! decider that emits events, events are folded by a pure evolver into the
//! current state, and the events themselves are the only thing ever persisted.
//!
//! ## Core Concepts
//!
//! - **Stream**: The ordered, append-only sequence of events of one aggregate
//!   ([`stream::StreamId`], [`stream::Version`])
//! - **Event**: An immutable fact, stored as a [`event::SerializedEvent`]
//! - **Event Store**: Append-only per-stream log with optimistic concurrency
//!   ([`event_store::EventStore`])
//! - **Aggregate**: The fold `(Option<State>, Event) → State`
//!   ([`aggregate::Aggregate`])
//! - **Environment**: Clock, id and seed sources injected into the
//!   application layer, so deciders and evolvers stay pure
//!
//! ## Example
//!
//! ```ignore
//! use fictionary_core::aggregate::Aggregate;
//!
//! struct Counter;
//!
//! impl Aggregate for Counter {
//!     const KIND: &'static str = "counter";
//!     type State = i64;
//!     type Event = CounterEvent;
//!     type Error = CounterError;
//!
//!     fn evolve(state: Option<i64>, event: &CounterEvent) -> Result<i64, CounterError> {
//!         match (state, event) {
//!             (None, CounterEvent::Created) => Ok(0),
//!             (Some(n), CounterEvent::Incremented) => Ok(n + 1),
//!             _ => Err(CounterError::OutOfOrder),
//!         }
//!     }
//! }
//! ```

// Re-export commonly used types
pub use chrono::{DateTime, Utc};
pub use serde::{Deserialize, Serialize};

pub mod event;
pub mod event_store;
pub mod stream;

/// Aggregate module - the fold that turns an event stream back into state
///
/// An aggregate never mutates in place: every event produces the next state
/// value, starting from `None` (no events yet). Applying an event that cannot
/// follow the current state is a corrupted stream, reported through
/// [`Aggregate::Error`](aggregate::Aggregate::Error).
pub mod aggregate {
    use crate::event::Event;
    use serde::{Serialize, de::DeserializeOwned};

    /// An event-sourced aggregate type.
    ///
    /// # Example
    ///
    /// ```ignore
    /// let mut state = None;
    /// for event in events {
    ///     state = Some(Room::evolve(state, &event)?);
    /// }
    /// ```
    pub trait Aggregate {
        /// Stream prefix for this aggregate type, e.g. `"room"`
        const KIND: &'static str;

        /// The state rebuilt by folding events
        type State: Clone + Send + Sync + 'static;

        /// The event type stored in this aggregate's streams
        type Event: Event + Serialize + DeserializeOwned + Clone;

        /// Error raised when an event cannot be applied to the prior state
        type Error: std::error::Error + Send + Sync + 'static;

        /// Apply one event to the prior state, producing the next state.
        ///
        /// # Errors
        ///
        /// Returns `Self::Error` when `event` cannot legally follow `state`.
        /// This signals stream corruption, never a validation failure.
        fn evolve(state: Option<Self::State>, event: &Self::Event)
        -> Result<Self::State, Self::Error>;
    }
}

/// Environment module - injected sources of time, identity and randomness
///
/// Deciders and evolvers never read the clock, generate ids, or draw random
/// numbers. The application layer does, through these traits, and passes the
/// results in as plain arguments.
pub mod environment {
    use chrono::{DateTime, Utc};

    /// Clock trait - abstracts time operations for testability
    ///
    /// # Examples
    ///
    /// ```
    /// use fictionary_core::environment::{Clock, SystemClock};
    ///
    /// let clock = SystemClock;
    /// let _now = clock.now();
    /// ```
    pub trait Clock: Send + Sync {
        /// Get the current time
        fn now(&self) -> DateTime<Utc>;
    }

    /// Production clock backed by the system time
    #[derive(Debug, Clone, Copy, Default)]
    pub struct SystemClock;

    impl Clock for SystemClock {
        fn now(&self) -> DateTime<Utc> {
            Utc::now()
        }
    }

    /// Generates opaque unique identifiers for rooms and players.
    pub trait IdGenerator: Send + Sync {
        /// Produce a fresh identifier
        fn next_id(&self) -> String;
    }

    /// Random v4 UUID identifiers
    #[derive(Debug, Clone, Copy, Default)]
    pub struct UuidIdGenerator;

    impl IdGenerator for UuidIdGenerator {
        fn next_id(&self) -> String {
            uuid::Uuid::new_v4().to_string()
        }
    }

    /// Supplies integer seeds for deterministic shuffles.
    pub trait SeedSource: Send + Sync {
        /// Produce the next seed
        fn next_seed(&self) -> u32;
    }

    /// Seeds drawn from the thread-local RNG
    #[derive(Debug, Clone, Copy, Default)]
    pub struct RandomSeedSource;

    impl SeedSource for RandomSeedSource {
        fn next_seed(&self) -> u32 {
            rand::random()
        }
    }

    /// Always returns the same seed, so every shuffle is reproducible
    #[derive(Debug, Clone, Copy)]
    pub struct FixedSeedSource(pub u32);

    impl SeedSource for FixedSeedSource {
        fn next_seed(&self) -> u32 {
            self.0
        }
    }
}
