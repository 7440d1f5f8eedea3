//! # Fictionary Room
//!
//! An event-sourced room for Fictionary, the party game where one player
//! (the *parent*) picks an obscure word, everyone writes a plausible
//! definition, and the *children* bet on which one is real.
//!
//! ## Architecture
//!
//! - [`decider`]: pure command validation, emitting versioned events
//! - [`evolver`]: pure fold of events into a [`types::Room`]
//! - [`repository`]: rooms stored as event streams with optimistic concurrency
//! - [`service`]: one use case per command over an injected environment
//! - [`view`]: the read model shown to players
//!
//! ## Example
//!
//! ```no_run
//! use fictionary_core::environment::{FixedSeedSource, SystemClock, UuidIdGenerator};
//! use fictionary_room::service::RoomService;
//! use fictionary_testing::InMemoryEventStore;
//! use std::sync::Arc;
//!
//! # async fn example() -> Result<(), fictionary_room::error::RoomError> {
//! let service = RoomService::new(
//!     Arc::new(InMemoryEventStore::new()),
//!     Arc::new(SystemClock),
//!     Arc::new(UuidIdGenerator),
//!     Arc::new(FixedSeedSource(1)),
//! );
//!
//! let (room, host_id) = service.create_room("Alice").await?;
//! let (_, bob) = service.join_room(room.id(), "Bob", None).await?;
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod decider;
pub mod error;
pub mod events;
pub mod evolver;
pub mod repository;
pub mod service;
pub mod shuffle;
pub mod types;
pub mod view;

#[cfg(test)]
mod test_fixtures;

pub use error::{DomainError, EvolveError, RoomError};
pub use events::{RoomEvent, RoomEventEnvelope};
pub use evolver::RoomAggregate;
pub use service::RoomService;
pub use types::{PlayerId, Room, RoomId, RoomPhase};
pub use view::RoomView;
