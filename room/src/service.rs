//! Application service: one method per player command.
//!
//! Each command loads the room, asks the decider, folds the decided events
//! onto the loaded room and saves them. Time, identifiers and shuffle seeds
//! come from the injected environment; the decider and evolver never see
//! anything else.

use crate::decider::{
    Decision, decide_create_room, decide_input_meaning, decide_input_theme, decide_join_room,
    decide_next_round, decide_start_game, decide_vote,
};
use crate::error::{DomainError, EvolveError, RoomError};
use crate::evolver::{RoomAggregate, evolve};
use crate::repository::RoomRepository;
use crate::types::{PlayerId, Room, RoomId};
use fictionary_core::environment::{Clock, IdGenerator, SeedSource};
use fictionary_core::event_store::EventStore;
use fictionary_core::stream::{StreamId, Version};
use fictionary_runtime::metrics::CommandMetrics;
use fictionary_runtime::{Loaded, Repository, RepositoryError};
use std::sync::Arc;

/// Runs player commands against stored rooms
#[derive(Clone)]
pub struct RoomService {
    rooms: RoomRepository,
    clock: Arc<dyn Clock>,
    ids: Arc<dyn IdGenerator>,
    seeds: Arc<dyn SeedSource>,
}

impl RoomService {
    /// Create a service over `store` with the given environment
    #[must_use]
    pub fn new(
        store: Arc<dyn EventStore>,
        clock: Arc<dyn Clock>,
        ids: Arc<dyn IdGenerator>,
        seeds: Arc<dyn SeedSource>,
    ) -> Self {
        Self {
            rooms: RoomRepository::new(store),
            clock,
            ids,
            seeds,
        }
    }

    /// Open a room hosted by a new player named `player_name`.
    ///
    /// Returns the room and the host's generated id.
    ///
    /// # Errors
    ///
    /// - `RoomError::Domain` "Player name is required"
    /// - `RoomError::Fatal` if storage fails
    #[tracing::instrument(skip(self))]
    pub async fn create_room(&self, player_name: &str) -> Result<(Room, PlayerId), RoomError> {
        let room_id = RoomId::new(self.ids.next_id());
        let host_id = PlayerId::new(self.ids.next_id());

        let decision = decide_create_room(&room_id, &host_id, player_name, self.clock.now());
        let room = self
            .commit("create_room", &room_id, None, decision)
            .await?;
        tracing::info!(room_id = %room_id, host_id = %host_id, "Room created");
        Ok((room, host_id))
    }

    /// Seat a player.
    ///
    /// Without `player_id` a new player is generated. With one, the player
    /// must already be seated and the room is returned unchanged.
    ///
    /// # Errors
    ///
    /// - `RoomError::Domain` "Room not found", "Player not found in room",
    ///   or any refusal of the join decision
    /// - `RoomError::Fatal` if storage fails
    #[tracing::instrument(skip(self))]
    pub async fn join_room(
        &self,
        room_id: &RoomId,
        player_name: &str,
        player_id: Option<&PlayerId>,
    ) -> Result<(Room, PlayerId), RoomError> {
        let loaded = self.rooms.find_by_id(room_id).await?;

        if let Some(player_id) = player_id {
            if !loaded.state.has_player(player_id) {
                CommandMetrics::record_rejected("join_room");
                tracing::warn!(player_id = %player_id, "Rejoin with unknown player");
                return Err(DomainError::new("Player not found in room").into());
            }
            tracing::debug!(player_id = %player_id, "Player rejoined");
            return Ok((loaded.state, player_id.clone()));
        }

        let player_id = PlayerId::new(self.ids.next_id());
        let decision = decide_join_room(
            &loaded.state,
            &player_id,
            player_name,
            loaded.version,
            self.clock.now(),
        );
        let room = self
            .commit("join_room", room_id, Some(loaded.state), decision)
            .await?;
        tracing::info!(room_id = %room_id, player_id = %player_id, "Player joined");
        Ok((room, player_id))
    }

    /// The host starts the game.
    ///
    /// # Errors
    ///
    /// `RoomError::Domain` for a missing room or a refused start;
    /// `RoomError::Fatal` if storage fails.
    #[tracing::instrument(skip(self))]
    pub async fn start_game(&self, room_id: &RoomId, player_id: &PlayerId) -> Result<Room, RoomError> {
        let Loaded { state, version } = self.rooms.find_by_id(room_id).await?;
        let decision = decide_start_game(&state, player_id, version, self.clock.now());
        self.commit("start_game", room_id, Some(state), decision).await
    }

    /// The parent sets the word of the round.
    ///
    /// # Errors
    ///
    /// `RoomError::Domain` for a missing room or a refused theme;
    /// `RoomError::Fatal` if storage fails.
    #[tracing::instrument(skip(self))]
    pub async fn input_theme(
        &self,
        room_id: &RoomId,
        player_id: &PlayerId,
        theme: &str,
    ) -> Result<Room, RoomError> {
        let Loaded { state, version } = self.rooms.find_by_id(room_id).await?;
        let decision = decide_input_theme(&state, player_id, theme, version, self.clock.now());
        self.commit("input_theme", room_id, Some(state), decision).await
    }

    /// A player submits a meaning. The last submission opens the vote.
    ///
    /// # Errors
    ///
    /// `RoomError::Domain` for a missing room or a refused meaning;
    /// `RoomError::Fatal` if storage fails.
    #[tracing::instrument(skip(self, meaning))]
    pub async fn input_meaning(
        &self,
        room_id: &RoomId,
        player_id: &PlayerId,
        meaning: &str,
    ) -> Result<Room, RoomError> {
        let Loaded { state, version } = self.rooms.find_by_id(room_id).await?;
        let seed = self.seeds.next_seed();
        let decision = decide_input_meaning(&state, player_id, meaning, version, seed, self.clock.now());
        self.commit("input_meaning", room_id, Some(state), decision).await
    }

    /// A child votes. The last vote scores the round.
    ///
    /// # Errors
    ///
    /// `RoomError::Domain` for a missing room or a refused vote;
    /// `RoomError::Fatal` if storage fails.
    #[tracing::instrument(skip(self))]
    pub async fn vote(
        &self,
        room_id: &RoomId,
        player_id: &PlayerId,
        choice_index: u32,
        bet_points: u8,
    ) -> Result<Room, RoomError> {
        let Loaded { state, version } = self.rooms.find_by_id(room_id).await?;
        let decision = decide_vote(&state, player_id, choice_index, bet_points, version, self.clock.now());
        self.commit("vote", room_id, Some(state), decision).await
    }

    /// The host moves on to the next round, or ends the game.
    ///
    /// # Errors
    ///
    /// `RoomError::Domain` for a missing room or a refused request;
    /// `RoomError::Fatal` if storage fails.
    #[tracing::instrument(skip(self))]
    pub async fn next_round(&self, room_id: &RoomId, player_id: &PlayerId) -> Result<Room, RoomError> {
        let Loaded { state, version } = self.rooms.find_by_id(room_id).await?;
        let decision = decide_next_round(&state, player_id, version, self.clock.now());
        self.commit("next_round", room_id, Some(state), decision).await
    }

    /// Fold an accepted decision onto `room` and save it.
    async fn commit(
        &self,
        command: &'static str,
        room_id: &RoomId,
        room: Option<Room>,
        decision: Decision,
    ) -> Result<Room, RoomError> {
        let events = decision.inspect_err(|error| {
            CommandMetrics::record_rejected(command);
            tracing::warn!(command, reason = %error, "Command refused");
        })?;

        let mut state = room;
        for envelope in &events {
            state = Some(evolve(state, &envelope.event).map_err(|source| corrupted(room_id, source))?);
        }
        let room = state.ok_or_else(|| {
            corrupted(
                room_id,
                EvolveError::NoRoom {
                    event_type: "RoomCreated",
                },
            )
        })?;

        self.rooms.save(room_id, &events).await?;
        CommandMetrics::record_accepted(command);
        tracing::debug!(
            command,
            events = events.len(),
            version = %events.last().map_or(Version::INITIAL, |e| e.version),
            "Command accepted"
        );
        Ok(room)
    }
}

fn corrupted(room_id: &RoomId, source: EvolveError) -> RoomError {
    let stream_id: StreamId = Repository::<RoomAggregate>::stream_id(room_id.as_str());
    tracing::error!(stream_id = %stream_id, error = %source, "Decided events do not fold");
    RoomError::Fatal(RepositoryError::Corrupted { stream_id, source })
}

