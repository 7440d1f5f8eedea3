//! Command decisions for a game room.
//!
//! Every function here is pure: it takes the current room, the acting
//! player, the command arguments, the room's current version, and the time
//! to stamp on the events. It either refuses with a [`DomainError`] and emits
//! nothing, or returns the events to append, versioned consecutively after
//! `expected_version`. Randomness enters only as the explicit `seed` of
//! [`decide_input_meaning`].

use crate::error::DomainError;
use crate::events::{RoomEvent, RoomEventEnvelope};
use crate::shuffle::seeded_shuffle;
use crate::types::{
    ALL_CHILDREN_MISSED_POINTS, BallotMeaning, MAX_BET_POINTS, MAX_PLAYERS, MIN_BET_POINTS,
    MIN_PLAYERS_TO_START, Meaning, PlayerId, Room, RoomId, Vote,
};
use chrono::{DateTime, Utc};
use fictionary_core::event::EventEnvelope;
use fictionary_core::stream::Version;

/// Result of a decision: the events to append, or the refusal
pub type Decision = Result<Vec<RoomEventEnvelope>, DomainError>;

/// Stamps events with consecutive versions and a shared timestamp
struct Recorder {
    next: Version,
    occurred_at: DateTime<Utc>,
    events: Vec<RoomEventEnvelope>,
}

impl Recorder {
    fn after(expected_version: Version, occurred_at: DateTime<Utc>) -> Self {
        Self {
            next: expected_version.next(),
            occurred_at,
            events: Vec::new(),
        }
    }

    fn record(&mut self, event: RoomEvent) {
        self.events
            .push(EventEnvelope::new(event, self.occurred_at, self.next));
        self.next = self.next.next();
    }

    fn finish(self) -> Decision {
        Ok(self.events)
    }
}

fn refuse(message: &str) -> Decision {
    Err(DomainError::new(message))
}

/// Open a new room with `host_id` as its first player.
///
/// Emits `RoomCreated` at version 1.
///
/// # Errors
///
/// "Player name is required" if `player_name` is empty.
pub fn decide_create_room(
    room_id: &RoomId,
    host_id: &PlayerId,
    player_name: &str,
    occurred_at: DateTime<Utc>,
) -> Decision {
    if player_name.is_empty() {
        return refuse("Player name is required");
    }

    let mut recorder = Recorder::after(Version::INITIAL, occurred_at);
    recorder.record(RoomEvent::RoomCreated {
        room_id: room_id.clone(),
        host_id: host_id.clone(),
        host_name: player_name.to_string(),
    });
    recorder.finish()
}

/// Seat `player_id` in a waiting room.
///
/// A player who is already seated succeeds with no events, whatever the
/// phase.
///
/// # Errors
///
/// - "Room is not in waiting phase"
/// - "Room is full" at [`MAX_PLAYERS`] players
/// - "Player name is required"
pub fn decide_join_room(
    room: &Room,
    player_id: &PlayerId,
    player_name: &str,
    expected_version: Version,
    occurred_at: DateTime<Utc>,
) -> Decision {
    if room.has_player(player_id) {
        return Ok(Vec::new());
    }
    let Room::Waiting(base) = room else {
        return refuse("Room is not in waiting phase");
    };
    if base.players.len() >= MAX_PLAYERS {
        return refuse("Room is full");
    }
    if player_name.is_empty() {
        return refuse("Player name is required");
    }

    let mut recorder = Recorder::after(expected_version, occurred_at);
    recorder.record(RoomEvent::PlayerJoined {
        room_id: base.id.clone(),
        player_id: player_id.clone(),
        player_name: player_name.to_string(),
    });
    recorder.finish()
}

/// Start the game; only the host may, and only with enough players.
///
/// # Errors
///
/// - "Room is not in waiting phase"
/// - "Only host can start the game"
/// - "At least 3 players are required to start the game"
pub fn decide_start_game(
    room: &Room,
    player_id: &PlayerId,
    expected_version: Version,
    occurred_at: DateTime<Utc>,
) -> Decision {
    let Room::Waiting(base) = room else {
        return refuse("Room is not in waiting phase");
    };
    if &base.host_id != player_id {
        return refuse("Only host can start the game");
    }
    if base.players.len() < MIN_PLAYERS_TO_START {
        return refuse("At least 3 players are required to start the game");
    }

    let mut recorder = Recorder::after(expected_version, occurred_at);
    recorder.record(RoomEvent::GameStarted {
        room_id: base.id.clone(),
        player_id: player_id.clone(),
    });
    recorder.finish()
}

/// The parent picks the word of the round.
///
/// # Errors
///
/// - "Room is not in theme input phase"
/// - "Only parent can input theme"
/// - "Theme is required"
pub fn decide_input_theme(
    room: &Room,
    player_id: &PlayerId,
    theme: &str,
    expected_version: Version,
    occurred_at: DateTime<Utc>,
) -> Decision {
    let Room::ThemeInput(round) = room else {
        return refuse("Room is not in theme input phase");
    };
    if &round.parent_player_id != player_id {
        return refuse("Only parent can input theme");
    }
    if theme.is_empty() {
        return refuse("Theme is required");
    }

    let mut recorder = Recorder::after(expected_version, occurred_at);
    recorder.record(RoomEvent::ThemeInputted {
        room_id: round.base.id.clone(),
        player_id: player_id.clone(),
        theme: theme.to_string(),
    });
    recorder.finish()
}

/// Submit a meaning for the current word.
///
/// When this is the last missing meaning, a `VotingStarted` follows the
/// `MeaningListUpdated`, carrying the ballot shuffled with `seed`.
///
/// # Errors
///
/// - "Room is not in meaning input phase"
/// - "Player is not in the room"
/// - "Player has already submitted a meaning"
/// - "Meaning is required"
pub fn decide_input_meaning(
    room: &Room,
    player_id: &PlayerId,
    meaning: &str,
    expected_version: Version,
    seed: u32,
    occurred_at: DateTime<Utc>,
) -> Decision {
    let Room::MeaningInput(round) = room else {
        return refuse("Room is not in meaning input phase");
    };
    if !round.base.has_player(player_id) {
        return refuse("Player is not in the room");
    }
    if round.meanings.iter().any(|m| &m.player_id == player_id) {
        return refuse("Player has already submitted a meaning");
    }
    if meaning.is_empty() {
        return refuse("Meaning is required");
    }

    let mut meanings = round.meanings.clone();
    meanings.push(Meaning {
        player_id: player_id.clone(),
        text: meaning.to_string(),
    });
    let complete = meanings.len() == round.base.players.len();

    let mut recorder = Recorder::after(expected_version, occurred_at);
    recorder.record(RoomEvent::MeaningListUpdated {
        room_id: round.base.id.clone(),
        meanings: meanings.clone(),
    });

    if complete {
        let ballot = seeded_shuffle(&meanings, seed)
            .into_iter()
            .zip(0_u32..)
            .map(|(meaning, choice_index)| BallotMeaning {
                player_id: meaning.player_id,
                text: meaning.text,
                choice_index,
            })
            .collect();
        recorder.record(RoomEvent::VotingStarted {
            room_id: round.base.id.clone(),
            meanings: ballot,
        });
    }

    recorder.finish()
}

/// Cast a vote on the ballot.
///
/// When this is the last missing vote the round closes: the decision also
/// emits `RoundResultAnnounced`, one `ScoreUpdated` per vote in submission
/// order, and `AllChildrenMissed` if no vote found the parent's meaning.
///
/// # Errors
///
/// - "Room is not in voting phase"
/// - "Parent player cannot vote"
/// - "Player is not in the room"
/// - "Player has already voted"
/// - "Invalid choice index"
/// - "Cannot vote for your own meaning"
/// - "Bet points must be between 1 and 3"
pub fn decide_vote(
    room: &Room,
    player_id: &PlayerId,
    choice_index: u32,
    bet_points: u8,
    expected_version: Version,
    occurred_at: DateTime<Utc>,
) -> Decision {
    let Room::Voting(round) = room else {
        return refuse("Room is not in voting phase");
    };
    if &round.parent_player_id == player_id {
        return refuse("Parent player cannot vote");
    }
    if !round.base.has_player(player_id) {
        return refuse("Player is not in the room");
    }
    if round.votes.iter().any(|v| &v.player_id == player_id) {
        return refuse("Player has already voted");
    }
    let Some(chosen) = round.meaning_at(choice_index) else {
        return refuse("Invalid choice index");
    };
    if &chosen.player_id == player_id {
        return refuse("Cannot vote for your own meaning");
    }
    if !(MIN_BET_POINTS..=MAX_BET_POINTS).contains(&bet_points) {
        return refuse("Bet points must be between 1 and 3");
    }

    let mut votes = round.votes.clone();
    votes.push(Vote {
        player_id: player_id.clone(),
        choice_index,
        bet_points,
    });
    let room_id = &round.base.id;

    let mut recorder = Recorder::after(expected_version, occurred_at);
    recorder.record(RoomEvent::VoteListUpdated {
        room_id: room_id.clone(),
        votes: votes.clone(),
    });

    if votes.len() != round.children().count() {
        return recorder.finish();
    }

    recorder.record(RoomEvent::RoundResultAnnounced {
        room_id: room_id.clone(),
    });

    let mut correct_votes = 0_usize;
    for vote in &votes {
        let Some(meaning) = round.meaning_at(vote.choice_index) else {
            return Err(DomainError::new(format!(
                "Meaning not found for choice index: {}",
                vote.choice_index
            )));
        };
        let is_correct = meaning.player_id == round.parent_player_id;
        if is_correct {
            correct_votes += 1;
        }
        recorder.record(RoomEvent::ScoreUpdated {
            room_id: room_id.clone(),
            player_id: vote.player_id.clone(),
            bet_points: vote.bet_points,
            meaning_submitted_player_id: meaning.player_id.clone(),
            is_choosing_correct_meaning: is_correct,
            parent_player_id: round.parent_player_id.clone(),
        });
    }

    if correct_votes == 0 {
        recorder.record(RoomEvent::AllChildrenMissed {
            room_id: room_id.clone(),
            parent_player_id: round.parent_player_id.clone(),
            gained_points: ALL_CHILDREN_MISSED_POINTS,
        });
    }

    recorder.finish()
}

/// Move on from a round result; only the host may.
///
/// A game has as many rounds as players. While rounds remain, the next
/// parent is the player seated after the current parent (wrapping);
/// otherwise the game ends.
///
/// # Errors
///
/// - "Room is not in round result phase"
/// - "Only host can start the next round"
pub fn decide_next_round(
    room: &Room,
    player_id: &PlayerId,
    expected_version: Version,
    occurred_at: DateTime<Utc>,
) -> Decision {
    let Room::RoundResult(round) = room else {
        return refuse("Room is not in round result phase");
    };
    if &round.base.host_id != player_id {
        return refuse("Only host can start the next round");
    }

    let players = &round.base.players;
    let total_rounds = u32::try_from(players.len()).unwrap_or(u32::MAX);
    let room_id = round.base.id.clone();

    let mut recorder = Recorder::after(expected_version, occurred_at);
    if round.round < total_rounds {
        let Some(parent_seat) = players.iter().position(|p| p.id == round.parent_player_id) else {
            return refuse("Parent player is not in the room");
        };
        let next_parent = &players[(parent_seat + 1) % players.len()];
        recorder.record(RoomEvent::NextRoundStarted {
            room_id,
            next_round: round.round + 1,
            next_parent_id: next_parent.id.clone(),
        });
    } else {
        recorder.record(RoomEvent::GameEnded { room_id });
    }
    recorder.finish()
}
