//! Events of a game room.
//!
//! Type names returned by [`Event::event_type`] are the persisted names and
//! never change. Payload fields use camelCase when rendered as JSON.

use crate::types::{BallotMeaning, Meaning, PlayerId, RoomId, Vote};
use chrono::SecondsFormat;
use fictionary_core::event::{Event, EventEnvelope};
use serde::{Deserialize, Serialize};

/// A room event stamped with its time and stream position
pub type RoomEventEnvelope = EventEnvelope<RoomEvent>;

/// Everything that can happen to a room
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all_fields = "camelCase")]
pub enum RoomEvent {
    /// A room was opened by its host
    RoomCreated {
        /// The new room
        room_id: RoomId,
        /// The host, also the first player
        host_id: PlayerId,
        /// Host display name
        host_name: String,
    },

    /// A player took a seat
    PlayerJoined {
        /// Target room
        room_id: RoomId,
        /// The new player
        player_id: PlayerId,
        /// Display name
        player_name: String,
    },

    /// The host started the game; round 1 begins with the host as parent
    GameStarted {
        /// Target room
        room_id: RoomId,
        /// The host who started it
        player_id: PlayerId,
    },

    /// The parent chose the word of the round
    ThemeInputted {
        /// Target room
        room_id: RoomId,
        /// The parent
        player_id: PlayerId,
        /// The word
        theme: String,
    },

    /// A meaning was submitted; carries the full list so far
    MeaningListUpdated {
        /// Target room
        room_id: RoomId,
        /// Every submission of the round, in submission order
        meanings: Vec<Meaning>,
    },

    /// Every player submitted; the ballot was shuffled
    VotingStarted {
        /// Target room
        room_id: RoomId,
        /// The ballot in shuffled order
        meanings: Vec<BallotMeaning>,
    },

    /// A vote was cast; carries the full list so far
    VoteListUpdated {
        /// Target room
        room_id: RoomId,
        /// Every vote of the round, in submission order
        votes: Vec<Vote>,
    },

    /// Every child voted; the round is closed
    RoundResultAnnounced {
        /// Target room
        room_id: RoomId,
    },

    /// Score adjustment for one vote
    ScoreUpdated {
        /// Target room
        room_id: RoomId,
        /// The voter
        player_id: PlayerId,
        /// The voter's stake
        bet_points: u8,
        /// Author of the meaning the voter chose
        meaning_submitted_player_id: PlayerId,
        /// Whether the voter chose the parent's meaning
        is_choosing_correct_meaning: bool,
        /// The parent of the round
        parent_player_id: PlayerId,
    },

    /// No child found the true meaning; every child pays the parent
    AllChildrenMissed {
        /// Target room
        room_id: RoomId,
        /// The parent of the round
        parent_player_id: PlayerId,
        /// Points each child pays
        gained_points: i64,
    },

    /// The next round begins with a new parent
    NextRoundStarted {
        /// Target room
        room_id: RoomId,
        /// 1-based number of the new round
        next_round: u32,
        /// Parent of the new round
        next_parent_id: PlayerId,
    },

    /// The last round was played
    GameEnded {
        /// Target room
        room_id: RoomId,
    },
}

impl RoomEvent {
    /// The room this event belongs to
    #[must_use]
    pub const fn room_id(&self) -> &RoomId {
        match self {
            Self::RoomCreated { room_id, .. }
            | Self::PlayerJoined { room_id, .. }
            | Self::GameStarted { room_id, .. }
            | Self::ThemeInputted { room_id, .. }
            | Self::MeaningListUpdated { room_id, .. }
            | Self::VotingStarted { room_id, .. }
            | Self::VoteListUpdated { room_id, .. }
            | Self::RoundResultAnnounced { room_id }
            | Self::ScoreUpdated { room_id, .. }
            | Self::AllChildrenMissed { room_id, .. }
            | Self::NextRoundStarted { room_id, .. }
            | Self::GameEnded { room_id } => room_id,
        }
    }
}

impl Event for RoomEvent {
    fn event_type(&self) -> &'static str {
        match self {
            Self::RoomCreated { .. } => "RoomCreated",
            Self::PlayerJoined { .. } => "PlayerJoined",
            Self::GameStarted { .. } => "GameStarted",
            Self::ThemeInputted { .. } => "ThemeInputted",
            Self::MeaningListUpdated { .. } => "MeaningListUpdated",
            Self::VotingStarted { .. } => "VotingStarted",
            Self::VoteListUpdated { .. } => "VoteListUpdated",
            Self::RoundResultAnnounced { .. } => "RoundResultAnnounced",
            Self::ScoreUpdated { .. } => "ScoreUpdated",
            Self::AllChildrenMissed { .. } => "AllChildrenMissed",
            Self::NextRoundStarted { .. } => "NextRoundStarted",
            Self::GameEnded { .. } => "GameEnded",
        }
    }
}

/// Render an event as the JSON record
/// `{ "type", "payload", "occurredAt", "version" }`.
///
/// # Errors
///
/// Returns the `serde_json` error if the payload cannot be rendered.
pub fn to_json_record(envelope: &RoomEventEnvelope) -> Result<serde_json::Value, serde_json::Error> {
    // Externally tagged: `{ "<type>": { ...payload } }`
    let payload = match serde_json::to_value(&envelope.event)? {
        serde_json::Value::Object(mut tagged) => tagged
            .remove(envelope.event_type())
            .unwrap_or(serde_json::Value::Null),
        other => other,
    };

    Ok(serde_json::json!({
        "type": envelope.event_type(),
        "payload": payload,
        "occurredAt": envelope.occurred_at.to_rfc3339_opts(SecondsFormat::Millis, true),
        "version": envelope.version.value(),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use fictionary_core::stream::Version;

    #[test]
    #[allow(clippy::unwrap_used)] // Test code
    fn json_record_has_stable_shape() {
        let envelope = EventEnvelope::new(
            RoomEvent::ScoreUpdated {
                room_id: RoomId::new("room-1"),
                player_id: PlayerId::new("p2"),
                bet_points: 2,
                meaning_submitted_player_id: PlayerId::new("p3"),
                is_choosing_correct_meaning: false,
                parent_player_id: PlayerId::new("p1"),
            },
            Utc.with_ymd_and_hms(2025, 1, 1, 12, 0, 0).unwrap(),
            Version::new(14),
        );

        let record = to_json_record(&envelope).unwrap();
        assert_eq!(record["type"], "ScoreUpdated");
        assert_eq!(record["version"], 14);
        assert_eq!(record["occurredAt"], "2025-01-01T12:00:00.000Z");
        assert_eq!(record["payload"]["meaningSubmittedPlayerId"], "p3");
        assert_eq!(record["payload"]["isChoosingCorrectMeaning"], false);
        assert_eq!(record["payload"]["betPoints"], 2);
    }

    #[test]
    #[allow(clippy::unwrap_used)] // Test code
    fn bincode_payload_survives_storage() {
        let envelope = EventEnvelope::new(
            RoomEvent::VotingStarted {
                room_id: RoomId::new("room-1"),
                meanings: vec![BallotMeaning {
                    player_id: PlayerId::new("p1"),
                    text: "a small boat".to_string(),
                    choice_index: 0,
                }],
            },
            Utc::now(),
            Version::new(9),
        );

        let stored = envelope.to_serialized().unwrap();
        assert_eq!(stored.event_type, "VotingStarted");
        assert_eq!(RoomEventEnvelope::from_serialized(&stored).unwrap(), envelope);
    }

    #[test]
    fn every_event_knows_its_room() {
        let event = RoomEvent::GameEnded {
            room_id: RoomId::new("room-7"),
        };
        assert_eq!(event.room_id().as_str(), "room-7");
        assert_eq!(event.event_type(), "GameEnded");
    }
}
