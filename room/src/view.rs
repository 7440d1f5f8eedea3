//! What a player is shown of a room.
//!
//! A [`RoomView`] hides what players must not see yet: ballot authors stay
//! hidden until the round result, and submissions are reduced to a
//! `hasSubmitted` / `hasVoted` flag per player.

use crate::types::{PlayerId, Room, RoomId};
use serde::Serialize;

/// A player as shown to everyone
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerView {
    /// Player identifier
    pub id: PlayerId,
    /// Display name
    pub name: String,
    /// Current score
    pub score: i64,
    /// Whether the player submitted a meaning, during meaning input only
    #[serde(skip_serializing_if = "Option::is_none")]
    pub has_submitted: Option<bool>,
    /// Whether the player voted, during voting only
    #[serde(skip_serializing_if = "Option::is_none")]
    pub has_voted: Option<bool>,
}

/// A ballot entry without its author
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BallotView {
    /// Ballot position
    pub choice_index: u32,
    /// The definition text
    pub text: String,
}

/// A ballot entry after the round, with its author
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RevealedMeaningView {
    /// Ballot position
    pub choice_index: u32,
    /// The definition text
    pub text: String,
    /// Who wrote it
    pub author_id: PlayerId,
}

/// A vote after the round
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VoteView {
    /// Who voted
    pub voter_id: PlayerId,
    /// Ballot position chosen
    pub choice_index: u32,
    /// Stake
    pub bet_points: u8,
}

/// Phase-specific part of a [`RoomView`]
#[allow(missing_docs)] // Field names match `Room`
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "phase", rename_all = "snake_case", rename_all_fields = "camelCase")]
pub enum PhaseView {
    Waiting,
    ThemeInput {
        round: u32,
        parent_player_id: PlayerId,
    },
    MeaningInput {
        round: u32,
        parent_player_id: PlayerId,
        theme: String,
    },
    Voting {
        round: u32,
        parent_player_id: PlayerId,
        theme: String,
        meanings: Vec<BallotView>,
    },
    RoundResult {
        round: u32,
        parent_player_id: PlayerId,
        theme: String,
        meanings: Vec<RevealedMeaningView>,
        votes: Vec<VoteView>,
    },
    FinalResult {
        winner_ids: Vec<PlayerId>,
    },
}

/// A room as rendered to players
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomView {
    /// Room identifier
    pub room_id: RoomId,
    /// The host
    pub host_id: PlayerId,
    /// Players in join order
    pub players: Vec<PlayerView>,
    /// Phase and its data
    #[serde(flatten)]
    pub phase: PhaseView,
}

impl RoomView {
    /// Render `room` for players
    #[must_use]
    pub fn from_room(room: &Room) -> Self {
        let players = room
            .players()
            .iter()
            .map(|player| PlayerView {
                id: player.id.clone(),
                name: player.name.clone(),
                score: player.score,
                has_submitted: match room {
                    Room::MeaningInput(round) => {
                        Some(round.meanings.iter().any(|m| m.player_id == player.id))
                    },
                    _ => None,
                },
                has_voted: match room {
                    Room::Voting(round) => Some(round.votes.iter().any(|v| v.player_id == player.id)),
                    _ => None,
                },
            })
            .collect();

        let phase = match room {
            Room::Waiting(_) => PhaseView::Waiting,
            Room::ThemeInput(round) => PhaseView::ThemeInput {
                round: round.round,
                parent_player_id: round.parent_player_id.clone(),
            },
            Room::MeaningInput(round) => PhaseView::MeaningInput {
                round: round.round,
                parent_player_id: round.parent_player_id.clone(),
                theme: round.theme.clone(),
            },
            Room::Voting(round) => PhaseView::Voting {
                round: round.round,
                parent_player_id: round.parent_player_id.clone(),
                theme: round.theme.clone(),
                meanings: round
                    .meanings
                    .iter()
                    .map(|m| BallotView {
                        choice_index: m.choice_index,
                        text: m.text.clone(),
                    })
                    .collect(),
            },
            Room::RoundResult(round) => PhaseView::RoundResult {
                round: round.round,
                parent_player_id: round.parent_player_id.clone(),
                theme: round.theme.clone(),
                meanings: round
                    .meanings
                    .iter()
                    .map(|m| RevealedMeaningView {
                        choice_index: m.choice_index,
                        text: m.text.clone(),
                        author_id: m.player_id.clone(),
                    })
                    .collect(),
                votes: round
                    .votes
                    .iter()
                    .map(|v| VoteView {
                        voter_id: v.player_id.clone(),
                        choice_index: v.choice_index,
                        bet_points: v.bet_points,
                    })
                    .collect(),
            },
            Room::FinalResult(_) => PhaseView::FinalResult {
                winner_ids: winners(room),
            },
        };

        Self {
            room_id: room.id().clone(),
            host_id: room.host_id().clone(),
            players,
            phase,
        }
    }
}

/// Players sharing the highest score, in join order
#[must_use]
pub fn winners(room: &Room) -> Vec<PlayerId> {
    let Some(best) = room.players().iter().map(|p| p.score).max() else {
        return Vec::new();
    };
    room.players()
        .iter()
        .filter(|p| p.score == best)
        .map(|p| p.id.clone())
        .collect()
}
