//! Domain types for a Fictionary game room.
//!
//! A room moves through six phases. Each phase is its own variant of [`Room`]
//! carrying exactly the fields that exist in that phase, so a round number
//! cannot be read from a room that is still waiting for players, and votes
//! cannot exist before meanings were shuffled.

use serde::{Deserialize, Serialize};
use std::fmt;

// ============================================================================
// Game Constants
// ============================================================================

/// Score every player starts with
pub const INITIAL_PLAYER_SCORE: i64 = 10;

/// Maximum number of players in a room
pub const MAX_PLAYERS: usize = 8;

/// Minimum number of players needed to start a game
pub const MIN_PLAYERS_TO_START: usize = 3;

/// Smallest stake a voter may bet
pub const MIN_BET_POINTS: u8 = 1;

/// Largest stake a voter may bet
pub const MAX_BET_POINTS: u8 = 3;

/// Points per child moved to the parent when nobody found the true meaning
pub const ALL_CHILDREN_MISSED_POINTS: i64 = 1;

// ============================================================================
// Identifiers
// ============================================================================

/// Unique identifier for a room
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RoomId(String);

impl RoomId {
    /// Wrap an identifier
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Get the identifier as a string slice
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RoomId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for RoomId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

/// Unique identifier for a player
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlayerId(String);

impl PlayerId {
    /// Wrap an identifier
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Get the identifier as a string slice
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for PlayerId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

// ============================================================================
// Players and Round Submissions
// ============================================================================

/// A seated player. Scores may go negative.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Player {
    /// Player identifier
    pub id: PlayerId,
    /// Display name
    pub name: String,
    /// Current score
    pub score: i64,
}

impl Player {
    /// A newly seated player with the starting score
    #[must_use]
    pub fn new(id: PlayerId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            score: INITIAL_PLAYER_SCORE,
        }
    }
}

/// A meaning as submitted, before the ballot is shuffled
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Meaning {
    /// Author
    pub player_id: PlayerId,
    /// The definition text
    pub text: String,
}

/// A meaning on the ballot, with its shuffled position
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BallotMeaning {
    /// Author
    pub player_id: PlayerId,
    /// The definition text
    pub text: String,
    /// Position on the ballot, `0..players.len()`
    pub choice_index: u32,
}

/// One child's vote
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Vote {
    /// Voter
    pub player_id: PlayerId,
    /// Ballot position voted for
    pub choice_index: u32,
    /// Stake, between [`MIN_BET_POINTS`] and [`MAX_BET_POINTS`]
    pub bet_points: u8,
}

// ============================================================================
// Room
// ============================================================================

/// Fields every room carries, whatever its phase
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomBase {
    /// Room identifier
    pub id: RoomId,
    /// Players in join order; the first one is the host
    pub players: Vec<Player>,
    /// The player who created the room
    pub host_id: PlayerId,
}

impl RoomBase {
    /// Look up a player
    #[must_use]
    pub fn player(&self, player_id: &PlayerId) -> Option<&Player> {
        self.players.iter().find(|p| &p.id == player_id)
    }

    /// Whether `player_id` is seated in this room
    #[must_use]
    pub fn has_player(&self, player_id: &PlayerId) -> bool {
        self.player(player_id).is_some()
    }
}

/// Waiting for the parent to pick a word
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ThemeInputRoom {
    /// Fields shared by every phase
    #[serde(flatten)]
    pub base: RoomBase,
    /// 1-based round number
    pub round: u32,
    /// The player who knows the true meaning this round
    pub parent_player_id: PlayerId,
}

/// Collecting one meaning from every player
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MeaningInputRoom {
    /// Fields shared by every phase
    #[serde(flatten)]
    pub base: RoomBase,
    /// 1-based round number
    pub round: u32,
    /// The player who knows the true meaning this round
    pub parent_player_id: PlayerId,
    /// The word whose meaning is being guessed
    pub theme: String,
    /// Submissions so far, at most one per player
    pub meanings: Vec<Meaning>,
}

/// A shuffled ballot and the votes cast on it.
///
/// Shared by the voting phase and the frozen round result.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BallotRoom {
    /// Fields shared by every phase
    #[serde(flatten)]
    pub base: RoomBase,
    /// 1-based round number
    pub round: u32,
    /// The player who knows the true meaning this round
    pub parent_player_id: PlayerId,
    /// The word whose meaning is being guessed
    pub theme: String,
    /// Every player's meaning with its ballot position
    pub meanings: Vec<BallotMeaning>,
    /// Votes in submission order, at most one per child
    pub votes: Vec<Vote>,
}

impl BallotRoom {
    /// The meaning at ballot position `choice_index`
    #[must_use]
    pub fn meaning_at(&self, choice_index: u32) -> Option<&BallotMeaning> {
        self.meanings.iter().find(|m| m.choice_index == choice_index)
    }

    /// Every player except the parent
    pub fn children(&self) -> impl Iterator<Item = &Player> {
        self.base
            .players
            .iter()
            .filter(|p| p.id != self.parent_player_id)
    }
}

/// Current state of a game room, one variant per phase
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "phase", rename_all = "snake_case")]
pub enum Room {
    /// Open for players to join
    Waiting(RoomBase),
    /// The parent is choosing a word
    ThemeInput(ThemeInputRoom),
    /// Every player is writing a meaning
    MeaningInput(MeaningInputRoom),
    /// Children are voting on the shuffled ballot
    Voting(BallotRoom),
    /// The round is over and scored
    RoundResult(BallotRoom),
    /// The game is over
    FinalResult(RoomBase),
}

impl Room {
    /// Fields shared by every phase
    #[must_use]
    pub const fn base(&self) -> &RoomBase {
        match self {
            Self::Waiting(base) | Self::FinalResult(base) => base,
            Self::ThemeInput(room) => &room.base,
            Self::MeaningInput(room) => &room.base,
            Self::Voting(room) | Self::RoundResult(room) => &room.base,
        }
    }

    /// Room identifier
    #[must_use]
    pub const fn id(&self) -> &RoomId {
        &self.base().id
    }

    /// Players in join order
    #[must_use]
    pub fn players(&self) -> &[Player] {
        &self.base().players
    }

    /// The host
    #[must_use]
    pub const fn host_id(&self) -> &PlayerId {
        &self.base().host_id
    }

    /// Look up a player
    #[must_use]
    pub fn player(&self, player_id: &PlayerId) -> Option<&Player> {
        self.base().player(player_id)
    }

    /// Whether `player_id` is seated in this room
    #[must_use]
    pub fn has_player(&self, player_id: &PlayerId) -> bool {
        self.base().has_player(player_id)
    }

    /// The current phase
    #[must_use]
    pub const fn phase(&self) -> RoomPhase {
        match self {
            Self::Waiting(_) => RoomPhase::Waiting,
            Self::ThemeInput(_) => RoomPhase::ThemeInput,
            Self::MeaningInput(_) => RoomPhase::MeaningInput,
            Self::Voting(_) => RoomPhase::Voting,
            Self::RoundResult(_) => RoomPhase::RoundResult,
            Self::FinalResult(_) => RoomPhase::FinalResult,
        }
    }

    /// Current round, for phases inside a round
    #[must_use]
    pub const fn round(&self) -> Option<u32> {
        match self {
            Self::ThemeInput(room) => Some(room.round),
            Self::MeaningInput(room) => Some(room.round),
            Self::Voting(room) | Self::RoundResult(room) => Some(room.round),
            Self::Waiting(_) | Self::FinalResult(_) => None,
        }
    }

    /// Current parent, for phases inside a round
    #[must_use]
    pub const fn parent_player_id(&self) -> Option<&PlayerId> {
        match self {
            Self::ThemeInput(room) => Some(&room.parent_player_id),
            Self::MeaningInput(room) => Some(&room.parent_player_id),
            Self::Voting(room) | Self::RoundResult(room) => Some(&room.parent_player_id),
            Self::Waiting(_) | Self::FinalResult(_) => None,
        }
    }
}

/// The phase of a room, without its data
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoomPhase {
    /// Open for players to join
    Waiting,
    /// The parent is choosing a word
    ThemeInput,
    /// Every player is writing a meaning
    MeaningInput,
    /// Children are voting
    Voting,
    /// The round is over and scored
    RoundResult,
    /// The game is over
    FinalResult,
}

impl RoomPhase {
    /// Wire name of the phase
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Waiting => "waiting",
            Self::ThemeInput => "theme_input",
            Self::MeaningInput => "meaning_input",
            Self::Voting => "voting",
            Self::RoundResult => "round_result",
            Self::FinalResult => "final_result",
        }
    }
}

impl fmt::Display for RoomPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
