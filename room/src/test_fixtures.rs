//! Event histories for unit tests. Every room is `room-1`, hosted by `p1`,
//! with players `p1..pn` seated in order. Ballots are shuffled with seed 1.

#![allow(clippy::expect_used, clippy::panic)] // Test code

use crate::evolver::evolve;
use crate::events::RoomEvent;
use crate::shuffle::seeded_shuffle;
use crate::types::{BallotMeaning, Meaning, PlayerId, Room, RoomId, Vote};
use chrono::{DateTime, Utc};
use fictionary_core::environment::Clock;
use fictionary_testing::test_clock;

pub fn at() -> DateTime<Utc> {
    test_clock().now()
}

pub fn pid(id: &str) -> PlayerId {
    PlayerId::new(id)
}

fn room_id() -> RoomId {
    RoomId::new("room-1")
}

fn player_ids(n: usize) -> Vec<String> {
    (1..=n).map(|i| format!("p{i}")).collect()
}

pub fn created() -> Vec<RoomEvent> {
    vec![RoomEvent::RoomCreated {
        room_id: room_id(),
        host_id: pid("p1"),
        host_name: "Player 1".to_string(),
    }]
}

pub fn seated(n: usize) -> Vec<RoomEvent> {
    let mut history = created();
    for (seat, id) in player_ids(n).into_iter().enumerate().skip(1) {
        history.push(RoomEvent::PlayerJoined {
            room_id: room_id(),
            player_id: PlayerId::new(id),
            player_name: format!("Player {}", seat + 1),
        });
    }
    history
}

pub fn started(n: usize) -> Vec<RoomEvent> {
    let mut history = seated(n);
    history.push(RoomEvent::GameStarted {
        room_id: room_id(),
        player_id: pid("p1"),
    });
    history
}

pub fn themed(n: usize) -> Vec<RoomEvent> {
    let mut history = started(n);
    history.push(RoomEvent::ThemeInputted {
        room_id: room_id(),
        player_id: pid("p1"),
        theme: "quokka".to_string(),
    });
    history
}

pub fn meanings_so_far(submitted: &[(&str, &str)]) -> RoomEvent {
    RoomEvent::MeaningListUpdated {
        room_id: room_id(),
        meanings: submitted
            .iter()
            .map(|(id, text)| Meaning {
                player_id: pid(id),
                text: (*text).to_string(),
            })
            .collect(),
    }
}

/// Every player submitted `"meaning of pN"`, in seat order; voting is open.
///
/// With three players the ballot reads `0 = p2, 1 = p3, 2 = p1`.
pub fn voting(n: usize) -> Vec<RoomEvent> {
    let mut history = themed(n);
    let mut meanings = Vec::new();
    for id in player_ids(n) {
        meanings.push(Meaning {
            text: format!("meaning of {id}"),
            player_id: PlayerId::new(id),
        });
        history.push(RoomEvent::MeaningListUpdated {
            room_id: room_id(),
            meanings: meanings.clone(),
        });
    }
    history.push(RoomEvent::VotingStarted {
        room_id: room_id(),
        meanings: seeded_shuffle(&meanings, 1)
            .into_iter()
            .zip(0_u32..)
            .map(|(meaning, choice_index)| BallotMeaning {
                player_id: meaning.player_id,
                text: meaning.text,
                choice_index,
            })
            .collect(),
    });
    history
}

pub fn votes_so_far(cast: &[(&str, u32, u8)]) -> RoomEvent {
    RoomEvent::VoteListUpdated {
        room_id: room_id(),
        votes: cast
            .iter()
            .map(|(id, choice_index, bet_points)| Vote {
                player_id: pid(id),
                choice_index: *choice_index,
                bet_points: *bet_points,
            })
            .collect(),
    }
}

/// Round 1 closed: every child found `p1`'s meaning betting 1.
pub fn round_result(n: usize) -> Vec<RoomEvent> {
    let mut history = voting(n);
    let Some(RoomEvent::VotingStarted { meanings, .. }) = history.last() else {
        panic!("voting history ends with VotingStarted");
    };
    let parent_choice = meanings
        .iter()
        .find(|m| m.player_id == pid("p1"))
        .map(|m| m.choice_index)
        .expect("parent meaning on the ballot");

    let children: Vec<String> = player_ids(n).into_iter().skip(1).collect();
    let mut votes = Vec::new();
    for child in &children {
        votes.push(Vote {
            player_id: pid(child),
            choice_index: parent_choice,
            bet_points: 1,
        });
        history.push(RoomEvent::VoteListUpdated {
            room_id: room_id(),
            votes: votes.clone(),
        });
    }
    history.push(RoomEvent::RoundResultAnnounced { room_id: room_id() });
    for child in &children {
        history.push(RoomEvent::ScoreUpdated {
            room_id: room_id(),
            player_id: pid(child),
            bet_points: 1,
            meaning_submitted_player_id: pid("p1"),
            is_choosing_correct_meaning: true,
            parent_player_id: pid("p1"),
        });
    }
    history
}

pub fn replay(history: &[RoomEvent]) -> Room {
    let mut room = None;
    for event in history {
        room = Some(evolve(room, event).expect("history folds"));
    }
    room.expect("non-empty history")
}

pub fn score_of(room: &Room, id: &str) -> i64 {
    room.player(&pid(id)).map(|p| p.score).expect("player is seated")
}
