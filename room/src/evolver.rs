//! Folding room events into state.
//!
//! [`evolve`] is total over legal histories and rejects everything else with
//! an [`EvolveError`]: an event that cannot follow the room's phase means the
//! stream is corrupted. Applying the same history always yields the same
//! room.

use crate::error::EvolveError;
use crate::events::RoomEvent;
use crate::types::{
    BallotRoom, MeaningInputRoom, Player, PlayerId, Room, RoomBase, ThemeInputRoom,
};
use fictionary_core::aggregate::Aggregate;
use fictionary_core::event::Event;

/// The game room as an event-sourced aggregate
#[derive(Debug, Clone, Copy, Default)]
pub struct RoomAggregate;

impl Aggregate for RoomAggregate {
    const KIND: &'static str = "room";

    type State = Room;
    type Event = RoomEvent;
    type Error = EvolveError;

    fn evolve(state: Option<Room>, event: &RoomEvent) -> Result<Room, EvolveError> {
        evolve(state, event)
    }
}

/// Apply one event to the prior room.
///
/// # Errors
///
/// - [`EvolveError::NoRoom`] for anything but `RoomCreated` on an empty stream
/// - [`EvolveError::NotApplicable`] when the event cannot follow the phase
/// - [`EvolveError::UnknownPlayer`] when a scoring event names someone who
///   is not seated
pub fn evolve(state: Option<Room>, event: &RoomEvent) -> Result<Room, EvolveError> {
    let event_type = event.event_type();

    let Some(room) = state else {
        return match event {
            RoomEvent::RoomCreated {
                room_id,
                host_id,
                host_name,
            } => Ok(Room::Waiting(RoomBase {
                id: room_id.clone(),
                players: vec![Player::new(host_id.clone(), host_name.clone())],
                host_id: host_id.clone(),
            })),
            _ => Err(EvolveError::NoRoom { event_type }),
        };
    };

    let phase = room.phase();
    let not_applicable = || EvolveError::NotApplicable { event_type, phase };

    match (room, event) {
        (
            Room::Waiting(mut base),
            RoomEvent::PlayerJoined {
                player_id,
                player_name,
                ..
            },
        ) => {
            base.players
                .push(Player::new(player_id.clone(), player_name.clone()));
            Ok(Room::Waiting(base))
        },

        (Room::Waiting(base), RoomEvent::GameStarted { .. }) => {
            let parent_player_id = base.host_id.clone();
            Ok(Room::ThemeInput(ThemeInputRoom {
                base,
                round: 1,
                parent_player_id,
            }))
        },

        (Room::ThemeInput(round), RoomEvent::ThemeInputted { theme, .. }) => {
            Ok(Room::MeaningInput(MeaningInputRoom {
                base: round.base,
                round: round.round,
                parent_player_id: round.parent_player_id,
                theme: theme.clone(),
                meanings: Vec::new(),
            }))
        },

        (Room::MeaningInput(mut round), RoomEvent::MeaningListUpdated { meanings, .. }) => {
            round.meanings.clone_from(meanings);
            Ok(Room::MeaningInput(round))
        },

        (Room::MeaningInput(round), RoomEvent::VotingStarted { meanings, .. }) => {
            Ok(Room::Voting(BallotRoom {
                base: round.base,
                round: round.round,
                parent_player_id: round.parent_player_id,
                theme: round.theme,
                meanings: meanings.clone(),
                votes: Vec::new(),
            }))
        },

        (Room::Voting(mut round), RoomEvent::VoteListUpdated { votes, .. }) => {
            round.votes.clone_from(votes);
            Ok(Room::Voting(round))
        },

        (Room::Voting(round), RoomEvent::RoundResultAnnounced { .. }) => Ok(Room::RoundResult(round)),

        (
            Room::RoundResult(mut round),
            RoomEvent::ScoreUpdated {
                player_id,
                bet_points,
                meaning_submitted_player_id,
                is_choosing_correct_meaning,
                parent_player_id,
                ..
            },
        ) => {
            let bet = i64::from(*bet_points);
            let players = &mut round.base.players;
            if *is_choosing_correct_meaning {
                adjust(players, player_id, bet, event_type)?;
                adjust(players, parent_player_id, -bet, event_type)?;
            } else {
                adjust(players, player_id, -(bet + 1), event_type)?;
                adjust(players, meaning_submitted_player_id, bet, event_type)?;
                adjust(players, parent_player_id, 1, event_type)?;
            }
            Ok(Room::RoundResult(round))
        },

        (
            Room::RoundResult(mut round),
            RoomEvent::AllChildrenMissed {
                parent_player_id,
                gained_points,
                ..
            },
        ) => {
            let players = &mut round.base.players;
            if !players.iter().any(|p| &p.id == parent_player_id) {
                return Err(EvolveError::UnknownPlayer {
                    event_type,
                    player_id: parent_player_id.clone(),
                });
            }
            let children = players.len() as i64 - 1;
            for player in players.iter_mut() {
                if &player.id == parent_player_id {
                    player.score += gained_points * children;
                } else {
                    player.score -= gained_points;
                }
            }
            Ok(Room::RoundResult(round))
        },

        (
            Room::RoundResult(round),
            RoomEvent::NextRoundStarted {
                next_round,
                next_parent_id,
                ..
            },
        ) => {
            if !round.base.has_player(next_parent_id) {
                return Err(EvolveError::UnknownPlayer {
                    event_type,
                    player_id: next_parent_id.clone(),
                });
            }
            Ok(Room::ThemeInput(ThemeInputRoom {
                base: round.base,
                round: *next_round,
                parent_player_id: next_parent_id.clone(),
            }))
        },

        (Room::RoundResult(round), RoomEvent::GameEnded { .. }) => Ok(Room::FinalResult(round.base)),

        _ => Err(not_applicable()),
    }
}

fn adjust(
    players: &mut [Player],
    player_id: &PlayerId,
    delta: i64,
    event_type: &'static str,
) -> Result<(), EvolveError> {
    let player = players
        .iter_mut()
        .find(|p| &p.id == player_id)
        .ok_or_else(|| EvolveError::UnknownPlayer {
            event_type,
            player_id: player_id.clone(),
        })?;
    player.score += delta;
    Ok(())
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::panic)] // Test code
mod tests {
    use super::*;
    use crate::test_fixtures::*;
    use crate::types::{INITIAL_PLAYER_SCORE, RoomId, RoomPhase};
    use proptest::prelude::*;

    fn score_update(voter: &str, bet: u8, author: &str, correct: bool) -> RoomEvent {
        RoomEvent::ScoreUpdated {
            room_id: RoomId::new("room-1"),
            player_id: pid(voter),
            bet_points: bet,
            meaning_submitted_player_id: pid(author),
            is_choosing_correct_meaning: correct,
            parent_player_id: pid("p1"),
        }
    }

    fn announced(n: usize) -> Vec<RoomEvent> {
        let mut history = voting(n);
        history.push(RoomEvent::RoundResultAnnounced {
            room_id: RoomId::new("room-1"),
        });
        history
    }

    #[test]
    fn room_created_seats_the_host() {
        let room = replay(&created());
        assert_eq!(room.phase(), RoomPhase::Waiting);
        assert_eq!(room.host_id(), &pid("p1"));
        assert_eq!(room.players()[0].score, 10);
    }

    #[test]
    fn game_started_makes_host_parent_of_round_one() {
        let room = replay(&started(3));
        assert_eq!(room.phase(), RoomPhase::ThemeInput);
        assert_eq!(room.round(), Some(1));
        assert_eq!(room.parent_player_id(), Some(&pid("p1")));
    }

    #[test]
    fn correct_vote_moves_bet_from_parent_to_voter() {
        let mut history = announced(3);
        history.push(score_update("p2", 3, "p1", true));

        let room = replay(&history);
        assert_eq!(score_of(&room, "p1"), 7);
        assert_eq!(score_of(&room, "p2"), 13);
        assert_eq!(score_of(&room, "p3"), 10);
    }

    #[test]
    fn wrong_vote_pays_author_and_parent() {
        let mut history = announced(3);
        history.push(score_update("p2", 2, "p3", false));

        let room = replay(&history);
        assert_eq!(score_of(&room, "p1"), 11);
        assert_eq!(score_of(&room, "p2"), 7);
        assert_eq!(score_of(&room, "p3"), 12);
    }

    #[test]
    fn all_children_missed_pays_parent_per_child() {
        let mut history = announced(3);
        history.push(RoomEvent::AllChildrenMissed {
            room_id: RoomId::new("room-1"),
            parent_player_id: pid("p1"),
            gained_points: 2,
        });

        let room = replay(&history);
        assert_eq!(score_of(&room, "p1"), 14);
        assert_eq!(score_of(&room, "p2"), 8);
        assert_eq!(score_of(&room, "p3"), 8);
    }

    #[test]
    fn game_ended_freezes_the_room() {
        let mut history = round_result(3);
        history.push(RoomEvent::GameEnded {
            room_id: RoomId::new("room-1"),
        });

        let room = replay(&history);
        assert_eq!(room.phase(), RoomPhase::FinalResult);
        assert_eq!(room.round(), None);
    }

    #[test]
    fn next_round_resets_to_theme_input() {
        let mut history = round_result(3);
        history.push(RoomEvent::NextRoundStarted {
            room_id: RoomId::new("room-1"),
            next_round: 2,
            next_parent_id: pid("p2"),
        });

        let Room::ThemeInput(round) = replay(&history) else {
            panic!("expected theme input");
        };
        assert_eq!(round.round, 2);
        assert_eq!(round.parent_player_id, pid("p2"));
    }

    #[test]
    fn first_event_must_create_the_room() {
        let error = evolve(
            None,
            &RoomEvent::GameStarted {
                room_id: RoomId::new("room-1"),
                player_id: pid("p1"),
            },
        )
        .expect_err("no room yet");
        assert_eq!(
            error,
            EvolveError::NoRoom {
                event_type: "GameStarted"
            }
        );
    }

    #[test]
    fn out_of_phase_event_is_rejected() {
        let waiting = replay(&seated(3));
        let error = evolve(
            Some(waiting),
            &RoomEvent::VoteListUpdated {
                room_id: RoomId::new("room-1"),
                votes: Vec::new(),
            },
        )
        .expect_err("cannot vote while waiting");
        assert_eq!(
            error,
            EvolveError::NotApplicable {
                event_type: "VoteListUpdated",
                phase: RoomPhase::Waiting,
            }
        );
    }

    #[test]
    fn room_cannot_be_created_twice() {
        let room = replay(&created());
        let again = created().remove(0);
        assert!(matches!(
            evolve(Some(room), &again),
            Err(EvolveError::NotApplicable { phase: RoomPhase::Waiting, .. })
        ));
    }

    #[test]
    fn scoring_an_unseated_player_is_rejected() {
        let room = replay(&announced(3));
        assert!(matches!(
            evolve(Some(room), &score_update("p9", 1, "p1", true)),
            Err(EvolveError::UnknownPlayer { .. })
        ));
    }

    proptest! {
        #[test]
        fn every_prefix_of_a_round_folds_and_phases_only_move_forward(players in 3_usize..=8) {
            const ORDER: [RoomPhase; 5] = [
                RoomPhase::Waiting,
                RoomPhase::ThemeInput,
                RoomPhase::MeaningInput,
                RoomPhase::Voting,
                RoomPhase::RoundResult,
            ];
            let rank = |phase| ORDER.iter().position(|p| *p == phase);

            let history = round_result(players);
            let mut room = None;
            let mut reached = 0;
            for event in &history {
                let next = evolve(room, event);
                prop_assert!(next.is_ok(), "{} did not fold", event.event_type());
                let next = next.expect("checked above");
                let now = rank(next.phase()).expect("phase of a first round");
                prop_assert!(now >= reached);
                reached = now;
                room = Some(next);
            }

            let room = room.expect("non-empty history");
            prop_assert_eq!(room.phase(), RoomPhase::RoundResult);
            prop_assert_eq!(room.players().len(), players);
            // every child found the parent's meaning betting 1
            prop_assert_eq!(score_of(&room, "p1"), INITIAL_PLAYER_SCORE + 1 - players as i64);
            prop_assert_eq!(score_of(&room, "p2"), INITIAL_PLAYER_SCORE + 1);
        }
    }
}
