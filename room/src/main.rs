//! Fictionary demo.
//!
//! Plays one complete scripted game against the in-memory event store and
//! prints the room's event log and the winners.

use fictionary_core::environment::{
    FixedSeedSource, RandomSeedSource, SeedSource, SystemClock, UuidIdGenerator,
};
use fictionary_core::event::EventEnvelope;
use fictionary_core::event_store::EventStore;
use fictionary_room::RoomAggregate;
use fictionary_room::config::Config;
use fictionary_room::events::{RoomEvent, to_json_record};
use fictionary_room::service::RoomService;
use fictionary_room::types::{PlayerId, Room};
use fictionary_room::view::{RoomView, winners};
use fictionary_runtime::Repository;
use fictionary_runtime::metrics::MetricsServer;
use fictionary_testing::InMemoryEventStore;
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();
    let config = Config::from_env();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| config.log_level.clone().into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!(players = ?config.demo_players, shuffle_seed = ?config.shuffle_seed, "Starting Fictionary demo");

    let mut metrics = MetricsServer::new(config.metrics_addr().parse()?);
    if config.metrics.enabled {
        metrics.start()?;
        info!(addr = %metrics.addr(), "Metrics recorder installed");
    }

    let store = InMemoryEventStore::new();
    let seeds: Arc<dyn SeedSource> = match config.shuffle_seed {
        Some(seed) => Arc::new(FixedSeedSource(seed)),
        None => Arc::new(RandomSeedSource),
    };
    let service = RoomService::new(
        Arc::new(store.clone()),
        Arc::new(SystemClock),
        Arc::new(UuidIdGenerator),
        seeds,
    );

    let room = play(&service, &config.demo_players).await?;

    let stream = store
        .load_events(Repository::<RoomAggregate>::stream_id(room.id().as_str()))
        .await?;
    for serialized in &stream {
        let envelope = EventEnvelope::<RoomEvent>::from_serialized(serialized)?;
        println!("{}", to_json_record(&envelope)?);
    }

    println!("{}", serde_json::to_string_pretty(&RoomView::from_room(&room))?);
    let winner_names: Vec<&str> = winners(&room)
        .iter()
        .filter_map(|id| room.player(id).map(|p| p.name.as_str()))
        .collect();
    info!(winners = ?winner_names, events = stream.len(), "Game over");

    if let Some(text) = metrics.render() {
        println!("{text}");
    }
    Ok(())
}

/// Seat every player, then play as many rounds as there are players.
///
/// Each child bets 1 on the ballot entry right after their own, so every
/// round mixes found and missed meanings.
async fn play(service: &RoomService, names: &[String]) -> Result<Room, Box<dyn std::error::Error>> {
    let Some((host_name, guests)) = names.split_first() else {
        return Err("at least one player is needed".into());
    };

    let (mut room, host_id) = service.create_room(host_name).await?;
    let room_id = room.id().clone();
    let mut seats: Vec<PlayerId> = vec![host_id.clone()];
    for name in guests {
        let (_, player_id) = service.join_room(&room_id, name, None).await?;
        seats.push(player_id);
    }

    room = service.start_game(&room_id, &host_id).await?;
    while let Room::ThemeInput(round) = &room {
        let parent = round.parent_player_id.clone();
        info!(round = round.round, parent = %parent, "Round begins");

        service
            .input_theme(&room_id, &parent, &format!("word-{}", round.round))
            .await?;
        for (seat, player_id) in seats.iter().enumerate() {
            room = service
                .input_meaning(&room_id, player_id, &format!("definition #{seat}"))
                .await?;
        }

        let Room::Voting(ballot) = &room else {
            warn!(phase = %room.phase(), "Voting did not start");
            break;
        };
        let ballot_size = u32::try_from(ballot.meanings.len())?;
        let children: Vec<(PlayerId, u32)> = ballot
            .meanings
            .iter()
            .filter(|m| m.player_id != parent)
            .map(|m| (m.player_id.clone(), (m.choice_index + 1) % ballot_size))
            .collect();
        for (child, choice) in children {
            room = service.vote(&room_id, &child, choice, 1).await?;
        }
        let scores: Vec<(&str, i64)> = room
            .players()
            .iter()
            .map(|p| (p.name.as_str(), p.score))
            .collect();
        info!(phase = %room.phase(), ?scores, "Round scored");

        room = service.next_round(&room_id, &host_id).await?;
    }

    Ok(room)
}
