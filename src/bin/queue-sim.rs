//! Queue simulation CLI tool
//!
//! Drives the matchmaking queue and rating updaters end to end with
//! synthetic traffic, without a game server in the loop.
//!
//! Usage:
//!   cargo run --bin queue-sim -- simulate --mode ranked_1v1 --players 16
//!   cargo run --bin queue-sim -- simulate --mode party_4p --players 16 --required-size 4 --policy anchor
//!   cargo run --bin queue-sim -- rating-period --rating 1500 --deviation 200
//!   cargo run --bin queue-sim -- simulate --players 8 --health-port 8080

use anyhow::Result;
use arena_ladder::config::AppConfig;
use arena_ladder::metrics::{HealthServer, HealthServerConfig, MetricsCollector};
use arena_ladder::queue::{
    AnchorExpansionPolicy, BestPairPolicy, ChannelMatchSink, MatchTicket, MatchmakingQueue,
    QueueScheduler, SchedulerConfig,
};
use arena_ladder::rating::{
    EloUpdater, Glicko2Updater, GlickoProfile, InMemoryRatingStorage, RatingStorage,
};
use arena_ladder::synergy::TeamSynergyStore;
use arena_ladder::types::MatchGroup;
use clap::{Parser, Subcommand};
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

#[derive(Parser)]
#[command(name = "queue-sim")]
#[command(about = "Simulation driver for the arena-ladder matchmaking core")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Optional TOML config file; defaults come from the environment
    #[arg(long)]
    config: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Enqueue synthetic players and run the scheduler until the pool drains
    Simulate {
        /// Queue mode name
        #[arg(long, default_value = "ranked_1v1")]
        mode: String,
        /// Number of synthetic players to enqueue
        #[arg(long, default_value = "16")]
        players: usize,
        /// Players per match
        #[arg(long, default_value = "2")]
        required_size: usize,
        /// Pairing policy: "best-pair" or "anchor"
        #[arg(long, default_value = "best-pair")]
        policy: String,
        /// Rating spread of the synthetic population
        #[arg(long, default_value = "300.0")]
        spread: f64,
        /// Serve /health and /metrics on this port while simulating
        #[arg(long)]
        health_port: Option<u16>,
    },
    /// Run one Glicko-2 rating period against three reference opponents
    RatingPeriod {
        #[arg(long, default_value = "1500.0")]
        rating: f64,
        #[arg(long, default_value = "200.0")]
        deviation: f64,
        #[arg(long, default_value = "0.06")]
        volatility: f64,
    },
}

fn load_config(path: Option<&str>) -> Result<AppConfig> {
    match path {
        Some(path) => AppConfig::from_file(path),
        None => AppConfig::from_env(),
    }
}

/// Deterministic rating spread so runs are reproducible
fn synthetic_rating(index: usize, spread: f64) -> f64 {
    let offset = ((index * 37) % 23) as f64 / 22.0 - 0.5;
    1500.0 + offset * spread
}

async fn run_simulation(
    config: AppConfig,
    mode: String,
    players: usize,
    required_size: usize,
    policy: String,
    spread: f64,
    health_port: Option<u16>,
) -> Result<()> {
    if required_size < 2 {
        anyhow::bail!("a match needs at least two players");
    }

    let queue = Arc::new(MatchmakingQueue::new());
    match policy.as_str() {
        "best-pair" => queue.set_mode_policy(
            mode.clone(),
            Arc::new(BestPairPolicy::new(config.queue.best_pair)),
        ),
        "anchor" => queue.set_mode_policy(
            mode.clone(),
            Arc::new(AnchorExpansionPolicy::new(config.queue.anchor)),
        ),
        other => anyhow::bail!("unknown policy '{}', use 'best-pair' or 'anchor'", other),
    }

    let collector = Arc::new(MetricsCollector::new()?);

    let health_handle = health_port.map(|port| {
        let server = HealthServer::new(
            HealthServerConfig {
                port,
                ..Default::default()
            },
            collector.clone(),
        )
        .with_queue(queue.clone());
        tokio::spawn(async move {
            if let Err(e) = server.start().await {
                tracing::warn!("health server exited: {}", e);
            }
        })
    });

    // Mixed population: every third player is a newbie
    for i in 0..players {
        let experience = if i % 3 == 0 { 2 } else { 30 };
        let ticket = MatchTicket::new(
            format!("player_{i:03}"),
            synthetic_rating(i, spread),
            mode.clone(),
            experience,
        );
        collector.record_enqueue(&mode);
        queue.enqueue(ticket)?;
    }
    collector.set_queue_depth(&mode, queue.queue_size(&mode));

    let (sink, mut groups) = ChannelMatchSink::new(64);
    let scheduler = QueueScheduler::new(
        queue.clone(),
        Arc::new(sink),
        SchedulerConfig {
            tick_interval_ms: 50,
        },
    )?;
    let poll_handle = scheduler.spawn_mode(mode.clone(), required_size);

    let elo = EloUpdater::new(config.rating.elo);
    let storage = InMemoryRatingStorage::new();
    let synergy = TeamSynergyStore::default();

    let mut formed: Vec<MatchGroup> = Vec::new();
    // The pool is static, so once a tick produces nothing more the
    // remaining tickets can never match each other
    while let Ok(Some(group)) =
        tokio::time::timeout(Duration::from_millis(500), groups.recv()).await
    {
        let waits: Vec<_> = group
            .tickets
            .iter()
            .map(|t| t.wait_time(group.formed_at).to_std().unwrap_or_default())
            .collect();
        collector.record_match_formed(&mode, &waits);
        collector.set_queue_depth(&mode, queue.queue_size(&mode));
        formed.push(group);
    }

    scheduler.shutdown();
    poll_handle.await?;

    info!(
        matches = formed.len(),
        unmatched = queue.queue_size(&mode),
        "simulation finished"
    );

    for (round, group) in formed.iter().enumerate() {
        println!(
            "match {:>2}: {}",
            round + 1,
            group
                .tickets
                .iter()
                .map(|t| format!("{} ({:.0})", t.player_id, t.rating))
                .collect::<Vec<_>>()
                .join(" vs ")
        );

        if group.len() == 2 {
            // Deterministic outcome: the higher-rated player wins,
            // with an upset every third match
            let (w, l) = if (group.tickets[0].rating >= group.tickets[1].rating)
                == (round % 3 != 0)
            {
                (0, 1)
            } else {
                (1, 0)
            };

            let started = std::time::Instant::now();
            let mut winner = storage.get_or_create(&group.tickets[w].player_id)?;
            let mut loser = storage.get_or_create(&group.tickets[l].player_id)?;
            winner.rating = group.tickets[w].rating;
            loser.rating = group.tickets[l].rating;
            elo.settle_match_1v1(&mut winner, &mut loser);
            storage.upsert(winner)?;
            storage.upsert(loser)?;
            collector.record_rating_update("elo", started.elapsed());
        } else {
            // Party mode: credit synergy for the winning front pair
            let ids = group.player_ids();
            synergy.record_win(&ids[0], &ids[1])?;
        }
    }

    let mut leaderboard = storage.all()?;
    if !leaderboard.is_empty() {
        leaderboard.sort_by(|a, b| b.profile.rating.total_cmp(&a.profile.rating));
        println!("\nladder after settlement:");
        for entry in leaderboard.iter().take(10) {
            println!(
                "  {:<12} {:>8.2}  ({} games)",
                entry.profile.player_id, entry.profile.rating, entry.profile.games_played
            );
        }
    }

    if let Some(handle) = health_handle {
        handle.abort();
    }

    Ok(())
}

fn run_rating_period(rating: f64, deviation: f64, volatility: f64) -> Result<()> {
    let updater = Glicko2Updater::new(Default::default())?;
    let player = GlickoProfile::new(rating, deviation, volatility);
    let results = vec![
        (GlickoProfile::new(rating - 100.0, 30.0, 0.06), 1.0),
        (GlickoProfile::new(rating + 50.0, 100.0, 0.06), 0.0),
        (GlickoProfile::new(rating + 200.0, 300.0, 0.06), 0.0),
    ];

    let updated = updater.update(&player, &results)?;

    println!(
        "before: rating {:.2}, deviation {:.2}, volatility {:.5}",
        player.rating, player.deviation, player.volatility
    );
    println!(
        "after:  rating {:.2}, deviation {:.2}, volatility {:.5}",
        updated.rating, updated.deviation, updated.volatility
    );

    let idle = updater.update(&updated, &[])?;
    println!(
        "after an idle period the deviation grows back to {:.2}",
        idle.deviation
    );

    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let cli = Cli::parse();
    let config = load_config(cli.config.as_deref())?;

    match cli.command {
        Commands::Simulate {
            mode,
            players,
            required_size,
            policy,
            spread,
            health_port,
        } => {
            run_simulation(
                config,
                mode,
                players,
                required_size,
                policy,
                spread,
                health_port,
            )
            .await
        }
        Commands::RatingPeriod {
            rating,
            deviation,
            volatility,
        } => run_rating_period(rating, deviation, volatility),
    }
}
