#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that runs a headless Waypoint Defence session.

mod build_order;

use std::{
    fmt, fs,
    path::{Path, PathBuf},
    time::Duration,
};

use anyhow::{Context, Result};
use clap::Parser;
use log::{debug, info, warn};
use waypoint_defence_core::{EconomySnapshot, Event, GameConfig};
use waypoint_defence_simulation::Simulation;

use build_order::BuildOrder;

/// Runs a scripted Waypoint Defence session and prints the final economy.
#[derive(Debug, Parser)]
#[command(name = "waypoint-defence", version)]
struct Cli {
    /// TOML file describing the run; the built-in scenario is used when omitted.
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,
    /// Number of ticks to simulate.
    #[arg(long, default_value_t = 1_200)]
    ticks: u32,
    /// Simulated milliseconds per tick.
    #[arg(long, default_value_t = 100, value_parser = clap::value_parser!(u64).range(1..))]
    tick_ms: u64,
    /// Turret to buy and place before the first tick, written as `kind@x,y`.
    #[arg(long = "build", value_name = "KIND@X,Y")]
    builds: Vec<BuildOrder>,
    /// Spends leftover coins on upgrades after placement.
    #[arg(long)]
    upgrade_all: bool,
}

/// Entry point for the Waypoint Defence command-line interface.
fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let config = load_config(cli.config.as_deref())?;
    let mut simulation = Simulation::new(&config).context("configuration was rejected")?;
    if let (Some(start), Some(end)) = (simulation.path().first(), simulation.path().last()) {
        debug!(
            "path runs through {} waypoints from ({}, {}) to ({}, {})",
            simulation.path().len(),
            start.x,
            start.y,
            end.x,
            end.y
        );
    }

    build(&mut simulation, &cli.builds);
    if cli.upgrade_all {
        upgrade_all(&mut simulation);
    }

    let summary = run(&mut simulation, cli.ticks, Duration::from_millis(cli.tick_ms));
    println!("{summary}");
    Ok(())
}

fn load_config(path: Option<&Path>) -> Result<GameConfig> {
    let Some(path) = path else {
        return Ok(GameConfig::standard());
    };
    let source = fs::read_to_string(path)
        .with_context(|| format!("failed to read configuration from {}", path.display()))?;
    parse_config(&source)
        .with_context(|| format!("failed to parse configuration from {}", path.display()))
}

fn parse_config(source: &str) -> Result<GameConfig> {
    let config: GameConfig = toml::from_str(source)?;
    config.validate()?;
    Ok(config)
}

fn build(simulation: &mut Simulation, orders: &[BuildOrder]) {
    for order in orders {
        let label = order.kind.label();
        if let Err(error) = simulation.buy_turret(order.kind) {
            warn!("could not buy {label} turret: {error}");
            continue;
        }
        match simulation.place_turret(order.kind, order.position) {
            Ok(turret) => info!(
                "placed {label} turret {} near ({}, {})",
                turret.get(),
                order.position.x,
                order.position.y
            ),
            Err(error) => warn!("could not place {label} turret: {error}"),
        }
    }
}

fn upgrade_all(simulation: &mut Simulation) {
    let mut spent = 0_u32;
    loop {
        let mut upgraded = false;
        for turret in simulation.turrets().into_vec() {
            if let Ok(cost) = simulation.upgrade_turret_range(turret.id) {
                spent = spent.saturating_add(cost);
                upgraded = true;
            }
            if let Ok(cost) = simulation.upgrade_turret_speed(turret.id) {
                spent = spent.saturating_add(cost);
                upgraded = true;
            }
        }
        if !upgraded {
            break;
        }
    }
    debug!("spent {spent} coins on upgrades");
}

fn run(simulation: &mut Simulation, ticks: u32, dt: Duration) -> Summary {
    let mut summary = Summary::default();
    for _ in 0..ticks {
        for event in simulation.tick(dt) {
            summary.record(&event);
        }
        summary.ticks += 1;
        if simulation.is_over() {
            break;
        }
    }
    summary.economy = Some(simulation.economy_state());
    summary
}

/// Tallies gathered while the session runs.
#[derive(Debug, Default)]
struct Summary {
    ticks: u32,
    spawned: u32,
    leaked: u32,
    shots: u32,
    pulses: u32,
    ended: bool,
    economy: Option<EconomySnapshot>,
}

impl Summary {
    fn record(&mut self, event: &Event) {
        match event {
            Event::EnemySpawned { .. } => self.spawned += 1,
            Event::EnemyLeaked { .. } => self.leaked += 1,
            Event::ProjectileFired { .. } => self.shots += 1,
            Event::FrostPulsed { .. } => self.pulses += 1,
            Event::RunEnded { .. } => self.ended = true,
            _ => {}
        }
    }
}

impl fmt::Display for Summary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let outcome = if self.ended { "defeated" } else { "holding" };
        writeln!(f, "{outcome} after {} ticks", self.ticks)?;
        writeln!(
            f,
            "enemies: {} spawned, {} leaked | shots: {} | frost pulses: {}",
            self.spawned, self.leaked, self.shots, self.pulses
        )?;
        match self.economy {
            Some(economy) => write!(
                f,
                "wave {} | coins {} | health {} | kills {}",
                economy.wave.get(),
                economy.coins,
                economy.health,
                economy.kills
            ),
            None => write!(f, "no economy recorded"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use waypoint_defence_core::{TurretKind, Vec2, WaveId};

    #[test]
    fn bundled_scenario_is_valid() {
        let config = parse_config(include_str!("../scenarios/skirmish.toml"))
            .expect("bundled scenario parses");
        assert_eq!(config.economy.starting_coins, 400);
        assert_eq!(config.enemies.len(), 2);
        assert!(config.turrets[1].slow.is_some());
    }

    #[test]
    fn invalid_configuration_is_reported() {
        let source = include_str!("../scenarios/skirmish.toml").replace(
            "waypoints = [[-8.0, 0.0], [0.0, 0.0], [0.0, 4.0], [8.0, 4.0]]",
            "waypoints = []",
        );
        let error = parse_config(&source).expect_err("empty path is rejected");
        assert!(error.to_string().contains("waypoint"));
    }

    #[test]
    fn missing_file_names_the_path() {
        let error = load_config(Some(Path::new("/nonexistent/waypoint.toml")))
            .expect_err("file does not exist");
        assert!(format!("{error:#}").contains("/nonexistent/waypoint.toml"));
    }

    #[test]
    fn scripted_session_reports_progress() {
        let mut simulation =
            Simulation::new(&GameConfig::standard()).expect("standard configuration is valid");
        build(
            &mut simulation,
            &[
                BuildOrder {
                    kind: TurretKind::Cannon,
                    position: Vec2::new(-7.0, 0.0),
                },
                BuildOrder {
                    kind: TurretKind::Cannon,
                    position: Vec2::new(-2.0, 0.0),
                },
                BuildOrder {
                    kind: TurretKind::Sniper,
                    position: Vec2::new(1.0, -1.0),
                },
            ],
        );
        assert_eq!(simulation.turrets().iter().count(), 2, "the sniper is unaffordable");
        upgrade_all(&mut simulation);
        assert_eq!(simulation.economy_state().coins, 0);

        let summary = run(&mut simulation, 100, Duration::from_millis(100));
        assert_eq!(summary.ticks, 100);
        assert!(summary.spawned > 0);
        let economy = summary.economy.expect("economy recorded");
        assert_eq!(economy.wave, WaveId::FIRST);
        assert!(summary.to_string().contains("holding after 100 ticks"));
    }
}
