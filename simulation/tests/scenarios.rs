use std::time::Duration;

use waypoint_defence_core::{Event, GameConfig, SelectionPolicy, TurretKind, Vec2, WaveId};
use waypoint_defence_simulation::{Simulation, WavePhase};

const STEP: Duration = Duration::from_millis(100);

fn simulation(config: &GameConfig) -> Simulation {
    Simulation::new(config).expect("valid configuration")
}

fn run_until<F>(simulation: &mut Simulation, max_ticks: usize, mut done: F) -> Vec<Event>
where
    F: FnMut(&Event) -> bool,
{
    let mut log = Vec::new();
    for _ in 0..max_ticks {
        let events = simulation.tick(STEP);
        let finished = events.iter().any(&mut done);
        log.extend(events);
        if finished {
            break;
        }
    }
    log
}

fn defended_config() -> GameConfig {
    let mut config = GameConfig::standard();
    config.economy.starting_coins = 1_000;
    config.economy.starting_health = 100;
    config
}

fn defend(simulation: &mut Simulation) {
    for position in [Vec2::new(-7.0, 0.0), Vec2::new(-2.0, 0.0), Vec2::new(1.0, -1.0)] {
        simulation
            .buy_turret(TurretKind::Cannon)
            .expect("enough coins for a cannon");
        let _ = simulation
            .place_turret(TurretKind::Cannon, position)
            .expect("free slot");
    }
}

#[test]
fn buying_and_selling_loses_a_fifth_of_the_price() {
    let mut simulation = simulation(&GameConfig::standard());
    assert_eq!(simulation.economy_state().coins, 300);

    simulation
        .buy_turret(TurretKind::Cannon)
        .expect("affordable");
    assert_eq!(simulation.economy_state().coins, 200);
    let turret = simulation
        .place_turret(TurretKind::Cannon, Vec2::new(-7.0, 0.0))
        .expect("free slot");

    assert_eq!(simulation.sell_turret(turret), Ok(80));
    assert_eq!(simulation.economy_state().coins, 280);
    assert!(simulation.slots().iter().all(|slot| slot.occupant.is_none()));
}

#[test]
fn a_leak_costs_health_but_no_coins() {
    let mut config = GameConfig::standard();
    config.enemies[0].health = 10;
    config.map.waypoints = vec![Vec2::new(-10.0, 2.0), Vec2::new(-6.0, 2.0)];
    let mut simulation = simulation(&config);

    let log = run_until(&mut simulation, 200, |event| {
        matches!(event, Event::EnemyLeaked { .. })
    });

    assert!(log
        .iter()
        .any(|event| matches!(event, Event::EnemyLeaked { penalty: 1, .. })));
    let economy = simulation.economy_state();
    assert_eq!(economy.health, 9);
    assert_eq!(economy.coins, 300);
    assert_eq!(economy.kills, 0);
}

#[test]
fn external_damage_destroys_enemies_and_pays_out() {
    let mut config = GameConfig::standard();
    config.enemies[0].health = 10;
    let mut simulation = simulation(&config);

    let log = run_until(&mut simulation, 200, |event| {
        matches!(event, Event::EnemySpawned { .. })
    });
    let enemy = log
        .iter()
        .find_map(|event| match event {
            Event::EnemySpawned { enemy, .. } => Some(*enemy),
            _ => None,
        })
        .expect("the first wave released an enemy");

    let events = simulation.apply_damage(enemy, 10);
    assert!(events
        .iter()
        .any(|event| matches!(event, Event::EnemyKilled { reward: 5, .. })));
    let economy = simulation.economy_state();
    assert_eq!(economy.coins, 305);
    assert_eq!(economy.kills, 1);
    assert!(simulation.enemies().get(enemy).is_none());
    assert_eq!(simulation.wave_state().alive(), 1);

    let _ = simulation.tick(STEP);
    assert_eq!(simulation.wave_state().alive(), 0);
}

#[test]
fn turrets_defend_the_first_wave_and_the_run_progresses() {
    let mut simulation = simulation(&defended_config());
    defend(&mut simulation);
    let spent = 300;

    let log = run_until(&mut simulation, 600, |event| {
        matches!(event, Event::WaveAdvanced { .. })
    });

    assert!(log.contains(&Event::WaveAdvanced {
        wave: WaveId::new(2)
    }));
    let released = log
        .iter()
        .filter(|event| matches!(event, Event::EnemySpawned { .. }))
        .count();
    assert_eq!(released, 10);

    let rewards: u32 = log
        .iter()
        .filter_map(|event| match event {
            Event::EnemyKilled { reward, .. } => Some(*reward),
            _ => None,
        })
        .sum();
    let leaked = log
        .iter()
        .filter(|event| matches!(event, Event::EnemyLeaked { .. }))
        .count();
    let economy = simulation.economy_state();
    assert!(economy.kills > 0, "cannons destroyed nothing");
    assert_eq!(economy.kills as usize + leaked, 10);
    assert_eq!(economy.coins, 1_000 - spent + rewards);
    assert_eq!(economy.health as usize, 100 - leaked);
    assert!(simulation.enemies().is_empty());
    assert!(matches!(simulation.wave_phase(), WavePhase::Idle { .. }));
}

#[test]
fn running_out_of_health_ends_the_run_once() {
    let mut config = GameConfig::standard();
    config.economy.starting_health = 1;
    let mut simulation = simulation(&config);

    let log = run_until(&mut simulation, 400, |event| {
        matches!(event, Event::RunEnded { .. })
    });

    let endings = log
        .iter()
        .filter(|event| matches!(event, Event::RunEnded { .. }))
        .count();
    assert_eq!(endings, 1);
    assert!(simulation.is_over());
    assert_eq!(simulation.economy_state().health, 0);
    assert!(simulation.tick(STEP).is_empty(), "ticking halts after game over");

    simulation.restart();
    assert!(!simulation.is_over());
    let economy = simulation.economy_state();
    assert_eq!(economy.health, 1);
    assert_eq!(economy.coins, 300);
    assert_eq!(economy.wave, WaveId::FIRST);
    assert!(simulation.enemies().is_empty());
    assert_eq!(
        simulation.tick(STEP).first(),
        Some(&Event::TimeAdvanced { dt: STEP })
    );
}

#[test]
fn identical_sessions_produce_identical_event_logs() {
    let first = session();
    let second = session();

    assert_eq!(first, second, "replay diverged between runs");
    assert!(first
        .iter()
        .any(|event| matches!(event, Event::ProjectileFired { .. })));
}

fn session() -> Vec<Event> {
    let mut config = defended_config();
    config.waves.selection = SelectionPolicy::UniformRandom { seed: 0x5eed };
    let mut simulation = simulation(&config);
    defend(&mut simulation);
    simulation
        .buy_turret(TurretKind::Frost)
        .expect("enough coins for a frost turret");
    let _ = simulation
        .place_turret(TurretKind::Frost, Vec2::new(-4.0, 0.0))
        .expect_err("no slot near the corner");

    let mut log = Vec::new();
    for _ in 0..500 {
        log.extend(simulation.tick(STEP));
    }
    log
}
