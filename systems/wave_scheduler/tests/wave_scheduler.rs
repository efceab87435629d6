use std::time::Duration;

use waypoint_defence_core::{
    Command, EnemyKindId, Event, GameConfig, KindCount, SelectionPolicy, SpawnOrigin, Vec2,
    WaveId, WaveTableEntry,
};
use waypoint_defence_system_wave_scheduler::{Config, TableProvider, WavePhase, WaveScheduler};
use waypoint_defence_world::{self as world, query, World};

const A: EnemyKindId = EnemyKindId::new(0);
const B: EnemyKindId = EnemyKindId::new(1);

fn long_path_world() -> World {
    let mut config = GameConfig::standard();
    config.map.waypoints = vec![Vec2::new(0.0, 0.0), Vec2::new(1_000.0, 0.0)];
    World::new(&config).expect("valid configuration")
}

fn scheduler(delay: Duration, entries: Vec<WaveTableEntry>) -> WaveScheduler {
    WaveScheduler::new(
        Config::new(delay, SelectionPolicy::FirstAvailable),
        Box::new(TableProvider::new(&entries, 0.05)),
    )
}

fn entry(wave: u32, spawn_interval_secs: f32, counts: Vec<KindCount>) -> WaveTableEntry {
    WaveTableEntry {
        wave,
        spawn_interval_secs,
        counts,
    }
}

fn step(
    world: &mut World,
    scheduler: &mut WaveScheduler,
    pending: Vec<Event>,
    dt: Duration,
) -> (Vec<Command>, Vec<Event>) {
    let mut events = pending;
    world::apply(world, Command::Tick { dt }, &mut events);
    let mut commands = Vec::new();
    scheduler.handle(&events, &mut commands);

    let mut produced = Vec::new();
    for command in commands.iter().cloned() {
        world::apply(world, command, &mut produced);
    }
    (commands, produced)
}

#[test]
fn first_available_releases_kinds_in_declared_order() {
    let mut world = long_path_world();
    let mut scheduler = scheduler(
        Duration::ZERO,
        vec![entry(1, 1.0, vec![KindCount::new(A, 2), KindCount::new(B, 1)])],
    );

    let (_, events) = step(&mut world, &mut scheduler, Vec::new(), Duration::from_secs(3));

    let kinds: Vec<EnemyKindId> = events
        .iter()
        .filter_map(|event| match event {
            Event::EnemySpawned { kind, .. } => Some(*kind),
            _ => None,
        })
        .collect();
    assert_eq!(kinds, vec![A, A, B]);
    assert_eq!(query::enemy_view(&world).len(), 3);
}

#[test]
fn large_ticks_release_one_enemy_per_elapsed_interval() {
    let mut world = long_path_world();
    let mut scheduler = scheduler(
        Duration::ZERO,
        vec![entry(1, 0.5, vec![KindCount::new(A, 10)])],
    );

    let (commands, _) = step(&mut world, &mut scheduler, Vec::new(), Duration::from_secs(2));

    assert_eq!(commands.len(), 4, "expected one spawn per interval");
    assert_eq!(scheduler.run_state().remaining(), 6);
    assert_eq!(scheduler.run_state().alive(), 4);
}

#[test]
fn wave_completes_only_after_every_enemy_is_gone() {
    let mut world = long_path_world();
    let mut scheduler = scheduler(
        Duration::from_secs(1),
        vec![entry(1, 0.5, vec![KindCount::new(A, 3)])],
    );

    let mut pending = Vec::new();
    let mut released = 0;
    let mut advanced_at = None;
    for tick in 0..40 {
        let (commands, events) = step(
            &mut world,
            &mut scheduler,
            pending,
            Duration::from_millis(250),
        );
        released += commands
            .iter()
            .filter(|command| matches!(command, Command::SpawnEnemy { .. }))
            .count();
        if commands.contains(&Command::AdvanceWave) {
            assert!(query::enemy_view(&world).is_empty());
            assert_eq!(released, 3);
            advanced_at = Some(tick);
            break;
        }
        pending = events;

        if released == 3 && tick >= 20 {
            for enemy in query::enemy_view(&world).iter() {
                world::apply(
                    &mut world,
                    Command::DamageEnemy {
                        enemy: enemy.id,
                        amount: u32::MAX,
                    },
                    &mut pending,
                );
            }
        }
    }

    assert!(advanced_at.is_some_and(|tick| tick > 20));
    assert_eq!(query::economy(&world).wave, WaveId::new(2));
    assert_eq!(scheduler.run_state().wave(), WaveId::new(2));
    assert!(matches!(scheduler.phase(), WavePhase::Idle { .. }));
}

#[test]
fn rejected_spawns_do_not_hold_the_wave_open() {
    let mut world = long_path_world();
    let unknown = EnemyKindId::new(42);
    let mut scheduler = scheduler(
        Duration::ZERO,
        vec![entry(1, 1.0, vec![KindCount::new(unknown, 1)])],
    );

    let (_, events) = step(&mut world, &mut scheduler, Vec::new(), Duration::from_secs(1));
    assert_eq!(events, vec![Event::EnemySpawnRejected { kind: unknown }]);

    let (commands, _) = step(&mut world, &mut scheduler, events, Duration::ZERO);
    assert_eq!(commands, vec![Command::AdvanceWave]);
}

#[test]
fn split_children_are_counted_as_part_of_the_wave() {
    let mut world = long_path_world();
    let brute = EnemyKindId::new(2);
    let mut scheduler = scheduler(
        Duration::ZERO,
        vec![entry(1, 1.0, vec![KindCount::new(brute, 1)])],
    );

    let (_, events) = step(&mut world, &mut scheduler, Vec::new(), Duration::from_secs(1));
    let parent = events
        .iter()
        .find_map(|event| match event {
            Event::EnemySpawned { enemy, .. } => Some(*enemy),
            _ => None,
        })
        .expect("brute spawned");

    let mut pending = events;
    world::apply(
        &mut world,
        Command::DamageEnemy {
            enemy: parent,
            amount: u32::MAX,
        },
        &mut pending,
    );
    let children = pending
        .iter()
        .filter(|event| {
            matches!(
                event,
                Event::EnemySpawned {
                    origin: SpawnOrigin::Split { .. },
                    ..
                }
            )
        })
        .count();
    assert_eq!(children, 2);

    let (commands, _) = step(&mut world, &mut scheduler, pending, Duration::ZERO);
    assert!(commands.is_empty(), "children are still alive");
    assert_eq!(scheduler.run_state().alive(), 2);
}
