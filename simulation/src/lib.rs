#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Deterministic tick orchestration for Waypoint Defence.
//!
//! [`Simulation`] owns the authoritative world together with the pure systems
//! and runs them in a fixed order each tick: wave scheduler, enemy agents,
//! targeting, combat and finally the projectile resolver. Player actions are
//! applied immediately and their outcome is reported through `Result`.

use std::{mem, time::Duration};

use log::{debug, info, warn};
use waypoint_defence_core::{
    Command, ConfigError, EconomySnapshot, EnemyId, EnemyView, Event, GameConfig,
    PlacementError, ProjectileSnapshot, PurchaseError, RemovalError, SlotSnapshot, TurretId,
    TurretKind, TurretView, UpgradeError, UpgradeTrack, Vec2,
};
use waypoint_defence_system_tower_combat::TowerCombat;
use waypoint_defence_system_tower_targeting::TowerTargeting;
pub use waypoint_defence_system_wave_scheduler::{WavePhase, WaveRunState};
use waypoint_defence_system_wave_scheduler::WaveScheduler;
use waypoint_defence_world::{self as world, query, World};

/// A single run of the game together with the systems that drive it.
#[derive(Debug)]
pub struct Simulation {
    world: World,
    scheduler: WaveScheduler,
    targeting: TowerTargeting,
    combat: TowerCombat,
    backlog: Vec<Event>,
    time_scale: f32,
    paused: bool,
}

impl Simulation {
    /// Validates the configuration and prepares a fresh run.
    pub fn new(config: &GameConfig) -> Result<Self, ConfigError> {
        let world = World::new(config).map_err(|error| {
            warn!("rejected configuration: {error}");
            error
        })?;
        info!("{}", query::welcome_banner(&world));
        Ok(Self {
            world,
            scheduler: WaveScheduler::from_wave_config(&config.waves),
            targeting: TowerTargeting::new(),
            combat: TowerCombat::new(),
            backlog: Vec::new(),
            time_scale: 1.0,
            paused: false,
        })
    }

    /// Advances the run by `dt` scaled by the current time scale.
    ///
    /// Returns every event produced during the tick. Once the run has ended
    /// ticks produce nothing until [`Simulation::restart`] is called.
    pub fn tick(&mut self, dt: Duration) -> Vec<Event> {
        let mut events = Vec::new();
        if self.is_over() {
            return events;
        }
        let dt = self.scaled(dt);
        if dt.is_zero() {
            return events;
        }

        let mut inbox = mem::take(&mut self.backlog);
        let arrived = inbox.len();
        world::apply(&mut self.world, Command::Tick { dt }, &mut inbox);
        let mut commands = Vec::new();
        self.scheduler.handle(&inbox, &mut commands);
        events.extend(inbox.drain(arrived..));

        self.execute(commands, &mut events);
        if !self.is_over() {
            self.execute(vec![Command::AdvanceEnemies { dt }], &mut events);
        }
        if !self.is_over() {
            let mut commands = Vec::new();
            self.targeting.handle(
                &query::turret_view(&self.world),
                &query::enemy_view(&self.world),
                &mut commands,
            );
            self.execute(commands, &mut events);
        }
        if !self.is_over() {
            let mut commands = Vec::new();
            self.combat.handle(
                dt,
                &query::turret_view(&self.world),
                &query::enemy_view(&self.world),
                &mut commands,
            );
            self.execute(commands, &mut events);
        }
        if !self.is_over() {
            self.execute(vec![Command::AdvanceProjectiles { dt }], &mut events);
        }

        self.backlog
            .extend(events.iter().filter(|event| !is_clock(event)).cloned());
        events
    }

    /// Spends coins on a turret of `kind` and banks one placement credit.
    pub fn buy_turret(&mut self, kind: TurretKind) -> Result<(), PurchaseError> {
        let events = self.submit(Command::PurchaseTurret { kind });
        events
            .iter()
            .find_map(|event| match event {
                Event::TurretPurchased { .. } => Some(Ok(())),
                Event::PurchaseRejected { reason, .. } => Some(Err(*reason)),
                _ => None,
            })
            .unwrap_or(Err(PurchaseError::UnknownKind(kind)))
    }

    /// Places a purchased turret on the slot nearest to `position`.
    pub fn place_turret(
        &mut self,
        kind: TurretKind,
        position: Vec2,
    ) -> Result<TurretId, PlacementError> {
        let events = self.submit(Command::PlaceTurret { kind, position });
        events
            .iter()
            .find_map(|event| match event {
                Event::TurretPlaced { turret, .. } => Some(Ok(*turret)),
                Event::PlacementRejected { reason, .. } => Some(Err(*reason)),
                _ => None,
            })
            .unwrap_or(Err(PlacementError::NotPurchased))
    }

    /// Sells a turret, returning the refunded coins.
    pub fn sell_turret(&mut self, turret: TurretId) -> Result<u32, RemovalError> {
        let events = self.submit(Command::SellTurret { turret });
        events
            .iter()
            .find_map(|event| match event {
                Event::TurretSold { refund, .. } => Some(Ok(*refund)),
                Event::RemovalRejected { reason, .. } => Some(Err(*reason)),
                _ => None,
            })
            .unwrap_or(Err(RemovalError::MissingTurret))
    }

    /// Removes a turret without a refund, freeing its slot.
    pub fn remove_turret(&mut self, turret: TurretId) -> Result<(), RemovalError> {
        let events = self.submit(Command::RemoveTurret { turret });
        events
            .iter()
            .find_map(|event| match event {
                Event::TurretRemoved { .. } => Some(Ok(())),
                Event::RemovalRejected { reason, .. } => Some(Err(*reason)),
                _ => None,
            })
            .unwrap_or(Err(RemovalError::MissingTurret))
    }

    /// Upgrades the range track of a turret, returning the cost paid.
    pub fn upgrade_turret_range(&mut self, turret: TurretId) -> Result<u32, UpgradeError> {
        self.upgrade(turret, UpgradeTrack::Range)
    }

    /// Upgrades the fire-rate track of a turret, returning the cost paid.
    pub fn upgrade_turret_speed(&mut self, turret: TurretId) -> Result<u32, UpgradeError> {
        self.upgrade(turret, UpgradeTrack::Speed)
    }

    fn upgrade(&mut self, turret: TurretId, track: UpgradeTrack) -> Result<u32, UpgradeError> {
        let events = self.submit(Command::UpgradeTurret { turret, track });
        events
            .iter()
            .find_map(|event| match event {
                Event::TurretUpgraded { cost, .. } => Some(Ok(*cost)),
                Event::UpgradeRejected { reason, .. } => Some(Err(*reason)),
                _ => None,
            })
            .unwrap_or(Err(UpgradeError::MissingTurret))
    }

    /// Deals damage to an enemy from a source outside the turret systems.
    ///
    /// Unknown enemies are ignored.
    pub fn apply_damage(&mut self, enemy: EnemyId, amount: u32) -> Vec<Event> {
        self.submit(Command::DamageEnemy { enemy, amount })
    }

    /// Current coins, health, wave and kills.
    #[must_use]
    pub fn economy_state(&self) -> EconomySnapshot {
        query::economy(&self.world)
    }

    /// Stops time from advancing until [`Simulation::resume`] is called.
    pub fn pause(&mut self) {
        debug!("simulation paused");
        self.paused = true;
    }

    /// Lets time advance again at the configured time scale.
    pub fn resume(&mut self) {
        debug!("simulation resumed");
        self.paused = false;
    }

    /// Multiplies every subsequent tick duration by `scale`.
    ///
    /// Negative or non-finite scales are ignored.
    pub fn set_time_scale(&mut self, scale: f32) {
        if !scale.is_finite() || scale < 0.0 {
            warn!("ignoring invalid time scale {scale}");
            return;
        }
        self.time_scale = scale;
    }

    /// Current time scale.
    #[must_use]
    pub const fn time_scale(&self) -> f32 {
        self.time_scale
    }

    /// Reports whether the player's health ran out.
    #[must_use]
    pub fn is_over(&self) -> bool {
        query::is_over(&self.world)
    }

    /// Discards the run and starts over from the first wave.
    pub fn restart(&mut self) {
        let mut events = Vec::new();
        world::apply(&mut self.world, Command::ResetRun, &mut events);
        self.scheduler.reset();
        self.backlog.clear();
        self.paused = false;
    }

    /// Snapshot of every live enemy.
    #[must_use]
    pub fn enemies(&self) -> EnemyView {
        query::enemy_view(&self.world)
    }

    /// Snapshot of every placed turret.
    #[must_use]
    pub fn turrets(&self) -> TurretView {
        query::turret_view(&self.world)
    }

    /// Snapshot of every projectile in flight.
    #[must_use]
    pub fn projectiles(&self) -> Vec<ProjectileSnapshot> {
        query::projectiles(&self.world)
    }

    /// Snapshot of the turret slots and their occupants.
    #[must_use]
    pub fn slots(&self) -> Vec<SlotSnapshot> {
        query::slots(&self.world)
    }

    /// Placement credits banked for `kind`.
    #[must_use]
    pub fn pending_placements(&self, kind: TurretKind) -> u32 {
        query::pending_placements(&self.world, kind)
    }

    /// Phase of the wave scheduler.
    #[must_use]
    pub fn wave_phase(&self) -> WavePhase {
        self.scheduler.phase()
    }

    /// Counters of the wave in progress.
    #[must_use]
    pub fn wave_state(&self) -> WaveRunState {
        self.scheduler.run_state()
    }

    /// Waypoints enemies walk along.
    #[must_use]
    pub fn path(&self) -> &[Vec2] {
        query::path(&self.world)
    }

    fn scaled(&self, dt: Duration) -> Duration {
        if self.paused {
            return Duration::ZERO;
        }
        if (self.time_scale - 1.0).abs() < f32::EPSILON {
            return dt;
        }
        Duration::try_from_secs_f64(dt.as_secs_f64() * f64::from(self.time_scale))
            .unwrap_or(Duration::ZERO)
    }

    fn submit(&mut self, command: Command) -> Vec<Event> {
        let mut events = Vec::new();
        world::apply(&mut self.world, command, &mut events);
        self.backlog.extend(events.iter().cloned());
        events
    }

    fn execute(&mut self, commands: Vec<Command>, events: &mut Vec<Event>) {
        for command in commands {
            world::apply(&mut self.world, command, events);
        }
    }
}

fn is_clock(event: &Event) -> bool {
    matches!(event, Event::TimeAdvanced { .. })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn simulation() -> Simulation {
        Simulation::new(&GameConfig::standard()).expect("standard configuration is valid")
    }

    #[test]
    fn paused_ticks_do_not_advance_time() {
        let mut simulation = simulation();
        simulation.pause();
        assert!(simulation.tick(Duration::from_secs(10)).is_empty());
        assert_eq!(
            simulation.wave_phase(),
            WavePhase::Idle {
                elapsed: Duration::ZERO
            }
        );

        simulation.resume();
        let events = simulation.tick(Duration::from_secs(1));
        assert_eq!(
            events.first(),
            Some(&Event::TimeAdvanced {
                dt: Duration::from_secs(1)
            })
        );
    }

    #[test]
    fn time_scale_multiplies_elapsed_time() {
        let mut simulation = simulation();
        simulation.set_time_scale(2.0);
        let _ = simulation.tick(Duration::from_secs(1));
        assert_eq!(
            simulation.wave_phase(),
            WavePhase::Idle {
                elapsed: Duration::from_secs(2)
            }
        );

        simulation.set_time_scale(-1.0);
        assert!((simulation.time_scale() - 2.0).abs() < f32::EPSILON);

        simulation.set_time_scale(0.0);
        assert!(simulation.tick(Duration::from_secs(1)).is_empty());
    }

    #[test]
    fn player_actions_report_their_outcome() {
        let mut simulation = simulation();
        assert_eq!(
            simulation.place_turret(TurretKind::Cannon, Vec2::new(-7.0, 0.0)),
            Err(PlacementError::NotPurchased)
        );
        assert_eq!(simulation.buy_turret(TurretKind::Cannon), Ok(()));
        assert_eq!(simulation.pending_placements(TurretKind::Cannon), 1);

        let turret = simulation
            .place_turret(TurretKind::Cannon, Vec2::new(-7.1, 0.2))
            .expect("slot within snap radius");
        assert_eq!(simulation.economy_state().coins, 200);
        assert_eq!(simulation.upgrade_turret_range(turret), Ok(50));
        assert_eq!(simulation.upgrade_turret_speed(turret), Ok(50));
        assert_eq!(simulation.sell_turret(turret), Ok(160));
        assert_eq!(
            simulation.remove_turret(turret),
            Err(RemovalError::MissingTurret)
        );
        assert_eq!(simulation.economy_state().coins, 260);
    }
}
