#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative world state management for Waypoint Defence.
//!
//! The world owns the ledger and every entity registry. All mutation flows
//! through [`apply`], which executes one [`Command`] and appends the resulting
//! [`Event`] values in a deterministic order.

mod enemies;
mod ledger;
mod projectiles;
mod turrets;

use std::time::Duration;

use log::{debug, info};
use waypoint_defence_core::{
    Bounds, Command, ConfigError, EnemyId, EnemyKindId, EnemyRoster, Event, GameConfig,
    PlacementError, PurchaseError, Reach, RemovalError, SpawnOrigin, TurretCatalog, TurretId,
    TurretKind, UpgradeError, UpgradeTrack, Vec2, WELCOME_BANNER,
};

use enemies::EnemyRegistry;
use ledger::Ledger;
use projectiles::{Flight, ProjectileRegistry};
use turrets::TurretRegistry;

/// Represents the authoritative Waypoint Defence world state.
#[derive(Debug)]
pub struct World {
    banner: &'static str,
    path: Vec<Vec2>,
    bounds: Bounds,
    roster: EnemyRoster,
    catalog: TurretCatalog,
    ledger: Ledger,
    enemies: EnemyRegistry,
    turrets: TurretRegistry,
    projectiles: ProjectileRegistry,
    over: bool,
}

impl World {
    /// Creates a world ready for a fresh run of the provided configuration.
    pub fn new(config: &GameConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            banner: WELCOME_BANNER,
            path: config.map.waypoints.clone(),
            bounds: config.map.bounds,
            roster: config.roster(),
            catalog: config.catalog(),
            ledger: Ledger::new(config.economy),
            enemies: EnemyRegistry::new(),
            turrets: TurretRegistry::new(&config.map.slots, config.map.slot_snap_radius),
            projectiles: ProjectileRegistry::new(),
            over: false,
        })
    }

    fn spawn_enemy(&mut self, kind: EnemyKindId, out_events: &mut Vec<Event>) {
        let Some(definition) = self.roster.get(kind) else {
            out_events.push(Event::EnemySpawnRejected { kind });
            return;
        };
        let start = self.path.first().copied().unwrap_or(Vec2::ZERO);
        let enemy = self.enemies.spawn(definition, start, 1);
        debug!("enemy {} ({}) entered the path", enemy.get(), definition.name);
        out_events.push(Event::EnemySpawned {
            enemy,
            kind,
            origin: SpawnOrigin::Wave,
        });
    }

    fn advance_enemies(&mut self, dt: Duration, out_events: &mut Vec<Event>) {
        let outcome = self.enemies.advance(&self.path, dt);
        for enemy in outcome.leaked {
            let penalty = self
                .roster
                .get(enemy.kind)
                .map_or(1, |definition| definition.leak_penalty);
            debug!("enemy {} leaked for {penalty} health", enemy.id.get());
            out_events.push(Event::EnemyLeaked {
                enemy: enemy.id,
                kind: enemy.kind,
                penalty,
            });
            if self.ledger.lose_health(penalty) {
                self.end_run(out_events);
            }
        }
        for enemy in outcome.restored {
            out_events.push(Event::EnemySpeedRestored { enemy });
        }
    }

    fn damage_enemy(&mut self, id: EnemyId, amount: u32, out_events: &mut Vec<Event>) {
        let Some(enemy) = self.enemies.get_mut(id) else {
            return;
        };
        enemy.health = enemy.health.saturating_sub(amount);
        if enemy.health > 0 {
            out_events.push(Event::EnemyDamaged {
                enemy: id,
                amount,
                remaining: enemy.health,
            });
            return;
        }

        let Some(enemy) = self.enemies.remove(id) else {
            return;
        };
        let Some(definition) = self.roster.get(enemy.kind) else {
            return;
        };
        self.ledger.earn(definition.reward);
        self.ledger.record_kill();
        debug!(
            "enemy {} ({}) destroyed for {} coins",
            id.get(),
            definition.name,
            definition.reward
        );
        out_events.push(Event::EnemyKilled {
            enemy: id,
            kind: enemy.kind,
            reward: definition.reward,
        });

        let Some(split) = definition.split else {
            return;
        };
        let Some(child) = self.roster.get(split.kind) else {
            return;
        };
        for _ in 0..split.count {
            let spawned = self.enemies.spawn(child, enemy.position, enemy.waypoint);
            out_events.push(Event::EnemySpawned {
                enemy: spawned,
                kind: child.id,
                origin: SpawnOrigin::Split { parent: id },
            });
        }
    }

    fn advance_projectiles(&mut self, dt: Duration, out_events: &mut Vec<Event>) {
        for id in self.projectiles.ids() {
            let Some(projectile) = self.projectiles.get_mut(id) else {
                continue;
            };
            let target = self
                .enemies
                .get(projectile.target)
                .map(|enemy| enemy.position);
            match projectile.step(target, &self.bounds, dt) {
                Flight::Airborne => {}
                Flight::Hit => {
                    let Some(projectile) = self.projectiles.remove(id) else {
                        continue;
                    };
                    out_events.push(Event::ProjectileHit {
                        projectile: id,
                        enemy: projectile.target,
                        damage: projectile.damage,
                    });
                    self.damage_enemy(projectile.target, projectile.damage, out_events);
                }
                Flight::Expired(reason) => {
                    let _ = self.projectiles.remove(id);
                    out_events.push(Event::ProjectileExpired {
                        projectile: id,
                        reason,
                    });
                }
            }
        }
    }

    fn purchase_turret(&mut self, kind: TurretKind) -> Result<u32, PurchaseError> {
        let cost = self
            .catalog
            .get(kind)
            .ok_or(PurchaseError::UnknownKind(kind))?
            .cost;
        self.ledger.spend(cost)?;
        self.turrets.add_credit(kind);
        Ok(cost)
    }

    fn place_turret(
        &mut self,
        kind: TurretKind,
        position: Vec2,
        out_events: &mut Vec<Event>,
    ) -> Result<(), PlacementError> {
        if self.turrets.credits(kind) == 0 {
            return Err(PlacementError::NotPurchased);
        }
        let slot = self
            .turrets
            .nearest_slot(position)
            .ok_or(PlacementError::OutOfBounds)?;
        if self.turrets.is_occupied(slot) {
            return Err(PlacementError::Occupied);
        }
        let blueprint = self
            .catalog
            .get(kind)
            .ok_or(PlacementError::NotPurchased)?;
        let turret = self
            .turrets
            .place(slot, blueprint)
            .ok_or(PlacementError::Occupied)?;
        out_events.push(Event::TurretPlaced {
            turret: turret.id,
            kind,
            slot,
            position: turret.position,
        });
        Ok(())
    }

    fn upgrade_turret(
        &mut self,
        id: TurretId,
        track: UpgradeTrack,
    ) -> Result<(u8, u32), UpgradeError> {
        let turret = self.turrets.get(id).ok_or(UpgradeError::MissingTurret)?;
        if track == UpgradeTrack::Range && turret.kind.reach() == Reach::Global {
            return Err(UpgradeError::UnboundedRange);
        }
        let cost = turret
            .next_upgrade_cost(track)
            .ok_or(UpgradeError::MaxLevel)?;
        self.ledger.spend(cost)?;
        let turret = self
            .turrets
            .get_mut(id)
            .ok_or(UpgradeError::MissingTurret)?;
        Ok((turret.upgrade(track, cost), cost))
    }

    fn fire_projectile(&mut self, id: TurretId, target: EnemyId, out_events: &mut Vec<Event>) {
        if self.enemies.get(target).is_none() {
            return;
        }
        let Some(turret) = self.turrets.get_mut(id) else {
            return;
        };
        if !turret.is_charged() {
            return;
        }
        turret.charge = Duration::ZERO;
        let projectile = self.projectiles.launch(
            id,
            target,
            turret.position,
            turret.projectile_speed,
            turret.damage,
        );
        out_events.push(Event::ProjectileFired {
            projectile,
            turret: id,
            target,
        });
    }

    fn emit_frost_pulse(&mut self, id: TurretId, out_events: &mut Vec<Event>) {
        let Some(turret) = self.turrets.get_mut(id) else {
            return;
        };
        let Some(slow) = turret.slow else {
            return;
        };
        if !turret.is_charged() {
            return;
        }
        turret.charge = Duration::ZERO;
        let (origin, range) = (turret.position, turret.range);
        let duration =
            Duration::try_from_secs_f32(slow.duration_secs).unwrap_or(Duration::ZERO);

        let mut affected = 0_u32;
        for enemy in self.enemies.iter_mut() {
            if enemy.position.distance(origin) > range {
                continue;
            }
            enemy.apply_speed_modifier(slow.multiplier, duration);
            affected += 1;
            out_events.push(Event::EnemySlowed {
                enemy: enemy.id,
                multiplier: slow.multiplier,
            });
        }
        out_events.push(Event::FrostPulsed {
            turret: id,
            affected,
        });
    }

    fn end_run(&mut self, out_events: &mut Vec<Event>) {
        if self.over {
            return;
        }
        self.over = true;
        let snapshot = self.ledger.snapshot();
        info!(
            "run ended during wave {} after {} kills",
            snapshot.wave.get(),
            snapshot.kills
        );
        out_events.push(Event::RunEnded {
            wave: snapshot.wave,
            kills: snapshot.kills,
        });
    }

    fn reset(&mut self) {
        self.ledger.reset();
        self.enemies.clear();
        self.turrets.clear();
        self.projectiles.clear();
        self.over = false;
    }
}

/// Reports whether a command advances the simulation rather than acting for the player.
fn advances_simulation(command: &Command) -> bool {
    matches!(
        command,
        Command::Tick { .. }
            | Command::SpawnEnemy { .. }
            | Command::AdvanceEnemies { .. }
            | Command::AdvanceProjectiles { .. }
            | Command::AdvanceWave
            | Command::DamageEnemy { .. }
            | Command::SlowEnemy { .. }
            | Command::FireProjectile { .. }
            | Command::EmitFrostPulse { .. }
    )
}

/// Applies the provided command to the world, mutating state deterministically.
///
/// Once the run has ended, commands that advance the simulation are ignored
/// until [`Command::ResetRun`] is applied.
pub fn apply(world: &mut World, command: Command, out_events: &mut Vec<Event>) {
    if world.over && advances_simulation(&command) {
        return;
    }

    match command {
        Command::Tick { dt } => {
            out_events.push(Event::TimeAdvanced { dt });
        }
        Command::SpawnEnemy { kind } => world.spawn_enemy(kind, out_events),
        Command::AdvanceEnemies { dt } => world.advance_enemies(dt, out_events),
        Command::AdvanceProjectiles { dt } => world.advance_projectiles(dt, out_events),
        Command::AdvanceWave => {
            let wave = world.ledger.advance_wave();
            info!("wave {} is next", wave.get());
            out_events.push(Event::WaveAdvanced { wave });
        }
        Command::DamageEnemy { enemy, amount } => world.damage_enemy(enemy, amount, out_events),
        Command::SlowEnemy {
            enemy,
            multiplier,
            duration,
        } => {
            if let Some(target) = world.enemies.get_mut(enemy) {
                target.apply_speed_modifier(multiplier, duration);
                out_events.push(Event::EnemySlowed { enemy, multiplier });
            }
        }
        Command::PurchaseTurret { kind } => match world.purchase_turret(kind) {
            Ok(cost) => {
                debug!("purchased {kind:?} turret for {cost} coins");
                out_events.push(Event::TurretPurchased { kind, cost });
            }
            Err(reason) => out_events.push(Event::PurchaseRejected { kind, reason }),
        },
        Command::PlaceTurret { kind, position } => {
            if let Err(reason) = world.place_turret(kind, position, out_events) {
                out_events.push(Event::PlacementRejected {
                    kind,
                    position,
                    reason,
                });
            }
        }
        Command::SellTurret { turret } => match world.turrets.remove(turret) {
            Some(sold) => {
                let refund = sold.sell_value();
                world.ledger.earn(refund);
                debug!("sold turret {} for {refund} coins", turret.get());
                out_events.push(Event::TurretSold {
                    turret,
                    refund,
                    slot: sold.slot,
                });
            }
            None => out_events.push(Event::RemovalRejected {
                turret,
                reason: RemovalError::MissingTurret,
            }),
        },
        Command::RemoveTurret { turret } => match world.turrets.remove(turret) {
            Some(removed) => out_events.push(Event::TurretRemoved {
                turret,
                slot: removed.slot,
            }),
            None => out_events.push(Event::RemovalRejected {
                turret,
                reason: RemovalError::MissingTurret,
            }),
        },
        Command::UpgradeTurret { turret, track } => match world.upgrade_turret(turret, track) {
            Ok((level, cost)) => out_events.push(Event::TurretUpgraded {
                turret,
                track,
                level,
                cost,
            }),
            Err(reason) => out_events.push(Event::UpgradeRejected {
                turret,
                track,
                reason,
            }),
        },
        Command::LockTarget { turret, target } => {
            if let Some(state) = world.turrets.get_mut(turret) {
                if state.target != target {
                    state.target = target;
                    out_events.push(Event::TargetLocked { turret, target });
                }
            }
        }
        Command::AimTurret { turret, rotation } => {
            if let Some(state) = world.turrets.get_mut(turret) {
                state.rotation = rotation;
            }
        }
        Command::ChargeTurret { turret, dt } => {
            if let Some(state) = world.turrets.get_mut(turret) {
                state.charge = state.charge.saturating_add(dt);
            }
        }
        Command::FireProjectile { turret, target } => {
            world.fire_projectile(turret, target, out_events);
        }
        Command::EmitFrostPulse { turret } => world.emit_frost_pulse(turret, out_events),
        Command::ResetRun => {
            world.reset();
            info!("run reset");
            out_events.push(Event::RunReset);
        }
    }
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use waypoint_defence_core::{
        Bounds, EconomySnapshot, EnemySnapshot, EnemyView, ProjectileSnapshot, SlotSnapshot,
        TurretKind, TurretView, Vec2,
    };

    use super::World;

    /// Retrieves the welcome banner that adapters may display to players.
    #[must_use]
    pub fn welcome_banner(world: &World) -> &'static str {
        world.banner
    }

    /// Captures the economy and progress counters.
    #[must_use]
    pub fn economy(world: &World) -> EconomySnapshot {
        world.ledger.snapshot()
    }

    /// Reports whether the player ran out of health.
    #[must_use]
    pub fn is_over(world: &World) -> bool {
        world.over
    }

    /// Ordered waypoints enemies travel through.
    #[must_use]
    pub fn path(world: &World) -> &[Vec2] {
        &world.path
    }

    /// Playable area of the map.
    #[must_use]
    pub fn bounds(world: &World) -> Bounds {
        world.bounds
    }

    /// Captures a read-only view of the live enemies.
    #[must_use]
    pub fn enemy_view(world: &World) -> EnemyView {
        let snapshots: Vec<EnemySnapshot> = world.enemies.iter().map(|e| e.snapshot()).collect();
        EnemyView::from_snapshots(snapshots)
    }

    /// Captures a read-only view of the placed turrets.
    #[must_use]
    pub fn turret_view(world: &World) -> TurretView {
        TurretView::from_snapshots(world.turrets.iter().map(|t| t.snapshot()).collect())
    }

    /// Captures every projectile in flight in launch order.
    #[must_use]
    pub fn projectiles(world: &World) -> Vec<ProjectileSnapshot> {
        world.projectiles.iter().map(|p| p.snapshot()).collect()
    }

    /// Captures every turret slot and its occupant.
    #[must_use]
    pub fn slots(world: &World) -> Vec<SlotSnapshot> {
        world.turrets.slot_snapshots()
    }

    /// Number of purchased turrets of the kind still waiting for placement.
    #[must_use]
    pub fn pending_placements(world: &World, kind: TurretKind) -> u32 {
        world.turrets.credits(kind)
    }
}
