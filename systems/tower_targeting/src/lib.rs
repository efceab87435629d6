#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure system that acquires and releases turret targets from world snapshots.
//!
//! Every turret kind is served by a [`TargetingStrategy`]. Each tick a held
//! target is re-validated; a target that no longer resolves or has left range
//! is released, and a turret without a target acquires the nearest candidate.

use std::fmt;

use waypoint_defence_core::{
    Command, Discharge, EnemyId, EnemySnapshot, EnemyView, Reach, TurretKind, TurretSnapshot,
    TurretView,
};

/// Capability describing how a turret variant chooses and keeps targets.
pub trait TargetingStrategy: fmt::Debug {
    /// Reports whether the enemy can be engaged by the turret.
    fn in_range(&self, turret: &TurretSnapshot, enemy: &EnemySnapshot) -> bool;

    /// Finds the nearest engageable enemy, breaking ties by ascending identifier.
    fn find_target(&self, turret: &TurretSnapshot, enemies: &EnemyView) -> Option<EnemyId> {
        let mut best: Option<Candidate> = None;
        for enemy in enemies.iter() {
            if !self.in_range(turret, enemy) {
                continue;
            }
            let current = Candidate {
                distance_sq: turret.position.distance_squared(enemy.position),
                enemy: enemy.id,
            };
            match &mut best {
                Some(existing) => {
                    if current.precedes(existing) {
                        *existing = current;
                    }
                }
                None => best = Some(current),
            }
        }
        best.map(|candidate| candidate.enemy)
    }
}

/// Engages the nearest enemy within the turret's range.
#[derive(Clone, Copy, Debug, Default)]
pub struct RangedStrategy;

impl TargetingStrategy for RangedStrategy {
    fn in_range(&self, turret: &TurretSnapshot, enemy: &EnemySnapshot) -> bool {
        turret.position.distance_squared(enemy.position) <= turret.range * turret.range
    }
}

/// Engages the nearest live enemy anywhere on the map.
#[derive(Clone, Copy, Debug, Default)]
pub struct GlobalStrategy;

impl TargetingStrategy for GlobalStrategy {
    fn in_range(&self, _turret: &TurretSnapshot, _enemy: &EnemySnapshot) -> bool {
        true
    }
}

/// Area turrets affect every enemy in range and never lock a target.
#[derive(Clone, Copy, Debug, Default)]
pub struct AreaStrategy;

impl TargetingStrategy for AreaStrategy {
    fn in_range(&self, turret: &TurretSnapshot, enemy: &EnemySnapshot) -> bool {
        RangedStrategy.in_range(turret, enemy)
    }

    fn find_target(&self, _turret: &TurretSnapshot, _enemies: &EnemyView) -> Option<EnemyId> {
        None
    }
}

/// Selects the targeting strategy of a turret kind.
#[must_use]
pub fn strategy_for(kind: TurretKind) -> &'static dyn TargetingStrategy {
    match (kind.discharge(), kind.reach()) {
        (Discharge::FrostPulse, _) => &AreaStrategy,
        (Discharge::Projectile, Reach::Global) => &GlobalStrategy,
        (Discharge::Projectile, Reach::Limited) => &RangedStrategy,
    }
}

/// Tower targeting system that turns snapshots into target lock commands.
#[derive(Debug, Default)]
pub struct TowerTargeting;

impl TowerTargeting {
    /// Creates a new tower targeting system.
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Emits [`Command::LockTarget`] for every turret whose target must change.
    ///
    /// A held target that is missing or out of range is released this tick and
    /// a replacement is acquired on the next one.
    pub fn handle(&mut self, turrets: &TurretView, enemies: &EnemyView, out: &mut Vec<Command>) {
        for turret in turrets.iter() {
            let strategy = strategy_for(turret.kind);
            match turret.target {
                Some(held) => {
                    let retained = enemies
                        .get(held)
                        .is_some_and(|enemy| strategy.in_range(turret, enemy));
                    if !retained {
                        out.push(Command::LockTarget {
                            turret: turret.id,
                            target: None,
                        });
                    }
                }
                None => {
                    if let Some(found) = strategy.find_target(turret, enemies) {
                        out.push(Command::LockTarget {
                            turret: turret.id,
                            target: Some(found),
                        });
                    }
                }
            }
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
struct Candidate {
    distance_sq: f32,
    enemy: EnemyId,
}

impl Candidate {
    fn precedes(&self, other: &Self) -> bool {
        if self.distance_sq != other.distance_sq {
            return self.distance_sq < other.distance_sq;
        }
        self.enemy < other.enemy
    }
}
