//! Projectiles in flight and their per-step resolution.

use std::{collections::BTreeMap, time::Duration};

use waypoint_defence_core::{
    Bounds, EnemyId, ExpiryReason, ProjectileId, ProjectileSnapshot, TurretId, Vec2,
};

/// Projectile stored inside the world.
#[derive(Clone, Debug)]
pub(crate) struct Projectile {
    pub(crate) id: ProjectileId,
    pub(crate) source: TurretId,
    pub(crate) target: EnemyId,
    pub(crate) position: Vec2,
    pub(crate) speed: f32,
    pub(crate) damage: u32,
}

/// Result of moving a projectile for one step.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) enum Flight {
    /// Still travelling.
    Airborne,
    /// Reached the target this step.
    Hit,
    /// Vanished without effect.
    Expired(ExpiryReason),
}

impl Projectile {
    /// Moves toward the target's current position, if the target still exists.
    pub(crate) fn step(&mut self, target: Option<Vec2>, bounds: &Bounds, dt: Duration) -> Flight {
        let Some(destination) = target else {
            return Flight::Expired(ExpiryReason::TargetLost);
        };

        let travel = self.speed * dt.as_secs_f32();
        let offset = destination - self.position;
        let distance = offset.length();
        if distance <= travel {
            self.position = destination;
            return Flight::Hit;
        }

        self.position += offset / distance * travel;
        if bounds.contains(self.position) {
            Flight::Airborne
        } else {
            Flight::Expired(ExpiryReason::OutOfBounds)
        }
    }

    pub(crate) fn snapshot(&self) -> ProjectileSnapshot {
        ProjectileSnapshot {
            id: self.id,
            source: self.source,
            target: self.target,
            position: self.position,
            damage: self.damage,
        }
    }
}

/// Registry that stores projectiles and manages identifier allocation.
#[derive(Debug)]
pub(crate) struct ProjectileRegistry {
    entries: BTreeMap<ProjectileId, Projectile>,
    next_projectile_id: ProjectileId,
}

impl ProjectileRegistry {
    /// Creates an empty registry with a reset identifier counter.
    pub(crate) fn new() -> Self {
        Self {
            entries: BTreeMap::new(),
            next_projectile_id: ProjectileId::new(0),
        }
    }

    pub(crate) fn clear(&mut self) {
        *self = Self::new();
    }

    /// Launches a projectile from `position` toward `target`.
    pub(crate) fn launch(
        &mut self,
        source: TurretId,
        target: EnemyId,
        position: Vec2,
        speed: f32,
        damage: u32,
    ) -> ProjectileId {
        let id = self.next_projectile_id;
        self.next_projectile_id = ProjectileId::new(id.get().saturating_add(1));
        let projectile = Projectile {
            id,
            source,
            target,
            position,
            speed,
            damage,
        };
        let _ = self.entries.insert(id, projectile);
        id
    }

    /// Identifiers of every projectile in flight, in launch order.
    pub(crate) fn ids(&self) -> Vec<ProjectileId> {
        self.entries.keys().copied().collect()
    }

    pub(crate) fn get_mut(&mut self, id: ProjectileId) -> Option<&mut Projectile> {
        self.entries.get_mut(&id)
    }

    pub(crate) fn remove(&mut self, id: ProjectileId) -> Option<Projectile> {
        self.entries.remove(&id)
    }

    pub(crate) fn iter(&self) -> impl Iterator<Item = &Projectile> {
        self.entries.values()
    }
}
