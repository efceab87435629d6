//! Enemy registry and path-following behaviour.

use std::{collections::BTreeMap, time::Duration};

use waypoint_defence_core::{
    EnemyId, EnemyKindDefinition, EnemyKindId, EnemySnapshot, Vec2, WAYPOINT_EPSILON,
};

/// Temporary scaling of an enemy's base speed.
#[derive(Clone, Copy, Debug, PartialEq)]
struct SpeedModifier {
    remaining: Duration,
}

/// Live enemy stored inside the world.
#[derive(Clone, Debug)]
pub(crate) struct Enemy {
    pub(crate) id: EnemyId,
    pub(crate) kind: EnemyKindId,
    pub(crate) position: Vec2,
    pub(crate) waypoint: usize,
    pub(crate) health: u32,
    speed: f32,
    base_speed: f32,
    modifier: Option<SpeedModifier>,
}

impl Enemy {
    /// Scales the base speed until `duration` elapses, replacing any active modifier.
    pub(crate) fn apply_speed_modifier(&mut self, multiplier: f32, duration: Duration) {
        self.speed = self.base_speed * multiplier;
        self.modifier = Some(SpeedModifier {
            remaining: duration,
        });
    }

    /// Walks along the path for `dt`. Returns `true` once the last waypoint is passed.
    fn travel(&mut self, path: &[Vec2], dt: Duration) -> bool {
        let mut budget = self.speed * dt.as_secs_f32();
        while let Some(&waypoint) = path.get(self.waypoint) {
            let offset = waypoint - self.position;
            let distance = offset.length();
            if distance > budget {
                if budget > 0.0 {
                    self.position += offset / distance * budget;
                }
                if self.position.distance(waypoint) > WAYPOINT_EPSILON {
                    return false;
                }
                budget = 0.0;
            } else {
                self.position = waypoint;
                budget -= distance;
            }
            self.waypoint += 1;
        }
        true
    }

    /// Counts down the active modifier. Returns `true` when base speed was restored.
    fn expire_modifier(&mut self, dt: Duration) -> bool {
        let Some(modifier) = self.modifier.as_mut() else {
            return false;
        };
        modifier.remaining = modifier.remaining.saturating_sub(dt);
        if !modifier.remaining.is_zero() {
            return false;
        }
        self.modifier = None;
        self.speed = self.base_speed;
        true
    }

    pub(crate) fn snapshot(&self) -> EnemySnapshot {
        EnemySnapshot {
            id: self.id,
            kind: self.kind,
            position: self.position,
            waypoint: self.waypoint,
            health: self.health,
            speed: self.speed,
            base_speed: self.base_speed,
        }
    }
}

/// Outcome of moving every enemy for one step.
#[derive(Debug, Default)]
pub(crate) struct Advance {
    /// Enemies that walked past the last waypoint, removed from the registry.
    pub(crate) leaked: Vec<Enemy>,
    /// Enemies whose speed modifier expired.
    pub(crate) restored: Vec<EnemyId>,
}

/// Registry that stores enemies and manages identifier allocation.
#[derive(Debug)]
pub(crate) struct EnemyRegistry {
    entries: BTreeMap<EnemyId, Enemy>,
    next_enemy_id: EnemyId,
}

impl EnemyRegistry {
    /// Creates an empty registry with a reset identifier counter.
    pub(crate) fn new() -> Self {
        Self {
            entries: BTreeMap::new(),
            next_enemy_id: EnemyId::new(0),
        }
    }

    pub(crate) fn clear(&mut self) {
        *self = Self::new();
    }

    /// Inserts an enemy of the provided kind heading for `waypoint`.
    pub(crate) fn spawn(
        &mut self,
        definition: &EnemyKindDefinition,
        position: Vec2,
        waypoint: usize,
    ) -> EnemyId {
        let id = self.next_enemy_id;
        self.next_enemy_id = EnemyId::new(id.get().saturating_add(1));
        let enemy = Enemy {
            id,
            kind: definition.id,
            position,
            waypoint,
            health: definition.health,
            speed: definition.speed,
            base_speed: definition.speed,
            modifier: None,
        };
        let _ = self.entries.insert(id, enemy);
        id
    }

    pub(crate) fn get(&self, id: EnemyId) -> Option<&Enemy> {
        self.entries.get(&id)
    }

    pub(crate) fn get_mut(&mut self, id: EnemyId) -> Option<&mut Enemy> {
        self.entries.get_mut(&id)
    }

    pub(crate) fn remove(&mut self, id: EnemyId) -> Option<Enemy> {
        self.entries.remove(&id)
    }

    pub(crate) fn iter(&self) -> impl Iterator<Item = &Enemy> {
        self.entries.values()
    }

    pub(crate) fn iter_mut(&mut self) -> impl Iterator<Item = &mut Enemy> {
        self.entries.values_mut()
    }

    /// Moves every enemy along the path, then counts down speed modifiers of survivors.
    pub(crate) fn advance(&mut self, path: &[Vec2], dt: Duration) -> Advance {
        let mut outcome = Advance::default();
        let leaked: Vec<EnemyId> = self
            .entries
            .values_mut()
            .filter_map(|enemy| enemy.travel(path, dt).then_some(enemy.id))
            .collect();
        for id in leaked {
            if let Some(enemy) = self.entries.remove(&id) {
                outcome.leaked.push(enemy);
            }
        }
        for enemy in self.entries.values_mut() {
            if enemy.expire_modifier(dt) {
                outcome.restored.push(enemy.id);
            }
        }
        outcome
    }
}
