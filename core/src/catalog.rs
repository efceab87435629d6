//! Static definitions of enemy kinds and turret blueprints.

use serde::{Deserialize, Serialize};

use crate::{EnemyKindId, TurretKind};

fn default_leak_penalty() -> u32 {
    1
}

/// Declares the immutable attributes shared by every enemy of a kind.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EnemyKindDefinition {
    /// Identifier referenced by waves and split rules.
    pub id: EnemyKindId,
    /// Human readable name used in logs.
    pub name: String,
    /// Health every enemy of the kind starts with.
    pub health: u32,
    /// Base travel speed in world units per second.
    pub speed: f32,
    /// Coins awarded when an enemy of the kind is destroyed.
    pub reward: u32,
    /// Health removed from the player when an enemy of the kind leaks.
    #[serde(default = "default_leak_penalty")]
    pub leak_penalty: u32,
    /// Children released when an enemy of the kind is destroyed.
    #[serde(default)]
    pub split: Option<SplitRule>,
}

/// Describes the enemies released when a splitting enemy dies.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SplitRule {
    /// Kind of the released children.
    pub kind: EnemyKindId,
    /// Number of children released.
    pub count: u32,
}

/// Lookup table of enemy kinds keyed by identifier.
#[derive(Clone, Debug, Default)]
pub struct EnemyRoster {
    kinds: Vec<EnemyKindDefinition>,
}

impl EnemyRoster {
    /// Builds a roster from the provided definitions ordered by identifier.
    #[must_use]
    pub fn new(mut kinds: Vec<EnemyKindDefinition>) -> Self {
        kinds.sort_by_key(|kind| kind.id);
        Self { kinds }
    }

    /// Looks up the definition of a kind.
    #[must_use]
    pub fn get(&self, id: EnemyKindId) -> Option<&EnemyKindDefinition> {
        self.kinds
            .binary_search_by_key(&id, |kind| kind.id)
            .ok()
            .map(|index| &self.kinds[index])
    }
}

/// Slow applied by area turrets.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct SlowEffect {
    /// Multiplier applied to the base speed of affected enemies.
    pub multiplier: f32,
    /// Seconds until the base speed is restored.
    pub duration_secs: f32,
}

/// Purchase price and starting statistics of a turret kind.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct TurretBlueprint {
    /// Kind the blueprint describes.
    pub kind: TurretKind,
    /// Coins paid to purchase the turret.
    pub cost: u32,
    /// Damage captured by each projectile.
    pub damage: u32,
    /// Starting targeting range in world units.
    pub range: f32,
    /// Starting discharges per second.
    pub fire_rate: f32,
    /// Maximum angular speed in degrees per second.
    pub turn_rate_degrees: f32,
    /// Projectile travel speed in world units per second.
    pub projectile_speed: f32,
    /// Price of the first upgrade on either track; doubles after each purchase.
    pub upgrade_cost: u32,
    /// Range gained per range upgrade.
    pub range_step: f32,
    /// Fire rate gained per speed upgrade.
    pub fire_rate_step: f32,
    /// Slow applied by each discharge of an area turret.
    #[serde(default)]
    pub slow: Option<SlowEffect>,
}

impl TurretBlueprint {
    /// Maximum angular speed in radians per second.
    #[must_use]
    pub fn turn_rate(&self) -> f32 {
        self.turn_rate_degrees.to_radians()
    }
}

/// Lookup table of turret blueprints keyed by kind.
#[derive(Clone, Debug, Default)]
pub struct TurretCatalog {
    blueprints: Vec<TurretBlueprint>,
}

impl TurretCatalog {
    /// Builds a catalog from the provided blueprints ordered by kind.
    #[must_use]
    pub fn new(mut blueprints: Vec<TurretBlueprint>) -> Self {
        blueprints.sort_by_key(|blueprint| blueprint.kind);
        Self { blueprints }
    }

    /// Looks up the blueprint of a kind.
    #[must_use]
    pub fn get(&self, kind: TurretKind) -> Option<&TurretBlueprint> {
        self.blueprints
            .iter()
            .find(|blueprint| blueprint.kind == kind)
    }}
