//! Run configuration: economy, map, kind definitions and wave pacing.

use std::{collections::BTreeSet, time::Duration};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{
    catalog::{
        EnemyKindDefinition, EnemyRoster, SlowEffect, SplitRule, TurretBlueprint, TurretCatalog,
    },
    Bounds, Discharge, EnemyKindId, KindCount, Reach, TurretKind, Vec2,
};

/// Most children a single split rule may release.
pub const MAX_SPLIT_CHILDREN: u32 = 8;

/// Errors reported when a configuration cannot drive a run.
#[derive(Clone, Debug, PartialEq, Error)]
pub enum ConfigError {
    /// The path declares no waypoints.
    #[error("the enemy path needs at least one waypoint")]
    EmptyPath,
    /// The playable bounds have a corner inverted.
    #[error("bounds minimum must not exceed the maximum")]
    InvalidBounds,
    /// The slot snap radius is zero, negative or not finite.
    #[error("slot snap radius must be positive")]
    NonPositiveSnapRadius,
    /// No enemy kinds were declared.
    #[error("at least one enemy kind must be declared")]
    NoEnemyKinds,
    /// Two enemy kinds share an identifier.
    #[error("enemy kind {0:?} is declared more than once")]
    DuplicateEnemyKind(EnemyKindId),
    /// A split rule or wave references an undeclared enemy kind.
    #[error("enemy kind {0:?} is referenced but never declared")]
    UnknownEnemyKind(EnemyKindId),
    /// An enemy kind has a non-positive or non-finite speed.
    #[error("enemy kind {0:?} must have a positive speed")]
    NonPositiveSpeed(EnemyKindId),
    /// An enemy kind has zero health.
    #[error("enemy kind {0:?} must start with positive health")]
    ZeroHealth(EnemyKindId),
    /// Split rules form a cycle that would never terminate.
    #[error("split rules starting at enemy kind {0:?} form a cycle")]
    SplitCycle(EnemyKindId),
    /// Two blueprints describe the same turret kind.
    #[error("turret kind {0:?} is declared more than once")]
    DuplicateTurretKind(TurretKind),
    /// A blueprint has a non-positive or non-finite fire rate.
    #[error("turret kind {0:?} must have a positive fire rate")]
    NonPositiveFireRate(TurretKind),
    /// A slow effect multiplier lies outside `0.0..=1.0`.
    #[error("turret kind {0:?} slow multiplier must lie within 0..=1")]
    InvalidSlow(TurretKind),
    /// A frost blueprint declares no slow effect to pulse.
    #[error("turret kind {0:?} pulses frost but declares no slow effect")]
    MissingSlow(TurretKind),
    /// A projectile blueprint fires projectiles that would never move.
    #[error("turret kind {0:?} must have a positive projectile speed")]
    NonPositiveProjectileSpeed(TurretKind),
    /// A limited-reach blueprint sells range upgrades that add no range.
    #[error("turret kind {0:?} must gain range with every range upgrade")]
    NonPositiveRangeStep(TurretKind),
    /// A split rule releases more children than a single death may spawn.
    #[error("enemy kind {0:?} splits into more than {} children", MAX_SPLIT_CHILDREN)]
    ExcessiveSplit(EnemyKindId),
    /// The delay between waves is negative or not finite.
    #[error("time between waves must be a non-negative number of seconds")]
    NegativeWaveDelay,
    /// The wave table has no entries.
    #[error("the wave table needs at least one entry")]
    EmptyWaveTable,
    /// A wave table entry uses index zero.
    #[error("wave indices start at 1")]
    ZeroWaveIndex,
    /// Two wave table entries share an index.
    #[error("wave {0} is declared more than once")]
    DuplicateWave(u32),
    /// A spawn interval is zero, negative or not finite.
    #[error("spawn intervals must be positive")]
    NonPositiveInterval,
    /// Formula scaling parameters are negative or not finite.
    #[error("wave formula parameters must be finite and non-negative")]
    InvalidFormula,
}

/// Starting economy of every run.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EconomyConfig {
    /// Coins the player starts with.
    pub starting_coins: u32,
    /// Health the player starts with.
    pub starting_health: u32,
}

/// Static geometry of the battlefield.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MapConfig {
    /// Ordered waypoints enemies travel through.
    pub waypoints: Vec<Vec2>,
    /// Positions turrets may be placed on.
    pub slots: Vec<Vec2>,
    /// Maximum distance between a requested position and the slot it snaps to.
    pub slot_snap_radius: f32,
    /// Playable area; projectiles leaving it are discarded.
    pub bounds: Bounds,
}

/// Policy choosing which kind the next released enemy belongs to.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "policy", rename_all = "snake_case")]
pub enum SelectionPolicy {
    /// First declared kind with enemies left.
    #[default]
    FirstAvailable,
    /// Uniformly random kind among those with enemies left.
    UniformRandom {
        /// Seed combined with the wave index to drive the selection.
        seed: u64,
    },
}

/// Composition of one wave in a static table.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct WaveTableEntry {
    /// One-based wave index.
    pub wave: u32,
    /// Seconds between two releases.
    pub spawn_interval_secs: f32,
    /// Enemies per kind in release order.
    pub counts: Vec<KindCount>,
}

/// Parameters of the closed-form wave composition.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct FormulaConfig {
    /// Generic kind every enemy belongs to.
    pub kind: EnemyKindId,
    /// Enemies released during the first wave.
    pub base: f32,
    /// Exponent applied to the wave index.
    pub scaling_factor: f32,
    /// Seconds between releases during the first wave.
    pub base_interval_secs: f32,
    /// Factor applied to the interval for every later wave.
    pub interval_decay: f32,
    /// Shortest interval the formula may produce.
    pub min_interval_secs: f32,
}

/// Source of wave compositions.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum WaveProviderConfig {
    /// Static table keyed by wave index, extrapolated past its last entry.
    Table {
        /// Declared waves.
        entries: Vec<WaveTableEntry>,
        /// Shortest interval extrapolation may produce.
        min_spawn_interval_secs: f32,
    },
    /// Closed-form composition.
    Formula(FormulaConfig),
}

/// Wave pacing configuration.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct WaveConfig {
    /// Seconds spent idle before each wave starts.
    pub time_between_waves_secs: f32,
    /// Kind selection policy.
    #[serde(default)]
    pub selection: SelectionPolicy,
    /// Source of wave compositions.
    pub provider: WaveProviderConfig,
}

impl WaveConfig {
    /// Idle delay before each wave.
    #[must_use]
    pub fn time_between_waves(&self) -> Duration {
        Duration::try_from_secs_f32(self.time_between_waves_secs).unwrap_or(Duration::ZERO)
    }
}

/// Complete description of a run.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GameConfig {
    /// Starting economy.
    pub economy: EconomyConfig,
    /// Battlefield geometry.
    pub map: MapConfig,
    /// Enemy kinds in declared order.
    pub enemies: Vec<EnemyKindDefinition>,
    /// Turret blueprints.
    pub turrets: Vec<TurretBlueprint>,
    /// Wave pacing.
    pub waves: WaveConfig,
}

impl GameConfig {
    /// Builds the lookup table of enemy kinds.
    #[must_use]
    pub fn roster(&self) -> EnemyRoster {
        EnemyRoster::new(self.enemies.clone())
    }

    /// Builds the lookup table of turret blueprints.
    #[must_use]
    pub fn catalog(&self) -> TurretCatalog {
        TurretCatalog::new(self.turrets.clone())
    }

    /// Checks that the configuration can drive a run.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.validate_map()?;
        self.validate_enemies()?;
        self.validate_turrets()?;
        self.validate_waves()
    }

    fn validate_map(&self) -> Result<(), ConfigError> {
        if self.map.waypoints.is_empty() {
            return Err(ConfigError::EmptyPath);
        }
        let bounds = self.map.bounds;
        if bounds.min.x > bounds.max.x || bounds.min.y > bounds.max.y {
            return Err(ConfigError::InvalidBounds);
        }
        if !positive(self.map.slot_snap_radius) {
            return Err(ConfigError::NonPositiveSnapRadius);
        }
        Ok(())
    }

    fn validate_enemies(&self) -> Result<(), ConfigError> {
        if self.enemies.is_empty() {
            return Err(ConfigError::NoEnemyKinds);
        }

        let mut declared = BTreeSet::new();
        for kind in &self.enemies {
            if !declared.insert(kind.id) {
                return Err(ConfigError::DuplicateEnemyKind(kind.id));
            }
            if !positive(kind.speed) {
                return Err(ConfigError::NonPositiveSpeed(kind.id));
            }
            if kind.health == 0 {
                return Err(ConfigError::ZeroHealth(kind.id));
            }
        }

        let roster = self.roster();
        for kind in &self.enemies {
            if matches!(kind.split, Some(rule) if rule.count > MAX_SPLIT_CHILDREN) {
                return Err(ConfigError::ExcessiveSplit(kind.id));
            }
            let mut visited = BTreeSet::new();
            let mut current = kind.split;
            let _ = visited.insert(kind.id);
            while let Some(SplitRule { kind: child, .. }) = current {
                let Some(definition) = roster.get(child) else {
                    return Err(ConfigError::UnknownEnemyKind(child));
                };
                if !visited.insert(child) {
                    return Err(ConfigError::SplitCycle(kind.id));
                }
                current = definition.split;
            }
        }
        Ok(())
    }

    fn validate_turrets(&self) -> Result<(), ConfigError> {
        let mut declared = BTreeSet::new();
        for blueprint in &self.turrets {
            if !declared.insert(blueprint.kind) {
                return Err(ConfigError::DuplicateTurretKind(blueprint.kind));
            }
            if !positive(blueprint.fire_rate) {
                return Err(ConfigError::NonPositiveFireRate(blueprint.kind));
            }
            if let Some(slow) = blueprint.slow {
                if !(0.0..=1.0).contains(&slow.multiplier) || !slow.duration_secs.is_finite() {
                    return Err(ConfigError::InvalidSlow(blueprint.kind));
                }
            }
            match blueprint.kind.discharge() {
                Discharge::FrostPulse if blueprint.slow.is_none() => {
                    return Err(ConfigError::MissingSlow(blueprint.kind));
                }
                Discharge::Projectile if !positive(blueprint.projectile_speed) => {
                    return Err(ConfigError::NonPositiveProjectileSpeed(blueprint.kind));
                }
                _ => {}
            }
            if blueprint.kind.reach() == Reach::Limited && !positive(blueprint.range_step) {
                return Err(ConfigError::NonPositiveRangeStep(blueprint.kind));
            }
        }
        Ok(())
    }

    fn validate_waves(&self) -> Result<(), ConfigError> {
        let delay = self.waves.time_between_waves_secs;
        if !delay.is_finite() || delay < 0.0 {
            return Err(ConfigError::NegativeWaveDelay);
        }

        let roster = self.roster();
        let known = |kind: EnemyKindId| {
            roster
                .get(kind)
                .map(|_| ())
                .ok_or(ConfigError::UnknownEnemyKind(kind))
        };

        match &self.waves.provider {
            WaveProviderConfig::Table {
                entries,
                min_spawn_interval_secs,
            } => {
                if entries.is_empty() {
                    return Err(ConfigError::EmptyWaveTable);
                }
                if !positive(*min_spawn_interval_secs) {
                    return Err(ConfigError::NonPositiveInterval);
                }
                let mut waves = BTreeSet::new();
                for entry in entries {
                    if entry.wave == 0 {
                        return Err(ConfigError::ZeroWaveIndex);
                    }
                    if !waves.insert(entry.wave) {
                        return Err(ConfigError::DuplicateWave(entry.wave));
                    }
                    if !positive(entry.spawn_interval_secs) {
                        return Err(ConfigError::NonPositiveInterval);
                    }
                    for count in &entry.counts {
                        known(count.kind)?;
                    }
                }
            }
            WaveProviderConfig::Formula(formula) => {
                known(formula.kind)?;
                if !positive(formula.base_interval_secs) || !positive(formula.min_interval_secs) {
                    return Err(ConfigError::NonPositiveInterval);
                }
                let parameters = [formula.base, formula.scaling_factor, formula.interval_decay];
                if parameters
                    .iter()
                    .any(|value| !value.is_finite() || *value < 0.0)
                {
                    return Err(ConfigError::InvalidFormula);
                }
            }
        }
        Ok(())
    }

    /// Built-in scenario: a winding path, three enemy kinds and twenty waves.
    #[must_use]
    pub fn standard() -> Self {
        let grunt = EnemyKindId::new(0);
        let runner = EnemyKindId::new(1);
        let brute = EnemyKindId::new(2);

        Self {
            economy: EconomyConfig {
                starting_coins: 300,
                starting_health: 10,
            },
            map: MapConfig {
                waypoints: vec![
                    Vec2::new(-10.0, 2.0),
                    Vec2::new(-4.0, 2.0),
                    Vec2::new(-4.0, -3.0),
                    Vec2::new(3.0, -3.0),
                    Vec2::new(3.0, 3.0),
                    Vec2::new(10.0, 3.0),
                ],
                slots: vec![
                    Vec2::new(-7.0, 0.0),
                    Vec2::new(-7.0, 4.0),
                    Vec2::new(-2.0, 0.0),
                    Vec2::new(-2.0, -5.0),
                    Vec2::new(1.0, -1.0),
                    Vec2::new(1.0, 5.0),
                    Vec2::new(5.0, 0.0),
                    Vec2::new(7.0, 5.0),
                ],
                slot_snap_radius: 0.75,
                bounds: Bounds::new(Vec2::new(-10.0, -6.0), Vec2::new(10.0, 6.0)),
            },
            enemies: vec![
                EnemyKindDefinition {
                    id: grunt,
                    name: "grunt".to_string(),
                    health: 2,
                    speed: 2.0,
                    reward: 5,
                    leak_penalty: 1,
                    split: None,
                },
                EnemyKindDefinition {
                    id: runner,
                    name: "runner".to_string(),
                    health: 1,
                    speed: 3.5,
                    reward: 5,
                    leak_penalty: 1,
                    split: None,
                },
                EnemyKindDefinition {
                    id: brute,
                    name: "brute".to_string(),
                    health: 8,
                    speed: 1.2,
                    reward: 15,
                    leak_penalty: 1,
                    split: Some(SplitRule {
                        kind: grunt,
                        count: 2,
                    }),
                },
            ],
            turrets: vec![
                TurretBlueprint {
                    kind: TurretKind::Cannon,
                    cost: 100,
                    damage: 1,
                    range: 3.0,
                    fire_rate: 1.0,
                    turn_rate_degrees: 180.0,
                    projectile_speed: 10.0,
                    upgrade_cost: 50,
                    range_step: 0.5,
                    fire_rate_step: 0.25,
                    slow: None,
                },
                TurretBlueprint {
                    kind: TurretKind::Frost,
                    cost: 125,
                    damage: 0,
                    range: 1.5,
                    fire_rate: 0.25,
                    turn_rate_degrees: 0.0,
                    projectile_speed: 0.0,
                    upgrade_cost: 60,
                    range_step: 0.5,
                    fire_rate_step: 0.25,
                    slow: Some(SlowEffect {
                        multiplier: 0.5,
                        duration_secs: 1.0,
                    }),
                },
                TurretBlueprint {
                    kind: TurretKind::Sniper,
                    cost: 200,
                    damage: 3,
                    range: 0.0,
                    fire_rate: 0.5,
                    turn_rate_degrees: 90.0,
                    projectile_speed: 20.0,
                    upgrade_cost: 100,
                    range_step: 0.0,
                    fire_rate_step: 0.1,
                    slow: None,
                },
            ],
            waves: WaveConfig {
                time_between_waves_secs: 5.0,
                selection: SelectionPolicy::FirstAvailable,
                provider: WaveProviderConfig::Table {
                    entries: standard_wave_table(grunt, runner, brute),
                    min_spawn_interval_secs: 0.05,
                },
            },
        }
    }
}

fn standard_wave_table(
    grunt: EnemyKindId,
    runner: EnemyKindId,
    brute: EnemyKindId,
) -> Vec<WaveTableEntry> {
    const TABLE: [(u32, u32, u32, f32); 20] = [
        (10, 0, 0, 1.0),
        (15, 5, 0, 0.9),
        (20, 10, 5, 0.8),
        (25, 15, 10, 0.75),
        (30, 20, 15, 0.7),
        (35, 25, 20, 0.65),
        (40, 30, 25, 0.6),
        (45, 35, 30, 0.55),
        (50, 40, 35, 0.5),
        (55, 45, 40, 0.45),
        (60, 50, 45, 0.4),
        (65, 55, 50, 0.35),
        (70, 60, 55, 0.3),
        (75, 65, 60, 0.25),
        (80, 70, 65, 0.2),
        (85, 75, 70, 0.18),
        (90, 80, 75, 0.16),
        (95, 85, 80, 0.14),
        (100, 90, 85, 0.12),
        (110, 100, 90, 0.1),
    ];

    TABLE
        .iter()
        .zip(1_u32..)
        .map(|(&(grunts, runners, brutes, interval), wave)| WaveTableEntry {
            wave,
            spawn_interval_secs: interval,
            counts: vec![
                KindCount::new(grunt, grunts),
                KindCount::new(runner, runners),
                KindCount::new(brute, brutes),
            ],
        })
        .collect()
}

fn positive(value: f32) -> bool {
    value.is_finite() && value > 0.0
}
