#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Waypoint Defence simulation.
//!
//! This crate defines the message surface that connects adapters, the
//! authoritative world, and pure systems. Adapters submit [`Command`] values
//! describing desired mutations, the world executes those commands via its
//! `apply` entry point, and then broadcasts [`Event`] values for systems to
//! react to deterministically. Systems consume event streams, query immutable
//! snapshots such as [`EnemyView`] and [`TurretView`], and respond exclusively
//! with new command batches.
//!
//! Entities never hold references to each other. Turrets and projectiles
//! remember their target as an [`EnemyId`] handle that must be resolved
//! through the world on every use, so a destroyed enemy is observed as a
//! handle that no longer resolves.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub mod catalog;
pub mod config;
pub mod waves;

pub use catalog::{
    EnemyKindDefinition, EnemyRoster, SlowEffect, SplitRule, TurretBlueprint, TurretCatalog,
};
pub use config::{
    ConfigError, EconomyConfig, FormulaConfig, GameConfig, MapConfig, SelectionPolicy,
    WaveConfig, WaveProviderConfig, WaveTableEntry, MAX_SPLIT_CHILDREN,
};
pub use glam::Vec2;
pub use waves::{KindCount, WaveSpec};

/// Canonical banner emitted when the experience boots.
pub const WELCOME_BANNER: &str = "Welcome to Waypoint Defence.";

/// Distance at which an enemy is considered to have reached a waypoint.
pub const WAYPOINT_EPSILON: f32 = 0.1;

/// Highest level either turret upgrade track can reach.
pub const MAX_UPGRADE_LEVEL: u8 = 3;

/// Share of the cumulative spend refunded when a turret is sold, in percent.
pub const SELL_RATIO_PERCENT: u32 = 80;

/// Computes the refund granted for a turret with the provided cumulative spend.
///
/// The refund is 80% of the spend rounded to the nearest coin, with halves
/// rounding up.
#[must_use]
pub fn sell_value_for(cumulative_spend: u32) -> u32 {
    let scaled = u64::from(cumulative_spend) * u64::from(SELL_RATIO_PERCENT);
    let rounded = (scaled + 50) / 100;
    u32::try_from(rounded).unwrap_or(u32::MAX)
}

/// Price of the upgrade that lifts a track from `level`, doubling per level.
#[must_use]
pub fn upgrade_cost_for(base: u32, level: u8) -> u32 {
    base.saturating_mul(1_u32.checked_shl(u32::from(level)).unwrap_or(u32::MAX))
}

/// Converts a fire rate expressed in shots per second into a cooldown period.
///
/// Non-positive or non-finite rates never become ready and map to
/// [`Duration::MAX`].
#[must_use]
pub fn fire_period(fire_rate: f32) -> Duration {
    if !fire_rate.is_finite() || fire_rate <= 0.0 {
        return Duration::MAX;
    }

    Duration::try_from_secs_f32(1.0 / fire_rate).unwrap_or(Duration::MAX)
}

/// Commands that express all permissible world mutations.
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    /// Advances the simulation clock by the provided delta time.
    Tick {
        /// Duration of simulated time that elapsed since the previous tick.
        dt: Duration,
    },
    /// Requests that a new enemy of the provided kind enters at the path start.
    SpawnEnemy {
        /// Kind of enemy to release.
        kind: EnemyKindId,
    },
    /// Moves every enemy along the path and expires elapsed speed modifiers.
    AdvanceEnemies {
        /// Duration of simulated time the enemies travel for.
        dt: Duration,
    },
    /// Moves every projectile toward its target and resolves hits.
    AdvanceProjectiles {
        /// Duration of simulated time the projectiles travel for.
        dt: Duration,
    },
    /// Records that the current wave completed and the next one is due.
    AdvanceWave,
    /// Applies direct damage to an enemy.
    DamageEnemy {
        /// Enemy receiving the damage.
        enemy: EnemyId,
        /// Amount of health removed.
        amount: u32,
    },
    /// Temporarily scales an enemy's speed.
    SlowEnemy {
        /// Enemy affected by the modifier.
        enemy: EnemyId,
        /// Multiplier applied to the enemy's base speed.
        multiplier: f32,
        /// Time after which the base speed is restored.
        duration: Duration,
    },
    /// Requests the purchase of a turret, banking a placement credit.
    PurchaseTurret {
        /// Kind of turret being bought.
        kind: TurretKind,
    },
    /// Requests placement of a purchased turret on the slot nearest to a position.
    PlaceTurret {
        /// Kind of turret to place.
        kind: TurretKind,
        /// World position the placement was requested at.
        position: Vec2,
    },
    /// Requests the sale of a turret in exchange for its sell value.
    SellTurret {
        /// Identifier of the turret being sold.
        turret: TurretId,
    },
    /// Requests removal of a turret without refund.
    RemoveTurret {
        /// Identifier of the turret targeted for removal.
        turret: TurretId,
    },
    /// Requests an upgrade on one of the turret's upgrade tracks.
    UpgradeTurret {
        /// Identifier of the turret being upgraded.
        turret: TurretId,
        /// Track that should gain a level.
        track: UpgradeTrack,
    },
    /// Replaces the target a turret tracks.
    LockTarget {
        /// Turret whose target changes.
        turret: TurretId,
        /// New target, or `None` to release the current one.
        target: Option<EnemyId>,
    },
    /// Sets the aim of a turret.
    AimTurret {
        /// Turret being rotated.
        turret: TurretId,
        /// New rotation in radians, measured counter-clockwise from the x axis.
        rotation: f32,
    },
    /// Accumulates time toward a turret's next discharge.
    ChargeTurret {
        /// Turret being charged.
        turret: TurretId,
        /// Duration added to the turret's charge.
        dt: Duration,
    },
    /// Requests that a charged turret fires a projectile at its target.
    FireProjectile {
        /// Turret that fires.
        turret: TurretId,
        /// Enemy captured by the projectile.
        target: EnemyId,
    },
    /// Requests that a charged frost turret slows every enemy within range.
    EmitFrostPulse {
        /// Turret emitting the pulse.
        turret: TurretId,
    },
    /// Discards all run state and restores the starting economy.
    ResetRun,
}

/// Events broadcast by the world after processing commands.
#[derive(Clone, Debug, PartialEq)]
pub enum Event {
    /// Indicates that the simulation clock advanced.
    TimeAdvanced {
        /// Duration of simulated time that elapsed in the tick.
        dt: Duration,
    },
    /// Confirms that an enemy entered the path.
    EnemySpawned {
        /// Identifier assigned to the new enemy.
        enemy: EnemyId,
        /// Kind of the new enemy.
        kind: EnemyKindId,
        /// What caused the enemy to appear.
        origin: SpawnOrigin,
    },
    /// Reports that a spawn request referenced an unknown enemy kind.
    EnemySpawnRejected {
        /// Kind named in the rejected request.
        kind: EnemyKindId,
    },
    /// Reports that an enemy walked past the last waypoint.
    EnemyLeaked {
        /// Identifier of the enemy that leaked.
        enemy: EnemyId,
        /// Kind of the enemy that leaked.
        kind: EnemyKindId,
        /// Player health removed by the leak.
        penalty: u32,
    },
    /// Reports that an enemy survived a hit.
    EnemyDamaged {
        /// Identifier of the damaged enemy.
        enemy: EnemyId,
        /// Damage that was applied.
        amount: u32,
        /// Health left after the hit.
        remaining: u32,
    },
    /// Reports that an enemy was destroyed by damage.
    EnemyKilled {
        /// Identifier of the destroyed enemy.
        enemy: EnemyId,
        /// Kind of the destroyed enemy.
        kind: EnemyKindId,
        /// Coins awarded for the kill.
        reward: u32,
    },
    /// Reports that a speed modifier was applied to an enemy.
    EnemySlowed {
        /// Identifier of the slowed enemy.
        enemy: EnemyId,
        /// Multiplier applied to the base speed.
        multiplier: f32,
    },
    /// Reports that an enemy's speed modifier expired.
    EnemySpeedRestored {
        /// Identifier of the enemy that regained its base speed.
        enemy: EnemyId,
    },
    /// Announces that the ledger moved to a new wave.
    WaveAdvanced {
        /// Wave that became current.
        wave: WaveId,
    },
    /// Confirms that a turret purchase was paid for.
    TurretPurchased {
        /// Kind of turret bought.
        kind: TurretKind,
        /// Coins deducted for the purchase.
        cost: u32,
    },
    /// Reports that a turret purchase was rejected.
    PurchaseRejected {
        /// Kind of turret requested.
        kind: TurretKind,
        /// Specific reason the purchase failed.
        reason: PurchaseError,
    },
    /// Confirms that a turret was placed into the world.
    TurretPlaced {
        /// Identifier assigned to the turret by the world.
        turret: TurretId,
        /// Kind of turret that was placed.
        kind: TurretKind,
        /// Slot occupied by the turret.
        slot: SlotId,
        /// Position of the slot.
        position: Vec2,
    },
    /// Reports that a turret placement request was rejected.
    PlacementRejected {
        /// Kind of turret requested for placement.
        kind: TurretKind,
        /// Position provided in the placement request.
        position: Vec2,
        /// Specific reason the placement failed.
        reason: PlacementError,
    },
    /// Confirms that a turret was sold.
    TurretSold {
        /// Identifier of the sold turret.
        turret: TurretId,
        /// Coins refunded to the player.
        refund: u32,
        /// Slot released by the sale.
        slot: SlotId,
    },
    /// Confirms that a turret was removed without refund.
    TurretRemoved {
        /// Identifier of the removed turret.
        turret: TurretId,
        /// Slot released by the removal.
        slot: SlotId,
    },
    /// Reports that a sale or removal request was rejected.
    RemovalRejected {
        /// Identifier named in the request.
        turret: TurretId,
        /// Specific reason the request failed.
        reason: RemovalError,
    },
    /// Confirms that a turret gained an upgrade level.
    TurretUpgraded {
        /// Identifier of the upgraded turret.
        turret: TurretId,
        /// Track that gained the level.
        track: UpgradeTrack,
        /// Level reached on the track.
        level: u8,
        /// Coins paid for the upgrade.
        cost: u32,
    },
    /// Reports that an upgrade request was rejected.
    UpgradeRejected {
        /// Identifier named in the request.
        turret: TurretId,
        /// Track named in the request.
        track: UpgradeTrack,
        /// Specific reason the upgrade failed.
        reason: UpgradeError,
    },
    /// Confirms that a turret changed the enemy it tracks.
    TargetLocked {
        /// Turret whose target changed.
        turret: TurretId,
        /// New target, if any.
        target: Option<EnemyId>,
    },
    /// Confirms that a projectile left a turret.
    ProjectileFired {
        /// Identifier assigned to the projectile.
        projectile: ProjectileId,
        /// Turret that fired.
        turret: TurretId,
        /// Enemy captured by the projectile.
        target: EnemyId,
    },
    /// Reports that a projectile reached its target.
    ProjectileHit {
        /// Identifier of the projectile.
        projectile: ProjectileId,
        /// Enemy that was hit.
        enemy: EnemyId,
        /// Damage captured at fire time.
        damage: u32,
    },
    /// Reports that a projectile vanished without hitting anything.
    ProjectileExpired {
        /// Identifier of the projectile.
        projectile: ProjectileId,
        /// Why the projectile vanished.
        reason: ExpiryReason,
    },
    /// Reports that a frost turret slowed the enemies around it.
    FrostPulsed {
        /// Turret that emitted the pulse.
        turret: TurretId,
        /// Number of enemies affected.
        affected: u32,
    },
    /// Announces that the player ran out of health.
    RunEnded {
        /// Wave that was current when the run ended.
        wave: WaveId,
        /// Total kills recorded during the run.
        kills: u32,
    },
    /// Confirms that the run state was reset.
    RunReset,
}

macro_rules! identifier {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(
            Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
        )]
        #[serde(transparent)]
        pub struct $name(u32);

        impl $name {
            /// Creates a new identifier with the provided numeric value.
            #[must_use]
            pub const fn new(value: u32) -> Self {
                Self(value)
            }

            /// Retrieves the numeric representation of the identifier.
            #[must_use]
            pub const fn get(&self) -> u32 {
                self.0
            }
        }
    };
}

identifier!(
    /// Unique identifier assigned to a live enemy.
    EnemyId
);
identifier!(
    /// Unique identifier assigned to a placed turret.
    TurretId
);
identifier!(
    /// Unique identifier assigned to a projectile in flight.
    ProjectileId
);
identifier!(
    /// Index of a turret slot on the map.
    SlotId
);
identifier!(
    /// Identifier of an enemy kind declared in the roster.
    EnemyKindId
);
identifier!(
    /// One-based index of a wave.
    WaveId
);

impl WaveId {
    /// Wave every run starts with.
    pub const FIRST: Self = Self(1);

    /// Returns the wave that follows this one.
    #[must_use]
    pub const fn next(self) -> Self {
        Self(self.0.saturating_add(1))
    }
}

/// Types of turrets that can be constructed.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum TurretKind {
    /// Rotating turret that fires projectiles at the nearest enemy in range.
    Cannon,
    /// Stationary turret that periodically slows every enemy in range.
    Frost,
    /// Turret with unlimited reach that fires at the nearest enemy anywhere.
    Sniper,
}

impl TurretKind {
    /// Every turret kind in declaration order.
    pub const ALL: [TurretKind; 3] = [Self::Cannon, Self::Frost, Self::Sniper];

    /// Lowercase name used in configuration files and command lines.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Cannon => "cannon",
            Self::Frost => "frost",
            Self::Sniper => "sniper",
        }
    }

    /// Describes how far the turret can see.
    #[must_use]
    pub const fn reach(self) -> Reach {
        match self {
            Self::Cannon | Self::Frost => Reach::Limited,
            Self::Sniper => Reach::Global,
        }
    }

    /// Describes what the turret releases when its charge completes.
    #[must_use]
    pub const fn discharge(self) -> Discharge {
        match self {
            Self::Cannon | Self::Sniper => Discharge::Projectile,
            Self::Frost => Discharge::FrostPulse,
        }
    }
}

/// Describes how far a turret can acquire targets.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Reach {
    /// Targets must lie within the turret's range.
    Limited,
    /// Every live enemy is in reach.
    Global,
}

/// Describes what a turret releases when it fires.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Discharge {
    /// A projectile aimed at the locked target.
    Projectile,
    /// An area slow applied to every enemy within range.
    FrostPulse,
}

/// Independent upgrade tracks available on every turret.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UpgradeTrack {
    /// Increases the turret's range.
    Range,
    /// Increases the turret's fire rate.
    Speed,
}

/// Describes why an enemy entered the path.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SpawnOrigin {
    /// Released by the wave scheduler.
    Wave,
    /// Produced when a parent enemy split on death.
    Split {
        /// Enemy whose death produced this one.
        parent: EnemyId,
    },
}

/// Describes why a projectile disappeared without hitting.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ExpiryReason {
    /// The captured target no longer exists.
    TargetLost,
    /// The projectile left the playable bounds.
    OutOfBounds,
}

/// Axis-aligned rectangle describing the playable area.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    /// Lower-left corner.
    pub min: Vec2,
    /// Upper-right corner.
    pub max: Vec2,
}

impl Bounds {
    /// Creates bounds spanning the provided corners.
    #[must_use]
    pub const fn new(min: Vec2, max: Vec2) -> Self {
        Self { min, max }
    }

    /// Reports whether the point lies inside the bounds, edges included.
    #[must_use]
    pub fn contains(&self, point: Vec2) -> bool {
        point.x >= self.min.x
            && point.x <= self.max.x
            && point.y >= self.min.y
            && point.y <= self.max.y
    }
}

/// Read-only snapshot of the economy and progress counters.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EconomySnapshot {
    /// Coins available for purchases and upgrades.
    pub coins: u32,
    /// Player health remaining.
    pub health: u32,
    /// Wave currently in progress or pending.
    pub wave: WaveId,
    /// Enemies destroyed during the run.
    pub kills: u32,
}

/// Insufficient coins to pay for a purchase or upgrade.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, Error)]
#[error("insufficient funds: {required} coins required, {available} available")]
pub struct InsufficientFunds {
    /// Coins the operation costs.
    pub required: u32,
    /// Coins the ledger held at the time.
    pub available: u32,
}

/// Reasons a turret purchase may be rejected.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, Error)]
pub enum PurchaseError {
    /// The ledger cannot cover the turret's cost.
    #[error(transparent)]
    InsufficientFunds(#[from] InsufficientFunds),
    /// No blueprint describes the requested turret kind.
    #[error("no blueprint is configured for {0:?} turrets")]
    UnknownKind(TurretKind),
}

/// Reasons a turret placement request may be rejected.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, Error)]
pub enum PlacementError {
    /// No purchased turret of the requested kind is waiting for placement.
    #[error("no purchased turret of that kind awaits placement")]
    NotPurchased,
    /// The nearest slot already hosts a turret.
    #[error("slot is already occupied")]
    Occupied,
    /// No slot lies close enough to the requested position.
    #[error("no turret slot near the requested position")]
    OutOfBounds,
}

/// Reasons a turret sale or removal may be rejected.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, Error)]
pub enum RemovalError {
    /// No turret with the provided identifier exists.
    #[error("turret does not exist")]
    MissingTurret,
}

/// Reasons a turret upgrade may be rejected.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, Error)]
pub enum UpgradeError {
    /// No turret with the provided identifier exists.
    #[error("turret does not exist")]
    MissingTurret,
    /// The track already reached its highest level.
    #[error("upgrade track is already at its maximum level")]
    MaxLevel,
    /// The turret reaches every enemy, so its range cannot grow.
    #[error("turret reaches the whole map and has no range to upgrade")]
    UnboundedRange,
    /// The ledger cannot cover the upgrade's cost.
    #[error(transparent)]
    InsufficientFunds(#[from] InsufficientFunds),
}

/// Immutable representation of a single enemy's state used for queries.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EnemySnapshot {
    /// Unique identifier assigned to the enemy.
    pub id: EnemyId,
    /// Kind of the enemy.
    pub kind: EnemyKindId,
    /// Current world position.
    pub position: Vec2,
    /// Index of the waypoint the enemy is heading for.
    pub waypoint: usize,
    /// Health remaining.
    pub health: u32,
    /// Speed the enemy currently travels at.
    pub speed: f32,
    /// Speed the enemy returns to when modifiers expire.
    pub base_speed: f32,
}

/// Read-only snapshot describing all live enemies.
#[derive(Clone, Debug, Default)]
pub struct EnemyView {
    snapshots: Vec<EnemySnapshot>,
}

impl EnemyView {
    /// Creates a new enemy view from the provided snapshots.
    #[must_use]
    pub fn from_snapshots(mut snapshots: Vec<EnemySnapshot>) -> Self {
        snapshots.sort_by_key(|snapshot| snapshot.id);
        Self { snapshots }
    }

    /// Iterator over the captured enemy snapshots in deterministic order.
    pub fn iter(&self) -> impl Iterator<Item = &EnemySnapshot> {
        self.snapshots.iter()
    }

    /// Resolves an enemy handle, returning `None` when the enemy is gone.
    #[must_use]
    pub fn get(&self, id: EnemyId) -> Option<&EnemySnapshot> {
        self.snapshots
            .binary_search_by_key(&id, |snapshot| snapshot.id)
            .ok()
            .map(|index| &self.snapshots[index])
    }

    /// Number of enemies captured by the view.
    #[must_use]
    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    /// Reports whether the view contains no enemies.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    /// Consumes the view, yielding the underlying snapshots.
    #[must_use]
    pub fn into_vec(self) -> Vec<EnemySnapshot> {
        self.snapshots
    }
}

/// Immutable representation of a single turret's state used for queries.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TurretSnapshot {
    /// Identifier allocated to the turret by the world.
    pub id: TurretId,
    /// Kind of turret that was constructed.
    pub kind: TurretKind,
    /// Slot hosting the turret.
    pub slot: SlotId,
    /// World position of the turret.
    pub position: Vec2,
    /// Targeting range in world units.
    pub range: f32,
    /// Current aim in radians.
    pub rotation: f32,
    /// Maximum angular speed in radians per second.
    pub turn_rate: f32,
    /// Discharges per second.
    pub fire_rate: f32,
    /// Damage captured by each projectile.
    pub damage: u32,
    /// Time accumulated toward the next discharge.
    pub charge: Duration,
    /// Enemy the turret currently tracks.
    pub target: Option<EnemyId>,
    /// Level reached on the range track.
    pub range_level: u8,
    /// Level reached on the speed track.
    pub speed_level: u8,
    /// Coins spent on the turret so far.
    pub cumulative_spend: u32,
    /// Coins refunded if the turret is sold now.
    pub sell_value: u32,
}

impl TurretSnapshot {
    /// Cooldown between two discharges at the current fire rate.
    #[must_use]
    pub fn fire_period(&self) -> Duration {
        fire_period(self.fire_rate)
    }
}

/// Read-only snapshot describing all placed turrets.
#[derive(Clone, Debug, Default)]
pub struct TurretView {
    snapshots: Vec<TurretSnapshot>,
}

impl TurretView {
    /// Creates a new turret view from the provided snapshots.
    #[must_use]
    pub fn from_snapshots(mut snapshots: Vec<TurretSnapshot>) -> Self {
        snapshots.sort_by_key(|snapshot| snapshot.id);
        Self { snapshots }
    }

    /// Iterator over the captured turret snapshots in deterministic order.
    pub fn iter(&self) -> impl Iterator<Item = &TurretSnapshot> {
        self.snapshots.iter()
    }

    /// Looks up a turret by identifier.
    #[must_use]
    pub fn get(&self, id: TurretId) -> Option<&TurretSnapshot> {
        self.snapshots
            .binary_search_by_key(&id, |snapshot| snapshot.id)
            .ok()
            .map(|index| &self.snapshots[index])
    }

    /// Consumes the view, yielding the underlying snapshots.
    #[must_use]
    pub fn into_vec(self) -> Vec<TurretSnapshot> {
        self.snapshots
    }
}

/// Immutable representation of a projectile in flight.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ProjectileSnapshot {
    /// Identifier assigned to the projectile.
    pub id: ProjectileId,
    /// Turret that fired the projectile.
    pub source: TurretId,
    /// Enemy captured at fire time.
    pub target: EnemyId,
    /// Current world position.
    pub position: Vec2,
    /// Damage applied on hit.
    pub damage: u32,
}

/// Immutable representation of a turret slot.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SlotSnapshot {
    /// Index of the slot.
    pub id: SlotId,
    /// World position of the slot.
    pub position: Vec2,
    /// Turret occupying the slot, if any.
    pub occupant: Option<TurretId>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sell_value_is_eighty_percent_rounded() {
        assert_eq!(sell_value_for(100), 80);
        assert_eq!(sell_value_for(150), 120);
        assert_eq!(sell_value_for(0), 0);
        assert_eq!(sell_value_for(1), 1, "0.8 rounds up to one coin");
        assert_eq!(sell_value_for(3), 2, "2.4 rounds down");
        assert_eq!(sell_value_for(u32::MAX), (u64::from(u32::MAX) * 4 / 5) as u32);
    }

    #[test]
    fn upgrade_cost_doubles_per_level() {
        assert_eq!(upgrade_cost_for(50, 0), 50);
        assert_eq!(upgrade_cost_for(50, 1), 100);
        assert_eq!(upgrade_cost_for(50, 2), 200);
        assert_eq!(upgrade_cost_for(50, 40), u32::MAX);
    }

    #[test]
    fn fire_period_inverts_rate() {
        assert_eq!(fire_period(1.0), Duration::from_secs(1));
        assert_eq!(fire_period(4.0), Duration::from_millis(250));
        assert_eq!(fire_period(0.0), Duration::MAX);
        assert_eq!(fire_period(f32::NAN), Duration::MAX);
    }

    #[test]
    fn enemy_view_resolves_handles_and_reports_missing() {
        let view = EnemyView::from_snapshots(vec![enemy(7), enemy(2), enemy(4)]);
        let order: Vec<u32> = view.iter().map(|snapshot| snapshot.id.get()).collect();
        assert_eq!(order, vec![2, 4, 7]);
        assert_eq!(view.get(EnemyId::new(4)).map(|s| s.id), Some(EnemyId::new(4)));
        assert!(view.get(EnemyId::new(5)).is_none());
    }

    #[test]
    fn bounds_include_edges() {
        let bounds = Bounds::new(Vec2::new(-1.0, -1.0), Vec2::new(1.0, 1.0));
        assert!(bounds.contains(Vec2::new(1.0, -1.0)));
        assert!(!bounds.contains(Vec2::new(1.01, 0.0)));
    }

    #[test]
    fn turret_kinds_expose_capabilities() {
        assert_eq!(TurretKind::Sniper.reach(), Reach::Global);
        assert_eq!(TurretKind::Cannon.reach(), Reach::Limited);
        assert_eq!(TurretKind::Frost.discharge(), Discharge::FrostPulse);
        assert_eq!(TurretKind::Cannon.discharge(), Discharge::Projectile);
        let labels: Vec<&str> = TurretKind::ALL.iter().map(|kind| kind.label()).collect();
        assert_eq!(labels, ["cannon", "frost", "sniper"]);
    }

    #[test]
    fn economy_snapshot_round_trips_through_bincode() {
        let snapshot = EconomySnapshot {
            coins: 280,
            health: 9,
            wave: WaveId::new(3),
            kills: 12,
        };
        let bytes = bincode::serialize(&snapshot).expect("serialize");
        let restored: EconomySnapshot = bincode::deserialize(&bytes).expect("deserialize");
        assert_eq!(restored, snapshot);
    }

    #[test]
    fn insufficient_funds_converts_into_both_error_families() {
        let shortfall = InsufficientFunds {
            required: 100,
            available: 40,
        };
        assert_eq!(
            PurchaseError::from(shortfall),
            PurchaseError::InsufficientFunds(shortfall)
        );
        assert_eq!(
            UpgradeError::from(shortfall).to_string(),
            "insufficient funds: 100 coins required, 40 available"
        );
    }

    fn enemy(id: u32) -> EnemySnapshot {
        EnemySnapshot {
            id: EnemyId::new(id),
            kind: EnemyKindId::new(0),
            position: Vec2::ZERO,
            waypoint: 1,
            health: 1,
            speed: 1.0,
            base_speed: 1.0,
        }
    }
}
