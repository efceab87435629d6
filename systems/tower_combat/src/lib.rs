#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure system that aims turrets, charges them and requests discharges.

use std::{
    f32::consts::{PI, TAU},
    fmt,
    time::Duration,
};

use waypoint_defence_core::{
    Command, Discharge, EnemyView, TurretKind, TurretSnapshot, TurretView, Vec2,
};

/// Capability describing what a turret variant does with its charge.
pub trait Armament: fmt::Debug {
    /// Emits the commands the turret needs for one step of `dt`.
    fn engage(
        &self,
        turret: &TurretSnapshot,
        enemies: &EnemyView,
        dt: Duration,
        out: &mut Vec<Command>,
    );
}

/// Rotating launcher that fires projectiles at the locked target.
///
/// The launcher only charges while its target resolves.
#[derive(Clone, Copy, Debug, Default)]
pub struct ProjectileLauncher;

impl Armament for ProjectileLauncher {
    fn engage(
        &self,
        turret: &TurretSnapshot,
        enemies: &EnemyView,
        dt: Duration,
        out: &mut Vec<Command>,
    ) {
        let Some(target) = turret.target else {
            return;
        };
        let Some(enemy) = enemies.get(target) else {
            return;
        };

        let desired = bearing(turret.position, enemy.position);
        let rotation = rotate_towards(turret.rotation, desired, turret.turn_rate * dt.as_secs_f32());
        if (rotation - turret.rotation).abs() > f32::EPSILON {
            out.push(Command::AimTurret {
                turret: turret.id,
                rotation,
            });
        }

        out.push(Command::ChargeTurret {
            turret: turret.id,
            dt,
        });
        if turret.charge.saturating_add(dt) >= turret.fire_period() {
            out.push(Command::FireProjectile {
                turret: turret.id,
                target,
            });
        }
    }
}

/// Stationary emitter that charges continuously and slows everything in range.
#[derive(Clone, Copy, Debug, Default)]
pub struct FrostEmitter;

impl Armament for FrostEmitter {
    fn engage(
        &self,
        turret: &TurretSnapshot,
        _enemies: &EnemyView,
        dt: Duration,
        out: &mut Vec<Command>,
    ) {
        out.push(Command::ChargeTurret {
            turret: turret.id,
            dt,
        });
        if turret.charge.saturating_add(dt) >= turret.fire_period() {
            out.push(Command::EmitFrostPulse { turret: turret.id });
        }
    }
}

/// Selects the armament of a turret kind.
#[must_use]
pub fn armament_for(kind: TurretKind) -> &'static dyn Armament {
    match kind.discharge() {
        Discharge::Projectile => &ProjectileLauncher,
        Discharge::FrostPulse => &FrostEmitter,
    }
}

/// Angle in radians of the direction from `from` to `to`, measured from the x axis.
#[must_use]
pub fn bearing(from: Vec2, to: Vec2) -> f32 {
    let offset = to - from;
    offset.y.atan2(offset.x)
}

/// Turns `current` toward `desired` along the shortest arc by at most `max_step` radians.
///
/// The result is normalised to `[-π, π)`.
#[must_use]
pub fn rotate_towards(current: f32, desired: f32, max_step: f32) -> f32 {
    let delta = normalise(desired - current);
    if delta.abs() <= max_step {
        return normalise(desired);
    }
    normalise(current + max_step.max(0.0) * delta.signum())
}

fn normalise(angle: f32) -> f32 {
    (angle + PI).rem_euclid(TAU) - PI
}

/// Tower combat system that queues aiming, charging and firing commands.
#[derive(Debug, Default)]
pub struct TowerCombat {
    scratch: Vec<Command>,
}

impl TowerCombat {
    /// Creates a new tower combat system with empty scratch buffers.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Emits commands for every turret given `dt` of elapsed time.
    pub fn handle(
        &mut self,
        dt: Duration,
        turrets: &TurretView,
        enemies: &EnemyView,
        out: &mut Vec<Command>,
    ) {
        if dt.is_zero() {
            return;
        }

        self.scratch.clear();
        for turret in turrets.iter() {
            armament_for(turret.kind).engage(turret, enemies, dt, &mut self.scratch);
        }

        if self.scratch.is_empty() {
            return;
        }

        out.reserve(self.scratch.len());
        out.append(&mut self.scratch);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::FRAC_PI_2;
    use waypoint_defence_core::{EnemyId, EnemyKindId, EnemySnapshot, SlotId, TurretId};

    fn turret(kind: TurretKind, target: Option<u32>, charge: Duration) -> TurretSnapshot {
        TurretSnapshot {
            id: TurretId::new(3),
            kind,
            slot: SlotId::new(0),
            position: Vec2::ZERO,
            range: 3.0,
            rotation: 0.0,
            turn_rate: FRAC_PI_2,
            fire_rate: 1.0,
            damage: 1,
            charge,
            target: target.map(EnemyId::new),
            range_level: 0,
            speed_level: 0,
            cumulative_spend: 100,
            sell_value: 80,
        }
    }

    fn enemies(position: Vec2) -> EnemyView {
        EnemyView::from_snapshots(vec![EnemySnapshot {
            id: EnemyId::new(7),
            kind: EnemyKindId::new(0),
            position,
            waypoint: 1,
            health: 2,
            speed: 1.0,
            base_speed: 1.0,
        }])
    }

    fn run(turret: TurretSnapshot, enemies: &EnemyView, dt: Duration) -> Vec<Command> {
        let mut out = Vec::new();
        TowerCombat::new().handle(dt, &TurretView::from_snapshots(vec![turret]), enemies, &mut out);
        out
    }

    #[test]
    fn rotation_is_bounded_by_turn_rate() {
        let rotated = rotate_towards(0.0, PI * 0.75, FRAC_PI_2);
        assert!((rotated - FRAC_PI_2).abs() < 1e-6);
        assert!((rotate_towards(0.0, 0.2, FRAC_PI_2) - 0.2).abs() < 1e-6);
    }

    #[test]
    fn rotation_takes_the_shortest_arc() {
        let rotated = rotate_towards(PI * 0.9, -PI * 0.9, 0.1);
        assert!(rotated > PI * 0.9 || rotated < -PI * 0.9 + 0.2);
        let rotated = rotate_towards(-PI * 0.9, PI * 0.9, 0.1);
        assert!((rotated - (-PI * 0.9 - 0.1)).abs() < 1e-5);
    }

    #[test]
    fn bearing_measures_from_the_x_axis() {
        assert!((bearing(Vec2::ZERO, Vec2::new(0.0, 2.0)) - FRAC_PI_2).abs() < 1e-6);
        assert!(bearing(Vec2::ZERO, Vec2::new(1.0, 0.0)).abs() < 1e-6);
    }

    #[test]
    fn launcher_aims_and_charges_without_firing_early() {
        let out = run(
            turret(TurretKind::Cannon, Some(7), Duration::from_millis(200)),
            &enemies(Vec2::new(0.0, 2.0)),
            Duration::from_millis(500),
        );
        assert_eq!(out.len(), 2);
        assert!(matches!(
            out[0],
            Command::AimTurret { rotation, .. } if (rotation - FRAC_PI_2 * 0.5).abs() < 1e-6
        ));
        assert_eq!(
            out[1],
            Command::ChargeTurret {
                turret: TurretId::new(3),
                dt: Duration::from_millis(500),
            }
        );
    }

    #[test]
    fn launcher_fires_once_the_period_elapses() {
        let out = run(
            turret(TurretKind::Cannon, Some(7), Duration::from_millis(900)),
            &enemies(Vec2::new(2.0, 0.0)),
            Duration::from_millis(100),
        );
        assert_eq!(
            out,
            vec![
                Command::ChargeTurret {
                    turret: TurretId::new(3),
                    dt: Duration::from_millis(100),
                },
                Command::FireProjectile {
                    turret: TurretId::new(3),
                    target: EnemyId::new(7),
                },
            ]
        );
    }

    #[test]
    fn launcher_without_a_resolving_target_stays_idle() {
        let view = enemies(Vec2::new(2.0, 0.0));
        let unlocked = run(
            turret(TurretKind::Cannon, None, Duration::from_secs(5)),
            &view,
            Duration::from_millis(100),
        );
        assert!(unlocked.is_empty());

        let dangling = run(
            turret(TurretKind::Cannon, Some(99), Duration::from_secs(5)),
            &view,
            Duration::from_millis(100),
        );
        assert!(dangling.is_empty());
    }

    #[test]
    fn frost_emitter_charges_without_a_target() {
        let out = run(
            turret(TurretKind::Frost, None, Duration::from_millis(950)),
            &EnemyView::default(),
            Duration::from_millis(50),
        );
        assert_eq!(
            out,
            vec![
                Command::ChargeTurret {
                    turret: TurretId::new(3),
                    dt: Duration::from_millis(50),
                },
                Command::EmitFrostPulse {
                    turret: TurretId::new(3),
                },
            ]
        );
    }

    #[test]
    fn zero_dt_is_silent() {
        let out = run(
            turret(TurretKind::Frost, None, Duration::from_secs(10)),
            &EnemyView::default(),
            Duration::ZERO,
        );
        assert!(out.is_empty());
    }
}
