//! Authoritative turret state, slot occupancy and upgrade economy.

use std::{collections::BTreeMap, time::Duration};

use waypoint_defence_core::{
    fire_period, sell_value_for, upgrade_cost_for, EnemyId, SlotId, SlotSnapshot, SlowEffect,
    TurretBlueprint, TurretId, TurretKind, TurretSnapshot, UpgradeTrack, Vec2,
    MAX_UPGRADE_LEVEL,
};

/// Turret stored inside the world.
#[derive(Clone, Debug)]
pub(crate) struct Turret {
    pub(crate) id: TurretId,
    pub(crate) kind: TurretKind,
    pub(crate) slot: SlotId,
    pub(crate) position: Vec2,
    pub(crate) range: f32,
    pub(crate) rotation: f32,
    pub(crate) damage: u32,
    pub(crate) projectile_speed: f32,
    pub(crate) slow: Option<SlowEffect>,
    pub(crate) charge: Duration,
    pub(crate) target: Option<EnemyId>,
    fire_rate: f32,
    turn_rate: f32,
    range_level: u8,
    speed_level: u8,
    cumulative_spend: u32,
    upgrade_cost: u32,
    range_step: f32,
    fire_rate_step: f32,
}

impl Turret {
    fn from_blueprint(
        id: TurretId,
        slot: SlotId,
        position: Vec2,
        blueprint: &TurretBlueprint,
    ) -> Self {
        Self {
            id,
            kind: blueprint.kind,
            slot,
            position,
            range: blueprint.range,
            rotation: 0.0,
            damage: blueprint.damage,
            projectile_speed: blueprint.projectile_speed,
            slow: blueprint.slow,
            charge: Duration::ZERO,
            target: None,
            fire_rate: blueprint.fire_rate,
            turn_rate: blueprint.turn_rate(),
            range_level: 0,
            speed_level: 0,
            cumulative_spend: blueprint.cost,
            upgrade_cost: blueprint.upgrade_cost,
            range_step: blueprint.range_step,
            fire_rate_step: blueprint.fire_rate_step,
        }
    }

    /// Refund granted when the turret is sold.
    pub(crate) fn sell_value(&self) -> u32 {
        sell_value_for(self.cumulative_spend)
    }

    /// Reports whether the accumulated charge covers one discharge.
    pub(crate) fn is_charged(&self) -> bool {
        self.charge >= fire_period(self.fire_rate)
    }

    /// Current level of the provided track.
    pub(crate) fn level(&self, track: UpgradeTrack) -> u8 {
        match track {
            UpgradeTrack::Range => self.range_level,
            UpgradeTrack::Speed => self.speed_level,
        }
    }

    /// Price of the next level on the track, or `None` once the track is maxed.
    pub(crate) fn next_upgrade_cost(&self, track: UpgradeTrack) -> Option<u32> {
        let level = self.level(track);
        if level >= MAX_UPGRADE_LEVEL {
            return None;
        }
        Some(upgrade_cost_for(self.upgrade_cost, level))
    }

    /// Applies a paid upgrade and returns the level reached.
    pub(crate) fn upgrade(&mut self, track: UpgradeTrack, cost: u32) -> u8 {
        self.cumulative_spend = self.cumulative_spend.saturating_add(cost);
        match track {
            UpgradeTrack::Range => {
                self.range += self.range_step;
                self.range_level += 1;
                self.range_level
            }
            UpgradeTrack::Speed => {
                self.fire_rate += self.fire_rate_step;
                self.speed_level += 1;
                self.speed_level
            }
        }
    }

    pub(crate) fn snapshot(&self) -> TurretSnapshot {
        TurretSnapshot {
            id: self.id,
            kind: self.kind,
            slot: self.slot,
            position: self.position,
            range: self.range,
            rotation: self.rotation,
            turn_rate: self.turn_rate,
            fire_rate: self.fire_rate,
            damage: self.damage,
            charge: self.charge,
            target: self.target,
            range_level: self.range_level,
            speed_level: self.speed_level,
            cumulative_spend: self.cumulative_spend,
            sell_value: self.sell_value(),
        }
    }
}

/// Position a turret may be placed on.
#[derive(Clone, Copy, Debug)]
struct Slot {
    position: Vec2,
    occupant: Option<TurretId>,
}

/// Registry that stores turrets, slot occupancy and unplaced purchases.
#[derive(Debug)]
pub(crate) struct TurretRegistry {
    entries: BTreeMap<TurretId, Turret>,
    next_turret_id: TurretId,
    slots: Vec<Slot>,
    snap_radius: f32,
    credits: BTreeMap<TurretKind, u32>,
}

impl TurretRegistry {
    /// Creates an empty registry over the provided slot positions.
    pub(crate) fn new(slots: &[Vec2], snap_radius: f32) -> Self {
        Self {
            entries: BTreeMap::new(),
            next_turret_id: TurretId::new(0),
            slots: slots
                .iter()
                .map(|&position| Slot {
                    position,
                    occupant: None,
                })
                .collect(),
            snap_radius,
            credits: BTreeMap::new(),
        }
    }

    /// Removes every turret, vacates all slots and forgets unplaced purchases.
    pub(crate) fn clear(&mut self) {
        self.entries.clear();
        self.next_turret_id = TurretId::new(0);
        self.credits.clear();
        for slot in &mut self.slots {
            slot.occupant = None;
        }
    }

    /// Banks one placement credit for the kind.
    pub(crate) fn add_credit(&mut self, kind: TurretKind) {
        let credits = self.credits.entry(kind).or_insert(0);
        *credits = credits.saturating_add(1);
    }

    pub(crate) fn credits(&self, kind: TurretKind) -> u32 {
        self.credits.get(&kind).copied().unwrap_or(0)
    }

    /// Consumes one placement credit for the kind if any is banked.
    fn take_credit(&mut self, kind: TurretKind) -> bool {
        match self.credits.get_mut(&kind) {
            Some(credits) if *credits > 0 => {
                *credits -= 1;
                true
            }
            _ => false,
        }
    }

    /// Finds the slot nearest to `position` within the snap radius.
    pub(crate) fn nearest_slot(&self, position: Vec2) -> Option<SlotId> {
        let mut best: Option<(usize, f32)> = None;
        for (index, slot) in self.slots.iter().enumerate() {
            let distance = slot.position.distance(position);
            if distance > self.snap_radius {
                continue;
            }
            if best.map_or(true, |(_, best_distance)| distance < best_distance) {
                best = Some((index, distance));
            }
        }
        best.and_then(|(index, _)| u32::try_from(index).ok().map(SlotId::new))
    }

    fn slot(&self, id: SlotId) -> Option<&Slot> {
        self.slots.get(id.get() as usize)
    }

    fn slot_mut(&mut self, id: SlotId) -> Option<&mut Slot> {
        self.slots.get_mut(id.get() as usize)
    }

    /// Reports whether a turret already occupies the slot.
    pub(crate) fn is_occupied(&self, id: SlotId) -> bool {
        self.slot(id).map_or(false, |slot| slot.occupant.is_some())
    }

    /// Places a turret on a free slot, consuming a purchase credit.
    ///
    /// Returns `None` without changing state when no credit is banked or the
    /// slot is unknown or occupied.
    pub(crate) fn place(&mut self, slot: SlotId, blueprint: &TurretBlueprint) -> Option<&Turret> {
        let position = self.slot(slot).filter(|s| s.occupant.is_none())?.position;
        if !self.take_credit(blueprint.kind) {
            return None;
        }

        let id = self.next_turret_id;
        self.next_turret_id = TurretId::new(id.get().saturating_add(1));
        if let Some(entry) = self.slot_mut(slot) {
            entry.occupant = Some(id);
        }
        let turret = Turret::from_blueprint(id, slot, position, blueprint);
        Some(self.entries.entry(id).or_insert(turret))
    }

    /// Removes a turret and vacates its slot.
    pub(crate) fn remove(&mut self, id: TurretId) -> Option<Turret> {
        let turret = self.entries.remove(&id)?;
        if let Some(slot) = self.slot_mut(turret.slot) {
            slot.occupant = None;
        }
        Some(turret)
    }

    pub(crate) fn get(&self, id: TurretId) -> Option<&Turret> {
        self.entries.get(&id)
    }

    pub(crate) fn get_mut(&mut self, id: TurretId) -> Option<&mut Turret> {
        self.entries.get_mut(&id)
    }

    pub(crate) fn iter(&self) -> impl Iterator<Item = &Turret> {
        self.entries.values()
    }

    pub(crate) fn slot_snapshots(&self) -> Vec<SlotSnapshot> {
        self.slots
            .iter()
            .zip(0_u32..)
            .map(|(slot, index)| SlotSnapshot {
                id: SlotId::new(index),
                position: slot.position,
                occupant: slot.occupant,
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cannon() -> TurretBlueprint {
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
        }
    }

    fn registry() -> TurretRegistry {
        TurretRegistry::new(&[Vec2::new(0.0, 0.0), Vec2::new(2.0, 0.0)], 0.75)
    }

    #[test]
    fn placement_requires_a_credit_and_a_free_slot() {
        let mut registry = registry();
        let slot = SlotId::new(1);
        assert!(registry.place(slot, &cannon()).is_none());

        registry.add_credit(TurretKind::Cannon);
        registry.add_credit(TurretKind::Cannon);
        let id = registry.place(slot, &cannon()).map(|turret| turret.id);
        assert_eq!(id, Some(TurretId::new(0)));
        assert!(registry.is_occupied(slot));

        assert!(registry.place(slot, &cannon()).is_none());
        assert_eq!(registry.credits(TurretKind::Cannon), 1);
    }

    #[test]
    fn nearest_slot_respects_snap_radius() {
        let registry = registry();
        assert_eq!(registry.nearest_slot(Vec2::new(1.6, 0.2)), Some(SlotId::new(1)));
        assert_eq!(registry.nearest_slot(Vec2::new(1.0, 0.0)), None);
    }

    #[test]
    fn removal_vacates_the_slot() {
        let mut registry = registry();
        registry.add_credit(TurretKind::Cannon);
        let id = registry
            .place(SlotId::new(0), &cannon())
            .map(|turret| turret.id)
            .expect("placed");
        assert!(registry.remove(id).is_some());
        assert!(!registry.is_occupied(SlotId::new(0)));
        assert!(registry.remove(id).is_none());
    }

    #[test]
    fn upgrades_double_in_cost_and_stop_at_the_maximum_level() {
        let mut turret =
            Turret::from_blueprint(TurretId::new(0), SlotId::new(0), Vec2::ZERO, &cannon());
        let mut paid = Vec::new();
        while let Some(cost) = turret.next_upgrade_cost(UpgradeTrack::Range) {
            paid.push(cost);
            let _ = turret.upgrade(UpgradeTrack::Range, cost);
        }
        assert_eq!(paid, vec![50, 100, 200]);
        assert_eq!(turret.level(UpgradeTrack::Range), MAX_UPGRADE_LEVEL);
        assert_eq!(turret.range, 4.5);
        assert_eq!(turret.level(UpgradeTrack::Speed), 0);
        assert_eq!(turret.snapshot().cumulative_spend, 450);
        assert_eq!(turret.sell_value(), 360);
    }
}
