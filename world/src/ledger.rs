//! Coins, health, wave and kill counters of a run.

use waypoint_defence_core::{EconomyConfig, EconomySnapshot, InsufficientFunds, WaveId};

/// Economy and progress counters owned by the world.
#[derive(Clone, Debug)]
pub(crate) struct Ledger {
    coins: u32,
    health: u32,
    wave: WaveId,
    kills: u32,
    starting: EconomyConfig,
}

impl Ledger {
    /// Creates a ledger holding the starting economy.
    pub(crate) fn new(starting: EconomyConfig) -> Self {
        Self {
            coins: starting.starting_coins,
            health: starting.starting_health,
            wave: WaveId::FIRST,
            kills: 0,
            starting,
        }
    }

    /// Restores the starting economy and the first wave.
    pub(crate) fn reset(&mut self) {
        *self = Self::new(self.starting);
    }

    /// Deducts coins, leaving the balance untouched when it cannot cover the cost.
    pub(crate) fn spend(&mut self, cost: u32) -> Result<(), InsufficientFunds> {
        if self.coins < cost {
            return Err(InsufficientFunds {
                required: cost,
                available: self.coins,
            });
        }
        self.coins -= cost;
        Ok(())
    }

    pub(crate) fn earn(&mut self, amount: u32) {
        self.coins = self.coins.saturating_add(amount);
    }

    /// Removes health, clamping at zero. Returns whether health is depleted.
    pub(crate) fn lose_health(&mut self, amount: u32) -> bool {
        self.health = self.health.saturating_sub(amount);
        self.health == 0
    }

    pub(crate) fn record_kill(&mut self) {
        self.kills = self.kills.saturating_add(1);
    }

    /// Moves to the next wave and returns it.
    pub(crate) fn advance_wave(&mut self) -> WaveId {
        self.wave = self.wave.next();
        self.wave
    }

    pub(crate) fn snapshot(&self) -> EconomySnapshot {
        EconomySnapshot {
            coins: self.coins,
            health: self.health,
            wave: self.wave,
            kills: self.kills,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ledger() -> Ledger {
        Ledger::new(EconomyConfig {
            starting_coins: 300,
            starting_health: 10,
        })
    }

    #[test]
    fn spending_more_than_the_balance_changes_nothing() {
        let mut ledger = ledger();
        assert_eq!(ledger.spend(100), Ok(()));
        assert_eq!(
            ledger.spend(250),
            Err(InsufficientFunds {
                required: 250,
                available: 200,
            })
        );
        assert_eq!(ledger.snapshot().coins, 200);
    }

    #[test]
    fn health_clamps_at_zero() {
        let mut ledger = ledger();
        assert!(!ledger.lose_health(9));
        assert!(ledger.lose_health(5));
        assert_eq!(ledger.snapshot().health, 0);
    }

    #[test]
    fn reset_restores_starting_values() {
        let mut ledger = ledger();
        ledger.earn(40);
        ledger.record_kill();
        let _ = ledger.advance_wave();
        ledger.reset();
        assert_eq!(
            ledger.snapshot(),
            EconomySnapshot {
                coins: 300,
                health: 10,
                wave: WaveId::FIRST,
                kills: 0,
            }
        );
    }
}
