//! Wave composition shared by the scheduler and its providers.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::EnemyKindId;

/// Shortest spawn interval a wave may use.
pub const MIN_SPAWN_INTERVAL: Duration = Duration::from_millis(1);

/// Number of enemies of one kind still to be released during a wave.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct KindCount {
    /// Kind of enemy to release.
    pub kind: EnemyKindId,
    /// Enemies of the kind left to release.
    pub count: u32,
}

impl KindCount {
    /// Creates a new kind count.
    #[must_use]
    pub const fn new(kind: EnemyKindId, count: u32) -> Self {
        Self { kind, count }
    }
}

/// Composition and cadence of a single wave.
///
/// Counts keep their declared order. Every released enemy decrements the
/// count of its kind; the composition is discarded once the wave ends.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WaveSpec {
    counts: Vec<KindCount>,
    spawn_interval: Duration,
}

impl WaveSpec {
    /// Creates a wave spec, clamping the interval to [`MIN_SPAWN_INTERVAL`].
    #[must_use]
    pub fn new(counts: Vec<KindCount>, spawn_interval: Duration) -> Self {
        Self {
            counts,
            spawn_interval: spawn_interval.max(MIN_SPAWN_INTERVAL),
        }
    }

    /// Wave that releases nothing, used when no composition is available.
    #[must_use]
    pub fn empty() -> Self {
        Self::new(Vec::new(), Duration::from_secs(1))
    }

    /// Delay between two consecutive releases.
    #[must_use]
    pub const fn spawn_interval(&self) -> Duration {
        self.spawn_interval
    }

    /// Per-kind counts in declared order.
    #[must_use]
    pub fn counts(&self) -> &[KindCount] {
        &self.counts
    }

    /// Enemies left to release across every kind.
    #[must_use]
    pub fn total(&self) -> u32 {
        self.counts
            .iter()
            .fold(0_u32, |sum, entry| sum.saturating_add(entry.count))
    }

    /// Number of kinds that still have enemies left.
    #[must_use]
    pub fn available_kinds(&self) -> usize {
        self.counts.iter().filter(|entry| entry.count > 0).count()
    }

    /// Releases one enemy of the first declared kind that has any left.
    pub fn take_first_available(&mut self) -> Option<EnemyKindId> {
        self.take_nth_available(0)
    }

    /// Releases one enemy of the `n`-th kind, counted among kinds with enemies left.
    pub fn take_nth_available(&mut self, n: usize) -> Option<EnemyKindId> {
        let entry = self
            .counts
            .iter_mut()
            .filter(|entry| entry.count > 0)
            .nth(n)?;
        entry.count -= 1;
        Some(entry.kind)
    }
}
