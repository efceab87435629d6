//! Sources of per-wave composition and cadence.

use std::{collections::BTreeMap, fmt, time::Duration};

use waypoint_defence_core::{
    waves::MIN_SPAWN_INTERVAL, FormulaConfig, KindCount, WaveId, WaveProviderConfig, WaveSpec,
    WaveTableEntry,
};

/// Computes the composition of a wave from its index.
///
/// Implementations must be deterministic, and the spawn interval they produce
/// must never increase with the wave index.
pub trait WaveSpecProvider: fmt::Debug {
    /// Returns the composition of `wave`, or `None` when no data describes it.
    fn spec_for(&self, wave: WaveId) -> Option<WaveSpec>;
}

/// Builds the provider selected by the configuration.
#[must_use]
pub fn provider_from_config(config: &WaveProviderConfig) -> Box<dyn WaveSpecProvider> {
    match config {
        WaveProviderConfig::Table {
            entries,
            min_spawn_interval_secs,
        } => Box::new(TableProvider::new(entries, *min_spawn_interval_secs)),
        WaveProviderConfig::Formula(formula) => Box::new(FormulaProvider::new(*formula)),
    }
}

fn seconds(secs: f32) -> Duration {
    Duration::try_from_secs_f32(secs).unwrap_or(MIN_SPAWN_INTERVAL)
}

#[derive(Clone, Debug)]
struct TableRow {
    counts: Vec<KindCount>,
    interval_secs: f32,
}

/// Static table keyed by wave index.
///
/// Waves past the last entry are extrapolated: every kind grows by the count
/// difference between the last two entries and the interval shrinks by their
/// interval difference, never below the configured minimum. A single-entry
/// table repeats its only entry.
#[derive(Clone, Debug)]
pub struct TableProvider {
    rows: BTreeMap<u32, TableRow>,
    min_interval_secs: f32,
}

impl TableProvider {
    /// Creates a provider over the provided entries.
    #[must_use]
    pub fn new(entries: &[WaveTableEntry], min_spawn_interval_secs: f32) -> Self {
        let rows = entries
            .iter()
            .map(|entry| {
                (
                    entry.wave,
                    TableRow {
                        counts: entry.counts.clone(),
                        interval_secs: entry.spawn_interval_secs,
                    },
                )
            })
            .collect();
        Self {
            rows,
            min_interval_secs: min_spawn_interval_secs,
        }
    }

    fn extrapolate(&self, wave: u32) -> Option<WaveSpec> {
        let mut tail = self.rows.iter().rev();
        let (&last_wave, last) = tail.next()?;
        let Some((_, previous)) = tail.next() else {
            return Some(WaveSpec::new(
                last.counts.clone(),
                seconds(last.interval_secs),
            ));
        };

        let steps = wave - last_wave;
        let counts = last
            .counts
            .iter()
            .map(|entry| {
                let before = previous
                    .counts
                    .iter()
                    .find(|candidate| candidate.kind == entry.kind)
                    .map_or(0, |candidate| candidate.count);
                let growth = entry.count.saturating_sub(before).saturating_mul(steps);
                KindCount::new(entry.kind, entry.count.saturating_add(growth))
            })
            .collect();

        let shrink = (previous.interval_secs - last.interval_secs).max(0.0);
        let interval = (last.interval_secs - shrink * steps as f32)
            .max(self.min_interval_secs)
            .min(last.interval_secs);
        Some(WaveSpec::new(counts, seconds(interval)))
    }
}

impl WaveSpecProvider for TableProvider {
    fn spec_for(&self, wave: WaveId) -> Option<WaveSpec> {
        let index = wave.get();
        let &last_wave = self.rows.keys().next_back()?;
        if index > last_wave {
            return self.extrapolate(index);
        }
        self.rows
            .get(&index)
            .map(|row| WaveSpec::new(row.counts.clone(), seconds(row.interval_secs)))
    }
}

/// Closed-form composition of a single generic enemy kind.
///
/// The wave releases `round(base × wave^scaling_factor)` enemies spaced by
/// `max(min, base_interval × decay^(wave - 1))` seconds.
#[derive(Clone, Copy, Debug)]
pub struct FormulaProvider {
    config: FormulaConfig,
}

impl FormulaProvider {
    /// Creates a provider from the formula parameters.
    #[must_use]
    pub const fn new(config: FormulaConfig) -> Self {
        Self { config }
    }
}

impl WaveSpecProvider for FormulaProvider {
    fn spec_for(&self, wave: WaveId) -> Option<WaveSpec> {
        let index = wave.get();
        if index == 0 {
            return None;
        }
        let config = &self.config;
        let total = (config.base * (index as f32).powf(config.scaling_factor)).round();
        let count = if total.is_finite() && total > 0.0 {
            total.min(u32::MAX as f32) as u32
        } else {
            0
        };

        let exponent = i32::try_from(index - 1).unwrap_or(i32::MAX);
        let interval = (config.base_interval_secs * config.interval_decay.powi(exponent))
            .max(config.min_interval_secs)
            .min(config.base_interval_secs);
        Some(WaveSpec::new(
            vec![KindCount::new(config.kind, count)],
            seconds(interval),
        ))
    }
}
