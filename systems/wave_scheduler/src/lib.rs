#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Wave scheduling system that paces enemy releases across waves.
//!
//! The scheduler alternates between an idle delay and a spawning phase. While
//! spawning it releases one enemy per spawn interval and keeps track of how
//! many released enemies are still alive, so a wave only completes once every
//! enemy has been released and destroyed or has leaked.

mod providers;
mod selection;

use std::time::Duration;

use log::{info, warn};
use waypoint_defence_core::{
    Command, Event, SelectionPolicy, SpawnOrigin, WaveConfig, WaveId, WaveSpec,
};

pub use providers::{provider_from_config, FormulaProvider, TableProvider, WaveSpecProvider};
use selection::KindSelector;

/// Configuration parameters required to construct the wave scheduler.
#[derive(Clone, Copy, Debug)]
pub struct Config {
    time_between_waves: Duration,
    selection: SelectionPolicy,
}

impl Config {
    /// Creates a new configuration using the provided delay and selection policy.
    #[must_use]
    pub const fn new(time_between_waves: Duration, selection: SelectionPolicy) -> Self {
        Self {
            time_between_waves,
            selection,
        }
    }
}

/// Phase of the scheduler's state machine.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WavePhase {
    /// Waiting for the delay between waves to elapse.
    Idle {
        /// Time spent waiting so far.
        elapsed: Duration,
    },
    /// Releasing the enemies of the current wave.
    Spawning,
}

/// Counters describing the wave in progress.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct WaveRunState {
    wave: WaveId,
    remaining: u32,
    alive: u32,
    since_last_spawn: Duration,
}

impl WaveRunState {
    fn new() -> Self {
        Self {
            wave: WaveId::FIRST,
            remaining: 0,
            alive: 0,
            since_last_spawn: Duration::ZERO,
        }
    }

    /// Wave currently in progress or pending.
    #[must_use]
    pub const fn wave(&self) -> WaveId {
        self.wave
    }

    /// Enemies of the current wave not yet released.
    #[must_use]
    pub const fn remaining(&self) -> u32 {
        self.remaining
    }

    /// Released enemies that have neither died nor leaked.
    #[must_use]
    pub const fn alive(&self) -> u32 {
        self.alive
    }

    /// Reports whether every enemy was released and none is alive.
    #[must_use]
    pub const fn is_complete(&self) -> bool {
        self.alive == 0 && self.remaining == 0
    }
}

/// Pure system that releases enemies wave after wave.
#[derive(Debug)]
pub struct WaveScheduler {
    time_between_waves: Duration,
    provider: Box<dyn WaveSpecProvider>,
    selector: KindSelector,
    phase: WavePhase,
    run: WaveRunState,
    spec: WaveSpec,
}

impl WaveScheduler {
    /// Creates a new scheduler drawing wave compositions from `provider`.
    #[must_use]
    pub fn new(config: Config, provider: Box<dyn WaveSpecProvider>) -> Self {
        Self {
            time_between_waves: config.time_between_waves,
            provider,
            selector: KindSelector::new(config.selection),
            phase: WavePhase::Idle {
                elapsed: Duration::ZERO,
            },
            run: WaveRunState::new(),
            spec: WaveSpec::empty(),
        }
    }

    /// Creates a scheduler from the wave section of a run configuration.
    #[must_use]
    pub fn from_wave_config(config: &WaveConfig) -> Self {
        Self::new(
            Config::new(config.time_between_waves(), config.selection),
            provider_from_config(&config.provider),
        )
    }

    /// Current phase of the state machine.
    #[must_use]
    pub const fn phase(&self) -> WavePhase {
        self.phase
    }

    /// Counters of the wave in progress.
    #[must_use]
    pub const fn run_state(&self) -> WaveRunState {
        self.run
    }

    /// Returns to the first wave with an idle delay ahead.
    pub fn reset(&mut self) {
        self.phase = WavePhase::Idle {
            elapsed: Duration::ZERO,
        };
        self.run = WaveRunState::new();
        self.spec = WaveSpec::empty();
    }

    /// Consumes world events and emits spawn and wave-advance commands.
    pub fn handle(&mut self, events: &[Event], out: &mut Vec<Command>) {
        let mut elapsed = Duration::ZERO;
        for event in events {
            match event {
                Event::TimeAdvanced { dt } => elapsed = elapsed.saturating_add(*dt),
                Event::EnemySpawned {
                    origin: SpawnOrigin::Split { .. },
                    ..
                } => self.run.alive = self.run.alive.saturating_add(1),
                Event::EnemyKilled { .. }
                | Event::EnemyLeaked { .. }
                | Event::EnemySpawnRejected { .. } => {
                    self.run.alive = self.run.alive.saturating_sub(1);
                }
                _ => {}
            }
        }

        let spawn_time = match self.phase {
            WavePhase::Idle { elapsed: waited } => {
                let waited = waited.saturating_add(elapsed);
                if waited < self.time_between_waves {
                    self.phase = WavePhase::Idle { elapsed: waited };
                    return;
                }
                self.start_wave();
                waited - self.time_between_waves
            }
            WavePhase::Spawning => elapsed,
        };

        self.release(spawn_time, out);

        if self.run.is_complete() {
            self.finish_wave(out);
        }
    }

    fn start_wave(&mut self) {
        let wave = self.run.wave;
        self.spec = self.provider.spec_for(wave).unwrap_or_else(|| {
            warn!("no composition available for wave {}; running it empty", wave.get());
            WaveSpec::empty()
        });
        self.selector.begin_wave(wave);
        self.run.remaining = self.spec.total();
        self.run.since_last_spawn = Duration::ZERO;
        self.phase = WavePhase::Spawning;
        info!(
            "wave {} started with {} enemies",
            wave.get(),
            self.run.remaining
        );
    }

    fn release(&mut self, elapsed: Duration, out: &mut Vec<Command>) {
        if self.run.remaining == 0 {
            self.run.since_last_spawn = Duration::ZERO;
            return;
        }

        let interval = self.spec.spawn_interval();
        self.run.since_last_spawn = self.run.since_last_spawn.saturating_add(elapsed);
        while self.run.remaining > 0 && self.run.since_last_spawn >= interval {
            self.run.since_last_spawn -= interval;
            let Some(kind) = self.selector.select(&mut self.spec) else {
                self.run.remaining = 0;
                break;
            };
            self.run.remaining -= 1;
            self.run.alive = self.run.alive.saturating_add(1);
            out.push(Command::SpawnEnemy { kind });
        }
        if self.run.remaining == 0 {
            self.run.since_last_spawn = Duration::ZERO;
        }
    }

    fn finish_wave(&mut self, out: &mut Vec<Command>) {
        info!("wave {} cleared", self.run.wave.get());
        out.push(Command::AdvanceWave);
        self.run = WaveRunState {
            wave: self.run.wave.next(),
            ..WaveRunState::new()
        };
        self.spec = WaveSpec::empty();
        self.phase = WavePhase::Idle {
            elapsed: Duration::ZERO,
        };
    }
}
