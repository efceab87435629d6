//! Kind selection policies applied while a wave releases enemies.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use sha2::{Digest, Sha256};
use waypoint_defence_core::{EnemyKindId, SelectionPolicy, WaveId, WaveSpec};

/// Chooses the kind of every released enemy.
#[derive(Clone, Debug)]
pub(crate) enum KindSelector {
    FirstAvailable,
    UniformRandom { seed: u64, rng: ChaCha8Rng },
}

impl KindSelector {
    pub(crate) fn new(policy: SelectionPolicy) -> Self {
        match policy {
            SelectionPolicy::FirstAvailable => Self::FirstAvailable,
            SelectionPolicy::UniformRandom { seed } => Self::UniformRandom {
                seed,
                rng: ChaCha8Rng::seed_from_u64(derive_wave_seed(seed, WaveId::FIRST)),
            },
        }
    }

    /// Reseeds the random stream so every wave draws the same sequence for a given seed.
    pub(crate) fn begin_wave(&mut self, wave: WaveId) {
        if let Self::UniformRandom { seed, rng } = self {
            *rng = ChaCha8Rng::seed_from_u64(derive_wave_seed(*seed, wave));
        }
    }

    /// Releases one enemy from the spec, returning its kind.
    pub(crate) fn select(&mut self, spec: &mut WaveSpec) -> Option<EnemyKindId> {
        match self {
            Self::FirstAvailable => spec.take_first_available(),
            Self::UniformRandom { rng, .. } => {
                let available = spec.available_kinds();
                if available == 0 {
                    return None;
                }
                let index = rng.gen_range(0..available);
                spec.take_nth_available(index)
            }
        }
    }
}

fn derive_wave_seed(seed: u64, wave: WaveId) -> u64 {
    let mut hasher = Sha256::new();
    hasher.update(seed.to_le_bytes());
    hasher.update(wave.get().to_le_bytes());
    let digest = hasher.finalize();
    let mut bytes = [0_u8; 8];
    bytes.copy_from_slice(&digest[..8]);
    u64::from_le_bytes(bytes)
}
