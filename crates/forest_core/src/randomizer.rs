//! Per-unit random number streams
//!
//! A [`Randomizer`] owns one independent RNG stream per work slot. Work units
//! receive their stream by `&mut` from the caller; nothing is looked up
//! through global or thread-local state, and no stream is ever shared by two
//! concurrent units.

use crate::params::ForestParams;
use rand::rngs::StdRng;
use rand::SeedableRng;

/// Spacing between per-slot seeds derived from one base seed
const STREAM_SEED_STRIDE: u64 = 0x9E37_79B9_7F4A_7C15;

#[derive(Debug, Clone)]
pub struct Randomizer {
    streams: Vec<StdRng>,
}

impl Randomizer {
    /// Seed every stream independently from system entropy
    pub fn from_entropy(slots: usize) -> Self {
        Self {
            streams: (0..slots.max(1)).map(|_| StdRng::from_entropy()).collect(),
        }
    }

    /// Derive every stream from one base seed (reproducible)
    pub fn seeded(seed: u64, slots: usize) -> Self {
        Self {
            streams: (0..slots.max(1) as u64)
                .map(|slot| {
                    StdRng::seed_from_u64(seed.wrapping_add(slot.wrapping_mul(STREAM_SEED_STRIDE)))
                })
                .collect(),
        }
    }

    /// One stream per candidate feature, seeded per `params.seed`
    pub fn for_params(params: &ForestParams) -> Self {
        let slots = params.num_candidate_features;
        match params.seed {
            Some(seed) => Self::seeded(seed, slots),
            None => Self::from_entropy(slots),
        }
    }

    pub fn slots(&self) -> usize {
        self.streams.len()
    }

    /// Stream 0, used by sequential phases (shuffling, breadth-first levels).
    ///
    /// Not exclusive: it is also candidate slot 0's stream during depth-first
    /// search. Phases never overlap, so draws stay deterministic.
    pub fn primary(&mut self) -> &mut StdRng {
        &mut self.streams[0]
    }

    pub fn stream(&mut self, slot: usize) -> Option<&mut StdRng> {
        self.streams.get_mut(slot)
    }

    pub fn streams_mut(&mut self) -> &mut [StdRng] {
        &mut self.streams
    }
}
