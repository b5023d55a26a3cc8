//! Worker pool configuration for candidate search
//!
//! Thread count semantics:
//! - `0` = auto (rayon's current pool)
//! - `1` = sequential
//! - `n > 1` = a dedicated pool of exactly `n` threads

use crate::errors::{ForestError, Result};
use rayon::prelude::*;

/// Whether parallel execution is allowed.
///
/// Components never manage thread pools themselves; the pool is installed
/// once per build by [`run_with_threads`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Parallelism {
    Sequential,
    Parallel,
}

impl Parallelism {
    #[inline]
    pub fn from_threads(n_threads: usize) -> Self {
        if n_threads == 1 || (n_threads == 0 && rayon::current_num_threads() == 1) {
            Parallelism::Sequential
        } else {
            Parallelism::Parallel
        }
    }

    #[inline]
    pub fn is_parallel(self) -> bool {
        matches!(self, Parallelism::Parallel)
    }

    /// Fill every result slot with `f(slot_id, rng_stream)`.
    ///
    /// Slot `i` is always paired with stream `i`, so the outcome does not
    /// depend on how many threads execute the work. Each unit writes only
    /// its own slot; callers reduce the slots sequentially afterwards.
    pub fn fill_slots<T, R, F>(self, slots: &mut [T], streams: &mut [R], f: F) -> Result<()>
    where
        T: Send,
        R: Send,
        F: Fn(usize, &mut R) -> T + Sync + Send,
    {
        if streams.len() < slots.len() {
            return Err(ForestError::InternalInconsistency(format!(
                "{} result slots but only {} RNG streams",
                slots.len(),
                streams.len()
            )));
        }

        if self.is_parallel() {
            slots
                .par_iter_mut()
                .zip(streams.par_iter_mut())
                .enumerate()
                .for_each(|(i, (slot, rng))| *slot = f(i, rng));
        } else {
            slots
                .iter_mut()
                .zip(streams.iter_mut())
                .enumerate()
                .for_each(|(i, (slot, rng))| *slot = f(i, rng));
        }
        Ok(())
    }
}

/// Run a closure with the appropriate thread pool.
pub fn run_with_threads<T: Send>(
    n_threads: usize,
    f: impl FnOnce(Parallelism) -> T + Send,
) -> Result<T> {
    let parallelism = Parallelism::from_threads(n_threads);

    match parallelism {
        Parallelism::Parallel if n_threads > 1 => {
            let pool = rayon::ThreadPoolBuilder::new()
                .num_threads(n_threads)
                .build()
                .map_err(|e| ForestError::ThreadPool(e.to_string()))?;
            Ok(pool.install(|| f(Parallelism::Parallel)))
        }
        _ => Ok(f(parallelism)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_threads() {
        assert_eq!(Parallelism::from_threads(1), Parallelism::Sequential);
        assert_eq!(Parallelism::from_threads(4), Parallelism::Parallel);
    }

    #[test]
    fn test_fill_slots_pairs_slot_with_stream() {
        for parallelism in [Parallelism::Sequential, Parallelism::Parallel] {
            let mut slots = vec![0usize; 5];
            let mut streams: Vec<usize> = (100..105).collect();
            parallelism
                .fill_slots(&mut slots, &mut streams, |i, s| {
                    *s += 1;
                    i * 1000 + *s
                })
                .unwrap();

            assert_eq!(slots, vec![101, 1102, 2103, 3104, 4105]);
            assert_eq!(streams, vec![101, 102, 103, 104, 105]);
        }
    }

    #[test]
    fn test_fill_slots_needs_enough_streams() {
        let mut slots = vec![0; 3];
        let mut streams = vec![(); 2];
        let err = Parallelism::Sequential
            .fill_slots(&mut slots, &mut streams, |_, _| 1)
            .unwrap_err();
        assert!(matches!(err, ForestError::InternalInconsistency(_)));
    }

    #[test]
    fn test_run_with_threads_installs_pool() {
        let threads = run_with_threads(3, |p| {
            assert!(p.is_parallel());
            rayon::current_num_threads()
        })
        .unwrap();
        assert_eq!(threads, 3);

        let sequential = run_with_threads(1, |p| p).unwrap();
        assert_eq!(sequential, Parallelism::Sequential);
    }
}
