//! Benchmark workloads for the heapmm heap memory manager.
//!
//! Provides seeded, replayable allocate/release workloads:
//!
//! - [`ChurnProfile`]: shape of a random churn run (steps, live-set cap,
//!   size range, operation mix).
//! - [`generate`]: a deterministic [`ChurnOp`] stream from a profile and seed.
//! - [`replay`]: drives any [`HeapAllocator`] through an op stream and
//!   releases whatever is still live at the end.

#![forbid(unsafe_code)]
#![deny(rustdoc::broken_intra_doc_links)]

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use heapmm_core::{HeapAllocator, HeapPtr};

/// One step of a churn workload.
///
/// Slots index the live set as it stands when the op is replayed; the
/// generator tracks the live-set size so every slot is valid.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ChurnOp {
    /// Allocate `size` bytes and append the pointer to the live set.
    Allocate { size: usize },
    /// Release the pointer in `slot` (swap-removed from the live set).
    Release { slot: usize },
    /// Resize the pointer in `slot` to `size` bytes.
    Resize { slot: usize, size: usize },
    /// Zero-allocate `count * size` bytes and append it to the live set.
    ZeroAllocate { count: usize, size: usize },
}

/// Shape of a random churn workload.
#[derive(Clone, Debug, PartialEq)]
pub struct ChurnProfile {
    /// Number of ops to generate.
    pub steps: usize,
    /// Allocations stop while this many are live.
    pub max_live: usize,
    /// Sizes are drawn uniformly from `1..=max_size`.
    pub max_size: usize,
    /// Probability that a step resizes instead of allocating or releasing.
    pub resize_ratio: f64,
    /// Probability that an allocation is zero-initialised.
    pub zero_ratio: f64,
}

impl ChurnProfile {
    /// Equal parts allocate and release, up to 10 KiB per request and
    /// 10 000 live allocations.
    pub fn alloc_free() -> Self {
        Self {
            steps: 100_000,
            max_live: 10_000,
            max_size: 10_240,
            resize_ratio: 0.0,
            zero_ratio: 0.0,
        }
    }

    /// Small requests with a share of resizes and zeroed arrays.
    pub fn mixed() -> Self {
        Self {
            steps: 50_000,
            max_live: 2_000,
            max_size: 512,
            resize_ratio: 0.2,
            zero_ratio: 0.1,
        }
    }

    /// Scale the step count, keeping the mix.
    pub fn with_steps(mut self, steps: usize) -> Self {
        self.steps = steps;
        self
    }
}

/// Generate a deterministic op stream for `profile` from `seed`.
pub fn generate(profile: &ChurnProfile, seed: u64) -> Vec<ChurnOp> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let mut live = 0usize;
    let mut ops = Vec::with_capacity(profile.steps);

    for _ in 0..profile.steps {
        let size = rng.random_range(1..=profile.max_size);
        if live > 0 && rng.random_bool(profile.resize_ratio) {
            let slot = rng.random_range(0..live);
            ops.push(ChurnOp::Resize { slot, size });
        } else if live < profile.max_live && (live == 0 || rng.random_bool(0.5)) {
            if rng.random_bool(profile.zero_ratio) {
                let elem = rng.random_range(1..=8usize);
                ops.push(ChurnOp::ZeroAllocate {
                    count: size.div_ceil(elem),
                    size: elem,
                });
            } else {
                ops.push(ChurnOp::Allocate { size });
            }
            live += 1;
        } else {
            let slot = rng.random_range(0..live);
            ops.push(ChurnOp::Release { slot });
            live -= 1;
        }
    }
    ops
}

/// Counters from one [`replay`] run.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ReplayOutcome {
    /// Successful allocate and zero-allocate calls.
    pub allocations: usize,
    /// Release calls, the final drain included.
    pub releases: usize,
    /// Successful resizes.
    pub resizes: usize,
    /// Calls that returned an error.
    pub failures: usize,
    /// Largest live-set size seen.
    pub peak_live: usize,
}

/// Replay `ops` against `heap`, then release everything still live.
///
/// A failed allocation is counted and skipped; later slots still refer to
/// the live set as it actually is, clamped to its current size.
pub fn replay<H: HeapAllocator>(heap: &mut H, ops: &[ChurnOp]) -> ReplayOutcome {
    let mut live: Vec<HeapPtr> = Vec::new();
    let mut out = ReplayOutcome::default();

    for &op in ops {
        match op {
            ChurnOp::Allocate { size } => match heap.allocate(size) {
                Ok(p) => {
                    live.push(p);
                    out.allocations += 1;
                }
                Err(_) => out.failures += 1,
            },
            ChurnOp::ZeroAllocate { count, size } => match heap.zero_allocate(count, size) {
                Ok(p) => {
                    live.push(p);
                    out.allocations += 1;
                }
                Err(_) => out.failures += 1,
            },
            ChurnOp::Release { slot } if !live.is_empty() => {
                let p = live.swap_remove(slot % live.len());
                heap.release(Some(p));
                out.releases += 1;
            }
            ChurnOp::Resize { slot, size } if !live.is_empty() => {
                let idx = slot % live.len();
                match heap.resize(Some(live[idx]), size) {
                    Ok(Some(p)) => {
                        live[idx] = p;
                        out.resizes += 1;
                    }
                    Ok(None) => {
                        live.swap_remove(idx);
                        out.resizes += 1;
                    }
                    Err(_) => out.failures += 1,
                }
            }
            ChurnOp::Release { .. } | ChurnOp::Resize { .. } => {}
        }
        out.peak_live = out.peak_live.max(live.len());
    }

    for p in live {
        heap.release(Some(p));
        out.releases += 1;
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generation_is_deterministic() {
        let profile = ChurnProfile::mixed().with_steps(2_000);
        assert_eq!(generate(&profile, 7), generate(&profile, 7));
        assert_ne!(generate(&profile, 7), generate(&profile, 8));
    }

    #[test]
    fn generated_slots_are_always_in_range() {
        let profile = ChurnProfile::mixed().with_steps(5_000);
        let mut live = 0usize;
        for op in generate(&profile, 3) {
            match op {
                ChurnOp::Allocate { size } => {
                    assert!((1..=profile.max_size).contains(&size));
                    live += 1;
                }
                ChurnOp::ZeroAllocate { .. } => live += 1,
                ChurnOp::Release { slot } => {
                    assert!(slot < live);
                    live -= 1;
                }
                ChurnOp::Resize { slot, .. } => assert!(slot < live),
            }
            assert!(live <= profile.max_live);
        }
    }

    #[test]
    fn alloc_free_profile_has_no_resizes() {
        let ops = generate(&ChurnProfile::alloc_free().with_steps(1_000), 1);
        assert!(ops
            .iter()
            .all(|op| matches!(op, ChurnOp::Allocate { .. } | ChurnOp::Release { .. })));
    }

    #[test]
    fn replay_drains_the_heap() {
        use heapmm_alloc::{FreeListHeap, HeapConfig};

        let mut heap = FreeListHeap::new(HeapConfig::with_capacity(256 << 20)).unwrap();
        let ops = generate(&ChurnProfile::mixed().with_steps(3_000), 11);
        let out = replay(&mut heap, &ops);
        assert_eq!(out.failures, 0);
        assert!(out.peak_live > 0);
        heap.verify().unwrap();
        assert_eq!(heap.stats().live_allocations, 0);
        assert_eq!(heap.stats().free_blocks, 1);
    }
}
