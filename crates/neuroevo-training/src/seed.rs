//! Deterministic seed derivation.
//!
//! All randomness in a training run descends from one `u64` run seed. The
//! genetic algorithm draws its variation decisions from a run-seeded stream,
//! and every fitness evaluation gets its own seed, fixed by (run seed,
//! generation, individual index). Derived seeds never depend on thread
//! scheduling, so parallel evaluation reproduces sequential evaluation bit
//! for bit.
//!
//! Derivation uses the SplitMix64 finalizer, which spreads counter-like
//! inputs (seed 0, 1, 2, ...) into well-mixed values.

const VARIATION_TAG: u64 = 1;
const EVALUATION_TAG: u64 = 2;

/// Seed for the algorithm's own stream: population initialization,
/// selection tournaments, and variation.
#[must_use]
pub fn variation_stream(run_seed: u64) -> u64 {
    mix(run_seed, VARIATION_TAG)
}

/// Seed for evaluating one individual in one generation.
///
/// `index` is the individual's position before the post-evaluation sort.
#[must_use]
pub fn evaluation_seed(run_seed: u64, generation: usize, index: usize) -> u64 {
    mix(mix(mix(run_seed, EVALUATION_TAG), generation as u64), index as u64)
}

fn mix(a: u64, b: u64) -> u64 {
    split_mix(a ^ split_mix(b))
}

fn split_mix(mut state: u64) -> u64 {
    state = state.wrapping_add(0x9e37_79b9_7f4a_7c15);
    state = (state ^ (state >> 30)).wrapping_mul(0xbf58_476d_1ce4_e5b9);
    state = (state ^ (state >> 27)).wrapping_mul(0x94d0_49bb_1331_11eb);
    state ^ (state >> 31)
}
