//! Determinism testing utilities.
//!
//! Provides a harness for verifying that simulation operations produce
//! identical results given identical inputs.
//!
//! # Testing Strategy
//!
//! Lockstep multiplayer requires 100% determinism. Sources of
//! non-determinism include:
//!
//! - **Floating-point math**: Different CPUs can produce different results.
//!   We use fixed-point arithmetic via [`muster_core::math::Fixed`] throughout.
//!
//! - **HashMap iteration order**: Rust's default hasher is randomized.
//!   We always iterate in sorted actor ID order.
//!
//! - **System randomness**: No calls to `rand()` without explicit seeds.
//!   All "random" behavior uses the world's seeded RNG.

/// Result of a determinism test.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeterminismResult {
    /// Whether all runs produced identical results.
    pub is_deterministic: bool,
    /// Hashes from each run.
    pub hashes: Vec<u64>,
}

impl DeterminismResult {
    /// Get all unique hashes (should be 1 for deterministic behavior).
    #[must_use]
    pub fn unique_hashes(&self) -> Vec<u64> {
        let mut unique: Vec<u64> = self.hashes.clone();
        unique.sort_unstable();
        unique.dedup();
        unique
    }

    /// Assert that the runs were deterministic, with a detailed error
    /// message.
    ///
    /// # Panics
    ///
    /// Panics if the runs produced different hashes.
    pub fn assert_deterministic(&self) {
        if !self.is_deterministic {
            let unique = self.unique_hashes();
            panic!(
                "Operation is non-deterministic!\n\
                 Runs: {}\n\
                 Unique hashes: {} (expected 1)\n\
                 All hashes: {:?}",
                self.hashes.len(),
                unique.len(),
                self.hashes
            );
        }
    }
}

/// Run an operation multiple times from identical setups and verify the
/// results match.
///
/// # Arguments
///
/// * `runs` - Number of times to repeat the whole setup/run cycle
/// * `setup` - Function to create the initial state
/// * `run` - Function to execute the operation under test
/// * `hash` - Function to compute a state hash afterwards
///
/// # Example
///
/// ```
/// use muster_test_utils::determinism::verify_determinism;
/// use muster_test_utils::fixtures;
///
/// let result = verify_determinism(
///     5,
///     || fixtures::open_world(42),
///     |world| {
///         world.rng_mut().next();
///     },
///     |world| world.state_hash(),
/// );
/// result.assert_deterministic();
/// ```
pub fn verify_determinism<S, Setup, Run, HashFn>(
    runs: usize,
    setup: Setup,
    run: Run,
    hash: HashFn,
) -> DeterminismResult
where
    Setup: Fn() -> S,
    Run: Fn(&mut S),
    HashFn: Fn(&S) -> u64,
{
    let mut hashes = Vec::with_capacity(runs);

    for _ in 0..runs {
        let mut state = setup();
        run(&mut state);
        hashes.push(hash(&state));
    }

    let is_deterministic = hashes.windows(2).all(|w| w[0] == w[1]);

    DeterminismResult {
        is_deterministic,
        hashes,
    }
}
