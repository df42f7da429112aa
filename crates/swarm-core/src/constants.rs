/// Number of urgency components driving particle acceleration.
pub const URGENCY_COUNT: usize = 3;

/// Seed used by [`crate::noise::EpsilonNoise::default`].
pub const DEFAULT_NOISE_SEED: u64 = 42;

/// Half-width of the multiplicative jitter band around 1.0.
pub const DEFAULT_NOISE_EPSILON: f64 = 0.01;

/// Iteration interval between progress log lines during a run.
pub const PROGRESS_LOG_INTERVAL: usize = 10;

/// Prime multiplier used to derive independent RNG streams from a base seed.
pub const RNG_DERIVATION_PRIME: u64 = 7919;
