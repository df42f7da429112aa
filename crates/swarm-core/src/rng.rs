use rand::SeedableRng;
use rand_chacha::ChaCha12Rng;

/// Stream index for initial particle/predator placement.
pub const STATE_STREAM: u64 = 0;
/// Stream index for per-individual urgency weights.
pub const WEIGHTS_STREAM: u64 = 1;
/// Stream index for the multiplicative noise source.
pub const NOISE_STREAM: u64 = 2;

/// Create a deterministic RNG from a seed.
pub fn create_rng(seed: u64) -> ChaCha12Rng {
    ChaCha12Rng::seed_from_u64(seed)
}

/// Derive a sub-RNG for a named stream, so that consumers drawing from one
/// stream never shift the draws seen by another.
pub fn derive_stream_rng(base_seed: u64, stream: u64) -> ChaCha12Rng {
    ChaCha12Rng::seed_from_u64(
        base_seed.wrapping_add(stream.wrapping_mul(crate::constants::RNG_DERIVATION_PRIME)),
    )
}
