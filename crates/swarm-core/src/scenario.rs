//! Deterministic bootstrapping of a run from a small JSON-friendly description.

use crate::clip::AbsClipper;
use crate::config::{Config, Species, SpeciesError};
use crate::constants::{DEFAULT_NOISE_EPSILON, URGENCY_COUNT};
use crate::engine::{Engine, EngineInitError, RunOptions};
use crate::noise::EpsilonNoise;
use crate::rng::{self, NOISE_STREAM, STATE_STREAM, WEIGHTS_STREAM};
use crate::state::State;
use ndarray::Array2;
use rand::Rng;
use rand_chacha::ChaCha12Rng;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Scenario {
    /// Base seed; placement, weights and noise use independent derived streams.
    pub seed: u64,
    /// Number of particles (n).
    pub particles: usize,
    /// Number of predators (m).
    pub predators: usize,
    /// Dimensionality of the space (d).
    pub dimensions: usize,
    /// Particles spawn uniformly in `[-spawn_extent, spawn_extent]^d`.
    pub spawn_extent: f64,
    /// Per-axis bound of the initial particle velocity.
    pub initial_speed: f64,
    /// Predators spawn uniformly in `[-predator_spawn_extent, predator_spawn_extent]^d`.
    pub predator_spawn_extent: f64,
    /// Per-axis bound of each predator's baseline acceleration.
    pub predator_accel: f64,
    /// Lower bound of per-individual urgency weights.
    pub uw_min: f64,
    /// Upper bound of per-individual urgency weights.
    pub uw_max: f64,
    /// Half-width of the multiplicative noise band around 1.0.
    pub noise_epsilon: f64,
    /// Simulation timestep.
    pub timestep: f64,
    /// Number of steps to simulate.
    pub iterations: usize,
    /// Leading iterations simulated but not recorded.
    pub skip_initial_states: usize,
    pub species: Species,
}

impl Default for Scenario {
    fn default() -> Self {
        Self {
            seed: 42,
            particles: 100,
            predators: 2,
            dimensions: 2,
            spawn_extent: 10.0,
            initial_speed: 0.5,
            predator_spawn_extent: 30.0,
            predator_accel: 0.1,
            uw_min: 1.0,
            uw_max: 1.0,
            noise_epsilon: DEFAULT_NOISE_EPSILON,
            timestep: 0.1,
            iterations: 1000,
            skip_initial_states: 0,
            species: Species::default(),
        }
    }
}

macro_rules! define_scenario_error {
    (
        $(
            $variant:ident $( { $($field:ident : $type:ty),* } )? => $fmt:literal $(, $arg:expr)*
        );* $(;)?
    ) => {
        #[derive(Debug, Clone, PartialEq)]
        pub enum ScenarioError {
            $(
                $variant $( { $($field : $type),* } )?,
            )*
            Species(SpeciesError),
        }

        impl std::fmt::Display for ScenarioError {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                match self {
                    $(
                        Self::$variant $( { $($field),* } )? => write!(f, $fmt $(, $arg)*),
                    )*
                    Self::Species(err) => write!(f, "invalid species: {err}"),
                }
            }
        }
    };
}

define_scenario_error! {
    InvalidDimensions => "dimensions must be greater than 0";
    TooManyParticles { max: usize, actual: usize } => "Too many particles: {} > max {}", actual, max;
    InvalidSpawnExtent => "spawn_extent must be finite and non-negative";
    InvalidInitialSpeed => "initial_speed must be finite and non-negative";
    InvalidPredatorSpawnExtent => "predator_spawn_extent must be finite and non-negative";
    InvalidPredatorAccel => "predator_accel must be finite and non-negative";
    InvalidUrgencyWeights => "uw_min/uw_max must be finite, non-negative, and ordered";
    InvalidNoiseEpsilon => "noise_epsilon must be finite and within [0,1)";
    InvalidTimestep => "timestep must be positive and finite";
    InvalidSkipInitialStates { skip: usize, iterations: usize } => "skip_initial_states ({skip}) exceeds iterations ({iterations})";
}

impl std::error::Error for ScenarioError {}

impl From<SpeciesError> for ScenarioError {
    fn from(err: SpeciesError) -> Self {
        Self::Species(err)
    }
}

fn non_negative(value: f64) -> bool {
    value.is_finite() && value >= 0.0
}

fn uniform(rng: &mut ChaCha12Rng, shape: (usize, usize), low: f64, high: f64) -> Array2<f64> {
    Array2::from_shape_fn(shape, |_| rng.random_range(low..=high))
}

impl Scenario {
    /// Dense pairwise kernels are O(n²) in memory; cap the particle count.
    pub const MAX_PARTICLES: usize = 20_000;

    pub fn validate(&self) -> Result<(), ScenarioError> {
        if self.dimensions == 0 {
            return Err(ScenarioError::InvalidDimensions);
        }
        if self.particles > Self::MAX_PARTICLES {
            return Err(ScenarioError::TooManyParticles {
                max: Self::MAX_PARTICLES,
                actual: self.particles,
            });
        }
        if !non_negative(self.spawn_extent) {
            return Err(ScenarioError::InvalidSpawnExtent);
        }
        if !non_negative(self.initial_speed) {
            return Err(ScenarioError::InvalidInitialSpeed);
        }
        if !non_negative(self.predator_spawn_extent) {
            return Err(ScenarioError::InvalidPredatorSpawnExtent);
        }
        if !non_negative(self.predator_accel) {
            return Err(ScenarioError::InvalidPredatorAccel);
        }
        if !(non_negative(self.uw_min) && non_negative(self.uw_max) && self.uw_min <= self.uw_max)
        {
            return Err(ScenarioError::InvalidUrgencyWeights);
        }
        if !(self.noise_epsilon.is_finite() && (0.0..1.0).contains(&self.noise_epsilon)) {
            return Err(ScenarioError::InvalidNoiseEpsilon);
        }
        if !(self.timestep.is_finite() && self.timestep > 0.0) {
            return Err(ScenarioError::InvalidTimestep);
        }
        if self.skip_initial_states > self.iterations {
            return Err(ScenarioError::InvalidSkipInitialStates {
                skip: self.skip_initial_states,
                iterations: self.iterations,
            });
        }
        self.species.validate()?;
        Ok(())
    }

    /// Random initial state: particles scattered with small random velocities,
    /// predators at rest with a random baseline acceleration.
    pub fn build_state(&self) -> State {
        let mut rng = rng::derive_stream_rng(self.seed, STATE_STREAM);
        let particles = (self.particles, self.dimensions);
        let predators = (self.predators, self.dimensions);
        let p = uniform(&mut rng, particles, -self.spawn_extent, self.spawn_extent);
        let v = uniform(&mut rng, particles, -self.initial_speed, self.initial_speed);
        let pred_p = uniform(
            &mut rng,
            predators,
            -self.predator_spawn_extent,
            self.predator_spawn_extent,
        );
        let pred_a = uniform(&mut rng, predators, -self.predator_accel, self.predator_accel);
        State {
            p,
            v,
            a: Array2::zeros(particles),
            pred_p,
            pred_v: Array2::zeros(predators),
            pred_a,
        }
    }

    pub fn build_config(&self) -> Config {
        let mut rng = rng::derive_stream_rng(self.seed, WEIGHTS_STREAM);
        let uw = uniform(
            &mut rng,
            (self.particles, URGENCY_COUNT),
            self.uw_min,
            self.uw_max,
        );
        Config::new(self.species.clone(), uw)
    }

    pub fn noise(&self) -> EpsilonNoise {
        EpsilonNoise::from_rng(
            rng::derive_stream_rng(self.seed, NOISE_STREAM),
            self.noise_epsilon,
        )
    }

    pub fn engine(&self) -> Result<Engine, EngineInitError> {
        Engine::with_strategies(self.build_state(), self.build_config(), self.noise(), AbsClipper)
    }

    pub fn run_options(&self, return_urgency_vectors: bool) -> RunOptions {
        RunOptions {
            skip_initial_states: self.skip_initial_states,
            return_urgency_vectors,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_scenario_is_valid() {
        assert_eq!(Scenario::default().validate(), Ok(()));
    }

    #[test]
    fn legacy_scenario_json_deserializes_with_defaults() {
        let json = r#"{
            "seed": 7,
            "particles": 12,
            "species": { "u3_p": 20.0 }
        }"#;
        let scenario: Scenario = serde_json::from_str(json).expect("scenario should parse");
        assert_eq!(scenario.particles, 12);
        assert_eq!(scenario.dimensions, 2);
        assert_eq!(scenario.species.u3_p, 20.0);
        assert_eq!(scenario.species.v_max, Species::default().v_max);
        assert_eq!(scenario.validate(), Ok(()));
    }

    #[test]
    fn build_state_has_consistent_shapes() {
        let scenario = Scenario {
            particles: 7,
            predators: 3,
            dimensions: 3,
            ..Scenario::default()
        };
        let state = scenario.build_state();
        assert_eq!(state.p.dim(), (7, 3));
        assert_eq!(state.v.dim(), (7, 3));
        assert_eq!(state.a.dim(), (7, 3));
        assert_eq!(state.pred_p.dim(), (3, 3));
        assert_eq!(state.pred_v.dim(), (3, 3));
        assert_eq!(state.pred_a.dim(), (3, 3));
        assert!(state
            .p
            .iter()
            .all(|x| x.abs() <= scenario.spawn_extent));
        assert_eq!(scenario.build_config().uw.dim(), (7, 3));
    }

    #[test]
    fn same_seed_same_bootstrap() {
        let scenario = Scenario::default();
        assert_eq!(scenario.build_state(), scenario.build_state());
        assert_eq!(scenario.build_config(), scenario.build_config());
        let other = Scenario {
            seed: 43,
            ..Scenario::default()
        };
        assert_ne!(scenario.build_state(), other.build_state());
    }

    #[test]
    fn weights_respect_configured_range() {
        let scenario = Scenario {
            uw_min: 0.25,
            uw_max: 0.75,
            ..Scenario::default()
        };
        let uw = scenario.build_config().uw;
        assert!(uw.iter().all(|w| (0.25..=0.75).contains(w)));
    }

    #[test]
    fn engine_from_scenario_runs() {
        let scenario = Scenario {
            particles: 10,
            iterations: 5,
            ..Scenario::default()
        };
        let mut engine = scenario.engine().expect("scenario shapes are consistent");
        let result = engine.run(scenario.timestep, scenario.iterations, scenario.run_options(false));
        assert_eq!(result.states.len(), 6);
    }

    #[test]
    fn validate_rejects_zero_dimensions() {
        let scenario = Scenario {
            dimensions: 0,
            ..Scenario::default()
        };
        assert_eq!(scenario.validate(), Err(ScenarioError::InvalidDimensions));
    }

    #[test]
    fn validate_rejects_unordered_weights() {
        let scenario = Scenario {
            uw_min: 2.0,
            uw_max: 1.0,
            ..Scenario::default()
        };
        assert_eq!(scenario.validate(), Err(ScenarioError::InvalidUrgencyWeights));
    }

    #[test]
    fn validate_rejects_skip_beyond_iterations() {
        let scenario = Scenario {
            iterations: 3,
            skip_initial_states: 4,
            ..Scenario::default()
        };
        assert!(matches!(
            scenario.validate(),
            Err(ScenarioError::InvalidSkipInitialStates { skip: 4, iterations: 3 })
        ));
    }

    #[test]
    fn validate_wraps_species_errors() {
        let scenario = Scenario {
            species: Species {
                a_max: 0.0,
                ..Species::default()
            },
            ..Scenario::default()
        };
        let err = scenario.validate().expect_err("a_max of zero is invalid");
        assert_eq!(err.to_string(), "invalid species: a_max must be positive");
    }

    #[test]
    fn too_many_particles_message() {
        let err = ScenarioError::TooManyParticles { max: 10, actual: 11 };
        assert_eq!(err.to_string(), "Too many particles: 11 > max 10");
    }
}
