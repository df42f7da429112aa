pub mod clip;
pub mod config;
pub mod constants;
pub mod distance;
pub mod engine;
pub mod metrics;
pub mod noise;
pub mod rng;
pub mod scenario;
pub mod state;
pub mod urgency;

pub use clip::{AbsClipper, Clipper};
pub use config::{Config, Species, SpeciesError};
pub use engine::{Engine, EngineInitError, EngineRunResult, RunOptions};
pub use metrics::{RunSummary, StepMetrics};
pub use noise::{ConstantNoise, EpsilonNoise, NoiseSource};
pub use scenario::{Scenario, ScenarioError};
pub use state::State;
pub use urgency::Urgencies;
