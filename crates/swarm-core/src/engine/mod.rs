use crate::clip::{AbsClipper, Clipper};
use crate::config::Config;
use crate::constants::{PROGRESS_LOG_INTERVAL, URGENCY_COUNT};
use crate::noise::{EpsilonNoise, NoiseSource};
use crate::state::State;
use ndarray::Array3;
use serde::{Deserialize, Serialize};
use std::{error::Error, fmt};
use tracing::{debug, info};

mod step;

pub type Shape = (usize, usize);

#[derive(Debug, Clone, PartialEq)]
pub enum EngineInitError {
    /// Particle kinematic matrices disagree, or `uw` is not `(n, 3)`.
    ShapeMismatch {
        p: Shape,
        v: Shape,
        a: Shape,
        uw: Shape,
    },
}

impl fmt::Display for EngineInitError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EngineInitError::ShapeMismatch { p, v, a, uw } => write!(
                f,
                "inconsistent shapes: p={p:?} v={v:?} a={a:?} uw={uw:?}"
            ),
        }
    }
}

impl Error for EngineInitError {}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RunOptions {
    /// Leading iterations that are simulated but not recorded. Any value above
    /// zero also drops the pre-run initial state.
    pub skip_initial_states: usize,
    /// Record the weighted urgency fields of every retained iteration.
    pub return_urgency_vectors: bool,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EngineRunResult {
    /// Recorded snapshots in chronological order.
    pub states: Vec<State>,
    /// Per recorded snapshot, a `(3, n, d)` array of the cohesion, separation
    /// and avoidance fields. `None` unless requested.
    pub urgencies: Option<Vec<Array3<f64>>>,
}

/// Steps both populations forward in time.
///
/// The engine owns its [`State`] exclusively; callers observe it through
/// [`Engine::state`] or the snapshots returned by [`Engine::run`].
pub struct Engine<N = EpsilonNoise, C = AbsClipper> {
    state: State,
    // Keep config private so the shape invariant checked in the constructor holds.
    config: Config,
    noise: N,
    clipper: C,
}

impl Engine {
    /// Engine with the default seeded noise source and per-axis clipper.
    pub fn new(state: State, config: Config) -> Result<Self, EngineInitError> {
        Self::with_strategies(state, config, EpsilonNoise::default(), AbsClipper)
    }

    /// Engine whose noise stream is seeded with `seed`.
    pub fn seeded(state: State, config: Config, seed: u64) -> Result<Self, EngineInitError> {
        let epsilon = crate::constants::DEFAULT_NOISE_EPSILON;
        Self::with_strategies(state, config, EpsilonNoise::new(seed, epsilon), AbsClipper)
    }
}

impl<N: NoiseSource, C: Clipper> Engine<N, C> {
    pub fn with_strategies(
        state: State,
        config: Config,
        noise: N,
        clipper: C,
    ) -> Result<Self, EngineInitError> {
        Self::validate_shapes(&state, &config)?;
        Ok(Self {
            state,
            config,
            noise,
            clipper,
        })
    }

    fn validate_shapes(state: &State, config: &Config) -> Result<(), EngineInitError> {
        let p = state.p.dim();
        let v = state.v.dim();
        let a = state.a.dim();
        let uw = config.uw.dim();
        if p != v || p != a || uw != (p.0, URGENCY_COUNT) {
            return Err(EngineInitError::ShapeMismatch { p, v, a, uw });
        }
        Ok(())
    }

    pub fn state(&self) -> &State {
        &self.state
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Hand the live state back, ending the engine's ownership.
    pub fn into_state(self) -> State {
        self.state
    }

    /// Advance the simulation by exactly `iterations` steps of `timestep`.
    ///
    /// With `skip_initial_states == 0` the initial state (and an all-zero
    /// urgency array) is recorded first, giving `iterations + 1` snapshots.
    /// Otherwise iteration `i` is recorded once `i >= skip_initial_states`,
    /// giving `iterations - skip_initial_states + 1` snapshots.
    pub fn run(&mut self, timestep: f64, iterations: usize, options: RunOptions) -> EngineRunResult {
        let skip = options.skip_initial_states;
        info!(iterations, timestep, "starting simulation");

        let capacity = if skip == 0 {
            iterations + 1
        } else {
            (iterations + 1).saturating_sub(skip)
        };
        let mut states = Vec::with_capacity(capacity);
        let mut urgencies = Vec::with_capacity(if options.return_urgency_vectors {
            capacity
        } else {
            0
        });

        if skip > 0 {
            info!(
                skip,
                "leading iterations will be simulated but not recorded"
            );
        } else {
            states.push(self.state.clone());
            if options.return_urgency_vectors {
                let (n, d) = self.state.p.dim();
                urgencies.push(Array3::zeros((URGENCY_COUNT, n, d)));
            }
        }

        for iteration in 1..=iterations {
            if iteration % PROGRESS_LOG_INTERVAL == 0 {
                debug!(iteration, iterations, "simulating iteration");
            }

            let step_urgencies = self.step_particles(timestep);
            self.step_predators(timestep);

            // Equivalent to `iteration > skip - 1`: skipping `k` drops the
            // initial state and the `k - 1` states after it.
            if iteration >= skip {
                states.push(self.state.clone());
                if options.return_urgency_vectors {
                    urgencies.push(step_urgencies.stacked());
                }
            }
        }

        info!(recorded = states.len(), "simulation finished");
        EngineRunResult {
            states,
            urgencies: options.return_urgency_vectors.then_some(urgencies),
        }
    }
}
