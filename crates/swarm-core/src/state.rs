use ndarray::Array2;
use serde::{Deserialize, Serialize};

/// Kinematic snapshot of both populations.
///
/// Particle matrices are `(n, d)`, predator matrices are `(m, d)`. `Clone`
/// yields the deep copy recorded into run history.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct State {
    /// Particle positions.
    pub p: Array2<f64>,
    /// Particle velocities.
    pub v: Array2<f64>,
    /// Particle accelerations.
    pub a: Array2<f64>,
    /// Predator positions.
    pub pred_p: Array2<f64>,
    /// Predator velocities.
    pub pred_v: Array2<f64>,
    /// Predator accelerations (constant baseline, re-jittered every step).
    pub pred_a: Array2<f64>,
}

impl State {
    /// State with particles at rest at `positions` and no predators.
    pub fn at_rest(positions: Array2<f64>) -> Self {
        let dims = positions.ncols();
        Self {
            v: Array2::zeros(positions.raw_dim()),
            a: Array2::zeros(positions.raw_dim()),
            p: positions,
            pred_p: Array2::zeros((0, dims)),
            pred_v: Array2::zeros((0, dims)),
            pred_a: Array2::zeros((0, dims)),
        }
    }

    /// Replace the predator population with predators at rest with the given
    /// baseline acceleration.
    pub fn with_predators(mut self, positions: Array2<f64>, acceleration: Array2<f64>) -> Self {
        self.pred_v = Array2::zeros(positions.raw_dim());
        self.pred_p = positions;
        self.pred_a = acceleration;
        self
    }

    pub fn particle_count(&self) -> usize {
        self.p.nrows()
    }

    pub fn predator_count(&self) -> usize {
        self.pred_p.nrows()
    }

    pub fn dimensions(&self) -> usize {
        self.p.ncols()
    }
}
