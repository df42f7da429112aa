use super::Engine;
use crate::clip::Clipper;
use crate::distance;
use crate::noise::NoiseSource;
use crate::urgency::{self, Urgencies};
use ndarray::{Array2, ArrayView1, Axis};

/// Jitter a raw urgency field, then scale it by the species strength and each
/// particle's own weight.
fn weigh(
    mut raw: Array2<f64>,
    noise: &Array2<f64>,
    strength: f64,
    weights: ArrayView1<f64>,
) -> Array2<f64> {
    raw *= noise;
    for (mut row, &w) in raw.axis_iter_mut(Axis(0)).zip(weights.iter()) {
        row.mapv_inplace(|x| x * strength * w);
    }
    raw
}

impl<N: NoiseSource, C: Clipper> Engine<N, C> {
    /// Compute the three weighted urgency fields for the current positions.
    pub(super) fn compute_urgencies(&mut self, distances: &Array2<f64>) -> Urgencies {
        let species = &self.config.species;
        let uw = &self.config.uw;
        let p = self.state.p.view();
        let shape = p.dim();

        let raw_cohesion = urgency::cohesion(p, distances.view(), species.d_max);
        let cohesion = weigh(
            raw_cohesion,
            &self.noise.noise(shape),
            species.u1_p,
            uw.column(0),
        );

        let raw_separation = urgency::repulsion(p, p, distances.view(), species.u2_dopt);
        let separation = weigh(
            raw_separation,
            &self.noise.noise(shape),
            species.u2_p,
            uw.column(1),
        );

        let predator_distances = distance::cross_distances(p, self.state.pred_p.view());
        let raw_avoidance = urgency::repulsion(
            p,
            self.state.pred_p.view(),
            predator_distances.view(),
            species.u3_dmax,
        );
        let avoidance = weigh(
            raw_avoidance,
            &self.noise.noise(shape),
            species.u3_p,
            uw.column(2),
        );

        Urgencies {
            cohesion,
            separation,
            avoidance,
        }
    }

    /// Advance every particle by one `timestep`, returning the urgency fields
    /// that drove the step.
    pub(super) fn step_particles(&mut self, timestep: f64) -> Urgencies {
        let distances = distance::self_distances(self.state.p.view());
        let urgencies = self.compute_urgencies(&distances);

        let species = &self.config.species;
        let (u_max, a_max) = (species.u_max, species.a_max);
        let mut a = urgencies.total();
        a.mapv_inplace(|u| u / u_max * a_max);
        self.clipper.clip_by_abs(&mut a, a_max);
        // Jitter after clipping: the final magnitude may exceed a_max by the noise factor.
        let jitter = self.noise.noise(a.dim());
        a *= &jitter;
        self.state.a = a;

        let state = &mut self.state;
        state.v *= species.v_decay.powf(timestep);
        state.v.scaled_add(timestep, &state.a);
        self.clipper.clip_by_abs(&mut state.v, species.v_max);
        state.p.scaled_add(timestep, &state.v);

        urgencies
    }

    /// Advance every predator by one `timestep`. Predators carry no urgency,
    /// velocity cap or decay.
    pub(super) fn step_predators(&mut self, timestep: f64) {
        let state = &mut self.state;
        let jitter = self.noise.noise(state.pred_a.dim());
        state.pred_a *= &jitter;
        state.pred_v.scaled_add(timestep, &state.pred_a);
        state.pred_p.scaled_add(timestep, &state.pred_v);
    }
}
