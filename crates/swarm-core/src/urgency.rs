//! The three urgency fields that particle acceleration derives from.
//!
//! Kernels here are pure: they return the raw `(n, d)` direction fields.
//! Noise and per-individual weighting are applied by the engine.

use crate::constants::URGENCY_COUNT;
use ndarray::{Array2, Array3, ArrayView2, Axis, Zip};

/// A pair interacts when `0 < distance <= limit`; zero distance covers both
/// the self term and collocated points.
#[inline]
fn in_range(distance: f64, limit: f64) -> bool {
    distance > 0.0 && distance <= limit
}

/// Pull of each particle toward the unweighted barycenter of its neighbors
/// within `d_max`.
///
/// Returns `barycenter - position` per particle. Particles with no neighbor
/// in range get an exact zero row.
pub fn cohesion(
    positions: ArrayView2<f64>,
    distances: ArrayView2<f64>,
    d_max: f64,
) -> Array2<f64> {
    let n = positions.nrows();
    let mut weights = Array2::<f64>::zeros((n, n));
    let mut isolated = vec![false; n];
    for ((mut w_row, d_row), lonely) in weights
        .rows_mut()
        .into_iter()
        .zip(distances.rows())
        .zip(isolated.iter_mut())
    {
        let neighbors = d_row.iter().filter(|&&d| in_range(d, d_max)).count();
        if neighbors == 0 {
            *lonely = true;
            continue;
        }
        let share = 1.0 / neighbors as f64;
        for (w, &d) in w_row.iter_mut().zip(d_row.iter()) {
            if in_range(d, d_max) {
                *w = share;
            }
        }
    }

    let mut pull = weights.dot(&positions) - &positions;
    for (mut row, &lonely) in pull.rows_mut().into_iter().zip(isolated.iter()) {
        if lonely {
            row.fill(0.0);
        }
    }
    pull
}

/// Distance-weighted push of each particle away from every source within `range`.
///
/// The weight `(range - d) / (range * d)` combines a linear ramp (1 at contact,
/// 0 at `range`) with normalisation of the displacement `p_i - s_j`, whose
/// length is `d`.
pub fn repulsion(
    positions: ArrayView2<f64>,
    sources: ArrayView2<f64>,
    distances: ArrayView2<f64>,
    range: f64,
) -> Array2<f64> {
    let mut push = Array2::zeros(positions.raw_dim());
    for (i, mut acc) in push.rows_mut().into_iter().enumerate() {
        let p_i = positions.row(i);
        for (j, &d) in distances.row(i).iter().enumerate() {
            if !in_range(d, range) {
                continue;
            }
            let weight = (range - d) / (range * d);
            Zip::from(&mut acc)
                .and(&p_i)
                .and(&sources.row(j))
                .for_each(|a, &x, &s| *a += weight * (x - s));
        }
    }
    push
}

/// Weighted urgency fields for one particle step.
#[derive(Clone, Debug, PartialEq)]
pub struct Urgencies {
    /// Attraction to the local barycenter (u1).
    pub cohesion: Array2<f64>,
    /// Short-range repulsion from other particles (u2).
    pub separation: Array2<f64>,
    /// Repulsion from predators (u3).
    pub avoidance: Array2<f64>,
}

impl Urgencies {
    /// `u1 + u2 + u3`.
    pub fn total(&self) -> Array2<f64> {
        &(&self.cohesion + &self.separation) + &self.avoidance
    }

    /// Stack into a `(3, n, d)` array in u1, u2, u3 order.
    pub fn stacked(&self) -> Array3<f64> {
        let (n, d) = self.cohesion.dim();
        let mut out = Array3::zeros((URGENCY_COUNT, n, d));
        for (k, field) in [&self.cohesion, &self.separation, &self.avoidance]
            .into_iter()
            .enumerate()
        {
            out.index_axis_mut(Axis(0), k).assign(field);
        }
        out
    }
}
