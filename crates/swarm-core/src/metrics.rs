use crate::distance;
use crate::engine::EngineRunResult;
use crate::state::State;
use ndarray::{Array3, ArrayView2, Axis};
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Serialize, Deserialize, Default, PartialEq)]
#[serde(default)]
pub struct StepMetrics {
    /// Index of the snapshot within the recorded history.
    pub index: usize,
    pub centroid: Vec<f64>,
    pub spread_mean: f64,
    pub speed_mean: f64,
    pub speed_max: f64,
    pub acceleration_mean: f64,
    /// Closest particle–predator distance; `None` without predators.
    pub nearest_predator: Option<f64>,
    /// Mean row norm of the cohesion, separation and avoidance fields.
    pub urgency_norm_mean: Option<[f64; 3]>,
}

fn schema_version() -> u32 {
    1
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct RunSummary {
    #[serde(default = "schema_version")]
    pub schema_version: u32,
    pub timestep: f64,
    pub iterations: usize,
    pub skip_initial_states: usize,
    pub sample_every: usize,
    pub recorded_states: usize,
    pub samples: Vec<StepMetrics>,
}

fn row_norms(rows: ArrayView2<f64>) -> Vec<f64> {
    rows.rows()
        .into_iter()
        .map(|row| row.iter().map(|x| x * x).sum::<f64>().sqrt())
        .collect()
}

fn mean(values: impl Iterator<Item = f64>) -> f64 {
    let (sum, count) = values.fold((0.0, 0usize), |(s, c), v| (s + v, c + 1));
    if count == 0 {
        0.0
    } else {
        sum / count as f64
    }
}

impl StepMetrics {
    pub fn from_state(index: usize, state: &State) -> Self {
        let centroid = state
            .p
            .mean_axis(Axis(0))
            .map(|c| c.to_vec())
            .unwrap_or_default();
        let spread_mean = if centroid.is_empty() {
            0.0
        } else {
            let offsets = &state.p - &ndarray::aview1(&centroid);
            mean(row_norms(offsets.view()).into_iter())
        };
        let speed_max = row_norms(state.v.view()).into_iter().fold(0.0, f64::max);

        let nearest_predator = if state.predator_count() == 0 || state.particle_count() == 0 {
            None
        } else {
            let d = distance::cross_distances(state.p.view(), state.pred_p.view());
            Some(d.iter().copied().fold(f64::INFINITY, f64::min))
        };

        Self {
            index,
            centroid,
            spread_mean,
            speed_mean: mean(row_norms(state.v.view()).into_iter()),
            speed_max,
            acceleration_mean: mean(row_norms(state.a.view()).into_iter()),
            nearest_predator,
            urgency_norm_mean: None,
        }
    }

    pub fn with_urgencies(mut self, urgencies: &Array3<f64>) -> Self {
        let mut norms = [0.0; 3];
        for (norm, field) in norms.iter_mut().zip(urgencies.axis_iter(Axis(0))) {
            *norm = mean(row_norms(field).into_iter());
        }
        self.urgency_norm_mean = Some(norms);
        self
    }
}

impl RunSummary {
    /// Summarise every `sample_every`-th recorded snapshot (and always the last one).
    pub fn from_result(
        result: &EngineRunResult,
        timestep: f64,
        iterations: usize,
        skip_initial_states: usize,
        sample_every: usize,
    ) -> Self {
        let sample_every = sample_every.max(1);
        let last = result.states.len().saturating_sub(1);
        let samples = result
            .states
            .iter()
            .enumerate()
            .filter(|(i, _)| i % sample_every == 0 || *i == last)
            .map(|(i, state)| {
                let metrics = StepMetrics::from_state(i, state);
                match result.urgencies.as_ref().and_then(|u| u.get(i)) {
                    Some(u) => metrics.with_urgencies(u),
                    None => metrics,
                }
            })
            .collect();
        Self {
            schema_version: schema_version(),
            timestep,
            iterations,
            skip_initial_states,
            sample_every,
            recorded_states: result.states.len(),
            samples,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::{array, Array2};

    #[test]
    fn from_state_computes_kinematic_aggregates() {
        let mut state = State::at_rest(array![[0.0, 0.0], [2.0, 0.0]])
            .with_predators(array![[5.0, 0.0]], Array2::zeros((1, 2)));
        state.v = array![[3.0, 4.0], [0.0, 0.0]];
        let m = StepMetrics::from_state(0, &state);
        assert_eq!(m.centroid, vec![1.0, 0.0]);
        assert!((m.spread_mean - 1.0).abs() < 1e-12);
        assert!((m.speed_mean - 2.5).abs() < 1e-12);
        assert!((m.speed_max - 5.0).abs() < 1e-12);
        assert_eq!(m.nearest_predator, Some(3.0));
        assert_eq!(m.urgency_norm_mean, None);
    }

    #[test]
    fn no_predators_means_no_nearest_distance() {
        let state = State::at_rest(array![[0.0, 0.0]]);
        assert_eq!(StepMetrics::from_state(0, &state).nearest_predator, None);
    }

    #[test]
    fn urgency_norms_are_per_component() {
        let mut u = Array3::zeros((3, 1, 2));
        u[[0, 0, 0]] = 3.0;
        u[[0, 0, 1]] = 4.0;
        u[[2, 0, 1]] = -2.0;
        let m = StepMetrics::from_state(0, &State::at_rest(array![[0.0, 0.0]])).with_urgencies(&u);
        assert_eq!(m.urgency_norm_mean, Some([5.0, 0.0, 2.0]));
    }

    #[test]
    fn summary_samples_stride_and_last_state() {
        let state = State::at_rest(array![[0.0, 0.0]]);
        let result = EngineRunResult {
            states: vec![state; 6],
            urgencies: None,
        };
        let summary = RunSummary::from_result(&result, 0.1, 5, 0, 4);
        let indices: Vec<usize> = summary.samples.iter().map(|s| s.index).collect();
        assert_eq!(indices, vec![0, 4, 5]);
        assert_eq!(summary.recorded_states, 6);
        assert_eq!(summary.schema_version, 1);
    }

    #[test]
    fn summary_deserializes_without_schema_version() {
        let json = r#"{
            "timestep": 0.1,
            "iterations": 0,
            "skip_initial_states": 0,
            "sample_every": 1,
            "recorded_states": 0,
            "samples": []
        }"#;
        let summary: RunSummary = serde_json::from_str(json).expect("summary should parse");
        assert_eq!(summary.schema_version, 1);
    }
}
