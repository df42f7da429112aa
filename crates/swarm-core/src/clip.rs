use ndarray::Array2;

/// Element-wise symmetric clamp applied in place.
pub trait Clipper {
    /// Clamp every element of `values` into `[-bound, bound]`.
    fn clip_by_abs(&self, values: &mut Array2<f64>, bound: f64);
}

/// Per-component clamp; each axis is bounded independently, not the vector norm.
#[derive(Clone, Copy, Debug, Default)]
pub struct AbsClipper;

impl Clipper for AbsClipper {
    fn clip_by_abs(&self, values: &mut Array2<f64>, bound: f64) {
        values.mapv_inplace(|x| {
            if x > bound {
                bound
            } else if x < -bound {
                -bound
            } else {
                x
            }
        });
    }
}
