//! Dense Euclidean distance kernels over row-major point sets.

use ndarray::{Array2, ArrayView1, ArrayView2};

fn euclidean(a: ArrayView1<f64>, b: ArrayView1<f64>) -> f64 {
    a.iter()
        .zip(b.iter())
        .map(|(x, y)| (x - y).powi(2))
        .sum::<f64>()
        .sqrt()
}

/// Full `(n, n)` pairwise distance matrix of `points`.
///
/// Symmetric with an exact zero diagonal; each pair is computed once and mirrored.
pub fn self_distances(points: ArrayView2<f64>) -> Array2<f64> {
    let n = points.nrows();
    let mut distances = Array2::zeros((n, n));
    for i in 0..n {
        for j in (i + 1)..n {
            let d = euclidean(points.row(i), points.row(j));
            distances[[i, j]] = d;
            distances[[j, i]] = d;
        }
    }
    distances
}

/// `(n, m)` distances from every row of `from` to every row of `to`.
pub fn cross_distances(from: ArrayView2<f64>, to: ArrayView2<f64>) -> Array2<f64> {
    Array2::from_shape_fn((from.nrows(), to.nrows()), |(i, j)| {
        euclidean(from.row(i), to.row(j))
    })
}
