
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Uniformly random points in `[-100, 100)^dims`, reproducible through `seed`.
pub(crate) fn random_points(n: usize, dims: usize, seed: u64) -> Vec<Vec<f64>> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..n)
        .map(|_| (0..dims).map(|_| rng.gen_range(-100.0..100.0)).collect())
        .collect()
}

/// Exhaustive scan returning the minimal Euclidean distance.
pub(crate) fn brute_force_nearest(points: &[Vec<f64>], query: &[f64]) -> f64 {
    points
        .iter()
        .map(|point| {
            point
                .iter()
                .zip(query)
                .fold(0.0, |acc, (a, b)| acc + (a - b) * (a - b))
        })
        .fold(f64::INFINITY, f64::min)
        .sqrt()
}
