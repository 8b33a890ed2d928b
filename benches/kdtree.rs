use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use kd_index::kdtree::{KDTree, KDTreeBuilder, KDTreeIndex};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

fn generate_points(n: usize, seed: u64) -> Vec<[f64; 3]> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..n)
        .map(|_| {
            [
                rng.gen_range(-180.0..180.0),
                rng.gen_range(-90.0..90.0),
                rng.gen_range(0.0..1000.0),
            ]
        })
        .collect()
}

fn construct_kdtree(points: &[[f64; 3]]) -> KDTree<f64> {
    let mut builder = KDTreeBuilder::<f64>::with_dims(3).unwrap();
    builder.reserve(points.len(), 3);
    for point in points {
        builder.add(point).unwrap();
    }
    builder.finish()
}

fn linear_scan(points: &[[f64; 3]], query: &[f64; 3]) -> usize {
    let mut best = 0;
    let mut best_dist = f64::INFINITY;
    for (i, p) in points.iter().enumerate() {
        let dist = (p[0] - query[0]).powi(2)
            + (p[1] - query[1]).powi(2)
            + (p[2] - query[2]).powi(2);
        if dist < best_dist {
            best = i;
            best_dist = dist;
        }
    }
    best
}

pub fn criterion_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("nearest");
    for n in [1_000, 100_000] {
        let points = generate_points(n, 42);
        let queries = generate_points(100, 7);

        group.bench_with_input(BenchmarkId::new("construction (kd-index)", n), &n, |b, _| {
            b.iter(|| construct_kdtree(&points))
        });
        group.bench_with_input(BenchmarkId::new("construction (rstar)", n), &n, |b, _| {
            b.iter(|| rstar::RTree::bulk_load(points.to_vec()))
        });

        let tree = construct_kdtree(&points);
        group.bench_with_input(BenchmarkId::new("query (kd-index)", n), &n, |b, _| {
            b.iter(|| {
                for query in queries.iter() {
                    black_box(tree.nearest(query).ok());
                }
            })
        });
        group.bench_with_input(BenchmarkId::new("query (linear scan)", n), &n, |b, _| {
            b.iter(|| {
                for query in queries.iter() {
                    black_box(linear_scan(&points, query));
                }
            })
        });
    }
    group.finish();
}

criterion_group!(benches, criterion_benchmark);
criterion_main!(benches);
