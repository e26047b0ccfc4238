use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::graph::{GraphModel, Position};

const MAX_ITERATIONS: usize = 1000;
const TOLERANCE: f64 = 1e-10;
const START_SEED: u64 = 0x5eed;

/// Spectral layout: node `i` at `(v1[i], v2[i])` where `v1`, `v2` are the
/// Laplacian eigenvectors for the smallest eigenvalues after the constant one.
///
/// The eigenvectors come from orthogonal iteration on `c·I − L` (with `c`
/// above the largest Laplacian eigenvalue), deflated against the constant
/// vector. Start vectors are seeded, so the result is deterministic. Graphs
/// with two nodes or fewer are placed on a circle.
pub(super) fn spectral(graph: &GraphModel) -> Vec<Position> {
    let n = graph.node_count();
    if n <= 2 {
        return super::circular(n);
    }

    let adjacency = graph.adjacency();
    let max_degree = adjacency.iter().map(Vec::len).max().unwrap_or(0);
    // Gershgorin: every Laplacian eigenvalue is <= 2 * max degree
    let shift = 2.0 * max_degree as f64 + 1.0;

    let mut rng = StdRng::seed_from_u64(START_SEED);
    let mut v1: Vec<f64> = (0..n).map(|_| rng.gen_range(-1.0..1.0)).collect();
    let mut v2: Vec<f64> = (0..n).map(|_| rng.gen_range(-1.0..1.0)).collect();
    orthonormalize(&mut v1, &mut v2);

    for _ in 0..MAX_ITERATIONS {
        let mut w1 = shifted_laplacian_mul(&adjacency, shift, &v1);
        let mut w2 = shifted_laplacian_mul(&adjacency, shift, &v2);
        orthonormalize(&mut w1, &mut w2);

        let change = difference(&v1, &w1).max(difference(&v2, &w2));
        v1 = w1;
        v2 = w2;
        if change < TOLERANCE {
            break;
        }
    }

    v1.into_iter()
        .zip(v2)
        .map(|(x, y)| Position::new(x, y))
        .collect()
}

/// `(c·I − L) v` with `L = D − A`
fn shifted_laplacian_mul(adjacency: &[Vec<usize>], shift: f64, v: &[f64]) -> Vec<f64> {
    adjacency
        .iter()
        .enumerate()
        .map(|(i, neighbours)| {
            let degree = neighbours.len() as f64;
            let sum: f64 = neighbours.iter().map(|&j| v[j]).sum();
            shift * v[i] - (degree * v[i] - sum)
        })
        .collect()
}

/// Remove the constant component from both vectors, then Gram-Schmidt
fn orthonormalize(v1: &mut [f64], v2: &mut [f64]) {
    remove_mean(v1);
    normalize(v1);
    remove_mean(v2);
    let proj: f64 = v1.iter().zip(v2.iter()).map(|(a, b)| a * b).sum();
    for (b, a) in v2.iter_mut().zip(v1.iter()) {
        *b -= proj * a;
    }
    normalize(v2);
}

fn remove_mean(v: &mut [f64]) {
    let mean = v.iter().sum::<f64>() / v.len() as f64;
    for x in v.iter_mut() {
        *x -= mean;
    }
}

fn normalize(v: &mut [f64]) {
    let norm = v.iter().map(|x| x * x).sum::<f64>().sqrt();
    if norm > f64::EPSILON {
        for x in v.iter_mut() {
            *x /= norm;
        }
    }
}

/// Largest component difference up to sign
fn difference(a: &[f64], b: &[f64]) -> f64 {
    let same: f64 = a.iter().zip(b).map(|(x, y)| (x - y).abs()).fold(0.0, f64::max);
    let flipped: f64 = a.iter().zip(b).map(|(x, y)| (x + y).abs()).fold(0.0, f64::max);
    same.min(flipped)
}
