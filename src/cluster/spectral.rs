//! Spectral clustering on the normalised graph Laplacian

use ndarray::{Array1, Array2, ArrayView1};
use rand::prelude::*;
use rand::rngs::StdRng;

use crate::cluster::dense_labels;
use crate::graph::DrugGraph;

const EIGEN_MAX_ITERATIONS: usize = 1000;
const EIGEN_TOLERANCE: f64 = 1e-10;
const KMEANS_MAX_ITERATIONS: usize = 300;
const KMEANS_RESTARTS: usize = 10;

/// Partition a connected graph into at most `clusters` groups.
///
/// Nodes are embedded with the `k - 1` eigenvectors of the smallest
/// non-trivial eigenvalues of the symmetric normalised Laplacian, mapped
/// back through `D^-1/2`, and k-means++ seeded from `seed` groups the rows.
pub fn spectral(graph: &DrugGraph, clusters: usize, seed: u64) -> Vec<usize> {
    let n = graph.node_count();
    let k = clusters.min(n);
    if k <= 1 {
        return vec![0; n];
    }

    let mut rng = StdRng::seed_from_u64(seed);
    let embedding = spectral_embedding(graph, k - 1, &mut rng);
    dense_labels(&kmeans(&embedding, k, &mut rng))
}

/// Random-walk spectral embedding with `dims` columns
pub fn spectral_embedding(graph: &DrugGraph, dims: usize, rng: &mut StdRng) -> Array2<f64> {
    let n = graph.node_count();
    let adjacency = graph.weighted_neighbors();
    let degrees: Vec<f64> = adjacency
        .iter()
        .map(|list| list.iter().map(|&(_, w)| w).sum())
        .collect();
    let scale: Array1<f64> = degrees
        .iter()
        .map(|&d| if d > 0.0 { 1.0 / d.sqrt() } else { 0.0 })
        .collect();

    // D^{1/2} 1 spans the eigenvalue-zero eigenspace of the Laplacian
    let mut trivial: Array1<f64> = degrees.iter().map(|d| d.sqrt()).collect();
    let norm = trivial.dot(&trivial).sqrt();
    if norm > 0.0 {
        trivial /= norm;
    }

    // Smallest Laplacian eigenvalues are the largest of I + D^-1/2 A D^-1/2,
    // whose spectrum is non-negative, so orthogonal iteration finds them
    let mut basis = Array2::from_shape_fn((n, dims), |_| rng.gen_range(-1.0..1.0));
    orthonormalize(&mut basis, &trivial);

    for iteration in 0..EIGEN_MAX_ITERATIONS {
        let mut next = shifted_product(&adjacency, &scale, &basis);
        orthonormalize(&mut next, &trivial);
        let change = subspace_change(&basis, &next);
        basis = next;
        if change < EIGEN_TOLERANCE {
            log::debug!("Spectral embedding converged after {} iterations", iteration + 1);
            break;
        }
    }

    // Eigenvectors of the random-walk Laplacian are D^-1/2 times these
    for (mut row, &factor) in basis.rows_mut().into_iter().zip(scale.iter()) {
        row *= factor;
    }
    basis
}

/// `(I + D^-1/2 A D^-1/2) * basis` using the sparse adjacency
fn shifted_product(
    adjacency: &[Vec<(usize, f64)>],
    scale: &Array1<f64>,
    basis: &Array2<f64>,
) -> Array2<f64> {
    let mut product = basis.clone();
    for (v, list) in adjacency.iter().enumerate() {
        for &(w, weight) in list {
            let factor = weight * scale[v] * scale[w];
            product.row_mut(v).scaled_add(factor, &basis.row(w));
        }
    }
    product
}

/// Gram-Schmidt on the columns, each also made orthogonal to `fixed`
fn orthonormalize(basis: &mut Array2<f64>, fixed: &Array1<f64>) {
    for j in 0..basis.ncols() {
        let mut column = basis.column(j).to_owned();
        let projection = fixed.dot(&column);
        column.scaled_add(-projection, fixed);

        for p in 0..j {
            let previous = basis.column(p);
            let projection = previous.dot(&column);
            column.scaled_add(-projection, &previous);
        }

        let norm = column.dot(&column).sqrt();
        if norm > 0.0 {
            column /= norm;
        }
        basis.column_mut(j).assign(&column);
    }
}

/// Largest per-column movement, ignoring sign flips
fn subspace_change(before: &Array2<f64>, after: &Array2<f64>) -> f64 {
    (0..before.ncols())
        .map(|j| {
            let a = before.column(j);
            let b = after.column(j);
            let minus = squared_distance(a, b);
            let plus: f64 = a.iter().zip(b.iter()).map(|(x, y)| (x + y).powi(2)).sum();
            minus.min(plus).sqrt()
        })
        .fold(0.0, f64::max)
}

fn squared_distance(a: ArrayView1<f64>, b: ArrayView1<f64>) -> f64 {
    a.iter().zip(b.iter()).map(|(x, y)| (x - y).powi(2)).sum()
}

fn nearest_centroid(point: ArrayView1<f64>, centroids: &[Array1<f64>]) -> usize {
    let mut best = 0;
    let mut best_distance = f64::INFINITY;
    for (c, centroid) in centroids.iter().enumerate() {
        let distance = squared_distance(point, centroid.view());
        if distance < best_distance {
            best = c;
            best_distance = distance;
        }
    }
    best
}

/// Best of several k-means runs by within-cluster sum of squares. Fewer
/// than `k` clusters come back when the rows hold fewer distinct points.
pub fn kmeans(points: &Array2<f64>, k: usize, rng: &mut StdRng) -> Vec<usize> {
    let n = points.nrows();
    if n == 0 || k == 0 {
        return vec![0; n];
    }

    let mut best: Option<(Vec<usize>, f64)> = None;
    for _ in 0..KMEANS_RESTARTS {
        let (labels, inertia) = kmeans_once(points, k, rng);
        if best.as_ref().map_or(true, |(_, lowest)| inertia < *lowest) {
            best = Some((labels, inertia));
        }
    }
    best.map_or_else(|| vec![0; n], |(labels, _)| labels)
}

/// k-means++ initialisation followed by Lloyd iterations
fn kmeans_once(points: &Array2<f64>, k: usize, rng: &mut StdRng) -> (Vec<usize>, f64) {
    let n = points.nrows();

    let mut centroids: Vec<Array1<f64>> = Vec::with_capacity(k);
    centroids.push(points.row(rng.gen_range(0..n)).to_owned());
    let mut nearest: Vec<f64> = points
        .rows()
        .into_iter()
        .map(|row| squared_distance(row, centroids[0].view()))
        .collect();

    while centroids.len() < k {
        let total: f64 = nearest.iter().sum();
        if total <= 0.0 {
            break;
        }

        let mut target = rng.gen::<f64>() * total;
        let mut chosen = nearest.iter().rposition(|&d| d > 0.0).unwrap_or(0);
        for (i, &d) in nearest.iter().enumerate() {
            if target < d {
                chosen = i;
                break;
            }
            target -= d;
        }

        let centroid = points.row(chosen).to_owned();
        for (slot, row) in nearest.iter_mut().zip(points.rows()) {
            *slot = slot.min(squared_distance(row, centroid.view()));
        }
        centroids.push(centroid);
    }

    let mut labels = vec![usize::MAX; n];
    for _ in 0..KMEANS_MAX_ITERATIONS {
        let mut changed = false;
        for (label, row) in labels.iter_mut().zip(points.rows()) {
            let best = nearest_centroid(row, &centroids);
            if *label != best {
                *label = best;
                changed = true;
            }
        }
        if !changed {
            break;
        }

        let mut sums = vec![Array1::<f64>::zeros(points.ncols()); centroids.len()];
        let mut counts = vec![0usize; centroids.len()];
        for (&label, row) in labels.iter().zip(points.rows()) {
            sums[label] += &row;
            counts[label] += 1;
        }
        for (c, sum) in sums.into_iter().enumerate() {
            // Empty clusters keep their previous centroid
            if counts[c] > 0 {
                centroids[c] = sum / counts[c] as f64;
            }
        }
    }

    let inertia = labels
        .iter()
        .zip(points.rows())
        .map(|(&label, row)| squared_distance(row, centroids[label].view()))
        .sum();
    (labels, inertia)
}
