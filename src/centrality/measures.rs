//! Node and component measures for a single (strongly) connected component

use itertools::Itertools;
use rayon::prelude::*;
use statrs::statistics::Statistics;

use crate::graph::algorithms::{bfs_distances, node_betweenness, UNREACHABLE};
use crate::graph::DrugGraph;

/// All-pairs hop distances following edge direction; row `s` holds the
/// distances from `s`.
///
/// Rows are computed in parallel and collected in source order.
pub fn distance_matrix(graph: &DrugGraph) -> Vec<Vec<u32>> {
    let n = graph.node_count();
    (0..n)
        .into_par_iter()
        .map(|source| bfs_distances(n, source, |v| graph.successors(v)))
        .collect()
}

/// Degree divided by the largest possible degree, `n - 1`
pub fn degree_centrality(graph: &DrugGraph) -> Vec<f64> {
    let n = graph.node_count();
    if n <= 1 {
        return vec![1.0; n];
    }
    let scale = 1.0 / (n - 1) as f64;
    (0..n).map(|v| graph.degree(v) as f64 * scale).collect()
}

/// `(n - 1) / Σ d(u, v)` over the nodes `u` that reach `v`, scaled by the
/// reachable share of the graph
pub fn closeness_centrality(distances: &[Vec<u32>]) -> Vec<f64> {
    let n = distances.len();
    (0..n)
        .map(|v| {
            let (total, reachable) = distances
                .iter()
                .map(|row| row[v])
                .filter(|&d| d != UNREACHABLE && d > 0)
                .fold((0u64, 0usize), |(sum, count), d| (sum + d as u64, count + 1));

            if total == 0 || n <= 1 {
                return 0.0;
            }
            let closeness = reachable as f64 / total as f64;
            closeness * reachable as f64 / (n - 1) as f64
        })
        .collect()
}

/// Brandes betweenness normalised by `(n - 1)(n - 2)`
pub fn betweenness_centrality(graph: &DrugGraph) -> Vec<f64> {
    let n = graph.node_count();
    let raw = node_betweenness(n, |v| graph.successors(v));
    if n <= 2 {
        return vec![0.0; n];
    }

    // Undirected pairs are counted once per direction, which the
    // ordered-pair denominator absorbs
    let scale = 1.0 / ((n - 1) * (n - 2)) as f64;
    raw.into_iter().map(|score| score * scale).collect()
}

/// Triangles through each node, ignoring direction
pub fn triangles(graph: &DrugGraph) -> Vec<usize> {
    (0..graph.node_count())
        .map(|v| {
            graph
                .neighbors(v)
                .iter()
                .tuple_combinations()
                .filter(|(&a, &b)| graph.are_adjacent(a as usize, b as usize))
                .count()
        })
        .collect()
}

/// Local clustering coefficient of each node, ignoring direction
pub fn clustering_coefficients(graph: &DrugGraph, triangles: &[usize]) -> Vec<f64> {
    (0..graph.node_count())
        .map(|v| {
            let k = graph.neighbors(v).len();
            if k < 2 {
                0.0
            } else {
                2.0 * triangles[v] as f64 / (k * (k - 1)) as f64
            }
        })
        .collect()
}

/// Longest shortest path
pub fn diameter(distances: &[Vec<u32>]) -> u32 {
    distances
        .iter()
        .flat_map(|row| row.iter().copied())
        .filter(|&d| d != UNREACHABLE)
        .max()
        .unwrap_or(0)
}

/// Mean distance over ordered pairs of distinct, connected nodes
pub fn average_shortest_path(distances: &[Vec<u32>]) -> f64 {
    let lengths: Vec<f64> = distances
        .iter()
        .flat_map(|row| row.iter().copied())
        .filter(|&d| d != UNREACHABLE && d > 0)
        .map(f64::from)
        .collect();

    if lengths.is_empty() {
        0.0
    } else {
        lengths.mean()
    }
}

/// Rescale to [0, 1]; constant inputs map to 0
pub fn min_max_normalize(values: &[f64]) -> Vec<f64> {
    let min = values.iter().copied().fold(f64::INFINITY, f64::min);
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let range = max - min;

    values
        .iter()
        .map(|&value| if range > 0.0 { (value - min) / range } else { 0.0 })
        .collect()
}
