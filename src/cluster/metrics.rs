//! Partition quality and agreement

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::cluster::{Algorithm, ClusterAssignment};
use crate::diagnostics::Warning;
use crate::graph::DrugGraph;

/// Per-algorithm summary inside a [`ClusteringReport`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlgorithmSummary {
    pub algorithm: Algorithm,
    pub modularity: f64,
    pub cluster_count: usize,

    /// Cluster sizes, largest first
    pub sizes: Vec<usize>,
}

/// Output of the clustering stage
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClusteringReport {
    pub node_count: usize,
    pub edge_count: usize,
    pub algorithms: Vec<AlgorithmSummary>,

    /// Pairwise normalised mutual information
    pub agreement: BTreeMap<Algorithm, BTreeMap<Algorithm, f64>>,

    /// Algorithm with the highest modularity, earliest on ties
    pub best: Option<Algorithm>,
    pub assignments: Vec<ClusterAssignment>,
    pub warnings: Vec<Warning>,
}

/// Weighted Newman modularity of `assignment` on the undirected view of
/// `graph`. Unassigned nodes belong to no community.
pub fn modularity(graph: &DrugGraph, assignment: &ClusterAssignment) -> f64 {
    let adjacency = graph.weighted_neighbors();
    let two_m: f64 = adjacency.iter().flatten().map(|&(_, w)| w).sum();
    if two_m <= 0.0 {
        return 0.0;
    }

    let labels: Vec<Option<usize>> = (0..graph.node_count())
        .map(|v| assignment.cluster_of(graph.id(v)))
        .collect();

    let count = assignment.cluster_count();
    let mut internal = vec![0.0; count];
    let mut total = vec![0.0; count];
    for (v, list) in adjacency.iter().enumerate() {
        let Some(c) = labels[v] else {
            continue;
        };
        for &(w, weight) in list {
            total[c] += weight;
            if labels[w] == Some(c) {
                internal[c] += weight;
            }
        }
    }

    internal
        .iter()
        .zip(total.iter())
        .map(|(&inside, &tot)| inside / two_m - (tot / two_m).powi(2))
        .sum()
}

fn entropy(counts: impl Iterator<Item = usize>, n: f64) -> f64 {
    counts
        .filter(|&count| count > 0)
        .map(|count| {
            let p = count as f64 / n;
            -p * p.ln()
        })
        .sum()
}

/// Normalised mutual information between two partitions over the nodes
/// both assign, using the arithmetic mean of the entropies
pub fn compare(a: &ClusterAssignment, b: &ClusterAssignment) -> f64 {
    let mut joint: BTreeMap<(usize, usize), usize> = BTreeMap::new();
    let mut left: BTreeMap<usize, usize> = BTreeMap::new();
    let mut right: BTreeMap<usize, usize> = BTreeMap::new();

    for (id, &ca) in &a.clusters {
        if let Some(cb) = b.cluster_of(id) {
            *joint.entry((ca, cb)).or_insert(0) += 1;
            *left.entry(ca).or_insert(0) += 1;
            *right.entry(cb).or_insert(0) += 1;
        }
    }

    let n: usize = joint.values().sum();
    if n == 0 {
        return 1.0;
    }
    let n = n as f64;

    let h_left = entropy(left.values().copied(), n);
    let h_right = entropy(right.values().copied(), n);
    if h_left == 0.0 && h_right == 0.0 {
        return 1.0;
    }

    let mutual: f64 = joint
        .iter()
        .map(|(&(ca, cb), &count)| {
            let p = count as f64 / n;
            let pa = left[&ca] as f64 / n;
            let pb = right[&cb] as f64 / n;
            p * (p / (pa * pb)).ln()
        })
        .sum();

    (mutual / ((h_left + h_right) / 2.0)).clamp(0.0, 1.0)
}

/// Score every assignment against the same graph and cross-compare them
pub fn compare_partitions(graph: &DrugGraph, assignments: &[ClusterAssignment]) -> ClusteringReport {
    let algorithms: Vec<AlgorithmSummary> = assignments
        .iter()
        .map(|assignment| {
            let mut sizes = assignment.sizes();
            sizes.sort_unstable_by(|a, b| b.cmp(a));
            AlgorithmSummary {
                algorithm: assignment.algorithm,
                modularity: modularity(graph, assignment),
                cluster_count: sizes.len(),
                sizes,
            }
        })
        .collect();

    for summary in &algorithms {
        log::info!(
            "{}: {} clusters, modularity {:.4}",
            summary.algorithm.name(),
            summary.cluster_count,
            summary.modularity
        );
    }

    let mut agreement: BTreeMap<Algorithm, BTreeMap<Algorithm, f64>> = BTreeMap::new();
    for a in assignments {
        let row = agreement.entry(a.algorithm).or_default();
        for b in assignments {
            row.insert(b.algorithm, compare(a, b));
        }
    }

    let best = algorithms
        .iter()
        .fold(None::<&AlgorithmSummary>, |best, summary| match best {
            Some(current) if current.modularity >= summary.modularity => Some(current),
            _ => Some(summary),
        })
        .map(|summary| summary.algorithm);

    ClusteringReport {
        node_count: graph.node_count(),
        edge_count: graph.edge_count(),
        algorithms,
        agreement,
        best,
        assignments: assignments.to_vec(),
        warnings: Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cluster::tests::two_triangles;

    fn assignment(algorithm: Algorithm, labels: &[(&str, usize)]) -> ClusterAssignment {
        ClusterAssignment {
            algorithm,
            clusters: labels.iter().map(|(id, c)| (id.to_string(), *c)).collect(),
        }
    }

    #[test]
    fn modularity_of_natural_split() {
        let split = assignment(
            Algorithm::Louvain,
            &[("A", 0), ("B", 0), ("C", 0), ("D", 1), ("E", 1), ("F", 1)],
        );
        assert!((modularity(&two_triangles(), &split) - 5.0 / 14.0).abs() < 1e-12);

        let whole = assignment(
            Algorithm::Spectral,
            &[("A", 0), ("B", 0), ("C", 0), ("D", 0), ("E", 0), ("F", 0)],
        );
        assert!(modularity(&two_triangles(), &whole).abs() < 1e-12);
    }

    #[test]
    fn nmi_ignores_label_names() {
        let a = assignment(Algorithm::Louvain, &[("A", 0), ("B", 0), ("C", 1), ("D", 1)]);
        let b = assignment(Algorithm::Spectral, &[("A", 1), ("B", 1), ("C", 0), ("D", 0)]);
        assert!((compare(&a, &b) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn nmi_of_independent_partitions_is_zero() {
        let a = assignment(Algorithm::Louvain, &[("A", 0), ("B", 0), ("C", 1), ("D", 1)]);
        let b = assignment(Algorithm::Spectral, &[("A", 0), ("B", 1), ("C", 0), ("D", 1)]);
        assert!(compare(&a, &b).abs() < 1e-12);
    }

    #[test]
    fn trivial_partitions_agree() {
        let a = assignment(Algorithm::Louvain, &[("A", 0), ("B", 0)]);
        let b = assignment(Algorithm::Spectral, &[("A", 3), ("B", 3)]);
        assert_eq!(compare(&a, &b), 1.0);
        assert_eq!(compare(&ClusterAssignment::empty(Algorithm::Louvain), &b), 1.0);
    }

    #[test]
    fn best_prefers_higher_modularity() {
        let split = assignment(
            Algorithm::Spectral,
            &[("A", 0), ("B", 0), ("C", 0), ("D", 1), ("E", 1), ("F", 1)],
        );
        let whole = assignment(
            Algorithm::LabelPropagation,
            &[("A", 0), ("B", 0), ("C", 0), ("D", 0), ("E", 0), ("F", 0)],
        );
        let report = compare_partitions(&two_triangles(), &[whole, split]);
        assert_eq!(report.best, Some(Algorithm::Spectral));
        assert_eq!(report.algorithms[1].sizes, vec![3, 3]);
        assert_eq!(report.agreement[&Algorithm::Spectral][&Algorithm::Spectral], 1.0);
    }
}
