//! Community detection
//!
//! Every algorithm runs on the undirected view of one (strongly) connected
//! component at a time and returns a dense label per node of that component. The
//! dispatcher stitches component results into one assignment whose cluster
//! ids are unique across the whole graph.

pub mod girvan_newman;
pub mod label_propagation;
pub mod louvain;
pub mod metrics;
pub mod spectral;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

use crate::config::ClusterConfig;
use crate::diagnostics::{Diagnostics, Warning};
use crate::graph::{connected_components, DrugGraph};

pub use metrics::{compare, compare_partitions, modularity, AlgorithmSummary, ClusteringReport};

/// Supported community detection algorithms
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, ValueEnum,
)]
#[serde(rename_all = "snake_case")]
pub enum Algorithm {
    GirvanNewman,
    LabelPropagation,
    Louvain,
    Spectral,
}

impl Algorithm {
    pub const ALL: [Algorithm; 4] = [
        Algorithm::GirvanNewman,
        Algorithm::LabelPropagation,
        Algorithm::Louvain,
        Algorithm::Spectral,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Algorithm::GirvanNewman => "girvan_newman",
            Algorithm::LabelPropagation => "label_propagation",
            Algorithm::Louvain => "louvain",
            Algorithm::Spectral => "spectral",
        }
    }
}

/// Node id to cluster id for one algorithm. Nodes of skipped components are
/// absent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClusterAssignment {
    pub algorithm: Algorithm,
    pub clusters: BTreeMap<String, usize>,
}

impl ClusterAssignment {
    pub fn empty(algorithm: Algorithm) -> Self {
        Self {
            algorithm,
            clusters: BTreeMap::new(),
        }
    }

    pub fn cluster_of(&self, id: &str) -> Option<usize> {
        self.clusters.get(id).copied()
    }

    pub fn len(&self) -> usize {
        self.clusters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.clusters.is_empty()
    }

    pub fn cluster_count(&self) -> usize {
        self.clusters.values().max().map_or(0, |&max| max + 1)
    }

    /// Member ids of each cluster, indexed by cluster id
    pub fn members(&self) -> Vec<Vec<String>> {
        let mut members = vec![Vec::new(); self.cluster_count()];
        for (id, &cluster) in &self.clusters {
            members[cluster].push(id.clone());
        }
        members
    }

    /// Cluster sizes, indexed by cluster id
    pub fn sizes(&self) -> Vec<usize> {
        let mut sizes = vec![0; self.cluster_count()];
        for &cluster in self.clusters.values() {
            sizes[cluster] += 1;
        }
        sizes
    }
}

/// Renumber labels densely in order of first appearance
pub(crate) fn dense_labels(labels: &[usize]) -> Vec<usize> {
    let mut mapping: HashMap<usize, usize> = HashMap::new();
    labels
        .iter()
        .map(|label| {
            let next = mapping.len();
            *mapping.entry(*label).or_insert(next)
        })
        .collect()
}

/// Components of `graph` large enough to cluster, strongly connected ones
/// when the graph is directed; smaller ones are reported once through
/// `diagnostics`
pub fn clusterable_components(
    graph: &DrugGraph,
    min_size: usize,
    diagnostics: &mut Diagnostics,
) -> Vec<Vec<usize>> {
    let min_size = min_size.max(2);
    let mut kept = Vec::new();
    for (position, members) in connected_components(graph).into_iter().enumerate() {
        if members.len() < min_size {
            diagnostics.warn(Warning::InsufficientComponentSize {
                component: position + 1,
                size: members.len(),
                min_size,
            });
        } else {
            kept.push(members);
        }
    }
    kept
}

/// Run `algorithm` on the undirected view of each of `components`
pub fn detect_in_components(
    graph: &DrugGraph,
    components: &[Vec<usize>],
    algorithm: Algorithm,
    config: &ClusterConfig,
) -> ClusterAssignment {
    let mut assignment = ClusterAssignment::empty(algorithm);
    let mut offset = 0;

    for members in components {
        let component = graph.induced_subgraph(members).undirected_view();
        let labels = match algorithm {
            Algorithm::GirvanNewman => {
                girvan_newman::girvan_newman(&component, config.girvan_newman_communities)
            }
            Algorithm::LabelPropagation => label_propagation::label_propagation(
                &component,
                config.label_propagation_max_iterations,
            ),
            Algorithm::Louvain => louvain::louvain(&component),
            Algorithm::Spectral => {
                spectral::spectral(&component, config.spectral_clusters, config.seed)
            }
        };

        let count = labels.iter().max().map_or(0, |&max| max + 1);
        for (local, label) in labels.into_iter().enumerate() {
            assignment
                .clusters
                .insert(component.id(local).to_string(), offset + label);
        }
        offset += count;
    }

    log::info!(
        "{} found {} clusters over {} nodes",
        algorithm.name(),
        offset,
        assignment.len()
    );
    assignment
}

/// Partition `graph` into communities with one algorithm
pub fn detect(
    graph: &DrugGraph,
    algorithm: Algorithm,
    config: &ClusterConfig,
    diagnostics: &mut Diagnostics,
) -> ClusterAssignment {
    let components = clusterable_components(graph, config.min_component_size, diagnostics);
    detect_in_components(graph, &components, algorithm, config)
}

/// Run every configured algorithm and compare the resulting partitions
pub fn run_all(graph: &DrugGraph, config: &ClusterConfig) -> ClusteringReport {
    let mut diagnostics = Diagnostics::new();
    let components = clusterable_components(graph, config.min_component_size, &mut diagnostics);
    log::info!(
        "Clustering {} components with {} algorithms",
        components.len(),
        config.algorithms.len()
    );

    let assignments: Vec<ClusterAssignment> = config
        .algorithms
        .iter()
        .map(|&algorithm| detect_in_components(graph, &components, algorithm, config))
        .collect();

    let mut report = compare_partitions(graph, &assignments);
    report.warnings = diagnostics.take();
    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{Edge, Node};

    pub(crate) fn two_triangles() -> DrugGraph {
        let nodes = ["A", "B", "C", "D", "E", "F"]
            .iter()
            .map(|id| Node::new(*id, "blue"))
            .collect();
        let edges = [(0, 1), (1, 2), (2, 0), (2, 3), (3, 4), (4, 5), (5, 3)]
            .iter()
            .map(|&(a, b)| Edge::new(a, b))
            .collect();
        DrugGraph::new(false, nodes, edges).unwrap()
    }

    #[test]
    fn dense_labels_follow_first_appearance() {
        assert_eq!(dense_labels(&[7, 7, 3, 9, 3]), vec![0, 0, 1, 2, 1]);
    }

    #[test]
    fn cluster_ids_are_unique_across_components() {
        // Two disjoint triangles and a stray pair
        let nodes = ["A", "B", "C", "D", "E", "F", "G", "H"]
            .iter()
            .map(|id| Node::new(*id, "blue"))
            .collect();
        let edges = [(0, 1), (1, 2), (2, 0), (3, 4), (4, 5), (5, 3), (6, 7)]
            .iter()
            .map(|&(a, b)| Edge::new(a, b))
            .collect();
        let graph = DrugGraph::new(false, nodes, edges).unwrap();

        let mut diagnostics = Diagnostics::new();
        let assignment = detect(
            &graph,
            Algorithm::Louvain,
            &ClusterConfig::default(),
            &mut diagnostics,
        );

        assert_eq!(assignment.len(), 6);
        assert_eq!(assignment.cluster_count(), 2);
        assert_ne!(assignment.cluster_of("A"), assignment.cluster_of("D"));
        assert_eq!(assignment.cluster_of("G"), None);
        assert_eq!(diagnostics.len(), 1);
    }

    #[test]
    fn lone_small_component_gives_empty_assignment() {
        let nodes = vec![Node::new("A", "blue"), Node::new("B", "green")];
        let graph = DrugGraph::new(false, nodes, vec![Edge::new(0, 1)]).unwrap();

        let mut diagnostics = Diagnostics::new();
        let assignment = detect(
            &graph,
            Algorithm::Spectral,
            &ClusterConfig::default(),
            &mut diagnostics,
        );
        assert!(assignment.is_empty());
        assert_eq!(
            diagnostics.warnings,
            vec![Warning::InsufficientComponentSize { component: 1, size: 2, min_size: 3 }]
        );
    }

    #[test]
    fn directed_path_has_no_clusterable_component() {
        let nodes = ["N0", "N1", "N2"].iter().map(|id| Node::new(*id, "blue")).collect();
        let graph = DrugGraph::new(true, nodes, vec![Edge::new(0, 1), Edge::new(1, 2)]).unwrap();

        let mut diagnostics = Diagnostics::new();
        let assignment = detect(
            &graph,
            Algorithm::Louvain,
            &ClusterConfig::default(),
            &mut diagnostics,
        );
        assert!(assignment.is_empty());
        assert_eq!(diagnostics.len(), 3);
    }

    #[test]
    fn run_all_reports_each_algorithm_once() {
        let report = run_all(&two_triangles(), &ClusterConfig::default());
        assert_eq!(report.algorithms.len(), 4);
        assert!(report.warnings.is_empty());
        assert!(report.best.is_some());
    }
}
