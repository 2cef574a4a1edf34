//! Community detection on graphs with planted structure.

use std::collections::BTreeSet;

use ddi_graph_analyzer::cluster::{self, compare, detect, Algorithm};
use ddi_graph_analyzer::config::ClusterConfig;
use ddi_graph_analyzer::{Diagnostics, DrugGraph, Edge, Node};

/// `count` cliques of `size` nodes, consecutive cliques joined by one edge
fn clique_chain(count: usize, size: usize) -> DrugGraph {
    let n = count * size;
    let nodes = (0..n).map(|i| Node::new(format!("D{:03}", i), "blue")).collect();
    let mut edges = Vec::new();
    for c in 0..count {
        let base = c * size;
        for a in base..base + size {
            for b in a + 1..base + size {
                edges.push(Edge::new(a, b));
            }
        }
        if c + 1 < count {
            edges.push(Edge::new(base + size - 1, base + size));
        }
    }
    DrugGraph::new(false, nodes, edges).unwrap()
}

fn clique_of(id: &str, size: usize) -> usize {
    id[1..].parse::<usize>().unwrap() / size
}

#[test]
fn modularity_based_algorithms_recover_cliques() {
    let graph = clique_chain(3, 5);
    let config = ClusterConfig {
        spectral_clusters: 3,
        girvan_newman_communities: 3,
        ..ClusterConfig::default()
    };

    for algorithm in [Algorithm::GirvanNewman, Algorithm::Louvain, Algorithm::Spectral] {
        let mut diagnostics = Diagnostics::new();
        let assignment = detect(&graph, algorithm, &config, &mut diagnostics);
        assert_eq!(assignment.len(), 15, "{:?}", algorithm);
        assert_eq!(assignment.cluster_count(), 3, "{:?}", algorithm);

        for (id, &cluster) in &assignment.clusters {
            let leader = format!("D{:03}", clique_of(id, 5) * 5);
            assert_eq!(assignment.cluster_of(&leader), Some(cluster), "{:?}", algorithm);
        }
    }
}

#[test]
fn algorithms_agree_on_clear_structure() {
    let graph = clique_chain(2, 6);
    let config = ClusterConfig {
        spectral_clusters: 2,
        ..ClusterConfig::default()
    };
    let mut diagnostics = Diagnostics::new();
    let louvain = detect(&graph, Algorithm::Louvain, &config, &mut diagnostics);
    let girvan_newman = detect(&graph, Algorithm::GirvanNewman, &config, &mut diagnostics);
    let spectral = detect(&graph, Algorithm::Spectral, &config, &mut diagnostics);

    assert!((compare(&louvain, &girvan_newman) - 1.0).abs() < 1e-12);
    assert!((compare(&louvain, &spectral) - 1.0).abs() < 1e-12);
    assert!(diagnostics.is_empty());
}

#[test]
fn report_compares_every_algorithm() {
    let graph = clique_chain(3, 4);
    let report = cluster::run_all(&graph, &ClusterConfig::default());

    assert_eq!(report.algorithms.len(), Algorithm::ALL.len());
    assert_eq!(report.agreement.len(), Algorithm::ALL.len());
    for summary in &report.algorithms {
        assert_eq!(summary.sizes.iter().sum::<usize>(), 12);
        assert!(summary.modularity <= 1.0);
    }

    let best = report.best.unwrap();
    let best_modularity = report
        .algorithms
        .iter()
        .find(|s| s.algorithm == best)
        .unwrap()
        .modularity;
    assert!(report.algorithms.iter().all(|s| s.modularity <= best_modularity));
}

#[test]
fn runs_are_deterministic() {
    let graph = clique_chain(4, 4);
    let config = ClusterConfig::default();
    let first = cluster::run_all(&graph, &config);
    let second = cluster::run_all(&graph, &config);
    assert_eq!(first.assignments, second.assignments);
}

fn bridged_cycles() -> DrugGraph {
    // Two directed 3-cycles joined by the one-way arc D002 -> D003
    let nodes = (0..6).map(|i| Node::new(format!("D{:03}", i), "blue")).collect();
    let edges = [(0, 1), (1, 2), (2, 0), (2, 3), (3, 4), (4, 5), (5, 3)]
        .iter()
        .map(|&(a, b)| Edge::new(a, b))
        .collect();
    DrugGraph::new(true, nodes, edges).unwrap()
}

#[test]
fn directed_clusters_stay_within_strong_components() {
    let graph = bridged_cycles();

    for algorithm in Algorithm::ALL {
        let mut diagnostics = Diagnostics::new();
        let assignment = detect(&graph, algorithm, &ClusterConfig::default(), &mut diagnostics);
        assert_eq!(assignment.len(), 6, "{:?}", algorithm);
        assert!(diagnostics.is_empty());

        let clusters_of = |ids: &[&str]| -> BTreeSet<usize> {
            ids.iter().filter_map(|id| assignment.cluster_of(id)).collect()
        };
        let first = clusters_of(&["D000", "D001", "D002"]);
        let second = clusters_of(&["D003", "D004", "D005"]);
        assert!(first.is_disjoint(&second), "{:?}", algorithm);
    }

    for algorithm in [Algorithm::LabelPropagation, Algorithm::Louvain] {
        let mut diagnostics = Diagnostics::new();
        let assignment = detect(&graph, algorithm, &ClusterConfig::default(), &mut diagnostics);
        assert_eq!(assignment.cluster_count(), 2, "{:?}", algorithm);
    }
}

#[test]
fn directed_path_is_skipped_like_centrality() {
    let nodes = (0..3).map(|i| Node::new(format!("D{:03}", i), "blue")).collect();
    let graph = DrugGraph::new(true, nodes, vec![Edge::new(0, 1), Edge::new(1, 2)]).unwrap();

    let mut diagnostics = Diagnostics::new();
    let assignment = detect(&graph, Algorithm::Louvain, &ClusterConfig::default(), &mut diagnostics);
    assert!(assignment.is_empty());
    assert_eq!(diagnostics.len(), 3);

    let centrality = ddi_graph_analyzer::centrality::analyze(
        &graph,
        &ddi_graph_analyzer::config::CentralityConfig::default(),
    );
    assert!(centrality.components.is_empty());
    assert_eq!(centrality.warnings.len(), diagnostics.len());
}
