//! Asynchronous label propagation

use std::collections::BTreeMap;

use crate::cluster::dense_labels;
use crate::graph::DrugGraph;

/// Each node starts with its own label and repeatedly adopts the most
/// frequent label among its neighbours, visiting nodes in index order.
///
/// A node keeps its label when it is among the most frequent; otherwise the
/// lowest frequent label wins, which keeps runs reproducible.
pub fn label_propagation(graph: &DrugGraph, max_iterations: usize) -> Vec<usize> {
    let n = graph.node_count();
    let mut labels: Vec<usize> = (0..n).collect();

    for iteration in 0..max_iterations {
        let mut changed = false;

        for v in 0..n {
            let mut counts: BTreeMap<usize, usize> = BTreeMap::new();
            for &w in graph.neighbors(v) {
                *counts.entry(labels[w as usize]).or_insert(0) += 1;
            }

            let Some(&best) = counts.values().max() else {
                continue;
            };
            if counts.get(&labels[v]) == Some(&best) {
                continue;
            }
            if let Some((&label, _)) = counts.iter().find(|(_, &count)| count == best) {
                labels[v] = label;
                changed = true;
            }
        }

        if !changed {
            log::debug!("Label propagation stable after {} sweeps", iteration + 1);
            break;
        }
    }

    dense_labels(&labels)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{Edge, Node};

    fn clique_pair() -> DrugGraph {
        // Two disjoint 4-cliques
        let nodes = (0..8).map(|i| Node::new(format!("N{}", i), "blue")).collect();
        let mut edges = Vec::new();
        for base in [0, 4] {
            for a in base..base + 4 {
                for b in a + 1..base + 4 {
                    edges.push(Edge::new(a, b));
                }
            }
        }
        DrugGraph::new(false, nodes, edges).unwrap()
    }

    #[test]
    fn cliques_settle_on_one_label_each() {
        let labels = label_propagation(&clique_pair(), 100);
        assert_eq!(labels, vec![0, 0, 0, 0, 1, 1, 1, 1]);
    }

    #[test]
    fn zero_iterations_keeps_singletons() {
        let labels = label_propagation(&clique_pair(), 0);
        assert_eq!(labels, (0..8).collect::<Vec<_>>());
    }

    #[test]
    fn repeated_runs_agree() {
        let graph = crate::cluster::tests::two_triangles();
        assert_eq!(label_propagation(&graph, 100), label_propagation(&graph, 100));
    }
}
