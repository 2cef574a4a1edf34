//! Divisive clustering by repeated removal of the highest-betweenness edge

use crate::cluster::dense_labels;
use crate::graph::algorithms::edge_betweenness;
use crate::graph::components::DisjointSets;
use crate::graph::DrugGraph;

/// Split a connected undirected graph into `target` parts.
///
/// Edge betweenness is recomputed after every removal. Ties go to the edge
/// with the smallest endpoint pair. Stops early when no edges remain.
pub fn girvan_newman(graph: &DrugGraph, target: usize) -> Vec<usize> {
    let n = graph.node_count();
    let mut adjacency: Vec<Vec<u32>> = (0..n).map(|v| graph.neighbors(v).to_vec()).collect();
    let mut removed = 0usize;

    loop {
        let labels = component_labels(&adjacency);
        let parts = labels.iter().max().map_or(0, |&max| max + 1);
        if parts >= target || adjacency.iter().all(|list| list.is_empty()) {
            log::debug!("Girvan-Newman removed {} edges into {} parts", removed, parts);
            return labels;
        }

        let betweenness = edge_betweenness(n, |v| adjacency[v].as_slice());
        let Some((a, b)) = betweenness
            .into_iter()
            .max_by(|x, y| x.1.total_cmp(&y.1).then_with(|| y.0.cmp(&x.0)))
            .map(|(pair, _)| pair)
        else {
            return labels;
        };

        adjacency[a].retain(|&w| w as usize != b);
        adjacency[b].retain(|&w| w as usize != a);
        removed += 1;
    }
}

fn component_labels(adjacency: &[Vec<u32>]) -> Vec<usize> {
    let mut sets = DisjointSets::new(adjacency.len());
    for (v, list) in adjacency.iter().enumerate() {
        for &w in list {
            sets.union(v as u32, w);
        }
    }
    let roots: Vec<usize> = (0..adjacency.len())
        .map(|v| sets.find(v as u32) as usize)
        .collect();
    dense_labels(&roots)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cluster::tests::two_triangles;
    use crate::graph::{Edge, Node};

    #[test]
    fn bridge_is_removed_first() {
        let labels = girvan_newman(&two_triangles(), 2);
        assert_eq!(labels, vec![0, 0, 0, 1, 1, 1]);
    }

    #[test]
    fn more_parts_keep_splitting() {
        let labels = girvan_newman(&two_triangles(), 6);
        assert_eq!(labels, vec![0, 1, 2, 3, 4, 5]);
    }

    #[test]
    fn path_splits_in_the_middle() {
        let nodes = (0..4).map(|i| Node::new(format!("N{}", i), "blue")).collect();
        let edges = vec![Edge::new(0, 1), Edge::new(1, 2), Edge::new(2, 3)];
        let graph = DrugGraph::new(false, nodes, edges).unwrap();
        assert_eq!(girvan_newman(&graph, 2), vec![0, 0, 1, 1]);
    }
}
