//! Neighbourhood similarity heuristics

use itertools::{EitherOrBoth, Itertools};

use crate::graph::DrugGraph;
use crate::predict::Method;

/// Neighbours shared by `u` and `v`; both lists are sorted
fn shared_neighbors<'a>(graph: &'a DrugGraph, u: usize, v: usize) -> impl Iterator<Item = u32> + 'a {
    graph
        .neighbors(u)
        .iter()
        .merge_join_by(graph.neighbors(v).iter(), |a, b| a.cmp(b))
        .filter_map(|entry| match entry {
            EitherOrBoth::Both(&w, _) => Some(w),
            _ => None,
        })
}

pub fn common_neighbors(graph: &DrugGraph, u: usize, v: usize) -> f64 {
    shared_neighbors(graph, u, v).count() as f64
}

/// |N(u) ∩ N(v)| / |N(u) ∪ N(v)|, zero for an empty union
pub fn jaccard(graph: &DrugGraph, u: usize, v: usize) -> f64 {
    let shared = shared_neighbors(graph, u, v).count();
    let union = graph.neighbors(u).len() + graph.neighbors(v).len() - shared;
    if union == 0 {
        0.0
    } else {
        shared as f64 / union as f64
    }
}

/// Σ 1 / ln(deg(w)) over shared neighbours `w` of degree above one
pub fn adamic_adar(graph: &DrugGraph, u: usize, v: usize) -> f64 {
    shared_neighbors(graph, u, v)
        .map(|w| graph.neighbors(w as usize).len())
        .filter(|&degree| degree > 1)
        .map(|degree| 1.0 / (degree as f64).ln())
        .sum()
}

pub fn preferential_attachment(graph: &DrugGraph, u: usize, v: usize) -> f64 {
    (graph.neighbors(u).len() * graph.neighbors(v).len()) as f64
}

/// Similarity of `u` and `v` under `method` on the undirected neighbourhoods
/// of `graph`
pub fn score(graph: &DrugGraph, method: Method, u: usize, v: usize) -> f64 {
    match method {
        Method::CommonNeighbors => common_neighbors(graph, u, v),
        Method::Jaccard => jaccard(graph, u, v),
        Method::AdamicAdar => adamic_adar(graph, u, v),
        Method::PreferentialAttachment => preferential_attachment(graph, u, v),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{Edge, Node};

    /// X and Y share A and B; X also knows C
    fn shared_pair() -> DrugGraph {
        let nodes = ["X", "Y", "A", "B", "C"]
            .iter()
            .map(|id| Node::new(*id, "blue"))
            .collect();
        let edges = [(0, 2), (0, 3), (0, 4), (1, 2), (1, 3)]
            .iter()
            .map(|&(a, b)| Edge::new(a, b))
            .collect();
        DrugGraph::new(false, nodes, edges).unwrap()
    }

    #[test]
    fn jaccard_of_shared_pair() {
        let graph = shared_pair();
        assert!((jaccard(&graph, 0, 1) - 2.0 / 3.0).abs() < 1e-12);
        assert_eq!(common_neighbors(&graph, 0, 1), 2.0);
        assert_eq!(preferential_attachment(&graph, 0, 1), 6.0);
    }

    #[test]
    fn adamic_adar_weights_by_degree() {
        let graph = shared_pair();
        // A and B each have degree 2
        let expected = 2.0 / 2f64.ln();
        assert!((adamic_adar(&graph, 0, 1) - expected).abs() < 1e-12);
    }

    #[test]
    fn isolated_pair_scores_zero() {
        let nodes = vec![Node::new("A", "blue"), Node::new("B", "blue")];
        let graph = DrugGraph::new(false, nodes, Vec::new()).unwrap();
        for method in Method::ALL {
            assert_eq!(score(&graph, method, 0, 1), 0.0);
        }
    }
}
