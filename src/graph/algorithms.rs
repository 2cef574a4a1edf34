//! Shortest-path algorithms shared by the analyzers
//!
//! All routines take the node count and a neighbour accessor, so they run on
//! either direction of a [`crate::graph::DrugGraph`] or on its undirected view.
//! Graphs are unweighted for path purposes: every edge has length 1.

use std::collections::{HashMap, VecDeque};

/// Marker for nodes not reachable from the source
pub const UNREACHABLE: u32 = u32::MAX;

/// Hop distances from `source` by breadth-first search
pub fn bfs_distances<'a, F>(node_count: usize, source: usize, neighbors: F) -> Vec<u32>
where
    F: Fn(usize) -> &'a [u32],
{
    let mut dist = vec![UNREACHABLE; node_count];
    let mut queue = VecDeque::with_capacity(node_count);
    dist[source] = 0;
    queue.push_back(source);

    while let Some(v) = queue.pop_front() {
        let next = dist[v] + 1;
        for &w in neighbors(v) {
            let w = w as usize;
            if dist[w] == UNREACHABLE {
                dist[w] = next;
                queue.push_back(w);
            }
        }
    }

    dist
}

/// Per-source state of Brandes' algorithm: BFS order, path counts and
/// predecessor lists
struct ShortestPathDag {
    order: Vec<usize>,
    sigma: Vec<f64>,
    predecessors: Vec<Vec<usize>>,
}

fn shortest_path_dag<'a, F>(node_count: usize, source: usize, neighbors: &F) -> ShortestPathDag
where
    F: Fn(usize) -> &'a [u32],
{
    let mut order = Vec::with_capacity(node_count);
    let mut predecessors: Vec<Vec<usize>> = vec![Vec::new(); node_count];
    let mut sigma = vec![0.0; node_count];
    let mut dist = vec![UNREACHABLE; node_count];
    let mut queue = VecDeque::new();

    sigma[source] = 1.0;
    dist[source] = 0;
    queue.push_back(source);

    while let Some(v) = queue.pop_front() {
        order.push(v);
        for &w in neighbors(v) {
            let w = w as usize;
            if dist[w] == UNREACHABLE {
                dist[w] = dist[v] + 1;
                queue.push_back(w);
            }
            if dist[w] == dist[v] + 1 {
                sigma[w] += sigma[v];
                predecessors[w].push(v);
            }
        }
    }

    ShortestPathDag {
        order,
        sigma,
        predecessors,
    }
}

/// Raw Brandes node betweenness: for every ordered pair (s, t), the fraction
/// of shortest s-t paths passing through each node, summed.
///
/// For undirected graphs every unordered pair is counted twice; callers
/// normalise.
pub fn node_betweenness<'a, F>(node_count: usize, neighbors: F) -> Vec<f64>
where
    F: Fn(usize) -> &'a [u32],
{
    let mut betweenness = vec![0.0; node_count];

    for source in 0..node_count {
        let dag = shortest_path_dag(node_count, source, &neighbors);
        let mut delta = vec![0.0; node_count];

        // Reverse BFS order: farthest nodes first
        for &w in dag.order.iter().rev() {
            for &v in &dag.predecessors[w] {
                delta[v] += dag.sigma[v] / dag.sigma[w] * (1.0 + delta[w]);
            }
            if w != source {
                betweenness[w] += delta[w];
            }
        }
    }

    betweenness
}

/// Raw Brandes edge betweenness keyed by `(smaller, larger)` endpoint pair,
/// summed over ordered source/target pairs
pub fn edge_betweenness<'a, F>(node_count: usize, neighbors: F) -> HashMap<(usize, usize), f64>
where
    F: Fn(usize) -> &'a [u32],
{
    let mut betweenness: HashMap<(usize, usize), f64> = HashMap::new();

    for source in 0..node_count {
        let dag = shortest_path_dag(node_count, source, &neighbors);
        let mut delta = vec![0.0; node_count];

        for &w in dag.order.iter().rev() {
            for &v in &dag.predecessors[w] {
                let credit = dag.sigma[v] / dag.sigma[w] * (1.0 + delta[w]);
                let key = if v < w { (v, w) } else { (w, v) };
                *betweenness.entry(key).or_insert(0.0) += credit;
                delta[v] += credit;
            }
        }
    }

    betweenness
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::compressed::CompressedAdjacency;

    fn path(n: usize) -> CompressedAdjacency {
        let lists = (0..n)
            .map(|i| {
                let mut list = Vec::new();
                if i > 0 {
                    list.push(i as u32 - 1);
                }
                if i + 1 < n {
                    list.push(i as u32 + 1);
                }
                list
            })
            .collect();
        CompressedAdjacency::from_lists(lists)
    }

    #[test]
    fn bfs_marks_unreachable_nodes() {
        let adjacency = CompressedAdjacency::from_lists(vec![vec![1], vec![0], vec![]]);
        let dist = bfs_distances(3, 0, |v| adjacency.neighbors(v));
        assert_eq!(dist, vec![0, 1, UNREACHABLE]);
    }

    #[test]
    fn path_betweenness_counts_both_directions() {
        let adjacency = path(3);
        let scores = node_betweenness(3, |v| adjacency.neighbors(v));
        // Middle node lies on the 0-2 path in both directions
        assert_eq!(scores, vec![0.0, 2.0, 0.0]);
    }

    #[test]
    fn square_splits_paths_evenly() {
        // 0-1-2-3-0
        let adjacency =
            CompressedAdjacency::from_lists(vec![vec![1, 3], vec![0, 2], vec![1, 3], vec![0, 2]]);
        let scores = node_betweenness(4, |v| adjacency.neighbors(v));
        for score in scores {
            assert!((score - 1.0).abs() < 1e-12);
        }
    }

    #[test]
    fn bridge_edge_has_highest_edge_betweenness() {
        // Two triangles joined by the 2-3 bridge
        let adjacency = CompressedAdjacency::from_lists(vec![
            vec![1, 2],
            vec![0, 2],
            vec![0, 1, 3],
            vec![2, 4, 5],
            vec![3, 5],
            vec![3, 4],
        ]);
        let scores = edge_betweenness(6, |v| adjacency.neighbors(v));
        let (best, _) = scores
            .iter()
            .max_by(|a, b| a.1.partial_cmp(b.1).unwrap())
            .unwrap();
        assert_eq!(*best, (2, 3));
        // 3 x 3 pairs cross the bridge, counted in both directions
        assert!((scores[&(2, 3)] - 18.0).abs() < 1e-12);
    }
}
