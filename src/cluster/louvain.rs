//! Louvain modularity optimisation on weighted undirected graphs

use std::collections::BTreeMap;

use crate::cluster::dense_labels;
use crate::graph::DrugGraph;

/// Levels whose modularity gain falls below this end the search
const MIN_GAIN: f64 = 1e-7;

/// Smallest local move gain treated as an improvement
const MOVE_EPSILON: f64 = 1e-12;

/// Weighted adjacency of one aggregation level plus self-loop weights
struct Level {
    adjacency: Vec<Vec<(usize, f64)>>,
    loops: Vec<f64>,
}

impl Level {
    fn degree(&self, v: usize) -> f64 {
        self.adjacency[v].iter().map(|&(_, w)| w).sum::<f64>() + 2.0 * self.loops[v]
    }

    /// Modularity of `community` on this level, `two_m` being twice the
    /// total edge weight
    fn modularity(&self, community: &[usize], two_m: f64) -> f64 {
        let count = community.iter().max().map_or(0, |&max| max + 1);
        let mut internal = vec![0.0; count];
        let mut total = vec![0.0; count];

        for v in 0..self.adjacency.len() {
            let c = community[v];
            total[c] += self.degree(v);
            internal[c] += 2.0 * self.loops[v];
            for &(w, weight) in &self.adjacency[v] {
                if community[w] == c {
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

    /// Greedy node moves until no move improves modularity.
    ///
    /// Returns dense community labels and whether any node moved.
    fn local_moves(&self, two_m: f64) -> (Vec<usize>, bool) {
        let n = self.adjacency.len();
        let degrees: Vec<f64> = (0..n).map(|v| self.degree(v)).collect();
        let mut community: Vec<usize> = (0..n).collect();
        let mut totals = degrees.clone();
        let mut moved_any = false;

        loop {
            let mut moved = false;

            for v in 0..n {
                let current = community[v];
                let k = degrees[v];

                let mut links: BTreeMap<usize, f64> = BTreeMap::new();
                for &(w, weight) in &self.adjacency[v] {
                    *links.entry(community[w]).or_insert(0.0) += weight;
                }

                totals[current] -= k;
                let stay = links.get(&current).copied().unwrap_or(0.0) - totals[current] * k / two_m;

                let mut best = current;
                let mut best_gain = MOVE_EPSILON;
                for (&candidate, &weight) in &links {
                    let gain = weight - totals[candidate] * k / two_m - stay;
                    if gain > best_gain {
                        best = candidate;
                        best_gain = gain;
                    }
                }

                totals[best] += k;
                if best != current {
                    community[v] = best;
                    moved = true;
                    moved_any = true;
                }
            }

            if !moved {
                break;
            }
        }

        (dense_labels(&community), moved_any)
    }

    /// Collapse each community into a single node
    fn aggregate(&self, community: &[usize]) -> Level {
        let count = community.iter().max().map_or(0, |&max| max + 1);
        let mut loops = vec![0.0; count];
        let mut weights: BTreeMap<(usize, usize), f64> = BTreeMap::new();

        for v in 0..self.adjacency.len() {
            let c = community[v];
            loops[c] += self.loops[v];
            for &(w, weight) in &self.adjacency[v] {
                let d = community[w];
                if c == d {
                    // Internal edges are visited from both endpoints
                    loops[c] += weight / 2.0;
                } else {
                    *weights.entry((c, d)).or_insert(0.0) += weight;
                }
            }
        }

        let mut adjacency = vec![Vec::new(); count];
        for ((c, d), weight) in weights {
            adjacency[c].push((d, weight));
        }
        Level { adjacency, loops }
    }
}

/// Detect communities by multi-level modularity optimisation
pub fn louvain(graph: &DrugGraph) -> Vec<usize> {
    let n = graph.node_count();
    let mut level = Level {
        adjacency: graph.weighted_neighbors(),
        loops: vec![0.0; n],
    };

    let two_m: f64 = (0..n).map(|v| level.degree(v)).sum();
    if two_m <= 0.0 {
        return (0..n).collect();
    }

    let mut membership: Vec<usize> = (0..n).collect();
    let singletons: Vec<usize> = (0..n).collect();
    let mut quality = level.modularity(&singletons, two_m);
    let mut depth = 0;

    loop {
        let (community, moved) = level.local_moves(two_m);
        if !moved {
            break;
        }

        let next_quality = level.modularity(&community, two_m);
        if next_quality - quality < MIN_GAIN {
            break;
        }

        for slot in membership.iter_mut() {
            *slot = community[*slot];
        }
        level = level.aggregate(&community);
        quality = next_quality;
        depth += 1;
        log::debug!("Louvain level {}: modularity {:.6}", depth, quality);
    }

    dense_labels(&membership)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cluster::tests::two_triangles;
    use crate::graph::{Edge, Node};

    #[test]
    fn splits_triangles_at_the_bridge() {
        assert_eq!(louvain(&two_triangles()), vec![0, 0, 0, 1, 1, 1]);
    }

    #[test]
    fn aggregation_preserves_total_weight() {
        let graph = two_triangles();
        let level = Level {
            adjacency: graph.weighted_neighbors(),
            loops: vec![0.0; 6],
        };
        let two_m: f64 = (0..6).map(|v| level.degree(v)).sum();
        let community = vec![0, 0, 0, 1, 1, 1];
        let coarse = level.aggregate(&community);

        let coarse_two_m: f64 = (0..2).map(|v| coarse.degree(v)).sum();
        assert!((two_m - coarse_two_m).abs() < 1e-12);
        assert_eq!(coarse.loops, vec![3.0, 3.0]);
        // Modularity is unchanged by aggregation
        let fine = level.modularity(&community, two_m);
        let collapsed = coarse.modularity(&[0, 1], two_m);
        assert!((fine - collapsed).abs() < 1e-12);
        assert!((fine - 5.0 / 14.0).abs() < 1e-12);
    }

    #[test]
    fn heavy_edges_pull_nodes_together() {
        // Path A - B - C - D where B - C carries most of the weight
        let nodes = (0..4).map(|i| Node::new(format!("N{}", i), "blue")).collect();
        let edges = vec![
            Edge::new(0, 1),
            Edge { source: 1, target: 2, weight: 10.0 },
            Edge::new(2, 3),
        ];
        let graph = DrugGraph::new(false, nodes, edges).unwrap();
        let labels = louvain(&graph);
        assert_eq!(labels[1], labels[2]);
    }
}
