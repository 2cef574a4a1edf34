//! Connected components and fragment filtering

use petgraph::algo::tarjan_scc;
use std::collections::HashMap;

use crate::graph::DrugGraph;

/// Union-Find data structure for undirected connected component analysis
pub struct DisjointSets {
    /// Parent pointers (parent[i] = parent of node i)
    parent: Vec<u32>,

    /// Size of each set, valid at roots
    size: Vec<u32>,
}

impl DisjointSets {
    /// Create a new DisjointSets data structure
    pub fn new(size: usize) -> Self {
        Self {
            parent: (0..size as u32).collect(),
            size: vec![1; size],
        }
    }

    /// Find the root of the set containing x with path compression
    pub fn find(&mut self, x: u32) -> u32 {
        let mut root = x;
        while self.parent[root as usize] != root {
            root = self.parent[root as usize];
        }

        // Path compression: point every visited node at the root
        let mut node = x;
        while self.parent[node as usize] != root {
            let next = self.parent[node as usize];
            self.parent[node as usize] = root;
            node = next;
        }
        root
    }

    /// Union the sets containing x and y
    pub fn union(&mut self, x: u32, y: u32) {
        let root_x = self.find(x);
        let root_y = self.find(y);

        if root_x == root_y {
            return;
        }

        // Union by size: attach smaller tree under root of larger tree
        if self.size[root_x as usize] >= self.size[root_y as usize] {
            self.parent[root_y as usize] = root_x;
            self.size[root_x as usize] += self.size[root_y as usize];
        } else {
            self.parent[root_x as usize] = root_y;
            self.size[root_y as usize] += self.size[root_x as usize];
        }
    }
}

/// Connected components of an undirected graph, or strongly connected
/// components of a directed one.
///
/// Members are sorted ascending and components are ordered by their smallest
/// member, so the result only depends on encounter order.
pub fn connected_components(graph: &DrugGraph) -> Vec<Vec<usize>> {
    let mut components = if graph.is_directed() {
        strongly_connected(graph)
    } else {
        undirected_components(graph)
    };

    for members in &mut components {
        members.sort_unstable();
    }
    components.sort_unstable_by_key(|members| members[0]);
    components
}

fn undirected_components(graph: &DrugGraph) -> Vec<Vec<usize>> {
    let mut sets = DisjointSets::new(graph.node_count());
    for edge in graph.edges() {
        sets.union(edge.source as u32, edge.target as u32);
    }

    let mut by_root: HashMap<u32, Vec<usize>> = HashMap::new();
    for node in 0..graph.node_count() {
        let root = sets.find(node as u32);
        by_root.entry(root).or_default().push(node);
    }
    by_root.into_values().collect()
}

fn strongly_connected(graph: &DrugGraph) -> Vec<Vec<usize>> {
    let view = graph.to_petgraph();
    tarjan_scc(&view)
        .into_iter()
        .map(|scc| scc.into_iter().map(|idx| view[idx]).collect())
        .collect()
}

/// Keep only the nodes and edges of components with at least `min_size` nodes.
///
/// Arcs running between two kept strong components belong to neither and are
/// dropped. Applying the filter to its own output with the same `min_size`
/// returns an identical graph.
pub fn filter_small_components(graph: &DrugGraph, min_size: usize) -> DrugGraph {
    let components = connected_components(graph);
    let total = components.len();

    let mut component_of = vec![None; graph.node_count()];
    for (position, members) in components.iter().enumerate() {
        if members.len() >= min_size {
            for &member in members {
                component_of[member] = Some(position);
            }
        }
    }
    let kept: Vec<usize> = (0..graph.node_count())
        .filter(|&node| component_of[node].is_some())
        .collect();

    log::info!(
        "Keeping {} of {} nodes in components with {} or more members ({} components before filtering)",
        kept.len(),
        graph.node_count(),
        min_size,
        total
    );

    let subgraph = graph.induced_subgraph(&kept);
    let crossing: Vec<usize> = subgraph
        .edges()
        .iter()
        .enumerate()
        .filter(|(_, edge)| component_of[kept[edge.source]] != component_of[kept[edge.target]])
        .map(|(position, _)| position)
        .collect();

    if crossing.is_empty() {
        subgraph
    } else {
        log::debug!("Dropping {} arcs between strong components", crossing.len());
        subgraph.without_edges(&crossing)
    }
}
