//! Immutable drug interaction graph

use petgraph::graph::DiGraph;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

use crate::error::{AnalyzerError, Result};
use crate::graph::compressed::CompressedAdjacency;

/// Default node color for interchange files that omit one
pub const DEFAULT_COLOR: &str = "skyblue";

/// A drug in the interaction graph
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Node {
    /// Drug identifier, unique within a graph
    pub id: String,

    /// Display label
    pub label: String,

    /// Origin class of the node
    pub color: String,
}

impl Node {
    pub fn new(id: impl Into<String>, color: impl Into<String>) -> Self {
        let id = id.into();
        Self {
            label: id.clone(),
            id,
            color: color.into(),
        }
    }
}

/// An interaction between two nodes, referenced by internal index
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Edge {
    pub source: usize,
    pub target: usize,
    pub weight: f64,
}

impl Edge {
    pub fn new(source: usize, target: usize) -> Self {
        Self { source, target, weight: 1.0 }
    }

    /// Endpoints as an ordered pair, smallest index first
    pub fn canonical(&self) -> (usize, usize) {
        if self.source <= self.target {
            (self.source, self.target)
        } else {
            (self.target, self.source)
        }
    }
}

/// Drug interaction graph.
///
/// Node indices follow encounter order and serve as the stable internal ids.
/// The graph cannot be changed after construction; operations that need a
/// different graph (subgraphs, training graphs, relabelling) return a new one.
#[derive(Debug, Clone, PartialEq)]
pub struct DrugGraph {
    directed: bool,
    nodes: Vec<Node>,
    edges: Vec<Edge>,
    index: HashMap<String, usize>,
    outgoing: CompressedAdjacency,
    incoming: CompressedAdjacency,
    neighborhood: CompressedAdjacency,
}

impl DrugGraph {
    /// Validate nodes and edges and build the adjacency structures.
    ///
    /// Fails with [`AnalyzerError::Schema`] on duplicate node ids, dangling
    /// endpoints, self-loops or repeated edges.
    pub fn new(directed: bool, nodes: Vec<Node>, edges: Vec<Edge>) -> Result<Self> {
        let node_count = nodes.len();
        if node_count > u32::MAX as usize {
            return Err(AnalyzerError::Schema(format!(
                "graph has {} nodes, more than the supported maximum",
                node_count
            )));
        }

        let mut ids = HashSet::with_capacity(node_count);
        for node in &nodes {
            if !ids.insert(node.id.as_str()) {
                return Err(AnalyzerError::Schema(format!("duplicate node id {}", node.id)));
            }
        }

        let mut seen = HashSet::with_capacity(edges.len());
        for edge in &edges {
            if edge.source >= node_count || edge.target >= node_count {
                return Err(AnalyzerError::Schema(format!(
                    "edge {} -> {} references a node outside 0..{}",
                    edge.source, edge.target, node_count
                )));
            }
            if edge.source == edge.target {
                return Err(AnalyzerError::Schema(format!(
                    "self-loop on node {}",
                    nodes[edge.source].id
                )));
            }
            let key = if directed {
                (edge.source, edge.target)
            } else {
                edge.canonical()
            };
            if !seen.insert(key) {
                return Err(AnalyzerError::Schema(format!(
                    "repeated edge {} - {}",
                    nodes[edge.source].id, nodes[edge.target].id
                )));
            }
        }

        Ok(Self::assemble(directed, nodes, edges))
    }

    /// Build lookup and adjacency structures for parts already known to be valid
    fn assemble(directed: bool, nodes: Vec<Node>, edges: Vec<Edge>) -> Self {
        let node_count = nodes.len();
        let index = nodes
            .iter()
            .enumerate()
            .map(|(idx, node)| (node.id.clone(), idx))
            .collect();

        let mut out_lists = vec![Vec::new(); node_count];
        let mut in_lists = vec![Vec::new(); node_count];
        let mut undirected_lists = vec![Vec::new(); node_count];

        for edge in &edges {
            let (src, dst) = (edge.source as u32, edge.target as u32);
            out_lists[edge.source].push(dst);
            in_lists[edge.target].push(src);
            undirected_lists[edge.source].push(dst);
            undirected_lists[edge.target].push(src);
        }

        let neighborhood = CompressedAdjacency::from_lists(undirected_lists);
        let (outgoing, incoming) = if directed {
            (
                CompressedAdjacency::from_lists(out_lists),
                CompressedAdjacency::from_lists(in_lists),
            )
        } else {
            (neighborhood.clone(), neighborhood.clone())
        };

        Self {
            directed,
            nodes,
            edges,
            index,
            outgoing,
            incoming,
            neighborhood,
        }
    }

    /// A graph without nodes
    pub fn empty(directed: bool) -> Self {
        Self {
            directed,
            nodes: Vec::new(),
            edges: Vec::new(),
            index: HashMap::new(),
            outgoing: CompressedAdjacency::default(),
            incoming: CompressedAdjacency::default(),
            neighborhood: CompressedAdjacency::default(),
        }
    }

    pub fn is_directed(&self) -> bool {
        self.directed
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    pub fn node(&self, idx: usize) -> &Node {
        &self.nodes[idx]
    }

    /// Identifier of the node at `idx`
    pub fn id(&self, idx: usize) -> &str {
        &self.nodes[idx].id
    }

    pub fn index_of(&self, id: &str) -> Option<usize> {
        self.index.get(id).copied()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.index.contains_key(id)
    }

    /// Targets of edges leaving `idx` (all neighbours when undirected)
    pub fn successors(&self, idx: usize) -> &[u32] {
        self.outgoing.neighbors(idx)
    }

    /// Sources of edges entering `idx` (all neighbours when undirected)
    pub fn predecessors(&self, idx: usize) -> &[u32] {
        self.incoming.neighbors(idx)
    }

    /// Neighbours ignoring edge direction
    pub fn neighbors(&self, idx: usize) -> &[u32] {
        self.neighborhood.neighbors(idx)
    }

    /// Degree of a node; in-degree plus out-degree for directed graphs
    pub fn degree(&self, idx: usize) -> usize {
        if self.directed {
            self.outgoing.degree(idx) + self.incoming.degree(idx)
        } else {
            self.neighborhood.degree(idx)
        }
    }

    pub fn out_degree(&self, idx: usize) -> usize {
        self.outgoing.degree(idx)
    }

    pub fn in_degree(&self, idx: usize) -> usize {
        self.incoming.degree(idx)
    }

    /// Edge test respecting direction
    pub fn has_edge(&self, src: usize, dst: usize) -> bool {
        self.outgoing.has_edge(src, dst as u32)
    }

    /// Edge test ignoring direction
    pub fn are_adjacent(&self, a: usize, b: usize) -> bool {
        self.neighborhood.has_edge(a, b as u32)
    }

    /// Subgraph induced by `members`, which keeps encounter order of the
    /// selected nodes and every edge between them
    pub fn induced_subgraph(&self, members: &[usize]) -> DrugGraph {
        let mut keep: Vec<usize> = members.to_vec();
        keep.sort_unstable();
        keep.dedup();

        let mut remap = vec![usize::MAX; self.nodes.len()];
        for (new_idx, &old_idx) in keep.iter().enumerate() {
            remap[old_idx] = new_idx;
        }

        let nodes: Vec<Node> = keep.iter().map(|&idx| self.nodes[idx].clone()).collect();
        let edges: Vec<Edge> = self
            .edges
            .iter()
            .filter(|e| remap[e.source] != usize::MAX && remap[e.target] != usize::MAX)
            .map(|e| Edge {
                source: remap[e.source],
                target: remap[e.target],
                weight: e.weight,
            })
            .collect();

        // A subset of a valid graph is valid
        Self::assemble(self.directed, nodes, edges)
    }

    /// Same nodes with the given edge positions left out
    pub fn without_edges(&self, removed: &[usize]) -> DrugGraph {
        let removed: HashSet<usize> = removed.iter().copied().collect();
        let edges: Vec<Edge> = self
            .edges
            .iter()
            .enumerate()
            .filter(|(pos, _)| !removed.contains(pos))
            .map(|(_, e)| *e)
            .collect();
        Self::assemble(self.directed, self.nodes.clone(), edges)
    }

    /// Same structure with labels replaced where `relabel` yields one
    pub fn relabeled<F>(&self, mut relabel: F) -> DrugGraph
    where
        F: FnMut(&Node) -> Option<String>,
    {
        let mut graph = self.clone();
        for node in &mut graph.nodes {
            if let Some(label) = relabel(node) {
                node.label = label;
            }
        }
        graph
    }

    /// Undirected graph over the same nodes; reciprocal directed edges merge
    /// into one edge carrying their summed weight
    pub fn undirected_view(&self) -> DrugGraph {
        if !self.directed {
            return self.clone();
        }

        let mut position: HashMap<(usize, usize), usize> = HashMap::new();
        let mut edges: Vec<Edge> = Vec::with_capacity(self.edges.len());
        for edge in &self.edges {
            match position.get(&edge.canonical()) {
                Some(&pos) => edges[pos].weight += edge.weight,
                None => {
                    position.insert(edge.canonical(), edges.len());
                    edges.push(*edge);
                }
            }
        }
        Self::assemble(false, self.nodes.clone(), edges)
    }

    /// Directed petgraph view, with one arc per direction for undirected
    /// graphs; node weights are internal indices
    pub fn to_petgraph(&self) -> DiGraph<usize, f64> {
        let mut graph = DiGraph::with_capacity(self.nodes.len(), self.edges.len() * 2);
        let indices: Vec<_> = (0..self.nodes.len()).map(|idx| graph.add_node(idx)).collect();
        for edge in &self.edges {
            graph.add_edge(indices[edge.source], indices[edge.target], edge.weight);
            if !self.directed {
                graph.add_edge(indices[edge.target], indices[edge.source], edge.weight);
            }
        }
        graph
    }

    /// Undirected weighted adjacency, merging reciprocal directed edges
    pub fn weighted_neighbors(&self) -> Vec<Vec<(usize, f64)>> {
        let mut weights: Vec<HashMap<usize, f64>> = vec![HashMap::new(); self.nodes.len()];
        for edge in &self.edges {
            *weights[edge.source].entry(edge.target).or_insert(0.0) += edge.weight;
            *weights[edge.target].entry(edge.source).or_insert(0.0) += edge.weight;
        }
        weights
            .into_iter()
            .map(|map| {
                let mut list: Vec<(usize, f64)> = map.into_iter().collect();
                list.sort_unstable_by_key(|&(node, _)| node);
                list
            })
            .collect()
    }
}
