//! Graph construction module

use std::collections::HashMap;

use crate::config::{BuildConfig, DuplicatePolicy};
use crate::diagnostics::{Diagnostics, Warning};
use crate::error::{AnalyzerError, Result};
use crate::graph::{DrugGraph, Edge, Node};

/// Color of drugs first seen in the first column
pub const FIRST_COLUMN_COLOR: &str = "blue";

/// Color of drugs first seen in the second column
pub const SECOND_COLUMN_COLOR: &str = "green";

/// One row of raw interaction data; either identifier may be missing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawRecord {
    /// 1-based line number in the source
    pub line: usize,
    pub drug_a: Option<String>,
    pub drug_b: Option<String>,

    /// The row could not be decoded as text
    pub unreadable: bool,
}

impl RawRecord {
    pub fn new(line: usize, drug_a: &str, drug_b: &str) -> Self {
        Self {
            line,
            drug_a: Some(drug_a.to_string()),
            drug_b: Some(drug_b.to_string()),
            unreadable: false,
        }
    }

    /// A row whose bytes are not valid UTF-8
    pub fn unreadable(line: usize) -> Self {
        Self {
            line,
            drug_a: None,
            drug_b: None,
            unreadable: true,
        }
    }

    /// Both identifiers, or a `MalformedRecord` error naming what is missing
    pub fn identifiers(&self) -> Result<(&str, &str)> {
        fn present(field: &Option<String>) -> Option<&str> {
            field.as_deref().map(str::trim).filter(|id| !id.is_empty())
        }

        if self.unreadable {
            return Err(self.malformed("row is not valid UTF-8"));
        }

        match (present(&self.drug_a), present(&self.drug_b)) {
            (Some(a), Some(b)) => Ok((a, b)),
            (None, Some(_)) => Err(self.malformed("missing first drug identifier")),
            (Some(_), None) => Err(self.malformed("missing second drug identifier")),
            (None, None) => Err(self.malformed("missing both drug identifiers")),
        }
    }

    fn malformed(&self, reason: &str) -> AnalyzerError {
        AnalyzerError::MalformedRecord {
            line: self.line,
            reason: reason.to_string(),
        }
    }
}

/// Builder for incrementally constructing a DrugGraph
pub struct GraphBuilder {
    directed: bool,

    policy: DuplicatePolicy,

    /// Mapping from drug identifiers to node indices
    id_to_index: HashMap<String, usize>,

    nodes: Vec<Node>,

    /// Position in `edges` of each distinct pair
    edge_index: HashMap<(usize, usize), usize>,

    edges: Vec<Edge>,

    duplicates: usize,
}

impl GraphBuilder {
    pub fn new(config: &BuildConfig) -> Self {
        Self::with_capacity(config, 0)
    }

    /// Create a new graph builder with the given node capacity
    pub fn with_capacity(config: &BuildConfig, capacity: usize) -> Self {
        Self {
            directed: config.directed,
            policy: config.duplicate_policy,
            id_to_index: HashMap::with_capacity(capacity),
            nodes: Vec::with_capacity(capacity),
            edge_index: HashMap::with_capacity(capacity),
            edges: Vec::new(),
            duplicates: 0,
        }
    }

    /// Get or create the node for an identifier, assigning the next
    /// sequential index on first occurrence
    pub fn get_or_create_node(&mut self, id: &str, color: &str) -> usize {
        if let Some(&idx) = self.id_to_index.get(id) {
            return idx;
        }

        let idx = self.nodes.len();
        self.id_to_index.insert(id.to_string(), idx);
        self.nodes.push(Node::new(id, color));
        idx
    }

    /// Add an interaction between two drugs, merging repeats per the
    /// duplicate policy
    pub fn add_interaction(&mut self, drug_a: &str, drug_b: &str) {
        let src = self.get_or_create_node(drug_a, FIRST_COLUMN_COLOR);
        let dst = self.get_or_create_node(drug_b, SECOND_COLUMN_COLOR);

        let key = if self.directed || src <= dst {
            (src, dst)
        } else {
            (dst, src)
        };

        match self.edge_index.get(&key) {
            Some(&pos) => {
                self.duplicates += 1;
                if self.policy == DuplicatePolicy::Accumulate {
                    self.edges[pos].weight += 1.0;
                }
            }
            None => {
                self.edge_index.insert(key, self.edges.len());
                self.edges.push(Edge::new(src, dst));
            }
        }
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Build the graph
    pub fn build(self) -> Result<DrugGraph> {
        log::debug!(
            "Building graph with {} nodes, {} edges ({} repeated pairs merged)",
            self.nodes.len(),
            self.edges.len(),
            self.duplicates
        );
        DrugGraph::new(self.directed, self.nodes, self.edges)
    }
}

/// Build a graph from raw records.
///
/// Malformed records and self-interactions are skipped and reported through
/// `diagnostics`; construction always continues past them.
pub fn build_graph<I>(
    records: I,
    config: &BuildConfig,
    diagnostics: &mut Diagnostics,
) -> Result<DrugGraph>
where
    I: IntoIterator<Item = RawRecord>,
{
    let mut builder = GraphBuilder::new(config);
    let mut accepted = 0usize;

    for record in records {
        let (drug_a, drug_b) = match record.identifiers() {
            Ok(ids) => ids,
            Err(err) => {
                diagnostics.warn(Warning::from_recoverable(err)?);
                continue;
            }
        };

        if drug_a == drug_b {
            diagnostics.warn(Warning::SelfInteraction {
                line: record.line,
                drug: drug_a.to_string(),
            });
            continue;
        }

        builder.add_interaction(drug_a, drug_b);
        accepted += 1;
    }

    log::info!(
        "Accepted {} interaction records covering {} drugs",
        accepted,
        builder.node_count()
    );

    builder.build()
}
