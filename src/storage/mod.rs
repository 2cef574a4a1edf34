//! Graph interchange and report persistence

use serde::{Deserialize, Serialize};
use serde_json::to_string_pretty;
use std::collections::HashMap;
use std::fs::{self, File};
use std::io::Write;
use std::path::Path;

use crate::error::{AnalyzerError, Result};
use crate::graph::model::DEFAULT_COLOR;
use crate::graph::{DrugGraph, Edge, Node};

/// Node entry of the interchange format
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NodeRecord {
    pub id: String,
    #[serde(default)]
    pub label: Option<String>,
    #[serde(default)]
    pub color: Option<String>,
}

/// Link entry of the interchange format
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LinkRecord {
    pub source: String,
    pub target: String,
    #[serde(default = "default_weight")]
    pub weight: f64,
}

fn default_weight() -> f64 {
    1.0
}

/// The interchange document: `{"directed", "nodes", "links"}`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GraphDocument {
    pub directed: bool,
    pub nodes: Vec<NodeRecord>,
    pub links: Vec<LinkRecord>,
}

impl GraphDocument {
    pub fn from_graph(graph: &DrugGraph) -> Self {
        let nodes = graph
            .nodes()
            .iter()
            .map(|node| NodeRecord {
                id: node.id.clone(),
                label: Some(node.label.clone()),
                color: Some(node.color.clone()),
            })
            .collect();

        let links = graph
            .edges()
            .iter()
            .map(|edge| LinkRecord {
                source: graph.id(edge.source).to_string(),
                target: graph.id(edge.target).to_string(),
                weight: edge.weight,
            })
            .collect();

        Self {
            directed: graph.is_directed(),
            nodes,
            links,
        }
    }

    /// Validate into the typed graph model
    pub fn into_graph(self) -> Result<DrugGraph> {
        let nodes: Vec<Node> = self
            .nodes
            .into_iter()
            .map(|record| Node {
                label: record.label.unwrap_or_else(|| record.id.clone()),
                color: record.color.unwrap_or_else(|| DEFAULT_COLOR.to_string()),
                id: record.id,
            })
            .collect();

        let edges = {
            let position: HashMap<&str, usize> = nodes
                .iter()
                .enumerate()
                .map(|(idx, node)| (node.id.as_str(), idx))
                .collect();

            let lookup = |id: &str| {
                position.get(id).copied().ok_or_else(|| {
                    AnalyzerError::Schema(format!("link references unknown node {}", id))
                })
            };

            let mut edges = Vec::with_capacity(self.links.len());
            for link in &self.links {
                if !link.weight.is_finite() {
                    return Err(AnalyzerError::Schema(format!(
                        "link {} - {} has non-finite weight",
                        link.source, link.target
                    )));
                }
                edges.push(Edge {
                    source: lookup(&link.source)?,
                    target: lookup(&link.target)?,
                    weight: link.weight,
                });
            }
            edges
        };

        DrugGraph::new(self.directed, nodes, edges)
    }
}

/// Fail with `OutputAlreadyExists` if something is already at `path`
pub fn ensure_output_absent(path: &Path) -> Result<()> {
    if path.exists() {
        return Err(AnalyzerError::OutputAlreadyExists {
            path: path.to_path_buf(),
        });
    }
    Ok(())
}

/// Parse and validate an interchange document
pub fn parse_graph(contents: &str) -> Result<DrugGraph> {
    let document: GraphDocument = serde_json::from_str(contents)
        .map_err(|err| AnalyzerError::Schema(format!("graph document: {}", err)))?;
    document.into_graph()
}

/// Load a graph stored in the interchange format
pub fn load_graph(path: &Path) -> Result<DrugGraph> {
    log::info!("Reading graph file: {}", path.display());

    if !path.exists() {
        return Err(AnalyzerError::MissingSource {
            path: path.to_path_buf(),
        });
    }

    let contents = fs::read_to_string(path)?;
    let graph = parse_graph(&contents)?;

    log::info!(
        "Loaded graph with {} nodes and {} edges",
        graph.node_count(),
        graph.edge_count()
    );
    Ok(graph)
}

/// Save a graph in the interchange format
pub fn save_graph(graph: &DrugGraph, path: &Path) -> Result<()> {
    log::info!(
        "Saving graph with {} nodes and {} edges to {}",
        graph.node_count(),
        graph.edge_count(),
        path.display()
    );
    save_report(&GraphDocument::from_graph(graph), path)
}

/// Save any serialisable report as pretty JSON, creating parent directories
pub fn save_report<T: Serialize>(report: &T, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }

    let mut file = File::create(path)?;
    file.write_all(to_string_pretty(report)?.as_bytes())?;

    Ok(())
}
