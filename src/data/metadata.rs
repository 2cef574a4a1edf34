//! Drug metadata used for label enrichment

use serde::Deserialize;
use std::collections::HashMap;
use std::fs;
use std::path::Path;

use crate::diagnostics::{Diagnostics, Warning};
use crate::error::{AnalyzerError, Result};
use crate::graph::DrugGraph;

/// A metadata entry, either a bare common name or an object holding one
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
enum MetadataEntry {
    Name(String),
    Record { common_name: String },
}

impl MetadataEntry {
    fn into_name(self) -> String {
        match self {
            MetadataEntry::Name(name) => name,
            MetadataEntry::Record { common_name } => common_name,
        }
    }
}

/// Load the identifier to common-name mapping
pub fn load_drug_metadata(path: &Path) -> Result<HashMap<String, String>> {
    if !path.exists() {
        return Err(AnalyzerError::MissingSource {
            path: path.to_path_buf(),
        });
    }

    let contents = fs::read_to_string(path)?;
    parse_drug_metadata(&contents)
}

pub fn parse_drug_metadata(contents: &str) -> Result<HashMap<String, String>> {
    let entries: HashMap<String, MetadataEntry> = serde_json::from_str(contents)
        .map_err(|err| AnalyzerError::Schema(format!("drug metadata: {}", err)))?;

    Ok(entries
        .into_iter()
        .map(|(id, entry)| (id, entry.into_name()))
        .collect())
}

/// Replace node labels with common names where the metadata has them
pub fn enrich_labels(
    graph: &DrugGraph,
    names: &HashMap<String, String>,
    diagnostics: &mut Diagnostics,
) -> DrugGraph {
    let mut missing = 0usize;
    let enriched = graph.relabeled(|node| {
        let name = names.get(&node.id).cloned();
        if name.is_none() {
            missing += 1;
        }
        name
    });

    if missing > 0 {
        diagnostics.warn(Warning::MissingMetadata { drugs: missing });
    }
    log::info!(
        "Labelled {} of {} drugs with common names",
        graph.node_count() - missing,
        graph.node_count()
    );

    enriched
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{Edge, Node};

    #[test]
    fn accepts_flat_and_nested_entries() {
        let names = parse_drug_metadata(
            r#"{"DB00001": "Lepirudin", "DB00002": {"common_name": "Cetuximab"}}"#,
        )
        .unwrap();
        assert_eq!(names["DB00001"], "Lepirudin");
        assert_eq!(names["DB00002"], "Cetuximab");
    }

    #[test]
    fn rejects_unexpected_shapes() {
        assert!(matches!(
            parse_drug_metadata(r#"["DB00001"]"#),
            Err(AnalyzerError::Schema(_))
        ));
    }

    #[test]
    fn enrichment_keeps_ids_and_counts_misses() {
        let nodes = vec![Node::new("DB00001", "blue"), Node::new("DB99999", "green")];
        let graph = DrugGraph::new(false, nodes, vec![Edge::new(0, 1)]).unwrap();
        let names = parse_drug_metadata(r#"{"DB00001": "Lepirudin"}"#).unwrap();

        let mut diagnostics = Diagnostics::new();
        let enriched = enrich_labels(&graph, &names, &mut diagnostics);

        assert_eq!(enriched.node(0).label, "Lepirudin");
        assert_eq!(enriched.node(0).id, "DB00001");
        assert_eq!(enriched.node(1).label, "DB99999");
        assert_eq!(diagnostics.warnings, vec![Warning::MissingMetadata { drugs: 1 }]);
        assert_eq!(graph.node(0).label, "DB00001");
    }
}
