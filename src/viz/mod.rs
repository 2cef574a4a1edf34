//! Rendering of analysis outputs
//!
//! Consumes the reports produced by the analyzers and writes files that
//! external tools (Gephi, Cytoscape, spreadsheets) can open. Nothing in the
//! analysis modules writes here.

use std::collections::{BTreeMap, BTreeSet};
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::centrality::{CentralityReport, Measure};
use crate::cluster::{ClusterAssignment, ClusteringReport};
use crate::error::Result;
use crate::graph::DrugGraph;
use crate::predict::LinkPredictionReport;

/// Fill colour of nodes ranked in a top-k list
pub const HIGHLIGHT_COLOR: &str = "red";

fn escape_xml(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

fn csv_field(text: &str) -> String {
    if text.contains([',', '"', '\n']) {
        format!("\"{}\"", text.replace('"', "\"\""))
    } else {
        text.to_string()
    }
}

/// Per-node attributes written on top of the graph's own label and colour
#[derive(Debug, Default)]
pub struct NodeAttributes {
    /// Ids drawn with [`HIGHLIGHT_COLOR`]
    pub highlighted: BTreeSet<String>,

    /// Extra integer attributes, e.g. one cluster column per algorithm
    pub columns: BTreeMap<String, BTreeMap<String, usize>>,
}

/// Write `graph` as GraphML with label, colour, weight and any extra columns
pub fn write_graphml(graph: &DrugGraph, attributes: &NodeAttributes, path: &Path) -> Result<()> {
    let mut file = BufWriter::new(File::create(path)?);
    let edge_default = if graph.is_directed() { "directed" } else { "undirected" };

    writeln!(file, "<?xml version=\"1.0\" encoding=\"UTF-8\"?>")?;
    writeln!(file, "<graphml xmlns=\"http://graphml.graphdrawing.org/xmlns\">")?;
    writeln!(file, "  <key id=\"label\" for=\"node\" attr.name=\"label\" attr.type=\"string\"/>")?;
    writeln!(file, "  <key id=\"color\" for=\"node\" attr.name=\"color\" attr.type=\"string\"/>")?;
    writeln!(
        file,
        "  <key id=\"highlighted\" for=\"node\" attr.name=\"highlighted\" attr.type=\"boolean\"/>"
    )?;
    for name in attributes.columns.keys() {
        writeln!(
            file,
            "  <key id=\"{0}\" for=\"node\" attr.name=\"{0}\" attr.type=\"int\"/>",
            escape_xml(name)
        )?;
    }
    writeln!(file, "  <key id=\"weight\" for=\"edge\" attr.name=\"weight\" attr.type=\"double\"/>")?;
    writeln!(file, "  <graph id=\"G\" edgedefault=\"{}\">", edge_default)?;

    for node in graph.nodes() {
        let highlighted = attributes.highlighted.contains(&node.id);
        let color = if highlighted { HIGHLIGHT_COLOR } else { node.color.as_str() };

        writeln!(file, "    <node id=\"{}\">", escape_xml(&node.id))?;
        writeln!(file, "      <data key=\"label\">{}</data>", escape_xml(&node.label))?;
        writeln!(file, "      <data key=\"color\">{}</data>", escape_xml(color))?;
        writeln!(file, "      <data key=\"highlighted\">{}</data>", highlighted)?;
        for (name, values) in &attributes.columns {
            if let Some(value) = values.get(&node.id) {
                writeln!(file, "      <data key=\"{}\">{}</data>", escape_xml(name), value)?;
            }
        }
        writeln!(file, "    </node>")?;
    }

    for (edge_id, edge) in graph.edges().iter().enumerate() {
        writeln!(
            file,
            "    <edge id=\"e{}\" source=\"{}\" target=\"{}\">",
            edge_id,
            escape_xml(graph.id(edge.source)),
            escape_xml(graph.id(edge.target))
        )?;
        writeln!(file, "      <data key=\"weight\">{}</data>", edge.weight)?;
        writeln!(file, "    </edge>")?;
    }

    writeln!(file, "  </graph>")?;
    writeln!(file, "</graphml>")?;
    file.flush()?;

    Ok(())
}

/// One row per analysed node with every centrality score
pub fn write_centrality_csv(report: &CentralityReport, path: &Path) -> Result<()> {
    let mut file = BufWriter::new(File::create(path)?);

    let header: Vec<&str> = Measure::ALL.iter().map(|m| m.name()).collect();
    writeln!(file, "component,id,{}", header.join(","))?;

    for component in &report.components {
        let Some(ids) = component.table(Measure::Degree) else {
            continue;
        };
        for id in ids.keys() {
            let scores: Vec<String> = Measure::ALL
                .iter()
                .map(|measure| {
                    component
                        .table(*measure)
                        .and_then(|table| table.get(id))
                        .map_or_else(String::new, |score| format!("{:.6}", score))
                })
                .collect();
            writeln!(file, "{},{},{}", component.component, csv_field(id), scores.join(","))?;
        }
    }
    file.flush()?;

    Ok(())
}

/// One row per clustered node with a column per algorithm
pub fn write_clusters_csv(report: &ClusteringReport, path: &Path) -> Result<()> {
    let mut file = BufWriter::new(File::create(path)?);

    let ids: BTreeSet<&String> = report
        .assignments
        .iter()
        .flat_map(|assignment| assignment.clusters.keys())
        .collect();
    let header: Vec<&str> = report.assignments.iter().map(|a| a.algorithm.name()).collect();
    writeln!(file, "id,{}", header.join(","))?;

    for id in ids {
        let row: Vec<String> = report
            .assignments
            .iter()
            .map(|assignment| {
                assignment
                    .cluster_of(id)
                    .map_or_else(String::new, |cluster| cluster.to_string())
            })
            .collect();
        writeln!(file, "{},{}", csv_field(id), row.join(","))?;
    }
    file.flush()?;

    Ok(())
}

/// One row per scored pair and method
pub fn write_predictions_csv(report: &LinkPredictionReport, path: &Path) -> Result<()> {
    let mut file = BufWriter::new(File::create(path)?);
    writeln!(file, "method,source,target,score,label")?;

    for method_report in &report.reports {
        for record in &method_report.records {
            writeln!(
                file,
                "{},{},{},{:.6},{}",
                method_report.method.name(),
                csv_field(&record.source),
                csv_field(&record.target),
                record.score,
                u8::from(record.label)
            )?;
        }
    }
    file.flush()?;

    Ok(())
}

/// Graph with the union of all top-k lists highlighted, plus the score table
pub fn render_centrality(graph: &DrugGraph, report: &CentralityReport, dir: &Path) -> Result<()> {
    log::info!("Rendering centrality views to {}", dir.display());
    fs::create_dir_all(dir)?;

    let mut attributes = NodeAttributes::default();
    for component in &report.components {
        for ids in component.top.values() {
            attributes.highlighted.extend(ids.iter().cloned());
        }
    }

    write_graphml(graph, &attributes, &dir.join("centrality.graphml"))?;
    write_centrality_csv(report, &dir.join("centrality.csv"))?;
    Ok(())
}

/// Graph with one cluster attribute per algorithm, plus the assignment table
pub fn render_clusters(graph: &DrugGraph, report: &ClusteringReport, dir: &Path) -> Result<()> {
    log::info!("Rendering cluster views to {}", dir.display());
    fs::create_dir_all(dir)?;

    let attributes = NodeAttributes {
        highlighted: BTreeSet::new(),
        columns: report
            .assignments
            .iter()
            .map(|assignment: &ClusterAssignment| {
                (assignment.algorithm.name().to_string(), assignment.clusters.clone())
            })
            .collect(),
    };

    write_graphml(graph, &attributes, &dir.join("clusters.graphml"))?;
    write_clusters_csv(report, &dir.join("clusters.csv"))?;
    Ok(())
}

pub fn render_predictions(report: &LinkPredictionReport, dir: &Path) -> Result<()> {
    log::info!("Rendering prediction records to {}", dir.display());
    fs::create_dir_all(dir)?;
    write_predictions_csv(report, &dir.join("predictions.csv"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{CentralityConfig, ClusterConfig};
    use crate::graph::{Edge, Node};

    fn sample_graph() -> DrugGraph {
        let nodes = vec![
            Node::new("DB1", "blue"),
            Node::new("DB<2>", "green"),
            Node::new("DB3", "green"),
        ];
        let edges = vec![Edge::new(0, 1), Edge::new(1, 2), Edge::new(2, 0)];
        DrugGraph::new(false, nodes, edges).unwrap()
    }

    #[test]
    fn graphml_escapes_and_highlights() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("g.graphml");
        let mut attributes = NodeAttributes::default();
        attributes.highlighted.insert("DB1".to_string());

        write_graphml(&sample_graph(), &attributes, &path).unwrap();
        let text = fs::read_to_string(&path).unwrap();
        assert!(text.contains("<node id=\"DB&lt;2&gt;\">"));
        assert!(text.contains("<data key=\"color\">red</data>"));
        assert!(text.contains("edgedefault=\"undirected\""));
        assert_eq!(text.matches("<edge ").count(), 3);
    }

    #[test]
    fn renders_report_files() {
        let dir = tempfile::tempdir().unwrap();
        let graph = sample_graph();

        let centrality = crate::centrality::analyze(&graph, &CentralityConfig::default());
        render_centrality(&graph, &centrality, dir.path()).unwrap();
        let table = fs::read_to_string(dir.path().join("centrality.csv")).unwrap();
        assert_eq!(table.lines().count(), 4);
        assert!(table.starts_with("component,id,degree,"));

        let clusters = crate::cluster::run_all(&graph, &ClusterConfig::default());
        render_clusters(&graph, &clusters, dir.path()).unwrap();
        let text = fs::read_to_string(dir.path().join("clusters.graphml")).unwrap();
        assert!(text.contains("attr.name=\"louvain\""));
    }
}
