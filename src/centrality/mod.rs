//! Node ranking and per-component structural metrics
//!
//! The analyzer never mixes components: when the graph is not (strongly)
//! connected each component large enough is measured on its own induced
//! subgraph, and smaller ones are reported as skipped.

pub mod measures;

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::config::CentralityConfig;
use crate::diagnostics::{Diagnostics, Warning};
use crate::graph::{connected_components, DrugGraph};

/// Node id to score
pub type ScoreTable = BTreeMap<String, f64>;

/// Node-level measures produced per component
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Measure {
    Degree,
    Closeness,
    Betweenness,
    Clustering,
    Combination,
}

impl Measure {
    pub const ALL: [Measure; 5] = [
        Measure::Degree,
        Measure::Closeness,
        Measure::Betweenness,
        Measure::Clustering,
        Measure::Combination,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Measure::Degree => "degree",
            Measure::Closeness => "closeness",
            Measure::Betweenness => "betweenness",
            Measure::Clustering => "clustering",
            Measure::Combination => "combination",
        }
    }
}

/// Degree averages of a component
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DegreeSummary {
    pub average: f64,

    /// Present for directed graphs only
    pub average_in: Option<f64>,
    pub average_out: Option<f64>,
}

/// Metrics of one analysed component
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComponentReport {
    /// 1-based position among all components
    pub component: usize,
    pub size: usize,
    pub edge_count: usize,
    pub diameter: u32,
    pub average_clustering: f64,
    pub average_shortest_path: f64,
    pub triangles: usize,
    pub degree: DegreeSummary,
    pub tables: BTreeMap<Measure, ScoreTable>,
    pub top: BTreeMap<Measure, Vec<String>>,
}

impl ComponentReport {
    pub fn table(&self, measure: Measure) -> Option<&ScoreTable> {
        self.tables.get(&measure)
    }
}

/// Output of the centrality stage
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CentralityReport {
    pub directed: bool,

    /// Whether the whole graph is one (strongly) connected component
    pub connected: bool,
    pub node_count: usize,
    pub edge_count: usize,
    pub component_count: usize,
    pub components: Vec<ComponentReport>,
    pub warnings: Vec<Warning>,
}

/// The `k` highest-scoring node ids, descending, ties by ascending id
pub fn top_k(table: &ScoreTable, k: usize) -> Vec<String> {
    let mut entries: Vec<(&String, f64)> = table.iter().map(|(id, &score)| (id, score)).collect();
    entries.sort_by(|a, b| b.1.total_cmp(&a.1).then_with(|| a.0.cmp(b.0)));
    entries.into_iter().take(k).map(|(id, _)| id.clone()).collect()
}

/// Compute per-component centrality tables and structural metrics
pub fn analyze(graph: &DrugGraph, config: &CentralityConfig) -> CentralityReport {
    let mut diagnostics = Diagnostics::new();
    let components = connected_components(graph);
    let connected = components.len() == 1;

    if connected {
        log::info!("Graph is {}connected", if graph.is_directed() { "strongly " } else { "" });
    } else {
        log::info!(
            "Graph is not {}connected, analysing {} components separately",
            if graph.is_directed() { "strongly " } else { "" },
            components.len()
        );
    }

    let mut reports = Vec::new();
    for (position, members) in components.iter().enumerate() {
        let component = position + 1;
        if members.len() < config.min_component_size.max(2) {
            diagnostics.warn(Warning::InsufficientComponentSize {
                component,
                size: members.len(),
                min_size: config.min_component_size.max(2),
            });
            continue;
        }

        let subgraph = if connected {
            graph.clone()
        } else {
            graph.induced_subgraph(members)
        };
        reports.push(analyze_component(&subgraph, component, config));
    }

    CentralityReport {
        directed: graph.is_directed(),
        connected,
        node_count: graph.node_count(),
        edge_count: graph.edge_count(),
        component_count: components.len(),
        components: reports,
        warnings: diagnostics.take(),
    }
}

/// Measure a single (strongly) connected graph
pub fn analyze_component(
    graph: &DrugGraph,
    component: usize,
    config: &CentralityConfig,
) -> ComponentReport {
    let n = graph.node_count();
    log::info!("Analysing component {} with {} nodes", component, n);

    let distances = measures::distance_matrix(graph);
    let triangles = measures::triangles(graph);

    let degree = measures::degree_centrality(graph);
    let closeness = measures::closeness_centrality(&distances);
    let betweenness = measures::betweenness_centrality(graph);
    let clustering = measures::clustering_coefficients(graph, &triangles);

    let normalized = [
        measures::min_max_normalize(&degree),
        measures::min_max_normalize(&closeness),
        measures::min_max_normalize(&betweenness),
        measures::min_max_normalize(&clustering),
    ];
    let combination: Vec<f64> = (0..n)
        .map(|v| {
            normalized
                .iter()
                .zip(config.combination_weights.iter())
                .map(|(values, weight)| weight * values[v])
                .sum()
        })
        .collect();

    let to_table = |values: &[f64]| -> ScoreTable {
        values
            .iter()
            .enumerate()
            .map(|(v, &score)| (graph.id(v).to_string(), score))
            .collect()
    };

    let mut tables = BTreeMap::new();
    tables.insert(Measure::Degree, to_table(&degree));
    tables.insert(Measure::Closeness, to_table(&closeness));
    tables.insert(Measure::Betweenness, to_table(&betweenness));
    tables.insert(Measure::Clustering, to_table(&clustering));
    tables.insert(Measure::Combination, to_table(&combination));

    let top: BTreeMap<Measure, Vec<String>> = tables
        .iter()
        .map(|(&measure, table)| (measure, top_k(table, config.top_k)))
        .collect();

    for (measure, ids) in &top {
        log::debug!("Top {} nodes by {}: {:?}", config.top_k, measure.name(), ids);
    }

    let degree_summary = if graph.is_directed() {
        let total_in: usize = (0..n).map(|v| graph.in_degree(v)).sum();
        let total_out: usize = (0..n).map(|v| graph.out_degree(v)).sum();
        DegreeSummary {
            average: (total_in + total_out) as f64 / n as f64,
            average_in: Some(total_in as f64 / n as f64),
            average_out: Some(total_out as f64 / n as f64),
        }
    } else {
        let total: usize = (0..n).map(|v| graph.degree(v)).sum();
        DegreeSummary {
            average: total as f64 / n as f64,
            average_in: None,
            average_out: None,
        }
    };

    let average_clustering = if n == 0 {
        0.0
    } else {
        clustering.iter().sum::<f64>() / n as f64
    };

    ComponentReport {
        component,
        size: n,
        edge_count: graph.edge_count(),
        diameter: measures::diameter(&distances),
        average_clustering,
        average_shortest_path: measures::average_shortest_path(&distances),
        triangles: triangles.iter().sum::<usize>() / 3,
        degree: degree_summary,
        tables,
        top,
    }
}
