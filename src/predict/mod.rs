//! Link prediction evaluation
//!
//! A seeded split holds out a fraction of the edges as positives and draws
//! as many non-adjacent pairs as negatives. Each heuristic scores the pairs
//! on the training graph and is judged by how well its ranking separates
//! the two.

pub mod metrics;
pub mod scoring;
pub mod split;

use clap::ValueEnum;
use rand::rngs::StdRng;
use rand::SeedableRng;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::config::PredictionConfig;
use crate::diagnostics::{Diagnostics, Warning};
use crate::error::Result;
use crate::graph::DrugGraph;

pub use metrics::PredictionMetrics;
pub use split::Split;

/// Neighbourhood similarity heuristics
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, ValueEnum,
)]
#[serde(rename_all = "snake_case")]
pub enum Method {
    CommonNeighbors,
    Jaccard,
    AdamicAdar,
    PreferentialAttachment,
}

impl Method {
    pub const ALL: [Method; 4] = [
        Method::CommonNeighbors,
        Method::Jaccard,
        Method::AdamicAdar,
        Method::PreferentialAttachment,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Method::CommonNeighbors => "common_neighbors",
            Method::Jaccard => "jaccard",
            Method::AdamicAdar => "adamic_adar",
            Method::PreferentialAttachment => "preferential_attachment",
        }
    }
}

/// A scored candidate pair; `label` is true for held-out edges
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionRecord {
    pub source: String,
    pub target: String,
    pub score: f64,
    pub label: bool,
}

/// Evaluation of one method
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionReport {
    pub method: Method,
    pub seed: u64,
    pub test_fraction: f64,
    pub edge_count: usize,
    pub held_out: Vec<(String, String)>,

    /// Positives first, then negatives, in sampling order
    pub records: Vec<PredictionRecord>,

    /// Absent when no edge could be held out
    pub metrics: Option<PredictionMetrics>,
    pub warnings: Vec<Warning>,
}

/// Evaluation of several methods on one shared split
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinkPredictionReport {
    pub seed: u64,
    pub reports: Vec<PredictionReport>,

    /// Method with the highest AUC, earliest on ties
    pub best: Option<Method>,
    pub warnings: Vec<Warning>,
}

/// Score the labelled pairs of `split` with `method`
pub fn score_split(graph: &DrugGraph, split: &Split, method: Method) -> Vec<PredictionRecord> {
    let pairs: Vec<((usize, usize), bool)> = split
        .positives
        .iter()
        .map(|&pair| (pair, true))
        .chain(split.negatives.iter().map(|&pair| (pair, false)))
        .collect();

    pairs
        .into_par_iter()
        .map(|((u, v), label)| PredictionRecord {
            source: graph.id(u).to_string(),
            target: graph.id(v).to_string(),
            score: scoring::score(&split.training, method, u, v),
            label,
        })
        .collect()
}

fn report_for(
    graph: &DrugGraph,
    split: Option<&Split>,
    method: Method,
    seed: u64,
    config: &PredictionConfig,
) -> PredictionReport {
    let (held_out, records, metrics) = match split {
        Some(split) => {
            let held_out = split
                .positives
                .iter()
                .map(|&(u, v)| (graph.id(u).to_string(), graph.id(v).to_string()))
                .collect();
            let records = score_split(graph, split, method);
            let metrics = metrics::evaluate_records(&records, &config.precision_at);
            log::info!(
                "{}: AUC {:.4}, average precision {:.4}",
                method.name(),
                metrics.auc,
                metrics.average_precision
            );
            (held_out, records, Some(metrics))
        }
        None => (Vec::new(), Vec::new(), None),
    };

    PredictionReport {
        method,
        seed,
        test_fraction: config.test_fraction,
        edge_count: graph.undirected_view().edge_count(),
        held_out,
        records,
        metrics,
        warnings: Vec::new(),
    }
}

/// Evaluate one heuristic on a split drawn from `seed`.
///
/// Fails with `Config` when the settings cannot produce a split.
pub fn evaluate(
    graph: &DrugGraph,
    method: Method,
    seed: u64,
    config: &PredictionConfig,
) -> Result<PredictionReport> {
    config.validate()?;
    let mut diagnostics = Diagnostics::new();
    let mut rng = StdRng::seed_from_u64(seed);
    let split = split::holdout(
        graph,
        config.test_fraction,
        config.max_resample_attempts,
        &mut rng,
        &mut diagnostics,
    );

    let mut report = report_for(graph, split.as_ref(), method, seed, config);
    report.warnings = diagnostics.take();
    Ok(report)
}

/// Evaluate every configured heuristic on the same split
pub fn evaluate_all(
    graph: &DrugGraph,
    config: &PredictionConfig,
) -> Result<LinkPredictionReport> {
    config.validate()?;
    let mut diagnostics = Diagnostics::new();
    let mut rng = StdRng::seed_from_u64(config.seed);
    let split = split::holdout(
        graph,
        config.test_fraction,
        config.max_resample_attempts,
        &mut rng,
        &mut diagnostics,
    );

    let reports: Vec<PredictionReport> = config
        .methods
        .iter()
        .map(|&method| report_for(graph, split.as_ref(), method, config.seed, config))
        .collect();

    let best = reports
        .iter()
        .filter_map(|report| report.metrics.as_ref().map(|m| (report.method, m.auc)))
        .fold(None::<(Method, f64)>, |best, (method, auc)| match best {
            Some((_, top)) if top >= auc => best,
            _ => Some((method, auc)),
        })
        .map(|(method, _)| method);

    Ok(LinkPredictionReport {
        seed: config.seed,
        reports,
        best,
        warnings: diagnostics.take(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{Edge, Node};

    fn grid(side: usize) -> DrugGraph {
        let nodes = (0..side * side)
            .map(|i| Node::new(format!("D{:03}", i), "blue"))
            .collect();
        let mut edges = Vec::new();
        for r in 0..side {
            for c in 0..side {
                let v = r * side + c;
                if c + 1 < side {
                    edges.push(Edge::new(v, v + 1));
                }
                if r + 1 < side {
                    edges.push(Edge::new(v, v + side));
                }
            }
        }
        DrugGraph::new(false, nodes, edges).unwrap()
    }

    #[test]
    fn same_seed_reproduces_report() {
        let graph = grid(6);
        let config = PredictionConfig::default();
        let first = evaluate(&graph, Method::Jaccard, 42, &config).unwrap();
        let second = evaluate(&graph, Method::Jaccard, 42, &config).unwrap();

        assert_eq!(first.held_out, second.held_out);
        assert_eq!(first.records, second.records);
        assert_eq!(
            first.metrics.as_ref().map(|m| m.auc.to_bits()),
            second.metrics.as_ref().map(|m| m.auc.to_bits())
        );
        // 60 edges, a tenth held out
        assert_eq!(first.held_out.len(), 6);
        assert_eq!(first.records.len(), 12);
    }

    #[test]
    fn methods_share_one_split() {
        let report = evaluate_all(&grid(6), &PredictionConfig::default()).unwrap();
        assert_eq!(report.reports.len(), 4);
        let held: Vec<_> = report.reports.iter().map(|r| &r.held_out).collect();
        assert!(held.windows(2).all(|pair| pair[0] == pair[1]));
        assert!(report.best.is_some());
    }

    #[test]
    fn fraction_outside_unit_interval_is_rejected() {
        let config = PredictionConfig {
            test_fraction: 1.5,
            ..PredictionConfig::default()
        };
        assert!(matches!(
            evaluate(&grid(4), Method::Jaccard, 42, &config),
            Err(crate::error::AnalyzerError::Config(_))
        ));
        assert!(evaluate_all(&grid(4), &config).is_err());
    }

    #[test]
    fn small_graph_reports_without_metrics() {
        let nodes = (0..3).map(|i| Node::new(format!("N{}", i), "blue")).collect();
        let graph = DrugGraph::new(false, nodes, vec![Edge::new(0, 1), Edge::new(1, 2)]).unwrap();
        let report =
            evaluate(&graph, Method::AdamicAdar, 42, &PredictionConfig::default()).unwrap();
        assert!(report.metrics.is_none());
        assert!(report.records.is_empty());
        assert!(matches!(report.warnings[0], Warning::InsufficientEdges { edge_count: 2, .. }));
    }
}
