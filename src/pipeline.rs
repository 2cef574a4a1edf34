//! Batch stages
//!
//! Each stage reads its inputs from explicit paths, writes one JSON artifact
//! and never overwrites: an existing output makes the stage skip with a
//! warning. A missing input is fatal.

use std::path::Path;

use crate::centrality::{self, CentralityReport};
use crate::cluster::{self, ClusteringReport};
use crate::config::Config;
use crate::data::metadata::{enrich_labels, load_drug_metadata};
use crate::data::GraphSource;
use crate::diagnostics::{Diagnostics, Warning};
use crate::error::{AnalyzerError, Result};
use crate::graph::{filter_small_components, DrugGraph};
use crate::predict::{self, LinkPredictionReport};
use crate::storage;

/// Result of running one stage
#[derive(Debug)]
pub enum StageOutcome<T> {
    Completed(T),
    /// The output was already present and left untouched
    Skipped,
}

impl<T> StageOutcome<T> {
    pub fn is_skipped(&self) -> bool {
        matches!(self, StageOutcome::Skipped)
    }

    pub fn completed(self) -> Option<T> {
        match self {
            StageOutcome::Completed(value) => Some(value),
            StageOutcome::Skipped => None,
        }
    }
}

/// Turn an existing output into a recorded skip
fn guard_output(output: &Path, diagnostics: &mut Diagnostics) -> Result<bool> {
    match storage::ensure_output_absent(output) {
        Ok(()) => Ok(false),
        Err(err @ AnalyzerError::OutputAlreadyExists { .. }) => {
            diagnostics.warn(Warning::from_recoverable(err)?);
            Ok(true)
        }
        Err(err) => Err(err),
    }
}

/// Load `input` through `source`, drop small fragments, optionally attach
/// common names, and save the interchange graph to `output`
pub fn run_build(
    source: &dyn GraphSource,
    input: &Path,
    metadata: Option<&Path>,
    output: &Path,
    config: &Config,
    diagnostics: &mut Diagnostics,
) -> Result<StageOutcome<DrugGraph>> {
    if guard_output(output, diagnostics)? {
        return Ok(StageOutcome::Skipped);
    }

    let graph = source.load(input, diagnostics)?;
    let mut graph = filter_small_components(&graph, config.build.min_component_size);

    if let Some(path) = metadata {
        let names = load_drug_metadata(path)?;
        graph = enrich_labels(&graph, &names, diagnostics);
    }

    storage::save_graph(&graph, output)?;
    Ok(StageOutcome::Completed(graph))
}

pub fn run_centrality(
    graph_path: &Path,
    output: &Path,
    config: &Config,
    diagnostics: &mut Diagnostics,
) -> Result<StageOutcome<CentralityReport>> {
    if guard_output(output, diagnostics)? {
        return Ok(StageOutcome::Skipped);
    }

    let graph = storage::load_graph(graph_path)?;
    let report = centrality::analyze(&graph, &config.centrality);
    diagnostics.warnings.extend(report.warnings.iter().cloned());

    storage::save_report(&report, output)?;
    Ok(StageOutcome::Completed(report))
}

pub fn run_clustering(
    graph_path: &Path,
    output: &Path,
    config: &Config,
    diagnostics: &mut Diagnostics,
) -> Result<StageOutcome<ClusteringReport>> {
    if guard_output(output, diagnostics)? {
        return Ok(StageOutcome::Skipped);
    }

    let graph = storage::load_graph(graph_path)?;
    let report = cluster::run_all(&graph, &config.cluster);
    diagnostics.warnings.extend(report.warnings.iter().cloned());

    storage::save_report(&report, output)?;
    Ok(StageOutcome::Completed(report))
}

pub fn run_link_prediction(
    graph_path: &Path,
    output: &Path,
    config: &Config,
    diagnostics: &mut Diagnostics,
) -> Result<StageOutcome<LinkPredictionReport>> {
    if guard_output(output, diagnostics)? {
        return Ok(StageOutcome::Skipped);
    }

    let graph = storage::load_graph(graph_path)?;
    let report = predict::evaluate_all(&graph, &config.prediction)?;
    diagnostics.warnings.extend(report.warnings.iter().cloned());

    storage::save_report(&report, output)?;
    Ok(StageOutcome::Completed(report))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::InteractionTsvSource;
    use std::fs;

    #[test]
    fn build_then_skip() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("pairs.tsv");
        let output = dir.path().join("graph.json");
        fs::write(&input, "D1\tD2\nD2\tD3\nD4\tD5\n").unwrap();

        let config = Config::default();
        let source = InteractionTsvSource::new(config.build.clone());
        let mut diagnostics = Diagnostics::new();

        let graph = run_build(&source, &input, None, &output, &config, &mut diagnostics)
            .unwrap()
            .completed()
            .unwrap();
        assert_eq!(graph.node_count(), 3);
        assert!(diagnostics.is_empty());

        let again = run_build(&source, &input, None, &output, &config, &mut diagnostics).unwrap();
        assert!(again.is_skipped());
        assert!(matches!(diagnostics.warnings[0], Warning::OutputAlreadyExists { .. }));
    }

    #[test]
    fn missing_graph_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let mut diagnostics = Diagnostics::new();
        let result = run_centrality(
            &dir.path().join("absent.json"),
            &dir.path().join("centrality.json"),
            &Config::default(),
            &mut diagnostics,
        );
        assert!(matches!(result, Err(AnalyzerError::MissingSource { .. })));
    }
}
