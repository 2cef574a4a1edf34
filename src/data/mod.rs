//! Graph sources and auxiliary datasets

pub mod metadata;
pub mod tsv;

use std::path::Path;

use crate::config::BuildConfig;
use crate::diagnostics::Diagnostics;
use crate::error::Result;
use crate::graph::{build_graph, DrugGraph};
use crate::storage;

/// A dataset kind that can produce a graph from a file
pub trait GraphSource {
    fn load(&self, path: &Path, diagnostics: &mut Diagnostics) -> Result<DrugGraph>;
}

/// Builds a graph from raw tab-separated interaction pairs
pub struct InteractionTsvSource {
    config: BuildConfig,
}

impl InteractionTsvSource {
    pub fn new(config: BuildConfig) -> Self {
        Self { config }
    }
}

impl GraphSource for InteractionTsvSource {
    fn load(&self, path: &Path, diagnostics: &mut Diagnostics) -> Result<DrugGraph> {
        let records = tsv::read_interactions(path)?;
        build_graph(records, &self.config, diagnostics)
    }
}

/// Reads a graph already stored in the JSON interchange format
#[derive(Default)]
pub struct JsonGraphSource;

impl GraphSource for JsonGraphSource {
    fn load(&self, path: &Path, _diagnostics: &mut Diagnostics) -> Result<DrugGraph> {
        storage::load_graph(path)
    }
}
