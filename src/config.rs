//! Configuration management for the DDI graph analyzer

use serde::{Deserialize, Serialize};

use crate::cluster::Algorithm;
use crate::error::{AnalyzerError, Result};
use crate::predict::Method;

/// How repeated interaction pairs contribute to edge weight
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DuplicatePolicy {
    /// Keep a single edge of weight 1
    #[default]
    Collapse,
    /// Increment the edge weight for each repeat
    Accumulate,
}

/// Settings for graph construction and fragment filtering
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BuildConfig {
    /// Minimum component size kept by the filter
    pub min_component_size: usize,

    /// Treat raw pairs as directed interactions
    pub directed: bool,

    /// Weighting of repeated pairs
    pub duplicate_policy: DuplicatePolicy,
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            min_component_size: 3,
            directed: false,
            duplicate_policy: DuplicatePolicy::Collapse,
        }
    }
}

/// Settings for the centrality analyzer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CentralityConfig {
    /// Number of top nodes reported per measure
    pub top_k: usize,

    /// Components smaller than this are skipped
    pub min_component_size: usize,

    /// Weights of degree, closeness, betweenness and clustering in the
    /// combined ranking
    pub combination_weights: [f64; 4],
}

impl Default for CentralityConfig {
    fn default() -> Self {
        Self {
            top_k: 5,
            min_component_size: 3,
            combination_weights: [1.0, 1.5, 2.0, 1.0],
        }
    }
}

/// Settings for community detection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClusterConfig {
    pub algorithms: Vec<Algorithm>,

    /// Components smaller than this are left unassigned
    pub min_component_size: usize,

    /// Number of communities Girvan-Newman splits each component into
    pub girvan_newman_communities: usize,

    pub label_propagation_max_iterations: usize,

    /// Number of clusters requested from spectral clustering
    pub spectral_clusters: usize,

    /// Seed for k-means initialisation
    pub seed: u64,
}

impl Default for ClusterConfig {
    fn default() -> Self {
        Self {
            algorithms: Algorithm::ALL.to_vec(),
            min_component_size: 3,
            girvan_newman_communities: 2,
            label_propagation_max_iterations: 100,
            spectral_clusters: 5,
            seed: 42,
        }
    }
}

/// Settings for link prediction evaluation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionConfig {
    pub methods: Vec<Method>,

    /// Fraction of edges held out as positives
    pub test_fraction: f64,

    pub seed: u64,

    /// Cut-offs for precision@k
    pub precision_at: Vec<usize>,

    /// Attempts at drawing a split that isolates no node
    pub max_resample_attempts: usize,
}

impl Default for PredictionConfig {
    fn default() -> Self {
        Self {
            methods: Method::ALL.to_vec(),
            test_fraction: 0.1,
            seed: 42,
            precision_at: vec![10, 50, 100],
            max_resample_attempts: 10,
        }
    }
}

impl PredictionConfig {
    pub fn validate(&self) -> Result<()> {
        if !(self.test_fraction > 0.0 && self.test_fraction < 1.0) {
            return Err(AnalyzerError::Config(format!(
                "test fraction must lie in (0, 1), got {}",
                self.test_fraction
            )));
        }
        if self.max_resample_attempts == 0 {
            return Err(AnalyzerError::Config("resample attempts must be positive".into()));
        }
        Ok(())
    }
}

/// Complete configuration passed into each stage
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    pub build: BuildConfig,
    pub centrality: CentralityConfig,
    pub cluster: ClusterConfig,
    pub prediction: PredictionConfig,
}

impl Config {
    /// Create a configuration sharing one component threshold and seed
    pub fn new(min_component_size: usize, seed: u64) -> Self {
        let mut config = Self::default();
        config.build.min_component_size = min_component_size;
        config.centrality.min_component_size = min_component_size;
        config.cluster.min_component_size = min_component_size;
        config.cluster.seed = seed;
        config.prediction.seed = seed;
        config
    }

    /// Reject values no stage can work with
    pub fn validate(&self) -> Result<()> {
        self.prediction.validate()?;
        if self.cluster.spectral_clusters == 0 {
            return Err(AnalyzerError::Config("spectral clusters must be positive".into()));
        }
        if self.cluster.girvan_newman_communities < 2 {
            return Err(AnalyzerError::Config(
                "Girvan-Newman needs at least 2 target communities".into(),
            ));
        }
        Ok(())
    }
}
