//! Warning records collected over a run

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::error::AnalyzerError;

/// A recoverable condition met during a stage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Warning {
    MalformedRecord { line: usize, reason: String },
    SelfInteraction { line: usize, drug: String },
    OutputAlreadyExists { path: PathBuf },
    InsufficientComponentSize { component: usize, size: usize, min_size: usize },
    MissingMetadata { drugs: usize },
    SplitResampled { attempts: usize, isolated_nodes: usize },
    InsufficientNegatives { requested: usize, available: usize },
    InsufficientEdges { edge_count: usize, test_fraction: f64 },
}

impl Warning {
    /// Convert a recoverable error into a warning record.
    ///
    /// Returns the error back when it is fatal.
    pub fn from_recoverable(err: AnalyzerError) -> Result<Self, AnalyzerError> {
        match err {
            AnalyzerError::MalformedRecord { line, reason } => {
                Ok(Warning::MalformedRecord { line, reason })
            }
            AnalyzerError::OutputAlreadyExists { path } => Ok(Warning::OutputAlreadyExists { path }),
            AnalyzerError::InsufficientComponentSize { size, min_size } => {
                Ok(Warning::InsufficientComponentSize { component: 0, size, min_size })
            }
            other => Err(other),
        }
    }
}

impl std::fmt::Display for Warning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Warning::MalformedRecord { line, reason } => {
                write!(f, "Skipping malformed record on line {}: {}", line, reason)
            }
            Warning::SelfInteraction { line, drug } => {
                write!(f, "Skipping self-interaction of {} on line {}", drug, line)
            }
            Warning::OutputAlreadyExists { path } => {
                write!(f, "Output already exists at {}, skipping", path.display())
            }
            Warning::InsufficientComponentSize { component, size, min_size } => write!(
                f,
                "Skipping component {} with {} nodes (minimum {})",
                component, size, min_size
            ),
            Warning::MissingMetadata { drugs } => {
                write!(f, "No metadata entry for {} drugs, keeping their identifiers as labels", drugs)
            }
            Warning::SplitResampled { attempts, isolated_nodes } => write!(
                f,
                "Held-out split still isolates {} nodes after {} attempts",
                isolated_nodes, attempts
            ),
            Warning::InsufficientNegatives { requested, available } => write!(
                f,
                "Requested {} negative pairs but only {} non-adjacent pairs exist",
                requested, available
            ),
            Warning::InsufficientEdges { edge_count, test_fraction } => write!(
                f,
                "Cannot hold out a {} fraction of {} edges",
                test_fraction, edge_count
            ),
        }
    }
}

/// Accumulates warnings for one stage and logs each as it arrives.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Diagnostics {
    pub warnings: Vec<Warning>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn warn(&mut self, warning: Warning) {
        log::warn!("{}", warning);
        self.warnings.push(warning);
    }

    pub fn is_empty(&self) -> bool {
        self.warnings.is_empty()
    }

    pub fn len(&self) -> usize {
        self.warnings.len()
    }

    /// Move all warnings out, leaving this collector empty.
    pub fn take(&mut self) -> Vec<Warning> {
        std::mem::take(&mut self.warnings)
    }
}
