//! Core library functions for the drug-drug interaction graph analyzer

pub mod centrality;
pub mod cluster;
pub mod config;
pub mod data;
pub mod diagnostics;
pub mod error;
pub mod graph;
pub mod pipeline;
pub mod predict;
pub mod storage;
pub mod viz;

pub use config::Config;
pub use diagnostics::{Diagnostics, Warning};
pub use error::{AnalyzerError, Result};
pub use graph::{DrugGraph, Edge, Node};
