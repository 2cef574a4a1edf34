//! Graph representation, construction and component filtering

pub mod algorithms;
pub mod builder;
pub mod components;
pub mod compressed;
pub mod model;

pub use builder::{build_graph, GraphBuilder, RawRecord};
pub use components::{connected_components, filter_small_components};
pub use model::{DrugGraph, Edge, Node};
