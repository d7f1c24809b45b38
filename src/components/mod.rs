//! UI components.

pub mod dynamic_graph;
