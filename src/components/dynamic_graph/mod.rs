//! Force-directed network graph rendered as SVG.
//!
//! Renders nodes and links as an interactive SVG graph with:
//! - Physics-based layout via force simulation, pulled toward the center and
//!   clamped inside the canvas
//! - Enter/update/exit transitions when the data changes
//! - Tooltips and neighbor focus highlighting on hover and click
//! - Node dragging
//!
//! # Example
//!
//! ```ignore
//! use dynamic_graph::{DynamicGraphSvg, GraphConfig, GraphData, GraphLink, GraphNode};
//!
//! let data = GraphData {
//!     nodes: vec![GraphNode::with_id("foo"), GraphNode::with_id("bar")],
//!     links: vec![GraphLink::new("foo", "bar")],
//! };
//! let config = GraphConfig { width: 1000.0, ..GraphConfig::default() };
//!
//! view! { <DynamicGraphSvg data=Signal::derive(move || data.clone()) config=config /> }
//! ```

mod component;
pub mod config;
pub mod error;
pub mod focus;
pub mod reconcile;
pub mod render;
pub mod simulation;
mod state;
pub mod tooltip;
pub mod transition;
mod types;

pub use component::DynamicGraphSvg;
pub use config::{GraphConfig, Styling};
pub use error::{GraphError, Result};
pub use render::render_svg;
pub use state::{DynamicGraph, LinkKey, LinkView, NodeView, Pointer};
pub use tooltip::TooltipView;
pub use types::{GraphData, GraphLink, GraphNode, NodeKey};
