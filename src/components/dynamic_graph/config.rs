//! Public configuration for the dynamic graph.
//!
//! [`GraphConfig`] carries the plain settings and can be embedded in the page
//! as JSON. [`Styling`] carries the per-node and per-link accessor functions,
//! which can only be set from code.

use std::fmt;
use std::rc::Rc;

use serde::Deserialize;

use super::error::{GraphError, Result};
use super::types::{GraphLink, GraphNode};

/// Default duration (milliseconds) for transitions that do not specify one.
pub const DEFAULT_TRANSITION_MS: f64 = 250.0;

/// Plain settings, all with defaults.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct GraphConfig {
	/// Canvas width in pixels.
	pub width: f64,
	/// Canvas height in pixels.
	pub height: f64,
	/// Enter/exit transition duration in milliseconds.
	pub transition_time: f64,
	/// Strength of the pull toward the canvas center.
	pub centering_force: f64,
	/// Node property that identifies a node, e.g. nodes `[{"id": "foo"}]`
	/// with links `[{"source": "foo", "target": "bar"}]`.
	pub node_ref_prop: String,
	pub unfocus_opacity: f64,
	pub focus_opacity: f64,
	pub unfocus_stroke_thickness: f64,
	pub focus_stroke_thickness: f64,
	/// Tooltip offset from the pointer, in pixels.
	pub tooltip_x_offset: f64,
	pub tooltip_y_offset: f64,
	/// Fraction of velocity lost per tick (0 = frictionless, 1 = frozen).
	pub velocity_decay: f64,
}

impl Default for GraphConfig {
	fn default() -> Self {
		Self {
			width: 600.0,
			height: 600.0,
			transition_time: 750.0,
			centering_force: 0.09,
			node_ref_prop: "id".to_string(),
			unfocus_opacity: 0.4,
			focus_opacity: 0.95,
			unfocus_stroke_thickness: 0.5,
			focus_stroke_thickness: 5.0,
			tooltip_x_offset: 16.0,
			tooltip_y_offset: 24.0,
			velocity_decay: 0.8,
		}
	}
}

impl GraphConfig {
	/// Parses a partial camelCase JSON config; missing fields take their defaults.
	pub fn from_json(json: &str) -> Result<Self> {
		let config: Self = serde_json::from_str(json)?;
		config.validate()?;
		Ok(config)
	}

	/// Checks that the canvas has a positive size and every opacity is in `[0, 1]`.
	pub fn validate(&self) -> Result<()> {
		let valid_dim = |v: f64| v.is_finite() && v > 0.0;
		if !valid_dim(self.width) || !valid_dim(self.height) {
			return Err(GraphError::InvalidDimensions {
				width: self.width,
				height: self.height,
			});
		}
		for (name, value) in [
			("unfocus_opacity", self.unfocus_opacity),
			("focus_opacity", self.focus_opacity),
		] {
			if !(0.0..=1.0).contains(&value) {
				return Err(GraphError::InvalidOpacity { name, value });
			}
		}
		Ok(())
	}

	/// Transition time in seconds.
	pub fn transition_secs(&self) -> f64 {
		self.transition_time / 1000.0
	}
}

/// Accessor returning a string for a node.
pub type NodeText = Rc<dyn Fn(&GraphNode) -> String>;
/// Accessor returning a number for a node.
pub type NodeNumber = Rc<dyn Fn(&GraphNode) -> f64>;
/// Accessor returning a string for a link.
pub type LinkText = Rc<dyn Fn(&GraphLink) -> String>;

/// Per-element accessor functions.
#[derive(Clone)]
pub struct Styling {
	pub link_color: LinkText,
	pub node_color: NodeText,
	/// Starting x position; random across the width when unset.
	pub node_start_x: Option<NodeNumber>,
	/// Starting y position; random across the height when unset.
	pub node_start_y: Option<NodeNumber>,
	pub node_radius: NodeNumber,
	/// Tooltip contents, inserted as HTML.
	pub tooltip_inner_html: NodeText,
}

impl Default for Styling {
	fn default() -> Self {
		Self {
			link_color: Rc::new(|_| "white".to_string()),
			node_color: Rc::new(|_| "skyblue".to_string()),
			node_start_x: None,
			node_start_y: None,
			node_radius: Rc::new(|_| 5.0),
			tooltip_inner_html: Rc::new(|node| match node.get("id") {
				Some(serde_json::Value::String(s)) => s.clone(),
				Some(other) => other.to_string(),
				None => String::new(),
			}),
		}
	}
}

impl fmt::Debug for Styling {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Styling")
			.field("node_start_x", &self.node_start_x.is_some())
			.field("node_start_y", &self.node_start_y.is_some())
			.finish_non_exhaustive()
	}
}
