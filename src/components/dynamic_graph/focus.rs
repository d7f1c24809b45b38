//! Focus highlighting for a node and its direct neighbors.
//!
//! Each node carries two flags. `clicked` is toggled by the user and pins a
//! highlight in place; `focused` records whether the node is currently drawn
//! at focus opacity. Hovering or clicking a node recomputes its neighborhood
//! from the current links and updates node opacities and link stroke widths.

use std::collections::{HashMap, HashSet};

use super::config::GraphConfig;
use super::types::NodeKey;

/// Per-node interaction flags.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct NodeFlags {
	pub clicked: bool,
	pub focused: bool,
}

/// Opacity and stroke values used for focused/unfocused elements.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FocusStyle {
	pub focus_opacity: f64,
	pub unfocus_opacity: f64,
	pub focus_stroke: f64,
	pub unfocus_stroke: f64,
}

impl From<&GraphConfig> for FocusStyle {
	fn from(config: &GraphConfig) -> Self {
		Self {
			focus_opacity: config.focus_opacity,
			unfocus_opacity: config.unfocus_opacity,
			focus_stroke: config.focus_stroke_thickness,
			unfocus_stroke: config.unfocus_stroke_thickness,
		}
	}
}

/// Visual changes produced by a focus change.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FocusChange {
	/// New opacity for every node that was considered.
	pub node_opacity: HashMap<NodeKey, f64>,
	/// New stroke width for links, keyed by their unordered endpoint pair.
	pub link_stroke: HashMap<(NodeKey, NodeKey), f64>,
}

impl FocusChange {
	/// Stroke width for a link between `a` and `b`, if this change touched it.
	pub fn stroke_for(&self, a: &NodeKey, b: &NodeKey) -> Option<f64> {
		self.link_stroke.get(&ordered_pair(a, b)).copied()
	}
}

fn ordered_pair(a: &NodeKey, b: &NodeKey) -> (NodeKey, NodeKey) {
	if a <= b {
		(a.clone(), b.clone())
	} else {
		(b.clone(), a.clone())
	}
}

/// The center node plus every node sharing a link with it.
pub fn neighbors<'a>(
	center: &NodeKey,
	links: impl IntoIterator<Item = (&'a NodeKey, &'a NodeKey)>,
) -> HashSet<NodeKey> {
	let mut set = HashSet::from([center.clone()]);
	for (src, tgt) in links {
		if src == center {
			set.insert(tgt.clone());
		} else if tgt == center {
			set.insert(src.clone());
		}
	}
	set
}

/// Tracks interaction flags for all rendered nodes.
#[derive(Clone, Debug, Default)]
pub struct FocusState {
	flags: HashMap<NodeKey, NodeFlags>,
}

impl FocusState {
	pub fn flags(&self, key: &NodeKey) -> NodeFlags {
		self.flags.get(key).copied().unwrap_or_default()
	}

	pub fn is_clicked(&self, key: &NodeKey) -> bool {
		self.flags(key).clicked
	}

	/// Drops flags for nodes that are no longer rendered.
	pub fn retain(&mut self, keep: impl Fn(&NodeKey) -> bool) {
		self.flags.retain(|k, _| keep(k));
	}

	/// Toggles the clicked flag and returns its new value.
	pub fn toggle_clicked(&mut self, key: &NodeKey) -> bool {
		let flags = self.flags.entry(key.clone()).or_default();
		flags.clicked = !flags.clicked;
		flags.clicked
	}

	/// Focuses or unfocuses `center` and its neighbors.
	///
	/// `links` are the current link endpoints and `nodes` every rendered node.
	/// Nodes that are clicked, or that stay focused through another clicked
	/// node, keep their highlight when a neighbor is unfocused.
	pub fn change_focus<'a>(
		&mut self,
		center: &NodeKey,
		in_focus: bool,
		links: &[(&'a NodeKey, &'a NodeKey)],
		nodes: impl IntoIterator<Item = &'a NodeKey>,
		style: &FocusStyle,
	) -> FocusChange {
		let stroke = if in_focus {
			style.focus_stroke
		} else {
			style.unfocus_stroke
		};
		let hood = neighbors(center, links.iter().copied());

		let mut change = FocusChange::default();
		for &(src, tgt) in links {
			if src == center || tgt == center {
				change.link_stroke.insert(ordered_pair(src, tgt), stroke);
			}
		}

		for key in nodes {
			let flags = self.flags.entry(key.clone()).or_default();
			let in_hood = hood.contains(key);
			let opacity = if in_focus {
				if in_hood || flags.clicked || flags.focused {
					flags.focused = true;
					style.focus_opacity
				} else {
					status_quo(flags, style)
				}
			} else if in_hood && !flags.clicked {
				flags.focused = false;
				style.unfocus_opacity
			} else {
				status_quo(flags, style)
			};
			change.node_opacity.insert(key.clone(), opacity);
		}

		change
	}
}

fn status_quo(flags: &NodeFlags, style: &FocusStyle) -> f64 {
	if flags.focused {
		style.focus_opacity
	} else {
		style.unfocus_opacity
	}
}
