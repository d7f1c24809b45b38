//! Renderer state: data join, interaction handling and per-frame views.
//!
//! [`DynamicGraph`] owns the physics simulation and one element record per
//! rendered node and link. It has no DOM dependency; the Leptos component
//! feeds it events and draws whatever [`DynamicGraph::node_views`] and
//! [`DynamicGraph::link_views`] return.

use std::collections::{HashMap, HashSet};
use std::fmt;
use std::rc::Rc;

use log::debug;

use super::config::{DEFAULT_TRANSITION_MS, GraphConfig, Styling};
use super::error::{GraphError, Result};
use super::focus::{FocusState, FocusStyle};
use super::reconcile::{Phase, join};
use super::simulation::{DRAG_ALPHA_TARGET, Placement, Simulation};
use super::tooltip::{Tooltip, TooltipView};
use super::transition::Tween;
use super::types::{GraphLink, GraphNode, NodeKey};

/// Identity of a rendered link: its endpoints plus an occurrence counter so
/// parallel links stay distinct.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LinkKey {
	pub source: NodeKey,
	pub target: NodeKey,
	pub nth: usize,
}

impl LinkKey {
	/// CSS classes of the line element, e.g. `link link-a link-b`.
	pub fn class(&self) -> String {
		format!("link link-{} link-{}", self.source, self.target)
	}
}

impl fmt::Display for LinkKey {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}->{}#{}", self.source, self.target, self.nth)
	}
}

/// Pointer location in canvas coordinates plus page coordinates for the
/// tooltip.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Pointer {
	pub x: f64,
	pub y: f64,
	pub page_x: f64,
	pub page_y: f64,
}

impl Pointer {
	/// A pointer whose canvas and page coordinates coincide.
	pub fn at(x: f64, y: f64) -> Self {
		Self {
			x,
			y,
			page_x: x,
			page_y: y,
		}
	}
}

/// Renderable snapshot of a node circle.
#[derive(Clone, Debug, PartialEq)]
pub struct NodeView {
	pub key: NodeKey,
	pub cx: f64,
	pub cy: f64,
	pub r: f64,
	pub fill: String,
	pub opacity: f64,
	pub exiting: bool,
}

/// Renderable snapshot of a link line.
#[derive(Clone, Debug, PartialEq)]
pub struct LinkView {
	pub key: LinkKey,
	pub x1: f64,
	pub y1: f64,
	pub x2: f64,
	pub y2: f64,
	pub stroke: String,
	pub stroke_width: f64,
	pub stroke_opacity: f64,
	pub exiting: bool,
}

#[derive(Clone, Debug)]
struct NodeElement {
	key: NodeKey,
	node: GraphNode,
	/// Fill is fixed when the element enters.
	fill: String,
	radius: Tween,
	opacity: f64,
	pos: (f64, f64),
	phase: Phase,
}

#[derive(Clone, Debug)]
struct LinkElement {
	key: LinkKey,
	link: GraphLink,
	stroke: String,
	stroke_width: f64,
	stroke_opacity: Tween,
	ends: (f64, f64, f64, f64),
	phase: Phase,
}

type RandomSource = Box<dyn FnMut() -> f64>;

#[cfg(target_arch = "wasm32")]
fn default_random() -> RandomSource {
	Box::new(js_sys::Math::random)
}

#[cfg(not(target_arch = "wasm32"))]
fn default_random() -> RandomSource {
	let mut seed: f64 = 0.0;
	Box::new(move || {
		seed += 1.0;
		let x = (seed * 12.9898 + seed * 78.233).sin() * 43758.5453;
		x - x.floor()
	})
}

/// A force-directed graph bound to its current nodes and links.
pub struct DynamicGraph {
	config: GraphConfig,
	styling: Styling,
	focus_style: FocusStyle,
	simulation: Simulation,
	nodes: Vec<NodeElement>,
	links: Vec<LinkElement>,
	focus: FocusState,
	tooltip: Tooltip,
	/// Node whose tooltip was last shown.
	tooltip_owner: Option<NodeKey>,
	dragging: Option<NodeKey>,
	random: RandomSource,
	now: f64,
}

impl DynamicGraph {
	/// Creates an empty graph with default styling.
	///
	/// Fails if `config` has a non-positive size or an opacity outside `[0, 1]`.
	pub fn new(config: GraphConfig) -> Result<Self> {
		config.validate()?;
		Ok(Self {
			styling: Styling::default(),
			focus_style: FocusStyle::from(&config),
			simulation: Simulation::new(&config),
			nodes: Vec::new(),
			links: Vec::new(),
			focus: FocusState::default(),
			tooltip: Tooltip::new(config.tooltip_x_offset, config.tooltip_y_offset),
			tooltip_owner: None,
			dragging: None,
			random: default_random(),
			now: 0.0,
			config,
		})
	}

	/// Replaces all accessors at once.
	pub fn with_styling(mut self, styling: Styling) -> Self {
		self.styling = styling;
		self.refresh_radii();
		self
	}

	/// Replaces the source of uniform random numbers in `[0, 1)` used for
	/// starting positions.
	pub fn with_random(mut self, random: impl FnMut() -> f64 + 'static) -> Self {
		self.random = Box::new(random);
		self
	}

	/// Settings the graph was created with.
	pub fn config(&self) -> &GraphConfig {
		&self.config
	}

	/// Sets node fills; applies to nodes entering from the next update on.
	pub fn set_node_color(&mut self, f: impl Fn(&GraphNode) -> String + 'static) -> &mut Self {
		self.styling.node_color = Rc::new(f);
		self
	}

	/// Sets link strokes; applies to links entering from the next update on.
	pub fn set_link_color(&mut self, f: impl Fn(&GraphLink) -> String + 'static) -> &mut Self {
		self.styling.link_color = Rc::new(f);
		self
	}

	/// Sets the tooltip contents, shown as HTML.
	pub fn set_tooltip_inner_html(
		&mut self,
		f: impl Fn(&GraphNode) -> String + 'static,
	) -> &mut Self {
		self.styling.tooltip_inner_html = Rc::new(f);
		self
	}

	/// Sets node radii. Canvas clamping uses the new radius right away; drawn
	/// circles pick it up when they next enter.
	pub fn set_node_radius(&mut self, f: impl Fn(&GraphNode) -> f64 + 'static) -> &mut Self {
		self.styling.node_radius = Rc::new(f);
		self.refresh_radii();
		self
	}

	/// Sets where entering nodes are placed. Unset axes start at a random
	/// point on the canvas.
	pub fn set_node_start_x(&mut self, f: impl Fn(&GraphNode) -> f64 + 'static) -> &mut Self {
		self.styling.node_start_x = Some(Rc::new(f));
		self
	}

	/// See [`DynamicGraph::set_node_start_x`].
	pub fn set_node_start_y(&mut self, f: impl Fn(&GraphNode) -> f64 + 'static) -> &mut Self {
		self.styling.node_start_y = Some(Rc::new(f));
		self
	}

	fn refresh_radii(&mut self) {
		for el in self.nodes.iter().filter(|el| !el.phase.is_exiting()) {
			let radius = (self.styling.node_radius)(&el.node);
			self.simulation.set_radius(&el.key, radius);
		}
	}

	/// The force layout driving node positions.
	pub fn simulation(&self) -> &Simulation {
		&self.simulation
	}

	/// (Re)starts the layout with the given nodes and links.
	///
	/// Every link endpoint must name a node in `nodes`. On error nothing is
	/// changed.
	pub fn update_vis(&mut self, nodes: Vec<GraphNode>, links: Vec<GraphLink>) -> Result<()> {
		let prop = self.config.node_ref_prop.clone();

		let mut node_keys = Vec::with_capacity(nodes.len());
		let mut key_set = HashSet::with_capacity(nodes.len());
		for (index, node) in nodes.iter().enumerate() {
			let key = node.key(&prop).ok_or_else(|| GraphError::MissingNodeKey {
				index,
				prop: prop.clone(),
			})?;
			if !key_set.insert(key.clone()) {
				return Err(GraphError::DuplicateNode(key));
			}
			node_keys.push(key);
		}

		let mut link_keys = Vec::with_capacity(links.len());
		let mut pair_counts: HashMap<(NodeKey, NodeKey), usize> = HashMap::new();
		for (index, link) in links.iter().enumerate() {
			let resolve = |value: &serde_json::Value| {
				NodeKey::from_value(value)
					.filter(|k| key_set.contains(k))
					.ok_or_else(|| GraphError::UnresolvedLink {
						index,
						endpoint: value.to_string(),
					})
			};
			let source = resolve(&link.source)?;
			let target = resolve(&link.target)?;
			let nth = pair_counts
				.entry((source.clone(), target.clone()))
				.or_insert(0);
			link_keys.push(LinkKey {
				source,
				target,
				nth: *nth,
			});
			*nth += 1;
		}

		self.simulation.stop();
		self.join_nodes(nodes, node_keys);
		self.join_links(links, link_keys);

		let placements: Vec<Placement> = self
			.nodes
			.iter()
			.filter(|el| !el.phase.is_exiting())
			.map(|el| Placement {
				key: el.key.clone(),
				x: el.pos.0,
				y: el.pos.1,
				radius: (self.styling.node_radius)(&el.node),
			})
			.collect();
		let edges: Vec<(NodeKey, NodeKey)> = self
			.links
			.iter()
			.filter(|el| !el.phase.is_exiting())
			.map(|el| (el.key.source.clone(), el.key.target.clone()))
			.collect();
		self.simulation.rebuild(&placements, &edges);
		let nudged = self.simulation.separate_coincident(&mut self.random);

		let present: HashSet<&NodeKey> = placements.iter().map(|p| &p.key).collect();
		self.focus.retain(|k| present.contains(k));
		if self
			.tooltip_owner
			.as_ref()
			.is_some_and(|k| !present.contains(k))
		{
			self.tooltip_owner = None;
			self.tooltip.hide(self.now);
		}
		if self.dragging.as_ref().is_some_and(|k| !present.contains(k)) {
			self.dragging = None;
			self.simulation.set_alpha_target(0.0);
		}

		self.simulation.set_alpha(1.0);
		self.simulation.restart();

		debug!(
			"dynamic-graph: updated to {} nodes, {} links ({} nudged apart)",
			placements.len(),
			edges.len(),
			nudged
		);
		Ok(())
	}

	fn join_nodes(&mut self, nodes: Vec<GraphNode>, keys: Vec<NodeKey>) {
		let now = self.now;
		let secs = self.config.transition_secs();
		let unfocus = self.config.unfocus_opacity;
		let existing: Vec<NodeKey> = self.nodes.iter().map(|el| el.key.clone()).collect();
		let joined = join(&existing, &keys);
		let mut records: HashMap<NodeKey, GraphNode> = keys.into_iter().zip(nodes).collect();

		for key in &joined.exit {
			if let Some(el) = self.nodes.iter_mut().find(|el| &el.key == key) {
				if !el.phase.is_exiting() {
					el.radius = el.radius.retarget(0.0, now, secs);
					el.phase = Phase::Exiting { until: now + secs };
				}
			}
		}

		for key in &joined.update {
			let Some(node) = records.remove(key) else {
				continue;
			};
			let radius = (self.styling.node_radius)(&node);
			if let Some(el) = self.nodes.iter_mut().find(|el| &el.key == key) {
				if el.phase.is_exiting() {
					// Focus flags were dropped when the node left.
					el.radius = el.radius.retarget(radius, now, secs);
					el.opacity = unfocus;
					el.phase = Phase::Present;
				}
				el.node = node;
			}
		}

		for key in joined.enter {
			let Some(node) = records.remove(&key) else {
				continue;
			};
			let radius = (self.styling.node_radius)(&node);
			let x = match &self.styling.node_start_x {
				Some(f) => f(&node),
				None => (self.random)() * self.config.width,
			};
			let y = match &self.styling.node_start_y {
				Some(f) => f(&node),
				None => (self.random)() * self.config.height,
			};
			self.nodes.push(NodeElement {
				fill: (self.styling.node_color)(&node),
				radius: Tween::new(0.0, radius, now, secs),
				opacity: self.config.unfocus_opacity,
				pos: (x, y),
				phase: Phase::Present,
				key,
				node,
			});
		}
	}

	fn join_links(&mut self, links: Vec<GraphLink>, keys: Vec<LinkKey>) {
		let now = self.now;
		let secs = self.config.transition_secs();
		let enter_secs = DEFAULT_TRANSITION_MS / 1000.0;
		let unfocus = self.config.unfocus_stroke_thickness;
		let existing: Vec<LinkKey> = self.links.iter().map(|el| el.key.clone()).collect();
		let joined = join(&existing, &keys);
		let mut records: HashMap<LinkKey, GraphLink> = keys.into_iter().zip(links).collect();

		for key in &joined.exit {
			if let Some(el) = self.links.iter_mut().find(|el| &el.key == key) {
				if !el.phase.is_exiting() {
					el.stroke_opacity = el.stroke_opacity.retarget(0.0, now, secs);
					el.phase = Phase::Exiting { until: now + secs };
				}
			}
		}

		for key in &joined.update {
			let Some(link) = records.remove(key) else {
				continue;
			};
			if let Some(el) = self.links.iter_mut().find(|el| &el.key == key) {
				if el.phase.is_exiting() {
					el.stroke_opacity = el.stroke_opacity.retarget(1.0, now, enter_secs);
					el.stroke_width = unfocus;
					el.phase = Phase::Present;
				}
				el.link = link;
			}
		}

		let positions: HashMap<&NodeKey, (f64, f64)> =
			self.nodes.iter().map(|el| (&el.key, el.pos)).collect();
		let mut entered = Vec::with_capacity(joined.enter.len());
		for key in joined.enter {
			let Some(link) = records.remove(&key) else {
				continue;
			};
			let (x1, y1) = positions.get(&key.source).copied().unwrap_or_default();
			let (x2, y2) = positions.get(&key.target).copied().unwrap_or_default();
			entered.push(LinkElement {
				stroke: (self.styling.link_color)(&link),
				stroke_width: self.config.unfocus_stroke_thickness,
				stroke_opacity: Tween::new(0.0, 1.0, now, enter_secs),
				ends: (x1, y1, x2, y2),
				phase: Phase::Present,
				key,
				link,
			});
		}
		self.links.extend(entered);
	}

	/// Advances the animation clock, the simulation and all transitions.
	pub fn tick(&mut self, dt: f64) {
		self.now += dt;
		let now = self.now;

		if self.simulation.tick(dt as f32) {
			let positions = self.simulation.positions();
			for el in &mut self.nodes {
				if let Some(&pos) = positions.get(&el.key) {
					el.pos = pos;
				}
			}
		}

		self.nodes.retain(|el| match el.phase {
			Phase::Exiting { until } => now < until,
			Phase::Present => true,
		});
		self.links.retain(|el| match el.phase {
			Phase::Exiting { until } => now < until,
			Phase::Present => true,
		});

		let positions: HashMap<&NodeKey, (f64, f64)> =
			self.nodes.iter().map(|el| (&el.key, el.pos)).collect();
		for el in &mut self.links {
			if let (Some(&(x1, y1)), Some(&(x2, y2))) =
				(positions.get(&el.key.source), positions.get(&el.key.target))
			{
				el.ends = (x1, y1, x2, y2);
			}
		}
	}

	/// True while the layout moves or any transition is still running.
	pub fn is_animating(&self) -> bool {
		let now = self.now;
		self.simulation.is_running()
			|| self.nodes.iter().any(|el| !el.radius.is_done(now))
			|| self.links.iter().any(|el| !el.stroke_opacity.is_done(now))
			|| self.nodes.iter().any(|el| el.phase.is_exiting())
	}

	fn node(&self, key: &NodeKey) -> Option<&GraphNode> {
		self.nodes
			.iter()
			.find(|el| &el.key == key && !el.phase.is_exiting())
			.map(|el| &el.node)
	}

	/// Shows the tooltip and highlights the node and its neighbors.
	pub fn mouse_over(&mut self, key: &NodeKey, pointer: Pointer) {
		let Some(node) = self.node(key) else {
			return;
		};
		let html = (self.styling.tooltip_inner_html)(node);
		self.tooltip.show(html, pointer.page_x, pointer.page_y, self.now);
		self.tooltip_owner = Some(key.clone());
		self.change_focus(key, true);
	}

	/// Clears the highlight unless the node was clicked.
	pub fn mouse_out(&mut self, key: &NodeKey) {
		if self.node(key).is_none() || self.focus.is_clicked(key) {
			return;
		}
		self.tooltip.hide(self.now);
		self.change_focus(key, false);
	}

	/// Toggles the clicked flag; unclicking clears the highlight.
	pub fn click(&mut self, key: &NodeKey) {
		if self.node(key).is_none() {
			return;
		}
		if !self.focus.toggle_clicked(key) {
			self.tooltip.hide(self.now);
			self.change_focus(key, false);
		}
	}

	/// True while the node's highlight is pinned by a click.
	pub fn is_clicked(&self, key: &NodeKey) -> bool {
		self.focus.is_clicked(key)
	}

	/// True while the node is drawn at focus opacity.
	pub fn is_focused(&self, key: &NodeKey) -> bool {
		self.focus.flags(key).focused
	}

	fn change_focus(&mut self, center: &NodeKey, in_focus: bool) {
		let endpoints: Vec<(&NodeKey, &NodeKey)> = self
			.links
			.iter()
			.filter(|el| !el.phase.is_exiting())
			.map(|el| (&el.key.source, &el.key.target))
			.collect();
		let change = self.focus.change_focus(
			center,
			in_focus,
			&endpoints,
			self.nodes.iter().map(|el| &el.key),
			&self.focus_style,
		);

		for el in &mut self.nodes {
			if let Some(&opacity) = change.node_opacity.get(&el.key) {
				el.opacity = opacity;
			}
		}
		for el in &mut self.links {
			if let Some(width) = change.stroke_for(&el.key.source, &el.key.target) {
				el.stroke_width = width;
			}
		}
	}

	/// Pins the node under the pointer and reheats the layout.
	pub fn drag_start(&mut self, key: &NodeKey) {
		let Some(pos) = self.simulation.position(key) else {
			return;
		};
		if self.dragging.is_none() {
			self.simulation.set_alpha_target(DRAG_ALPHA_TARGET);
			self.simulation.restart();
		}
		self.simulation.fix(key, pos.0, pos.1);
		self.dragging = Some(key.clone());
	}

	/// Moves the dragged node and the tooltip with the pointer.
	pub fn drag(&mut self, key: &NodeKey, pointer: Pointer) {
		if self.dragging.as_ref() != Some(key) {
			return;
		}
		self.tooltip.move_to(pointer.page_x, pointer.page_y);
		self.simulation.fix(key, pointer.x, pointer.y);
	}

	/// Releases the dragged node and lets the layout cool down.
	pub fn drag_end(&mut self, key: &NodeKey) {
		if self.dragging.as_ref() != Some(key) {
			return;
		}
		self.dragging = None;
		self.simulation.set_alpha_target(0.0);
		self.simulation.release(key);
	}

	/// The node currently being dragged.
	pub fn dragging(&self) -> Option<&NodeKey> {
		self.dragging.as_ref()
	}

	/// Node circles in drawing order, exiting ones included.
	pub fn node_views(&self) -> Vec<NodeView> {
		let now = self.now;
		self.nodes
			.iter()
			.map(|el| NodeView {
				key: el.key.clone(),
				cx: el.pos.0,
				cy: el.pos.1,
				r: el.radius.value_at(now),
				fill: el.fill.clone(),
				opacity: el.opacity,
				exiting: el.phase.is_exiting(),
			})
			.collect()
	}

	/// Link lines in drawing order, exiting ones included.
	pub fn link_views(&self) -> Vec<LinkView> {
		let now = self.now;
		self.links
			.iter()
			.map(|el| LinkView {
				key: el.key.clone(),
				x1: el.ends.0,
				y1: el.ends.1,
				x2: el.ends.2,
				y2: el.ends.3,
				stroke: el.stroke.clone(),
				stroke_width: el.stroke_width,
				stroke_opacity: el.stroke_opacity.value_at(now),
				exiting: el.phase.is_exiting(),
			})
			.collect()
	}

	/// Tooltip contents, placement and opacity for the current frame.
	pub fn tooltip_view(&self) -> TooltipView {
		self.tooltip.view(self.now)
	}
}
