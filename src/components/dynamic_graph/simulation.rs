//! Force layout wrapper around the `force_graph` physics simulation.
//!
//! The engine supplies many-body repulsion and link springs. This wrapper
//! adds a pull toward the canvas center, alpha cooling so the layout comes to
//! rest, drag pinning, and clamping of every node inside the canvas.

use std::collections::{HashMap, HashSet};

use force_graph::{DefaultNodeIdx, EdgeData, ForceGraph, NodeData, SimulationParameters};

use super::config::GraphConfig;
use super::types::NodeKey;

/// Alpha below which the simulation stops.
pub const ALPHA_MIN: f64 = 0.001;
/// Alpha target while a node is being dragged.
pub const DRAG_ALPHA_TARGET: f64 = 0.3;
/// Spread of the nudge given to nodes sharing a position. Positions are
/// `f32`, so this must stay above their resolution at canvas scale.
const JIGGLE: f64 = 1e-3;

fn jiggle(random: &mut impl FnMut() -> f64) -> f32 {
	((random() - 0.5) * JIGGLE) as f32
}

/// Per-node data attached to each simulation node.
#[derive(Clone, Debug)]
pub struct SimNode {
	pub key: NodeKey,
	/// Radius used to keep the node inside the canvas.
	pub radius: f64,
}

/// A node to place in a rebuilt simulation.
#[derive(Clone, Debug)]
pub struct Placement {
	pub key: NodeKey,
	pub x: f64,
	pub y: f64,
	pub radius: f64,
}

/// Physics state for the current node and link set.
pub struct Simulation {
	graph: ForceGraph<SimNode, ()>,
	index: HashMap<NodeKey, DefaultNodeIdx>,
	pinned: HashSet<NodeKey>,
	width: f64,
	height: f64,
	centering: f64,
	damping: f32,
	alpha: f64,
	alpha_decay: f64,
	alpha_target: f64,
	running: bool,
}

fn parameters(damping: f32) -> SimulationParameters {
	SimulationParameters {
		force_charge: 150.0,
		force_spring: 0.05,
		force_max: 100.0,
		node_speed: 3000.0,
		damping_factor: damping,
	}
}

impl Simulation {
	/// Creates an empty, stopped simulation sized to the canvas.
	pub fn new(config: &GraphConfig) -> Self {
		let damping = (1.0 - config.velocity_decay).clamp(0.0, 1.0) as f32;
		Self {
			graph: ForceGraph::new(parameters(damping)),
			index: HashMap::new(),
			pinned: HashSet::new(),
			width: config.width,
			height: config.height,
			centering: config.centering_force,
			damping,
			alpha: 1.0,
			// Cools from 1 to ALPHA_MIN in about 300 ticks.
			alpha_decay: 1.0 - ALPHA_MIN.powf(1.0 / 300.0),
			alpha_target: 0.0,
			running: false,
		}
	}

	/// Replaces all nodes and links. Links whose endpoints are not placed are
	/// skipped. Pins survive for nodes that are still present.
	pub fn rebuild(&mut self, nodes: &[Placement], links: &[(NodeKey, NodeKey)]) {
		let mut graph = ForceGraph::new(parameters(self.damping));
		let mut index = HashMap::with_capacity(nodes.len());

		for placement in nodes {
			let idx = graph.add_node(NodeData {
				x: placement.x as f32,
				y: placement.y as f32,
				mass: 10.0,
				is_anchor: self.pinned.contains(&placement.key),
				user_data: SimNode {
					key: placement.key.clone(),
					radius: placement.radius,
				},
			});
			index.insert(placement.key.clone(), idx);
		}

		for (src, tgt) in links {
			if let (Some(&s), Some(&t)) = (index.get(src), index.get(tgt)) {
				graph.add_edge(s, t, EdgeData::default());
			}
		}

		self.pinned.retain(|key| index.contains_key(key));
		self.graph = graph;
		self.index = index;
	}

	/// Nudges free nodes that share their position with another node.
	///
	/// The engine exerts no force between coincident nodes, so without this
	/// they would never separate. Returns the number of nodes moved.
	pub fn separate_coincident(&mut self, mut random: impl FnMut() -> f64) -> usize {
		let mut occupied: HashMap<(u32, u32), usize> = HashMap::new();
		self.graph.visit_nodes(|node| {
			*occupied
				.entry((node.x().to_bits(), node.y().to_bits()))
				.or_default() += 1;
		});

		let mut moved = 0;
		self.graph.visit_nodes_mut(|node| {
			let at = (node.data.x.to_bits(), node.data.y.to_bits());
			if node.data.is_anchor || occupied.get(&at).copied().unwrap_or(0) < 2 {
				return;
			}
			node.data.x += jiggle(&mut random);
			node.data.y += jiggle(&mut random);
			moved += 1;
		});
		moved
	}

	/// Number of nodes in the layout.
	pub fn len(&self) -> usize {
		self.index.len()
	}

	pub fn is_empty(&self) -> bool {
		self.index.is_empty()
	}

	pub fn contains(&self, key: &NodeKey) -> bool {
		self.index.contains_key(key)
	}

	/// Current heat; forces and the centering pull scale with it.
	pub fn alpha(&self) -> f64 {
		self.alpha
	}

	pub fn set_alpha(&mut self, alpha: f64) {
		self.alpha = alpha;
	}

	/// Value alpha decays toward.
	pub fn alpha_target(&self) -> f64 {
		self.alpha_target
	}

	pub fn set_alpha_target(&mut self, target: f64) {
		self.alpha_target = target;
	}

	pub fn is_running(&self) -> bool {
		self.running
	}

	/// Resumes ticking without touching alpha.
	pub fn restart(&mut self) {
		self.running = true;
	}

	pub fn stop(&mut self) {
		self.running = false;
	}

	/// Advances one step. Returns false when the simulation is at rest.
	pub fn tick(&mut self, dt: f32) -> bool {
		if !self.running {
			return false;
		}

		self.alpha += (self.alpha_target - self.alpha) * self.alpha_decay;
		self.graph.update(dt);

		let (cx, cy) = (self.width / 2.0, self.height / 2.0);
		let pull = self.centering * self.alpha;
		self.graph.visit_nodes_mut(|node| {
			if !node.data.is_anchor {
				node.data.x += ((cx - node.data.x as f64) * pull) as f32;
				node.data.y += ((cy - node.data.y as f64) * pull) as f32;
			}
		});
		self.clamp_to_bounds();

		if self.alpha < ALPHA_MIN {
			self.running = false;
		}
		true
	}

	/// Keeps every node at least its radius away from the canvas edges.
	fn clamp_to_bounds(&mut self) {
		let (w, h) = (self.width, self.height);
		self.graph.visit_nodes_mut(|node| {
			let r = node.data.user_data.radius;
			node.data.x = clamp_edge(node.data.x as f64, r, w) as f32;
			node.data.y = clamp_edge(node.data.y as f64, r, h) as f32;
		});
	}

	/// Updates the radius used for clamping.
	pub fn set_radius(&mut self, key: &NodeKey, radius: f64) {
		self.with_node(key, |data| data.user_data.radius = radius);
	}

	/// Pins a node at the given position.
	pub fn fix(&mut self, key: &NodeKey, x: f64, y: f64) {
		if self.with_node(key, |data| {
			data.x = x as f32;
			data.y = y as f32;
			data.is_anchor = true;
		}) {
			self.pinned.insert(key.clone());
		}
	}

	/// Lets a pinned node move freely again.
	pub fn release(&mut self, key: &NodeKey) {
		self.with_node(key, |data| data.is_anchor = false);
		self.pinned.remove(key);
	}

	pub fn is_pinned(&self, key: &NodeKey) -> bool {
		self.pinned.contains(key)
	}

	fn with_node(&mut self, key: &NodeKey, mut f: impl FnMut(&mut NodeData<SimNode>)) -> bool {
		let Some(&idx) = self.index.get(key) else {
			return false;
		};
		self.graph.visit_nodes_mut(|node| {
			if node.index() == idx {
				f(&mut node.data);
			}
		});
		true
	}

	/// Current position of a node.
	pub fn position(&self, key: &NodeKey) -> Option<(f64, f64)> {
		let idx = *self.index.get(key)?;
		let mut found = None;
		self.graph.visit_nodes(|node| {
			if node.index() == idx {
				found = Some((node.x() as f64, node.y() as f64));
			}
		});
		found
	}

	pub fn positions(&self) -> HashMap<NodeKey, (f64, f64)> {
		let mut out = HashMap::with_capacity(self.index.len());
		self.graph.visit_nodes(|node| {
			out.insert(
				node.data.user_data.key.clone(),
				(node.x() as f64, node.y() as f64),
			);
		});
		out
	}
}

/// Clamps `v` into `[r, extent - r]`, favouring `r` when the range is empty.
pub fn clamp_edge(v: f64, r: f64, extent: f64) -> f64 {
	r.max((extent - r).min(v))
}

#[cfg(test)]
mod tests {
	use super::*;

	fn k(s: &str) -> NodeKey {
		NodeKey::from(s)
	}

	fn place(key: &str, x: f64, y: f64) -> Placement {
		Placement {
			key: k(key),
			x,
			y,
			radius: 5.0,
		}
	}

	#[test]
	fn clamp_edge_prefers_lower_bound() {
		assert_eq!(clamp_edge(-10.0, 5.0, 100.0), 5.0);
		assert_eq!(clamp_edge(120.0, 5.0, 100.0), 95.0);
		assert_eq!(clamp_edge(50.0, 5.0, 100.0), 50.0);
		assert_eq!(clamp_edge(50.0, 80.0, 100.0), 80.0);
	}

	#[test]
	fn ticks_keep_nodes_inside_canvas() {
		let config = GraphConfig {
			width: 200.0,
			height: 100.0,
			..GraphConfig::default()
		};
		let mut sim = Simulation::new(&config);
		sim.rebuild(
			&[place("a", -50.0, 300.0), place("b", 400.0, -20.0)],
			&[(k("a"), k("b"))],
		);
		sim.restart();
		for _ in 0..10 {
			sim.tick(0.016);
		}
		for (x, y) in sim.positions().into_values() {
			assert!((5.0..=195.0).contains(&x), "x = {x}");
			assert!((5.0..=95.0).contains(&y), "y = {y}");
		}
	}

	#[test]
	fn pinned_node_stays_put() {
		let mut sim = Simulation::new(&GraphConfig::default());
		sim.rebuild(
			&[place("a", 100.0, 100.0), place("b", 110.0, 100.0)],
			&[(k("a"), k("b"))],
		);
		sim.fix(&k("a"), 300.0, 250.0);
		sim.restart();
		for _ in 0..20 {
			sim.tick(0.016);
		}
		assert_eq!(sim.position(&k("a")), Some((300.0, 250.0)));

		// Pins survive a rebuild that keeps the node.
		sim.rebuild(&[place("a", 300.0, 250.0)], &[]);
		assert!(sim.is_pinned(&k("a")));
		sim.release(&k("a"));
		assert!(!sim.is_pinned(&k("a")));
	}

	#[test]
	fn cools_down_and_stops() {
		let mut sim = Simulation::new(&GraphConfig::default());
		sim.rebuild(&[place("a", 300.0, 300.0)], &[]);
		sim.restart();
		let mut ticks = 0;
		while sim.tick(0.016) {
			ticks += 1;
			assert!(ticks < 1000);
		}
		assert!(!sim.is_running());
		assert!(sim.alpha() < ALPHA_MIN);
		assert!((295..=305).contains(&ticks), "ticks = {ticks}");
	}

	fn counter() -> impl FnMut() -> f64 {
		let mut n = 0.0;
		move || {
			n += 0.29;
			n % 1.0
		}
	}

	fn distance(a: (f64, f64), b: (f64, f64)) -> f64 {
		((a.0 - b.0).powi(2) + (a.1 - b.1).powi(2)).sqrt()
	}

	#[test]
	fn coincident_nodes_spread_out() {
		let mut sim = Simulation::new(&GraphConfig::default());
		sim.rebuild(
			&[
				place("a", 300.0, 300.0),
				place("b", 300.0, 300.0),
				place("c", 300.0, 300.0),
				place("d", 100.0, 100.0),
			],
			&[(k("a"), k("b")), (k("b"), k("c"))],
		);
		assert_eq!(sim.separate_coincident(counter()), 3);
		assert_eq!(sim.position(&k("d")), Some((100.0, 100.0)));

		sim.restart();
		for _ in 0..400 {
			sim.tick(0.016);
		}
		let (a, b, c) = (
			sim.position(&k("a")).unwrap(),
			sim.position(&k("b")).unwrap(),
			sim.position(&k("c")).unwrap(),
		);
		assert!(distance(a, b) > 1.0, "a = {a:?}, b = {b:?}");
		assert!(distance(b, c) > 1.0, "b = {b:?}, c = {c:?}");
		assert!(distance(a, c) > 1.0, "a = {a:?}, c = {c:?}");
	}

	#[test]
	fn pinned_nodes_are_not_nudged() {
		let mut sim = Simulation::new(&GraphConfig::default());
		sim.rebuild(&[place("a", 50.0, 50.0), place("b", 50.0, 50.0)], &[]);
		sim.fix(&k("a"), 50.0, 50.0);
		assert_eq!(sim.separate_coincident(counter()), 1);
		assert_eq!(sim.position(&k("a")), Some((50.0, 50.0)));
		assert_ne!(sim.position(&k("b")), Some((50.0, 50.0)));
	}

	#[test]
	fn lone_node_is_pulled_toward_center() {
		let config = GraphConfig {
			width: 400.0,
			height: 200.0,
			..GraphConfig::default()
		};
		let mut sim = Simulation::new(&config);
		sim.rebuild(&[place("a", 20.0, 180.0)], &[]);
		sim.restart();
		let start = 180.0_f64.hypot(80.0);
		let mut last = start;
		for _ in 0..30 {
			sim.tick(0.016);
			let d = distance(sim.position(&k("a")).unwrap(), (200.0, 100.0));
			assert!(d < last, "d = {d}, last = {last}");
			last = d;
		}
		assert!(last < start / 4.0, "last = {last}");
	}

	#[test]
	fn full_velocity_decay_freezes_the_engine() {
		let config = GraphConfig {
			velocity_decay: 1.0,
			centering_force: 0.0,
			..GraphConfig::default()
		};
		let mut sim = Simulation::new(&config);
		sim.rebuild(
			&[place("a", 290.0, 300.0), place("b", 310.0, 300.0)],
			&[(k("a"), k("b"))],
		);
		sim.restart();
		for _ in 0..10 {
			sim.tick(0.016);
		}
		assert_eq!(sim.position(&k("a")), Some((290.0, 300.0)));
		assert_eq!(sim.position(&k("b")), Some((310.0, 300.0)));

		// The default decay lets the same pair push apart.
		let config = GraphConfig {
			centering_force: 0.0,
			..GraphConfig::default()
		};
		let mut sim = Simulation::new(&config);
		sim.rebuild(
			&[place("a", 290.0, 300.0), place("b", 310.0, 300.0)],
			&[(k("a"), k("b"))],
		);
		sim.restart();
		for _ in 0..10 {
			sim.tick(0.016);
		}
		let (a, b) = (sim.position(&k("a")).unwrap(), sim.position(&k("b")).unwrap());
		assert!(distance(a, b) > 21.0, "a = {a:?}, b = {b:?}");
	}

	#[test]
	fn links_to_unknown_nodes_are_skipped() {
		let mut sim = Simulation::new(&GraphConfig::default());
		sim.rebuild(&[place("a", 1.0, 1.0)], &[(k("a"), k("ghost"))]);
		assert_eq!(sim.len(), 1);
		assert!(!sim.contains(&k("ghost")));
	}
}
