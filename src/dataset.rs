//! Bookkeeping for the demo data set: entity and association types.
//!
//! Nodes either describe a type directly (they carry a `type` field) or wrap
//! one under `entityType`. Radius grows with degree, color follows the
//! category, and the tooltip shows the title.

use std::collections::{BTreeMap, HashMap, HashSet};

use log::error;
use serde_json::{Map, Value};

use crate::components::dynamic_graph::{GraphData, GraphNode, NodeKey};

/// Radius of a node without links.
pub const MIN_RADIUS: f64 = 7.0;
/// Each link adds `1 / SCALE_RADIUS_DOWN_BY` to the radius.
pub const SCALE_RADIUS_DOWN_BY: f64 = 5.0;

const REF_PROP: &str = "id";

/// The record holding a node's type description.
pub fn node_info(node: &GraphNode) -> Option<&Map<String, Value>> {
	if node.get("type").is_some_and(is_truthy) {
		Some(&node.fields)
	} else {
		node.get("entityType").and_then(Value::as_object)
	}
}

fn is_truthy(v: &Value) -> bool {
	match v {
		Value::Null => false,
		Value::Bool(b) => *b,
		Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
		Value::String(s) => !s.is_empty(),
		_ => true,
	}
}

fn info_str<'a>(node: &'a GraphNode, field: &str) -> Option<&'a str> {
	node_info(node)?.get(field)?.as_str()
}

/// Sets `degree` and `radius` on every node that has no radius yet.
pub fn annotate(data: &mut GraphData) {
	let mut degree: HashMap<NodeKey, u64> = HashMap::new();
	for link in &data.links {
		let (src, tgt) = (link.source_key(), link.target_key());
		if let Some(src) = &src {
			*degree.entry(src.clone()).or_default() += 1;
		}
		if let Some(tgt) = tgt.filter(|t| src.as_ref() != Some(t)) {
			*degree.entry(tgt).or_default() += 1;
		}
	}

	for node in &mut data.nodes {
		if node.get("radius").is_some() {
			continue;
		}
		let d = node
			.key(REF_PROP)
			.and_then(|k| degree.get(&k).copied())
			.unwrap_or(0);
		node.insert("degree", d);
		node.insert("radius", MIN_RADIUS + d as f64 / SCALE_RADIUS_DOWN_BY);
	}
}

/// Radius stored by [`annotate`], falling back to [`MIN_RADIUS`].
pub fn node_radius(node: &GraphNode) -> f64 {
	node.number("radius").unwrap_or(MIN_RADIUS)
}

/// Number of nodes per type namespace.
pub fn namespace_histogram(data: &GraphData) -> BTreeMap<String, usize> {
	let mut hist = BTreeMap::new();
	for node in &data.nodes {
		let namespace = node_info(node)
			.and_then(|info| info.get("type"))
			.and_then(|t| t.get("namespace"))
			.and_then(Value::as_str)
			.unwrap_or("undefined");
		*hist.entry(namespace.to_string()).or_insert(0) += 1;
	}
	hist
}

/// Fill color by category.
pub fn node_color(node: &GraphNode) -> String {
	match node_info(node).and_then(|info| info.get("category")) {
		Some(Value::String(c)) if c == "AssociationType" => "darkred".to_string(),
		Some(Value::String(c)) if c == "EntityType" => "skyblue".to_string(),
		None | Some(Value::Null) => "#525252".to_string(),
		Some(other) => {
			error!("dataset: node improperly typed: {} ({})", other, node_label(node));
			"red".to_string()
		}
	}
}

fn node_label(node: &GraphNode) -> String {
	node.key(REF_PROP)
		.map(|k| k.to_string())
		.unwrap_or_else(|| "?".to_string())
}

/// Tooltip contents: the type's title.
pub fn tooltip_title(node: &GraphNode) -> String {
	info_str(node, "title").unwrap_or_default().to_string()
}

/// Keeps nodes at even positions and the links between them.
pub fn keep_even(data: &GraphData) -> GraphData {
	let nodes: Vec<GraphNode> = data
		.nodes
		.iter()
		.enumerate()
		.filter(|(i, _)| i % 2 == 0)
		.map(|(_, n)| n.clone())
		.collect();
	let kept: HashSet<NodeKey> = nodes.iter().filter_map(|n| n.key(REF_PROP)).collect();
	let links = data
		.links
		.iter()
		.filter(|l| {
			l.source_key().is_some_and(|k| kept.contains(&k))
				&& l.target_key().is_some_and(|k| kept.contains(&k))
		})
		.cloned()
		.collect();
	GraphData { nodes, links }
}

#[cfg(test)]
mod tests {
	use serde_json::json;

	use super::*;

	fn sample() -> GraphData {
		serde_json::from_value(json!({
			"nodes": [
				{ "id": "person", "title": "Person", "category": "EntityType",
				  "type": { "namespace": "general", "name": "person" } },
				{ "id": "knows", "title": "Knows", "category": "AssociationType",
				  "type": { "namespace": "general", "name": "knows" } },
				{ "id": "prop", "entityType": { "title": "Address", "category": "EntityType",
				  "type": { "namespace": "geo" } } },
				{ "id": "odd", "radius": 12 }
			],
			"links": [
				{ "source": "person", "target": "knows" },
				{ "source": "knows", "target": "prop" },
				{ "source": "knows", "target": "knows" }
			]
		}))
		.unwrap()
	}

	#[test]
	fn annotate_sets_degree_and_radius() {
		let mut data = sample();
		annotate(&mut data);
		assert_eq!(data.nodes[0].number("degree"), Some(1.0));
		assert_eq!(data.nodes[1].number("degree"), Some(3.0));
		assert!((node_radius(&data.nodes[1]) - 7.6).abs() < 1e-12);
		// Existing radius is left alone.
		assert_eq!(data.nodes[3].get("degree"), None);
		assert_eq!(node_radius(&data.nodes[3]), 12.0);
	}

	#[test]
	fn info_falls_back_to_entity_type() {
		let data = sample();
		assert_eq!(tooltip_title(&data.nodes[0]), "Person");
		assert_eq!(tooltip_title(&data.nodes[2]), "Address");
		assert_eq!(tooltip_title(&data.nodes[3]), "");
	}

	#[test]
	fn colors_follow_category() {
		let data = sample();
		assert_eq!(node_color(&data.nodes[0]), "skyblue");
		assert_eq!(node_color(&data.nodes[1]), "darkred");
		assert_eq!(node_color(&data.nodes[3]), "#525252");
		let odd: GraphNode =
			serde_json::from_value(json!({ "id": "x", "type": {}, "category": "Other" })).unwrap();
		assert_eq!(node_color(&odd), "red");
	}

	#[test]
	fn histogram_counts_namespaces() {
		let hist = namespace_histogram(&sample());
		assert_eq!(hist["general"], 2);
		assert_eq!(hist["geo"], 1);
		assert_eq!(hist["undefined"], 1);
	}

	#[test]
	fn keep_even_drops_dangling_links() {
		let filtered = keep_even(&sample());
		let ids: Vec<String> = filtered
			.nodes
			.iter()
			.filter_map(|n| n.key("id"))
			.map(|k| k.to_string())
			.collect();
		assert_eq!(ids, vec!["person", "prop"]);
		assert!(filtered.links.is_empty());
	}
}
