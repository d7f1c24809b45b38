//! Graph data structures for input to the dynamic graph component.
//!
//! Nodes are arbitrary JSON records. The renderer only cares about the
//! property named by [`GraphConfig::node_ref_prop`](super::GraphConfig), which
//! links use to reference their endpoints.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Resolved identity of a node, taken from its reference property.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeKey(pub String);

impl NodeKey {
	/// Converts a JSON identifier into a key. Strings are used verbatim,
	/// numbers and booleans are stringified, anything else has no key.
	pub fn from_value(value: &Value) -> Option<Self> {
		match value {
			Value::String(s) => Some(Self(s.clone())),
			Value::Number(n) => Some(Self(n.to_string())),
			Value::Bool(b) => Some(Self(b.to_string())),
			_ => None,
		}
	}

	pub fn as_str(&self) -> &str {
		&self.0
	}
}

impl fmt::Display for NodeKey {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(&self.0)
	}
}

impl From<&str> for NodeKey {
	fn from(s: &str) -> Self {
		Self(s.to_string())
	}
}

/// A node in the graph: any JSON object.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GraphNode {
	pub fields: Map<String, Value>,
}

impl GraphNode {
	/// Creates a node whose only field is `id`.
	pub fn with_id(id: impl Into<String>) -> Self {
		let mut fields = Map::new();
		fields.insert("id".to_string(), Value::String(id.into()));
		Self { fields }
	}

	pub fn get(&self, prop: &str) -> Option<&Value> {
		self.fields.get(prop)
	}

	pub fn insert(&mut self, prop: impl Into<String>, value: impl Into<Value>) {
		self.fields.insert(prop.into(), value.into());
	}

	/// The node's identity under the given reference property.
	pub fn key(&self, prop: &str) -> Option<NodeKey> {
		self.get(prop).and_then(NodeKey::from_value)
	}

	/// Numeric field lookup, `None` when absent or not a number.
	pub fn number(&self, prop: &str) -> Option<f64> {
		self.get(prop).and_then(Value::as_f64)
	}
}

/// An edge between two nodes, referenced by their identifiers.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GraphLink {
	/// Source node identifier.
	pub source: Value,
	/// Target node identifier.
	pub target: Value,
	/// Any other fields carried by the link record.
	#[serde(flatten)]
	pub extra: Map<String, Value>,
}

impl GraphLink {
	/// A link between two node keys.
	pub fn new(source: impl Into<Value>, target: impl Into<Value>) -> Self {
		Self {
			source: source.into(),
			target: target.into(),
			extra: Map::new(),
		}
	}

	/// Source endpoint as a node key.
	pub fn source_key(&self) -> Option<NodeKey> {
		NodeKey::from_value(&self.source)
	}

	pub fn target_key(&self) -> Option<NodeKey> {
		NodeKey::from_value(&self.target)
	}
}

/// Complete graph data: nodes and links.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct GraphData {
	pub nodes: Vec<GraphNode>,
	pub links: Vec<GraphLink>,
}
