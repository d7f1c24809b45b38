//! Error types for graph updates and data loading.

use thiserror::Error;

use super::types::NodeKey;

/// Result type alias using [`GraphError`].
pub type Result<T> = std::result::Result<T, GraphError>;

/// Errors raised while configuring or updating the graph.
#[derive(Error, Debug)]
pub enum GraphError {
	/// Canvas width or height is not a positive, finite number.
	#[error("invalid dimensions: {width}x{height}")]
	InvalidDimensions {
		/// Width value.
		width: f64,
		/// Height value.
		height: f64,
	},

	/// An opacity setting lies outside `[0, 1]`.
	#[error("invalid opacity for {name}: {value}")]
	InvalidOpacity {
		/// Name of the setting.
		name: &'static str,
		/// Offending value.
		value: f64,
	},

	/// A node lacks a usable value under the reference property.
	#[error("node {index} has no usable \"{prop}\" property")]
	MissingNodeKey {
		/// Position of the node in the input array.
		index: usize,
		/// Reference property that was looked up.
		prop: String,
	},

	/// Two nodes share the same key.
	#[error("duplicate node key: {0}")]
	DuplicateNode(NodeKey),

	/// A link endpoint does not resolve to any node of the current set.
	#[error("link {index} references unknown node: {endpoint}")]
	UnresolvedLink {
		/// Position of the link in the input array.
		index: usize,
		/// Raw endpoint value.
		endpoint: String,
	},

	/// Graph or config JSON failed to parse.
	#[error("failed to parse JSON: {0}")]
	Parse(#[from] serde_json::Error),

	/// A required DOM element was not found.
	#[error("missing element: #{0}")]
	MissingElement(String),
}
