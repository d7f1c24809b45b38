//! Static SVG serialization of the current frame.
//!
//! Draws in two passes for correct z-ordering, matching the live component:
//! 1. Links, inside `<g class="links">`
//! 2. Nodes on top, inside `<g class="nodes">`

use std::fmt::Write;

use super::state::{DynamicGraph, LinkView, NodeView};

/// Escapes text for use inside a double-quoted XML attribute.
pub fn escape_attr(value: &str) -> String {
	let mut out = String::with_capacity(value.len());
	for c in value.chars() {
		match c {
			'&' => out.push_str("&amp;"),
			'<' => out.push_str("&lt;"),
			'>' => out.push_str("&gt;"),
			'"' => out.push_str("&quot;"),
			'\'' => out.push_str("&#39;"),
			_ => out.push(c),
		}
	}
	out
}

/// Renders the graph as a standalone SVG document.
pub fn render_svg(graph: &DynamicGraph) -> String {
	let config = graph.config();
	let mut svg = format!(
		r#"<svg xmlns="http://www.w3.org/2000/svg" width="{}" height="{}">"#,
		config.width, config.height
	);
	svg.push('\n');

	svg.push_str("<g class=\"links\">\n");
	for link in graph.link_views() {
		draw_link(&mut svg, &link);
	}
	svg.push_str("</g>\n");

	svg.push_str("<g class=\"nodes\">\n");
	for node in graph.node_views() {
		draw_node(&mut svg, &node);
	}
	svg.push_str("</g>\n</svg>\n");
	svg
}

fn draw_link(svg: &mut String, link: &LinkView) {
	let _ = writeln!(
		svg,
		r#"<line class="{}" x1="{}" y1="{}" x2="{}" y2="{}" stroke="{}" stroke-width="{}" stroke-opacity="{}"/>"#,
		escape_attr(&link.key.class()),
		link.x1,
		link.y1,
		link.x2,
		link.y2,
		escape_attr(&link.stroke),
		link.stroke_width,
		link.stroke_opacity
	);
}

fn draw_node(svg: &mut String, node: &NodeView) {
	let _ = writeln!(
		svg,
		r#"<circle class="node" cx="{}" cy="{}" r="{}" fill="{}" style="opacity: {}"/>"#,
		node.cx,
		node.cy,
		node.r,
		escape_attr(&node.fill),
		node.opacity
	);
}
