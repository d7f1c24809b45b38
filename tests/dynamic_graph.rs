use dynamic_graph::components::dynamic_graph::Pointer;
use dynamic_graph::dataset;
use dynamic_graph::{DynamicGraph, GraphConfig, GraphData, NodeKey, render_svg};
use serde_json::json;

fn type_graph() -> GraphData {
	serde_json::from_value(json!({
		"nodes": [
			{ "id": "person", "title": "Person", "category": "EntityType",
			  "type": { "namespace": "general" } },
			{ "id": "knows", "title": "Knows", "category": "AssociationType",
			  "type": { "namespace": "general" } },
			{ "id": "address", "title": "Address", "category": "EntityType",
			  "type": { "namespace": "geo" } },
			{ "id": "lives_at", "title": "Lives at", "category": "AssociationType",
			  "type": { "namespace": "geo" } },
			{ "id": "city", "title": "City", "category": "EntityType",
			  "type": { "namespace": "geo" } }
		],
		"links": [
			{ "source": "person", "target": "knows" },
			{ "source": "person", "target": "lives_at" },
			{ "source": "lives_at", "target": "address" },
			{ "source": "address", "target": "city" },
			{ "source": "person", "target": "city" }
		]
	}))
	.unwrap()
}

fn demo_graph(config: GraphConfig) -> DynamicGraph {
	let mut graph = DynamicGraph::new(config).unwrap().with_random({
		let mut n = 0.0;
		move || {
			n += 0.17;
			n % 1.0
		}
	});
	graph
		.set_node_color(dataset::node_color)
		.set_node_radius(dataset::node_radius)
		.set_tooltip_inner_html(dataset::tooltip_title);
	graph
}

fn run(graph: &mut DynamicGraph, frames: usize) {
	for _ in 0..frames {
		graph.tick(0.016);
	}
}

#[test]
fn layout_settles_inside_the_canvas() {
	let config = GraphConfig {
		width: 1000.0,
		height: 400.0,
		..GraphConfig::default()
	};
	let mut data = type_graph();
	dataset::annotate(&mut data);
	let mut graph = demo_graph(config);
	graph.update_vis(data.nodes, data.links).unwrap();

	run(&mut graph, 400);
	assert!(!graph.simulation().is_running());
	for node in graph.node_views() {
		assert!(node.r > 7.0);
		assert!(node.cx >= node.r && node.cx <= 1000.0 - node.r, "{node:?}");
		assert!(node.cy >= node.r && node.cy <= 400.0 - node.r, "{node:?}");
	}
	for link in graph.link_views() {
		assert_eq!(link.stroke_opacity, 1.0);
	}
}

#[test]
fn toggling_nodes_animates_the_difference() {
	let mut full = type_graph();
	dataset::annotate(&mut full);
	let filtered = dataset::keep_even(&full);
	let mut graph = demo_graph(GraphConfig::default());

	graph
		.update_vis(full.nodes.clone(), full.links.clone())
		.unwrap();
	run(&mut graph, 100);
	let person_before = graph
		.node_views()
		.into_iter()
		.find(|v| v.key == NodeKey::from("person"))
		.unwrap();

	graph
		.update_vis(filtered.nodes.clone(), filtered.links.clone())
		.unwrap();
	assert_eq!(graph.simulation().len(), 3);
	assert_eq!(graph.simulation().alpha(), 1.0);
	let exiting: Vec<String> = graph
		.node_views()
		.into_iter()
		.filter(|v| v.exiting)
		.map(|v| v.key.to_string())
		.collect();
	assert_eq!(exiting, vec!["knows", "lives_at"]);

	// Surviving nodes keep their place when the layout restarts.
	let person_after = graph
		.node_views()
		.into_iter()
		.find(|v| v.key == NodeKey::from("person"))
		.unwrap();
	assert_eq!(
		(person_before.cx, person_before.cy),
		(person_after.cx, person_after.cy)
	);

	run(&mut graph, 60);
	assert_eq!(graph.node_views().len(), 3);
	assert_eq!(graph.link_views().len(), 2);

	graph.update_vis(full.nodes, full.links).unwrap();
	run(&mut graph, 60);
	assert_eq!(graph.node_views().len(), 5);
	assert_eq!(graph.link_views().len(), 5);
}

#[test]
fn hover_click_and_svg_export() {
	let mut data = type_graph();
	dataset::annotate(&mut data);
	let mut graph = demo_graph(GraphConfig::default());
	graph.update_vis(data.nodes, data.links).unwrap();
	run(&mut graph, 60);

	let person = NodeKey::from("person");
	graph.mouse_over(&person, Pointer::at(40.0, 50.0));
	graph.click(&person);
	graph.mouse_out(&person);
	run(&mut graph, 30);

	assert_eq!(graph.tooltip_view().html, "Person");
	let focused: Vec<String> = graph
		.node_views()
		.into_iter()
		.filter(|v| v.opacity == 0.95)
		.map(|v| v.key.to_string())
		.collect();
	assert_eq!(focused, vec!["person", "knows", "lives_at", "city"]);

	let svg = render_svg(&graph);
	assert_eq!(svg.matches("stroke-width=\"5\"").count(), 3);
	assert!(svg.contains("fill=\"darkred\""));
	assert!(svg.contains("class=\"link link-person link-knows\""));
}
