//! dynamic-graph: interactive force-directed network graph rendered as SVG.
//!
//! This crate provides a reusable Leptos component that lays out nodes and
//! links with a force simulation, animates data updates, and highlights a
//! node's neighborhood on hover, click and drag. The [`App`] component is a
//! demo page that loads an entity/association type graph from the DOM.

use std::rc::Rc;

use leptos::prelude::*;
use leptos_meta::*;
use log::{Level, info, warn};
use serde::de::DeserializeOwned;
use wasm_bindgen::JsCast;
use web_sys::{HtmlScriptElement, Window};

pub mod components;
pub mod dataset;

pub use components::dynamic_graph::{
	DynamicGraph, DynamicGraphSvg, GraphConfig, GraphData, GraphError, GraphLink, GraphNode,
	NodeKey, Styling, render_svg,
};

/// Initialize logging and panic hooks for the WASM target.
pub fn init_logging() {
	let _ = console_log::init_with_level(Level::Debug);
	console_error_panic_hook::set_once();
	info!("dynamic-graph: logging initialized");
}

/// Reads the text of a `<script>` element by id.
fn script_text(id: &str) -> Result<String, GraphError> {
	let missing = || GraphError::MissingElement(id.to_string());
	let window: Window = web_sys::window().ok_or_else(missing)?;
	let document = window.document().ok_or_else(missing)?;
	let element = document.get_element_by_id(id).ok_or_else(missing)?;
	let script: HtmlScriptElement = element.dyn_into().map_err(|_| missing())?;
	script.text().map_err(|_| missing())
}

fn load_json<T: DeserializeOwned>(id: &str) -> Result<T, GraphError> {
	let text = script_text(id)?;
	Ok(serde_json::from_str(&text)?)
}

/// Load graph data from a script element with id="graph-data".
/// Expected format: JSON with { nodes: [...], links: [...] }
fn load_graph_data() -> Option<GraphData> {
	match load_json::<GraphData>("graph-data") {
		Ok(data) => {
			info!(
				"dynamic-graph: loaded {} nodes, {} links",
				data.nodes.len(),
				data.links.len()
			);
			Some(data)
		}
		Err(e) => {
			warn!("dynamic-graph: failed to load graph data: {}", e);
			None
		}
	}
}

/// Load optional settings from a script element with id="graph-config".
fn load_config() -> GraphConfig {
	let fallback = GraphConfig {
		width: 1000.0,
		..GraphConfig::default()
	};
	match script_text("graph-config") {
		Ok(text) => GraphConfig::from_json(&text).unwrap_or_else(|e| {
			warn!("dynamic-graph: ignoring graph config: {}", e);
			fallback
		}),
		Err(_) => fallback,
	}
}

/// Main application component.
/// Loads graph data from DOM and renders the graph with a node filter toggle.
#[component]
pub fn App() -> impl IntoView {
	provide_meta_context();

	let mut full = load_graph_data().unwrap_or_default();
	dataset::annotate(&mut full);
	info!(
		"dynamic-graph: namespaces {:?}",
		dataset::namespace_histogram(&full)
	);
	let filtered = dataset::keep_even(&full);

	let show_all = RwSignal::new(true);
	let graph_signal = Signal::derive(move || {
		if show_all.get() {
			full.clone()
		} else {
			filtered.clone()
		}
	});

	let styling = Styling {
		node_color: Rc::new(dataset::node_color),
		node_radius: Rc::new(dataset::node_radius),
		tooltip_inner_html: Rc::new(dataset::tooltip_title),
		..Styling::default()
	};

	view! {
		<Html attr:lang="en" attr:dir="ltr" />
		<Title text="Dynamic Graph" />
		<Meta charset="UTF-8" />
		<Meta name="viewport" content="width=device-width, initial-scale=1.0" />

		<div class="graph-page">
			<button id="toggle-nodes" on:click=move |_| show_all.update(|v| *v = !*v)>
				"Toggle nodes"
			</button>
			<div id="canvas">
				<DynamicGraphSvg data=graph_signal config=load_config() styling=styling />
			</div>
		</div>
	}
}
