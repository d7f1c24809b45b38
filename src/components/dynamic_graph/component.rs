//! Leptos component wrapping the dynamic graph in an SVG element.
//!
//! The component owns a [`DynamicGraph`], re-runs `update_vis` whenever the
//! `data` signal changes, and ticks it from a `requestAnimationFrame` loop.
//! Each frame's views are pushed into signals; keyed `<For>` lists then add,
//! keep, or remove `<circle>` and `<line>` elements as nodes and links enter
//! and exit.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use leptos::prelude::*;
use log::error;
use wasm_bindgen::prelude::*;
use web_sys::{Element, MouseEvent};

use super::config::{GraphConfig, Styling};
use super::state::{DynamicGraph, LinkKey, LinkView, NodeView, Pointer};
use super::tooltip::{TOOLTIP_CLASS, TooltipView};
use super::types::{GraphData, NodeKey};

const FRAME_DT: f64 = 0.016;
/// Frames to keep syncing after everything settles, covering the tooltip fade.
const SETTLE_FRAMES: u32 = 40;

/// Signals holding the latest rendered frame.
#[derive(Clone, Copy)]
struct Frame {
	node_keys: RwSignal<Vec<NodeKey>>,
	nodes: RwSignal<HashMap<NodeKey, NodeView>>,
	link_keys: RwSignal<Vec<LinkKey>>,
	links: RwSignal<HashMap<LinkKey, LinkView>>,
	tooltip: RwSignal<TooltipView>,
}

impl Frame {
	fn new(graph: &DynamicGraph) -> Self {
		Self {
			node_keys: RwSignal::new(Vec::new()),
			nodes: RwSignal::new(HashMap::new()),
			link_keys: RwSignal::new(Vec::new()),
			links: RwSignal::new(HashMap::new()),
			tooltip: RwSignal::new(graph.tooltip_view()),
		}
	}

	fn sync(&self, graph: &DynamicGraph) {
		let node_views = graph.node_views();
		let keys: Vec<NodeKey> = node_views.iter().map(|v| v.key.clone()).collect();
		if self.node_keys.with_untracked(|k| *k != keys) {
			self.node_keys.set(keys);
		}
		self.nodes
			.set(node_views.into_iter().map(|v| (v.key.clone(), v)).collect());

		let link_views = graph.link_views();
		let keys: Vec<LinkKey> = link_views.iter().map(|v| v.key.clone()).collect();
		if self.link_keys.with_untracked(|k| *k != keys) {
			self.link_keys.set(keys);
		}
		self.links
			.set(link_views.into_iter().map(|v| (v.key.clone(), v)).collect());

		let tooltip = graph.tooltip_view();
		if self.tooltip.with_untracked(|t| *t != tooltip) {
			self.tooltip.set(tooltip);
		}
	}
}

fn node_attr(
	nodes: RwSignal<HashMap<NodeKey, NodeView>>,
	key: NodeKey,
	f: fn(&NodeView) -> String,
) -> impl Fn() -> String + Send + Sync + 'static {
	move || nodes.with(|m| m.get(&key).map(f).unwrap_or_default())
}

fn link_attr(
	links: RwSignal<HashMap<LinkKey, LinkView>>,
	key: LinkKey,
	f: fn(&LinkView) -> String,
) -> impl Fn() -> String + Send + Sync + 'static {
	move || links.with(|m| m.get(&key).map(f).unwrap_or_default())
}

/// Pointer position relative to the element the handler is attached to.
fn canvas_pointer(ev: &MouseEvent) -> Pointer {
	let (left, top) = ev
		.current_target()
		.and_then(|t| t.dyn_into::<Element>().ok())
		.map(|el| {
			let rect = el.get_bounding_client_rect();
			(rect.left(), rect.top())
		})
		.unwrap_or_default();
	Pointer {
		x: ev.client_x() as f64 - left,
		y: ev.client_y() as f64 - top,
		page_x: ev.page_x() as f64,
		page_y: ev.page_y() as f64,
	}
}

/// Renders an interactive force-directed graph as SVG.
///
/// Pass graph data via the reactive `data` signal; every change restarts the
/// layout with the new nodes and links, animating the difference. `config`
/// sets dimensions, opacities and timings; `styling` sets colors, radii,
/// start positions and tooltip contents.
#[component]
pub fn DynamicGraphSvg(
	#[prop(into)] data: Signal<GraphData>,
	#[prop(optional)] config: GraphConfig,
	#[prop(optional)] styling: Styling,
) -> impl IntoView {
	let graph = match DynamicGraph::new(config) {
		Ok(graph) => graph.with_styling(styling),
		Err(e) => {
			error!("dynamic-graph: {}", e);
			return view! { <p class="dynamic-graph-error">{e.to_string()}</p> }.into_any();
		}
	};
	let (width, height) = (graph.config().width, graph.config().height);
	let frame = Frame::new(&graph);
	let graph = StoredValue::new_local(graph);
	let idle = StoredValue::new(0u32);
	let drag_moved = StoredValue::new(false);
	let wake = move || idle.set_value(0);

	Effect::new(move |_| {
		let GraphData { nodes, links } = data.get();
		graph.update_value(|g| {
			if let Err(e) = g.update_vis(nodes, links) {
				error!("dynamic-graph: update rejected: {}", e);
			}
		});
		wake();
	});

	let animate: Rc<RefCell<Option<Closure<dyn FnMut()>>>> = Rc::new(RefCell::new(None));
	let animate_inner = animate.clone();
	*animate.borrow_mut() = Some(Closure::new(move || {
		graph.update_value(|g| g.tick(FRAME_DT));
		if graph.with_value(|g| g.is_animating()) {
			idle.set_value(0);
		} else {
			idle.update_value(|n| *n = n.saturating_add(1));
		}
		if idle.get_value() <= SETTLE_FRAMES {
			graph.with_value(|g| frame.sync(g));
		}
		if let (Some(win), Some(cb)) = (web_sys::window(), animate_inner.borrow().as_ref()) {
			let _ = win.request_animation_frame(cb.as_ref().unchecked_ref());
		}
	}));
	if let (Some(win), Some(cb)) = (web_sys::window(), animate.borrow().as_ref()) {
		let _ = win.request_animation_frame(cb.as_ref().unchecked_ref());
	}

	let on_mousemove = move |ev: MouseEvent| {
		let Some(key) = graph.with_value(|g| g.dragging().cloned()) else {
			return;
		};
		let pointer = canvas_pointer(&ev);
		graph.update_value(|g| g.drag(&key, pointer));
		drag_moved.set_value(true);
		wake();
	};

	let end_drag = move || {
		if let Some(key) = graph.with_value(|g| g.dragging().cloned()) {
			graph.update_value(|g| g.drag_end(&key));
			wake();
		}
	};
	let on_mouseup = move |_: MouseEvent| end_drag();
	let on_mouseleave = move |_: MouseEvent| end_drag();

	let node_circle = move |key: NodeKey| {
		let (over_key, out_key, click_key, down_key) =
			(key.clone(), key.clone(), key.clone(), key.clone());
		view! {
			<circle
				class="node"
				cx=node_attr(frame.nodes, key.clone(), |v| v.cx.to_string())
				cy=node_attr(frame.nodes, key.clone(), |v| v.cy.to_string())
				r=node_attr(frame.nodes, key.clone(), |v| v.r.to_string())
				fill=node_attr(frame.nodes, key.clone(), |v| v.fill.clone())
				style:opacity=node_attr(frame.nodes, key.clone(), |v| v.opacity.to_string())
				on:mouseover=move |ev: MouseEvent| {
					let pointer = canvas_pointer(&ev);
					graph.update_value(|g| g.mouse_over(&over_key, pointer));
					wake();
				}
				on:mouseout=move |_: MouseEvent| {
					graph.update_value(|g| g.mouse_out(&out_key));
					wake();
				}
				on:click=move |_: MouseEvent| {
					if drag_moved.get_value() {
						drag_moved.set_value(false);
						return;
					}
					graph.update_value(|g| g.click(&click_key));
					wake();
				}
				on:mousedown=move |ev: MouseEvent| {
					ev.prevent_default();
					drag_moved.set_value(false);
					graph.update_value(|g| g.drag_start(&down_key));
					wake();
				}
			/>
		}
	};

	let link_line = move |key: LinkKey| {
		view! {
			<line
				class=key.class()
				x1=link_attr(frame.links, key.clone(), |v| v.x1.to_string())
				y1=link_attr(frame.links, key.clone(), |v| v.y1.to_string())
				x2=link_attr(frame.links, key.clone(), |v| v.x2.to_string())
				y2=link_attr(frame.links, key.clone(), |v| v.y2.to_string())
				stroke=link_attr(frame.links, key.clone(), |v| v.stroke.clone())
				stroke-width=link_attr(frame.links, key.clone(), |v| v.stroke_width.to_string())
				stroke-opacity=link_attr(frame.links, key.clone(), |v| v.stroke_opacity.to_string())
			/>
		}
	};

	let tooltip = frame.tooltip;

	view! {
		<div class="dynamic-graph">
			<svg
				width=width.to_string()
				height=height.to_string()
				on:mousemove=on_mousemove
				on:mouseup=on_mouseup
				on:mouseleave=on_mouseleave
			>
				<g class="links">
					<For
						each=move || frame.link_keys.get()
						key=|key| key.clone()
						children=link_line
					/>
				</g>
				<g class="nodes">
					<For
						each=move || frame.node_keys.get()
						key=|key| key.clone()
						children=node_circle
					/>
				</g>
			</svg>
			<div
				class=TOOLTIP_CLASS
				style:position="absolute"
				style:opacity=move || tooltip.with(|t| t.opacity.to_string())
				style:left=move || tooltip.with(|t| t.left.clone())
				style:top=move || tooltip.with(|t| t.top.clone())
				inner_html=move || tooltip.with(|t| t.html.clone())
			/>
		</div>
	}
	.into_any()
}
