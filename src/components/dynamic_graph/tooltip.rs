//! Node tooltip: contents, placement and fade transitions.

use super::transition::Tween;

/// CSS class of the tooltip element.
pub const TOOLTIP_CLASS: &str = "d3-dynamic-graph-tooltip";

const SHOW_OPACITY: f64 = 0.9;
const SHOW_SECS: f64 = 0.2;
const HIDE_SECS: f64 = 0.5;

/// Tooltip state, positioned relative to the page.
#[derive(Clone, Debug)]
pub struct Tooltip {
	html: String,
	left: f64,
	top: f64,
	x_offset: f64,
	y_offset: f64,
	opacity: Tween,
}

/// Snapshot of the tooltip for rendering.
#[derive(Clone, Debug, PartialEq)]
pub struct TooltipView {
	pub html: String,
	/// CSS `left`, e.g. `"116px"`.
	pub left: String,
	/// CSS `top`, e.g. `"224px"`.
	pub top: String,
	pub opacity: f64,
}

impl Tooltip {
	/// A hidden tooltip drawn at the given offset from the pointer.
	pub fn new(x_offset: f64, y_offset: f64) -> Self {
		Self {
			html: String::new(),
			left: 0.0,
			top: 0.0,
			x_offset,
			y_offset,
			opacity: Tween::fixed(0.0),
		}
	}

	/// Replaces the contents, moves next to the pointer and fades in.
	pub fn show(&mut self, html: String, x: f64, y: f64, now: f64) {
		self.html = html;
		self.move_to(x, y);
		self.opacity = self.opacity.retarget(SHOW_OPACITY, now, SHOW_SECS);
	}

	/// Follows the pointer without changing opacity.
	pub fn move_to(&mut self, x: f64, y: f64) {
		self.left = x + self.x_offset;
		self.top = y + self.y_offset;
	}

	/// Fades out, keeping the last contents until the next `show`.
	pub fn hide(&mut self, now: f64) {
		self.opacity = self.opacity.retarget(0.0, now, HIDE_SECS);
	}

	pub fn opacity(&self, now: f64) -> f64 {
		self.opacity.value_at(now)
	}

	pub fn view(&self, now: f64) -> TooltipView {
		TooltipView {
			html: self.html.clone(),
			left: format!("{}px", self.left),
			top: format!("{}px", self.top),
			opacity: self.opacity(now),
		}
	}
}
