//! Timed attribute tweens for enter/exit and tooltip fades.
//!
//! Times are in seconds on the graph's own clock, which only advances when the
//! animation loop ticks.

/// Cubic in-out easing.
pub fn ease_cubic_in_out(t: f64) -> f64 {
	let t = t.clamp(0.0, 1.0) * 2.0;
	if t <= 1.0 {
		t * t * t / 2.0
	} else {
		let t = t - 2.0;
		(t * t * t + 2.0) / 2.0
	}
}

/// A single numeric attribute animating from `from` to `to`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Tween {
	pub from: f64,
	pub to: f64,
	pub start: f64,
	pub duration: f64,
}

impl Tween {
	pub fn new(from: f64, to: f64, start: f64, duration: f64) -> Self {
		Self {
			from,
			to,
			start,
			duration,
		}
	}

	/// A tween that is already at rest on `value`.
	pub fn fixed(value: f64) -> Self {
		Self::new(value, value, 0.0, 0.0)
	}

	/// Starts a new tween toward `to` from wherever this one is at `now`.
	pub fn retarget(&self, to: f64, now: f64, duration: f64) -> Self {
		Self::new(self.value_at(now), to, now, duration)
	}

	/// Eased value at time `now`, held at the endpoints outside the tween.
	pub fn value_at(&self, now: f64) -> f64 {
		if self.duration <= 0.0 || now >= self.end() {
			return self.to;
		}
		if now <= self.start {
			return self.from;
		}
		let t = ease_cubic_in_out((now - self.start) / self.duration);
		self.from + (self.to - self.from) * t
	}

	pub fn end(&self) -> f64 {
		self.start + self.duration
	}

	pub fn is_done(&self, now: f64) -> bool {
		now >= self.end()
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn easing_is_symmetric() {
		assert_eq!(ease_cubic_in_out(0.0), 0.0);
		assert_eq!(ease_cubic_in_out(1.0), 1.0);
		assert!((ease_cubic_in_out(0.5) - 0.5).abs() < 1e-12);
		assert!((ease_cubic_in_out(0.25) + ease_cubic_in_out(0.75) - 1.0).abs() < 1e-12);
	}

	#[test]
	fn tween_holds_endpoints() {
		let tw = Tween::new(0.0, 10.0, 1.0, 0.5);
		assert_eq!(tw.value_at(0.0), 0.0);
		assert_eq!(tw.value_at(1.25), 5.0);
		assert_eq!(tw.value_at(2.0), 10.0);
		assert!(!tw.is_done(1.4));
		assert!(tw.is_done(1.5));
	}

	#[test]
	fn retarget_starts_from_current_value() {
		let tw = Tween::new(0.0, 1.0, 0.0, 1.0);
		let back = tw.retarget(0.0, 0.5, 1.0);
		assert_eq!(back.from, 0.5);
		assert_eq!(back.value_at(1.5), 0.0);
	}
}
