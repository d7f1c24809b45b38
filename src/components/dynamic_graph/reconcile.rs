//! Keyed enter/update/exit join between rendered elements and new data.

use std::collections::HashSet;
use std::hash::Hash;

/// Lifecycle of a rendered element.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Phase {
	/// Bound to current data.
	Present,
	/// No longer in the data; removed once the clock passes `until`.
	Exiting { until: f64 },
}

impl Phase {
	pub fn is_exiting(&self) -> bool {
		matches!(self, Phase::Exiting { .. })
	}
}

/// Result of joining existing element keys against incoming data keys.
#[derive(Clone, Debug, PartialEq)]
pub struct Join<K> {
	/// Data keys with no element yet, in data order.
	pub enter: Vec<K>,
	/// Data keys that already have an element, in data order.
	pub update: Vec<K>,
	/// Element keys missing from the data, in element order.
	pub exit: Vec<K>,
}

/// Splits keys into enter, update and exit groups.
///
/// Duplicate data keys only bind once; later duplicates are dropped.
pub fn join<K>(existing: &[K], data: &[K]) -> Join<K>
where
	K: Clone + Eq + Hash,
{
	let existing_set: HashSet<&K> = existing.iter().collect();
	let mut seen: HashSet<&K> = HashSet::with_capacity(data.len());
	let mut enter = Vec::new();
	let mut update = Vec::new();

	for key in data {
		if !seen.insert(key) {
			continue;
		}
		if existing_set.contains(key) {
			update.push(key.clone());
		} else {
			enter.push(key.clone());
		}
	}

	let exit = existing
		.iter()
		.filter(|k| !seen.contains(k))
		.cloned()
		.collect();

	Join {
		enter,
		update,
		exit,
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn splits_keys() {
		let j = join(&["a", "b", "c"], &["c", "d", "a"]);
		assert_eq!(j.enter, vec!["d"]);
		assert_eq!(j.update, vec!["c", "a"]);
		assert_eq!(j.exit, vec!["b"]);
	}

	#[test]
	fn empty_data_exits_everything() {
		let j = join(&[1, 2], &[]);
		assert!(j.enter.is_empty());
		assert!(j.update.is_empty());
		assert_eq!(j.exit, vec![1, 2]);
	}

	#[test]
	fn duplicate_data_binds_once() {
		let j = join(&[], &["x", "x"]);
		assert_eq!(j.enter, vec!["x"]);
	}
}
