//! Pending invalidation set.
//!
//! Edit notifications add spans here; the next recompute pass drains them.
//! The two sides are decoupled in time, so the set sits behind its own lock.

use indexmap::IndexMap;
use parking_lot::Mutex;
use rustc_hash::FxBuildHasher;
use vartype_primitives::{Snapshot, Span};

/// Deduplicated, insertion-ordered spans awaiting recomputation.
///
/// Each span is stored with the snapshot it is scoped to so the pass can
/// carry it to whatever version is current when it runs.
#[derive(Debug, Default)]
pub struct PendingInvalidations {
	spans: Mutex<IndexMap<Span, Snapshot, FxBuildHasher>>,
}

impl PendingInvalidations {
	pub fn new() -> Self {
		Self::default()
	}

	/// Adds spans from `snapshot`.
	///
	/// Returns true if the set went from empty to non-empty, which is when a
	/// pass must be scheduled.
	pub fn extend(&self, snapshot: &Snapshot, spans: impl IntoIterator<Item = Span>) -> bool {
		let mut pending = self.spans.lock();
		let was_empty = pending.is_empty();
		for span in spans {
			debug_assert_eq!(span.version(), snapshot.version());
			pending.entry(span).or_insert_with(|| snapshot.clone());
		}
		was_empty && !pending.is_empty()
	}

	/// Takes every pending span, leaving the set empty.
	pub fn drain(&self) -> Vec<(Span, Snapshot)> {
		std::mem::take(&mut *self.spans.lock()).into_iter().collect()
	}

	pub fn clear(&self) {
		self.spans.lock().clear();
	}

	pub fn len(&self) -> usize {
		self.spans.lock().len()
	}

	pub fn is_empty(&self) -> bool {
		self.spans.lock().is_empty()
	}
}
