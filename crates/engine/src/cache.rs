//! Span-keyed annotation widget cache.
//!
//! The cache is keyed in exactly one snapshot at a time. Before it is read
//! or written it must be caught up to the engine's current snapshot, which
//! rekeys every entry with edge-exclusive tracking so typing at a token's
//! edge never drags a widget along.

use indexmap::IndexMap;
use rustc_hash::{FxBuildHasher, FxHashSet};
use vartype_primitives::{Snapshot, Span, TrackingMode};

use crate::error::{EngineError, Result};
use crate::widget::{AnnotationDatum, Tag, WidgetFactory};

/// Outcome of one [`AnnotationCache::reconcile`] call.
#[derive(Debug)]
pub struct Reconciled<H> {
	/// Tags in the cache's snapshot, in data order.
	pub tags: Vec<Tag<H>>,
	pub created: usize,
	pub updated: usize,
	pub evicted: usize,
}

/// Widget handles keyed by the keyword span they decorate.
#[derive(Debug)]
pub struct AnnotationCache<H> {
	snapshot: Snapshot,
	entries: IndexMap<Span, H, FxBuildHasher>,
}

impl<H: Clone> AnnotationCache<H> {
	pub fn new(snapshot: Snapshot) -> Self {
		Self {
			snapshot,
			entries: IndexMap::default(),
		}
	}

	/// Returns the snapshot the keys are scoped to.
	pub fn snapshot(&self) -> &Snapshot {
		&self.snapshot
	}

	pub fn len(&self) -> usize {
		self.entries.len()
	}

	pub fn is_empty(&self) -> bool {
		self.entries.is_empty()
	}

	pub fn get(&self, span: &Span) -> Option<&H> {
		self.entries.get(span)
	}

	pub fn spans(&self) -> impl Iterator<Item = Span> + '_ {
		self.entries.keys().copied()
	}

	/// Rekeys every entry into `target`, which must be a newer version of the same document.
	///
	/// Entries whose token was deleted outright are dropped. If two entries
	/// land on the same span the older one is kept.
	pub fn catch_up(&mut self, target: &Snapshot) -> Result<()> {
		if self.snapshot.same_version(target) {
			return Ok(());
		}
		if !self.snapshot.precedes(target) {
			return Err(EngineError::ForeignSnapshot(target.version()));
		}

		let mut rekeyed = IndexMap::with_capacity_and_hasher(self.entries.len(), FxBuildHasher);
		let mut collapsed = 0usize;
		for (span, handle) in self.entries.drain(..) {
			let moved = self.snapshot.translate(span, target, TrackingMode::EdgeExclusive)?;
			if moved.is_empty() {
				collapsed += 1;
				continue;
			}
			if rekeyed.contains_key(&moved) {
				tracing::trace!(?span, ?moved, "rekey collision, keeping first entry");
				continue;
			}
			rekeyed.insert(moved, handle);
		}

		tracing::trace!(from = %self.snapshot.version(), to = %target.version(), kept = rekeyed.len(), collapsed, "cache caught up");
		self.entries = rekeyed;
		self.snapshot = target.clone();
		Ok(())
	}

	/// Merges freshly resolved data for `scanned` into the cache.
	///
	/// `scanned` are the regions the data was computed over, in the cache's
	/// snapshot. A datum whose span is cached updates that widget in place; a
	/// new span gets a new widget. Cached entries inside `scanned` with no
	/// datum this time are evicted. Only the first datum per span counts.
	pub fn reconcile<W>(&mut self, scanned: &[Span], data: impl IntoIterator<Item = AnnotationDatum>, widgets: &mut W) -> Reconciled<H>
	where
		W: WidgetFactory<Handle = H>,
	{
		self.merge(scanned, data, widgets, true)
	}

	/// Like [`reconcile`](Self::reconcile), but never creates widgets.
	///
	/// Data for spans without a cached widget is ignored and left out of the
	/// returned tags. Used by passes that run without a host query, so the
	/// cache only ever holds widgets the host has asked for.
	pub fn refresh<W>(&mut self, scanned: &[Span], data: impl IntoIterator<Item = AnnotationDatum>, widgets: &mut W) -> Reconciled<H>
	where
		W: WidgetFactory<Handle = H>,
	{
		self.merge(scanned, data, widgets, false)
	}

	/// Returns true if any cached entry intersects `regions`.
	pub fn intersects_any(&self, regions: &[Span]) -> bool {
		self.entries.keys().any(|span| regions.iter().any(|region| region.intersects(span)))
	}

	fn merge<W>(&mut self, scanned: &[Span], data: impl IntoIterator<Item = AnnotationDatum>, widgets: &mut W, create: bool) -> Reconciled<H>
	where
		W: WidgetFactory<Handle = H>,
	{
		let mut out = Reconciled {
			tags: Vec::new(),
			created: 0,
			updated: 0,
			evicted: 0,
		};
		let mut seen = FxHashSet::default();

		for datum in data {
			debug_assert_eq!(datum.span.version(), self.snapshot.version());
			if !seen.insert(datum.span) {
				continue;
			}
			let widget = match self.entries.get(&datum.span) {
				Some(handle) => {
					widgets.update(handle, &datum.display);
					out.updated += 1;
					handle.clone()
				}
				None if create => {
					let handle = widgets.create(&datum.display);
					self.entries.insert(datum.span, handle.clone());
					out.created += 1;
					handle
				}
				None => continue,
			};
			out.tags.push(Tag { span: datum.span, widget });
		}

		let before = self.entries.len();
		self.entries
			.retain(|span, _| seen.contains(span) || !scanned.iter().any(|region| region.intersects(span)));
		out.evicted = before - self.entries.len();
		out
	}

	/// Drops every entry that does not intersect `visible`, which must be in the cache's snapshot.
	pub fn retain_visible(&mut self, visible: Span) -> usize {
		debug_assert_eq!(visible.version(), self.snapshot.version());
		let before = self.entries.len();
		self.entries.retain(|span, _| span.intersects(&visible));
		before - self.entries.len()
	}

	pub fn clear(&mut self) {
		self.entries.clear();
	}
}

#[cfg(test)]
mod tests;
