//! Span translation across document versions.
//!
//! A span is carried from one snapshot to another by mapping both edges
//! through every changeset between them, one version at a time. The
//! [`TrackingMode`] picks the bias of each edge, which only matters when an
//! edit lands exactly on an edge.
//!
//! Translation is pure. Backward translation (into an older snapshot) walks
//! the same changesets in reverse.

use thiserror::Error;

use crate::document::Snapshot;
use crate::span::{CharIdx, CharLen, Span, Version};
use crate::transaction::{Bias, ChangeSet};

/// How a span's edges respond to edits that touch them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrackingMode {
	/// Edges move outward to absorb text inserted exactly at them.
	EdgeInclusive,
	/// Edges never absorb text inserted exactly at them.
	EdgeExclusive,
}

impl TrackingMode {
	#[inline]
	fn start_bias(self) -> Bias {
		match self {
			Self::EdgeInclusive => Bias::Left,
			Self::EdgeExclusive => Bias::Right,
		}
	}

	#[inline]
	fn end_bias(self) -> Bias {
		match self {
			Self::EdgeInclusive => Bias::Right,
			Self::EdgeExclusive => Bias::Left,
		}
	}
}

/// Errors raised by [`translate_span`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TranslateError {
	/// The span is scoped to a different version than the snapshot it was translated from.
	#[error("span is scoped to {span}, not to the source snapshot {snapshot}")]
	VersionMismatch { span: Version, snapshot: Version },

	/// The two snapshots belong to different documents.
	#[error("{from} and {to} are not versions of the same document")]
	Unrelated { from: Version, to: Version },

	/// The span extends past the end of the source snapshot.
	#[error("span ends at {end}, past the source snapshot length {len}")]
	OutOfBounds { end: CharIdx, len: CharLen },
}

/// Translates `span` from snapshot `from` into snapshot `to`.
///
/// Text deleted underneath the span collapses it to a zero-length span at the
/// deletion point. Translating through several versions is the same as
/// translating through each of them in order.
pub fn translate_span(span: Span, from: &Snapshot, to: &Snapshot, mode: TrackingMode) -> Result<Span, TranslateError> {
	if span.version() != from.version() {
		return Err(TranslateError::VersionMismatch {
			span: span.version(),
			snapshot: from.version(),
		});
	}
	if span.end() > from.len_chars() {
		return Err(TranslateError::OutOfBounds {
			end: span.end(),
			len: from.len_chars(),
		});
	}
	if from.same_version(to) {
		return Ok(span);
	}

	let unrelated = || TranslateError::Unrelated {
		from: from.version(),
		to: to.version(),
	};

	let (start, end) = if from.version() < to.version() {
		let steps = from.text_version().changes_to(to.text_version()).ok_or_else(unrelated)?;
		map_edges(span, steps.into_iter(), mode, ChangeSet::map_pos)
	} else {
		let steps = to.text_version().changes_to(from.text_version()).ok_or_else(unrelated)?;
		map_edges(span, steps.into_iter().rev(), mode, ChangeSet::map_pos_rev)
	};

	Ok(Span::new(to.version(), start, end))
}

fn map_edges<'a>(
	span: Span,
	steps: impl Iterator<Item = &'a ChangeSet>,
	mode: TrackingMode,
	map: fn(&ChangeSet, CharIdx, Bias) -> CharIdx,
) -> (CharIdx, CharIdx) {
	let mut start = span.start();
	let mut end = span.end();
	for changes in steps {
		start = map(changes, start, mode.start_bias());
		// An empty edge-exclusive span facing an insertion would invert; pin it to its start.
		end = map(changes, end, mode.end_bias()).max(start);
	}
	(start, end)
}
