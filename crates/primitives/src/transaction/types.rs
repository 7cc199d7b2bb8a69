use std::ops::Range;

use thiserror::Error;

use crate::span::{CharIdx, CharLen};

/// Owned replacement text.
pub type Tendril = String;

/// Represents a single text change operation.
///
/// A change describes replacing the text range `[start, end)` with the optional
/// `replacement` text. If `replacement` is [`None`], this represents a deletion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Change {
	/// The starting character index of the change.
	pub start: CharIdx,
	/// The ending character index of the change (exclusive).
	pub end: CharIdx,
	/// The replacement text, or [`None`] for deletion.
	pub replacement: Option<Tendril>,
}

impl Change {
	/// Inserts `text` at `pos`.
	pub fn insert(pos: CharIdx, text: impl Into<Tendril>) -> Self {
		Self {
			start: pos,
			end: pos,
			replacement: Some(text.into()),
		}
	}

	/// Deletes `[start, end)`.
	pub fn delete(start: CharIdx, end: CharIdx) -> Self {
		Self { start, end, replacement: None }
	}

	/// Replaces `[start, end)` with `text`.
	pub fn replace(start: CharIdx, end: CharIdx, text: impl Into<Tendril>) -> Self {
		Self {
			start,
			end,
			replacement: Some(text.into()),
		}
	}
}

/// Bias determines how positions at change boundaries are mapped.
///
/// When mapping a position through a change, bias determines whether the position
/// moves with insertions or stays before them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bias {
	/// Position stays before insertions at the same location.
	Left,
	/// Position moves after insertions at the same location.
	Right,
}

/// Inserted text with its character length computed once.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Insertion {
	pub(super) text: Tendril,
	pub(super) char_len: CharLen,
}

impl Insertion {
	pub(crate) fn new(text: Tendril) -> Self {
		let char_len = text.chars().count();
		Self { text, char_len }
	}
}

/// One step of a changeset walk over the source document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Operation {
	Retain(CharLen),
	Delete(CharLen),
	Insert(Insertion),
}

/// One contiguous replaced region of a changeset, in both coordinate spaces.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangedRegion {
	/// Replaced range in the source document.
	pub old: Range<CharIdx>,
	/// Range occupied by the replacement in the resulting document.
	pub new: Range<CharIdx>,
}

/// Errors raised when building a changeset from a change list.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EditError {
	/// A change ends before it starts.
	#[error("change {start}..{end} is inverted")]
	Inverted { start: CharIdx, end: CharIdx },

	/// A change extends past the end of the document.
	#[error("change {start}..{end} exceeds document length {len}")]
	OutOfBounds { start: CharIdx, end: CharIdx, len: CharLen },

	/// Changes are unsorted or overlap.
	#[error("change starting at {start} overlaps the previous change ending at {prev_end}")]
	Overlapping { start: CharIdx, prev_end: CharIdx },
}
