//! Versioned document model.
//!
//! A [`Document`] is the host-owned, mutable side: it holds the current rope
//! and appends one [`TextVersion`] per applied edit. Everything handed out is
//! immutable: a [`Snapshot`] pins the text of one version, and an
//! [`EditDelta`] describes how one version became the next.
//!
//! Versions form a forward-linked history. Each node records the changeset
//! that produced its successor, so a span can be carried from any snapshot
//! to any later snapshot of the same document (see [`crate::translate`]).
//! Nodes are freed once no snapshot refers to them or to an older node.

use std::fmt;
use std::sync::{Arc, OnceLock};

use ropey::{Rope, RopeSlice};

use crate::rope::{line_bounds, line_of};
use crate::span::{CharIdx, CharLen, Span, Version};
use crate::transaction::{Change, ChangeSet, EditError, Tendril};
use crate::translate::{TrackingMode, TranslateError, translate_span};

/// One node of a document's version history.
pub struct TextVersion {
	number: Version,
	len: CharLen,
	next: OnceLock<VersionLink>,
}

/// Link from a version to its successor.
struct VersionLink {
	changes: Arc<ChangeSet>,
	next: Arc<TextVersion>,
}

impl TextVersion {
	fn root(len: CharLen) -> Arc<Self> {
		Arc::new(Self {
			number: Version::INITIAL,
			len,
			next: OnceLock::new(),
		})
	}

	/// Returns the version number of this node.
	pub fn number(&self) -> Version {
		self.number
	}

	/// Returns the document length at this version.
	pub fn len(&self) -> CharLen {
		self.len
	}

	/// Returns true if the document was empty at this version.
	pub fn is_empty(&self) -> bool {
		self.len == 0
	}

	/// Returns the changeset that produced the next version and that version,
	/// or `None` if this is the newest version.
	pub fn next(&self) -> Option<(&ChangeSet, &Arc<TextVersion>)> {
		self.next.get().map(|link| (&*link.changes, &link.next))
	}

	/// Collects the changesets leading from `self` to `target`.
	///
	/// Returns `None` when `target` is not `self` or one of its successors.
	pub(crate) fn changes_to<'a>(&'a self, target: &TextVersion) -> Option<Vec<&'a ChangeSet>> {
		let mut node = self;
		let mut out = Vec::new();
		while !std::ptr::eq(node, target) {
			if node.number >= target.number {
				return None;
			}
			let link = node.next.get()?;
			out.push(&*link.changes);
			node = &*link.next;
		}
		Some(out)
	}
}

impl Drop for TextVersion {
	fn drop(&mut self) {
		// Unlink iteratively so long histories don't recurse on drop.
		let mut next = self.next.take();
		while let Some(link) = next {
			next = match Arc::try_unwrap(link.next) {
				Ok(mut node) => node.next.take(),
				Err(_) => None,
			};
		}
	}
}

impl fmt::Debug for TextVersion {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("TextVersion")
			.field("number", &self.number)
			.field("len", &self.len)
			.field("has_next", &self.next.get().is_some())
			.finish()
	}
}

/// Immutable view of a document at one version.
///
/// Cloning is cheap: the rope and the version node are shared.
#[derive(Clone)]
pub struct Snapshot {
	text: Rope,
	node: Arc<TextVersion>,
}

impl Snapshot {
	/// Returns the version of this snapshot.
	#[inline]
	pub fn version(&self) -> Version {
		self.node.number
	}

	/// Returns the version history node of this snapshot.
	#[inline]
	pub fn text_version(&self) -> &Arc<TextVersion> {
		&self.node
	}

	/// Returns the full text.
	#[inline]
	pub fn text(&self) -> RopeSlice<'_> {
		self.text.slice(..)
	}

	#[inline]
	pub fn len_chars(&self) -> CharLen {
		self.text.len_chars()
	}

	#[inline]
	pub fn len_lines(&self) -> usize {
		self.text.len_lines()
	}

	/// Returns a span in this version, or `None` if the offsets are inverted or out of bounds.
	pub fn span(&self, start: CharIdx, end: CharIdx) -> Option<Span> {
		if end > self.len_chars() {
			return None;
		}
		Span::checked(self.version(), start, end)
	}

	/// Returns the span covering the whole document.
	pub fn full_span(&self) -> Span {
		Span::new(self.version(), 0, self.len_chars())
	}

	/// Returns true if `span` is scoped to this version and lies within the text.
	pub fn contains_span(&self, span: &Span) -> bool {
		span.version() == self.version() && span.end() <= self.len_chars()
	}

	/// Returns the text covered by `span`.
	///
	/// The span must belong to this snapshot; offsets past the end are clamped.
	pub fn slice(&self, span: Span) -> RopeSlice<'_> {
		debug_assert_eq!(span.version(), self.version());
		let end = span.end().min(self.len_chars());
		let start = span.start().min(end);
		self.text.slice(start..end)
	}

	/// Returns the line index containing `pos`.
	pub fn line_of(&self, pos: CharIdx) -> usize {
		line_of(self.text(), pos)
	}

	/// Returns the span of `line`, excluding its line break.
	pub fn line_span(&self, line: usize) -> Span {
		let (start, end) = line_bounds(self.text(), line);
		Span::new(self.version(), start, end)
	}

	/// Expands `span` to cover every line it touches, excluding the final line break.
	pub fn line_extent(&self, span: Span) -> Span {
		let first = self.line_span(self.line_of(span.start()));
		let last = self.line_span(self.line_of(span.end()));
		first.cover(last)
	}

	/// Returns true if `self` is an older version of the same document as `other`.
	pub fn precedes(&self, other: &Snapshot) -> bool {
		self.version() < other.version() && self.node.changes_to(&other.node).is_some()
	}

	/// Returns true if both snapshots pin the same version of the same document.
	pub fn same_version(&self, other: &Snapshot) -> bool {
		Arc::ptr_eq(&self.node, &other.node)
	}

	/// Translates `span` from this snapshot into `target`.
	pub fn translate(&self, span: Span, target: &Snapshot, mode: TrackingMode) -> Result<Span, TranslateError> {
		translate_span(span, self, target, mode)
	}
}

impl fmt::Debug for Snapshot {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Snapshot")
			.field("version", &self.version())
			.field("len", &self.len_chars())
			.finish()
	}
}

/// One replaced region of an edit, expressed in the version before the edit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Edit {
	/// Replaced span in the version before the edit.
	pub old: Span,
	/// Text that replaced it.
	pub new_text: Tendril,
}

/// The change that turned one version of a document into the next.
#[derive(Debug, Clone)]
pub struct EditDelta {
	before: Snapshot,
	after: Snapshot,
	changes: Arc<ChangeSet>,
	edits: Vec<Edit>,
}

impl EditDelta {
	/// Returns the snapshot the edit was applied to.
	pub fn before(&self) -> &Snapshot {
		&self.before
	}

	/// Returns the snapshot the edit produced.
	pub fn after(&self) -> &Snapshot {
		&self.after
	}

	/// Returns the underlying changeset.
	pub fn changes(&self) -> &ChangeSet {
		&self.changes
	}

	/// Returns the replaced regions as `(old span, new text)` pairs, sorted by position.
	pub fn edits(&self) -> &[Edit] {
		&self.edits
	}

	/// Returns true if the edit changed nothing.
	pub fn is_empty(&self) -> bool {
		self.edits.is_empty()
	}

	/// Returns the span each replacement occupies in the version after the edit.
	pub fn new_spans(&self) -> Vec<Span> {
		let version = self.after.version();
		self.changes
			.regions()
			.into_iter()
			.map(|region| Span::new(version, region.new.start, region.new.end))
			.collect()
	}
}

/// Host-owned mutable document.
///
/// Every successful [`Document::apply`] produces a new version and returns the
/// [`EditDelta`] describing it; observers only ever see snapshots and deltas.
pub struct Document {
	text: Rope,
	head: Arc<TextVersion>,
}

impl Document {
	/// Opens a document at [`Version::INITIAL`].
	pub fn new(text: &str) -> Self {
		let text = Rope::from_str(text);
		let head = TextVersion::root(text.len_chars());
		Self { text, head }
	}

	/// Returns the current version.
	pub fn version(&self) -> Version {
		self.head.number
	}

	/// Returns a snapshot of the current version.
	pub fn snapshot(&self) -> Snapshot {
		Snapshot {
			text: self.text.clone(),
			node: self.head.clone(),
		}
	}

	/// Applies a batch of non-overlapping changes as one new version.
	///
	/// Changes may be given in any order. An empty batch produces no new
	/// version and an empty delta.
	pub fn apply(&mut self, changes: impl IntoIterator<Item = Change>) -> Result<EditDelta, EditError> {
		let before = self.snapshot();
		let mut changes: Vec<Change> = changes.into_iter().collect();
		changes.sort_by_key(|change| change.start);

		let changeset = Arc::new(ChangeSet::from_changes(self.text.len_chars(), &changes)?);
		if changes.is_empty() {
			return Ok(EditDelta {
				after: before.clone(),
				before,
				changes: changeset,
				edits: Vec::new(),
			});
		}

		let edits = changes
			.into_iter()
			.map(|change| Edit {
				old: Span::new(before.version(), change.start, change.end),
				new_text: change.replacement.unwrap_or_default(),
			})
			.collect();

		changeset.apply(&mut self.text);
		let node = Arc::new(TextVersion {
			number: self.head.number.next(),
			len: self.text.len_chars(),
			next: OnceLock::new(),
		});
		let linked = self.head.next.set(VersionLink {
			changes: changeset.clone(),
			next: node.clone(),
		});
		debug_assert!(linked.is_ok(), "document head already has a successor");
		self.head = node;

		Ok(EditDelta {
			before,
			after: self.snapshot(),
			changes: changeset,
			edits,
		})
	}

	/// Inserts `text` at `pos`.
	pub fn insert(&mut self, pos: CharIdx, text: &str) -> Result<EditDelta, EditError> {
		self.apply([Change::insert(pos, text)])
	}

	/// Deletes `[start, end)`.
	pub fn delete(&mut self, start: CharIdx, end: CharIdx) -> Result<EditDelta, EditError> {
		self.apply([Change::delete(start, end)])
	}

	/// Replaces `[start, end)` with `text`.
	pub fn replace(&mut self, start: CharIdx, end: CharIdx, text: &str) -> Result<EditDelta, EditError> {
		self.apply([Change::replace(start, end, text)])
	}
}

impl fmt::Debug for Document {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Document")
			.field("version", &self.version())
			.field("len", &self.text.len_chars())
			.finish()
	}
}
