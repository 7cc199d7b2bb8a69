use super::types::{Bias, Change, ChangedRegion, EditError, Insertion, Operation, Tendril};
use crate::Rope;
use crate::span::{CharIdx, CharLen};

/// A sequence of operations representing a set of changes to a document.
///
/// Changes are stored as retain, delete, and insert operations covering the
/// whole source document, which makes applying them and mapping positions
/// through them a single linear walk.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ChangeSet {
	/// Sequence of retain/delete/insert operations.
	pub(super) changes: Vec<Operation>,
	/// Length of the source document before changes.
	pub(super) len: usize,
	/// Length of the document after applying changes.
	pub(super) len_after: usize,
}

impl ChangeSet {
	/// Builds a changeset over a document of `doc_len` characters.
	///
	/// `changes` must be sorted by start and must not overlap. Two changes may
	/// touch, in which case they are merged into one replaced region.
	pub fn from_changes(doc_len: CharLen, changes: &[Change]) -> Result<Self, EditError> {
		let mut cs = Self::default();
		let mut last = 0;

		for change in changes {
			if change.start > change.end {
				return Err(EditError::Inverted {
					start: change.start,
					end: change.end,
				});
			}
			if change.end > doc_len {
				return Err(EditError::OutOfBounds {
					start: change.start,
					end: change.end,
					len: doc_len,
				});
			}
			if change.start < last {
				return Err(EditError::Overlapping {
					start: change.start,
					prev_end: last,
				});
			}

			cs.retain(change.start - last);
			cs.delete(change.end - change.start);
			if let Some(text) = &change.replacement {
				cs.insert(text.clone());
			}
			last = change.end;
		}

		cs.retain(doc_len - last);
		debug_assert_eq!(cs.len, doc_len);
		Ok(cs)
	}

	/// Returns the length of the source document (before changes).
	pub fn len(&self) -> usize {
		self.len
	}

	/// Returns the length of the document after applying changes.
	pub fn len_after(&self) -> usize {
		self.len_after
	}

	/// Returns true if this changeset leaves the document untouched.
	pub fn is_identity(&self) -> bool {
		self.changes.iter().all(|op| matches!(op, Operation::Retain(_)))
	}

	/// Adds a retain operation, preserving N characters from the source.
	///
	/// Consecutive retain operations are merged.
	pub(crate) fn retain(&mut self, n: CharLen) {
		if n == 0 {
			return;
		}

		self.len += n;
		self.len_after += n;

		if let Some(Operation::Retain(count)) = self.changes.last_mut() {
			*count += n;
		} else {
			self.changes.push(Operation::Retain(n));
		}
	}

	/// Adds a delete operation, removing N characters from the source.
	///
	/// Consecutive delete operations are merged.
	pub(crate) fn delete(&mut self, n: CharLen) {
		if n == 0 {
			return;
		}

		self.len += n;

		if let Some(Operation::Delete(count)) = self.changes.last_mut() {
			*count += n;
		} else {
			self.changes.push(Operation::Delete(n));
		}
	}

	/// Adds an insert operation at the current position.
	///
	/// Inserts are merged with an adjacent insert and always placed before a
	/// trailing delete, so a replaced region reads insert-then-delete.
	pub(crate) fn insert(&mut self, text: Tendril) {
		if text.is_empty() {
			return;
		}

		let ins = Insertion::new(text);
		self.len_after += ins.char_len;

		match self.changes.as_mut_slice() {
			[.., Operation::Insert(prev)] | [.., Operation::Insert(prev), Operation::Delete(_)] => {
				prev.text.push_str(&ins.text);
				prev.char_len += ins.char_len;
			}
			[.., last @ Operation::Delete(_)] => {
				let del = std::mem::replace(last, Operation::Insert(ins));
				self.changes.push(del);
			}
			_ => {
				self.changes.push(Operation::Insert(ins));
			}
		}
	}

	/// Applies this changeset to a document, modifying it in place.
	pub fn apply(&self, doc: &mut Rope) {
		if self.changes.is_empty() {
			return;
		}

		let mut pos = 0;
		for op in &self.changes {
			match op {
				Operation::Retain(n) => {
					pos += n;
				}
				Operation::Delete(n) => {
					doc.remove(pos..pos + n);
				}
				Operation::Insert(ins) => {
					doc.insert(pos, &ins.text);
					pos += ins.char_len;
				}
			}
		}
	}

	/// Maps a source position into the changed document.
	///
	/// Positions inside a deleted range collapse to the deletion point. At an
	/// insertion point, `bias` decides whether the position stays before the
	/// inserted text ([`Bias::Left`]) or moves past it ([`Bias::Right`]).
	pub fn map_pos(&self, pos: CharIdx, bias: Bias) -> CharIdx {
		let mut old_pos = 0;
		let mut new_pos = 0;

		for op in &self.changes {
			if old_pos > pos {
				break;
			}

			match op {
				Operation::Retain(n) => {
					if old_pos + n > pos {
						return new_pos + (pos - old_pos);
					}
					old_pos += n;
					new_pos += n;
				}
				Operation::Delete(n) => {
					if old_pos + n > pos {
						return new_pos;
					}
					old_pos += n;
				}
				Operation::Insert(ins) => {
					if old_pos == pos && bias == Bias::Left {
						// Position is exactly at insert point, stay before
					} else {
						new_pos += ins.char_len;
					}
				}
			}
		}

		new_pos + (pos - old_pos)
	}

	/// Maps a position in the changed document back into the source.
	///
	/// The mirror image of [`ChangeSet::map_pos`]: positions inside inserted
	/// text collapse to the insertion point, and `bias` decides which side of
	/// a deleted range a position at its location lands on.
	pub fn map_pos_rev(&self, pos: CharIdx, bias: Bias) -> CharIdx {
		let mut old_pos = 0;
		let mut new_pos = 0;

		for op in &self.changes {
			if new_pos > pos {
				break;
			}

			match op {
				Operation::Retain(n) => {
					if new_pos + n > pos {
						return old_pos + (pos - new_pos);
					}
					old_pos += n;
					new_pos += n;
				}
				Operation::Insert(ins) => {
					if new_pos + ins.char_len > pos {
						return old_pos;
					}
					new_pos += ins.char_len;
				}
				Operation::Delete(n) => {
					if new_pos == pos && bias == Bias::Left {
						// Stay before the text that was deleted here
					} else {
						old_pos += n;
					}
				}
			}
		}

		old_pos + (pos - new_pos)
	}

	/// Returns every replaced region in source and result coordinates.
	///
	/// Adjacent deletes and inserts form a single region.
	pub fn regions(&self) -> Vec<ChangedRegion> {
		let mut out = Vec::new();
		let mut old_pos = 0;
		let mut new_pos = 0;
		let mut open: Option<ChangedRegion> = None;

		for op in &self.changes {
			match op {
				Operation::Retain(n) => {
					out.extend(open.take());
					old_pos += n;
					new_pos += n;
				}
				Operation::Delete(n) => {
					let region = open.get_or_insert_with(|| ChangedRegion {
						old: old_pos..old_pos,
						new: new_pos..new_pos,
					});
					old_pos += n;
					region.old.end = old_pos;
				}
				Operation::Insert(ins) => {
					let region = open.get_or_insert_with(|| ChangedRegion {
						old: old_pos..old_pos,
						new: new_pos..new_pos,
					});
					new_pos += ins.char_len;
					region.new.end = new_pos;
				}
			}
		}

		out.extend(open);
		out
	}
}
