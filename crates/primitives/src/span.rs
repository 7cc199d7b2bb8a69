use std::fmt;
use std::ops::Range;

/// A position in the text, measured in characters (not bytes).
pub type CharIdx = usize;

/// A length or count in the text, measured in characters (not bytes).
///
/// This is distinct from CharIdx to avoid accidentally passing an index
/// where a length is expected or vice versa.
pub type CharLen = usize;

/// Identifier of one immutable document state.
///
/// Versions increase monotonically within a single document history. Numbers
/// from different documents are not comparable.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Version(pub u64);

impl Version {
	/// Version of a freshly opened document.
	pub const INITIAL: Version = Version(0);

	/// Returns the version that follows this one.
	#[inline]
	pub const fn next(self) -> Self {
		Self(self.0 + 1)
	}

	/// Returns the raw version number.
	#[inline]
	pub const fn get(self) -> u64 {
		self.0
	}
}

impl fmt::Display for Version {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "v{}", self.0)
	}
}

/// A half-open character range `[start, end)` scoped to one document version.
///
/// Offsets are only meaningful relative to the version they carry. Two spans
/// are equal iff their version and both offsets are equal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Span {
	version: Version,
	start: CharIdx,
	end: CharIdx,
}

impl Span {
	/// Creates a span over `[start, end)` in `version`.
	///
	/// # Panics
	///
	/// Panics if `start > end`. Use [`Span::checked`] for untrusted offsets.
	pub fn new(version: Version, start: CharIdx, end: CharIdx) -> Self {
		assert!(start <= end, "span start {start} is after end {end}");
		Self { version, start, end }
	}

	/// Creates a span, returning `None` if `start > end`.
	pub fn checked(version: Version, start: CharIdx, end: CharIdx) -> Option<Self> {
		(start <= end).then_some(Self { version, start, end })
	}

	/// Creates a zero-length span at `pos`.
	pub fn point(version: Version, pos: CharIdx) -> Self {
		Self { version, start: pos, end: pos }
	}

	/// Returns the version this span is scoped to.
	#[inline]
	pub fn version(&self) -> Version {
		self.version
	}

	/// Returns the inclusive start offset.
	#[inline]
	pub fn start(&self) -> CharIdx {
		self.start
	}

	/// Returns the exclusive end offset.
	#[inline]
	pub fn end(&self) -> CharIdx {
		self.end
	}

	#[inline]
	pub fn len(&self) -> CharLen {
		self.end - self.start
	}

	#[inline]
	pub fn is_empty(&self) -> bool {
		self.start == self.end
	}

	/// Returns the offsets as a standard range.
	#[inline]
	pub fn range(&self) -> Range<CharIdx> {
		self.start..self.end
	}

	/// Returns true if `pos` lies in `[start, end)`.
	#[inline]
	pub fn contains(&self, pos: CharIdx) -> bool {
		self.start <= pos && pos < self.end
	}

	/// Returns true if the spans share a version and overlap or touch.
	///
	/// Touching counts: `[0, 3)` intersects `[3, 5)`, and an empty span
	/// intersects any span whose closed extent contains it.
	pub fn intersects(&self, other: &Span) -> bool {
		self.version == other.version && other.start <= self.end && other.end >= self.start
	}

	/// Returns true if the spans share a version and have at least one character in common.
	pub fn overlaps(&self, other: &Span) -> bool {
		self.version == other.version && self.start.max(other.start) < self.end.min(other.end)
	}

	/// Returns the smallest span covering both spans.
	///
	/// Both spans must share a version.
	pub fn cover(&self, other: Span) -> Span {
		debug_assert_eq!(self.version, other.version);
		Span {
			version: self.version,
			start: self.start.min(other.start),
			end: self.end.max(other.end),
		}
	}

	/// Returns a span in the same version with new offsets.
	pub fn with_offsets(&self, start: CharIdx, end: CharIdx) -> Span {
		Span::new(self.version, start, end)
	}

	/// Sorts spans and merges the ones that overlap or adjoin.
	///
	/// All spans must share a version.
	pub fn normalize(spans: impl IntoIterator<Item = Span>) -> Vec<Span> {
		let mut spans: Vec<Span> = spans.into_iter().collect();
		spans.sort_unstable();

		let mut out: Vec<Span> = Vec::with_capacity(spans.len());
		for span in spans {
			match out.last_mut() {
				Some(last) if span.start <= last.end => {
					debug_assert_eq!(last.version, span.version);
					last.end = last.end.max(span.end);
				}
				_ => out.push(span),
			}
		}
		out
	}
}

impl fmt::Display for Span {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}@{}..{}", self.version, self.start, self.end)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	const V: Version = Version(3);

	#[test]
	fn touching_spans_intersect_but_do_not_overlap() {
		let a = Span::new(V, 0, 3);
		let b = Span::new(V, 3, 5);
		assert!(a.intersects(&b));
		assert!(!a.overlaps(&b));
	}

	#[test]
	fn empty_span_intersects_at_edges() {
		let span = Span::new(V, 4, 8);
		assert!(Span::point(V, 4).intersects(&span));
		assert!(Span::point(V, 8).intersects(&span));
		assert!(!Span::point(V, 9).intersects(&span));
	}

	#[test]
	fn spans_of_different_versions_never_intersect() {
		let a = Span::new(Version(1), 0, 10);
		let b = Span::new(Version(2), 0, 10);
		assert!(!a.intersects(&b));
		assert_ne!(a, b);
	}

	#[test]
	fn checked_rejects_inverted_offsets() {
		assert!(Span::checked(V, 5, 4).is_none());
		assert_eq!(Span::checked(V, 4, 5), Some(Span::new(V, 4, 5)));
	}

	#[test]
	fn normalize_merges_overlapping_and_adjoining() {
		let spans = vec![Span::new(V, 10, 12), Span::new(V, 0, 3), Span::new(V, 3, 5), Span::new(V, 11, 20), Span::new(V, 30, 31)];
		assert_eq!(
			Span::normalize(spans),
			vec![Span::new(V, 0, 5), Span::new(V, 10, 20), Span::new(V, 30, 31)]
		);
	}

	#[test]
	fn cover_spans_both() {
		assert_eq!(Span::new(V, 8, 9).cover(Span::new(V, 2, 4)), Span::new(V, 2, 9));
	}
}
