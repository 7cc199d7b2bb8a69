//! Occurrence scanning.
//!
//! The [`OccurrenceScanner`] finds whole-word, exact-case matches of the
//! trigger keyword on every line touched by a request, then asks a
//! [`SyntaxClassifier`] whether each match is a binder placeholder. Matches in
//! any other position are dropped here and never reach the resolver.

mod lexical;

use std::vec;

pub use lexical::LexicalClassifier;
use regex::Regex;
use vartype_primitives::{Snapshot, Span};

use crate::config::is_identifier;
use crate::error::{EngineError, Result};

/// Syntactic position of a keyword that can receive a type annotation.
///
/// Spans point into the snapshot the occurrence was scanned from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Binder {
	/// Single-variable declaration with an initializer: `var x = expr;`.
	Declaration { name: Span, initializer: Span },
	/// Loop binding over a sequence: `foreach (var x in expr)`.
	Loop { name: Span, sequence: Span },
	/// Single-variable scoped resource: `using (var x = expr)` or `using var x = expr;`.
	Resource { name: Span, initializer: Span },
}

/// Fieldless discriminant of [`Binder`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BinderKind {
	Declaration,
	Loop,
	Resource,
}

impl Binder {
	pub fn kind(&self) -> BinderKind {
		match self {
			Self::Declaration { .. } => BinderKind::Declaration,
			Self::Loop { .. } => BinderKind::Loop,
			Self::Resource { .. } => BinderKind::Resource,
		}
	}

	/// Returns the span of the bound variable name.
	pub fn name(&self) -> Span {
		match self {
			Self::Declaration { name, .. } | Self::Loop { name, .. } | Self::Resource { name, .. } => *name,
		}
	}

	/// Returns the span of the expression whose type the keyword stands for.
	///
	/// For loops this is the sequence; its element type is what gets shown.
	pub fn expression(&self) -> Span {
		match self {
			Self::Declaration { initializer, .. } | Self::Resource { initializer, .. } => *initializer,
			Self::Loop { sequence, .. } => *sequence,
		}
	}
}

/// A keyword match in a binder position. Produced fresh per scan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Occurrence {
	/// The keyword token.
	pub span: Span,
	/// Syntactic context of the token.
	pub binder: Binder,
}

impl Occurrence {
	#[inline]
	pub fn kind(&self) -> BinderKind {
		self.binder.kind()
	}
}

/// Decides the syntactic context of a keyword token.
///
/// Only the innermost construct around the token is considered; return
/// `None` when it is not one of the three binder shapes.
pub trait SyntaxClassifier {
	fn classify(&self, snapshot: &Snapshot, keyword: Span) -> Option<Binder>;
}

/// Finds keyword occurrences on requested lines.
#[derive(Debug, Clone)]
pub struct OccurrenceScanner {
	keyword: String,
	pattern: Regex,
}

impl OccurrenceScanner {
	/// Builds a scanner for `keyword`, which must be a plain identifier.
	pub fn new(keyword: &str) -> Result<Self> {
		if !is_identifier(keyword) {
			return Err(EngineError::InvalidKeyword(keyword.to_string()));
		}
		let pattern = Regex::new(&format!(r"\b{}\b", regex::escape(keyword)))?;
		Ok(Self {
			keyword: keyword.to_string(),
			pattern,
		})
	}

	pub fn keyword(&self) -> &str {
		&self.keyword
	}

	/// Returns the occurrences on every line intersecting `spans`.
	///
	/// All spans must belong to `snapshot`. Each line is scanned at most once,
	/// and lines are only read as the iterator advances.
	pub fn scan<'a, C>(&'a self, snapshot: &'a Snapshot, spans: &[Span], classifier: &'a C) -> Occurrences<'a, C>
	where
		C: SyntaxClassifier + ?Sized,
	{
		Occurrences {
			scanner: self,
			snapshot,
			classifier,
			lines: line_ranges(snapshot, spans),
			next_line: None,
			matches: Vec::new().into_iter(),
		}
	}

	/// Returns the keyword tokens on `line`.
	fn tokens(&self, snapshot: &Snapshot, line: usize) -> Vec<Span> {
		let line_span = snapshot.line_span(line);
		let text = snapshot.slice(line_span).to_string();

		let mut tokens = Vec::new();
		let mut chars = 0;
		let mut bytes = 0;
		for found in self.pattern.find_iter(&text) {
			chars += text[bytes..found.start()].chars().count();
			let len = found.as_str().chars().count();
			let start = line_span.start() + chars;
			tokens.push(line_span.with_offsets(start, start + len));
			chars += len;
			bytes = found.end();
		}
		tokens
	}
}

/// Sorted, merged, inclusive line ranges touched by `spans`.
fn line_ranges(snapshot: &Snapshot, spans: &[Span]) -> vec::IntoIter<(usize, usize)> {
	let mut ranges: Vec<(usize, usize)> = spans
		.iter()
		.map(|span| (snapshot.line_of(span.start()), snapshot.line_of(span.end())))
		.collect();
	ranges.sort_unstable();

	let mut merged: Vec<(usize, usize)> = Vec::with_capacity(ranges.len());
	for (first, last) in ranges {
		match merged.last_mut() {
			Some(prev) if first <= prev.1 + 1 => prev.1 = prev.1.max(last),
			_ => merged.push((first, last)),
		}
	}
	merged.into_iter()
}

/// Lazy occurrence sequence returned by [`OccurrenceScanner::scan`].
pub struct Occurrences<'a, C: ?Sized> {
	scanner: &'a OccurrenceScanner,
	snapshot: &'a Snapshot,
	classifier: &'a C,
	lines: vec::IntoIter<(usize, usize)>,
	next_line: Option<(usize, usize)>,
	matches: vec::IntoIter<Span>,
}

impl<C: SyntaxClassifier + ?Sized> Occurrences<'_, C> {
	fn advance_line(&mut self) -> Option<usize> {
		let (line, last) = match self.next_line.take() {
			Some(range) => range,
			None => self.lines.next()?,
		};
		if line < last {
			self.next_line = Some((line + 1, last));
		}
		Some(line)
	}
}

impl<C: SyntaxClassifier + ?Sized> Iterator for Occurrences<'_, C> {
	type Item = Occurrence;

	fn next(&mut self) -> Option<Occurrence> {
		loop {
			for span in self.matches.by_ref() {
				match self.classifier.classify(self.snapshot, span) {
					Some(binder) => return Some(Occurrence { span, binder }),
					None => tracing::trace!(?span, "keyword outside a binder position"),
				}
			}
			let line = self.advance_line()?;
			self.matches = self.scanner.tokens(self.snapshot, line).into_iter();
		}
	}
}

#[cfg(test)]
mod tests;
