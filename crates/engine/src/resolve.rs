//! Type resolution through an external semantic service.

use vartype_primitives::Snapshot;

use crate::scan::Occurrence;

/// Type information reported by a [`SemanticModel`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeInfo {
	/// Display name, minimally qualified relative to the occurrence.
	pub display: String,
	/// True if the type is, or is built from, an anonymous type.
	pub anonymous: bool,
}

impl TypeInfo {
	pub fn named(display: impl Into<String>) -> Self {
		Self {
			display: display.into(),
			anonymous: false,
		}
	}

	pub fn anonymous(display: impl Into<String>) -> Self {
		Self {
			display: display.into(),
			anonymous: true,
		}
	}
}

/// External semantic service.
///
/// For declarations and resources the answer is the initializer's type; for
/// loops it is the element type of the sequence. Implementations should
/// return quickly: the engine calls this synchronously.
pub trait SemanticModel {
	fn type_of(&self, snapshot: &Snapshot, occurrence: &Occurrence) -> Option<TypeInfo>;
}

impl<F> SemanticModel for F
where
	F: Fn(&Snapshot, &Occurrence) -> Option<TypeInfo>,
{
	fn type_of(&self, snapshot: &Snapshot, occurrence: &Occurrence) -> Option<TypeInfo> {
		self(snapshot, occurrence)
	}
}

/// Turns occurrences into display text, dropping anything unusable.
#[derive(Debug, Clone)]
pub struct TypeResolver<S> {
	model: S,
	hide_anonymous: bool,
}

impl<S: SemanticModel> TypeResolver<S> {
	pub fn new(model: S, hide_anonymous: bool) -> Self {
		Self { model, hide_anonymous }
	}

	pub fn model(&self) -> &S {
		&self.model
	}

	/// Returns the text to show for `occurrence`, or `None` if there is nothing to show.
	pub fn resolve(&self, snapshot: &Snapshot, occurrence: &Occurrence) -> Option<String> {
		let Some(info) = self.model.type_of(snapshot, occurrence) else {
			tracing::trace!(span = ?occurrence.span, kind = ?occurrence.kind(), "no type information");
			return None;
		};
		if info.anonymous && self.hide_anonymous {
			tracing::trace!(span = ?occurrence.span, "anonymous type hidden");
			return None;
		}
		if info.display.trim().is_empty() {
			tracing::trace!(span = ?occurrence.span, "blank type name");
			return None;
		}
		Some(info.display)
	}
}

#[cfg(test)]
mod tests {
	use vartype_primitives::Document;

	use super::*;
	use crate::scan::{LexicalClassifier, OccurrenceScanner};

	fn occurrence(snapshot: &Snapshot) -> Occurrence {
		let scanner = OccurrenceScanner::new("var").unwrap();
		scanner
			.scan(snapshot, &[snapshot.full_span()], &LexicalClassifier)
			.next()
			.unwrap()
	}

	#[test]
	fn resolves_from_the_expression_text() {
		let snapshot = Document::new("var x = 5;").snapshot();
		let model = |snap: &Snapshot, occ: &Occurrence| {
			let expr = snap.slice(occ.binder.expression()).to_string();
			(expr == "5").then(|| TypeInfo::named("int"))
		};
		let resolver = TypeResolver::new(model, true);
		assert_eq!(resolver.resolve(&snapshot, &occurrence(&snapshot)).as_deref(), Some("int"));
	}

	#[test]
	fn misses_and_blank_names_resolve_to_nothing() {
		let snapshot = Document::new("var x = y;").snapshot();
		let occ = occurrence(&snapshot);

		let missing = TypeResolver::new(|_: &Snapshot, _: &Occurrence| -> Option<TypeInfo> { None }, true);
		assert_eq!(missing.resolve(&snapshot, &occ), None);

		let blank = TypeResolver::new(|_: &Snapshot, _: &Occurrence| Some(TypeInfo::named("  ")), true);
		assert_eq!(blank.resolve(&snapshot, &occ), None);
	}

	#[test]
	fn anonymous_types_follow_configuration() {
		let snapshot = Document::new("var p = new { A = 1 };").snapshot();
		let occ = occurrence(&snapshot);
		let model = |_: &Snapshot, _: &Occurrence| Some(TypeInfo::anonymous("<anonymous type: int A>"));

		assert_eq!(TypeResolver::new(model, true).resolve(&snapshot, &occ), None);
		assert_eq!(
			TypeResolver::new(model, false).resolve(&snapshot, &occ).as_deref(),
			Some("<anonymous type: int A>")
		);
	}
}
