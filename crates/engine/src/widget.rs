//! Annotation widgets and the tags that place them.

use vartype_primitives::Span;

/// Creates and updates host-rendered annotation widgets.
///
/// The engine never looks inside a handle; it only stores, clones and returns
/// it. Handles for the same span are reused across queries, so `update` must
/// change the widget in place.
pub trait WidgetFactory {
	type Handle: Clone;

	/// Creates a widget showing `display`.
	fn create(&mut self, display: &str) -> Self::Handle;

	/// Changes an existing widget to show `display`.
	fn update(&mut self, handle: &Self::Handle, display: &str);
}

/// Which side of its zero-length anchor a widget sticks to.
///
/// Annotations always follow the keyword, so text typed at the anchor lands
/// before the widget.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Affinity {
	Successor,
}

/// Resolved content for one occurrence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnnotationDatum {
	/// The keyword token.
	pub span: Span,
	pub display: String,
}

/// One annotation returned to the host.
#[derive(Debug, Clone)]
pub struct Tag<H> {
	/// The keyword token, in the version the host asked about.
	pub span: Span,
	pub widget: H,
}

impl<H> Tag<H> {
	/// Zero-length position right after the keyword, where the widget goes.
	///
	/// Nothing is elided, so the widget takes [`Tag::affinity`].
	pub fn anchor(&self) -> Span {
		Span::point(self.span.version(), self.span.end())
	}

	pub fn affinity(&self) -> Affinity {
		Affinity::Successor
	}
}
