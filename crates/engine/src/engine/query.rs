//! Synchronous tag queries.

use vartype_primitives::{Snapshot, Span, TrackingMode};

use super::{AnnotationEngine, annotation_data, check_span};
use crate::error::{EngineError, Result};
use crate::resolve::SemanticModel;
use crate::scan::SyntaxClassifier;
use crate::widget::{Tag, WidgetFactory};

impl<C, S, W> AnnotationEngine<C, S, W>
where
	C: SyntaxClassifier,
	S: SemanticModel,
	W: WidgetFactory,
{
	/// Returns the annotations on the lines touched by `spans`.
	///
	/// All spans must belong to `snapshot`. The request is carried to the
	/// engine's current snapshot, scanned and resolved live, reconciled
	/// against the cache, and the resulting tags are carried back to
	/// `snapshot`. Tags whose token does not exist in `snapshot` are left out.
	///
	/// A snapshot newer than anything seen so far becomes current. An empty
	/// request returns no tags. While annotations are disabled the cache is
	/// cleared and no tags are returned.
	pub fn get_tags(&mut self, snapshot: &Snapshot, spans: &[Span]) -> Result<Vec<Tag<W::Handle>>> {
		let Some(first) = spans.first() else {
			return Ok(Vec::new());
		};
		for span in spans {
			if span.version() != first.version() {
				return Err(EngineError::MixedVersions {
					first: first.version(),
					other: span.version(),
				});
			}
			check_span(snapshot, *span)?;
		}

		if !self.toggle.is_enabled() {
			self.cache.clear();
			return Ok(Vec::new());
		}

		self.advance_to(snapshot)?;
		self.cache.catch_up(&self.current)?;

		let requested = spans
			.iter()
			.map(|span| snapshot.translate(*span, &self.current, TrackingMode::EdgeExclusive))
			.collect::<std::result::Result<Vec<_>, _>>()?;
		let requested = Span::normalize(requested);
		let scanned: Vec<Span> = requested.iter().map(|span| self.current.line_extent(*span)).collect();

		let data = annotation_data(&self.scanner, &self.classifier, &self.resolver, &self.current, &requested);
		let out = self.cache.reconcile(&scanned, data, &mut self.widgets);
		tracing::trace!(
			version = %self.current.version(),
			requested = requested.len(),
			created = out.created,
			updated = out.updated,
			evicted = out.evicted,
			"tags reconciled"
		);

		let mut tags = Vec::with_capacity(out.tags.len());
		for tag in out.tags {
			let span = self.current.translate(tag.span, snapshot, TrackingMode::EdgeExclusive)?;
			if span.is_empty() {
				continue;
			}
			tags.push(Tag { span, widget: tag.widget });
		}
		Ok(tags)
	}
}
