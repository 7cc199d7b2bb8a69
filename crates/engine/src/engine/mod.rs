//! The annotation engine.
//!
//! [`AnnotationEngine`] ties the pipeline together on the host's event
//! thread:
//!
//! * [`on_edit`](AnnotationEngine::on_edit) records the line extents of every
//!   change in the pending set and schedules one recompute pass per
//!   empty to non-empty transition, so a burst of edits costs one pass.
//! * [`run_deferred`](AnnotationEngine::run_deferred) is called by the host
//!   once the edit call stack has unwound. A recompute pass catches the cache
//!   up to the newest snapshot, refreshes the cached widgets in the bounding
//!   range of everything pending, and raises [`TagsChanged`] for that range.
//!   It never creates widgets; only queries do.
//! * [`get_tags`](AnnotationEngine::get_tags) answers what to render now by
//!   scanning the requested range live (see `query.rs`).
//!
//! Passes are never cancelled. A pass scheduled before further edits simply
//! runs against whatever snapshot is current when it fires.

mod query;

use tokio::sync::mpsc;
use vartype_primitives::{EditDelta, Snapshot, Span, TrackingMode};

use crate::cache::AnnotationCache;
use crate::config::EngineConfig;
use crate::error::{EngineError, Result};
use crate::events::{TagsChanged, TagsChangedEmitter};
use crate::pending::PendingInvalidations;
use crate::resolve::{SemanticModel, TypeResolver};
use crate::scan::{OccurrenceScanner, SyntaxClassifier};
use crate::toggle::DisplayToggle;
use crate::widget::{AnnotationDatum, WidgetFactory};
use crate::work_queue::{DeferredWork, DeferredWorkQueue, DrainReport};

/// Incremental inline type annotations for one document.
pub struct AnnotationEngine<C, S, W: WidgetFactory> {
	config: EngineConfig,
	scanner: OccurrenceScanner,
	classifier: C,
	resolver: TypeResolver<S>,
	widgets: W,
	/// Newest snapshot seen through edits or queries.
	current: Snapshot,
	/// Snapshot produced by the last accepted edit.
	edited: Snapshot,
	cache: AnnotationCache<W::Handle>,
	pending: PendingInvalidations,
	work: DeferredWorkQueue,
	events: TagsChangedEmitter,
	toggle: DisplayToggle,
}

impl<C, S, W> AnnotationEngine<C, S, W>
where
	C: SyntaxClassifier,
	S: SemanticModel,
	W: WidgetFactory,
{
	/// Creates an engine tracking the document `snapshot` belongs to.
	///
	/// The engine follows the process-wide [`DisplayToggle`]; use
	/// [`with_toggle`](Self::with_toggle) to give it its own.
	pub fn new(snapshot: Snapshot, classifier: C, model: S, widgets: W, config: EngineConfig) -> Result<Self> {
		config.validate()?;
		let scanner = OccurrenceScanner::new(&config.keyword)?;
		Ok(Self {
			scanner,
			classifier,
			resolver: TypeResolver::new(model, config.hide_anonymous),
			widgets,
			cache: AnnotationCache::new(snapshot.clone()),
			edited: snapshot.clone(),
			current: snapshot,
			pending: PendingInvalidations::new(),
			work: DeferredWorkQueue::default(),
			events: TagsChangedEmitter::default(),
			toggle: DisplayToggle::global(),
			config,
		})
	}

	/// Replaces the display toggle this engine follows.
	pub fn with_toggle(mut self, toggle: DisplayToggle) -> Self {
		self.toggle = toggle;
		self
	}

	pub fn config(&self) -> &EngineConfig {
		&self.config
	}

	/// Returns the newest snapshot the engine has seen.
	pub fn current(&self) -> &Snapshot {
		&self.current
	}

	pub fn widgets(&self) -> &W {
		&self.widgets
	}

	/// Returns the number of cached widgets.
	pub fn cached_len(&self) -> usize {
		self.cache.len()
	}

	/// Returns the number of spans awaiting a recompute pass.
	pub fn pending_len(&self) -> usize {
		self.pending.len()
	}

	/// Returns the number of queued deferred work items.
	pub fn deferred_len(&self) -> usize {
		self.work.len()
	}

	/// Subscribes to [`TagsChanged`] notifications.
	pub fn subscribe(&mut self) -> mpsc::UnboundedReceiver<TagsChanged> {
		self.events.subscribe()
	}

	pub fn is_enabled(&self) -> bool {
		self.toggle.is_enabled()
	}

	/// Turns annotations on or off.
	///
	/// Disabling drops every cached widget and pending span at once. Any
	/// actual change of the flag posts a deferred refresh of the whole
	/// document so the host re-queries after this call unwinds.
	pub fn set_enabled(&mut self, enabled: bool) {
		let was = self.toggle.set(enabled);
		if !enabled {
			self.cache.clear();
			self.pending.clear();
			self.work.remove(DeferredWork::Recompute);
		}
		if was != enabled {
			let seq = self.work.enqueue(DeferredWork::RefreshAll);
			tracing::debug!(enabled, seq, "display toggled");
		}
	}

	/// Records an edit reported by the host.
	///
	/// Deltas that are not newer than the last accepted one are ignored.
	/// Deltas from another document are rejected.
	pub fn on_edit(&mut self, delta: &EditDelta) -> Result<()> {
		if delta.is_empty() {
			return Ok(());
		}
		let after = delta.after();
		if !self.edited.precedes(after) {
			if after.same_version(&self.edited) || after.precedes(&self.edited) {
				tracing::debug!(version = %after.version(), edited = %self.edited.version(), "ignoring stale edit");
				return Ok(());
			}
			return Err(EngineError::ForeignSnapshot(after.version()));
		}

		let contiguous = delta.before().same_version(&self.edited);
		self.edited = after.clone();
		self.advance_to(after)?;

		if !self.toggle.is_enabled() {
			return Ok(());
		}

		let affected: Vec<Span> = if contiguous {
			delta.new_spans().into_iter().map(|span| after.line_extent(span)).collect()
		} else {
			tracing::debug!(before = %delta.before().version(), after = %after.version(), "edit history has a gap, invalidating everything");
			vec![after.full_span()]
		};

		if self.pending.extend(after, affected) {
			debug_assert!(!self.work.has_recompute());
			let seq = self.work.enqueue(DeferredWork::Recompute);
			tracing::trace!(version = %after.version(), seq, "recompute scheduled");
		}
		Ok(())
	}

	/// Runs queued deferred work, at most `drain-budget` items per call.
	pub fn run_deferred(&mut self) -> DrainReport {
		let mut report = DrainReport::default();

		for _ in 0..self.config.drain_budget {
			let Some(item) = self.work.pop_front() else {
				break;
			};
			report.drained_count += 1;

			match item.work {
				DeferredWork::Recompute => match self.recompute() {
					Ok(_) => report.recompute_passes += 1,
					Err(error) => {
						report.failed += 1;
						tracing::warn!(seq = item.seq, %error, "recompute pass failed");
					}
				},
				DeferredWork::RefreshAll => {
					self.events.emit(TagsChanged {
						span: self.current.full_span(),
					});
					report.refreshes += 1;
				}
			}
		}

		report.remaining = self.work.len();
		report
	}

	/// Evicts cached widgets outside the host's visible range.
	///
	/// Returns the number of evicted widgets.
	pub fn on_visible_range_changed(&mut self, snapshot: &Snapshot, visible: Span) -> Result<usize> {
		check_span(snapshot, visible)?;
		self.advance_to(snapshot)?;
		self.cache.catch_up(&self.current)?;

		let visible = snapshot.translate(visible, &self.current, TrackingMode::EdgeInclusive)?;
		let evicted = self.cache.retain_visible(visible);
		tracing::debug!(%visible, evicted, kept = self.cache.len(), "visibility pass");
		Ok(evicted)
	}

	/// Makes `snapshot` current if it is newer than anything seen so far.
	fn advance_to(&mut self, snapshot: &Snapshot) -> Result<()> {
		if self.current.same_version(snapshot) || snapshot.precedes(&self.current) {
			return Ok(());
		}
		if !self.current.precedes(snapshot) {
			return Err(EngineError::ForeignSnapshot(snapshot.version()));
		}
		self.current = snapshot.clone();
		Ok(())
	}

	/// One recompute pass. Returns the range it rescanned, if any.
	fn recompute(&mut self) -> Result<Option<Span>> {
		if !self.toggle.is_enabled() {
			self.cache.clear();
			self.pending.clear();
			return Ok(None);
		}

		self.cache.catch_up(&self.current)?;

		let mut bounds: Option<Span> = None;
		for (span, snapshot) in self.pending.drain() {
			let span = snapshot.translate(span, &self.current, TrackingMode::EdgeInclusive)?;
			bounds = Some(bounds.map_or(span, |b| b.cover(span)));
		}
		let Some(bounds) = bounds else {
			return Ok(None);
		};

		let scanned = [self.current.line_extent(bounds)];
		if self.cache.intersects_any(&scanned) {
			let data = annotation_data(&self.scanner, &self.classifier, &self.resolver, &self.current, &scanned);
			let out = self.cache.refresh(&scanned, data, &mut self.widgets);
			tracing::debug!(
				version = %self.current.version(),
				span = %scanned[0],
				updated = out.updated,
				evicted = out.evicted,
				"recompute pass"
			);
		} else {
			tracing::debug!(version = %self.current.version(), span = %scanned[0], "recompute pass, nothing cached");
		}

		self.events.emit(TagsChanged { span: scanned[0] });
		Ok(Some(scanned[0]))
	}
}

/// Scans `spans` of `snapshot` and resolves each occurrence.
fn annotation_data<'a, C, S>(
	scanner: &'a OccurrenceScanner,
	classifier: &'a C,
	resolver: &'a TypeResolver<S>,
	snapshot: &'a Snapshot,
	spans: &[Span],
) -> impl Iterator<Item = AnnotationDatum> + use<'a, C, S>
where
	C: SyntaxClassifier,
	S: SemanticModel,
{
	scanner.scan(snapshot, spans, classifier).filter_map(move |occurrence| {
		let display = resolver.resolve(snapshot, &occurrence)?;
		Some(AnnotationDatum {
			span: occurrence.span,
			display,
		})
	})
}

/// Checks that `span` belongs to `snapshot` and lies within it.
fn check_span(snapshot: &Snapshot, span: Span) -> Result<()> {
	if span.version() != snapshot.version() {
		return Err(EngineError::ForeignSpan {
			span,
			snapshot: snapshot.version(),
		});
	}
	if span.end() > snapshot.len_chars() {
		return Err(EngineError::SpanOutOfBounds {
			span,
			len: snapshot.len_chars(),
		});
	}
	Ok(())
}
