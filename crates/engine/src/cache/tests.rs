use std::rc::Rc;

use vartype_primitives::{Document, Span};

use super::AnnotationCache;
use crate::error::EngineError;
use crate::testing::{MockWidget, MockWidgets};
use crate::widget::AnnotationDatum;

fn datum(span: Span, display: &str) -> AnnotationDatum {
	AnnotationDatum {
		span,
		display: display.to_string(),
	}
}

#[test]
fn reconcile_creates_then_reuses_widgets() {
	let snap = Document::new("var a = 1;\nvar b = 2;").snapshot();
	let mut cache = AnnotationCache::<MockWidget>::new(snap.clone());
	let mut widgets = MockWidgets::default();
	let a = snap.span(0, 3).unwrap();
	let b = snap.span(11, 14).unwrap();
	let all = [snap.full_span()];

	let first = cache.reconcile(&all, [datum(a, "int"), datum(b, "int")], &mut widgets);
	assert_eq!((first.created, first.updated, first.evicted), (2, 0, 0));

	let second = cache.reconcile(&all, [datum(a, "int"), datum(b, "long")], &mut widgets);
	assert_eq!((second.created, second.updated, second.evicted), (0, 2, 0));
	assert!(Rc::ptr_eq(&first.tags[0].widget, &second.tags[0].widget));
	assert!(Rc::ptr_eq(&first.tags[1].widget, &second.tags[1].widget));
	assert_eq!(*second.tags[1].widget.borrow(), "long");
}

#[test]
fn reconcile_evicts_missing_entries_only_inside_scanned_regions() {
	let snap = Document::new("var a = 1;\nvar b = 2;").snapshot();
	let mut cache = AnnotationCache::<MockWidget>::new(snap.clone());
	let mut widgets = MockWidgets::default();
	let a = snap.span(0, 3).unwrap();
	let b = snap.span(11, 14).unwrap();
	cache.reconcile(&[snap.full_span()], [datum(a, "int"), datum(b, "int")], &mut widgets);

	// Line 0 scanned and came back empty; line 1 untouched.
	let out = cache.reconcile(&[snap.line_span(0)], Vec::new(), &mut widgets);
	assert_eq!(out.evicted, 1);
	assert!(cache.get(&a).is_none());
	assert!(cache.get(&b).is_some());
}

#[test]
fn refresh_updates_and_evicts_but_never_creates() {
	let snap = Document::new("var a = 1;\nvar b = 2;\nvar c = 3;").snapshot();
	let mut cache = AnnotationCache::<MockWidget>::new(snap.clone());
	let mut widgets = MockWidgets::default();
	let [a, b, c] = [0, 11, 22].map(|start| snap.span(start, start + 3).unwrap());
	cache.reconcile(&[snap.full_span()], [datum(a, "int"), datum(b, "int")], &mut widgets);

	let all = [snap.full_span()];
	assert!(cache.intersects_any(&all));
	let out = cache.refresh(&all, [datum(a, "long"), datum(c, "int")], &mut widgets);
	assert_eq!((out.created, out.updated, out.evicted), (0, 1, 1));
	assert_eq!(out.tags.len(), 1);
	assert_eq!(*out.tags[0].widget.borrow(), "long");
	assert_eq!(cache.spans().collect::<Vec<_>>(), [a]);
	assert_eq!(widgets.created, 2);
	assert!(!cache.intersects_any(&[snap.line_span(2)]));
}

#[test]
fn first_datum_per_span_wins() {
	let snap = Document::new("var a = 1;").snapshot();
	let mut cache = AnnotationCache::<MockWidget>::new(snap.clone());
	let mut widgets = MockWidgets::default();
	let a = snap.span(0, 3).unwrap();

	let out = cache.reconcile(&[snap.full_span()], [datum(a, "int"), datum(a, "long")], &mut widgets);
	assert_eq!(out.tags.len(), 1);
	assert_eq!(*out.tags[0].widget.borrow(), "int");
	assert_eq!(widgets.created, 1);
	assert_eq!(widgets.updated, 0);
}

#[test]
fn catch_up_rekeys_with_edge_exclusive_tracking() {
	let mut doc = Document::new("var a = 1;\nvar b = 2;");
	let v0 = doc.snapshot();
	let mut cache = AnnotationCache::<MockWidget>::new(v0.clone());
	let mut widgets = MockWidgets::default();
	let a = v0.span(0, 3).unwrap();
	let b = v0.span(11, 14).unwrap();
	cache.reconcile(&[v0.full_span()], [datum(a, "int"), datum(b, "int")], &mut widgets);

	// Typing right before the second keyword shifts it without growing it.
	let v1 = doc.insert(11, "  ").unwrap().after().clone();
	cache.catch_up(&v1).unwrap();
	assert!(cache.snapshot().same_version(&v1));
	assert_eq!(cache.spans().collect::<Vec<_>>(), [v1.span(0, 3).unwrap(), v1.span(13, 16).unwrap()]);
}

#[test]
fn catch_up_drops_deleted_tokens() {
	let mut doc = Document::new("var a = 1;\nvar b = 2;");
	let v0 = doc.snapshot();
	let mut cache = AnnotationCache::<MockWidget>::new(v0.clone());
	let mut widgets = MockWidgets::default();
	cache.reconcile(
		&[v0.full_span()],
		[datum(v0.span(0, 3).unwrap(), "int"), datum(v0.span(11, 14).unwrap(), "int")],
		&mut widgets,
	);

	let v1 = doc.delete(0, 11).unwrap().after().clone();
	cache.catch_up(&v1).unwrap();
	assert_eq!(cache.spans().collect::<Vec<_>>(), [v1.span(0, 3).unwrap()]);
}

#[test]
fn catch_up_rejects_foreign_or_older_snapshots() {
	let mut doc = Document::new("abc");
	let v0 = doc.snapshot();
	let v1 = doc.insert(0, "x").unwrap().after().clone();
	let mut cache = AnnotationCache::<MockWidget>::new(v1.clone());

	assert!(matches!(cache.catch_up(&v0), Err(EngineError::ForeignSnapshot(_))));
	let other = Document::new("abc").snapshot();
	assert!(matches!(cache.catch_up(&other), Err(EngineError::ForeignSnapshot(_))));
	assert!(cache.snapshot().same_version(&v1));
}

#[test]
fn retain_visible_evicts_outside_entries() {
	let snap = Document::new("var a = 1;\nvar b = 2;\nvar c = 3;").snapshot();
	let mut cache = AnnotationCache::<MockWidget>::new(snap.clone());
	let mut widgets = MockWidgets::default();
	let data = [0, 11, 22].map(|start| datum(snap.span(start, start + 3).unwrap(), "int"));
	cache.reconcile(&[snap.full_span()], data, &mut widgets);

	assert_eq!(cache.retain_visible(snap.line_span(1)), 2);
	assert_eq!(cache.spans().collect::<Vec<_>>(), [snap.span(11, 14).unwrap()]);

	cache.clear();
	assert!(cache.is_empty());
}
