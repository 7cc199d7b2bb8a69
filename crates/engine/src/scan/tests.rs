use proptest::prelude::*;
use vartype_primitives::{Document, Snapshot, Span};

use super::{Binder, BinderKind, LexicalClassifier, Occurrence, OccurrenceScanner, SyntaxClassifier};
use crate::error::EngineError;

fn scan_all(text: &str) -> (Snapshot, Vec<Occurrence>) {
	let snapshot = Document::new(text).snapshot();
	let scanner = OccurrenceScanner::new("var").unwrap();
	let found = scanner.scan(&snapshot, &[snapshot.full_span()], &LexicalClassifier).collect();
	(snapshot, found)
}

fn text_of(snapshot: &Snapshot, span: Span) -> String {
	snapshot.slice(span).to_string()
}

#[test]
fn declaration_with_initializer() {
	let (snap, found) = scan_all("var x = 5;");
	assert_eq!(found.len(), 1);
	let occ = &found[0];
	assert_eq!(occ.span, snap.span(0, 3).unwrap());
	assert_eq!(occ.kind(), BinderKind::Declaration);
	assert_eq!(text_of(&snap, occ.binder.name()), "x");
	assert_eq!(text_of(&snap, occ.binder.expression()), "5");
}

#[test]
fn foreach_loop_binder() {
	let (snap, found) = scan_all("foreach (var y in items)\n{\n}");
	assert_eq!(found.len(), 1);
	assert_eq!(found[0].kind(), BinderKind::Loop);
	assert_eq!(text_of(&snap, found[0].span), "var");
	assert_eq!(text_of(&snap, found[0].binder.name()), "y");
	assert_eq!(text_of(&snap, found[0].binder.expression()), "items");
}

#[test]
fn using_statement_and_declaration_are_resources() {
	let (snap, found) = scan_all("using (var s = Open(\"a, b\"))\n{\n\tawait using var t = Make();\n}");
	assert_eq!(found.len(), 2);
	assert!(found.iter().all(|occ| occ.kind() == BinderKind::Resource));
	assert_eq!(text_of(&snap, found[0].binder.expression()), "Open(\"a, b\")");
	assert_eq!(text_of(&snap, found[1].binder.name()), "t");
	assert_eq!(text_of(&snap, found[1].binder.expression()), "Make()");
}

#[test]
fn for_initializer_is_a_declaration() {
	let (snap, found) = scan_all("for (var i = 0; i < n; i++) {}");
	assert_eq!(found.len(), 1);
	assert_eq!(found[0].kind(), BinderKind::Declaration);
	assert_eq!(text_of(&snap, found[0].binder.expression()), "0");
}

#[test]
fn generic_and_collection_initializers_keep_inner_commas() {
	let (snap, found) = scan_all("var map = new Dictionary<int, string> { [1] = \"a;b\" }; // var");
	assert_eq!(found.len(), 1);
	assert_eq!(
		text_of(&snap, found[0].binder.expression()),
		"new Dictionary<int, string> { [1] = \"a;b\" }"
	);
}

#[test]
fn declarations_after_labels() {
	let (snap, found) = scan_all("switch (k) {\ncase 1: var x = 5;\ndefault: var y = 6;\n}\nretry: var z = 7;");
	let names: Vec<_> = found.iter().map(|occ| text_of(&snap, occ.binder.name())).collect();
	assert_eq!(names, ["x", "y", "z"]);
	assert!(found.iter().all(|occ| occ.kind() == BinderKind::Declaration));
}

#[test]
fn initializer_on_the_following_line() {
	let (snap, found) = scan_all("var x =\n    5;\nvar y = // why\n    Make(\n        1);");
	assert_eq!(found.len(), 2);
	assert_eq!(text_of(&snap, found[0].binder.expression()), "5");
	assert_eq!(text_of(&snap, found[1].binder.expression()), "Make(\n        1)");

	// Nothing within reach after the operator.
	let (_, found) = scan_all("var x =\n\n\n\n\n5;");
	assert!(found.is_empty());
}

#[test]
fn verbatim_strings_take_no_escapes() {
	let (snap, found) = scan_all("var p = @\"C:\\\"; var q = $@\"{a}\\\"\"\";");
	let exprs: Vec<_> = found.iter().map(|occ| text_of(&snap, occ.binder.expression())).collect();
	assert_eq!(exprs, ["@\"C:\\\"", "$@\"{a}\\\"\"\""]);
}

#[test]
fn other_positions_are_discarded() {
	let text = "\
var (a, b) = pair;
Parse(s, out var n);
Func<int, int> f = (var k) => k;
var c = 1, d = 2;
var e;
var == other;
// var x = 1;
s = \"var q = 2\";
variable = vars;
Var v = 3;";
	let (_, found) = scan_all(text);
	assert!(found.is_empty(), "unexpected occurrences: {found:?}");
}

#[test]
fn statement_boundaries_on_one_line() {
	let (snap, found) = scan_all("{ var a = 1; var b = a; }");
	let names: Vec<_> = found.iter().map(|occ| text_of(&snap, occ.binder.name())).collect();
	assert_eq!(names, ["a", "b"]);
}

#[test]
fn scan_expands_requests_to_whole_lines() {
	let snapshot = Document::new("int a;\n  var x = 5;\nvar y = 6;\nvar z = 7;").snapshot();
	let scanner = OccurrenceScanner::new("var").unwrap();

	// A point at "x" on line 1 picks up the keyword before it.
	let point = snapshot.span(13, 13).unwrap();
	let found: Vec<_> = scanner.scan(&snapshot, &[point], &LexicalClassifier).collect();
	assert_eq!(found.len(), 1);
	assert_eq!(found[0].span, snapshot.span(9, 12).unwrap());

	// Overlapping and adjacent requests scan each line once.
	let requests = [snapshot.span(9, 20).unwrap(), snapshot.span(7, 8).unwrap(), snapshot.span(20, 22).unwrap()];
	let found: Vec<_> = scanner.scan(&snapshot, &requests, &LexicalClassifier).collect();
	assert_eq!(found.len(), 2);
}

#[test]
fn empty_request_yields_nothing() {
	let snapshot = Document::new("var x = 5;").snapshot();
	let scanner = OccurrenceScanner::new("var").unwrap();
	assert_eq!(scanner.scan(&snapshot, &[], &LexicalClassifier).count(), 0);
}

#[test]
fn custom_keyword_and_classifier() {
	struct Everything;
	impl SyntaxClassifier for Everything {
		fn classify(&self, _: &Snapshot, keyword: Span) -> Option<Binder> {
			Some(Binder::Declaration {
				name: keyword,
				initializer: keyword,
			})
		}
	}

	let snapshot = Document::new("auto a = auto_b + auto;\nAUTO").snapshot();
	let scanner = OccurrenceScanner::new("auto").unwrap();
	let spans: Vec<_> = scanner.scan(&snapshot, &[snapshot.full_span()], &Everything).map(|occ| occ.span).collect();
	assert_eq!(spans, [snapshot.span(0, 4).unwrap(), snapshot.span(18, 22).unwrap()]);
}

#[test]
fn offsets_are_characters_not_bytes() {
	let (snap, found) = scan_all("/* é */ ;var ü = \"ß\";");
	assert_eq!(found.len(), 1);
	assert_eq!(text_of(&snap, found[0].span), "var");
	assert_eq!(text_of(&snap, found[0].binder.name()), "ü");
	assert_eq!(text_of(&snap, found[0].binder.expression()), "\"ß\"");
}

#[test]
fn rejects_non_identifier_keywords() {
	assert!(matches!(OccurrenceScanner::new("v r"), Err(EngineError::InvalidKeyword(_))));
	assert!(matches!(OccurrenceScanner::new("1var"), Err(EngineError::InvalidKeyword(_))));
}

proptest! {
	/// Every occurrence is a whole-word keyword token lying on a requested line.
	#[test]
	fn prop_occurrences_are_keyword_tokens(
		text in "((var|v|ar|x|=|1|;| |\n|foreach \\(|in|\\)))*",
		a in any::<usize>(),
		b in any::<usize>(),
	) {
		let snapshot = Document::new(&text).snapshot();
		let len = snapshot.len_chars();
		let (x, y) = (a % (len + 1), b % (len + 1));
		let request = snapshot.span(x.min(y), x.max(y)).unwrap();
		let scanner = OccurrenceScanner::new("var").unwrap();

		let lines = snapshot.line_extent(request);
		for occ in scanner.scan(&snapshot, &[request], &LexicalClassifier) {
			prop_assert_eq!(text_of(&snapshot, occ.span), "var");
			prop_assert!(lines.start() <= occ.span.start() && occ.span.end() <= lines.end());
			prop_assert!(!occ.binder.expression().is_empty());
		}
	}
}
