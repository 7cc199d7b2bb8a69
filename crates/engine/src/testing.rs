//! Shared fixtures for unit tests.

use std::cell::RefCell;
use std::rc::Rc;

use vartype_primitives::Snapshot;

use crate::resolve::TypeInfo;
use crate::scan::Occurrence;
use crate::widget::WidgetFactory;

/// Widget whose identity is its allocation.
pub(crate) type MockWidget = Rc<RefCell<String>>;

/// Counts widget creations and updates.
#[derive(Debug, Default)]
pub(crate) struct MockWidgets {
	pub created: usize,
	pub updated: usize,
}

impl WidgetFactory for MockWidgets {
	type Handle = MockWidget;

	fn create(&mut self, display: &str) -> MockWidget {
		self.created += 1;
		Rc::new(RefCell::new(display.to_string()))
	}

	fn update(&mut self, handle: &MockWidget, display: &str) {
		self.updated += 1;
		*handle.borrow_mut() = display.to_string();
	}
}

/// Types literals by their spelling and `items` as a sequence of strings.
pub(crate) fn literal_model(snapshot: &Snapshot, occurrence: &Occurrence) -> Option<TypeInfo> {
	let expr = snapshot.slice(occurrence.binder.expression()).to_string();
	let display = match expr.as_str() {
		"items" => "string",
		"new { A = 1 }" => return Some(TypeInfo::anonymous("<anonymous type: int A>")),
		e if e.starts_with('"') => "string",
		e if e.contains('.') && e.parse::<f64>().is_ok() => "double",
		e if e.parse::<i64>().is_ok() => "int",
		e if e.starts_with("new ") => e.trim_start_matches("new ").trim_end_matches("()"),
		_ => return None,
	};
	Some(TypeInfo::named(display))
}

/// Installs a test-writer subscriber so engine traces show up in failing tests.
pub(crate) fn init_tracing() {
	let _ = tracing_subscriber::fmt().with_test_writer().with_max_level(tracing::Level::TRACE).try_init();
}
