//! Process-wide display toggle.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, OnceLock};

/// Shared on/off switch for inline type annotations.
///
/// Clones share one flag. Only [`AnnotationEngine::set_enabled`](crate::AnnotationEngine::set_enabled)
/// flips it; everything else can only read it.
#[derive(Debug, Clone)]
pub struct DisplayToggle(Arc<AtomicBool>);

static GLOBAL: OnceLock<DisplayToggle> = OnceLock::new();

impl DisplayToggle {
	/// Returns the process-wide toggle, enabled on first use.
	pub fn global() -> Self {
		GLOBAL.get_or_init(|| Self::new(true)).clone()
	}

	/// Creates a toggle independent of the process-wide one.
	pub fn new(enabled: bool) -> Self {
		Self(Arc::new(AtomicBool::new(enabled)))
	}

	#[inline]
	pub fn is_enabled(&self) -> bool {
		self.0.load(Ordering::Acquire)
	}

	/// Stores `enabled` and returns the previous value.
	pub(crate) fn set(&self, enabled: bool) -> bool {
		self.0.swap(enabled, Ordering::AcqRel)
	}
}
