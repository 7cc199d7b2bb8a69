//! Deferred work queue drained by the host's event loop.
//!
//! Edit notifications and toggles never do heavy work on their own call
//! stack; they post items here and the host calls
//! [`AnnotationEngine::run_deferred`](crate::AnnotationEngine::run_deferred)
//! once that stack has unwound.

use std::collections::VecDeque;

/// Deferred work item payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeferredWork {
	/// Recompute the regions in the pending invalidation set.
	Recompute,
	/// Tell subscribers the whole document needs re-querying.
	RefreshAll,
}

/// Queue entry carrying its sequence number.
#[derive(Debug, Clone)]
pub struct DeferredWorkItem {
	pub work: DeferredWork,
	pub seq: u64,
}

/// FIFO queue for deferred engine work.
#[derive(Debug, Default)]
pub struct DeferredWorkQueue {
	seq_next: u64,
	queue: VecDeque<DeferredWorkItem>,
}

impl DeferredWorkQueue {
	/// Enqueues one work item and returns its sequence number.
	pub fn enqueue(&mut self, work: DeferredWork) -> u64 {
		let seq = self.seq_next;
		self.seq_next = self.seq_next.wrapping_add(1);
		self.queue.push_back(DeferredWorkItem { work, seq });
		seq
	}

	/// Pops the next work item in FIFO order.
	pub fn pop_front(&mut self) -> Option<DeferredWorkItem> {
		self.queue.pop_front()
	}

	/// Returns queued item count.
	pub fn len(&self) -> usize {
		self.queue.len()
	}

	/// Returns true when queue is empty.
	pub fn is_empty(&self) -> bool {
		self.queue.is_empty()
	}

	/// Returns true when a recompute pass is queued.
	pub fn has_recompute(&self) -> bool {
		self.queue.iter().any(|item| item.work == DeferredWork::Recompute)
	}

	/// Removes queued items of one kind and returns how many were removed.
	pub fn remove(&mut self, work: DeferredWork) -> usize {
		let before = self.queue.len();
		self.queue.retain(|item| item.work != work);
		before.saturating_sub(self.queue.len())
	}
}

/// Progress metadata for one [`run_deferred`](crate::AnnotationEngine::run_deferred) call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DrainReport {
	pub drained_count: usize,
	pub recompute_passes: usize,
	pub refreshes: usize,
	pub failed: usize,
	/// Items left for the next call because the budget ran out.
	pub remaining: usize,
}
