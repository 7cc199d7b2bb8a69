//! Change notifications delivered to the host.

use tokio::sync::mpsc;
use vartype_primitives::Span;

/// Annotations in `span` may have changed; the host should query it again.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TagsChanged {
	pub span: Span,
}

/// Fans [`TagsChanged`] events out to every subscriber.
#[derive(Debug, Default)]
pub struct TagsChangedEmitter {
	subscribers: Vec<mpsc::UnboundedSender<TagsChanged>>,
}

impl TagsChangedEmitter {
	/// Registers a new subscriber.
	pub fn subscribe(&mut self) -> mpsc::UnboundedReceiver<TagsChanged> {
		let (tx, rx) = mpsc::unbounded_channel();
		self.subscribers.push(tx);
		rx
	}

	/// Sends `event` to every live subscriber and forgets the closed ones.
	pub fn emit(&mut self, event: TagsChanged) {
		self.subscribers.retain(|tx| tx.send(event).is_ok());
		tracing::trace!(span = %event.span, subscribers = self.subscribers.len(), "tags changed");
	}

	pub fn subscriber_count(&self) -> usize {
		self.subscribers.len()
	}
}
