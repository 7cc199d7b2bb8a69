//! Incremental inline type annotations.
//!
//! Finds binder keywords (`var` by default) in a versioned document, asks a
//! semantic service for the type each one stands for, and keeps a cache of
//! host-rendered widgets positioned correctly as the document is edited.
//! Everything runs on the host's event thread; expensive work is deferred
//! to [`AnnotationEngine::run_deferred`].

/// Span-keyed widget cache and reconciliation.
pub mod cache;
/// TOML configuration.
pub mod config;
mod engine;
/// Error types.
pub mod error;
/// Change notifications.
pub mod events;
/// Pending invalidation set.
pub mod pending;
/// Semantic service adapter.
pub mod resolve;
/// Keyword scanning and binder classification.
pub mod scan;
/// Process-wide display toggle.
pub mod toggle;
/// Widget factory and tags.
pub mod widget;
/// Deferred work queue.
pub mod work_queue;

#[cfg(test)]
mod testing;

pub use cache::AnnotationCache;
pub use config::EngineConfig;
pub use engine::AnnotationEngine;
pub use error::{EngineError, Result};
pub use events::TagsChanged;
pub use resolve::{SemanticModel, TypeInfo, TypeResolver};
pub use scan::{Binder, BinderKind, LexicalClassifier, Occurrence, OccurrenceScanner, SyntaxClassifier};
pub use toggle::DisplayToggle;
pub use widget::{Affinity, AnnotationDatum, Tag, WidgetFactory};
pub use work_queue::{DeferredWork, DrainReport};
