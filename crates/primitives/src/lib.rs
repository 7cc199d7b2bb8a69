//! Core types for versioned text: snapshots, spans, edit deltas, and span translation.

/// Host-side document model producing immutable snapshots and edit deltas.
pub mod document;
/// Rope utilities and extensions.
pub mod rope;
/// Version-scoped character spans.
pub mod span;
/// Edit primitives: changes, changesets, and position mapping.
pub mod transaction;
/// Span translation across document versions.
pub mod translate;

pub use document::{Document, Edit, EditDelta, Snapshot, TextVersion};
pub use ropey::{Rope, RopeSlice};
pub use span::{CharIdx, CharLen, Span, Version};
pub use transaction::{Bias, Change, ChangeSet, ChangedRegion, EditError, Tendril};
pub use translate::{TrackingMode, TranslateError, translate_span};
