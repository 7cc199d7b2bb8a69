//! Edit primitives: changes, changesets, and position mapping.

mod changeset;
mod types;

pub use changeset::ChangeSet;
pub use types::{Bias, Change, ChangedRegion, EditError, Tendril};
