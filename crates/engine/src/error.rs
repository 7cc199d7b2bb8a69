//! Error types for the annotation engine.

use std::path::PathBuf;

use thiserror::Error;
use vartype_primitives::{CharLen, Span, TranslateError, Version};

/// Errors surfaced by the annotation engine.
///
/// Resolution misses and spans collapsed by deletions are not errors; they
/// simply produce no annotation.
#[derive(Debug, Error)]
pub enum EngineError {
	/// The trigger keyword is not a plain identifier.
	#[error("invalid trigger keyword {0:?}")]
	InvalidKeyword(String),

	/// The keyword pattern failed to compile.
	#[error("keyword pattern: {0}")]
	Pattern(#[from] regex::Error),

	/// A requested span is scoped to a different version than the query snapshot.
	#[error("span {span} does not belong to snapshot {snapshot}")]
	ForeignSpan {
		span: Span,
		/// Version of the snapshot the span was checked against.
		snapshot: Version,
	},

	/// A requested span extends past the end of its snapshot.
	#[error("span {span} exceeds document length {len}")]
	SpanOutOfBounds { span: Span, len: CharLen },

	/// One request mixed spans from several versions.
	#[error("requested spans mix versions {first} and {other}")]
	MixedVersions { first: Version, other: Version },

	/// A snapshot or edit belongs to a different document than the engine tracks.
	#[error("{0} is not a version of the tracked document")]
	ForeignSnapshot(Version),

	/// A span could not be carried between versions.
	#[error(transparent)]
	Translate(#[from] TranslateError),

	/// Error parsing TOML configuration.
	#[error("config parse error: {0}")]
	Config(#[from] toml::de::Error),

	/// A configuration value is out of range.
	#[error("invalid config: {0}")]
	InvalidConfig(String),

	/// Error reading a configuration file.
	#[error("I/O error reading {path}: {error}")]
	Io {
		/// Path to the file that failed to read.
		path: PathBuf,
		/// The underlying I/O error.
		error: std::io::Error,
	},
}

/// Result type for engine operations.
pub type Result<T> = std::result::Result<T, EngineError>;
