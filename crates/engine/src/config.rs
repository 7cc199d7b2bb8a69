//! Engine configuration loaded from TOML.
//!
//! ```toml
//! keyword = "var"
//! hide-anonymous = true
//! drain-budget = 16
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{EngineError, Result};

/// Tunables for one [`AnnotationEngine`](crate::AnnotationEngine).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields, rename_all = "kebab-case")]
pub struct EngineConfig {
	/// Trigger keyword whose occurrences receive a type annotation.
	pub keyword: String,
	/// Suppress annotations for anonymous type shapes.
	pub hide_anonymous: bool,
	/// Maximum deferred work items processed per [`run_deferred`](crate::AnnotationEngine::run_deferred) call.
	pub drain_budget: usize,
}

impl Default for EngineConfig {
	fn default() -> Self {
		Self {
			keyword: "var".to_string(),
			hide_anonymous: true,
			drain_budget: 16,
		}
	}
}

impl EngineConfig {
	/// Parses and validates a TOML document.
	pub fn from_toml(source: &str) -> Result<Self> {
		let config: Self = toml::from_str(source)?;
		config.validate()?;
		Ok(config)
	}

	/// Reads, parses and validates a TOML file.
	pub fn load(path: &Path) -> Result<Self> {
		let source = std::fs::read_to_string(path).map_err(|error| EngineError::Io {
			path: path.to_path_buf(),
			error,
		})?;
		Self::from_toml(&source)
	}

	/// Checks values that deserialize fine but cannot drive the engine.
	pub fn validate(&self) -> Result<()> {
		if !is_identifier(&self.keyword) {
			return Err(EngineError::InvalidKeyword(self.keyword.clone()));
		}
		if self.drain_budget == 0 {
			return Err(EngineError::InvalidConfig("drain-budget must be at least 1".into()));
		}
		Ok(())
	}
}

/// Returns true for `[A-Za-z_][A-Za-z0-9_]*`.
pub(crate) fn is_identifier(word: &str) -> bool {
	let mut chars = word.chars();
	matches!(chars.next(), Some(c) if c.is_ascii_alphabetic() || c == '_') && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

#[cfg(test)]
mod tests {
	use std::io::Write;

	use super::*;

	#[test]
	fn defaults_apply_to_missing_fields() {
		let config = EngineConfig::from_toml("hide-anonymous = false").unwrap();
		assert_eq!(config.keyword, "var");
		assert!(!config.hide_anonymous);
		assert_eq!(config.drain_budget, 16);
		assert_eq!(EngineConfig::from_toml("").unwrap(), EngineConfig::default());
	}

	#[test]
	fn unknown_fields_are_rejected() {
		assert!(matches!(EngineConfig::from_toml("keywrod = \"let\""), Err(EngineError::Config(_))));
	}

	#[test]
	fn validation_rejects_bad_values() {
		assert!(matches!(
			EngineConfig::from_toml("keyword = \"va r\""),
			Err(EngineError::InvalidKeyword(word)) if word == "va r"
		));
		assert!(matches!(EngineConfig::from_toml("keyword = \"\""), Err(EngineError::InvalidKeyword(_))));
		assert!(matches!(EngineConfig::from_toml("drain-budget = 0"), Err(EngineError::InvalidConfig(_))));
	}

	#[test]
	fn load_reads_file() {
		let mut file = tempfile::NamedTempFile::new().unwrap();
		writeln!(file, "keyword = \"auto\"\ndrain-budget = 4").unwrap();

		let config = EngineConfig::load(file.path()).unwrap();
		assert_eq!(config.keyword, "auto");
		assert_eq!(config.drain_budget, 4);
		assert!(config.hide_anonymous);
	}

	#[test]
	fn load_reports_missing_file() {
		let dir = tempfile::tempdir().unwrap();
		let path = dir.path().join("absent.toml");
		match EngineConfig::load(&path) {
			Err(EngineError::Io { path: reported, .. }) => assert_eq!(reported, path),
			other => panic!("expected I/O error, got {other:?}"),
		}
	}
}
