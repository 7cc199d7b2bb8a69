//! Rope utilities and extensions.

use ropey::RopeSlice;

use crate::span::CharIdx;

/// Returns the line containing `pos`, clamping positions past the end to the last line.
pub fn line_of(text: RopeSlice, pos: CharIdx) -> usize {
	text.char_to_line(pos.min(text.len_chars()))
}

/// Returns the `[start, end)` character bounds of `line`, excluding its line break.
///
/// Both `\n` and `\r\n` terminators are excluded. Lines past the end clamp to
/// the last line.
pub fn line_bounds(text: RopeSlice, line: usize) -> (CharIdx, CharIdx) {
	let line = line.min(text.len_lines().saturating_sub(1));
	let start = text.line_to_char(line);
	let slice = text.line(line);
	let mut len = slice.len_chars();

	if len > 0 && slice.char(len - 1) == '\n' {
		len -= 1;
		if len > 0 && slice.char(len - 1) == '\r' {
			len -= 1;
		}
	}

	(start, start + len)
}

#[cfg(test)]
mod tests {
	use ropey::Rope;

	use super::*;

	#[test]
	fn test_no_trailing_newline() {
		let text = Rope::from("hello\nworld");
		assert_eq!(line_bounds(text.slice(..), 1), (6, 11));
	}

	#[test]
	fn test_trailing_newline() {
		let text = Rope::from("hello\nworld\n");
		assert_eq!(line_bounds(text.slice(..), 2), (12, 12));
	}

	#[test]
	fn test_crlf_excluded_from_line() {
		let text = Rope::from("var a = 1;\r\nvar b = 2;");
		assert_eq!(line_bounds(text.slice(..), 0), (0, 10));
		assert_eq!(line_bounds(text.slice(..), 1), (12, 22));
	}

	#[test]
	fn test_line_of_clamps() {
		let text = Rope::from("ab\ncd");
		assert_eq!(line_of(text.slice(..), 0), 0);
		assert_eq!(line_of(text.slice(..), 2), 0);
		assert_eq!(line_of(text.slice(..), 3), 1);
		assert_eq!(line_of(text.slice(..), 99), 1);
	}

	#[test]
	fn test_empty() {
		let text = Rope::from("");
		assert_eq!(line_bounds(text.slice(..), 0), (0, 0));
		assert_eq!(line_bounds(text.slice(..), 5), (0, 0));
	}
}
