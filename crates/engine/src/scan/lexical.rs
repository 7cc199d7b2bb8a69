//! Line-local binder recognition for C#-style `var` declarations.
//!
//! This is a lexical approximation of a syntax tree lookup: it inspects the
//! text before the keyword to find the innermost construct and the text after
//! it to find the bound name and expression. Strings, brackets, generic
//! argument lists and trailing line comments are skipped when looking for the
//! end of the expression.

use std::ops::Range;

use vartype_primitives::{Snapshot, Span};

use super::{Binder, SyntaxClassifier};

/// Recognizes declaration, `foreach` and `using` binders on the keyword's line.
#[derive(Debug, Clone, Copy, Default)]
pub struct LexicalClassifier;

/// Construct that immediately encloses the keyword.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Opener {
	/// Start of a statement.
	Statement,
	/// `using var x = ...;`
	UsingDeclaration,
	/// `for (var i = ...; ...)`
	ForInit,
	/// `foreach (var x in ...)`
	ForEach,
	/// `using (var x = ...)`
	UsingStatement,
}

impl Opener {
	/// Detects the opener from the text before the keyword, trailing whitespace removed.
	fn of(prefix: &str) -> Option<Self> {
		if let Some(head) = prefix.strip_suffix('(') {
			let (word, _) = split_last_word(head.trim_end());
			return match word {
				"foreach" => Some(Self::ForEach),
				"using" => Some(Self::UsingStatement),
				"for" => Some(Self::ForInit),
				_ => None,
			};
		}

		let (word, head) = split_last_word(prefix);
		if word == "using" {
			let head = head.trim_end();
			let head = match split_last_word(head) {
				("await", before) => before.trim_end(),
				_ => head,
			};
			return at_statement_start(head).then_some(Self::UsingDeclaration);
		}
		at_statement_start(prefix).then_some(Self::Statement)
	}
}

/// True after a statement, a block brace, or a label (`case 1:`, `default:`, `retry:`).
fn at_statement_start(prefix: &str) -> bool {
	prefix.is_empty() || prefix.ends_with([';', '{', '}']) || (prefix.ends_with(':') && !prefix.ends_with("::"))
}

/// Splits a trailing identifier off `text`.
fn split_last_word(text: &str) -> (&str, &str) {
	let start = text
		.char_indices()
		.rev()
		.take_while(|&(_, c)| is_ident_char(c))
		.last()
		.map_or(text.len(), |(i, _)| i);
	(&text[start..], &text[..start])
}

fn is_ident_char(c: char) -> bool {
	c.is_alphanumeric() || c == '_'
}

/// Parses ` name =` or ` name in` after the keyword.
///
/// Returns the byte range of the name and the offset just past the operator,
/// both relative to `rest`.
fn binder_head(rest: &str, opener: Opener) -> Option<(Range<usize>, usize)> {
	let name_start = rest.len() - rest.trim_start().len();
	if name_start == 0 {
		return None;
	}
	let name = identifier_at(rest, name_start)?;
	let after_name = rest[name.end..].trim_start();
	let mut cursor = rest.len() - after_name.len();

	if opener == Opener::ForEach {
		let tail = after_name.strip_prefix("in")?;
		if tail.starts_with(is_ident_char) {
			return None;
		}
		cursor += "in".len();
	} else {
		let tail = after_name.strip_prefix('=')?;
		if tail.starts_with(['=', '>']) {
			return None;
		}
		cursor += '='.len_utf8();
	}
	Some((name, cursor))
}

/// Returns the byte range of the expression starting at `cursor`, trivia trimmed.
fn expression_at(rest: &str, cursor: usize) -> Option<Range<usize>> {
	let extent = expression_extent(&rest[cursor..]);
	if extent.comma {
		return None;
	}
	let raw = &rest[cursor..cursor + extent.end];
	let start = cursor + skip_trivia(raw);
	let end = cursor + raw.trim_end().len();
	(start < end).then_some(start..end)
}

/// True if nothing but whitespace or a line comment follows the operator.
fn dangles(tail: &str) -> bool {
	let tail = tail.trim();
	tail.is_empty() || tail.starts_with("//")
}

/// Returns the byte length of leading whitespace and line comments.
fn skip_trivia(text: &str) -> usize {
	let mut at = 0;
	loop {
		let trimmed = text[at..].trim_start();
		at = text.len() - trimmed.len();
		if !trimmed.starts_with("//") {
			return at;
		}
		match trimmed.find('\n') {
			Some(nl) => at += nl,
			None => return text.len(),
		}
	}
}

/// Returns the byte range of the identifier starting at `at`.
fn identifier_at(text: &str, at: usize) -> Option<Range<usize>> {
	let tail = &text[at..];
	let body = tail.strip_prefix('@').unwrap_or(tail);
	let mut chars = body.chars();
	if !matches!(chars.next(), Some(c) if c.is_alphabetic() || c == '_') {
		return None;
	}
	let len = body.find(|c: char| !is_ident_char(c)).unwrap_or(body.len());
	Some(at..at + (tail.len() - body.len()) + len)
}

/// Where an expression ends, and whether it held a top-level comma.
struct Extent {
	end: usize,
	comma: bool,
}

/// Scans an expression up to a top-level `;` or unmatched closing bracket.
///
/// Line comments are skipped; one on the last line ends the expression, as
/// does the end of the text. Verbatim strings (`@"..."`) take no escapes.
fn expression_extent(text: &str) -> Extent {
	let mut depth = 0usize;
	let mut angle = 0usize;
	// Delimiter, and whether the string is verbatim.
	let mut quote: Option<(char, bool)> = None;
	let mut escaped = false;
	let mut comma = false;
	let mut prev = ' ';
	let mut before_prev = ' ';
	let mut chars = text.char_indices().peekable();

	while let Some((i, c)) = chars.next() {
		if let Some((q, verbatim)) = quote {
			if verbatim {
				if c == q && chars.next_if(|&(_, next)| next == q).is_none() {
					quote = None;
				}
			} else if escaped {
				escaped = false;
			} else if c == '\\' {
				escaped = true;
			} else if c == q {
				quote = None;
			}
			before_prev = prev;
			prev = c;
			continue;
		}

		match c {
			'"' => quote = Some((c, prev == '@' || (prev == '$' && before_prev == '@'))),
			'\'' => quote = Some((c, false)),
			'(' | '[' | '{' => depth += 1,
			')' | ']' | '}' if depth == 0 => return Extent { end: i, comma },
			')' | ']' | '}' => depth -= 1,
			';' if depth == 0 => return Extent { end: i, comma },
			'<' if is_ident_char(prev) => angle += 1,
			'>' => angle = angle.saturating_sub(1),
			',' if depth == 0 && angle == 0 => comma = true,
			'/' if matches!(chars.peek(), Some((_, '/'))) => {
				let Some(nl) = text[i..].find('\n') else {
					return Extent { end: i, comma };
				};
				while chars.next_if(|&(j, _)| j < i + nl).is_some() {}
				prev = ' ';
				before_prev = ' ';
				continue;
			}
			_ => {}
		}
		before_prev = prev;
		prev = c;
	}

	Extent { end: text.len(), comma }
}

/// Lines after the keyword's line searched for an initializer that starts there.
const CONTINUATION_LINES: usize = 3;

impl SyntaxClassifier for LexicalClassifier {
	fn classify(&self, snapshot: &Snapshot, keyword: Span) -> Option<Binder> {
		if keyword.is_empty() || !snapshot.contains_span(&keyword) {
			return None;
		}
		let line_idx = snapshot.line_of(keyword.start());
		let line = snapshot.line_span(line_idx);
		if keyword.end() > line.end() {
			return None;
		}

		let text = snapshot.slice(line).to_string();
		let byte_at = |chars: usize| text.char_indices().nth(chars).map_or(text.len(), |(i, _)| i);
		let kw_start = byte_at(keyword.start() - line.start());
		let kw_end = byte_at(keyword.end() - line.start());

		let opener = Opener::of(text[..kw_start].trim_end())?;
		let (name, cursor) = binder_head(&text[kw_end..], opener)?;

		// `var x =` with the initializer on the following lines.
		let window: String;
		let rest = if dangles(&text[kw_end + cursor..]) {
			let last = snapshot.line_span(line_idx + CONTINUATION_LINES);
			window = snapshot.slice(line.cover(last)).to_string();
			&window[kw_end..]
		} else {
			&text[kw_end..]
		};
		let expression = expression_at(rest, cursor)?;

		let to_span = |range: Range<usize>| {
			let start = keyword.end() + rest[..range.start].chars().count();
			let len = rest[range].chars().count();
			keyword.with_offsets(start, start + len)
		};
		let name = to_span(name);
		let expression = to_span(expression);

		Some(match opener {
			Opener::Statement | Opener::ForInit => Binder::Declaration { name, initializer: expression },
			Opener::ForEach => Binder::Loop { name, sequence: expression },
			Opener::UsingDeclaration | Opener::UsingStatement => Binder::Resource { name, initializer: expression },
		})
	}
}
