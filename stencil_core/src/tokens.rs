use std::fmt::Display;
use std::ops::Range;

/// Only tokenize the content between `::` delimiters, not the surrounding
/// prose. The delimiters themselves mark group boundaries and never appear
/// as tokens.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
	/// `?` — optional flag before the key, ternary opener after it
	Question,
	/// `!`
	Bang,
	/// `@`
	At,
	/// `*`
	Star,
	/// `#`
	Hash,
	/// `=`
	Equals,
	/// `:`
	Colon,
	/// `|`
	Pipe,
	/// ` ` | `\t`
	Whitespace(u8),
	/// A quoted ternary branch, e.g. `"switched on"`
	String(String, u8),
	/// An identifier or path-like key, e.g. `package.name`
	Ident(String),
}

impl Display for Token {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		match self {
			Token::Question => write!(f, "?"),
			Token::Bang => write!(f, "!"),
			Token::At => write!(f, "@"),
			Token::Star => write!(f, "*"),
			Token::Hash => write!(f, "#"),
			Token::Equals => write!(f, "="),
			Token::Colon => write!(f, ":"),
			Token::Pipe => write!(f, "|"),
			Token::Whitespace(byte) => write!(f, "{}", *byte as char),
			Token::String(string, ch) => {
				let ch = *ch as char;
				write!(f, "{ch}{string}{ch}")
			}
			Token::Ident(ident) => write!(f, "{ident}"),
		}
	}
}

/// A group of tokens extracted from a single `::…::` occurrence.
///
/// The `span` is the half-open byte range of the whole occurrence in the
/// original template text, delimiters included. It is the exact range the
/// substitution engine replaces.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenGroup {
	/// The tokens between the delimiters, delimiters excluded.
	pub tokens: Vec<Token>,
	/// Byte range of the occurrence, `::` to `::` inclusive.
	pub span: Range<usize>,
}
