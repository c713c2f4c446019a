use std::ops::Range;

use serde::Deserialize;
use serde::Serialize;

use crate::StencilError;
use crate::StencilResult;
use crate::tokens::Token;
use crate::tokens::TokenGroup;

/// Where the substitution value for a mapped expression comes from.
///
/// The three interpretations are mutually exclusive, which this enum
/// enforces by construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ValueSource {
	/// Looked up in the run-time data map. The default.
	Mapped,
	/// Produced by the generator function bound to the key via a
	/// `::#key=function::` declaration.
	Iterated,
	/// Looked up in the caller-supplied parameter set.
	Parameterized,
}

/// The two literal branches of a ternary expression such as
/// `::enabled?"on":"off"::`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ternary {
	/// Substituted when the looked-up value is a non-empty string.
	pub when_true: String,
	/// Substituted otherwise. `None` means the false branch was not
	/// declared and resolves to the empty string.
	pub when_false: Option<String>,
}

/// A parsed, immutable description of one `::…::` occurrence.
///
/// Spans are byte ranges over the original template text, computed once at
/// parse time and never adjusted afterwards. The substitution engine relies
/// on them staying valid, which it guarantees by rewriting in descending
/// span order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MappedExpression {
	/// Lookup key into the data map, or the parameter name.
	pub key: String,
	/// A missing value yields an empty substitution without a warning.
	pub optional: bool,
	/// Inverts the boolean interpretation. Only meaningful for
	/// [`evaluate_boolean`](crate::evaluate_boolean).
	pub negated: bool,
	/// The ternary branches, when the `?true:false` suffix was declared.
	pub ternary: Option<Ternary>,
	/// Pipe function names applied left to right to the resolved value.
	pub pipes: Vec<String>,
	/// How the key is resolved at run time.
	pub source: ValueSource,
	/// Half-open byte range this record replaces, delimiters included.
	pub span: Range<usize>,
}

/// A parsed `::#key=function::` declaration binding a key to a named
/// zero-argument generator function.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IterationDecl {
	/// The key referenced by `::*key::` expressions.
	pub key: String,
	/// The name of the bound generator function.
	pub function: String,
	/// Byte range of the declaration marker, stripped from the output.
	pub span: Range<usize>,
}

/// A classified `::…::` occurrence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Record {
	Mapped(MappedExpression),
	Iteration(IterationDecl),
}

/// Classify every token group into expression and iteration records,
/// preserving scan order.
pub(crate) fn parse_records(
	groups: &[TokenGroup],
) -> StencilResult<(Vec<MappedExpression>, Vec<IterationDecl>)> {
	let mut expressions = vec![];
	let mut iterations = vec![];

	for group in groups {
		match parse_group(group)? {
			Record::Mapped(expression) => expressions.push(expression),
			Record::Iteration(declaration) => iterations.push(declaration),
		}
	}

	Ok((expressions, iterations))
}

/// Parse a single token group into a record.
pub(crate) fn parse_group(group: &TokenGroup) -> StencilResult<Record> {
	let offset = group.span.start;
	let mut iter = group.tokens.iter().peekable();

	skip_whitespace(&mut iter);

	if matches!(iter.peek(), Some(Token::Hash)) {
		iter.next();
		let declaration = parse_iteration_decl(&mut iter, group, offset)?;
		return Ok(Record::Iteration(declaration));
	}

	let expression = parse_mapped_expression(&mut iter, group, offset)?;
	Ok(Record::Mapped(expression))
}

type TokenIter<'a> = std::iter::Peekable<std::slice::Iter<'a, Token>>;

fn skip_whitespace(iter: &mut TokenIter<'_>) {
	while let Some(Token::Whitespace(_)) = iter.peek() {
		iter.next();
	}
}

fn malformed(offset: usize, reason: impl Into<String>) -> StencilError {
	StencilError::MalformedExpression {
		offset,
		reason: reason.into(),
	}
}

/// Parse the flags, key, ternary suffix, and pipe chain of a mapped
/// expression.
fn parse_mapped_expression(
	iter: &mut TokenIter<'_>,
	group: &TokenGroup,
	offset: usize,
) -> StencilResult<MappedExpression> {
	let mut optional = false;
	let mut negated = false;
	let mut parameterized = false;
	let mut iterated = false;

	// Leading flags, order-free, each at most once.
	loop {
		skip_whitespace(iter);
		let flag = match iter.peek() {
			Some(Token::Question) => &mut optional,
			Some(Token::Bang) => &mut negated,
			Some(Token::At) => &mut parameterized,
			Some(Token::Star) => &mut iterated,
			_ => break,
		};

		if *flag {
			return Err(malformed(offset, "duplicate flag marker"));
		}

		*flag = true;
		iter.next();
	}

	if parameterized && iterated {
		return Err(malformed(
			offset,
			"`@` and `*` markers are mutually exclusive",
		));
	}

	skip_whitespace(iter);
	let Some(Token::Ident(key)) = iter.next() else {
		return Err(malformed(offset, "expected a key"));
	};

	// Ternary suffix: `?branch[:branch]` after the key.
	skip_whitespace(iter);
	let ternary = if matches!(iter.peek(), Some(Token::Question)) {
		iter.next();
		skip_whitespace(iter);
		let when_true = parse_branch(iter).unwrap_or_default();

		skip_whitespace(iter);
		let when_false = if matches!(iter.peek(), Some(Token::Colon)) {
			iter.next();
			skip_whitespace(iter);
			Some(parse_branch(iter).unwrap_or_default())
		} else {
			None
		};

		Some(Ternary {
			when_true,
			when_false,
		})
	} else {
		None
	};

	// Pipe chain: `|name` repeated.
	let mut pipes = vec![];
	loop {
		skip_whitespace(iter);
		match iter.peek() {
			Some(Token::Pipe) => {
				iter.next();
				skip_whitespace(iter);
				let Some(Token::Ident(name)) = iter.next() else {
					return Err(malformed(offset, "expected a pipe function name after `|`"));
				};
				pipes.push(name.clone());
			}
			Some(token) => {
				return Err(malformed(
					offset,
					format!("unexpected token `{token}` in expression"),
				));
			}
			None => break,
		}
	}

	let source = if iterated {
		ValueSource::Iterated
	} else if parameterized {
		ValueSource::Parameterized
	} else {
		ValueSource::Mapped
	};

	Ok(MappedExpression {
		key: key.clone(),
		optional,
		negated,
		ternary,
		pipes,
		source,
		span: group.span.clone(),
	})
}

/// Parse a ternary branch literal: a bare identifier or a quoted string.
/// Returns `None` when the next token starts something else, leaving it for
/// the caller.
fn parse_branch(iter: &mut TokenIter<'_>) -> Option<String> {
	match iter.peek() {
		Some(Token::Ident(value)) => {
			let value = value.clone();
			iter.next();
			Some(value)
		}
		Some(Token::String(value, _)) => {
			let value = value.clone();
			iter.next();
			Some(value)
		}
		_ => None,
	}
}

/// Parse `key=function` after the `#` marker. Declarations admit no flags,
/// ternary branches, or pipes.
fn parse_iteration_decl(
	iter: &mut TokenIter<'_>,
	group: &TokenGroup,
	offset: usize,
) -> StencilResult<IterationDecl> {
	skip_whitespace(iter);
	let Some(Token::Ident(key)) = iter.next() else {
		return Err(malformed(offset, "expected a key after `#`"));
	};

	skip_whitespace(iter);
	if !matches!(iter.next(), Some(Token::Equals)) {
		return Err(malformed(offset, "expected `=` after the iteration key"));
	}

	skip_whitespace(iter);
	let Some(Token::Ident(function)) = iter.next() else {
		return Err(malformed(offset, "expected a generator function name after `=`"));
	};

	skip_whitespace(iter);
	if let Some(token) = iter.next() {
		return Err(malformed(
			offset,
			format!("unexpected token `{token}` in iteration declaration"),
		));
	}

	Ok(IterationDecl {
		key: key.clone(),
		function: function.clone(),
		span: group.span.clone(),
	})
}
