use logos::Logos;
use snailquote::unescape;

use crate::StencilError;
use crate::StencilResult;
use crate::tokens::Token;
use crate::tokens::TokenGroup;

/// Raw tokens produced by logos for flat tokenization of the template text.
#[derive(Logos, Debug, PartialEq)]
enum RawToken {
	#[token("::")]
	Delim,
	#[token("?")]
	Question,
	#[token("!")]
	Bang,
	#[token("@")]
	At,
	#[token("*")]
	Star,
	#[token("#")]
	Hash,
	#[token("=")]
	Equals,
	#[token(":")]
	Colon,
	#[token("|")]
	Pipe,
	#[token("\n")]
	Newline,
	#[regex(r"[ \t\r]")]
	Whitespace,
	#[regex(r"[a-zA-Z0-9_][a-zA-Z0-9_./]*")]
	Ident,
	#[regex(r#""([^"\\\n]|\\.)*""#)]
	DoubleQuotedString,
	#[regex(r"'[^'\n]*'")]
	SingleQuotedString,
}

/// Context states for the scanner. Everything outside `::…::` is prose and
/// is skipped; everything inside must belong to the expression grammar.
enum LexerContext {
	/// The scanner is currently outside of any expression.
	Outside,
	/// The scanner is currently between an opening and closing `::`.
	Expression,
}

/// Walks the logos token stream, collecting one [`TokenGroup`] per `::…::`
/// occurrence in left-to-right order.
struct TokenWalker<'a> {
	/// The source text of the template.
	source: &'a str,
	/// The collected raw tokens and their byte spans.
	raw_tokens: Vec<(Result<RawToken, ()>, std::ops::Range<usize>)>,
	/// Current index into `raw_tokens`.
	cursor: usize,
	/// Byte offset where the current expression's opening `::` starts.
	group_start: usize,
	/// Tokens of the expression currently being built.
	group_tokens: Vec<Token>,
	/// The context for the state machine.
	context: LexerContext,
	/// Collected groups.
	groups: Vec<TokenGroup>,
}

impl<'a> TokenWalker<'a> {
	fn new(source: &'a str) -> Self {
		let raw_tokens: Vec<_> = RawToken::lexer(source).spanned().collect();

		Self {
			source,
			raw_tokens,
			cursor: 0,
			group_start: 0,
			group_tokens: vec![],
			context: LexerContext::Outside,
			groups: vec![],
		}
	}

	/// Get the text slice for the current raw token.
	fn current_slice(&self) -> &'a str {
		let (_, span) = &self.raw_tokens[self.cursor];
		&self.source[span.clone()]
	}

	/// Get the byte span for the current raw token.
	fn current_span(&self) -> std::ops::Range<usize> {
		self.raw_tokens[self.cursor].1.clone()
	}

	/// Add a token to the current group and move the cursor forward.
	fn push_token(&mut self, token: Token) {
		self.group_tokens.push(token);
		self.cursor += 1;
	}

	/// Process a quoted string token. Escape-free literals are taken verbatim
	/// with the quotes stripped; anything containing a backslash goes through
	/// `snailquote`, which expects the surrounding quotes.
	fn process_string(&mut self, delimiter: u8) -> StencilResult<()> {
		let slice = self.current_slice();
		let offset = self.current_span().start;
		let inner = &slice[1..slice.len() - 1];

		let value = if inner.contains('\\') {
			unescape(slice).map_err(|error| {
				StencilError::MalformedExpression {
					offset,
					reason: format!("invalid escape in string literal: {error}"),
				}
			})?
		} else {
			inner.to_string()
		};

		self.push_token(Token::String(value, delimiter));
		Ok(())
	}

	/// Main processing loop: walk the raw token stream with context-dependent
	/// rules.
	fn process(&mut self) -> StencilResult<()> {
		while self.cursor < self.raw_tokens.len() {
			let (result, span) = &self.raw_tokens[self.cursor];

			match self.context {
				LexerContext::Outside => {
					// Prose: only an opening delimiter is meaningful, logos
					// errors included.
					if matches!(result, Ok(RawToken::Delim)) {
						self.group_start = span.start;
						self.group_tokens = vec![];
						self.context = LexerContext::Expression;
					}
					self.cursor += 1;
				}
				LexerContext::Expression => {
					let offset = span.start;
					let Ok(raw) = result else {
						return Err(StencilError::MalformedExpression {
							offset,
							reason: format!(
								"unexpected character `{}` inside expression",
								self.current_slice()
							),
						});
					};

					match raw {
						RawToken::Delim => {
							let group = TokenGroup {
								tokens: std::mem::take(&mut self.group_tokens),
								span: self.group_start..span.end,
							};
							self.groups.push(group);
							self.context = LexerContext::Outside;
							self.cursor += 1;
						}
						RawToken::Newline => {
							return Err(StencilError::UnterminatedExpression(self.group_start));
						}
						RawToken::Question => self.push_token(Token::Question),
						RawToken::Bang => self.push_token(Token::Bang),
						RawToken::At => self.push_token(Token::At),
						RawToken::Star => self.push_token(Token::Star),
						RawToken::Hash => self.push_token(Token::Hash),
						RawToken::Equals => self.push_token(Token::Equals),
						RawToken::Colon => self.push_token(Token::Colon),
						RawToken::Pipe => self.push_token(Token::Pipe),
						RawToken::Whitespace => {
							let byte = self.current_slice().as_bytes()[0];
							self.push_token(Token::Whitespace(byte));
						}
						RawToken::Ident => {
							let ident = self.current_slice().to_string();
							self.push_token(Token::Ident(ident));
						}
						RawToken::DoubleQuotedString => self.process_string(b'"')?,
						RawToken::SingleQuotedString => self.process_string(b'\'')?,
					}
				}
			}
		}

		if matches!(self.context, LexerContext::Expression) {
			return Err(StencilError::UnterminatedExpression(self.group_start));
		}

		Ok(())
	}
}

/// Scan raw template text and return every `::…::` token group in
/// left-to-right order. The first grammar violation aborts the scan.
pub fn scan(source: &str) -> StencilResult<Vec<TokenGroup>> {
	let mut walker = TokenWalker::new(source);
	walker.process()?;
	Ok(walker.groups)
}
