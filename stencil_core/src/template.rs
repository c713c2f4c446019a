use serde::Deserialize;
use serde::Serialize;

use crate::StencilError;
use crate::lexer::scan;
use crate::parser::IterationDecl;
use crate::parser::MappedExpression;
use crate::parser::parse_records;

/// Per-template options supplied at parse time.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TemplateOptions {
	/// Treat every expression without an explicit `?` flag as optional:
	/// missing keys substitute empty without a warning.
	pub optional_by_default: bool,
}

/// Why a template failed to parse. Kept on the container so that
/// construction never errors; the engine reports it when a run is attempted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParseFailure {
	/// Human-readable description of the grammar violation.
	pub reason: String,
	/// Byte offset of the violation in the template text.
	pub offset: usize,
}

/// A parsed template: the original text plus every expression and iteration
/// declaration found in it, indexed by byte range.
///
/// The container is immutable after construction. A run never mutates the
/// stored text; it produces a fresh output string, so one `Template` can be
/// reused and shared across any number of runs with different data maps.
#[derive(Debug, Clone)]
pub struct Template {
	source: String,
	name: String,
	expressions: Vec<MappedExpression>,
	iterations: Vec<IterationDecl>,
	failure: Option<ParseFailure>,
	skip: bool,
	options: TemplateOptions,
}

impl Template {
	/// Parse a template with default options. Construction never fails:
	/// grammar violations are recorded as [`Template::failure`] and surface
	/// when a run is attempted.
	pub fn parse(text: impl Into<String>, name: impl Into<String>) -> Self {
		Self::parse_with_options(text, name, TemplateOptions::default())
	}

	/// Parse a template with explicit options.
	pub fn parse_with_options(
		text: impl Into<String>,
		name: impl Into<String>,
		options: TemplateOptions,
	) -> Self {
		let source = text.into();
		let name = name.into();

		match scan(&source).and_then(|groups| parse_records(&groups)) {
			Ok((mut expressions, iterations)) => {
				// The scanner already emits records in left-to-right order;
				// the sort keeps the ascending invariant explicit.
				expressions.sort_by_key(|expression| expression.span.start);
				let skip = expressions.is_empty() && iterations.is_empty();

				Self {
					source,
					name,
					expressions,
					iterations,
					failure: None,
					skip,
					options,
				}
			}
			Err(error) => {
				let offset = match &error {
					StencilError::UnterminatedExpression(offset) => *offset,
					StencilError::MalformedExpression { offset, .. } => *offset,
					_ => 0,
				};

				tracing::debug!(template = %name, %error, "template failed to parse");

				Self {
					source,
					name,
					expressions: vec![],
					iterations: vec![],
					failure: Some(ParseFailure {
						reason: error.to_string(),
						offset,
					}),
					skip: false,
					options,
				}
			}
		}
	}

	/// The original, unmodified template text.
	pub fn source(&self) -> &str {
		&self.source
	}

	/// The display name used in diagnostics.
	pub fn name(&self) -> &str {
		&self.name
	}

	/// True when the template failed to parse and cannot be run.
	pub fn is_invalid(&self) -> bool {
		self.failure.is_some()
	}

	/// The recorded parse failure, if any.
	pub fn failure(&self) -> Option<&ParseFailure> {
		self.failure.as_ref()
	}

	/// True when the template contains no expressions or declarations: a run
	/// is a passthrough returning the source unchanged.
	pub fn is_skip(&self) -> bool {
		self.skip
	}

	/// Whether expressions without an explicit `?` flag behave as optional.
	pub fn optional_by_default(&self) -> bool {
		self.options.optional_by_default
	}

	/// Expression records ordered ascending by span start.
	pub(crate) fn expressions(&self) -> &[MappedExpression] {
		&self.expressions
	}

	/// Iteration declarations in scan order.
	pub(crate) fn iterations(&self) -> &[IterationDecl] {
		&self.iterations
	}

	/// Find the iteration declaration bound to `key`, if any.
	pub(crate) fn iteration_for(&self, key: &str) -> Option<&IterationDecl> {
		self.iterations
			.iter()
			.find(|declaration| declaration.key == key)
	}
}
