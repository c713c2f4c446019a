use std::collections::HashMap;
use std::ops::Range;

use crate::StencilError;
use crate::StencilResult;
use crate::lexer::scan;
use crate::parser::MappedExpression;
use crate::parser::Record;
use crate::parser::ValueSource;
use crate::parser::parse_group;
use crate::registry::FunctionRegistry;
use crate::registry::PipeRegistry;
use crate::template::Template;

/// What a non-fatal lookup warning is about.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum WarningKind {
	/// A non-optional key was absent from the data map.
	MissingKey,
	/// A named parameter was absent from the parameter set.
	MissingParameter,
	/// An iterated key has no matching `::#key=function::` declaration.
	MissingIteration,
}

/// A non-fatal warning emitted during a run. The run still completes; the
/// offending expression substitutes the empty string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LookupWarning {
	/// Display name of the template being run.
	pub template: String,
	/// The key or parameter name that failed to resolve.
	pub key: String,
	/// What kind of lookup failed.
	pub kind: WarningKind,
}

/// The outcome of a completed run: the fully substituted text plus every
/// warning collected along the way.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunOutput {
	/// The fully substituted template text.
	pub text: String,
	/// Non-fatal lookup warnings, in template document order.
	pub warnings: Vec<LookupWarning>,
}

impl RunOutput {
	/// Returns true when the run produced no warnings.
	pub fn is_clean(&self) -> bool {
		self.warnings.is_empty()
	}
}

/// The substitution engine. Holds the pipe and template-function registries
/// and the optional caller-supplied parameter set.
///
/// A processor never mutates the templates it runs; each run produces a
/// fresh output string, so one processor can run many templates and one
/// template can be run many times.
#[derive(Debug, Default)]
pub struct Processor {
	pipes: PipeRegistry,
	functions: FunctionRegistry,
	parameters: Option<HashMap<String, String>>,
}

/// One pending rewrite: an expression to resolve or a declaration marker to
/// strip. Collected up front and applied highest-offset-first.
enum Rewrite<'t> {
	Expression(&'t MappedExpression),
	Declaration(Range<usize>),
}

impl Rewrite<'_> {
	fn start(&self) -> usize {
		match self {
			Rewrite::Expression(expression) => expression.span.start,
			Rewrite::Declaration(span) => span.start,
		}
	}
}

impl Processor {
	pub fn new() -> Self {
		Self::default()
	}

	/// Register a custom pipe transform, shadowing any built-in of the same
	/// name.
	pub fn register_pipe<F>(&mut self, name: impl Into<String>, pipe: F)
	where
		F: Fn(&str) -> String + Send + Sync + 'static,
	{
		self.pipes.register(name, pipe);
	}

	/// Register a generator function for iterated expressions.
	pub fn register_function<F>(&mut self, name: impl Into<String>, function: F)
	where
		F: Fn() -> String + Send + Sync + 'static,
	{
		self.functions.register(name, function);
	}

	/// Supply the named-parameter set used by `@` expressions. Running a
	/// template containing parameterized expressions before this is called
	/// is a state error.
	pub fn set_parameters(&mut self, parameters: HashMap<String, String>) {
		self.parameters = Some(parameters);
	}

	/// Run a template against a data map, producing the fully substituted
	/// text and any lookup warnings.
	///
	/// Expressions are rewritten in descending span order. Replacing a range
	/// at offset O only shifts text at offsets greater than O, so every
	/// not-yet-processed record's span stays valid against the partially
	/// rewritten string. Iteration declaration markers are stripped in the
	/// same pass.
	#[tracing::instrument(skip_all, fields(template = template.name()))]
	pub fn run(
		&self,
		template: &Template,
		data: &HashMap<String, String>,
	) -> StencilResult<RunOutput> {
		if template.is_skip() {
			tracing::debug!("template has no expressions, passing through");
			return Ok(RunOutput {
				text: template.source().to_string(),
				warnings: vec![],
			});
		}

		if let Some(failure) = template.failure() {
			return Err(StencilError::InvalidTemplate {
				name: template.name().to_string(),
				reason: failure.reason.clone(),
				offset: failure.offset,
			});
		}

		if data.is_empty() {
			return Err(StencilError::EmptyDataMap);
		}

		let mut rewrites: Vec<Rewrite<'_>> = template
			.expressions()
			.iter()
			.map(Rewrite::Expression)
			.chain(
				template
					.iterations()
					.iter()
					.map(|declaration| Rewrite::Declaration(declaration.span.clone())),
			)
			.collect();
		rewrites.sort_by(|a, b| b.start().cmp(&a.start()));

		let mut text = template.source().to_string();
		let mut warnings = vec![];

		for rewrite in rewrites {
			let (span, replacement) = match rewrite {
				Rewrite::Declaration(span) => (span, String::new()),
				Rewrite::Expression(expression) => {
					let value = self.resolve(template, expression, data, &mut warnings)?;
					(expression.span.clone(), value)
				}
			};

			text.replace_range(span, &replacement);
		}

		// The walk collects warnings highest-offset-first; report them in
		// document order.
		warnings.reverse();

		tracing::debug!(warnings = warnings.len(), "run complete");

		Ok(RunOutput { text, warnings })
	}

	/// Resolve one expression to its replacement string, collecting lookup
	/// warnings. Fatal conditions abort the whole run.
	fn resolve(
		&self,
		template: &Template,
		expression: &MappedExpression,
		data: &HashMap<String, String>,
		warnings: &mut Vec<LookupWarning>,
	) -> StencilResult<String> {
		match expression.source {
			ValueSource::Iterated => {
				let Some(declaration) = template.iteration_for(&expression.key) else {
					push_warning(warnings, template, &expression.key, WarningKind::MissingIteration);
					return Ok(String::new());
				};

				// Generator output is used verbatim: no optionality, ternary,
				// or pipes on this path.
				self.functions.invoke(&declaration.function)
			}
			ValueSource::Parameterized => {
				let Some(parameters) = &self.parameters else {
					return Err(StencilError::ParametersNotSet {
						template: template.name().to_string(),
					});
				};

				match parameters.get(&expression.key) {
					Some(value) => self.shape(expression, value),
					None => {
						push_warning(warnings, template, &expression.key, WarningKind::MissingParameter);
						Ok(String::new())
					}
				}
			}
			ValueSource::Mapped => {
				match data.get(&expression.key) {
					Some(value) => self.shape(expression, value),
					None if expression.optional || template.optional_by_default() => {
						Ok(String::new())
					}
					None => {
						push_warning(warnings, template, &expression.key, WarningKind::MissingKey);
						Ok(String::new())
					}
				}
			}
		}
	}

	/// Apply the ternary branches and pipe chain to a resolved value.
	fn shape(&self, expression: &MappedExpression, value: &str) -> StencilResult<String> {
		let mut value = match &expression.ternary {
			Some(ternary) if value.is_empty() => ternary.when_false.clone().unwrap_or_default(),
			Some(ternary) => ternary.when_true.clone(),
			None => value.to_string(),
		};

		for name in &expression.pipes {
			value = self.pipes.apply(name, &value)?;
		}

		Ok(value)
	}
}

fn push_warning(
	warnings: &mut Vec<LookupWarning>,
	template: &Template,
	key: &str,
	kind: WarningKind,
) {
	match kind {
		WarningKind::MissingKey => {
			tracing::warn!(template = template.name(), key, "key missing from data map");
		}
		WarningKind::MissingParameter => {
			tracing::warn!(template = template.name(), key, "parameter missing from parameter set");
		}
		WarningKind::MissingIteration => {
			tracing::warn!(
				template = template.name(),
				key,
				"iterated key has no matching iteration declaration"
			);
		}
	}

	warnings.push(LookupWarning {
		template: template.name().to_string(),
		key: key.to_string(),
		kind,
	});
}

/// Evaluate a standalone expression string against a data map.
///
/// The `::` delimiters are optional: `"debug"`, `"!debug"`, and
/// `"::!debug::"` all parse. Returns `true` iff the mapped value equals
/// `"true"` or `"1"` case-insensitively, inverted when the expression is
/// negated. An absent key is `false` without inversion.
pub fn evaluate_boolean(
	expression: impl AsRef<str>,
	data: &HashMap<String, String>,
) -> StencilResult<bool> {
	let expression = expression.as_ref();
	let trimmed = expression.trim();
	let source = if trimmed.contains("::") {
		trimmed.to_string()
	} else {
		format!("::{trimmed}::")
	};

	let no_expression = || StencilError::NoExpression(expression.to_string());

	let groups = scan(&source).map_err(|_| no_expression())?;
	let group = groups.first().ok_or_else(no_expression)?;
	let Record::Mapped(record) = parse_group(group).map_err(|_| no_expression())? else {
		return Err(no_expression());
	};

	let Some(value) = data.get(&record.key) else {
		return Ok(false);
	};

	let truthy = value.eq_ignore_ascii_case("true") || value == "1";
	Ok(if record.negated { !truthy } else { truthy })
}
