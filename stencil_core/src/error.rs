use miette::Diagnostic;
use thiserror::Error;

#[derive(Debug, Diagnostic, Error)]
#[non_exhaustive]
pub enum StencilError {
	#[error("template `{name}` is invalid and cannot be run: {reason}")]
	#[diagnostic(
		code(stencil::invalid_template),
		help("fix the expression at byte offset {offset} and re-parse the template")
	)]
	InvalidTemplate {
		name: String,
		reason: String,
		offset: usize,
	},

	#[error("unterminated expression starting at byte offset {0}")]
	#[diagnostic(
		code(stencil::unterminated_expression),
		help("every `::` opener needs a matching `::` closer on the same line")
	)]
	UnterminatedExpression(usize),

	#[error("malformed expression at byte offset {offset}: {reason}")]
	#[diagnostic(code(stencil::malformed_expression))]
	MalformedExpression { offset: usize, reason: String },

	#[error("empty data map supplied to `run`")]
	#[diagnostic(
		code(stencil::empty_data_map),
		help("pass at least one key/value pair, or skip the run for passthrough templates")
	)]
	EmptyDataMap,

	#[error("expression string contains no parseable expression: `{0}`")]
	#[diagnostic(
		code(stencil::no_expression),
		help("boolean evaluation expects a single expression such as `flag`, `!flag`, or `::flag::`")
	)]
	NoExpression(String),

	#[error("template `{template}` contains parameterized expressions but no parameters were set")]
	#[diagnostic(
		code(stencil::parameters_not_set),
		help("call `Processor::set_parameters` before running this template")
	)]
	ParametersNotSet { template: String },

	#[error("unknown pipe function: `{0}`")]
	#[diagnostic(
		code(stencil::unknown_pipe),
		help(
			"built-in pipes: upper, lower, trim, trimStart, trimEnd, reverse, capitalize, \
			 uncapitalize; register custom pipes on the Processor"
		)
	)]
	UnknownPipe(String),

	#[error("unknown template function: `{0}`")]
	#[diagnostic(
		code(stencil::unknown_function),
		help("register the generator with `Processor::register_function` before running")
	)]
	UnknownFunction(String),
}

pub type StencilResult<T> = Result<T, StencilError>;
pub type AnyError = Box<dyn std::error::Error>;
pub type AnyResult<T> = Result<T, AnyError>;
