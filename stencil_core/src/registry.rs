use std::collections::HashMap;

use crate::StencilError;
use crate::StencilResult;

/// A unary pipe transform: consumes the previous value, produces the next.
pub type PipeFn = Box<dyn Fn(&str) -> String + Send + Sync>;

/// A nullary generator invoked by name to resolve iterated expressions.
pub type TemplateFn = Box<dyn Fn() -> String + Send + Sync>;

/// Resolves pipe function names to transforms.
///
/// Caller-supplied registrations shadow built-ins of the same name. The
/// registry is built up front and only read afterwards, so it is safe to
/// share across concurrent runs.
#[derive(Default)]
pub struct PipeRegistry {
	custom: HashMap<String, PipeFn>,
}

impl std::fmt::Debug for PipeRegistry {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("PipeRegistry")
			.field("custom", &self.custom.keys().collect::<Vec<_>>())
			.finish()
	}
}

impl PipeRegistry {
	pub fn new() -> Self {
		Self::default()
	}

	/// Register a custom pipe transform under `name`, shadowing any built-in
	/// with the same name.
	pub fn register<F>(&mut self, name: impl Into<String>, pipe: F)
	where
		F: Fn(&str) -> String + Send + Sync + 'static,
	{
		self.custom.insert(name.into(), Box::new(pipe));
	}

	/// Apply the pipe named `name` to `value`. Custom registrations are
	/// consulted first, then the built-in set.
	pub fn apply(&self, name: &str, value: &str) -> StencilResult<String> {
		if let Some(pipe) = self.custom.get(name) {
			return Ok(pipe(value));
		}

		apply_builtin(name, value).ok_or_else(|| StencilError::UnknownPipe(name.to_string()))
	}
}

/// The built-in pipe set. Names accept both camelCase and snake_case forms.
fn apply_builtin(name: &str, value: &str) -> Option<String> {
	let result = match name {
		"upper" => value.to_uppercase(),
		"lower" => value.to_lowercase(),
		"trim" => value.trim().to_string(),
		"trimStart" | "trim_start" => value.trim_start().to_string(),
		"trimEnd" | "trim_end" => value.trim_end().to_string(),
		"reverse" => value.chars().rev().collect(),
		"capitalize" => map_first_char(value, char::to_uppercase),
		"uncapitalize" => map_first_char(value, char::to_lowercase),
		_ => return None,
	};

	Some(result)
}

fn map_first_char<I>(value: &str, transform: impl Fn(char) -> I) -> String
where
	I: Iterator<Item = char>,
{
	let mut chars = value.chars();
	match chars.next() {
		Some(first) => transform(first).chain(chars).collect(),
		None => String::new(),
	}
}

/// Resolves template function names to generators. There are no built-in
/// generators: every function is caller-supplied.
#[derive(Default)]
pub struct FunctionRegistry {
	custom: HashMap<String, TemplateFn>,
}

impl std::fmt::Debug for FunctionRegistry {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("FunctionRegistry")
			.field("custom", &self.custom.keys().collect::<Vec<_>>())
			.finish()
	}
}

impl FunctionRegistry {
	pub fn new() -> Self {
		Self::default()
	}

	/// Register a generator function under `name`.
	pub fn register<F>(&mut self, name: impl Into<String>, function: F)
	where
		F: Fn() -> String + Send + Sync + 'static,
	{
		self.custom.insert(name.into(), Box::new(function));
	}

	/// Invoke the generator named `name`.
	pub fn invoke(&self, name: &str) -> StencilResult<String> {
		let function = self
			.custom
			.get(name)
			.ok_or_else(|| StencilError::UnknownFunction(name.to_string()))?;

		Ok(function())
	}
}
