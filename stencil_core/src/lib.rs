//! `stencil_core` is the core library for the stencil text-artifact
//! generator. It parses template documents containing `::key::` expressions
//! and produces fully substituted output strings from a run-time data map,
//! an optional parameter set, and caller-registered pipe and generator
//! functions.
//!
//! ## Processing Pipeline
//!
//! ```text
//! Template text
//!   → Lexer (tokenizes `::…::` occurrences into TokenGroups)
//!   → Parser (classifies groups into expression and iteration records)
//!   → Template container (one scan pass, records indexed by byte range)
//!   → Processor (resolves records against a data map, rewrites ranges
//!     highest-offset-first, strips declaration markers)
//! ```
//!
//! ## Expression Syntax
//!
//! - `::name::` — substitute the value mapped to `name`.
//! - `::?age::` — optional: a missing key substitutes empty, no warning.
//! - `::@license::` — parameterized: resolved from the caller-supplied
//!   parameter set instead of the data map.
//! - `::*imports::` — iterated: resolved by the generator function bound
//!   with `::#imports=generateImports::`.
//! - `::enabled?"on":"off"::` — ternary on the value's truthiness
//!   (non-empty string picks the first branch).
//! - `::title|trim|upper::` — pipe chain, applied left to right.
//! - `::!debug::` — negated, for [`evaluate_boolean`].
//!
//! ## Key Types
//!
//! - [`Template`] — a parsed template: source text plus expression and
//!   iteration records indexed by byte range. Immutable and reusable.
//! - [`Processor`] — the substitution engine holding the pipe and
//!   template-function registries and the optional parameter set.
//! - [`MappedExpression`] — one parsed `::…::` occurrence.
//! - [`RunOutput`] — substituted text plus non-fatal lookup warnings.
//! - [`StencilError`] — the error taxonomy for fatal conditions.
//!
//! ## Quick Start
//!
//! ```rust
//! use std::collections::HashMap;
//!
//! use stencil_core::Processor;
//! use stencil_core::Template;
//!
//! let template = Template::parse("Hello ::name::, you are ::age::!", "greeting");
//! let processor = Processor::new();
//!
//! let mut data = HashMap::new();
//! data.insert("name".to_string(), "Ada".to_string());
//! data.insert("age".to_string(), "37".to_string());
//!
//! let output = processor.run(&template, &data).unwrap();
//! assert_eq!(output.text, "Hello Ada, you are 37!");
//! ```

pub use engine::*;
pub use error::*;
pub use parser::*;
pub use registry::*;
pub use template::*;

mod engine;
mod error;
pub(crate) mod lexer;
mod parser;
mod registry;
mod template;
pub(crate) mod tokens;

#[cfg(test)]
mod __fixtures;
