use std::collections::HashMap;

use crate::Processor;
use crate::tokens::Token;
use crate::tokens::TokenGroup;

/// Build a string data map from literal pairs.
pub(crate) fn data(pairs: &[(&str, &str)]) -> HashMap<String, String> {
	pairs
		.iter()
		.map(|(key, value)| (key.to_string(), value.to_string()))
		.collect()
}

/// A processor with the generator functions used by the iteration tests.
pub(crate) fn processor_with_generators() -> Processor {
	let mut processor = Processor::new();
	processor.register_function("generateImports", || {
		"use std::fmt;\nuse std::io;".to_string()
	});
	processor.register_function("emptyGenerator", String::new);
	processor
}

/// The token group produced by scanning `::name::` at offset 0.
pub(crate) fn plain_token_group() -> TokenGroup {
	TokenGroup {
		tokens: vec![Token::Ident("name".into())],
		span: 0..8,
	}
}

/// The token group produced by scanning `::?age::` at offset 3.
pub(crate) fn optional_token_group() -> TokenGroup {
	TokenGroup {
		tokens: vec![Token::Question, Token::Ident("age".into())],
		span: 3..11,
	}
}

/// The token group produced by scanning `::enabled?"on":"off"::` at offset 0.
pub(crate) fn ternary_token_group() -> TokenGroup {
	TokenGroup {
		tokens: vec![
			Token::Ident("enabled".into()),
			Token::Question,
			Token::String("on".into(), b'"'),
			Token::Colon,
			Token::String("off".into(), b'"'),
		],
		span: 0..22,
	}
}

/// The token group produced by scanning `::#imports=generateImports::` at
/// offset 0.
pub(crate) fn iteration_token_group() -> TokenGroup {
	TokenGroup {
		tokens: vec![
			Token::Hash,
			Token::Ident("imports".into()),
			Token::Equals,
			Token::Ident("generateImports".into()),
		],
		span: 0..28,
	}
}
