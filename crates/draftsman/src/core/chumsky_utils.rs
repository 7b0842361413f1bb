//! Shared chumsky parser utilities for diagram sources
//!
//! Common combinators used by the statement parsers.

use chumsky::prelude::*;
use chumsky::text::ident;

/// Parser extra carrying rich errors with spans
pub type Extra<'src> = extra::Err<Rich<'src, char>>;

/// Parse inline whitespace only (spaces and tabs, no newlines).
///
/// Uses explicit character matching to avoid the "repeated combinator making no progress"
/// issue that can occur with `chumsky::text::whitespace().repeated()`.
pub fn inline_whitespace<'src>() -> impl Parser<'src, &'src str, (), Extra<'src>> + Clone {
    one_of(" \t").repeated().ignored()
}

/// Parse required inline whitespace (at least one space or tab).
pub fn inline_whitespace_required<'src>() -> impl Parser<'src, &'src str, (), Extra<'src>> + Clone
{
    one_of(" \t").repeated().at_least(1).ignored()
}

/// Parse an identifier and own it
pub fn identifier<'src>() -> impl Parser<'src, &'src str, String, Extra<'src>> + Clone {
    ident()
        .map(|s: &str| s.to_string())
        .labelled("identifier")
}

/// Parse a double-quoted string with `\"`, `\\`, `\n` and `\t` escapes
pub fn quoted_string<'src>() -> impl Parser<'src, &'src str, String, Extra<'src>> + Clone {
    let escape = just('\\').ignore_then(choice((
        just('"'),
        just('\\'),
        just('n').to('\n'),
        just('t').to('\t'),
    )));

    just('"')
        .ignore_then(none_of("\"\\\n").or(escape).repeated().collect::<String>())
        .then_ignore(just('"'))
        .labelled("quoted string")
}

/// Parse an unquoted attribute value: everything up to whitespace or a delimiter
pub fn bare_value<'src>() -> impl Parser<'src, &'src str, String, Extra<'src>> + Clone {
    none_of(" \t\r\n,()[]{}\"=")
        .repeated()
        .at_least(1)
        .collect::<String>()
        .labelled("value")
}

/// Parse a `#` comment running to the end of the line
pub fn hash_comment<'src>() -> impl Parser<'src, &'src str, (), Extra<'src>> + Clone {
    just('#').ignore_then(none_of('\n').repeated()).ignored()
}
