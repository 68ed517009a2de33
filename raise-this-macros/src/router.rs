//! Pattern router - identifies the marker token and routes to the handler.

use proc_macro2::{Span, TokenStream, TokenTree};
use syn::{Error, Result};

use crate::keywords::Mode;
use crate::patterns::region;

/// Route input to the region pattern or report a malformed invocation.
pub fn route(input: TokenStream) -> Result<TokenStream> {
    let mut iter = input.into_iter();

    let marker = match iter.next() {
        Some(TokenTree::Ident(id)) => id,
        Some(other) => {
            return Err(Error::new_spanned(other, "expected pattern marker"));
        }
        None => {
            return Err(Error::new(Span::call_site(), "empty input to __guarded_proc"));
        }
    };

    let rest: TokenStream = iter.collect();

    match marker.to_string().as_str() {
        "REGION" => region::process(rest, Mode::Top, None),
        "NESTED" => nested(rest, Mode::Nested),
        "NESTED_HANDLER" => nested(rest, Mode::NestedHandler),
        "ERROR" => Err(malformed(rest)),
        "ERROR_NO_CLAUSES" => {
            let span = rest
                .into_iter()
                .next()
                .map(|t| t.span())
                .unwrap_or_else(Span::call_site);
            Err(Error::new(
                span,
                "guarded region needs at least one clause: `catch Type(e) { ... }` or `catch { ... }`",
            ))
        }
        "ERROR_EMPTY" => Err(Error::new(Span::call_site(), "empty guarded! block")),
        other => Err(Error::new(
            marker.span(),
            format!("unknown pattern marker: {}", other),
        )),
    }
}

/// Nested regions carry the enclosing `__handling` ident right after the marker.
fn nested(rest: TokenStream, mode: Mode) -> Result<TokenStream> {
    let mut iter = rest.into_iter();
    let handling = match iter.next() {
        Some(TokenTree::Ident(id)) => id,
        Some(other) => return Err(Error::new_spanned(other, "expected handling ident after nested marker")),
        None => return Err(Error::new(Span::call_site(), "empty nested region")),
    };
    region::process(iter.collect(), mode, Some(handling))
}

/// Best error for input that did not match `rt => try { ... } catch ...`.
fn malformed(rest: TokenStream) -> Error {
    let tokens: Vec<TokenTree> = rest.into_iter().collect();

    let Some(first) = tokens.first() else {
        return Error::new(Span::call_site(), "empty guarded! block");
    };

    let is_arrow = matches!(
        (tokens.get(1), tokens.get(2)),
        (Some(TokenTree::Punct(a)), Some(TokenTree::Punct(b))) if a.as_char() == '=' && b.as_char() == '>'
    );

    if !matches!(first, TokenTree::Ident(_)) || !is_arrow {
        return Error::new(
            first.span(),
            "expected `runtime => try { ... }`: name the `&mut Runtime` the region runs on",
        );
    }

    match tokens.get(3) {
        Some(TokenTree::Ident(id)) if id == "try" => {
            Error::new(id.span(), "`try` requires a body: `try { ... }`")
        }
        Some(other) => Error::new(other.span(), format!("expected `try`, found `{}`", other)),
        None => Error::new(first.span(), "expected `try { ... }` after `=>`"),
    }
}
