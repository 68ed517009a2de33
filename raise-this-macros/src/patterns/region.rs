//! The region pattern: `rt => try { body } catch ... catch ...`.

use proc_macro2::{Span, TokenStream};
use syn::parse::ParseStream;
use syn::{Error, Ident, Result};

use crate::codegen::{clause, outcome};
use crate::keywords::catch::{self, CatchClause};
use crate::keywords::{parse_keyword, parsing, peek_keyword, GenContext, Mode};
use crate::nested::{transform_body, Rethrow};

/// A parsed region.
#[derive(Debug)]
pub struct Region {
    pub runtime: Ident,
    pub try_span: Span,
    pub body: TokenStream,
    pub clauses: Vec<CatchClause>,
}

/// Parse `rt => try { ... } catch ...`.
pub fn parse(input: ParseStream) -> Result<Region> {
    let runtime: Ident = input.parse()?;
    input.parse::<syn::Token![=>]>()?;
    let try_span = parse_keyword(input, "try")?.span();
    let body = parsing::parse_braced_body(input)?;

    let mut clauses = Vec::new();
    while !input.is_empty() {
        if !peek_keyword(input, "catch") {
            return Err(Error::new(input.span(), "expected `catch` clause"));
        }
        clauses.push(catch::parse(input)?);
    }

    Ok(Region { runtime, try_span, body, clauses })
}

/// Clause list rules: at least one clause, one catch-all at most, and the
/// catch-all comes last.
pub fn check_clauses(region: &Region) -> Result<()> {
    if region.clauses.is_empty() {
        return Err(Error::new(
            region.try_span,
            "guarded region needs at least one clause: `catch Type(e) { ... }` or `catch { ... }`",
        ));
    }

    let mut seen_catch_all = false;
    for clause in &region.clauses {
        if seen_catch_all {
            let message = if clause.is_catch_all() {
                "only one catch-all clause is allowed per region"
            } else {
                "clause after a catch-all is unreachable; the catch-all must be last"
            };
            return Err(Error::new(clause.catch_span, message));
        }
        seen_catch_all = clause.is_catch_all();
    }

    Ok(())
}

/// Parse, check and expand a region.
///
/// `handling` is the enclosing region's handled-payload ident, passed along
/// by the nested rewrite.
pub fn process(input: TokenStream, mode: Mode, handling: Option<Ident>) -> Result<TokenStream> {
    let region = syn::parse::Parser::parse2(parse, input)?;
    check_clauses(&region)?;

    let ctx = match handling {
        Some(handling) => GenContext::with_handling(mode, region.runtime.clone(), handling),
        None => GenContext::new(mode, region.runtime.clone()),
    };

    let body_rethrow = if mode.try_body_in_handler() {
        Rethrow::Borrowed
    } else {
        Rethrow::Forbidden
    };
    let body = transform_body(region.body.clone(), &ctx, body_rethrow)?;
    let body_closure = clause::gen_body(&ctx, &body);

    let mut clauses = Vec::with_capacity(region.clauses.len());
    for c in &region.clauses {
        let body = transform_body(c.body.clone(), &ctx, Rethrow::Owned)?;
        let code = match &c.type_path {
            Some(type_path) => {
                let binding = c.binding.clone().unwrap_or_else(parsing::underscore_ident);
                clause::gen_typed(&ctx, c.catch_span, type_path, &binding, &body)
            }
            None => clause::gen_catch_all(&ctx, c.catch_span, c.binding.as_ref(), &body),
        };
        clauses.push(code);
    }

    Ok(outcome::gen_region(&ctx, &body_closure, &clauses))
}
