//! Catch keyword - handler clauses.
//!
//! Syntax variants:
//! - `catch { recovery }` - catch-all, no binding
//! - `catch e { recovery }` / `catch _ { }` - catch-all with binding
//! - `catch Type(e) { recovery }` - typed catch
//! - `catch Type { recovery }` - typed, value ignored
//! - `catch i32(v) { recovery }` - primitive payloads are typed too

use proc_macro2::{Span, TokenStream};
use syn::parse::ParseStream;
use syn::{Ident, Result};

use super::{is_lowercase_ident, parse_keyword};
use super::parsing;

/// A parsed catch clause.
#[derive(Debug, Clone)]
pub struct CatchClause {
    /// Span of the `catch` keyword (for error reporting)
    pub catch_span: Span,
    /// Type path (None for catch-all)
    pub type_path: Option<TokenStream>,
    /// Payload binding (None for `catch { }`)
    pub binding: Option<Ident>,
    /// Recovery body
    pub body: TokenStream,
}

impl CatchClause {
    pub fn is_catch_all(&self) -> bool {
        self.type_path.is_none()
    }
}

/// Parse a catch clause.
pub fn parse(input: ParseStream) -> Result<CatchClause> {
    let catch_span = parse_keyword(input, "catch")?.span();

    // catch { }
    if parsing::peek_brace(input) {
        return Ok(CatchClause {
            catch_span,
            type_path: None,
            binding: None,
            body: parsing::parse_braced_body(input)?,
        });
    }

    // catch _ { }
    if input.peek(syn::Token![_]) {
        input.parse::<syn::Token![_]>()?;
        return Ok(CatchClause {
            catch_span,
            type_path: None,
            binding: Some(parsing::underscore_ident()),
            body: parsing::parse_braced_body(input)?,
        });
    }

    // catch e { }
    let fork = input.fork();
    if let Ok(ident) = fork.parse::<Ident>() {
        if is_lowercase_ident(&ident) && !parsing::is_primitive_int(&ident) && parsing::peek_brace(&fork) {
            input.parse::<Ident>()?;
            parsing::check_binding(&ident)?;
            return Ok(CatchClause {
                catch_span,
                type_path: None,
                binding: Some(ident),
                body: parsing::parse_braced_body(input)?,
            });
        }
    }

    // catch Type(e) { } / catch Type { }
    let type_path = parsing::parse_type_path(input)?;
    let binding = if input.peek(syn::token::Paren) {
        parsing::parse_binding(input)?
    } else {
        parsing::underscore_ident()
    };
    let body = parsing::parse_braced_body(input)?;

    Ok(CatchClause {
        catch_span,
        type_path: Some(type_path),
        binding: Some(binding),
        body,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use syn::parse_quote;

    fn parse_test(tokens: TokenStream) -> Result<CatchClause> {
        syn::parse::Parser::parse2(parse, tokens)
    }

    #[test]
    fn test_catch_no_binding() {
        let clause = parse_test(parse_quote! { catch { return Ok(1); } }).unwrap();
        assert!(clause.is_catch_all());
        assert!(clause.binding.is_none());
    }

    #[test]
    fn test_catch_with_binding() {
        let clause = parse_test(parse_quote! { catch e { 42 } }).unwrap();
        assert!(clause.is_catch_all());
        assert_eq!(clause.binding.unwrap().to_string(), "e");
    }

    #[test]
    fn test_typed_catch() {
        let clause = parse_test(parse_quote! { catch Record(r) { r.i } }).unwrap();
        assert_eq!(clause.type_path.unwrap().to_string(), "Record");
        assert_eq!(clause.binding.unwrap().to_string(), "r");
    }

    #[test]
    fn test_primitive_is_typed() {
        let clause = parse_test(parse_quote! { catch i32(v) { v } }).unwrap();
        assert_eq!(clause.type_path.unwrap().to_string(), "i32");

        let clause = parse_test(parse_quote! { catch i32 { 3 } }).unwrap();
        assert!(!clause.is_catch_all());
        assert_eq!(clause.binding.unwrap().to_string(), "_");
    }

    #[test]
    fn test_typed_shorthand_with_path() {
        let clause = parse_test(parse_quote! { catch raise_this::Record { 2 } }).unwrap();
        assert_eq!(clause.type_path.unwrap().to_string(), "raise_this :: Record");
        assert_eq!(clause.binding.unwrap().to_string(), "_");
    }

    #[test]
    fn test_reserved_catch_all_binding() {
        let err = parse_test(parse_quote! { catch __handling { 1 } }).unwrap_err();
        assert!(err.to_string().contains("reserved"));
    }
}
