//! Shared parsing utilities for keyword modules.

use proc_macro2::{Span, TokenStream};
use quote::quote;
use syn::parse::ParseStream;
use syn::{braced, token, Ident, Result};

/// Parse type path (handles paths like `payload::Record`).
pub fn parse_type_path(input: ParseStream) -> Result<TokenStream> {
    let mut tokens = Vec::new();

    if input.peek(syn::Token![::]) {
        input.parse::<syn::Token![::]>()?;
        tokens.push(quote! { :: });
    }

    let ident: Ident = input.parse()?;
    tokens.push(quote! { #ident });

    while input.peek(syn::Token![::]) {
        input.parse::<syn::Token![::]>()?;
        let seg: Ident = input.parse()?;
        tokens.push(quote! { :: #seg });
    }

    Ok(tokens.into_iter().collect())
}

/// Reserved internal binding names that would conflict with generated code.
const RESERVED_BINDINGS: &[&str] = &["__handling", "rethrow"];

/// Check if a binding name is reserved for internal use.
pub fn is_reserved_binding(name: &str) -> bool {
    RESERVED_BINDINGS.contains(&name) || name.starts_with("__raise_")
}

/// Reject reserved names.
pub fn check_binding(binding: &Ident) -> Result<()> {
    let name = binding.to_string();
    if is_reserved_binding(&name) {
        return Err(syn::Error::new(
            binding.span(),
            format!("`{}` is reserved for internal use; choose a different binding name", name),
        ));
    }
    Ok(())
}

/// Parse binding: `(e)` or `(_)`.
pub fn parse_binding(input: ParseStream) -> Result<Ident> {
    let content;
    syn::parenthesized!(content in input);
    let binding = if content.peek(syn::Token![_]) {
        content.parse::<syn::Token![_]>()?;
        underscore_ident()
    } else {
        content.parse()?
    };

    if !content.is_empty() {
        return Err(syn::Error::new(
            content.span(),
            "expected a single binding: `catch Type(e) { ... }`",
        ));
    }

    check_binding(&binding)?;
    Ok(binding)
}

/// Parse a braced body `{ ... }`.
pub fn parse_braced_body(input: ParseStream) -> Result<TokenStream> {
    if !input.peek(token::Brace) {
        return Err(syn::Error::new(input.span(), "expected `{ }` body for handler"));
    }
    let content;
    braced!(content in input);
    content.parse()
}

/// Check if looking at a braced block.
pub fn peek_brace(input: ParseStream) -> bool {
    input.peek(token::Brace)
}

/// Create an underscore identifier.
pub fn underscore_ident() -> Ident {
    Ident::new("_", Span::call_site())
}

/// Primitive integer names are lowercase but name types, not bindings.
pub fn is_primitive_int(ident: &Ident) -> bool {
    matches!(
        ident.to_string().as_str(),
        "i8" | "i16" | "i32" | "i64" | "i128" | "isize" | "u8" | "u16" | "u32" | "u64" | "u128" | "usize"
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use syn::parse_quote;

    #[test]
    fn test_type_path() {
        let path = syn::parse::Parser::parse2(parse_type_path, parse_quote! { payload::Record })
            .unwrap();
        assert_eq!(path.to_string(), "payload :: Record");
    }

    #[test]
    fn test_reserved_binding() {
        let result = syn::parse::Parser::parse2(parse_binding, parse_quote! { (__handling) });
        assert!(result.unwrap_err().to_string().contains("reserved"));
        assert!(is_reserved_binding("__raise_outcome"));
        assert!(!is_reserved_binding("e"));
    }

    #[test]
    fn test_primitive_int() {
        assert!(is_primitive_int(&parse_quote! { i32 }));
        assert!(!is_primitive_int(&parse_quote! { e }));
    }
}
