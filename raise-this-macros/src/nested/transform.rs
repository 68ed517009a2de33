//! Body rewrite for `try` bodies and `catch` clauses.
//!
//! Bodies run inside closures, so control flow that must leave the enclosing
//! function is carried out as data:
//! - `return EXPR` becomes `return Ok(Outcome::Return(EXPR))`
//! - `rethrow` becomes `return Err(__handling.rethrow())` in a clause, and
//!   `return Err(__handling.rethrow_ref())` in a region nested in a clause, so
//!   the clause keeps its handling and may rethrow again
//! - a nested `guarded!` calls the proc macro directly with a marker, so its
//!   own returns are carried the same way; the `__handling` token is passed
//!   along so every level names the handled payload with the same ident
//!
//! Closures, nested `fn` items and other macro invocations keep their own
//! `return` and are copied untouched.

use proc_macro2::{Group, TokenStream, TokenTree};
use quote::{quote, quote_spanned};
use syn::{Error, Result};

use super::detection::{
    closure_len, expr_len, fn_item_len, is_macro_invocation, is_nested_region, is_rethrow,
};
use crate::keywords::GenContext;

/// What `rethrow` means in the body being rewritten.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rethrow {
    /// Not in a clause: nothing to send.
    Forbidden,
    /// A clause body: the closure owns `__handling`.
    Owned,
    /// A region nested in a clause: `__handling` is borrowed from the clause.
    Borrowed,
}

impl Rethrow {
    pub fn allowed(self) -> bool {
        !matches!(self, Rethrow::Forbidden)
    }
}

/// Rewrite a body.
pub fn transform_body(tokens: TokenStream, ctx: &GenContext, rethrow: Rethrow) -> Result<TokenStream> {
    let tokens: Vec<TokenTree> = tokens.into_iter().collect();
    transform_tokens(&tokens, ctx, rethrow)
}

fn transform_tokens(tokens: &[TokenTree], ctx: &GenContext, rethrow: Rethrow) -> Result<TokenStream> {
    let mut result = TokenStream::new();
    let mut i = 0;

    while i < tokens.len() {
        if is_nested_region(tokens, i) {
            if let TokenTree::Group(g) = &tokens[i + 2] {
                let marker = if rethrow.allowed() {
                    quote!(NESTED_HANDLER)
                } else {
                    quote!(NESTED)
                };
                let inner = g.stream();
                let handling = &ctx.handling;
                result.extend(quote_spanned! { tokens[i].span() =>
                    ::raise_this::raise_this_macros::__guarded_proc!(#marker #handling #inner)
                });
                i += 3;
                continue;
            }
        }

        // Other macros, closures and fn items: copy as-is
        let verbatim = if is_macro_invocation(tokens, i) {
            Some(3)
        } else {
            closure_len(tokens, i).or_else(|| fn_item_len(tokens, i))
        };
        if let Some(len) = verbatim {
            let end = (i + len).min(tokens.len());
            result.extend(tokens[i..end].iter().cloned());
            i = end;
            continue;
        }

        match &tokens[i] {
            TokenTree::Ident(id) if id == "return" => {
                let start = i + 1;
                let len = expr_len(tokens, start);
                let value = transform_tokens(&tokens[start..start + len], ctx, rethrow)?;
                let value = if value.is_empty() { quote!(()) } else { value };
                result.extend(quote_spanned! { id.span() =>
                    return ::core::result::Result::Ok(::raise_this::Outcome::Return(#value))
                });
                i = start + len;
            }
            TokenTree::Ident(id) if is_rethrow(tokens, i) => {
                let handling = &ctx.handling;
                let raised = match rethrow {
                    Rethrow::Forbidden => {
                        return Err(Error::new(
                            id.span(),
                            "`rethrow` is only allowed inside a `catch` clause",
                        ));
                    }
                    Rethrow::Owned => quote_spanned! { id.span() => #handling.rethrow() },
                    Rethrow::Borrowed => quote_spanned! { id.span() => #handling.rethrow_ref() },
                };
                result.extend(quote_spanned! { id.span() =>
                    return ::core::result::Result::Err(#raised)
                });
                i += 1;
            }
            TokenTree::Group(g) => {
                let inner = transform_tokens(&g.stream().into_iter().collect::<Vec<_>>(), ctx, rethrow)?;
                let mut group = Group::new(g.delimiter(), inner);
                group.set_span(g.span());
                result.extend(std::iter::once(TokenTree::Group(group)));
                i += 1;
            }
            other => {
                result.extend(std::iter::once(other.clone()));
                i += 1;
            }
        }
    }

    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keywords::Mode;
    use proc_macro2::{Ident, Span};

    fn ctx() -> GenContext {
        GenContext::new(Mode::Top, Ident::new("rt", Span::call_site()))
    }

    fn rewrite(tokens: TokenStream, rethrow: Rethrow) -> Result<String> {
        transform_body(tokens, &ctx(), rethrow).map(|t| t.to_string())
    }

    #[test]
    fn test_return_becomes_outcome() {
        let code = rewrite(quote! { if x { return Ok(2); } }, Rethrow::Forbidden).unwrap();
        assert!(code.contains("Outcome :: Return (Ok (2))"));
    }

    #[test]
    fn test_bare_return() {
        let code = rewrite(quote! { return; }, Rethrow::Forbidden).unwrap();
        assert!(code.contains("Outcome :: Return (())"));
    }

    #[test]
    fn test_match_arm_return_stops_at_comma() {
        let code = rewrite(quote! { match v { 0 => return Ok(1), _ => 2 } }, Rethrow::Forbidden).unwrap();
        assert!(code.contains("Return (Ok (1))"));
        assert!(code.contains("_ => 2"));
    }

    #[test]
    fn test_rethrow_in_handler() {
        let code = rewrite(quote! { log(); rethrow; }, Rethrow::Owned).unwrap();
        assert!(code.contains("Err (__handling . rethrow ())"));
    }

    #[test]
    fn test_rethrow_in_region_nested_in_clause_borrows() {
        let code = rewrite(quote! { rethrow; }, Rethrow::Borrowed).unwrap();
        assert!(code.contains("Err (__handling . rethrow_ref ())"));
    }

    #[test]
    fn test_rethrow_outside_handler() {
        let err = rewrite(quote! { rethrow; }, Rethrow::Forbidden).unwrap_err();
        assert!(err.to_string().contains("only allowed inside a `catch` clause"));
    }

    #[test]
    fn test_closure_return_untouched() {
        let code = rewrite(quote! { let f = |x: i32| { return x; }; f(1) }, Rethrow::Forbidden).unwrap();
        assert!(!code.contains("Outcome"));
    }

    #[test]
    fn test_fn_item_untouched() {
        let code = rewrite(quote! { fn helper() -> i32 { return 1; } helper() }, Rethrow::Forbidden).unwrap();
        assert!(!code.contains("Outcome"));
    }

    #[test]
    fn test_nested_region_marker() {
        let code = rewrite(quote! { guarded! { rt => try { } catch { } } }, Rethrow::Forbidden).unwrap();
        assert!(code.contains("__guarded_proc ! (NESTED __handling rt =>"));

        let code = rewrite(quote! { guarded! { rt => try { } catch { } } }, Rethrow::Owned).unwrap();
        assert!(code.contains("__guarded_proc ! (NESTED_HANDLER __handling rt =>"));
    }

    #[test]
    fn test_other_macros_untouched() {
        let code = rewrite(quote! { println!("{}", return_value); vec![rethrow] }, Rethrow::Forbidden).unwrap();
        assert!(code.contains("vec ! [rethrow]"));
    }
}
