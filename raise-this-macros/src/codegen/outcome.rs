//! The region expression: guard, dispatch chain, and unpacking the outcome.

use proc_macro2::TokenStream;
use quote::quote;

use crate::keywords::GenContext;

/// Wrap a guard call and its clause chain.
///
/// `Continue(v)` is the region's value; `Return(v)` leaves the enclosing
/// function, or, for a nested region, the enclosing body closure with the
/// return still packed so the outer region passes it on.
pub fn gen_region(ctx: &GenContext, body_closure: &TokenStream, clauses: &[TokenStream]) -> TokenStream {
    let rt = &ctx.runtime;

    let on_return = if ctx.mode.is_nested() {
        quote! {
            return ::core::result::Result::Ok(::raise_this::Outcome::Return(__raise_value))
        }
    } else {
        quote! { return __raise_value }
    };

    quote! {
        {
            #[allow(unreachable_code, clippy::needless_return)]
            let __raise_outcome = #rt.guard(#body_closure)
                #(#clauses)*
                .end();
            match __raise_outcome? {
                ::raise_this::Outcome::Continue(__raise_value) => __raise_value,
                ::raise_this::Outcome::Return(__raise_value) => #on_return,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keywords::Mode;
    use proc_macro2::{Ident, Span};

    fn ctx(mode: Mode) -> GenContext {
        GenContext::new(mode, Ident::new("rt", Span::call_site()))
    }

    #[test]
    fn test_top_level_returns_from_function() {
        let code = gen_region(&ctx(Mode::Top), &quote!(|rt| body), &[quote!(.catch_all(c))]).to_string();
        assert!(code.contains("rt . guard (| rt | body) . catch_all (c) . end ()"));
        assert!(code.contains("=> return __raise_value"));
    }

    #[test]
    fn test_nested_repacks_return() {
        let code = gen_region(&ctx(Mode::Nested), &quote!(|rt| body), &[]).to_string();
        assert!(code.contains("Outcome :: Return (__raise_value)"));
    }
}
