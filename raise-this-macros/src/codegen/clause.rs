//! Clause closures.
//!
//! Every closure rebinds the user's runtime name so bodies keep writing
//! `rt`, and returns `Result<Outcome<_, _>>` so early returns travel as data.

use proc_macro2::TokenStream;
use quote::{quote, quote_spanned};

use crate::keywords::GenContext;

/// Return type shared by the body closure and every clause closure.
pub fn closure_result_type() -> TokenStream {
    quote! { ::raise_this::Result<::raise_this::Outcome<_, _>> }
}

/// `Ok(Outcome::Continue({ body }))`
pub fn continue_with(body: &TokenStream) -> TokenStream {
    quote! {
        ::core::result::Result::Ok(::raise_this::Outcome::Continue({ #body }))
    }
}

/// Closure passed to `Runtime::guard`.
pub fn gen_body(ctx: &GenContext, body: &TokenStream) -> TokenStream {
    let rt = &ctx.runtime;
    let result_ty = closure_result_type();
    let value = continue_with(body);
    quote! {
        |#rt: &mut ::raise_this::Runtime| -> #result_ty {
            #value
        }
    }
}

/// `.catch(|rt, binding: Type, __handling| ...)`
pub fn gen_typed(
    ctx: &GenContext,
    span: proc_macro2::Span,
    type_path: &TokenStream,
    binding: &syn::Ident,
    body: &TokenStream,
) -> TokenStream {
    let rt = &ctx.runtime;
    let handling = &ctx.handling;
    let result_ty = closure_result_type();
    let value = continue_with(body);
    quote_spanned! { span =>
        .catch(|#rt: &mut ::raise_this::Runtime, #binding: #type_path, #handling: ::raise_this::Handling| -> #result_ty {
            let _ = &#rt;
            let _ = &#handling;
            #value
        })
    }
}

/// `.catch_all(|rt, __handling| ...)`, binding the payload if named.
pub fn gen_catch_all(
    ctx: &GenContext,
    span: proc_macro2::Span,
    binding: Option<&syn::Ident>,
    body: &TokenStream,
) -> TokenStream {
    let rt = &ctx.runtime;
    let handling = &ctx.handling;
    let result_ty = closure_result_type();
    let value = continue_with(body);
    let bind_stmt = match binding {
        Some(b) => quote! { let #b = #handling.payload(); },
        None => quote! { let _ = &#handling; },
    };
    quote_spanned! { span =>
        .catch_all(|#rt: &mut ::raise_this::Runtime, #handling: ::raise_this::Handling| -> #result_ty {
            let _ = &#rt;
            #bind_stmt
            #value
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keywords::Mode;
    use proc_macro2::{Ident, Span};

    fn ctx() -> GenContext {
        GenContext::new(Mode::Top, Ident::new("rt", Span::call_site()))
    }

    #[test]
    fn test_typed_clause() {
        let binding = Ident::new("r", Span::call_site());
        let code = gen_typed(&ctx(), Span::call_site(), &quote!(Record), &binding, &quote!(r.i))
            .to_string();
        assert!(code.starts_with(". catch"));
        assert!(code.contains("r : Record"));
        assert!(code.contains("Outcome :: Continue ({ r . i })"));
    }

    #[test]
    fn test_catch_all_binding() {
        let binding = Ident::new("e", Span::call_site());
        let code = gen_catch_all(&ctx(), Span::call_site(), Some(&binding), &quote!(1)).to_string();
        assert!(code.starts_with(". catch_all"));
        assert!(code.contains("let e = __handling . payload ()"));

        let code = gen_catch_all(&ctx(), Span::call_site(), None, &quote!(1)).to_string();
        assert!(!code.contains("payload"));
    }
}
