//! Proc macros for the raise-this crate.
//!
//! A single entry point routes on a marker token to the region pattern,
//! which uses the shared keyword, nested-transform and codegen modules.

use proc_macro::TokenStream;

mod router;
mod keywords;
mod patterns;
mod nested;
mod codegen;

/// Single proc macro entry point for `guarded!`.
///
/// The declarative macro (or a nested rewrite) prefixes the input with a
/// marker:
/// - `REGION` - a region written directly in a function body
/// - `NESTED` - a region inside a `try` body of another region
/// - `NESTED_HANDLER` - a region inside a `catch` clause (its `try` body may `rethrow`)
/// - `ERROR`, `ERROR_NO_CLAUSES`, `ERROR_EMPTY` - malformed input, reported with spans
#[proc_macro]
pub fn __guarded_proc(input: TokenStream) -> TokenStream {
    router::route(input.into())
        .unwrap_or_else(|e| e.to_compile_error())
        .into()
}
