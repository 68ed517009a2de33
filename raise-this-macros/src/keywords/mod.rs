//! Keyword modules - parsing for the pieces of a region.
//!
//! - `parsing` - shared parsing utilities (type paths, bindings, bodies)
//! - `catch` - handler clauses

pub mod parsing;
pub mod catch;

use proc_macro2::Span;
use syn::Ident;

/// Where a region appears, which decides how its early returns leave and
/// whether its `try` body may `rethrow`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Directly in a function body; `return` leaves that function.
    Top,
    /// Inside the `try` body of an enclosing region.
    Nested,
    /// Inside a `catch` clause of an enclosing region.
    NestedHandler,
}

impl Mode {
    pub fn is_nested(self) -> bool {
        !matches!(self, Mode::Top)
    }

    /// Whether `rethrow` is allowed in this region's `try` body.
    pub fn try_body_in_handler(self) -> bool {
        matches!(self, Mode::NestedHandler)
    }
}

/// Context for code generation - shared state across generators.
#[derive(Debug, Clone)]
pub struct GenContext {
    pub mode: Mode,
    /// The user's `&mut Runtime` binding; every closure rebinds it.
    pub runtime: Ident,
    /// Binding for the payload a clause is handling.
    pub handling: Ident,
}

impl GenContext {
    pub fn new(mode: Mode, runtime: Ident) -> Self {
        Self::with_handling(mode, runtime, Ident::new("__handling", Span::call_site()))
    }

    /// Context for a nested region, reusing the enclosing region's
    /// `__handling` token so a `rethrow` resolves to the enclosing clause.
    pub fn with_handling(mode: Mode, runtime: Ident, handling: Ident) -> Self {
        Self { mode, runtime, handling }
    }
}

/// Helper to check if an identifier is a binding (for catch-all detection).
/// Returns true for lowercase identifiers (e.g., `e`) or underscore-prefixed (e.g., `_e`).
pub fn is_lowercase_ident(ident: &Ident) -> bool {
    let s = ident.to_string();
    s.chars().next().map(|c| c.is_lowercase() || c == '_').unwrap_or(false)
}

/// Helper to peek for a keyword without consuming.
/// Handles both regular identifiers and the reserved `try`.
pub fn peek_keyword(input: syn::parse::ParseStream, keyword: &str) -> bool {
    match keyword {
        "try" => input.peek(syn::Token![try]),
        _ => input.peek(Ident) && input.fork().parse::<Ident>().map(|id| id == keyword).unwrap_or(false),
    }
}

/// Parse a keyword, returning error if not found.
pub fn parse_keyword(input: syn::parse::ParseStream, keyword: &str) -> syn::Result<Ident> {
    match keyword {
        "try" => {
            let token: syn::Token![try] = input.parse()?;
            Ok(Ident::new("try", token.span))
        }
        _ => {
            let ident: Ident = input.parse()?;
            if ident == keyword {
                Ok(ident)
            } else {
                Err(syn::Error::new(ident.span(), format!("expected `{}`", keyword)))
            }
        }
    }
}
