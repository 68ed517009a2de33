//! Detection utilities for the body rewrite.
//!
//! Each function looks at `tokens[i..]` and reports how many tokens a
//! construct spans, so the rewrite can copy it verbatim or replace it.

use proc_macro2::{Delimiter, TokenTree};

pub fn is_punct(token: Option<&TokenTree>, ch: char) -> bool {
    matches!(token, Some(TokenTree::Punct(p)) if p.as_char() == ch)
}

fn is_ident(token: Option<&TokenTree>, name: &str) -> bool {
    matches!(token, Some(TokenTree::Ident(id)) if id == name)
}

/// `name! group` - any macro invocation.
pub fn is_macro_invocation(tokens: &[TokenTree], i: usize) -> bool {
    matches!(tokens.get(i), Some(TokenTree::Ident(_)))
        && is_punct(tokens.get(i + 1), '!')
        && matches!(tokens.get(i + 2), Some(TokenTree::Group(_)))
}

/// Bare `guarded! { ... }` (not a path like `raise_this::guarded!`).
pub fn is_nested_region(tokens: &[TokenTree], i: usize) -> bool {
    is_ident(tokens.get(i), "guarded")
        && is_macro_invocation(tokens, i)
        && !(i > 0 && is_punct(tokens.get(i - 1), ':'))
}

/// `rethrow` used as a statement: not a method or field, ends the expression.
pub fn is_rethrow(tokens: &[TokenTree], i: usize) -> bool {
    if !is_ident(tokens.get(i), "rethrow") {
        return false;
    }
    if i > 0 && (is_punct(tokens.get(i - 1), '.') || is_punct(tokens.get(i - 1), ':')) {
        return false;
    }
    match tokens.get(i + 1) {
        None => true,
        next => is_punct(next, ';') || is_punct(next, ','),
    }
}

/// Length of an expression starting at `i`, up to (not including) a `;` or
/// `,` at this nesting level.
pub fn expr_len(tokens: &[TokenTree], i: usize) -> usize {
    tokens[i..]
        .iter()
        .position(|t| is_punct(Some(t), ';') || is_punct(Some(t), ','))
        .unwrap_or(tokens.len() - i)
}

/// Whether `tokens[i]` (a `|`) opens a closure rather than being a binary or.
fn opens_closure(tokens: &[TokenTree], i: usize) -> bool {
    if i == 0 {
        return true;
    }
    match &tokens[i - 1] {
        TokenTree::Punct(p) => !matches!(p.as_char(), '?' | '|'),
        TokenTree::Ident(id) => id == "move" || id == "return" || id == "in",
        _ => false,
    }
}

/// Length of a closure starting at `i` (`move`, `|..|` or `||`), through its
/// body. None if `tokens[i]` does not start one.
pub fn closure_len(tokens: &[TokenTree], i: usize) -> Option<usize> {
    let mut j = i;
    if is_ident(tokens.get(j), "move") {
        j += 1;
    }
    if !is_punct(tokens.get(j), '|') || !opens_closure(tokens, j) {
        return None;
    }

    // Parameters: `||` or `| ... |`
    j += 1;
    while j < tokens.len() && !is_punct(tokens.get(j), '|') {
        j += 1;
    }
    j += 1;

    // `-> Type { body }`
    if is_punct(tokens.get(j), '-') && is_punct(tokens.get(j + 1), '>') {
        while j < tokens.len() {
            if matches!(&tokens[j], TokenTree::Group(g) if g.delimiter() == Delimiter::Brace) {
                return Some(j + 1 - i);
            }
            j += 1;
        }
        return Some(tokens.len() - i);
    }

    if j >= tokens.len() {
        return Some(tokens.len() - i);
    }
    Some(j + expr_len(tokens, j) - i)
}

/// Length of a nested `fn` item through its body block.
pub fn fn_item_len(tokens: &[TokenTree], i: usize) -> Option<usize> {
    if !is_ident(tokens.get(i), "fn") {
        return None;
    }
    tokens[i..]
        .iter()
        .position(|t| matches!(t, TokenTree::Group(g) if g.delimiter() == Delimiter::Brace))
        .map(|pos| pos + 1)
}
