//! The `guarded!` and `raise!` macros.
//!
//! `guarded!` catches the pattern keywords (which proc macros can't take as
//! a `try` block) and routes to the proc macro with a marker.

/// Guarded region: a body plus ordered handler clauses.
///
/// ```
/// use raise_this::{guarded, raise, Record, Result, Runtime};
///
/// fn foo(rt: &mut Runtime, b: bool) -> Result<()> {
///     rt.call("foo", |rt| {
///         if b {
///             raise!(rt, 0);
///         }
///         raise!(rt, Record { i: 0 })
///     })
/// }
///
/// fn entry(rt: &mut Runtime, argc: i32) -> Result<i32> {
///     guarded! { rt =>
///         try { foo(rt, argc == 1)?; }
///         catch Record(_) { return Ok(2); }
///         catch i32(_) { return Ok(3); }
///         catch { return Ok(1); }
///     }
///     Ok(0)
/// }
///
/// let mut rt = Runtime::new();
/// assert_eq!(entry(&mut rt, 0).unwrap(), 2);
/// assert_eq!(entry(&mut rt, 1).unwrap(), 3);
/// ```
///
/// The value of the region is the body's value, or the value of the clause
/// that ran:
///
/// ```
/// use raise_this::{guarded, raise, Result, Runtime};
///
/// fn parse(rt: &mut Runtime, s: &str) -> Result<i32> {
///     let n = guarded! { rt =>
///         try {
///             match s.parse::<i32>() {
///                 Ok(n) => n,
///                 Err(_) => raise!(rt, -1),
///             }
///         }
///         catch i32(code) { code * 10 }
///     };
///     Ok(n)
/// }
///
/// let mut rt = Runtime::new();
/// assert_eq!(parse(&mut rt, "4").unwrap(), 4);
/// assert_eq!(parse(&mut rt, "x").unwrap(), -10);
/// ```
///
/// `rethrow` sends the handled payload, unchanged, to the next region out:
///
/// ```
/// use raise_this::{guarded, raise, Result, Runtime};
///
/// fn f(rt: &mut Runtime) -> Result<i32> {
///     guarded! { rt =>
///         try {
///             guarded! { rt =>
///                 try { raise!(rt, 0) }
///                 catch i32(_) { rethrow; }
///             }
///         }
///         catch i32(v) { return Ok(3 + v); }
///         catch { return Ok(1); }
///     }
/// }
///
/// assert_eq!(f(&mut Runtime::new()).unwrap(), 3);
/// ```
///
/// A clause after the catch-all does not compile:
///
/// ```compile_fail
/// use raise_this::{guarded, Result, Runtime};
///
/// fn f(rt: &mut Runtime) -> Result<i32> {
///     Ok(guarded! { rt =>
///         try { 1 }
///         catch { 2 }
///         catch i32(v) { v }
///     })
/// }
/// ```
///
/// Neither does `rethrow` outside a clause:
///
/// ```compile_fail
/// use raise_this::{guarded, Result, Runtime};
///
/// fn f(rt: &mut Runtime) -> Result<i32> {
///     Ok(guarded! { rt =>
///         try { rethrow; 1 }
///         catch { 2 }
///     })
/// }
/// ```
#[macro_export]
macro_rules! guarded {
    // rt => try { } catch ...
    ($rt:ident => try { $($body:tt)* } $($rest:tt)+) => {
        $crate::raise_this_macros::__guarded_proc!(REGION $rt => try { $($body)* } $($rest)+)
    };

    // rt => try { } alone - a region needs clauses
    ($rt:ident => try { $($body:tt)* }) => {
        $crate::raise_this_macros::__guarded_proc!(ERROR_NO_CLAUSES $rt)
    };

    // Catch-all: first token preserved with span, proc macro picks the message
    ($first:tt $($rest:tt)*) => {
        $crate::raise_this_macros::__guarded_proc!(ERROR $first $($rest)*)
    };

    () => {
        $crate::raise_this_macros::__guarded_proc!(ERROR_EMPTY)
    };
}

/// Raise a payload from the current frame and leave the enclosing body.
///
/// `raise!(rt, payload)` is `return Err(rt.raise(payload))`; it never comes
/// back to its call site.
#[macro_export]
macro_rules! raise {
    ($rt:expr, $payload:expr $(,)?) => {
        return ::core::result::Result::Err($rt.raise($payload))
    };
}
