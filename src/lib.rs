//! raise-this - Typed raise, unwind and first-match handling
//!
//! # Overview
//!
//! `raise-this` models structured exception propagation explicitly. A failure
//! is a typed [`Payload`] traveling as `Err(`[`Raised`]`)` through frames on
//! an explicit [`CallStack`]; each frame releases its scoped resources as it
//! is popped, newest first. A guarded region tries its handler clauses in
//! declaration order and the first compatible one runs. A clause may
//! `rethrow` the payload it is handling, unchanged, to the next region out.
//! A payload that reaches the entry point with no clause to take it is
//! [`Fatal`].
//!
//! # Quick Start
//!
//! ```
//! use raise_this::{guarded, raise, Record, Result, Runtime};
//!
//! fn foo(rt: &mut Runtime, b: bool) -> Result<()> {
//!     rt.call("foo", |rt| {
//!         if b {
//!             raise!(rt, 0);
//!         }
//!         raise!(rt, Record { i: 0 })
//!     })
//! }
//!
//! fn main_entry(rt: &mut Runtime, argc: i32) -> Result<i32> {
//!     guarded! { rt =>
//!         try { foo(rt, argc == 1)?; }
//!         catch Record(_) { return Ok(2); }
//!         catch i32(_) { return Ok(3); }
//!         catch { return Ok(1); }
//!     }
//!     Ok(0)
//! }
//!
//! let mut rt = Runtime::new();
//! assert_eq!(rt.entry("main", |rt| main_entry(rt, 0)).unwrap(), 2);
//! ```
//!
//! # Patterns
//!
//! ## Clauses
//!
//! | Pattern | Description |
//! |---------|-------------|
//! | `catch Type(v) { }` | Typed clause, exact kind only |
//! | `catch Type { }` | Typed clause, value ignored |
//! | `catch e { }` | Catch-all, `e` is the [`Payload`] |
//! | `catch { }` | Catch-all without binding |
//!
//! ## Inside bodies and clauses
//!
//! | Pattern | Description |
//! |---------|-------------|
//! | `raise!(rt, v)` | Raise from the current frame |
//! | `expr?` | Propagate to the next region out |
//! | `return v` | Return `v` from the enclosing function |
//! | `rethrow;` | Clause only: send the handled payload on unchanged |
//! | `guarded! { rt => .. }` | Nested region |
//!
//! ## Without the macro
//!
//! | Call | Description |
//! |------|-------------|
//! | `rt.call(name, f)` | Run `f` in a new frame |
//! | `rt.defer(label, f)` | Scoped resource on the current frame |
//! | `rt.guard(body)` | Region; then `.catch(..)`, `.catch_all(..)`, `.end()` |
//! | `rt.entry(name, f)` | Entry point; escape is [`Fatal::Uncaught`] |
//! | `Process::new().init(..).run(..)` | Init phase, then entry point |
//!
//! # Static analysis
//!
//! [`analysis`] indexes a program's functions, calls, regions and raise
//! sites, and reports where each raise can end up.

// Generated code names this crate by its absolute path
extern crate self as raise_this;

// ============================================================
// Modules
// ============================================================

mod config;
mod error;
mod frame;
mod macros;
mod payload;
mod process;
mod raised;
mod region;
mod runtime;

pub mod analysis;
pub mod scenario;

// ============================================================
// Re-exports
// ============================================================

pub use config::{Config, DEFAULT_HOP_LIMIT, DEFAULT_ROOT_NAME};
pub use error::{Fatal, RegionError};
pub use frame::{CallStack, Frame, Resource, ScopeMark};
pub use payload::{Accepts, Payload, PayloadKind, Raisable, Record};
pub use process::{terminate_on_fatal, Process};
pub use raised::{Hop, RaiseId, Raised, Site};
pub use region::{validate_clauses, ActiveRegion, Guarded, Handling, RegionId, Sealed};
pub use runtime::Runtime;

// Re-export proc-macro crate for macro expansion
#[doc(hidden)]
pub use raise_this_macros;

// ============================================================
// Type aliases
// ============================================================

/// Result type alias: `Err` is a payload in flight.
pub type Result<T, E = Raised> = core::result::Result<T, E>;

// ============================================================
// Outcome - early return as data
// ============================================================

/// What a region body or clause produced.
///
/// Bodies and clauses run inside closures, so `return` cannot leave the
/// enclosing function directly. `guarded!` turns `return v` into
/// `Outcome::Return(v)` and unpacks it after the region.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome<T, R> {
    /// Completed; the region's value.
    Continue(T),
    /// Leave the enclosing function with this value.
    Return(R),
}

impl<T, R> Outcome<T, R> {
    /// Map the region value, keeping an early return.
    #[inline]
    pub fn map<U, F: FnOnce(T) -> U>(self, f: F) -> Outcome<U, R> {
        match self {
            Outcome::Continue(v) => Outcome::Continue(f(v)),
            Outcome::Return(r) => Outcome::Return(r),
        }
    }

    #[inline]
    pub fn is_return(&self) -> bool {
        matches!(self, Outcome::Return(_))
    }
}
