//! Pattern modules - each handles one `guarded!` form.
//!
//! Patterns use keyword modules for shared clause semantics.

pub mod region;
