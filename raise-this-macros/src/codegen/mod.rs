//! Code generation for regions.
//!
//! - `clause` - one `.catch(..)` / `.catch_all(..)` call per clause
//! - `outcome` - the `guard` call, the dispatch chain, and unpacking `Outcome`

pub mod clause;
pub mod outcome;
