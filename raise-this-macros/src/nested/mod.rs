//! Rewriting of region bodies and nested regions.
//!
//! ## Module Structure
//!
//! - `detection` - token-level recognizers (closures, fn items, `rethrow`, nested `guarded!`)
//! - `transform` - the rewrite itself

mod detection;
mod transform;

pub use transform::{transform_body, Rethrow};
