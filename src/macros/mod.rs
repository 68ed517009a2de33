//! Declarative macros for raise-this.

// guarded! and raise! are defined here with #[macro_export], which exports them at crate root
#[macro_use]
mod guarded;
