//! Type system utilities and aliases.
//!
//! - [`aliases`]: Shared-state and callback aliases.

pub mod aliases;

pub use aliases::*;
