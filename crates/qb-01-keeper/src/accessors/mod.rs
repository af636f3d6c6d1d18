//! Typed accessors, one file per record family.
//!
//! Each file extends [`crate::Keeper`] with an `impl` block so callers only
//! ever hold one handle.

pub mod mimir;
pub mod network;
pub mod nodes;
pub mod txout;
pub mod vaults;
