//! Purge scanner: directory walker, base-name patterns, and the purge engine.

pub mod patterns;
pub mod purge;
pub mod walker;
