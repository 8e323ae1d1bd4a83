//! Shared building blocks for the message board crates: logging setup,
//! small wire types and startup environment checks.

pub mod types;
pub mod utils;
pub mod env;
