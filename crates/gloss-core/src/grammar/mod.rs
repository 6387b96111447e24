//! Grammar types for tree-sitter style grammars.
//!
//! Covers the `grammar.json` format (JSON in, postcard binary in/out) and a
//! small builder DSL that mirrors the `grammar.js` helpers.

mod binary;
pub mod dsl;
mod error;
mod json;
mod types;

#[cfg(test)]
mod dsl_tests;
#[cfg(test)]
mod json_tests;

pub use error::LoadError;
pub use types::{Grammar, Precedence, PrecedenceEntry, Rule};
