#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

//! Grammar description model for Gloss.
//!
//! A [`Grammar`] is the input of table compilation. It can be loaded from a
//! tree-sitter style `grammar.json`, decoded from its compact binary form, or
//! built in Rust with the helpers in [`grammar::dsl`].

pub mod grammar;
mod interner;


pub use grammar::{Grammar, LoadError, Precedence, PrecedenceEntry, Rule};
pub use interner::{Interner, Name};
