//! Diagram model
//!
//! The database every input format loads into, the chain semantics behind
//! `>>`, `<<` and `-`, and a typed builder on top of both.

mod builder;
mod chain;
mod database;

pub use builder::*;
pub use chain::*;
pub use database::*;
