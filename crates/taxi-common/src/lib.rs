//! Shared types used across the Taxi compiler crates: byte spans, line
//! lookup, the token vocabulary and lexer errors.

pub mod error;
pub mod span;
pub mod token;
