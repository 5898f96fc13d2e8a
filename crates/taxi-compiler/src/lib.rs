//! Taxi semantic compiler.
//!
//! Turns parsed Taxi sources into a [`Document`]: a closed set of types and
//! services in which every reference has been resolved, extensions merged,
//! constraints validated and assignability made queryable.
//!
//! # Architecture
//!
//! - [`name`]: qualified names and their parameterized textual form
//! - [`primitives`]: the built-in `lang.taxi` types
//! - [`types`]: the type model, stored in a [`types::TypeArena`]
//! - [`registry`]: name-keyed registration with stubs for forward references
//! - [`compiler`]: the phased pipeline from source text to document
//! - [`constraints`]: field, parameter and return-type constraints
//! - [`services`]: services, operations and their contracts
//! - [`checker`]: assignability between types
//! - `synonyms`: symmetric, transitive links between enum values
//! - [`document`]: the compiled result and its queries
//! - [`error`] and [`diagnostics`]: located messages and their rendering

pub mod checker;
mod collator;
pub mod compiler;
pub mod constraints;
pub mod diagnostics;
pub mod document;
pub mod error;
pub mod name;
pub mod primitives;
pub mod registry;
pub mod services;
mod synonyms;
pub mod types;

pub use compiler::Compiler;
pub use document::Document;
pub use error::{CompilationError, CompilationException, CompileErrorKind, Severity};

/// Compile `(name, text)` sources together.
pub fn compile(sources: &[(&str, &str)]) -> Result<Document, CompilationException> {
    sources
        .iter()
        .fold(Compiler::new(), |compiler, (name, text)| compiler.with_source(*name, *text))
        .compile()
}
