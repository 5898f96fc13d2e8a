//! Taxi parser: recursive descent over the token stream from `taxi-lexer`,
//! producing a rowan concrete syntax tree with a typed AST layer.
//!
//! This is the input adapter of the compiler: it hands declaration nodes
//! (kind, identifiers, members, annotations, literals, positions) to the
//! semantic passes in `taxi-compiler`.

pub mod ast;
pub mod cst;
pub mod error;
mod parser;
pub mod syntax_kind;

pub use cst::{SyntaxElement, SyntaxNode, SyntaxToken};
pub use error::ParseError;
pub use syntax_kind::SyntaxKind;

/// Result of parsing one source text.
///
/// Lexer errors come first, followed by at most one parse error (the parser
/// stops at the first one).
#[derive(Debug, Clone)]
pub struct Parse {
    green: rowan::GreenNode,
    errors: Vec<ParseError>,
}

impl Parse {
    pub fn syntax(&self) -> SyntaxNode {
        SyntaxNode::new_root(self.green.clone())
    }

    /// The typed root of the tree.
    pub fn tree(&self) -> ast::item::SourceFile {
        // The root is always built as SOURCE_FILE by parse_source_file.
        ast::item::SourceFile {
            syntax: self.syntax(),
        }
    }

    pub fn errors(&self) -> &[ParseError] {
        &self.errors
    }

    pub fn ok(&self) -> bool {
        self.errors.is_empty()
    }

    /// Indented dump of the tree, one node or token per line.
    pub fn debug_tree(&self) -> String {
        format!("{:#?}", self.syntax())
    }
}

/// Lex and parse a Taxi source text.
pub fn parse(source: &str) -> Parse {
    let (tokens, lex_errors) = taxi_lexer::Lexer::tokenize_with_errors(source);
    let mut p = parser::Parser::new(tokens, source);
    parser::parse_source_file(&mut p);
    let (green, parse_errors) = p.build_tree();

    let errors = lex_errors
        .into_iter()
        .map(ParseError::from)
        .chain(parse_errors)
        .collect();
    Parse { green, errors }
}

