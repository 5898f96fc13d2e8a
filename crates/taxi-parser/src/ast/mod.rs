//! Typed AST layer on top of the rowan CST.
//!
//! Each wrapper is a newtype around a `SyntaxNode` with accessors that walk
//! the tree on demand, in the rust-analyzer style. `cast()` is a single kind
//! check.

pub mod item;
pub mod types;

use crate::cst::{SyntaxNode, SyntaxToken};
use crate::syntax_kind::SyntaxKind;

pub trait AstNode: Sized {
    fn cast(node: SyntaxNode) -> Option<Self>;

    fn syntax(&self) -> &SyntaxNode;
}

/// Declarations, fields, operations and enum values can all carry a
/// `[[ doc ]]` comment and annotations.
pub trait HasDocsAndAnnotations: AstNode {
    /// The doc comment text without its `[[ ]]` delimiters.
    fn doc(&self) -> Option<String> {
        child_token(self.syntax(), SyntaxKind::DOC_COMMENT).map(|t| taxi_lexer::doc_text(t.text()))
    }

    fn annotations(&self) -> Vec<types::Annotation> {
        child_nodes(self.syntax()).collect()
    }
}

/// Declarations with a (possibly dotted) `NAME`.
pub trait HasName: AstNode {
    fn name(&self) -> Option<item::Name> {
        child_node(self.syntax())
    }
}

/// Nodes whose own name is the first direct IDENT token (fields, enum
/// values, operations, parameters).
pub trait HasIdent: AstNode {
    fn ident(&self) -> Option<SyntaxToken> {
        child_token(self.syntax(), SyntaxKind::IDENT)
    }
}

macro_rules! ast_node {
    ($name:ident, $kind:ident) => {
        #[derive(Debug, Clone, PartialEq, Eq, Hash)]
        pub struct $name {
            pub(crate) syntax: SyntaxNode,
        }

        impl AstNode for $name {
            fn cast(node: SyntaxNode) -> Option<Self> {
                if node.kind() == SyntaxKind::$kind {
                    Some(Self { syntax: node })
                } else {
                    None
                }
            }

            fn syntax(&self) -> &SyntaxNode {
                &self.syntax
            }
        }
    };
}

pub(crate) use ast_node;

pub fn child_node<N: AstNode>(parent: &SyntaxNode) -> Option<N> {
    parent.children().find_map(N::cast)
}

pub fn child_nodes<'a, N: AstNode + 'a>(parent: &'a SyntaxNode) -> impl Iterator<Item = N> + 'a {
    parent.children().filter_map(N::cast)
}

pub fn child_token(parent: &SyntaxNode, kind: SyntaxKind) -> Option<SyntaxToken> {
    parent
        .children_with_tokens()
        .filter_map(|it| it.into_token())
        .find(|it| it.kind() == kind)
}

/// Concatenated text of the IDENT and DOT tokens directly under `node`.
pub(crate) fn dotted_text(node: &SyntaxNode) -> String {
    node.children_with_tokens()
        .filter_map(|it| it.into_token())
        .filter(|t| matches!(t.kind(), SyntaxKind::IDENT | SyntaxKind::DOT))
        .map(|t| t.text().to_string())
        .collect()
}
