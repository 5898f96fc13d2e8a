//! Rowan tree types for Taxi.

use crate::syntax_kind::SyntaxKind;

/// Marker type tying [`SyntaxKind`] to rowan's generic tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum TaxiLanguage {}

impl rowan::Language for TaxiLanguage {
    type Kind = SyntaxKind;

    fn kind_from_raw(raw: rowan::SyntaxKind) -> Self::Kind {
        assert!(raw.0 <= SyntaxKind::CONSTRAINT as u16, "unknown raw syntax kind {}", raw.0);
        // Safety: SyntaxKind is #[repr(u16)] with contiguous discriminants up
        // to CONSTRAINT, checked above.
        unsafe { std::mem::transmute::<u16, SyntaxKind>(raw.0) }
    }

    fn kind_to_raw(kind: Self::Kind) -> rowan::SyntaxKind {
        rowan::SyntaxKind(kind as u16)
    }
}

pub type SyntaxNode = rowan::SyntaxNode<TaxiLanguage>;
pub type SyntaxToken = rowan::SyntaxToken<TaxiLanguage>;
pub type SyntaxElement = rowan::SyntaxElement<TaxiLanguage>;
