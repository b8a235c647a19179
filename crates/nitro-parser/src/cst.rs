//! Rowan glue: the `NitroLanguage` marker and tree type aliases.

use crate::syntax_kind::SyntaxKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum NitroLanguage {}

impl rowan::Language for NitroLanguage {
    type Kind = SyntaxKind;

    fn kind_from_raw(raw: rowan::SyntaxKind) -> Self::Kind {
        assert!(raw.0 <= SyntaxKind::__LAST as u16);
        // Safety: SyntaxKind is #[repr(u16)] with contiguous discriminants,
        // and the bound was checked above.
        unsafe { std::mem::transmute::<u16, SyntaxKind>(raw.0) }
    }

    fn kind_to_raw(kind: Self::Kind) -> rowan::SyntaxKind {
        rowan::SyntaxKind(kind as u16)
    }
}

pub type SyntaxNode = rowan::SyntaxNode<NitroLanguage>;
pub type SyntaxToken = rowan::SyntaxToken<NitroLanguage>;
pub type SyntaxElement = rowan::SyntaxElement<NitroLanguage>;
