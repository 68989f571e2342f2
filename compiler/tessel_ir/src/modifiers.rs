//! Declaration modifiers and derived visibility.

use bitflags::bitflags;

bitflags! {
    /// Modifier keywords attached to a declaration.
    #[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
    pub struct Modifiers: u8 {
        const PUBLIC = 1 << 0;
        const PROTECTED = 1 << 1;
        const PRIVATE = 1 << 2;
        const STATIC = 1 << 3;
        const FINAL = 1 << 4;
        const ABSTRACT = 1 << 5;
    }
}

impl Modifiers {
    /// Access level implied by the modifier set.
    pub fn visibility(self) -> Visibility {
        if self.contains(Modifiers::PUBLIC) {
            Visibility::Public
        } else if self.contains(Modifiers::PROTECTED) {
            Visibility::Protected
        } else if self.contains(Modifiers::PRIVATE) {
            Visibility::Private
        } else {
            Visibility::PackagePrivate
        }
    }

    /// Parse a single modifier keyword.
    pub fn from_keyword(word: &str) -> Option<Modifiers> {
        match word {
            "public" => Some(Modifiers::PUBLIC),
            "protected" => Some(Modifiers::PROTECTED),
            "private" => Some(Modifiers::PRIVATE),
            "static" => Some(Modifiers::STATIC),
            "final" => Some(Modifiers::FINAL),
            "abstract" => Some(Modifiers::ABSTRACT),
            _ => None,
        }
    }
}

/// Access level of a declaration.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum Visibility {
    Public,
    Protected,
    PackagePrivate,
    Private,
}

impl Visibility {
    /// Whether code in another package may see this declaration through
    /// a subclass.
    pub fn crosses_packages(self) -> bool {
        matches!(self, Visibility::Public | Visibility::Protected)
    }
}
