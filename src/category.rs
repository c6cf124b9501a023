//! Category bitmask: the "side conditions" zero-width anchors test for.

use crate::cset::wordc;

/// A tiny hand-rolled `bitflags!`-shaped macro, scoped to this module's single use, so the crate
/// does not need an extra dependency for one small bitmask type.
macro_rules! bitflags_like {
    (
        $(#[$meta:meta])*
        $vis:vis struct $name:ident: $repr:ty {
            $(
                $(#[$fmeta:meta])*
                const $flag:ident = $value:expr;
            )*
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
        $vis struct $name($repr);

        impl $name {
            $(
                $(#[$fmeta])*
                pub const $flag: $name = $name($value);
            )*

            /// The empty bitmask.
            pub const fn empty() -> Self {
                $name(0)
            }

            /// True if `self` has every bit set in `other`.
            pub const fn contains(&self, other: $name) -> bool {
                self.0 & other.0 == other.0
            }

            /// True if `self` shares at least one bit with `other`.
            pub const fn intersects(&self, other: $name) -> bool {
                self.0 & other.0 != 0
            }
        }

        impl std::ops::BitOr for $name {
            type Output = $name;
            fn bitor(self, rhs: $name) -> $name {
                $name(self.0 | rhs.0)
            }
        }

        impl std::ops::BitOrAssign for $name {
            fn bitor_assign(&mut self, rhs: $name) {
                self.0 |= rhs.0;
            }
        }

        impl std::ops::BitAnd for $name {
            type Output = $name;
            fn bitand(self, rhs: $name) -> $name {
                $name(self.0 & rhs.0)
            }
        }
    };
}

bitflags_like! {
    /// A bitmask describing the boundary conditions that hold at a position in, before, or after
    /// the input. Every byte plus the virtual before-start and after-end positions maps to one of
    /// these masks.
    pub struct Category: u8 {
        /// The virtual before-start / after-end position (no byte exists there).
        const NONEXISTENT = 1 << 0;
        /// The byte is `'\n'`.
        const NEWLINE = 1 << 1;
        /// The byte is the synthetic trailing-`'\n'` color.
        const LAST_NEWLINE = 1 << 2;
        /// The byte is a word byte (`[A-Za-z0-9_]` plus Latin-1 letters).
        const LETTER = 1 << 3;
        /// The byte is not a word byte.
        const NOT_LETTER = 1 << 4;
        /// The position is a caller-supplied search boundary (`Start`/`Stop` anchors).
        const SEARCH_BOUNDARY = 1 << 5;
    }
}

/// Computes the category of a concrete input byte (not the virtual start/end positions, and not
/// the synthetic last-newline byte — see [`Category::of_lnl`]).
pub(crate) fn of_byte(b: u8) -> Category {
    let mut cat = Category::empty();
    if b == b'\n' {
        cat |= Category::NEWLINE;
    }
    if wordc().contains(b) {
        cat |= Category::LETTER;
    } else {
        cat |= Category::NOT_LETTER;
    }
    cat
}

impl Category {
    /// The category of the virtual before-start / after-end position.
    pub(crate) fn nonexistent() -> Category {
        Category::NONEXISTENT | Category::NOT_LETTER
    }

    /// The category of the synthetic last-newline byte.
    pub(crate) fn of_lnl() -> Category {
        Category::LAST_NEWLINE | Category::NEWLINE | Category::NOT_LETTER
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_of_byte_newline() {
        let cat = of_byte(b'\n');
        assert!(cat.contains(Category::NEWLINE));
        assert!(cat.contains(Category::NOT_LETTER));
    }

    #[test]
    fn test_of_byte_letter() {
        let cat = of_byte(b'a');
        assert!(cat.contains(Category::LETTER));
        assert!(!cat.intersects(Category::NOT_LETTER));
    }

    #[test]
    fn test_lnl_category() {
        let cat = Category::of_lnl();
        assert!(cat.contains(Category::LAST_NEWLINE));
        assert!(cat.contains(Category::NEWLINE));
        assert!(cat.contains(Category::NOT_LETTER));
    }

    #[test]
    fn test_nonexistent_is_not_letter() {
        assert!(Category::nonexistent().contains(Category::NOT_LETTER));
        assert!(Category::nonexistent().contains(Category::NONEXISTENT));
    }
}
