#![forbid(missing_docs)]
//! # `rxe`
//! The `rxe` crate is a byte-oriented regular expression engine built around three layers: a
//! combinator AST for describing patterns, a color-mapped NFA with marks for tracking capture
//! groups, and a lazy DFA driver that only builds the transition table it actually visits.
//!
//! Patterns are built with the free functions in [`constructors`] (`seq`, `alt`, `rep`, `group`,
//! the Latin-1 character classes, ...) rather than parsed from a textual syntax, then handed to
//! [`compile`] or a [`RegexBuilder`] to produce a [`Regex`]. The functions in [`search`] run a
//! compiled pattern against a byte slice: single matches (`exec`, `exec_opt`, `execp`), partial
//! matches against input that may still grow (`exec_partial`, `exec_partial_detailed`), and the
//! lazy multi-match protocols (`all`, `matches`, `split`, `split_full`, `split_delim`, `replace`).
//!
//! Matching is purely byte-oriented: there is no Unicode-aware mode, and the built-in character
//! classes (`alpha`, `digit`, `space`, ...) classify the Latin-1 range.

/// Module with the color/position category bitmask used to resolve boundary assertions.
mod category;

/// Module with the byte-alphabet color map: the partition of bytes into equivalence classes that
/// the NFA and DFA actually branch on.
mod color_map;

/// Module with the combinator AST and its normalization passes.
mod ast;

/// Module with the NFA expression arena and its Brzozowski-derivative operations.
mod automata;

/// Module that provides the public combinator constructors for building a `Pattern`.
mod constructors;
pub use constructors::*;

/// Module with the optional graphviz dump of a compiled pattern's NFA arena.
#[cfg(feature = "dot_writer")]
mod dot;

/// Module with error definitions.
mod error;
pub use error::{Error, ErrorKind, Result};

/// Module that provides the match-result `Group` type and the priority-mark `MarkSet` trait.
mod group;
pub use group::{Group, MarkSet};

/// Module with the small newtype ids (`NfaId`, `ColorId`, `MarkId`, `PmarkId`) used throughout
/// the compilation pipeline.
mod ids;

/// Module with the compiled pattern value, its builder, and the `compile` entry point.
mod regex;
pub use regex::{compile, Pattern, Regex, RegexBuilder, RegexOptions};

/// Module with the search protocols driven by a compiled `Regex`.
mod search;
pub use search::{
    all, captures, exec, exec_opt, exec_partial, exec_partial_detailed, execp, matches, replace, replace_string, split,
    split_delim, split_full, Matches, Partial, PartialDetailed, Split, SplitFull, Substrings, TextOnly,
};

/// Module with the translation from the combinator AST to the NFA expression arena.
mod translate;

/// Module with the lazy DFA driver.
mod dfa;

/// Module with character sets: sorted, disjoint, non-adjacent byte ranges, and the Latin-1
/// built-in classes the constructors build on.
mod cset;
pub use cset::Cset;
