//! Public combinator constructors for building a [`Pattern`] to hand to [`crate::regex::compile`].
//! Distilled spec §4.8.

use std::sync::atomic::{AtomicU32, Ordering};

use crate::ast::Regexp;
use crate::automata::{Greediness, Kind};
use crate::cset::{self, Cset};
use crate::error::{Error, Result};
use crate::regex::Pattern;

fn pat(r: Regexp) -> Pattern {
    Pattern(r)
}

/// A pattern matching the single charset `cs`.
pub fn set(cs: Cset) -> Pattern {
    pat(Regexp::Set(cs))
}

/// A pattern matching the single byte `c`.
pub fn char_(c: u8) -> Pattern {
    set(Cset::single(c))
}

/// A pattern matching the literal byte string `s`.
pub fn str_(s: &[u8]) -> Pattern {
    pat(Regexp::Sequence(s.iter().map(|&b| Regexp::Set(Cset::single(b))).collect()))
}

/// Alternation; a singleton list is inlined rather than wrapped.
pub fn alt(items: Vec<Pattern>) -> Pattern {
    let mut items: Vec<Regexp> = items.into_iter().map(|p| p.0).collect();
    if items.len() == 1 {
        return pat(items.pop().unwrap());
    }
    pat(Regexp::Alternative(items))
}

/// Sequencing; a singleton list is inlined rather than wrapped.
pub fn seq(items: Vec<Pattern>) -> Pattern {
    let mut items: Vec<Regexp> = items.into_iter().map(|p| p.0).collect();
    if items.len() == 1 {
        return pat(items.pop().unwrap());
    }
    pat(Regexp::Sequence(items))
}

/// The pattern matching no string at all.
pub fn empty() -> Pattern {
    pat(Regexp::empty())
}

/// The pattern matching only the empty string.
pub fn epsilon() -> Pattern {
    pat(Regexp::epsilon())
}

/// `i` to `j` (or unbounded, if `j` is `None`) repetitions of `r`. Rejects `j < i`.
pub fn repn(r: Pattern, i: u32, j: Option<u32>) -> Result<Pattern> {
    if let Some(v) = j {
        if v < i {
            return Err(Error::invalid_construction(
                "repn",
                format!("upper bound {v} is less than lower bound {i}"),
            ));
        }
    }
    if i == 0 && j == Some(0) {
        return Ok(epsilon());
    }
    if i == 1 && j == Some(1) {
        return Ok(r);
    }
    Ok(pat(Regexp::Repeat(Box::new(r.0), i, j)))
}

/// Zero or more repetitions of `r`.
pub fn rep(r: Pattern) -> Pattern {
    repn(r, 0, None).expect("repn(_, 0, None) never fails its own validation")
}

/// One or more repetitions of `r`.
pub fn rep1(r: Pattern) -> Pattern {
    repn(r, 1, None).expect("repn(_, 1, None) never fails its own validation")
}

/// `r`, optionally.
pub fn opt(r: Pattern) -> Pattern {
    repn(r, 0, Some(1)).expect("repn(_, 0, Some(1)) never fails its own validation")
}

/// Beginning of a line: immediately after start-of-input or a `'\n'`.
pub fn bol() -> Pattern {
    pat(Regexp::BegOfLine)
}

/// End of a line: immediately before end-of-input or a `'\n'`.
pub fn eol() -> Pattern {
    pat(Regexp::EndOfLine)
}

/// Beginning of a word.
pub fn bow() -> Pattern {
    pat(Regexp::BegOfWord)
}

/// End of a word.
pub fn eow() -> Pattern {
    pat(Regexp::EndOfWord)
}

/// `r` bracketed by word boundaries.
pub fn word(r: Pattern) -> Pattern {
    seq(vec![bow(), r, eow()])
}

/// Not at a word boundary.
pub fn not_boundary() -> Pattern {
    pat(Regexp::NotBoundary)
}

/// Beginning of the whole input.
pub fn bos() -> Pattern {
    pat(Regexp::BegOfStr)
}

/// End of the whole input.
pub fn eos() -> Pattern {
    pat(Regexp::EndOfStr)
}

/// `r` anchored to the whole input.
pub fn whole_string(r: Pattern) -> Pattern {
    seq(vec![bos(), r, eos()])
}

/// End of line, treating a trailing `'\n'` (if present) as part of end-of-input rather than a
/// mid-string newline.
pub fn leol() -> Pattern {
    pat(Regexp::LastEndOfLine)
}

/// The caller-supplied search start boundary (distinct from beginning-of-input for a search that
/// starts mid-buffer).
pub fn start() -> Pattern {
    pat(Regexp::Start)
}

/// The caller-supplied search stop boundary.
pub fn stop() -> Pattern {
    pat(Regexp::Stop)
}

/// Prefer the first alternative that matches (the default).
pub fn first(r: Pattern) -> Pattern {
    pat(Regexp::Sem(Kind::First, Box::new(r.0)))
}

/// Prefer the longest match among alternatives.
pub fn longest(r: Pattern) -> Pattern {
    pat(Regexp::Sem(Kind::Longest, Box::new(r.0)))
}

/// Prefer the shortest match among alternatives.
pub fn shortest(r: Pattern) -> Pattern {
    pat(Regexp::Sem(Kind::Shortest, Box::new(r.0)))
}

/// Prefer consuming more input in repetitions of `r` (the default).
pub fn greedy(r: Pattern) -> Pattern {
    pat(Regexp::SemGreedy(Greediness::Greedy, Box::new(r.0)))
}

/// Prefer consuming less input in repetitions of `r`.
pub fn non_greedy(r: Pattern) -> Pattern {
    pat(Regexp::SemGreedy(Greediness::NonGreedy, Box::new(r.0)))
}

/// A capturing group around `r`, optionally named.
pub fn group(name: Option<&str>, r: Pattern) -> Pattern {
    pat(Regexp::Group(name.map(str::to_string), Box::new(r.0)))
}

/// `r`, with any capturing groups inside it suppressed (no marks allocated, names dropped).
pub fn no_group(r: Pattern) -> Pattern {
    pat(Regexp::NoGroup(Box::new(r.0)))
}

/// `r`, with marks allocated inside it erased again on exit (used so repeated groups inside a
/// repetition only ever report their last iteration).
pub fn nest(r: Pattern) -> Pattern {
    pat(Regexp::Nest(Box::new(r.0)))
}

/// `r`, case-sensitive (the default; overrides an enclosing `no_case`).
pub fn case(r: Pattern) -> Pattern {
    pat(Regexp::Case(Box::new(r.0)))
}

/// `r`, case-insensitive.
pub fn no_case(r: Pattern) -> Pattern {
    pat(Regexp::NoCase(Box::new(r.0)))
}

static NEXT_PMARK: AtomicU32 = AtomicU32::new(0);

/// Allocate a fresh priority-mark id and decorate `r` with it; `Group::mark_test`/`mark_all`
/// report which marks fired once a match completes.
pub fn mark(r: Pattern) -> (u32, Pattern) {
    let id = NEXT_PMARK.fetch_add(1, Ordering::Relaxed);
    (id, pat(Regexp::Pmark(id, Box::new(r.0))))
}

/// The intersection of charset sub-expressions (rejected at compile time if any operand is not a
/// pure charset).
pub fn inter(items: Vec<Pattern>) -> Pattern {
    pat(Regexp::Intersection(items.into_iter().map(|p| p.0).collect()))
}

/// The complement (within `any()`) of the union of charset sub-expressions.
pub fn compl(items: Vec<Pattern>) -> Pattern {
    pat(Regexp::Complement(items.into_iter().map(|p| p.0).collect()))
}

/// `a` minus `b`, both charset sub-expressions.
pub fn diff(a: Pattern, b: Pattern) -> Pattern {
    pat(Regexp::Difference(Box::new(a.0), Box::new(b.0)))
}

/// Every byte.
pub fn any() -> Pattern {
    set(Cset::any())
}

/// Every byte but `'\n'`.
pub fn notnl() -> Pattern {
    set(cset::notnl())
}

/// Latin-1 lowercase letters.
pub fn lower() -> Pattern {
    set(cset::lower())
}

/// Latin-1 uppercase letters.
pub fn upper() -> Pattern {
    set(cset::upper())
}

/// Latin-1 letters.
pub fn alpha() -> Pattern {
    set(cset::alpha())
}

/// ASCII digits.
pub fn digit() -> Pattern {
    set(cset::digit())
}

/// Latin-1 letters and digits.
pub fn alnum() -> Pattern {
    set(cset::alnum())
}

/// "Word" bytes: `alnum` plus `'_'`.
pub fn wordc() -> Pattern {
    set(cset::wordc())
}

/// 7-bit ASCII.
pub fn ascii() -> Pattern {
    set(cset::ascii())
}

/// Tab and space.
pub fn blank() -> Pattern {
    set(cset::blank())
}

/// Control bytes.
pub fn cntrl() -> Pattern {
    set(cset::cntrl())
}

/// Visible, non-space bytes.
pub fn graph() -> Pattern {
    set(cset::graph())
}

/// Printable bytes, including space.
pub fn print() -> Pattern {
    set(cset::print())
}

/// ASCII punctuation.
pub fn punct() -> Pattern {
    set(cset::punct())
}

/// Whitespace bytes.
pub fn space() -> Pattern {
    set(cset::space())
}

/// Hex digits.
pub fn xdigit() -> Pattern {
    set(cset::xdigit())
}
