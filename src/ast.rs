//! The combinator AST: the tree built by the public constructors in [`crate::constructors`],
//! plus the normalization pass (case folding, charset folding, alternative merging) that runs
//! before translation to the NFA arena.

use crate::automata::{Greediness, Kind};
use crate::color_map::ColorMapBuilder;
use crate::cset::{self, Cset};
use crate::error::{Error, Result};

/// A combinator-built regular expression. Not parsed from text; built by calling the
/// constructors in [`crate::constructors`].
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Regexp {
    Set(Cset),
    Sequence(Vec<Regexp>),
    Alternative(Vec<Regexp>),
    Repeat(Box<Regexp>, u32, Option<u32>),
    BegOfLine,
    EndOfLine,
    BegOfWord,
    EndOfWord,
    NotBoundary,
    BegOfStr,
    EndOfStr,
    LastEndOfLine,
    Start,
    Stop,
    Sem(Kind, Box<Regexp>),
    SemGreedy(Greediness, Box<Regexp>),
    Group(Option<String>, Box<Regexp>),
    NoGroup(Box<Regexp>),
    Nest(Box<Regexp>),
    Pmark(u32, Box<Regexp>),
    Case(Box<Regexp>),
    NoCase(Box<Regexp>),
    /// Only valid between charset sub-expressions; folded away by [`normalize`].
    Intersection(Vec<Regexp>),
    Complement(Vec<Regexp>),
    Difference(Box<Regexp>, Box<Regexp>),
}

impl Regexp {
    pub(crate) fn empty() -> Regexp {
        Regexp::Alternative(Vec::new())
    }

    pub(crate) fn epsilon() -> Regexp {
        Regexp::Sequence(Vec::new())
    }
}

/// As a pure charset, if this node folds to one; used by [`normalize`] to resolve
/// `Intersection`/`Complement`/`Difference`/charset-only `Alternative`.
fn as_charset(r: &Regexp) -> Option<Cset> {
    match r {
        Regexp::Set(s) => Some(s.clone()),
        Regexp::Alternative(l) => {
            let mut acc = Cset::empty();
            for item in l {
                acc = acc.union(&as_charset(item)?);
            }
            Some(acc)
        }
        _ => None,
    }
}

/// Walk the AST bottom-up, folding case decorators into charsets, collapsing charset algebra,
/// and merging alternatives with a common prefix. Distilled spec §4.2/§4.4 "Alternative l".
pub(crate) fn normalize(r: Regexp) -> Result<Regexp> {
    normalize_with_case(r, false)
}

fn normalize_with_case(r: Regexp, ign_case: bool) -> Result<Regexp> {
    match r {
        Regexp::Set(s) => {
            let s = if ign_case { cset::case_insens(&s) } else { s };
            Ok(Regexp::Set(s))
        }
        Regexp::Case(inner) => normalize_with_case(*inner, false),
        Regexp::NoCase(inner) => normalize_with_case(*inner, true),
        Regexp::Sequence(items) => {
            let items = items
                .into_iter()
                .map(|i| normalize_with_case(i, ign_case))
                .collect::<Result<Vec<_>>>()?;
            Ok(Regexp::Sequence(items))
        }
        Regexp::Alternative(items) => {
            let items = items
                .into_iter()
                .map(|i| normalize_with_case(i, ign_case))
                .collect::<Result<Vec<_>>>()?;
            if !items.is_empty() && items.iter().all(|i| as_charset(i).is_some()) {
                let mut acc = Cset::empty();
                for i in &items {
                    acc = acc.union(&as_charset(i).unwrap());
                }
                Ok(Regexp::Set(acc))
            } else {
                Ok(Regexp::Alternative(merge_sequences(items)))
            }
        }
        Regexp::Repeat(inner, i, j) => {
            let inner = normalize_with_case(*inner, ign_case)?;
            Ok(Regexp::Repeat(Box::new(inner), i, j))
        }
        Regexp::Sem(k, inner) => {
            let inner = normalize_with_case(*inner, ign_case)?;
            Ok(Regexp::Sem(k, Box::new(inner)))
        }
        Regexp::SemGreedy(g, inner) => {
            let inner = normalize_with_case(*inner, ign_case)?;
            Ok(Regexp::SemGreedy(g, Box::new(inner)))
        }
        Regexp::Group(name, inner) => {
            let inner = normalize_with_case(*inner, ign_case)?;
            Ok(Regexp::Group(name, Box::new(inner)))
        }
        Regexp::NoGroup(inner) => {
            let inner = normalize_with_case(*inner, ign_case)?;
            Ok(Regexp::NoGroup(Box::new(inner)))
        }
        Regexp::Nest(inner) => {
            let inner = normalize_with_case(*inner, ign_case)?;
            Ok(Regexp::Nest(Box::new(inner)))
        }
        Regexp::Pmark(id, inner) => {
            let inner = normalize_with_case(*inner, ign_case)?;
            Ok(Regexp::Pmark(id, Box::new(inner)))
        }
        Regexp::Intersection(items) => {
            let items = items
                .into_iter()
                .map(|i| normalize_with_case(i, ign_case))
                .collect::<Result<Vec<_>>>()?;
            let mut acc = Cset::any();
            for i in &items {
                let cs = as_charset(i).ok_or_else(|| {
                    Error::invalid_construction("inter", "operand is not a character set")
                })?;
                acc = acc.inter(&cs);
            }
            Ok(Regexp::Set(acc))
        }
        Regexp::Complement(items) => {
            let items = items
                .into_iter()
                .map(|i| normalize_with_case(i, ign_case))
                .collect::<Result<Vec<_>>>()?;
            let mut acc = Cset::empty();
            for i in &items {
                let cs = as_charset(i).ok_or_else(|| {
                    Error::invalid_construction("compl", "operand is not a character set")
                })?;
                acc = acc.union(&cs);
            }
            Ok(Regexp::Set(Cset::any().diff(&acc)))
        }
        Regexp::Difference(a, b) => {
            let a = normalize_with_case(*a, ign_case)?;
            let b = normalize_with_case(*b, ign_case)?;
            let ca = as_charset(&a)
                .ok_or_else(|| Error::invalid_construction("diff", "left operand is not a character set"))?;
            let cb = as_charset(&b)
                .ok_or_else(|| Error::invalid_construction("diff", "right operand is not a character set"))?;
            Ok(Regexp::Set(ca.diff(&cb)))
        }
        leaf @ (Regexp::BegOfLine
        | Regexp::EndOfLine
        | Regexp::BegOfWord
        | Regexp::EndOfWord
        | Regexp::NotBoundary
        | Regexp::BegOfStr
        | Regexp::EndOfStr
        | Regexp::LastEndOfLine
        | Regexp::Start
        | Regexp::Stop) => Ok(leaf),
    }
}

/// Factor a common prefix out of adjacent alternatives: `Sequence(x::y1)` and `Sequence(x::y2)`
/// with equal `x` become `Sequence[x; Alternative[Sequence(y1); Sequence(y2)]]`. Applied once,
/// at the top level of the list. Distilled spec §4.4.
fn merge_sequences(items: Vec<Regexp>) -> Vec<Regexp> {
    let mut out: Vec<Regexp> = Vec::new();
    for item in items {
        match (out.last_mut(), &item) {
            (Some(Regexp::Sequence(prev)), Regexp::Sequence(cur))
                if !prev.is_empty() && !cur.is_empty() && prev[0] == cur[0] =>
            {
                let head = prev[0].clone();
                let prev_tail = prev[1..].to_vec();
                let cur_tail = cur[1..].to_vec();
                *out.last_mut().unwrap() = Regexp::Sequence(vec![
                    head,
                    Regexp::Alternative(vec![
                        Regexp::Sequence(prev_tail),
                        Regexp::Sequence(cur_tail),
                    ]),
                ]);
            }
            _ => out.push(item),
        }
    }
    if out.len() == 1 {
        out
    } else {
        out
    }
}

/// True iff every search-start path through `r` must match at the search position. Distilled
/// spec §4.6.
pub(crate) fn anchored(r: &Regexp) -> bool {
    match r {
        Regexp::BegOfStr | Regexp::Start => true,
        Regexp::Sequence(items) => items.iter().any(anchored),
        Regexp::Alternative(items) => !items.is_empty() && items.iter().all(anchored),
        Regexp::Repeat(inner, i, _) => *i > 0 && anchored(inner),
        Regexp::Sem(_, inner)
        | Regexp::SemGreedy(_, inner)
        | Regexp::Group(_, inner)
        | Regexp::NoGroup(inner)
        | Regexp::Nest(inner)
        | Regexp::Pmark(_, inner)
        | Regexp::Case(inner)
        | Regexp::NoCase(inner) => anchored(inner),
        _ => false,
    }
}

/// Feed every character set occurring in `r` to `builder`, plus the fixed splits anchor nodes
/// induce (distilled spec §4.3): `bol`/`eol` split `{'\n'}`, word anchors split `wordc`,
/// `Last_end_of_line` requests the synthetic `lnl` color.
pub(crate) fn collect_colors(r: &Regexp, builder: &mut ColorMapBuilder) {
    match r {
        Regexp::Set(s) => builder.feed(s),
        Regexp::Sequence(items) | Regexp::Alternative(items) | Regexp::Intersection(items) | Regexp::Complement(items) => {
            for item in items {
                collect_colors(item, builder);
            }
        }
        Regexp::Repeat(inner, ..) => collect_colors(inner, builder),
        Regexp::BegOfLine | Regexp::EndOfLine => builder.feed(&Cset::single(b'\n')),
        Regexp::BegOfWord | Regexp::EndOfWord | Regexp::NotBoundary => builder.feed(&cset::wordc()),
        Regexp::LastEndOfLine => {
            builder.feed(&Cset::single(b'\n'));
            builder.request_lnl();
        }
        Regexp::BegOfStr | Regexp::EndOfStr | Regexp::Start | Regexp::Stop => {}
        Regexp::Sem(_, inner)
        | Regexp::SemGreedy(_, inner)
        | Regexp::Group(_, inner)
        | Regexp::NoGroup(inner)
        | Regexp::Nest(inner)
        | Regexp::Pmark(_, inner)
        | Regexp::Case(inner)
        | Regexp::NoCase(inner) => collect_colors(inner, builder),
        Regexp::Difference(a, b) => {
            collect_colors(a, builder);
            collect_colors(b, builder);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_case_folds_into_charset() {
        let r = Regexp::NoCase(Box::new(Regexp::Set(Cset::single(b'a'))));
        let normalized = normalize(r).unwrap();
        match normalized {
            Regexp::Set(s) => {
                assert!(s.contains(b'a'));
                assert!(s.contains(b'A'));
            }
            other => panic!("expected Set, got {other:?}"),
        }
    }

    #[test]
    fn test_charset_only_alternative_collapses_to_set() {
        let r = Regexp::Alternative(vec![
            Regexp::Set(Cset::single(b'a')),
            Regexp::Set(Cset::single(b'b')),
        ]);
        let normalized = normalize(r).unwrap();
        match normalized {
            Regexp::Set(s) => {
                assert!(s.contains(b'a'));
                assert!(s.contains(b'b'));
            }
            other => panic!("expected Set, got {other:?}"),
        }
    }

    #[test]
    fn test_difference_on_non_charset_is_rejected() {
        let r = Regexp::Difference(
            Box::new(Regexp::Sequence(vec![])),
            Box::new(Regexp::Set(Cset::single(b'a'))),
        );
        assert!(normalize(r).is_err());
    }

    #[test]
    fn test_anchored_beg_of_str() {
        assert!(anchored(&Regexp::BegOfStr));
        assert!(!anchored(&Regexp::EndOfStr));
    }

    #[test]
    fn test_anchored_sequence_any_element() {
        let r = Regexp::Sequence(vec![Regexp::Set(Cset::single(b'a')), Regexp::BegOfStr]);
        assert!(anchored(&r));
    }

    #[test]
    fn test_anchored_alternative_requires_all() {
        let r = Regexp::Alternative(vec![Regexp::BegOfStr, Regexp::Set(Cset::single(b'a'))]);
        assert!(!anchored(&r));
    }

    #[test]
    fn test_merge_sequences_factors_common_prefix() {
        let a = Regexp::Set(Cset::single(b'a'));
        let items = vec![
            Regexp::Sequence(vec![a.clone(), Regexp::Set(Cset::single(b'b'))]),
            Regexp::Sequence(vec![a, Regexp::Set(Cset::single(b'c'))]),
        ];
        let merged = merge_sequences(items);
        assert_eq!(merged.len(), 1);
    }
}
