//! The search protocols driven by a compiled [`Regex`]. Distilled spec §4.7/§6.

use std::collections::VecDeque;

use crate::dfa::Outcome;
use crate::error::{Error, Result};
use crate::group::Group;
use crate::regex::{resolve_range, Regex};

/// Run `re` against `input[pos..pos+len]` (defaults `0`/to-end) and return the match, or a
/// not-found error.
pub fn exec<'s>(re: &Regex, input: &'s [u8], pos: Option<usize>, len: Option<usize>) -> Result<Group<'s>> {
    exec_opt(re, input, pos, len)?.ok_or_else(Error::not_found)
}

/// `exec`, as an `Option` instead of a not-found error.
pub fn exec_opt<'s>(re: &Regex, input: &'s [u8], pos: Option<usize>, len: Option<usize>) -> Result<Option<Group<'s>>> {
    let (pos, last) = resolve_range(input.len(), pos, len, "exec_opt")?;
    let result = re.run(input, pos, last, true, false);
    Ok(match result.outcome {
        Outcome::Match => Some(Group::new(input, re.group_names(), result.gpos, result.pmarks, re.nb_groups())),
        _ => None,
    })
}

/// An alias for [`exec_opt`], for callers used to a `captures`-named entry point.
pub fn captures<'s>(re: &Regex, input: &'s [u8], pos: Option<usize>, len: Option<usize>) -> Result<Option<Group<'s>>> {
    exec_opt(re, input, pos, len)
}

/// True iff `re` matches somewhere in `input[pos..pos+len]`. Does not track capture groups.
pub fn execp(re: &Regex, input: &[u8], pos: Option<usize>, len: Option<usize>) -> Result<bool> {
    let (pos, last) = resolve_range(input.len(), pos, len, "execp")?;
    let result = re.run(input, pos, last, false, false);
    Ok(matches!(result.outcome, Outcome::Match))
}

/// The coarse outcome of a partial match: whether the pattern matched fully, might still match
/// given more input, or is already a definite mismatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Partial {
    /// The pattern matched completely within the given input.
    Full,
    /// The pattern did not fail, but could still match given more input appended to the buffer.
    Partial,
    /// The pattern cannot match this input no matter what follows.
    Mismatch,
}

/// `exec_partial`, reporting the same outcomes but retaining the match (for `Full`) or a lower
/// bound on where a match could still start (for `Partial`).
#[derive(Debug)]
pub enum PartialDetailed<'s> {
    /// The completed match.
    Full(Group<'s>),
    /// No match yet; the wrapped offset is a lower bound on where a match could still start.
    Partial(usize),
    /// The pattern cannot match this input no matter what follows.
    Mismatch,
}

/// Whether `re` matches, could still match given more input, or cannot match `input[pos..pos+len]`.
pub fn exec_partial(re: &Regex, input: &[u8], pos: Option<usize>, len: Option<usize>) -> Result<Partial> {
    let (pos, last) = resolve_range(input.len(), pos, len, "exec_partial")?;
    let result = re.run(input, pos, last, false, true);
    Ok(match result.outcome {
        Outcome::Match => Partial::Full,
        Outcome::Running => Partial::Partial,
        Outcome::Failed => Partial::Mismatch,
    })
}

/// `exec_partial`, additionally returning the match on `Full` or a `no_match_starts_before` lower
/// bound on `Partial`.
pub fn exec_partial_detailed<'s>(
    re: &Regex,
    input: &'s [u8],
    pos: Option<usize>,
    len: Option<usize>,
) -> Result<PartialDetailed<'s>> {
    let (pos, last) = resolve_range(input.len(), pos, len, "exec_partial_detailed")?;
    let result = re.run(input, pos, last, true, true);
    Ok(match result.outcome {
        Outcome::Match => PartialDetailed::Full(Group::new(input, re.group_names(), result.gpos, result.pmarks, re.nb_groups())),
        Outcome::Running => {
            let no_match_starts_before = result.gpos.first().copied().filter(|&v| v >= 0).map(|v| v as usize).unwrap_or(0);
            PartialDetailed::Partial(no_match_starts_before)
        }
        Outcome::Failed => PartialDetailed::Mismatch,
    })
}

/// A lazy, pull-based sequence of non-overlapping matches, in left-to-right order. Distilled spec
/// §4.7 "all" / §9 "lazy sequences": after a non-empty match at `[p1,p2)` the next search starts
/// at `p2`; after an empty match at `p`, the next search starts at `p+1` and an empty match
/// immediately at the same position as the one just reported is suppressed.
pub struct Matches<'r, 's> {
    re: &'r Regex,
    input: &'s [u8],
    pos: usize,
    last: usize,
    last_match_end: Option<usize>,
    done: bool,
}

impl<'r, 's> Matches<'r, 's> {
    fn new(re: &'r Regex, input: &'s [u8], pos: usize, last: usize) -> Self {
        Matches {
            re,
            input,
            pos,
            last,
            last_match_end: None,
            done: false,
        }
    }
}

impl<'r, 's> Iterator for Matches<'r, 's> {
    type Item = Group<'s>;

    fn next(&mut self) -> Option<Group<'s>> {
        if self.done {
            return None;
        }
        loop {
            if self.pos > self.last {
                self.done = true;
                return None;
            }
            let result = self.re.run(self.input, self.pos, self.last, true, false);
            if !matches!(result.outcome, Outcome::Match) {
                self.done = true;
                return None;
            }
            let s = result.gpos[0].max(0) as usize;
            let e = result.gpos[1].max(0) as usize;
            if s == e && self.last_match_end == Some(s) {
                self.pos = s + 1;
                continue;
            }
            self.last_match_end = Some(e);
            self.pos = if e > s { e } else { e + 1 };
            return Some(Group::new(self.input, self.re.group_names(), result.gpos, result.pmarks, self.re.nb_groups()));
        }
    }
}

/// Every non-overlapping match of `re` in `input`, left to right.
pub fn all<'r, 's>(re: &'r Regex, input: &'s [u8]) -> Matches<'r, 's> {
    Matches::new(re, input, 0, input.len())
}

/// `all`, projected down to each match's whole substring (group 0).
pub struct Substrings<'r, 's>(Matches<'r, 's>);

impl<'r, 's> Iterator for Substrings<'r, 's> {
    type Item = &'s [u8];

    fn next(&mut self) -> Option<Self::Item> {
        self.0.next().map(|g| g.get(0).unwrap_or(b""))
    }
}

/// Every non-overlapping matched substring of `re` in `input`, left to right.
pub fn matches<'r, 's>(re: &'r Regex, input: &'s [u8]) -> Substrings<'r, 's> {
    Substrings(all(re, input))
}

/// One element of a `split_full` sequence: either literal text between matches, or the match
/// itself (so a caller can inspect its captures).
pub enum Split<'s> {
    /// A run of input between two delimiter matches (or before the first/after the last).
    Text(&'s [u8]),
    /// A delimiter match, with its captures intact.
    Delim(Group<'s>),
}

/// `split_full`: text and delimiter matches, interleaved. The leading text is omitted if the
/// first match starts at position 0; trailing text is emitted if input remains after the last
/// match. Builds on [`all`], which already suppresses an empty match immediately following the
/// one just reported.
pub struct SplitFull<'r, 's> {
    matches: Matches<'r, 's>,
    input: &'s [u8],
    cursor: usize,
    pending: VecDeque<Split<'s>>,
    exhausted: bool,
}

impl<'r, 's> SplitFull<'r, 's> {
    fn new(re: &'r Regex, input: &'s [u8]) -> Self {
        SplitFull {
            matches: all(re, input),
            input,
            cursor: 0,
            pending: VecDeque::new(),
            exhausted: false,
        }
    }
}

impl<'r, 's> Iterator for SplitFull<'r, 's> {
    type Item = Split<'s>;

    fn next(&mut self) -> Option<Split<'s>> {
        loop {
            if let Some(item) = self.pending.pop_front() {
                return Some(item);
            }
            if self.exhausted {
                return None;
            }
            match self.matches.next() {
                Some(g) => {
                    let (s, e) = g.offset(0).expect("group 0 always matches on a successful search");
                    if s > self.cursor {
                        self.pending.push_back(Split::Text(&self.input[self.cursor..s]));
                    }
                    self.cursor = e;
                    self.pending.push_back(Split::Delim(g));
                }
                None => {
                    self.exhausted = true;
                    if self.cursor < self.input.len() {
                        self.pending.push_back(Split::Text(&self.input[self.cursor..]));
                        self.cursor = self.input.len();
                    }
                }
            }
        }
    }
}

/// `split_full`, over the whole input from the start.
pub fn split_full<'r, 's>(re: &'r Regex, input: &'s [u8]) -> SplitFull<'r, 's> {
    SplitFull::new(re, input)
}

/// `split_full` with delimiters filtered out.
pub struct TextOnly<'r, 's>(SplitFull<'r, 's>);

impl<'r, 's> Iterator for TextOnly<'r, 's> {
    type Item = &'s [u8];

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            match self.0.next()? {
                Split::Text(t) => return Some(t),
                Split::Delim(_) => continue,
            }
        }
    }
}

/// `split`: every run of text between delimiter matches.
pub fn split<'r, 's>(re: &'r Regex, input: &'s [u8]) -> TextOnly<'r, 's> {
    TextOnly(SplitFull::new(re, input))
}

/// `split_full`, with an empty text inserted before a leading delimiter and after a trailing
/// delimiter, so the sequence strictly interleaves `Text, Delim, Text, Delim, ..., Text`.
/// Unlike the other search protocols this buffers eagerly: the trailing-delimiter case needs to
/// know there is no further text, which a pull iterator can't see without reading ahead anyway.
pub fn split_delim<'s>(re: &Regex, input: &'s [u8]) -> Vec<Split<'s>> {
    let mut items: Vec<Split<'s>> = split_full(re, input).collect();
    if items.is_empty() {
        return vec![Split::Text(&input[0..0])];
    }
    if matches!(items.first(), Some(Split::Delim(_))) {
        items.insert(0, Split::Text(&input[0..0]));
    }
    if matches!(items.last(), Some(Split::Delim(_))) {
        items.push(Split::Text(&input[input.len()..]));
    }
    items
}

/// Walks every match of `re` in `input`, copying literal text between matches verbatim and
/// calling `f` on each non-empty match to produce its replacement. An empty match is never
/// handed to `f`: its one covered byte is copied through unchanged instead, so a pattern that can
/// match the empty string can't replace the same position forever. If `replace_all` is false,
/// only the first match is replaced.
pub fn replace<'s, F>(re: &Regex, input: &'s [u8], mut f: F, replace_all: bool) -> Vec<u8>
where
    F: FnMut(&Group<'s>) -> Vec<u8>,
{
    let mut out = Vec::new();
    let mut cursor = 0usize;
    for g in all(re, input) {
        let (s, e) = g.offset(0).expect("group 0 always matches on a successful search");
        out.extend_from_slice(&input[cursor..s]);
        if s == e {
            if s < input.len() {
                out.push(input[s]);
            }
            cursor = s + 1;
        } else {
            out.extend_from_slice(&f(&g));
            cursor = e;
        }
        if !replace_all {
            break;
        }
    }
    out.extend_from_slice(&input[cursor.min(input.len())..]);
    out
}

/// `replace`, where every match is replaced by the fixed string `by`.
pub fn replace_string(re: &Regex, input: &[u8], by: &[u8], replace_all: bool) -> Vec<u8> {
    replace(re, input, |_| by.to_vec(), replace_all)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constructors as c;
    use crate::regex::compile;

    #[test]
    fn test_s1_literal_matches_mid_string() {
        let re = compile(c::str_(b"abc")).unwrap();
        let g = exec(&re, b"xxabcyy", None, None).unwrap();
        assert_eq!(g.offset(0).unwrap(), (2, 5));
        assert_eq!(g.get(0).unwrap(), b"abc");
    }

    #[test]
    fn test_s3_first_vs_longest() {
        let first = compile(c::alt(vec![c::str_(b"foo"), c::str_(b"foobar")])).unwrap();
        let g = exec(&first, b"foobar", None, None).unwrap();
        assert_eq!(g.offset(0).unwrap(), (0, 3));

        let longest = compile(c::longest(c::alt(vec![c::str_(b"foo"), c::str_(b"foobar")]))).unwrap();
        let g = exec(&longest, b"foobar", None, None).unwrap();
        assert_eq!(g.offset(0).unwrap(), (0, 6));
    }

    #[test]
    fn test_s4_all_and_matches() {
        let re = compile(c::rep1(c::digit())).unwrap();
        let found: Vec<Vec<u8>> = matches(&re, b"a12b345").map(|m| m.to_vec()).collect();
        assert_eq!(found, vec![b"12".to_vec(), b"345".to_vec()]);
    }

    #[test]
    fn test_s6_replace_wraps_groups() {
        let re = compile(c::group(None, c::rep1(c::digit()))).unwrap();
        let out = replace(&re, b"x12y34z", |g| [b"<", g.get(0).unwrap(), b">"].concat(), true);
        assert_eq!(out, b"x<12>y<34>z");
    }

    #[test]
    fn test_s8_eol_matches_trailing_newline_or_end() {
        let re = compile(c::seq(vec![c::str_(b"x"), c::eol()])).unwrap();
        assert_eq!(exec(&re, b"x\n", None, None).unwrap().offset(0).unwrap(), (0, 1));
        assert_eq!(exec(&re, b"x", None, None).unwrap().offset(0).unwrap(), (0, 1));
    }

    #[test]
    fn test_invariant_3_unmatched_group_reports_minus_one() {
        let re = compile(c::alt(vec![c::group(Some("a"), c::str_(b"a")), c::group(Some("b"), c::str_(b"b"))])).unwrap();
        let g = exec(&re, b"b", None, None).unwrap();
        assert!(!g.test(2));
        assert_eq!(g.all_offset()[2], (-1, -1));
    }

    #[test]
    fn test_invariant_5_complement_excludes_digits() {
        let re = compile(c::whole_string(c::compl(vec![c::digit()]))).unwrap();
        for b in b'0'..=b'9' {
            assert!(!execp(&re, &[b], None, None).unwrap());
        }
        assert!(execp(&re, b"x", None, None).unwrap());
    }

    #[test]
    fn test_split_and_split_delim() {
        let re = compile(c::rep1(c::set(crate::cset::space()))).unwrap();
        let parts: Vec<Vec<u8>> = split(&re, b"  a b\tc ").map(|t| t.to_vec()).collect();
        assert_eq!(parts, vec![b"a".to_vec(), b"b".to_vec(), b"c".to_vec()]);

        let full = split_delim(&re, b"  a b\tc ");
        let texts: Vec<Vec<u8>> = full
            .iter()
            .filter_map(|item| match item {
                Split::Text(t) => Some(t.to_vec()),
                Split::Delim(_) => None,
            })
            .collect();
        assert_eq!(texts, vec![b"".to_vec(), b"a".to_vec(), b"b".to_vec(), b"c".to_vec(), b"".to_vec()]);
    }

    #[test]
    fn test_exec_partial_detects_prefix() {
        let re = compile(c::str_(b"abcdef")).unwrap();
        assert_eq!(exec_partial(&re, b"abc", None, None).unwrap(), Partial::Partial);
        assert_eq!(exec_partial(&re, b"abcdef", None, None).unwrap(), Partial::Full);
        assert_eq!(exec_partial(&re, b"xyz", None, None).unwrap(), Partial::Mismatch);
    }

    #[test]
    fn test_resolve_range_error_names_the_api() {
        let re = compile(c::str_(b"a")).unwrap();
        let err = exec(&re, b"abc", Some(10), None).unwrap_err();
        assert!(!err.is_not_found());
    }
}
