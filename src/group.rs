//! The match-result API: a [`Group`] exposes per-capture-group offsets and substrings over the
//! input a match was found in, plus whatever priority marks fired along the way. Distilled spec
//! §3 "Match result" / §6 Group API, plus the `name`/`index_of_name` lookups added by this
//! expansion's §4.9.

use std::collections::BTreeSet;
use std::rc::Rc;

use crate::error::{Error, Result};
use crate::ids::PmarkId;

/// The result of a successful search: the matched substring plus every capturing group's
/// offsets, borrowed from the original input.
///
/// Unlike the distilled spec's `gpos` (offsets biased by +1 so a shared `positions` buffer can
/// use 0 as an "unknown" sentinel), this crate gives each match its own `gpos` array, so offsets
/// are stored unbiased; -1 marks an unmatched group directly.
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[derive(Debug, Clone)]
pub struct Group<'s> {
    #[cfg_attr(feature = "serde", serde(skip))]
    text: &'s [u8],
    #[cfg_attr(feature = "serde", serde(skip))]
    group_names: Rc<Vec<(String, u32)>>,
    gpos: Vec<i64>,
    pmarks: BTreeSet<PmarkId>,
    gcount: u32,
}

impl<'s> Group<'s> {
    pub(crate) fn new(
        text: &'s [u8],
        group_names: Rc<Vec<(String, u32)>>,
        gpos: Vec<i64>,
        pmarks: BTreeSet<PmarkId>,
        gcount: u32,
    ) -> Self {
        Group {
            text,
            group_names,
            gpos,
            pmarks,
            gcount,
        }
    }

    fn offset_raw(&self, i: u32) -> Option<(usize, usize)> {
        let lo = *self.gpos.get(2 * i as usize)?;
        let hi = *self.gpos.get(2 * i as usize + 1)?;
        if lo < 0 || hi < 0 {
            None
        } else {
            Some((lo as usize, hi as usize))
        }
    }

    /// The `(start, stop)` byte offsets of group `i`, or a not-found error if it did not
    /// participate in the match.
    pub fn offset(&self, i: u32) -> Result<(usize, usize)> {
        self.offset_raw(i).ok_or_else(Error::not_found)
    }

    /// The start offset of group `i`.
    pub fn start(&self, i: u32) -> Result<usize> {
        self.offset(i).map(|(s, _)| s)
    }

    /// The stop offset of group `i`.
    pub fn stop(&self, i: u32) -> Result<usize> {
        self.offset(i).map(|(_, e)| e)
    }

    /// The substring matched by group `i`, or a not-found error if it did not participate.
    pub fn get(&self, i: u32) -> Result<&'s [u8]> {
        let (s, e) = self.offset(i)?;
        Ok(&self.text[s..e])
    }

    /// `get`, as an `Option` instead of a `Result`.
    pub fn get_opt(&self, i: u32) -> Option<&'s [u8]> {
        let (s, e) = self.offset_raw(i)?;
        Some(&self.text[s..e])
    }

    /// True iff group `i` participated in the match.
    pub fn test(&self, i: u32) -> bool {
        self.offset_raw(i).is_some()
    }

    /// Every group's substring, in index order; unmatched groups report an empty slice.
    pub fn all(&self) -> Vec<&'s [u8]> {
        (0..self.gcount).map(|i| self.get_opt(i).unwrap_or(b"")).collect()
    }

    /// Every group's offsets, in index order; unmatched groups report `(-1, -1)`.
    pub fn all_offset(&self) -> Vec<(i64, i64)> {
        (0..self.gcount)
            .map(|i| {
                self.offset_raw(i)
                    .map(|(s, e)| (s as i64, e as i64))
                    .unwrap_or((-1, -1))
            })
            .collect()
    }

    /// The number of capturing groups (including group 0, the whole match).
    pub fn nb_groups(&self) -> u32 {
        self.gcount
    }

    /// The name given to group `i`, if `group(Some(name), ...)` was used to build it.
    pub fn name(&self, i: u32) -> Option<&str> {
        self.group_names.iter().find(|(_, idx)| *idx == i).map(|(n, _)| n.as_str())
    }

    /// The index of the group named `name`, if any.
    pub fn index_of_name(&self, name: &str) -> Option<u32> {
        self.group_names.iter().find(|(n, _)| n == name).map(|(_, idx)| *idx)
    }
}

/// The priority-mark API: which user-supplied `mark(r)` tags fired during a match.
pub trait MarkSet {
    /// True iff pmark `p` fired.
    fn mark_test(&self, p: u32) -> bool;
    /// Every pmark that fired, in ascending order.
    fn mark_all(&self) -> Vec<u32>;
}

impl MarkSet for Group<'_> {
    fn mark_test(&self, p: u32) -> bool {
        self.pmarks.contains(&PmarkId::new(p))
    }

    fn mark_all(&self) -> Vec<u32> {
        self.pmarks.iter().map(|p| p.id()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn group<'s>(text: &'s [u8], gpos: Vec<i64>) -> Group<'s> {
        let gcount = gpos.len() as u32 / 2;
        Group::new(text, Rc::new(Vec::new()), gpos, BTreeSet::new(), gcount)
    }

    #[test]
    fn test_get_returns_matched_slice() {
        let g = group(b"xxabcyy", vec![2, 5]);
        assert_eq!(g.get(0).unwrap(), b"abc");
    }

    #[test]
    fn test_unmatched_group_is_not_found() {
        let g = group(b"abc", vec![0, 3, -1, -1]);
        assert!(!g.test(1));
        assert!(g.get(1).is_err());
        assert_eq!(g.all_offset()[1], (-1, -1));
    }

    #[test]
    fn test_named_group_lookup() {
        let mut g = group(b"abc", vec![0, 3]);
        g.group_names = Rc::new(vec![("whole".to_string(), 0)]);
        assert_eq!(g.name(0), Some("whole"));
        assert_eq!(g.index_of_name("whole"), Some(0));
        assert_eq!(g.index_of_name("missing"), None);
    }
}
