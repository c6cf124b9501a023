//! The color map: partitions the byte alphabet into equivalence classes the pattern cannot
//! distinguish between, so the DFA driver's inner loop can dispatch on a small color id instead
//! of a full byte.

use log::trace;

use crate::cset::Cset;
use crate::ids::ColorId;

/// A set of colors, used as the payload of a `cst` NFA node (see [`crate::automata`]).
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub(crate) struct ColorSet {
    members: Vec<bool>,
}

impl ColorSet {
    pub(crate) fn with_capacity(ncolor: usize) -> Self {
        ColorSet {
            members: vec![false; ncolor],
        }
    }

    pub(crate) fn insert(&mut self, color: ColorId) {
        let idx = color.as_usize();
        if idx >= self.members.len() {
            self.members.resize(idx + 1, false);
        }
        self.members[idx] = true;
    }

    pub(crate) fn contains(&self, color: ColorId) -> bool {
        self.members.get(color.as_usize()).copied().unwrap_or(false)
    }

    pub(crate) fn union(&self, other: &ColorSet) -> ColorSet {
        let len = self.members.len().max(other.members.len());
        let mut out = vec![false; len];
        for i in 0..self.members.len() {
            out[i] |= self.members[i];
        }
        for i in 0..other.members.len() {
            out[i] |= other.members[i];
        }
        ColorSet { members: out }
    }

    pub(crate) fn iter(&self) -> impl Iterator<Item = ColorId> + '_ {
        self.members
            .iter()
            .enumerate()
            .filter_map(|(i, &b)| b.then(|| ColorId::new(i as u16)))
    }
}

/// Builds the equivalence partition by accumulating the "split points" of every character set
/// that occurs in a pattern, then freezing into a lookup table.
#[derive(Debug, Default)]
pub(crate) struct ColorMapBuilder {
    /// Boundary points, i.e. byte offsets at which a new equivalence class starts. Always
    /// contains 0 and 256 (the latter being one-past-the-end).
    cuts: std::collections::BTreeSet<u16>,
    want_lnl: bool,
}

impl ColorMapBuilder {
    pub(crate) fn new() -> Self {
        let mut cuts = std::collections::BTreeSet::new();
        cuts.insert(0);
        cuts.insert(256);
        ColorMapBuilder {
            cuts,
            want_lnl: false,
        }
    }

    /// Refine the partition so every color class is either entirely inside `s` or entirely
    /// outside it.
    pub(crate) fn feed(&mut self, s: &Cset) {
        for (lo, hi) in s.split_points() {
            self.cuts.insert(lo as u16);
            self.cuts.insert(hi as u16 + 1);
        }
    }

    /// Request a synthetic "last newline" color, used by `End_of_line`/`Last_end_of_line`.
    pub(crate) fn request_lnl(&mut self) {
        self.want_lnl = true;
    }

    pub(crate) fn freeze(self) -> ColorMap {
        let cuts: Vec<u16> = self.cuts.into_iter().collect();
        let base_ncolor = cuts.len() - 1;

        let mut colors = [ColorId::new(0); 256];
        let mut color_repr = Vec::with_capacity(base_ncolor);
        for (class_id, window) in cuts.windows(2).enumerate() {
            let (lo, hi) = (window[0], window[1]);
            color_repr.push(lo as u8);
            for b in lo..hi {
                colors[b as usize] = ColorId::new(class_id as u16);
            }
        }

        let (ncolor, lnl) = if self.want_lnl {
            (base_ncolor + 1, Some(ColorId::new(base_ncolor as u16)))
        } else {
            (base_ncolor, None)
        };

        trace!("color map frozen: {ncolor} colors, lnl={lnl:?}");

        ColorMap {
            colors,
            color_repr,
            ncolor,
            lnl,
        }
    }
}

/// The frozen color map: a byte→color table and a color→representative-byte table.
#[derive(Debug, Clone)]
pub(crate) struct ColorMap {
    colors: [ColorId; 256],
    color_repr: Vec<u8>,
    ncolor: usize,
    lnl: Option<ColorId>,
}

impl ColorMap {
    /// The color of a concrete input byte.
    #[inline]
    pub(crate) fn color_of(&self, b: u8) -> ColorId {
        self.colors[b as usize]
    }

    /// A representative byte for a color class (used for diagnostics only).
    pub(crate) fn representative(&self, color: ColorId) -> Option<u8> {
        self.color_repr.get(color.as_usize()).copied()
    }

    /// The number of colors, including the synthetic last-newline color if requested.
    pub(crate) fn ncolor(&self) -> usize {
        self.ncolor
    }

    /// The synthetic last-newline color, if one was requested.
    pub(crate) fn lnl(&self) -> Option<ColorId> {
        self.lnl
    }

    /// The set of colors that intersect `s`.
    pub(crate) fn colors_of(&self, s: &Cset) -> ColorSet {
        let mut out = ColorSet::with_capacity(self.ncolor);
        for &(lo, hi) in s.ranges() {
            let mut b = lo;
            loop {
                out.insert(self.color_of(b));
                if b == hi {
                    break;
                }
                b += 1;
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cset::digit;

    #[test]
    fn test_single_cset_splits_into_three_classes() {
        let mut builder = ColorMapBuilder::new();
        builder.feed(&digit());
        let map = builder.freeze();
        assert_eq!(map.ncolor(), 3);
        assert_eq!(map.color_of(b'0'), map.color_of(b'9'));
        assert_ne!(map.color_of(b'0'), map.color_of(b'a'));
        assert_ne!(map.color_of(b'0'), map.color_of(0));
    }

    #[test]
    fn test_no_feeds_yields_single_class() {
        let map = ColorMapBuilder::new().freeze();
        assert_eq!(map.ncolor(), 1);
        assert_eq!(map.color_of(0), map.color_of(255));
    }

    #[test]
    fn test_lnl_reserves_extra_color() {
        let mut builder = ColorMapBuilder::new();
        builder.feed(&digit());
        builder.request_lnl();
        let map = builder.freeze();
        assert_eq!(map.ncolor(), 4);
        assert!(map.lnl().is_some());
    }

    #[test]
    fn test_colors_of_matches_individual_lookups() {
        let mut builder = ColorMapBuilder::new();
        builder.feed(&digit());
        let map = builder.freeze();
        let cs = map.colors_of(&digit());
        assert!(cs.contains(map.color_of(b'5')));
        assert!(!cs.contains(map.color_of(b'a')));
    }
}
