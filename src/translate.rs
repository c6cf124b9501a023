//! Lowers a normalized combinator AST into the NFA expression arena, allocating capture-mark
//! ids along the way. Distilled spec §4.4.

use crate::ast::Regexp;
use crate::automata::{Automata, Greediness, Kind, Node};
use crate::category::Category;
use crate::color_map::ColorMap;
use crate::cset::Cset;
use crate::ids::{IdGen, MarkId, PmarkId};

/// Carries everything [`translate`] threads through the recursion: id allocators, the inherited
/// semantic defaults, the accumulated group names, and a charset→colorset memo.
pub(crate) struct Translator<'a> {
    marks: IdGen<MarkId>,
    kind: Kind,
    greedy: Greediness,
    ign_group: bool,
    names: Vec<(String, u32)>,
    colors: &'a ColorMap,
    cset_cache: rustc_hash::FxHashMap<Cset, crate::color_map::ColorSet>,
}

/// The outcome of lowering a whole pattern: the NFA root plus the bookkeeping needed to build a
/// [`crate::regex::Regex`] and its [`crate::group::Group`] results.
pub(crate) struct Translated {
    pub(crate) root: crate::ids::NfaId,
    pub(crate) mark_count: u32,
    pub(crate) group_names: Vec<(String, u32)>,
}

pub(crate) fn translate(automata: &mut Automata, colors: &ColorMap, r: &Regexp) -> Translated {
    let mut t = Translator {
        marks: IdGen::new(),
        kind: Kind::First,
        greedy: Greediness::Greedy,
        ign_group: false,
        names: Vec::new(),
        colors,
        cset_cache: rustc_hash::FxHashMap::default(),
    };
    let root = t.go(automata, r);
    Translated {
        root,
        mark_count: t.marks.count(),
        group_names: t.names,
    }
}

impl<'a> Translator<'a> {
    fn colorset_of(&mut self, s: &Cset) -> crate::color_map::ColorSet {
        if let Some(cs) = self.cset_cache.get(s) {
            return cs.clone();
        }
        let cs = self.colors.colors_of(s);
        self.cset_cache.insert(s.clone(), cs.clone());
        cs
    }

    fn go(&mut self, a: &mut Automata, r: &Regexp) -> crate::ids::NfaId {
        match r {
            Regexp::Set(s) => {
                let cs = self.colorset_of(s);
                a.alloc(Node::Cst(cs))
            }
            Regexp::Sequence(items) => {
                let mut acc = a.eps();
                for item in items.iter().rev() {
                    let t = self.go(a, item);
                    acc = a.seq(self.kind, t, acc);
                }
                acc
            }
            Regexp::Alternative(items) => {
                let ids = items.iter().map(|i| self.go(a, i)).collect::<Vec<_>>();
                a.alt(self.kind, ids)
            }
            Regexp::Repeat(inner, i, j) => self.translate_repeat(a, inner, *i, *j),
            Regexp::BegOfLine => a.alloc(Node::After(Category::NONEXISTENT | Category::NEWLINE)),
            Regexp::EndOfLine => a.alloc(Node::Before(Category::NONEXISTENT | Category::NEWLINE)),
            Regexp::BegOfWord => {
                let after = a.alloc(Node::After(Category::NONEXISTENT | Category::NOT_LETTER));
                let before = a.alloc(Node::Before(Category::LETTER));
                a.seq(Kind::First, after, before)
            }
            Regexp::EndOfWord => {
                let after = a.alloc(Node::After(Category::LETTER));
                let before = a.alloc(Node::Before(Category::NONEXISTENT | Category::NOT_LETTER));
                a.seq(Kind::First, after, before)
            }
            Regexp::NotBoundary => {
                let after1 = a.alloc(Node::After(Category::LETTER));
                let before1 = a.alloc(Node::Before(Category::LETTER));
                let branch1 = a.seq(Kind::First, after1, before1);
                let ne_nl = Category::NONEXISTENT | Category::NOT_LETTER;
                let after2 = a.alloc(Node::After(ne_nl));
                let before2 = a.alloc(Node::Before(ne_nl));
                let branch2 = a.seq(Kind::First, after2, before2);
                a.alt(Kind::First, vec![branch1, branch2])
            }
            Regexp::BegOfStr => a.alloc(Node::After(Category::NONEXISTENT)),
            Regexp::EndOfStr => a.alloc(Node::Before(Category::NONEXISTENT)),
            Regexp::LastEndOfLine => a.alloc(Node::Before(Category::NONEXISTENT | Category::LAST_NEWLINE)),
            Regexp::Start => a.alloc(Node::After(Category::SEARCH_BOUNDARY)),
            Regexp::Stop => a.alloc(Node::Before(Category::SEARCH_BOUNDARY)),
            Regexp::Sem(k, inner) => {
                let saved = self.kind;
                self.kind = *k;
                let inner_id = self.go(a, inner);
                self.kind = saved;
                let eps = a.eps();
                a.seq(*k, inner_id, eps)
            }
            Regexp::SemGreedy(g, inner) => {
                let saved = self.greedy;
                self.greedy = *g;
                let id = self.go(a, inner);
                self.greedy = saved;
                id
            }
            Regexp::Group(name, inner) => {
                if self.ign_group {
                    return self.go(a, inner);
                }
                let p = self.marks.alloc();
                let q = self.marks.alloc();
                if let Some(name) = name {
                    self.names.push((name.clone(), p.id() / 2));
                }
                let inner_id = self.go(a, inner);
                let mark_p = a.alloc(Node::Mark(p));
                let mark_q = a.alloc(Node::Mark(q));
                let tail = a.seq(Kind::First, inner_id, mark_q);
                a.seq(Kind::First, mark_p, tail)
            }
            Regexp::NoGroup(inner) => {
                let saved = self.ign_group;
                self.ign_group = true;
                let id = self.go(a, inner);
                self.ign_group = saved;
                id
            }
            Regexp::Nest(inner) => {
                let b = self.marks.count();
                let inner_id = self.go(a, inner);
                let e = self.marks.count();
                if e > b {
                    let erase = a.alloc(Node::Erase(MarkId::new(b), MarkId::new(e - 1)));
                    a.seq(Kind::First, erase, inner_id)
                } else {
                    inner_id
                }
            }
            Regexp::Pmark(id, inner) => {
                let inner_id = self.go(a, inner);
                let pmark = a.alloc(Node::Pmark(PmarkId::new(*id)));
                a.seq(Kind::First, pmark, inner_id)
            }
            Regexp::Case(_) | Regexp::NoCase(_) | Regexp::Intersection(_) | Regexp::Complement(_) | Regexp::Difference(..) => {
                unreachable!("normalize removes this node before translation")
            }
        }
    }

    /// `Repeat(r, i, j)`: `i` mandatory copies of `r`, followed by `j - i` optional copies (or
    /// unbounded repetition if `j` is `None`), each optional copy getting fresh mark ids via
    /// [`Translator::rename_fresh`] so separate iterations don't alias capture slots.
    fn translate_repeat(&mut self, a: &mut Automata, inner: &Regexp, i: u32, j: Option<u32>) -> crate::ids::NfaId {
        let cr = self.go(a, inner);
        let kind = self.kind;
        let greedy = self.greedy;

        let mut rem = match j {
            None => a.alloc(Node::Rep(greedy, kind, cr)),
            Some(j) => {
                let mut rem = a.eps();
                for _ in 0..j.saturating_sub(i) {
                    let copy = self.rename_fresh(a, cr);
                    let step = a.seq(kind, copy, rem);
                    let eps = a.eps();
                    // Mirrors `stops_here`'s reading of an unbounded `Rep`'s own greediness: a
                    // greedy bound lets a later, longer completion of `step` keep competing with
                    // stopping now; a non-greedy bound commits to stopping as soon as it can.
                    rem = match greedy {
                        Greediness::Greedy => a.alt(Kind::Longest, vec![step, eps]),
                        Greediness::NonGreedy => a.alt(Kind::First, vec![eps, step]),
                    };
                }
                rem
            }
        };

        for _ in 0..i {
            let copy = self.rename_fresh(a, cr);
            rem = a.seq(kind, copy, rem);
        }
        rem
    }

    /// A structural copy of the subtree rooted at `id`, with fresh ids for every `Mark`/`Pmark`
    /// node so a repeated copy doesn't alias the original's capture slots.
    fn rename_fresh(&mut self, a: &mut Automata, id: crate::ids::NfaId) -> crate::ids::NfaId {
        if id == a.fail() || id == a.eps() {
            return id;
        }
        let node = a.node(id).clone();
        match node {
            Node::Cst(_) | Node::After(_) | Node::Before(_) | Node::Eps => id,
            Node::Alt(kind, list) => {
                let copies = list.iter().map(|&c| self.rename_fresh(a, c)).collect::<Vec<_>>();
                a.alt(kind, copies)
            }
            Node::Seq(k, x, y) if matches!(a.node(x), Node::Erase(..)) => {
                // `Erase` only ever appears as the left operand of a `Seq` built by `Nest`; its
                // range must be recomputed from the marks the copy of `y` actually allocates,
                // not copied verbatim.
                let b = self.marks.count();
                let cy = self.rename_fresh(a, y);
                let e = self.marks.count();
                let cx = if e > b {
                    a.alloc(Node::Erase(MarkId::new(b), MarkId::new(e - 1)))
                } else {
                    a.eps()
                };
                a.seq(k, cx, cy)
            }
            Node::Seq(k, x, y) => {
                let cx = self.rename_fresh(a, x);
                let cy = self.rename_fresh(a, y);
                a.seq(k, cx, cy)
            }
            Node::Rep(g, k, x) => {
                let cx = self.rename_fresh(a, x);
                a.alloc(Node::Rep(g, k, cx))
            }
            Node::Mark(_) => a.alloc(Node::Mark(self.marks.alloc())),
            Node::Erase(..) => unreachable!("Erase only appears as the left operand of a Seq built by Nest"),
            // Pmark ids are user-supplied tags, not per-iteration capture slots; every copy of a
            // repeated `mark(r)` keeps reporting the same tag when it fires.
            Node::Pmark(id) => a.alloc(Node::Pmark(id)),
            Node::Rename(inner) => self.rename_fresh(a, inner),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast;
    use crate::color_map::ColorMapBuilder;

    fn compile_ast(r: Regexp) -> (Automata, Translated) {
        let normalized = ast::normalize(r).unwrap();
        let mut builder = ColorMapBuilder::new();
        ast::collect_colors(&normalized, &mut builder);
        let colors = builder.freeze();
        let mut automata = Automata::new();
        let translated = translate(&mut automata, &colors, &normalized);
        (automata, translated)
    }

    #[test]
    fn test_group_allocates_two_marks() {
        let (_a, t) = compile_ast(Regexp::Group(None, Box::new(Regexp::Set(Cset::single(b'a')))));
        assert_eq!(t.mark_count, 2);
    }

    #[test]
    fn test_named_group_records_name() {
        let (_a, t) = compile_ast(Regexp::Group(
            Some("x".to_string()),
            Box::new(Regexp::Set(Cset::single(b'a'))),
        ));
        assert_eq!(t.group_names, vec![("x".to_string(), 0)]);
    }

    #[test]
    fn test_no_group_allocates_no_marks() {
        let (_a, t) = compile_ast(Regexp::NoGroup(Box::new(Regexp::Group(
            Some("x".to_string()),
            Box::new(Regexp::Set(Cset::single(b'a'))),
        ))));
        assert_eq!(t.mark_count, 0);
        assert!(t.group_names.is_empty());
    }

    #[test]
    fn test_bounded_repeat_produces_running_root() {
        let (a, t) = compile_ast(Regexp::Repeat(Box::new(Regexp::Set(Cset::single(b'a'))), 1, Some(3)));
        assert_ne!(t.root, a.fail());
    }
}
