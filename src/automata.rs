//! The NFA expression arena: a DAG of typed nodes with marks, allocated by index and interned
//! by id. This is the `Automata` component of the compilation pipeline: [`crate::translate`]
//! lowers the combinator AST into this arena once, then [`crate::dfa`] repeatedly takes
//! Brzozowski-style derivatives of arena nodes on demand while scanning.

use crate::category::Category;
use crate::color_map::ColorSet;
use crate::ids::{MarkId, NfaId, NfaIdBase, PmarkId};

/// Governs how ambiguous alternation/sequencing is resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) enum Kind {
    First,
    Shortest,
    Longest,
}

impl Default for Kind {
    fn default() -> Self {
        Kind::First
    }
}

/// Governs repetition's preference for consuming more input vs. stopping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) enum Greediness {
    Greedy,
    NonGreedy,
}

/// A node of the NFA expression DAG. See the module doc and distilled spec §3/§4.4.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub(crate) enum Node {
    Cst(ColorSet),
    Eps,
    Alt(Kind, Vec<NfaId>),
    Seq(Kind, NfaId, NfaId),
    Rep(Greediness, Kind, NfaId),
    Mark(MarkId),
    Erase(MarkId, MarkId),
    Pmark(PmarkId),
    After(Category),
    Before(Category),
    /// A transparent indirection to `inner`; translation uses this only where a cheap
    /// indirection suffices, preferring an eager fresh-mark copy (see [`crate::translate`])
    /// wherever repetition unrolling actually needs disjoint mark slots.
    Rename(NfaId),
}

/// The NFA node arena. Node id 0 is always the canonical "fail" (never matches) node, id 1 is
/// always the canonical "eps" (matches empty string) node.
#[derive(Debug, Clone)]
pub(crate) struct Automata {
    nodes: Vec<Node>,
}

impl Automata {
    pub(crate) fn new() -> Self {
        let mut a = Automata { nodes: Vec::new() };
        let fail = a.push(Node::Alt(Kind::First, Vec::new()));
        let eps = a.push(Node::Eps);
        debug_assert_eq!(fail.as_usize(), 0);
        debug_assert_eq!(eps.as_usize(), 1);
        a
    }

    fn push(&mut self, node: Node) -> NfaId {
        let id = NfaId::new(self.nodes.len() as NfaIdBase);
        self.nodes.push(node);
        id
    }

    /// Allocate a fresh node, unconditionally.
    pub(crate) fn alloc(&mut self, node: Node) -> NfaId {
        self.push(node)
    }

    pub(crate) fn fail(&self) -> NfaId {
        NfaId::new(0)
    }

    pub(crate) fn eps(&self) -> NfaId {
        NfaId::new(1)
    }

    pub(crate) fn node(&self, id: NfaId) -> &Node {
        &self.nodes[id.as_usize()]
    }

    pub(crate) fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Every node in the arena, paired with its id. Used by the `dot_writer`-gated graph dump.
    pub(crate) fn iter(&self) -> impl Iterator<Item = (NfaId, &Node)> {
        self.nodes.iter().enumerate().map(|(i, n)| (NfaId::new(i as NfaIdBase), n))
    }

    /// Build a `seq(kind, x, y)`, collapsing the canonical fail/eps cases.
    pub(crate) fn seq(&mut self, kind: Kind, x: NfaId, y: NfaId) -> NfaId {
        if x == self.fail() || y == self.fail() {
            self.fail()
        } else if x == self.eps() {
            y
        } else if y == self.eps() {
            x
        } else {
            self.alloc(Node::Seq(kind, x, y))
        }
    }

    /// Build an `alt(kind, list)`, flattening nested alternatives (under the outer `kind`),
    /// dropping dead branches, and deduplicating while preserving priority order.
    pub(crate) fn alt(&mut self, kind: Kind, ids: Vec<NfaId>) -> NfaId {
        let mut flat = Vec::with_capacity(ids.len());
        for id in ids {
            if id == self.fail() {
                continue;
            }
            if let Node::Alt(_, inner) = self.node(id) {
                flat.extend(inner.iter().copied());
            } else {
                flat.push(id);
            }
        }
        let mut seen = rustc_hash::FxHashSet::default();
        flat.retain(|id| seen.insert(*id));
        match flat.len() {
            0 => self.fail(),
            1 => flat[0],
            _ => self.alloc(Node::Alt(kind, flat)),
        }
    }
}

/// The side effects of a node matching the empty string at the current position: which marks,
/// erases and pmarks are crossed to reach that conclusion. Returned by [`nullable`] rather than
/// applied eagerly, so a caller exploring several alternatives only commits the winning one.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct NullEffects {
    pub(crate) marks: Vec<MarkId>,
    pub(crate) erases: Vec<(MarkId, MarkId)>,
    pub(crate) pmarks: Vec<PmarkId>,
}

impl NullEffects {
    fn merge(mut self, other: NullEffects) -> NullEffects {
        self.marks.extend(other.marks);
        self.erases.extend(other.erases);
        self.pmarks.extend(other.pmarks);
        self
    }
}

/// True (with the crossed marks) iff `id` can match the empty string here, under boundary
/// category `cat` (the category of the byte about to be read, used to resolve `before` nodes).
/// Ties among simultaneously-nullable `alt` branches are resolved by priority order (first
/// listed wins); see `DESIGN.md` for why this also stands in for the `Longest`/`Shortest` kinds.
pub(crate) fn nullable(a: &Automata, id: NfaId, cat: Category) -> Option<NullEffects> {
    match a.node(id) {
        Node::Cst(_) => None,
        Node::Eps => Some(NullEffects::default()),
        Node::Alt(_, list) => list.iter().find_map(|&child| nullable(a, child, cat)),
        Node::Seq(_, x, y) => {
            let ex = nullable(a, *x, cat)?;
            let ey = nullable(a, *y, cat)?;
            Some(ex.merge(ey))
        }
        Node::Rep(..) => Some(NullEffects::default()),
        Node::Mark(id) => Some(NullEffects {
            marks: vec![*id],
            ..Default::default()
        }),
        Node::Erase(lo, hi) => Some(NullEffects {
            erases: vec![(*lo, *hi)],
            ..Default::default()
        }),
        Node::Pmark(id) => Some(NullEffects {
            pmarks: vec![*id],
            ..Default::default()
        }),
        Node::After(mask) => cat.intersects(*mask).then(NullEffects::default),
        Node::Before(mask) => cat.intersects(*mask).then(NullEffects::default),
        Node::Rename(inner) => nullable(a, *inner, cat),
    }
}

/// The overall status of a position in the scan: whether the remaining automaton can still
/// consume input, has definitely failed, or matches here (with the marks crossed to reach the
/// match).
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Status {
    Running,
    Failed,
    Match(NullEffects),
}

/// Classify `id`'s status under boundary category `cat`. `Failed` means `id` is structurally
/// dead (the canonical fail node); `Match` means nullable; otherwise `Running`.
pub(crate) fn status(a: &Automata, id: NfaId, cat: Category) -> Status {
    if id == a.fail() {
        return Status::Failed;
    }
    match nullable(a, id, cat) {
        Some(eff) => Status::Match(eff),
        None => Status::Running,
    }
}

/// Whether a scan that has just found `id` nullable should commit to that match now rather than
/// keep exploring for a longer one. Two independent constructs force an immediate commit:
///
/// - an `alt` resolved via `Kind::First`/`Kind::Shortest` — a higher-priority (or, for
///   `Shortest`, any) branch has already won, so a lower-priority branch completing later must
///   not override it;
/// - a `NonGreedy` repetition, or a `Rep` tagged `Kind::Shortest` (the unanchored-search prefix
///   uses this to stop consuming as soon as the real pattern can start matching).
///
/// `Kind::Longest` and `Greedy` repetition are the "keep going" defaults: nothing here forces a
/// stop, so the scan loop rides along until the residual dies or input runs out, remembering the
/// latest point it was nullable. See `DESIGN.md` for why this only inspects the branch `nullable`
/// itself resolved to, rather than every still-live branch.
pub(crate) fn stops_here(a: &Automata, id: NfaId, cat: Category) -> bool {
    match a.node(id) {
        Node::Alt(kind, list) => list
            .iter()
            .any(|&child| nullable(a, child, cat).is_some())
            .then_some(!matches!(kind, Kind::Longest))
            .unwrap_or(false),
        Node::Seq(_, x, y) => stops_here(a, *x, cat) || stops_here(a, *y, cat),
        Node::Rep(g, k, _) => matches!(g, Greediness::NonGreedy) || matches!(k, Kind::Shortest),
        Node::Rename(inner) => stops_here(a, *inner, cat),
        _ => false,
    }
}

/// The Brzozowski derivative of `id` with respect to one byte of color `color`, under boundary
/// category `cat` (the category of that byte). `After` nodes freshly exposed by this derivative
/// are resolved against `cat` as part of the recursive walk of `seq`/`alt`, since `cat` also
/// describes "the byte now behind us" for whatever is next in program order.
///
/// Whenever a `seq`'s left operand is crossed because it is nullable, the crossed marks are
/// appended to `commits` in traversal order — the caller applies them (with the current input
/// position) to the in-progress match state. See `DESIGN.md` for why eager, per-step commit
/// (rather than only committing once the winning alternative is known) is an accepted
/// simplification here.
pub(crate) fn derivative(
    a: &mut Automata,
    id: NfaId,
    color: crate::ids::ColorId,
    cat: Category,
    commits: &mut Vec<NullEffects>,
) -> NfaId {
    match a.node(id).clone() {
        Node::Cst(cs) => {
            if cs.contains(color) {
                a.eps()
            } else {
                a.fail()
            }
        }
        Node::Eps => a.fail(),
        Node::Alt(kind, list) => {
            let derived: Vec<NfaId> = list.iter().map(|&c| derivative(a, c, color, cat, commits)).collect();
            a.alt(kind, derived)
        }
        Node::Seq(k, x, y) => {
            let dx = derivative(a, x, color, cat, commits);
            let seq_xy = a.seq(k, dx, y);
            if let Some(eff) = nullable(a, x, cat) {
                commits.push(eff);
                let dy = derivative(a, y, color, cat, commits);
                // `x`'s own disposition (an alt priority that already committed, a non-greedy
                // repeat, or the unanchored-search prefix) decides whether this merge should let
                // `seq_xy`'s continuation still compete with `dy`'s completion.
                let merge_kind = if stops_here(a, x, cat) { Kind::First } else { Kind::Longest };
                a.alt(merge_kind, vec![seq_xy, dy])
            } else {
                seq_xy
            }
        }
        Node::Rep(g, k, x) => {
            // Whether this repetition prefers to keep consuming over handing off to whatever
            // follows it is resolved by the enclosing `Seq`'s merge (above), via `stops_here`;
            // the residual itself always offers both options.
            let dx = derivative(a, x, color, cat, commits);
            let rep = a.alloc(Node::Rep(g, k, x));
            a.seq(k, dx, rep)
        }
        Node::Mark(_) | Node::Erase(..) | Node::Pmark(_) | Node::After(_) | Node::Before(_) => a.fail(),
        Node::Rename(inner) => derivative(a, inner, color, cat, commits),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cset::Cset;

    fn color_set_for(a: &mut Automata, cs: Cset) -> NfaId {
        let _ = a; // placeholder hook if future tests need the arena
        let mut colors = ColorSet::with_capacity(1);
        if !cs.is_empty() {
            colors.insert(crate::ids::ColorId::new(0));
        }
        a.alloc(Node::Cst(colors))
    }

    #[test]
    fn test_fail_and_eps_are_reserved_ids() {
        let a = Automata::new();
        assert_eq!(a.fail().as_usize(), 0);
        assert_eq!(a.eps().as_usize(), 1);
    }

    #[test]
    fn test_seq_with_fail_collapses_to_fail() {
        let mut a = Automata::new();
        let fail = a.fail();
        let eps = a.eps();
        assert_eq!(a.seq(Kind::First, fail, eps), fail);
    }

    #[test]
    fn test_alt_dedups_and_drops_fail_branches() {
        let mut a = Automata::new();
        let eps = a.eps();
        let fail = a.fail();
        let id = a.alt(Kind::First, vec![fail, eps, eps]);
        assert_eq!(id, eps);
    }

    #[test]
    fn test_nullable_eps_is_true_with_no_effects() {
        let a = Automata::new();
        let eff = nullable(&a, a.eps(), Category::empty()).unwrap();
        assert!(eff.marks.is_empty());
    }

    #[test]
    fn test_nullable_cst_is_false() {
        let mut a = Automata::new();
        let cst = color_set_for(&mut a, Cset::single(b'a'));
        assert!(nullable(&a, cst, Category::empty()).is_none());
    }

    #[test]
    fn test_derivative_of_matching_cst_is_eps() {
        let mut a = Automata::new();
        let mut cs = ColorSet::with_capacity(1);
        cs.insert(crate::ids::ColorId::new(0));
        let cst = a.alloc(Node::Cst(cs));
        let mut commits = Vec::new();
        let d = derivative(&mut a, cst, crate::ids::ColorId::new(0), Category::empty(), &mut commits);
        assert_eq!(d, a.eps());
    }

    #[test]
    fn test_mark_node_is_nullable_and_records_its_id() {
        let mut a = Automata::new();
        let m = a.alloc(Node::Mark(MarkId::new(3)));
        let eff = nullable(&a, m, Category::empty()).unwrap();
        assert_eq!(eff.marks, vec![MarkId::new(3)]);
    }

    #[test]
    fn test_before_node_respects_category() {
        let mut a = Automata::new();
        let before = a.alloc(Node::Before(Category::NEWLINE));
        assert!(nullable(&a, before, Category::NEWLINE).is_some());
        assert!(nullable(&a, before, Category::LETTER).is_none());
    }
}
