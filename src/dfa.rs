//! The lazy DFA driver: caches concrete byte-indexed transition tables over the NFA expression
//! arena, built lazily as the scan visits new states. Distilled spec §4.5.
//!
//! A DFA state is identified by a single NFA node id (the "residual" expression after some
//! number of derivative steps) rather than a set of NFA node ids: [`crate::automata`]'s `alt`
//! already folds every live alternative into one node, so there is no separate thread-list to
//! track. This is why interning keys on [`crate::ids::NfaId`] alone.

use rustc_hash::FxHashMap;
use std::collections::BTreeSet;

use crate::automata::{self, Automata, NullEffects, Status};
use crate::category::{self, Category};
use crate::color_map::ColorMap;
use crate::ids::{ColorId, NfaId, PmarkId};

/// Sentinel stored in a transition slot that has never been computed.
const UNKNOWN: i32 = -2;
/// Sentinel recorded on a state's own `idx` field when it is structurally dead (the residual is
/// the canonical `fail` node); the scan loop checks this instead of indexing into a dead state's
/// (empty) transition row. A `Match` state is NOT dead: a nullable residual can still have live
/// transitions (a greedy `a*`'s initial state is nullable at zero reps and must still be able to
/// consume further `a`s), so it gets a real transition row like any `Running` state.
const DEAD: i32 = -3;

/// One cached DFA state: the NFA node it was built from, its match/fail/running status (computed
/// once, at creation time, from the category of the transition that created it), and its
/// lazily-filled transition row.
#[derive(Debug)]
struct DfaState {
    /// This state's own index in `DfaTable::states`, or [`DEAD`] if the residual is `fail`.
    idx: i32,
    desc: NfaId,
    status: Status,
    /// Whether the scan loop should commit to this state's `Match` rather than keep exploring
    /// for a longer one; see [`automata::stops_here`]. Meaningless when `status` isn't `Match`.
    force_stop: bool,
    /// `UNKNOWN` until first taken, then the target state's index. Empty (never indexed) for
    /// dead states.
    transitions: Vec<i32>,
    /// Parallel to `transitions`: the mark/erase/pmark effects crossed while taking each
    /// transition, cached alongside the target so a cache hit doesn't need to recompute the
    /// derivative just to recover them.
    commits: Vec<Vec<NullEffects>>,
}

/// The lazy DFA table for one compiled pattern: every state built so far, interned by the NFA
/// node it wraps.
pub(crate) struct DfaTable {
    states: Vec<DfaState>,
    interner: FxHashMap<NfaId, usize>,
    ncolor: usize,
}

impl DfaTable {
    pub(crate) fn new(ncolor: usize) -> Self {
        DfaTable {
            states: Vec::new(),
            interner: FxHashMap::default(),
            ncolor,
        }
    }

    /// Intern the state for NFA node `desc`, computing `status`/`force_stop` if this is the first
    /// time `desc` is seen. Returns the state's index.
    fn mk_state(&mut self, desc: NfaId, status: Status, force_stop: bool) -> usize {
        if let Some(&idx) = self.interner.get(&desc) {
            return idx;
        }
        let idx = self.states.len();
        let is_dead = matches!(status, Status::Failed);
        let (transitions, commits) = if is_dead {
            (Vec::new(), Vec::new())
        } else {
            (vec![UNKNOWN; self.ncolor], vec![Vec::new(); self.ncolor])
        };
        self.states.push(DfaState {
            idx: if is_dead { DEAD } else { idx as i32 },
            desc,
            status,
            force_stop,
            transitions,
            commits,
        });
        self.interner.insert(desc, idx);
        idx
    }

    /// The initial state for boundary category `cat` (the category "before" the first byte of
    /// the search).
    pub(crate) fn initial_state(&mut self, automata: &Automata, root: NfaId, cat: Category) -> usize {
        let status = automata::status(automata, root, cat);
        let force_stop = automata::stops_here(automata, root, cat);
        self.mk_state(root, status, force_stop)
    }

    pub(crate) fn is_dead(&self, idx: usize) -> bool {
        self.states[idx].idx == DEAD
    }

    pub(crate) fn status(&self, idx: usize) -> &Status {
        &self.states[idx].status
    }

    pub(crate) fn force_stop(&self, idx: usize) -> bool {
        self.states[idx].force_stop
    }

    pub(crate) fn desc(&self, idx: usize) -> NfaId {
        self.states[idx].desc
    }

    /// Take (or recompute and cache) the transition out of `idx` on `color`, returning the
    /// target state's index and the mark effects crossed while taking it.
    fn transition(&mut self, automata: &mut Automata, colors: &ColorMap, idx: usize, color: ColorId) -> (usize, Vec<NullEffects>) {
        let slot = self.states[idx].transitions[color.as_usize()];
        if slot != UNKNOWN {
            return (slot as usize, self.states[idx].commits[color.as_usize()].clone());
        }
        let desc = self.states[idx].desc;
        let cat = category_of_color(colors, color);
        let mut commits = Vec::new();
        let new_desc = automata::derivative(automata, desc, color, cat, &mut commits);
        let new_status = automata::status(automata, new_desc, cat);
        let new_force_stop = automata::stops_here(automata, new_desc, cat);
        let new_idx = self.mk_state(new_desc, new_status, new_force_stop);
        self.states[idx].transitions[color.as_usize()] = new_idx as i32;
        self.states[idx].commits[color.as_usize()] = commits.clone();
        (new_idx, commits)
    }
}

/// The boundary category a color represents, for resolving `Before`/`After` nodes freshly
/// exposed by a derivative step. Each color class is, by construction of
/// [`crate::color_map::ColorMapBuilder`], entirely inside or outside every charset fed to it, so
/// any one member byte's category stands in for the whole class — except for the synthetic
/// last-newline color, which has no real member byte at all.
pub(crate) fn category_of_color(colors: &ColorMap, color: ColorId) -> Category {
    if colors.lnl() == Some(color) {
        return Category::of_lnl();
    }
    match colors.representative(color) {
        Some(b) => category::of_byte(b),
        None => Category::empty(),
    }
}

/// The boundary category of the byte at `pos` in `input` (or the virtual after-end category if
/// `pos` is past the end).
fn category_at(input: &[u8], pos: usize) -> Category {
    match input.get(pos) {
        Some(&b) => category::of_byte(b),
        None => Category::nonexistent(),
    }
}

/// Applies the marks/erases/pmarks crossed by one transition at input position `pos` to the
/// in-progress capture state.
fn apply_commits(commits: &[NullEffects], pos: usize, gpos: &mut [i64], pmarks: &mut BTreeSet<PmarkId>) {
    for eff in commits {
        for &m in &eff.marks {
            gpos[m.as_usize()] = pos as i64;
        }
        for &(lo, hi) in &eff.erases {
            for i in lo.as_usize()..=hi.as_usize() {
                if i < gpos.len() {
                    gpos[i] = -1;
                }
            }
        }
        for &p in &eff.pmarks {
            pmarks.insert(p);
        }
    }
}

/// The terminal outcome of a scan: either it ran off the end of `last` without resolving
/// (`Running`, only meaningful to partial-match callers), or it hit a cached break state, or the
/// scan loop's own final boundary check resolved it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Outcome {
    Running,
    Failed,
    Match,
}

/// The result of scanning `input[pos..last]` against the DFA starting at `start_idx`.
pub(crate) struct ScanResult {
    pub(crate) outcome: Outcome,
    pub(crate) end_pos: usize,
    pub(crate) gpos: Vec<i64>,
    pub(crate) pmarks: BTreeSet<PmarkId>,
}

/// Run the scan loop from `start_idx` over `input[pos..last]`.
///
/// `last` is the caller-supplied search boundary (often `input.len()`, but can be short of it for
/// `exec_partial`-style callers). If the color map reserved a synthetic last-newline color and
/// the byte immediately before `last` is `'\n'`, that byte is walked last under the synthetic
/// color instead of its ordinary one, per distilled spec §4.5's newline-at-end handling.
///
/// A nullable residual does not stop the scan by itself: it's recorded as the best match found so
/// far, and the walk keeps going — through a greedy repetition's own continuation, or a `longest`
/// alternative still running — until [`automata::stops_here`] says the current match should be
/// committed to, the residual dies, or input runs out. When the walk runs off the end of `last`
/// without either of the first two, a final zero-width check is made under the boundary category
/// at `last` (covering e.g. a `$` that only resolves there); this is skipped, and
/// `Outcome::Running` reported instead of falling back to the best match found so far, when
/// `allow_running` is set (used by the partial-match search protocols, where more input could
/// still change the outcome).
#[allow(clippy::too_many_arguments)]
pub(crate) fn scan(
    automata: &mut Automata,
    colors: &ColorMap,
    dfa: &mut DfaTable,
    mark_count: u32,
    start_idx: usize,
    input: &[u8],
    pos: usize,
    last: usize,
    track_groups: bool,
    allow_running: bool,
) -> ScanResult {
    let mut gpos = vec![-1i64; mark_count as usize];
    let mut pmarks = BTreeSet::new();
    let mut state = start_idx;
    let mut p = pos;

    let newline_at_end = colors.lnl().is_some() && last > pos && input.get(last - 1) == Some(&b'\n');
    let walk_last = if newline_at_end { last - 1 } else { last };

    let mut last_match: Option<(usize, Vec<i64>, BTreeSet<PmarkId>)> = None;
    let mut ran_off_the_end = false;

    loop {
        match dfa.status(state).clone() {
            Status::Match(eff) => {
                let mut g = gpos.clone();
                let mut pm = pmarks.clone();
                if track_groups {
                    apply_commits(std::slice::from_ref(&eff), p, &mut g, &mut pm);
                }
                last_match = Some((p, g, pm));
                if dfa.force_stop(state) {
                    break;
                }
            }
            Status::Failed => break,
            Status::Running => {}
        }

        let color = if p < walk_last {
            colors.color_of(input[p])
        } else if newline_at_end && p == walk_last {
            colors.lnl().unwrap()
        } else {
            ran_off_the_end = true;
            break;
        };
        let (next, commits) = dfa.transition(automata, colors, state, color);
        if track_groups {
            apply_commits(&commits, p, &mut gpos, &mut pmarks);
        }
        state = next;
        p += 1;
    }

    if ran_off_the_end && !allow_running {
        let final_cat = Category::SEARCH_BOUNDARY | category_at(input, last);
        if let Some(eff) = automata::nullable(automata, dfa.desc(state), final_cat) {
            if track_groups {
                apply_commits(std::slice::from_ref(&eff), p, &mut gpos, &mut pmarks);
            }
            return ScanResult {
                outcome: Outcome::Match,
                end_pos: p,
                gpos,
                pmarks,
            };
        }
    }

    if ran_off_the_end && allow_running {
        return ScanResult {
            outcome: Outcome::Running,
            end_pos: p,
            gpos,
            pmarks,
        };
    }

    match last_match {
        Some((end_pos, gpos, pmarks)) => ScanResult {
            outcome: Outcome::Match,
            end_pos,
            gpos,
            pmarks,
        },
        None => ScanResult {
            outcome: Outcome::Failed,
            end_pos: p,
            gpos,
            pmarks,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{self, Regexp};
    use crate::color_map::ColorMapBuilder;
    use crate::cset::Cset;
    use crate::translate;

    fn compile(r: Regexp) -> (Automata, ColorMap, crate::translate::Translated) {
        let normalized = ast::normalize(r).unwrap();
        let mut builder = ColorMapBuilder::new();
        ast::collect_colors(&normalized, &mut builder);
        let colors = builder.freeze();
        let mut automata = Automata::new();
        let translated = translate::translate(&mut automata, &colors, &normalized);
        (automata, colors, translated)
    }

    #[test]
    fn test_single_byte_literal_matches() {
        let (mut a, colors, t) = compile(Regexp::Set(Cset::single(b'a')));
        let mut dfa = DfaTable::new(colors.ncolor());
        let start = dfa.initial_state(&a, t.root, Category::nonexistent());
        let result = scan(&mut a, &colors, &mut dfa, t.mark_count, start, b"a", 0, 1, false, false);
        assert_eq!(result.outcome, Outcome::Match);
        assert_eq!(result.end_pos, 1);
    }

    #[test]
    fn test_single_byte_literal_rejects_mismatch() {
        let (mut a, colors, t) = compile(Regexp::Set(Cset::single(b'a')));
        let mut dfa = DfaTable::new(colors.ncolor());
        let start = dfa.initial_state(&a, t.root, Category::nonexistent());
        let result = scan(&mut a, &colors, &mut dfa, t.mark_count, start, b"b", 0, 1, false, false);
        assert_eq!(result.outcome, Outcome::Failed);
    }

    #[test]
    fn test_group_records_capture_bounds() {
        let (mut a, colors, t) = compile(Regexp::Group(None, Box::new(Regexp::Set(Cset::single(b'a')))));
        let mut dfa = DfaTable::new(colors.ncolor());
        let start = dfa.initial_state(&a, t.root, Category::nonexistent());
        let result = scan(&mut a, &colors, &mut dfa, t.mark_count, start, b"a", 0, 1, true, false);
        assert_eq!(result.outcome, Outcome::Match);
        assert_eq!(result.gpos[0], 0);
        assert_eq!(result.gpos[1], 1);
    }

    #[test]
    fn test_running_is_reported_when_allowed() {
        let (mut a, colors, t) = compile(Regexp::Sequence(vec![
            Regexp::Set(Cset::single(b'a')),
            Regexp::Set(Cset::single(b'b')),
        ]));
        let mut dfa = DfaTable::new(colors.ncolor());
        let start = dfa.initial_state(&a, t.root, Category::nonexistent());
        let result = scan(&mut a, &colors, &mut dfa, t.mark_count, start, b"a", 0, 1, false, true);
        assert_eq!(result.outcome, Outcome::Running);
    }

    #[test]
    fn test_repeated_transitions_hit_the_cache() {
        let (mut a, colors, t) = compile(Regexp::Repeat(Box::new(Regexp::Set(Cset::single(b'a'))), 0, None));
        let mut dfa = DfaTable::new(colors.ncolor());
        let start = dfa.initial_state(&a, t.root, Category::nonexistent());
        let before = dfa.states.len();
        let _ = scan(&mut a, &colors, &mut dfa, t.mark_count, start, b"aaaa", 0, 4, false, false);
        let after = dfa.states.len();
        let _ = scan(&mut a, &colors, &mut dfa, t.mark_count, start, b"aaaa", 0, 4, false, false);
        assert_eq!(after, dfa.states.len(), "second scan should only hit cached states");
    }
}
