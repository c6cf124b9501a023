//! The compiled pattern value and its builder. Distilled spec §3 "Compiled regex (`re`)" / §4.6
//! compile wrapper / §6 "Compilation".

use std::cell::RefCell;
use std::rc::Rc;

use log::debug;
use rustc_hash::FxHashMap;

use crate::ast::{self, Regexp};
use crate::automata::{Automata, Kind};
use crate::category::{self, Category};
use crate::color_map::{ColorMap, ColorMapBuilder};
use crate::cset::Cset;
use crate::dfa::{self, DfaTable, ScanResult};
use crate::error::{Error, Result};
use crate::ids::NfaId;
use crate::translate;

/// A combinator-built pattern, ready for [`compile`]/[`RegexBuilder::build`]. Opaque outside the
/// crate; produced by the constructors in [`crate::constructors`].
pub struct Pattern(pub(crate) Regexp);

/// Compile-time defaults applied to a pattern before translation: case-insensitivity and the
/// default semantic [`Kind`] (overridable per-subexpression by `first`/`longest`/`shortest`
/// wrappers, but applied crate-wide here when a caller wants one setting for a whole pattern).
/// Mirrors the teacher's per-scanner-mode settings object.
#[derive(Debug, Clone, Copy)]
pub struct RegexOptions {
    case_insensitive: bool,
    kind: Kind,
}

impl Default for RegexOptions {
    fn default() -> Self {
        RegexOptions {
            case_insensitive: false,
            kind: Kind::First,
        }
    }
}

/// Builds a [`Regex`] from a [`Pattern`], grouping `compile` with the crate-wide
/// [`RegexOptions`]. Mirrors the teacher's `ScannerBuilder`.
#[derive(Debug, Clone, Default)]
pub struct RegexBuilder {
    options: RegexOptions,
}

impl RegexBuilder {
    /// Create a new builder with default options.
    pub fn new() -> Self {
        RegexBuilder::default()
    }

    /// Wrap the whole pattern in `no_case` before compiling.
    pub fn case_insensitive(mut self, yes: bool) -> Self {
        self.options.case_insensitive = yes;
        self
    }

    /// Wrap the whole pattern in the given semantic `Kind` before compiling.
    pub fn longest(mut self, yes: bool) -> Self {
        if yes {
            self.options.kind = Kind::Longest;
        }
        self
    }

    /// Compile `pattern` under the accumulated options.
    pub fn build(self, pattern: Pattern) -> Result<Regex> {
        let mut r = pattern.0;
        if self.options.case_insensitive {
            r = Regexp::NoCase(Box::new(r));
        }
        if !matches!(self.options.kind, Kind::First) {
            r = Regexp::Sem(self.options.kind, Box::new(r));
        }
        compile_regexp(r)
    }
}

/// Compile `pattern` with default options. Distilled spec §4.6.
pub fn compile(pattern: Pattern) -> Result<Regex> {
    RegexBuilder::new().build(pattern)
}

fn compile_regexp(r: Regexp) -> Result<Regex> {
    let normalized = ast::normalize(r)?;
    let is_anchored = ast::anchored(&normalized);
    let wrapped = if is_anchored {
        Regexp::Group(None, Box::new(normalized))
    } else {
        let prefix = Regexp::Sem(Kind::Shortest, Box::new(Regexp::Repeat(Box::new(Regexp::Set(Cset::any())), 0, None)));
        Regexp::Sequence(vec![prefix, Regexp::Group(None, Box::new(normalized))])
    };

    let mut builder = ColorMapBuilder::new();
    ast::collect_colors(&wrapped, &mut builder);
    let colors = builder.freeze();

    let mut automata = Automata::new();
    let translated = translate::translate(&mut automata, &colors, &wrapped);

    debug!(
        "compiled pattern: {} nfa nodes, {} colors, {} marks, anchored={}",
        automata.len(),
        colors.ncolor(),
        translated.mark_count,
        is_anchored
    );

    Ok(Regex {
        automata: RefCell::new(automata),
        colors,
        dfa: RefCell::new(DfaTable::new(0)),
        root: translated.root,
        mark_count: translated.mark_count,
        group_names: Rc::new(translated.group_names),
        gcount: translated.mark_count / 2,
        initial_states: RefCell::new(FxHashMap::default()),
        anchored: is_anchored,
    })
}

/// A compiled pattern. Read-only from the outside; internally, matching lazily populates the DFA
/// transition cache and the per-start-category initial-state memo. See distilled spec §5: a
/// `Regex` is not safe to drive concurrently from multiple threads.
pub struct Regex {
    automata: RefCell<Automata>,
    colors: ColorMap,
    dfa: RefCell<DfaTable>,
    root: NfaId,
    mark_count: u32,
    group_names: Rc<Vec<(String, u32)>>,
    gcount: u32,
    initial_states: RefCell<FxHashMap<Category, usize>>,
    anchored: bool,
}

impl Regex {
    /// The number of capturing groups, including group 0 (the whole match).
    pub fn nb_groups(&self) -> u32 {
        self.gcount
    }

    /// True iff every match of this pattern must start at the search position (distilled spec
    /// §4.6's `anchored` predicate, computed once at compile time).
    pub fn is_anchored(&self) -> bool {
        self.anchored
    }

    pub(crate) fn group_names(&self) -> Rc<Vec<(String, u32)>> {
        Rc::clone(&self.group_names)
    }

    /// Dump the NFA expression arena backing this pattern as graphviz dot, for debugging.
    #[cfg(feature = "dot_writer")]
    pub fn write_dot<W: std::io::Write>(&self, output: &mut W) {
        crate::dot::render(&self.automata.borrow(), self.root, output);
    }

    fn start_category(input: &[u8], pos: usize) -> Category {
        let before = if pos == 0 {
            Category::nonexistent()
        } else {
            category::of_byte(input[pos - 1])
        };
        Category::SEARCH_BOUNDARY | before
    }

    fn initial_state(&self, cat: Category) -> usize {
        if let Some(&idx) = self.initial_states.borrow().get(&cat) {
            return idx;
        }
        let idx = {
            let automata = self.automata.borrow();
            let mut dfa = self.dfa.borrow_mut();
            dfa.initial_state(&automata, self.root, cat)
        };
        self.initial_states.borrow_mut().insert(cat, idx);
        idx
    }

    /// Run the DFA driver over `input[pos..last]`, starting fresh from the initial state implied
    /// by `pos`. `track_groups=false` skips mark bookkeeping for callers (`execp`, `matches`)
    /// that only need a boolean/substring outcome. `allow_running=true` reports
    /// [`dfa::Outcome::Running`] instead of collapsing an unresolved end-of-input to `Failed`,
    /// for the partial-match protocols.
    pub(crate) fn run(&self, input: &[u8], pos: usize, last: usize, track_groups: bool, allow_running: bool) -> ScanResult {
        let cat = Self::start_category(input, pos);
        let start = self.initial_state(cat);
        let mut automata = self.automata.borrow_mut();
        let mut dfa = self.dfa.borrow_mut();
        dfa::scan(
            &mut automata,
            &self.colors,
            &mut dfa,
            self.mark_count,
            start,
            input,
            pos,
            last,
            track_groups,
            allow_running,
        )
    }
}

/// Resolve a caller-supplied `(pos, len)` pair against `input_len`, applying the defaults and
/// validations from distilled spec §4.7/§7: `pos` defaults to 0, `len` defaults to "to end"
/// (spelled `None` here rather than the spec's `-1`, since `pos` is a `usize`), and an
/// out-of-range pair is reported as an argument error naming `api`.
pub(crate) fn resolve_range(input_len: usize, pos: Option<usize>, len: Option<usize>, api: &'static str) -> Result<(usize, usize)> {
    let pos = pos.unwrap_or(0);
    if pos > input_len {
        return Err(Error::invalid_argument(api, format!("pos {pos} exceeds input length {input_len}")));
    }
    let last = match len {
        None => input_len,
        Some(len) => pos.checked_add(len).filter(|&l| l <= input_len).ok_or_else(|| {
            Error::invalid_argument(api, format!("pos {pos} + len {len} exceeds input length {input_len}"))
        })?,
    };
    Ok((pos, last))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constructors as c;

    #[test]
    fn test_unanchored_literal_matches_mid_string() {
        let re = compile(c::str_(b"abc")).unwrap();
        let result = re.run(b"xxabcyy", 0, 7, true, false);
        assert_eq!(result.outcome, dfa::Outcome::Match);
        assert_eq!(result.gpos[0], 2);
        assert_eq!(result.gpos[1], 5);
    }

    #[test]
    fn test_anchored_literal_rejects_mid_string_start() {
        let re = compile(c::whole_string(c::str_(b"abc"))).unwrap();
        assert!(re.is_anchored());
        let result = re.run(b"xabc", 0, 4, false, false);
        assert_eq!(result.outcome, dfa::Outcome::Failed);
    }

    #[test]
    fn test_resolve_range_rejects_out_of_bounds() {
        assert!(resolve_range(5, Some(3), Some(10), "test").is_err());
        assert!(resolve_range(5, Some(6), None, "test").is_err());
        assert_eq!(resolve_range(5, None, None, "test").unwrap(), (0, 5));
    }
}
