//! Integration tests exercising the public API end to end: compiling a pattern from the
//! combinators in `rxe`, then driving the search protocols over it.

use rxe::{self as re, MarkSet};

#[test]
fn s1_literal_matches_mid_string() {
    let pattern = re::compile(re::str_(b"abc")).unwrap();
    let m = re::exec(&pattern, b"xxabcyy", None, None).unwrap();
    assert_eq!(m.get(0).unwrap(), b"abc");
    assert_eq!(m.offset(0).unwrap(), (2, 5));
}

#[test]
fn s2_anchored_pattern_rejects_mid_string_match() {
    let pattern = re::compile(re::whole_string(re::str_(b"abc"))).unwrap();
    assert!(pattern.is_anchored());
    assert!(re::exec_opt(&pattern, b"xabc", None, None).unwrap().is_none());
    assert!(re::exec_opt(&pattern, b"abc", None, None).unwrap().is_some());
}

#[test]
fn s3_first_semantics_prefer_earlier_alternative_over_longest() {
    let pattern = re::compile(re::alt(vec![re::str_(b"foo"), re::str_(b"foobar")])).unwrap();
    let m = re::exec(&pattern, b"foobar", None, None).unwrap();
    assert_eq!(m.get(0).unwrap(), b"foo");
}

#[test]
fn s3_longest_semantics_prefer_the_longer_alternative() {
    let pattern = re::compile(re::longest(re::alt(vec![re::str_(b"foo"), re::str_(b"foobar")]))).unwrap();
    let m = re::exec(&pattern, b"foobar", None, None).unwrap();
    assert_eq!(m.get(0).unwrap(), b"foobar");
}

#[test]
fn s4_all_finds_every_non_overlapping_match() {
    let pattern = re::compile(re::rep1(re::digit())).unwrap();
    let found: Vec<(usize, usize)> = re::all(&pattern, b"a12b345c").map(|m| m.offset(0).unwrap()).collect();
    assert_eq!(found, vec![(1, 3), (4, 7)]);
}

#[test]
fn s4_all_suppresses_empty_match_immediately_after_a_match() {
    let pattern = re::compile(re::rep(re::char_(b'a'))).unwrap();
    let found: Vec<(usize, usize)> = re::all(&pattern, b"aaa").map(|m| m.offset(0).unwrap()).collect();
    // Greedy a* swallows the whole run in one match; no trailing empty match at position 3.
    assert_eq!(found, vec![(0, 3)]);
}

#[test]
fn s5_split_and_split_delim_interleave_text_and_delimiters() {
    let ws = re::compile(re::rep1(re::space())).unwrap();
    let words: Vec<Vec<u8>> = re::split(&ws, b"  one two  three").map(|t| t.to_vec()).collect();
    assert_eq!(words, vec![b"one".to_vec(), b"two".to_vec(), b"three".to_vec()]);

    let parts = re::split_delim(&ws, b"  one two  three");
    let texts: Vec<Vec<u8>> = parts
        .iter()
        .filter_map(|p| match p {
            re::Split::Text(t) => Some(t.to_vec()),
            re::Split::Delim(_) => None,
        })
        .collect();
    assert_eq!(texts, vec![b"".to_vec(), b"one".to_vec(), b"two".to_vec(), b"three".to_vec()]);
}

#[test]
fn s6_replace_rewrites_every_match_by_default() {
    let pattern = re::compile(re::group(None, re::rep1(re::digit()))).unwrap();
    let out = re::replace(&pattern, b"x12y34z", |m| [b"[", m.get(0).unwrap(), b"]"].concat(), true);
    assert_eq!(out, b"x[12]y[34]z");
}

#[test]
fn s6_replace_first_only_rewrites_the_first_match() {
    let pattern = re::compile(re::rep1(re::digit())).unwrap();
    let out = re::replace_string(&pattern, b"x12y34z", b"#", false);
    assert_eq!(out, b"x#y34z");
}

#[test]
fn s7_exec_partial_distinguishes_prefix_from_mismatch() {
    let pattern = re::compile(re::str_(b"abcdef")).unwrap();
    assert_eq!(re::exec_partial(&pattern, b"abc", None, None).unwrap(), re::Partial::Partial);
    assert_eq!(re::exec_partial(&pattern, b"abcdef", None, None).unwrap(), re::Partial::Full);
    assert_eq!(re::exec_partial(&pattern, b"xyz", None, None).unwrap(), re::Partial::Mismatch);
}

#[test]
fn s8_eol_matches_before_newline_or_end_of_input() {
    let pattern = re::compile(re::seq(vec![re::str_(b"x"), re::eol()])).unwrap();
    assert!(re::execp(&pattern, b"x\ny", None, None).unwrap());
    assert!(re::execp(&pattern, b"x", None, None).unwrap());
    assert!(!re::execp(&pattern, b"xy", None, None).unwrap());
}

#[test]
fn invariant_unmatched_group_reports_not_found() {
    let pattern = re::compile(re::alt(vec![
        re::group(Some("a"), re::str_(b"a")),
        re::group(Some("b"), re::str_(b"b")),
    ]))
    .unwrap();
    let m = re::exec(&pattern, b"b", None, None).unwrap();
    assert!(!m.test(1));
    assert!(m.test(2));
    assert_eq!(m.index_of_name("b"), Some(2));
    assert_eq!(m.name(2), Some("b"));
}

#[test]
fn invariant_case_insensitive_matches_either_case() {
    let pattern = re::compile(re::no_case(re::str_(b"abc"))).unwrap();
    assert!(re::execp(&pattern, b"ABC", None, None).unwrap());
    assert!(re::execp(&pattern, b"AbC", None, None).unwrap());
}

#[test]
fn invariant_pmarks_report_which_branch_fired() {
    let (left_id, left) = re::mark(re::str_(b"cat"));
    let (right_id, right) = re::mark(re::str_(b"dog"));
    let pattern = re::compile(re::alt(vec![left, right])).unwrap();
    let m = re::exec(&pattern, b"dog", None, None).unwrap();
    assert!(!m.mark_test(left_id));
    assert!(m.mark_test(right_id));
}

#[test]
fn invariant_repn_rejects_an_inverted_bound() {
    assert!(re::repn(re::char_(b'a'), 3, Some(1)).is_err());
}

#[test]
fn exec_reports_not_found_when_nothing_matches() {
    let pattern = re::compile(re::str_(b"zzz")).unwrap();
    let err = re::exec(&pattern, b"abc", None, None).unwrap_err();
    assert!(err.is_not_found());
}
