//! Graphviz dump of the NFA expression arena, for debugging a compiled pattern. Gated behind the
//! `dot_writer` feature; grounded on the teacher's `internal::dot` module, adapted from an
//! explicit-state NFA (vertices = states, edges = byte transitions) to this crate's arena (vertices
//! = expression nodes, edges = subexpression links) since there is no separate state graph until
//! the lazy DFA builds one.

use std::io::Write;

use dot_writer::{Attributes, Color, DotWriter, RankDirection, Shape};

use crate::automata::{Automata, Node};
use crate::ids::NfaId;

fn node_label(node: &Node) -> String {
    match node {
        Node::Cst(_) => "charset".to_string(),
        Node::Eps => "eps".to_string(),
        Node::Alt(kind, _) => format!("alt({kind:?})"),
        Node::Seq(kind, ..) => format!("seq({kind:?})"),
        Node::Rep(g, k, _) => format!("rep({g:?},{k:?})"),
        Node::Mark(m) => format!("mark({})", m.as_usize()),
        Node::Erase(lo, hi) => format!("erase({}..={})", lo.as_usize(), hi.as_usize()),
        Node::Pmark(p) => format!("pmark({})", p.as_usize()),
        Node::After(cat) => format!("after({cat:?})"),
        Node::Before(cat) => format!("before({cat:?})"),
        Node::Rename(_) => "rename".to_string(),
    }
}

fn children(node: &Node) -> Vec<(NfaId, &'static str)> {
    match node {
        Node::Alt(_, list) => list.iter().map(|&id| (id, "")).collect(),
        Node::Seq(_, x, y) => vec![(*x, "1"), (*y, "2")],
        Node::Rep(_, _, x) => vec![(*x, "")],
        Node::Rename(inner) => vec![(*inner, "")],
        _ => Vec::new(),
    }
}

/// Render every node reachable from `root` (plus the two reserved fail/eps nodes) as a graphviz
/// digraph.
pub(crate) fn render<W: Write>(automata: &Automata, root: NfaId, output: &mut W) {
    let mut writer = DotWriter::from(output);
    writer.set_pretty_print(true);
    let mut digraph = writer.digraph();
    digraph.set_label("nfa").set_rank_direction(RankDirection::LeftRight);

    // `node_auto()` assigns "node_0", "node_1", ... in call order; since this loop visits nodes
    // in ascending id order with no other calls interleaved, those auto ids line up with `NfaId`
    // and edges below can target them by `format!("node_{}", ...)` without tracking the mapping.
    for (id, node) in automata.iter() {
        let mut n = digraph.node_auto();
        n.set_label(&format!("{}: {}", id.as_usize(), node_label(node)));
        if id == root {
            n.set_shape(Shape::Circle).set_color(Color::Blue).set_pen_width(3.0);
        }
        if id == automata.fail() {
            n.set_color(Color::Red);
        }
    }
    for (id, node) in automata.iter() {
        for (child, label) in children(node) {
            let mut edge = digraph.edge(format!("node_{}", id.as_usize()), format!("node_{}", child.as_usize()));
            if !label.is_empty() {
                edge.attributes().set_label(label);
            }
        }
    }
}
