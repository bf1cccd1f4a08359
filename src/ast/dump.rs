//! Indented text rendering of a subtree.
//!
//! ```text
//! TranslationUnit 0..7
//!   Declaration: SimpleDeclaration 0..6
//!     DeclSpecifier: SimpleDeclSpecifier(int) 0..3
//! ```

use std::fmt::Write;

use super::{Ast, NodeId, Role};

/// Renders the subtree rooted at `root`, one node per line.
pub fn dump(ast: &Ast, root: NodeId) -> String {
    let mut out = String::new();
    write_node(ast, root, 0, &mut out);
    out
}

fn write_node(ast: &Ast, id: NodeId, depth: usize, out: &mut String) {
    let node = &ast[id];
    for _ in 0..depth {
        out.push_str("  ");
    }
    if node.role != Role::Unattached {
        let _ = write!(out, "{}: ", node.role);
    }
    let _ = writeln!(
        out,
        "{} {}..{}",
        node.kind,
        u32::from(node.range.start()),
        u32::from(node.range.end())
    );
    for &child in &node.children {
        write_node(ast, child, depth + 1, out);
    }
}
