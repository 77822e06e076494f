//! Depth-first syntax-tree traversal with enter/exit callbacks.
//!
//! Detectors that need lexical context (the enclosing function, loop nesting)
//! keep it in a visitor struct created per `analyze` call and dropped after
//! the walk, so no traversal state outlives a single file.

use tree_sitter::Node;

/// Callbacks invoked for every node during a walk.
pub trait SyntaxVisitor {
    /// Called when entering a node, before its children.
    fn on_enter(&mut self, node: &Node<'_>, source: &[u8]);

    /// Called after all children of `node` have been visited.
    fn on_exit(&mut self, _node: &Node<'_>, _source: &[u8]) {}
}

/// Walk the subtree rooted at `root`, dispatching to `visitor`.
///
/// Iterative, so deeply nested input cannot exhaust the stack.
pub fn walk<V: SyntaxVisitor + ?Sized>(root: Node<'_>, source: &[u8], visitor: &mut V) {
    let mut cursor = root.walk();
    loop {
        visitor.on_enter(&cursor.node(), source);
        if cursor.goto_first_child() {
            continue;
        }
        loop {
            visitor.on_exit(&cursor.node(), source);
            if cursor.goto_next_sibling() {
                break;
            }
            if !cursor.goto_parent() {
                return;
            }
        }
    }
}

/// Source text of `node`, or `""` if it is not valid UTF-8.
pub fn node_text<'s>(node: &Node<'_>, source: &'s [u8]) -> &'s str {
    node.utf8_text(source).unwrap_or("")
}

/// 1-based line where `node` starts.
pub fn node_line(node: &Node<'_>) -> u32 {
    node.start_position().row as u32 + 1
}

/// Collects every node of the given kinds under `root`, in document order.
pub fn collect_kind<'t>(root: Node<'t>, kinds: &[&str]) -> Vec<Node<'t>> {
    let mut out = Vec::new();
    let mut cursor = root.walk();
    loop {
        let node = cursor.node();
        if kinds.contains(&node.kind()) {
            out.push(node);
        }
        if cursor.goto_first_child() {
            continue;
        }
        loop {
            if cursor.goto_next_sibling() {
                break;
            }
            if !cursor.goto_parent() {
                return out;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parsers::python::parse_python;

    struct DepthTracker {
        depth: usize,
        max_depth: usize,
        entered: usize,
        exited: usize,
    }

    impl SyntaxVisitor for DepthTracker {
        fn on_enter(&mut self, _node: &Node<'_>, _source: &[u8]) {
            self.depth += 1;
            self.entered += 1;
            self.max_depth = self.max_depth.max(self.depth);
        }
        fn on_exit(&mut self, _node: &Node<'_>, _source: &[u8]) {
            self.depth -= 1;
            self.exited += 1;
        }
    }

    #[test]
    fn enter_and_exit_are_balanced() {
        let src = "def f(x):\n    for i in x:\n        print(i)\n";
        let tree = parse_python(src).unwrap();
        let mut tracker = DepthTracker { depth: 0, max_depth: 0, entered: 0, exited: 0 };
        walk(tree.root_node(), src.as_bytes(), &mut tracker);
        assert_eq!(tracker.depth, 0);
        assert_eq!(tracker.entered, tracker.exited);
        assert!(tracker.max_depth > 3);
    }

    #[test]
    fn collects_nodes_in_order() {
        let src = "a()\nb()\n";
        let tree = parse_python(src).unwrap();
        let calls = collect_kind(tree.root_node(), &["call"]);
        let names: Vec<_> = calls
            .iter()
            .map(|c| node_text(&c.child_by_field_name("function").unwrap(), src.as_bytes()))
            .collect();
        assert_eq!(names, vec!["a", "b"]);
        assert_eq!(node_line(&calls[1]), 2);
    }
}
