//! Arena-backed syntax tree
//!
//! Nodes are allocated unlinked with an empty range; the engine action that
//! owns a node links its children and sets its range, after which the node
//! is only read or re-parented.
//!
//! - [`kind`]: [`NodeKind`] and the scalar payloads it carries
//! - [`dump`]: indented tree printer used by the CLI and the tests

pub mod dump;
pub mod kind;

use std::fmt;
use std::ops::{Index, IndexMut};

use la_arena::{Arena, Idx};
use text_size::{TextRange, TextSize};

pub use kind::*;

pub type NodeId = Idx<Node>;

/// The slot a child fills in its parent.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Role {
    #[default]
    Unattached,
    Declaration,
    Comment,
    Problem,

    Name,
    Operand,
    Operand1,
    Operand2,
    Condition,
    Positive,
    Negative,
    TypeId,
    FunctionName,
    Argument,
    FieldOwner,
    FieldName,
    Array,
    Subscript,
    Expression,
    Alternative,

    DeclSpecifier,
    Declarator,
    Nested,
    Pointer,
    ArrayModifier,
    Parameter,
    KnrParameterName,
    KnrParameterDeclaration,
    BitFieldSize,
    Initializer,
    Member,
    Enumerator,
    Value,
    Designator,

    Body,
    Statement,
    Then,
    Else,
    Init,
    Iteration,
    ReturnValue,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Node {
    pub kind: NodeKind,
    pub range: TextRange,
    pub parent: Option<NodeId>,
    pub role: Role,
    pub children: Vec<NodeId>,
}

/// Owns every node of one parse.
#[derive(Debug, Default)]
pub struct Ast {
    nodes: Arena<Node>,
}

impl Ast {
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocates an unlinked node with an empty range at offset 0.
    pub fn alloc(&mut self, kind: NodeKind) -> NodeId {
        self.nodes.alloc(Node {
            kind,
            range: TextRange::empty(TextSize::from(0)),
            parent: None,
            role: Role::Unattached,
            children: Vec::new(),
        })
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn kind(&self, id: NodeId) -> &NodeKind {
        &self.nodes[id].kind
    }

    pub fn range(&self, id: NodeId) -> TextRange {
        self.nodes[id].range
    }

    pub fn set_range(&mut self, id: NodeId, range: TextRange) {
        self.nodes[id].range = range;
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes[id].parent
    }

    pub fn role(&self, id: NodeId) -> Role {
        self.nodes[id].role
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.nodes[id].children
    }

    /// Children of `id` filling `role`, in link order.
    pub fn children_with(&self, id: NodeId, role: Role) -> impl Iterator<Item = NodeId> + '_ {
        self.nodes[id]
            .children
            .iter()
            .copied()
            .filter(move |&child| self.nodes[child].role == role)
    }

    /// First child of `id` filling `role`.
    pub fn child(&self, id: NodeId, role: Role) -> Option<NodeId> {
        self.children_with(id, role).next()
    }

    /// Links `child` as the last child of `parent`.
    ///
    /// A child that is already linked elsewhere is detached first, so a node
    /// never has two parents.
    pub fn attach(&mut self, parent: NodeId, child: NodeId, role: Role) {
        assert_ne!(parent, child, "node cannot be its own child");
        self.detach(child);
        let node = &mut self.nodes[child];
        node.parent = Some(parent);
        node.role = role;
        self.nodes[parent].children.push(child);
    }

    /// Unlinks `child` from its parent, if any.
    pub fn detach(&mut self, child: NodeId) {
        let Some(parent) = self.nodes[child].parent.take() else {
            return;
        };
        self.nodes[child].role = Role::Unattached;
        self.nodes[parent].children.retain(|&c| c != child);
    }

    /// Text of a `Name` node.
    pub fn name_text(&self, id: NodeId) -> Option<&str> {
        match &self.nodes[id].kind {
            NodeKind::Name { text } => Some(text),
            _ => None,
        }
    }

    /// Every node in the subtree rooted at `id`, preorder.
    pub fn descendants(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut pending = vec![id];
        while let Some(next) = pending.pop() {
            out.push(next);
            pending.extend(self.nodes[next].children.iter().rev().copied());
        }
        out
    }
}

impl Index<NodeId> for Ast {
    type Output = Node;

    fn index(&self, id: NodeId) -> &Node {
        &self.nodes[id]
    }
}

impl IndexMut<NodeId> for Ast {
    fn index_mut(&mut self, id: NodeId) -> &mut Node {
        &mut self.nodes[id]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn name(ast: &mut Ast, text: &str) -> NodeId {
        ast.alloc(NodeKind::Name { text: text.to_string() })
    }

    #[test]
    fn test_alloc_is_unlinked_and_empty() {
        let mut ast = Ast::new();
        let id = name(&mut ast, "x");
        assert_eq!(ast.parent(id), None);
        assert_eq!(ast.role(id), Role::Unattached);
        assert!(ast.range(id).is_empty());
        assert!(ast.children(id).is_empty());
    }

    #[test]
    fn test_attach_moves_between_parents() {
        let mut ast = Ast::new();
        let first = ast.alloc(NodeKind::IdExpression);
        let second = ast.alloc(NodeKind::IdExpression);
        let child = name(&mut ast, "x");

        ast.attach(first, child, Role::Name);
        assert_eq!(ast.child(first, Role::Name), Some(child));

        ast.attach(second, child, Role::Name);
        assert!(ast.children(first).is_empty());
        assert_eq!(ast.parent(child), Some(second));
        assert_eq!(ast.role(child), Role::Name);
    }

    #[test]
    fn test_children_with_filters_by_role() {
        let mut ast = Ast::new();
        let call = ast.alloc(NodeKind::FunctionCall);
        let callee = ast.alloc(NodeKind::IdExpression);
        let a = ast.alloc(NodeKind::IdExpression);
        let b = ast.alloc(NodeKind::IdExpression);
        ast.attach(call, callee, Role::FunctionName);
        ast.attach(call, a, Role::Argument);
        ast.attach(call, b, Role::Argument);

        let args: Vec<_> = ast.children_with(call, Role::Argument).collect();
        assert_eq!(args, vec![a, b]);
        assert_eq!(ast.descendants(call), vec![call, callee, a, b]);
    }

    #[test]
    fn test_detach_clears_role() {
        let mut ast = Ast::new();
        let parent = ast.alloc(NodeKind::ExpressionStatement);
        let child = ast.alloc(NodeKind::IdExpression);
        ast.attach(parent, child, Role::Expression);
        ast.detach(child);
        assert_eq!(ast.parent(child), None);
        assert_eq!(ast.role(child), Role::Unattached);
        assert!(ast.children(parent).is_empty());
    }
}
