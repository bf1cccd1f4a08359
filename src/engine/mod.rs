//! Reduction actions that build the syntax tree
//!
//! A recognizer drives the [`Engine`]: after matching a production it calls
//! [`Engine::begin_rule`] with the matched tokens and then the one action
//! named after the production. The action pops its operands off the
//! [`ScopedStack`], builds at most one node through the [`NodeFactory`],
//! links the operands under it and pushes the result.
//!
//! # Organization
//!
//! Actions are split across files with `impl Engine` blocks:
//! - this module: engine state, stack helpers, names, problems and the
//!   translation unit
//! - `expressions`: primary, postfix, unary, binary and cast expressions
//! - `declarators`: type ids, pointers, array and function declarators
//! - `specifiers`: declaration-specifier folding, struct/union/enum types
//! - `declarations`: initializers, parameters, declarations, definitions
//! - `statements`: every statement form
//! - `disambiguate`: the rewrites that replace an already-built reading
//!   of an ambiguous construct
//!
//! # Ranges
//!
//! Unless an action says otherwise a node's range runs from the start of
//! the leftmost token of the production to the end of the rightmost one.
//! An empty production yields an empty range at the following token.
//!
//! # Failures
//!
//! Problem productions substitute problem nodes and set the recoverable
//! error flag. Popping the wrong shape of operand means the recognizer and
//! the action set disagree; that panics.

mod declarations;
mod declarators;
mod disambiguate;
mod expressions;
mod specifiers;
mod statements;

use text_size::{TextRange, TextSize};
use tracing::{trace, warn};

use crate::ast::{Ast, NodeId, NodeKind, ProblemId, Role};
use crate::factory::NodeFactory;
use crate::stack::ScopedStack;
use crate::tokens::{KindMap, Token, TokenKind};

/// Tokens of one matched production.
#[derive(Debug, Clone, Copy)]
pub struct Reduction<'a> {
    pub left: &'a Token,
    pub right: &'a Token,
    pub tokens: &'a [Token],
}

impl<'a> Reduction<'a> {
    /// Reduction over a non-empty token slice.
    pub fn over(tokens: &'a [Token]) -> Option<Self> {
        Some(Self {
            left: tokens.first()?,
            right: tokens.last()?,
            tokens,
        })
    }

    /// Empty production positioned at `next`.
    pub fn empty(next: &'a Token) -> Self {
        Self {
            left: next,
            right: next,
            tokens: &[],
        }
    }

    fn range(&self) -> TextRange {
        if self.tokens.is_empty() {
            return TextRange::empty(self.left.range.start());
        }
        let start = self.left.range.start();
        TextRange::new(start, self.right.range.end().max(start))
    }
}

/// Stack slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Item<'a> {
    Node(NodeId),
    Token(&'a Token),
    /// Placeholder for an omitted optional operand.
    Absent,
}

/// Names built from the identifier under the content-assist cursor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletionNode {
    pub prefix: String,
    pub range: TextRange,
    pub names: Vec<NodeId>,
}

/// Everything a parse leaves behind.
#[derive(Debug)]
pub struct ParseOutput {
    pub ast: Ast,
    pub translation_unit: Option<NodeId>,
    pub has_error: bool,
    pub completion: Option<CompletionNode>,
}

/// Per-parse action state. Single use: build a new engine for every parse.
pub struct Engine<'a> {
    factory: &'a dyn NodeFactory,
    kinds: &'a KindMap,
    ast: Ast,
    stack: ScopedStack<Item<'a>>,
    rule_right: Option<&'a Token>,
    rule_tokens: &'a [Token],
    rule_range: TextRange,
    encountered_recoverable_problem: bool,
    completion: Option<CompletionNode>,
}

impl<'a> Engine<'a> {
    pub fn new(factory: &'a dyn NodeFactory, kinds: &'a KindMap) -> Self {
        Self {
            factory,
            kinds,
            ast: Ast::new(),
            stack: ScopedStack::new(),
            rule_right: None,
            rule_tokens: &[],
            rule_range: TextRange::empty(TextSize::from(0)),
            encountered_recoverable_problem: false,
            completion: None,
        }
    }

    /// Records the production about to be reduced. Must precede every action.
    pub fn begin_rule(&mut self, reduction: Reduction<'a>) {
        self.rule_right = Some(reduction.right);
        self.rule_tokens = reduction.tokens;
        self.rule_range = reduction.range();
        trace!(range = ?self.rule_range, tokens = reduction.tokens.len(), "reduce");
    }

    pub fn ast(&self) -> &Ast {
        &self.ast
    }

    pub fn encountered_recoverable_problem(&self) -> bool {
        self.encountered_recoverable_problem
    }

    pub fn has_completion_node(&self) -> bool {
        self.completion.is_some()
    }

    pub fn completion_node(&self) -> Option<&CompletionNode> {
        self.completion.as_ref()
    }

    /// True when no tree was produced or a problem production fired.
    pub fn has_error(&self) -> bool {
        self.stack.is_empty() || self.encountered_recoverable_problem
    }

    /// The translation unit, once reduced.
    pub fn translation_unit(&self) -> Option<NodeId> {
        match self.stack.peek() {
            Some(Item::Node(id)) if *self.ast.kind(*id) == NodeKind::TranslationUnit => Some(*id),
            _ => None,
        }
    }

    pub fn finish(self) -> ParseOutput {
        let has_error = self.has_error();
        let translation_unit = self.translation_unit();
        ParseOutput {
            ast: self.ast,
            translation_unit,
            has_error,
            completion: self.completion,
        }
    }

    // Bookkeeping

    pub fn open_ast_scope(&mut self) {
        self.stack.open_scope();
    }

    /// Pushes the rightmost token of the production.
    pub fn consume_token(&mut self) {
        let token = self.rule_right();
        self.stack.push(Item::Token(token));
    }

    /// Pushes a placeholder for an omitted optional operand.
    pub fn consume_empty(&mut self) {
        self.stack.push(Item::Absent);
    }

    pub fn consume_identifier_name(&mut self) {
        let name = self.create_name(self.rule_right());
        self.push(name);
    }

    /// Name in a K&R identifier list; resolved later against the
    /// declaration list of the definition.
    pub fn consume_identifier_knr(&mut self) {
        let name = self.create_name(self.rule_right());
        self.push(name);
    }

    // Problems

    pub fn consume_statement_problem(&mut self) {
        let node = self.factory.new_problem_statement(&mut self.ast);
        self.consume_problem(node, "statement");
    }

    pub fn consume_expression_problem(&mut self) {
        let node = self.factory.new_problem_expression(&mut self.ast);
        self.consume_problem(node, "expression");
    }

    pub fn consume_declaration_problem(&mut self) {
        let node = self.factory.new_problem_declaration(&mut self.ast);
        self.consume_problem(node, "declaration");
    }

    fn consume_problem(&mut self, node: NodeId, category: &str) {
        let problem = self.problem();
        self.ast.attach(node, problem, Role::Problem);
        self.set_rule_range(node);
        warn!(category, range = ?self.rule_range, "syntax error");
        self.encountered_recoverable_problem = true;
        self.push(node);
    }

    /// Bare problem node over the current production.
    fn problem(&mut self) -> NodeId {
        let problem = self.factory.new_problem(&mut self.ast, ProblemId::SyntaxError);
        self.set_rule_range(problem);
        problem
    }

    // Translation unit

    /// Drains the top-level scope into the root, then appends one comment
    /// node per comment token.
    pub fn consume_translation_unit(&mut self, comments: &'a [Token], eof: &'a Token) {
        let mut declarations = Vec::new();
        while let Some(item) = self.stack.pop() {
            declarations.push(item);
        }
        declarations.reverse();

        let unit = self.factory.new_translation_unit(&mut self.ast);
        for item in declarations {
            match item {
                Item::Node(id) => {
                    let id = self.narrow(id, "declaration", NodeKind::is_declaration);
                    self.ast.attach(unit, id, Role::Declaration);
                }
                Item::Absent => {}
                Item::Token(token) => panic!("stray token {:?} at top level", token.text),
            }
        }
        self.ast
            .set_range(unit, TextRange::new(TextSize::from(0), eof.range.end()));

        for token in comments {
            let kind = self.kinds.map_kind(token.kind);
            if !kind.is_comment() {
                continue;
            }
            let comment = self.factory.new_comment(
                &mut self.ast,
                &token.text,
                kind == TokenKind::MultiLineComment,
            );
            self.ast.set_range(comment, token.range);
            self.ast.attach(unit, comment, Role::Comment);
        }

        self.push(unit);
    }

    // Helpers shared by the action files

    fn rule_right(&self) -> &'a Token {
        self.rule_right
            .unwrap_or_else(|| panic!("action fired before begin_rule"))
    }

    fn rule_token(&self, index: usize) -> &'a Token {
        self.rule_tokens.get(index).unwrap_or_else(|| {
            panic!(
                "production has {} tokens, wanted index {index}",
                self.rule_tokens.len()
            )
        })
    }

    fn token_kind(&self, token: &Token) -> TokenKind {
        self.kinds.map_kind(token.kind)
    }

    fn push(&mut self, id: NodeId) {
        self.stack.push(Item::Node(id));
    }

    fn pop(&mut self) -> Item<'a> {
        self.stack
            .pop()
            .unwrap_or_else(|| panic!("stack underflow: {:?}", self.stack))
    }

    fn pop_node(&mut self) -> NodeId {
        match self.pop() {
            Item::Node(id) => id,
            other => panic!("expected a node on the stack, found {other:?}"),
        }
    }

    /// Pops a node or an [`Item::Absent`] placeholder.
    fn pop_optional(&mut self) -> Option<NodeId> {
        match self.pop() {
            Item::Node(id) => Some(id),
            Item::Absent => None,
            Item::Token(token) => panic!("expected an optional node, found token {:?}", token.text),
        }
    }

    fn pop_expression(&mut self) -> NodeId {
        let id = self.pop_node();
        self.narrow(id, "expression", NodeKind::is_expression)
    }

    fn pop_declarator(&mut self) -> NodeId {
        let id = self.pop_node();
        self.narrow(id, "declarator", NodeKind::is_declarator)
    }

    fn pop_decl_specifier(&mut self) -> NodeId {
        let id = self.pop_node();
        self.narrow(id, "declaration specifier", NodeKind::is_decl_specifier)
    }

    fn pop_statement(&mut self) -> NodeId {
        let id = self.pop_node();
        self.narrow(id, "statement", NodeKind::is_statement)
    }

    fn pop_type_id(&mut self) -> NodeId {
        let id = self.pop_node();
        self.narrow(id, "type id", |kind| *kind == NodeKind::TypeId)
    }

    fn pop_name(&mut self) -> NodeId {
        let id = self.pop_node();
        self.narrow(id, "name", |kind| matches!(kind, NodeKind::Name { .. }))
    }

    fn pop_initializer(&mut self) -> NodeId {
        let id = self.pop_node();
        self.narrow(id, "initializer", NodeKind::is_initializer)
    }

    /// Checks an operand's shape. Problem nodes fit every slot.
    fn narrow(&self, id: NodeId, expected: &str, accept: fn(&NodeKind) -> bool) -> NodeId {
        let kind = self.ast.kind(id);
        if accept(kind) || kind.is_problem() {
            id
        } else {
            panic!("expected {expected}, found {kind}")
        }
    }

    fn close_scope(&mut self) -> Vec<Item<'a>> {
        self.stack.close_scope()
    }

    /// Closes the current scope, which must hold only nodes.
    fn close_scope_nodes(&mut self) -> Vec<NodeId> {
        self.close_scope()
            .into_iter()
            .map(|item| match item {
                Item::Node(id) => id,
                other => panic!("expected only nodes in scope, found {other:?}"),
            })
            .collect()
    }

    fn set_rule_range(&mut self, id: NodeId) {
        self.ast.set_range(id, self.rule_range);
    }

    /// Sets `[start, end)`, clamping an inverted pair to empty.
    fn set_span(&mut self, id: NodeId, start: TextSize, end: TextSize) {
        self.ast.set_range(id, TextRange::new(start, end.max(start)));
    }

    /// Name node for `token`; names at the completion cursor are recorded.
    fn create_name(&mut self, token: &Token) -> NodeId {
        let name = self.factory.new_name(&mut self.ast, &token.text);
        self.ast.set_range(name, token.range);
        if token.completion {
            let completion = self.completion.get_or_insert_with(|| CompletionNode {
                prefix: token.text.clone(),
                range: token.range,
                names: Vec::new(),
            });
            completion.names.push(name);
        }
        name
    }

    fn link(&mut self, parent: NodeId, child: Option<NodeId>, role: Role) {
        if let Some(child) = child {
            self.ast.attach(parent, child, role);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::factory::DefaultNodeFactory;
    use crate::tokens::TokenKind;

    pub(super) fn token(kind: TokenKind, text: &str, start: u32) -> Token {
        let start = TextSize::from(start);
        Token::new(
            kind.raw(),
            text,
            TextRange::at(start, TextSize::of(text)),
        )
    }

    #[test]
    fn test_empty_reduction_range_sits_at_next_token() {
        let next = token(TokenKind::Identifier, "x", 7);
        assert_eq!(
            Reduction::empty(&next).range(),
            TextRange::empty(TextSize::from(7))
        );
    }

    #[test]
    fn test_no_translation_unit_is_an_error() {
        let kinds = KindMap::identity();
        let engine = Engine::new(&DefaultNodeFactory, &kinds);
        let output = engine.finish();
        assert!(output.has_error);
        assert!(output.translation_unit.is_none());
    }

    #[test]
    fn test_translation_unit_spans_whole_input() {
        let kinds = KindMap::identity();
        let tokens = vec![
            token(TokenKind::SemiColon, ";", 0),
            token(TokenKind::EndOfFile, "", 9),
        ];
        let comments = vec![token(TokenKind::MultiLineComment, "/* c */", 2)];
        let mut engine = Engine::new(&DefaultNodeFactory, &kinds);

        engine.begin_rule(Reduction::over(&tokens[..1]).unwrap());
        engine.consume_declaration_empty();
        engine.begin_rule(Reduction::over(&tokens).unwrap());
        engine.consume_translation_unit(&comments, &tokens[1]);

        let output = engine.finish();
        assert!(!output.has_error);
        let unit = output.translation_unit.unwrap();
        assert_eq!(output.ast.range(unit), TextRange::new(0.into(), 9.into()));
        let roles: Vec<_> = output
            .ast
            .children(unit)
            .iter()
            .map(|&c| output.ast.role(c))
            .collect();
        assert_eq!(roles, vec![Role::Declaration, Role::Comment]);
    }

    #[test]
    fn test_problem_sets_flag() {
        let kinds = KindMap::identity();
        let tokens = vec![token(TokenKind::Identifier, "x", 0)];
        let mut engine = Engine::new(&DefaultNodeFactory, &kinds);
        engine.begin_rule(Reduction::over(&tokens).unwrap());
        engine.consume_statement_problem();
        assert!(engine.encountered_recoverable_problem());
        assert!(engine.has_error());
    }

    #[test]
    #[should_panic(expected = "stack underflow")]
    fn test_underflow_panics() {
        let kinds = KindMap::identity();
        let tokens = vec![token(TokenKind::Identifier, "x", 0)];
        let mut engine = Engine::new(&DefaultNodeFactory, &kinds);
        engine.begin_rule(Reduction::over(&tokens).unwrap());
        engine.consume_expression_unary(crate::ast::UnaryOp::Minus);
    }

    #[test]
    #[should_panic(expected = "expected expression")]
    fn test_shape_mismatch_panics() {
        let kinds = KindMap::identity();
        let tokens = vec![token(TokenKind::Identifier, "x", 0)];
        let mut engine = Engine::new(&DefaultNodeFactory, &kinds);
        engine.begin_rule(Reduction::over(&tokens).unwrap());
        engine.consume_identifier_name();
        engine.consume_expression_unary(crate::ast::UnaryOp::Minus);
    }

    #[test]
    fn test_completion_names_are_collected() {
        let kinds = KindMap::identity();
        let mut cursor = token(TokenKind::Identifier, "fo", 4);
        cursor.completion = true;
        let tokens = vec![cursor];
        let mut engine = Engine::new(&DefaultNodeFactory, &kinds);
        engine.begin_rule(Reduction::over(&tokens).unwrap());
        engine.consume_expression_id();

        let completion = engine.completion_node().unwrap();
        assert_eq!(completion.prefix, "fo");
        assert_eq!(completion.names.len(), 1);
        assert_eq!(engine.ast().name_text(completion.names[0]), Some("fo"));
    }
}
