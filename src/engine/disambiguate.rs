//! Rewrites for constructs the grammar cannot tell apart without knowing
//! which identifiers name types.
//!
//! Each rewrite fires only on the exact token shape listed on it; anything
//! else keeps the reading the grammar built. Rewrites move the existing
//! name nodes into the new reading rather than copying them.

use tracing::debug;

use crate::ast::{BinaryOp, NodeId, NodeKind, Role, UnaryOp};
use crate::tokens::TokenKind;

use super::Engine;

impl<'a> Engine<'a> {
    /// `sizeof ( x )` with `x` a lone identifier: keeps both the type-id
    /// reading and the id-expression reading under one ambiguous node,
    /// in that order.
    pub(super) fn resolve_sizeof_ambiguity(&mut self, sizeof_type_id: NodeId) -> NodeId {
        let tokens = self.rule_tokens;
        if tokens.len() != 4 || self.token_kind(&tokens[2]) != TokenKind::Identifier {
            return sizeof_type_id;
        }
        debug!(name = %tokens[2].text, "sizeof operand kept as type id and id expression");

        let name = self.create_name(&tokens[2]);
        let id_expr = self.id_expression_over(name);
        let sizeof_expr = self.factory.new_unary(&mut self.ast, UnaryOp::Sizeof);
        self.ast.attach(sizeof_expr, id_expr, Role::Operand);
        self.set_rule_range(sizeof_expr);

        let ambiguous = self.factory.new_ambiguous(&mut self.ast);
        self.ast.attach(ambiguous, sizeof_type_id, Role::Alternative);
        self.ast.attach(ambiguous, sizeof_expr, Role::Alternative);
        self.set_rule_range(ambiguous);
        ambiguous
    }

    /// `( i ) & 1` parsed as a cast of `&1` to type `i` becomes `(i) & 1`.
    ///
    /// Requires an `&` over a literal as the operand, a type id that is
    /// only a typedef name with no other specifiers and no declarator, and
    /// production tokens starting with exactly `(` identifier `)`.
    pub(super) fn resolve_cast_ambiguity(&mut self, cast: NodeId, type_id: NodeId, operand: NodeId) -> NodeId {
        if *self.ast.kind(operand) != (NodeKind::Unary { op: UnaryOp::Amper }) {
            return cast;
        }
        let Some(literal) = self.ast.child(operand, Role::Operand) else {
            return cast;
        };
        if !matches!(self.ast.kind(literal), NodeKind::Literal { .. }) {
            return cast;
        }
        if self.ast.child(type_id, Role::Declarator).is_some() {
            return cast;
        }
        let Some(name) = self.bare_typedef_name(type_id, false) else {
            return cast;
        };

        let tokens = self.rule_tokens;
        let kinds = tokens.iter().take(3).map(|token| self.token_kind(token));
        if !kinds.eq([TokenKind::LeftParen, TokenKind::Identifier, TokenKind::RightParen]) {
            return cast;
        }
        debug!(range = ?self.rule_range, "cast of '&literal' rewritten to bitwise and");

        let id_expr = self.id_expression_over(name);
        let bracketed = self.factory.new_unary(&mut self.ast, UnaryOp::Bracketed);
        self.ast.attach(bracketed, id_expr, Role::Operand);
        self.set_span(bracketed, tokens[0].range.start(), tokens[2].range.end());

        let binary = self.factory.new_binary(&mut self.ast, BinaryOp::BinaryAnd);
        self.ast.attach(binary, bracketed, Role::Operand1);
        self.ast.attach(binary, literal, Role::Operand2);
        self.set_rule_range(binary);
        binary
    }

    /// Expression reading of a declaration statement, if it has one.
    ///
    /// `i;`: no declarators and a specifier that is exactly a typedef name
    /// becomes an expression statement over `i`.
    ///
    /// `f(x);`: a single declarator that is only `( x )` under the same
    /// kind of specifier becomes an expression statement over the call
    /// `f(x)`.
    pub(super) fn resolve_declaration_statement(&mut self, declaration: NodeId) -> Option<NodeId> {
        if *self.ast.kind(declaration) != NodeKind::SimpleDeclaration {
            return None;
        }
        let decl_spec = self.ast.child(declaration, Role::DeclSpecifier)?;
        let declarators: Vec<NodeId> = self.ast.children_with(declaration, Role::Declarator).collect();

        let expr = match declarators.as_slice() {
            [] => {
                let name = self.bare_typedef_name(declaration, true)?;
                debug!(name = ?self.ast.name_text(name), "declaration rewritten to expression statement");
                self.id_expression_over(name)
            }
            [declarator] => {
                let argument = self.bracketed_bare_name(*declarator)?;
                let function = self.bare_typedef_name(declaration, true)?;
                debug!(
                    name = ?self.ast.name_text(function),
                    "declaration rewritten to function call"
                );
                let start = self.ast.range(decl_spec).start();
                let end = self.ast.range(*declarator).end();

                let callee = self.id_expression_over(function);
                let argument = self.id_expression_over(argument);
                let call = self.factory.new_function_call(&mut self.ast);
                self.ast.attach(call, callee, Role::FunctionName);
                self.ast.attach(call, argument, Role::Argument);
                self.set_span(call, start, end);
                call
            }
            _ => return None,
        };

        let statement = self.factory.new_expression_statement(&mut self.ast);
        self.ast.attach(statement, expr, Role::Expression);
        Some(statement)
    }

    /// Name of `owner`'s specifier when that specifier is a typedef name
    /// and nothing else. With `whole_span`, the name must also cover the
    /// specifier's entire range.
    fn bare_typedef_name(&self, owner: NodeId, whole_span: bool) -> Option<NodeId> {
        let decl_spec = self.ast.child(owner, Role::DeclSpecifier)?;
        let NodeKind::NamedTypeSpecifier(spec) = self.ast.kind(decl_spec) else {
            return None;
        };
        if !spec.is_bare() {
            return None;
        }
        let name = self.ast.child(decl_spec, Role::Name)?;
        if whole_span && self.ast.range(name) != self.ast.range(decl_spec) {
            return None;
        }
        Some(name)
    }

    /// Name inside a declarator shaped exactly `( name )`.
    fn bracketed_bare_name(&self, declarator: NodeId) -> Option<NodeId> {
        if *self.ast.kind(declarator) != NodeKind::Declarator || self.ast.children(declarator).len() != 1 {
            return None;
        }
        let nested = self.ast.child(declarator, Role::Nested)?;
        if *self.ast.kind(nested) != NodeKind::Declarator || self.ast.children(nested).len() != 1 {
            return None;
        }
        self.ast.child(nested, Role::Name)
    }

    /// Id expression over an existing name, spanning the name.
    fn id_expression_over(&mut self, name: NodeId) -> NodeId {
        let range = self.ast.range(name);
        let expr = self.factory.new_id_expression(&mut self.ast);
        self.ast.attach(expr, name, Role::Name);
        self.ast.set_range(expr, range);
        expr
    }
}

#[cfg(test)]
mod tests {
    use super::super::tests::token;
    use super::super::{Item, Reduction};
    use super::*;
    use crate::ast::dump::dump;
    use crate::ast::LiteralKind;
    use crate::factory::DefaultNodeFactory;
    use crate::tokens::KindMap;

    #[test]
    fn test_sizeof_identifier_keeps_both_readings() {
        let kinds = KindMap::identity();
        // sizeof(x)
        let tokens = vec![
            token(TokenKind::Sizeof, "sizeof", 0),
            token(TokenKind::LeftParen, "(", 6),
            token(TokenKind::Identifier, "x", 7),
            token(TokenKind::RightParen, ")", 8),
        ];
        let mut engine = Engine::new(&DefaultNodeFactory, &kinds);

        engine.open_ast_scope();
        engine.begin_rule(Reduction::over(&tokens[2..3]).unwrap());
        engine.consume_token();
        engine.consume_declaration_specifiers_typedef_name();
        engine.consume_type_id(false);
        engine.begin_rule(Reduction::over(&tokens).unwrap());
        engine.consume_expression_sizeof_type_id();

        let Some(Item::Node(expr)) = engine.stack.pop() else {
            panic!("no expression");
        };
        expect_test::expect![[r#"
            Ambiguous 0..9
              Alternative: SizeofTypeId 0..9
                TypeId: TypeId 7..8
                  DeclSpecifier: NamedTypeSpecifier 7..8
                    Name: Name "x" 7..8
              Alternative: Unary(Sizeof) 0..9
                Operand: IdExpression 7..8
                  Name: Name "x" 7..8
        "#]]
        .assert_eq(&dump(engine.ast(), expr));
    }

    #[test]
    fn test_cast_of_address_of_literal_becomes_and() {
        let kinds = KindMap::identity();
        // (i) & 1
        let tokens = vec![
            token(TokenKind::LeftParen, "(", 0),
            token(TokenKind::Identifier, "i", 1),
            token(TokenKind::RightParen, ")", 2),
            token(TokenKind::And, "&", 4),
            token(TokenKind::IntegerConstant, "1", 6),
        ];
        let mut engine = Engine::new(&DefaultNodeFactory, &kinds);

        engine.open_ast_scope();
        engine.begin_rule(Reduction::over(&tokens[1..2]).unwrap());
        engine.consume_token();
        engine.consume_declaration_specifiers_typedef_name();
        engine.consume_type_id(false);
        engine.begin_rule(Reduction::over(&tokens[4..5]).unwrap());
        engine.consume_expression_literal(LiteralKind::Integer);
        engine.begin_rule(Reduction::over(&tokens[3..5]).unwrap());
        engine.consume_expression_unary(UnaryOp::Amper);
        engine.begin_rule(Reduction::over(&tokens).unwrap());
        engine.consume_expression_cast();

        let Some(Item::Node(expr)) = engine.stack.pop() else {
            panic!("no expression");
        };
        expect_test::expect![[r#"
            Binary(BinaryAnd) 0..7
              Operand1: Unary(Bracketed) 0..3
                Operand: IdExpression 1..2
                  Name: Name "i" 1..2
              Operand2: Literal(Integer) 1 6..7
        "#]]
        .assert_eq(&dump(engine.ast(), expr));
    }

    #[test]
    fn test_declaration_of_bracketed_name_becomes_call() {
        let kinds = KindMap::identity();
        // x(y);
        let tokens = vec![
            token(TokenKind::Identifier, "x", 0),
            token(TokenKind::LeftParen, "(", 1),
            token(TokenKind::Identifier, "y", 2),
            token(TokenKind::RightParen, ")", 3),
            token(TokenKind::SemiColon, ";", 4),
        ];
        let mut engine = Engine::new(&DefaultNodeFactory, &kinds);

        engine.open_ast_scope();
        engine.begin_rule(Reduction::over(&tokens[0..1]).unwrap());
        engine.consume_token();
        engine.consume_declaration_specifiers_typedef_name();
        engine.open_ast_scope();
        engine.begin_rule(Reduction::over(&tokens[2..3]).unwrap());
        engine.consume_declarator_identifier();
        engine.begin_rule(Reduction::over(&tokens[1..4]).unwrap());
        engine.consume_declarator_bracketed();
        engine.consume_declarator_with_initializer(false);
        engine.begin_rule(Reduction::over(&tokens).unwrap());
        engine.consume_declaration_simple(true);
        engine.consume_statement_declaration();

        let Some(Item::Node(statement)) = engine.stack.pop() else {
            panic!("no statement");
        };
        expect_test::expect![[r#"
            ExpressionStatement 0..5
              Expression: FunctionCall 0..4
                FunctionName: IdExpression 0..1
                  Name: Name "x" 0..1
                Argument: IdExpression 2..3
                  Name: Name "y" 2..3
        "#]]
        .assert_eq(&dump(engine.ast(), statement));
    }

    #[test]
    fn test_cast_with_qualified_type_is_kept() {
        let kinds = KindMap::identity();
        // (const i) & 1
        let tokens = vec![
            token(TokenKind::LeftParen, "(", 0),
            token(TokenKind::Const, "const", 1),
            token(TokenKind::Identifier, "i", 7),
            token(TokenKind::RightParen, ")", 8),
            token(TokenKind::And, "&", 10),
            token(TokenKind::IntegerConstant, "1", 12),
        ];
        let mut engine = Engine::new(&DefaultNodeFactory, &kinds);

        engine.open_ast_scope();
        engine.begin_rule(Reduction::over(&tokens[1..2]).unwrap());
        engine.consume_token();
        engine.begin_rule(Reduction::over(&tokens[2..3]).unwrap());
        engine.consume_token();
        engine.begin_rule(Reduction::over(&tokens[1..3]).unwrap());
        engine.consume_declaration_specifiers_typedef_name();
        engine.consume_type_id(false);
        engine.begin_rule(Reduction::over(&tokens[5..6]).unwrap());
        engine.consume_expression_literal(LiteralKind::Integer);
        engine.begin_rule(Reduction::over(&tokens[4..6]).unwrap());
        engine.consume_expression_unary(UnaryOp::Amper);
        engine.begin_rule(Reduction::over(&tokens).unwrap());
        engine.consume_expression_cast();

        let Some(Item::Node(expr)) = engine.stack.pop() else {
            panic!("no expression");
        };
        assert_eq!(*engine.ast().kind(expr), NodeKind::Cast);
    }
}
