//! Type ids, pointers and the incremental declarator assembly.
//!
//! Array and function suffixes reduce one at a time onto the declarator
//! built so far, so the merged node's range runs from the base's start to
//! the suffix's end instead of following the production's tokens.

use tracing::warn;

use crate::ast::{NodeId, NodeKind, Qualifiers, Role};
use crate::tokens::TokenKind;

use super::{Engine, Item};

/// Shape of the declarator a suffix is merged onto.
enum Base {
    /// `( declarator )`: carries the inner declarator
    Nested(NodeId),
    ArrayDeclarator,
    /// Plain declarator, possibly unnamed
    Named(Option<NodeId>),
    Invalid,
}

impl<'a> Engine<'a> {
    /// `specifier-qualifier-list abstract-declarator?`
    pub fn consume_type_id(&mut self, has_declarator: bool) {
        let declarator = has_declarator.then(|| self.pop_declarator());
        let decl_spec = self.pop_decl_specifier();
        let type_id = self.factory.new_type_id(&mut self.ast);
        self.ast.attach(type_id, decl_spec, Role::DeclSpecifier);
        self.link(type_id, declarator, Role::Declarator);
        self.set_rule_range(type_id);
        self.push(type_id);
    }

    pub fn consume_pointer(&mut self) {
        let pointer = self.factory.new_pointer(&mut self.ast);
        self.set_rule_range(pointer);
        self.push(pointer);
    }

    /// `* type-qualifier-list`: the qualifiers were pushed as tokens in
    /// their own scope.
    pub fn consume_pointer_type_qualifier_list(&mut self) {
        let qualifiers = self.collect_qualifiers();
        let pointer = self.pop_node();
        match &mut self.ast[pointer].kind {
            NodeKind::Pointer { qualifiers: slot } => *slot = qualifiers,
            other => panic!("expected a pointer, found {other}"),
        }
        self.set_rule_range(pointer);
        self.push(pointer);
    }

    /// Splices the pointer scope onto the declarator that follows it, or onto
    /// a fresh unnamed declarator for an abstract `*` sequence.
    pub fn consume_declarator_with_pointer(&mut self, has_declarator: bool) {
        let declarator = if has_declarator {
            self.pop_declarator()
        } else {
            self.factory.new_declarator(&mut self.ast)
        };
        for pointer in self.close_scope_nodes() {
            let pointer = self.narrow(pointer, "pointer", |kind| {
                matches!(kind, NodeKind::Pointer { .. })
            });
            self.ast.attach(declarator, pointer, Role::Pointer);
        }
        self.set_rule_range(declarator);
        self.push(declarator);
    }

    pub fn consume_declarator_identifier(&mut self) {
        let name = self.create_name(self.rule_right());
        let declarator = self.factory.new_declarator(&mut self.ast);
        self.ast.attach(declarator, name, Role::Name);
        self.set_rule_range(declarator);
        self.push(declarator);
    }

    /// `( declarator )`
    pub fn consume_declarator_bracketed(&mut self) {
        let nested = self.pop_declarator();
        let declarator = self.factory.new_declarator(&mut self.ast);
        self.ast.attach(declarator, nested, Role::Nested);
        self.set_rule_range(declarator);
        self.push(declarator);
    }

    /// `[ expression? ]`
    pub fn consume_array_modifier(&mut self, has_expr: bool) {
        let expr = has_expr.then(|| self.pop_expression());
        let modifier = self.factory.new_array_modifier(&mut self.ast);
        self.link(modifier, expr, Role::Expression);
        self.set_rule_range(modifier);
        self.push(modifier);
    }

    /// C99 array modifier with `static`, `*` or a qualifier scope.
    pub fn consume_array_modifier_modified(
        &mut self,
        is_static: bool,
        is_var_sized: bool,
        has_qualifiers: bool,
        has_expr: bool,
    ) {
        let expr = has_expr.then(|| self.pop_expression());
        let qualifiers = if has_qualifiers {
            self.collect_qualifiers()
        } else {
            Qualifiers::default()
        };
        let modifier = self.factory.new_array_modifier(&mut self.ast);
        if let NodeKind::ArrayModifier {
            qualifiers: slot,
            is_static: static_slot,
            is_var_sized: var_slot,
        } = &mut self.ast[modifier].kind
        {
            *slot = qualifiers;
            *static_slot = is_static;
            *var_slot = is_var_sized;
        }
        self.link(modifier, expr, Role::Expression);
        self.set_rule_range(modifier);
        self.push(modifier);
    }

    /// Merges one `[...]` suffix onto the declarator below it.
    pub fn consume_declarator_array(&mut self, has_base: bool) {
        let modifier = self.pop_node();
        let modifier = self.narrow(modifier, "array modifier", |kind| {
            matches!(kind, NodeKind::ArrayModifier { .. })
        });
        let modifier_end = self.ast.range(modifier).end();

        if !has_base {
            let declarator = self.factory.new_array_declarator(&mut self.ast);
            self.ast.attach(declarator, modifier, Role::ArrayModifier);
            self.set_rule_range(declarator);
            self.push(declarator);
            return;
        }

        let base = self.pop_declarator();
        let base_start = self.ast.range(base).start();
        let declarator = match self.classify_base(base) {
            Base::ArrayDeclarator => {
                self.ast.attach(base, modifier, Role::ArrayModifier);
                self.set_span(base, base_start, modifier_end);
                base
            }
            Base::Nested(nested) => {
                let declarator = self.factory.new_array_declarator(&mut self.ast);
                self.ast.attach(declarator, nested, Role::Nested);
                self.ast.attach(declarator, modifier, Role::ArrayModifier);
                self.set_span(declarator, base_start, modifier_end);
                declarator
            }
            Base::Named(name) => {
                let declarator = self.factory.new_array_declarator(&mut self.ast);
                let start = name.map_or(base_start, |name| self.ast.range(name).start());
                self.link(declarator, name, Role::Name);
                self.ast.attach(declarator, modifier, Role::ArrayModifier);
                self.set_span(declarator, start, modifier_end);
                declarator
            }
            Base::Invalid => self.invalid_declarator("array"),
        };
        self.push(declarator);
    }

    /// Merges one `( parameters )` suffix onto the declarator below it.
    pub fn consume_declarator_function(&mut self, has_base: bool, has_params: bool, is_var_args: bool) {
        let parameters = if has_params {
            self.close_scope_nodes()
        } else {
            Vec::new()
        };
        let base = has_base.then(|| self.pop_declarator());
        let declarator = self.factory.new_function_declarator(&mut self.ast, is_var_args);
        let declarator = match base {
            Some(base) => self.merge_function_base(base, declarator),
            None => {
                self.set_rule_range(declarator);
                declarator
            }
        };
        for parameter in parameters {
            let parameter = self.narrow(parameter, "parameter declaration", |kind| {
                *kind == NodeKind::ParameterDeclaration
            });
            self.attach_unless_problem(declarator, parameter, Role::Parameter);
        }
        self.push(declarator);
    }

    /// K&R `name ( identifier-list )`; the names stay unresolved until the
    /// definition's declaration list is seen.
    pub fn consume_declarator_function_knr(&mut self) {
        let names = self.close_scope_nodes();
        let base = self.pop_declarator();
        let declarator = self.factory.new_knr_function_declarator(&mut self.ast);
        let declarator = self.merge_function_base(base, declarator);
        for name in names {
            let name = self.narrow(name, "name", |kind| matches!(kind, NodeKind::Name { .. }));
            self.attach_unless_problem(declarator, name, Role::KnrParameterName);
        }
        self.push(declarator);
    }

    /// `declarator` or `declarator = initializer`
    pub fn consume_declarator_with_initializer(&mut self, has_initializer: bool) {
        if !has_initializer {
            return;
        }
        let initializer = self.pop_initializer();
        let declarator = self.pop_declarator();
        self.ast.attach(declarator, initializer, Role::Initializer);
        self.set_rule_range(declarator);
        self.push(declarator);
    }

    /// `declarator? : constant-expression`
    pub fn consume_bit_field(&mut self, has_declarator: bool) {
        let size = self.pop_expression();
        let declarator = has_declarator.then(|| self.pop_declarator());
        let field = self.factory.new_field_declarator(&mut self.ast);
        if let Some(declarator) = declarator {
            let moved: Vec<NodeId> = self
                .ast
                .children(declarator)
                .iter()
                .copied()
                .filter(|&child| matches!(self.ast.role(child), Role::Name | Role::Pointer))
                .collect();
            for child in moved {
                let role = self.ast.role(child);
                self.ast.attach(field, child, role);
            }
        }
        self.ast.attach(field, size, Role::BitFieldSize);
        self.set_rule_range(field);
        self.push(field);
    }

    fn merge_function_base(&mut self, base: NodeId, declarator: NodeId) -> NodeId {
        let base_start = self.ast.range(base).start();
        let end = self.rule_range.end();
        match self.classify_base(base) {
            Base::Nested(nested) => {
                self.ast.attach(declarator, nested, Role::Nested);
                self.set_span(declarator, base_start, end);
                declarator
            }
            Base::Named(name) => {
                let start = name.map_or(base_start, |name| self.ast.range(name).start());
                self.link(declarator, name, Role::Name);
                self.set_span(declarator, start, end);
                declarator
            }
            Base::ArrayDeclarator | Base::Invalid => self.invalid_declarator("function"),
        }
    }

    /// Suffix parts are dropped when the merge produced a problem node.
    fn attach_unless_problem(&mut self, declarator: NodeId, child: NodeId, role: Role) {
        if !self.ast.kind(declarator).is_problem() {
            self.ast.attach(declarator, child, role);
        }
    }

    fn classify_base(&self, base: NodeId) -> Base {
        match self.ast.kind(base) {
            NodeKind::ArrayDeclarator => Base::ArrayDeclarator,
            NodeKind::Declarator => {
                let has_pointers = self.ast.child(base, Role::Pointer).is_some();
                match self.ast.child(base, Role::Nested) {
                    Some(_) if has_pointers => Base::Invalid,
                    Some(nested) => Base::Nested(nested),
                    None if has_pointers => Base::Invalid,
                    None => Base::Named(self.ast.child(base, Role::Name)),
                }
            }
            _ => Base::Invalid,
        }
    }

    fn invalid_declarator(&mut self, suffix: &str) -> NodeId {
        warn!(suffix, range = ?self.rule_range, "suffix on a declarator that cannot take it");
        self.encountered_recoverable_problem = true;
        self.problem()
    }

    /// Closes a scope of `const` / `volatile` / `restrict` tokens.
    fn collect_qualifiers(&mut self) -> Qualifiers {
        let mut qualifiers = Qualifiers::default();
        for item in self.close_scope() {
            let Item::Token(token) = item else {
                panic!("expected a qualifier token, found {item:?}");
            };
            match self.token_kind(token) {
                TokenKind::Const => qualifiers.is_const = true,
                TokenKind::Volatile => qualifiers.is_volatile = true,
                TokenKind::Restrict => qualifiers.is_restrict = true,
                other => panic!("expected a type qualifier, found {other}"),
            }
        }
        qualifiers
    }
}

#[cfg(test)]
mod tests {
    use text_size::TextRange;

    use super::super::tests::token;
    use super::super::Reduction;
    use super::*;
    use crate::ast::dump::dump;
    use crate::factory::DefaultNodeFactory;
    use crate::tokens::KindMap;

    #[test]
    fn test_array_suffixes_accumulate() {
        let kinds = KindMap::identity();
        // a[1][2]
        let tokens = vec![
            token(TokenKind::Identifier, "a", 0),
            token(TokenKind::LeftBracket, "[", 1),
            token(TokenKind::IntegerConstant, "1", 2),
            token(TokenKind::RightBracket, "]", 3),
            token(TokenKind::LeftBracket, "[", 4),
            token(TokenKind::IntegerConstant, "2", 5),
            token(TokenKind::RightBracket, "]", 6),
        ];
        let mut engine = Engine::new(&DefaultNodeFactory, &kinds);

        engine.begin_rule(Reduction::over(&tokens[0..1]).unwrap());
        engine.consume_declarator_identifier();
        engine.begin_rule(Reduction::over(&tokens[2..3]).unwrap());
        engine.consume_expression_literal(crate::ast::LiteralKind::Integer);
        engine.begin_rule(Reduction::over(&tokens[1..4]).unwrap());
        engine.consume_array_modifier(true);
        engine.begin_rule(Reduction::over(&tokens[0..4]).unwrap());
        engine.consume_declarator_array(true);
        engine.begin_rule(Reduction::over(&tokens[5..6]).unwrap());
        engine.consume_expression_literal(crate::ast::LiteralKind::Integer);
        engine.begin_rule(Reduction::over(&tokens[4..7]).unwrap());
        engine.consume_array_modifier(true);
        // Reduced over the suffix alone; the merged range still covers the base.
        engine.consume_declarator_array(true);

        let Some(Item::Node(declarator)) = engine.stack.pop() else {
            panic!("no declarator");
        };
        assert_eq!(engine.ast().range(declarator), TextRange::new(0.into(), 7.into()));
        expect_test::expect![[r#"
            ArrayDeclarator 0..7
              Name: Name "a" 0..1
              ArrayModifier: ArrayModifier 1..4
                Expression: Literal(Integer) 1 2..3
              ArrayModifier: ArrayModifier 4..7
                Expression: Literal(Integer) 2 5..6
        "#]]
        .assert_eq(&dump(engine.ast(), declarator));
        assert!(!engine.encountered_recoverable_problem());
    }

    #[test]
    fn test_array_on_function_is_a_problem() {
        let kinds = KindMap::identity();
        // f()[]
        let tokens = vec![
            token(TokenKind::Identifier, "f", 0),
            token(TokenKind::LeftParen, "(", 1),
            token(TokenKind::RightParen, ")", 2),
            token(TokenKind::LeftBracket, "[", 3),
            token(TokenKind::RightBracket, "]", 4),
        ];
        let mut engine = Engine::new(&DefaultNodeFactory, &kinds);

        engine.begin_rule(Reduction::over(&tokens[0..1]).unwrap());
        engine.consume_declarator_identifier();
        engine.begin_rule(Reduction::over(&tokens[0..3]).unwrap());
        engine.consume_declarator_function(true, false, false);
        engine.begin_rule(Reduction::over(&tokens[3..5]).unwrap());
        engine.consume_array_modifier(false);
        engine.begin_rule(Reduction::over(&tokens).unwrap());
        engine.consume_declarator_array(true);

        let Some(Item::Node(problem)) = engine.stack.pop() else {
            panic!("no node");
        };
        assert!(engine.ast().kind(problem).is_problem());
        assert!(engine.encountered_recoverable_problem());
    }

    #[test]
    fn test_pointer_to_function() {
        let kinds = KindMap::identity();
        // (*fp)(void x)  simplified to (*fp)()
        let tokens = vec![
            token(TokenKind::LeftParen, "(", 0),
            token(TokenKind::Star, "*", 1),
            token(TokenKind::Identifier, "fp", 2),
            token(TokenKind::RightParen, ")", 4),
            token(TokenKind::LeftParen, "(", 5),
            token(TokenKind::RightParen, ")", 6),
        ];
        let mut engine = Engine::new(&DefaultNodeFactory, &kinds);

        engine.open_ast_scope();
        engine.begin_rule(Reduction::over(&tokens[1..2]).unwrap());
        engine.consume_pointer();
        engine.begin_rule(Reduction::over(&tokens[2..3]).unwrap());
        engine.consume_declarator_identifier();
        engine.begin_rule(Reduction::over(&tokens[1..3]).unwrap());
        engine.consume_declarator_with_pointer(true);
        engine.begin_rule(Reduction::over(&tokens[0..4]).unwrap());
        engine.consume_declarator_bracketed();
        engine.begin_rule(Reduction::over(&tokens).unwrap());
        engine.consume_declarator_function(true, false, false);

        let Some(Item::Node(declarator)) = engine.stack.pop() else {
            panic!("no declarator");
        };
        expect_test::expect![[r#"
            FunctionDeclarator 0..7
              Nested: Declarator 1..4
                Name: Name "fp" 2..4
                Pointer: Pointer 1..2
        "#]]
        .assert_eq(&dump(engine.ast(), declarator));
    }
}
