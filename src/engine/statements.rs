use crate::ast::{NodeId, NodeKind, Role};

use super::Engine;

impl<'a> Engine<'a> {
    /// `{ block-item* }`
    pub fn consume_statement_compound(&mut self) {
        let items = self.close_scope_nodes();
        let compound = self.factory.new_compound_statement(&mut self.ast);
        for item in items {
            let item = self.narrow(item, "statement", NodeKind::is_statement);
            self.ast.attach(compound, item, Role::Statement);
        }
        self.set_rule_range(compound);
        self.push(compound);
    }

    pub fn consume_statement_expression(&mut self) {
        let expr = self.pop_expression();
        let statement = self.factory.new_expression_statement(&mut self.ast);
        self.ast.attach(statement, expr, Role::Expression);
        self.set_rule_range(statement);
        self.push(statement);
    }

    /// Declaration used as a block item. A bare `i;` or `f(x);` whose
    /// specifier is only a typedef name is rewritten to the expression reading.
    pub fn consume_statement_declaration(&mut self) {
        let declaration = self.pop_node();
        let declaration = self.narrow(declaration, "declaration", NodeKind::is_declaration);
        let statement = match self.resolve_declaration_statement(declaration) {
            Some(statement) => statement,
            None => {
                let statement = self.factory.new_declaration_statement(&mut self.ast);
                self.ast.attach(statement, declaration, Role::Declaration);
                statement
            }
        };
        self.set_rule_range(statement);
        self.push(statement);
    }

    pub fn consume_statement_null(&mut self) {
        let statement = self.factory.new_null_statement(&mut self.ast);
        self.set_rule_range(statement);
        self.push(statement);
    }

    pub fn consume_statement_if(&mut self, has_else: bool) {
        let negative = has_else.then(|| self.pop_statement());
        let positive = self.pop_statement();
        let condition = self.pop_expression();
        let statement = self.factory.new_if_statement(&mut self.ast);
        self.ast.attach(statement, condition, Role::Condition);
        self.ast.attach(statement, positive, Role::Then);
        self.link(statement, negative, Role::Else);
        self.set_rule_range(statement);
        self.push(statement);
    }

    pub fn consume_statement_switch(&mut self) {
        let body = self.pop_statement();
        let controller = self.pop_expression();
        let statement = self.factory.new_switch_statement(&mut self.ast);
        self.ast.attach(statement, controller, Role::Condition);
        self.ast.attach(statement, body, Role::Body);
        self.set_rule_range(statement);
        self.push(statement);
    }

    pub fn consume_statement_while(&mut self) {
        let body = self.pop_statement();
        let condition = self.pop_expression();
        let statement = self.factory.new_while_statement(&mut self.ast);
        self.ast.attach(statement, condition, Role::Condition);
        self.ast.attach(statement, body, Role::Body);
        self.set_rule_range(statement);
        self.push(statement);
    }

    /// `do body while ( condition ) ;`
    pub fn consume_statement_do(&mut self) {
        let condition = self.pop_expression();
        let body = self.pop_statement();
        let statement = self.factory.new_do_statement(&mut self.ast);
        self.ast.attach(statement, body, Role::Body);
        self.ast.attach(statement, condition, Role::Condition);
        self.set_rule_range(statement);
        self.push(statement);
    }

    /// `for ( init? ; condition? ; increment? ) body`. An expression or a
    /// declaration in the init slot is wrapped in the matching statement.
    pub fn consume_statement_for(&mut self, has_init: bool, has_condition: bool, has_increment: bool) {
        let body = self.pop_statement();
        let increment = has_increment.then(|| self.pop_expression());
        let condition = has_condition.then(|| self.pop_expression());
        let init = has_init.then(|| self.pop_node());
        let init = init.map(|init| self.wrap_for_init(init));

        let statement = self.factory.new_for_statement(&mut self.ast);
        self.link(statement, init, Role::Init);
        self.link(statement, condition, Role::Condition);
        self.link(statement, increment, Role::Iteration);
        self.ast.attach(statement, body, Role::Body);
        self.set_rule_range(statement);
        self.push(statement);
    }

    pub fn consume_statement_break(&mut self) {
        let statement = self.factory.new_break_statement(&mut self.ast);
        self.set_rule_range(statement);
        self.push(statement);
    }

    pub fn consume_statement_continue(&mut self) {
        let statement = self.factory.new_continue_statement(&mut self.ast);
        self.set_rule_range(statement);
        self.push(statement);
    }

    /// `goto label ;`
    pub fn consume_statement_goto(&mut self) {
        let name = self.create_name(self.rule_token(1));
        let statement = self.factory.new_goto_statement(&mut self.ast);
        self.ast.attach(statement, name, Role::Name);
        self.set_rule_range(statement);
        self.push(statement);
    }

    pub fn consume_statement_return(&mut self, has_expr: bool) {
        let value = has_expr.then(|| self.pop_expression());
        let statement = self.factory.new_return_statement(&mut self.ast);
        self.link(statement, value, Role::ReturnValue);
        self.set_rule_range(statement);
        self.push(statement);
    }

    /// `label : statement`
    pub fn consume_statement_label(&mut self) {
        let body = self.pop_statement();
        let name = self.create_name(self.rule_token(0));
        let statement = self.factory.new_label_statement(&mut self.ast);
        self.ast.attach(statement, name, Role::Name);
        self.ast.attach(statement, body, Role::Body);
        self.set_rule_range(statement);
        self.push(statement);
    }

    /// `case constant-expression : statement`
    pub fn consume_statement_case(&mut self) {
        let body = self.pop_statement();
        let expr = self.pop_expression();
        let statement = self.factory.new_case_statement(&mut self.ast);
        self.ast.attach(statement, expr, Role::Expression);
        self.ast.attach(statement, body, Role::Body);
        self.set_rule_range(statement);
        self.push(statement);
    }

    /// `default : statement`
    pub fn consume_statement_default(&mut self) {
        let body = self.pop_statement();
        let statement = self.factory.new_default_statement(&mut self.ast);
        self.ast.attach(statement, body, Role::Body);
        self.set_rule_range(statement);
        self.push(statement);
    }

    fn wrap_for_init(&mut self, init: NodeId) -> NodeId {
        let kind = self.ast.kind(init);
        let is_expression = kind.is_expression();
        if !is_expression && !kind.is_declaration() && !kind.is_problem() {
            panic!("expected a for-init expression or declaration, found {kind}");
        }
        let (statement, role) = if is_expression {
            (self.factory.new_expression_statement(&mut self.ast), Role::Expression)
        } else {
            (self.factory.new_declaration_statement(&mut self.ast), Role::Declaration)
        };
        let range = self.ast.range(init);
        self.ast.attach(statement, init, role);
        self.ast.set_range(statement, range);
        statement
    }
}

#[cfg(test)]
mod tests {
    use super::super::tests::token;
    use super::super::{Item, Reduction};
    use super::*;
    use crate::ast::dump::dump;
    use crate::factory::DefaultNodeFactory;
    use crate::tokens::{KindMap, TokenKind};

    #[test]
    fn test_compound_keeps_source_order() {
        let kinds = KindMap::identity();
        // { ; break; }
        let tokens = vec![
            token(TokenKind::LeftBrace, "{", 0),
            token(TokenKind::SemiColon, ";", 2),
            token(TokenKind::Break, "break", 4),
            token(TokenKind::SemiColon, ";", 9),
            token(TokenKind::RightBrace, "}", 11),
        ];
        let mut engine = Engine::new(&DefaultNodeFactory, &kinds);

        engine.open_ast_scope();
        engine.begin_rule(Reduction::over(&tokens[1..2]).unwrap());
        engine.consume_statement_null();
        engine.begin_rule(Reduction::over(&tokens[2..4]).unwrap());
        engine.consume_statement_break();
        engine.begin_rule(Reduction::over(&tokens).unwrap());
        engine.consume_statement_compound();

        let Some(Item::Node(compound)) = engine.stack.pop() else {
            panic!("no statement");
        };
        expect_test::expect![[r#"
            CompoundStatement 0..12
              Statement: NullStatement 2..3
              Statement: BreakStatement 4..10
        "#]]
        .assert_eq(&dump(engine.ast(), compound));
    }

    #[test]
    fn test_goto_and_label_names() {
        let kinds = KindMap::identity();
        // out: goto out;
        let tokens = vec![
            token(TokenKind::Identifier, "out", 0),
            token(TokenKind::Colon, ":", 3),
            token(TokenKind::Goto, "goto", 5),
            token(TokenKind::Identifier, "out", 10),
            token(TokenKind::SemiColon, ";", 13),
        ];
        let mut engine = Engine::new(&DefaultNodeFactory, &kinds);

        engine.begin_rule(Reduction::over(&tokens[2..5]).unwrap());
        engine.consume_statement_goto();
        engine.begin_rule(Reduction::over(&tokens).unwrap());
        engine.consume_statement_label();

        let Some(Item::Node(label)) = engine.stack.pop() else {
            panic!("no statement");
        };
        expect_test::expect![[r#"
            LabelStatement 0..14
              Name: Name "out" 0..3
              Body: GotoStatement 5..14
                Name: Name "out" 10..13
        "#]]
        .assert_eq(&dump(engine.ast(), label));
    }
}
