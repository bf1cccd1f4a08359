use crate::engine::Engine;
use crate::tokens::TokenKind;

use super::{Driver, Guard, PResult, Recovery};

impl<'a> Driver<'a> {
    /// Parse `{ block-item* }`
    pub(super) fn parse_compound_statement(&mut self) -> PResult<()> {
        let start = self.position;
        self.expect_token(TokenKind::LeftBrace, "to open a block")?;
        self.open_scope();
        while !self.check(TokenKind::RightBrace) && !self.is_at_end() {
            self.parse_block_item();
        }
        self.expect_token(TokenKind::RightBrace, "to close a block")?;
        self.reduce(start, Engine::consume_statement_compound);
        Ok(())
    }

    /// One declaration or statement; a malformed one becomes a problem
    /// statement covering the skipped tokens.
    fn parse_block_item(&mut self) {
        let start = self.position;
        if !self.guarded(Guard::BlockItem, Self::block_item) {
            self.recover(start, Recovery::Statement);
        }
    }

    fn block_item(&mut self) -> PResult<()> {
        if !self.starts_block_declaration() {
            return self.parse_statement();
        }
        let start = self.position;
        self.parse_declaration()?;
        self.reduce(start, Engine::consume_statement_declaration);
        Ok(())
    }

    pub(super) fn parse_statement(&mut self) -> PResult<()> {
        let start = self.position;
        match self.peek_kind() {
            TokenKind::LeftBrace => self.parse_compound_statement(),
            TokenKind::SemiColon => {
                self.advance();
                self.reduce(start, Engine::consume_statement_null);
                Ok(())
            }
            TokenKind::If => self.parse_if_statement(),
            TokenKind::Switch => self.parse_switch_statement(),
            TokenKind::While => self.parse_while_statement(),
            TokenKind::Do => self.parse_do_while_statement(),
            TokenKind::For => self.parse_for_statement(),
            TokenKind::Break => self.parse_jump(Engine::consume_statement_break),
            TokenKind::Continue => self.parse_jump(Engine::consume_statement_continue),
            TokenKind::Goto => {
                self.advance();
                self.expect_identifier()?;
                self.expect_token(TokenKind::SemiColon, "after goto")?;
                self.reduce(start, Engine::consume_statement_goto);
                Ok(())
            }
            TokenKind::Return => self.parse_return_statement(),
            TokenKind::Case => {
                self.advance();
                self.parse_conditional()?;
                self.expect_token(TokenKind::Colon, "after case label")?;
                self.parse_statement()?;
                self.reduce(start, Engine::consume_statement_case);
                Ok(())
            }
            TokenKind::Default => {
                self.advance();
                self.expect_token(TokenKind::Colon, "after 'default'")?;
                self.parse_statement()?;
                self.reduce(start, Engine::consume_statement_default);
                Ok(())
            }
            TokenKind::Identifier if self.peek_kind_ahead(1) == TokenKind::Colon => {
                self.advance();
                self.advance();
                self.parse_statement()?;
                self.reduce(start, Engine::consume_statement_label);
                Ok(())
            }
            _ => {
                self.parse_expression()?;
                self.expect_token(TokenKind::SemiColon, "after expression")?;
                self.reduce(start, Engine::consume_statement_expression);
                Ok(())
            }
        }
    }

    /// `break ;` and `continue ;`
    fn parse_jump(&mut self, action: fn(&mut Engine<'a>)) -> PResult<()> {
        let start = self.position;
        self.advance();
        self.expect_token(TokenKind::SemiColon, "after jump")?;
        self.reduce(start, action);
        Ok(())
    }

    fn parse_return_statement(&mut self) -> PResult<()> {
        let start = self.position;
        self.advance();
        let has_expr = !self.check(TokenKind::SemiColon);
        if has_expr {
            self.parse_expression()?;
        }
        self.expect_token(TokenKind::SemiColon, "after return")?;
        self.reduce(start, move |engine| engine.consume_statement_return(has_expr));
        Ok(())
    }

    /// Parse `( expression )` after a keyword
    fn parse_condition(&mut self, keyword: &str) -> PResult<()> {
        self.expect_token(TokenKind::LeftParen, &format!("after '{keyword}'"))?;
        self.parse_expression()?;
        self.expect_token(TokenKind::RightParen, &format!("after {keyword} condition"))
    }

    fn parse_if_statement(&mut self) -> PResult<()> {
        let start = self.position;
        self.advance();
        self.parse_condition("if")?;
        self.parse_statement()?;
        let has_else = self.match_token(TokenKind::Else);
        if has_else {
            self.parse_statement()?;
        }
        self.reduce(start, move |engine| engine.consume_statement_if(has_else));
        Ok(())
    }

    fn parse_switch_statement(&mut self) -> PResult<()> {
        let start = self.position;
        self.advance();
        self.parse_condition("switch")?;
        self.parse_statement()?;
        self.reduce(start, Engine::consume_statement_switch);
        Ok(())
    }

    fn parse_while_statement(&mut self) -> PResult<()> {
        let start = self.position;
        self.advance();
        self.parse_condition("while")?;
        self.parse_statement()?;
        self.reduce(start, Engine::consume_statement_while);
        Ok(())
    }

    fn parse_do_while_statement(&mut self) -> PResult<()> {
        let start = self.position;
        self.advance();
        self.parse_statement()?;
        self.expect_token(TokenKind::While, "after do body")?;
        self.parse_condition("while")?;
        self.expect_token(TokenKind::SemiColon, "after do-while")?;
        self.reduce(start, Engine::consume_statement_do);
        Ok(())
    }

    /// Parse `for ( init? ; condition? ; increment? ) statement`, where the
    /// init is a declaration or an expression.
    fn parse_for_statement(&mut self) -> PResult<()> {
        let start = self.position;
        self.advance();
        self.expect_token(TokenKind::LeftParen, "after 'for'")?;

        let has_init = if self.match_token(TokenKind::SemiColon) {
            false
        } else if self.starts_for_init_declaration() {
            self.parse_declaration()?;
            true
        } else {
            self.parse_expression()?;
            self.expect_token(TokenKind::SemiColon, "after for initializer")?;
            true
        };

        let has_condition = !self.check(TokenKind::SemiColon);
        if has_condition {
            self.parse_expression()?;
        }
        self.expect_token(TokenKind::SemiColon, "after for condition")?;

        let has_increment = !self.check(TokenKind::RightParen);
        if has_increment {
            self.parse_expression()?;
        }
        self.expect_token(TokenKind::RightParen, "after for clauses")?;

        self.parse_statement()?;
        self.reduce(start, move |engine| {
            engine.consume_statement_for(has_init, has_condition, has_increment)
        });
        Ok(())
    }

    fn starts_for_init_declaration(&self) -> bool {
        self.at_declaration_specifier_start()
            || (self.check(TokenKind::Identifier)
                && self.peek_kind_ahead(1) == TokenKind::Identifier)
    }
}

#[cfg(test)]
mod tests {
    use super::super::tests::parse_dump;

    #[test]
    fn test_control_flow_statements() {
        let (tree, has_error) =
            parse_dump("void f(int n) { for (int i = 0; i < n; i++) if (i) continue; else break; }");
        expect_test::expect![[r#"
            TranslationUnit 0..74
              Declaration: FunctionDefinition 0..74
                DeclSpecifier: SimpleDeclSpecifier(void) 0..4
                Declarator: FunctionDeclarator 5..13
                  Name: Name "f" 5..6
                  Parameter: ParameterDeclaration 7..12
                    DeclSpecifier: SimpleDeclSpecifier(int) 7..10
                    Declarator: Declarator 11..12
                      Name: Name "n" 11..12
                Body: CompoundStatement 14..74
                  Statement: ForStatement 16..72
                    Init: DeclarationStatement 21..31
                      Declaration: SimpleDeclaration 21..31
                        DeclSpecifier: SimpleDeclSpecifier(int) 21..24
                        Declarator: Declarator 25..30
                          Name: Name "i" 25..26
                          Initializer: EqualsInitializer 29..30
                            Expression: Literal(Integer) 0 29..30
                    Condition: Binary(LessThan) 32..37
                      Operand1: IdExpression 32..33
                        Name: Name "i" 32..33
                      Operand2: IdExpression 36..37
                        Name: Name "n" 36..37
                    Iteration: Unary(PostfixIncr) 39..42
                      Operand: IdExpression 39..40
                        Name: Name "i" 39..40
                    Body: IfStatement 44..72
                      Condition: IdExpression 48..49
                        Name: Name "i" 48..49
                      Then: ContinueStatement 51..60
                      Else: BreakStatement 66..72
        "#]]
        .assert_eq(&tree);
        assert!(!has_error);
    }

    #[test]
    fn test_labels_and_switch_own_their_bodies() {
        let (tree, _) = parse_dump("void f() { switch (x) { case 1: y(); default: ; } out: return; }");
        expect_test::expect![[r#"
            TranslationUnit 0..64
              Declaration: FunctionDefinition 0..64
                DeclSpecifier: SimpleDeclSpecifier(void) 0..4
                Declarator: FunctionDeclarator 5..8
                  Name: Name "f" 5..6
                Body: CompoundStatement 9..64
                  Statement: SwitchStatement 11..49
                    Condition: IdExpression 19..20
                      Name: Name "x" 19..20
                    Body: CompoundStatement 22..49
                      Statement: CaseStatement 24..36
                        Expression: Literal(Integer) 1 29..30
                        Body: ExpressionStatement 32..36
                          Expression: FunctionCall 32..35
                            FunctionName: IdExpression 32..33
                              Name: Name "y" 32..33
                      Statement: DefaultStatement 37..47
                        Body: NullStatement 46..47
                  Statement: LabelStatement 50..62
                    Name: Name "out" 50..53
                    Body: ReturnStatement 55..62
        "#]]
        .assert_eq(&tree);
    }
}
