use crate::ast::ElaboratedKind;
use crate::engine::Engine;
use crate::tokens::TokenKind;

use super::{DeclaratorMode, Driver, PResult};

/// Which specifier action closes the specifier scope.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SpecifierShape {
    Simple,
    StructUnionEnum,
    TypedefName,
}

impl<'a> Driver<'a> {
    /// Parse `specifiers init-declarator-list? ;`
    pub(super) fn parse_declaration(&mut self) -> PResult<()> {
        let start = self.position;
        let is_typedef = self.parse_declaration_specifiers()?;

        let has_declarators = !self.check(TokenKind::SemiColon);
        if has_declarators {
            self.open_scope();
            loop {
                self.parse_init_declarator(is_typedef)?;
                if !self.match_token(TokenKind::Comma) {
                    break;
                }
            }
        }
        self.expect_token(TokenKind::SemiColon, "after declaration")?;
        self.reduce(start, move |engine| {
            engine.consume_declaration_simple(has_declarators)
        });
        Ok(())
    }

    /// Parse `declarator` or `declarator = initializer`, learning the name
    /// when the declaration is a typedef.
    fn parse_init_declarator(&mut self, is_typedef: bool) -> PResult<()> {
        let start = self.position;
        self.declarator_name = None;
        self.parse_declarator(DeclaratorMode::Named)?;
        if is_typedef {
            if let Some(name) = self.declarator_name {
                self.typedefs.insert(name);
            }
        }

        let has_initializer = self.match_token(TokenKind::Assign);
        if has_initializer {
            self.parse_initializer()?;
        }
        self.reduce(start, move |engine| {
            engine.consume_declarator_with_initializer(has_initializer)
        });
        Ok(())
    }

    /// Parse declaration specifiers into one specifier node. Returns whether
    /// `typedef` was among them.
    ///
    /// An identifier is taken as a typedef name when no type has been seen
    /// yet and it is not directly followed by `=`, `[`, `,` or `:`.
    pub(super) fn parse_declaration_specifiers(&mut self) -> PResult<bool> {
        let start = self.position;
        self.open_scope();

        let mut shape = SpecifierShape::Simple;
        let mut is_typedef = false;
        let mut has_type = false;
        loop {
            let kind = self.peek_kind();
            if kind.is_simple_specifier() {
                is_typedef |= kind == TokenKind::Typedef;
                has_type |= kind.is_arithmetic_type();
                self.advance();
                self.push_token();
            } else if !has_type && matches!(kind, TokenKind::Struct | TokenKind::Union) {
                self.parse_struct_or_union_specifier()?;
                has_type = true;
                shape = SpecifierShape::StructUnionEnum;
            } else if !has_type && kind == TokenKind::Enum {
                self.parse_enum_specifier()?;
                has_type = true;
                shape = SpecifierShape::StructUnionEnum;
            } else if !has_type && kind == TokenKind::Identifier && self.identifier_names_type() {
                self.advance();
                self.push_token();
                has_type = true;
                shape = SpecifierShape::TypedefName;
            } else {
                break;
            }
        }

        if self.position == start {
            return Err(self.error("declaration specifiers"));
        }
        match shape {
            SpecifierShape::Simple => {
                self.reduce(start, Engine::consume_declaration_specifiers_simple);
            }
            SpecifierShape::StructUnionEnum => {
                self.reduce(start, Engine::consume_declaration_specifiers_struct_union_enum);
            }
            SpecifierShape::TypedefName => {
                self.reduce(start, Engine::consume_declaration_specifiers_typedef_name);
            }
        }
        Ok(is_typedef)
    }

    fn identifier_names_type(&self) -> bool {
        !matches!(
            self.peek_kind_ahead(1),
            TokenKind::Assign | TokenKind::LeftBracket | TokenKind::Comma | TokenKind::Colon
        )
    }

    /// Parse `struct|union name? { member-declarations }` or `struct|union name`
    fn parse_struct_or_union_specifier(&mut self) -> PResult<()> {
        let start = self.position;
        let kind = match self.peek_kind() {
            TokenKind::Union => ElaboratedKind::Union,
            _ => ElaboratedKind::Struct,
        };
        self.advance();
        let has_name = self.parse_tag_name();

        if self.match_token(TokenKind::LeftBrace) {
            self.open_scope();
            while !self.check(TokenKind::RightBrace) && !self.is_at_end() {
                self.parse_struct_declaration()?;
            }
            self.expect_token(TokenKind::RightBrace, "to close the member list")?;
            self.reduce(start, move |engine| {
                engine.consume_type_specifier_composite(has_name)
            });
        } else if has_name {
            self.reduce(start, move |engine| engine.consume_type_specifier_elaborated(kind));
        } else {
            return Err(self.error("a tag name or '{'"));
        }
        Ok(())
    }

    /// Parse `specifier-qualifier-list struct-declarator-list? ;`
    fn parse_struct_declaration(&mut self) -> PResult<()> {
        let start = self.position;
        self.parse_declaration_specifiers()?;

        let has_declarators = !self.check(TokenKind::SemiColon);
        if has_declarators {
            self.open_scope();
            loop {
                self.parse_struct_declarator()?;
                if !self.match_token(TokenKind::Comma) {
                    break;
                }
            }
        }
        self.expect_token(TokenKind::SemiColon, "after member declaration")?;
        self.reduce(start, move |engine| {
            engine.consume_declaration_simple(has_declarators)
        });
        Ok(())
    }

    /// Parse `declarator`, `declarator : width` or `: width`
    fn parse_struct_declarator(&mut self) -> PResult<()> {
        let start = self.position;
        let has_declarator = !self.check(TokenKind::Colon);
        if has_declarator {
            self.parse_declarator(DeclaratorMode::Named)?;
        }
        if self.match_token(TokenKind::Colon) {
            self.parse_conditional()?;
            self.reduce(start, move |engine| engine.consume_bit_field(has_declarator));
        }
        Ok(())
    }

    /// Parse `enum name? { enumerator-list ,? }` or `enum name`
    fn parse_enum_specifier(&mut self) -> PResult<()> {
        let start = self.position;
        self.advance();
        let has_name = self.parse_tag_name();

        if self.match_token(TokenKind::LeftBrace) {
            self.open_scope();
            while !self.check(TokenKind::RightBrace) && !self.is_at_end() {
                let enumerator = self.position;
                self.expect_identifier()?;
                let has_initializer = self.match_token(TokenKind::Assign);
                if has_initializer {
                    self.parse_conditional()?;
                }
                self.reduce(enumerator, move |engine| {
                    engine.consume_enumerator(has_initializer)
                });
                if !self.match_token(TokenKind::Comma) {
                    break;
                }
            }
            self.expect_token(TokenKind::RightBrace, "to close the enumerator list")?;
            self.reduce(start, move |engine| {
                engine.consume_type_specifier_enumeration(has_name)
            });
        } else if has_name {
            self.reduce(start, |engine| {
                engine.consume_type_specifier_elaborated(ElaboratedKind::Enum)
            });
        } else {
            return Err(self.error("a tag name or '{'"));
        }
        Ok(())
    }

    fn parse_tag_name(&mut self) -> bool {
        if !self.check(TokenKind::Identifier) {
            return false;
        }
        let at = self.position;
        self.advance();
        self.reduce(at, Engine::consume_identifier_name);
        true
    }

    // ===== Declarators =====

    /// Parse `pointer* direct-declarator`. Returns false when an abstract
    /// declarator is entirely absent.
    pub(super) fn parse_declarator(&mut self, mode: DeclaratorMode) -> PResult<bool> {
        if !self.check(TokenKind::Star) {
            return self.parse_direct_declarator(mode);
        }

        let start = self.position;
        self.open_scope();
        while self.check(TokenKind::Star) {
            let star = self.position;
            self.advance();
            self.reduce(star, Engine::consume_pointer);

            if self.peek_kind().is_type_qualifier() {
                self.open_scope();
                while self.peek_kind().is_type_qualifier() {
                    self.advance();
                    self.push_token();
                }
                self.reduce(star, Engine::consume_pointer_type_qualifier_list);
            }
        }
        let has_direct = self.parse_direct_declarator(mode)?;
        self.reduce(start, move |engine| {
            engine.consume_declarator_with_pointer(has_direct)
        });
        Ok(true)
    }

    fn parse_direct_declarator(&mut self, mode: DeclaratorMode) -> PResult<bool> {
        let start = self.position;
        let mut has_base = if mode != DeclaratorMode::Abstract && self.check(TokenKind::Identifier) {
            let name = self.expect_identifier()?;
            self.declarator_name.get_or_insert(name.text.as_str());
            self.reduce(start, Engine::consume_declarator_identifier);
            true
        } else if self.check(TokenKind::LeftParen) && self.starts_nested_declarator(mode) {
            self.advance();
            if !self.parse_declarator(mode)? {
                return Err(self.error("a declarator"));
            }
            self.expect_token(TokenKind::RightParen, "to close a declarator")?;
            self.reduce(start, Engine::consume_declarator_bracketed);
            true
        } else if mode == DeclaratorMode::Named {
            return Err(self.error("a declarator"));
        } else {
            false
        };

        loop {
            if self.check(TokenKind::LeftBracket) {
                self.parse_array_modifier()?;
                self.reduce(start, move |engine| engine.consume_declarator_array(has_base));
            } else if self.check(TokenKind::LeftParen) {
                self.parse_function_suffix(start, has_base)?;
            } else {
                break;
            }
            has_base = true;
        }
        Ok(has_base)
    }

    /// Whether the `(` under the cursor opens `( declarator )` rather than a
    /// parameter list.
    fn starts_nested_declarator(&self, mode: DeclaratorMode) -> bool {
        match self.peek_kind_ahead(1) {
            TokenKind::Star | TokenKind::LeftParen => true,
            TokenKind::Identifier => {
                mode != DeclaratorMode::Abstract && !self.is_typedef_name(self.position + 1)
            }
            _ => false,
        }
    }

    /// Parse `[ static? qualifiers? static? (* | expression)? ]`
    fn parse_array_modifier(&mut self) -> PResult<()> {
        let start = self.position;
        self.advance();

        let mut is_static = self.match_token(TokenKind::Static);
        let has_qualifiers = self.peek_kind().is_type_qualifier();
        if has_qualifiers {
            self.open_scope();
            while self.peek_kind().is_type_qualifier() {
                self.advance();
                self.push_token();
            }
        }
        is_static |= self.match_token(TokenKind::Static);

        let is_var_sized =
            self.check(TokenKind::Star) && self.peek_kind_ahead(1) == TokenKind::RightBracket;
        if is_var_sized {
            self.advance();
        }
        let has_expr = !is_var_sized && !self.check(TokenKind::RightBracket);
        if has_expr {
            self.parse_assignment()?;
        }
        self.expect_token(TokenKind::RightBracket, "to close an array declarator")?;

        if is_static || is_var_sized || has_qualifiers {
            self.reduce(start, move |engine| {
                engine.consume_array_modifier_modified(is_static, is_var_sized, has_qualifiers, has_expr)
            });
        } else {
            self.reduce(start, move |engine| engine.consume_array_modifier(has_expr));
        }
        Ok(())
    }

    /// Parse `( parameter-list )` or a K&R `( identifier-list )` after the
    /// declarator that starts at `start`.
    fn parse_function_suffix(&mut self, start: usize, has_base: bool) -> PResult<()> {
        self.advance();

        if has_base && self.at_identifier_list() {
            self.open_scope();
            loop {
                let at = self.position;
                self.expect_identifier()?;
                self.reduce(at, Engine::consume_identifier_knr);
                if !self.match_token(TokenKind::Comma) {
                    break;
                }
            }
            self.expect_token(TokenKind::RightParen, "to close the identifier list")?;
            self.reduce(start, Engine::consume_declarator_function_knr);
            return Ok(());
        }

        let (has_params, is_var_args) = self.parse_parameter_list()?;
        self.expect_token(TokenKind::RightParen, "to close the parameter list")?;
        self.reduce(start, move |engine| {
            engine.consume_declarator_function(has_base, has_params, is_var_args)
        });
        Ok(())
    }

    fn at_identifier_list(&self) -> bool {
        self.check(TokenKind::Identifier)
            && !self.is_typedef_name(self.position)
            && matches!(
                self.peek_kind_ahead(1),
                TokenKind::Comma | TokenKind::RightParen
            )
    }

    /// Returns (has parameters, ends with `...`).
    fn parse_parameter_list(&mut self) -> PResult<(bool, bool)> {
        if self.check(TokenKind::RightParen) {
            return Ok((false, false));
        }

        self.open_scope();
        let mut is_var_args = false;
        loop {
            if self.match_token(TokenKind::DotDotDot) {
                is_var_args = true;
                break;
            }
            self.parse_parameter_declaration()?;
            if !self.match_token(TokenKind::Comma) {
                break;
            }
        }
        Ok((true, is_var_args))
    }

    fn parse_parameter_declaration(&mut self) -> PResult<()> {
        let start = self.position;
        self.parse_declaration_specifiers()?;
        if self.parse_declarator(DeclaratorMode::Either)? {
            self.reduce(start, Engine::consume_parameter_declaration);
        } else {
            self.reduce(start, Engine::consume_parameter_declaration_without_declarator);
        }
        Ok(())
    }

    /// Parse `specifier-qualifier-list abstract-declarator?`
    pub(super) fn parse_type_name(&mut self) -> PResult<()> {
        let start = self.position;
        self.parse_declaration_specifiers()?;
        let has_declarator = self.parse_declarator(DeclaratorMode::Abstract)?;
        self.reduce(start, move |engine| engine.consume_type_id(has_declarator));
        Ok(())
    }

    // ===== Initializers =====

    fn parse_initializer(&mut self) -> PResult<()> {
        if self.check(TokenKind::LeftBrace) {
            return self.parse_initializer_list();
        }
        let start = self.position;
        self.parse_assignment()?;
        self.reduce(start, Engine::consume_initializer);
        Ok(())
    }

    /// Parse `{ initializer-list ,? }`
    pub(super) fn parse_initializer_list(&mut self) -> PResult<()> {
        let start = self.position;
        self.expect_token(TokenKind::LeftBrace, "to open an initializer list")?;
        self.open_scope();
        while !self.check(TokenKind::RightBrace) && !self.is_at_end() {
            self.parse_designated_initializer()?;
            if !self.match_token(TokenKind::Comma) {
                break;
            }
        }
        self.expect_token(TokenKind::RightBrace, "to close an initializer list")?;
        self.reduce(start, Engine::consume_initializer_list);
        Ok(())
    }

    /// Parse `designator+ = initializer` or a plain initializer
    fn parse_designated_initializer(&mut self) -> PResult<()> {
        if !matches!(self.peek_kind(), TokenKind::Dot | TokenKind::LeftBracket) {
            return self.parse_initializer();
        }

        let start = self.position;
        self.open_scope();
        loop {
            let at = self.position;
            if self.match_token(TokenKind::Dot) {
                self.expect_identifier()?;
                self.reduce(at, Engine::consume_designator_field);
            } else if self.match_token(TokenKind::LeftBracket) {
                self.parse_conditional()?;
                self.expect_token(TokenKind::RightBracket, "to close a designator")?;
                self.reduce(at, Engine::consume_designator_array);
            } else {
                break;
            }
        }
        self.expect_token(TokenKind::Assign, "after designators")?;
        self.parse_initializer()?;
        self.reduce(start, Engine::consume_initializer_designated);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::super::tests::parse_dump;

    #[test]
    fn test_pointer_to_function_declarator() {
        let (tree, has_error) = parse_dump("int (*fp)(int x, ...);");
        expect_test::expect![[r#"
            TranslationUnit 0..22
              Declaration: SimpleDeclaration 0..22
                DeclSpecifier: SimpleDeclSpecifier(int) 0..3
                Declarator: FunctionDeclarator(...) 4..21
                  Nested: Declarator 5..8
                    Name: Name "fp" 6..8
                    Pointer: Pointer 5..6
                  Parameter: ParameterDeclaration 10..15
                    DeclSpecifier: SimpleDeclSpecifier(int) 10..13
                    Declarator: Declarator 14..15
                      Name: Name "x" 14..15
        "#]]
        .assert_eq(&tree);
        assert!(!has_error);
    }

    #[test]
    fn test_array_of_arrays_with_initializer() {
        let (tree, _) = parse_dump("int m[2][3] = { [1] = 4, 5 };");
        expect_test::expect![[r#"
            TranslationUnit 0..29
              Declaration: SimpleDeclaration 0..29
                DeclSpecifier: SimpleDeclSpecifier(int) 0..3
                Declarator: ArrayDeclarator 4..28
                  Name: Name "m" 4..5
                  ArrayModifier: ArrayModifier 5..8
                    Expression: Literal(Integer) 2 6..7
                  ArrayModifier: ArrayModifier 8..11
                    Expression: Literal(Integer) 3 9..10
                  Initializer: InitializerList 14..28
                    Initializer: DesignatedInitializer 16..23
                      Designator: ArrayDesignator 16..19
                        Subscript: Literal(Integer) 1 17..18
                      Initializer: EqualsInitializer 22..23
                        Expression: Literal(Integer) 4 22..23
                    Initializer: EqualsInitializer 25..26
                      Expression: Literal(Integer) 5 25..26
        "#]]
        .assert_eq(&tree);
    }

    #[test]
    fn test_struct_with_bit_field_and_typedef() {
        let (tree, has_error) = parse_dump("typedef struct P { unsigned f : 3; int *q; } P; P v;");
        expect_test::expect![[r#"
            TranslationUnit 0..52
              Declaration: SimpleDeclaration 0..47
                DeclSpecifier: CompositeTypeSpecifier(Struct)(typedef) 0..44
                  Name: Name "P" 15..16
                  Member: SimpleDeclaration 19..34
                    DeclSpecifier: SimpleDeclSpecifier(unsigned) 19..27
                    Declarator: FieldDeclarator 28..33
                      Name: Name "f" 28..29
                      BitFieldSize: Literal(Integer) 3 32..33
                  Member: SimpleDeclaration 35..42
                    DeclSpecifier: SimpleDeclSpecifier(int) 35..38
                    Declarator: Declarator 39..41
                      Name: Name "q" 40..41
                      Pointer: Pointer 39..40
                Declarator: Declarator 45..46
                  Name: Name "P" 45..46
              Declaration: SimpleDeclaration 48..52
                DeclSpecifier: NamedTypeSpecifier 48..49
                  Name: Name "P" 48..49
                Declarator: Declarator 50..51
                  Name: Name "v" 50..51
        "#]]
        .assert_eq(&tree);
        assert!(!has_error);
    }

    #[test]
    fn test_enum_with_values() {
        let (tree, _) = parse_dump("enum e { A, B = 2, };");
        expect_test::expect![[r#"
            TranslationUnit 0..21
              Declaration: SimpleDeclaration 0..21
                DeclSpecifier: EnumerationSpecifier 0..20
                  Name: Name "e" 5..6
                  Enumerator: Enumerator 9..10
                    Name: Name "A" 9..10
                  Enumerator: Enumerator 12..17
                    Name: Name "B" 12..13
                    Value: Literal(Integer) 2 16..17
        "#]]
        .assert_eq(&tree);
    }
}
