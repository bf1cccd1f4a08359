//! Expression recognition
//!
//! Precedence climbing from the comma operator down to primary expressions.
//! Every binary level reduces from the start of its left operand, so a
//! chain like `a - b - c` nests to the left.

use crate::ast::{BinaryOp, LiteralKind, UnaryOp};
use crate::engine::Engine;
use crate::tokens::TokenKind;

use super::{Driver, PResult};

type Level<'a> = fn(&mut Driver<'a>) -> PResult<()>;

const ASSIGNMENT_OPERATORS: &[(TokenKind, BinaryOp)] = &[
    (TokenKind::Assign, BinaryOp::Assign),
    (TokenKind::StarAssign, BinaryOp::MultiplyAssign),
    (TokenKind::SlashAssign, BinaryOp::DivideAssign),
    (TokenKind::PercentAssign, BinaryOp::ModuloAssign),
    (TokenKind::PlusAssign, BinaryOp::PlusAssign),
    (TokenKind::MinusAssign, BinaryOp::MinusAssign),
    (TokenKind::LeftShiftAssign, BinaryOp::ShiftLeftAssign),
    (TokenKind::RightShiftAssign, BinaryOp::ShiftRightAssign),
    (TokenKind::AndAssign, BinaryOp::BinaryAndAssign),
    (TokenKind::CaretAssign, BinaryOp::BinaryXorAssign),
    (TokenKind::OrAssign, BinaryOp::BinaryOrAssign),
];

const EQUALITY: &[(TokenKind, BinaryOp)] = &[
    (TokenKind::EqualEqual, BinaryOp::Equals),
    (TokenKind::NotEqual, BinaryOp::NotEquals),
];

const RELATIONAL: &[(TokenKind, BinaryOp)] = &[
    (TokenKind::LessThan, BinaryOp::LessThan),
    (TokenKind::GreaterThan, BinaryOp::GreaterThan),
    (TokenKind::LessEqual, BinaryOp::LessEqual),
    (TokenKind::GreaterEqual, BinaryOp::GreaterEqual),
];

const SHIFT: &[(TokenKind, BinaryOp)] = &[
    (TokenKind::LeftShift, BinaryOp::ShiftLeft),
    (TokenKind::RightShift, BinaryOp::ShiftRight),
];

const ADDITIVE: &[(TokenKind, BinaryOp)] = &[
    (TokenKind::Plus, BinaryOp::Plus),
    (TokenKind::Minus, BinaryOp::Minus),
];

const MULTIPLICATIVE: &[(TokenKind, BinaryOp)] = &[
    (TokenKind::Star, BinaryOp::Multiply),
    (TokenKind::Slash, BinaryOp::Divide),
    (TokenKind::Percent, BinaryOp::Modulo),
];

impl<'a> Driver<'a> {
    /// Parse `assignment ( , assignment )*`
    pub(super) fn parse_expression(&mut self) -> PResult<()> {
        let start = self.position;
        self.open_scope();
        loop {
            self.parse_assignment()?;
            if !self.match_token(TokenKind::Comma) {
                break;
            }
        }
        self.reduce(start, Engine::consume_expression_list);
        Ok(())
    }

    /// Parse assignment (right-associative)
    pub(super) fn parse_assignment(&mut self) -> PResult<()> {
        let start = self.position;
        self.parse_conditional()?;

        let kind = self.peek_kind();
        let Some(&(_, op)) = ASSIGNMENT_OPERATORS.iter().find(|(k, _)| *k == kind) else {
            return Ok(());
        };
        self.advance();
        self.parse_assignment()?;
        self.reduce(start, move |engine| engine.consume_expression_binary(op));
        Ok(())
    }

    /// Parse `condition ? expression : conditional`
    pub(super) fn parse_conditional(&mut self) -> PResult<()> {
        let start = self.position;
        self.parse_logical_or()?;
        if !self.match_token(TokenKind::Question) {
            return Ok(());
        }
        self.parse_expression()?;
        self.expect_token(TokenKind::Colon, "in conditional expression")?;
        self.parse_conditional()?;
        self.reduce(start, Engine::consume_expression_conditional);
        Ok(())
    }

    // ===== Binary levels, loosest first =====

    fn parse_logical_or(&mut self) -> PResult<()> {
        self.parse_binary_level(&[(TokenKind::OrOr, BinaryOp::LogicalOr)], Self::parse_logical_and)
    }

    fn parse_logical_and(&mut self) -> PResult<()> {
        self.parse_binary_level(&[(TokenKind::AndAnd, BinaryOp::LogicalAnd)], Self::parse_bit_or)
    }

    fn parse_bit_or(&mut self) -> PResult<()> {
        self.parse_binary_level(&[(TokenKind::Or, BinaryOp::BinaryOr)], Self::parse_bit_xor)
    }

    fn parse_bit_xor(&mut self) -> PResult<()> {
        self.parse_binary_level(&[(TokenKind::Caret, BinaryOp::BinaryXor)], Self::parse_bit_and)
    }

    fn parse_bit_and(&mut self) -> PResult<()> {
        self.parse_binary_level(&[(TokenKind::And, BinaryOp::BinaryAnd)], Self::parse_equality)
    }

    fn parse_equality(&mut self) -> PResult<()> {
        self.parse_binary_level(EQUALITY, Self::parse_relational)
    }

    fn parse_relational(&mut self) -> PResult<()> {
        self.parse_binary_level(RELATIONAL, Self::parse_shift)
    }

    fn parse_shift(&mut self) -> PResult<()> {
        self.parse_binary_level(SHIFT, Self::parse_additive)
    }

    fn parse_additive(&mut self) -> PResult<()> {
        self.parse_binary_level(ADDITIVE, Self::parse_multiplicative)
    }

    fn parse_multiplicative(&mut self) -> PResult<()> {
        self.parse_binary_level(MULTIPLICATIVE, Self::parse_cast)
    }

    /// Left-associative chain of `operand` joined by any of `operators`.
    fn parse_binary_level(&mut self, operators: &[(TokenKind, BinaryOp)], operand: Level<'a>) -> PResult<()> {
        let start = self.position;
        operand(self)?;
        loop {
            let kind = self.peek_kind();
            let Some(&(_, op)) = operators.iter().find(|(k, _)| *k == kind) else {
                return Ok(());
            };
            self.advance();
            operand(self)?;
            self.reduce(start, move |engine| engine.consume_expression_binary(op));
        }
    }

    // ===== Casts and unary operators =====

    /// Parse `( type-name ) cast`, a compound literal, or a unary expression
    fn parse_cast(&mut self) -> PResult<()> {
        if !self.at_cast() {
            return self.parse_unary();
        }

        let start = self.position;
        self.advance();
        self.parse_type_name()?;
        self.expect_token(TokenKind::RightParen, "after cast type")?;

        if self.check(TokenKind::LeftBrace) {
            self.parse_initializer_list()?;
            self.reduce(start, Engine::consume_expression_type_id_initializer_list);
            return self.parse_postfix_suffixes(start);
        }
        self.parse_cast()?;
        self.reduce(start, Engine::consume_expression_cast);
        Ok(())
    }

    /// Whether a `(` here opens a cast or a compound literal. Besides known
    /// type names, a lone unknown identifier in parentheses is read as a type
    /// when what follows cannot continue a bracketed expression.
    fn at_cast(&self) -> bool {
        if !self.check(TokenKind::LeftParen) {
            return false;
        }
        if self.starts_type_name(self.position + 1) {
            return true;
        }
        if self.peek_kind_ahead(1) != TokenKind::Identifier
            || self.peek_kind_ahead(2) != TokenKind::RightParen
        {
            return false;
        }
        let next = self.peek_kind_ahead(3);
        next == TokenKind::Identifier
            || next == TokenKind::LeftBrace
            || next == TokenKind::Bang
            || next == TokenKind::Tilde
            || (next.is_literal() && next != TokenKind::StringLiteral)
            || (next == TokenKind::And && self.peek_kind_ahead(4).is_literal())
    }

    fn parse_unary(&mut self) -> PResult<()> {
        let start = self.position;
        let op = match self.peek_kind() {
            TokenKind::PlusPlus => Some(UnaryOp::PrefixIncr),
            TokenKind::MinusMinus => Some(UnaryOp::PrefixDecr),
            _ => None,
        };
        if let Some(op) = op {
            self.advance();
            self.parse_unary()?;
            self.reduce(start, move |engine| engine.consume_expression_unary(op));
            return Ok(());
        }

        let op = match self.peek_kind() {
            TokenKind::And => Some(UnaryOp::Amper),
            TokenKind::Star => Some(UnaryOp::Star),
            TokenKind::Plus => Some(UnaryOp::Plus),
            TokenKind::Minus => Some(UnaryOp::Minus),
            TokenKind::Tilde => Some(UnaryOp::Tilde),
            TokenKind::Bang => Some(UnaryOp::Not),
            _ => None,
        };
        if let Some(op) = op {
            self.advance();
            self.parse_cast()?;
            self.reduce(start, move |engine| engine.consume_expression_unary(op));
            return Ok(());
        }

        if self.check(TokenKind::Sizeof) {
            return self.parse_sizeof();
        }
        self.parse_postfix()
    }

    /// Parse `sizeof ( type-name )` or `sizeof unary`. A parenthesized lone
    /// identifier takes the type-name path.
    fn parse_sizeof(&mut self) -> PResult<()> {
        let start = self.position;
        self.advance();

        let type_operand = self.check(TokenKind::LeftParen)
            && (self.starts_type_name(self.position + 1)
                || (self.peek_kind_ahead(1) == TokenKind::Identifier
                    && self.peek_kind_ahead(2) == TokenKind::RightParen));
        if type_operand {
            self.advance();
            self.parse_type_name()?;
            self.expect_token(TokenKind::RightParen, "after sizeof type")?;
            self.reduce(start, Engine::consume_expression_sizeof_type_id);
            return Ok(());
        }

        self.parse_unary()?;
        self.reduce(start, |engine| engine.consume_expression_unary(UnaryOp::Sizeof));
        Ok(())
    }

    // ===== Postfix and primary =====

    fn parse_postfix(&mut self) -> PResult<()> {
        let start = self.position;
        self.parse_primary()?;
        self.parse_postfix_suffixes(start)
    }

    /// Applies `[ ]`, `( )`, `.`, `->`, `++` and `--` to the expression
    /// that starts at `start`.
    fn parse_postfix_suffixes(&mut self, start: usize) -> PResult<()> {
        loop {
            match self.peek_kind() {
                TokenKind::LeftBracket => {
                    self.advance();
                    self.parse_expression()?;
                    self.expect_token(TokenKind::RightBracket, "after subscript")?;
                    self.reduce(start, Engine::consume_expression_array_subscript);
                }
                TokenKind::LeftParen => {
                    self.advance();
                    let has_args = !self.check(TokenKind::RightParen);
                    if has_args {
                        self.parse_expression()?;
                    }
                    self.expect_token(TokenKind::RightParen, "after arguments")?;
                    self.reduce(start, move |engine| {
                        engine.consume_expression_function_call(has_args)
                    });
                }
                kind @ (TokenKind::Dot | TokenKind::Arrow) => {
                    self.advance();
                    self.expect_identifier()?;
                    let is_pointer = kind == TokenKind::Arrow;
                    self.reduce(start, move |engine| {
                        engine.consume_expression_field_reference(is_pointer)
                    });
                }
                TokenKind::PlusPlus => {
                    self.advance();
                    self.reduce(start, |engine| engine.consume_expression_unary(UnaryOp::PostfixIncr));
                }
                TokenKind::MinusMinus => {
                    self.advance();
                    self.reduce(start, |engine| engine.consume_expression_unary(UnaryOp::PostfixDecr));
                }
                _ => return Ok(()),
            }
        }
    }

    fn parse_primary(&mut self) -> PResult<()> {
        let start = self.position;
        let kind = self.peek_kind();
        let literal = match kind {
            TokenKind::IntegerConstant => Some(LiteralKind::Integer),
            TokenKind::FloatingConstant => Some(LiteralKind::Float),
            TokenKind::CharConstant => Some(LiteralKind::Char),
            TokenKind::StringLiteral => Some(LiteralKind::String),
            _ => None,
        };
        if let Some(literal) = literal {
            self.advance();
            if literal == LiteralKind::String {
                while self.match_token(TokenKind::StringLiteral) {}
            }
            self.reduce(start, move |engine| engine.consume_expression_literal(literal));
            return Ok(());
        }

        match kind {
            TokenKind::Identifier => {
                self.advance();
                self.reduce(start, Engine::consume_expression_id);
                Ok(())
            }
            TokenKind::LeftParen => {
                self.advance();
                self.parse_expression()?;
                self.expect_token(TokenKind::RightParen, "to close parenthesized expression")?;
                self.reduce(start, Engine::consume_expression_bracketed);
                Ok(())
            }
            // A missing operand before a closer becomes an empty problem
            // expression and recognition carries on.
            TokenKind::SemiColon
            | TokenKind::RightParen
            | TokenKind::RightBracket
            | TokenKind::RightBrace
            | TokenKind::Comma
            | TokenKind::Colon
            | TokenKind::EndOfFile => {
                self.reduce(start, Engine::consume_expression_problem);
                Ok(())
            }
            _ => Err(self.error("an expression")),
        }
    }
}
