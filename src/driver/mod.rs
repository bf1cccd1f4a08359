//! Reference recognizer
//!
//! A hand-written recursive-descent recognizer for C99 that fires the
//! [`Engine`] actions in the same bottom-up order an LR recognizer for the
//! C grammar would: every production is reduced only after all of its
//! children, through [`Driver::reduce`].
//!
//! # Organization
//!
//! - this module: token cursor, reductions, trial parsing, recovery and the
//!   translation unit
//! - `declarations`: specifiers, declarators, parameters, initializers
//! - `statements`: block items and statements
//! - `expressions`: precedence climbing from assignment down to primary
//!
//! # Declarations and expressions
//!
//! Whether a block item is a declaration is decided from the tokens alone,
//! the way the grammar decides it: an identifier followed by `;`, by another
//! identifier or by `( identifier ) ;` starts a declaration. The engine's
//! rewrites then turn `i;` and `f(x);` back into expression statements.
//!
//! # Recovery
//!
//! Each external declaration and each block item is first recognized in a
//! trial that fires no actions. A failed trial skips to a synchronizing
//! token and reduces the skipped tokens to a problem node; a successful one
//! is recognized again for real. Verdicts are memoized by position so
//! nested items are tried once.

mod declarations;
mod expressions;
mod statements;

use rustc_hash::{FxHashMap, FxHashSet};
use tracing::{debug, trace};

use crate::engine::{Engine, ParseOutput, Reduction};
use crate::error::SyntaxError;
use crate::factory::NodeFactory;
use crate::tokens::{KindMap, Token, TokenKind};

pub(crate) type PResult<T> = Result<T, SyntaxError>;

/// Items that are tried before they are recognized for real.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum Guard {
    ExternalDeclaration,
    BlockItem,
}

/// Problem production used for a skipped item.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Recovery {
    Declaration,
    Statement,
}

/// How a function definition's declarator is followed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FunctionShape {
    /// `declarator { ... }`
    Prototype,
    /// `declarator declaration-list { ... }`
    Knr,
}

/// Recognizes `tokens` and builds the tree through `factory`.
///
/// `tokens` must end with an end-of-file token. Comment tokens are attached
/// under the translation unit in the order given.
pub fn parse_tokens<'a>(
    tokens: &'a [Token],
    comments: &'a [Token],
    kinds: &'a KindMap,
    factory: &'a dyn NodeFactory,
) -> ParseOutput {
    Driver::new(tokens, comments, kinds, factory).run()
}

pub(crate) struct Driver<'a> {
    tokens: &'a [Token],
    comments: &'a [Token],
    kinds: &'a KindMap,
    position: usize,
    engine: Engine<'a>,
    /// Nesting depth of trial recognition; actions fire only at zero.
    trial: u32,
    typedefs: FxHashSet<&'a str>,
    verdicts: FxHashMap<(usize, Guard), bool>,
    /// Index of the identifier under the content-assist cursor.
    completion_at: Option<usize>,
    /// First identifier of the declarator being recognized.
    declarator_name: Option<&'a str>,
}

impl<'a> Driver<'a> {
    pub(crate) fn new(
        tokens: &'a [Token],
        comments: &'a [Token],
        kinds: &'a KindMap,
        factory: &'a dyn NodeFactory,
    ) -> Self {
        let ends_with_eof = tokens
            .last()
            .is_some_and(|token| kinds.map_kind(token.kind) == TokenKind::EndOfFile);
        assert!(ends_with_eof, "token stream must end with an end-of-file token");

        Self {
            tokens,
            comments,
            kinds,
            position: 0,
            engine: Engine::new(factory, kinds),
            trial: 0,
            typedefs: FxHashSet::default(),
            verdicts: FxHashMap::default(),
            completion_at: tokens.iter().position(|token| token.completion),
            declarator_name: None,
        }
    }

    pub(crate) fn run(mut self) -> ParseOutput {
        while !self.is_at_end() {
            self.parse_external_declaration();
        }

        let comments = self.comments;
        let eof = self.current();
        self.reduce(0, |engine| engine.consume_translation_unit(comments, eof));
        self.engine.finish()
    }

    // ===== Translation unit =====

    fn parse_external_declaration(&mut self) {
        let start = self.position;
        if !self.guarded(Guard::ExternalDeclaration, Self::external_declaration) {
            self.recover(start, Recovery::Declaration);
        }
    }

    fn external_declaration(&mut self) -> PResult<()> {
        let start = self.position;
        if self.match_token(TokenKind::SemiColon) {
            self.reduce(start, Engine::consume_declaration_empty);
            return Ok(());
        }

        let has_specifiers = self.at_top_level_specifiers();
        if let Some(shape) = self.function_definition_shape(has_specifiers) {
            return self.parse_function_definition(has_specifiers, shape);
        }
        if !has_specifiers {
            return Err(self.error("a declaration"));
        }
        self.parse_declaration()
    }

    /// Shape of the function definition starting here, if it is one.
    fn function_definition_shape(&mut self, has_specifiers: bool) -> Option<FunctionShape> {
        self.attempt(|driver| {
            if has_specifiers {
                driver.parse_declaration_specifiers()?;
            }
            driver.parse_declarator(DeclaratorMode::Named)?;
            if driver.check(TokenKind::LeftBrace) {
                return Ok(FunctionShape::Prototype);
            }
            let after_parameters = driver.kind_at(driver.position.wrapping_sub(1)) == TokenKind::RightParen;
            if after_parameters && driver.at_declaration_specifier_start() {
                return Ok(FunctionShape::Knr);
            }
            Err(driver.error("a function body"))
        })
    }

    fn parse_function_definition(&mut self, has_specifiers: bool, shape: FunctionShape) -> PResult<()> {
        let start = self.position;
        if has_specifiers {
            self.parse_declaration_specifiers()?;
        } else if shape == FunctionShape::Knr {
            self.reduce(start, Engine::consume_empty);
        }
        self.parse_declarator(DeclaratorMode::Named)?;

        if shape == FunctionShape::Knr {
            self.open_scope();
            while !self.check(TokenKind::LeftBrace) && !self.is_at_end() {
                self.parse_declaration()?;
            }
        }
        self.parse_compound_statement()?;

        match shape {
            FunctionShape::Prototype => self.reduce(start, |engine| {
                engine.consume_function_definition(has_specifiers)
            }),
            FunctionShape::Knr => self.reduce(start, Engine::consume_function_definition_knr),
        }
        Ok(())
    }

    // ===== Trial recognition and recovery =====

    /// Recognizes one item, trying it first. Returns false, with the cursor
    /// back at the start, when the item does not parse.
    fn guarded(&mut self, guard: Guard, parse: fn(&mut Self) -> PResult<()>) -> bool {
        let start = self.position;

        if self.trial > 0 {
            let ok = parse(self).is_ok();
            if !ok {
                self.position = start;
            }
            self.verdicts.insert((start, guard), ok);
            return ok;
        }

        let ok = match self.verdicts.get(&(start, guard)) {
            Some(&ok) => ok,
            None => {
                let typedefs = self.typedefs.clone();
                self.trial += 1;
                let ok = parse(self).is_ok();
                self.trial -= 1;
                self.position = start;
                self.typedefs = typedefs;
                self.verdicts.insert((start, guard), ok);
                trace!(?guard, start, ok, "trial");
                ok
            }
        };
        if ok {
            if let Err(error) = parse(self) {
                panic!("{guard:?} at token {start} passed its trial but failed: {error}");
            }
        }
        ok
    }

    /// Runs `parse` as a trial and always rewinds.
    fn attempt<T>(&mut self, parse: impl FnOnce(&mut Self) -> PResult<T>) -> Option<T> {
        let start = self.position;
        let declarator_name = self.declarator_name;
        self.trial += 1;
        let result = parse(self).ok();
        self.trial -= 1;
        self.position = start;
        self.declarator_name = declarator_name;
        result
    }

    /// Skips a malformed item and reduces it to a problem node.
    fn recover(&mut self, start: usize, recovery: Recovery) {
        self.position = start;
        self.skip_to_sync();
        if self.trial == 0 {
            debug!(
                ?recovery,
                from = start,
                to = self.position,
                "skipped malformed item"
            );
        }
        match recovery {
            Recovery::Declaration => self.reduce(start, Engine::consume_declaration_problem),
            Recovery::Statement => self.reduce(start, Engine::consume_statement_problem),
        }
    }

    /// Advances past the next `;` outside any brackets, past the `}` (and a
    /// `;` right after it) that closes a brace group opened while skipping,
    /// or up to an unmatched `}`. Always consumes at least one token before end of input.
    fn skip_to_sync(&mut self) {
        let first = self.position;
        let mut parens = 0usize;
        let mut braces = 0usize;

        while !self.is_at_end() {
            match self.peek_kind() {
                TokenKind::LeftParen | TokenKind::LeftBracket => parens += 1,
                TokenKind::RightParen | TokenKind::RightBracket => {
                    parens = parens.saturating_sub(1);
                }
                TokenKind::LeftBrace => {
                    braces += 1;
                    parens = 0;
                }
                TokenKind::RightBrace if braces == 0 => {
                    if self.position == first {
                        self.advance();
                    }
                    return;
                }
                TokenKind::RightBrace => {
                    braces -= 1;
                    if braces == 0 {
                        self.advance();
                        self.match_token(TokenKind::SemiColon);
                        return;
                    }
                }
                TokenKind::SemiColon if parens == 0 && braces == 0 => {
                    self.advance();
                    return;
                }
                _ => {}
            }
            self.advance();
        }
    }

    // ===== Reductions =====

    /// Reduces `tokens[start..position]` with `action`; an empty span reduces
    /// at the current token. Does nothing during a trial.
    fn reduce(&mut self, start: usize, action: impl FnOnce(&mut Engine<'a>)) {
        if self.trial > 0 {
            return;
        }
        let tokens = self.tokens;
        let reduction = Reduction::over(&tokens[start..self.position])
            .unwrap_or_else(|| Reduction::empty(&tokens[self.position]));
        self.engine.begin_rule(reduction);
        action(&mut self.engine);
    }

    fn open_scope(&mut self) {
        if self.trial == 0 {
            self.engine.open_ast_scope();
        }
    }

    /// Pushes the token just consumed.
    fn push_token(&mut self) {
        self.reduce(self.position - 1, Engine::consume_token);
    }

    // ===== Token cursor =====

    fn kind_at(&self, index: usize) -> TokenKind {
        let index = index.min(self.tokens.len() - 1);
        self.kinds.map_kind(self.tokens[index].kind)
    }

    fn peek_kind(&self) -> TokenKind {
        self.kind_at(self.position)
    }

    fn peek_kind_ahead(&self, n: usize) -> TokenKind {
        self.kind_at(self.position + n)
    }

    fn current(&self) -> &'a Token {
        let tokens = self.tokens;
        &tokens[self.position]
    }

    fn check(&self, kind: TokenKind) -> bool {
        self.peek_kind() == kind
    }

    fn match_token(&mut self, kind: TokenKind) -> bool {
        if self.check(kind) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn advance(&mut self) {
        if !self.is_at_end() {
            self.position += 1;
        }
    }

    fn is_at_end(&self) -> bool {
        self.check(TokenKind::EndOfFile)
    }

    /// True once the cursor has moved past the content-assist identifier.
    fn past_completion(&self) -> bool {
        self.completion_at.is_some_and(|index| self.position > index)
    }

    /// Consumes `kind`. After the content-assist identifier, end of input
    /// stands in for any expected token.
    fn expect_token(&mut self, kind: TokenKind, context: &str) -> PResult<()> {
        if self.match_token(kind) || (self.is_at_end() && self.past_completion()) {
            return Ok(());
        }
        Err(self.error(format!("'{}' {context}", kind.symbol_name())))
    }

    fn expect_identifier(&mut self) -> PResult<&'a Token> {
        if self.check(TokenKind::Identifier) {
            let token = self.current();
            self.advance();
            Ok(token)
        } else {
            Err(self.error("an identifier"))
        }
    }

    fn error(&self, expected: impl Into<String>) -> SyntaxError {
        let token = self.current();
        SyntaxError {
            expected: expected.into(),
            found: self.peek_kind().to_string(),
            offset: token.range.start(),
        }
    }

    // ===== Lookahead predicates =====

    fn is_typedef_name(&self, index: usize) -> bool {
        self.kind_at(index) == TokenKind::Identifier
            && self
                .tokens
                .get(index)
                .is_some_and(|token| self.typedefs.contains(token.text.as_str()))
    }

    /// Start of a specifier that cannot begin an expression.
    fn starts_type_name(&self, index: usize) -> bool {
        let kind = self.kind_at(index);
        kind.is_simple_specifier()
            || matches!(kind, TokenKind::Struct | TokenKind::Union | TokenKind::Enum)
            || self.is_typedef_name(index)
    }

    fn at_declaration_specifier_start(&self) -> bool {
        self.starts_type_name(self.position)
    }

    /// Whether an external declaration starts with specifiers. An unknown
    /// identifier counts when a declarator or `;` follows it.
    fn at_top_level_specifiers(&self) -> bool {
        if self.at_declaration_specifier_start() {
            return true;
        }
        self.check(TokenKind::Identifier)
            && matches!(
                self.peek_kind_ahead(1),
                TokenKind::Identifier | TokenKind::Star | TokenKind::SemiColon
            )
    }

    /// Whether a block item is a declaration.
    fn starts_block_declaration(&self) -> bool {
        let kind = self.peek_kind();
        if kind.is_simple_specifier()
            || matches!(kind, TokenKind::Struct | TokenKind::Union | TokenKind::Enum)
        {
            return true;
        }
        if kind != TokenKind::Identifier {
            return false;
        }

        let next = self.peek_kind_ahead(1);
        if self.is_typedef_name(self.position) {
            return next.is_simple_specifier()
                || matches!(
                    next,
                    TokenKind::Identifier
                        | TokenKind::Star
                        | TokenKind::LeftParen
                        | TokenKind::SemiColon
                );
        }
        match next {
            TokenKind::Identifier | TokenKind::SemiColon => true,
            TokenKind::LeftParen => {
                self.peek_kind_ahead(2) == TokenKind::Identifier
                    && self.peek_kind_ahead(3) == TokenKind::RightParen
                    && self.peek_kind_ahead(4) == TokenKind::SemiColon
            }
            _ => false,
        }
    }
}

/// What a declarator may omit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DeclaratorMode {
    /// Must name something
    Named,
    /// Type names: never names anything
    Abstract,
    /// Parameters
    Either,
}
