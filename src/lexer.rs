//! Lexer for C source text
//!
//! Produces [`Token`]s with byte ranges and raw text. Preprocessor lines are
//! skipped, comments go to a side list, and the stream always ends with an
//! end-of-file token at the input length. Token kinds are emitted in the id
//! space of the chosen [`Dialect`].
//!
//! A content-assist lex stops at the cursor: the identifier under it is cut
//! to its prefix and marked, or an empty marked identifier is inserted when
//! the cursor is not inside one.

use text_size::{TextRange, TextSize};

use crate::error::LexError;
use crate::tokens::{Dialect, KindMap, Keywords, Token, TokenKind};

/// Punctuators, longest first so the first prefix match is the longest.
const PUNCTUATORS: &[(&str, TokenKind)] = &[
    ("...", TokenKind::DotDotDot),
    ("<<=", TokenKind::LeftShiftAssign),
    (">>=", TokenKind::RightShiftAssign),
    ("->", TokenKind::Arrow),
    ("++", TokenKind::PlusPlus),
    ("--", TokenKind::MinusMinus),
    ("<<", TokenKind::LeftShift),
    (">>", TokenKind::RightShift),
    ("<=", TokenKind::LessEqual),
    (">=", TokenKind::GreaterEqual),
    ("==", TokenKind::EqualEqual),
    ("!=", TokenKind::NotEqual),
    ("&&", TokenKind::AndAnd),
    ("||", TokenKind::OrOr),
    ("*=", TokenKind::StarAssign),
    ("/=", TokenKind::SlashAssign),
    ("%=", TokenKind::PercentAssign),
    ("+=", TokenKind::PlusAssign),
    ("-=", TokenKind::MinusAssign),
    ("&=", TokenKind::AndAssign),
    ("^=", TokenKind::CaretAssign),
    ("|=", TokenKind::OrAssign),
    ("[", TokenKind::LeftBracket),
    ("]", TokenKind::RightBracket),
    ("(", TokenKind::LeftParen),
    (")", TokenKind::RightParen),
    ("{", TokenKind::LeftBrace),
    ("}", TokenKind::RightBrace),
    (".", TokenKind::Dot),
    ("&", TokenKind::And),
    ("*", TokenKind::Star),
    ("+", TokenKind::Plus),
    ("-", TokenKind::Minus),
    ("~", TokenKind::Tilde),
    ("!", TokenKind::Bang),
    ("/", TokenKind::Slash),
    ("%", TokenKind::Percent),
    ("<", TokenKind::LessThan),
    (">", TokenKind::GreaterThan),
    ("^", TokenKind::Caret),
    ("|", TokenKind::Or),
    ("?", TokenKind::Question),
    (":", TokenKind::Colon),
    (";", TokenKind::SemiColon),
    ("=", TokenKind::Assign),
    (",", TokenKind::Comma),
];

/// Output of one lex.
#[derive(Debug, Clone, Default)]
pub struct Lexed {
    /// Grammar tokens, terminated by an end-of-file token.
    pub tokens: Vec<Token>,
    pub comments: Vec<Token>,
}

/// What one scan step found.
enum Scanned {
    /// Identifier or keyword; may hold the completion cursor.
    Word(TokenKind),
    Token(TokenKind),
    Comment(TokenKind),
    Directive,
}

pub struct Lexer<'s> {
    source: &'s str,
    position: usize,
    kinds: KindMap,
    completion_offset: Option<usize>,
    collect_comments: bool,
}

impl<'s> Lexer<'s> {
    pub fn new(source: &'s str) -> Self {
        Self {
            source,
            position: 0,
            kinds: KindMap::identity(),
            completion_offset: None,
            collect_comments: true,
        }
    }

    pub fn with_dialect(mut self, dialect: Dialect) -> Self {
        self.kinds = dialect.kind_map();
        self
    }

    /// Stops the token stream at `offset`, clamped to the input length and
    /// moved back to the start of the character it falls in.
    pub fn with_completion_offset(mut self, offset: TextSize) -> Self {
        let mut offset = usize::from(offset).min(self.source.len());
        while !self.source.is_char_boundary(offset) {
            offset -= 1;
        }
        self.completion_offset = Some(offset);
        self
    }

    pub fn with_comments(mut self, collect: bool) -> Self {
        self.collect_comments = collect;
        self
    }

    /// Tokenize the entire input
    pub fn tokenize(mut self) -> Result<Lexed, LexError> {
        let mut lexed = Lexed::default();

        loop {
            self.skip_whitespace();
            let start = self.position;

            if let Some(offset) = self.completion_offset {
                if start >= offset {
                    lexed.tokens.push(self.completion_token(offset, offset));
                    break;
                }
            }
            if self.is_at_end() {
                break;
            }

            let scanned = self.next_token()?;
            let end = self.position;

            if let Some(offset) = self.completion_offset {
                if matches!(scanned, Scanned::Word(_)) && offset <= end {
                    lexed.tokens.push(self.completion_token(start, offset));
                    break;
                }
                if offset < end {
                    lexed.tokens.push(self.completion_token(offset, offset));
                    break;
                }
            }

            match scanned {
                Scanned::Word(kind) | Scanned::Token(kind) => {
                    lexed.tokens.push(self.token(kind, start, end));
                }
                Scanned::Comment(kind) => {
                    if self.collect_comments {
                        lexed.comments.push(self.token(kind, start, end));
                    }
                }
                Scanned::Directive => {}
            }
        }

        let end = self.source.len();
        lexed
            .tokens
            .push(self.token(TokenKind::EndOfFile, end, end));
        Ok(lexed)
    }

    fn next_token(&mut self) -> Result<Scanned, LexError> {
        let start = self.position;
        let Some(ch) = self.peek() else {
            return Ok(Scanned::Token(TokenKind::EndOfFile));
        };

        let scanned = match ch {
            '/' if self.peek_ahead(1) == Some('/') => {
                self.skip_line_comment();
                Scanned::Comment(TokenKind::SingleLineComment)
            }
            '/' if self.peek_ahead(1) == Some('*') => {
                self.block_comment(start)?;
                Scanned::Comment(TokenKind::MultiLineComment)
            }
            '#' => {
                self.skip_directive();
                Scanned::Directive
            }
            '"' => {
                self.quoted('"', "string literal", start)?;
                Scanned::Token(TokenKind::StringLiteral)
            }
            '\'' => {
                self.quoted('\'', "character constant", start)?;
                Scanned::Token(TokenKind::CharConstant)
            }
            'L' if self.peek_ahead(1) == Some('"') => {
                self.advance();
                self.quoted('"', "string literal", start)?;
                Scanned::Token(TokenKind::StringLiteral)
            }
            'L' if self.peek_ahead(1) == Some('\'') => {
                self.advance();
                self.quoted('\'', "character constant", start)?;
                Scanned::Token(TokenKind::CharConstant)
            }
            '0'..='9' => Scanned::Token(self.number()),
            '.' if self.peek_ahead(1).is_some_and(|c| c.is_ascii_digit()) => {
                Scanned::Token(self.number())
            }
            'a'..='z' | 'A'..='Z' | '_' => Scanned::Word(self.identifier_or_keyword()),
            _ => Scanned::Token(self.punctuator()?),
        };
        Ok(scanned)
    }

    fn identifier_or_keyword(&mut self) -> TokenKind {
        let start = self.position;
        while self
            .peek()
            .is_some_and(|c| c.is_ascii_alphanumeric() || c == '_')
        {
            self.advance();
        }
        Keywords::c99()
            .lookup(&self.source[start..self.position])
            .unwrap_or(TokenKind::Identifier)
    }

    /// Scans a preprocessing number and classifies it.
    fn number(&mut self) -> TokenKind {
        let start = self.position;
        self.advance();
        while let Some(c) = self.peek() {
            let exponent_sign = matches!(c, '+' | '-')
                && matches!(self.previous(), Some('e' | 'E' | 'p' | 'P'));
            if c.is_ascii_alphanumeric() || c == '_' || c == '.' || exponent_sign {
                self.advance();
            } else {
                break;
            }
        }

        let text = &self.source[start..self.position];
        let is_hex = text.starts_with("0x") || text.starts_with("0X");
        let is_float = text.contains('.')
            || if is_hex {
                text.contains(['p', 'P'])
            } else {
                text.contains(['e', 'E'])
            };
        if is_float {
            TokenKind::FloatingConstant
        } else {
            TokenKind::IntegerConstant
        }
    }

    /// Scans a quoted literal up to its closing quote; escapes are kept raw.
    fn quoted(&mut self, quote: char, what: &'static str, start: usize) -> Result<(), LexError> {
        self.advance(); // opening quote
        loop {
            match self.peek() {
                Some(c) if c == quote => {
                    self.advance();
                    return Ok(());
                }
                Some('\\') => {
                    self.advance();
                    self.advance();
                }
                Some('\n') | None => return Err(self.unterminated(what, start)),
                Some(_) => {
                    self.advance();
                }
            }
        }
    }

    fn punctuator(&mut self) -> Result<TokenKind, LexError> {
        let rest = &self.source[self.position..];
        match PUNCTUATORS.iter().find(|(text, _)| rest.starts_with(text)) {
            Some(&(text, kind)) => {
                self.position += text.len();
                Ok(kind)
            }
            None => {
                let (line, column) = self.line_column(self.position);
                Err(LexError::UnexpectedChar {
                    ch: rest.chars().next().unwrap_or('\0'),
                    line,
                    column,
                })
            }
        }
    }

    fn skip_whitespace(&mut self) {
        while let Some(c) = self.peek() {
            match c {
                ' ' | '\t' | '\r' | '\n' | '\x0b' | '\x0c' => self.advance(),
                '\\' if self.at_line_continuation() => self.skip_line_continuation(),
                _ => break,
            }
        }
    }

    /// Skip single-line comment (// ...), leaving the newline
    fn skip_line_comment(&mut self) {
        while let Some(c) = self.peek() {
            if c == '\n' {
                break;
            }
            self.advance();
        }
    }

    fn block_comment(&mut self, start: usize) -> Result<(), LexError> {
        self.advance(); // skip '/'
        self.advance(); // skip '*'
        while !self.is_at_end() {
            if self.peek() == Some('*') && self.peek_ahead(1) == Some('/') {
                self.advance();
                self.advance();
                return Ok(());
            }
            self.advance();
        }
        Err(self.unterminated("block comment", start))
    }

    /// Skip a preprocessor line, following backslash continuations
    fn skip_directive(&mut self) {
        while let Some(c) = self.peek() {
            if c == '\\' && self.at_line_continuation() {
                self.skip_line_continuation();
                continue;
            }
            if c == '\n' {
                break;
            }
            self.advance();
        }
    }

    fn at_line_continuation(&self) -> bool {
        match self.peek_ahead(1) {
            Some('\n') => true,
            Some('\r') => self.peek_ahead(2) == Some('\n'),
            _ => false,
        }
    }

    fn skip_line_continuation(&mut self) {
        self.advance(); // '\\'
        if self.peek() == Some('\r') {
            self.advance();
        }
        self.advance(); // '\n'
    }

    fn token(&self, kind: TokenKind, start: usize, end: usize) -> Token {
        let raw = self.kinds.to_dialect(kind).unwrap_or(u16::MAX);
        Token::new(raw, &self.source[start..end], text_range(start, end))
    }

    fn completion_token(&self, start: usize, end: usize) -> Token {
        let mut token = self.token(TokenKind::Identifier, start, end);
        token.completion = true;
        token
    }

    fn unterminated(&self, what: &'static str, start: usize) -> LexError {
        let (line, column) = self.line_column(start);
        LexError::Unterminated { what, line, column }
    }

    /// One-based line and column of a byte offset.
    fn line_column(&self, offset: usize) -> (usize, usize) {
        let before = &self.source[..offset];
        let line = before.matches('\n').count() + 1;
        let line_start = before.rfind('\n').map_or(0, |index| index + 1);
        (line, before[line_start..].chars().count() + 1)
    }

    /// Current byte as a char; non-ASCII bytes never match a token start.
    fn peek(&self) -> Option<char> {
        self.source.as_bytes().get(self.position).map(|&b| b as char)
    }

    fn peek_ahead(&self, n: usize) -> Option<char> {
        self.source
            .as_bytes()
            .get(self.position + n)
            .map(|&b| b as char)
    }

    fn previous(&self) -> Option<char> {
        let index = self.position.checked_sub(1)?;
        self.source.as_bytes().get(index).map(|&b| b as char)
    }

    fn advance(&mut self) {
        if self.position < self.source.len() {
            self.position += 1;
        }
    }

    fn is_at_end(&self) -> bool {
        self.position >= self.source.len()
    }
}

fn text_range(start: usize, end: usize) -> TextRange {
    TextRange::new(text_size(start), text_size(end))
}

fn text_size(offset: usize) -> TextSize {
    TextSize::try_from(offset).unwrap_or_else(|_| panic!("source offset {offset} exceeds u32"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(source: &str) -> Vec<TokenKind> {
        let lexed = Lexer::new(source).tokenize().unwrap();
        lexed
            .tokens
            .iter()
            .map(|token| TokenKind::from_raw(token.kind).unwrap())
            .collect()
    }

    #[test]
    fn test_simple_tokens() {
        assert_eq!(
            kinds("int main() { return 0; }"),
            vec![
                TokenKind::Int,
                TokenKind::Identifier,
                TokenKind::LeftParen,
                TokenKind::RightParen,
                TokenKind::LeftBrace,
                TokenKind::Return,
                TokenKind::IntegerConstant,
                TokenKind::SemiColon,
                TokenKind::RightBrace,
                TokenKind::EndOfFile,
            ]
        );
    }

    #[test]
    fn test_longest_punctuator_wins() {
        assert_eq!(
            kinds("a <<= b->c ... ++"),
            vec![
                TokenKind::Identifier,
                TokenKind::LeftShiftAssign,
                TokenKind::Identifier,
                TokenKind::Arrow,
                TokenKind::Identifier,
                TokenKind::DotDotDot,
                TokenKind::PlusPlus,
                TokenKind::EndOfFile,
            ]
        );
    }

    #[test]
    fn test_number_classification() {
        assert_eq!(
            kinds("42 0x1e 1e+5 .5 0x1p-3 10UL"),
            vec![
                TokenKind::IntegerConstant,
                TokenKind::IntegerConstant,
                TokenKind::FloatingConstant,
                TokenKind::FloatingConstant,
                TokenKind::FloatingConstant,
                TokenKind::IntegerConstant,
                TokenKind::EndOfFile,
            ]
        );
    }

    #[test]
    fn test_literals_keep_raw_text() {
        let lexed = Lexer::new(r#"L"wide\n" 'a' '\''"#).tokenize().unwrap();
        let texts: Vec<&str> = lexed.tokens.iter().map(|t| t.text.as_str()).collect();
        assert_eq!(texts, vec![r#"L"wide\n""#, "'a'", r"'\''", ""]);
    }

    #[test]
    fn test_comments_are_collected_separately() {
        let source = "x; // one\n/* two */ y;";
        let lexed = Lexer::new(source).tokenize().unwrap();
        assert_eq!(lexed.tokens.len(), 5);
        let comments: Vec<(&str, TokenKind)> = lexed
            .comments
            .iter()
            .map(|t| (t.text.as_str(), TokenKind::from_raw(t.kind).unwrap()))
            .collect();
        assert_eq!(
            comments,
            vec![
                ("// one", TokenKind::SingleLineComment),
                ("/* two */", TokenKind::MultiLineComment),
            ]
        );

        let lexed = Lexer::new(source).with_comments(false).tokenize().unwrap();
        assert!(lexed.comments.is_empty());
    }

    #[test]
    fn test_preprocessor_lines_skipped() {
        let source = "#define M(a) \\\n  (a + 1)\n#include <stdio.h>\nint x;";
        assert_eq!(
            kinds(source),
            vec![
                TokenKind::Int,
                TokenKind::Identifier,
                TokenKind::SemiColon,
                TokenKind::EndOfFile,
            ]
        );
    }

    #[test]
    fn test_end_of_file_sits_at_input_length() {
        let lexed = Lexer::new("x;  \n").tokenize().unwrap();
        let eof = lexed.tokens.last().unwrap();
        assert_eq!(eof.range, TextRange::empty(TextSize::from(5)));
    }

    #[test]
    fn test_completion_truncates_identifier() {
        let lexed = Lexer::new("int value = fooba + 1;")
            .with_completion_offset(TextSize::from(15))
            .tokenize()
            .unwrap();
        let cursor = &lexed.tokens[lexed.tokens.len() - 2];
        assert!(cursor.completion);
        assert_eq!(cursor.text, "foo");
        assert_eq!(cursor.range, TextRange::new(12.into(), 15.into()));
        assert_eq!(
            TokenKind::from_raw(lexed.tokens.last().unwrap().kind),
            Some(TokenKind::EndOfFile)
        );
    }

    #[test]
    fn test_completion_between_tokens_inserts_empty_identifier() {
        let lexed = Lexer::new("s. x")
            .with_completion_offset(TextSize::from(2))
            .tokenize()
            .unwrap();
        let texts: Vec<(&str, bool)> = lexed
            .tokens
            .iter()
            .map(|t| (t.text.as_str(), t.completion))
            .collect();
        assert_eq!(texts, vec![("s", false), (".", false), ("", true), ("", false)]);
    }

    #[test]
    fn test_completion_inside_multibyte_char_snaps_back() {
        let lexed = Lexer::new("s = \"\u{e9}\";")
            .with_completion_offset(TextSize::from(6))
            .tokenize()
            .unwrap();
        let cursor = &lexed.tokens[lexed.tokens.len() - 2];
        assert!(cursor.completion);
        assert_eq!(cursor.text, "");
        assert_eq!(cursor.range, TextRange::empty(TextSize::from(5)));
    }

    #[test]
    fn test_gnu_dialect_shifts_raw_ids() {
        let c99 = Lexer::new("x").tokenize().unwrap();
        let gnu = Lexer::new("x").with_dialect(Dialect::Gnu).tokenize().unwrap();
        assert_ne!(c99.tokens[0].kind, gnu.tokens[0].kind);
        assert_eq!(
            Dialect::Gnu.kind_map().map_kind(gnu.tokens[0].kind),
            TokenKind::Identifier
        );
    }

    #[test]
    fn test_unterminated_string_reports_position() {
        let error = Lexer::new("x;\n  \"open").tokenize().unwrap_err();
        assert_eq!(
            error,
            LexError::Unterminated {
                what: "string literal",
                line: 2,
                column: 3,
            }
        );
    }

    #[test]
    fn test_unexpected_character() {
        let error = Lexer::new("a @ b").tokenize().unwrap_err();
        assert_eq!(
            error,
            LexError::UnexpectedChar {
                ch: '@',
                line: 1,
                column: 3,
            }
        );
    }
}
