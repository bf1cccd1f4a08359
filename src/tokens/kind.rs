//! Canonical token kinds and the [`Token`] handed from the lexer to the
//! driver and the action engine.
//!
//! Every generated grammar variant numbers its terminals differently. The
//! numbering below is the canonical one: [`SYMBOL_NAMES`] is indexed by
//! `TokenKind as u16`, and dialect tables are matched against it by name.

use std::fmt;

use text_size::TextRange;

macro_rules! token_kinds {
    ($($variant:ident => $name:literal,)*) => {
        /// Canonical token kind.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        #[repr(u16)]
        pub enum TokenKind {
            $($variant,)*
        }

        /// Canonical symbol names, indexed by kind id.
        pub const SYMBOL_NAMES: &[&str] = &[$($name,)*];

        impl TokenKind {
            const ALL: &'static [TokenKind] = &[$(TokenKind::$variant,)*];

            /// Kind for a canonical id, if the id is in range.
            pub fn from_raw(raw: u16) -> Option<Self> {
                Self::ALL.get(raw as usize).copied()
            }
        }
    };
}

token_kinds! {
    Invalid => "<invalid>",
    EndOfFile => "EOF_TOKEN",
    Identifier => "identifier",
    IntegerConstant => "integer",
    FloatingConstant => "floating",
    CharConstant => "charconst",
    StringLiteral => "stringlit",
    SingleLineComment => "SingleLineComment",
    MultiLineComment => "MultiLineComment",

    Auto => "auto",
    Break => "break",
    Case => "case",
    Char => "char",
    Const => "const",
    Continue => "continue",
    Default => "default",
    Do => "do",
    Double => "double",
    Else => "else",
    Enum => "enum",
    Extern => "extern",
    Float => "float",
    For => "for",
    Goto => "goto",
    If => "if",
    Inline => "inline",
    Int => "int",
    Long => "long",
    Register => "register",
    Restrict => "restrict",
    Return => "return",
    Short => "short",
    Signed => "signed",
    Sizeof => "sizeof",
    Static => "static",
    Struct => "struct",
    Switch => "switch",
    Typedef => "typedef",
    Union => "union",
    Unsigned => "unsigned",
    Void => "void",
    Volatile => "volatile",
    While => "while",
    Bool => "_Bool",
    Complex => "_Complex",
    Imaginary => "_Imaginary",

    LeftBracket => "[",
    RightBracket => "]",
    LeftParen => "(",
    RightParen => ")",
    LeftBrace => "{",
    RightBrace => "}",
    Dot => ".",
    Arrow => "->",
    PlusPlus => "++",
    MinusMinus => "--",
    And => "&",
    Star => "*",
    Plus => "+",
    Minus => "-",
    Tilde => "~",
    Bang => "!",
    Slash => "/",
    Percent => "%",
    LeftShift => "<<",
    RightShift => ">>",
    LessThan => "<",
    GreaterThan => ">",
    LessEqual => "<=",
    GreaterEqual => ">=",
    EqualEqual => "==",
    NotEqual => "!=",
    Caret => "^",
    Or => "|",
    AndAnd => "&&",
    OrOr => "||",
    Question => "?",
    Colon => ":",
    SemiColon => ";",
    DotDotDot => "...",
    Assign => "=",
    StarAssign => "*=",
    SlashAssign => "/=",
    PercentAssign => "%=",
    PlusAssign => "+=",
    MinusAssign => "-=",
    LeftShiftAssign => "<<=",
    RightShiftAssign => ">>=",
    AndAssign => "&=",
    CaretAssign => "^=",
    OrAssign => "|=",
    Comma => ",",
}

impl TokenKind {
    pub fn raw(self) -> u16 {
        self as u16
    }

    pub fn symbol_name(self) -> &'static str {
        SYMBOL_NAMES[self as usize]
    }

    pub fn is_comment(self) -> bool {
        matches!(self, TokenKind::SingleLineComment | TokenKind::MultiLineComment)
    }

    pub fn is_literal(self) -> bool {
        matches!(
            self,
            TokenKind::IntegerConstant
                | TokenKind::FloatingConstant
                | TokenKind::CharConstant
                | TokenKind::StringLiteral
        )
    }

    /// Storage class, function specifier, qualifier or arithmetic type keyword.
    pub fn is_simple_specifier(self) -> bool {
        self.is_storage_class()
            || self.is_type_qualifier()
            || self.is_arithmetic_type()
            || self == TokenKind::Inline
    }

    pub fn is_storage_class(self) -> bool {
        matches!(
            self,
            TokenKind::Typedef
                | TokenKind::Extern
                | TokenKind::Static
                | TokenKind::Auto
                | TokenKind::Register
        )
    }

    pub fn is_type_qualifier(self) -> bool {
        matches!(self, TokenKind::Const | TokenKind::Volatile | TokenKind::Restrict)
    }

    pub fn is_arithmetic_type(self) -> bool {
        matches!(
            self,
            TokenKind::Void
                | TokenKind::Char
                | TokenKind::Short
                | TokenKind::Int
                | TokenKind::Long
                | TokenKind::Float
                | TokenKind::Double
                | TokenKind::Signed
                | TokenKind::Unsigned
                | TokenKind::Bool
                | TokenKind::Complex
                | TokenKind::Imaginary
        )
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenKind::EndOfFile => write!(f, "end of file"),
            TokenKind::Identifier => write!(f, "identifier"),
            TokenKind::IntegerConstant
            | TokenKind::FloatingConstant
            | TokenKind::CharConstant
            | TokenKind::StringLiteral => write!(f, "literal"),
            other => write!(f, "'{}'", other.symbol_name()),
        }
    }
}

/// A lexical unit.
///
/// `kind` is a raw id in the id space of whichever dialect produced the
/// token; consumers normalize it through a
/// [`KindMap`](crate::tokens::KindMap) before dispatching on it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: u16,
    pub text: String,
    pub range: TextRange,
    /// Set on the identifier under the cursor of a content-assist parse.
    pub completion: bool,
}

impl Token {
    pub fn new(kind: u16, text: impl Into<String>, range: TextRange) -> Self {
        Self {
            kind,
            text: text.into(),
            range,
            completion: false,
        }
    }
}
