//! Keyword, builtin-type and preprocessor-keyword tables.
//!
//! Built once from canonical kind ids and immutable afterwards.

use std::sync::LazyLock;

use rustc_hash::{FxHashMap, FxHashSet};

use super::kind::TokenKind;

const KEYWORD_KINDS: &[TokenKind] = &[
    TokenKind::Auto,
    TokenKind::Break,
    TokenKind::Case,
    TokenKind::Char,
    TokenKind::Const,
    TokenKind::Continue,
    TokenKind::Default,
    TokenKind::Do,
    TokenKind::Double,
    TokenKind::Else,
    TokenKind::Enum,
    TokenKind::Extern,
    TokenKind::Float,
    TokenKind::For,
    TokenKind::Goto,
    TokenKind::If,
    TokenKind::Inline,
    TokenKind::Int,
    TokenKind::Long,
    TokenKind::Register,
    TokenKind::Restrict,
    TokenKind::Return,
    TokenKind::Short,
    TokenKind::Signed,
    TokenKind::Sizeof,
    TokenKind::Static,
    TokenKind::Struct,
    TokenKind::Switch,
    TokenKind::Typedef,
    TokenKind::Union,
    TokenKind::Unsigned,
    TokenKind::Void,
    TokenKind::Volatile,
    TokenKind::While,
    TokenKind::Bool,
    TokenKind::Complex,
    TokenKind::Imaginary,
];

const BUILTIN_TYPE_KINDS: &[TokenKind] = &[
    TokenKind::Void,
    TokenKind::Char,
    TokenKind::Short,
    TokenKind::Int,
    TokenKind::Long,
    TokenKind::Float,
    TokenKind::Double,
    TokenKind::Signed,
    TokenKind::Unsigned,
    TokenKind::Bool,
    TokenKind::Complex,
    TokenKind::Imaginary,
];

const PREPROCESSOR_KEYWORDS: &[&str] = &[
    "define", "elif", "else", "endif", "error", "if", "ifdef", "ifndef", "include", "line",
    "pragma", "undef", "warning",
];

static C99: LazyLock<Keywords> = LazyLock::new(Keywords::build);

/// Membership tables over keyword text.
#[derive(Debug)]
pub struct Keywords {
    keywords: FxHashMap<&'static str, TokenKind>,
    builtin_types: FxHashSet<&'static str>,
    preprocessor: FxHashSet<&'static str>,
}

impl Keywords {
    /// The shared C99 tables.
    pub fn c99() -> &'static Keywords {
        &C99
    }

    fn build() -> Self {
        Self {
            keywords: KEYWORD_KINDS
                .iter()
                .map(|&kind| (kind.symbol_name(), kind))
                .collect(),
            builtin_types: BUILTIN_TYPE_KINDS
                .iter()
                .map(|kind| kind.symbol_name())
                .collect(),
            preprocessor: PREPROCESSOR_KEYWORDS.iter().copied().collect(),
        }
    }

    /// Keyword kind for identifier-shaped text.
    pub fn lookup(&self, text: &str) -> Option<TokenKind> {
        self.keywords.get(text).copied()
    }

    pub fn is_keyword(&self, text: &str) -> bool {
        self.keywords.contains_key(text)
    }

    pub fn is_builtin_type(&self, text: &str) -> bool {
        self.builtin_types.contains(text)
    }

    pub fn is_preprocessor_keyword(&self, text: &str) -> bool {
        self.preprocessor.contains(text)
    }

    /// Keywords starting with `prefix`, sorted.
    pub fn keywords_with_prefix(&self, prefix: &str) -> Vec<&'static str> {
        let mut found: Vec<_> = self
            .keywords
            .keys()
            .copied()
            .filter(|keyword| keyword.starts_with(prefix))
            .collect();
        found.sort_unstable();
        found
    }

    /// Preprocessor directive names starting with `prefix`, sorted.
    pub fn preprocessor_keywords_with_prefix(&self, prefix: &str) -> Vec<&'static str> {
        let mut found: Vec<_> = self
            .preprocessor
            .iter()
            .copied()
            .filter(|keyword| keyword.starts_with(prefix))
            .collect();
        found.sort_unstable();
        found
    }
}
