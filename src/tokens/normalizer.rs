//! Token kind normalization across grammar dialects.
//!
//! A dialect is described only by its symbol-name array: position `i`
//! holds the name of the terminal the dialect numbers `i`. Two arrays are
//! matched by name, so one action table can serve every dialect that
//! shares the canonical terminal names.

use std::sync::LazyLock;

use rustc_hash::FxHashMap;

use super::kind::{TokenKind, SYMBOL_NAMES};

/// Terminals present in the GNU dialect but not in the canonical C99 table.
const GNU_EXTENSIONS: &[&str] = &[
    "__asm__",
    "__attribute__",
    "__extension__",
    "__typeof__",
    "__builtin_va_arg",
    "__builtin_offsetof",
    "__label__",
];

static GNU_SYMBOL_NAMES: LazyLock<Vec<&'static str>> = LazyLock::new(|| {
    GNU_EXTENSIONS
        .iter()
        .chain(SYMBOL_NAMES.iter())
        .copied()
        .collect()
});

/// Grammar variants whose token ids the engine understands.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Dialect {
    #[default]
    C99,
    /// GNU extensions; its extension terminals take the low ids and shift
    /// every canonical kind upward.
    Gnu,
}

impl Dialect {
    pub fn symbol_names(self) -> &'static [&'static str] {
        match self {
            Dialect::C99 => SYMBOL_NAMES,
            Dialect::Gnu => GNU_SYMBOL_NAMES.as_slice(),
        }
    }

    pub fn kind_map(self) -> KindMap {
        KindMap::new(self.symbol_names(), SYMBOL_NAMES)
    }
}

/// Maps raw dialect ids onto [`TokenKind`] and back.
#[derive(Debug, Clone)]
pub struct KindMap {
    identity: bool,
    to_canonical: Vec<TokenKind>,
    to_dialect: Vec<Option<u16>>,
}

impl KindMap {
    /// Builds the map from the dialect's symbol names (`source`) onto the
    /// canonical names (`target`).
    pub fn new(source: &[&str], target: &[&str]) -> Self {
        if source == target {
            return Self::identity();
        }

        let index: FxHashMap<&str, u16> = target
            .iter()
            .enumerate()
            .map(|(id, name)| (*name, id as u16))
            .collect();

        let to_canonical: Vec<TokenKind> = source
            .iter()
            .map(|name| {
                index
                    .get(name)
                    .and_then(|&id| TokenKind::from_raw(id))
                    .unwrap_or(TokenKind::Invalid)
            })
            .collect();

        let mut to_dialect = vec![None; target.len()];
        for (raw, kind) in to_canonical.iter().enumerate() {
            if *kind != TokenKind::Invalid {
                to_dialect[kind.raw() as usize] = Some(raw as u16);
            }
        }

        Self {
            identity: false,
            to_canonical,
            to_dialect,
        }
    }

    pub fn identity() -> Self {
        Self {
            identity: true,
            to_canonical: Vec::new(),
            to_dialect: Vec::new(),
        }
    }

    pub fn is_identity(&self) -> bool {
        self.identity
    }

    /// Canonical kind for a raw dialect id; [`TokenKind::Invalid`] when the
    /// dialect terminal has no canonical counterpart.
    pub fn map_kind(&self, raw: u16) -> TokenKind {
        if self.identity {
            return TokenKind::from_raw(raw).unwrap_or(TokenKind::Invalid);
        }
        self.to_canonical
            .get(raw as usize)
            .copied()
            .unwrap_or(TokenKind::Invalid)
    }

    /// Raw dialect id for a canonical kind.
    pub fn to_dialect(&self, kind: TokenKind) -> Option<u16> {
        if self.identity {
            return Some(kind.raw());
        }
        self.to_dialect.get(kind.raw() as usize).copied().flatten()
    }
}

impl Default for KindMap {
    fn default() -> Self {
        Self::identity()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identical_tables_take_fast_path() {
        let map = Dialect::C99.kind_map();
        assert!(map.is_identity());
        assert_eq!(map.map_kind(TokenKind::Comma.raw()), TokenKind::Comma);
        assert_eq!(map.map_kind(u16::MAX), TokenKind::Invalid);
    }

    #[test]
    fn test_gnu_ids_are_shifted() {
        let map = Dialect::Gnu.kind_map();
        assert!(!map.is_identity());

        let shift = GNU_EXTENSIONS.len() as u16;
        assert_eq!(map.map_kind(TokenKind::Struct.raw() + shift), TokenKind::Struct);
        assert_eq!(map.to_dialect(TokenKind::Struct), Some(TokenKind::Struct.raw() + shift));
    }

    #[test]
    fn test_extension_terminals_map_to_invalid() {
        let map = Dialect::Gnu.kind_map();
        assert_eq!(map.map_kind(0), TokenKind::Invalid);
        assert_eq!(map.map_kind(1), TokenKind::Invalid);
        assert_eq!(map.map_kind(9999), TokenKind::Invalid);
    }

    #[test]
    fn test_partial_table_by_name() {
        let source = ["while", "identifier", "bogus"];
        let map = KindMap::new(&source, SYMBOL_NAMES);
        assert_eq!(map.map_kind(0), TokenKind::While);
        assert_eq!(map.map_kind(1), TokenKind::Identifier);
        assert_eq!(map.map_kind(2), TokenKind::Invalid);
        assert_eq!(map.to_dialect(TokenKind::Comma), None);
    }
}
