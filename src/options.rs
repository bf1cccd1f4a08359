use text_size::TextSize;

use crate::tokens::Dialect;

/// Knobs for one call to [`parse`](crate::parse).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParseOptions {
    /// Token numbering the lexer emits; the engine normalizes it back.
    pub dialect: Dialect,
    /// Cursor offset of a content-assist parse. The token stream ends at
    /// the cursor and the identifier prefix there is marked.
    pub completion_offset: Option<TextSize>,
    /// Keep comments and attach them under the translation unit.
    pub collect_comments: bool,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            dialect: Dialect::C99,
            completion_offset: None,
            collect_comments: true,
        }
    }
}

impl ParseOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_dialect(mut self, dialect: Dialect) -> Self {
        self.dialect = dialect;
        self
    }

    pub fn with_completion_offset(mut self, offset: impl Into<TextSize>) -> Self {
        self.completion_offset = Some(offset.into());
        self
    }

    pub fn with_comments(mut self, collect: bool) -> Self {
        self.collect_comments = collect;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_overrides_defaults() {
        let options = ParseOptions::new()
            .with_dialect(Dialect::Gnu)
            .with_completion_offset(12u32)
            .with_comments(false);
        assert_eq!(options.dialect, Dialect::Gnu);
        assert_eq!(options.completion_offset, Some(TextSize::from(12)));
        assert!(!options.collect_comments);
        assert!(ParseOptions::default().collect_comments);
    }
}
