//! # Introduction
//!
//! Cactus builds a span-annotated syntax tree for C99 source from the
//! reductions of a bottom-up recognizer. Each grammar production fires one
//! semantic action; the actions pop the nodes built for the production's
//! children off a scoped stack, assemble the parent, give it the byte range
//! of the production's tokens and push it back.
//!
//! ## Pipeline
//!
//! ```text
//! Source → Lexer → Tokens → Driver → Engine actions → AST
//! ```
//!
//! 1. [`lexer`]: turns source into [`tokens::Token`]s in the id space of a
//!    [`tokens::Dialect`], stopping at the cursor for content assist.
//! 2. [`driver`]: a reference recursive-descent recognizer that fires the
//!    actions in the order an LR recognizer would.
//! 3. [`engine`]: the actions themselves, including the rewrites for
//!    `sizeof (x)`, `(i) & 1`, `i;` and `f(x);`, and problem nodes for
//!    skipped input.
//! 4. [`factory`]: the overridable constructor every node goes through.
//! 5. [`ast`]: the arena tree, its roles and an indented dump.
//!
//! ## Example
//!
//! ```
//! use cactus::{ast::dump::dump, parse, ParseOptions};
//!
//! let output = parse("int x = 1;", &ParseOptions::default()).unwrap();
//! let unit = output.translation_unit.unwrap();
//! assert!(dump(&output.ast, unit).starts_with("TranslationUnit 0..10"));
//! assert!(!output.has_error);
//! ```

pub mod ast;
pub mod driver;
pub mod engine;
pub mod error;
pub mod factory;
pub mod lexer;
pub mod options;
pub mod stack;
pub mod tokens;

use tracing::debug;

pub use engine::{CompletionNode, ParseOutput};
pub use error::{LexError, SyntaxError};
pub use options::ParseOptions;

use factory::{DefaultNodeFactory, NodeFactory};
use lexer::Lexer;

/// Lexes and parses `source` with the default node factory.
///
/// Syntax errors do not fail the parse: malformed items become problem
/// nodes and [`ParseOutput::has_error`] is set. Only input the lexer cannot
/// tokenize is an error.
pub fn parse(source: &str, options: &ParseOptions) -> Result<ParseOutput, LexError> {
    parse_with_factory(source, options, &DefaultNodeFactory)
}

/// Like [`parse`], building every node through `factory`.
pub fn parse_with_factory(
    source: &str,
    options: &ParseOptions,
    factory: &dyn NodeFactory,
) -> Result<ParseOutput, LexError> {
    let mut lexer = Lexer::new(source)
        .with_dialect(options.dialect)
        .with_comments(options.collect_comments);
    if let Some(offset) = options.completion_offset {
        lexer = lexer.with_completion_offset(offset);
    }
    let lexed = lexer.tokenize()?;
    debug!(
        tokens = lexed.tokens.len(),
        comments = lexed.comments.len(),
        dialect = ?options.dialect,
        "lexed"
    );

    let kinds = options.dialect.kind_map();
    Ok(driver::parse_tokens(&lexed.tokens, &lexed.comments, &kinds, factory))
}
