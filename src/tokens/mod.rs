//! Tokens shared by the lexer, the driver and the action engine
//!
//! - [`kind`]: canonical [`TokenKind`] ids and the [`Token`] struct
//! - [`normalizer`]: [`KindMap`] from dialect ids to canonical ids
//! - [`keywords`]: immutable keyword / builtin-type / directive tables

pub mod keywords;
pub mod kind;
pub mod normalizer;

pub use keywords::Keywords;
pub use kind::{Token, TokenKind, SYMBOL_NAMES};
pub use normalizer::{Dialect, KindMap};
