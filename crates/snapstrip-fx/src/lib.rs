//! # snapstrip-fx
//!
//! Drawing-surface filters. A filter expression uses the CSS `filter` grammar
//! (`none`, or a chain such as `sepia(60%) contrast(110%) blur(1px)`); it is
//! tokenized, parsed into a [`FilterChain`] and applied to RGBA frame buffers
//! on the CPU. The [`FilterCatalog`] maps filter identifiers to parsed chains.

pub mod apply;
pub mod ast;
pub mod catalog;
pub mod lexer;
pub mod parser;

pub use apply::apply_chain;
pub use ast::{FilterChain, FilterOp};
pub use catalog::{FilterCatalog, FilterDescriptor, NONE_FILTER};

use snapstrip_core::SnapResult;

/// Parse a filter expression into a chain of operations.
pub fn parse(src: &str) -> SnapResult<FilterChain> {
    let mut lexer = lexer::Lexer::new(src);
    let tokens = lexer.tokenize()?;
    let mut parser = parser::Parser::new(tokens);
    parser.parse()
}
