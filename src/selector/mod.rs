//! CSS Selector Module
//!
//! Compiles selector text into reusable matchers:
//! - lexer: tokenizes selector text
//! - parser: builds the selector AST
//! - compiler: lowers the AST into right-to-left match chains
//! - eval: matches chains against a `DocumentAccess` tree
//! - cache: LRU cache of compiled selectors keyed by text

pub mod cache;
pub mod compiler;
mod eval;
pub mod lexer;
pub mod parser;

pub use cache::{PredicateCache, DEFAULT_CACHE_CAPACITY};
pub use compiler::{compile, Selector};
