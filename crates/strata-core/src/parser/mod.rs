//! Parser adapters and the directory-level parser manager.
//!
//! ## Components
//!
//! - `Parser` trait - Common interface for language adapters
//! - `ParserRegistry` - Maps languages to adapters
//! - `ParserManager` - Walks a directory and builds an `AstIndex`
//!
//! ## Supported Languages
//!
//! - Java (tree-sitter, class-based; feeds the hierarchy resolver)
//! - Go (tree-sitter, functions/types/calls only)

mod error;
mod go;
mod java;
mod manager;
mod registry;
mod traits;
mod treesitter;

pub use error::{BuildError, ParseError};
pub use go::GoParser;
pub use java::JavaParser;
pub use manager::ParserManager;
pub use registry::ParserRegistry;
pub use traits::Parser;
