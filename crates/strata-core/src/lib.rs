pub mod ast;
pub mod config;
pub mod hierarchy;
pub mod parser;
pub mod query;
pub mod service;
pub mod storage;

pub use ast::{AstIndex, AstNode, ClassRef, FieldInfo, IndexStats, Language, NodeKind};
pub use config::{CacheConfig, Config, ConfigError, RepositoryConfig, SearchConfig};
pub use hierarchy::resolve_class_hierarchy;
pub use parser::{BuildError, GoParser, JavaParser, ParseError, Parser, ParserManager, ParserRegistry};
pub use query::{
    format_search_results, unified_search, ClassSpecifier, MethodSignature, NodeQuery, QueryEngine,
    QueryError, SearchOptions, SearchRequest, SearchTarget, Searcher,
};
pub use service::{IndexService, IndexSource, ServiceError};
pub use storage::{CacheInfo, CacheSnapshot, FileIndexStore, IndexStore, StorageError};
