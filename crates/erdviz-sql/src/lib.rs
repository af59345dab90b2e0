//! DDL parsing into the schema model
//!
//! This crate handles:
//! - Dialect detection and preprocessing of client-only syntax
//! - Three parser backends: sqlparser grammar, vendor DDL reader, regex fallback
//! - The composite parser that tries them in order and never fails loudly

pub mod backend;
pub mod builder;
pub mod composite;
pub mod dialect;
pub mod grammar;
pub mod lexer;
pub mod preprocess;
pub mod regex_fallback;
pub mod types;
pub mod vendor;

pub use backend::{BackendError, BackendOutput, DialectParser, ParserBackend};
pub use composite::CompositeSqlParser;
pub use dialect::SqlDialect;
pub use grammar::GrammarParser;
pub use preprocess::preprocess_sql;
pub use regex_fallback::RegexFallbackParser;
pub use vendor::VendorParser;
