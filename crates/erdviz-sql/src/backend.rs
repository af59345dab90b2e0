//! Parser backend contract
//!
//! Each backend attempts a full structural parse of DDL text. The composite
//! parser holds an ordered list of them and falls through on error.

use crate::dialect::SqlDialect;
use crate::grammar::GrammarParser;
use crate::regex_fallback::RegexFallbackParser;
use crate::vendor::VendorParser;
use erdviz_core::DatabaseModel;

/// Errors reported by a single backend
#[derive(Debug, thiserror::Error)]
pub enum BackendError {
    #[error("syntax error: {0}")]
    Syntax(String),

    #[error("no table definitions found")]
    NoTables,

    #[error("invalid pattern: {0}")]
    Pattern(String),
}

impl From<regex::Error> for BackendError {
    fn from(e: regex::Error) -> Self {
        BackendError::Pattern(e.to_string())
    }
}

/// Model produced by a backend plus non-fatal notes
#[derive(Debug, Clone)]
pub struct BackendOutput {
    pub model: DatabaseModel,
    pub warnings: Vec<String>,
}

impl BackendOutput {
    pub fn new(model: DatabaseModel) -> Self {
        Self {
            model,
            warnings: Vec::new(),
        }
    }
}

/// A DDL parsing strategy
pub trait DialectParser {
    /// Short name used in logs and warnings
    fn name(&self) -> &'static str;

    /// Whether this backend can handle the (resolved) dialect
    fn supports(&self, dialect: SqlDialect) -> bool;

    /// Parse DDL into a model with unset relation types
    fn parse(&self, sql: &str, dialect: SqlDialect) -> Result<BackendOutput, BackendError>;
}

/// The closed set of backends, in their default priority order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParserBackend {
    /// sqlparser-based grammar
    Grammar,

    /// Hand-written DDL reader tolerant of vendor extensions
    Vendor,

    /// Permissive regex scan
    Regex,
}

impl ParserBackend {
    /// Default priority order
    pub fn all() -> Vec<Self> {
        vec![Self::Grammar, Self::Vendor, Self::Regex]
    }
}

impl DialectParser for ParserBackend {
    fn name(&self) -> &'static str {
        match self {
            Self::Grammar => GrammarParser.name(),
            Self::Vendor => VendorParser.name(),
            Self::Regex => RegexFallbackParser.name(),
        }
    }

    fn supports(&self, dialect: SqlDialect) -> bool {
        match self {
            Self::Grammar => GrammarParser.supports(dialect),
            Self::Vendor => VendorParser.supports(dialect),
            Self::Regex => RegexFallbackParser.supports(dialect),
        }
    }

    fn parse(&self, sql: &str, dialect: SqlDialect) -> Result<BackendOutput, BackendError> {
        match self {
            Self::Grammar => GrammarParser.parse(sql, dialect),
            Self::Vendor => VendorParser.parse(sql, dialect),
            Self::Regex => RegexFallbackParser.parse(sql, dialect),
        }
    }
}
