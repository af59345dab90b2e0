//! Composite parser: ordered backends with fallback
//!
//! Each backend runs in priority order on preprocessed text. The first one
//! that produces tables wins; failures are logged and the next one is tried.
//! Nothing here returns an error: total failure is a failed `ParseResult`.

use crate::backend::{DialectParser, ParserBackend};
use crate::dialect::SqlDialect;
use crate::preprocess::preprocess_sql;
use erdviz_core::ParseResult;

/// Multi-strategy DDL parser
#[derive(Debug, Clone)]
pub struct CompositeSqlParser {
    backends: Vec<ParserBackend>,
}

impl CompositeSqlParser {
    /// Grammar, then vendor, then regex fallback
    pub fn new() -> Self {
        Self {
            backends: ParserBackend::all(),
        }
    }

    /// Use a custom backend order
    pub fn with_backends(backends: Vec<ParserBackend>) -> Self {
        Self { backends }
    }

    /// Parse DDL text with a dialect hint (`mysql`, `postgres`, `auto`, ...)
    pub fn parse(&self, sql: &str, dialect_hint: &str) -> ParseResult {
        if sql.trim().is_empty() {
            return ParseResult::failure("SQL text is empty");
        }

        let sql = preprocess_sql(sql);
        let dialect = SqlDialect::from_hint(dialect_hint).resolve(&sql);
        let expects_tables = mentions_create_table(&sql);
        tracing::info!("Parsing SQL as {} ({} bytes)", dialect, sql.len());

        let mut attempts = Vec::new();

        for backend in &self.backends {
            if !backend.supports(dialect) {
                tracing::debug!("Backend {} does not support {}", backend.name(), dialect);
                continue;
            }

            tracing::info!("Trying {} parser", backend.name());
            match backend.parse(&sql, dialect) {
                Ok(output) if output.model.tables.is_empty() && expects_tables => {
                    tracing::debug!("{} parser found no tables", backend.name());
                    attempts.push(format!("{}: no tables parsed", backend.name()));
                }
                Ok(output) => {
                    let mut model = output.model;
                    model.metadata.insert("parser".to_string(), backend.name().to_string());
                    model.metadata.insert("dialect".to_string(), dialect.as_str().to_string());

                    tracing::info!(
                        "{} parser succeeded: {} tables, {} foreign keys",
                        backend.name(),
                        model.table_count(),
                        model.foreign_key_count()
                    );

                    let mut warnings = vec![format!("Parsed with {}", backend.name())];
                    warnings.extend(output.warnings);
                    warnings.extend(attempts);
                    return ParseResult::success(model, warnings);
                }
                Err(e) => {
                    tracing::debug!("{} parser failed: {}", backend.name(), e);
                    attempts.push(format!("{}: {}", backend.name(), e));
                }
            }
        }

        tracing::error!("All parsing strategies failed");
        ParseResult::failure_with_errors("All parsing strategies failed", attempts)
    }
}

impl Default for CompositeSqlParser {
    fn default() -> Self {
        Self::new()
    }
}

/// Whether the text contains `CREATE [TEMPORARY] TABLE`, ignoring case and spacing
fn mentions_create_table(sql: &str) -> bool {
    let words: Vec<String> = sql.split_whitespace().map(str::to_uppercase).collect();
    words.windows(2).any(|w| w[0] == "CREATE" && w[1] == "TABLE")
        || words
            .windows(3)
            .any(|w| w[0] == "CREATE" && w[1].starts_with("TEMP") && w[2] == "TABLE")
}
