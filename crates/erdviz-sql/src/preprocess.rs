//! Removal of client-only syntax before parsing
//!
//! MySQL dumps carry `DELIMITER` commands and trigger bodies that no DDL
//! grammar accepts. They are stripped here; table definitions are untouched.

use regex::Regex;
use std::sync::OnceLock;

struct Patterns {
    delimiter: Regex,
    drop_trigger: Regex,
    create_trigger: Regex,
    double_semicolon: Regex,
    blank_lines: Regex,
}

impl Patterns {
    fn compile() -> Result<Self, regex::Error> {
        Ok(Self {
            delimiter: Regex::new(r"(?im)^\s*delimiter\s+\S+\s*$")?,
            drop_trigger: Regex::new(r"(?is)DROP\s+TRIGGER\s+(?:IF\s+EXISTS\s+)?[`\w.]+\s*;+")?,
            create_trigger: Regex::new(r"(?is)CREATE\s+(?:DEFINER\s*=\s*\S+\s+)?TRIGGER\b.*?\bEND\s*(?:;;|;|\$\$)")?,
            double_semicolon: Regex::new(r";;")?,
            blank_lines: Regex::new(r"\n[ \t]*\n(?:[ \t]*\n)+")?,
        })
    }
}

static PATTERNS: OnceLock<Result<Patterns, regex::Error>> = OnceLock::new();

/// Strip MySQL client syntax (DELIMITER, triggers, `;;`) from DDL text
///
/// Returns the input unchanged if the patterns cannot be compiled.
pub fn preprocess_sql(sql: &str) -> String {
    let patterns = match PATTERNS.get_or_init(Patterns::compile) {
        Ok(patterns) => patterns,
        Err(e) => {
            tracing::warn!("SQL preprocessing disabled: {}", e);
            return sql.to_string();
        }
    };

    tracing::debug!("Preprocessing SQL, original length {}", sql.len());

    let sql = patterns.drop_trigger.replace_all(sql, "");
    let sql = patterns.create_trigger.replace_all(&sql, "");
    let sql = patterns.delimiter.replace_all(&sql, "");
    let sql = patterns.double_semicolon.replace_all(&sql, ";");
    let sql = patterns.blank_lines.replace_all(&sql, "\n\n");

    tracing::debug!("Preprocessed SQL length {}", sql.len());
    sql.into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn removes_delimiter_and_triggers() {
        let sql = "CREATE TABLE t (id INT);\n\
                   DROP TRIGGER IF EXISTS `trg_t`;\n\
                   delimiter ;;\n\
                   CREATE TRIGGER trg_t BEFORE INSERT ON t FOR EACH ROW BEGIN SET NEW.id = 1; END;;\n\
                   delimiter ;\n\
                   CREATE TABLE u (id INT);";

        let cleaned = preprocess_sql(sql);
        assert!(!cleaned.to_lowercase().contains("delimiter"));
        assert!(!cleaned.contains("TRIGGER"));
        assert!(cleaned.contains("CREATE TABLE t (id INT);"));
        assert!(cleaned.contains("CREATE TABLE u (id INT);"));
    }

    #[test]
    fn collapses_double_semicolons_and_blank_lines() {
        let cleaned = preprocess_sql("CREATE TABLE t (id INT);;\n\n\n\nCREATE TABLE u (id INT);");
        assert_eq!(cleaned, "CREATE TABLE t (id INT);\n\nCREATE TABLE u (id INT);");
    }

    #[test]
    fn leaves_plain_ddl_untouched() {
        let sql = "CREATE TABLE users (\n    id BIGINT PRIMARY KEY\n);";
        assert_eq!(preprocess_sql(sql), sql);
    }
}
