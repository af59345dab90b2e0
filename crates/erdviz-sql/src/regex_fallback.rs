//! Permissive regex backend
//!
//! Last resort when both grammars reject the input. Finds `CREATE TABLE`
//! heads, cuts each body at its matching parenthesis and classifies the
//! top-level definitions line by line. Anything unrecognised is skipped.

use crate::backend::{BackendError, BackendOutput, DialectParser};
use crate::builder::SchemaBuilder;
use crate::dialect::SqlDialect;
use crate::types::{
    normalize_action, object_name, parse_type, split_columns, split_top_level, unquote_literal,
};
use erdviz_core::{ColumnModel, ForeignKeyModel, IndexModel, PrimaryKeyModel, TableModel};
use regex::{Captures, Regex};
use std::sync::OnceLock;

const IDENT: &str = r#"[`"\[]?[\w$]+[`"\]]?"#;
const QUALIFIED: &str = r#"[`"\[\]\w$.]+"#;
const ACTION: &str = r"CASCADE|SET\s+NULL|SET\s+DEFAULT|RESTRICT|NO\s+ACTION";

struct Patterns {
    create_table: Regex,
    alter_table_add: Regex,
    table_comment: Regex,
    primary_key: Regex,
    foreign_key: Regex,
    key_index: Regex,
    unique: Regex,
    other_constraint: Regex,
    column: Regex,
    type_head: Regex,
    type_continuation: Regex,
    quoted: Regex,
    not_null: Regex,
    default_value: Regex,
    column_comment: Regex,
    auto_increment: Regex,
    inline_primary_key: Regex,
    inline_unique: Regex,
    references: Regex,
    on_delete: Regex,
    on_update: Regex,
}

impl Patterns {
    fn compile() -> Result<Self, regex::Error> {
        Ok(Self {
            create_table: Regex::new(&format!(
                r"(?i)\bCREATE\s+(?:TEMPORARY\s+)?TABLE\s+(?:IF\s+NOT\s+EXISTS\s+)?({})\s*\(",
                QUALIFIED
            ))?,
            alter_table_add: Regex::new(&format!(
                r"(?is)\bALTER\s+TABLE\s+(?:ONLY\s+)?({})\s+ADD\s+([^;]+)",
                QUALIFIED
            ))?,
            table_comment: Regex::new(r"(?i)\bCOMMENT\s*=?\s*'((?:[^']|'')*)'")?,
            primary_key: Regex::new(&format!(
                r"(?i)^(?:CONSTRAINT\s+({})\s+)?PRIMARY\s+KEY\s*(?:USING\s+\w+\s*)?\(([^)]+)\)",
                IDENT
            ))?,
            foreign_key: Regex::new(&format!(
                r"(?is)^(?:CONSTRAINT\s+({ident})\s+)?FOREIGN\s+KEY\s*(?:{ident}\s*)?\(([^)]+)\)\s*REFERENCES\s+({qualified})\s*\(([^)]+)\)",
                ident = IDENT,
                qualified = QUALIFIED
            ))?,
            key_index: Regex::new(&format!(
                r"(?i)^(?:CONSTRAINT\s+({ident})\s+)?(?:(UNIQUE|FULLTEXT|SPATIAL)\s+)?(?:KEY|INDEX)\b\s*({ident})?\s*(?:USING\s+\w+\s*)?\(([^)]+)\)",
                ident = IDENT
            ))?,
            unique: Regex::new(&format!(
                r"(?i)^(?:CONSTRAINT\s+({})\s+)?UNIQUE\s*\(([^)]+)\)",
                IDENT
            ))?,
            other_constraint: Regex::new(
                r"(?i)^(?:CONSTRAINT|CHECK|EXCLUDE|PERIOD|FOREIGN|PRIMARY|UNIQUE|FULLTEXT|SPATIAL|KEY|INDEX)\b",
            )?,
            column: Regex::new(&format!(r"(?s)^({})\s+(.+)$", IDENT))?,
            type_head: Regex::new(r"^[A-Za-z_]\w*(?:\s*\([^)]*\))?(?:\[\])*")?,
            type_continuation: Regex::new(
                r"(?i)^\s+(?:PRECISION|VARYING|UNSIGNED|SIGNED|ZEROFILL|WITH|WITHOUT|LOCAL|TIME|ZONE)\b(?:\s*\([^)]*\))?(?:\[\])*",
            )?,
            quoted: Regex::new(r"'(?:[^']|'')*'")?,
            not_null: Regex::new(r"(?i)\bNOT\s+NULL\b")?,
            default_value: Regex::new(r"(?i)\bDEFAULT\s+('(?:[^']|'')*'|\([^)]*\)|[^\s,]+(?:\(\))?)")?,
            column_comment: Regex::new(r"(?i)\bCOMMENT\s+'((?:[^']|'')*)'")?,
            auto_increment: Regex::new(r"(?i)\b(?:AUTO_INCREMENT|AUTOINCREMENT|IDENTITY)\b")?,
            inline_primary_key: Regex::new(r"(?i)\bPRIMARY\s+KEY\b")?,
            inline_unique: Regex::new(r"(?i)\bUNIQUE\b")?,
            references: Regex::new(&format!(
                r"(?i)\bREFERENCES\s+({})\s*(?:\(([^)]+)\))?",
                QUALIFIED
            ))?,
            on_delete: Regex::new(&format!(r"(?i)\bON\s+DELETE\s+({})", ACTION))?,
            on_update: Regex::new(&format!(r"(?i)\bON\s+UPDATE\s+({})", ACTION))?,
        })
    }
}

static PATTERNS: OnceLock<Result<Patterns, regex::Error>> = OnceLock::new();

fn patterns() -> Result<&'static Patterns, BackendError> {
    PATTERNS
        .get_or_init(Patterns::compile)
        .as_ref()
        .map_err(|e| BackendError::Pattern(e.to_string()))
}

/// A `CREATE TABLE` located in the text but not yet interpreted
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawTable {
    /// Name as written, possibly schema-qualified and quoted
    pub qualified_name: String,

    /// Text between the outer parentheses
    pub body: String,

    /// `COMMENT='...'` table option, if present
    pub comment: Option<String>,
}

/// Locate every `CREATE TABLE` and cut out its body
///
/// Statements whose parenthesis is never closed are skipped.
pub fn scan_tables(sql: &str) -> Result<Vec<RawTable>, BackendError> {
    Ok(scan(sql)?.0)
}

/// Tables found plus the names of statements left unterminated
fn scan(sql: &str) -> Result<(Vec<RawTable>, Vec<String>), BackendError> {
    let p = patterns()?;
    let cleaned = strip_comments(sql);

    let mut tables = Vec::new();
    let mut unterminated = Vec::new();
    let mut search_from = 0;

    while let Some(caps) = p.create_table.captures_at(&cleaned, search_from) {
        let (Some(head), Some(name)) = (caps.get(0), caps.get(1)) else {
            break;
        };
        let open = head.end() - 1;

        let Some(close) = matching_paren(&cleaned, open) else {
            tracing::debug!("Unterminated CREATE TABLE {}", name.as_str());
            unterminated.push(object_name(name.as_str()));
            search_from = head.end();
            continue;
        };

        let tail = &cleaned[close + 1..];
        let options = tail.split(';').next().unwrap_or_default();
        let comment = p
            .table_comment
            .captures(options)
            .and_then(|c| c.get(1))
            .map(|m| m.as_str().replace("''", "'"));

        tables.push(RawTable {
            qualified_name: name.as_str().to_string(),
            body: cleaned[open + 1..close].to_string(),
            comment,
        });
        search_from = close + 1;
    }

    Ok((tables, unterminated))
}

/// Remove `--` and `/* */` comments outside of quoted text
fn strip_comments(sql: &str) -> String {
    let mut out = String::with_capacity(sql.len());
    let mut chars = sql.chars().peekable();
    let mut quote: Option<char> = None;

    while let Some(c) = chars.next() {
        match quote {
            Some(q) => {
                if c == q {
                    quote = None;
                }
                out.push(c);
            }
            None => match c {
                '\'' | '"' | '`' => {
                    quote = Some(c);
                    out.push(c);
                }
                '-' if chars.peek() == Some(&'-') => {
                    while chars.peek().is_some_and(|n| *n != '\n') {
                        chars.next();
                    }
                }
                '/' if chars.peek() == Some(&'*') => {
                    chars.next();
                    let mut prev = '\0';
                    for n in chars.by_ref() {
                        if prev == '*' && n == '/' {
                            break;
                        }
                        prev = n;
                    }
                    out.push(' ');
                }
                _ => out.push(c),
            },
        }
    }

    out
}

/// Index of the parenthesis closing the one at `open`, ignoring quoted text
fn matching_paren(text: &str, open: usize) -> Option<usize> {
    let mut depth = 0usize;
    let mut quote: Option<char> = None;

    for (i, c) in text[open..].char_indices() {
        match quote {
            Some(q) => {
                if c == q {
                    quote = None;
                }
            }
            None => match c {
                '\'' | '"' | '`' => quote = Some(c),
                '(' => depth += 1,
                ')' => {
                    depth = depth.saturating_sub(1);
                    if depth == 0 {
                        return Some(open + i);
                    }
                }
                _ => {}
            },
        }
    }

    None
}

/// Regex-based DDL reader
#[derive(Debug, Clone, Copy, Default)]
pub struct RegexFallbackParser;

impl DialectParser for RegexFallbackParser {
    fn name(&self) -> &'static str {
        "regex"
    }

    fn supports(&self, _dialect: SqlDialect) -> bool {
        true
    }

    fn parse(&self, sql: &str, dialect: SqlDialect) -> Result<BackendOutput, BackendError> {
        let p = patterns()?;
        let mut builder = SchemaBuilder::new(dialect);
        builder.warn("Regex fallback may miss dialect-specific syntax");

        let (tables, unterminated) = scan(sql)?;
        for raw in tables {
            let table = parse_table(p, &raw);
            builder.add_table(&raw.qualified_name, table);
        }
        for name in unterminated {
            builder.warn(format!("Unterminated CREATE TABLE {} skipped", name));
        }

        if builder.table_count() == 0 {
            return Err(BackendError::NoTables);
        }

        for caps in p.alter_table_add.captures_iter(&strip_comments(sql)) {
            let table_name = object_name(&caps[1]);
            let clause = caps[2].trim();
            if let Some(fk) = p.foreign_key.captures(clause) {
                builder.defer_foreign_key(foreign_key(p, &table_name, &fk, clause));
            } else if let Some(pk) = p.primary_key.captures(clause) {
                builder.defer_primary_key(&table_name, primary_key(&pk));
            }
        }

        let (model, warnings) = builder.finish();
        Ok(BackendOutput { model, warnings })
    }
}

fn parse_table(p: &Patterns, raw: &RawTable) -> TableModel {
    let name = object_name(&raw.qualified_name);
    let mut table = TableModel::new(&name);
    table.comment = raw.comment.clone();

    let mut table_pk: Option<PrimaryKeyModel> = None;
    let mut inline_pk = Vec::new();

    for line in split_top_level(&raw.body) {
        if let Some(caps) = p.primary_key.captures(&line) {
            table_pk = Some(primary_key(&caps));
        } else if let Some(caps) = p.foreign_key.captures(&line) {
            table.foreign_keys.push(foreign_key(p, &name, &caps, &line));
        } else if let Some(caps) = p.key_index.captures(&line) {
            let kind = caps.get(2).map(|m| m.as_str().to_uppercase());
            table.indexes.push(IndexModel {
                name: caps.get(3).or(caps.get(1)).map(|m| object_name(m.as_str())),
                columns: split_columns(&caps[4]),
                unique: kind.as_deref() == Some("UNIQUE"),
                index_type: Some(kind.unwrap_or_else(|| "INDEX".to_string())),
            });
        } else if let Some(caps) = p.unique.captures(&line) {
            table.indexes.push(IndexModel {
                name: caps.get(1).map(|m| object_name(m.as_str())),
                columns: split_columns(&caps[2]),
                unique: true,
                index_type: Some("UNIQUE".to_string()),
            });
        } else if p.other_constraint.is_match(&line) {
            tracing::debug!("Skipping constraint in {}: {}", name, line);
        } else if let Some(caps) = p.column.captures(&line) {
            if let Some(column) = parse_column(p, &name, &caps, &mut table) {
                if column.primary_key_part {
                    inline_pk.push(column.name.clone());
                }
                table.columns.push(column);
            }
        }
    }

    match table_pk {
        Some(pk) => table.mark_primary_key(pk),
        None if !inline_pk.is_empty() => table.mark_primary_key(PrimaryKeyModel::new(inline_pk)),
        None => {}
    }

    table
}

fn primary_key(caps: &Captures) -> PrimaryKeyModel {
    PrimaryKeyModel {
        name: caps.get(1).map(|m| object_name(m.as_str())),
        columns: split_columns(&caps[2]),
    }
}

fn foreign_key(p: &Patterns, from_table: &str, caps: &Captures, line: &str) -> ForeignKeyModel {
    let mut fk = ForeignKeyModel::new(
        from_table,
        split_columns(&caps[2]),
        object_name(&caps[3]),
        split_columns(&caps[4]),
    );
    fk.name = caps.get(1).map(|m| object_name(m.as_str()));
    fk.on_delete = action(&p.on_delete, line);
    fk.on_update = action(&p.on_update, line);
    fk
}

fn action(pattern: &Regex, text: &str) -> Option<String> {
    pattern
        .captures(text)
        .and_then(|c| c.get(1))
        .map(|m| normalize_action(m.as_str()))
}

fn parse_column(
    p: &Patterns,
    table_name: &str,
    caps: &Captures,
    table: &mut TableModel,
) -> Option<ColumnModel> {
    let name = object_name(&caps[1]);
    let rest = caps[2].trim();

    let head = p.type_head.find(rest)?;
    let mut type_end = head.end();
    while let Some(m) = p.type_continuation.find(&rest[type_end..]) {
        type_end += m.end();
    }
    let declared = &rest[..type_end];
    let constraints = &rest[type_end..];

    // Keyword checks run on text with literal contents blanked out
    let bare = p.quoted.replace_all(constraints, "''");

    let spec = parse_type(declared);
    let mut column = ColumnModel {
        name,
        data_type: spec.data_type.clone(),
        raw_type: spec.raw_type.clone(),
        length: spec.length,
        precision: spec.precision,
        scale: spec.scale,
        nullable: !p.not_null.is_match(&bare),
        auto_increment: spec.is_serial() || p.auto_increment.is_match(&bare),
        ..ColumnModel::default()
    };

    column.default_value = p
        .default_value
        .captures(constraints)
        .and_then(|c| c.get(1))
        .map(|m| unquote_literal(m.as_str()));
    column.comment = p
        .column_comment
        .captures(constraints)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().replace("''", "'"));

    if p.inline_primary_key.is_match(&bare) {
        column.primary_key_part = true;
        column.nullable = false;
    }

    if p.inline_unique.is_match(&bare) {
        table.indexes.push(IndexModel {
            name: None,
            columns: vec![column.name.clone()],
            unique: true,
            index_type: Some("UNIQUE".to_string()),
        });
    }

    if let Some(r) = p.references.captures(&bare) {
        let mut fk = ForeignKeyModel::new(
            table_name,
            vec![column.name.clone()],
            object_name(&r[1]),
            r.get(2).map(|m| split_columns(m.as_str())).unwrap_or_default(),
        );
        fk.on_delete = action(&p.on_delete, &bare);
        fk.on_update = action(&p.on_update, &bare);
        table.foreign_keys.push(fk);
    }

    Some(column)
}
