//! Vendor backend: hand-written DDL reader
//!
//! A recursive-descent reader over [`Lexer`] tokens. It only understands the
//! schema-defining statements and steps over everything else, which makes it
//! tolerant of vendor table options, dump boilerplate and exotic types that
//! the grammar backend rejects.

use crate::backend::{BackendError, BackendOutput, DialectParser};
use crate::builder::SchemaBuilder;
use crate::dialect::SqlDialect;
use crate::lexer::{Lexer, Token};
use crate::types::parse_type;
use erdviz_core::{ColumnModel, ForeignKeyModel, IndexModel, PrimaryKeyModel, TableModel, ViewModel};

/// Words that may continue a column type after its first word
const TYPE_CONTINUATIONS: &[&str] = &[
    "PRECISION", "VARYING", "UNSIGNED", "SIGNED", "ZEROFILL", "WITH", "WITHOUT", "LOCAL", "TIME",
    "ZONE", "[]",
];

/// Words allowed between CREATE and the object kind
const CREATE_MODIFIERS: &[&str] = &[
    "OR", "REPLACE", "TEMPORARY", "TEMP", "GLOBAL", "LOCAL", "UNLOGGED", "MATERIALIZED",
    "ALGORITHM", "UNDEFINED", "MERGE", "TEMPTABLE", "DEFINER", "SQL", "SECURITY", "INVOKER",
];

/// Recursive-descent DDL reader
#[derive(Debug, Clone, Copy, Default)]
pub struct VendorParser;

impl DialectParser for VendorParser {
    fn name(&self) -> &'static str {
        "vendor"
    }

    fn supports(&self, _dialect: SqlDialect) -> bool {
        true
    }

    fn parse(&self, sql: &str, dialect: SqlDialect) -> Result<BackendOutput, BackendError> {
        let tokens = Lexer::new(sql).tokenize();
        Reader::new(tokens, dialect).read()
    }
}

struct Reader {
    tokens: Vec<Token>,
    pos: usize,
    builder: SchemaBuilder,
}

impl Reader {
    fn new(tokens: Vec<Token>, dialect: SqlDialect) -> Self {
        Self {
            tokens,
            pos: 0,
            builder: SchemaBuilder::new(dialect),
        }
    }

    fn current(&self) -> &Token {
        self.tokens.get(self.pos).unwrap_or(&Token::Eof)
    }

    fn advance(&mut self) {
        if self.pos < self.tokens.len() {
            self.pos += 1;
        }
    }

    fn eat(&mut self, token: &Token) -> bool {
        if self.current() == token {
            self.advance();
            true
        } else {
            false
        }
    }

    fn eat_word(&mut self, word: &str) -> bool {
        if self.current().is_word(word) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn read(mut self) -> Result<BackendOutput, BackendError> {
        loop {
            match self.current() {
                Token::Eof => break,
                Token::Create => {
                    self.advance();
                    self.read_create()?;
                }
                Token::Alter => {
                    self.advance();
                    self.read_alter_table();
                }
                Token::Semicolon => self.advance(),
                _ => self.skip_statement(),
            }
        }

        if self.builder.table_count() == 0 {
            return Err(BackendError::NoTables);
        }

        let (model, warnings) = self.builder.finish();
        Ok(BackendOutput { model, warnings })
    }

    fn read_create(&mut self) -> Result<(), BackendError> {
        while let Token::Ident(word) = self.current() {
            let upper = word.to_uppercase();
            if !CREATE_MODIFIERS.contains(&upper.as_str()) {
                break;
            }
            self.advance();
            if upper == "DEFINER" {
                // DEFINER=`user`@`host`
                while matches!(self.current(), Token::Ident(w) if !CREATE_MODIFIERS.contains(&w.to_uppercase().as_str()))
                {
                    self.advance();
                }
            }
        }

        match self.current() {
            Token::Table => {
                self.advance();
                self.read_create_table()
            }
            Token::Unique => {
                self.advance();
                self.read_create_index(true);
                Ok(())
            }
            Token::Index => {
                self.read_create_index(false);
                Ok(())
            }
            Token::View => {
                self.advance();
                self.read_create_view();
                Ok(())
            }
            _ => {
                self.skip_statement();
                Ok(())
            }
        }
    }

    fn skip_if_not_exists(&mut self) {
        if self.current() == &Token::If {
            self.advance();
            self.eat(&Token::Not);
            self.eat(&Token::Exists);
        }
    }

    /// `name` or `schema.name` as its parts
    fn read_qualified_name(&mut self) -> Option<Vec<String>> {
        let mut parts = Vec::new();
        match self.current() {
            Token::Ident(name) => parts.push(name.clone()),
            _ => return None,
        }
        self.advance();

        while self.current() == &Token::Dot {
            self.advance();
            if let Token::Ident(name) = self.current() {
                parts.push(name.clone());
                self.advance();
            }
        }

        Some(parts)
    }

    fn read_create_table(&mut self) -> Result<(), BackendError> {
        self.skip_if_not_exists();

        let Some(parts) = self.read_qualified_name() else {
            self.skip_statement();
            return Ok(());
        };
        let qualified = quote_parts(&parts);
        let name = parts.last().cloned().unwrap_or_default();

        if self.current() != &Token::LParen {
            // CREATE TABLE ... AS SELECT / LIKE
            self.builder.warn(format!("Table {} has no column definitions, skipped", name));
            self.skip_statement();
            return Ok(());
        }
        self.advance();

        let mut table = self.read_table_body(&name)?;

        // Table options up to the end of the statement
        while !matches!(self.current(), Token::Semicolon | Token::Eof) {
            if self.eat_word("COMMENT") {
                if let Token::Str(comment) = self.current() {
                    table.comment = Some(comment.clone());
                    self.advance();
                }
            } else {
                self.advance();
            }
        }

        self.builder.add_table(&qualified, table);
        Ok(())
    }

    fn read_table_body(&mut self, name: &str) -> Result<TableModel, BackendError> {
        let mut table = TableModel::new(name);
        let mut table_pk: Option<PrimaryKeyModel> = None;
        let mut inline_pk = Vec::new();
        let mut constraint_name: Option<String> = None;

        loop {
            match self.current().clone() {
                Token::RParen => {
                    self.advance();
                    break;
                }
                Token::Eof => {
                    return Err(BackendError::Syntax(format!(
                        "unterminated definition of table {}",
                        name
                    )));
                }
                Token::Comma => {
                    self.advance();
                    constraint_name = None;
                }
                Token::Constraint => {
                    self.advance();
                    if let Token::Ident(n) = self.current() {
                        constraint_name = Some(n.clone());
                        self.advance();
                    }
                    // EXCLUDE, PERIOD and other constraint kinds carry no keys we model
                    if !matches!(
                        self.current(),
                        Token::Primary | Token::Foreign | Token::Unique | Token::Check
                    ) {
                        tracing::debug!("Skipping constraint {:?} in {}", constraint_name, name);
                        constraint_name = None;
                        self.skip_definition();
                    }
                }
                Token::Ident(word) if self.starts_unnamed_constraint(&word) => {
                    tracing::debug!("Skipping {} constraint in {}", word, name);
                    self.skip_definition();
                }
                Token::Primary => {
                    self.advance();
                    self.eat(&Token::Key);
                    self.skip_using();
                    table_pk = Some(PrimaryKeyModel {
                        name: constraint_name.take(),
                        columns: self.read_column_list(),
                    });
                    self.skip_definition();
                }
                Token::Foreign => {
                    if let Some(fk) = self.read_foreign_key(name, constraint_name.take()) {
                        table.foreign_keys.push(fk);
                    }
                    self.skip_definition();
                }
                Token::Unique => {
                    self.advance();
                    let index = self.read_index_definition(constraint_name.take(), true, "UNIQUE");
                    table.indexes.push(index);
                    self.skip_definition();
                }
                Token::Index | Token::Key => {
                    let index = self.read_index_definition(constraint_name.take(), false, "INDEX");
                    table.indexes.push(index);
                    self.skip_definition();
                }
                Token::Ident(word)
                    if (word.eq_ignore_ascii_case("FULLTEXT") || word.eq_ignore_ascii_case("SPATIAL"))
                        && matches!(self.tokens.get(self.pos + 1), Some(Token::Key | Token::Index)) =>
                {
                    self.advance();
                    let kind = word.to_uppercase();
                    let index = self.read_index_definition(None, false, &kind);
                    table.indexes.push(index);
                    self.skip_definition();
                }
                Token::Check => self.skip_definition(),
                Token::Ident(_) => {
                    let column = self.read_column(name, &mut table);
                    if column.primary_key_part {
                        inline_pk.push(column.name.clone());
                    }
                    table.columns.push(column);
                }
                _ => self.skip_definition(),
            }
        }

        match table_pk {
            Some(pk) => table.mark_primary_key(pk),
            None if !inline_pk.is_empty() => table.mark_primary_key(PrimaryKeyModel::new(inline_pk)),
            None => {}
        }

        Ok(table)
    }

    /// `EXCLUDE USING ...`/`EXCLUDE (...)` or `PERIOD FOR ...` at the current position
    fn starts_unnamed_constraint(&self, word: &str) -> bool {
        let next = self.tokens.get(self.pos + 1);
        if word.eq_ignore_ascii_case("EXCLUDE") {
            matches!(next, Some(Token::LParen)) || next.is_some_and(|t| t.is_word("USING"))
        } else if word.eq_ignore_ascii_case("PERIOD") {
            next.is_some_and(|t| t.is_word("FOR"))
        } else {
            false
        }
    }

    /// `[UNIQUE|INDEX|KEY] [name] [USING m] (cols)` with the leading keyword consumed
    fn read_index_definition(&mut self, constraint: Option<String>, unique: bool, kind: &str) -> IndexModel {
        if matches!(self.current(), Token::Key | Token::Index) {
            self.advance();
        }

        let mut name = constraint;
        if let Token::Ident(n) = self.current() {
            if !n.eq_ignore_ascii_case("USING") {
                name = Some(n.clone());
                self.advance();
            }
        }
        self.skip_using();

        IndexModel {
            name,
            columns: self.read_column_list(),
            unique,
            index_type: Some(kind.to_string()),
        }
    }

    fn skip_using(&mut self) {
        if self.eat_word("USING") {
            self.advance();
        }
    }

    fn read_column(&mut self, table_name: &str, table: &mut TableModel) -> ColumnModel {
        let name = match self.current() {
            Token::Ident(n) => n.clone(),
            _ => String::new(),
        };
        self.advance();

        let spec = parse_type(&self.read_type());
        let mut column = ColumnModel {
            name,
            data_type: spec.data_type.clone(),
            raw_type: spec.raw_type.clone(),
            length: spec.length,
            precision: spec.precision,
            scale: spec.scale,
            nullable: true,
            auto_increment: spec.is_serial(),
            ..ColumnModel::default()
        };
        let mut fk: Option<ForeignKeyModel> = None;

        loop {
            match self.current().clone() {
                Token::Comma | Token::RParen | Token::Eof => break,
                Token::Not => {
                    self.advance();
                    if self.eat(&Token::Null) {
                        column.nullable = false;
                    }
                }
                Token::Null => {
                    self.advance();
                    column.nullable = true;
                }
                Token::Primary => {
                    self.advance();
                    self.eat(&Token::Key);
                    column.primary_key_part = true;
                    column.nullable = false;
                }
                Token::Unique => {
                    self.advance();
                    self.eat(&Token::Key);
                    table.indexes.push(IndexModel {
                        name: None,
                        columns: vec![column.name.clone()],
                        unique: true,
                        index_type: Some("UNIQUE".to_string()),
                    });
                }
                Token::Default => {
                    self.advance();
                    column.default_value = Some(self.read_default());
                }
                Token::References => {
                    self.advance();
                    if let Some((to_table, to_columns)) = self.read_reference() {
                        fk = Some(ForeignKeyModel::new(
                            table_name,
                            vec![column.name.clone()],
                            to_table,
                            to_columns,
                        ));
                    }
                }
                Token::On => {
                    // ON DELETE/UPDATE of an inline reference, or MySQL ON UPDATE CURRENT_TIMESTAMP
                    if let Some((kind, action)) = self.read_referential_action() {
                        if let Some(fk) = fk.as_mut() {
                            match kind {
                                ActionKind::Delete => fk.on_delete = Some(action),
                                ActionKind::Update => fk.on_update = Some(action),
                            }
                        }
                    }
                }
                Token::Constraint => {
                    self.advance();
                    if matches!(self.current(), Token::Ident(_)) {
                        self.advance();
                    }
                }
                Token::Check | Token::LParen => {
                    if self.current() == &Token::Check {
                        self.advance();
                    }
                    self.skip_parenthesized();
                }
                Token::Ident(word) => {
                    let upper = word.to_uppercase();
                    self.advance();
                    match upper.as_str() {
                        "AUTO_INCREMENT" | "AUTOINCREMENT" | "IDENTITY" => column.auto_increment = true,
                        "COMMENT" => {
                            if let Token::Str(comment) = self.current() {
                                column.comment = Some(comment.clone());
                                self.advance();
                            }
                        }
                        _ => {}
                    }
                }
                _ => self.advance(),
            }
        }

        if let Some(fk) = fk {
            table.foreign_keys.push(fk);
        }

        column
    }

    /// Declared type: first word, parameters and continuation words
    fn read_type(&mut self) -> String {
        let mut text = match self.current() {
            Token::Ident(t) => t.clone(),
            _ => return String::new(),
        };
        self.advance();

        loop {
            match self.current() {
                Token::LParen if !text.ends_with(')') => {
                    text.push('(');
                    text.push_str(&self.read_type_arguments());
                    text.push(')');
                }
                Token::Ident(word) if TYPE_CONTINUATIONS.contains(&word.to_uppercase().as_str()) => {
                    if word != "[]" {
                        text.push(' ');
                    }
                    text.push_str(&word.clone());
                    self.advance();
                }
                _ => break,
            }
        }

        text
    }

    fn read_type_arguments(&mut self) -> String {
        self.advance(); // (
        let mut args = String::new();
        let mut depth = 1;

        while depth > 0 {
            match self.current() {
                Token::Eof => break,
                Token::LParen => depth += 1,
                Token::RParen => {
                    depth -= 1;
                    if depth == 0 {
                        self.advance();
                        break;
                    }
                }
                _ => {}
            }
            args.push_str(&self.current().text());
            self.advance();
        }

        args
    }

    fn read_default(&mut self) -> String {
        match self.current().clone() {
            Token::Str(s) => {
                self.advance();
                s
            }
            Token::Num(n) => {
                self.advance();
                n
            }
            Token::Null => {
                self.advance();
                "NULL".to_string()
            }
            Token::Ident(s) => {
                self.advance();
                if self.current() == &Token::LParen {
                    format!("{}({})", s, self.collect_parenthesized())
                } else {
                    s
                }
            }
            Token::LParen => format!("({})", self.collect_parenthesized()),
            _ => String::new(),
        }
    }

    /// Text inside a parenthesized group, consuming the group
    fn collect_parenthesized(&mut self) -> String {
        self.advance(); // (
        let mut parts = Vec::new();
        let mut depth = 1;

        loop {
            match self.current() {
                Token::Eof => break,
                Token::LParen => depth += 1,
                Token::RParen => {
                    depth -= 1;
                    if depth == 0 {
                        self.advance();
                        break;
                    }
                }
                _ => {}
            }
            parts.push(self.current().text());
            self.advance();
        }

        parts.join(" ").replace(" , ", ", ").replace("( ", "(").replace(" )", ")")
    }

    /// `table [(cols)]` after REFERENCES
    fn read_reference(&mut self) -> Option<(String, Vec<String>)> {
        let parts = self.read_qualified_name()?;
        let table = parts.last().cloned().unwrap_or_default();
        Some((table, self.read_column_list()))
    }

    fn read_foreign_key(&mut self, table_name: &str, name: Option<String>) -> Option<ForeignKeyModel> {
        self.advance(); // FOREIGN
        self.eat(&Token::Key);
        if matches!(self.current(), Token::Ident(_)) {
            // MySQL index name
            self.advance();
        }

        let columns = self.read_column_list();
        if !self.eat(&Token::References) {
            return None;
        }
        let (to_table, to_columns) = self.read_reference()?;

        let mut fk = ForeignKeyModel::new(table_name, columns, to_table, to_columns);
        fk.name = name;

        while self.current() == &Token::On {
            match self.read_referential_action() {
                Some((ActionKind::Delete, action)) => fk.on_delete = Some(action),
                Some((ActionKind::Update, action)) => fk.on_update = Some(action),
                None => break,
            }
        }

        Some(fk)
    }

    /// `ON DELETE|UPDATE <action>`, positioned at ON
    fn read_referential_action(&mut self) -> Option<(ActionKind, String)> {
        self.advance(); // ON
        let kind = if self.eat_word("DELETE") {
            ActionKind::Delete
        } else if self.eat_word("UPDATE") {
            ActionKind::Update
        } else {
            return None;
        };

        let action = if self.eat_word("SET") {
            match self.current() {
                Token::Null => "SET_NULL".to_string(),
                Token::Default => "SET_DEFAULT".to_string(),
                other => format!("SET_{}", other.text().to_uppercase()),
            }
        } else if self.eat_word("NO") {
            "NO_ACTION".to_string()
        } else {
            self.current().text().to_uppercase()
        };
        self.advance();

        Some((kind, action))
    }

    /// Names in a parenthesized list, ignoring prefix lengths and ordering
    fn read_column_list(&mut self) -> Vec<String> {
        let mut columns = Vec::new();
        if !self.eat(&Token::LParen) {
            return columns;
        }

        let mut expecting_name = true;
        loop {
            match self.current() {
                Token::RParen => {
                    self.advance();
                    break;
                }
                Token::Eof => break,
                Token::Comma => {
                    expecting_name = true;
                    self.advance();
                }
                Token::LParen => self.skip_parenthesized(),
                Token::Ident(name) => {
                    if expecting_name {
                        columns.push(name.clone());
                        expecting_name = false;
                    }
                    self.advance();
                }
                _ => self.advance(),
            }
        }

        columns
    }

    /// `CREATE [UNIQUE] INDEX [name] ON table [USING m] (cols)`
    fn read_create_index(&mut self, unique: bool) {
        if !self.eat(&Token::Index) {
            self.skip_statement();
            return;
        }
        self.eat_word("CONCURRENTLY");
        self.skip_if_not_exists();

        let name = if self.current() == &Token::On {
            None
        } else {
            self.read_qualified_name().and_then(|p| p.last().cloned())
        };

        if !self.eat(&Token::On) {
            self.skip_statement();
            return;
        }
        self.eat_word("ONLY");

        let Some(parts) = self.read_qualified_name() else {
            self.skip_statement();
            return;
        };
        self.skip_using();

        let index = IndexModel {
            name,
            columns: self.read_column_list(),
            unique,
            index_type: Some(if unique { "UNIQUE" } else { "INDEX" }.to_string()),
        };
        self.builder.defer_index(&quote_parts(&parts), index);
        self.skip_statement();
    }

    fn read_create_view(&mut self) {
        self.skip_if_not_exists();
        let Some(parts) = self.read_qualified_name() else {
            self.skip_statement();
            return;
        };

        while !matches!(self.current(), Token::Semicolon | Token::Eof) && !self.current().is_word("AS") {
            self.advance();
        }
        self.eat_word("AS");

        let mut definition = Vec::new();
        while !matches!(self.current(), Token::Semicolon | Token::Eof) {
            definition.push(self.current().text());
            self.advance();
        }

        self.builder.add_view(ViewModel {
            name: parts.last().cloned().unwrap_or_default(),
            definition: (!definition.is_empty()).then(|| definition.join(" ")),
            ..ViewModel::default()
        });
    }

    /// `ALTER TABLE [ONLY] name ADD ...[, ADD ...]`
    fn read_alter_table(&mut self) {
        if !self.eat(&Token::Table) {
            self.skip_statement();
            return;
        }
        self.skip_if_exists();
        self.eat_word("ONLY");

        let Some(parts) = self.read_qualified_name() else {
            self.skip_statement();
            return;
        };
        let qualified = quote_parts(&parts);
        let table_name = parts.last().cloned().unwrap_or_default();

        loop {
            match self.current() {
                Token::Semicolon | Token::Eof => break,
                Token::Comma => self.advance(),
                Token::Add => {
                    self.advance();
                    let mut constraint = None;
                    if self.eat(&Token::Constraint) {
                        if let Token::Ident(n) = self.current() {
                            constraint = Some(n.clone());
                            self.advance();
                        }
                    }

                    match self.current() {
                        Token::Foreign => {
                            if let Some(fk) = self.read_foreign_key(&table_name, constraint) {
                                self.builder.defer_foreign_key(fk);
                            }
                        }
                        Token::Primary => {
                            self.advance();
                            self.eat(&Token::Key);
                            self.skip_using();
                            let pk = PrimaryKeyModel {
                                name: constraint,
                                columns: self.read_column_list(),
                            };
                            self.builder.defer_primary_key(&qualified, pk);
                        }
                        Token::Unique => {
                            self.advance();
                            let index = self.read_index_definition(constraint, true, "UNIQUE");
                            self.builder.defer_index(&qualified, index);
                        }
                        Token::Index | Token::Key => {
                            let index = self.read_index_definition(constraint, false, "INDEX");
                            self.builder.defer_index(&qualified, index);
                        }
                        _ => {}
                    }
                    self.skip_operation();
                }
                _ => self.skip_operation(),
            }
        }

        self.eat(&Token::Semicolon);
    }

    fn skip_if_exists(&mut self) {
        if self.current() == &Token::If {
            self.advance();
            self.eat(&Token::Exists);
        }
    }

    /// Skip to the comma or closing parenthesis ending a table element
    fn skip_definition(&mut self) {
        while !matches!(self.current(), Token::Comma | Token::RParen | Token::Eof) {
            if self.current() == &Token::LParen {
                self.skip_parenthesized();
            } else {
                self.advance();
            }
        }
    }

    /// Skip to the comma or semicolon ending an ALTER TABLE operation
    fn skip_operation(&mut self) {
        while !matches!(self.current(), Token::Comma | Token::Semicolon | Token::Eof) {
            if self.current() == &Token::LParen {
                self.skip_parenthesized();
            } else {
                self.advance();
            }
        }
    }

    fn skip_parenthesized(&mut self) {
        if self.current() != &Token::LParen {
            self.advance();
            return;
        }
        self.advance();
        let mut depth = 1;
        while depth > 0 {
            match self.current() {
                Token::LParen => depth += 1,
                Token::RParen => depth -= 1,
                Token::Eof => break,
                _ => {}
            }
            self.advance();
        }
    }

    fn skip_statement(&mut self) {
        while !matches!(self.current(), Token::Semicolon | Token::Eof) {
            self.advance();
        }
        self.eat(&Token::Semicolon);
    }
}

#[derive(Debug, Clone, Copy)]
enum ActionKind {
    Delete,
    Update,
}

/// Re-quote name parts so dots inside a part are not taken as separators
fn quote_parts(parts: &[String]) -> String {
    parts
        .iter()
        .map(|p| format!("\"{}\"", p))
        .collect::<Vec<_>>()
        .join(".")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(sql: &str, dialect: SqlDialect) -> BackendOutput {
        VendorParser.parse(sql, dialect).unwrap()
    }

    #[test]
    fn mysql_dump_table() {
        let output = parse(
            "/*!40101 SET NAMES utf8 */;
            DROP TABLE IF EXISTS `orders`;
            CREATE TABLE `orders` (
              `id` int(11) unsigned NOT NULL AUTO_INCREMENT COMMENT '订单ID',
              `user_id` bigint NOT NULL,
              `amount` decimal(10, 2) DEFAULT '0.00',
              `status` enum('new','paid') DEFAULT 'new',
              `updated_at` timestamp NULL DEFAULT CURRENT_TIMESTAMP ON UPDATE CURRENT_TIMESTAMP,
              PRIMARY KEY (`id`),
              UNIQUE KEY `uk_user` (`user_id`, `status`),
              FULLTEXT KEY `ft_status` (`status`),
              CONSTRAINT `fk_orders_user` FOREIGN KEY (`user_id`) REFERENCES `users` (`id`) ON DELETE CASCADE ON UPDATE NO ACTION
            ) ENGINE=InnoDB DEFAULT CHARSET=utf8mb4 COMMENT='订单表';",
            SqlDialect::MySql,
        );

        let table = &output.model.tables[0];
        assert_eq!(table.name, "orders");
        assert_eq!(table.comment.as_deref(), Some("订单表"));
        assert_eq!(table.column_names(), vec!["id", "user_id", "amount", "status", "updated_at"]);

        let id = &table.columns[0];
        assert_eq!(id.data_type, "INT(11)");
        assert!(id.auto_increment);
        assert!(id.primary_key_part);
        assert_eq!(id.comment.as_deref(), Some("订单ID"));

        let amount = &table.columns[2];
        assert_eq!(amount.data_type, "DECIMAL(10,2)");
        assert_eq!(amount.default_value.as_deref(), Some("0.00"));
        assert_eq!(table.columns[3].data_type, "ENUM('new','paid')");
        assert_eq!(table.columns[4].default_value.as_deref(), Some("CURRENT_TIMESTAMP"));

        assert_eq!(table.indexes.len(), 2);
        assert_eq!(table.indexes[0].columns, vec!["user_id", "status"]);
        assert!(table.indexes[0].unique);
        assert_eq!(table.indexes[1].index_type.as_deref(), Some("FULLTEXT"));

        let fk = &table.foreign_keys[0];
        assert_eq!(fk.name.as_deref(), Some("fk_orders_user"));
        assert_eq!(fk.on_delete.as_deref(), Some("CASCADE"));
        assert_eq!(fk.on_update.as_deref(), Some("NO_ACTION"));
    }

    #[test]
    fn postgres_table() {
        let output = parse(
            "CREATE TABLE public.posts (
                id bigint GENERATED ALWAYS AS IDENTITY PRIMARY KEY,
                author_id integer REFERENCES public.users (id) ON DELETE SET NULL,
                tags text[],
                score double precision DEFAULT 0,
                created_at timestamp with time zone DEFAULT now()
            );
            CREATE INDEX idx_posts_author ON public.posts USING btree (author_id);",
            SqlDialect::Postgres,
        );

        let model = &output.model;
        assert_eq!(model.schema_name.as_deref(), Some("public"));

        let table = &model.tables[0];
        assert_eq!(table.name, "posts");
        assert!(table.columns[0].auto_increment);
        assert_eq!(table.primary_key.as_ref().unwrap().columns, vec!["id"]);
        assert_eq!(table.columns[2].data_type, "TEXT[]");
        assert_eq!(table.columns[3].data_type, "DOUBLE PRECISION");
        assert_eq!(table.columns[4].data_type, "TIMESTAMP WITH TIME ZONE");
        assert_eq!(table.columns[4].default_value.as_deref(), Some("now()"));

        let fk = &table.foreign_keys[0];
        assert_eq!(fk.to_table, "users");
        assert_eq!(fk.to_columns, vec!["id"]);
        assert_eq!(fk.on_delete.as_deref(), Some("SET_NULL"));

        assert_eq!(table.indexes[0].name.as_deref(), Some("idx_posts_author"));
        assert_eq!(table.indexes[0].columns, vec!["author_id"]);
    }

    #[test]
    fn alter_table_before_create() {
        let output = parse(
            "ALTER TABLE ONLY comments ADD CONSTRAINT comments_pkey PRIMARY KEY (id);
             ALTER TABLE comments ADD CONSTRAINT fk_post FOREIGN KEY (post_id) REFERENCES posts(id);
             CREATE TABLE comments (id integer NOT NULL, post_id integer);",
            SqlDialect::Postgres,
        );

        let table = &output.model.tables[0];
        assert_eq!(table.primary_key.as_ref().unwrap().name.as_deref(), Some("comments_pkey"));
        assert!(table.columns[0].primary_key_part);
        assert_eq!(table.foreign_keys[0].name.as_deref(), Some("fk_post"));
    }

    #[test]
    fn views_and_unknown_statements() {
        let output = parse(
            "SET FOREIGN_KEY_CHECKS = 0;
             CREATE TABLE users (id INT PRIMARY KEY);
             CREATE OR REPLACE VIEW active_users AS SELECT id FROM users;
             INSERT INTO users VALUES (1);",
            SqlDialect::Generic,
        );

        assert_eq!(output.model.table_count(), 1);
        assert_eq!(output.model.views[0].name, "active_users");
        assert_eq!(
            output.model.views[0].definition.as_deref(),
            Some("SELECT id FROM users")
        );
    }

    #[test]
    fn exclusion_constraints_are_not_columns() {
        let output = parse(
            "CREATE TABLE bookings (
                id INT,
                room_id INT NOT NULL,
                during TSRANGE,
                CONSTRAINT no_overlap EXCLUDE USING gist (room_id WITH =, during WITH &&),
                EXCLUDE USING gist (id WITH =),
                period INT,
                CONSTRAINT pk_bookings PRIMARY KEY (id)
            );",
            SqlDialect::Postgres,
        );

        let table = &output.model.tables[0];
        assert_eq!(table.column_names(), vec!["id", "room_id", "during", "period"]);
        let pk = table.primary_key.as_ref().unwrap();
        assert_eq!(pk.name.as_deref(), Some("pk_bookings"));
        assert_eq!(pk.columns, vec!["id"]);
    }

    #[test]
    fn unterminated_table_is_a_syntax_error() {
        let err = VendorParser
            .parse("CREATE TABLE broken (id INT, name VARCHAR(10)", SqlDialect::Generic)
            .unwrap_err();
        assert!(matches!(err, BackendError::Syntax(_)));
    }

    #[test]
    fn no_tables_is_an_error() {
        let err = VendorParser
            .parse("INSERT INTO t VALUES (1);", SqlDialect::Generic)
            .unwrap_err();
        assert!(matches!(err, BackendError::NoTables));
    }
}
