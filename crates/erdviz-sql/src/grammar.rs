//! Grammar backend built on sqlparser
//!
//! Parses the whole script with sqlparser's MySQL, PostgreSQL or generic
//! dialect and maps the AST onto the schema model. Any syntax the grammar
//! rejects fails the whole attempt so the composite parser can fall back.

use crate::backend::{BackendError, BackendOutput, DialectParser};
use crate::builder::SchemaBuilder;
use crate::dialect::SqlDialect;
use crate::regex_fallback::scan_tables;
use crate::types::{clean_identifier, normalize_action, object_name, parse_type, split_columns, unquote_literal};
use erdviz_core::{ColumnModel, ForeignKeyModel, IndexModel, PrimaryKeyModel, TableModel, ViewModel};
use sqlparser::ast::{
    AlterTableOperation, ColumnDef, ColumnOption, CreateIndex, CreateTable, Ident, Statement,
    TableConstraint,
};
use sqlparser::dialect::{Dialect, GenericDialect, MySqlDialect, PostgreSqlDialect};
use sqlparser::parser::Parser;

/// sqlparser-based DDL reader
#[derive(Debug, Clone, Copy, Default)]
pub struct GrammarParser;

impl GrammarParser {
    fn sql_dialect(dialect: SqlDialect) -> Box<dyn Dialect> {
        match dialect {
            SqlDialect::MySql => Box::new(MySqlDialect {}),
            SqlDialect::Postgres => Box::new(PostgreSqlDialect {}),
            SqlDialect::Auto | SqlDialect::Generic => Box::new(GenericDialect {}),
        }
    }
}

impl DialectParser for GrammarParser {
    fn name(&self) -> &'static str {
        "grammar"
    }

    fn supports(&self, dialect: SqlDialect) -> bool {
        matches!(dialect, SqlDialect::MySql | SqlDialect::Postgres | SqlDialect::Generic)
    }

    fn parse(&self, sql: &str, dialect: SqlDialect) -> Result<BackendOutput, BackendError> {
        let statements = Parser::parse_sql(&*Self::sql_dialect(dialect), sql)
            .map_err(|e| BackendError::Syntax(e.to_string()))?;

        let mut builder = SchemaBuilder::new(dialect);

        // Table comments the AST does not carry are read from the text
        let comments: Vec<(String, String)> = scan_tables(sql)
            .map(|tables| {
                tables
                    .into_iter()
                    .filter_map(|t| t.comment.map(|c| (object_name(&t.qualified_name), c)))
                    .collect()
            })
            .unwrap_or_default();

        for statement in &statements {
            match statement {
                Statement::CreateTable(create) => {
                    let mut table = table_from_create(create, &mut builder);
                    table.comment = create.comment.as_ref().map(|c| c.to_string());
                    if table.comment.is_none() {
                        table.comment = comments
                            .iter()
                            .find(|(name, _)| *name == table.name)
                            .map(|(_, c)| c.clone());
                    }
                    builder.add_table(&create.name.to_string(), table);
                }
                Statement::CreateIndex(create) => {
                    builder.defer_index(&create.table_name.to_string(), index_from_create(create));
                }
                Statement::AlterTable { name, operations, .. } => {
                    let table_name = object_name(&name.to_string());
                    for operation in operations {
                        match operation {
                            AlterTableOperation::AddConstraint(constraint) => {
                                apply_deferred_constraint(&table_name, constraint, &mut builder);
                            }
                            other => tracing::debug!("Skipping ALTER TABLE operation: {}", other),
                        }
                    }
                }
                Statement::CreateView { name, query, .. } => {
                    builder.add_view(ViewModel {
                        name: object_name(&name.to_string()),
                        definition: Some(query.to_string()),
                        ..ViewModel::default()
                    });
                }
                _ => tracing::debug!("Skipping statement without schema content"),
            }
        }

        if builder.table_count() == 0 {
            return Err(BackendError::NoTables);
        }

        let (model, warnings) = builder.finish();
        Ok(BackendOutput { model, warnings })
    }
}

fn ident_names(idents: &[Ident]) -> Vec<String> {
    idents.iter().map(|i| i.value.clone()).collect()
}

fn table_from_create(create: &CreateTable, builder: &mut SchemaBuilder) -> TableModel {
    let name = object_name(&create.name.to_string());
    let mut table = TableModel::new(&name);
    let mut inline_pk = Vec::new();

    for def in &create.columns {
        let column = column_from_def(def);
        if column.primary_key_part {
            inline_pk.push(column.name.clone());
        }

        for option in &def.options {
            match &option.option {
                ColumnOption::ForeignKey {
                    foreign_table,
                    referred_columns,
                    on_delete,
                    on_update,
                    ..
                } => {
                    let mut fk = ForeignKeyModel::new(
                        &name,
                        vec![column.name.clone()],
                        object_name(&foreign_table.to_string()),
                        ident_names(referred_columns),
                    );
                    fk.name = option.name.as_ref().map(|n| n.value.clone());
                    fk.on_delete = on_delete.as_ref().map(|a| normalize_action(&a.to_string()));
                    fk.on_update = on_update.as_ref().map(|a| normalize_action(&a.to_string()));
                    table.foreign_keys.push(fk);
                }
                ColumnOption::Unique { is_primary: false, .. } => {
                    table.indexes.push(IndexModel {
                        name: option.name.as_ref().map(|n| n.value.clone()),
                        columns: vec![column.name.clone()],
                        unique: true,
                        index_type: Some("UNIQUE".to_string()),
                    });
                }
                _ => {}
            }
        }

        table.columns.push(column);
    }

    for constraint in &create.constraints {
        match constraint {
            TableConstraint::PrimaryKey { name: pk_name, columns, .. } => {
                let mut pk = PrimaryKeyModel::new(
                    columns.iter().map(|c| clean_identifier(&c.to_string())).collect(),
                );
                pk.name = pk_name.as_ref().map(|n| n.value.clone());
                table.mark_primary_key(pk);
            }
            TableConstraint::ForeignKey {
                name: fk_name,
                columns,
                foreign_table,
                referred_columns,
                on_delete,
                on_update,
                ..
            } => {
                let mut fk = ForeignKeyModel::new(
                    &name,
                    ident_names(columns),
                    object_name(&foreign_table.to_string()),
                    ident_names(referred_columns),
                );
                fk.name = fk_name.as_ref().map(|n| n.value.clone());
                fk.on_delete = on_delete.as_ref().map(|a| normalize_action(&a.to_string()));
                fk.on_update = on_update.as_ref().map(|a| normalize_action(&a.to_string()));
                table.foreign_keys.push(fk);
            }
            TableConstraint::Unique { name: idx_name, columns, .. } => {
                table.indexes.push(IndexModel {
                    name: idx_name.as_ref().map(|n| n.value.clone()),
                    columns: columns.iter().map(|c| clean_identifier(&c.to_string())).collect(),
                    unique: true,
                    index_type: Some("UNIQUE".to_string()),
                });
            }
            TableConstraint::Index { name: idx_name, columns, .. } => {
                table.indexes.push(IndexModel {
                    name: idx_name.as_ref().map(|n| n.value.clone()),
                    columns: columns.iter().map(|c| clean_identifier(&c.to_string())).collect(),
                    unique: false,
                    index_type: Some("INDEX".to_string()),
                });
            }
            TableConstraint::FulltextOrSpatial {
                fulltext,
                opt_index_name,
                columns,
                ..
            } => {
                table.indexes.push(IndexModel {
                    name: opt_index_name.as_ref().map(|n| n.value.clone()),
                    columns: ident_names(columns),
                    unique: false,
                    index_type: Some(if *fulltext { "FULLTEXT" } else { "SPATIAL" }.to_string()),
                });
            }
            _ => {}
        }
    }

    if table.primary_key.is_none() && !inline_pk.is_empty() {
        table.mark_primary_key(PrimaryKeyModel::new(inline_pk));
    }

    if table.columns.is_empty() {
        builder.warn(format!("Table {} has no columns", name));
    }

    table
}

fn column_from_def(def: &ColumnDef) -> ColumnModel {
    let spec = parse_type(&def.data_type.to_string());
    let mut column = ColumnModel {
        name: def.name.value.clone(),
        data_type: spec.data_type.clone(),
        raw_type: spec.raw_type.clone(),
        length: spec.length,
        precision: spec.precision,
        scale: spec.scale,
        nullable: true,
        auto_increment: spec.is_serial(),
        ..ColumnModel::default()
    };

    for option in &def.options {
        match &option.option {
            ColumnOption::NotNull => column.nullable = false,
            ColumnOption::Null => column.nullable = true,
            ColumnOption::Default(expr) => {
                column.default_value = Some(unquote_literal(&expr.to_string()));
            }
            ColumnOption::Comment(comment) => column.comment = Some(comment.clone()),
            ColumnOption::Unique { is_primary: true, .. } => {
                column.primary_key_part = true;
                column.nullable = false;
            }
            // Identity columns carry no generation expression
            ColumnOption::Generated { generation_expr: None, .. } => column.auto_increment = true,
            ColumnOption::DialectSpecific(tokens) => {
                if tokens.iter().any(|t| {
                    let word = t.to_string();
                    word.eq_ignore_ascii_case("AUTO_INCREMENT")
                        || word.eq_ignore_ascii_case("AUTOINCREMENT")
                }) {
                    column.auto_increment = true;
                }
            }
            _ => {}
        }
    }

    column
}

fn index_from_create(create: &CreateIndex) -> IndexModel {
    let columns = create
        .columns
        .iter()
        .map(|c| c.to_string())
        .collect::<Vec<_>>()
        .join(",");

    IndexModel {
        name: create.name.as_ref().map(|n| object_name(&n.to_string())),
        columns: split_columns(&columns),
        unique: create.unique,
        index_type: Some(if create.unique { "UNIQUE" } else { "INDEX" }.to_string()),
    }
}

fn apply_deferred_constraint(table_name: &str, constraint: &TableConstraint, builder: &mut SchemaBuilder) {
    match constraint {
        TableConstraint::ForeignKey {
            name,
            columns,
            foreign_table,
            referred_columns,
            on_delete,
            on_update,
            ..
        } => {
            let mut fk = ForeignKeyModel::new(
                table_name,
                ident_names(columns),
                object_name(&foreign_table.to_string()),
                ident_names(referred_columns),
            );
            fk.name = name.as_ref().map(|n| n.value.clone());
            fk.on_delete = on_delete.as_ref().map(|a| normalize_action(&a.to_string()));
            fk.on_update = on_update.as_ref().map(|a| normalize_action(&a.to_string()));
            builder.defer_foreign_key(fk);
        }
        TableConstraint::PrimaryKey { name, columns, .. } => {
            let mut pk = PrimaryKeyModel::new(
                columns.iter().map(|c| clean_identifier(&c.to_string())).collect(),
            );
            pk.name = name.as_ref().map(|n| n.value.clone());
            builder.defer_primary_key(table_name, pk);
        }
        TableConstraint::Unique { name, columns, .. } => {
            builder.defer_index(
                table_name,
                IndexModel {
                    name: name.as_ref().map(|n| n.value.clone()),
                    columns: columns.iter().map(|c| clean_identifier(&c.to_string())).collect(),
                    unique: true,
                    index_type: Some("UNIQUE".to_string()),
                },
            );
        }
        other => tracing::debug!("Skipping constraint: {}", other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(sql: &str, dialect: SqlDialect) -> BackendOutput {
        GrammarParser.parse(sql, dialect).unwrap()
    }

    #[test]
    fn mysql_table_with_inline_options() {
        let output = parse(
            "CREATE TABLE users (
                id BIGINT PRIMARY KEY AUTO_INCREMENT,
                username VARCHAR(50) NOT NULL UNIQUE COMMENT 'login name',
                status VARCHAR(20) DEFAULT 'active'
            ) ENGINE=InnoDB COMMENT='user accounts';",
            SqlDialect::MySql,
        );

        let table = &output.model.tables[0];
        assert_eq!(table.name, "users");
        assert_eq!(table.comment.as_deref(), Some("user accounts"));
        assert_eq!(table.column_names(), vec!["id", "username", "status"]);

        let id = &table.columns[0];
        assert!(id.primary_key_part);
        assert!(id.auto_increment);
        assert_eq!(table.primary_key.as_ref().unwrap().columns, vec!["id"]);

        let username = &table.columns[1];
        assert_eq!(username.data_type, "VARCHAR(50)");
        assert_eq!(username.length, Some(50));
        assert!(!username.nullable);
        assert_eq!(username.comment.as_deref(), Some("login name"));
        assert!(table.indexes.iter().any(|i| i.unique && i.columns == vec!["username"]));

        assert_eq!(table.columns[2].default_value.as_deref(), Some("active"));
    }

    #[test]
    fn comments_containing_dashes() {
        let output = parse(
            "CREATE TABLE t (a INT COMMENT 'x--y', b INT) COMMENT='a--b';",
            SqlDialect::MySql,
        );

        let table = &output.model.tables[0];
        assert_eq!(table.comment.as_deref(), Some("a--b"));
        assert_eq!(table.columns[0].comment.as_deref(), Some("x--y"));
        assert_eq!(table.column_names(), vec!["a", "b"]);
    }

    #[test]
    fn table_level_keys() {
        let output = parse(
            "CREATE TABLE order_items (
                order_id INT NOT NULL,
                product_id INT NOT NULL,
                price DECIMAL(10,2),
                PRIMARY KEY (order_id, product_id),
                CONSTRAINT fk_order FOREIGN KEY (order_id) REFERENCES orders(id) ON DELETE CASCADE
            );",
            SqlDialect::Generic,
        );

        let table = &output.model.tables[0];
        assert_eq!(table.primary_key.as_ref().unwrap().columns, vec!["order_id", "product_id"]);
        assert_eq!(table.columns[2].precision, Some(10));
        assert_eq!(table.columns[2].scale, Some(2));

        let fk = &table.foreign_keys[0];
        assert_eq!(fk.name.as_deref(), Some("fk_order"));
        assert_eq!(fk.to_table, "orders");
        assert_eq!(fk.on_delete.as_deref(), Some("CASCADE"));
        assert!(fk.relation_type.is_none());
    }

    #[test]
    fn alter_table_and_create_index() {
        let output = parse(
            "ALTER TABLE posts ADD CONSTRAINT fk_user FOREIGN KEY (user_id) REFERENCES users(id);
             CREATE TABLE posts (id INT PRIMARY KEY, user_id INT);
             CREATE UNIQUE INDEX idx_posts_user ON posts (user_id);",
            SqlDialect::Postgres,
        );

        let posts = output.model.find_table("posts").unwrap();
        assert_eq!(posts.foreign_keys.len(), 1);
        assert_eq!(posts.foreign_keys[0].from_columns, vec!["user_id"]);
        assert_eq!(posts.indexes[0].name.as_deref(), Some("idx_posts_user"));
        assert!(posts.indexes[0].unique);
    }

    #[test]
    fn views_are_collected() {
        let output = parse(
            "CREATE TABLE users (id INT PRIMARY KEY);
             CREATE VIEW active_users AS SELECT id FROM users;",
            SqlDialect::Generic,
        );

        assert_eq!(output.model.views.len(), 1);
        assert_eq!(output.model.views[0].name, "active_users");
    }

    #[test]
    fn syntax_error_fails() {
        let err = GrammarParser
            .parse("CREATE TABLE broken (id INT,, name", SqlDialect::Generic)
            .unwrap_err();
        assert!(matches!(err, BackendError::Syntax(_)));
    }

    #[test]
    fn no_tables_fails() {
        let err = GrammarParser
            .parse("SELECT 1;", SqlDialect::Generic)
            .unwrap_err();
        assert!(matches!(err, BackendError::NoTables));
    }
}
