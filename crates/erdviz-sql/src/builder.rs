//! Model assembly shared by the backends
//!
//! Statements that modify another table (`ALTER TABLE ... ADD`, `CREATE INDEX`)
//! are queued and applied once every `CREATE TABLE` has been read, so scripts
//! may reference tables declared later.

use crate::dialect::SqlDialect;
use crate::types::{object_name, schema_name};
use erdviz_core::{
    DatabaseModel, ForeignKeyModel, IndexModel, PrimaryKeyModel, TableModel, TableType, ViewModel,
};

enum Deferred {
    ForeignKey(ForeignKeyModel),
    PrimaryKey(String, PrimaryKeyModel),
    Index(String, IndexModel),
}

/// Accumulates tables and deferred alterations into a `DatabaseModel`
pub struct SchemaBuilder {
    model: DatabaseModel,
    deferred: Vec<Deferred>,
    warnings: Vec<String>,
}

impl SchemaBuilder {
    pub fn new(dialect: SqlDialect) -> Self {
        Self {
            model: DatabaseModel::new(dialect.as_str()),
            deferred: Vec::new(),
            warnings: Vec::new(),
        }
    }

    /// Add a parsed table under its (possibly qualified) name
    pub fn add_table(&mut self, qualified_name: &str, mut table: TableModel) {
        if self.model.schema_name.is_none() {
            self.model.schema_name = schema_name(qualified_name);
        }
        if table.table_type.is_none() {
            table.table_type = Some(TableType::BaseTable);
        }
        tracing::debug!(
            "Table {}: {} columns, {} foreign keys",
            table.name,
            table.columns.len(),
            table.foreign_keys.len()
        );
        self.model.tables.push(table);
    }

    pub fn add_view(&mut self, view: ViewModel) {
        self.model.views.push(view);
    }

    pub fn defer_foreign_key(&mut self, fk: ForeignKeyModel) {
        self.deferred.push(Deferred::ForeignKey(fk));
    }

    pub fn defer_primary_key(&mut self, table: &str, pk: PrimaryKeyModel) {
        self.deferred.push(Deferred::PrimaryKey(object_name(table), pk));
    }

    pub fn defer_index(&mut self, table: &str, index: IndexModel) {
        self.deferred.push(Deferred::Index(object_name(table), index));
    }

    pub fn warn(&mut self, warning: impl Into<String>) {
        let warning = warning.into();
        tracing::warn!("{}", warning);
        self.warnings.push(warning);
    }

    pub fn table_count(&self) -> usize {
        self.model.tables.len()
    }

    /// Apply deferred alterations and return the model with collected warnings
    pub fn finish(mut self) -> (DatabaseModel, Vec<String>) {
        for deferred in std::mem::take(&mut self.deferred) {
            match deferred {
                Deferred::ForeignKey(fk) => {
                    let from_table = fk.from_table.clone();
                    match self.model.find_table_mut(&from_table) {
                        Some(table) => table.foreign_keys.push(fk),
                        None => self.warn(format!(
                            "Foreign key on unknown table {} ignored",
                            from_table
                        )),
                    }
                }
                Deferred::PrimaryKey(name, pk) => match self.model.find_table_mut(&name) {
                    Some(table) => table.mark_primary_key(pk),
                    None => self.warn(format!("Primary key on unknown table {} ignored", name)),
                },
                Deferred::Index(name, index) => match self.model.find_table_mut(&name) {
                    Some(table) => table.indexes.push(index),
                    None => self.warn(format!("Index on unknown table {} ignored", name)),
                },
            }
        }

        (self.model, self.warnings)
    }
}
