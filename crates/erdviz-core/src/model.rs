//! Schema model types
//!
//! A `DatabaseModel` is produced by the parser with every foreign key's
//! relation type unset; the inference engine fills them in afterwards.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};

/// Cardinality of a foreign-key relationship
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RelationType {
    /// 1:1
    OneToOne,

    /// 1:N
    OneToMany,

    /// N:M, resolved through a junction table
    ManyToMany,
}

impl RelationType {
    /// Stable string identifier
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::OneToOne => "ONE_TO_ONE",
            Self::OneToMany => "ONE_TO_MANY",
            Self::ManyToMany => "MANY_TO_MANY",
        }
    }
}

impl std::fmt::Display for RelationType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Kind of table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TableType {
    #[serde(rename = "BASE TABLE")]
    BaseTable,

    #[serde(rename = "VIEW")]
    View,

    /// Resolves a many-to-many relationship between two other tables
    #[serde(rename = "JUNCTION")]
    Junction,
}

impl TableType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::BaseTable => "BASE TABLE",
            Self::View => "VIEW",
            Self::Junction => "JUNCTION",
        }
    }
}

impl std::fmt::Display for TableType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A column in a table or view
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnModel {
    /// Column name
    pub name: String,

    /// Normalized type: `TYPE`, `TYPE(len)` or `TYPE(precision,scale)`
    #[serde(rename = "type")]
    pub data_type: String,

    /// Base type as declared, without parameters
    pub raw_type: String,

    pub length: Option<u32>,
    pub precision: Option<u32>,
    pub scale: Option<u32>,

    pub nullable: bool,
    pub default_value: Option<String>,
    pub comment: Option<String>,

    /// Member of the table's primary key
    pub primary_key_part: bool,

    pub auto_increment: bool,
}

impl ColumnModel {
    /// Create a nullable column with the given type
    pub fn new(name: impl Into<String>, data_type: impl Into<String>) -> Self {
        let data_type = data_type.into();
        let raw_type = data_type
            .split('(')
            .next()
            .unwrap_or_default()
            .trim()
            .to_string();

        Self {
            name: name.into(),
            data_type,
            raw_type,
            nullable: true,
            ..Self::default()
        }
    }

    /// Mark as NOT NULL
    pub fn not_null(mut self) -> Self {
        self.nullable = false;
        self
    }

    /// Mark as a primary key member (implies NOT NULL)
    pub fn primary_key(mut self) -> Self {
        self.primary_key_part = true;
        self.nullable = false;
        self
    }

    pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = Some(comment.into());
        self
    }

    /// Declared type including length or precision/scale
    ///
    /// Uses the normalized type when it already carries parameters,
    /// otherwise rebuilds them from `length`, `precision` and `scale`.
    pub fn full_type(&self) -> String {
        if self.data_type.contains('(') {
            return self.data_type.clone();
        }

        let base = if self.raw_type.is_empty() {
            self.data_type.as_str()
        } else {
            self.raw_type.as_str()
        };

        match (self.precision, self.scale, self.length) {
            (Some(p), Some(s), _) => format!("{}({},{})", base, p, s),
            (_, _, Some(len)) if len > 0 => format!("{}({})", base, len),
            _ => base.to_string(),
        }
    }
}

/// Primary key of a table
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrimaryKeyModel {
    pub name: Option<String>,

    /// Ordered column names
    pub columns: Vec<String>,
}

impl PrimaryKeyModel {
    pub fn new(columns: Vec<String>) -> Self {
        Self { name: None, columns }
    }

    /// Columns as an order-independent set
    pub fn column_set(&self) -> BTreeSet<&str> {
        self.columns.iter().map(String::as_str).collect()
    }
}

/// A foreign key constraint
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForeignKeyModel {
    pub name: Option<String>,
    pub from_table: String,
    pub from_columns: Vec<String>,
    pub to_table: String,
    pub to_columns: Vec<String>,

    /// CASCADE, SET_NULL, RESTRICT, NO_ACTION, SET_DEFAULT
    pub on_delete: Option<String>,
    pub on_update: Option<String>,

    /// Unset until relation inference has run on the owning model
    pub relation_type: Option<RelationType>,
}

impl ForeignKeyModel {
    pub fn new(
        from_table: impl Into<String>,
        from_columns: Vec<String>,
        to_table: impl Into<String>,
        to_columns: Vec<String>,
    ) -> Self {
        Self {
            from_table: from_table.into(),
            from_columns,
            to_table: to_table.into(),
            to_columns,
            ..Self::default()
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Source columns as an order-independent set
    pub fn from_column_set(&self) -> BTreeSet<&str> {
        self.from_columns.iter().map(String::as_str).collect()
    }
}

/// An index or unique constraint
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexModel {
    pub name: Option<String>,
    pub columns: Vec<String>,
    pub unique: bool,

    /// UNIQUE, INDEX, FULLTEXT, BTREE, ...
    pub index_type: Option<String>,
}

/// A table
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableModel {
    pub name: String,
    pub comment: Option<String>,

    /// Columns in declaration order
    pub columns: Vec<ColumnModel>,

    pub primary_key: Option<PrimaryKeyModel>,
    pub foreign_keys: Vec<ForeignKeyModel>,
    pub indexes: Vec<IndexModel>,
    pub table_type: Option<TableType>,
}

impl TableModel {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn with_columns(mut self, columns: Vec<ColumnModel>) -> Self {
        self.columns = columns;
        self
    }

    pub fn with_foreign_key(mut self, fk: ForeignKeyModel) -> Self {
        self.foreign_keys.push(fk);
        self
    }

    /// Find a column by exact name
    pub fn find_column(&self, name: &str) -> Option<&ColumnModel> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// Column names in declaration order
    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }

    /// Primary key columns as a set (empty without a primary key)
    pub fn primary_key_columns(&self) -> BTreeSet<&str> {
        self.primary_key
            .as_ref()
            .map(PrimaryKeyModel::column_set)
            .unwrap_or_default()
    }

    /// Whether the column is the source of any foreign key of this table
    pub fn is_foreign_key_column(&self, column: &str) -> bool {
        self.foreign_keys
            .iter()
            .any(|fk| fk.from_columns.iter().any(|c| c == column))
    }

    pub fn is_junction(&self) -> bool {
        self.table_type == Some(TableType::Junction)
    }

    /// Set the primary key and flag its member columns
    ///
    /// Column names are matched case-insensitively and stored as declared;
    /// members become NOT NULL.
    pub fn mark_primary_key(&mut self, mut pk: PrimaryKeyModel) {
        for key in &mut pk.columns {
            if let Some(column) = self
                .columns
                .iter_mut()
                .find(|c| c.name.eq_ignore_ascii_case(key))
            {
                column.primary_key_part = true;
                column.nullable = false;
                key.clone_from(&column.name);
            }
        }
        self.primary_key = Some(pk);
    }
}

/// A view
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ViewModel {
    pub name: String,
    pub comment: Option<String>,
    pub columns: Vec<ColumnModel>,

    /// Defining query text
    pub definition: Option<String>,
}

/// A whole parsed schema
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatabaseModel {
    /// Dialect tag (mysql, postgres, ...)
    pub db_type: String,

    pub schema_name: Option<String>,

    /// Tables in declaration order
    pub tables: Vec<TableModel>,

    #[serde(default)]
    pub views: Vec<ViewModel>,

    /// Free-form metadata (parser used, dialect, ...)
    #[serde(default)]
    pub metadata: HashMap<String, String>,
}

impl DatabaseModel {
    pub fn new(db_type: impl Into<String>) -> Self {
        Self {
            db_type: db_type.into(),
            ..Self::default()
        }
    }

    pub fn with_tables(mut self, tables: Vec<TableModel>) -> Self {
        self.tables = tables;
        self
    }

    pub fn find_table(&self, name: &str) -> Option<&TableModel> {
        self.tables.iter().find(|t| t.name == name)
    }

    pub fn find_table_mut(&mut self, name: &str) -> Option<&mut TableModel> {
        self.tables.iter_mut().find(|t| t.name == name)
    }

    pub fn table_names(&self) -> Vec<&str> {
        self.tables.iter().map(|t| t.name.as_str()).collect()
    }

    pub fn table_count(&self) -> usize {
        self.tables.len()
    }

    pub fn foreign_key_count(&self) -> usize {
        self.tables.iter().map(|t| t.foreign_keys.len()).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_type_prefers_parameterized_type() {
        let col = ColumnModel::new("name", "VARCHAR(50)");
        assert_eq!(col.raw_type, "VARCHAR");
        assert_eq!(col.full_type(), "VARCHAR(50)");
    }

    #[test]
    fn full_type_rebuilds_from_precision_and_scale() {
        let mut col = ColumnModel::new("price", "decimal");
        col.precision = Some(10);
        col.scale = Some(2);
        assert_eq!(col.full_type(), "decimal(10,2)");

        let mut col = ColumnModel::new("code", "char");
        col.length = Some(3);
        assert_eq!(col.full_type(), "char(3)");
    }

    #[test]
    fn mark_primary_key_flags_columns() {
        let mut table = TableModel::new("order_items").with_columns(vec![
            ColumnModel::new("order_id", "INT"),
            ColumnModel::new("PRODUCT_ID", "INT"),
            ColumnModel::new("quantity", "INT"),
        ]);

        table.mark_primary_key(PrimaryKeyModel::new(vec![
            "order_id".to_string(),
            "product_id".to_string(),
        ]));

        assert!(table.columns[0].primary_key_part);
        assert!(table.columns[1].primary_key_part);
        assert!(!table.columns[1].nullable);
        assert!(!table.columns[2].primary_key_part);
        assert_eq!(
            table.primary_key_columns().into_iter().collect::<Vec<_>>(),
            vec!["PRODUCT_ID", "order_id"]
        );
    }

    #[test]
    fn primary_key_keeps_declared_column_names() {
        let mut table = TableModel::new("users")
            .with_columns(vec![ColumnModel::new("id", "INT"), ColumnModel::new("email", "TEXT")]);

        table.mark_primary_key(PrimaryKeyModel::new(vec!["ID".to_string(), "missing".to_string()]));

        assert_eq!(table.primary_key.as_ref().unwrap().columns, vec!["id", "missing"]);
        assert!(table.primary_key_columns().contains("id"));
        assert!(table.columns[0].primary_key_part);
        assert!(!table.columns[1].primary_key_part);
    }

    #[test]
    fn foreign_key_column_lookup() {
        let table = TableModel::new("posts")
            .with_columns(vec![ColumnModel::new("user_id", "BIGINT")])
            .with_foreign_key(ForeignKeyModel::new(
                "posts",
                vec!["user_id".to_string()],
                "users",
                vec!["id".to_string()],
            ));

        assert!(table.is_foreign_key_column("user_id"));
        assert!(!table.is_foreign_key_column("id"));
    }

    #[test]
    fn relation_type_serialization() {
        let json = serde_json::to_string(&RelationType::ManyToMany).unwrap();
        assert_eq!(json, "\"MANY_TO_MANY\"");
        assert_eq!(TableType::Junction.to_string(), "JUNCTION");
    }
}
