//! Mermaid `erDiagram` renderer

use crate::ErDiagramRenderer;
use erdviz_core::{
    ColumnModel, DatabaseModel, LayoutDirection, RelationType, RenderOptions, TableModel,
    ViewMode,
};

const TABLE_INDENT: &str = "    ";
const COLUMN_INDENT: &str = "        ";

/// Mermaid ER renderer
#[derive(Debug, Clone)]
pub struct MermaidErRenderer {
    /// Column suffix kept in the logical view besides primary key columns
    key_suffix: String,
}

impl MermaidErRenderer {
    pub fn new() -> Self {
        Self {
            key_suffix: "_id".to_string(),
        }
    }

    pub fn with_key_suffix(mut self, suffix: impl Into<String>) -> Self {
        self.key_suffix = suffix.into();
        self
    }

    fn visible_columns<'a>(&self, table: &'a TableModel, view_mode: ViewMode) -> Vec<&'a ColumnModel> {
        match view_mode {
            ViewMode::Conceptual => Vec::new(),
            ViewMode::Logical => table
                .columns
                .iter()
                .filter(|c| c.primary_key_part || c.name.ends_with(&self.key_suffix))
                .collect(),
            ViewMode::Physical => table.columns.iter().collect(),
        }
    }

    fn render_table(&self, out: &mut String, table: &TableModel, options: &RenderOptions) {
        out.push_str(&format!("{}{} {{\n", TABLE_INDENT, table.name));

        for column in self.visible_columns(table, options.view_mode) {
            out.push_str(COLUMN_INDENT);
            out.push_str(&column_line(table, column, options.show_comments));
            out.push('\n');
        }

        out.push_str(TABLE_INDENT);
        out.push_str("}\n");
    }
}

impl Default for MermaidErRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl ErDiagramRenderer for MermaidErRenderer {
    fn render(&self, model: &DatabaseModel, options: &RenderOptions) -> String {
        tracing::info!("Rendering Mermaid ER diagram, view mode {}", options.view_mode);

        for field in options.reserved_fields_in_use() {
            tracing::debug!("Render option {} is accepted but has no effect", field);
        }

        let tables: Vec<&TableModel> = model
            .tables
            .iter()
            .filter(|t| options.keeps_table(&t.name))
            .collect();

        let mut out = String::from("erDiagram\n");
        if options.direction == LayoutDirection::Lr {
            out.push_str(TABLE_INDENT);
            out.push_str("direction LR\n");
        }

        for table in &tables {
            self.render_table(&mut out, table, options);
        }

        for table in &tables {
            for fk in &table.foreign_keys {
                out.push_str(&format!(
                    "{}{} {} {} : \"{}\"\n",
                    TABLE_INDENT,
                    fk.to_table,
                    relationship_symbol(fk.relation_type),
                    fk.from_table,
                    fk.from_columns.join(",")
                ));
            }
        }

        tracing::info!("Rendered {} of {} tables", tables.len(), model.table_count());
        out
    }
}

/// `<type> <name>[ PK| FK][ "<details>"]`
fn column_line(table: &TableModel, column: &ColumnModel, show_comments: bool) -> String {
    let mut line = format!("{} {}", type_token(column), column.name);

    if column.primary_key_part {
        line.push_str(" PK");
    } else if table.is_foreign_key_column(&column.name) {
        line.push_str(" FK");
    }

    let mut details = Vec::new();
    if !column.nullable && !column.primary_key_part {
        details.push("NOT NULL".to_string());
    }
    if show_comments {
        if let Some(comment) = column.comment.as_deref().map(escape_comment) {
            if !comment.trim().is_empty() {
                details.push(comment);
            }
        }
    }

    if !details.is_empty() {
        line.push_str(&format!(" \"{}\"", details.join(", ")));
    }

    line
}

/// Diagram type token: `DECIMAL(10,2)` becomes `decimal(10_2)`
///
/// Mermaid attribute types allow neither spaces nor commas.
pub fn type_token(column: &ColumnModel) -> String {
    let token: String = column
        .full_type()
        .chars()
        .filter(|c| !c.is_whitespace())
        .map(|c| if c == ',' { '_' } else { c })
        .collect::<String>()
        .to_lowercase();

    if token.is_empty() {
        "unknown".to_string()
    } else {
        token
    }
}

/// Make comment text safe inside a quoted Mermaid string
pub fn escape_comment(comment: &str) -> String {
    comment
        .replace('"', "'")
        .replace("\r\n", " ")
        .replace(['\n', '\r'], " ")
}

/// Mermaid cardinality symbol; unclassified keys render as one-to-many
pub fn relationship_symbol(relation: Option<RelationType>) -> &'static str {
    match relation {
        Some(RelationType::OneToOne) => "||--||",
        Some(RelationType::ManyToMany) => "}o--o{",
        Some(RelationType::OneToMany) | None => "||--o{",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn type_tokens() {
        assert_eq!(type_token(&ColumnModel::new("price", "DECIMAL(10, 2)")), "decimal(10_2)");
        assert_eq!(type_token(&ColumnModel::new("name", "VARCHAR(100)")), "varchar(100)");
        assert_eq!(type_token(&ColumnModel::new("ts", "TIMESTAMP WITH TIME ZONE")), "timestampwithtimezone");
        assert_eq!(type_token(&ColumnModel::new("x", "")), "unknown");

        let mut rebuilt = ColumnModel::new("amount", "NUMERIC");
        rebuilt.precision = Some(12);
        rebuilt.scale = Some(4);
        assert_eq!(type_token(&rebuilt), "numeric(12_4)");
    }

    #[test]
    fn escapes_quotes_and_newlines() {
        assert_eq!(escape_comment("say \"hi\""), "say 'hi'");
        assert_eq!(escape_comment("line one\r\nline two\n"), "line one line two ");
        assert_eq!(escape_comment("  padded  "), "  padded  ");
    }

    #[test]
    fn blank_comment_is_left_out() {
        let table = TableModel::new("t");
        let column = ColumnModel::new("note", "TEXT").with_comment(" \n ");
        assert_eq!(column_line(&table, &column, true), "text note");
    }

    #[test]
    fn symbols() {
        assert_eq!(relationship_symbol(Some(RelationType::OneToOne)), "||--||");
        assert_eq!(relationship_symbol(Some(RelationType::OneToMany)), "||--o{");
        assert_eq!(relationship_symbol(Some(RelationType::ManyToMany)), "}o--o{");
        assert_eq!(relationship_symbol(None), "||--o{");
    }

    #[test]
    fn not_null_and_comment_share_one_quoted_token() {
        let table = TableModel::new("t");
        let column = ColumnModel::new("name", "VARCHAR(50)")
            .not_null()
            .with_comment("display name");

        assert_eq!(
            column_line(&table, &column, true),
            "varchar(50) name \"NOT NULL, display name\""
        );
        assert_eq!(column_line(&table, &column, false), "varchar(50) name \"NOT NULL\"");
    }

    #[test]
    fn primary_key_hides_not_null() {
        let table = TableModel::new("t");
        let column = ColumnModel::new("id", "BIGINT").primary_key();
        assert_eq!(column_line(&table, &column, true), "bigint id PK");
    }
}
