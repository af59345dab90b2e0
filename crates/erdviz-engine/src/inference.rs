//! Relation inference
//!
//! Runs in up to three passes over a `DatabaseModel`, mutating it in place:
//! - Naming convention (opt-in): `user_id` with a `users` table becomes an implicit FK
//! - Cardinality: an FK whose columns are exactly the table's PK is 1:1, anything else 1:N
//! - Junction detection: two FKs that together form the PK make the table a junction
//!   and both FKs N:M, overriding the cardinality pass
//!
//! Every pass recomputes from the model, so running the engine twice is a no-op.

use crate::InferenceConfig;
use erdviz_core::{
    DatabaseModel, ForeignKeyModel, PrimaryKeyModel, RelationType, TableModel, TableType,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Counts gathered after an inference run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InferenceSummary {
    pub one_to_one: usize,
    pub one_to_many: usize,
    pub many_to_many: usize,
    pub junction_tables: usize,

    /// Foreign keys added by the naming convention pass in this run
    pub implicit_foreign_keys: usize,
}

impl InferenceSummary {
    fn count(model: &DatabaseModel, implicit_foreign_keys: usize) -> Self {
        let mut summary = Self {
            implicit_foreign_keys,
            ..Self::default()
        };

        for table in &model.tables {
            if table.is_junction() {
                summary.junction_tables += 1;
            }
            for fk in &table.foreign_keys {
                match fk.relation_type {
                    Some(RelationType::OneToOne) => summary.one_to_one += 1,
                    Some(RelationType::OneToMany) => summary.one_to_many += 1,
                    Some(RelationType::ManyToMany) => summary.many_to_many += 1,
                    None => {}
                }
            }
        }

        summary
    }
}

/// Relation inference engine
#[derive(Debug, Clone, Default)]
pub struct RelationInferenceEngine {
    config: InferenceConfig,
}

impl RelationInferenceEngine {
    pub fn new(config: InferenceConfig) -> Self {
        Self { config }
    }

    /// Classify all foreign keys of the model in place
    pub fn infer_relations(&self, model: &mut DatabaseModel) -> InferenceSummary {
        tracing::info!(
            "Inferring relations for {} tables, {} foreign keys",
            model.table_count(),
            model.foreign_key_count()
        );

        let implicit = if self.config.enable_naming_convention {
            self.add_implicit_foreign_keys(model)
        } else {
            0
        };

        for table in &mut model.tables {
            classify_cardinality(table);
        }

        if self.config.identify_junction_tables {
            for table in &mut model.tables {
                mark_junction(table);
            }
        }

        let summary = InferenceSummary::count(model, implicit);
        tracing::info!(
            "Relations: {} one-to-one, {} one-to-many, {} many-to-many, {} junction tables",
            summary.one_to_one,
            summary.one_to_many,
            summary.many_to_many,
            summary.junction_tables
        );

        summary
    }

    /// Add foreign keys implied by `<stem><suffix>` column names
    fn add_implicit_foreign_keys(&self, model: &mut DatabaseModel) -> usize {
        let suffix = self.config.naming_convention_suffix.as_str();
        if suffix.is_empty() {
            return 0;
        }

        let mut pending: Vec<(usize, ForeignKeyModel)> = Vec::new();

        for (index, table) in model.tables.iter().enumerate() {
            let pk = table.primary_key_columns();

            for column in &table.columns {
                let Some(stem) = column.name.strip_suffix(suffix) else {
                    continue;
                };
                if stem.is_empty() || table.is_foreign_key_column(&column.name) {
                    continue;
                }
                if pk.len() == 1 && pk.contains(column.name.as_str()) {
                    continue;
                }

                let Some((target, target_pk)) = find_target(model, stem) else {
                    continue;
                };

                tracing::debug!(
                    "Implicit foreign key {}.{} -> {}.{}",
                    table.name,
                    column.name,
                    target,
                    target_pk
                );

                let fk = ForeignKeyModel::new(
                    table.name.clone(),
                    vec![column.name.clone()],
                    target,
                    vec![target_pk],
                )
                .with_name(format!("fk_{}_{}", table.name, column.name));

                pending.push((index, fk));
            }
        }

        let added = pending.len();
        for (index, fk) in pending {
            model.tables[index].foreign_keys.push(fk);
        }
        added
    }
}

/// Table named `stem` or `stems` with a single-column primary key
fn find_target(model: &DatabaseModel, stem: &str) -> Option<(String, String)> {
    let plural = format!("{}s", stem);

    [stem, plural.as_str()].iter().find_map(|name| {
        let table = model.find_table(name)?;
        match table.primary_key.as_ref().map(|pk| pk.columns.as_slice()) {
            Some([column]) => Some((table.name.clone(), column.clone())),
            _ => None,
        }
    })
}

fn classify_cardinality(table: &mut TableModel) {
    let pk = table
        .primary_key
        .as_ref()
        .map(PrimaryKeyModel::column_set)
        .unwrap_or_default();

    for fk in &mut table.foreign_keys {
        let relation = if !pk.is_empty() && fk.from_column_set() == pk {
            RelationType::OneToOne
        } else {
            RelationType::OneToMany
        };

        tracing::debug!(
            "{} ({:?} -> {}) is {}",
            table.name,
            fk.from_columns,
            fk.to_table,
            relation
        );
        fk.relation_type = Some(relation);
    }
}

fn mark_junction(table: &mut TableModel) {
    if table.foreign_keys.len() != 2 {
        return;
    }

    let pk = table.primary_key_columns();
    if pk.is_empty() {
        return;
    }

    let union: BTreeSet<&str> = table
        .foreign_keys
        .iter()
        .flat_map(ForeignKeyModel::from_column_set)
        .collect();

    if union != pk {
        return;
    }

    tracing::debug!("{} is a junction table", table.name);
    table.table_type = Some(TableType::Junction);
    for fk in &mut table.foreign_keys {
        fk.relation_type = Some(RelationType::ManyToMany);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use erdviz_core::{ColumnModel, PrimaryKeyModel};

    fn cols(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    fn table_with_pk(name: &str, columns: &[&str], pk: &[&str]) -> TableModel {
        let mut table = TableModel::new(name).with_columns(
            columns.iter().map(|c| ColumnModel::new(*c, "INT")).collect(),
        );
        if !pk.is_empty() {
            table.mark_primary_key(PrimaryKeyModel::new(cols(pk)));
        }
        table
    }

    #[test]
    fn fk_equal_to_pk_is_one_to_one() {
        let mut profiles = table_with_pk("profiles", &["user_id", "bio"], &["user_id"]);
        profiles
            .foreign_keys
            .push(ForeignKeyModel::new("profiles", cols(&["user_id"]), "users", cols(&["id"])));

        classify_cardinality(&mut profiles);
        assert_eq!(profiles.foreign_keys[0].relation_type, Some(RelationType::OneToOne));
    }

    #[test]
    fn pk_written_in_other_case_still_matches() {
        let mut profiles = table_with_pk("profiles", &["user_id", "bio"], &["USER_ID"]);
        profiles
            .foreign_keys
            .push(ForeignKeyModel::new("profiles", cols(&["user_id"]), "users", cols(&["id"])));

        classify_cardinality(&mut profiles);
        assert_eq!(profiles.foreign_keys[0].relation_type, Some(RelationType::OneToOne));
    }

    #[test]
    fn pk_less_table_defaults_to_one_to_many() {
        let mut log = table_with_pk("audit_log", &["user_id"], &[]);
        log.foreign_keys
            .push(ForeignKeyModel::new("audit_log", cols(&["user_id"]), "users", cols(&["id"])));

        classify_cardinality(&mut log);
        assert_eq!(log.foreign_keys[0].relation_type, Some(RelationType::OneToMany));
    }

    #[test]
    fn set_comparison_ignores_order_and_duplicates() {
        let mut t = table_with_pk("t", &["a", "b"], &["a", "b"]);
        t.foreign_keys
            .push(ForeignKeyModel::new("t", cols(&["b", "a", "b"]), "u", cols(&["x", "y"])));

        classify_cardinality(&mut t);
        assert_eq!(t.foreign_keys[0].relation_type, Some(RelationType::OneToOne));
    }

    #[test]
    fn junction_needs_exactly_two_foreign_keys() {
        let mut t = table_with_pk("t", &["a", "b", "c"], &["a", "b", "c"]);
        for c in ["a", "b", "c"] {
            t.foreign_keys
                .push(ForeignKeyModel::new("t", cols(&[c]), "other", cols(&["id"])));
        }

        mark_junction(&mut t);
        assert!(!t.is_junction());
    }

    #[test]
    fn plural_target_lookup() {
        let model = DatabaseModel::new("mysql").with_tables(vec![
            table_with_pk("users", &["id"], &["id"]),
            table_with_pk("tags", &["a", "b"], &["a", "b"]),
        ]);

        assert_eq!(
            find_target(&model, "user"),
            Some(("users".to_string(), "id".to_string()))
        );
        assert_eq!(find_target(&model, "tag"), None);
        assert_eq!(find_target(&model, "order"), None);
    }
}
