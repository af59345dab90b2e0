//! Diagram render options

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::str::FromStr;

/// Column detail policy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ViewMode {
    /// All columns with types
    #[default]
    Physical,

    /// Primary key columns and naming-convention key columns only
    Logical,

    /// Table names and relationships only
    Conceptual,
}

impl FromStr for ViewMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "PHYSICAL" => Ok(Self::Physical),
            "LOGICAL" => Ok(Self::Logical),
            "CONCEPTUAL" => Ok(Self::Conceptual),
            other => Err(format!("unknown view mode: {}", other)),
        }
    }
}

impl std::fmt::Display for ViewMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Physical => write!(f, "PHYSICAL"),
            Self::Logical => write!(f, "LOGICAL"),
            Self::Conceptual => write!(f, "CONCEPTUAL"),
        }
    }
}

/// Diagram layout direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum LayoutDirection {
    /// Top to bottom
    #[default]
    Tb,

    /// Left to right
    Lr,
}

impl FromStr for LayoutDirection {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "TB" | "TD" => Ok(Self::Tb),
            "LR" => Ok(Self::Lr),
            other => Err(format!("unknown layout direction: {}", other)),
        }
    }
}

impl std::fmt::Display for LayoutDirection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Tb => write!(f, "TB"),
            Self::Lr => write!(f, "LR"),
        }
    }
}

/// Options controlling what the renderer emits
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenderOptions {
    #[serde(default)]
    pub view_mode: ViewMode,

    /// Keep exactly these tables (takes precedence over `exclude_tables`)
    #[serde(default)]
    pub include_tables: BTreeSet<String>,

    /// Drop these tables
    #[serde(default)]
    pub exclude_tables: BTreeSet<String>,

    /// Reserved: relationship depth around included tables
    #[serde(default)]
    pub relation_depth: Option<u32>,

    #[serde(default)]
    pub direction: LayoutDirection,

    #[serde(default = "default_true")]
    pub show_comments: bool,

    /// Reserved: group tables by schema
    #[serde(default)]
    pub group_by_schema: bool,

    /// Reserved: group tables by name prefix such as `sys_`
    #[serde(default)]
    pub table_prefix: Option<String>,

    /// Informational dialect hint
    #[serde(default)]
    pub dialect: Option<String>,
}

fn default_true() -> bool {
    true
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            view_mode: ViewMode::Physical,
            include_tables: BTreeSet::new(),
            exclude_tables: BTreeSet::new(),
            relation_depth: None,
            direction: LayoutDirection::Tb,
            show_comments: true,
            group_by_schema: false,
            table_prefix: None,
            dialect: None,
        }
    }
}

impl RenderOptions {
    pub fn with_view_mode(mut self, view_mode: ViewMode) -> Self {
        self.view_mode = view_mode;
        self
    }

    pub fn with_direction(mut self, direction: LayoutDirection) -> Self {
        self.direction = direction;
        self
    }

    pub fn with_show_comments(mut self, show_comments: bool) -> Self {
        self.show_comments = show_comments;
        self
    }

    pub fn include<I, S>(mut self, tables: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.include_tables.extend(tables.into_iter().map(Into::into));
        self
    }

    pub fn exclude<I, S>(mut self, tables: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.exclude_tables.extend(tables.into_iter().map(Into::into));
        self
    }

    /// Whether a table passes the include/exclude filters
    pub fn keeps_table(&self, name: &str) -> bool {
        if !self.include_tables.is_empty() {
            return self.include_tables.contains(name);
        }
        !self.exclude_tables.contains(name)
    }

    /// Names of reserved options that are set but have no effect yet
    pub fn reserved_fields_in_use(&self) -> Vec<&'static str> {
        let mut fields = Vec::new();
        if self.relation_depth.is_some() {
            fields.push("relation_depth");
        }
        if self.group_by_schema {
            fields.push("group_by_schema");
        }
        if self.table_prefix.is_some() {
            fields.push("table_prefix");
        }
        fields
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let options = RenderOptions::default();
        assert_eq!(options.view_mode, ViewMode::Physical);
        assert_eq!(options.direction, LayoutDirection::Tb);
        assert!(options.show_comments);
        assert!(options.reserved_fields_in_use().is_empty());
    }

    #[test]
    fn include_takes_precedence_over_exclude() {
        let options = RenderOptions::default()
            .include(["users"])
            .exclude(["users", "orders"]);

        assert!(options.keeps_table("users"));
        assert!(!options.keeps_table("orders"));
        assert!(!options.keeps_table("products"));
    }

    #[test]
    fn exclude_only() {
        let options = RenderOptions::default().exclude(["audit_log"]);
        assert!(options.keeps_table("users"));
        assert!(!options.keeps_table("audit_log"));
    }

    #[test]
    fn parse_enums_case_insensitively() {
        assert_eq!("logical".parse::<ViewMode>().unwrap(), ViewMode::Logical);
        assert_eq!("Conceptual".parse::<ViewMode>().unwrap(), ViewMode::Conceptual);
        assert_eq!("lr".parse::<LayoutDirection>().unwrap(), LayoutDirection::Lr);
        assert!("sideways".parse::<LayoutDirection>().is_err());
    }

    #[test]
    fn reserved_fields_reported() {
        let options = RenderOptions {
            relation_depth: Some(2),
            table_prefix: Some("sys_".to_string()),
            ..RenderOptions::default()
        };
        assert_eq!(options.reserved_fields_in_use(), vec!["relation_depth", "table_prefix"]);
    }

    #[test]
    fn deserialize_with_missing_fields() {
        let options: RenderOptions = serde_json::from_str(r#"{"view_mode":"LOGICAL"}"#).unwrap();
        assert_eq!(options.view_mode, ViewMode::Logical);
        assert!(options.show_comments);
    }
}
