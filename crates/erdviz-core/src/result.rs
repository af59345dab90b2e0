//! Parse result returned by the composite parser

use crate::model::DatabaseModel;
use serde::{Deserialize, Serialize};

/// Outcome of parsing DDL text
///
/// Failures are reported here rather than as errors: `success` is false,
/// `database_model` is absent and `message` says why.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParseResult {
    pub success: bool,

    pub database_model: Option<DatabaseModel>,

    #[serde(default)]
    pub warnings: Vec<String>,

    #[serde(default)]
    pub errors: Vec<String>,

    /// Human-readable summary
    pub message: String,
}

impl ParseResult {
    /// Successful parse with warnings
    pub fn success(model: DatabaseModel, warnings: Vec<String>) -> Self {
        Self {
            success: true,
            database_model: Some(model),
            warnings,
            errors: Vec::new(),
            message: "Parse succeeded".to_string(),
        }
    }

    /// Failed parse
    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            database_model: None,
            warnings: Vec::new(),
            errors: Vec::new(),
            message: message.into(),
        }
    }

    /// Failed parse with the individual error messages
    pub fn failure_with_errors(message: impl Into<String>, errors: Vec<String>) -> Self {
        Self {
            errors,
            ..Self::failure(message)
        }
    }

    pub fn add_warning(&mut self, warning: impl Into<String>) {
        self.warnings.push(warning.into());
    }

    pub fn add_error(&mut self, error: impl Into<String>) {
        self.errors.push(error.into());
    }

    /// Take the model out of a successful result
    pub fn into_model(self) -> Option<DatabaseModel> {
        self.database_model
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn success_carries_model() {
        let result = ParseResult::success(DatabaseModel::new("mysql"), vec!["w".to_string()]);
        assert!(result.success);
        assert_eq!(result.warnings, vec!["w"]);
        assert_eq!(result.into_model().unwrap().db_type, "mysql");
    }

    #[test]
    fn failure_has_no_model() {
        let mut result = ParseResult::failure_with_errors("nothing parsed", vec!["a".to_string()]);
        result.add_error("b");
        assert!(!result.success);
        assert!(result.database_model.is_none());
        assert_eq!(result.errors, vec!["a", "b"]);
        assert_eq!(result.message, "nothing parsed");
    }

    #[test]
    fn serializes_to_json() {
        let result = ParseResult::failure("SQL text is empty");
        let json = serde_json::to_string(&result).unwrap();
        assert!(json.contains("\"success\":false"));
        assert!(json.contains("SQL text is empty"));
    }
}
