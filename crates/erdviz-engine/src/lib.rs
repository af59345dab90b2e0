//! ErdViz engine - relation inference
//!
//! Classifies every foreign key of a parsed schema as 1:1, 1:N or N:M and
//! marks junction tables. Optionally adds implicit foreign keys from column
//! naming conventions.

pub mod inference;

pub use erdviz_core::InferenceSettings as InferenceConfig;
pub use inference::{InferenceSummary, RelationInferenceEngine};
