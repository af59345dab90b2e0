//! ErdViz Core
//!
//! Dialect-neutral schema model shared by the parser, inference and
//! rendering stages, plus render options, parse results and configuration.

pub mod model;
pub mod options;
pub mod result;
pub mod config;

pub use model::{
    ColumnModel, DatabaseModel, ForeignKeyModel, IndexModel, PrimaryKeyModel, RelationType,
    TableModel, TableType, ViewModel,
};
pub use options::{LayoutDirection, RenderOptions, ViewMode};
pub use result::ParseResult;
pub use config::{Config, ConfigError, DialectSetting, InferenceSettings, RenderSettings};
