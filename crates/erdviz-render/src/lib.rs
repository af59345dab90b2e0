//! ErdViz render - entity-relationship diagram output
//!
//! Turns a `DatabaseModel` into Mermaid `erDiagram` text that any Mermaid
//! renderer can draw.

pub mod mermaid;

pub use mermaid::{escape_comment, relationship_symbol, type_token, MermaidErRenderer};

use erdviz_core::{DatabaseModel, RenderOptions};

/// Renders a schema model as diagram text
///
/// Rendering never fails: missing optional fields are simply left out.
pub trait ErDiagramRenderer {
    fn render(&self, model: &DatabaseModel, options: &RenderOptions) -> String;
}
