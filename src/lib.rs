pub mod ast;
pub mod diagnostic;
pub mod diff;
pub mod erd;
pub mod lexer;
pub mod markdown;
pub mod measure;
pub mod parser;
pub mod relation;
pub mod span;
pub mod sql;
pub mod stats;

use wasm_bindgen::prelude::*;

pub use ast::{
    Cardinality, ParsedSchema, RelationRef, SchemaEnum, SchemaField, SchemaModel, SchemaRelation,
};
pub use diagnostic::{Diagnostic, DiagnosticKind, ParseError, Severity};
pub use diff::{EnumDiff, ModelDiff, SchemaDiff, diff};
pub use erd::{ErdOptions, ErdRenderer};
pub use markdown::{MarkdownOptions, MarkdownRenderer};
pub use parser::{ParseMode, ParseOutput, parse_schema, parse_strict, parse_with};
pub use sql::{Dialect, SqlGenerator, SqlOptions};
pub use stats::SchemaStats;

/// Initialize panic hook for better error messages in WASM
#[wasm_bindgen(start)]
pub fn init() {
    #[cfg(target_arch = "wasm32")]
    console_error_panic_hook::set_once();
}

fn to_json<T: serde::Serialize>(value: &T) -> Result<String, String> {
    serde_json::to_string(value).map_err(|e| e.to_string())
}

/// Parse schema source; returns `{ schema, diagnostics }` as JSON.
#[wasm_bindgen(js_name = "parseSchema")]
pub fn parse_schema_json(source: &str) -> Result<String, String> {
    to_json(&parse_schema(source))
}

#[wasm_bindgen(js_name = "schemaStats")]
pub fn schema_stats_json(source: &str) -> Result<String, String> {
    let schema = parse_schema(source).schema;
    to_json(&stats::compute(&schema))
}

#[wasm_bindgen(js_name = "diffSchemas")]
pub fn diff_schemas_json(old_source: &str, new_source: &str) -> Result<String, String> {
    let old = parse_schema(old_source).schema;
    let new = parse_schema(new_source).schema;
    to_json(&diff(&old, &new))
}

/// Render schema source to a Mermaid `erDiagram`.
#[wasm_bindgen(js_name = "schemaToErd")]
pub fn schema_to_erd(source: &str, max_fields: Option<usize>) -> String {
    let schema = parse_schema(source).schema;
    let mut options = ErdOptions::default();
    if let Some(max) = max_fields {
        options.max_fields_per_model = max;
    }
    ErdRenderer::new(options).render(&schema)
}

#[wasm_bindgen(js_name = "schemaToSql")]
pub fn schema_to_sql(source: &str, dialect: Option<String>) -> Result<String, String> {
    let dialect = match dialect.as_deref() {
        Some(name) => Dialect::from_str(name).ok_or_else(|| format!("Unknown dialect: {}", name))?,
        None => Dialect::default(),
    };
    let schema = parse_schema(source).schema;
    Ok(SqlGenerator::for_dialect(dialect).generate(&schema))
}

#[wasm_bindgen(js_name = "schemaToMarkdown")]
pub fn schema_to_markdown(source: &str) -> String {
    let schema = parse_schema(source).schema;
    MarkdownRenderer::default().render(&schema)
}
