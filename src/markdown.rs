//! Markdown documentation renderer.

use crate::ast::{ParsedSchema, SchemaField, SchemaModel};
use crate::measure::{column_widths, pad_right};
use crate::stats;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarkdownOptions {
    pub title: String,
    /// List raw `@@index`/`@@unique` annotations under each model.
    pub include_indexes: bool,
}

impl Default for MarkdownOptions {
    fn default() -> Self {
        Self {
            title: "Schema Documentation".to_string(),
            include_indexes: true,
        }
    }
}

#[derive(Default)]
pub struct MarkdownRenderer {
    options: MarkdownOptions,
}

impl MarkdownRenderer {
    pub fn new(options: MarkdownOptions) -> Self {
        Self { options }
    }

    pub fn render(&self, schema: &ParsedSchema) -> String {
        let mut out = format!("# {}\n\n", self.options.title);

        self.render_overview(&mut out, schema);

        if !schema.models.is_empty() {
            out.push_str("## Models\n\n");
            for model in &schema.models {
                self.render_model(&mut out, model);
            }
        }

        if !schema.enums.is_empty() {
            out.push_str("## Enums\n\n");
            for schema_enum in &schema.enums {
                out.push_str(&format!("### {}\n\n", schema_enum.name));
                for value in &schema_enum.values {
                    out.push_str(&format!("- `{}`\n", value));
                }
                out.push('\n');
            }
        }

        // Single trailing newline.
        while out.ends_with("\n\n") {
            out.pop();
        }
        out
    }

    fn render_overview(&self, out: &mut String, schema: &ParsedSchema) {
        let stats = stats::compute(schema);
        let rows = [
            ("Models", stats.model_count),
            ("Enums", stats.enum_count),
            ("Fields", stats.field_count),
            ("Relations", stats.relation_count),
            ("Indexes", stats.index_count),
            ("Cascade deletes", stats.cascade_count),
        ];

        out.push_str("## Overview\n\n");
        out.push_str(&table(
            &["Metric", "Count"],
            rows.iter()
                .map(|(label, count)| vec![label.to_string(), count.to_string()])
                .collect(),
        ));
        out.push('\n');
    }

    fn render_model(&self, out: &mut String, model: &SchemaModel) {
        out.push_str(&format!("### {}\n\n", model.name));

        if model.fields.is_empty() {
            out.push_str("_No fields._\n\n");
        } else {
            let rows = model
                .fields
                .iter()
                .map(|f| vec![f.name.clone(), format_type(f), attribute_summary(f)])
                .collect();
            out.push_str(&table(&["Field", "Type", "Attributes"], rows));
            out.push('\n');
        }

        if self.options.include_indexes {
            let annotations: Vec<&String> = model
                .indexes
                .iter()
                .chain(&model.unique_constraints)
                .collect();
            if !annotations.is_empty() {
                out.push_str("**Indexes**\n\n");
                for annotation in annotations {
                    out.push_str(&format!("- `{}`\n", annotation));
                }
                out.push('\n');
            }
        }
    }
}

/// Declared type with `[]` / `?` suffixes.
pub fn format_type(field: &SchemaField) -> String {
    let mut ty = field.ty.clone();
    if field.is_array {
        ty.push_str("[]");
    }
    if field.is_optional {
        ty.push('?');
    }
    ty
}

/// Comma-joined key, default and relation notes for a field.
pub fn attribute_summary(field: &SchemaField) -> String {
    let mut parts = Vec::new();
    if field.is_primary_key {
        parts.push("PK".to_string());
    }
    if field.is_unique {
        parts.push("Unique".to_string());
    }
    if field.has_default {
        match &field.default_value {
            Some(value) => parts.push(format!("Default: `{}`", value)),
            None => parts.push("Default".to_string()),
        }
    }
    if let Some(relation) = &field.relation {
        parts.push(format!("→ {}", relation.model));
    }
    parts.join(", ")
}

/// One-line table cell: whitespace runs collapse to a space, pipes are escaped.
fn escape_cell(cell: &str) -> String {
    cell.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .replace('|', "\\|")
}

/// Pipe table with columns padded to a common display width.
fn table(header: &[&str], rows: Vec<Vec<String>>) -> String {
    let mut all: Vec<Vec<String>> = vec![header.iter().map(|h| h.to_string()).collect()];
    all.extend(rows.into_iter().map(|row| row.iter().map(|c| escape_cell(c)).collect()));

    let widths: Vec<usize> = column_widths(&all).into_iter().map(|w| w.max(3)).collect();
    let line = |cells: &[String]| {
        let padded: Vec<String> = widths
            .iter()
            .enumerate()
            .map(|(i, &w)| pad_right(cells.get(i).map(String::as_str).unwrap_or(""), w))
            .collect();
        format!("| {} |\n", padded.join(" | "))
    };

    let mut out = line(&all[0]);
    let rule: Vec<String> = widths.iter().map(|&w| "-".repeat(w)).collect();
    out.push_str(&format!("| {} |\n", rule.join(" | ")));
    for row in &all[1..] {
        out.push_str(&line(row));
    }
    out
}
