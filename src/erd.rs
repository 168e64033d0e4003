//! Mermaid `erDiagram` renderer.

use crate::ast::{Cardinality, ParsedSchema, SchemaField, SchemaModel};
use std::collections::HashSet;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErdOptions {
    /// Field lines per entity before the rest collapse into a marker line.
    pub max_fields_per_model: usize,
    /// Annotate array/optional fields with a comment.
    pub show_modifiers: bool,
}

impl Default for ErdOptions {
    fn default() -> Self {
        Self {
            max_fields_per_model: 20,
            show_modifiers: true,
        }
    }
}

pub struct ErdRenderer {
    options: ErdOptions,
}

impl Default for ErdRenderer {
    fn default() -> Self {
        Self::new(ErdOptions::default())
    }
}

/// Two-sided connector for a relation edge.
pub fn connector(cardinality: Cardinality) -> &'static str {
    match cardinality {
        Cardinality::OneToOne => "||--||",
        Cardinality::OneToMany => "||--o{",
        Cardinality::ManyToOne => "}o--||",
        Cardinality::ManyToMany => "}o--o{",
    }
}

impl ErdRenderer {
    pub fn new(options: ErdOptions) -> Self {
        Self { options }
    }

    pub fn render(&self, schema: &ParsedSchema) -> String {
        let mut out = String::from("erDiagram\n");

        for model in &schema.models {
            self.render_entity(&mut out, schema, model);
        }

        let mut pairs: HashSet<(&str, &str)> = HashSet::new();
        for rel in schema.relations.iter().filter(|r| schema.is_model(&r.to)) {
            let pair = if rel.from <= rel.to {
                (rel.from.as_str(), rel.to.as_str())
            } else {
                (rel.to.as_str(), rel.from.as_str())
            };
            if !pairs.insert(pair) {
                continue;
            }
            out.push_str(&format!(
                "    {} {} {} : \"{}\"\n",
                rel.from,
                connector(rel.cardinality),
                rel.to,
                rel.from_field
            ));
        }

        out
    }

    fn render_entity(&self, out: &mut String, schema: &ParsedSchema, model: &SchemaModel) {
        let foreign_keys = model.foreign_key_fields(schema);
        let fields: Vec<&SchemaField> = model
            .fields
            .iter()
            .filter(|f| !schema.is_reference_field(f))
            .collect();

        out.push_str(&format!("    {} {{\n", model.name));

        let limit = self.options.max_fields_per_model;
        for field in fields.iter().take(limit) {
            out.push_str(&self.field_line(field, &foreign_keys));
        }
        if fields.len() > limit {
            out.push_str(&format!(
                "        more fields \"…{} more\"\n",
                fields.len() - limit
            ));
        }

        out.push_str("    }\n");
    }

    fn field_line(&self, field: &SchemaField, foreign_keys: &[&str]) -> String {
        let mut line = format!("        {} {}", field.ty.to_lowercase(), field.name);

        let key = if field.is_primary_key {
            Some("PK")
        } else if field.is_unique {
            Some("UK")
        } else if foreign_keys.contains(&field.name.as_str()) {
            Some("FK")
        } else {
            None
        };
        if let Some(key) = key {
            line.push(' ');
            line.push_str(key);
        }

        if self.options.show_modifiers {
            let modifiers: Vec<&str> = [
                field.is_array.then_some("array"),
                field.is_optional.then_some("optional"),
            ]
            .into_iter()
            .flatten()
            .collect();
            if !modifiers.is_empty() {
                line.push_str(&format!(" \"{}\"", modifiers.join(", ")));
            }
        }

        line.push('\n');
        line
    }
}
