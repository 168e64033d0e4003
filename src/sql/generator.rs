//! DDL script generation.

use crate::ast::{ParsedSchema, SchemaEnum, SchemaField, SchemaModel};

use super::Dialect;
use super::types::{column_type, default_expr, referential_action};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SqlOptions {
    pub dialect: Dialect,
    /// Emit a leading `-- Generated by` comment.
    pub header: bool,
}

impl Default for SqlOptions {
    fn default() -> Self {
        Self {
            dialect: Dialect::default(),
            header: true,
        }
    }
}

pub struct SqlGenerator {
    options: SqlOptions,
}

impl Default for SqlGenerator {
    fn default() -> Self {
        Self::new(SqlOptions::default())
    }
}

impl SqlGenerator {
    pub fn new(options: SqlOptions) -> Self {
        Self { options }
    }

    pub fn for_dialect(dialect: Dialect) -> Self {
        Self::new(SqlOptions {
            dialect,
            ..Default::default()
        })
    }

    /// Enum types first, then one table per model, in declaration order.
    pub fn generate(&self, schema: &ParsedSchema) -> String {
        let dialect = self.options.dialect;
        let mut statements = Vec::new();

        if dialect.supports_enum_types() {
            statements.extend(schema.enums.iter().map(|e| self.create_type(e)));
        }
        statements.extend(schema.models.iter().map(|m| self.create_table(m, schema)));

        tracing::debug!(
            dialect = dialect.name(),
            statements = statements.len(),
            "generated sql"
        );

        let mut out = String::new();
        if self.options.header {
            out.push_str(&format!("-- Generated by schemalens for {}\n\n", dialect.name()));
        }
        out.push_str(&statements.join("\n\n"));
        if !statements.is_empty() {
            out.push('\n');
        }
        out
    }

    fn create_type(&self, schema_enum: &SchemaEnum) -> String {
        let labels: Vec<String> = schema_enum
            .values
            .iter()
            .filter_map(|v| enum_label(v))
            .map(|label| format!("'{}'", label.replace('\'', "''")))
            .collect();

        format!(
            "CREATE TYPE {} AS ENUM ({});",
            self.options.dialect.quote_ident(&schema_enum.name),
            labels.join(", ")
        )
    }

    fn create_table(&self, model: &SchemaModel, schema: &ParsedSchema) -> String {
        let dialect = self.options.dialect;
        let mut lines = Vec::new();
        let mut unique = Vec::new();

        for field in &model.fields {
            let Some(ty) = column_type(field, schema, dialect) else {
                continue;
            };
            lines.push(self.column(field, &ty, schema));
            if field.is_unique && !field.is_primary_key {
                unique.push(format!("    UNIQUE ({})", dialect.quote_ident(&field.name)));
            }
        }

        lines.extend(unique);
        lines.extend(model.fields.iter().filter_map(|f| self.foreign_key(f, schema)));

        let table = dialect.quote_ident(&model.name);
        if lines.is_empty() {
            return format!("CREATE TABLE {} ();", table);
        }
        format!("CREATE TABLE {} (\n{}\n);", table, lines.join(",\n"))
    }

    fn column(&self, field: &SchemaField, ty: &str, schema: &ParsedSchema) -> String {
        let mut column = format!("    {} {}", self.options.dialect.quote_ident(&field.name), ty);

        if !field.is_optional && !field.has_default {
            column.push_str(" NOT NULL");
        }
        if let Some(expr) = default_expr(field, schema) {
            column.push_str(" DEFAULT ");
            column.push_str(&expr);
        }
        if field.is_primary_key {
            column.push_str(" PRIMARY KEY");
        }
        column
    }

    fn foreign_key(&self, field: &SchemaField, schema: &ParsedSchema) -> Option<String> {
        let relation = field.relation.as_ref().filter(|r| schema.is_model(&r.model))?;
        let (Some(fields), Some(references)) = (&relation.fields, &relation.references) else {
            return None;
        };
        if fields.is_empty() || fields.len() != references.len() {
            return None;
        }

        let dialect = self.options.dialect;
        let quote_all = |names: &[String]| {
            names
                .iter()
                .map(|n| dialect.quote_ident(n))
                .collect::<Vec<_>>()
                .join(", ")
        };

        let mut constraint = format!(
            "    FOREIGN KEY ({}) REFERENCES {} ({})",
            quote_all(fields),
            dialect.quote_ident(&relation.model),
            quote_all(references)
        );
        if let Some(action) = &relation.on_delete {
            constraint.push_str(" ON DELETE ");
            constraint.push_str(&referential_action(action));
        }
        if let Some(action) = &relation.on_update {
            constraint.push_str(" ON UPDATE ");
            constraint.push_str(&referential_action(action));
        }
        Some(constraint)
    }
}

/// Leading identifier of a raw enum value, `None` for block attributes.
fn enum_label(raw: &str) -> Option<&str> {
    let label = raw.split_whitespace().next()?;
    if label.starts_with('@') {
        return None;
    }
    Some(label)
}
