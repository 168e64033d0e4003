//! Schema scalar to SQL column type mapping.

use crate::ast::{ParsedSchema, SchemaField};

use super::Dialect;

/// Column type for a built-in scalar, `None` for anything else.
pub fn map_scalar(ty: &str, dialect: Dialect) -> Option<&'static str> {
    match dialect {
        Dialect::PostgreSQL => map_postgres_scalar(ty),
        Dialect::MySQL => map_mysql_scalar(ty),
    }
}

fn map_postgres_scalar(ty: &str) -> Option<&'static str> {
    let mapped = match ty {
        "String" => "TEXT",
        "Boolean" => "BOOLEAN",
        "Int" => "INTEGER",
        "BigInt" => "BIGINT",
        "Float" => "DOUBLE PRECISION",
        "Decimal" => "DECIMAL(65,30)",
        "DateTime" => "TIMESTAMP(3)",
        "Json" => "JSONB",
        "Bytes" => "BYTEA",
        _ => return None,
    };
    Some(mapped)
}

fn map_mysql_scalar(ty: &str) -> Option<&'static str> {
    let mapped = match ty {
        "String" => "VARCHAR(191)",
        "Boolean" => "BOOLEAN",
        "Int" => "INT",
        "BigInt" => "BIGINT",
        "Float" => "DOUBLE",
        "Decimal" => "DECIMAL(65,30)",
        "DateTime" => "DATETIME(3)",
        "Json" => "JSON",
        "Bytes" => "LONGBLOB",
        _ => return None,
    };
    Some(mapped)
}

/// Column type for a field, `None` when the field only references another model.
///
/// Types that are neither scalar, enum nor model pass through verbatim.
pub fn column_type(field: &SchemaField, schema: &ParsedSchema, dialect: Dialect) -> Option<String> {
    if schema.is_reference_field(field) {
        return None;
    }

    let base = if let Some(mapped) = map_scalar(&field.ty, dialect) {
        mapped.to_string()
    } else if schema.is_enum(&field.ty) {
        match dialect {
            Dialect::PostgreSQL => dialect.quote_ident(&field.ty),
            Dialect::MySQL => "VARCHAR(191)".to_string(),
        }
    } else {
        field.ty.clone()
    };

    if !field.is_array {
        return Some(base);
    }
    match dialect {
        Dialect::PostgreSQL => Some(format!("{}[]", base)),
        Dialect::MySQL => Some("JSON".to_string()),
    }
}

/// SQL expression for a field's default, when it has a literal equivalent.
pub fn default_expr(field: &SchemaField, schema: &ParsedSchema) -> Option<String> {
    let raw = field.default_value.as_deref()?.trim();
    if field.is_array {
        return None;
    }

    if let Some(inner) = raw.strip_prefix('"').and_then(|r| r.strip_suffix('"')) {
        let text = inner.replace("\\\"", "\"").replace('\'', "''");
        return Some(format!("'{}'", text));
    }

    let numeric = raw.chars().all(|c| c.is_ascii_digit() || c == '-' || c == '.');
    if numeric && raw.parse::<f64>().is_ok() {
        return Some(raw.to_string());
    }

    match raw {
        "true" => return Some("TRUE".to_string()),
        "false" => return Some("FALSE".to_string()),
        "now()" => return Some("CURRENT_TIMESTAMP".to_string()),
        _ => {}
    }

    let ident = !raw.is_empty() && raw.chars().all(|c| c.is_alphanumeric() || c == '_');
    if ident && schema.is_enum(&field.ty) {
        return Some(format!("'{}'", raw));
    }

    // uuid(), cuid(), autoincrement(), dbgenerated(...) have no portable literal.
    None
}

/// SQL keyword for a referential action such as `SetNull`.
pub fn referential_action(action: &str) -> String {
    match action {
        "Cascade" => "CASCADE".to_string(),
        "SetNull" => "SET NULL".to_string(),
        "SetDefault" => "SET DEFAULT".to_string(),
        "Restrict" => "RESTRICT".to_string(),
        "NoAction" => "NO ACTION".to_string(),
        other => other.to_uppercase(),
    }
}
