use crate::span::Span;
use serde::{Deserialize, Serialize};

/// Built-in scalar type names of the schema language.
pub const SCALAR_TYPES: &[&str] = &[
    "String", "Boolean", "Int", "BigInt", "Float", "Decimal", "DateTime", "Json", "Bytes",
];

pub fn is_scalar_type(name: &str) -> bool {
    SCALAR_TYPES.contains(&name)
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParsedSchema {
    pub models: Vec<SchemaModel>,
    pub enums: Vec<SchemaEnum>,
    pub relations: Vec<SchemaRelation>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SchemaModel {
    pub name: String,
    pub fields: Vec<SchemaField>,
    /// Raw `@@index(...)` annotations, in declaration order.
    pub indexes: Vec<String>,
    /// Raw `@@unique(...)` annotations, in declaration order.
    pub unique_constraints: Vec<String>,
    #[serde(default)]
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SchemaField {
    pub name: String,
    #[serde(rename = "type")]
    pub ty: String,
    pub is_array: bool,
    pub is_optional: bool,
    pub is_primary_key: bool,
    pub is_unique: bool,
    pub has_default: bool,
    pub default_value: Option<String>,
    pub relation: Option<RelationRef>,
    /// Raw attribute tokens as written, e.g. `@default(now())`.
    pub attributes: Vec<String>,
    #[serde(default)]
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RelationRef {
    /// Always the declaring field's type.
    pub model: String,
    pub fields: Option<Vec<String>>,
    pub references: Option<Vec<String>>,
    pub on_delete: Option<String>,
    pub on_update: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SchemaEnum {
    pub name: String,
    /// Raw value lines, in declaration order. Not deduplicated.
    pub values: Vec<String>,
    #[serde(default)]
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SchemaRelation {
    pub from: String,
    pub to: String,
    pub from_field: String,
    #[serde(rename = "type")]
    pub cardinality: Cardinality,
    pub on_delete: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Cardinality {
    #[serde(rename = "1:1")]
    OneToOne,
    #[serde(rename = "1:N")]
    OneToMany,
    #[serde(rename = "N:1")]
    ManyToOne,
    #[serde(rename = "N:M")]
    ManyToMany,
}

impl Cardinality {
    pub const ALL: [Cardinality; 4] = [
        Cardinality::OneToOne,
        Cardinality::OneToMany,
        Cardinality::ManyToOne,
        Cardinality::ManyToMany,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Cardinality::OneToOne => "1:1",
            Cardinality::OneToMany => "1:N",
            Cardinality::ManyToOne => "N:1",
            Cardinality::ManyToMany => "N:M",
        }
    }
}

impl std::fmt::Display for Cardinality {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

impl ParsedSchema {
    /// First model with the given name.
    pub fn model(&self, name: &str) -> Option<&SchemaModel> {
        self.models.iter().find(|m| m.name == name)
    }

    /// First enum with the given name.
    pub fn enum_def(&self, name: &str) -> Option<&SchemaEnum> {
        self.enums.iter().find(|e| e.name == name)
    }

    pub fn is_model(&self, name: &str) -> bool {
        self.model(name).is_some()
    }

    pub fn is_enum(&self, name: &str) -> bool {
        self.enum_def(name).is_some()
    }

    /// Whether a field points at a declared model instead of holding a value.
    ///
    /// A field typed with an undeclared name is an opaque scalar, even under
    /// `@relation`.
    pub fn is_reference_field(&self, field: &SchemaField) -> bool {
        self.is_model(&field.ty)
    }
}

impl SchemaModel {
    pub fn field(&self, name: &str) -> Option<&SchemaField> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Scalar fields used as local keys by relations to declared models.
    pub fn foreign_key_fields(&self, schema: &ParsedSchema) -> Vec<&str> {
        self.fields
            .iter()
            .filter_map(|f| f.relation.as_ref())
            .filter(|r| schema.is_model(&r.model))
            .filter_map(|r| r.fields.as_ref())
            .flatten()
            .map(String::as_str)
            .collect()
    }
}
