//! Aggregate statistics over a parsed schema.

use crate::ast::{Cardinality, ParsedSchema};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub const UNCATEGORIZED: &str = "Uncategorized";

/// Known model names per bucket. First matching bucket wins.
const CATEGORIES: &[(&str, &[&str])] = &[
    (
        "Users & Access",
        &[
            "User", "Account", "Session", "Role", "Permission", "Profile", "Team",
            "Membership", "ApiKey", "VerificationToken",
        ],
    ),
    (
        "Content",
        &[
            "Post", "Comment", "Article", "Page", "Media", "Tag", "Category", "Attachment",
        ],
    ),
    (
        "Commerce",
        &[
            "Product", "Order", "OrderItem", "Cart", "CartItem", "Customer", "Payment",
            "Invoice", "Subscription", "Price",
        ],
    ),
    (
        "System",
        &[
            "AuditLog", "Setting", "Notification", "Job", "Webhook", "Event", "Migration",
        ],
    ),
];

const TOP_N: usize = 5;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryCount {
    pub name: String,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelRank {
    pub name: String,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SchemaStats {
    pub model_count: usize,
    pub enum_count: usize,
    pub field_count: usize,
    pub relation_count: usize,
    pub index_count: usize,
    pub avg_fields_per_model: usize,
    /// Every bucket in table order, `Uncategorized` last.
    pub categories: Vec<CategoryCount>,
    pub field_types: BTreeMap<String, usize>,
    /// Always holds all four cardinalities.
    pub relation_types: BTreeMap<Cardinality, usize>,
    pub top_models_by_fields: Vec<ModelRank>,
    pub top_models_by_relations: Vec<ModelRank>,
    pub cascade_count: usize,
}

impl SchemaStats {
    pub fn relation_type(&self, cardinality: Cardinality) -> usize {
        self.relation_types.get(&cardinality).copied().unwrap_or(0)
    }

    pub fn category(&self, name: &str) -> usize {
        self.categories
            .iter()
            .find(|c| c.name == name)
            .map(|c| c.count)
            .unwrap_or(0)
    }
}

/// Bucket a model name falls into.
pub fn category_of(model: &str) -> &'static str {
    CATEGORIES
        .iter()
        .find(|(_, names)| names.contains(&model))
        .map(|(bucket, _)| *bucket)
        .unwrap_or(UNCATEGORIZED)
}

pub fn compute(schema: &ParsedSchema) -> SchemaStats {
    let model_count = schema.models.len();
    let field_count: usize = schema.models.iter().map(|m| m.fields.len()).sum();
    let index_count: usize = schema.models.iter().map(|m| m.indexes.len()).sum();

    // Rounds half away from zero.
    let avg_fields_per_model = if model_count == 0 {
        0
    } else {
        (2 * field_count + model_count) / (2 * model_count)
    };

    let mut categories: Vec<CategoryCount> = CATEGORIES
        .iter()
        .map(|(name, _)| *name)
        .chain(std::iter::once(UNCATEGORIZED))
        .map(|name| CategoryCount {
            name: name.to_string(),
            count: 0,
        })
        .collect();
    for model in &schema.models {
        let bucket = category_of(&model.name);
        if let Some(entry) = categories.iter_mut().find(|c| c.name == bucket) {
            entry.count += 1;
        }
    }

    let mut field_types = BTreeMap::new();
    for field in schema.models.iter().flat_map(|m| &m.fields) {
        *field_types.entry(field.ty.clone()).or_insert(0) += 1;
    }

    let mut relation_types: BTreeMap<Cardinality, usize> =
        Cardinality::ALL.iter().map(|&c| (c, 0)).collect();
    for relation in &schema.relations {
        *relation_types.entry(relation.cardinality).or_insert(0) += 1;
    }

    let top_models_by_fields = top_ranks(
        schema
            .models
            .iter()
            .map(|m| ModelRank {
                name: m.name.clone(),
                count: m.fields.len(),
            })
            .collect(),
    );

    let top_models_by_relations = top_ranks(
        schema
            .models
            .iter()
            .map(|m| ModelRank {
                name: m.name.clone(),
                count: schema.relations.iter().filter(|r| r.from == m.name).count(),
            })
            .filter(|rank| rank.count > 0)
            .collect(),
    );

    let cascade_count = schema
        .relations
        .iter()
        .filter(|r| r.on_delete.as_deref() == Some("Cascade"))
        .count();

    SchemaStats {
        model_count,
        enum_count: schema.enums.len(),
        field_count,
        relation_count: schema.relations.len(),
        index_count,
        avg_fields_per_model,
        categories,
        field_types,
        relation_types,
        top_models_by_fields,
        top_models_by_relations,
        cascade_count,
    }
}

/// Descending by count; `sort_by` is stable so ties keep model order.
fn top_ranks(mut ranks: Vec<ModelRank>) -> Vec<ModelRank> {
    ranks.sort_by(|a, b| b.count.cmp(&a.count));
    ranks.truncate(TOP_N);
    ranks
}
