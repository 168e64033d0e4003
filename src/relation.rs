//! Relation cardinality classification.

use crate::ast::{Cardinality, SchemaField, SchemaRelation};

/// Cardinality of a relation as seen from the field that declares it.
///
/// `N:M` is never produced here.
pub fn classify(field: &SchemaField) -> Cardinality {
    if field.is_array {
        Cardinality::OneToMany
    } else if field.is_optional {
        Cardinality::OneToOne
    } else {
        Cardinality::ManyToOne
    }
}

/// Directed edge for a field carrying a relation, `None` for plain fields.
pub fn edge(model: &str, field: &SchemaField) -> Option<SchemaRelation> {
    let relation = field.relation.as_ref()?;
    Some(SchemaRelation {
        from: model.to_string(),
        to: relation.model.clone(),
        from_field: field.name.clone(),
        cardinality: classify(field),
        on_delete: relation.on_delete.clone(),
    })
}
