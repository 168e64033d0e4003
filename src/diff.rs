//! Semantic diff between two schema snapshots.
//!
//! All comparisons are set-based. Additions follow the new schema's order,
//! removals and modifications follow the old schema's order.

use crate::ast::{ParsedSchema, SchemaEnum, SchemaField, SchemaModel, SchemaRelation};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SchemaDiff {
    pub added_models: Vec<String>,
    pub removed_models: Vec<String>,
    pub modified_models: Vec<ModelDiff>,
    pub added_enums: Vec<String>,
    pub removed_enums: Vec<String>,
    pub modified_enums: Vec<EnumDiff>,
    pub added_relations: Vec<SchemaRelation>,
    pub removed_relations: Vec<SchemaRelation>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelDiff {
    pub name: String,
    pub added_fields: Vec<String>,
    pub removed_fields: Vec<String>,
    pub modified_fields: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnumDiff {
    pub name: String,
    pub added_values: Vec<String>,
    pub removed_values: Vec<String>,
}

impl SchemaDiff {
    pub fn is_empty(&self) -> bool {
        self.added_models.is_empty()
            && self.removed_models.is_empty()
            && self.modified_models.is_empty()
            && self.added_enums.is_empty()
            && self.removed_enums.is_empty()
            && self.modified_enums.is_empty()
            && self.added_relations.is_empty()
            && self.removed_relations.is_empty()
    }
}

pub fn diff(old: &ParsedSchema, new: &ParsedSchema) -> SchemaDiff {
    let old_models = index_by_name(&old.models, |m| &m.name);
    let new_models = index_by_name(&new.models, |m| &m.name);
    let old_enums = index_by_name(&old.enums, |e| &e.name);
    let new_enums = index_by_name(&new.enums, |e| &e.name);

    let modified_models = unique_names(&old.models, |m| &m.name)
        .into_iter()
        .filter_map(|name| {
            let new_model = new_models.get(name)?;
            diff_model(old_models[name], new_model)
        })
        .collect();

    let modified_enums = unique_names(&old.enums, |e| &e.name)
        .into_iter()
        .filter_map(|name| {
            let new_enum = new_enums.get(name)?;
            diff_enum(old_enums[name], new_enum)
        })
        .collect();

    let result = SchemaDiff {
        added_models: missing_from(&new.models, &old_models, |m| &m.name),
        removed_models: missing_from(&old.models, &new_models, |m| &m.name),
        modified_models,
        added_enums: missing_from(&new.enums, &old_enums, |e| &e.name),
        removed_enums: missing_from(&old.enums, &new_enums, |e| &e.name),
        modified_enums,
        added_relations: relations_missing_from(&new.relations, &old.relations),
        removed_relations: relations_missing_from(&old.relations, &new.relations),
    };

    tracing::debug!(
        added_models = result.added_models.len(),
        removed_models = result.removed_models.len(),
        modified_models = result.modified_models.len(),
        "computed schema diff"
    );

    result
}

/// Whether two same-named fields differ in shape.
///
/// Attribute lists and default values are not compared.
pub fn field_changed(old: &SchemaField, new: &SchemaField) -> bool {
    old.ty != new.ty
        || old.is_array != new.is_array
        || old.is_optional != new.is_optional
        || old.is_primary_key != new.is_primary_key
        || old.is_unique != new.is_unique
}

fn diff_model(old: &SchemaModel, new: &SchemaModel) -> Option<ModelDiff> {
    let old_fields = index_by_name(&old.fields, |f| &f.name);
    let new_fields = index_by_name(&new.fields, |f| &f.name);

    let added_fields = missing_from(&new.fields, &old_fields, |f| &f.name);
    let removed_fields = missing_from(&old.fields, &new_fields, |f| &f.name);
    let modified_fields: Vec<String> = old
        .fields
        .iter()
        .filter(|f| {
            new_fields
                .get(f.name.as_str())
                .is_some_and(|new_field| field_changed(f, new_field))
        })
        .map(|f| f.name.clone())
        .collect();

    if added_fields.is_empty() && removed_fields.is_empty() && modified_fields.is_empty() {
        return None;
    }

    Some(ModelDiff {
        name: old.name.clone(),
        added_fields,
        removed_fields,
        modified_fields,
    })
}

fn diff_enum(old: &SchemaEnum, new: &SchemaEnum) -> Option<EnumDiff> {
    let old_values: HashSet<&str> = old.values.iter().map(String::as_str).collect();
    let new_values: HashSet<&str> = new.values.iter().map(String::as_str).collect();

    let added_values = dedup(new.values.iter().filter(|v| !old_values.contains(v.as_str())));
    let removed_values = dedup(old.values.iter().filter(|v| !new_values.contains(v.as_str())));

    if added_values.is_empty() && removed_values.is_empty() {
        return None;
    }

    Some(EnumDiff {
        name: old.name.clone(),
        added_values,
        removed_values,
    })
}

/// First item per name; later duplicates are shadowed.
fn index_by_name<'a, T>(items: &'a [T], name: impl Fn(&T) -> &String) -> HashMap<&'a str, &'a T> {
    let mut map = HashMap::new();
    for item in items {
        map.entry(name(item).as_str()).or_insert(item);
    }
    map
}

fn unique_names<'a, T>(items: &'a [T], name: impl Fn(&'a T) -> &'a String) -> Vec<&'a str> {
    let mut seen = HashSet::new();
    items
        .iter()
        .map(|item| name(item).as_str())
        .filter(|n| seen.insert(*n))
        .collect()
}

fn missing_from<'a, T>(
    items: &'a [T],
    other: &HashMap<&str, &T>,
    name: impl Fn(&'a T) -> &'a String,
) -> Vec<String> {
    unique_names(items, name)
        .into_iter()
        .filter(|n| !other.contains_key(n))
        .map(str::to_string)
        .collect()
}

fn dedup<'a>(values: impl Iterator<Item = &'a String>) -> Vec<String> {
    let mut seen: HashSet<&String> = HashSet::new();
    values.filter(|v| seen.insert(*v)).cloned().collect()
}

type RelationKey<'a> = (&'a str, &'a str, &'a str);

fn relation_key(relation: &SchemaRelation) -> RelationKey<'_> {
    (
        relation.from.as_str(),
        relation.to.as_str(),
        relation.from_field.as_str(),
    )
}

fn relations_missing_from(
    relations: &[SchemaRelation],
    other: &[SchemaRelation],
) -> Vec<SchemaRelation> {
    let other_keys: HashSet<RelationKey> = other.iter().map(relation_key).collect();
    let mut seen = HashSet::new();
    relations
        .iter()
        .filter(|r| {
            let key = relation_key(r);
            !other_keys.contains(&key) && seen.insert(key)
        })
        .cloned()
        .collect()
}
