//! Partial responses.
//!
//! A loaded entity is materialized as an [`EntityGraph`]: its serialized properties plus
//! whichever navigations were eager-loaded. [`map_to_fields`] then copies the requested
//! subset into a [`Projection`], a plain JSON object:
//!
//! ```text
//! fields = "ID,Manager.LAST_NAME"
//!
//! { "GUID": "...", "ID": "B-100", "Manager": { "GUID": "...", "LAST_NAME": "Curie" } }
//! ```
//!
//! The identifier is always present, at the top level and in every nested projection.
//! Names that do not exist and dotted paths through navigations that were not loaded are
//! skipped without error.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// One materialized entity and its loaded navigations (one hop).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EntityGraph {
    id_field: String,
    fields: Map<String, Value>,
    navigations: BTreeMap<String, Option<EntityGraph>>,
}

impl EntityGraph {
    /// Serialize a model into a graph without navigations.
    ///
    /// # Errors
    ///
    /// Fails when the model does not serialize to a JSON object.
    pub fn from_model<M: Serialize>(model: &M, id_field: &str) -> Result<Self, serde_json::Error> {
        match serde_json::to_value(model)? {
            Value::Object(fields) => Ok(Self::from_fields(id_field, fields)),
            other => Err(serde::ser::Error::custom(format!(
                "entity serialized to {other}, expected an object"
            ))),
        }
    }

    #[must_use]
    pub fn from_fields(id_field: impl Into<String>, fields: Map<String, Value>) -> Self {
        Self {
            id_field: id_field.into(),
            fields,
            navigations: BTreeMap::new(),
        }
    }

    /// Record a loaded navigation; `None` means the foreign key was null or dangling.
    pub fn attach(&mut self, name: impl Into<String>, target: Option<EntityGraph>) {
        self.navigations.insert(name.into(), target);
    }

    #[must_use]
    pub fn with_navigation(mut self, name: impl Into<String>, target: Option<EntityGraph>) -> Self {
        self.attach(name, target);
        self
    }

    #[must_use]
    pub fn id_field(&self) -> &str {
        &self.id_field
    }

    #[must_use]
    pub fn id(&self) -> Option<&Value> {
        self.fields.get(&self.id_field)
    }

    #[must_use]
    pub fn field(&self, name: &str) -> Option<&Value> {
        self.fields.get(name)
    }

    #[must_use]
    pub fn fields(&self) -> &Map<String, Value> {
        &self.fields
    }

    /// `None` when the navigation was not loaded, `Some(None)` when it was loaded and is
    /// empty. The name is matched case-insensitively.
    #[must_use]
    pub fn navigation(&self, name: &str) -> Option<Option<&EntityGraph>> {
        self.navigation_entry(name).map(|(_, target)| target)
    }

    fn navigation_entry(&self, name: &str) -> Option<(&str, Option<&EntityGraph>)> {
        self.navigations
            .iter()
            .find(|(loaded, _)| loaded.eq_ignore_ascii_case(name))
            .map(|(loaded, target)| (loaded.as_str(), target.as_ref()))
    }
}

/// Requested subset of an entity, serialized as a plain JSON object.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Projection(Map<String, Value>);

impl Projection {
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    #[must_use]
    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &String> {
        self.0.keys()
    }

    #[must_use]
    pub fn into_inner(self) -> Map<String, Value> {
        self.0
    }
}

impl From<Projection> for Value {
    fn from(projection: Projection) -> Self {
        Value::Object(projection.0)
    }
}

/// Split a comma-separated field list, trimming entries and dropping empty or repeated ones.
#[must_use]
pub fn parse_field_list(fields: &str) -> Vec<&str> {
    let mut parsed: Vec<&str> = Vec::new();
    for field in fields.split(',').map(str::trim) {
        if !field.is_empty() && !parsed.contains(&field) {
            parsed.push(field);
        }
    }
    parsed
}

/// Copy the requested fields of `entity` into a new projection.
///
/// Returns `None` only when `entity` is `None`. The graph is not modified.
#[must_use]
pub fn map_to_fields(entity: Option<&EntityGraph>, fields: &str) -> Option<Projection> {
    let graph = entity?;
    Some(project(graph, &parse_field_list(fields)))
}

fn project(graph: &EntityGraph, fields: &[&str]) -> Projection {
    let mut out = Map::new();
    out.insert(
        graph.id_field.clone(),
        graph.id().cloned().unwrap_or(Value::Null),
    );

    // sub-fields grouped per navigation, in request order
    let mut nested: Vec<(&str, Option<&EntityGraph>, Vec<&str>)> = Vec::new();

    for &field in fields {
        if field == "*" {
            for (name, value) in &graph.fields {
                out.insert(name.clone(), value.clone());
            }
        } else if let Some((head, rest)) = field.split_once('.') {
            let Some((name, target)) = graph.navigation_entry(head) else {
                continue;
            };
            match nested.iter_mut().find(|(existing, _, _)| *existing == name) {
                Some((_, _, subfields)) => subfields.push(rest),
                None => nested.push((name, target, vec![rest])),
            }
        } else if let Some(value) = graph.fields.get(field) {
            out.insert(field.to_owned(), value.clone());
        }
    }

    for (name, target, subfields) in nested {
        let value = match target {
            Some(related) => Value::from(project(related, &subfields)),
            None => Value::Null,
        };
        out.insert(name.to_owned(), value);
    }

    Projection(out)
}
