//! Conditional eager loading of navigations.
//!
//! A navigation is loaded only when the requested field list reaches into it
//! (`"Manager.LAST_NAME"` includes `Manager`). Loading happens after the main fetch: the
//! foreign keys of every fetched row are collected and each included navigation is loaded
//! with a single `IN` query on the target's key.

use std::collections::HashMap;
use std::marker::PhantomData;

use async_trait::async_trait;
use sea_orm::{ColumnTrait, DatabaseConnection, DbErr, ModelTrait, QueryFilter, Value};
use uuid::Uuid;

use crate::core::{CrudResource, EntityQuery, Navigation};
use crate::errors::ApiError;
use crate::projection::EntityGraph;

/// Loads target entities of a navigation by key, returning graphs keyed by identifier.
#[async_trait]
pub trait RelatedLoader: Send + Sync {
    async fn load(
        &self,
        db: &DatabaseConnection,
        keys: Vec<Uuid>,
    ) -> Result<HashMap<Uuid, EntityGraph>, DbErr>;
}

/// [`RelatedLoader`] for any [`CrudResource`], matching keys against its `ID_COLUMN`.
pub struct KeyLoader<T>(PhantomData<fn() -> T>);

impl<T> KeyLoader<T> {
    #[must_use]
    pub fn new() -> Self {
        Self(PhantomData)
    }
}

impl<T> Default for KeyLoader<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl<T: CrudResource> RelatedLoader for KeyLoader<T> {
    async fn load(
        &self,
        db: &DatabaseConnection,
        keys: Vec<Uuid>,
    ) -> Result<HashMap<Uuid, EntityGraph>, DbErr> {
        if keys.is_empty() {
            return Ok(HashMap::new());
        }

        let models = T::find()
            .filter(T::ID_COLUMN.is_in(keys))
            .all(db)
            .await?;

        let id_field = T::metadata().id_field();
        let mut loaded = HashMap::with_capacity(models.len());
        for model in &models {
            let Some(id) = uuid_value(model.get(T::ID_COLUMN)) else {
                continue;
            };
            let graph = EntityGraph::from_model(model, id_field)
                .map_err(|e| DbErr::Json(e.to_string()))?;
            loaded.insert(id, graph);
        }
        Ok(loaded)
    }
}

/// The GUID held by a column value, if any.
#[must_use]
pub fn uuid_value(value: Value) -> Option<Uuid> {
    match value {
        Value::Uuid(Some(id)) => Some(*id),
        _ => None,
    }
}

/// True when `field` is a dotted path into navigation `navigation` (`"Nav.X"`),
/// ignoring ASCII case.
#[must_use]
pub fn has_navigation_prefix(field: &str, navigation: &str) -> bool {
    let field = field.trim_start();
    field
        .get(..navigation.len())
        .is_some_and(|head| head.eq_ignore_ascii_case(navigation))
        && field.as_bytes().get(navigation.len()) == Some(&b'.')
}

/// Navigations out of `known` that some requested field reaches into.
#[must_use]
pub fn requested_navigations<'a>(requested: &[&str], known: &[&'a str]) -> Vec<&'a str> {
    let mut included: Vec<&'a str> = Vec::new();
    for &navigation in known {
        let reached = requested
            .iter()
            .any(|field| has_navigation_prefix(field, navigation));
        let duplicate = included
            .iter()
            .any(|existing| existing.eq_ignore_ascii_case(navigation));
        if reached && !duplicate {
            included.push(navigation);
        }
    }
    included
}

/// Add an include to `query` for every navigation in `known` reached by `requested`.
///
/// # Errors
///
/// A reached navigation name that `R` does not declare is a configuration error.
pub fn resolve_includes<R: CrudResource>(
    query: EntityQuery<R>,
    requested: &[&str],
    known: &[&str],
) -> Result<EntityQuery<R>, ApiError> {
    requested_navigations(requested, known)
        .into_iter()
        .try_fold(query, EntityQuery::include)
}

/// Materialize `models` and attach every included navigation, one batched query each.
pub(crate) async fn load_graphs<R: CrudResource>(
    db: &DatabaseConnection,
    models: &[R::Model],
    includes: &[&'static Navigation<R::Column>],
) -> Result<Vec<EntityGraph>, ApiError> {
    let id_field = R::metadata().id_field();
    let mut graphs = models
        .iter()
        .map(|model| EntityGraph::from_model(model, id_field))
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| {
            ApiError::internal(
                format!("Failed to read {}", R::RESOURCE_NAME_SINGULAR),
                Some(e.to_string()),
            )
        })?;

    for navigation in includes {
        let foreign_keys: Vec<Option<Uuid>> = models
            .iter()
            .map(|model| uuid_value(model.get(navigation.foreign_key())))
            .collect();

        let mut keys: Vec<Uuid> = foreign_keys.iter().flatten().copied().collect();
        keys.sort_unstable();
        keys.dedup();

        tracing::debug!(
            resource = R::RESOURCE_NAME_PLURAL,
            navigation = navigation.name(),
            keys = keys.len(),
            "loading navigation"
        );
        let related = navigation.loader().load(db, keys).await?;

        for (graph, key) in graphs.iter_mut().zip(foreign_keys) {
            let target = key.and_then(|key| related.get(&key).cloned());
            graph.attach(navigation.name(), target);
        }
    }

    Ok(graphs)
}
