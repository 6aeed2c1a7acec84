use std::marker::PhantomData;
use std::sync::Arc;

use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, Iterable, PaginatorTrait, QueryFilter,
};
use uuid::Uuid;

use super::query::EntityQuery;
use super::traits::CrudResource;
use crate::clock::{Clock, SystemClock};
use crate::config::ServiceConfig;
use crate::errors::ApiError;
use crate::filtering::FilterCriterion;
use crate::models::ListQuery;
use crate::patch::{PatchOperation, apply_patch};
use crate::projection::{Projection, map_to_fields, parse_field_list};

/// The six entity operations, generic over any [`CrudResource`].
///
/// ```rust,ignore
/// let buildings = CrudService::<building::Entity>::new(db.clone());
/// let id = buildings.create(building::Model::new("B-100", &SystemClock)).await?;
/// let found = buildings.get_by_id(id, "ID,Manager.LAST_NAME").await?;
/// ```
pub struct CrudService<R: CrudResource> {
    db: DatabaseConnection,
    clock: Arc<dyn Clock>,
    config: ServiceConfig,
    _resource: PhantomData<fn() -> R>,
}

impl<R: CrudResource> Clone for CrudService<R> {
    fn clone(&self) -> Self {
        Self {
            db: self.db.clone(),
            clock: Arc::clone(&self.clock),
            config: self.config.clone(),
            _resource: PhantomData,
        }
    }
}

impl<R: CrudResource> CrudService<R> {
    #[must_use]
    pub fn new(db: DatabaseConnection) -> Self {
        Self {
            db,
            clock: Arc::new(SystemClock),
            config: ServiceConfig::default(),
            _resource: PhantomData,
        }
    }

    #[must_use]
    pub fn with_clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Arc::new(clock);
        self
    }

    #[must_use]
    pub fn with_config(mut self, config: ServiceConfig) -> Self {
        self.config = config;
        self
    }

    #[must_use]
    pub fn db(&self) -> &DatabaseConnection {
        &self.db
    }

    #[must_use]
    pub fn config(&self) -> &ServiceConfig {
        &self.config
    }

    /// Project the entity with identifier `id` onto `fields`, loading only the navigations
    /// those fields reach into. An empty field list yields the identifier alone.
    ///
    /// # Errors
    ///
    /// Store failures, or a configuration error for a navigation `R` does not declare.
    pub async fn get_by_id(&self, id: Uuid, fields: &str) -> Result<Option<Projection>, ApiError> {
        let requested = parse_field_list(fields);
        let graph = EntityQuery::<R>::by_id(id)
            .include_requested(&requested)?
            .graph(&self.db)
            .await?;
        Ok(map_to_fields(graph.as_ref(), fields))
    }

    /// One page of entities matching the query's filters and search term, in its sort order.
    ///
    /// # Errors
    ///
    /// - Validation error for paging out of range (checked before anything else)
    /// - Filter and sort errors from [`apply_filter`](crate::filtering::apply_filter) and
    ///   [`apply_sort`](crate::filtering::apply_sort)
    pub async fn get(&self, query: &ListQuery) -> Result<Vec<R::Model>, ApiError> {
        let models = self.list_query(query)?.all(&self.db).await?;
        tracing::debug!(
            resource = R::RESOURCE_NAME_PLURAL,
            page = query.page_number,
            returned = models.len(),
            "listed entities"
        );
        Ok(models)
    }

    /// [`get`](Self::get) with every row projected onto `fields`.
    ///
    /// # Errors
    ///
    /// See [`get`](Self::get) and [`get_by_id`](Self::get_by_id).
    pub async fn get_projected(
        &self,
        query: &ListQuery,
        fields: &str,
    ) -> Result<Vec<Projection>, ApiError> {
        let requested = parse_field_list(fields);
        let graphs = self
            .list_query(query)?
            .include_requested(&requested)?
            .graphs(&self.db)
            .await?;
        Ok(graphs
            .iter()
            .filter_map(|graph| map_to_fields(Some(graph), fields))
            .collect())
    }

    /// Number of entities matching `filters` and `search`, ignoring paging.
    ///
    /// # Errors
    ///
    /// See [`apply_filter`](crate::filtering::apply_filter).
    pub async fn count(
        &self,
        filters: Option<&[FilterCriterion]>,
        search: Option<&str>,
    ) -> Result<u64, ApiError> {
        EntityQuery::<R>::new()
            .filter(filters, search, &self.config)?
            .count(&self.db)
            .await
    }

    /// Insert `model` under a fresh identifier, stamping its audit columns from the clock.
    /// Any identifier already on `model` is ignored.
    ///
    /// # Errors
    ///
    /// Conflict on a unique constraint violation, otherwise store failures.
    pub async fn create(&self, model: R::Model) -> Result<Uuid, ApiError> {
        let id = Uuid::new_v4();
        let mut active = full_active_model::<R>(model);
        active.set(R::ID_COLUMN, id.into());

        if let Some(audit) = R::metadata().audit() {
            let now = self.clock.now();
            active.set(audit.created_at, now.into());
            active.set(audit.updated_at, now.into());
        }

        R::insert(active).exec(&self.db).await?;
        tracing::debug!(resource = R::RESOURCE_NAME_SINGULAR, %id, "created");
        Ok(id)
    }

    /// Replace every non-key column of the stored entity with the values in `model`.
    ///
    /// # Errors
    ///
    /// Not found when no entity has identifier `id`; conflict on a unique constraint
    /// violation.
    pub async fn update(&self, id: Uuid, model: R::Model) -> Result<bool, ApiError> {
        let exists = R::find()
            .filter(R::ID_COLUMN.eq(id))
            .count(&self.db)
            .await?
            > 0;
        if !exists {
            return Err(Self::not_found(id));
        }

        self.write(id, full_active_model::<R>(model)).await?;
        tracing::debug!(resource = R::RESOURCE_NAME_SINGULAR, %id, "updated");
        Ok(true)
    }

    /// Apply a patch document to the stored entity.
    ///
    /// # Errors
    ///
    /// - Validation error when `operations` is `None` or the patched entity is invalid
    /// - Not found when no entity has identifier `id`
    /// - Configuration error for a path naming no field
    pub async fn patch(
        &self,
        id: Uuid,
        operations: Option<&[PatchOperation]>,
    ) -> Result<bool, ApiError> {
        let operations =
            operations.ok_or_else(|| ApiError::validation("patch document is required"))?;

        let stored = EntityQuery::<R>::by_id(id)
            .one(&self.db)
            .await?
            .ok_or_else(|| Self::not_found(id))?;
        let patched = apply_patch::<R>(&stored, operations)?;

        self.write(id, full_active_model::<R>(patched)).await?;
        tracing::debug!(
            resource = R::RESOURCE_NAME_SINGULAR,
            %id,
            operations = operations.len(),
            "patched"
        );
        Ok(true)
    }

    /// # Errors
    ///
    /// Not found when nothing was deleted, including a second delete of the same id.
    pub async fn delete(&self, id: Uuid) -> Result<bool, ApiError> {
        let result = R::delete_many()
            .filter(R::ID_COLUMN.eq(id))
            .exec(&self.db)
            .await?;
        if result.rows_affected == 0 {
            return Err(Self::not_found(id));
        }
        tracing::debug!(resource = R::RESOURCE_NAME_SINGULAR, %id, "deleted");
        Ok(true)
    }

    fn list_query(&self, query: &ListQuery) -> Result<EntityQuery<R>, ApiError> {
        EntityQuery::<R>::new()
            .paginate(query.page_number, query.page_size, self.config.max_page_size)?
            .filter(
                query.filters.as_deref(),
                query.search_term.as_deref(),
                &self.config,
            )?
            .sort(query.sort_field.as_deref(), &query.sort_order)
    }

    async fn write(&self, id: Uuid, mut active: R::ActiveModelType) -> Result<(), ApiError> {
        active.not_set(R::ID_COLUMN);
        R::update_many()
            .set(active)
            .filter(R::ID_COLUMN.eq(id))
            .exec(&self.db)
            .await?;
        Ok(())
    }

    fn not_found(id: Uuid) -> ApiError {
        ApiError::not_found(R::RESOURCE_NAME_SINGULAR, Some(id.to_string()))
    }
}

/// Active model with every column marked as set, so inserts and updates write all of them.
fn full_active_model<R: CrudResource>(model: R::Model) -> R::ActiveModelType {
    let mut active = R::ActiveModelType::from(model);
    for column in R::Column::iter() {
        if let Some(value) = active.get(column).into_value() {
            active.set(column, value);
        }
    }
    active
}
