use sea_orm::{ColumnTrait, DatabaseConnection, PaginatorTrait, QueryFilter, QuerySelect, Select};
use uuid::Uuid;

use super::metadata::Navigation;
use super::traits::CrudResource;
use crate::config::ServiceConfig;
use crate::errors::ApiError;
use crate::filtering::{FilterCriterion, apply_filter_with_config, apply_sort, page_bounds};
use crate::includes::{load_graphs, resolve_includes};
use crate::projection::EntityGraph;

/// A select over `R` plus the navigations to eager-load with it.
///
/// Every shaping step consumes and returns the query, so requests compose left to right:
///
/// ```rust,ignore
/// let graphs = EntityQuery::<equipment::Entity>::new()
///     .filter(Some(&criteria), Some("pump"), &config)?
///     .sort(Some("ID"), "asc")?
///     .paginate(1, 20, config.max_page_size)?
///     .include("Building")?
///     .graphs(&db)
///     .await?;
/// ```
pub struct EntityQuery<R: CrudResource> {
    select: Select<R>,
    includes: Vec<&'static Navigation<R::Column>>,
}

impl<R: CrudResource> EntityQuery<R> {
    #[must_use]
    pub fn new() -> Self {
        Self::from_select(R::find())
    }

    #[must_use]
    pub fn from_select(select: Select<R>) -> Self {
        Self {
            select,
            includes: Vec::new(),
        }
    }

    /// Query for the single entity with identifier `id`.
    #[must_use]
    pub fn by_id(id: Uuid) -> Self {
        Self::from_select(R::find().filter(R::ID_COLUMN.eq(id)))
    }

    /// # Errors
    ///
    /// See [`apply_filter`](crate::filtering::apply_filter).
    pub fn filter(
        self,
        filters: Option<&[FilterCriterion]>,
        search: Option<&str>,
        config: &ServiceConfig,
    ) -> Result<Self, ApiError> {
        Ok(Self {
            select: apply_filter_with_config(self.select, filters, search, config)?,
            ..self
        })
    }

    /// # Errors
    ///
    /// See [`apply_sort`].
    pub fn sort(self, sort_field: Option<&str>, sort_order: &str) -> Result<Self, ApiError> {
        Ok(Self {
            select: apply_sort(self.select, sort_field, sort_order)?,
            ..self
        })
    }

    /// Skip to the 1-based `page_number` and take `page_size` rows.
    ///
    /// # Errors
    ///
    /// See [`page_bounds`].
    pub fn paginate(
        self,
        page_number: u64,
        page_size: u64,
        max_page_size: u64,
    ) -> Result<Self, ApiError> {
        let (offset, limit) = page_bounds(page_number, page_size, max_page_size)?;
        Ok(Self {
            select: self.select.offset(offset).limit(limit),
            ..self
        })
    }

    /// Eager-load the navigation `name` (case-insensitive). Including twice is a no-op.
    ///
    /// # Errors
    ///
    /// Configuration error when `R` declares no such navigation.
    pub fn include(mut self, name: &str) -> Result<Self, ApiError> {
        let navigation = R::metadata().navigation(name).ok_or_else(|| {
            ApiError::configuration(format!(
                "invalid navigation '{name}' for {}",
                R::RESOURCE_NAME_SINGULAR
            ))
        })?;
        if !self
            .includes
            .iter()
            .any(|included| included.name() == navigation.name())
        {
            self.includes.push(navigation);
        }
        Ok(self)
    }

    /// Include every declared navigation reached by a dotted field in `requested`.
    ///
    /// # Errors
    ///
    /// See [`resolve_includes`].
    pub fn include_requested(self, requested: &[&str]) -> Result<Self, ApiError> {
        let known: Vec<&str> = R::metadata()
            .navigations()
            .iter()
            .map(Navigation::name)
            .collect();
        resolve_includes(self, requested, &known)
    }

    /// Names of the included navigations, in inclusion order.
    #[must_use]
    pub fn included(&self) -> Vec<&'static str> {
        self.includes.iter().map(|navigation| navigation.name()).collect()
    }

    #[must_use]
    pub fn as_select(&self) -> &Select<R> {
        &self.select
    }

    #[must_use]
    pub fn into_select(self) -> Select<R> {
        self.select
    }

    /// Fetch the matching models. Includes are ignored.
    ///
    /// # Errors
    ///
    /// Store failures.
    pub async fn all(self, db: &DatabaseConnection) -> Result<Vec<R::Model>, ApiError> {
        Ok(self.select.all(db).await?)
    }

    /// # Errors
    ///
    /// Store failures.
    pub async fn one(self, db: &DatabaseConnection) -> Result<Option<R::Model>, ApiError> {
        Ok(self.select.one(db).await?)
    }

    /// Number of matching rows, ignoring any paging.
    ///
    /// # Errors
    ///
    /// Store failures.
    pub async fn count(self, db: &DatabaseConnection) -> Result<u64, ApiError> {
        Ok(PaginatorTrait::count(self.select, db).await?)
    }

    /// Fetch the matching models as graphs with their included navigations attached.
    ///
    /// # Errors
    ///
    /// Store failures.
    pub async fn graphs(self, db: &DatabaseConnection) -> Result<Vec<EntityGraph>, ApiError> {
        let models = self.select.all(db).await?;
        load_graphs::<R>(db, &models, &self.includes).await
    }

    /// # Errors
    ///
    /// Store failures.
    pub async fn graph(self, db: &DatabaseConnection) -> Result<Option<EntityGraph>, ApiError> {
        let Some(model) = self.select.one(db).await? else {
            return Ok(None);
        };
        let mut graphs = load_graphs::<R>(db, std::slice::from_ref(&model), &self.includes).await?;
        Ok(graphs.pop())
    }
}

impl<R: CrudResource> Default for EntityQuery<R> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::{building, equipment};
    use sea_orm::{DbBackend, QueryTrait};

    #[test]
    fn test_include_is_case_insensitive_and_deduplicated() {
        let query = EntityQuery::<equipment::Entity>::new()
            .include("building")
            .unwrap()
            .include("Building")
            .unwrap()
            .include("CUSTODIAN")
            .unwrap();
        assert_eq!(query.included(), vec!["Building", "Custodian"]);
    }

    #[test]
    fn test_unknown_include_is_configuration_error() {
        let Err(err) = EntityQuery::<building::Entity>::new().include("Building") else {
            panic!("expected an error");
        };
        assert!(err.is_configuration());
    }

    #[test]
    fn test_include_requested() {
        let query = EntityQuery::<equipment::Entity>::new()
            .include_requested(&["ID", "Custodian.LAST_NAME"])
            .unwrap();
        assert_eq!(query.included(), vec!["Custodian"]);

        let query = EntityQuery::<equipment::Entity>::new()
            .include_requested(&["ID", "DESCRIPTION"])
            .unwrap();
        assert!(query.included().is_empty());
    }

    #[test]
    fn test_resolve_includes_rejects_undeclared_navigation() {
        let Err(err) = resolve_includes(
            EntityQuery::<building::Entity>::new(),
            &["Owner.ID"],
            &["Owner"],
        ) else {
            panic!("expected an error");
        };
        assert!(err.is_configuration());
    }

    #[test]
    fn test_shaping_composes() {
        let config = ServiceConfig::default();
        let rendered = EntityQuery::<building::Entity>::new()
            .filter(
                Some(&[FilterCriterion::new(
                    "FLOOR_COUNT",
                    crate::filtering::FilterOperator::GreaterThan,
                    "1",
                )]),
                None,
                &config,
            )
            .unwrap()
            .sort(Some("ID"), "asc")
            .unwrap()
            .paginate(2, 5, config.max_page_size)
            .unwrap()
            .into_select()
            .build(DbBackend::Sqlite)
            .to_string();

        assert!(rendered.contains(r#"WHERE "BUILDING"."FLOOR_COUNT" > 1"#), "{rendered}");
        assert!(rendered.contains(r#"ORDER BY "BUILDING"."ID" ASC"#), "{rendered}");
        assert!(rendered.contains("LIMIT 5 OFFSET 5"), "{rendered}");
    }
}
