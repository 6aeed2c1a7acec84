//! Per-entity property tables.
//!
//! Every entity exposes one [`EntityMetadata`] built lazily on first use and reused for
//! every request afterwards. It is the only place where a runtime property name is turned
//! into a Sea-ORM column, so filtering, sorting, projection and patching all share the same
//! "unknown field" rule.
//!
//! The field table is derived from the entity's columns: a property is named after its
//! column and its [`FieldKind`] follows the column type. Only the parts a schema cannot
//! express (searchable fields, navigations, audit columns) are declared by hand:
//!
//! ```rust,ignore
//! static METADATA: LazyLock<EntityMetadata<Column>> = LazyLock::new(|| {
//!     EntityMetadata::from_columns(Column::Guid)
//!         .with_searchable(&["ID", "DESCRIPTION"])
//!         .with_navigation(Navigation::belongs_to::<building::Entity>("Building", Column::BuildingGuid))
//!         .with_audit(Column::CreatedAt, Column::UpdatedAt)
//! });
//! ```

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use sea_orm::{ColumnTrait, ColumnType};

use super::traits::CrudResource;
use crate::includes::{KeyLoader, RelatedLoader};

/// Value category of a property, used to convert filter values and to decide which
/// operators apply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldKind {
    Uuid,
    Text,
    Integer,
    Float,
    Boolean,
    /// Timestamp with time zone, bound as `DateTime<Utc>`
    DateTime,
    /// Timestamp without time zone
    NaiveDateTime,
    Date,
    /// Anything else (json, binary, enums...); only null checks are supported
    Other,
}

impl FieldKind {
    /// Kinds that support `GreaterThan`, `LessOrEqual` and friends.
    #[must_use]
    pub fn is_comparable(self) -> bool {
        matches!(
            self,
            Self::Integer | Self::Float | Self::DateTime | Self::NaiveDateTime | Self::Date
        )
    }

    #[must_use]
    pub fn is_text(self) -> bool {
        self == Self::Text
    }
}

impl From<&ColumnType> for FieldKind {
    fn from(column_type: &ColumnType) -> Self {
        match column_type {
            ColumnType::Uuid => Self::Uuid,
            ColumnType::Char(_) | ColumnType::String(_) | ColumnType::Text => Self::Text,
            ColumnType::TinyInteger
            | ColumnType::SmallInteger
            | ColumnType::Integer
            | ColumnType::BigInteger
            | ColumnType::TinyUnsigned
            | ColumnType::SmallUnsigned
            | ColumnType::Unsigned
            | ColumnType::BigUnsigned => Self::Integer,
            ColumnType::Float | ColumnType::Double | ColumnType::Decimal(_) => Self::Float,
            ColumnType::Boolean => Self::Boolean,
            ColumnType::TimestampWithTimeZone => Self::DateTime,
            ColumnType::DateTime | ColumnType::Timestamp => Self::NaiveDateTime,
            ColumnType::Date => Self::Date,
            _ => Self::Other,
        }
    }
}

/// One row of the field table.
#[derive(Debug, Clone)]
pub struct FieldDef<C> {
    name: String,
    column: C,
    kind: FieldKind,
}

impl<C: Copy> FieldDef<C> {
    #[must_use]
    pub fn new(name: impl Into<String>, column: C, kind: FieldKind) -> Self {
        Self {
            name: name.into(),
            column,
            kind,
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn column(&self) -> C {
        self.column
    }

    #[must_use]
    pub fn kind(&self) -> FieldKind {
        self.kind
    }
}

/// A reference from one entity to another through a nullable foreign-key GUID.
///
/// The target entity is erased behind a [`RelatedLoader`] so a single table can hold
/// navigations to different entity types.
pub struct Navigation<C> {
    name: &'static str,
    foreign_key: C,
    loader: Arc<dyn RelatedLoader>,
}

impl<C> Navigation<C> {
    /// Navigation whose foreign key on this entity holds the target's identifier.
    #[must_use]
    pub fn belongs_to<T: CrudResource>(name: &'static str, foreign_key: C) -> Self {
        Self {
            name,
            foreign_key,
            loader: Arc::new(KeyLoader::<T>::new()),
        }
    }

    #[must_use]
    pub fn name(&self) -> &'static str {
        self.name
    }

    #[must_use]
    pub fn foreign_key(&self) -> C
    where
        C: Copy,
    {
        self.foreign_key
    }

    pub(crate) fn loader(&self) -> &dyn RelatedLoader {
        self.loader.as_ref()
    }
}

impl<C: fmt::Debug> fmt::Debug for Navigation<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Navigation")
            .field("name", &self.name)
            .field("foreign_key", &self.foreign_key)
            .finish_non_exhaustive()
    }
}

/// Columns stamped from the service clock on create.
#[derive(Debug, Clone, Copy)]
pub struct AuditColumns<C> {
    pub created_at: C,
    pub updated_at: C,
}

/// Field table, searchable fields, navigations and audit columns of one entity.
#[derive(Debug)]
pub struct EntityMetadata<C> {
    id_field: String,
    fields: Vec<FieldDef<C>>,
    by_name: HashMap<String, usize>,
    searchable: Vec<&'static str>,
    navigations: Vec<Navigation<C>>,
    audit: Option<AuditColumns<C>>,
}

impl<C: ColumnTrait> EntityMetadata<C> {
    /// Build the field table from every column of the entity.
    #[must_use]
    pub fn from_columns(id_column: C) -> Self {
        let fields: Vec<FieldDef<C>> = C::iter()
            .map(|column| {
                FieldDef::new(
                    column.as_str(),
                    column,
                    FieldKind::from(column.def().get_column_type()),
                )
            })
            .collect();
        let by_name = fields
            .iter()
            .enumerate()
            .map(|(index, field)| (field.name.clone(), index))
            .collect();

        Self {
            id_field: id_column.as_str().to_owned(),
            fields,
            by_name,
            searchable: Vec::new(),
            navigations: Vec::new(),
            audit: None,
        }
    }

    /// Declare the text fields the free-text search term is matched against.
    #[must_use]
    pub fn with_searchable(mut self, names: &[&'static str]) -> Self {
        self.searchable.extend_from_slice(names);
        self
    }

    #[must_use]
    pub fn with_navigation(mut self, navigation: Navigation<C>) -> Self {
        self.navigations.push(navigation);
        self
    }

    #[must_use]
    pub fn with_audit(mut self, created_at: C, updated_at: C) -> Self {
        self.audit = Some(AuditColumns {
            created_at,
            updated_at,
        });
        self
    }

    /// Name of the identifier property (always part of a projection).
    #[must_use]
    pub fn id_field(&self) -> &str {
        &self.id_field
    }

    #[must_use]
    pub fn fields(&self) -> &[FieldDef<C>] {
        &self.fields
    }

    /// Exact, case-sensitive property lookup.
    #[must_use]
    pub fn field(&self, name: &str) -> Option<&FieldDef<C>> {
        self.by_name.get(name).map(|&index| &self.fields[index])
    }

    /// Text fields searched by the free-text term: the declared ones, or every text
    /// field when none were declared. Declared names that are unknown or not text are
    /// skipped.
    #[must_use]
    pub fn search_fields(&self) -> Vec<&FieldDef<C>> {
        if self.searchable.is_empty() {
            return self.fields.iter().filter(|f| f.kind.is_text()).collect();
        }
        self.searchable
            .iter()
            .filter_map(|name| self.field(name))
            .filter(|f| f.kind.is_text())
            .collect()
    }

    #[must_use]
    pub fn navigations(&self) -> &[Navigation<C>] {
        &self.navigations
    }

    /// Case-insensitive navigation lookup, matching how dotted field paths are resolved.
    #[must_use]
    pub fn navigation(&self, name: &str) -> Option<&Navigation<C>> {
        self.navigations
            .iter()
            .find(|navigation| navigation.name.eq_ignore_ascii_case(name))
    }

    #[must_use]
    pub fn audit(&self) -> Option<AuditColumns<C>> {
        self.audit
    }
}
