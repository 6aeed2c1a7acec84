use serde::Deserialize;
use serde_with::{NoneAsEmptyString, serde_as};
use utoipa::IntoParams;

use crate::errors::ApiError;
use crate::filtering::{FilterCriterion, parse_filter_json};

pub const DEFAULT_PAGE_SIZE: u64 = 10;
pub const DEFAULT_SORT_ORDER: &str = "asc";

/// Everything `Get` needs to shape a list request.
#[derive(Debug, Clone, PartialEq)]
pub struct ListQuery {
    pub filters: Option<Vec<FilterCriterion>>,
    pub search_term: Option<String>,
    /// 1-based
    pub page_number: u64,
    pub page_size: u64,
    pub sort_field: Option<String>,
    /// `asc` or `desc`, any case
    pub sort_order: String,
}

impl Default for ListQuery {
    fn default() -> Self {
        Self {
            filters: None,
            search_term: None,
            page_number: 1,
            page_size: DEFAULT_PAGE_SIZE,
            sort_field: None,
            sort_order: DEFAULT_SORT_ORDER.to_string(),
        }
    }
}

impl ListQuery {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_filters(mut self, filters: Vec<FilterCriterion>) -> Self {
        self.filters = Some(filters);
        self
    }

    #[must_use]
    pub fn with_search(mut self, term: impl Into<String>) -> Self {
        self.search_term = Some(term.into());
        self
    }

    #[must_use]
    pub fn page(mut self, page_number: u64, page_size: u64) -> Self {
        self.page_number = page_number;
        self.page_size = page_size;
        self
    }

    #[must_use]
    pub fn sort_by(mut self, field: impl Into<String>, order: impl Into<String>) -> Self {
        self.sort_field = Some(field.into());
        self.sort_order = order.into();
        self
    }
}

/// Query parameters for list endpoints.
///
/// # Filtering
/// `filter` is a JSON-encoded list of criteria, AND-combined:
/// ```json
/// [{"PropertyName": "FLOOR_COUNT", "Operator": "GreaterOrEqual", "Value": "3"}]
/// ```
/// `q` is a free-text term matched against the entity's searchable fields.
///
/// # Pagination
/// `page_number` is 1-based; `page_size` defaults to 10.
///
/// # Sorting
/// `sort_field` names a property; `sort_order` is `asc` (default) or `desc`.
#[serde_as]
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ListParams {
    /// JSON-encoded filter criteria.
    #[param(example = json!([{"PropertyName": "ID", "Operator": "StartsWith", "Value": "B-"}]))]
    #[serde_as(as = "NoneAsEmptyString")]
    #[serde(default)]
    pub filter: Option<String>,
    /// Free-text search term.
    #[serde_as(as = "NoneAsEmptyString")]
    #[serde(default)]
    pub q: Option<String>,
    #[param(example = 1)]
    pub page_number: Option<u64>,
    #[param(example = 10)]
    pub page_size: Option<u64>,
    #[serde_as(as = "NoneAsEmptyString")]
    #[serde(default)]
    pub sort_field: Option<String>,
    #[param(example = "asc")]
    #[serde_as(as = "NoneAsEmptyString")]
    #[serde(default)]
    pub sort_order: Option<String>,
}

impl TryFrom<ListParams> for ListQuery {
    type Error = ApiError;

    fn try_from(params: ListParams) -> Result<Self, Self::Error> {
        let filters = parse_filter_json(params.filter.as_deref())?;
        Ok(Self {
            filters: (!filters.is_empty()).then_some(filters),
            search_term: params.q,
            page_number: params.page_number.unwrap_or(1),
            page_size: params.page_size.unwrap_or(DEFAULT_PAGE_SIZE),
            sort_field: params.sort_field,
            sort_order: params
                .sort_order
                .unwrap_or_else(|| DEFAULT_SORT_ORDER.to_string()),
        })
    }
}
