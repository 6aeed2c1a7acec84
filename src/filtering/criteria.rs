use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::ToSchema;

use crate::errors::ApiError;

/// Comparison applied by a [`FilterCriterion`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
pub enum FilterOperator {
    Equal,
    NotEqual,
    GreaterThan,
    LessThan,
    GreaterOrEqual,
    LessOrEqual,
    Contains,
    StartsWith,
    EndsWith,
    In,
    NotIn,
    IsNull,
    IsNotNull,
}

impl FilterOperator {
    /// Operators that only apply to ordered kinds (numbers and dates).
    #[must_use]
    pub fn is_ordering(self) -> bool {
        matches!(
            self,
            Self::GreaterThan | Self::LessThan | Self::GreaterOrEqual | Self::LessOrEqual
        )
    }

    /// Operators that only apply to text fields.
    #[must_use]
    pub fn is_text_match(self) -> bool {
        matches!(self, Self::Contains | Self::StartsWith | Self::EndsWith)
    }
}

/// One `(PropertyName, Operator, Value)` triple of a filter request.
///
/// ```json
/// { "PropertyName": "FLOOR_COUNT", "Operator": "GreaterOrEqual", "Value": "3" }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "PascalCase")]
pub struct FilterCriterion {
    pub property_name: String,
    pub operator: FilterOperator,
    /// Usually a string; `In`/`NotIn` also accept an array, and `null` tests for null.
    #[serde(default)]
    #[schema(value_type = Object)]
    pub value: Value,
}

impl FilterCriterion {
    #[must_use]
    pub fn new(
        property_name: impl Into<String>,
        operator: FilterOperator,
        value: impl Into<Value>,
    ) -> Self {
        Self {
            property_name: property_name.into(),
            operator,
            value: value.into(),
        }
    }
}

/// Parse the JSON-encoded criteria list carried in a query string.
///
/// # Errors
///
/// Malformed JSON is a validation error.
pub fn parse_filter_json(filter: Option<&str>) -> Result<Vec<FilterCriterion>, ApiError> {
    match filter.map(str::trim) {
        None | Some("") => Ok(Vec::new()),
        Some(json) => serde_json::from_str(json)
            .map_err(|e| ApiError::validation(format!("invalid filter: {e}"))),
    }
}
