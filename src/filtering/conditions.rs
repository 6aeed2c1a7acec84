use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use sea_orm::{ColumnTrait, Condition, QueryFilter, Select, sea_query::SimpleExpr};
use serde_json::Value as JsonValue;
use uuid::Uuid;

use super::criteria::{FilterCriterion, FilterOperator};
use super::search::{build_search_condition, case_insensitive_like, escape_like_wildcards};
use crate::config::ServiceConfig;
use crate::core::{CrudResource, EntityMetadata, FieldDef, FieldKind};
use crate::errors::ApiError;

const NAIVE_DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

/// Narrow `select` by every criterion and the optional free-text search term, using the
/// default [`ServiceConfig`] limits.
///
/// Nothing to apply returns `select` unchanged.
///
/// # Errors
///
/// - Configuration error for a property the entity does not have
/// - Validation error for an unconvertible or oversized value, or an operator that does
///   not apply to the field's kind
pub fn apply_filter<R: CrudResource>(
    select: Select<R>,
    filters: Option<&[FilterCriterion]>,
    search: Option<&str>,
) -> Result<Select<R>, ApiError> {
    apply_filter_with_config(select, filters, search, &ServiceConfig::default())
}

/// [`apply_filter`] with explicit limits.
///
/// # Errors
///
/// See [`apply_filter`].
pub fn apply_filter_with_config<R: CrudResource>(
    select: Select<R>,
    filters: Option<&[FilterCriterion]>,
    search: Option<&str>,
    config: &ServiceConfig,
) -> Result<Select<R>, ApiError> {
    Ok(match build_condition::<R>(filters, search, config)? {
        Some(condition) => select.filter(condition),
        None => select,
    })
}

/// The conjunction of all criteria and the search term, or `None` when there is nothing
/// to filter on.
///
/// # Errors
///
/// See [`apply_filter`].
pub fn build_condition<R: CrudResource>(
    filters: Option<&[FilterCriterion]>,
    search: Option<&str>,
    config: &ServiceConfig,
) -> Result<Option<Condition>, ApiError> {
    build_metadata_condition(R::metadata(), filters, search, config)
}

fn build_metadata_condition<C: ColumnTrait>(
    metadata: &EntityMetadata<C>,
    filters: Option<&[FilterCriterion]>,
    search: Option<&str>,
    config: &ServiceConfig,
) -> Result<Option<Condition>, ApiError> {
    let mut condition = Condition::all();

    for criterion in filters.unwrap_or_default() {
        let field = metadata.field(&criterion.property_name).ok_or_else(|| {
            ApiError::configuration(format!(
                "invalid filter field '{}'",
                criterion.property_name
            ))
        })?;
        condition = condition.add(criterion_expr(field, criterion, config)?);
    }

    if let Some(search) =
        search.and_then(|term| build_search_condition(metadata, term, config.max_search_length))
    {
        condition = condition.add(search);
    }

    Ok((!condition.is_empty()).then_some(condition))
}

fn criterion_expr<C: ColumnTrait>(
    field: &FieldDef<C>,
    criterion: &FilterCriterion,
    config: &ServiceConfig,
) -> Result<SimpleExpr, ApiError> {
    check_value_length(field, &criterion.value, config.max_value_length)?;

    let column = field.column();
    let operator = criterion.operator;
    let value = &criterion.value;

    if operator.is_ordering() && !field.kind().is_comparable() {
        return Err(unsupported(operator, field));
    }
    if operator.is_text_match() && !field.kind().is_text() {
        return Err(unsupported(operator, field));
    }

    let expr = match operator {
        FilterOperator::IsNull => column.is_null(),
        FilterOperator::IsNotNull => column.is_not_null(),
        FilterOperator::Equal if value.is_null() => column.is_null(),
        FilterOperator::NotEqual if value.is_null() => column.is_not_null(),
        FilterOperator::Equal => column.eq(convert_value(field, value)?),
        FilterOperator::NotEqual => column.ne(convert_value(field, value)?),
        FilterOperator::GreaterThan => column.gt(convert_value(field, value)?),
        FilterOperator::LessThan => column.lt(convert_value(field, value)?),
        FilterOperator::GreaterOrEqual => column.gte(convert_value(field, value)?),
        FilterOperator::LessOrEqual => column.lte(convert_value(field, value)?),
        FilterOperator::Contains | FilterOperator::StartsWith | FilterOperator::EndsWith => {
            let escaped = escape_like_wildcards(&scalar_text(field, value)?);
            let pattern = match operator {
                FilterOperator::Contains => format!("%{escaped}%"),
                FilterOperator::StartsWith => format!("{escaped}%"),
                _ => format!("%{escaped}"),
            };
            case_insensitive_like(column, &pattern)
        }
        FilterOperator::In | FilterOperator::NotIn => {
            let values = list_values(field, value)?
                .iter()
                .map(|item| convert_text(field, item))
                .collect::<Result<Vec<_>, _>>()?;
            if operator == FilterOperator::In {
                column.is_in(values)
            } else {
                column.is_not_in(values)
            }
        }
    };
    Ok(expr)
}

fn unsupported<C: Copy>(operator: FilterOperator, field: &FieldDef<C>) -> ApiError {
    ApiError::validation(format!(
        "operator {operator:?} is not supported for field '{}'",
        field.name()
    ))
}

fn invalid_value<C: Copy>(field: &FieldDef<C>, raw: &str) -> ApiError {
    ApiError::validation(format!(
        "invalid value '{raw}' for field '{}'",
        field.name()
    ))
}

fn check_value_length<C: Copy>(
    field: &FieldDef<C>,
    value: &JsonValue,
    max_chars: usize,
) -> Result<(), ApiError> {
    let too_long = |text: &str| text.chars().count() > max_chars;
    let oversized = match value {
        JsonValue::String(text) => too_long(text),
        JsonValue::Array(items) => items
            .iter()
            .any(|item| item.as_str().is_some_and(too_long)),
        _ => false,
    };
    if oversized {
        return Err(ApiError::validation(format!(
            "value for field '{}' exceeds {max_chars} characters",
            field.name()
        )));
    }
    Ok(())
}

/// Textual form of a scalar JSON value; strings are taken as-is.
fn scalar_text<C: Copy>(field: &FieldDef<C>, value: &JsonValue) -> Result<String, ApiError> {
    match value {
        JsonValue::String(text) => Ok(text.clone()),
        JsonValue::Number(number) => Ok(number.to_string()),
        JsonValue::Bool(flag) => Ok(flag.to_string()),
        other => Err(invalid_value(field, &other.to_string())),
    }
}

/// Elements of an `In`/`NotIn` value: a JSON array or a comma-delimited string.
fn list_values<C: Copy>(field: &FieldDef<C>, value: &JsonValue) -> Result<Vec<String>, ApiError> {
    let items: Vec<String> = match value {
        JsonValue::Array(items) => items
            .iter()
            .map(|item| scalar_text(field, item))
            .collect::<Result<_, _>>()?,
        JsonValue::String(text) => text
            .split(',')
            .map(str::trim)
            .filter(|item| !item.is_empty())
            .map(str::to_owned)
            .collect(),
        other => vec![scalar_text(field, other)?],
    };
    if items.is_empty() {
        return Err(ApiError::validation(format!(
            "empty value list for field '{}'",
            field.name()
        )));
    }
    Ok(items)
}

/// Convert a criterion value into a bound value of the field's kind.
///
/// # Errors
///
/// Validation error when the value cannot be read as the field's kind.
pub fn convert_value<C: Copy>(
    field: &FieldDef<C>,
    value: &JsonValue,
) -> Result<sea_orm::Value, ApiError> {
    convert_text(field, &scalar_text(field, value)?)
}

fn convert_text<C: Copy>(field: &FieldDef<C>, raw: &str) -> Result<sea_orm::Value, ApiError> {
    let text = raw.trim();
    let invalid = || invalid_value(field, raw);

    let value = match field.kind() {
        FieldKind::Text => sea_orm::Value::from(raw.to_owned()),
        FieldKind::Uuid => sea_orm::Value::from(Uuid::parse_str(text).map_err(|_| invalid())?),
        FieldKind::Integer => sea_orm::Value::from(text.parse::<i64>().map_err(|_| invalid())?),
        FieldKind::Float => sea_orm::Value::from(text.parse::<f64>().map_err(|_| invalid())?),
        FieldKind::Boolean => sea_orm::Value::from(parse_bool(text).ok_or_else(invalid)?),
        FieldKind::DateTime => sea_orm::Value::from(parse_datetime(text).ok_or_else(invalid)?),
        FieldKind::NaiveDateTime => {
            sea_orm::Value::from(parse_naive_datetime(text).ok_or_else(invalid)?)
        }
        FieldKind::Date => sea_orm::Value::from(parse_date(text).ok_or_else(invalid)?),
        FieldKind::Other => {
            return Err(ApiError::validation(format!(
                "filtering by value is not supported for field '{}'",
                field.name()
            )));
        }
    };
    Ok(value)
}

fn parse_bool(text: &str) -> Option<bool> {
    match text.to_ascii_lowercase().as_str() {
        "true" | "1" => Some(true),
        "false" | "0" => Some(false),
        _ => None,
    }
}

fn parse_date(text: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(text, "%Y-%m-%d").ok()
}

fn parse_naive_datetime(text: &str) -> Option<NaiveDateTime> {
    NAIVE_DATETIME_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(text, format).ok())
        .or_else(|| parse_date(text).map(|date| date.and_time(NaiveTime::MIN)))
}

/// RFC 3339, a zone-less timestamp read as UTC, or a bare date meaning midnight UTC.
fn parse_datetime(text: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(text)
        .map(|parsed| parsed.with_timezone(&Utc))
        .ok()
        .or_else(|| parse_naive_datetime(text).map(|naive| naive.and_utc()))
}
