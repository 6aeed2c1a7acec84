use sea_orm::{QueryOrder, Select, sea_query::Order};

use crate::core::CrudResource;
use crate::errors::ApiError;

/// Convert a sort order string to an [`Order`], ignoring case.
///
/// # Errors
///
/// Anything other than `asc`/`desc` is a validation error.
pub fn parse_sort_order(sort_order: &str) -> Result<Order, ApiError> {
    let order = sort_order.trim();
    if order.eq_ignore_ascii_case("asc") {
        Ok(Order::Asc)
    } else if order.eq_ignore_ascii_case("desc") {
        Ok(Order::Desc)
    } else {
        Err(ApiError::validation(format!(
            "invalid sort order '{sort_order}'"
        )))
    }
}

/// Order `select` by one property.
///
/// A missing or blank `sort_field` returns `select` unchanged without looking at
/// `sort_order`. Rows with equal keys come back in no particular order.
///
/// # Errors
///
/// Configuration error for an unknown field, validation error for a bad order.
pub fn apply_sort<R: CrudResource>(
    select: Select<R>,
    sort_field: Option<&str>,
    sort_order: &str,
) -> Result<Select<R>, ApiError> {
    let Some(name) = sort_field.map(str::trim).filter(|name| !name.is_empty()) else {
        return Ok(select);
    };

    let field = R::metadata()
        .field(name)
        .ok_or_else(|| ApiError::configuration(format!("invalid sort field '{name}'")))?;
    let order = parse_sort_order(sort_order)?;

    Ok(select.order_by(field.column(), order))
}
