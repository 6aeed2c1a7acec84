use crate::errors::ApiError;

/// Offset and limit for a 1-based page.
///
/// # Errors
///
/// Validation error when `page_number` or `page_size` is below 1, when `page_size` is
/// above `max_page_size`, or when the page starts beyond what a database can address.
pub fn page_bounds(
    page_number: u64,
    page_size: u64,
    max_page_size: u64,
) -> Result<(u64, u64), ApiError> {
    if page_number < 1 {
        return Err(ApiError::validation("page number must be at least 1"));
    }
    if page_size < 1 {
        return Err(ApiError::validation("page size must be at least 1"));
    }
    if page_size > max_page_size {
        return Err(ApiError::validation(format!(
            "page size must not exceed {max_page_size}"
        )));
    }

    // offsets and limits are bound as signed 64-bit integers
    let addressable = |value: u64| i64::try_from(value).is_ok();
    match (page_number - 1).checked_mul(page_size) {
        Some(offset) if addressable(offset) && addressable(page_size) => Ok((offset, page_size)),
        _ => Err(ApiError::validation(format!(
            "page number {page_number} is out of range"
        ))),
    }
}
