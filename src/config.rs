use serde::Deserialize;

const DEFAULT_MAX_PAGE_SIZE: u64 = 1_000;
const DEFAULT_MAX_SEARCH_LENGTH: usize = 10_000;
const DEFAULT_MAX_VALUE_LENGTH: usize = 10_000;

/// Limits applied by [`CrudService`](crate::core::CrudService) and the filter builder.
///
/// The host decides where these come from; the struct deserializes from any serde
/// source, and missing keys fall back to the defaults:
///
/// ```rust,ignore
/// let config: ServiceConfig = serde_json::from_str(r#"{"max_page_size": 200}"#)?;
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    /// Largest accepted `page_size`; bigger pages are rejected, not clamped.
    pub max_page_size: u64,
    /// Free-text search terms are truncated to this many characters.
    pub max_search_length: usize,
    /// Filter values longer than this are rejected.
    pub max_value_length: usize,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            max_page_size: DEFAULT_MAX_PAGE_SIZE,
            max_search_length: DEFAULT_MAX_SEARCH_LENGTH,
            max_value_length: DEFAULT_MAX_VALUE_LENGTH,
        }
    }
}
