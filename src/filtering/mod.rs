pub mod conditions;
pub mod criteria;
pub mod pagination;
pub mod search;
pub mod sort;

pub use conditions::{apply_filter, apply_filter_with_config, build_condition, convert_value};
pub use criteria::{FilterCriterion, FilterOperator, parse_filter_json};
pub use pagination::page_bounds;
pub use search::{build_search_condition, case_insensitive_like, escape_like_wildcards};
pub use sort::{apply_sort, parse_sort_order};
