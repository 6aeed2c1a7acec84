use sea_orm::{
    ColumnTrait, Condition,
    sea_query::{Expr, Func, LikeExpr, SimpleExpr},
};

use crate::core::EntityMetadata;

/// Escape LIKE wildcards so user input only ever matches literally.
/// Escapes: % (match any) and _ (match single char)
#[must_use]
pub fn escape_like_wildcards(input: &str) -> String {
    input
        .replace('\\', "\\\\") // Escape backslash first
        .replace('%', "\\%")
        .replace('_', "\\_")
}

/// `UPPER(column) LIKE UPPER(pattern) ESCAPE '\'`
///
/// `pattern` must already have its literal parts escaped with [`escape_like_wildcards`].
#[must_use]
pub fn case_insensitive_like<C: ColumnTrait>(column: C, pattern: &str) -> SimpleExpr {
    Expr::expr(Func::upper(Expr::col((column.entity_name(), column))))
        .like(LikeExpr::new(pattern.to_uppercase()).escape('\\'))
}

/// Trim the term and cut it to at most `max_chars` characters.
#[must_use]
pub fn truncate_search_term(term: &str, max_chars: usize) -> &str {
    let term = term.trim();
    match term.char_indices().nth(max_chars) {
        Some((end, _)) => term[..end].trim_end(),
        None => term,
    }
}

/// Free-text search: the term is contained (case-insensitively) in at least one of the
/// entity's searchable fields.
///
/// Returns `None` for a blank term. An entity without text fields matches nothing.
#[must_use]
pub fn build_search_condition<C: ColumnTrait>(
    metadata: &EntityMetadata<C>,
    term: &str,
    max_chars: usize,
) -> Option<Condition> {
    let term = truncate_search_term(term, max_chars);
    if term.is_empty() {
        return None;
    }

    let fields = metadata.search_fields();
    if fields.is_empty() {
        return Some(Condition::all().add(Expr::val(1).eq(0)));
    }

    let pattern = format!("%{}%", escape_like_wildcards(term));
    let condition = fields
        .into_iter()
        .fold(Condition::any(), |any, field| {
            any.add(case_insensitive_like(field.column(), &pattern))
        });
    Some(condition)
}
