//! Movie listing query parameters and the filter specification derived
//! from them.
//!
//! This module lives in `core` (zero internal deps) so the repository layer
//! only ever sees a normalized [`MovieFilterSpec`].

use serde::{Deserialize, Serialize};
use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

// ---------------------------------------------------------------------------
// Pagination defaults
// ---------------------------------------------------------------------------

/// Default number of movies per page.
pub const DEFAULT_LIMIT: i64 = 20;

/// Maximum number of movies per page.
pub const MAX_LIMIT: i64 = 100;

// ---------------------------------------------------------------------------
// Query parameters
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortKey {
    #[default]
    Id,
    Title,
    Year,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum SortOrder {
    #[default]
    #[serde(rename = "ASC", alias = "asc")]
    Asc,
    #[serde(rename = "DESC", alias = "desc")]
    Desc,
}

impl SortOrder {
    pub fn as_sql(&self) -> &'static str {
        match self {
            Self::Asc => "ASC",
            Self::Desc => "DESC",
        }
    }
}

/// Listing parameters (`?limit=&offset=&sort=&order=&title=&actor=&search=`).
///
/// `search` applies to both the title and the actor name, combined with OR.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MovieQuery {
    pub limit: Option<i64>,
    pub offset: Option<i64>,
    #[serde(default)]
    pub sort: SortKey,
    #[serde(default)]
    pub order: SortOrder,
    pub title: Option<String>,
    pub actor: Option<String>,
    pub search: Option<String>,
}

// ---------------------------------------------------------------------------
// Filter specification
// ---------------------------------------------------------------------------

/// Normalized filter/sort/paginate specification handed to the repository.
///
/// Patterns are ready-to-bind `LIKE` patterns (wrapped in `%`, with `\` as
/// the escape character).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MovieFilterSpec {
    pub title_pattern: Option<String>,
    pub actor_pattern: Option<String>,
    pub sort: SortKey,
    pub order: SortOrder,
    pub limit: i64,
    pub offset: i64,
}

impl MovieFilterSpec {
    pub fn from_query(query: &MovieQuery, default_limit: i64, max_limit: i64) -> Self {
        let search = non_blank(query.search.as_deref());
        let title = non_blank(query.title.as_deref()).or(search);
        let actor = non_blank(query.actor.as_deref()).or(search);

        Self {
            title_pattern: title.map(like_pattern),
            actor_pattern: actor.map(like_pattern),
            sort: query.sort,
            order: query.order,
            limit: clamp_limit(query.limit, default_limit, max_limit),
            offset: clamp_offset(query.offset),
        }
    }

    /// Whether any predicate applies. Without one, every movie qualifies and
    /// carries its full cast.
    pub fn is_filtered(&self) -> bool {
        self.title_pattern.is_some() || self.actor_pattern.is_some()
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

/// Build a substring `LIKE` pattern, escaping the wildcard characters.
pub fn like_pattern(term: &str) -> String {
    let mut pattern = String::with_capacity(term.len() + 2);
    pattern.push('%');
    for c in term.chars() {
        if matches!(c, '\\' | '%' | '_') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}

/// Clamp a user-provided limit to valid bounds.
pub fn clamp_limit(limit: Option<i64>, default: i64, max: i64) -> i64 {
    limit.unwrap_or(default).max(1).min(max)
}

/// Clamp a user-provided offset to non-negative.
pub fn clamp_offset(offset: Option<i64>) -> i64 {
    offset.unwrap_or(0).max(0)
}

/// Sort key for title ordering: canonically decomposed, stripped of
/// combining marks and lowercased, so `Émile` files next to `eagle` rather
/// than after `Zorro`.
pub fn title_sort_key(title: &str) -> String {
    title
        .nfd()
        .filter(|c| !is_combining_mark(*c))
        .flat_map(char::to_lowercase)
        .collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
