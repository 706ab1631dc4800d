/// Content collections and their database stores
///
/// One store per resource type, each a thin manager over the shared
/// SQLite pool. Identity is a UUID v4 assigned at insert and immutable;
/// `created_at` is fixed at insert and `updated_at` refreshed on every
/// mutating write.
pub mod animes;
pub mod articles;
pub mod projects;

pub use animes::{Anime, AnimeStore};
pub use articles::{Article, ArticleStore};
pub use projects::{Project, ProjectStore};

use crate::error::{ApiError, ApiResult};
use chrono::{DateTime, Utc};

/// Parse an RFC3339 timestamp column
pub(crate) fn parse_timestamp(raw: &str, column: &str) -> ApiResult<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| ApiError::Internal(format!("Invalid {} timestamp: {}", column, e)))
}

/// Parse a JSON-encoded string-list column
pub(crate) fn parse_string_list(raw: &str, column: &str) -> ApiResult<Vec<String>> {
    serde_json::from_str(raw)
        .map_err(|e| ApiError::Internal(format!("Invalid {} list: {}", column, e)))
}

/// Escape LIKE wildcards in user-supplied search input
///
/// Patterns built from the result must use `ESCAPE '\'`. Search input is
/// always treated as a literal substring; it can never smuggle in
/// wildcards or any other pattern syntax.
pub(crate) fn escape_like(input: &str) -> String {
    let mut escaped = String::with_capacity(input.len());
    for c in input.chars() {
        if matches!(c, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}
