//! Keyword check for questions that need live data.

/// Literal substrings (lower-case) that mark a question as time-sensitive.
/// Matching is plain substring search, so "now" also fires inside "know".
pub const TIME_SENSITIVE_KEYWORDS: &[&str] = &[
    "yesterday",
    "today",
    "current",
    "now",
    "latest",
    "recent",
    "this week",
    "last week",
    "price",
    "stock",
];

/// True when the lower-cased query contains any time-sensitive keyword.
pub fn is_time_sensitive(query: &str) -> bool {
    let query_lower = query.to_lowercase();
    TIME_SENSITIVE_KEYWORDS
        .iter()
        .any(|keyword| query_lower.contains(keyword))
}
