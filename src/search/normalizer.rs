//! Cleaning of raw entity strings before they are sent to the catalog search.

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    // Everything that is not a word character, whitespace, colon, apostrophe or hyphen.
    static ref DISALLOWED_CHARS: Regex = Regex::new(r"[^\w\s:'-]").unwrap();
    static ref WHITESPACE_RUNS: Regex = Regex::new(r"\s+").unwrap();
}

/// Cleans a raw search query.
///
/// Trims the input, strips every character other than word characters,
/// whitespace, apostrophes, hyphens and colons, and collapses whitespace runs
/// into a single space. An empty result means "no query": callers skip it.
///
/// Word characters are Unicode-aware, unlike an ASCII-only `\w`: `Sigur Rós`
/// keeps its accent instead of turning into `Sigur Rs`.
pub fn clean(raw: &str) -> String {
    let stripped = DISALLOWED_CHARS.replace_all(raw.trim(), "");
    WHITESPACE_RUNS.replace_all(&stripped, " ").trim().to_string()
}

/// Cleans a query and returns `None` when nothing searchable is left.
pub fn clean_non_empty(raw: &str) -> Option<String> {
    let cleaned = clean(raw);
    if cleaned.is_empty() {
        None
    } else {
        Some(cleaned)
    }
}
