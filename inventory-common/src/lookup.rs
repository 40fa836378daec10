//! Search lookup string derivation
//!
//! Every instrument stores `lookup = lowercase(trim(name) + " " + category)`
//! (empty category when absent). The store writes it in the same statement as
//! the name/category change, so no reader sees a stale value.

/// Build the lookup string for an instrument
pub fn build_lookup(name: &str, category: Option<&str>) -> String {
    format!("{} {}", name.trim(), category.unwrap_or("")).to_lowercase()
}

/// Normalize free-text search input into the needle matched against `lookup`
///
/// Returns `None` for empty input, which means "no search filter".
pub fn search_needle(search: &str) -> Option<String> {
    if search.is_empty() {
        None
    } else {
        Some(search.to_lowercase())
    }
}
