use regex::Regex;
use std::sync::LazyLock;

/// `FF` followed by a path separator, then the shortest run up to the next separator.
static CUSTOMER_MARKER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"FF[\\/](.*?)[\\/]").expect("customer marker pattern is valid")
});

/// Returns the segment after the first `FF/` (or `FF\`) marker in a path-like field.
///
/// An empty segment (`FF//`) is returned as `Some("")`; a missing field, an absent
/// marker or a marker without a closing separator yield `None`.
pub fn extract_customer_number(path: Option<&str>) -> Option<String> {
    let path = path?;
    CUSTOMER_MARKER
        .captures(path)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}
