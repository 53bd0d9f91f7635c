//! Shared scalar parsing helpers used by all strategies.
//!
//! Unparsable values never become errors: integers fall back to `0` and
//! booleans fall back to the unknown (`None`) state.

/// Parse a tri-state boolean from an attribute value.
///
/// Only the exact lexical forms `"true"` and `"false"` are recognized.
/// Anything else, including an absent or empty value, is unknown.
///
/// # Examples
///
/// ```
/// use catalog_xml::values::parse_bool;
///
/// assert_eq!(parse_bool(Some("true")), Some(true));
/// assert_eq!(parse_bool(Some("false")), Some(false));
/// assert_eq!(parse_bool(Some("True")), None);
/// assert_eq!(parse_bool(None), None);
/// ```
#[must_use]
pub fn parse_bool(value: Option<&str>) -> Option<bool> {
    match value? {
        "true" => Some(true),
        "false" => Some(false),
        _ => None,
    }
}

/// Parse an integer field such as a page count, defaulting to `0`.
///
/// Surrounding whitespace is ignored.
///
/// # Examples
///
/// ```
/// use catalog_xml::values::parse_int;
///
/// assert_eq!(parse_int(Some(" 412 ")), 412);
/// assert_eq!(parse_int(Some("many")), 0);
/// assert_eq!(parse_int(None), 0);
/// ```
#[must_use]
pub fn parse_int(value: Option<&str>) -> i32 {
    value.and_then(|v| v.trim().parse().ok()).unwrap_or(0)
}

/// Textual form of a tri-state boolean: `"true"`, `"false"` or `"unknown"`.
#[must_use]
pub const fn tri_state_label(value: Option<bool>) -> &'static str {
    match value {
        Some(true) => "true",
        Some(false) => "false",
        None => "unknown",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_bool_is_case_sensitive() {
        assert_eq!(parse_bool(Some("TRUE")), None);
        assert_eq!(parse_bool(Some("False")), None);
        assert_eq!(parse_bool(Some("")), None);
        assert_eq!(parse_bool(Some("yes")), None);
    }

    #[test]
    fn test_parse_int_rejects_garbage() {
        assert_eq!(parse_int(Some("")), 0);
        assert_eq!(parse_int(Some("12a")), 0);
        assert_eq!(parse_int(Some("-3")), -3);
        assert_eq!(parse_int(Some("99999999999")), 0);
    }

    #[test]
    fn test_tri_state_label() {
        assert_eq!(tri_state_label(Some(true)), "true");
        assert_eq!(tri_state_label(Some(false)), "false");
        assert_eq!(tri_state_label(None), "unknown");
    }
}
