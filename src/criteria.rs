//! Search criteria applied to entities while they are extracted.
//!
//! A [`SearchCriteria`] maps a field name to a required substring. An entity
//! matches when, for every filter, the field reachable under that name exists
//! and contains the required value, compared case-insensitively. Filters with
//! blank values are dropped when added, so an all-blank criteria set behaves
//! exactly like no criteria.
//!
//! # Examples
//!
//! ```
//! use catalog_xml::SearchCriteria;
//!
//! let mut criteria = SearchCriteria::new();
//! criteria.add_filter("Category", "fic");
//! criteria.add_filter("language", "   ");
//!
//! assert_eq!(criteria.len(), 1);
//! assert_eq!(criteria.to_string(), "Category=fic");
//! assert!(criteria.matches(|key| (key == "Category").then(|| "Science Fiction".into())));
//! ```

use indexmap::IndexMap;
use serde::Serialize;
use std::borrow::Cow;
use std::fmt;

/// Field-name to required-substring filters.
///
/// Keys are unique; adding a filter for an existing key overwrites its value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SearchCriteria {
    filters: IndexMap<String, String>,
}

impl SearchCriteria {
    /// Create an empty criteria set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace the filter for `key`.
    ///
    /// Does nothing when `value` is empty or whitespace-only.
    pub fn add_filter(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let value = value.into();
        if value.trim().is_empty() {
            return;
        }
        self.filters.insert(key.into(), value);
    }

    /// Builder form of [`add_filter`](Self::add_filter).
    #[must_use]
    pub fn with_filter(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.add_filter(key, value);
        self
    }

    /// Whether at least one filter is present.
    #[must_use]
    pub fn has_filters(&self) -> bool {
        !self.filters.is_empty()
    }

    /// Number of filters.
    #[must_use]
    pub fn len(&self) -> usize {
        self.filters.len()
    }

    /// Whether the criteria set is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.filters.is_empty()
    }

    /// Required value for `key`, if filtered.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.filters.get(key).map(String::as_str)
    }

    /// Iterate over `(key, required value)` pairs.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.filters.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Evaluate the criteria against an entity.
    ///
    /// `lookup` resolves a field name to the entity's value for it, or `None`
    /// when the entity has no such field. A missing field rejects the entity.
    pub fn matches<'a, F>(&self, mut lookup: F) -> bool
    where
        F: FnMut(&str) -> Option<Cow<'a, str>>,
    {
        self.filters.iter().all(|(key, required)| {
            lookup(key).is_some_and(|value| contains_ignore_case(&value, required))
        })
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for SearchCriteria {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut criteria = SearchCriteria::new();
        for (key, value) in iter {
            criteria.add_filter(key, value);
        }
        criteria
    }
}

impl fmt::Display for SearchCriteria {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !self.has_filters() {
            return write!(f, "No filters");
        }
        let rendered: Vec<String> = self
            .filters
            .iter()
            .map(|(key, value)| format!("{key}={value}"))
            .collect();
        write!(f, "{}", rendered.join(", "))
    }
}

/// Apply optional criteria: `None` or an empty set accepts everything.
pub(crate) fn accepts<'a, F>(criteria: Option<&SearchCriteria>, lookup: F) -> bool
where
    F: FnMut(&str) -> Option<Cow<'a, str>>,
{
    criteria.map_or(true, |c| c.matches(lookup))
}

/// Case-insensitive substring test.
///
/// # Examples
///
/// ```
/// use catalog_xml::criteria::contains_ignore_case;
///
/// assert!(contains_ignore_case("Science Fiction", "FIC"));
/// assert!(!contains_ignore_case("Poetry", "fic"));
/// ```
#[must_use]
pub fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lookup_title(key: &str) -> Option<Cow<'static, str>> {
        match key {
            "Title" => Some(Cow::Borrowed("Dune Messiah")),
            "year" => Some(Cow::Borrowed("1969")),
            _ => None,
        }
    }

    #[test]
    fn test_blank_values_are_dropped() {
        let mut criteria = SearchCriteria::new();
        criteria.add_filter("Title", "");
        criteria.add_filter("year", " \t ");
        assert!(!criteria.has_filters());
        assert_eq!(criteria.to_string(), "No filters");
    }

    #[test]
    fn test_last_write_wins() {
        let mut criteria = SearchCriteria::new();
        criteria.add_filter("Title", "dune");
        criteria.add_filter("Title", "messiah");
        assert_eq!(criteria.len(), 1);
        assert_eq!(criteria.get("Title"), Some("messiah"));
    }

    #[test]
    fn test_blank_value_does_not_clear_existing_filter() {
        let mut criteria = SearchCriteria::new().with_filter("Title", "dune");
        criteria.add_filter("Title", " ");
        assert_eq!(criteria.get("Title"), Some("dune"));
    }

    #[test]
    fn test_display_joins_pairs() {
        let criteria = SearchCriteria::new()
            .with_filter("Title", "dune")
            .with_filter("year", "19");
        assert_eq!(criteria.to_string(), "Title=dune, year=19");
    }

    #[test]
    fn test_matches_all_filters() {
        let criteria = SearchCriteria::new()
            .with_filter("Title", "MESSIAH")
            .with_filter("year", "196");
        assert!(criteria.matches(lookup_title));

        let criteria = criteria.with_filter("year", "1970");
        assert!(!criteria.matches(lookup_title));
    }

    #[test]
    fn test_missing_field_rejects() {
        let criteria = SearchCriteria::new().with_filter("Publisher", "x");
        assert!(!criteria.matches(lookup_title));
    }

    #[test]
    fn test_empty_criteria_accept_everything() {
        assert!(SearchCriteria::new().matches(|_| None));
        assert!(accepts(None, |_| None));
    }

    #[test]
    fn test_from_iterator_normalizes() {
        let criteria: SearchCriteria = [("Title", "dune"), ("year", "")].into_iter().collect();
        assert_eq!(criteria.len(), 1);
    }
}
