//! Ordered key/value storage for headers and request parameters.
//!
//! One container type serves both uses: header maps fold key case on
//! comparison, parameter maps match keys exactly. Entries keep insertion
//! order; inserting an existing key overwrites its value in place (last
//! write wins).

use crate::percent::percent_decode;

/// An insertion-ordered key/value map.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldMap {
    entries: Vec<(String, String)>,
    fold_keys: bool,
}

impl FieldMap {
    /// Create a map with case-insensitive key comparison, for headers.
    #[must_use]
    pub fn headers() -> Self {
        Self {
            entries: Vec::new(),
            fold_keys: true,
        }
    }

    /// Create a map with exact key comparison, for query/form parameters.
    #[must_use]
    pub fn params() -> Self {
        Self {
            entries: Vec::new(),
            fold_keys: false,
        }
    }

    /// Insert a key/value pair, overwriting an existing key in place.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();
        if let Some(entry) = self.entry_mut(&key) {
            entry.1 = value;
        } else {
            self.entries.push((key, value));
        }
    }

    /// Look up a value by key.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| self.keys_match(k, key))
            .map(|(_, v)| v.as_str())
    }

    /// Check whether a key is present.
    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    /// Number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when the map holds no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    fn keys_match(&self, stored: &str, probe: &str) -> bool {
        if self.fold_keys {
            stored.eq_ignore_ascii_case(probe)
        } else {
            stored == probe
        }
    }

    fn entry_mut(&mut self, key: &str) -> Option<&mut (String, String)> {
        let fold = self.fold_keys;
        self.entries.iter_mut().find(|(k, _)| {
            if fold {
                k.eq_ignore_ascii_case(key)
            } else {
                k == key
            }
        })
    }
}

/// Parse `&`-separated `key=value` parameters into an exact-key map.
///
/// Used for query strings and `application/x-www-form-urlencoded` bodies.
/// In both keys and values, `+` becomes a space before percent-decoding.
/// Segments without `=` are ignored.
///
/// # Example
///
/// ```
/// use shelf_http::parse_params;
///
/// let params = parse_params("new_name=annual+report&dest_dir=%2Farchive");
/// assert_eq!(params.get("new_name"), Some("annual report"));
/// assert_eq!(params.get("dest_dir"), Some("/archive"));
/// ```
#[must_use]
pub fn parse_params(raw: &str) -> FieldMap {
    let mut params = FieldMap::params();
    for pair in raw.split('&') {
        if let Some((key, value)) = pair.split_once('=') {
            params.insert(decode_component(key), decode_component(value));
        }
    }
    params
}

fn decode_component(s: &str) -> String {
    percent_decode(&s.replace('+', " ")).into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insertion_order_preserved() {
        let mut map = FieldMap::params();
        map.insert("b", "2");
        map.insert("a", "1");
        map.insert("c", "3");
        let keys: Vec<_> = map.iter().map(|(k, _)| k).collect();
        assert_eq!(keys, vec!["b", "a", "c"]);
    }

    #[test]
    fn last_write_wins_in_place() {
        let mut map = FieldMap::params();
        map.insert("a", "1");
        map.insert("b", "2");
        map.insert("a", "3");
        assert_eq!(map.get("a"), Some("3"));
        assert_eq!(map.len(), 2);
        let keys: Vec<_> = map.iter().map(|(k, _)| k).collect();
        assert_eq!(keys, vec!["a", "b"]);
    }

    #[test]
    fn header_keys_fold_case() {
        let mut headers = FieldMap::headers();
        headers.insert("Content-Length", "42");
        assert_eq!(headers.get("content-length"), Some("42"));
        assert_eq!(headers.get("CONTENT-LENGTH"), Some("42"));

        headers.insert("content-length", "7");
        assert_eq!(headers.get("Content-Length"), Some("7"));
        assert_eq!(headers.len(), 1);
    }

    #[test]
    fn param_keys_are_exact() {
        let mut params = FieldMap::params();
        params.insert("Name", "x");
        assert_eq!(params.get("name"), None);
        assert_eq!(params.get("Name"), Some("x"));
    }

    #[test]
    fn empty_map() {
        let map = FieldMap::headers();
        assert!(map.is_empty());
        assert_eq!(map.len(), 0);
        assert_eq!(map.get("anything"), None);
        assert!(!map.contains("anything"));
    }

    // ========================================================================
    // Parameter Parsing
    // ========================================================================

    #[test]
    fn parse_basic_pairs() {
        let params = parse_params("a=1&b=2");
        assert_eq!(params.get("a"), Some("1"));
        assert_eq!(params.get("b"), Some("2"));
        assert_eq!(params.len(), 2);
    }

    #[test]
    fn parse_ignores_pairs_without_equals() {
        let params = parse_params("flag&a=1&");
        assert_eq!(params.len(), 1);
        assert_eq!(params.get("a"), Some("1"));
        assert!(!params.contains("flag"));
    }

    #[test]
    fn parse_plus_as_space_in_key_and_value() {
        let params = parse_params("new+name=my+file");
        assert_eq!(params.get("new name"), Some("my file"));
    }

    #[test]
    fn parse_percent_decodes_value() {
        let params = parse_params("dest_dir=%2Farchive");
        assert_eq!(params.get("dest_dir"), Some("/archive"));
    }

    #[test]
    fn parse_keeps_empty_value() {
        let params = parse_params("name=");
        assert_eq!(params.get("name"), Some(""));
    }

    #[test]
    fn parse_value_with_equals() {
        let params = parse_params("expr=a%3Db=c");
        // Only the first `=` splits; the rest stays in the value.
        assert_eq!(params.get("expr"), Some("a=b=c"));
    }
}
