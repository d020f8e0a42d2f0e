//! Ordered, multi-valued string map used for HTTP headers and query parameters.
//!
//! [`MultiValueMap`] keeps keys in first-insertion order with their original
//! casing, and each key maps to an ordered list of values. Key lookups are
//! ASCII case-insensitive or case-sensitive depending on how the map was
//! created.

/// A single key and its ordered values.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Entry {
    key: String,
    values: Vec<String>,
}

/// An insertion-ordered multimap of strings.
///
/// # Examples
///
/// ```
/// use solarnet_auth::MultiValueMap;
///
/// let mut headers = MultiValueMap::case_insensitive();
/// headers.add("Content-Type", "text/plain").add("X-Custom", "a").add("x-custom", "b");
///
/// assert_eq!(headers.first_value("content-type"), Some("text/plain"));
/// assert_eq!(headers.values("X-CUSTOM").unwrap(), ["a", "b"]);
/// assert_eq!(headers.keys().collect::<Vec<_>>(), ["Content-Type", "X-Custom"]);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MultiValueMap {
    case_insensitive: bool,
    entries: Vec<Entry>,
}

impl Default for MultiValueMap {
    fn default() -> Self {
        Self::case_insensitive()
    }
}

impl MultiValueMap {
    /// Create an empty map whose keys compare case-insensitively.
    #[must_use]
    pub fn case_insensitive() -> Self {
        Self {
            case_insensitive: true,
            entries: Vec::new(),
        }
    }

    /// Create an empty map whose keys compare exactly.
    #[must_use]
    pub fn case_sensitive() -> Self {
        Self {
            case_insensitive: false,
            entries: Vec::new(),
        }
    }

    /// Whether key comparison ignores case.
    #[must_use]
    pub fn is_case_insensitive(&self) -> bool {
        self.case_insensitive
    }

    /// Append `value` to the values of `key`.
    pub fn add(&mut self, key: impl Into<String>, value: impl Into<String>) -> &mut Self {
        let key = key.into();
        let value = value.into();
        match self.position(&key) {
            Some(idx) => self.entries[idx].values.push(value),
            None => self.entries.push(Entry {
                key,
                values: vec![value],
            }),
        }
        self
    }

    /// Append `value` to the values of `key`; does nothing when `value` is `None`.
    pub fn add_opt<V: Into<String>>(&mut self, key: impl Into<String>, value: Option<V>) -> &mut Self {
        if let Some(value) = value {
            self.add(key, value);
        }
        self
    }

    /// Replace all values of `key` with `value`.
    ///
    /// An existing key keeps its position and its original casing.
    pub fn put(&mut self, key: impl Into<String>, value: impl Into<String>) -> &mut Self {
        let key = key.into();
        let value = value.into();
        match self.position(&key) {
            Some(idx) => self.entries[idx].values = vec![value],
            None => self.entries.push(Entry {
                key,
                values: vec![value],
            }),
        }
        self
    }

    /// Replace all values of `key` with `value`; does nothing when `value` is `None`.
    pub fn put_opt<V: Into<String>>(&mut self, key: impl Into<String>, value: Option<V>) -> &mut Self {
        if let Some(value) = value {
            self.put(key, value);
        }
        self
    }

    /// All values of `key`, in insertion order.
    #[must_use]
    pub fn values(&self, key: &str) -> Option<&[String]> {
        self.position(key).map(|idx| self.entries[idx].values.as_slice())
    }

    /// The first value of `key`.
    #[must_use]
    pub fn first_value(&self, key: &str) -> Option<&str> {
        self.values(key)
            .and_then(|values| values.first())
            .map(String::as_str)
    }

    /// Whether the map holds any value for `key`.
    #[must_use]
    pub fn contains_key(&self, key: &str) -> bool {
        self.position(key).is_some()
    }

    /// Remove `key`, returning its values.
    pub fn remove(&mut self, key: &str) -> Option<Vec<String>> {
        self.position(key)
            .map(|idx| self.entries.remove(idx).values)
    }

    /// Keys in first-insertion order, with their original casing.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|e| e.key.as_str())
    }

    /// Key and value-list pairs in first-insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.entries
            .iter()
            .map(|e| (e.key.as_str(), e.values.as_slice()))
    }

    /// Number of distinct keys.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the map has no keys.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Remove all keys.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Append every value of `other` to this map.
    pub fn merge(&mut self, other: &Self) -> &mut Self {
        for (key, values) in other.iter() {
            for value in values {
                self.add(key, value.as_str());
            }
        }
        self
    }

    fn position(&self, key: &str) -> Option<usize> {
        self.entries.iter().position(|e| self.keys_match(&e.key, key))
    }

    fn keys_match(&self, a: &str, b: &str) -> bool {
        if self.case_insensitive {
            a.eq_ignore_ascii_case(b)
        } else {
            a == b
        }
    }
}

impl<K: Into<String>, V: Into<String>> Extend<(K, V)> for MultiValueMap {
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        for (key, value) in iter {
            self.add(key, value);
        }
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for MultiValueMap {
    /// Collect into a case-insensitive map.
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut map = Self::case_insensitive();
        map.extend(iter);
        map
    }
}
