//! The merged key-value form store.
//!
//! [`FormValues`] holds query, body and path parameters for one request.
//! Keys keep their first-insertion order and may carry several values.

use indexmap::IndexMap;

/// Ordered multi-valued form store.
///
/// Presence of a key is distinct from the emptiness of its value:
/// `name=` yields a present key whose value is `""`.
///
/// # Example
///
/// ```
/// use vertex_core::FormValues;
///
/// let mut form = FormValues::parse_urlencoded("name=&tag=a&tag=b");
/// assert!(form.has("name"));
/// assert_eq!(form.value("name"), "");
/// assert_eq!(form.get_all("tag"), ["a", "b"]);
///
/// form.set("id", "42");
/// assert_eq!(form.get("id"), Some("42"));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormValues {
    values: IndexMap<String, Vec<String>>,
}

impl FormValues {
    /// Creates an empty form store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses an `application/x-www-form-urlencoded` string.
    ///
    /// Malformed input yields whatever pairs could be decoded; undecodable
    /// input yields an empty store and a debug log entry.
    #[must_use]
    pub fn parse_urlencoded(input: &str) -> Self {
        let mut form = Self::new();
        form.extend_urlencoded(input);
        form
    }

    /// Appends all pairs decoded from an urlencoded string.
    pub fn extend_urlencoded(&mut self, input: &str) {
        if input.is_empty() {
            return;
        }
        match serde_urlencoded::from_str::<Vec<(String, String)>>(input) {
            Ok(pairs) => {
                for (key, value) in pairs {
                    self.append(key, value);
                }
            }
            Err(e) => {
                tracing::debug!(error = %e, "could not decode form data");
            }
        }
    }

    /// Returns `true` if the key is present, regardless of its value.
    #[must_use]
    pub fn has(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    /// Returns the first value for a key.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.values
            .get(key)
            .and_then(|values| values.first())
            .map(String::as_str)
    }

    /// Returns the first value for a key, or `""` when absent.
    #[must_use]
    pub fn value(&self, key: &str) -> &str {
        self.get(key).unwrap_or("")
    }

    /// Returns all values for a key.
    #[must_use]
    pub fn get_all(&self, key: &str) -> &[String] {
        self.values.get(key).map_or(&[], Vec::as_slice)
    }

    /// Replaces all values for a key with a single value.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.values.insert(key.into(), vec![value.into()]);
    }

    /// Adds a value to a key.
    pub fn append(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.values.entry(key.into()).or_default().push(value.into());
    }

    /// Removes a key and returns its values.
    pub fn remove(&mut self, key: &str) -> Option<Vec<String>> {
        self.values.shift_remove(key)
    }

    /// Returns the number of distinct keys.
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Returns `true` if there are no keys.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Iterates over keys and their values in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.values.iter().map(|(k, v)| (k.as_str(), v.as_slice()))
    }

    /// Encodes the store as an urlencoded string with keys sorted.
    ///
    /// The output is stable for equal stores, which makes it usable as a
    /// cache key.
    #[must_use]
    pub fn encode(&self) -> String {
        let mut keys: Vec<&String> = self.values.keys().collect();
        keys.sort();

        let pairs: Vec<(&str, &str)> = keys
            .into_iter()
            .flat_map(|k| {
                self.values[k.as_str()]
                    .iter()
                    .map(move |v| (k.as_str(), v.as_str()))
            })
            .collect();

        serde_urlencoded::to_string(pairs).unwrap_or_default()
    }
}

impl<K, V> FromIterator<(K, V)> for FormValues
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        let mut form = Self::new();
        for (k, v) in iter {
            form.append(k, v);
        }
        form
    }
}
