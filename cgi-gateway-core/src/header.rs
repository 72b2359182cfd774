//! Case-insensitive header keys and the response header table.

use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::collections::btree_map::Entry;
use std::fmt;

/// A header name compared without regard to ASCII case.
///
/// `Content-Type` and `content-type` are the same key. Ordering compares the
/// lower-cased names, so a table keyed by `HeaderKey` iterates in
/// case-insensitive alphabetical order. The original spelling is kept for
/// display.
#[derive(Clone, Debug)]
pub struct HeaderKey(String);

impl HeaderKey {
    /// Create a key from a header name.
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// The name as it was spelled when the key was created.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    fn folded(&self) -> impl Iterator<Item = u8> + '_ {
        self.0.bytes().map(|b| b.to_ascii_lowercase())
    }
}

impl PartialEq for HeaderKey {
    fn eq(&self, other: &Self) -> bool {
        self.0.eq_ignore_ascii_case(&other.0)
    }
}

impl Eq for HeaderKey {}

impl PartialOrd for HeaderKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for HeaderKey {
    fn cmp(&self, other: &Self) -> Ordering {
        self.folded().cmp(other.folded())
    }
}

impl fmt::Display for HeaderKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for HeaderKey {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl From<String> for HeaderKey {
    fn from(name: String) -> Self {
        Self(name)
    }
}

/// Response headers accumulated while a handler runs.
///
/// One value per case-insensitive name. The spelling stored for a name is the
/// one used the first time that name entered the table: [`set`](Self::set)
/// replaces the value but keeps the stored spelling, and
/// [`insert_default`](Self::insert_default) only fills names that are absent.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Headers {
    entries: BTreeMap<HeaderKey, String>,
}

impl Headers {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a header, replacing any existing value for the same name.
    pub fn set(&mut self, name: impl Into<HeaderKey>, value: impl Into<String>) {
        // BTreeMap::insert leaves an existing key untouched, so the stored
        // spelling survives.
        self.entries.insert(name.into(), value.into());
    }

    /// Insert a header only if no value exists for the name.
    ///
    /// Returns `true` if the value was inserted.
    pub fn insert_default(&mut self, name: impl Into<HeaderKey>, value: impl Into<String>) -> bool {
        match self.entries.entry(name.into()) {
            Entry::Occupied(_) => false,
            Entry::Vacant(slot) => {
                slot.insert(value.into());
                true
            }
        }
    }

    /// Get the value for a name (case-insensitive).
    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries.get(&HeaderKey::new(name)).map(String::as_str)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(&HeaderKey::new(name))
    }

    /// Remove a header, returning its value.
    pub fn remove(&mut self, name: &str) -> Option<String> {
        self.entries.remove(&HeaderKey::new(name))
    }

    /// Iterate over `(name, value)` in case-insensitive name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<K, V> FromIterator<(K, V)> for Headers
where
    K: Into<HeaderKey>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut headers = Headers::new();
        for (name, value) in iter {
            headers.set(name, value);
        }
        headers
    }
}
