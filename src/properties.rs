use rustc_hash::FxHashMap;
use serde::Serialize;

/// The fields of one row, keyed by their column name
///
/// Empty values are dropped when the view is built, so a field is either
/// absent or carries a non-empty string. When the same column appears twice
/// the last value wins.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Properties(FxHashMap<String, String>);

impl Properties {
    /// Builds the view of a row from its (column, value) pairs
    pub fn new<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let mut map = FxHashMap::default();
        for (k, v) in pairs {
            let (k, v) = (k.into(), v.into());
            if v.is_empty() {
                // a later empty value still hides an earlier one
                map.remove(&k);
            } else {
                map.insert(k, v);
            }
        }
        Properties(map)
    }

    /// Same as [Properties::new], but `key` is set to `default` if the row does not give it
    ///
    /// Used to inherit the feed's agency on rows that omit `agency_id`.
    pub fn with_default<I, K, V>(pairs: I, key: &str, default: Option<&str>) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let mut properties = Self::new(pairs);
        match default {
            Some(value) if !value.is_empty() && !properties.contains_key(key) => {
                properties.0.insert(key.to_owned(), value.to_owned());
            }
            _ => {}
        }
        properties
    }

    /// Raw value of a field, `None` if it is absent or was empty
    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    /// Number of non-empty fields
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Properties {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Properties::new(iter)
    }
}
