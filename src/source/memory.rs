use std::collections::BTreeMap;
use std::io::{Cursor, Read};

use super::{candidates, RowSource};
use crate::error::Error;

/// Tables given as CSV text
///
/// ```
/// use transit_feed::source::{MemorySource, RowSource};
///
/// let source = MemorySource::new().with_table("stops.txt", "stop_id\nS1\n");
/// assert!(source.contains("stops"));
/// ```
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    tables: BTreeMap<String, String>,
}

impl MemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds or replaces a file
    ///
    /// Returns Self and can be chained
    pub fn with_table(mut self, name: &str, content: &str) -> Self {
        self.insert(name, content);
        self
    }

    pub fn insert(&mut self, name: &str, content: &str) {
        self.tables.insert(name.to_owned(), content.to_owned());
    }

    /// Removes a file, returning its content
    pub fn remove(&mut self, name: &str) -> Option<String> {
        self.tables.remove(name)
    }
}

impl<N: Into<String>, C: Into<String>> FromIterator<(N, C)> for MemorySource {
    fn from_iter<I: IntoIterator<Item = (N, C)>>(iter: I) -> Self {
        MemorySource {
            tables: iter.into_iter().map(|(n, c)| (n.into(), c.into())).collect(),
        }
    }
}

impl RowSource for MemorySource {
    fn resolve(&self, table: &str) -> Option<String> {
        candidates(table)
            .into_iter()
            .find(|name| self.tables.contains_key(name))
    }

    fn open(&self, file_name: &str) -> Result<Box<dyn Read>, Error> {
        let content = self
            .tables
            .get(file_name)
            .ok_or_else(|| Error::MissingFile(file_name.to_owned()))?;
        Ok(Box::new(Cursor::new(content.clone().into_bytes())))
    }

    fn files(&self) -> Vec<String> {
        self.tables.keys().cloned().collect()
    }
}
