//! Indexes holding the entities of a feed, built once while loading
use std::collections::HashSet;
use std::hash::BuildHasher;

mod id_index;
mod ordered;
mod two_key;

pub use id_index::IdIndex;
pub use ordered::OrderedIndex;
pub use two_key::TwoKeyIndex;

use crate::error::PropertyError;

/// A collection the reader fills one entity at a time
pub trait Table<T>: Default {
    /// Would `entity` be refused by [Table::insert]
    fn check(&self, _entity: &T) -> Result<(), PropertyError> {
        Ok(())
    }

    fn insert(&mut self, entity: T) -> Result<(), PropertyError>;
}

/// Tables without a key keep every row
impl<T> Table<T> for Vec<T> {
    fn insert(&mut self, entity: T) -> Result<(), PropertyError> {
        self.push(entity);
        Ok(())
    }
}

/// Anything a foreign key can be checked against
pub trait KeyLookup {
    fn contains_key(&self, key: &str) -> bool;
}

impl<S: BuildHasher> KeyLookup for HashSet<String, S> {
    fn contains_key(&self, key: &str) -> bool {
        self.contains(key)
    }
}

impl KeyLookup for std::collections::BTreeSet<String> {
    fn contains_key(&self, key: &str) -> bool {
        self.contains(key)
    }
}
