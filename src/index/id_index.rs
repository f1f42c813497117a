use rustc_hash::FxHashMap;

use super::{KeyLookup, Table};
use crate::error::PropertyError;
use crate::objects::Id;

/// Entities by their identifier
///
/// Identifiers are unique: inserting an entity whose identifier is already
/// present is refused and the first entity is kept.
#[derive(Debug, Clone)]
pub struct IdIndex<T> {
    entities: FxHashMap<String, T>,
}

impl<T> Default for IdIndex<T> {
    fn default() -> Self {
        IdIndex {
            entities: FxHashMap::default(),
        }
    }
}

impl<T: Id> IdIndex<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds the index, failing on the first duplicated identifier
    pub fn from_entities<I: IntoIterator<Item = T>>(entities: I) -> Result<Self, PropertyError> {
        let mut index = Self::new();
        for e in entities {
            index.insert(e)?;
        }
        Ok(index)
    }

    /// Fails if an entity with the same identifier is already indexed
    pub fn check(&self, entity: &T) -> Result<(), PropertyError> {
        if self.entities.contains_key(entity.id()) {
            return Err(PropertyError::DuplicateKey {
                field: T::ID_FIELD.to_owned(),
                value: entity.id().to_owned(),
            });
        }
        Ok(())
    }

    pub fn insert(&mut self, entity: T) -> Result<(), PropertyError> {
        self.check(&entity)?;
        self.entities.insert(entity.id().to_owned(), entity);
        Ok(())
    }

    pub fn get(&self, id: &str) -> Option<&T> {
        self.entities.get(id)
    }

    pub fn contains_key(&self, id: &str) -> bool {
        self.entities.contains_key(id)
    }

    /// The index holds an entity with the same identifier
    pub fn contains(&self, entity: &T) -> bool {
        self.contains_key(entity.id())
    }

    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.entities.values()
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.entities.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }
}

impl<T: Id> Table<T> for IdIndex<T> {
    fn check(&self, entity: &T) -> Result<(), PropertyError> {
        IdIndex::check(self, entity)
    }

    fn insert(&mut self, entity: T) -> Result<(), PropertyError> {
        IdIndex::insert(self, entity)
    }
}

impl<T: Id> KeyLookup for IdIndex<T> {
    fn contains_key(&self, key: &str) -> bool {
        self.entities.contains_key(key)
    }
}

impl<'a, T> IntoIterator for &'a IdIndex<T> {
    type Item = &'a T;
    type IntoIter = std::collections::hash_map::Values<'a, String, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.entities.values()
    }
}
