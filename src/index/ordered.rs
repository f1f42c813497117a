use std::collections::BTreeMap;
use std::ops::Bound::{Excluded, Unbounded};

use rustc_hash::FxHashMap;

use super::{KeyLookup, Table};
use crate::error::PropertyError;
use crate::objects::OrderedEntity;

/// Entities grouped by identifier and ordered by sequence number within a group
///
/// Used for the stop times of a trip and the points of a shape. Sequence
/// numbers need not be consecutive, and [OrderedIndex::floor] gives the
/// closest entity at or before any sequence number.
#[derive(Debug, Clone)]
pub struct OrderedIndex<T> {
    entities: FxHashMap<String, BTreeMap<u32, T>>,
    len: usize,
}

impl<T> Default for OrderedIndex<T> {
    fn default() -> Self {
        OrderedIndex {
            entities: FxHashMap::default(),
            len: 0,
        }
    }
}

impl<T: OrderedEntity> OrderedIndex<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds the index, failing on the first duplicated sequence number
    pub fn from_entities<I: IntoIterator<Item = T>>(entities: I) -> Result<Self, PropertyError> {
        let mut index = Self::new();
        for e in entities {
            index.insert(e)?;
        }
        Ok(index)
    }

    /// Fails if the sequence number of `entity` is already taken for its identifier
    pub fn check(&self, entity: &T) -> Result<(), PropertyError> {
        let sequence = entity.sequence();
        if self.get(entity.first_key(), sequence).is_some() {
            let (id_field, sequence_field) = T::KEY_FIELDS;
            return Err(PropertyError::DuplicateKey {
                field: format!("{} and {}", id_field, sequence_field),
                value: format!("{}, {}", entity.first_key(), sequence),
            });
        }
        Ok(())
    }

    pub fn insert(&mut self, entity: T) -> Result<(), PropertyError> {
        self.check(&entity)?;
        self.entities
            .entry(entity.first_key().clone())
            .or_default()
            .insert(entity.sequence(), entity);
        self.len += 1;
        Ok(())
    }

    /// The entity with the greatest sequence number not above `sequence`
    ///
    /// `None` if `id` is unknown or all its sequence numbers are above `sequence`.
    pub fn floor(&self, id: &str, sequence: u32) -> Option<&T> {
        self.entities
            .get(id)?
            .range(..=sequence)
            .next_back()
            .map(|(_, e)| e)
    }

    /// The entity with the smallest sequence number not below `sequence`
    pub fn ceiling(&self, id: &str, sequence: u32) -> Option<&T> {
        self.entities
            .get(id)?
            .range(sequence..)
            .next()
            .map(|(_, e)| e)
    }

    /// The entity at exactly this sequence number
    pub fn get(&self, id: &str, sequence: u32) -> Option<&T> {
        self.entities.get(id)?.get(&sequence)
    }

    /// A sequence number strictly below `sequence` exists for `id`
    pub fn contains_lower(&self, id: &str, sequence: u32) -> bool {
        self.entities
            .get(id)
            .map_or(false, |g| g.range(..sequence).next().is_some())
    }

    /// A sequence number at or below `sequence` exists for `id`
    pub fn contains_floor(&self, id: &str, sequence: u32) -> bool {
        self.floor(id, sequence).is_some()
    }

    /// A sequence number at or above `sequence` exists for `id`
    pub fn contains_ceiling(&self, id: &str, sequence: u32) -> bool {
        self.ceiling(id, sequence).is_some()
    }

    /// A sequence number strictly above `sequence` exists for `id`
    pub fn contains_higher(&self, id: &str, sequence: u32) -> bool {
        self.entities.get(id).map_or(false, |g| {
            g.range((Excluded(sequence), Unbounded)).next().is_some()
        })
    }

    pub fn contains_id(&self, id: &str) -> bool {
        self.entities.contains_key(id)
    }

    /// The entities of `id`, by increasing sequence number
    pub fn sequence(&self, id: &str) -> impl Iterator<Item = &T> {
        self.entities
            .get(id)
            .into_iter()
            .flat_map(|g| g.values())
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.entities.keys().map(String::as_str)
    }

    /// Every entity, ordered within each identifier but not across them
    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.entities.values().flat_map(|g| g.values())
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

impl<T: OrderedEntity> Table<T> for OrderedIndex<T> {
    fn check(&self, entity: &T) -> Result<(), PropertyError> {
        OrderedIndex::check(self, entity)
    }

    fn insert(&mut self, entity: T) -> Result<(), PropertyError> {
        OrderedIndex::insert(self, entity)
    }
}

impl<T: OrderedEntity> KeyLookup for OrderedIndex<T> {
    fn contains_key(&self, key: &str) -> bool {
        self.contains_id(key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::objects::{Entity, StopTime};
    use crate::properties::Properties;
    use proptest::prelude::*;

    fn stop_time(trip: &str, sequence: u32) -> StopTime {
        let sequence = sequence.to_string();
        StopTime::from_properties(Properties::new([
            ("trip_id", trip),
            ("stop_sequence", sequence.as_str()),
            ("stop_id", "S"),
        ]))
        .unwrap()
    }

    fn trip_t() -> OrderedIndex<StopTime> {
        OrderedIndex::from_entities(vec![stop_time("T", 10), stop_time("T", 1), stop_time("T", 5)])
            .unwrap()
    }

    #[test]
    fn floor_lookup() {
        let index = trip_t();
        assert_eq!(index.floor("T", 7).map(|s| s.stop_sequence()), Some(5));
        assert!(index.floor("T", 0).is_none());
        assert_eq!(index.floor("T", 10).map(|s| s.stop_sequence()), Some(10));
        assert_eq!(index.floor("T", 1000).map(|s| s.stop_sequence()), Some(10));
        assert!(index.floor("U", 7).is_none());
        assert_eq!(index.get("T", 5).map(|s| s.stop_sequence()), Some(5));
        assert!(index.get("T", 7).is_none());
    }

    #[test]
    fn existence_predicates() {
        let index = trip_t();
        assert!(!index.contains_lower("T", 1));
        assert!(index.contains_lower("T", 2));
        assert!(index.contains_floor("T", 1));
        assert!(!index.contains_floor("T", 0));
        assert!(index.contains_ceiling("T", 10));
        assert!(!index.contains_ceiling("T", 11));
        assert!(index.contains_higher("T", 9));
        assert!(!index.contains_higher("T", 10));
        assert!(!index.contains_higher("U", 0));
        assert_eq!(index.ceiling("T", 6).map(|s| s.stop_sequence()), Some(10));
    }

    #[test]
    fn sequence_is_ordered() {
        let index = trip_t();
        let seq: Vec<_> = index.sequence("T").map(|s| s.stop_sequence()).collect();
        assert_eq!(seq, vec![1, 5, 10]);
        assert_eq!(index.sequence("U").count(), 0);
        assert_eq!(index.len(), 3);
        assert!(index.contains_id("T"));
    }

    #[test]
    fn duplicate_sequence_is_refused() {
        let mut index = trip_t();
        let err = index.insert(stop_time("T", 5)).unwrap_err();
        assert_eq!(err.field(), "trip_id and stop_sequence");
        assert_eq!(index.len(), 3);
    }

    proptest! {
        #[test]
        fn floor_matches_brute_force(
            sequences in proptest::collection::btree_set(0u32..200, 0..30),
            probe in 0u32..250,
        ) {
            let index = OrderedIndex::from_entities(
                sequences.iter().map(|s| stop_time("T", *s)),
            ).unwrap();
            let expected = sequences.iter().copied().filter(|s| *s <= probe).max();
            prop_assert_eq!(index.floor("T", probe).map(|s| s.stop_sequence()), expected);
            prop_assert_eq!(index.contains_floor("T", probe), expected.is_some());
            let higher = sequences.iter().any(|s| *s > probe);
            prop_assert_eq!(index.contains_higher("T", probe), higher);
        }
    }
}
