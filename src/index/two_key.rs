use std::borrow::Borrow;
use std::collections::BTreeMap;

use super::{KeyLookup, Table};
use crate::error::PropertyError;
use crate::objects::TwoPartEntity;

/// Entities by a pair of keys
///
/// The pair is unique. Entities are grouped by their first key, so listing
/// the entities of a first key is a lookup while listing those of a second
/// key scans the index.
#[derive(Debug, Clone)]
pub struct TwoKeyIndex<T: TwoPartEntity> {
    entities: BTreeMap<T::First, BTreeMap<T::Second, T>>,
    len: usize,
}

impl<T: TwoPartEntity> Default for TwoKeyIndex<T> {
    fn default() -> Self {
        TwoKeyIndex {
            entities: BTreeMap::new(),
            len: 0,
        }
    }
}

impl<T: TwoPartEntity> TwoKeyIndex<T>
where
    T::First: std::fmt::Display,
    T::Second: std::fmt::Display,
{
    /// Fails if the pair of keys of `entity` is already indexed
    pub fn check(&self, entity: &T) -> Result<(), PropertyError> {
        if self.contains(entity.first_key(), entity.second_key()) {
            let (first, second) = T::KEY_FIELDS;
            return Err(PropertyError::DuplicateKey {
                field: format!("{} and {}", first, second),
                value: format!("{}, {}", entity.first_key(), entity.second_key()),
            });
        }
        Ok(())
    }

    /// Adds an entity, refusing a pair of keys already present
    pub fn insert(&mut self, entity: T) -> Result<(), PropertyError> {
        self.check(&entity)?;
        self.entities
            .entry(entity.first_key().clone())
            .or_default()
            .insert(entity.second_key().clone(), entity);
        self.len += 1;
        Ok(())
    }

    /// Builds the index, failing on the first duplicated pair
    pub fn from_entities<I: IntoIterator<Item = T>>(entities: I) -> Result<Self, PropertyError> {
        let mut index = Self::default();
        for e in entities {
            index.insert(e)?;
        }
        Ok(index)
    }
}

impl<T: TwoPartEntity> TwoKeyIndex<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get<Q>(&self, first: &Q, second: &T::Second) -> Option<&T>
    where
        T::First: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.entities.get(first).and_then(|g| g.get(second))
    }

    pub fn contains<Q>(&self, first: &Q, second: &T::Second) -> bool
    where
        T::First: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.get(first, second).is_some()
    }

    pub fn contains_first_key<Q>(&self, first: &Q) -> bool
    where
        T::First: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.entities.contains_key(first)
    }

    /// All the entities whose first key is `first`, ordered by their second key
    pub fn with_first_key<Q>(&self, first: &Q) -> Vec<&T>
    where
        T::First: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.entities
            .get(first)
            .map(|g| g.values().collect())
            .unwrap_or_default()
    }

    /// All the entities whose second key is `second`, ordered by their first key
    pub fn with_second_key(&self, second: &T::Second) -> Vec<&T> {
        self.entities
            .values()
            .filter_map(|g| g.get(second))
            .collect()
    }

    /// The distinct first keys, in order
    pub fn first_keys(&self) -> impl Iterator<Item = &T::First> {
        self.entities.keys()
    }

    /// The distinct second keys, in order
    pub fn second_keys(&self) -> Vec<&T::Second> {
        let mut keys: Vec<&T::Second> = self.entities.values().flat_map(|g| g.keys()).collect();
        keys.sort_unstable();
        keys.dedup();
        keys
    }

    /// Every entity, ordered by first then second key
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

impl<T: TwoPartEntity> Table<T> for TwoKeyIndex<T>
where
    T::First: std::fmt::Display,
    T::Second: std::fmt::Display,
{
    fn check(&self, entity: &T) -> Result<(), PropertyError> {
        TwoKeyIndex::check(self, entity)
    }

    fn insert(&mut self, entity: T) -> Result<(), PropertyError> {
        TwoKeyIndex::insert(self, entity)
    }
}

/// Foreign keys referencing the first key only, e.g. a service id in `calendar_dates`
impl<T: TwoPartEntity<First = String>> KeyLookup for TwoKeyIndex<T> {
    fn contains_key(&self, key: &str) -> bool {
        self.entities.contains_key(key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::objects::{CalendarDate, Entity, StopArea};
    use crate::properties::Properties;
    use chrono::NaiveDate;
    use std::collections::HashSet;

    fn stop_area(area: &str, stop: &str) -> StopArea {
        StopArea::from_properties(Properties::new([("area_id", area), ("stop_id", stop)])).unwrap()
    }

    fn index() -> TwoKeyIndex<StopArea> {
        TwoKeyIndex::from_entities(vec![
            stop_area("north", "S1"),
            stop_area("north", "S2"),
            stop_area("south", "S2"),
            stop_area("south", "S3"),
        ])
        .unwrap()
    }

    #[test]
    fn exact_lookup() {
        let index = index();
        assert_eq!(index.len(), 4);
        assert!(index.contains("north", &"S2".to_owned()));
        assert!(!index.contains("north", &"S3".to_owned()));
        assert_eq!(
            index.get("south", &"S3".to_owned()).map(|s| s.stop_id()),
            Some("S3")
        );
    }

    #[test]
    fn projections() {
        let index = index();
        let north: Vec<_> = index.with_first_key("north").iter().map(|s| s.stop_id()).collect();
        assert_eq!(north, vec!["S1", "S2"]);
        let s2: Vec<_> = index
            .with_second_key(&"S2".to_owned())
            .iter()
            .map(|s| s.area_id())
            .collect();
        assert_eq!(s2, vec!["north", "south"]);
        assert!(index.with_first_key("east").is_empty());
        assert_eq!(index.first_keys().count(), 2);
        assert_eq!(index.second_keys(), vec!["S1", "S2", "S3"]);
    }

    #[test]
    fn first_keys_partition_the_index() {
        let index = index();
        let mut seen = HashSet::new();
        let mut total = 0;
        for k in index.first_keys() {
            for e in index.with_first_key(k.as_str()) {
                assert_eq!(e.area_id(), k);
                assert!(seen.insert((e.area_id().to_owned(), e.stop_id().to_owned())));
                total += 1;
            }
        }
        assert_eq!(total, index.len());
    }

    #[test]
    fn duplicate_pair_is_refused() {
        let mut index = index();
        let err = index.insert(stop_area("north", "S1")).unwrap_err();
        assert_eq!(err.field(), "area_id and stop_id");
        assert_eq!(index.len(), 4);
    }

    #[test]
    fn typed_second_key() {
        let cd = |date: &str| {
            CalendarDate::from_properties(Properties::new([
                ("service_id", "S"),
                ("date", date),
                ("exception_type", "1"),
            ]))
            .unwrap()
        };
        let index = TwoKeyIndex::from_entities(vec![cd("20240102"), cd("20240101")]).unwrap();
        let dates: Vec<_> = index.with_first_key("S").iter().map(|c| c.date()).collect();
        assert_eq!(
            dates,
            vec![
                NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
                NaiveDate::from_ymd_opt(2024, 1, 2).unwrap()
            ]
        );
        assert!(KeyLookup::contains_key(&index, "S"));
    }
}
