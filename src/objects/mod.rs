//! One type per table of a feed
//!
//! Every entity wraps the [Properties] of its row. Only the key fields are
//! extracted when the entity is built, the other fields are coerced when their
//! accessor is called. An accessor returns `None` (or the documented default)
//! when the field is absent or invalid.
//!
//! Relations between entities are kept as identifiers, resolved against the
//! indexes of the [crate::Feed].
use serde::ser::Serializer;
use serde::Serialize;

use crate::error::PropertyError;
use crate::parsing::FieldType;
use crate::properties::Properties;

mod agency;
mod calendar;
mod fares;
mod metadata;
mod route;
mod stop;
mod trip;

pub use agency::Agency;
pub use calendar::{Calendar, CalendarDate};
pub(crate) use calendar::WEEKDAYS;
pub use fares::{
    FareAttribute, FareLegRule, FareMedia, FareProduct, FareRule, FareTransferRule, Timeframe,
};
pub use metadata::{Attribution, FeedInfo, Translation};
pub use route::{Network, Route, RouteNetwork};
pub use stop::{Area, Level, Pathway, Stop, StopArea, Transfer};
pub use trip::{Frequency, ShapePoint, StopTime, Trip};

/// A row of a table, typed
pub trait Entity: Sized {
    /// Name of the table, without extension
    const TABLE: &'static str;

    /// Builds the entity, extracting its key fields
    ///
    /// Fails only when a key field is absent or cannot be parsed, since such a
    /// row cannot be indexed. The row is handed back with the error.
    fn try_from_properties(properties: Properties) -> Result<Self, UnparsedEntity>;

    fn from_properties(properties: Properties) -> Result<Self, PropertyError> {
        Self::try_from_properties(properties).map_err(|u| u.error)
    }

    /// All the non-empty fields of the row
    fn properties(&self) -> &Properties;

    /// Raw value of any field, including the ones without an accessor
    fn get(&self, key: &str) -> Option<&str> {
        self.properties().get(key)
    }
}

/// Entities identified by a single string
///
/// Those identifier are technical and should not be shown to travellers
pub trait Id: Entity {
    /// Field holding the identifier
    const ID_FIELD: &'static str;

    /// Identifier of the object
    fn id(&self) -> &str;
}

/// Entities identified by a pair of keys
pub trait TwoPartEntity: Entity {
    type First: Ord + Clone;
    type Second: Ord + Clone;

    /// Fields holding the two keys
    const KEY_FIELDS: (&'static str, &'static str);

    fn first_key(&self) -> &Self::First;
    fn second_key(&self) -> &Self::Second;
}

/// Entities ordered by a sequence number among those sharing an identifier
///
/// [StopTime] are ordered within their trip, [ShapePoint] within their shape.
pub trait OrderedEntity: TwoPartEntity<First = String, Second = u32> {
    fn sequence(&self) -> u32 {
        *self.second_key()
    }
}

/// A row that could not be turned into an entity, with the reason why
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UnparsedEntity {
    /// Table of the row
    pub table: &'static str,
    /// The fields of the row
    pub properties: Properties,
    /// What prevented the entity from being built
    #[serde(serialize_with = "serialize_error")]
    pub error: PropertyError,
}

impl UnparsedEntity {
    pub fn new<T: Entity>(properties: Properties, error: PropertyError) -> Self {
        UnparsedEntity {
            table: T::TABLE,
            properties,
            error,
        }
    }
}

fn serialize_error<S: Serializer>(error: &PropertyError, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_str(&error.to_string())
}

/// Outcome of building one row: the entity, or the row set aside with its error
#[derive(Debug, Clone)]
pub enum Parsed<T> {
    Entity(T),
    Unparsed(UnparsedEntity),
}

impl<T: Entity> Parsed<T> {
    /// Runs a factory on a row, keeping the row when it fails
    pub fn build<F>(properties: Properties, factory: F) -> Self
    where
        F: FnOnce(&Properties) -> Result<(), PropertyError>,
    {
        if let Err(error) = factory(&properties) {
            return Parsed::Unparsed(UnparsedEntity::new::<T>(properties, error));
        }
        match T::try_from_properties(properties) {
            Ok(entity) => Parsed::Entity(entity),
            Err(unparsed) => Parsed::Unparsed(unparsed),
        }
    }

    pub fn entity(self) -> Option<T> {
        match self {
            Parsed::Entity(e) => Some(e),
            Parsed::Unparsed(_) => None,
        }
    }
}

/// Extracts the keys of a row and builds the entity from them
pub(crate) fn with_keys<T, K, F, B>(properties: Properties, keys: F, build: B) -> Result<T, UnparsedEntity>
where
    T: Entity,
    F: FnOnce(&Properties) -> Result<K, PropertyError>,
    B: FnOnce(K, Properties) -> T,
{
    match keys(&properties) {
        Ok(k) => Ok(build(k, properties)),
        Err(error) => Err(UnparsedEntity::new::<T>(properties, error)),
    }
}

/// Reads a mandatory identifier
pub(crate) fn key(p: &Properties, field: &str) -> Result<String, PropertyError> {
    p.assert_exists(field).map(str::to_owned)
}

/// Reads a mandatory typed key
pub(crate) fn typed_key<T: FieldType>(p: &Properties, field: &str) -> Result<T, PropertyError> {
    p.assert_valid(field)
}
