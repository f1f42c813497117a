/*! A typed, indexed and read-only model of a [GTFS](https://gtfs.org/) schedule feed.

A feed is a collection of CSV files (often bundled as a zip file).
Each file is a table of one type of object (stops, routes, etc.) that reference each other through unique identifiers.

To get started, see [Feed] and [FeedReader].

## Design decisions

### Rows are kept as read

Every entity keeps all the non-empty fields of its row in [Properties]. Only the keys are parsed when the row is read,
the accessors parse the other fields when they are called and return `None` (or the default value of the reference) when the field is absent or invalid.
Fields without accessor can still be read with [objects::Entity::get].

### Two validation tiers

By default only the keys of a row are required. With [FeedReader::strict], every row is checked against the rules of its table,
including the references to the tables read before it.
A row that fails is put aside in [Feed::quarantine] with the reason why, or stops the reading if the quarantine is disabled.

### Indexes

Entities are stored in an [index::IdIndex] when they have an identifier, a [index::TwoKeyIndex] when they are identified by a pair of keys,
and an [index::OrderedIndex] when they are ordered within a group (the stop times of a trip, the points of a shape).
Identifiers are unique: a second row with the same key is refused.

### Renaming

We kept some names even if they can be confusing (a [objects::Calendar] will be referenced by `service_id`), but we strip the object type (`route_short_name` is [objects::Route::short_name]).
*/

#[macro_use]
extern crate derivative;

pub mod calendar;
mod enums;
pub mod error;
mod feed;
pub mod index;
pub mod objects;
mod parsing;
mod properties;
mod reader;
pub mod source;
mod time;
pub mod validation;

#[cfg(test)]
mod tests;

pub use calendar::CalendarIndex;
pub use enums::*;
pub use error::Error;
pub use feed::Feed;
pub use parsing::FieldType;
pub use properties::Properties;
pub use reader::FeedReader;
pub use time::ServiceTime;
