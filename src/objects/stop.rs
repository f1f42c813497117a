use std::fmt;

use chrono_tz::Tz;
use serde::Serialize;

use super::{key, with_keys, Entity, Id, TwoPartEntity, UnparsedEntity};
use crate::enums::{Availability, LocationType, PathwayMode, TransferType};
use crate::properties::Properties;

/// A physical stop, station or area. See <https://gtfs.org/reference/static/#stopstxt>
#[derive(Debug, Clone, Serialize)]
pub struct Stop {
    #[serde(skip)]
    id: String,
    #[serde(flatten)]
    properties: Properties,
}

impl Entity for Stop {
    const TABLE: &'static str = "stops";

    fn try_from_properties(properties: Properties) -> Result<Self, UnparsedEntity> {
        with_keys(
            properties,
            |p| key(p, "stop_id"),
            |id, properties| Stop { id, properties },
        )
    }

    fn properties(&self) -> &Properties {
        &self.properties
    }
}

impl Id for Stop {
    const ID_FIELD: &'static str = "stop_id";

    fn id(&self) -> &str {
        &self.id
    }
}

impl Stop {
    /// Short text or a number that identifies the location for riders
    pub fn code(&self) -> Option<&str> {
        self.get("stop_code")
    }

    /// Name of the location. Use a name that people will understand in the local and tourist vernacular
    pub fn name(&self) -> Option<&str> {
        self.get("stop_name")
    }

    pub fn tts_name(&self) -> Option<&str> {
        self.get("tts_stop_name")
    }

    pub fn description(&self) -> Option<&str> {
        self.get("stop_desc")
    }

    pub fn latitude(&self) -> Option<f64> {
        self.properties.parse("stop_lat")
    }

    pub fn longitude(&self) -> Option<f64> {
        self.properties.parse("stop_lon")
    }

    /// Identifies the fare zone for a stop
    pub fn zone_id(&self) -> Option<&str> {
        self.get("zone_id")
    }

    pub fn url(&self) -> Option<&str> {
        self.get("stop_url")
    }

    /// Type of the location, [LocationType::StopPoint] when empty
    pub fn location_type(&self) -> LocationType {
        self.properties
            .parse_or("location_type", LocationType::default())
    }

    /// Defines hierarchy between the different locations
    pub fn parent_station(&self) -> Option<&str> {
        self.get("parent_station")
    }

    /// Timezone of the location, when it differs from the agency's
    pub fn timezone(&self) -> Option<Tz> {
        self.properties.parse("stop_timezone")
    }

    /// Indicates whether wheelchair boardings are possible from the location
    pub fn wheelchair_boarding(&self) -> Availability {
        self.properties
            .parse_or("wheelchair_boarding", Availability::default())
    }

    /// Level of the location. The same level can be used by multiple unlinked stations
    pub fn level_id(&self) -> Option<&str> {
        self.get("level_id")
    }

    /// Platform identifier for a platform stop (a stop belonging to a station)
    pub fn platform_code(&self) -> Option<&str> {
        self.get("platform_code")
    }
}

impl fmt::Display for Stop {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.name().unwrap_or(&self.id))
    }
}

/// A level within a station. See `levels.txt`
#[derive(Debug, Clone, Serialize)]
pub struct Level {
    #[serde(skip)]
    id: String,
    #[serde(flatten)]
    properties: Properties,
}

impl Entity for Level {
    const TABLE: &'static str = "levels";

    fn try_from_properties(properties: Properties) -> Result<Self, UnparsedEntity> {
        with_keys(
            properties,
            |p| key(p, "level_id"),
            |id, properties| Level { id, properties },
        )
    }

    fn properties(&self) -> &Properties {
        &self.properties
    }
}

impl Id for Level {
    const ID_FIELD: &'static str = "level_id";

    fn id(&self) -> &str {
        &self.id
    }
}

impl Level {
    /// Position of the level relative to the ground, `0` being the street level
    pub fn index(&self) -> Option<f64> {
        self.properties.parse("level_index")
    }

    pub fn name(&self) -> Option<&str> {
        self.get("level_name")
    }
}

/// Pathway going from a stop to another, inside a station. See `pathways.txt`
#[derive(Debug, Clone, Serialize)]
pub struct Pathway {
    #[serde(skip)]
    id: String,
    #[serde(flatten)]
    properties: Properties,
}

impl Entity for Pathway {
    const TABLE: &'static str = "pathways";

    fn try_from_properties(properties: Properties) -> Result<Self, UnparsedEntity> {
        with_keys(
            properties,
            |p| key(p, "pathway_id"),
            |id, properties| Pathway { id, properties },
        )
    }

    fn properties(&self) -> &Properties {
        &self.properties
    }
}

impl Id for Pathway {
    const ID_FIELD: &'static str = "pathway_id";

    fn id(&self) -> &str {
        &self.id
    }
}

impl Pathway {
    /// Location at which the pathway begins
    pub fn from_stop_id(&self) -> Option<&str> {
        self.get("from_stop_id")
    }

    /// Location at which the pathway ends
    pub fn to_stop_id(&self) -> Option<&str> {
        self.get("to_stop_id")
    }

    pub fn mode(&self) -> Option<PathwayMode> {
        self.properties.parse("pathway_mode")
    }

    /// The pathway can be used from `to_stop_id` to `from_stop_id` too
    pub fn is_bidirectional(&self) -> bool {
        self.properties.flag("is_bidirectional")
    }

    /// Horizontal length in meters
    pub fn length(&self) -> Option<f64> {
        self.properties.parse("length")
    }

    /// Average time needed to walk through the pathway
    pub fn traversal_time(&self) -> Option<chrono::Duration> {
        self.properties.parse("traversal_time")
    }

    /// Number of stairs, negative when going down
    pub fn stair_count(&self) -> Option<i64> {
        self.properties.parse("stair_count")
    }

    pub fn max_slope(&self) -> Option<f64> {
        self.properties.parse("max_slope")
    }

    /// Minimum width of the pathway in meters
    pub fn min_width(&self) -> Option<f64> {
        self.properties.parse("min_width")
    }

    pub fn signposted_as(&self) -> Option<&str> {
        self.get("signposted_as")
    }

    pub fn reversed_signposted_as(&self) -> Option<&str> {
        self.get("reversed_signposted_as")
    }
}

/// A group of stops, used by fare rules. See `areas.txt`
#[derive(Debug, Clone, Serialize)]
pub struct Area {
    #[serde(skip)]
    id: String,
    #[serde(flatten)]
    properties: Properties,
}

impl Entity for Area {
    const TABLE: &'static str = "areas";

    fn try_from_properties(properties: Properties) -> Result<Self, UnparsedEntity> {
        with_keys(
            properties,
            |p| key(p, "area_id"),
            |id, properties| Area { id, properties },
        )
    }

    fn properties(&self) -> &Properties {
        &self.properties
    }
}

impl Id for Area {
    const ID_FIELD: &'static str = "area_id";

    fn id(&self) -> &str {
        &self.id
    }
}

impl Area {
    pub fn name(&self) -> Option<&str> {
        self.get("area_name")
    }
}

/// Assigns a [Stop] to an [Area]. See `stop_areas.txt`
#[derive(Debug, Clone, Serialize)]
pub struct StopArea {
    #[serde(skip)]
    keys: (String, String),
    #[serde(flatten)]
    properties: Properties,
}

impl Entity for StopArea {
    const TABLE: &'static str = "stop_areas";

    fn try_from_properties(properties: Properties) -> Result<Self, UnparsedEntity> {
        with_keys(
            properties,
            |p| Ok((key(p, "area_id")?, key(p, "stop_id")?)),
            |keys, properties| StopArea { keys, properties },
        )
    }

    fn properties(&self) -> &Properties {
        &self.properties
    }
}

impl TwoPartEntity for StopArea {
    type First = String;
    type Second = String;
    const KEY_FIELDS: (&'static str, &'static str) = ("area_id", "stop_id");

    fn first_key(&self) -> &String {
        &self.keys.0
    }

    fn second_key(&self) -> &String {
        &self.keys.1
    }
}

impl StopArea {
    pub fn area_id(&self) -> &str {
        &self.keys.0
    }

    pub fn stop_id(&self) -> &str {
        &self.keys.1
    }
}

/// Transfer information between stops, routes or trips. See `transfers.txt`
#[derive(Debug, Clone, Serialize)]
pub struct Transfer {
    #[serde(flatten)]
    properties: Properties,
}

impl Entity for Transfer {
    const TABLE: &'static str = "transfers";

    fn try_from_properties(properties: Properties) -> Result<Self, UnparsedEntity> {
        Ok(Transfer { properties })
    }

    fn properties(&self) -> &Properties {
        &self.properties
    }
}

impl Transfer {
    /// Stop from which to leave
    pub fn from_stop_id(&self) -> Option<&str> {
        self.get("from_stop_id")
    }

    /// Stop which to transfer to
    pub fn to_stop_id(&self) -> Option<&str> {
        self.get("to_stop_id")
    }

    pub fn from_route_id(&self) -> Option<&str> {
        self.get("from_route_id")
    }

    pub fn to_route_id(&self) -> Option<&str> {
        self.get("to_route_id")
    }

    pub fn from_trip_id(&self) -> Option<&str> {
        self.get("from_trip_id")
    }

    pub fn to_trip_id(&self) -> Option<&str> {
        self.get("to_trip_id")
    }

    /// Type of the transfer, [TransferType::Recommended] when empty
    pub fn transfer_type(&self) -> TransferType {
        self.properties
            .parse_or("transfer_type", TransferType::default())
    }

    /// Minimum time needed to make the transfer
    pub fn min_transfer_time(&self) -> Option<chrono::Duration> {
        self.properties.parse("min_transfer_time")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_location_type_is_a_stop_point() {
        let stop = Stop::from_properties(Properties::new([
            ("stop_id", "1"),
            ("stop_name", "Main St"),
            ("stop_lat", "40.0"),
            ("stop_lon", "-75.0"),
            ("location_type", ""),
        ]))
        .unwrap();
        assert_eq!(stop.location_type(), LocationType::StopPoint);
        assert_eq!(stop.latitude(), Some(40.0));
        assert_eq!(stop.longitude(), Some(-75.0));
        assert_eq!(stop.wheelchair_boarding(), Availability::InformationNotAvailable);
        assert_eq!(stop.get("location_type"), None);
        assert_eq!(stop.to_string(), "Main St");
    }

    #[test]
    fn pathway_accessors() {
        let pathway = Pathway::from_properties(Properties::new([
            ("pathway_id", "P1"),
            ("pathway_mode", "2"),
            ("is_bidirectional", "1"),
            ("stair_count", "-12"),
            ("traversal_time", "45"),
        ]))
        .unwrap();
        assert_eq!(pathway.mode(), Some(PathwayMode::Stairs));
        assert!(pathway.is_bidirectional());
        assert_eq!(pathway.stair_count(), Some(-12));
        assert_eq!(pathway.traversal_time(), Some(chrono::Duration::seconds(45)));
        assert_eq!(pathway.length(), None);
    }

    #[test]
    fn transfer_has_no_key() {
        let transfer = Transfer::from_properties(Properties::new([("from_stop_id", "A")])).unwrap();
        assert_eq!(transfer.transfer_type(), TransferType::Recommended);
        assert_eq!(transfer.to_stop_id(), None);
    }
}
