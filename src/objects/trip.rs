use std::fmt;

use serde::Serialize;

use super::{key, typed_key, with_keys, Entity, Id, OrderedEntity, TwoPartEntity, UnparsedEntity};
use crate::enums::{
    Availability, BikesAllowedType, ContinuousPickupDropOff, DirectionType, ExactTimes,
    PickupDropOffType, TimepointType,
};
use crate::properties::Properties;
use crate::time::ServiceTime;

/// A Trip is a vehicle that follows a sequence of [StopTime] on certain days. See <https://gtfs.org/reference/static/#tripstxt>
#[derive(Debug, Clone, Serialize)]
pub struct Trip {
    #[serde(skip)]
    id: String,
    #[serde(flatten)]
    properties: Properties,
}

impl Entity for Trip {
    const TABLE: &'static str = "trips";

    fn try_from_properties(properties: Properties) -> Result<Self, UnparsedEntity> {
        with_keys(
            properties,
            |p| key(p, "trip_id"),
            |id, properties| Trip { id, properties },
        )
    }

    fn properties(&self) -> &Properties {
        &self.properties
    }
}

impl Id for Trip {
    const ID_FIELD: &'static str = "trip_id";

    fn id(&self) -> &str {
        &self.id
    }
}

impl Trip {
    /// References along which [crate::objects::Route] this trip runs
    pub fn route_id(&self) -> Option<&str> {
        self.get("route_id")
    }

    /// References the service (a [crate::objects::Calendar] or a set of [crate::objects::CalendarDate]) on which this trip runs
    pub fn service_id(&self) -> Option<&str> {
        self.get("service_id")
    }

    /// Text that appears on signage identifying the trip's destination to riders
    pub fn headsign(&self) -> Option<&str> {
        self.get("trip_headsign")
    }

    /// Public facing text used to identify the trip to riders, for instance, to identify train numbers for commuter rail trips
    pub fn short_name(&self) -> Option<&str> {
        self.get("trip_short_name")
    }

    /// Direction of travel, only to separate trips when publishing time tables
    pub fn direction(&self) -> Option<DirectionType> {
        self.properties.parse("direction_id")
    }

    /// Identifies the block to which the trip belongs
    pub fn block_id(&self) -> Option<&str> {
        self.get("block_id")
    }

    pub fn shape_id(&self) -> Option<&str> {
        self.get("shape_id")
    }

    pub fn wheelchair_accessible(&self) -> Availability {
        self.properties
            .parse_or("wheelchair_accessible", Availability::default())
    }

    pub fn bikes_allowed(&self) -> BikesAllowedType {
        self.properties
            .parse_or("bikes_allowed", BikesAllowedType::default())
    }
}

impl fmt::Display for Trip {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "route id: {}, service id: {}",
            self.route_id().unwrap_or_default(),
            self.service_id().unwrap_or_default()
        )
    }
}

/// The moment where a vehicle, running on [Trip] stops at a [crate::objects::Stop]. See <https://gtfs.org/reference/static/#stop_timestxt>
///
/// Ordered by `stop_sequence` within its trip.
#[derive(Debug, Clone, Serialize)]
pub struct StopTime {
    #[serde(skip)]
    trip_id: String,
    #[serde(skip)]
    stop_sequence: u32,
    #[serde(flatten)]
    properties: Properties,
}

impl Entity for StopTime {
    const TABLE: &'static str = "stop_times";

    fn try_from_properties(properties: Properties) -> Result<Self, UnparsedEntity> {
        with_keys(
            properties,
            |p| Ok((key(p, "trip_id")?, typed_key(p, "stop_sequence")?)),
            |(trip_id, stop_sequence), properties| StopTime {
                trip_id,
                stop_sequence,
                properties,
            },
        )
    }

    fn properties(&self) -> &Properties {
        &self.properties
    }
}

impl TwoPartEntity for StopTime {
    type First = String;
    type Second = u32;
    const KEY_FIELDS: (&'static str, &'static str) = ("trip_id", "stop_sequence");

    fn first_key(&self) -> &String {
        &self.trip_id
    }

    fn second_key(&self) -> &u32 {
        &self.stop_sequence
    }
}

impl OrderedEntity for StopTime {}

impl StopTime {
    pub fn trip_id(&self) -> &str {
        &self.trip_id
    }

    /// Order of stops for a particular trip. The values must increase along the trip but do not need to be consecutive
    pub fn stop_sequence(&self) -> u32 {
        self.stop_sequence
    }

    /// Arrival time of the stop time.
    /// It's an option since the intermediate stops can have have no arrival
    /// and this arrival needs to be interpolated
    pub fn arrival_time(&self) -> Option<ServiceTime> {
        self.properties.parse("arrival_time")
    }

    /// Departure time of the stop time, same as the arrival time if not interpolated
    pub fn departure_time(&self) -> Option<ServiceTime> {
        self.properties.parse("departure_time")
    }

    /// Identifier of the [crate::objects::Stop] where the vehicle stops
    pub fn stop_id(&self) -> Option<&str> {
        self.get("stop_id")
    }

    pub fn stop_headsign(&self) -> Option<&str> {
        self.get("stop_headsign")
    }

    pub fn pickup_type(&self) -> PickupDropOffType {
        self.properties
            .parse_or("pickup_type", PickupDropOffType::default())
    }

    pub fn drop_off_type(&self) -> PickupDropOffType {
        self.properties
            .parse_or("drop_off_type", PickupDropOffType::default())
    }

    pub fn continuous_pickup(&self) -> ContinuousPickupDropOff {
        self.properties
            .parse_or("continuous_pickup", ContinuousPickupDropOff::default())
    }

    pub fn continuous_drop_off(&self) -> ContinuousPickupDropOff {
        self.properties
            .parse_or("continuous_drop_off", ContinuousPickupDropOff::default())
    }

    /// Distance traveled along the associated shape, from the first stop to this one
    pub fn shape_dist_traveled(&self) -> Option<f64> {
        self.properties.parse("shape_dist_traveled")
    }

    /// Indicates if arrival and departure times for a stop are strictly adhered to by the vehicle or if they are instead approximate and/or interpolated times
    pub fn timepoint(&self) -> TimepointType {
        self.properties
            .parse_or("timepoint", TimepointType::default())
    }
}

/// Timetables can be defined by the frequency of their vehicles. See <https://gtfs.org/reference/static/#frequenciestxt>
#[derive(Debug, Clone, Serialize)]
pub struct Frequency {
    #[serde(skip)]
    trip_id: String,
    #[serde(skip)]
    start_time: ServiceTime,
    #[serde(flatten)]
    properties: Properties,
}

impl Entity for Frequency {
    const TABLE: &'static str = "frequencies";

    fn try_from_properties(properties: Properties) -> Result<Self, UnparsedEntity> {
        with_keys(
            properties,
            |p| Ok((key(p, "trip_id")?, typed_key(p, "start_time")?)),
            |(trip_id, start_time), properties| Frequency {
                trip_id,
                start_time,
                properties,
            },
        )
    }

    fn properties(&self) -> &Properties {
        &self.properties
    }
}

impl TwoPartEntity for Frequency {
    type First = String;
    type Second = ServiceTime;
    const KEY_FIELDS: (&'static str, &'static str) = ("trip_id", "start_time");

    fn first_key(&self) -> &String {
        &self.trip_id
    }

    fn second_key(&self) -> &ServiceTime {
        &self.start_time
    }
}

impl Frequency {
    /// References the [Trip] that uses frequency
    pub fn trip_id(&self) -> &str {
        &self.trip_id
    }

    /// Time at which the first vehicle departs from the first stop of the trip
    pub fn start_time(&self) -> ServiceTime {
        self.start_time
    }

    /// Time at which service changes to a different headway (or ceases) at the first stop in the trip
    pub fn end_time(&self) -> Option<ServiceTime> {
        self.properties.parse("end_time")
    }

    /// Time, in seconds, between departures from the same stop (headway)
    pub fn headway_secs(&self) -> Option<u32> {
        self.properties.parse("headway_secs")
    }

    pub fn exact_times(&self) -> ExactTimes {
        self.properties
            .parse_or("exact_times", ExactTimes::default())
    }
}

/// A single geographical point decribing the shape of a [Trip]. See <https://gtfs.org/reference/static/#shapestxt>
#[derive(Debug, Clone, Serialize)]
pub struct ShapePoint {
    #[serde(skip)]
    shape_id: String,
    #[serde(skip)]
    sequence: u32,
    #[serde(flatten)]
    properties: Properties,
}

impl Entity for ShapePoint {
    const TABLE: &'static str = "shapes";

    fn try_from_properties(properties: Properties) -> Result<Self, UnparsedEntity> {
        with_keys(
            properties,
            |p| Ok((key(p, "shape_id")?, typed_key(p, "shape_pt_sequence")?)),
            |(shape_id, sequence), properties| ShapePoint {
                shape_id,
                sequence,
                properties,
            },
        )
    }

    fn properties(&self) -> &Properties {
        &self.properties
    }
}

impl TwoPartEntity for ShapePoint {
    type First = String;
    type Second = u32;
    const KEY_FIELDS: (&'static str, &'static str) = ("shape_id", "shape_pt_sequence");

    fn first_key(&self) -> &String {
        &self.shape_id
    }

    fn second_key(&self) -> &u32 {
        &self.sequence
    }
}

impl OrderedEntity for ShapePoint {}

impl ShapePoint {
    pub fn shape_id(&self) -> &str {
        &self.shape_id
    }

    pub fn latitude(&self) -> Option<f64> {
        self.properties.parse("shape_pt_lat")
    }

    pub fn longitude(&self) -> Option<f64> {
        self.properties.parse("shape_pt_lon")
    }

    /// Distance traveled along the shape from the first shape point
    pub fn dist_traveled(&self) -> Option<f64> {
        self.properties.parse("shape_dist_traveled")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stop_time_keys_and_times() {
        let st = StopTime::from_properties(Properties::new([
            ("trip_id", "T"),
            ("stop_sequence", "5"),
            ("arrival_time", "24:05:00"),
            ("departure_time", "24:06:00"),
            ("stop_id", "S1"),
            ("pickup_type", "1"),
            ("timepoint", ""),
        ]))
        .unwrap();
        assert_eq!(st.trip_id(), "T");
        assert_eq!(st.sequence(), 5);
        assert_eq!(st.arrival_time(), ServiceTime::from_hms(24, 5, 0));
        assert_eq!(st.pickup_type(), PickupDropOffType::NotAvailable);
        assert_eq!(st.drop_off_type(), PickupDropOffType::Regular);
        assert_eq!(st.timepoint(), TimepointType::Exact);
        assert_eq!(st.shape_dist_traveled(), None);
    }

    #[test]
    fn stop_time_sequence_must_be_an_integer() {
        let err = StopTime::from_properties(Properties::new([
            ("trip_id", "T"),
            ("stop_sequence", "first"),
        ]))
        .unwrap_err();
        assert_eq!(err.field(), "stop_sequence");
        let err = StopTime::from_properties(Properties::new([
            ("trip_id", "T"),
            ("stop_sequence", "-1"),
        ]))
        .unwrap_err();
        assert_eq!(err.field(), "stop_sequence");
    }

    #[test]
    fn trip_accessors() {
        let trip = Trip::from_properties(Properties::new([
            ("trip_id", "T1"),
            ("route_id", "R1"),
            ("service_id", "WEEK"),
            ("direction_id", "1"),
            ("bikes_allowed", "2"),
        ]))
        .unwrap();
        assert_eq!(trip.direction(), Some(DirectionType::Inbound));
        assert_eq!(trip.bikes_allowed(), BikesAllowedType::NoBikesAllowed);
        assert_eq!(trip.wheelchair_accessible(), Availability::InformationNotAvailable);
        assert_eq!(trip.to_string(), "route id: R1, service id: WEEK");
    }

    #[test]
    fn frequency_keyed_by_start_time() {
        let f = Frequency::from_properties(Properties::new([
            ("trip_id", "T1"),
            ("start_time", "6:00:00"),
            ("end_time", "9:00:00"),
            ("headway_secs", "600"),
        ]))
        .unwrap();
        assert_eq!(f.second_key(), &ServiceTime::from_secs(6 * 3600));
        assert_eq!(f.headway_secs(), Some(600));
        assert_eq!(f.exact_times(), ExactTimes::FrequencyBased);
    }
}
