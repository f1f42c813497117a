//! Validation of rows before they become entities
//!
//! A [ValidationPolicy] is chosen once for the whole feed. [Lenient] accepts
//! every row whose keys can be read. [Strict] checks each row against the
//! rules of its table, including the references to the tables loaded before.
use chrono::NaiveDate;
use chrono_tz::Tz;
use rgb::RGB8;

use crate::error::PropertyError;
use crate::feed::Feed;
use crate::objects::*;
use crate::properties::Properties;
use crate::time::ServiceTime;

type Check = Result<(), PropertyError>;

/// Rules applied to each row, one function per table
///
/// `feed` holds the tables loaded so far, in the loading order of the reader,
/// so a rule can only reference a table loaded before its own.
/// Every rule accepts the row by default.
pub trait ValidationPolicy {
    fn agency(_p: &Properties, _feed: &Feed) -> Check {
        Ok(())
    }
    fn route(_p: &Properties, _feed: &Feed) -> Check {
        Ok(())
    }
    fn calendar(_p: &Properties, _feed: &Feed) -> Check {
        Ok(())
    }
    fn calendar_date(_p: &Properties, _feed: &Feed) -> Check {
        Ok(())
    }
    fn stop(_p: &Properties, _feed: &Feed) -> Check {
        Ok(())
    }
    fn trip(_p: &Properties, _feed: &Feed) -> Check {
        Ok(())
    }
    fn stop_time(_p: &Properties, _feed: &Feed) -> Check {
        Ok(())
    }
    fn fare_attribute(_p: &Properties, _feed: &Feed) -> Check {
        Ok(())
    }
    fn fare_rule(_p: &Properties, _feed: &Feed) -> Check {
        Ok(())
    }
    fn shape_point(_p: &Properties, _feed: &Feed) -> Check {
        Ok(())
    }
    fn frequency(_p: &Properties, _feed: &Feed) -> Check {
        Ok(())
    }
    fn transfer(_p: &Properties, _feed: &Feed) -> Check {
        Ok(())
    }
    fn pathway(_p: &Properties, _feed: &Feed) -> Check {
        Ok(())
    }
    fn level(_p: &Properties, _feed: &Feed) -> Check {
        Ok(())
    }
    fn translation(_p: &Properties, _feed: &Feed) -> Check {
        Ok(())
    }
    fn attribution(_p: &Properties, _feed: &Feed) -> Check {
        Ok(())
    }
    fn feed_info(_p: &Properties, _feed: &Feed) -> Check {
        Ok(())
    }
    fn area(_p: &Properties, _feed: &Feed) -> Check {
        Ok(())
    }
    fn stop_area(_p: &Properties, _feed: &Feed) -> Check {
        Ok(())
    }
    fn network(_p: &Properties, _feed: &Feed) -> Check {
        Ok(())
    }
    fn route_network(_p: &Properties, _feed: &Feed) -> Check {
        Ok(())
    }
    fn fare_media(_p: &Properties, _feed: &Feed) -> Check {
        Ok(())
    }
    fn fare_product(_p: &Properties, _feed: &Feed) -> Check {
        Ok(())
    }
    fn fare_leg_rule(_p: &Properties, _feed: &Feed) -> Check {
        Ok(())
    }
    fn fare_transfer_rule(_p: &Properties, _feed: &Feed) -> Check {
        Ok(())
    }
    fn timeframe(_p: &Properties, _feed: &Feed) -> Check {
        Ok(())
    }
}

/// Only the keys of a row are required
#[derive(Debug, Clone, Copy, Default)]
pub struct Lenient;

impl ValidationPolicy for Lenient {}

/// Every row is checked against the rules of its table
#[derive(Debug, Clone, Copy, Default)]
pub struct Strict;

const LATITUDE: (f64, f64) = (-90.0, 90.0);
const LONGITUDE: (f64, f64) = (-180.0, 180.0);
const PICKUP_DROP_OFF: [i64; 4] = [0, 1, 2, 3];
const AVAILABILITY: [i64; 3] = [0, 1, 2];
const BOOLEAN: [i64; 2] = [0, 1];
const TRANSLATABLE_TABLES: [&str; 9] = [
    "agency",
    "stops",
    "routes",
    "trips",
    "stop_times",
    "pathways",
    "levels",
    "feed_info",
    "attributions",
];

/// `end` is not before `start`, when both are given
fn ordered<T: PartialOrd>(start: Option<T>, end: Option<T>, end_field: &str, strict: bool) -> Check {
    match (start, end) {
        (Some(s), Some(e)) if e < s || (strict && e == s) => Err(PropertyError::out_of_range(
            end_field,
            if strict {
                "must be after the start"
            } else {
                "must not be before the start"
            },
        )),
        _ => Ok(()),
    }
}

impl ValidationPolicy for Strict {
    fn agency(p: &Properties, _feed: &Feed) -> Check {
        p.assert_exists("agency_name")?;
        p.assert_exists("agency_url")?;
        p.assert_valid::<Tz>("agency_timezone")?;
        Ok(())
    }

    fn route(p: &Properties, feed: &Feed) -> Check {
        p.assert_optional_foreign_key("agency_id", &feed.agencies, "agency")?;
        p.assert_any_exists(&["route_short_name", "route_long_name"])?;
        p.assert_non_negative_int("route_type")?;
        p.assert_optional::<RGB8>("route_color")?;
        p.assert_optional::<RGB8>("route_text_color")?;
        p.assert_optional_non_negative_int("route_sort_order")?;
        p.assert_optional_enum("continuous_pickup", &PICKUP_DROP_OFF)?;
        p.assert_optional_enum("continuous_drop_off", &PICKUP_DROP_OFF)?;
        Ok(())
    }

    fn calendar(p: &Properties, _feed: &Feed) -> Check {
        for day in crate::objects::WEEKDAYS {
            p.assert_valid::<bool>(day)?;
        }
        let start: NaiveDate = p.assert_valid("start_date")?;
        let end: NaiveDate = p.assert_valid("end_date")?;
        ordered(Some(start), Some(end), "end_date", false)
    }

    fn calendar_date(p: &Properties, _feed: &Feed) -> Check {
        p.assert_valid::<NaiveDate>("date")?;
        p.assert_enum("exception_type", &[1, 2])?;
        Ok(())
    }

    fn stop(p: &Properties, _feed: &Feed) -> Check {
        let location_type = p.assert_optional_enum("location_type", &[0, 1, 2, 3, 4])?;
        match location_type.unwrap_or(0) {
            // stops, stations and entrances are located
            0..=2 => {
                p.assert_exists("stop_name")?;
                p.assert_decimal_in_range("stop_lat", LATITUDE.0, LATITUDE.1)?;
                p.assert_decimal_in_range("stop_lon", LONGITUDE.0, LONGITUDE.1)?;
            }
            _ => {
                p.assert_optional_decimal_in_range("stop_lat", LATITUDE.0, LATITUDE.1)?;
                p.assert_optional_decimal_in_range("stop_lon", LONGITUDE.0, LONGITUDE.1)?;
            }
        }
        match location_type.unwrap_or(0) {
            1 => p.assert_absent("parent_station", "a station cannot have a parent station")?,
            2..=4 => {
                p.assert_exists("parent_station")?;
            }
            _ => {}
        }
        p.assert_optional::<Tz>("stop_timezone")?;
        p.assert_optional_enum("wheelchair_boarding", &AVAILABILITY)?;
        Ok(())
    }

    fn trip(p: &Properties, feed: &Feed) -> Check {
        p.assert_foreign_key("route_id", &feed.routes, "routes")?;
        p.assert_foreign_key("service_id", &feed.calendar, "calendar")?;
        p.assert_optional_enum("direction_id", &BOOLEAN)?;
        p.assert_optional_enum("wheelchair_accessible", &AVAILABILITY)?;
        p.assert_optional_enum("bikes_allowed", &AVAILABILITY)?;
        Ok(())
    }

    fn stop_time(p: &Properties, feed: &Feed) -> Check {
        p.assert_foreign_key("trip_id", &feed.trips, "trips")?;
        p.assert_foreign_key("stop_id", &feed.stops, "stops")?;
        p.assert_non_negative_int("stop_sequence")?;
        if p.flag("timepoint") {
            p.assert_exists("arrival_time")?;
            p.assert_exists("departure_time")?;
        }
        let arrival = p.assert_optional::<ServiceTime>("arrival_time")?;
        let departure = p.assert_optional::<ServiceTime>("departure_time")?;
        ordered(arrival, departure, "departure_time", false)?;
        p.assert_optional_enum("pickup_type", &PICKUP_DROP_OFF)?;
        p.assert_optional_enum("drop_off_type", &PICKUP_DROP_OFF)?;
        p.assert_optional_enum("continuous_pickup", &PICKUP_DROP_OFF)?;
        p.assert_optional_enum("continuous_drop_off", &PICKUP_DROP_OFF)?;
        p.assert_optional_non_negative_decimal("shape_dist_traveled")?;
        p.assert_optional_enum("timepoint", &BOOLEAN)?;
        Ok(())
    }

    fn fare_attribute(p: &Properties, feed: &Feed) -> Check {
        p.assert_non_negative_decimal("price")?;
        p.assert_exists("currency_type")?;
        p.assert_enum("payment_method", &BOOLEAN)?;
        p.assert_optional_enum("transfers", &[0, 1, 2])?;
        p.assert_optional_foreign_key("agency_id", &feed.agencies, "agency")?;
        p.assert_optional_non_negative_int("transfer_duration")?;
        Ok(())
    }

    fn fare_rule(p: &Properties, feed: &Feed) -> Check {
        p.assert_foreign_key("fare_id", &feed.fare_attributes, "fare_attributes")?;
        p.assert_any_exists(&["route_id", "origin_id", "destination_id", "contains_id"])?;
        p.assert_optional_foreign_key("route_id", &feed.routes, "routes")?;
        Ok(())
    }

    fn shape_point(p: &Properties, _feed: &Feed) -> Check {
        p.assert_decimal_in_range("shape_pt_lat", LATITUDE.0, LATITUDE.1)?;
        p.assert_decimal_in_range("shape_pt_lon", LONGITUDE.0, LONGITUDE.1)?;
        p.assert_non_negative_int("shape_pt_sequence")?;
        p.assert_optional_non_negative_decimal("shape_dist_traveled")?;
        Ok(())
    }

    fn frequency(p: &Properties, feed: &Feed) -> Check {
        p.assert_foreign_key("trip_id", &feed.trips, "trips")?;
        let start: ServiceTime = p.assert_valid("start_time")?;
        let end: ServiceTime = p.assert_valid("end_time")?;
        ordered(Some(start), Some(end), "end_time", true)?;
        p.assert_positive_int("headway_secs")?;
        p.assert_optional_enum("exact_times", &BOOLEAN)?;
        Ok(())
    }

    fn transfer(p: &Properties, feed: &Feed) -> Check {
        p.assert_enum("transfer_type", &[0, 1, 2, 3, 4, 5])?;
        p.assert_optional_foreign_key("from_stop_id", &feed.stops, "stops")?;
        p.assert_optional_foreign_key("to_stop_id", &feed.stops, "stops")?;
        p.assert_optional_foreign_key("from_route_id", &feed.routes, "routes")?;
        p.assert_optional_foreign_key("to_route_id", &feed.routes, "routes")?;
        p.assert_optional_foreign_key("from_trip_id", &feed.trips, "trips")?;
        p.assert_optional_foreign_key("to_trip_id", &feed.trips, "trips")?;
        p.assert_optional_non_negative_int("min_transfer_time")?;
        Ok(())
    }

    fn pathway(p: &Properties, feed: &Feed) -> Check {
        p.assert_foreign_key("from_stop_id", &feed.stops, "stops")?;
        p.assert_foreign_key("to_stop_id", &feed.stops, "stops")?;
        let mode = p.assert_enum("pathway_mode", &[1, 2, 3, 4, 5, 6, 7])?;
        let bidirectional: bool = p.assert_valid("is_bidirectional")?;
        if bidirectional && mode == 7 {
            return Err(PropertyError::conflict(
                "is_bidirectional",
                "an exit gate cannot be bidirectional",
            ));
        }
        p.assert_optional_non_negative_decimal("length")?;
        p.assert_optional_positive_int("traversal_time")?;
        p.assert_optional::<i64>("stair_count")?;
        p.assert_optional::<f64>("max_slope")?;
        p.assert_optional_non_negative_decimal("min_width")?;
        Ok(())
    }

    fn level(p: &Properties, _feed: &Feed) -> Check {
        p.assert_valid::<f64>("level_index")?;
        Ok(())
    }

    fn translation(p: &Properties, _feed: &Feed) -> Check {
        let table = p.assert_exists("table_name")?;
        if !TRANSLATABLE_TABLES.contains(&table) {
            return Err(PropertyError::InvalidEnumValue {
                field: "table_name".to_owned(),
                value: table.to_owned(),
            });
        }
        p.assert_exists("field_name")?;
        p.assert_exists("language")?;
        p.assert_exists("translation")?;
        p.assert_at_most_one(&["record_id", "field_value"])?;
        if !p.contains_key("record_id") {
            p.assert_absent("record_sub_id", "requires a record_id")?;
        }
        Ok(())
    }

    fn attribution(p: &Properties, feed: &Feed) -> Check {
        p.assert_exists("organization_name")?;
        p.assert_at_most_one(&["agency_id", "route_id", "trip_id"])?;
        p.assert_optional_foreign_key("agency_id", &feed.agencies, "agency")?;
        p.assert_optional_foreign_key("route_id", &feed.routes, "routes")?;
        p.assert_optional_foreign_key("trip_id", &feed.trips, "trips")?;
        let roles = ["is_producer", "is_operator", "is_authority"];
        for role in roles {
            p.assert_optional::<bool>(role)?;
        }
        if !roles.iter().any(|r| p.flag(r)) {
            return Err(PropertyError::missing("is_producer, is_operator or is_authority"));
        }
        Ok(())
    }

    fn feed_info(p: &Properties, _feed: &Feed) -> Check {
        p.assert_exists("feed_publisher_name")?;
        p.assert_exists("feed_publisher_url")?;
        p.assert_exists("feed_lang")?;
        let start = p.assert_optional::<NaiveDate>("feed_start_date")?;
        let end = p.assert_optional::<NaiveDate>("feed_end_date")?;
        ordered(start, end, "feed_end_date", false)
    }

    fn stop_area(p: &Properties, feed: &Feed) -> Check {
        p.assert_foreign_key("area_id", &feed.areas, "areas")?;
        p.assert_foreign_key("stop_id", &feed.stops, "stops")?;
        Ok(())
    }

    fn route_network(p: &Properties, feed: &Feed) -> Check {
        p.assert_foreign_key("network_id", &feed.networks, "networks")?;
        p.assert_foreign_key("route_id", &feed.routes, "routes")?;
        Ok(())
    }

    fn fare_media(p: &Properties, _feed: &Feed) -> Check {
        p.assert_enum("fare_media_type", &[0, 1, 2, 3, 4])?;
        Ok(())
    }

    fn fare_product(p: &Properties, feed: &Feed) -> Check {
        p.assert_valid::<f64>("amount")?;
        p.assert_exists("currency")?;
        p.assert_optional_foreign_key("fare_media_id", &feed.fare_media, "fare_media")?;
        Ok(())
    }

    fn fare_leg_rule(p: &Properties, feed: &Feed) -> Check {
        p.assert_foreign_key("fare_product_id", &feed.fare_products, "fare_products")?;
        p.assert_optional_foreign_key("from_area_id", &feed.areas, "areas")?;
        p.assert_optional_foreign_key("to_area_id", &feed.areas, "areas")?;
        p.assert_optional_non_negative_int("rule_priority")?;
        Ok(())
    }

    fn fare_transfer_rule(p: &Properties, feed: &Feed) -> Check {
        p.assert_enum("fare_transfer_type", &[0, 1, 2])?;
        p.assert_optional::<i64>("transfer_count")?;
        p.assert_optional_positive_int("duration_limit")?;
        p.assert_optional_enum("duration_limit_type", &[0, 1, 2, 3])?;
        p.assert_optional_foreign_key("fare_product_id", &feed.fare_products, "fare_products")?;
        Ok(())
    }

    fn timeframe(p: &Properties, feed: &Feed) -> Check {
        p.assert_exists("timeframe_group_id")?;
        let start = p.assert_optional::<ServiceTime>("start_time")?;
        let end = p.assert_optional::<ServiceTime>("end_time")?;
        ordered(start, end, "end_time", true)?;
        p.assert_foreign_key("service_id", &feed.calendar, "calendar")?;
        Ok(())
    }
}

/// Links an entity to the rule of its table
pub trait Validate: Entity {
    fn validate<V: ValidationPolicy>(p: &Properties, feed: &Feed) -> Check;
}

macro_rules! validate_with {
    ($($entity:ty => $rule:ident),* $(,)?) => {
        $(
            impl Validate for $entity {
                fn validate<V: ValidationPolicy>(p: &Properties, feed: &Feed) -> Check {
                    V::$rule(p, feed)
                }
            }
        )*
    };
}

validate_with! {
    Agency => agency,
    Route => route,
    Calendar => calendar,
    CalendarDate => calendar_date,
    Stop => stop,
    Trip => trip,
    StopTime => stop_time,
    FareAttribute => fare_attribute,
    FareRule => fare_rule,
    ShapePoint => shape_point,
    Frequency => frequency,
    Transfer => transfer,
    Pathway => pathway,
    Level => level,
    Translation => translation,
    Attribution => attribution,
    FeedInfo => feed_info,
    Area => area,
    StopArea => stop_area,
    Network => network,
    RouteNetwork => route_network,
    FareMedia => fare_media,
    FareProduct => fare_product,
    FareLegRule => fare_leg_rule,
    FareTransferRule => fare_transfer_rule,
    Timeframe => timeframe,
}
