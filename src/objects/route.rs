use std::fmt;

use rgb::RGB8;
use serde::Serialize;

use super::{key, with_keys, Entity, Id, TwoPartEntity, UnparsedEntity};
use crate::enums::{ContinuousPickupDropOff, RouteType};
use crate::properties::Properties;

/// Color of a route when none is given
pub const DEFAULT_ROUTE_COLOR: RGB8 = RGB8 { r: 255, g: 255, b: 255 };
/// Color of a route's text when none is given
pub const DEFAULT_ROUTE_TEXT_COLOR: RGB8 = RGB8 { r: 0, g: 0, b: 0 };

/// A route is a commercial line (there can be various stop sequences for a same line). See <https://gtfs.org/reference/static/#routestxt>
#[derive(Debug, Clone, Serialize)]
pub struct Route {
    #[serde(skip)]
    id: String,
    #[serde(flatten)]
    properties: Properties,
}

impl Entity for Route {
    const TABLE: &'static str = "routes";

    fn try_from_properties(properties: Properties) -> Result<Self, UnparsedEntity> {
        with_keys(
            properties,
            |p| key(p, "route_id"),
            |id, properties| Route { id, properties },
        )
    }

    fn properties(&self) -> &Properties {
        &self.properties
    }
}

impl Id for Route {
    const ID_FIELD: &'static str = "route_id";

    fn id(&self) -> &str {
        &self.id
    }
}

impl Route {
    /// Agency for the specified route, inherited from the feed's first agency when omitted
    pub fn agency_id(&self) -> Option<&str> {
        self.get("agency_id")
    }

    /// Short name of a route. This will often be a short, abstract identifier like "32", "100X", or "Green"
    pub fn short_name(&self) -> Option<&str> {
        self.get("route_short_name")
    }

    /// Full name of a route, generally more descriptive than the short name
    pub fn long_name(&self) -> Option<&str> {
        self.get("route_long_name")
    }

    pub fn desc(&self) -> Option<&str> {
        self.get("route_desc")
    }

    /// Indicates the type of transportation used on a route, [RouteType::Bus] when absent or invalid
    pub fn route_type(&self) -> RouteType {
        self.properties.parse_or("route_type", RouteType::default())
    }

    pub fn url(&self) -> Option<&str> {
        self.get("route_url")
    }

    /// Route color designation that matches public facing material, white by default
    pub fn color(&self) -> RGB8 {
        self.properties.parse_or("route_color", DEFAULT_ROUTE_COLOR)
    }

    /// Legible color to use for text drawn against a background of [Route::color], black by default
    pub fn text_color(&self) -> RGB8 {
        self.properties
            .parse_or("route_text_color", DEFAULT_ROUTE_TEXT_COLOR)
    }

    /// Routes with smaller values should be displayed first
    pub fn sort_order(&self) -> Option<u32> {
        self.properties.parse("route_sort_order")
    }

    pub fn continuous_pickup(&self) -> ContinuousPickupDropOff {
        self.properties
            .parse_or("continuous_pickup", ContinuousPickupDropOff::default())
    }

    pub fn continuous_drop_off(&self) -> ContinuousPickupDropOff {
        self.properties
            .parse_or("continuous_drop_off", ContinuousPickupDropOff::default())
    }

    pub fn network_id(&self) -> Option<&str> {
        self.get("network_id")
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match (self.long_name(), self.short_name()) {
            (Some(long), _) => write!(f, "{}", long),
            (None, Some(short)) => write!(f, "{}", short),
            (None, None) => write!(f, "{}", self.id),
        }
    }
}

/// A group of routes sold under the same fare rules, see `networks.txt`
#[derive(Debug, Clone, Serialize)]
pub struct Network {
    #[serde(skip)]
    id: String,
    #[serde(flatten)]
    properties: Properties,
}

impl Entity for Network {
    const TABLE: &'static str = "networks";

    fn try_from_properties(properties: Properties) -> Result<Self, UnparsedEntity> {
        with_keys(
            properties,
            |p| key(p, "network_id"),
            |id, properties| Network { id, properties },
        )
    }

    fn properties(&self) -> &Properties {
        &self.properties
    }
}

impl Id for Network {
    const ID_FIELD: &'static str = "network_id";

    fn id(&self) -> &str {
        &self.id
    }
}

impl Network {
    pub fn name(&self) -> Option<&str> {
        self.get("network_name")
    }
}

/// Assigns a [Route] to a [Network], see `route_networks.txt`
#[derive(Debug, Clone, Serialize)]
pub struct RouteNetwork {
    #[serde(skip)]
    keys: (String, String),
    #[serde(flatten)]
    properties: Properties,
}

impl Entity for RouteNetwork {
    const TABLE: &'static str = "route_networks";

    fn try_from_properties(properties: Properties) -> Result<Self, UnparsedEntity> {
        with_keys(
            properties,
            |p| Ok((key(p, "network_id")?, key(p, "route_id")?)),
            |keys, properties| RouteNetwork { keys, properties },
        )
    }

    fn properties(&self) -> &Properties {
        &self.properties
    }
}

impl TwoPartEntity for RouteNetwork {
    type First = String;
    type Second = String;
    const KEY_FIELDS: (&'static str, &'static str) = ("network_id", "route_id");

    fn first_key(&self) -> &String {
        &self.keys.0
    }

    fn second_key(&self) -> &String {
        &self.keys.1
    }
}

impl RouteNetwork {
    pub fn network_id(&self) -> &str {
        &self.keys.0
    }

    pub fn route_id(&self) -> &str {
        &self.keys.1
    }
}
