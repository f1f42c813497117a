use serde::Serialize;

use super::{key, with_keys, Entity, Id, TwoPartEntity, UnparsedEntity};
use crate::enums::{FareMediaType, PaymentMethod, Transfers};
use crate::properties::Properties;
use crate::time::ServiceTime;

/// Defines one possible fare. See <https://gtfs.org/reference/static/#fare_attributestxt>
#[derive(Debug, Clone, Serialize)]
pub struct FareAttribute {
    #[serde(skip)]
    id: String,
    #[serde(flatten)]
    properties: Properties,
}

impl Entity for FareAttribute {
    const TABLE: &'static str = "fare_attributes";

    fn try_from_properties(properties: Properties) -> Result<Self, UnparsedEntity> {
        with_keys(
            properties,
            |p| key(p, "fare_id"),
            |id, properties| FareAttribute { id, properties },
        )
    }

    fn properties(&self) -> &Properties {
        &self.properties
    }
}

impl Id for FareAttribute {
    const ID_FIELD: &'static str = "fare_id";

    fn id(&self) -> &str {
        &self.id
    }
}

impl FareAttribute {
    /// Fare price, in the unit specified by [FareAttribute::currency]
    pub fn price(&self) -> Option<f64> {
        self.properties.parse("price")
    }

    /// Currency used to pay the fare
    pub fn currency(&self) -> Option<&str> {
        self.get("currency_type")
    }

    /// Indicates when the fare must be paid
    pub fn payment_method(&self) -> Option<PaymentMethod> {
        self.properties.parse("payment_method")
    }

    /// Indicates the number of transfers permitted on this fare, unlimited when empty
    pub fn transfers(&self) -> Transfers {
        self.properties.parse_or("transfers", Transfers::default())
    }

    /// Identifies the relevant agency for a fare
    pub fn agency_id(&self) -> Option<&str> {
        self.get("agency_id")
    }

    /// Length of time before a transfer expires
    pub fn transfer_duration(&self) -> Option<chrono::Duration> {
        self.properties.parse("transfer_duration")
    }
}

/// Specifies how a [FareAttribute] applies to an itinerary. See `fare_rules.txt`
#[derive(Debug, Clone, Serialize)]
pub struct FareRule {
    #[serde(flatten)]
    properties: Properties,
}

impl Entity for FareRule {
    const TABLE: &'static str = "fare_rules";

    fn try_from_properties(properties: Properties) -> Result<Self, UnparsedEntity> {
        Ok(FareRule { properties })
    }

    fn properties(&self) -> &Properties {
        &self.properties
    }
}

impl FareRule {
    pub fn fare_id(&self) -> Option<&str> {
        self.get("fare_id")
    }

    pub fn route_id(&self) -> Option<&str> {
        self.get("route_id")
    }

    /// Origin zone, matching a stop's `zone_id`
    pub fn origin_id(&self) -> Option<&str> {
        self.get("origin_id")
    }

    pub fn destination_id(&self) -> Option<&str> {
        self.get("destination_id")
    }

    /// A zone the itinerary passes through
    pub fn contains_id(&self) -> Option<&str> {
        self.get("contains_id")
    }
}

/// A medium holding fare products. See `fare_media.txt`
#[derive(Debug, Clone, Serialize)]
pub struct FareMedia {
    #[serde(skip)]
    id: String,
    #[serde(flatten)]
    properties: Properties,
}

impl Entity for FareMedia {
    const TABLE: &'static str = "fare_media";

    fn try_from_properties(properties: Properties) -> Result<Self, UnparsedEntity> {
        with_keys(
            properties,
            |p| key(p, "fare_media_id"),
            |id, properties| FareMedia { id, properties },
        )
    }

    fn properties(&self) -> &Properties {
        &self.properties
    }
}

impl Id for FareMedia {
    const ID_FIELD: &'static str = "fare_media_id";

    fn id(&self) -> &str {
        &self.id
    }
}

impl FareMedia {
    pub fn name(&self) -> Option<&str> {
        self.get("fare_media_name")
    }

    pub fn media_type(&self) -> Option<FareMediaType> {
        self.properties.parse("fare_media_type")
    }
}

/// A fare product, for a given medium. See `fare_products.txt`
///
/// The same product can be sold on several media, so it is keyed by the
/// product and the medium, the medium being empty when not given.
#[derive(Debug, Clone, Serialize)]
pub struct FareProduct {
    #[serde(skip)]
    keys: (String, String),
    #[serde(flatten)]
    properties: Properties,
}

impl Entity for FareProduct {
    const TABLE: &'static str = "fare_products";

    fn try_from_properties(properties: Properties) -> Result<Self, UnparsedEntity> {
        with_keys(
            properties,
            |p| {
                let media = p.get("fare_media_id").unwrap_or_default().to_owned();
                Ok((key(p, "fare_product_id")?, media))
            },
            |keys, properties| FareProduct { keys, properties },
        )
    }

    fn properties(&self) -> &Properties {
        &self.properties
    }
}

impl TwoPartEntity for FareProduct {
    type First = String;
    type Second = String;
    const KEY_FIELDS: (&'static str, &'static str) = ("fare_product_id", "fare_media_id");

    fn first_key(&self) -> &String {
        &self.keys.0
    }

    fn second_key(&self) -> &String {
        &self.keys.1
    }
}

impl FareProduct {
    pub fn product_id(&self) -> &str {
        &self.keys.0
    }

    /// `None` when the product does not depend on a medium
    pub fn media_id(&self) -> Option<&str> {
        Some(self.keys.1.as_str()).filter(|m| !m.is_empty())
    }

    pub fn name(&self) -> Option<&str> {
        self.get("fare_product_name")
    }

    pub fn amount(&self) -> Option<f64> {
        self.properties.parse("amount")
    }

    pub fn currency(&self) -> Option<&str> {
        self.get("currency")
    }
}

/// Fare rule for a single leg of a journey. See `fare_leg_rules.txt`
#[derive(Debug, Clone, Serialize)]
pub struct FareLegRule {
    #[serde(flatten)]
    properties: Properties,
}

impl Entity for FareLegRule {
    const TABLE: &'static str = "fare_leg_rules";

    fn try_from_properties(properties: Properties) -> Result<Self, UnparsedEntity> {
        Ok(FareLegRule { properties })
    }

    fn properties(&self) -> &Properties {
        &self.properties
    }
}

impl FareLegRule {
    pub fn leg_group_id(&self) -> Option<&str> {
        self.get("leg_group_id")
    }

    pub fn network_id(&self) -> Option<&str> {
        self.get("network_id")
    }

    pub fn from_area_id(&self) -> Option<&str> {
        self.get("from_area_id")
    }

    pub fn to_area_id(&self) -> Option<&str> {
        self.get("to_area_id")
    }

    pub fn from_timeframe_group_id(&self) -> Option<&str> {
        self.get("from_timeframe_group_id")
    }

    pub fn to_timeframe_group_id(&self) -> Option<&str> {
        self.get("to_timeframe_group_id")
    }

    pub fn fare_product_id(&self) -> Option<&str> {
        self.get("fare_product_id")
    }

    pub fn rule_priority(&self) -> Option<u32> {
        self.properties.parse("rule_priority")
    }
}

/// Fare rule for a transfer between two legs. See `fare_transfer_rules.txt`
#[derive(Debug, Clone, Serialize)]
pub struct FareTransferRule {
    #[serde(flatten)]
    properties: Properties,
}

impl Entity for FareTransferRule {
    const TABLE: &'static str = "fare_transfer_rules";

    fn try_from_properties(properties: Properties) -> Result<Self, UnparsedEntity> {
        Ok(FareTransferRule { properties })
    }

    fn properties(&self) -> &Properties {
        &self.properties
    }
}

impl FareTransferRule {
    pub fn from_leg_group_id(&self) -> Option<&str> {
        self.get("from_leg_group_id")
    }

    pub fn to_leg_group_id(&self) -> Option<&str> {
        self.get("to_leg_group_id")
    }

    /// `-1` means unlimited transfers
    pub fn transfer_count(&self) -> Option<i64> {
        self.properties.parse("transfer_count")
    }

    pub fn duration_limit(&self) -> Option<chrono::Duration> {
        self.properties.parse("duration_limit")
    }

    pub fn duration_limit_type(&self) -> Option<i64> {
        self.properties.parse("duration_limit_type")
    }

    pub fn fare_transfer_type(&self) -> Option<i64> {
        self.properties.parse("fare_transfer_type")
    }

    pub fn fare_product_id(&self) -> Option<&str> {
        self.get("fare_product_id")
    }
}

/// A time window during which fares apply. See `timeframes.txt`
#[derive(Debug, Clone, Serialize)]
pub struct Timeframe {
    #[serde(flatten)]
    properties: Properties,
}

impl Entity for Timeframe {
    const TABLE: &'static str = "timeframes";

    fn try_from_properties(properties: Properties) -> Result<Self, UnparsedEntity> {
        Ok(Timeframe { properties })
    }

    fn properties(&self) -> &Properties {
        &self.properties
    }
}

impl Timeframe {
    pub fn group_id(&self) -> Option<&str> {
        self.get("timeframe_group_id")
    }

    /// Midnight when empty
    pub fn start_time(&self) -> ServiceTime {
        self.properties.parse_or("start_time", ServiceTime::MIDNIGHT)
    }

    /// End of the day (`24:00:00`) when empty
    pub fn end_time(&self) -> ServiceTime {
        self.properties
            .parse_or("end_time", ServiceTime::from_secs(24 * 3600))
    }

    pub fn service_id(&self) -> Option<&str> {
        self.get("service_id")
    }
}
