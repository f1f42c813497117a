use std::fmt;

use chrono::NaiveDate;
use serde::Serialize;

use super::{Entity, UnparsedEntity};
use crate::properties::Properties;

/// Meta-data about the feed. See <https://gtfs.org/reference/static/#feed_infotxt>
#[derive(Debug, Clone, Serialize)]
pub struct FeedInfo {
    #[serde(flatten)]
    properties: Properties,
}

impl Entity for FeedInfo {
    const TABLE: &'static str = "feed_info";

    fn try_from_properties(properties: Properties) -> Result<Self, UnparsedEntity> {
        Ok(FeedInfo { properties })
    }

    fn properties(&self) -> &Properties {
        &self.properties
    }
}

impl FeedInfo {
    /// Full name of the organization that publishes the dataset.
    pub fn publisher_name(&self) -> Option<&str> {
        self.get("feed_publisher_name")
    }

    pub fn publisher_url(&self) -> Option<&str> {
        self.get("feed_publisher_url")
    }

    /// Default language used for the text in this dataset
    pub fn lang(&self) -> Option<&str> {
        self.get("feed_lang")
    }

    /// Language to use when the data consumer doesn’t know the language of the rider
    pub fn default_lang(&self) -> Option<&str> {
        self.get("default_lang")
    }

    /// The dataset provides complete and reliable schedule information from this date
    pub fn start_date(&self) -> Option<NaiveDate> {
        self.properties.parse("feed_start_date")
    }

    /// The dataset provides complete and reliable schedule information until this date
    pub fn end_date(&self) -> Option<NaiveDate> {
        self.properties.parse("feed_end_date")
    }

    pub fn version(&self) -> Option<&str> {
        self.get("feed_version")
    }

    pub fn contact_email(&self) -> Option<&str> {
        self.get("feed_contact_email")
    }

    pub fn contact_url(&self) -> Option<&str> {
        self.get("feed_contact_url")
    }
}

impl fmt::Display for FeedInfo {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.publisher_name().unwrap_or_default())
    }
}

/// Translation of a text field of another table. See `translations.txt`
#[derive(Debug, Clone, Serialize)]
pub struct Translation {
    #[serde(flatten)]
    properties: Properties,
}

impl Entity for Translation {
    const TABLE: &'static str = "translations";

    fn try_from_properties(properties: Properties) -> Result<Self, UnparsedEntity> {
        Ok(Translation { properties })
    }

    fn properties(&self) -> &Properties {
        &self.properties
    }
}

impl Translation {
    /// Table of the translated field
    pub fn table_name(&self) -> Option<&str> {
        self.get("table_name")
    }

    pub fn field_name(&self) -> Option<&str> {
        self.get("field_name")
    }

    pub fn language(&self) -> Option<&str> {
        self.get("language")
    }

    pub fn translation(&self) -> Option<&str> {
        self.get("translation")
    }

    /// Identifier of the translated record
    pub fn record_id(&self) -> Option<&str> {
        self.get("record_id")
    }

    pub fn record_sub_id(&self) -> Option<&str> {
        self.get("record_sub_id")
    }

    /// Translates every record having this value, when no `record_id` is given
    pub fn field_value(&self) -> Option<&str> {
        self.get("field_value")
    }
}

/// An organization involved in producing the data. See `attributions.txt`
#[derive(Debug, Clone, Serialize)]
pub struct Attribution {
    #[serde(flatten)]
    properties: Properties,
}

impl Entity for Attribution {
    const TABLE: &'static str = "attributions";

    fn try_from_properties(properties: Properties) -> Result<Self, UnparsedEntity> {
        Ok(Attribution { properties })
    }

    fn properties(&self) -> &Properties {
        &self.properties
    }
}

impl Attribution {
    pub fn attribution_id(&self) -> Option<&str> {
        self.get("attribution_id")
    }

    pub fn agency_id(&self) -> Option<&str> {
        self.get("agency_id")
    }

    pub fn route_id(&self) -> Option<&str> {
        self.get("route_id")
    }

    pub fn trip_id(&self) -> Option<&str> {
        self.get("trip_id")
    }

    pub fn organization_name(&self) -> Option<&str> {
        self.get("organization_name")
    }

    pub fn is_producer(&self) -> bool {
        self.properties.flag("is_producer")
    }

    pub fn is_operator(&self) -> bool {
        self.properties.flag("is_operator")
    }

    pub fn is_authority(&self) -> bool {
        self.properties.flag("is_authority")
    }

    pub fn url(&self) -> Option<&str> {
        self.get("attribution_url")
    }

    pub fn email(&self) -> Option<&str> {
        self.get("attribution_email")
    }

    pub fn phone(&self) -> Option<&str> {
        self.get("attribution_phone")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn feed_info_dates() {
        let info = FeedInfo::from_properties(Properties::new([
            ("feed_publisher_name", "Transit"),
            ("feed_start_date", "20240101"),
            ("feed_end_date", "not a date"),
        ]))
        .unwrap();
        assert_eq!(info.start_date(), NaiveDate::from_ymd_opt(2024, 1, 1));
        assert_eq!(info.end_date(), None);
        assert_eq!(info.to_string(), "Transit");
    }

    #[test]
    fn attribution_roles() {
        let a = Attribution::from_properties(Properties::new([
            ("organization_name", "Maps Inc"),
            ("is_producer", "1"),
            ("is_operator", "0"),
        ]))
        .unwrap();
        assert!(a.is_producer());
        assert!(!a.is_operator());
        assert!(!a.is_authority());
    }
}
