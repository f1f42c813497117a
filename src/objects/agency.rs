use std::fmt;

use chrono_tz::Tz;
use serde::Serialize;

use super::{with_keys, Entity, Id, UnparsedEntity};
use crate::properties::Properties;

/// General informations about the agency running the network. See <https://gtfs.org/reference/static/#agencytxt>
///
/// `agency_id` may be omitted by feeds with a single agency, the agency is then keyed by the empty string.
#[derive(Debug, Clone, Serialize)]
pub struct Agency {
    #[serde(skip)]
    id: String,
    #[serde(flatten)]
    properties: Properties,
}

impl Entity for Agency {
    const TABLE: &'static str = "agency";

    fn try_from_properties(properties: Properties) -> Result<Self, UnparsedEntity> {
        with_keys(
            properties,
            |p| Ok(p.get("agency_id").unwrap_or_default().to_owned()),
            |id, properties| Agency { id, properties },
        )
    }

    fn properties(&self) -> &Properties {
        &self.properties
    }
}

impl Id for Agency {
    const ID_FIELD: &'static str = "agency_id";

    fn id(&self) -> &str {
        &self.id
    }
}

impl Agency {
    /// Full name of the transit agency
    pub fn name(&self) -> Option<&str> {
        self.get("agency_name")
    }

    pub fn url(&self) -> Option<&str> {
        self.get("agency_url")
    }

    /// Timezone where the transit agency is located
    pub fn timezone(&self) -> Option<Tz> {
        self.properties.parse("agency_timezone")
    }

    /// Primary language used by this transit agency
    pub fn lang(&self) -> Option<&str> {
        self.get("agency_lang")
    }

    pub fn phone(&self) -> Option<&str> {
        self.get("agency_phone")
    }

    /// URL of a web page that allows a rider to purchase tickets or other fare instruments for that agency online
    pub fn fare_url(&self) -> Option<&str> {
        self.get("agency_fare_url")
    }

    pub fn email(&self) -> Option<&str> {
        self.get("agency_email")
    }
}

impl fmt::Display for Agency {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.name().unwrap_or(&self.id))
    }
}
