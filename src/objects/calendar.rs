use std::fmt;

use chrono::{Datelike, NaiveDate, Weekday};
use serde::Serialize;

use super::{key, typed_key, with_keys, Entity, Id, TwoPartEntity, UnparsedEntity};
use crate::enums::Exception;
use crate::properties::Properties;

/// Names of the day fields, Monday first
pub(crate) const WEEKDAYS: [&str; 7] = [
    "monday",
    "tuesday",
    "wednesday",
    "thursday",
    "friday",
    "saturday",
    "sunday",
];

/// A calender describes on which days the vehicle runs. See <https://gtfs.org/reference/static/#calendartxt>
#[derive(Debug, Clone, Serialize)]
pub struct Calendar {
    #[serde(skip)]
    id: String,
    #[serde(flatten)]
    properties: Properties,
}

impl Entity for Calendar {
    const TABLE: &'static str = "calendar";

    fn try_from_properties(properties: Properties) -> Result<Self, UnparsedEntity> {
        with_keys(
            properties,
            |p| key(p, "service_id"),
            |id, properties| Calendar { id, properties },
        )
    }

    fn properties(&self) -> &Properties {
        &self.properties
    }
}

impl Id for Calendar {
    const ID_FIELD: &'static str = "service_id";

    fn id(&self) -> &str {
        &self.id
    }
}

impl Calendar {
    pub fn monday(&self) -> bool {
        self.properties.flag("monday")
    }

    pub fn tuesday(&self) -> bool {
        self.properties.flag("tuesday")
    }

    pub fn wednesday(&self) -> bool {
        self.properties.flag("wednesday")
    }

    pub fn thursday(&self) -> bool {
        self.properties.flag("thursday")
    }

    pub fn friday(&self) -> bool {
        self.properties.flag("friday")
    }

    pub fn saturday(&self) -> bool {
        self.properties.flag("saturday")
    }

    pub fn sunday(&self) -> bool {
        self.properties.flag("sunday")
    }

    /// Start service day for the service interval
    pub fn start_date(&self) -> Option<NaiveDate> {
        self.properties.parse("start_date")
    }

    /// End service day for the service interval. This service day is included in the interval
    pub fn end_date(&self) -> Option<NaiveDate> {
        self.properties.parse("end_date")
    }

    /// Days of service as a bit mask, Monday is `1` and Sunday is `64`
    pub fn mask(&self) -> u8 {
        WEEKDAYS
            .iter()
            .enumerate()
            .filter(|(_, day)| self.properties.flag(day))
            .fold(0u8, |mask, (i, _)| mask | (1 << i))
    }

    /// Returns true if there is a service running on that day of the week
    pub fn valid_weekday(&self, date: NaiveDate) -> bool {
        match date.weekday() {
            Weekday::Mon => self.monday(),
            Weekday::Tue => self.tuesday(),
            Weekday::Wed => self.wednesday(),
            Weekday::Thu => self.thursday(),
            Weekday::Fri => self.friday(),
            Weekday::Sat => self.saturday(),
            Weekday::Sun => self.sunday(),
        }
    }

    /// The date lies between the start and end dates, both included
    ///
    /// A calendar missing one of its dates has no range.
    pub fn date_in_range(&self, date: NaiveDate) -> bool {
        match (self.start_date(), self.end_date()) {
            (Some(start), Some(end)) => start <= date && date <= end,
            _ => false,
        }
    }

    /// The weekly pattern runs on that date, ignoring the exceptions
    pub fn service_on(&self, date: NaiveDate) -> bool {
        self.date_in_range(date) && self.valid_weekday(date)
    }
}

impl fmt::Display for Calendar {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match (self.start_date(), self.end_date()) {
            (Some(start), Some(end)) => write!(f, "{} to {}", start, end),
            _ => write!(f, "{}", self.id),
        }
    }
}

/// Defines a specific date that can be added or removed from a [Calendar]. See <https://gtfs.org/reference/static/#calendar_datestxt>
///
/// Its service does not need a [Calendar], a service can be defined only by its added dates.
#[derive(Debug, Clone, Serialize)]
pub struct CalendarDate {
    #[serde(skip)]
    service_id: String,
    #[serde(skip)]
    date: NaiveDate,
    #[serde(flatten)]
    properties: Properties,
}

impl Entity for CalendarDate {
    const TABLE: &'static str = "calendar_dates";

    fn try_from_properties(properties: Properties) -> Result<Self, UnparsedEntity> {
        with_keys(
            properties,
            |p| Ok((key(p, "service_id")?, typed_key(p, "date")?)),
            |(service_id, date), properties| CalendarDate {
                service_id,
                date,
                properties,
            },
        )
    }

    fn properties(&self) -> &Properties {
        &self.properties
    }
}

impl TwoPartEntity for CalendarDate {
    type First = String;
    type Second = NaiveDate;
    const KEY_FIELDS: (&'static str, &'static str) = ("service_id", "date");

    fn first_key(&self) -> &String {
        &self.service_id
    }

    fn second_key(&self) -> &NaiveDate {
        &self.date
    }
}

impl CalendarDate {
    /// Identifier of the service that is modified at this date
    pub fn service_id(&self) -> &str {
        &self.service_id
    }

    pub fn date(&self) -> NaiveDate {
        self.date
    }

    /// Is the service added or deleted, `None` if the code is invalid
    pub fn exception_type(&self) -> Option<Exception> {
        self.properties.parse("exception_type")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn calendar(days: &str) -> Calendar {
        let mut row = vec![
            ("service_id", "S"),
            ("start_date", "20240101"),
            ("end_date", "20240131"),
        ];
        for (day, flag) in WEEKDAYS.iter().zip(days.split(',')) {
            row.push((*day, flag));
        }
        Calendar::from_properties(Properties::new(row)).unwrap()
    }

    #[test]
    fn weekday_mask() {
        assert_eq!(calendar("1,1,1,1,1,0,0").mask(), 31);
        assert_eq!(calendar("0,0,0,0,0,1,1").mask(), 32 + 64);
        // anything but "1" is false
        assert_eq!(calendar("yes,2,0,0,0,0,1").mask(), 64);
    }

    #[test]
    fn service_on_dates() {
        let weekdays = calendar("1,1,1,1,1,0,0");
        let monday = NaiveDate::from_ymd_opt(2024, 1, 8).unwrap();
        let saturday = NaiveDate::from_ymd_opt(2024, 1, 13).unwrap();
        let outside = NaiveDate::from_ymd_opt(2024, 2, 5).unwrap();
        assert!(weekdays.service_on(monday));
        assert!(!weekdays.service_on(saturday));
        assert!(!weekdays.service_on(outside));
        assert!(weekdays.valid_weekday(outside));
    }

    #[test]
    fn calendar_date_keys() {
        let cd = CalendarDate::from_properties(Properties::new([
            ("service_id", "S"),
            ("date", "20240115"),
            ("exception_type", "2"),
        ]))
        .unwrap();
        assert_eq!(cd.date(), NaiveDate::from_ymd_opt(2024, 1, 15).unwrap());
        assert_eq!(cd.exception_type(), Some(Exception::Deleted));

        let err = CalendarDate::from_properties(Properties::new([
            ("service_id", "S"),
            ("date", "2024-01-15"),
        ]))
        .unwrap_err();
        assert!(matches!(err, crate::error::PropertyError::InvalidType { .. }));
    }
}
