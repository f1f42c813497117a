//! Services, merging the weekly calendars with their exceptions
use std::collections::{BTreeSet, HashSet};

use chrono::{Duration, NaiveDate};

use crate::enums::Exception;
use crate::index::{IdIndex, KeyLookup, TwoKeyIndex};
use crate::objects::{Calendar, CalendarDate};

/// All the services of a feed
///
/// A service can be defined by a weekly [Calendar], by [CalendarDate]
/// exceptions, or both. A service with exceptions only is defined by its
/// added dates.
#[derive(Debug, Clone, Default)]
pub struct CalendarIndex {
    calendars: IdIndex<Calendar>,
    calendar_dates: TwoKeyIndex<CalendarDate>,
    service_ids: BTreeSet<String>,
}

impl CalendarIndex {
    pub fn new(calendars: IdIndex<Calendar>, calendar_dates: TwoKeyIndex<CalendarDate>) -> Self {
        let service_ids = calendars
            .ids()
            .map(str::to_owned)
            .chain(calendar_dates.first_keys().cloned())
            .collect();
        CalendarIndex {
            calendars,
            calendar_dates,
            service_ids,
        }
    }

    /// The weekly pattern of the service, if any, and all its exceptions
    ///
    /// `None` if the service is unknown.
    pub fn get(&self, service_id: &str) -> Option<(Option<&Calendar>, Vec<&CalendarDate>)> {
        if !self.service_ids.contains(service_id) {
            return None;
        }
        Some((
            self.calendars.get(service_id),
            self.calendar_dates.with_first_key(service_id),
        ))
    }

    pub fn contains(&self, service_id: &str) -> bool {
        self.service_ids.contains(service_id)
    }

    /// Every service id, from either table
    pub fn service_ids(&self) -> impl Iterator<Item = &str> {
        self.service_ids.iter().map(String::as_str)
    }

    pub fn calendars(&self) -> &IdIndex<Calendar> {
        &self.calendars
    }

    pub fn calendar_dates(&self) -> &TwoKeyIndex<CalendarDate> {
        &self.calendar_dates
    }

    pub fn len(&self) -> usize {
        self.service_ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.service_ids.is_empty()
    }

    /// Does the service run on that date
    ///
    /// An exception for the date decides, otherwise the weekly pattern does.
    /// Unknown services never run.
    pub fn runs_on(&self, service_id: &str, date: NaiveDate) -> bool {
        match self
            .calendar_dates
            .get(service_id, &date)
            .and_then(CalendarDate::exception_type)
        {
            Some(Exception::Added) => true,
            Some(Exception::Deleted) => false,
            None => self
                .calendars
                .get(service_id)
                .map_or(false, |c| c.service_on(date)),
        }
    }

    /// The days, counted from `start_date`, on which the service runs
    ///
    /// Days before `start_date` are ignored, so are the days after the last
    /// offset a `u16` can hold. The result is sorted.
    pub fn trip_days(&self, service_id: &str, start_date: NaiveDate) -> Vec<u16> {
        let mut result = Vec::new();

        // Handle services given by specific days and exceptions
        let mut removed_days = HashSet::new();
        for extra_day in self.calendar_dates.with_first_key(service_id) {
            let offset = extra_day.date().signed_duration_since(start_date).num_days();
            if offset < 0 {
                continue;
            }
            match extra_day.exception_type() {
                Some(Exception::Added) => result.extend(u16::try_from(offset).ok()),
                Some(Exception::Deleted) => {
                    removed_days.insert(offset);
                }
                None => {}
            }
        }

        if let Some(calendar) = self.calendars.get(service_id) {
            if let Some(end_date) = calendar.end_date() {
                let total_days = end_date
                    .signed_duration_since(start_date)
                    .num_days()
                    .min(i64::from(u16::MAX));
                for days_offset in 0..=total_days {
                    let current_date = start_date + Duration::days(days_offset);
                    if calendar.service_on(current_date) && !removed_days.contains(&days_offset) {
                        result.extend(u16::try_from(days_offset).ok());
                    }
                }
            }
        }

        result.sort_unstable();
        result.dedup();
        result
    }
}

impl KeyLookup for CalendarIndex {
    fn contains_key(&self, key: &str) -> bool {
        self.contains(key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::objects::{Entity, Id};
    use crate::properties::Properties;

    fn calendar(id: &str) -> Calendar {
        Calendar::from_properties(Properties::new([
            ("service_id", id),
            ("monday", "1"),
            ("tuesday", "1"),
            ("wednesday", "1"),
            ("thursday", "1"),
            ("friday", "1"),
            ("saturday", "0"),
            ("sunday", "0"),
            ("start_date", "20240101"),
            ("end_date", "20240114"),
        ]))
        .unwrap()
    }

    fn exception(id: &str, date: &str, kind: &str) -> CalendarDate {
        CalendarDate::from_properties(Properties::new([
            ("service_id", id),
            ("date", date),
            ("exception_type", kind),
        ]))
        .unwrap()
    }

    fn services() -> CalendarIndex {
        CalendarIndex::new(
            IdIndex::from_entities(vec![calendar("A"), calendar("B")]).unwrap(),
            TwoKeyIndex::from_entities(vec![
                exception("B", "20240102", "2"),
                exception("B", "20240106", "1"),
                exception("C", "20240107", "1"),
            ])
            .unwrap(),
        )
    }

    fn date(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, d).unwrap()
    }

    #[test]
    fn service_id_universe_is_the_union() {
        let services = services();
        assert_eq!(services.service_ids().collect::<Vec<_>>(), vec!["A", "B", "C"]);
        assert_eq!(services.len(), 3);
        assert!(!services.contains("D"));
        assert!(services.get("D").is_none());
    }

    #[test]
    fn lookup_pairs_pattern_and_exceptions() {
        let services = services();
        let (pattern, exceptions) = services.get("A").unwrap();
        assert_eq!(pattern.map(|c| c.id()), Some("A"));
        assert!(exceptions.is_empty());

        let (pattern, exceptions) = services.get("C").unwrap();
        assert!(pattern.is_none());
        assert_eq!(exceptions.len(), 1);
        assert_eq!(exceptions[0].date(), date(7));

        let (pattern, exceptions) = services.get("B").unwrap();
        assert!(pattern.is_some());
        assert_eq!(exceptions.len(), 2);
    }

    #[test]
    fn exceptions_override_the_pattern() {
        let services = services();
        assert!(services.runs_on("A", date(2)));
        assert!(!services.runs_on("B", date(2)));
        assert!(services.runs_on("B", date(6)));
        assert!(!services.runs_on("A", date(6)));
        assert!(services.runs_on("C", date(7)));
        assert!(!services.runs_on("C", date(8)));
        assert!(!services.runs_on("D", date(2)));
    }

    #[test]
    fn trip_days_from_start() {
        let services = services();
        // 2024-01-01 is a monday
        assert_eq!(services.trip_days("A", date(1)), vec![0, 1, 2, 3, 4, 7, 8, 9, 10, 11]);
        assert_eq!(services.trip_days("B", date(1)), vec![0, 2, 3, 4, 5, 7, 8, 9, 10, 11]);
        assert_eq!(services.trip_days("C", date(3)), vec![4]);
        assert_eq!(services.trip_days("C", date(8)), Vec::<u16>::new());
    }

    #[test]
    fn trip_days_stop_at_the_last_offset() {
        let mut every_day: Vec<(&str, &str)> = crate::objects::WEEKDAYS
            .iter()
            .map(|day| (*day, "1"))
            .collect();
        every_day.extend([
            ("service_id", "E"),
            ("start_date", "20240101"),
            ("end_date", "29991231"),
        ]);
        let calendar = Calendar::from_properties(Properties::new(every_day)).unwrap();
        let services = CalendarIndex::new(
            IdIndex::from_entities(vec![calendar]).unwrap(),
            TwoKeyIndex::default(),
        );
        let days = services.trip_days("E", date(1));
        assert_eq!(days.len(), usize::from(u16::MAX) + 1);
        assert_eq!(days.last(), Some(&u16::MAX));
    }
}
