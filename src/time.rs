use std::fmt;
use std::ops::Sub;
use std::str::FromStr;

use serde::ser::{Serialize, Serializer};

use crate::error::ParseError;

/// Time elapsed since midnight of the service day, in seconds
///
/// This is not a time of day: a trip leaving shortly after midnight on the
/// previous service day is written `25:10:00`. Comparing two values compares
/// elapsed durations, which keeps the ordering of stops inside a trip that
/// crosses midnight.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ServiceTime(u32);

impl ServiceTime {
    pub const MIDNIGHT: ServiceTime = ServiceTime(0);

    pub fn from_secs(secs: u32) -> Self {
        ServiceTime(secs)
    }

    pub fn from_hms(hours: u32, minutes: u32, seconds: u32) -> Option<Self> {
        if minutes >= 60 || seconds >= 60 {
            return None;
        }
        hours
            .checked_mul(3600)
            .and_then(|h| h.checked_add(minutes * 60 + seconds))
            .map(ServiceTime)
    }

    pub fn as_secs(&self) -> u32 {
        self.0
    }

    /// Hour component, may be greater than 23
    pub fn hours(&self) -> u32 {
        self.0 / 3600
    }

    pub fn minutes(&self) -> u32 {
        self.0 % 3600 / 60
    }

    pub fn seconds(&self) -> u32 {
        self.0 % 60
    }

    pub fn as_duration(&self) -> chrono::Duration {
        chrono::Duration::seconds(i64::from(self.0))
    }

    pub fn checked_add(self, secs: u32) -> Option<Self> {
        self.0.checked_add(secs).map(ServiceTime)
    }

    /// Parses `H:MM:SS`, the hour having any number of digits
    ///
    /// Surrounding whitespace is ignored. Minutes and seconds must be below 60.
    pub fn parse(s: &str) -> Result<Self, ParseError> {
        let err = || ParseError::new(Some(s), "time");
        let mut parts = s.trim().split(':');
        let (h, m, sec) = match (parts.next(), parts.next(), parts.next(), parts.next()) {
            (Some(h), Some(m), Some(sec), None) => (h, m, sec),
            _ => return Err(err()),
        };
        let digits = |p: &str, exact: Option<usize>| {
            !p.is_empty()
                && p.bytes().all(|b| b.is_ascii_digit())
                && exact.map_or(true, |n| p.len() == n)
        };
        if !digits(h, None) || !digits(m, Some(2)) || !digits(sec, Some(2)) {
            return Err(err());
        }
        let hours: u32 = h.parse().map_err(|_| err())?;
        let minutes: u32 = m.parse().map_err(|_| err())?;
        let seconds: u32 = sec.parse().map_err(|_| err())?;
        Self::from_hms(hours, minutes, seconds).ok_or_else(err)
    }
}

impl fmt::Display for ServiceTime {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "{:02}:{:02}:{:02}",
            self.hours(),
            self.minutes(),
            self.seconds()
        )
    }
}

impl FromStr for ServiceTime {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ServiceTime::parse(s)
    }
}

impl Sub for ServiceTime {
    type Output = chrono::Duration;

    fn sub(self, rhs: Self) -> Self::Output {
        chrono::Duration::seconds(i64::from(self.0) - i64::from(rhs.0))
    }
}

impl Serialize for ServiceTime {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}
