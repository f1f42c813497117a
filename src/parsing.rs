//! Coercion of raw field values into typed values, and the assertions used by strict validation
use chrono::NaiveDate;
use chrono_tz::Tz;
use rgb::RGB8;

use crate::error::{ParseError, PropertyError};
use crate::index::KeyLookup;
use crate::properties::Properties;
use crate::time::ServiceTime;

/// A type a raw field value can be coerced into
pub trait FieldType: Sized {
    /// Name of the type, used in error messages
    const EXPECTED: &'static str;

    /// Parses the value, `None` if it is not valid
    fn try_parse(s: &str) -> Option<Self>;

    fn is_valid(s: &str) -> bool {
        Self::try_parse(s).is_some()
    }

    /// Parses the value, falling back to `default` when it is absent or invalid
    ///
    /// Fails only when there is nothing to fall back to.
    fn parse_or_default(s: Option<&str>, default: Option<Self>) -> Result<Self, ParseError> {
        match (s.and_then(Self::try_parse), default) {
            (Some(v), _) => Ok(v),
            (None, Some(d)) => Ok(d),
            (None, None) => Err(ParseError::new(s, Self::EXPECTED)),
        }
    }

    /// Parses a mandatory value, reporting which field was wrong
    fn assert_valid(s: Option<&str>, field: &str) -> Result<Self, PropertyError> {
        let s = s.ok_or_else(|| PropertyError::missing(field))?;
        Self::try_parse(s).ok_or_else(|| PropertyError::InvalidType {
            field: field.to_owned(),
            expected: Self::EXPECTED,
            value: s.to_owned(),
        })
    }
}

impl FieldType for i64 {
    const EXPECTED: &'static str = "integer";

    fn try_parse(s: &str) -> Option<Self> {
        s.parse().ok()
    }
}

impl FieldType for u32 {
    const EXPECTED: &'static str = "non-negative integer";

    fn try_parse(s: &str) -> Option<Self> {
        s.parse().ok()
    }
}

impl FieldType for f64 {
    const EXPECTED: &'static str = "decimal";

    fn try_parse(s: &str) -> Option<Self> {
        s.parse::<f64>().ok().filter(|f| f.is_finite())
    }
}

/// Only `1` is true and only `0` is false
impl FieldType for bool {
    const EXPECTED: &'static str = "boolean (0 or 1)";

    fn try_parse(s: &str) -> Option<Self> {
        match s {
            "1" => Some(true),
            "0" => Some(false),
            _ => None,
        }
    }
}

/// Six hexadecimal digits without leading `#`, in any case
impl FieldType for RGB8 {
    const EXPECTED: &'static str = "color";

    fn try_parse(s: &str) -> Option<Self> {
        if s.len() != 6 || !s.bytes().all(|b| b.is_ascii_hexdigit()) {
            return None;
        }
        let channel = |i: usize| u8::from_str_radix(&s[i..i + 2], 16).ok();
        Some(RGB8::new(channel(0)?, channel(2)?, channel(4)?))
    }
}

/// `YYYYMMDD`
impl FieldType for NaiveDate {
    const EXPECTED: &'static str = "date";

    fn try_parse(s: &str) -> Option<Self> {
        if s.len() != 8 || !s.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        NaiveDate::parse_from_str(s, "%Y%m%d").ok()
    }
}

impl FieldType for ServiceTime {
    const EXPECTED: &'static str = "time";

    fn try_parse(s: &str) -> Option<Self> {
        ServiceTime::parse(s).ok()
    }
}

/// IANA time zone name, e.g. `America/New_York`
impl FieldType for Tz {
    const EXPECTED: &'static str = "time zone";

    fn try_parse(s: &str) -> Option<Self> {
        s.parse().ok()
    }
}

/// A non-negative number of seconds
impl FieldType for chrono::Duration {
    const EXPECTED: &'static str = "duration in seconds";

    fn try_parse(s: &str) -> Option<Self> {
        s.parse::<u32>()
            .ok()
            .map(|secs| chrono::Duration::seconds(i64::from(secs)))
    }
}

fn invalid_type<T: FieldType>(field: &str, value: &str) -> PropertyError {
    PropertyError::InvalidType {
        field: field.to_owned(),
        expected: T::EXPECTED,
        value: value.to_owned(),
    }
}

/// Lists the fields of a group, e.g. `route_short_name and route_long_name`
fn describe_group(keys: &[&str]) -> String {
    keys.join(" and ")
}

/// Typed access to the fields of a row
///
/// The lenient accessors (`parse`, `parse_or`, `flag`) never fail. The `assert_*`
/// family is used by strict validation and reports the first broken rule.
impl Properties {
    /// The field coerced to `T`, `None` if absent or invalid
    pub fn parse<T: FieldType>(&self, key: &str) -> Option<T> {
        self.get(key).and_then(T::try_parse)
    }

    pub fn parse_or<T: FieldType>(&self, key: &str, default: T) -> T {
        self.parse(key).unwrap_or(default)
    }

    pub fn parse_or_default<T: FieldType>(
        &self,
        key: &str,
        default: Option<T>,
    ) -> Result<T, ParseError> {
        T::parse_or_default(self.get(key), default)
    }

    /// Is the field present and a valid `T`
    pub fn is_valid<T: FieldType>(&self, key: &str) -> bool {
        self.get(key).map_or(false, T::is_valid)
    }

    /// The field is exactly `1`
    pub fn flag(&self, key: &str) -> bool {
        self.get(key) == Some("1")
    }

    pub fn assert_exists(&self, key: &str) -> Result<&str, PropertyError> {
        self.get(key).ok_or_else(|| PropertyError::missing(key))
    }

    /// At least one field of the group is given
    pub fn assert_any_exists(&self, keys: &[&str]) -> Result<(), PropertyError> {
        if keys.iter().any(|k| self.contains_key(k)) {
            Ok(())
        } else {
            Err(PropertyError::missing(&describe_group(keys)))
        }
    }

    /// At most one field of the group is given
    pub fn assert_at_most_one(&self, keys: &[&str]) -> Result<(), PropertyError> {
        let given: Vec<&str> = keys
            .iter()
            .copied()
            .filter(|k| self.contains_key(k))
            .collect();
        if given.len() > 1 {
            Err(PropertyError::conflict(
                &describe_group(&given),
                "these fields are mutually exclusive",
            ))
        } else {
            Ok(())
        }
    }

    pub fn assert_absent(&self, key: &str, reason: &str) -> Result<(), PropertyError> {
        if self.contains_key(key) {
            Err(PropertyError::conflict(key, reason))
        } else {
            Ok(())
        }
    }

    pub fn assert_valid<T: FieldType>(&self, key: &str) -> Result<T, PropertyError> {
        T::assert_valid(self.get(key), key)
    }

    /// Absence is accepted, an invalid value is not
    pub fn assert_optional<T: FieldType>(&self, key: &str) -> Result<Option<T>, PropertyError> {
        self.get(key)
            .map(|v| T::try_parse(v).ok_or_else(|| invalid_type::<T>(key, v)))
            .transpose()
    }

    pub fn assert_non_negative_int(&self, key: &str) -> Result<i64, PropertyError> {
        let v: i64 = self.assert_valid(key)?;
        if v < 0 {
            return Err(PropertyError::out_of_range(key, "must not be negative"));
        }
        Ok(v)
    }

    pub fn assert_optional_non_negative_int(&self, key: &str) -> Result<Option<i64>, PropertyError> {
        if self.contains_key(key) {
            self.assert_non_negative_int(key).map(Some)
        } else {
            Ok(None)
        }
    }

    pub fn assert_positive_int(&self, key: &str) -> Result<i64, PropertyError> {
        let v: i64 = self.assert_valid(key)?;
        if v <= 0 {
            return Err(PropertyError::out_of_range(key, "must be positive"));
        }
        Ok(v)
    }

    pub fn assert_optional_positive_int(&self, key: &str) -> Result<Option<i64>, PropertyError> {
        if self.contains_key(key) {
            self.assert_positive_int(key).map(Some)
        } else {
            Ok(None)
        }
    }

    pub fn assert_non_negative_decimal(&self, key: &str) -> Result<f64, PropertyError> {
        let v: f64 = self.assert_valid(key)?;
        if v < 0.0 {
            return Err(PropertyError::out_of_range(key, "must not be negative"));
        }
        Ok(v)
    }

    pub fn assert_optional_non_negative_decimal(
        &self,
        key: &str,
    ) -> Result<Option<f64>, PropertyError> {
        if self.contains_key(key) {
            self.assert_non_negative_decimal(key).map(Some)
        } else {
            Ok(None)
        }
    }

    /// A decimal within `[min, max]`
    pub fn assert_decimal_in_range(
        &self,
        key: &str,
        min: f64,
        max: f64,
    ) -> Result<f64, PropertyError> {
        let v: f64 = self.assert_valid(key)?;
        if v < min || v > max {
            return Err(PropertyError::out_of_range(
                key,
                format!("{} is not within [{}, {}]", v, min, max),
            ));
        }
        Ok(v)
    }

    pub fn assert_optional_decimal_in_range(
        &self,
        key: &str,
        min: f64,
        max: f64,
    ) -> Result<Option<f64>, PropertyError> {
        if self.contains_key(key) {
            self.assert_decimal_in_range(key, min, max).map(Some)
        } else {
            Ok(None)
        }
    }

    /// An integer code among `allowed`
    pub fn assert_enum(&self, key: &str, allowed: &[i64]) -> Result<i64, PropertyError> {
        let v: i64 = self.assert_valid(key)?;
        if allowed.contains(&v) {
            Ok(v)
        } else {
            Err(PropertyError::InvalidEnumValue {
                field: key.to_owned(),
                value: v.to_string(),
            })
        }
    }

    pub fn assert_optional_enum(
        &self,
        key: &str,
        allowed: &[i64],
    ) -> Result<Option<i64>, PropertyError> {
        if self.contains_key(key) {
            self.assert_enum(key, allowed).map(Some)
        } else {
            Ok(None)
        }
    }

    /// The field is given and names an entity of `table`
    pub fn assert_foreign_key<L: KeyLookup + ?Sized>(
        &self,
        key: &str,
        lookup: &L,
        table: &'static str,
    ) -> Result<&str, PropertyError> {
        let value = self.assert_exists(key)?;
        if lookup.contains_key(value) {
            Ok(value)
        } else {
            Err(PropertyError::DanglingForeignKey {
                field: key.to_owned(),
                table,
                value: value.to_owned(),
            })
        }
    }

    pub fn assert_optional_foreign_key<L: KeyLookup + ?Sized>(
        &self,
        key: &str,
        lookup: &L,
        table: &'static str,
    ) -> Result<Option<&str>, PropertyError> {
        if self.contains_key(key) {
            self.assert_foreign_key(key, lookup, table).map(Some)
        } else {
            Ok(None)
        }
    }
}
