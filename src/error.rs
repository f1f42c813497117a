//! Module for the error management
use thiserror::Error;

/// Specific line from a CSV file that could not be read
#[derive(Debug, Clone)]
pub struct LineError {
    /// Headers of the CSV file
    pub headers: Vec<String>,
    /// Values of the line that could not be parsed
    pub values: Vec<String>,
}

/// A raw value could not be coerced into the requested type and no default was given
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("'{input}' is not a valid {expected}")]
pub struct ParseError {
    /// The raw value, empty if the field was absent
    pub input: String,
    /// Name of the type that was expected
    pub expected: &'static str,
}

impl ParseError {
    pub(crate) fn new(input: Option<&str>, expected: &'static str) -> Self {
        Self {
            input: input.unwrap_or_default().to_owned(),
            expected,
        }
    }
}

/// Why a single row could not be turned into an entity
///
/// Every variant carries the name of the offending field. When a rule involves
/// several fields (a disjunctive group, a composite key) they are all listed.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PropertyError {
    /// A mandatory field is absent or empty
    #[error("required field `{field}` is missing")]
    MissingRequiredField {
        /// Field(s) that should have been given
        field: String,
    },
    /// The value parsed but lies outside of its allowed range
    #[error("`{field}` is out of range: {reason}")]
    OutOfRange {
        /// Offending field
        field: String,
        /// Which bound was violated
        reason: String,
    },
    /// The value cannot be parsed as the expected type
    #[error("`{field}` is not a valid {expected}: '{value}'")]
    InvalidType {
        /// Offending field
        field: String,
        /// Name of the expected type
        expected: &'static str,
        /// Raw value
        value: String,
    },
    /// The value is an integer but not one of the codes allowed for this field
    #[error("`{field}` has an invalid enumeration value '{value}'")]
    InvalidEnumValue {
        /// Offending field
        field: String,
        /// Raw value
        value: String,
    },
    /// The value references an entity that does not exist in an already loaded table
    #[error("`{field}` references '{value}' which is not present in {table}")]
    DanglingForeignKey {
        /// Offending field
        field: String,
        /// Referenced table
        table: &'static str,
        /// The key that could not be found
        value: String,
    },
    /// Fields that exclude each other are both present, or a code forbids a field
    #[error("`{field}`: {reason}")]
    StructuralConflict {
        /// Offending field
        field: String,
        /// The rule that was broken
        reason: String,
    },
    /// Another row of the same table already uses this identity key
    #[error("duplicate key for `{field}`: '{value}'")]
    DuplicateKey {
        /// Key field(s)
        field: String,
        /// Key value(s)
        value: String,
    },
}

impl PropertyError {
    /// Name of the field (or fields) involved
    pub fn field(&self) -> &str {
        match self {
            PropertyError::MissingRequiredField { field }
            | PropertyError::OutOfRange { field, .. }
            | PropertyError::InvalidType { field, .. }
            | PropertyError::InvalidEnumValue { field, .. }
            | PropertyError::DanglingForeignKey { field, .. }
            | PropertyError::StructuralConflict { field, .. }
            | PropertyError::DuplicateKey { field, .. } => field,
        }
    }

    pub(crate) fn missing(field: &str) -> Self {
        PropertyError::MissingRequiredField {
            field: field.to_owned(),
        }
    }

    pub(crate) fn out_of_range(field: &str, reason: impl Into<String>) -> Self {
        PropertyError::OutOfRange {
            field: field.to_owned(),
            reason: reason.into(),
        }
    }

    pub(crate) fn conflict(field: &str, reason: impl Into<String>) -> Self {
        PropertyError::StructuralConflict {
            field: field.to_owned(),
            reason: reason.into(),
        }
    }
}

/// An error that can occur when processing GTFS data.
#[derive(Error, Debug)]
pub enum Error {
    /// A mandatory file is not present in the feed
    #[error("Cound not find file {0}")]
    MissingFile(String),
    /// A lookup was made for an Id that is not present
    #[error("The id {0} is not known")]
    ReferenceError(String),
    /// The given path to the GTFS is neither a file nor a directory
    #[error("Could not read GTFS: {0} is neither a file nor a directory")]
    NotFileNorDirectory(String),
    /// Generic Input/Output error while reading a file
    #[error("impossible to read file")]
    IO(#[from] std::io::Error),
    /// Impossible to read a file
    #[error("impossible to read '{file_name}'")]
    NamedFileIO {
        /// The file name that could not be read
        file_name: String,
        /// The inital error that caused the unability to read the file
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    /// Impossible to read a CSV file
    #[error("impossible to read csv file '{file_name}'")]
    CSVError {
        /// File name that could not be parsed as CSV
        file_name: String,
        /// The initial error by the csv library
        #[source]
        source: csv::Error,
        /// The line that could not be parsed by the csv library
        line_in_error: Option<LineError>,
    },
    /// A value of a row is not valid UTF-8. The other rows of the file can still be read
    #[error("invalid UTF-8 in `{field}` of '{file_name}'")]
    InvalidUtf8 {
        /// File of the row
        file_name: String,
        /// First field that could not be decoded
        field: String,
        /// The row, decoded with replacement characters
        line_in_error: LineError,
    },
    /// Error when trying to unzip the GTFS archive
    #[error(transparent)]
    Zip(#[from] zip::result::ZipError),
    /// A row failed validation and no quarantine was configured
    #[error("invalid row in table '{table}'")]
    InvalidRow {
        /// Table of the row
        table: String,
        /// What was wrong with the row
        #[source]
        source: PropertyError,
    },
    /// Every agency row was rejected, so no default agency can be back-filled
    #[error("no agency could be loaded from the feed")]
    MissingDefaultAgency,
}
