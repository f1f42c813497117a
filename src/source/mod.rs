//! Where the rows of a feed come from
//!
//! A [RowSource] resolves a table name to a CSV stream and hands out its
//! [Rows]. Table names are resolved by exact match first, then with a `.txt`
//! suffix, so both `stops` and `stops.txt` designate the same file.
//!
//! A table that is not in the source has no rows, it is not an error. The
//! reader decides which tables are required.
use std::fs::File;
use std::io::{Cursor, Read};
use std::path::Path;

use crate::error::{Error, LineError};

mod archive;
mod directory;
mod memory;

pub use archive::ZipSource;
pub use directory::DirectorySource;
pub use memory::MemorySource;

/// One row: every column of the header paired with the value of the row
pub type Row = Vec<(String, String)>;

/// A set of tables the feed can be read from
pub trait RowSource: Send + Sync {
    /// Name of the file holding `table`, `None` if the table is absent
    fn resolve(&self, table: &str) -> Option<String>;

    /// Opens a file given by [RowSource::resolve]
    fn open(&self, file_name: &str) -> Result<Box<dyn Read>, Error>;

    /// Every file of the source
    fn files(&self) -> Vec<String>;

    /// Fingerprint of the source, when it is a single archive
    fn sha256(&self) -> Option<String> {
        None
    }

    fn contains(&self, table: &str) -> bool {
        self.resolve(table).is_some()
    }

    /// The rows of a table, none if the table is absent
    ///
    /// Headers and values are trimmed.
    fn rows(&self, table: &str) -> Result<Rows, Error> {
        self.read_table(table, true)
    }

    /// Same as [RowSource::rows], choosing whether headers and values are trimmed
    fn read_table(&self, table: &str, trim: bool) -> Result<Rows, Error> {
        match self.resolve(table) {
            Some(file_name) => Rows::from_reader(self.open(&file_name)?, &file_name, trim),
            None => Ok(Rows::empty(table)),
        }
    }
}

/// The names a table can be stored under, in order of preference
pub(crate) fn candidates(table: &str) -> [String; 2] {
    [table.to_owned(), format!("{}.txt", table)]
}

/// Opens a directory or a zip archive
pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Box<dyn RowSource>, Error> {
    let p = path.as_ref();
    if p.is_file() {
        let file = File::open(p).map_err(|e| Error::NamedFileIO {
            file_name: p.display().to_string(),
            source: Box::new(e),
        })?;
        Ok(Box::new(ZipSource::from_reader(file)?))
    } else if p.is_dir() {
        Ok(Box::new(DirectorySource::new(p)?))
    } else {
        Err(Error::NotFileNorDirectory(format!("{}", p.display())))
    }
}

const BOM: [u8; 3] = [0xef, 0xbb, 0xbf];

/// The rows of one CSV file
///
/// Rows may be shorter than the header, the missing columns are then absent
/// from the [Row]. Values beyond the header are ignored.
///
/// A row with a value that is not UTF-8 is an [Error::InvalidUtf8], the
/// following rows can still be read. Any other error ends the iteration.
pub struct Rows {
    file_name: String,
    headers: Vec<String>,
    reader: Option<csv::Reader<Box<dyn Read>>>,
    record: csv::ByteRecord,
}

impl Rows {
    /// Reads the header of a CSV stream, skipping its byte order mark if any
    ///
    /// When `trim` is set, whitespace around headers and values is removed.
    pub fn from_reader<R: Read + 'static>(
        mut reader: R,
        file_name: &str,
        trim: bool,
    ) -> Result<Self, Error> {
        let mut start = Vec::with_capacity(BOM.len());
        (&mut reader)
            .take(BOM.len() as u64)
            .read_to_end(&mut start)
            .map_err(|e| Error::NamedFileIO {
                file_name: file_name.to_owned(),
                source: Box::new(e),
            })?;
        if start == BOM {
            start.clear();
        }
        let chained: Box<dyn Read> = Box::new(Cursor::new(start).chain(reader));

        let mut reader = csv::ReaderBuilder::new()
            .flexible(true)
            .trim(if trim { csv::Trim::All } else { csv::Trim::None })
            .from_reader(chained);
        let headers = reader
            .headers()
            .map_err(|e| Error::CSVError {
                file_name: file_name.to_owned(),
                source: e,
                line_in_error: None,
            })?
            .iter()
            .map(str::to_owned)
            .collect();

        Ok(Rows {
            file_name: file_name.to_owned(),
            headers,
            reader: Some(reader),
            record: csv::ByteRecord::new(),
        })
    }

    /// A table without any row
    pub fn empty(file_name: &str) -> Self {
        Rows {
            file_name: file_name.to_owned(),
            headers: Vec::new(),
            reader: None,
            record: csv::ByteRecord::new(),
        }
    }

    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    fn row(&self) -> Result<Row, Error> {
        let mut row = Vec::with_capacity(self.headers.len());
        for (header, value) in self.headers.iter().zip(self.record.iter()) {
            match std::str::from_utf8(value) {
                Ok(value) => row.push((header.clone(), value.to_owned())),
                Err(_) => return Err(self.invalid_utf8(header)),
            }
        }
        Ok(row)
    }

    fn invalid_utf8(&self, field: &str) -> Error {
        Error::InvalidUtf8 {
            file_name: self.file_name.clone(),
            field: field.to_owned(),
            line_in_error: LineError {
                headers: self.headers.clone(),
                values: self
                    .record
                    .iter()
                    .map(|v| String::from_utf8_lossy(v).into_owned())
                    .collect(),
            },
        }
    }
}

impl Iterator for Rows {
    type Item = Result<Row, Error>;

    fn next(&mut self) -> Option<Self::Item> {
        let reader = self.reader.as_mut()?;
        match reader.read_byte_record(&mut self.record) {
            Ok(true) => Some(self.row()),
            Ok(false) => {
                self.reader = None;
                None
            }
            Err(e) => {
                // the reader cannot be trusted after an error
                self.reader = None;
                Some(Err(Error::CSVError {
                    file_name: self.file_name.clone(),
                    source: e,
                    line_in_error: None,
                }))
            }
        }
    }
}

impl std::fmt::Debug for Rows {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        f.debug_struct("Rows")
            .field("file_name", &self.file_name)
            .field("headers", &self.headers)
            .finish()
    }
}
