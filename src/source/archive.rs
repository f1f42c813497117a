use std::io::{BufReader, Cursor, Read, Seek};
use std::path::Path;
use std::sync::Mutex;

use sha2::{Digest, Sha256};

use super::{candidates, RowSource};
use crate::error::Error;

/// A feed stored as a zip archive
///
/// Entries are decompressed when their table is read. Tables may be stored
/// at the root of the archive or in a sub-folder.
pub struct ZipSource<R> {
    archive: Mutex<zip::ZipArchive<R>>,
    files: Vec<String>,
    sha256: String,
}

impl<R: Read + Seek> ZipSource<BufReader<R>> {
    /// Opens an archive, computing its SHA-256 on the way
    pub fn from_reader(reader: R) -> Result<Self, Error> {
        let mut hasher = Sha256::new();
        let mut buf_reader = BufReader::new(reader);
        let _n = std::io::copy(&mut buf_reader, &mut hasher)?;
        let hash = hasher.finalize();
        let mut archive = zip::ZipArchive::new(buf_reader)?;
        let mut files = Vec::with_capacity(archive.len());
        for i in 0..archive.len() {
            files.push(archive.by_index(i)?.name().to_owned());
        }
        Ok(ZipSource {
            archive: Mutex::new(archive),
            files,
            sha256: format!("{:x}", hash),
        })
    }
}

impl<R> ZipSource<R> {
    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}

impl<R: Read + Seek + Send> RowSource for ZipSource<R> {
    fn resolve(&self, table: &str) -> Option<String> {
        let names = candidates(table);
        names
            .iter()
            .find(|name| self.files.contains(*name))
            .cloned()
            .or_else(|| {
                self.files
                    .iter()
                    .find(|f| {
                        let file_name = Path::new(f.as_str()).file_name();
                        names.iter().any(|n| file_name == Some(std::ffi::OsStr::new(n)))
                    })
                    .cloned()
            })
    }

    fn open(&self, file_name: &str) -> Result<Box<dyn Read>, Error> {
        let mut archive = self.archive.lock().map_err(|_| Error::NamedFileIO {
            file_name: file_name.to_owned(),
            source: "the archive is not readable after a failed read".into(),
        })?;
        let mut entry = archive.by_name(file_name)?;
        let mut content = Vec::new();
        entry
            .read_to_end(&mut content)
            .map_err(|e| Error::NamedFileIO {
                file_name: file_name.to_owned(),
                source: Box::new(e),
            })?;
        Ok(Box::new(Cursor::new(content)))
    }

    fn files(&self) -> Vec<String> {
        self.files.clone()
    }

    fn sha256(&self) -> Option<String> {
        Some(self.sha256.clone())
    }
}

impl<R> std::fmt::Debug for ZipSource<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        f.debug_struct("ZipSource")
            .field("files", &self.files)
            .field("sha256", &self.sha256)
            .finish()
    }
}
