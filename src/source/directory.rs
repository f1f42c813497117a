use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

use super::{candidates, RowSource};
use crate::error::Error;

/// A feed stored as one file per table in a directory
#[derive(Debug, Clone)]
pub struct DirectorySource {
    path: PathBuf,
    files: Vec<String>,
}

impl DirectorySource {
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self, Error> {
        let path = path.as_ref().to_path_buf();
        let mut files: Vec<String> = std::fs::read_dir(&path)?
            .filter_map(|d| {
                d.ok()
                    .filter(|d| d.path().is_file())
                    .and_then(|d| d.file_name().to_str().map(|s| s.to_owned()))
            })
            .collect();
        files.sort();
        Ok(DirectorySource { path, files })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl RowSource for DirectorySource {
    fn resolve(&self, table: &str) -> Option<String> {
        candidates(table)
            .into_iter()
            .find(|name| self.files.contains(name))
    }

    fn open(&self, file_name: &str) -> Result<Box<dyn Read>, Error> {
        let file = File::open(self.path.join(file_name)).map_err(|e| Error::NamedFileIO {
            file_name: file_name.to_owned(),
            source: Box::new(e),
        })?;
        Ok(Box::new(std::io::BufReader::new(file)))
    }

    fn files(&self) -> Vec<String> {
        self.files.clone()
    }
}
