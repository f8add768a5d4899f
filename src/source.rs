use crate::error::SourceError;

use csv::{Reader, ReaderBuilder, StringRecord};
use std::fs::File;
use std::io::Read;
use std::path::Path;

/// One line of the export; any number of fields.
pub type RawRow = Vec<String>;

/// Sequential rows of an already opened bill. `Ok(None)` is a clean end of
/// stream and is distinct from a read error.
pub trait RowSource {
    fn next_row(&mut self) -> Result<Option<RawRow>, SourceError>;
}

pub struct CsvRowSource<R> {
    reader: Reader<R>,
    record: StringRecord,
}

impl<R: Read> CsvRowSource<R> {
    pub fn from_reader(rdr: R) -> Self {
        let reader = ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .trim(csv::Trim::All)
            .from_reader(rdr);

        Self {
            reader,
            record: StringRecord::new(),
        }
    }
}

impl CsvRowSource<File> {
    pub fn open(path: impl AsRef<Path>) -> Result<Self, SourceError> {
        let file = File::open(path)?;
        Ok(Self::from_reader(file))
    }
}

impl<R: Read> RowSource for CsvRowSource<R> {
    fn next_row(&mut self) -> Result<Option<RawRow>, SourceError> {
        if !self.reader.read_record(&mut self.record)? {
            return Ok(None);
        }
        Ok(Some(self.record.iter().map(str::to_string).collect()))
    }
}

/// Rows already held in memory.
pub struct MemoryRowSource {
    rows: std::vec::IntoIter<RawRow>,
}

impl MemoryRowSource {
    pub fn new(rows: Vec<RawRow>) -> Self {
        Self {
            rows: rows.into_iter(),
        }
    }
}

impl RowSource for MemoryRowSource {
    fn next_row(&mut self) -> Result<Option<RawRow>, SourceError> {
        Ok(self.rows.next())
    }
}
