//! Source reader for the flat job-postings CSV.
//!
//! [`CsvSource`] only remembers where the data lives. Each call to
//! [`CsvSource::records`] opens a fresh reader, so the dimension loaders and
//! the fact resolver can each stream the whole file independently.

use std::{
  fs::File,
  io::{BufReader, Cursor, Read},
  path::{Path, PathBuf},
};

use jobmart_core::record::SourceRecord;

use crate::{Error, Result};

#[derive(Debug, Clone)]
enum Input {
  Path(PathBuf),
  Bytes(Vec<u8>),
}

/// A headered CSV file (or in-memory CSV text).
#[derive(Debug, Clone)]
pub struct CsvSource {
  input: Input,
}

impl CsvSource {
  pub fn from_path(path: impl AsRef<Path>) -> Self {
    Self { input: Input::Path(path.as_ref().to_path_buf()) }
  }

  pub fn from_text(text: impl Into<String>) -> Self {
    Self::from_bytes(text.into().into_bytes())
  }

  /// Raw CSV bytes. Rows that are not valid UTF-8 surface as
  /// [`Error::UnreadableRow`].
  pub fn from_bytes(bytes: impl Into<Vec<u8>>) -> Self {
    Self { input: Input::Bytes(bytes.into()) }
  }

  /// Human-readable description, used in logs.
  pub fn describe(&self) -> String {
    match &self.input {
      Input::Path(p) => p.display().to_string(),
      Input::Bytes(_) => "<in-memory>".to_owned(),
    }
  }

  /// Stream the records from the start of the source.
  pub fn records(&self) -> Result<Records> {
    let inner: Box<dyn Read + Send> = match &self.input {
      Input::Path(p) => {
        let file = File::open(p).map_err(csv::Error::from)?;
        Box::new(BufReader::new(file))
      }
      Input::Bytes(b) => Box::new(Cursor::new(b.clone())),
    };

    // Ragged rows surface as missing fields on the record, so they go through
    // the malformed-record policy rather than failing the read.
    let mut reader = csv::ReaderBuilder::new()
      .has_headers(true)
      .flexible(true)
      .from_reader(inner);
    let headers = reader.headers()?.clone();

    Ok(Records { reader, headers })
  }
}

/// Iterator over the data lines of a [`CsvSource`].
pub struct Records {
  reader:  csv::Reader<Box<dyn Read + Send>>,
  headers: csv::StringRecord,
}

impl Iterator for Records {
  type Item = Result<SourceRecord>;

  fn next(&mut self) -> Option<Self::Item> {
    let mut row = csv::StringRecord::new();
    match self.reader.read_record(&mut row) {
      Ok(false) => None,
      Ok(true) => {
        let line = row.position().map_or(0, |p| p.line());
        let values = self
          .headers
          .iter()
          .zip(row.iter())
          .map(|(h, v)| (h.to_owned(), v.to_owned()))
          .collect();
        Some(Ok(SourceRecord::new(line, values)))
      }
      Err(e) if matches!(e.kind(), csv::ErrorKind::Utf8 { .. }) => {
        let line = e.position().map_or(0, |p| p.line());
        Some(Err(Error::UnreadableRow { line, source: e }))
      }
      Err(e) => Some(Err(e.into())),
    }
  }
}

#[cfg(test)]
mod tests {
  use jobmart_core::record::fields;

  use super::*;

  #[test]
  fn records_are_keyed_by_header() {
    let source = CsvSource::from_text("Job Id,Company\n1,Acme\n2,\"Initech, Inc\"\n");
    let records: Vec<_> = source.records().unwrap().collect::<Result<_>>().unwrap();

    assert_eq!(records.len(), 2);
    assert_eq!(records[0].integer(fields::JOB_ID).unwrap(), 1);
    assert_eq!(records[1].text(fields::COMPANY).unwrap(), "Initech, Inc");
    assert_eq!(records[0].line, 2);
    assert_eq!(records[1].line, 3);
  }

  #[test]
  fn each_call_restreams_from_the_start() {
    let source = CsvSource::from_text("Job Id\n1\n2\n");
    assert_eq!(source.records().unwrap().count(), 2);
    assert_eq!(source.records().unwrap().count(), 2);
  }

  #[test]
  fn short_row_reports_missing_field() {
    let source = CsvSource::from_text("Job Id,Company\n1\n");
    let record = source.records().unwrap().next().unwrap().unwrap();
    assert!(record.text(fields::COMPANY).is_err());
  }

  #[test]
  fn invalid_utf8_row_does_not_stop_the_stream() {
    let source = CsvSource::from_bytes(b"Job Id,Company\n1,Acme\n2,\xff\n3,Initech\n".to_vec());
    let records: Vec<_> = source.records().unwrap().collect();

    assert_eq!(records.len(), 3);
    assert!(records[0].is_ok());
    assert!(matches!(records[1], Err(Error::UnreadableRow { .. })));
    assert_eq!(records[2].as_ref().unwrap().text(fields::COMPANY).unwrap(), "Initech");
  }

  #[test]
  fn missing_file_is_a_source_error() {
    let source = CsvSource::from_path("/definitely/not/here.csv");
    assert!(matches!(source.records(), Err(Error::Source(_))));
  }
}
