//! Delimited flat-file backend.
//!
//! Reads the publication fact table and the printer → dynasty lookup from
//! two semicolon-separated files with a header row.

use std::fs::File;
use std::path::{Path, PathBuf};

use csv::{ReaderBuilder, StringRecord};

use crate::types::{Attr, PublicationRecord};
use super::{DataLoadError, DynastyLookup, RecordSource};

/// Field delimiter of the source tables.
pub const DEFAULT_DELIMITER: u8 = b';';

/// Required headers of the publication table, in [`PublicationColumns`] order.
pub const PUBLICATION_COLUMNS: [&str; 7] = [
    "id",
    "Printer",
    "publishDate",
    "author",
    "genre",
    "topic",
    "language_cs",
];

/// Required headers of the dynasty lookup table.
pub const DYNASTY_COLUMNS: [&str; 2] = ["Printer", "Dynastie"];

/// Column positions resolved from a publication header row.
#[derive(Debug, Clone, Copy)]
struct PublicationColumns {
    id: usize,
    printer: usize,
    year: usize,
    author: usize,
    genre: usize,
    topic: usize,
    language: usize,
}

/// Flat-file record source.
#[derive(Debug, Clone)]
pub struct CsvSource {
    publications: PathBuf,
    dynasties: PathBuf,
    delimiter: u8,
}

impl CsvSource {
    /// Create a source over the two table files.
    pub fn new(publications: impl Into<PathBuf>, dynasties: impl Into<PathBuf>) -> Self {
        Self {
            publications: publications.into(),
            dynasties: dynasties.into(),
            delimiter: DEFAULT_DELIMITER,
        }
    }

    /// Override the field delimiter.
    pub fn with_delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = delimiter;
        self
    }

    /// Path of the publication table.
    pub fn publications_path(&self) -> &Path {
        &self.publications
    }

    /// Path of the dynasty lookup table.
    pub fn dynasties_path(&self) -> &Path {
        &self.dynasties
    }

    fn open(&self, path: &Path) -> Result<(csv::Reader<File>, StringRecord), DataLoadError> {
        let file = File::open(path).map_err(|source| DataLoadError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        let mut reader = ReaderBuilder::new()
            .delimiter(self.delimiter)
            .has_headers(true)
            .flexible(true)
            .from_reader(file);

        let headers = reader
            .headers()
            .map_err(|source| DataLoadError::Csv {
                path: path.to_path_buf(),
                source,
            })?
            .clone();

        Ok((reader, headers))
    }
}

impl RecordSource for CsvSource {
    fn publications(&self) -> Result<Vec<PublicationRecord>, DataLoadError> {
        let path = self.publications.as_path();
        let (mut reader, headers) = self.open(path)?;

        let [id, printer, year, author, genre, topic, language] =
            column_indices(path, &headers, PUBLICATION_COLUMNS)?;
        let columns = PublicationColumns { id, printer, year, author, genre, topic, language };

        let mut records = Vec::new();
        for row in reader.records() {
            let row = row.map_err(|source| DataLoadError::Csv {
                path: path.to_path_buf(),
                source,
            })?;
            records.push(parse_publication(path, &row, columns)?);
        }

        tracing::info!(
            path = %path.display(),
            rows = records.len(),
            "Loaded publication table"
        );

        Ok(records)
    }

    fn dynasty_lookup(&self) -> Result<DynastyLookup, DataLoadError> {
        let path = self.dynasties.as_path();
        let (mut reader, headers) = self.open(path)?;

        let [printer, dynasty] = column_indices(path, &headers, DYNASTY_COLUMNS)?;

        let mut lookup = DynastyLookup::new();
        let mut conflicts = 0usize;
        for row in reader.records() {
            let row = row.map_err(|source| DataLoadError::Csv {
                path: path.to_path_buf(),
                source,
            })?;
            let name = cell(&row, printer).trim();
            if name.is_empty() {
                continue;
            }
            if !lookup.insert(name, Attr::new(cell(&row, dynasty))) {
                conflicts += 1;
            }
        }

        if conflicts > 0 {
            tracing::warn!(
                path = %path.display(),
                duplicates = conflicts,
                "Printers listed more than once in dynasty lookup; first mapping kept"
            );
        }

        tracing::info!(
            path = %path.display(),
            printers = lookup.len(),
            dynasties = lookup.dynasties().len(),
            "Loaded dynasty lookup"
        );

        Ok(lookup)
    }
}

fn parse_publication(
    path: &Path,
    row: &StringRecord,
    columns: PublicationColumns,
) -> Result<PublicationRecord, DataLoadError> {
    let raw_year = cell(row, columns.year);
    let publish_year = parse_year(raw_year).ok_or_else(|| DataLoadError::InvalidYear {
        path: path.to_path_buf(),
        line: row.position().map(|p| p.line()).unwrap_or(0),
        value: raw_year.to_string(),
    })?;

    Ok(PublicationRecord {
        id: cell(row, columns.id).trim().to_string(),
        printer: cell(row, columns.printer).trim().to_string(),
        publish_year,
        author: Attr::new(cell(row, columns.author)),
        genre: Attr::new(cell(row, columns.genre)),
        topic: Attr::new(cell(row, columns.topic)),
        language: Attr::new(cell(row, columns.language)),
        dynasty: Attr::Unset,
    })
}

/// Coerce a year cell to an integer.
///
/// Accepts plain integers and integral floats (`"1643.0"`), which is how
/// spreadsheet exports often write whole numbers.
pub fn parse_year(raw: &str) -> Option<i32> {
    let trimmed = raw.trim();
    if let Ok(year) = trimmed.parse::<i32>() {
        return Some(year);
    }
    let value = trimmed.parse::<f64>().ok()?;
    if value.is_finite() && value.fract() == 0.0 && value.abs() <= i32::MAX as f64 {
        Some(value as i32)
    } else {
        None
    }
}

fn cell(row: &StringRecord, index: usize) -> &str {
    row.get(index).unwrap_or("")
}

fn column_indices<const N: usize>(
    path: &Path,
    headers: &StringRecord,
    required: [&'static str; N],
) -> Result<[usize; N], DataLoadError> {
    let mut indices = [0usize; N];
    for (slot, column) in indices.iter_mut().zip(required) {
        *slot = headers
            .iter()
            .position(|h| h.trim().trim_start_matches('\u{feff}') == column)
            .ok_or_else(|| DataLoadError::MissingColumn {
                path: path.to_path_buf(),
                column,
            })?;
    }
    Ok(indices)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write_file(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file.flush().unwrap();
        file
    }

    const PUBLICATIONS: &str = "\
id;Printer;publishDate;author;genre;topic;language_cs
b1;Jiří Černoch;1643;Bridel;kázání;náboženství;čeština
b1;Jiří Černoch;1643;Kadlinský;kázání;náboženství;čeština
b2;Akademická tiskárna;1650.0;;modlitby;;latina
";

    const DYNASTIES: &str = "\
Printer;Dynastie
Jiří Černoch;Černochové
Akademická tiskárna;
";

    #[test]
    fn test_load_publications() {
        let pubs = write_file(PUBLICATIONS);
        let dyns = write_file(DYNASTIES);
        let source = CsvSource::new(pubs.path(), dyns.path());

        let records = source.publications().unwrap();
        assert_eq!(records.len(), 3);
        assert_eq!(records[0].author.as_str(), Some("Bridel"));
        assert_eq!(records[2].publish_year, 1650);
        assert_eq!(records[2].author, Attr::Unset);
        assert_eq!(records[2].topic, Attr::Unset);
    }

    #[test]
    fn test_load_dynasties() {
        let pubs = write_file(PUBLICATIONS);
        let dyns = write_file(DYNASTIES);
        let source = CsvSource::new(pubs.path(), dyns.path());

        let lookup = source.dynasty_lookup().unwrap();
        assert_eq!(lookup.len(), 2);
        assert_eq!(lookup.get("Jiří Černoch").as_str(), Some("Černochové"));
        assert_eq!(lookup.get("Akademická tiskárna"), Attr::Unset);
    }

    #[test]
    fn test_missing_column_is_fatal() {
        let pubs = write_file("id;Printer;publishDate;author;genre;topic\nb1;P1;1643;A;g;t\n");
        let dyns = write_file(DYNASTIES);
        let source = CsvSource::new(pubs.path(), dyns.path());

        match source.publications() {
            Err(DataLoadError::MissingColumn { column, .. }) => assert_eq!(column, "language_cs"),
            other => panic!("expected MissingColumn, got {:?}", other),
        }
    }

    #[test]
    fn test_invalid_year_is_fatal() {
        let pubs = write_file(
            "id;Printer;publishDate;author;genre;topic;language_cs\nb1;P1;circa 1643;A;g;t;latina\n",
        );
        let dyns = write_file(DYNASTIES);
        let source = CsvSource::new(pubs.path(), dyns.path());

        match source.publications() {
            Err(DataLoadError::InvalidYear { value, line, .. }) => {
                assert_eq!(value, "circa 1643");
                assert_eq!(line, 2);
            }
            other => panic!("expected InvalidYear, got {:?}", other),
        }
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let source = CsvSource::new("/nonexistent/pubs.csv", "/nonexistent/dyn.csv");
        assert!(matches!(source.publications(), Err(DataLoadError::Io { .. })));
    }

    #[test]
    fn test_parse_year() {
        assert_eq!(parse_year("1643"), Some(1643));
        assert_eq!(parse_year(" 1643 "), Some(1643));
        assert_eq!(parse_year("1643.0"), Some(1643));
        assert_eq!(parse_year("1643.5"), None);
        assert_eq!(parse_year(""), None);
        assert_eq!(parse_year("nan"), None);
    }
}
