//! Reef Check survey export reader and tidy table writer.
//!
//! The reader does no interpretation: it returns every cell as text in a
//! `RawTable` and leaves column naming to `normalize`. The writer emits
//! `TidyRecord`s in the fixed output column order.

use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;

use csv::{ReaderBuilder, WriterBuilder};
use thiserror::Error;

use crate::model::{RawTable, TidyRecord};

/// Output columns, in the order `TidyRecord` serializes them.
pub const TIDY_COLUMNS: [&str; 16] = [
    "reef_id",
    "reef_name",
    "coral",
    "coral_std",
    "depth_m",
    "n_surveys",
    "lon",
    "lat",
    "lon_d",
    "lat_d",
    "region",
    "method",
    "data_source",
    "day",
    "month",
    "year",
];

#[derive(Error, Debug)]
pub enum IngestError {
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("input has no header row")]
    MissingHeader,

    #[error("row {row} has {found} fields, header has {expected}")]
    RaggedRow {
        row: usize,
        expected: usize,
        found: usize,
    },
}

// ============================================================================
// Reading
// ============================================================================

/// Read a delimited survey export. The first record is the header.
///
/// Row numbers in errors are 1-based data rows (the header is not counted).
pub fn read_raw_table<R: Read>(reader: R) -> Result<RawTable, IngestError> {
    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(reader);

    let headers: Vec<String> = rdr.headers()?.iter().map(str::to_string).collect();
    if headers.is_empty() || headers.iter().all(|h| h.trim().is_empty()) {
        return Err(IngestError::MissingHeader);
    }

    let mut rows = Vec::new();
    for (i, record) in rdr.records().enumerate() {
        let record = record?;
        if record.len() != headers.len() {
            return Err(IngestError::RaggedRow {
                row: i + 1,
                expected: headers.len(),
                found: record.len(),
            });
        }
        rows.push(record.iter().map(str::to_string).collect());
    }

    Ok(RawTable { headers, rows })
}

pub fn read_raw_table_from_path<P: AsRef<Path>>(path: P) -> Result<RawTable, IngestError> {
    let file = File::open(path)?;
    read_raw_table(file)
}

// ============================================================================
// Writing
// ============================================================================

/// Write the tidy table, header first. An empty table still gets a header.
pub fn write_tidy_table<W: Write>(writer: W, rows: &[TidyRecord]) -> Result<(), IngestError> {
    let mut wtr = WriterBuilder::new().has_headers(false).from_writer(writer);

    wtr.write_record(TIDY_COLUMNS)?;
    for row in rows {
        wtr.serialize(row)?;
    }
    wtr.flush()?;
    Ok(())
}

pub fn write_tidy_table_to_path<P: AsRef<Path>>(
    path: P,
    rows: &[TidyRecord],
) -> Result<(), IngestError> {
    let file = File::create(path)?;
    write_tidy_table(file, rows)
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn tidy_row() -> TidyRecord {
        TidyRecord {
            reef_id: "100".to_string(),
            reef_name: "Long Reef".to_string(),
            coral: 20.0,
            coral_std: 3.54,
            depth_m: 7.5,
            n_surveys: 2,
            lon: -64.7,
            lat: 18.425,
            lon_d: "W".to_string(),
            lat_d: "N".to_string(),
            region: "caribbean".to_string(),
            method: "line_transect".to_string(),
            data_source: "reef_check".to_string(),
            day: 15,
            month: 1,
            year: 2018,
        }
    }

    #[test]
    fn test_read_keeps_headers_verbatim() {
        let table = read_raw_table("Reef ID,Substrate Code\n100,HC\n".as_bytes())
            .expect("valid csv should read");
        assert_eq!(table.headers, vec!["Reef ID", "Substrate Code"]);
        assert_eq!(table.rows, vec![vec!["100".to_string(), "HC".to_string()]]);
    }

    #[test]
    fn test_read_rejects_ragged_rows() {
        let result = read_raw_table("a,b,c\n1,2,3\n4,5\n".as_bytes());
        match result {
            Err(IngestError::RaggedRow { row, expected, found }) => {
                assert_eq!(row, 2);
                assert_eq!(expected, 3);
                assert_eq!(found, 2);
            }
            other => panic!("expected RaggedRow, got {:?}", other),
        }
    }

    #[test]
    fn test_read_empty_input_has_no_header() {
        let result = read_raw_table("".as_bytes());
        assert!(matches!(result, Err(IngestError::MissingHeader)));
    }

    #[test]
    fn test_write_empty_table_still_writes_header() {
        let mut out = Vec::new();
        write_tidy_table(&mut out, &[]).expect("write should succeed");
        let text = String::from_utf8(out).expect("utf8");
        assert_eq!(text.trim_end(), TIDY_COLUMNS.join(","));
    }

    #[test]
    fn test_write_uses_output_column_order() {
        let mut out = Vec::new();
        write_tidy_table(&mut out, &[tidy_row()]).expect("write should succeed");
        let text = String::from_utf8(out).expect("utf8");
        let mut lines = text.lines();
        assert_eq!(lines.next(), Some(TIDY_COLUMNS.join(",").as_str()));
        assert_eq!(
            lines.next(),
            Some("100,Long Reef,20.0,3.54,7.5,2,-64.7,18.425,W,N,caribbean,line_transect,reef_check,15,1,2018")
        );
        assert_eq!(lines.next(), None);
    }
}
