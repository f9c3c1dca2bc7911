//! Schema normalization: canonical column labels and typed observations.
//!
//! Survey exports label columns inconsistently ("Reef ID", "reef id",
//! "Latitude  Degrees"). `normalize_table` rewrites only the labels, so the
//! row count and every cell value are unchanged; `into_observations` then
//! reads each row into a `RawObservation` by canonical name.

use csv::StringRecord;

use crate::model::{PipelineError, RawObservation, RawTable, Stage};

/// Columns every survey export must provide. Descriptive columns
/// (`state_province_island`, `city_town`, `errors`, `what_errors`) are
/// optional.
pub const REQUIRED_COLUMNS: [&str; 15] = [
    "reef_id",
    "reef_name",
    "date",
    "depth",
    "segment_code",
    "substrate_code",
    "total",
    "latitude_degrees",
    "latitude_minutes",
    "latitude_seconds",
    "latitude_cardinal_direction",
    "longitude_degrees",
    "longitude_minutes",
    "longitude_seconds",
    "longitude_cardinal_direction",
];

/// A table whose labels are canonical. Cells are untouched.
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

/// Lower-case a label and join its alphanumeric runs with `_`.
///
/// `"Reef ID"` becomes `reef_id`, `" Latitude - Degrees "` becomes
/// `latitude_degrees`. A leading byte-order mark is dropped.
pub fn canonical_label(label: &str) -> String {
    label
        .trim_start_matches('\u{feff}')
        .split(|c: char| !c.is_alphanumeric())
        .filter(|part| !part.is_empty())
        .map(str::to_lowercase)
        .collect::<Vec<_>>()
        .join("_")
}

/// Canonicalize every column label and check the required columns exist.
///
/// Fails with a schema error when a required column is absent or when two
/// source labels collapse to the same canonical name.
pub fn normalize_table(table: RawTable) -> Result<NormalizedTable, PipelineError> {
    let headers: Vec<String> = table.headers.iter().map(|h| canonical_label(h)).collect();

    for (i, label) in headers.iter().enumerate() {
        if let Some(first) = headers[..i].iter().position(|h| h == label) {
            return Err(PipelineError::Schema {
                stage: Stage::Normalize,
                location: format!("column '{}'", label),
                message: format!(
                    "source columns '{}' and '{}' both normalize to the same label",
                    table.headers[first], table.headers[i]
                ),
            });
        }
    }

    let missing: Vec<&str> = REQUIRED_COLUMNS
        .iter()
        .copied()
        .filter(|required| !headers.iter().any(|h| h == required))
        .collect();
    if !missing.is_empty() {
        return Err(PipelineError::Schema {
            stage: Stage::Normalize,
            location: "header".to_string(),
            message: format!("missing required columns: {}", missing.join(", ")),
        });
    }

    Ok(NormalizedTable {
        headers,
        rows: table.rows,
    })
}

impl NormalizedTable {
    /// Index of a column by canonical label.
    pub fn column(&self, label: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == label)
    }

    /// Read every row into a typed observation.
    ///
    /// Cells are trimmed before parsing. A `depth` or `total` that is not a
    /// number, or a `depth` of NaN or infinity, is a type coercion error
    /// naming the 1-based row.
    pub fn into_observations(self) -> Result<Vec<RawObservation>, PipelineError> {
        let header = StringRecord::from(self.headers);

        self.rows
            .into_iter()
            .enumerate()
            .map(|(i, row)| {
                let mut record = StringRecord::from(row);
                record.trim();
                let obs = record
                    .deserialize::<RawObservation>(Some(&header))
                    .map_err(|e| PipelineError::TypeCoercion {
                        stage: Stage::Normalize,
                        location: format!("row {}", i + 1),
                        message: e.to_string(),
                    })?;
                if !obs.depth.is_finite() {
                    return Err(PipelineError::TypeCoercion {
                        stage: Stage::Normalize,
                        location: format!("row {}", i + 1),
                        message: format!("depth '{}' is not a finite number", obs.depth),
                    });
                }
                Ok(obs)
            })
            .collect()
    }
}

/// Normalize labels and read typed observations in one step.
pub fn normalize(table: RawTable) -> Result<Vec<RawObservation>, PipelineError> {
    normalize_table(table)?.into_observations()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
