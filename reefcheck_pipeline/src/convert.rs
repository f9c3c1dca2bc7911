//! Geo/Type Converter: decimal degrees, four-digit years, numeric fields.
//!
//! # Year normalization
//! Survey dates carry two-digit years. The converter prepends the configured
//! century (default `"20"`), which is only correct for surveys performed
//! between 2000 and 2099. This is not century inference: a year of `"98"`
//! becomes 2098.
//!
//! # Coordinate signs
//! Under `SignPolicy::Cardinal` southern latitudes and western longitudes
//! are negated, giving signed WGS84-style decimal degrees. `SignPolicy::Unsigned`
//! keeps every value positive and leaves `lat_d` / `lon_d` as the only record
//! of the hemisphere.

use std::str::FromStr;

use chrono::NaiveDate;

use crate::config::{PipelineConfig, SignPolicy};
use crate::model::{PipelineError, ShapedRecord, Stage, TidyRecord};

// ---------------------------------------------------------------------------
// Sexagesimal coordinates
// ---------------------------------------------------------------------------

/// Which coordinate a value belongs to; decides the valid degree range and
/// direction letters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    Latitude,
    Longitude,
}

impl Axis {
    fn max_degrees(&self) -> f64 {
        match self {
            Axis::Latitude => 90.0,
            Axis::Longitude => 180.0,
        }
    }

    fn field(&self) -> &'static str {
        match self {
            Axis::Latitude => "lat",
            Axis::Longitude => "lon",
        }
    }
}

/// An unsigned degrees/minutes/seconds triple.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Dms {
    pub degrees: f64,
    pub minutes: f64,
    pub seconds: f64,
}

impl Dms {
    /// `degrees + minutes / 60 + seconds / 3600`
    pub fn to_decimal(&self) -> f64 {
        self.degrees + self.minutes / 60.0 + self.seconds / 3600.0
    }
}

/// Split a non-negative decimal degree value back into degrees, minutes and
/// seconds. The sign of `value` is ignored.
pub fn decimal_to_dms(value: f64) -> Dms {
    let value = value.abs();
    let degrees = value.trunc();
    let minutes_total = (value - degrees) * 60.0;
    let minutes = minutes_total.trunc();
    let seconds = (minutes_total - minutes) * 60.0;
    Dms {
        degrees,
        minutes,
        seconds,
    }
}

/// Parse a merged `"<deg> <min> <sec>"` string.
///
/// Exactly three whitespace-separated numeric tokens are required. Minutes
/// and seconds must lie in [0, 60) and degrees in [0, 90] for latitude or
/// [0, 180] for longitude.
pub fn parse_dms(text: &str, axis: Axis) -> Result<Dms, String> {
    let tokens: Vec<&str> = text.split_whitespace().collect();
    let [deg, min, sec] = tokens.as_slice() else {
        return Err(format!(
            "expected 3 tokens (degrees minutes seconds), got {} in '{}'",
            tokens.len(),
            text
        ));
    };

    let number = |name: &str, token: &str| -> Result<f64, String> {
        match token.parse::<f64>() {
            Ok(v) if v.is_finite() => Ok(v),
            _ => Err(format!("{} '{}' is not a number", name, token)),
        }
    };
    let dms = Dms {
        degrees: number("degrees", deg)?,
        minutes: number("minutes", min)?,
        seconds: number("seconds", sec)?,
    };

    if !(0.0..=axis.max_degrees()).contains(&dms.degrees) {
        return Err(format!(
            "degrees {} outside [0, {}]",
            dms.degrees,
            axis.max_degrees()
        ));
    }
    if !(0.0..60.0).contains(&dms.minutes) {
        return Err(format!("minutes {} outside [0, 60)", dms.minutes));
    }
    if !(0.0..60.0).contains(&dms.seconds) {
        return Err(format!("seconds {} outside [0, 60)", dms.seconds));
    }
    if dms.to_decimal() > axis.max_degrees() {
        return Err(format!(
            "'{}' exceeds {} degrees",
            text,
            axis.max_degrees()
        ));
    }

    Ok(dms)
}

/// Sign implied by a direction letter: `-1.0` for S and W, `1.0` for N and E.
pub fn hemisphere_sign(axis: Axis, direction: &str) -> Result<f64, String> {
    match (axis, direction.trim().to_ascii_uppercase().as_str()) {
        (Axis::Latitude, "N") | (Axis::Longitude, "E") => Ok(1.0),
        (Axis::Latitude, "S") | (Axis::Longitude, "W") => Ok(-1.0),
        (_, other) => Err(format!("'{}' is not a valid {} direction", other, axis.field())),
    }
}

/// Convert a merged coordinate string to decimal degrees, signed according
/// to `policy`.
pub fn to_decimal_degrees(
    text: &str,
    direction: &str,
    axis: Axis,
    policy: SignPolicy,
) -> Result<f64, String> {
    let magnitude = parse_dms(text, axis)?.to_decimal();
    match policy {
        SignPolicy::Unsigned => Ok(magnitude),
        SignPolicy::Cardinal => Ok(hemisphere_sign(axis, direction)? * magnitude),
    }
}

// ---------------------------------------------------------------------------
// Years and numeric fields
// ---------------------------------------------------------------------------

/// Prepend `century` to a two-digit year: `"18"` becomes `"2018"`.
pub fn normalize_year(year: &str, century: &str) -> Result<String, String> {
    let year = year.trim();
    if year.len() != 2 || !year.chars().all(|c| c.is_ascii_digit()) {
        return Err(format!("expected a two-digit year, got '{}'", year));
    }
    Ok(format!("{}{}", century, year))
}

/// Parse a text field into a number, naming the row and field on failure.
pub fn coerce_number<T: FromStr>(value: &str, row: usize, field: &str) -> Result<T, PipelineError> {
    value.trim().parse::<T>().map_err(|_| PipelineError::TypeCoercion {
        stage: Stage::Convert,
        location: format!("row {} field '{}'", row, field),
        message: format!("'{}' is not a number", value),
    })
}

// ---------------------------------------------------------------------------
// Record conversion
// ---------------------------------------------------------------------------

/// Convert one shaped record. `row` is the 1-based position used in errors.
pub fn convert_record(
    shaped: ShapedRecord,
    row: usize,
    config: &PipelineConfig,
) -> Result<TidyRecord, PipelineError> {
    let coordinate = |text: &str, direction: &str, axis: Axis| {
        to_decimal_degrees(text, direction, axis, config.sign_policy).map_err(|message| {
            PipelineError::UnitConversion {
                stage: Stage::Convert,
                location: format!("row {} field '{}'", row, axis.field()),
                message,
            }
        })
    };
    let lat = coordinate(&shaped.lat, &shaped.lat_d, Axis::Latitude)?;
    let lon = coordinate(&shaped.lon, &shaped.lon_d, Axis::Longitude)?;

    let year_text =
        normalize_year(&shaped.year, &config.century_prefix).map_err(|message| {
            PipelineError::TypeCoercion {
                stage: Stage::Convert,
                location: format!("row {} field 'year'", row),
                message,
            }
        })?;
    let year: i32 = coerce_number(&year_text, row, "year")?;
    let month: u32 = coerce_number(&shaped.month, row, "month")?;
    let day: u32 = coerce_number(&shaped.day, row, "day")?;

    if NaiveDate::from_ymd_opt(year, month, day).is_none() {
        return Err(PipelineError::TypeCoercion {
            stage: Stage::Convert,
            location: format!("row {} field 'date'", row),
            message: format!("{}-{:02}-{:02} is not a calendar date", year, month, day),
        });
    }

    Ok(TidyRecord {
        reef_id: shaped.reef_id,
        reef_name: shaped.reef_name,
        coral: shaped.coral,
        coral_std: shaped.coral_std,
        depth_m: shaped.depth_m,
        n_surveys: shaped.n_surveys,
        lon,
        lat,
        lon_d: shaped.lon_d,
        lat_d: shaped.lat_d,
        region: shaped.region,
        method: shaped.method,
        data_source: shaped.data_source,
        day,
        month,
        year,
    })
}

/// Convert every shaped record, preserving order and count.
pub fn convert(
    shaped: Vec<ShapedRecord>,
    config: &PipelineConfig,
) -> Result<Vec<TidyRecord>, PipelineError> {
    shaped
        .into_iter()
        .enumerate()
        .map(|(i, record)| convert_record(record, i + 1, config))
        .collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
