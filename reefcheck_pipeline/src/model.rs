//! Core data types for the reef survey pipeline.
//!
//! This module defines the shared domain model imported by all other modules:
//! one statically declared record type per stage boundary, the protocol
//! constants, and the pipeline error type. It contains no logic and no I/O.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

// ---------------------------------------------------------------------------
// Protocol constants
// ---------------------------------------------------------------------------

/// Points recorded along each 20 m segment of a transect.
pub const POINTS_PER_SEGMENT: u32 = 40;

/// Substrate code for hard coral.
pub const HARD_CORAL: &str = "HC";

/// Century prepended to two-digit survey years. Only valid for surveys
/// performed between 2000 and 2099.
pub const CENTURY_PREFIX: &str = "20";

/// Delimiter between the month, day and year segments of a survey date.
pub const DATE_DELIMITER: &str = "-";

pub const REGION: &str = "caribbean";
pub const METHOD: &str = "line_transect";
pub const DATA_SOURCE: &str = "reef_check";

// ---------------------------------------------------------------------------
// Pipeline stages
// ---------------------------------------------------------------------------

/// The five stages of the pipeline, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Normalize,
    SurveyAggregate,
    SiteAggregate,
    Transform,
    Convert,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stage::Normalize => write!(f, "normalize"),
            Stage::SurveyAggregate => write!(f, "survey_aggregate"),
            Stage::SiteAggregate => write!(f, "site_aggregate"),
            Stage::Transform => write!(f, "transform"),
            Stage::Convert => write!(f, "convert"),
        }
    }
}

// ---------------------------------------------------------------------------
// Input table
// ---------------------------------------------------------------------------

/// An untyped delimited table as handed over by the loader: one header row
/// and any number of data rows, every cell kept as text.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

// ---------------------------------------------------------------------------
// Stage records
// ---------------------------------------------------------------------------

/// One row of the survey file: a single substrate code on a single segment.
///
/// Field names are the canonical column labels produced by
/// `normalize::canonical_label`. Coordinate components are kept as text
/// until the Geo/Type Converter parses them.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RawObservation {
    pub reef_id: String,
    pub reef_name: String,
    pub date: String,     // month-day-two-digit-year, e.g. "01-15-18"
    pub depth: f64,       // metres
    pub segment_code: String,
    pub substrate_code: String,
    pub total: u32,       // points on this segment matching `substrate_code`
    pub latitude_degrees: String,
    pub latitude_minutes: String,
    pub latitude_seconds: String,
    pub latitude_cardinal_direction: String,
    pub longitude_degrees: String,
    pub longitude_minutes: String,
    pub longitude_seconds: String,
    pub longitude_cardinal_direction: String,
    #[serde(default)]
    pub state_province_island: Option<String>,
    #[serde(default)]
    pub city_town: Option<String>,
    #[serde(default)]
    pub errors: Option<String>,
    #[serde(default)]
    pub what_errors: Option<String>,
}

/// Grouping key for a single survey: one transect at one depth on one day.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SurveyKey {
    pub reef_id: String,
    pub date: String,
    pub depth: String, // `Display` of the f64 depth, so equal depths compare equal
    pub substrate_code: String,
}

impl fmt::Display for SurveyKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "reef_id={} date={} depth={} substrate={}",
            self.reef_id, self.date, self.depth, self.substrate_code
        )
    }
}

/// Grouping key for a site visit: one reef on one day.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SiteDayKey {
    pub reef_id: String,
    pub date: String,
}

impl fmt::Display for SiteDayKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "reef_id={} date={}", self.reef_id, self.date)
    }
}

/// A segment row enriched with the percent cover of the survey it belongs to.
///
/// Survey aggregation fans out: every segment row of a survey carries the
/// same three derived values.
#[derive(Debug, Clone, PartialEq)]
pub struct SurveyRecord {
    pub observation: RawObservation,
    pub coral_pts: u32,
    pub poss_pts: u32,
    pub perc_survey: f64,
}

impl SurveyRecord {
    pub fn site_day_key(&self) -> SiteDayKey {
        SiteDayKey {
            reef_id: self.observation.reef_id.clone(),
            date: self.observation.date.clone(),
        }
    }
}

/// One record per (reef, date) after collapsing depths and surveys.
///
/// `representative` is a single source row of the group, so every
/// non-aggregate field comes from the same observation.
#[derive(Debug, Clone, PartialEq)]
pub struct SiteRecord {
    pub representative: SurveyRecord,
    pub coral: f64,
    /// Sample standard deviation of `perc_survey`; 0.0 for a single survey.
    pub coral_std: f64,
    pub depth_m: f64,
    pub n_surveys: usize,
}

impl SiteRecord {
    pub fn key(&self) -> SiteDayKey {
        self.representative.site_day_key()
    }
}

/// Output of the Schema Transformer. Coordinates and date parts are still
/// text; the Geo/Type Converter turns them into numbers.
#[derive(Debug, Clone, PartialEq)]
pub struct ShapedRecord {
    pub reef_id: String,
    pub reef_name: String,
    pub coral: f64,
    pub coral_std: f64,
    pub depth_m: f64,
    pub n_surveys: usize,
    pub lon: String, // "<deg> <min> <sec>"
    pub lat: String,
    pub lon_d: String,
    pub lat_d: String,
    pub region: String,
    pub method: String,
    pub data_source: String,
    pub day: String,
    pub month: String,
    pub year: String, // two digits as surveyed, e.g. "18"
}

/// Final tidy row handed to the writer, one per (reef, date).
///
/// Field order is the output column order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TidyRecord {
    pub reef_id: String,
    pub reef_name: String,
    pub coral: f64,
    pub coral_std: f64,
    pub depth_m: f64,
    pub n_surveys: usize,
    pub lon: f64,
    pub lat: f64,
    pub lon_d: String,
    pub lat_d: String,
    pub region: String,
    pub method: String,
    pub data_source: String,
    pub day: u32,
    pub month: u32,
    pub year: i32,
}

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Errors raised by the transformation stages. Every error is fatal to the
/// run; `location` names the offending group key, row or field.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PipelineError {
    /// An expected column or field is absent.
    #[error("[{stage}] schema error at {location}: {message}")]
    Schema {
        stage: Stage,
        location: String,
        message: String,
    },

    /// A group cannot be aggregated, e.g. zero possible points.
    #[error("[{stage}] aggregation error for {location}: {message}")]
    Aggregation {
        stage: Stage,
        location: String,
        message: String,
    },

    /// A post-condition of the aggregation logic itself does not hold.
    #[error("[{stage}] invariant violated at {location}: {message}")]
    InvariantViolation {
        stage: Stage,
        location: String,
        message: String,
    },

    /// A coordinate string is not a valid degrees/minutes/seconds triple.
    #[error("[{stage}] unit conversion error at {location}: {message}")]
    UnitConversion {
        stage: Stage,
        location: String,
        message: String,
    },

    /// A value targeted for numeric conversion does not parse.
    #[error("[{stage}] type coercion error at {location}: {message}")]
    TypeCoercion {
        stage: Stage,
        location: String,
        message: String,
    },
}

impl PipelineError {
    pub fn stage(&self) -> Stage {
        match self {
            PipelineError::Schema { stage, .. }
            | PipelineError::Aggregation { stage, .. }
            | PipelineError::InvariantViolation { stage, .. }
            | PipelineError::UnitConversion { stage, .. }
            | PipelineError::TypeCoercion { stage, .. } => *stage,
        }
    }
}
