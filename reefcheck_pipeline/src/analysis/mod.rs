//! Survey and site aggregation for the reef survey pipeline.
//!
//! Submodules:
//! - `groupings`: explicit group-by over a flat list of rows.
//! - `stats`: mean, sample standard deviation and rounding.
//! - `survey`: per-survey percent cover (Survey Aggregator).
//! - `site`: one record per reef per day (Site Aggregator).

pub mod groupings;
pub mod site;
pub mod stats;
pub mod survey;
