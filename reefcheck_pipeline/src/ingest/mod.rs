//! Loader and writer collaborators for the survey pipeline.
//!
//! Submodules:
//! - `survey_csv`: reads the raw survey export and writes the tidy table.

pub mod survey_csv;
