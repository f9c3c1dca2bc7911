//! Reef Check survey pipeline.
//!
//! Turns per-segment reef survey observations into a tidy, geocoded,
//! site-level table: normalize → survey aggregate → site aggregate →
//! transform → convert.

pub mod analysis;
pub mod config;
pub mod convert;
pub mod ingest;
pub mod logging;
pub mod model;
pub mod normalize;
pub mod pipeline;
pub mod transform;
pub mod verify;

pub use config::{PipelineConfig, SignPolicy, load_config};
pub use model::{PipelineError, RawTable, Stage, TidyRecord};
pub use pipeline::{PipelineOutput, RunSummary, run};
