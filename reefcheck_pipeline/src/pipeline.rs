//! The five-stage batch transform, end to end.
//!
//! Each stage consumes the previous stage's output whole and materializes
//! its own before the next begins. Any error aborts the run; nothing is
//! returned for a partially processed table.

use crate::analysis::{site, survey};
use crate::config::PipelineConfig;
use crate::logging;
use crate::model::{PipelineError, RawTable, Stage, TidyRecord};
use crate::{convert, normalize, transform, verify};

/// Row counts after each stage.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub raw_rows: usize,
    pub survey_rows: usize,
    pub site_records: usize,
    pub tidy_records: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PipelineOutput {
    pub records: Vec<TidyRecord>,
    pub summary: RunSummary,
}

/// Run every stage over `table`.
pub fn run(table: RawTable, config: &PipelineConfig) -> Result<PipelineOutput, PipelineError> {
    let result = run_stages(table, config);
    if let Err(err) = &result {
        logging::log_pipeline_failure(err);
    }
    result
}

fn run_stages(table: RawTable, config: &PipelineConfig) -> Result<PipelineOutput, PipelineError> {
    let mut summary = RunSummary {
        raw_rows: table.rows.len(),
        ..RunSummary::default()
    };

    let observations = normalize::normalize(table)?;
    logging::log_stage_summary(Stage::Normalize, summary.raw_rows, observations.len());

    let surveys = survey::aggregate_surveys(
        observations,
        &config.target_substrate,
        config.points_per_segment,
    )?;
    verify::verify_survey_records(&surveys, config.points_per_segment)?;
    summary.survey_rows = surveys.len();
    logging::log_stage_summary(Stage::SurveyAggregate, summary.raw_rows, summary.survey_rows);

    let sites = site::aggregate_sites(surveys)?;
    summary.site_records = sites.len();
    logging::log_stage_summary(Stage::SiteAggregate, summary.survey_rows, summary.site_records);

    let shaped = transform::transform(sites, config)?;
    logging::log_stage_summary(Stage::Transform, summary.site_records, shaped.len());

    let mut records = convert::convert(shaped, config)?;
    summary.tidy_records = records.len();
    logging::log_stage_summary(Stage::Convert, summary.site_records, summary.tidy_records);

    if config.sort_output {
        records.sort_by(|a, b| {
            (&a.reef_id, a.year, a.month, a.day).cmp(&(&b.reef_id, b.year, b.month, b.day))
        });
        logging::debug(Stage::Convert, None, "sorted output by reef_id and date");
    }

    Ok(PipelineOutput { records, summary })
}
