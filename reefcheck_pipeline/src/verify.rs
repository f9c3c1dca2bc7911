//! Invariant checks on aggregation output.
//!
//! These are correctness checks on the aggregation logic itself, not input
//! validation: a failure here means a stage produced output it should never
//! produce, and the run is abandoned.

use std::collections::HashMap;

use crate::model::{PipelineError, SiteDayKey, SiteRecord, Stage, SurveyRecord};

// ============================================================================
// Site uniqueness
// ============================================================================

/// Every (reef, date) key that appears more than once, with its count, in
/// first-seen order.
pub fn find_duplicate_site_days(sites: &[SiteRecord]) -> Vec<(SiteDayKey, usize)> {
    let mut counts: HashMap<SiteDayKey, usize> = HashMap::new();
    let mut order: Vec<SiteDayKey> = Vec::new();

    for site in sites {
        let key = site.key();
        let count = counts.entry(key.clone()).or_insert(0);
        if *count == 0 {
            order.push(key);
        }
        *count += 1;
    }

    order
        .into_iter()
        .filter_map(|key| {
            let count = counts[&key];
            (count > 1).then_some((key, count))
        })
        .collect()
}

/// Fail with an invariant violation if any (reef, date) pair repeats.
pub fn verify_unique_site_days(sites: &[SiteRecord]) -> Result<(), PipelineError> {
    let duplicates = find_duplicate_site_days(sites);
    if duplicates.is_empty() {
        return Ok(());
    }

    let listed: Vec<String> = duplicates
        .iter()
        .map(|(key, count)| format!("{} (x{})", key, count))
        .collect();

    Err(PipelineError::InvariantViolation {
        stage: Stage::SiteAggregate,
        location: duplicates[0].0.to_string(),
        message: format!(
            "{} duplicate site/day record(s): {}",
            duplicates.len(),
            listed.join(", ")
        ),
    })
}

// ============================================================================
// Survey cover bounds
// ============================================================================

/// Re-check the survey-level invariants on aggregated rows.
///
/// `poss_pts` must be a positive multiple of `points_per_segment` and
/// `perc_survey` must lie in [0, 100]. Cover above 100 means some segment
/// recorded more matching points than the protocol allows.
pub fn verify_survey_records(
    records: &[SurveyRecord],
    points_per_segment: u32,
) -> Result<(), PipelineError> {
    for (i, record) in records.iter().enumerate() {
        let location = || {
            format!(
                "row {} (reef_id={} date={} depth={})",
                i + 1,
                record.observation.reef_id,
                record.observation.date,
                record.observation.depth
            )
        };

        if record.poss_pts == 0 || record.poss_pts % points_per_segment != 0 {
            return Err(PipelineError::InvariantViolation {
                stage: Stage::SurveyAggregate,
                location: location(),
                message: format!(
                    "poss_pts {} is not a positive multiple of {}",
                    record.poss_pts, points_per_segment
                ),
            });
        }

        if !(0.0..=100.0).contains(&record.perc_survey) {
            return Err(PipelineError::InvariantViolation {
                stage: Stage::SurveyAggregate,
                location: location(),
                message: format!(
                    "perc_survey {} is outside [0, 100] ({} of {} points)",
                    record.perc_survey, record.coral_pts, record.poss_pts
                ),
            });
        }
    }

    Ok(())
}

// ============================================================================
// Tests
// ============================================================================
