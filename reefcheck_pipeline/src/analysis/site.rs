//! Site Aggregator: collapse surveys to one record per reef per day.
//!
//! A site visit may include surveys at several depths. The aggregates are
//! computed over the distinct surveys of the visit; the rest of the record
//! is copied from the first row seen for that visit.

use std::collections::HashSet;

use super::groupings::group_by;
use super::stats::{mean, round_to, sample_std_dev};
use super::survey::survey_key;
use crate::model::{PipelineError, SiteDayKey, SiteRecord, Stage, SurveyRecord};
use crate::verify::verify_unique_site_days;

/// Decimal places kept for `coral`, `coral_std` and `depth_m`.
pub const ROUND_PLACES: i32 = 2;

/// Aggregates for one site visit, before they are attached to a row.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SiteAggregates {
    pub coral: f64,
    pub coral_std: f64,
    pub depth_m: f64,
    pub n_surveys: usize,
}

/// Compute the site-level aggregates from the rows of one visit.
///
/// Survey rows fan out one per segment, so the rows are first reduced to
/// one `(perc_survey, depth)` pair per survey. `n_surveys` counts distinct
/// `perc_survey` values: two surveys with identical cover count once.
pub fn site_aggregates(
    key: &SiteDayKey,
    rows: &[SurveyRecord],
) -> Result<SiteAggregates, PipelineError> {
    let mut seen = HashSet::new();
    let mut percents = Vec::new();
    let mut depths = Vec::new();
    for row in rows {
        if seen.insert(survey_key(&row.observation)) {
            percents.push(row.perc_survey);
            depths.push(row.observation.depth);
        }
    }

    let (Some(coral), Some(coral_std), Some(depth_m)) =
        (mean(&percents), sample_std_dev(&percents), mean(&depths))
    else {
        return Err(PipelineError::Aggregation {
            stage: Stage::SiteAggregate,
            location: key.to_string(),
            message: "site visit has no surveys".to_string(),
        });
    };

    let n_surveys = percents
        .iter()
        .map(|p| p.to_bits())
        .collect::<HashSet<u64>>()
        .len();

    Ok(SiteAggregates {
        coral: round_to(coral, ROUND_PLACES),
        coral_std: round_to(coral_std, ROUND_PLACES),
        depth_m: round_to(depth_m, ROUND_PLACES),
        n_surveys,
    })
}

/// Group survey rows by (reef, date) and keep one record per group.
///
/// The representative row is the first row of the group in input order.
/// The output is checked for duplicate (reef, date) pairs before it is
/// returned; finding one is an invariant violation.
pub fn aggregate_sites(surveys: Vec<SurveyRecord>) -> Result<Vec<SiteRecord>, PipelineError> {
    let mut sites = Vec::new();

    for (key, rows) in group_by(surveys, SurveyRecord::site_day_key) {
        let aggregates = site_aggregates(&key, &rows)?;
        let Some(representative) = rows.into_iter().next() else {
            return Err(PipelineError::Aggregation {
                stage: Stage::SiteAggregate,
                location: key.to_string(),
                message: "site visit has no rows".to_string(),
            });
        };

        sites.push(SiteRecord {
            representative,
            coral: aggregates.coral,
            coral_std: aggregates.coral_std,
            depth_m: aggregates.depth_m,
            n_surveys: aggregates.n_surveys,
        });
    }

    verify_unique_site_days(&sites)?;
    Ok(sites)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
