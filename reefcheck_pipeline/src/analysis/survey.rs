//! Survey Aggregator: percent cover of one substrate code per survey.
//!
//! A survey is one transect at one depth on one day, recorded as up to four
//! 20 m segments with a fixed number of points each. Percent cover is the
//! share of all possible points that landed on the target substrate.

use std::collections::HashSet;

use super::groupings::group_by;
use crate::model::{PipelineError, RawObservation, Stage, SurveyKey, SurveyRecord};

/// Derived values shared by every row of a survey.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SurveyCover {
    pub coral_pts: u32,
    pub poss_pts: u32,
    pub perc_survey: f64,
}

/// Grouping key of the survey a row belongs to. `-0` and `0` depths share
/// a key.
pub fn survey_key(obs: &RawObservation) -> SurveyKey {
    SurveyKey {
        reef_id: obs.reef_id.clone(),
        date: obs.date.clone(),
        depth: (obs.depth + 0.0).to_string(),
        substrate_code: obs.substrate_code.clone(),
    }
}

/// Compute the cover values for the rows of one survey.
///
/// `poss_pts` counts distinct segment codes, so a segment listed twice is
/// still one segment. A survey with no segments, or whose point counts
/// overflow, is an aggregation error.
pub fn survey_cover(
    key: &SurveyKey,
    rows: &[RawObservation],
    points_per_segment: u32,
) -> Result<SurveyCover, PipelineError> {
    let overflow = |what: &str| PipelineError::Aggregation {
        stage: Stage::SurveyAggregate,
        location: key.to_string(),
        message: format!("{} overflows a 32-bit point count", what),
    };

    let segments: HashSet<&str> = rows.iter().map(|r| r.segment_code.as_str()).collect();
    let poss_pts = u32::try_from(segments.len())
        .ok()
        .and_then(|n| n.checked_mul(points_per_segment))
        .ok_or_else(|| overflow("possible points"))?;

    if poss_pts == 0 {
        return Err(PipelineError::Aggregation {
            stage: Stage::SurveyAggregate,
            location: key.to_string(),
            message: "survey has zero possible points (no segments)".to_string(),
        });
    }

    let coral_pts = rows
        .iter()
        .try_fold(0u32, |sum, r| sum.checked_add(r.total))
        .ok_or_else(|| overflow("sum of totals"))?;
    let perc_survey = coral_pts as f64 / poss_pts as f64 * 100.0;

    Ok(SurveyCover {
        coral_pts,
        poss_pts,
        perc_survey,
    })
}

/// Filter to `target_substrate`, group by survey, and attach the survey's
/// cover values to each of its rows.
///
/// Row count equals the number of rows matching the target substrate.
/// Rows come out grouped by survey, surveys in first-seen order.
pub fn aggregate_surveys(
    observations: Vec<RawObservation>,
    target_substrate: &str,
    points_per_segment: u32,
) -> Result<Vec<SurveyRecord>, PipelineError> {
    let target: Vec<RawObservation> = observations
        .into_iter()
        .filter(|obs| obs.substrate_code == target_substrate)
        .collect();

    let mut records = Vec::with_capacity(target.len());
    for (key, rows) in group_by(target, survey_key) {
        let cover = survey_cover(&key, &rows, points_per_segment)?;
        records.extend(rows.into_iter().map(|observation| SurveyRecord {
            observation,
            coral_pts: cover.coral_pts,
            poss_pts: cover.poss_pts,
            perc_survey: cover.perc_survey,
        }));
    }

    Ok(records)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{HARD_CORAL, POINTS_PER_SEGMENT};
    use proptest::prelude::*;

    fn segment(depth: f64, segment_code: &str, substrate: &str, total: u32) -> RawObservation {
        RawObservation {
            reef_id: "100".to_string(),
            reef_name: "Long Reef".to_string(),
            date: "01-15-18".to_string(),
            depth,
            segment_code: segment_code.to_string(),
            substrate_code: substrate.to_string(),
            total,
            latitude_degrees: "18".to_string(),
            latitude_minutes: "25".to_string(),
            latitude_seconds: "30".to_string(),
            latitude_cardinal_direction: "N".to_string(),
            longitude_degrees: "64".to_string(),
            longitude_minutes: "42".to_string(),
            longitude_seconds: "0".to_string(),
            longitude_cardinal_direction: "W".to_string(),
            state_province_island: None,
            city_town: None,
            errors: None,
            what_errors: None,
        }
    }

    // --- Scenario A ----------------------------------------------------------

    #[test]
    fn test_four_segments_of_hard_coral() {
        let rows = vec![
            segment(5.0, "S1", "HC", 10),
            segment(5.0, "S2", "HC", 8),
            segment(5.0, "S3", "HC", 12),
            segment(5.0, "S4", "HC", 6),
        ];
        let records =
            aggregate_surveys(rows, HARD_CORAL, POINTS_PER_SEGMENT).expect("valid survey");

        assert_eq!(records.len(), 4, "aggregation fans out, it does not collapse");
        for record in &records {
            assert_eq!(record.coral_pts, 36);
            assert_eq!(record.poss_pts, 160);
            assert_eq!(record.perc_survey, 22.5);
        }
    }

    // --- Scenario E ----------------------------------------------------------

    #[test]
    fn test_survey_with_no_segments_is_aggregation_error() {
        let key = survey_key(&segment(5.0, "S1", "HC", 0));
        let result = survey_cover(&key, &[], POINTS_PER_SEGMENT);

        match result {
            Err(PipelineError::Aggregation { stage, location, .. }) => {
                assert_eq!(stage, Stage::SurveyAggregate);
                assert!(location.contains("reef_id=100"), "got: {}", location);
            }
            other => panic!("expected aggregation error, got {:?}", other),
        }
    }

    #[test]
    fn test_overflowing_totals_are_aggregation_error() {
        let rows = vec![
            segment(5.0, "S1", "HC", 4_000_000_000),
            segment(5.0, "S2", "HC", 4_000_000_000),
        ];

        match aggregate_surveys(rows, HARD_CORAL, POINTS_PER_SEGMENT) {
            Err(PipelineError::Aggregation { stage, location, message }) => {
                assert_eq!(stage, Stage::SurveyAggregate);
                assert!(location.contains("reef_id=100"), "got: {}", location);
                assert!(message.contains("totals"), "got: {}", message);
            }
            other => panic!("expected aggregation error, got {:?}", other),
        }
    }

    #[test]
    fn test_overflowing_possible_points_are_aggregation_error() {
        let rows = vec![segment(5.0, "S1", "HC", 1), segment(5.0, "S2", "HC", 1)];
        assert!(matches!(
            aggregate_surveys(rows, HARD_CORAL, u32::MAX),
            Err(PipelineError::Aggregation { .. })
        ));
    }

    // --- Filtering and grouping ----------------------------------------------

    #[test]
    fn test_other_substrates_are_filtered_out() {
        let rows = vec![
            segment(5.0, "S1", "HC", 10),
            segment(5.0, "S1", "SC", 20),
            segment(5.0, "S1", "RC", 10),
        ];
        let records = aggregate_surveys(rows, "HC", 40).expect("valid survey");
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].observation.substrate_code, "HC");
        assert_eq!(records[0].perc_survey, 25.0);
    }

    #[test]
    fn test_target_substrate_is_configurable() {
        let rows = vec![segment(5.0, "S1", "HC", 10), segment(5.0, "S1", "SC", 20)];
        let records = aggregate_surveys(rows, "SC", 40).expect("valid survey");
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].perc_survey, 50.0);
    }

    #[test]
    fn test_depths_form_separate_surveys() {
        let rows = vec![
            segment(5.0, "S1", "HC", 10),
            segment(10.0, "S1", "HC", 4),
            segment(5.0, "S2", "HC", 10),
        ];
        let records = aggregate_surveys(rows, "HC", 40).expect("valid surveys");

        // Grouped: both 5 m rows first, then the 10 m row.
        assert_eq!(records[0].observation.depth, 5.0);
        assert_eq!(records[1].observation.depth, 5.0);
        assert_eq!(records[2].observation.depth, 10.0);
        assert_eq!(records[0].poss_pts, 80);
        assert_eq!(records[0].perc_survey, 25.0);
        assert_eq!(records[2].poss_pts, 40);
        assert_eq!(records[2].perc_survey, 10.0);
    }

    #[test]
    fn test_negative_zero_depth_joins_zero_depth_survey() {
        let rows = vec![segment(0.0, "S1", "HC", 10), segment(-0.0, "S2", "HC", 10)];
        assert_eq!(survey_key(&rows[0]), survey_key(&rows[1]));

        let records = aggregate_surveys(rows, "HC", 40).expect("valid survey");
        assert_eq!(records[0].poss_pts, 80);
        assert_eq!(records[1].poss_pts, 80);
    }

    #[test]
    fn test_repeated_segment_code_counts_once() {
        let rows = vec![segment(5.0, "S1", "HC", 5), segment(5.0, "S1", "HC", 5)];
        let records = aggregate_surveys(rows, "HC", 40).expect("valid survey");
        assert_eq!(records[0].poss_pts, 40);
        assert_eq!(records[0].coral_pts, 10);
    }

    #[test]
    fn test_no_matching_rows_yields_empty_output() {
        let rows = vec![segment(5.0, "S1", "SC", 10)];
        let records = aggregate_surveys(rows, "HC", 40).expect("nothing to aggregate");
        assert!(records.is_empty());
    }

    // --- Properties ----------------------------------------------------------

    proptest! {
        #[test]
        fn prop_possible_points_track_segments_and_cover_is_bounded(
            totals in proptest::collection::vec(0u32..=40, 1..8)
        ) {
            let rows: Vec<RawObservation> = totals
                .iter()
                .enumerate()
                .map(|(i, t)| segment(5.0, &format!("S{}", i + 1), "HC", *t))
                .collect();
            let records = aggregate_surveys(rows, "HC", POINTS_PER_SEGMENT).unwrap();

            for record in &records {
                prop_assert_eq!(record.poss_pts, POINTS_PER_SEGMENT * totals.len() as u32);
                prop_assert!(record.perc_survey >= 0.0 && record.perc_survey <= 100.0);
            }
        }
    }
}
