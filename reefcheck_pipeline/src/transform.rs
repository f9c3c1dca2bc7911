//! Schema Transformer: reshape site records into the output layout.
//!
//! Pure column-level reshaping, one output row per input row:
//! - drops `segment_code`, `total`, `state_province_island`, `city_town`,
//!   `perc_survey`, `errors` and `what_errors` (and the point counts);
//! - merges each degrees/minutes/seconds triple into one string;
//! - renames the cardinal directions to `lat_d` / `lon_d`;
//! - adds the constant `region`, `method` and `data_source` fields;
//! - splits the date into day, month and year.

use crate::config::PipelineConfig;
use crate::model::{PipelineError, ShapedRecord, SiteRecord, Stage};

/// Space-join a degrees/minutes/seconds triple: `"<deg> <min> <sec>"`.
pub fn merge_dms(degrees: &str, minutes: &str, seconds: &str) -> String {
    format!("{} {} {}", degrees.trim(), minutes.trim(), seconds.trim())
}

/// Date parts in source order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DateParts {
    pub month: String,
    pub day: String,
    pub year: String,
}

/// Split a `month<delim>day<delim>year` date. `None` unless there are
/// exactly three non-empty segments.
pub fn split_date(date: &str, delimiter: &str) -> Option<DateParts> {
    let parts: Vec<&str> = date.trim().split(delimiter).map(str::trim).collect();
    match parts.as_slice() {
        [month, day, year] if !month.is_empty() && !day.is_empty() && !year.is_empty() => {
            Some(DateParts {
                month: month.to_string(),
                day: day.to_string(),
                year: year.to_string(),
            })
        }
        _ => None,
    }
}

fn required<'a>(row: usize, field: &str, value: &'a str) -> Result<&'a str, PipelineError> {
    let value = value.trim();
    if value.is_empty() {
        return Err(PipelineError::Schema {
            stage: Stage::Transform,
            location: format!("row {} field '{}'", row, field),
            message: "source field is missing".to_string(),
        });
    }
    Ok(value)
}

/// Reshape one site record. `row` is the 1-based position used in errors.
pub fn shape_record(
    site: SiteRecord,
    row: usize,
    config: &PipelineConfig,
) -> Result<ShapedRecord, PipelineError> {
    let obs = &site.representative.observation;

    let lat = merge_dms(
        required(row, "latitude_degrees", &obs.latitude_degrees)?,
        required(row, "latitude_minutes", &obs.latitude_minutes)?,
        required(row, "latitude_seconds", &obs.latitude_seconds)?,
    );
    let lon = merge_dms(
        required(row, "longitude_degrees", &obs.longitude_degrees)?,
        required(row, "longitude_minutes", &obs.longitude_minutes)?,
        required(row, "longitude_seconds", &obs.longitude_seconds)?,
    );
    let lat_d = required(row, "latitude_cardinal_direction", &obs.latitude_cardinal_direction)?;
    let lon_d = required(
        row,
        "longitude_cardinal_direction",
        &obs.longitude_cardinal_direction,
    )?;

    let date = required(row, "date", &obs.date)?;
    let parts = split_date(date, &config.date_delimiter).ok_or_else(|| PipelineError::Schema {
        stage: Stage::Transform,
        location: format!("row {} field 'date'", row),
        message: format!(
            "'{}' does not split into month{}day{}year",
            date, config.date_delimiter, config.date_delimiter
        ),
    })?;

    Ok(ShapedRecord {
        reef_id: required(row, "reef_id", &obs.reef_id)?.to_string(),
        reef_name: obs.reef_name.trim().to_string(),
        coral: site.coral,
        coral_std: site.coral_std,
        depth_m: site.depth_m,
        n_surveys: site.n_surveys,
        lon,
        lat,
        lon_d: lon_d.to_string(),
        lat_d: lat_d.to_string(),
        region: config.region.clone(),
        method: config.method.clone(),
        data_source: config.data_source.clone(),
        day: parts.day,
        month: parts.month,
        year: parts.year,
    })
}

/// Reshape every site record, preserving order and count.
pub fn transform(
    sites: Vec<SiteRecord>,
    config: &PipelineConfig,
) -> Result<Vec<ShapedRecord>, PipelineError> {
    sites
        .into_iter()
        .enumerate()
        .map(|(i, site)| shape_record(site, i + 1, config))
        .collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{RawObservation, SurveyRecord};

    fn site_record() -> SiteRecord {
        SiteRecord {
            representative: SurveyRecord {
                observation: RawObservation {
                    reef_id: "100".to_string(),
                    reef_name: "Long Reef".to_string(),
                    date: "01-15-18".to_string(),
                    depth: 5.0,
                    segment_code: "S1".to_string(),
                    substrate_code: "HC".to_string(),
                    total: 10,
                    latitude_degrees: "18".to_string(),
                    latitude_minutes: "25".to_string(),
                    latitude_seconds: "30".to_string(),
                    latitude_cardinal_direction: "N".to_string(),
                    longitude_degrees: "64".to_string(),
                    longitude_minutes: "42".to_string(),
                    longitude_seconds: "0".to_string(),
                    longitude_cardinal_direction: "W".to_string(),
                    state_province_island: Some("St. Croix".to_string()),
                    city_town: Some("Christiansted".to_string()),
                    errors: Some("yes".to_string()),
                    what_errors: Some("slate smudged".to_string()),
                },
                coral_pts: 36,
                poss_pts: 160,
                perc_survey: 22.5,
            },
            coral: 20.0,
            coral_std: 3.54,
            depth_m: 7.5,
            n_surveys: 2,
        }
    }

    #[test]
    fn test_merge_dms_space_joins() {
        assert_eq!(merge_dms("18", "25", "30"), "18 25 30");
        assert_eq!(merge_dms(" 18", "25 ", "30.5"), "18 25 30.5");
    }

    #[test]
    fn test_split_date_month_day_year() {
        let parts = split_date("01-15-18", "-").expect("three segments");
        assert_eq!(parts.month, "01");
        assert_eq!(parts.day, "15");
        assert_eq!(parts.year, "18");

        assert!(split_date("01/15/18", "-").is_none());
        assert!(split_date("01-15", "-").is_none());
        assert!(split_date("01--18", "-").is_none());
        assert!(split_date("01/15/18", "/").is_some());
    }

    #[test]
    fn test_shape_record_reshapes_fields() {
        let shaped = shape_record(site_record(), 1, &PipelineConfig::default())
            .expect("complete record should shape");

        assert_eq!(shaped.reef_id, "100");
        assert_eq!(shaped.reef_name, "Long Reef");
        assert_eq!(shaped.coral, 20.0);
        assert_eq!(shaped.coral_std, 3.54);
        assert_eq!(shaped.depth_m, 7.5);
        assert_eq!(shaped.n_surveys, 2);
        assert_eq!(shaped.lat, "18 25 30");
        assert_eq!(shaped.lon, "64 42 0");
        assert_eq!(shaped.lat_d, "N");
        assert_eq!(shaped.lon_d, "W");
        assert_eq!(shaped.region, "caribbean");
        assert_eq!(shaped.method, "line_transect");
        assert_eq!(shaped.data_source, "reef_check");
        assert_eq!(shaped.day, "15");
        assert_eq!(shaped.month, "01");
        assert_eq!(shaped.year, "18");
    }

    #[test]
    fn test_metadata_comes_from_config() {
        let config = PipelineConfig {
            region: "pacific".to_string(),
            ..PipelineConfig::default()
        };
        let shaped = shape_record(site_record(), 1, &config).expect("should shape");
        assert_eq!(shaped.region, "pacific");
    }

    #[test]
    fn test_blank_coordinate_component_is_schema_error() {
        let mut site = site_record();
        site.representative.observation.longitude_minutes = "  ".to_string();

        match shape_record(site, 4, &PipelineConfig::default()) {
            Err(PipelineError::Schema { stage, location, .. }) => {
                assert_eq!(stage, Stage::Transform);
                assert_eq!(location, "row 4 field 'longitude_minutes'");
            }
            other => panic!("expected schema error, got {:?}", other),
        }
    }

    #[test]
    fn test_undelimited_date_is_schema_error() {
        let mut site = site_record();
        site.representative.observation.date = "20180115".to_string();
        assert!(matches!(
            shape_record(site, 1, &PipelineConfig::default()),
            Err(PipelineError::Schema { .. })
        ));
    }

    #[test]
    fn test_transform_preserves_row_count() {
        let sites = vec![site_record(), site_record(), site_record()];
        let shaped = transform(sites, &PipelineConfig::default()).expect("should shape");
        assert_eq!(shaped.len(), 3);
    }
}
