//! Week Export
//!
//! Builds the downloadable export document: every stored week as entered,
//! each with a `computedValues` block taken from the aggregation rows and
//! rounded to one decimal. Also renders the history table as CSV.

use crate::analytics::{build_week_history_rows, round_half_up, WeekHistoryRow};
use crate::weeks::types::json_number;
use crate::weeks::{FitnessWeek, Weekday};
use chrono::{DateTime, SecondsFormat, TimeZone, Utc};
use serde::Serialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::info;

/// Key of the computed block on each exported week
pub const COMPUTED_VALUES_KEY: &str = "computedValues";

/// Export errors
#[derive(Error, Debug)]
pub enum ExportError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("CSV output is not valid UTF-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),
}

pub type ExportResult<T> = Result<T, ExportError>;

/// Aggregated values attached to an exported week
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ComputedWeekValues {
    #[serde(serialize_with = "json_number::serialize")]
    pub avg_weight_kg: Option<f64>,
    #[serde(serialize_with = "json_number::serialize")]
    pub avg_weight_delta_kg: Option<f64>,
    #[serde(serialize_with = "json_number::serialize")]
    pub avg_calories: Option<f64>,
    #[serde(serialize_with = "json_number::serialize")]
    pub avg_protein_g: Option<f64>,
}

impl From<&WeekHistoryRow> for ComputedWeekValues {
    fn from(row: &WeekHistoryRow) -> Self {
        Self {
            avg_weight_kg: round_to_one_decimal(row.avg_weight_kg),
            avg_weight_delta_kg: round_to_one_decimal(row.avg_weight_delta_kg),
            avg_calories: round_to_one_decimal(row.avg_calories),
            avg_protein_g: round_to_one_decimal(row.avg_protein_g),
        }
    }
}

/// A stored week with its computed block
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExportedWeek {
    #[serde(flatten)]
    pub week: FitnessWeek,
    #[serde(rename = "computedValues")]
    pub computed_values: ComputedWeekValues,
}

/// The export document
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WeekExportPayload {
    /// Generation time, `YYYY-MM-DDTHH:MM:SS.sssZ`
    pub generated_at: String,
    /// Weeks in stored order
    pub weeks: Vec<ExportedWeek>,
}

/// Round to one decimal, half up; `None` stays `None`
pub fn round_to_one_decimal(value: Option<f64>) -> Option<f64> {
    value.map(|v| round_half_up(v, 1))
}

/// Build the export document for `weeks` as of `now`
pub fn create_week_export_payload<Tz: TimeZone>(
    weeks: &[FitnessWeek],
    now: &DateTime<Tz>,
) -> WeekExportPayload {
    let computed: HashMap<String, ComputedWeekValues> = build_week_history_rows(weeks)
        .iter()
        .map(|row| (row.id.clone(), ComputedWeekValues::from(row)))
        .collect();

    let weeks = weeks
        .iter()
        .map(|week| {
            let mut week = week.clone();
            week.extra.remove(COMPUTED_VALUES_KEY);
            let computed_values = computed.get(&week.id).copied().unwrap_or_default();
            ExportedWeek {
                week,
                computed_values,
            }
        })
        .collect();

    WeekExportPayload {
        generated_at: now
            .with_timezone(&Utc)
            .to_rfc3339_opts(SecondsFormat::Millis, true),
        weeks,
    }
}

/// Serialize the document as 2-space indented JSON
pub fn serialize_week_export(payload: &WeekExportPayload) -> ExportResult<String> {
    Ok(serde_json::to_string_pretty(payload)?)
}

/// `fitness-dashboard-weeks-YYYY-MM-DD.json`, using the calendar date of `now`
/// in its own timezone
pub fn week_export_filename<Tz: TimeZone>(now: &DateTime<Tz>) -> String {
    format!(
        "fitness-dashboard-weeks-{}.json",
        now.date_naive().format("%Y-%m-%d")
    )
}

/// Write the export document into `dir` and return the file path
pub async fn write_week_export<Tz: TimeZone>(
    dir: &Path,
    weeks: &[FitnessWeek],
    now: &DateTime<Tz>,
) -> ExportResult<PathBuf> {
    let payload = create_week_export_payload(weeks, now);
    let json = serialize_week_export(&payload)?;

    tokio::fs::create_dir_all(dir).await?;
    let path = dir.join(week_export_filename(now));
    tokio::fs::write(&path, json).await?;

    info!(path = %path.display(), weeks = payload.weeks.len(), "Wrote week export");
    Ok(path)
}

fn csv_cell(value: Option<f64>) -> String {
    round_to_one_decimal(value)
        .map(|v| v.to_string())
        .unwrap_or_default()
}

/// Render history rows as CSV, one line per week in row order
pub fn format_history_csv(rows: &[WeekHistoryRow]) -> ExportResult<String> {
    let mut writer = csv::Writer::from_writer(Vec::new());

    let mut header = vec![
        "weekOf".to_string(),
        "avgWeightKg".to_string(),
        "avgWeightDeltaKg".to_string(),
        "avgCalories".to_string(),
        "avgProteinG".to_string(),
    ];
    header.extend(Weekday::ALL.iter().map(|day| format!("{}WeightKg", day.key())));
    writer.write_record(&header)?;

    for row in rows {
        let mut record = vec![
            row.week_of.clone(),
            csv_cell(row.avg_weight_kg),
            csv_cell(row.avg_weight_delta_kg),
            csv_cell(row.avg_calories),
            csv_cell(row.avg_protein_g),
        ];
        record.extend(row.daily_weights.iter().map(|w| csv_cell(*w)));
        writer.write_record(&record)?;
    }

    let bytes = writer.into_inner().map_err(|e| ExportError::Io(e.into_error()))?;
    Ok(String::from_utf8(bytes)?)
}
