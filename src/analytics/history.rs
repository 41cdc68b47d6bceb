//! Aggregation Engine
//!
//! Turns the unordered week list into one summary row per week, most
//! recent week first. Rows are computed in ascending `week_of` order so
//! each delta is taken against the true chronological predecessor, then
//! the list is reversed for display.

use crate::weeks::{DayMetrics, FitnessWeek};
use serde::Serialize;

/// Derived per-week summary
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WeekHistoryRow {
    pub id: String,
    pub week_of: String,
    /// Mean of the logged daily weights, `None` if no day has one
    pub avg_weight_kg: Option<f64>,
    /// Change against the previous row's average weight
    pub avg_weight_delta_kg: Option<f64>,
    /// Daily weights `mon..sun`, `None` for unlogged days
    pub daily_weights: [Option<f64>; 7],
    pub avg_calories: Option<f64>,
    pub avg_protein_g: Option<f64>,
    /// Daily calories `mon..sun`, `0` for unlogged days
    pub daily_calories: [f64; 7],
}

/// Weeks sorted ascending by `week_of`
///
/// `week_of` is fixed-width ISO (`YYYY-MM-DD`), so string order is date
/// order. The sort is stable: weeks sharing a `week_of` keep input order.
pub fn sort_chronologically(weeks: &[FitnessWeek]) -> Vec<&FitnessWeek> {
    let mut sorted: Vec<&FitnessWeek> = weeks.iter().collect();
    sorted.sort_by(|a, b| a.week_of.cmp(&b.week_of));
    sorted
}

/// Mean of one metric over the days that have it
pub fn average_by<F>(week: &FitnessWeek, select: F) -> Option<f64>
where
    F: Fn(&DayMetrics) -> Option<f64>,
{
    let values: Vec<f64> = week.days.values(select).into_iter().flatten().collect();
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

/// Build summary rows, most recent week first
pub fn build_week_history_rows(weeks: &[FitnessWeek]) -> Vec<WeekHistoryRow> {
    let mut previous_avg_weight: Option<f64> = None;

    let mut rows: Vec<WeekHistoryRow> = sort_chronologically(weeks)
        .into_iter()
        .map(|week| {
            let avg_weight = average_by(week, |d| d.weight_kg);
            let delta = match (avg_weight, previous_avg_weight) {
                (Some(current), Some(previous)) => Some(current - previous),
                _ => None,
            };
            previous_avg_weight = avg_weight;

            WeekHistoryRow {
                id: week.id.clone(),
                week_of: week.week_of.clone(),
                avg_weight_kg: avg_weight,
                avg_weight_delta_kg: delta,
                daily_weights: week.days.values(|d| d.weight_kg),
                avg_calories: average_by(week, |d| d.calories),
                avg_protein_g: average_by(week, |d| d.protein_g),
                daily_calories: week.days.values(|d| d.calories).map(|v| v.unwrap_or(0.0)),
            }
        })
        .collect();

    rows.reverse();
    rows
}
