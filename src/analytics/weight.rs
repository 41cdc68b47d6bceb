//! Weight Series Builder
//!
//! Expands weeks into one chart point per calendar day. Each week also
//! contributes a single average-weight marker: on Monday for past weeks,
//! and on the last logged day for the most recent week so the average
//! never extends past what has actually been recorded.

use crate::analytics::history::{average_by, sort_chronologically};
use crate::analytics::metrics::summarize;
use crate::weeks::{FitnessWeek, Weekday};
use serde::Serialize;

/// Padding applied below and above the logged weight range
pub const Y_AXIS_PADDING_KG: f64 = 5.0;

/// Daily chart series
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WeightSeries {
    /// One label per day, e.g. `"1 Dec"`
    pub labels: Vec<String>,
    /// Logged weight per day
    pub weights: Vec<Option<f64>>,
    /// Weekly average, only on each week's marker day
    pub avg_weights: Vec<Option<f64>>,
    /// Lowest logged weight minus padding; `None` without data
    pub y_axis_min: Option<f64>,
    /// Highest logged weight plus padding; `None` without data
    pub y_axis_max: Option<f64>,
}

/// Headline numbers for the weight chart
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WeightSummary {
    pub latest_weight: Option<f64>,
    pub change_percent: Option<f64>,
}

/// Last day of the week with a logged weight, scanning Sunday back to Monday
pub fn last_logged_day(week: &FitnessWeek) -> Option<Weekday> {
    Weekday::ALL
        .into_iter()
        .rev()
        .find(|&day| week.days.get(day).and_then(|d| d.weight_kg).is_some())
}

/// Day on which a week's average is plotted
pub fn marker_day(week: &FitnessWeek, is_latest: bool) -> Option<Weekday> {
    if is_latest {
        last_logged_day(week)
    } else {
        Some(Weekday::Mon)
    }
}

/// Chart label for one day, e.g. `"15 Dec"`
pub fn day_label(week: &FitnessWeek, day: Weekday) -> String {
    match week.week_start() {
        Some(start) => day.date_in_week(start).format("%-d %b").to_string(),
        None => format!("{} {}", week.week_of, day),
    }
}

/// Build the daily series across all weeks in calendar order
pub fn build_weight_series(weeks: &[FitnessWeek]) -> WeightSeries {
    let sorted = sort_chronologically(weeks);
    let day_count = sorted.len() * Weekday::ALL.len();

    let mut series = WeightSeries {
        labels: Vec::with_capacity(day_count),
        weights: Vec::with_capacity(day_count),
        avg_weights: Vec::with_capacity(day_count),
        y_axis_min: None,
        y_axis_max: None,
    };

    let last_index = sorted.len().saturating_sub(1);
    for (index, week) in sorted.iter().enumerate() {
        let week_avg = average_by(week, |d| d.weight_kg);
        let marker = marker_day(week, index == last_index);

        for (day, metrics) in week.days.iter() {
            series.labels.push(day_label(week, day));
            series.weights.push(metrics.and_then(|d| d.weight_kg));
            series
                .avg_weights
                .push(week_avg.filter(|_| marker == Some(day)));
        }
    }

    let logged = series.weights.iter().flatten().copied();
    let bounds = logged.fold(None, |acc: Option<(f64, f64)>, w| match acc {
        Some((lo, hi)) => Some((lo.min(w), hi.max(w))),
        None => Some((w, w)),
    });
    if let Some((lo, hi)) = bounds {
        series.y_axis_min = Some(lo - Y_AXIS_PADDING_KG);
        series.y_axis_max = Some(hi + Y_AXIS_PADDING_KG);
    }

    series
}

/// Latest logged weight and its change from the first logged weight
pub fn build_weight_summary(weights: &[Option<f64>]) -> WeightSummary {
    let summary = summarize(weights);
    WeightSummary {
        latest_weight: summary.latest_value,
        change_percent: summary.change_percent,
    }
}
