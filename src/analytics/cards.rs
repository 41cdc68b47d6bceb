//! Overview Cards
//!
//! Headline cards for calories, protein and steps, each with a trend
//! direction and a sparkline built from the weekly series.

use crate::analytics::metrics::{MetricKind, WeeklyMetricHistory};
use crate::analytics::round_half_up;
use crate::weeks::FitnessWeek;
use chrono::NaiveDate;
use serde::Serialize;

/// Direction of a metric's change
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Trend {
    Up,
    Down,
    Neutral,
}

/// Map a percent change to a trend; a missing or zero change is neutral
pub fn to_trend(change_percent: Option<f64>) -> Trend {
    match change_percent {
        Some(change) if change > 0.0 => Trend::Up,
        Some(change) if change < 0.0 => Trend::Down,
        _ => Trend::Neutral,
    }
}

/// Sparkline points: gaps become `0`, optionally rounded
///
/// An empty series yields a single `0` point so the chart always has data.
pub fn to_chart_data(values: &[Option<f64>], decimals: Option<u32>) -> Vec<f64> {
    let data: Vec<f64> = values
        .iter()
        .map(|value| match (value, decimals) {
            (Some(v), Some(places)) => round_half_up(*v, places),
            (Some(v), None) => *v,
            (None, _) => 0.0,
        })
        .collect();

    if data.is_empty() {
        vec![0.0]
    } else {
        data
    }
}

/// Axis labels for a sparkline
///
/// ISO dates render as `"Feb 2"`, anything else passes through. When the
/// label count doesn't match the value count, positional labels `#1..#n`
/// are used instead.
pub fn to_chart_labels(labels: &[String], values: &[Option<f64>]) -> Vec<String> {
    if labels.is_empty() || labels.len() != values.len() {
        return (1..=values.len()).map(|i| format!("#{}", i)).collect();
    }

    labels
        .iter()
        .map(|label| match NaiveDate::parse_from_str(label, "%Y-%m-%d") {
            Ok(date) => date.format("%b %-d").to_string(),
            Err(_) => label.clone(),
        })
        .collect()
}

/// One overview card
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatCard {
    pub title: String,
    /// Latest value with unit, or `"--"` when nothing is logged
    pub value: String,
    pub interval: String,
    pub trend: Trend,
    pub data: Vec<f64>,
}

impl StatCard {
    fn from_history(kind: MetricKind, interval: &str, history: &WeeklyMetricHistory) -> Self {
        let value = match history.latest_value {
            Some(latest) => {
                let rounded = round_half_up(latest, 0);
                match kind.unit() {
                    "" => format!("{}", rounded),
                    unit => format!("{} {}", rounded, unit),
                }
            }
            None => "--".to_string(),
        };

        Self {
            title: kind.title().to_string(),
            value,
            interval: interval.to_string(),
            trend: to_trend(history.change_percent),
            data: to_chart_data(&history.values, None),
        }
    }
}

/// Cards shown at the top of the dashboard
pub fn overview_cards(weeks: &[FitnessWeek]) -> Vec<StatCard> {
    [
        (MetricKind::Calories, "Per week average"),
        (MetricKind::Protein, "Per week average"),
        (MetricKind::Steps, "Average steps per day"),
    ]
    .into_iter()
    .map(|(kind, interval)| StatCard::from_history(kind, interval, &kind.history(weeks)))
    .collect()
}
