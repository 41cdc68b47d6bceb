//! Metric History Builder
//!
//! Weekly series for the overview cards, always in ascending `week_of`
//! order. Fields stored on the week entity are read directly; averages
//! that only exist as aggregation output are read from history rows.

use crate::analytics::history::{build_week_history_rows, sort_chronologically, WeekHistoryRow};
use crate::weeks::{finite, FitnessWeek};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A weekly series plus its headline numbers
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WeeklyMetricHistory {
    /// `week_of` of each point, ascending
    pub labels: Vec<String>,
    pub values: Vec<Option<f64>>,
    /// Last non-null value
    pub latest_value: Option<f64>,
    /// Percent change from the first to the last non-null value
    pub change_percent: Option<f64>,
}

/// Headline numbers of a series
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricSummary {
    pub latest_value: Option<f64>,
    pub change_percent: Option<f64>,
}

/// Latest value and percent change of a series with gaps
///
/// The change is `None` when the series has no values or its first value
/// is exactly zero.
pub fn summarize(values: &[Option<f64>]) -> MetricSummary {
    let mut present = values.iter().flatten().copied();
    let first = present.next();
    let latest = present.last().or(first);

    let change_percent = match (first, latest) {
        (Some(first), Some(latest)) if first != 0.0 => Some((latest - first) / first * 100.0),
        _ => None,
    };

    MetricSummary {
        latest_value: latest,
        change_percent,
    }
}

fn into_history(labels: Vec<String>, values: Vec<Option<f64>>) -> WeeklyMetricHistory {
    let summary = summarize(&values);
    WeeklyMetricHistory {
        labels,
        values,
        latest_value: summary.latest_value,
        change_percent: summary.change_percent,
    }
}

/// Series of a field stored directly on each week
pub fn build_direct_history<F>(weeks: &[FitnessWeek], select: F) -> WeeklyMetricHistory
where
    F: Fn(&FitnessWeek) -> Option<f64>,
{
    let sorted = sort_chronologically(weeks);
    let labels = sorted.iter().map(|w| w.week_of.clone()).collect();
    let values = sorted
        .iter()
        .map(|w| select(*w).and_then(finite))
        .collect();
    into_history(labels, values)
}

/// Series of a value computed by the aggregation engine
pub fn build_derived_history<F>(weeks: &[FitnessWeek], select: F) -> WeeklyMetricHistory
where
    F: Fn(&WeekHistoryRow) -> Option<f64>,
{
    let mut rows = build_week_history_rows(weeks);
    rows.reverse();

    let labels = rows.iter().map(|r| r.week_of.clone()).collect();
    let values = rows.iter().map(|r| select(r).and_then(finite)).collect();
    into_history(labels, values)
}

/// The weekly metrics shown on the dashboard
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MetricKind {
    /// Weekly average of daily calories
    Calories,
    /// Weekly average of daily protein
    Protein,
    /// Average steps per day, as entered
    Steps,
    /// Total working sets
    Sets,
    /// Total training volume
    Volume,
}

impl MetricKind {
    /// Get all metrics for iteration
    pub fn all() -> &'static [MetricKind] {
        &[
            MetricKind::Calories,
            MetricKind::Protein,
            MetricKind::Steps,
            MetricKind::Sets,
            MetricKind::Volume,
        ]
    }

    /// Display title
    pub fn title(&self) -> &'static str {
        match self {
            MetricKind::Calories => "Avg Calories",
            MetricKind::Protein => "Avg Protein",
            MetricKind::Steps => "Avg Steps",
            MetricKind::Sets => "Total Sets",
            MetricKind::Volume => "Total Volume",
        }
    }

    /// Unit suffix for displayed values (empty for plain counts)
    pub fn unit(&self) -> &'static str {
        match self {
            MetricKind::Calories => "kcal",
            MetricKind::Protein => "g",
            MetricKind::Steps | MetricKind::Sets => "",
            MetricKind::Volume => "kg",
        }
    }

    /// Build this metric's weekly series
    pub fn history(&self, weeks: &[FitnessWeek]) -> WeeklyMetricHistory {
        match self {
            MetricKind::Calories => build_derived_history(weeks, |r| r.avg_calories),
            MetricKind::Protein => build_derived_history(weeks, |r| r.avg_protein_g),
            MetricKind::Steps => build_direct_history(weeks, |w| w.avg_steps_per_day),
            MetricKind::Sets => build_direct_history(weeks, |w| w.total_sets),
            MetricKind::Volume => build_direct_history(weeks, |w| w.total_volume_kg),
        }
    }
}

impl fmt::Display for MetricKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MetricKind::Calories => write!(f, "calories"),
            MetricKind::Protein => write!(f, "protein"),
            MetricKind::Steps => write!(f, "steps"),
            MetricKind::Sets => write!(f, "sets"),
            MetricKind::Volume => write!(f, "volume"),
        }
    }
}

impl std::str::FromStr for MetricKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = s.trim().to_lowercase();
        MetricKind::all()
            .iter()
            .copied()
            .find(|kind| kind.to_string() == name)
            .ok_or_else(|| {
                format!(
                    "unknown metric '{}', expected one of calories, protein, steps, sets, volume",
                    s
                )
            })
    }
}
