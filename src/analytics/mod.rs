//! Dashboard analytics
//!
//! Pure, stateless transforms from the week list to display-ready data:
//!
//! - **history**: per-week averages, deltas and daily arrays (most recent first)
//! - **metrics**: chronological metric series with latest value and % change
//! - **weight**: daily weight series with weekly average markers
//! - **cards**: overview stat cards built from the metric series
//!
//! ```text
//! weeks ─→ history ─┬─→ metrics (derived) ─→ cards
//!                   ├─→ export
//!                   └─→ weight
//! ```

pub mod cards;
pub mod history;
pub mod metrics;
pub mod weight;

pub use cards::{overview_cards, to_chart_data, to_chart_labels, to_trend, StatCard, Trend};
pub use history::{average_by, build_week_history_rows, sort_chronologically, WeekHistoryRow};
pub use metrics::{
    build_derived_history, build_direct_history, summarize, MetricKind, MetricSummary,
    WeeklyMetricHistory,
};
pub use weight::{
    build_weight_series, build_weight_summary, day_label, last_logged_day, marker_day,
    WeightSeries, WeightSummary,
};

/// Round half up (toward positive infinity) to `decimals` places
pub fn round_half_up(value: f64, decimals: u32) -> f64 {
    let factor = 10f64.powi(decimals as i32);
    (value * factor + 0.5).floor() / factor
}
