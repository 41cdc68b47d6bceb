//! Core data types for weekly fitness records
//!
//! This module defines the entities that the store persists and the
//! analytics layer reads:
//! - `Weekday`: the fixed Monday-first day ordering
//! - `DayMetrics`: one day's optional weight, calories and protein
//! - `WeekDays`: a fixed seven-slot array of optional days
//! - `FitnessWeek`: one user-entered week
//! - `FitnessWeeksPayload`: the persisted snapshot shape

use chrono::NaiveDate;
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};
use std::fmt;

/// Returns the value only if it is a finite number
pub fn finite(value: f64) -> Option<f64> {
    value.is_finite().then_some(value)
}

/// Day of the week, in canonical Monday-first order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Weekday {
    Mon,
    Tue,
    Wed,
    Thu,
    Fri,
    Sat,
    Sun,
}

impl Weekday {
    /// All weekdays in canonical order
    pub const ALL: [Weekday; 7] = [
        Weekday::Mon,
        Weekday::Tue,
        Weekday::Wed,
        Weekday::Thu,
        Weekday::Fri,
        Weekday::Sat,
        Weekday::Sun,
    ];

    /// Position within the week (Monday = 0)
    pub fn index(self) -> usize {
        self as usize
    }

    /// Wire key used in persisted and exported JSON
    pub fn key(self) -> &'static str {
        match self {
            Weekday::Mon => "mon",
            Weekday::Tue => "tue",
            Weekday::Wed => "wed",
            Weekday::Thu => "thu",
            Weekday::Fri => "fri",
            Weekday::Sat => "sat",
            Weekday::Sun => "sun",
        }
    }

    /// Parse a wire key (`mon`..`sun`)
    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|day| day.key() == key)
    }

    /// Date of this weekday within the week starting at `week_start`
    pub fn date_in_week(self, week_start: NaiveDate) -> NaiveDate {
        week_start + chrono::Duration::days(self.index() as i64)
    }
}

impl fmt::Display for Weekday {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl std::str::FromStr for Weekday {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_key(&s.trim().to_lowercase())
            .ok_or_else(|| format!("unknown weekday '{}', expected one of mon..sun", s))
    }
}

/// Metrics logged for a single day
///
/// Every field is optional; an absent value is distinct from zero.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DayMetrics {
    #[serde(default, skip_serializing_if = "Option::is_none", with = "json_number")]
    pub weight_kg: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none", with = "json_number")]
    pub calories: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none", with = "json_number")]
    pub protein_g: Option<f64>,
    /// Fields this version does not know about, kept for round-tripping
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl DayMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder: set body weight (non-finite values are dropped)
    pub fn weight_kg(mut self, value: f64) -> Self {
        self.weight_kg = finite(value);
        self
    }

    /// Builder: set calories (non-finite values are dropped)
    pub fn calories(mut self, value: f64) -> Self {
        self.calories = finite(value);
        self
    }

    /// Builder: set protein (non-finite values are dropped)
    pub fn protein_g(mut self, value: f64) -> Self {
        self.protein_g = finite(value);
        self
    }

    /// True when none of the known metrics is present
    pub fn is_empty(&self) -> bool {
        self.weight_kg.is_none() && self.calories.is_none() && self.protein_g.is_none()
    }
}

/// The seven day slots of a week, indexed by `Weekday`
///
/// Serialized as a JSON object keyed by `mon`..`sun` containing only the
/// populated days, in canonical order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WeekDays([Option<DayMetrics>; 7]);

impl WeekDays {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, day: Weekday) -> Option<&DayMetrics> {
        self.0[day.index()].as_ref()
    }

    pub fn set(&mut self, day: Weekday, metrics: Option<DayMetrics>) {
        self.0[day.index()] = metrics;
    }

    /// Iterate all seven slots in canonical order
    pub fn iter(&self) -> impl Iterator<Item = (Weekday, Option<&DayMetrics>)> + '_ {
        Weekday::ALL.into_iter().map(move |day| (day, self.get(day)))
    }

    /// Project one metric across the week, `None` where the day or value is missing
    pub fn values<F>(&self, select: F) -> [Option<f64>; 7]
    where
        F: Fn(&DayMetrics) -> Option<f64>,
    {
        Weekday::ALL.map(|day| self.get(day).and_then(&select))
    }

    /// Number of populated day slots
    pub fn len(&self) -> usize {
        self.0.iter().filter(|slot| slot.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Serialize for WeekDays {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.len()))?;
        for (day, metrics) in self.iter() {
            if let Some(metrics) = metrics {
                map.serialize_entry(day.key(), metrics)?;
            }
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for WeekDays {
    /// Unknown weekday keys are ignored; a day that is not an object reads
    /// as absent, and anything other than an object reads as no days
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let mut days = WeekDays::new();
        if let Value::Object(map) = Value::deserialize(deserializer)? {
            for (key, metrics) in map {
                if let Some(day) = Weekday::from_key(&key) {
                    days.set(day, DayMetrics::deserialize(metrics).ok());
                }
            }
        }
        Ok(days)
    }
}

/// One user-entered week of metrics
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FitnessWeek {
    /// Stable identifier, unchanged across edits
    pub id: String,
    /// Monday of the week, `YYYY-MM-DD`
    pub week_of: String,
    #[serde(default, skip_serializing_if = "Option::is_none", with = "json_number")]
    pub avg_steps_per_day: Option<f64>,
    #[serde(default)]
    pub days: WeekDays,
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "json_text::deserialize")]
    pub training_sessions_description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none", with = "json_number")]
    pub total_sets: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none", with = "json_number")]
    pub total_volume_kg: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "json_text::deserialize")]
    pub notes: Option<String>,
    /// Fields this version does not know about, kept for round-tripping
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl FitnessWeek {
    /// Create an empty week
    pub fn new(id: impl Into<String>, week_of: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            week_of: week_of.into(),
            avg_steps_per_day: None,
            days: WeekDays::new(),
            training_sessions_description: None,
            total_sets: None,
            total_volume_kg: None,
            notes: None,
            extra: Map::new(),
        }
    }

    /// Builder: set one day's metrics
    pub fn day(mut self, day: Weekday, metrics: DayMetrics) -> Self {
        self.days.set(day, Some(metrics));
        self
    }

    pub fn avg_steps_per_day(mut self, value: f64) -> Self {
        self.avg_steps_per_day = finite(value);
        self
    }

    pub fn total_sets(mut self, value: f64) -> Self {
        self.total_sets = finite(value);
        self
    }

    pub fn total_volume_kg(mut self, value: f64) -> Self {
        self.total_volume_kg = finite(value);
        self
    }

    pub fn training_sessions_description(mut self, text: impl Into<String>) -> Self {
        self.training_sessions_description = Some(text.into());
        self
    }

    pub fn notes(mut self, text: impl Into<String>) -> Self {
        self.notes = Some(text.into());
        self
    }

    /// Parsed `week_of`, if it is a valid ISO date
    pub fn week_start(&self) -> Option<NaiveDate> {
        NaiveDate::parse_from_str(&self.week_of, "%Y-%m-%d").ok()
    }
}

/// Persisted snapshot: `{ "weeks": [...] }`
///
/// `weeks` is optional so that a snapshot without a week list reads as
/// "nothing stored" rather than as a decode failure.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FitnessWeeksPayload {
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "lenient_weeks")]
    pub weeks: Option<Vec<FitnessWeek>>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl FitnessWeeksPayload {
    pub fn new(weeks: Vec<FitnessWeek>) -> Self {
        Self {
            weeks: Some(weeks),
            extra: Map::new(),
        }
    }
}

/// Decode a stored week list one week at a time
///
/// A non-array reads as "no list". Weeks that fail to decode (for example
/// without a string `id` or `weekOf`) are dropped so the rest survive.
fn lenient_weeks<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<Vec<FitnessWeek>>, D::Error> {
    let Value::Array(items) = Value::deserialize(deserializer)? else {
        return Ok(None);
    };

    let weeks = items
        .into_iter()
        .enumerate()
        .filter_map(|(index, item)| match FitnessWeek::deserialize(item) {
            Ok(week) => Some(week),
            Err(e) => {
                tracing::warn!(index, error = %e, "Dropping unreadable stored week");
                None
            }
        })
        .collect();
    Ok(Some(weeks))
}

/// Optional text fields; non-string values read as absent
pub(crate) mod json_text {
    use serde::{Deserialize, Deserializer};
    use serde_json::Value;

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<String>, D::Error> {
        Ok(match Value::deserialize(deserializer)? {
            Value::String(text) => Some(text),
            _ => None,
        })
    }
}

/// Serde helpers for optional numeric fields
///
/// Integral values are written without a fractional part (`2500`, not
/// `2500.0`). Reading accepts any finite JSON number; anything else
/// (strings, booleans, non-finite) reads as absent.
pub(crate) mod json_number {
    use serde::{Deserialize, Deserializer, Serializer};
    use serde_json::Value;

    const MAX_EXACT_INTEGER: f64 = 9_007_199_254_740_992.0;

    pub fn serialize<S: Serializer>(value: &Option<f64>, serializer: S) -> Result<S::Ok, S::Error> {
        match value {
            Some(v) if v.is_finite() && v.fract() == 0.0 && v.abs() < MAX_EXACT_INTEGER => {
                serializer.serialize_i64(*v as i64)
            }
            Some(v) if v.is_finite() => serializer.serialize_f64(*v),
            _ => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<f64>, D::Error> {
        let value = Value::deserialize(deserializer)?;
        Ok(match value {
            Value::Number(n) => n.as_f64().and_then(super::finite),
            _ => None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_weekday_order_and_keys() {
        let keys: Vec<&str> = Weekday::ALL.iter().map(|d| d.key()).collect();
        assert_eq!(keys, ["mon", "tue", "wed", "thu", "fri", "sat", "sun"]);
        assert_eq!(Weekday::from_key("sat"), Some(Weekday::Sat));
        assert_eq!(Weekday::from_key("saturday"), None);
        assert_eq!("SUN".parse::<Weekday>().unwrap(), Weekday::Sun);
    }

    #[test]
    fn test_day_builder_drops_non_finite() {
        let day = DayMetrics::new()
            .weight_kg(f64::NAN)
            .calories(2500.0)
            .protein_g(f64::INFINITY);

        assert_eq!(day.weight_kg, None);
        assert_eq!(day.calories, Some(2500.0));
        assert_eq!(day.protein_g, None);
        assert!(!day.is_empty());
        assert!(DayMetrics::new().is_empty());
    }

    #[test]
    fn test_week_serialization_shape() {
        let week = FitnessWeek::new("week-1", "2026-01-05")
            .day(Weekday::Mon, DayMetrics::new().weight_kg(80.0).calories(2600.0))
            .day(Weekday::Wed, DayMetrics::new().protein_g(150.5))
            .total_sets(35.0);

        let json = serde_json::to_value(&week).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "id": "week-1",
                "weekOf": "2026-01-05",
                "days": {
                    "mon": { "weightKg": 80, "calories": 2600 },
                    "wed": { "proteinG": 150.5 }
                },
                "totalSets": 35
            })
        );
    }

    #[test]
    fn test_week_deserialization_is_lenient() {
        let raw = r#"{
            "id": "a",
            "weekOf": "2025-12-01",
            "avgStepsPerDay": "lots",
            "days": { "sun": {}, "mon": { "weightKg": 80.1 }, "holiday": { "weightKg": 1 } },
            "mood": "good"
        }"#;
        let week: FitnessWeek = serde_json::from_str(raw).unwrap();

        assert_eq!(week.avg_steps_per_day, None);
        assert_eq!(week.days.get(Weekday::Mon).unwrap().weight_kg, Some(80.1));
        assert!(week.days.get(Weekday::Sun).unwrap().is_empty());
        assert!(week.days.get(Weekday::Tue).is_none());
        assert_eq!(week.days.len(), 2);
        assert_eq!(week.extra.get("mood"), Some(&serde_json::json!("good")));
    }

    #[test]
    fn test_week_without_days() {
        let week: FitnessWeek =
            serde_json::from_str(r#"{ "id": "a", "weekOf": "2025-12-01" }"#).unwrap();
        assert!(week.days.is_empty());
        assert_eq!(week.week_start(), NaiveDate::from_ymd_opt(2025, 12, 1));
    }

    #[test]
    fn test_values_projection() {
        let week = FitnessWeek::new("a", "2025-12-01")
            .day(Weekday::Tue, DayMetrics::new().weight_kg(79.5))
            .day(Weekday::Sun, DayMetrics::new().calories(2000.0));

        let weights = week.days.values(|d| d.weight_kg);
        assert_eq!(weights, [None, Some(79.5), None, None, None, None, None]);
    }

    #[test]
    fn test_payload_tolerates_wrongly_typed_fields() {
        let raw = r#"{"weeks": [
            { "id": "a", "weekOf": "2025-12-01", "notes": 42, "trainingSessionsDescription": ["x"],
              "days": { "mon": 5, "tue": { "weightKg": 80 }, "wed": null } },
            { "id": 7, "weekOf": "2025-12-08" },
            { "id": "c", "weekOf": "2025-12-15", "days": "none" },
            "not a week"
        ]}"#;
        let payload: FitnessWeeksPayload = serde_json::from_str(raw).unwrap();
        let weeks = payload.weeks.unwrap();

        let ids: Vec<&str> = weeks.iter().map(|w| w.id.as_str()).collect();
        assert_eq!(ids, ["a", "c"]);
        assert_eq!(weeks[0].notes, None);
        assert_eq!(weeks[0].training_sessions_description, None);
        assert_eq!(weeks[0].days.get(Weekday::Mon), None);
        assert_eq!(weeks[0].days.get(Weekday::Tue).unwrap().weight_kg, Some(80.0));
        assert_eq!(weeks[0].days.len(), 1);
        assert!(weeks[1].days.is_empty());

        let payload: FitnessWeeksPayload = serde_json::from_str(r#"{"weeks": "nope"}"#).unwrap();
        assert!(payload.weeks.is_none());
    }

    #[test]
    fn test_payload_without_weeks() {
        let payload: FitnessWeeksPayload = serde_json::from_str("{}").unwrap();
        assert!(payload.weeks.is_none());

        let payload: FitnessWeeksPayload = serde_json::from_str(r#"{"weeks": []}"#).unwrap();
        assert_eq!(payload.weeks, Some(Vec::new()));
    }
}
