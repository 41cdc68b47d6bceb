//! Week Editor
//!
//! Turns free-text form input into a `FitnessWeek`. Numbers that don't
//! parse are treated as not entered, a day with nothing entered is left
//! out, and the week always starts on a Monday.

use crate::weeks::{finite, DayMetrics, FitnessWeek, WeekStore, Weekday};
use chrono::{Datelike, Duration, NaiveDate};
use serde_json::{Map, Value};
use thiserror::Error;
use tracing::debug;

/// Editor validation errors, shown to the user as-is
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EditorError {
    #[error("Week starting {0} already exists.")]
    DuplicateWeek(String),

    #[error("Week {0} no longer exists.")]
    WeekNotFound(String),
}

pub type EditorResult<T> = Result<T, EditorError>;

/// Parse a numeric field; blank, unparseable and non-finite input is absent
pub fn parse_number(input: &str) -> Option<f64> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return None;
    }
    trimmed.parse::<f64>().ok().and_then(finite)
}

fn number_text(value: Option<f64>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

fn non_blank(text: &str) -> Option<String> {
    let trimmed = text.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

/// Raw text of one day's fields
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DayInputs {
    pub weight_kg: String,
    pub calories: String,
    pub protein_g: String,
}

impl DayInputs {
    /// Prefill from stored metrics
    pub fn from_day(day: Option<&DayMetrics>) -> Self {
        match day {
            Some(d) => Self {
                weight_kg: number_text(d.weight_kg),
                calories: number_text(d.calories),
                protein_g: number_text(d.protein_g),
            },
            None => Self::default(),
        }
    }

    /// Parsed metrics, or `None` when no field holds a number
    pub fn to_day(&self) -> Option<DayMetrics> {
        let day = DayMetrics {
            weight_kg: parse_number(&self.weight_kg),
            calories: parse_number(&self.calories),
            protein_g: parse_number(&self.protein_g),
            ..DayMetrics::default()
        };
        (!day.is_empty()).then_some(day)
    }
}

/// Monday of the week containing `date`; Sunday belongs to the week before
pub fn week_monday(date: NaiveDate) -> NaiveDate {
    let offset = date.weekday().num_days_from_monday() as i64;
    date - Duration::days(offset)
}

/// Editor start date: the week's own Monday, or this week's when the week
/// is missing or its date is invalid
pub fn week_start_for(week: Option<&FitnessWeek>, today: NaiveDate) -> NaiveDate {
    week.and_then(FitnessWeek::week_start)
        .map(week_monday)
        .unwrap_or_else(|| week_monday(today))
}

/// Whether a draft creates a week or replaces one
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditMode {
    Add,
    Edit { id: String },
}

/// Form state for adding or editing a week
#[derive(Debug, Clone, PartialEq)]
pub struct WeekDraft {
    pub mode: EditMode,
    week_start: NaiveDate,
    days: [DayInputs; 7],
    pub avg_steps_per_day: String,
    pub training_sessions_description: String,
    pub total_sets: String,
    pub total_volume_kg: String,
    pub notes: String,
    extra: Map<String, Value>,
}

impl WeekDraft {
    /// Blank draft for a new week starting this week
    pub fn new(today: NaiveDate) -> Self {
        Self {
            mode: EditMode::Add,
            week_start: week_monday(today),
            days: Default::default(),
            avg_steps_per_day: String::new(),
            training_sessions_description: String::new(),
            total_sets: String::new(),
            total_volume_kg: String::new(),
            notes: String::new(),
            extra: Map::new(),
        }
    }

    /// Draft prefilled from an existing week
    pub fn from_week(week: &FitnessWeek, today: NaiveDate) -> Self {
        Self {
            mode: EditMode::Edit {
                id: week.id.clone(),
            },
            week_start: week_start_for(Some(week), today),
            days: Weekday::ALL.map(|day| DayInputs::from_day(week.days.get(day))),
            avg_steps_per_day: number_text(week.avg_steps_per_day),
            training_sessions_description: week
                .training_sessions_description
                .clone()
                .unwrap_or_default(),
            total_sets: number_text(week.total_sets),
            total_volume_kg: number_text(week.total_volume_kg),
            notes: week.notes.clone().unwrap_or_default(),
            extra: week.extra.clone(),
        }
    }

    /// Move the draft to the week containing `date`
    pub fn set_week_start(&mut self, date: NaiveDate) {
        self.week_start = week_monday(date);
    }

    pub fn week_start(&self) -> NaiveDate {
        self.week_start
    }

    /// `YYYY-MM-DD` of the draft's Monday
    pub fn week_of(&self) -> String {
        self.week_start.format("%Y-%m-%d").to_string()
    }

    pub fn day(&self, day: Weekday) -> &DayInputs {
        &self.days[day.index()]
    }

    pub fn day_mut(&mut self, day: Weekday) -> &mut DayInputs {
        &mut self.days[day.index()]
    }

    /// Build the week entity; new weeks take their `week_of` as id
    pub fn build(&self) -> FitnessWeek {
        let week_of = self.week_of();
        let id = match &self.mode {
            EditMode::Add => week_of.clone(),
            EditMode::Edit { id } => id.clone(),
        };

        let mut week = FitnessWeek::new(id, week_of);
        for day in Weekday::ALL {
            week.days.set(day, self.day(day).to_day());
        }
        week.avg_steps_per_day = parse_number(&self.avg_steps_per_day);
        week.training_sessions_description = non_blank(&self.training_sessions_description);
        week.total_sets = parse_number(&self.total_sets);
        week.total_volume_kg = parse_number(&self.total_volume_kg);
        week.notes = non_blank(&self.notes);
        week.extra = self.extra.clone();
        week
    }

    /// Check the draft against the stored weeks
    ///
    /// Edits must target a week that still exists, and no other week may
    /// share the draft's start date.
    pub fn validate(&self, existing: &[FitnessWeek]) -> EditorResult<()> {
        let editing = match &self.mode {
            EditMode::Edit { id } => {
                if !existing.iter().any(|w| &w.id == id) {
                    return Err(EditorError::WeekNotFound(id.clone()));
                }
                Some(id.as_str())
            }
            EditMode::Add => None,
        };

        let week_of = self.week_of();
        let duplicate = existing
            .iter()
            .any(|w| w.week_of == week_of && Some(w.id.as_str()) != editing);
        if duplicate {
            return Err(EditorError::DuplicateWeek(week_of));
        }
        Ok(())
    }

    /// Validate, then build
    pub fn submit(&self, existing: &[FitnessWeek]) -> EditorResult<FitnessWeek> {
        self.validate(existing)?;
        Ok(self.build())
    }

    /// Submit against the store's current weeks and write the result
    pub async fn apply(&self, store: &WeekStore) -> EditorResult<FitnessWeek> {
        let week = self.submit(&store.weeks().await)?;
        match self.mode {
            EditMode::Add => store.add_week(week.clone()).await,
            EditMode::Edit { .. } => {
                store.update_week(week.clone()).await;
            }
        }
        debug!(id = %week.id, week_of = %week.week_of, "Applied week draft");
        Ok(week)
    }
}
