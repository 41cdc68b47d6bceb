//! Sample weeks used to seed a fresh store before anything is persisted

use crate::weeks::types::{DayMetrics, FitnessWeek, Weekday};

fn day(weight_kg: Option<f64>, calories: f64, protein_g: f64) -> DayMetrics {
    let day = DayMetrics::new().calories(calories).protein_g(protein_g);
    match weight_kg {
        Some(weight) => day.weight_kg(weight),
        None => day,
    }
}

/// Four consecutive weeks of realistic data, oldest first
pub fn sample_weeks() -> Vec<FitnessWeek> {
    use Weekday::*;

    vec![
        FitnessWeek::new("2025-11-24", "2025-11-24")
            .avg_steps_per_day(10925.0)
            .day(Mon, day(Some(78.7), 2800.0, 150.0))
            .day(Tue, day(Some(78.0), 2700.0, 160.0))
            .day(Wed, day(None, 2980.0, 181.0))
            .day(Thu, day(Some(77.8), 2600.0, 155.0))
            .day(Fri, day(Some(78.7), 2900.0, 170.0))
            .day(Sat, day(Some(78.5), 3000.0, 165.0))
            .day(Sun, day(Some(79.0), 2990.0, 148.0))
            .training_sessions_description("3x Full Body, 1x Arm at home")
            .total_sets(61.0)
            .total_volume_kg(29942.5),
        FitnessWeek::new("2025-12-01", "2025-12-01")
            .avg_steps_per_day(8898.0)
            .day(Mon, day(Some(79.5), 3077.0, 118.0))
            .day(Tue, day(Some(78.4), 2724.0, 196.0))
            .day(Wed, day(Some(79.2), 2574.0, 121.0))
            .day(Thu, day(Some(78.2), 2323.0, 148.0))
            .day(Fri, day(Some(78.4), 2692.0, 159.0))
            .day(Sat, day(Some(78.4), 2518.0, 171.0))
            .day(Sun, day(Some(79.0), 2965.0, 172.0))
            .training_sessions_description("2x Full Body")
            .total_sets(38.0)
            .total_volume_kg(23533.0)
            .notes("Second week of the block, rest of the week off after a flu shot."),
        FitnessWeek::new("2025-12-08", "2025-12-08")
            .avg_steps_per_day(9472.0)
            .day(Mon, day(Some(78.9), 2733.0, 160.0))
            .day(Tue, day(Some(79.1), 2387.0, 91.0))
            .day(Wed, day(Some(79.0), 2947.0, 186.0))
            .day(Thu, day(Some(78.9), 2880.0, 149.0))
            .day(Fri, day(Some(79.0), 2724.0, 102.0))
            .day(Sat, day(Some(79.0), 2806.0, 129.0))
            .day(Sun, day(Some(79.0), 2726.0, 193.0))
            .training_sessions_description("3x Full Body")
            .total_sets(58.0)
            .total_volume_kg(37745.05),
        FitnessWeek::new("2025-12-15", "2025-12-15")
            .avg_steps_per_day(9205.0)
            .day(Mon, day(Some(79.5), 2975.0, 178.0))
            .day(Tue, day(Some(79.4), 3015.0, 168.0))
            .day(Wed, day(Some(79.7), 3018.0, 158.0))
            .day(Thu, day(Some(78.6), 2978.0, 147.0))
            .day(Fri, day(None, 3084.0, 158.0))
            .day(Sat, day(Some(79.8), 3067.0, 109.0))
            .training_sessions_description("3x Full Body, 1x extra arm session")
            .total_sets(64.0)
            .total_volume_kg(38098.0),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sample_weeks_are_mondays_in_order() {
        let weeks = sample_weeks();
        assert_eq!(weeks.len(), 4);

        for pair in weeks.windows(2) {
            assert!(pair[0].week_of < pair[1].week_of);
        }
        for week in &weeks {
            let start = week.week_start().unwrap();
            assert_eq!(start.format("%a").to_string(), "Mon");
        }
    }
}
