// Per-exercise summary shown in the side panel.
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::parse::WorkoutRecord;

/// Aggregated totals for a single exercise.
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExerciseSummary {
    pub total_sets: usize,
    pub total_reps: u32,
    pub total_volume: f32,
    pub max_weight: Option<f32>,
}

/// Aggregate per-exercise totals, sorted alphabetically by exercise name.
///
/// Volume is `weight * reps` summed over all sets of the exercise.
pub fn summarize_exercises(records: &[WorkoutRecord]) -> Vec<(String, ExerciseSummary)> {
    let mut map: BTreeMap<String, ExerciseSummary> = BTreeMap::new();
    for record in records {
        let summary = map.entry(record.exercise.clone()).or_default();
        summary.total_sets += 1;
        summary.total_reps += record.reps;
        summary.total_volume += record.weight * record.reps as f32;
        summary.max_weight = match summary.max_weight {
            Some(w) if w >= record.weight => Some(w),
            _ => Some(record.weight),
        };
    }
    map.into_iter().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn record(date: &str, exercise: &str, weight: f32, reps: u32) -> WorkoutRecord {
        WorkoutRecord {
            date: NaiveDate::parse_from_str(date, "%Y-%m-%d").unwrap(),
            exercise: exercise.into(),
            weight,
            reps,
        }
    }

    #[test]
    fn summarizes_per_exercise() {
        let records = vec![
            record("2024-01-01", "Squat", 100.0, 5),
            record("2024-01-01", "Bench", 80.0, 5),
            record("2024-01-03", "Squat", 105.0, 5),
        ];
        let summaries = summarize_exercises(&records);
        assert_eq!(summaries.len(), 2);

        let (name, bench) = &summaries[0];
        assert_eq!(name, "Bench");
        assert_eq!(bench.total_sets, 1);
        assert_eq!(bench.total_reps, 5);
        assert!((bench.total_volume - 400.0).abs() < 1e-6);
        assert_eq!(bench.max_weight, Some(80.0));

        let (name, squat) = &summaries[1];
        assert_eq!(name, "Squat");
        assert_eq!(squat.total_sets, 2);
        assert_eq!(squat.total_reps, 10);
        assert!((squat.total_volume - 1025.0).abs() < 1e-6);
        assert_eq!(squat.max_weight, Some(105.0));
    }

    #[test]
    fn empty_input_yields_no_rows() {
        assert!(summarize_exercises(&[]).is_empty());
    }
}
