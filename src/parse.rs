//! Conversion of raw sheet rows into typed workout records.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One parsed workout set. Immutable once parsed; a new fetch replaces the
/// whole dataset rather than mutating records in place.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkoutRecord {
    pub date: NaiveDate,
    pub exercise: String,
    pub weight: f32,
    pub reps: u32,
}

#[derive(Debug, PartialEq, Eq)]
pub enum ParseError {
    /// Fewer than two rows: nothing beyond the header.
    EmptyDataset,
}

impl std::fmt::Display for ParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ParseError::EmptyDataset => write!(f, "sheet contains no data rows"),
        }
    }
}

impl std::error::Error for ParseError {}

/// Parse raw rows into records, dropping the header row.
///
/// Malformed rows are validated and skipped with a warning: fewer than four
/// fields, an unparseable date, a blank exercise name, a negative or
/// non-numeric weight, or non-numeric reps all drop the row. For well-formed
/// input the output length is exactly the input length minus the header.
pub fn parse_rows(rows: &[Vec<String>]) -> Result<Vec<WorkoutRecord>, ParseError> {
    if rows.len() < 2 {
        return Err(ParseError::EmptyDataset);
    }
    let mut records = Vec::with_capacity(rows.len() - 1);
    for row in &rows[1..] {
        match parse_row(row) {
            Some(record) => records.push(record),
            None => log::warn!("skipping malformed row: {row:?}"),
        }
    }
    Ok(records)
}

fn parse_row(row: &[String]) -> Option<WorkoutRecord> {
    if row.len() < 4 {
        return None;
    }
    let date = NaiveDate::parse_from_str(row[0].trim(), "%Y-%m-%d").ok()?;
    let exercise = row[1].trim();
    if exercise.is_empty() {
        return None;
    }
    let weight: f32 = row[2].trim().parse().ok()?;
    if weight < 0.0 || !weight.is_finite() {
        return None;
    }
    let reps: u32 = row[3].trim().parse().ok()?;
    Some(WorkoutRecord {
        date,
        exercise: exercise.to_string(),
        weight,
        reps,
    })
}
