//! Dataset state machine with last-fetch-wins ordering.
//!
//! Fetches run on background threads and report back tagged with a request
//! generation. Only the newest generation may touch the dataset slot, so a
//! rapid selection change can never surface a stale response that arrives
//! late.

use crate::parse::{ParseError, WorkoutRecord};
use crate::sheets::FetchError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LoadState {
    #[default]
    Idle,
    Loading,
    Ready,
    Empty,
}

#[derive(Debug)]
pub enum LoadError {
    Fetch(FetchError),
    Parse(ParseError),
}

impl std::fmt::Display for LoadError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LoadError::Fetch(e) => write!(f, "fetch failed: {e}"),
            LoadError::Parse(e) => write!(f, "{e}"),
        }
    }
}

impl std::error::Error for LoadError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            LoadError::Fetch(e) => Some(e),
            LoadError::Parse(e) => Some(e),
        }
    }
}

#[derive(Debug, Default)]
pub struct DatasetController {
    state: LoadState,
    generation: u64,
    records: Vec<WorkoutRecord>,
    message: Option<String>,
}

impl DatasetController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> LoadState {
        self.state
    }

    pub fn records(&self) -> &[WorkoutRecord] {
        &self.records
    }

    /// User-facing status for the Empty state, if any.
    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    /// Start a new fetch, superseding any fetch still in flight. Returns the
    /// generation the worker must report back with.
    pub fn begin_fetch(&mut self) -> u64 {
        self.generation += 1;
        self.state = LoadState::Loading;
        self.generation
    }

    /// Apply a finished fetch. Results from a superseded generation are
    /// discarded; returns whether the result was applied.
    ///
    /// Any error empties the dataset rather than keeping stale records.
    pub fn finish(
        &mut self,
        generation: u64,
        result: Result<Vec<WorkoutRecord>, LoadError>,
    ) -> bool {
        if generation != self.generation {
            log::info!("discarding stale fetch result (generation {generation})");
            return false;
        }
        match result {
            Ok(records) if !records.is_empty() => {
                log::info!("loaded {} sets", records.len());
                self.records = records;
                self.message = None;
                self.state = LoadState::Ready;
            }
            Ok(_) => {
                self.records.clear();
                self.message = Some("no data available".to_string());
                self.state = LoadState::Empty;
            }
            Err(e) => {
                log::error!("fetch failed: {e}");
                self.records.clear();
                self.message = Some(e.to_string());
                self.state = LoadState::Empty;
            }
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn record(exercise: &str) -> WorkoutRecord {
        WorkoutRecord {
            date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            exercise: exercise.into(),
            weight: 50.0,
            reps: 10,
        }
    }

    #[test]
    fn successful_fetch_reaches_ready() {
        let mut c = DatasetController::new();
        assert_eq!(c.state(), LoadState::Idle);

        let generation = c.begin_fetch();
        assert_eq!(c.state(), LoadState::Loading);

        assert!(c.finish(generation, Ok(vec![record("Bench")])));
        assert_eq!(c.state(), LoadState::Ready);
        assert_eq!(c.records().len(), 1);
        assert!(c.message().is_none());
    }

    #[test]
    fn newest_selection_wins_when_responses_arrive_in_order() {
        let mut c = DatasetController::new();
        let front = c.begin_fetch();
        let back = c.begin_fetch();

        // The superseded "Front" fetch finishes first and is ignored.
        assert!(!c.finish(front, Ok(vec![record("Front Raise")])));
        assert_eq!(c.state(), LoadState::Loading);
        assert!(c.records().is_empty());

        assert!(c.finish(back, Ok(vec![record("Row")])));
        assert_eq!(c.records()[0].exercise, "Row");
    }

    #[test]
    fn stale_response_arriving_last_is_discarded() {
        let mut c = DatasetController::new();
        let front = c.begin_fetch();
        let back = c.begin_fetch();

        assert!(c.finish(back, Ok(vec![record("Row")])));
        // Out-of-order arrival: the older response must not clobber the newer.
        assert!(!c.finish(front, Ok(vec![record("Front Raise")])));
        assert_eq!(c.state(), LoadState::Ready);
        assert_eq!(c.records()[0].exercise, "Row");
    }

    #[test]
    fn errors_empty_the_dataset() {
        let mut c = DatasetController::new();
        let generation = c.begin_fetch();
        assert!(c.finish(generation, Ok(vec![record("Bench")])));

        let generation = c.begin_fetch();
        assert!(c.finish(generation, Err(LoadError::Parse(ParseError::EmptyDataset))));
        assert_eq!(c.state(), LoadState::Empty);
        assert!(c.records().is_empty());
        assert!(c.message().unwrap().contains("no data rows"));
    }

    #[test]
    fn empty_result_is_empty_state_not_error() {
        let mut c = DatasetController::new();
        let generation = c.begin_fetch();
        assert!(c.finish(generation, Ok(Vec::new())));
        assert_eq!(c.state(), LoadState::Empty);
        assert_eq!(c.message(), Some("no data available"));
    }
}
