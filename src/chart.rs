//! Chart data aggregation and geometry.
//!
//! Pure functions in this module turn the flat record list into grouped,
//! scaled marks; `main.rs` maps the marks onto `egui_plot` items. Keeping the
//! geometry separate from the widgets makes the layout unit-testable.

use chrono::NaiveDate;
use egui::Color32;
use egui_plot::{Bar, BarChart, PlotPoint, Points};

use crate::parse::WorkoutRecord;

/// Fixed color palette, cycled when a dataset has more exercises than
/// entries here.
pub const PALETTE: [Color32; 10] = [
    Color32::from_rgb(0x1f, 0x77, 0xb4),
    Color32::from_rgb(0xff, 0x7f, 0x0e),
    Color32::from_rgb(0x2c, 0xa0, 0x2c),
    Color32::from_rgb(0xd6, 0x27, 0x28),
    Color32::from_rgb(0x94, 0x67, 0xbd),
    Color32::from_rgb(0x8c, 0x56, 0x4b),
    Color32::from_rgb(0xe3, 0x77, 0xc2),
    Color32::from_rgb(0x7f, 0x7f, 0x7f),
    Color32::from_rgb(0xbc, 0xbd, 0x22),
    Color32::from_rgb(0x17, 0xbe, 0xcf),
];

/// Fraction of each category band left as padding between date clusters.
const BAND_PADDING: f64 = 0.2;

pub const SCATTER_RADIUS: f32 = 5.0;
const SCATTER_OPACITY: f32 = 0.7;

/// Records grouped and scaled for rendering.
///
/// `dates` and `exercises` keep order of first appearance so that band
/// positions and color assignments are stable for a given input sequence.
#[derive(Debug, Default, Clone)]
pub struct ChartData {
    pub records: Vec<WorkoutRecord>,
    pub dates: Vec<NaiveDate>,
    /// Indices into `records`, one inner vec per entry of `dates`, in input
    /// order within each group.
    pub groups: Vec<Vec<usize>>,
    pub exercises: Vec<String>,
    pub weight_max: f64,
    pub reps_max: f64,
}

impl ChartData {
    pub fn from_records(records: Vec<WorkoutRecord>) -> Self {
        let mut dates: Vec<NaiveDate> = Vec::new();
        let mut groups: Vec<Vec<usize>> = Vec::new();
        let mut exercises: Vec<String> = Vec::new();
        let mut weight_max = 0.0f64;
        let mut reps_max = 0.0f64;

        for (idx, record) in records.iter().enumerate() {
            let slot = match dates.iter().position(|d| *d == record.date) {
                Some(pos) => pos,
                None => {
                    dates.push(record.date);
                    groups.push(Vec::new());
                    dates.len() - 1
                }
            };
            groups[slot].push(idx);
            if !exercises.iter().any(|e| *e == record.exercise) {
                exercises.push(record.exercise.clone());
            }
            weight_max = weight_max.max(record.weight as f64);
            reps_max = reps_max.max(record.reps as f64);
        }

        Self {
            records,
            dates,
            groups,
            exercises,
            weight_max,
            reps_max,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Color for one exercise, by first-appearance index, cycling through the
    /// palette. Unknown names fall back to the first color.
    pub fn exercise_color(&self, exercise: &str) -> Color32 {
        let idx = self
            .exercises
            .iter()
            .position(|e| e == exercise)
            .unwrap_or(0);
        PALETTE[idx % PALETTE.len()]
    }
}

/// Return the distinct exercise names in order of first appearance.
pub fn unique_exercises(records: &[WorkoutRecord]) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for record in records {
        if !out.iter().any(|e| *e == record.exercise) {
            out.push(record.exercise.clone());
        }
    }
    out
}

/// One bar of the grouped layout, in plot coordinates. `x` is the bar
/// center; the date cluster for group `i` is centered on `i`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BarMark {
    pub x: f64,
    pub width: f64,
    pub value: f64,
    /// Index into `ChartData::records`.
    pub record: usize,
}

/// Lay out one sub-slot per record inside each date band.
///
/// Each date owns a unit-wide band centered on its group index; the inner
/// band (after padding) is split evenly among the group's records in their
/// original order, so same-date sets never reorder between renders.
pub fn grouped_bar_marks(data: &ChartData) -> Vec<BarMark> {
    let band = 1.0 - BAND_PADDING;
    let mut marks = Vec::with_capacity(data.records.len());
    for (group_idx, group) in data.groups.iter().enumerate() {
        if group.is_empty() {
            continue;
        }
        let slot = band / group.len() as f64;
        let start = group_idx as f64 - band / 2.0;
        for (slot_idx, &record_idx) in group.iter().enumerate() {
            marks.push(BarMark {
                x: start + slot * (slot_idx as f64 + 0.5),
                width: slot,
                value: data.records[record_idx].weight as f64,
                record: record_idx,
            });
        }
    }
    marks
}

/// Record index of the bar under the pointer, if any.
pub fn bar_mark_at(marks: &[BarMark], pointer: PlotPoint) -> Option<usize> {
    marks
        .iter()
        .find(|m| {
            (pointer.x - m.x).abs() <= m.width / 2.0 && pointer.y >= 0.0 && pointer.y <= m.value
        })
        .map(|m| m.record)
}

/// Record index of the scatter point nearest to the pointer, within
/// `max_dist` plot units.
pub fn nearest_scatter_record(
    data: &ChartData,
    pointer: PlotPoint,
    max_dist: f64,
) -> Option<usize> {
    let mut best: Option<(usize, f64)> = None;
    for (idx, record) in data.records.iter().enumerate() {
        let dx = record.reps as f64 - pointer.x;
        let dy = record.weight as f64 - pointer.y;
        let dist = (dx * dx + dy * dy).sqrt();
        if dist <= max_dist && best.map_or(true, |(_, d)| dist < d) {
            best = Some((idx, dist));
        }
    }
    best.map(|(idx, _)| idx)
}

/// Build one `BarChart` per exercise so the plot legend gets a swatch per
/// exercise.
pub fn grouped_bar_charts(data: &ChartData) -> Vec<BarChart> {
    let marks = grouped_bar_marks(data);
    data.exercises
        .iter()
        .map(|exercise| {
            let color = data.exercise_color(exercise);
            let bars: Vec<Bar> = marks
                .iter()
                .filter(|m| data.records[m.record].exercise == *exercise)
                .map(|m| Bar::new(m.x, m.value).width(m.width).fill(color))
                .collect();
            BarChart::new(bars).color(color).name(exercise)
        })
        .collect()
}

/// Build one `Points` item per exercise at (reps, weight), translucent to
/// reveal overlapping sets.
pub fn scatter_points(data: &ChartData) -> Vec<Points> {
    data.exercises
        .iter()
        .map(|exercise| {
            let pts: Vec<[f64; 2]> = data
                .records
                .iter()
                .filter(|r| r.exercise == *exercise)
                .map(|r| [r.reps as f64, r.weight as f64])
                .collect();
            Points::new(pts)
                .radius(SCATTER_RADIUS)
                .color(data.exercise_color(exercise).gamma_multiply(SCATTER_OPACITY))
                .name(exercise)
        })
        .collect()
}
