//! Application shell and persistent user settings.

use dirs_next as dirs;
use eframe::{App, Frame, NativeOptions, egui};
use egui_plot::{Legend, Plot};
use serde::{Deserialize, Serialize};
use std::sync::mpsc;
use std::time::Duration;

use log::info;

mod chart;
use chart::ChartData;
mod config;
use config::SheetsConfig;
mod controller;
use controller::{DatasetController, LoadError, LoadState};
mod parse;
use parse::WorkoutRecord;
mod sheets;
mod stats;
use stats::summarize_exercises;

/// Sheet tabs offered in the selector. Each maps to one tab of the
/// configured spreadsheet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
enum MuscleGroup {
    #[default]
    Shoulders,
    Front,
    Back,
    Legs,
}

const ALL_MUSCLE_GROUPS: [MuscleGroup; 4] = [
    MuscleGroup::Shoulders,
    MuscleGroup::Front,
    MuscleGroup::Back,
    MuscleGroup::Legs,
];

impl MuscleGroup {
    fn label(self) -> &'static str {
        match self {
            MuscleGroup::Shoulders => "Shoulders",
            MuscleGroup::Front => "Front",
            MuscleGroup::Back => "Back",
            MuscleGroup::Legs => "Legs",
        }
    }

    /// Name of the sheet tab holding this group's rows.
    fn sheet_name(self) -> &'static str {
        self.label()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
enum ChartKind {
    #[default]
    GroupedBars,
    Scatter,
}

impl ChartKind {
    fn label(self) -> &'static str {
        match self {
            ChartKind::GroupedBars => "Grouped bars",
            ChartKind::Scatter => "Scatter",
        }
    }
}

fn default_plot_width() -> f32 {
    800.0
}

fn default_plot_height() -> f32 {
    400.0
}

/// Persistent user preferences, serialized to a JSON file in the config dir.
///
/// Every field falls back to its default when absent so older files keep
/// loading after new fields appear. The spreadsheet id and API key stored
/// here are overridden by the `GYM_SHEET_ID` / `GYM_SHEETS_API_KEY`
/// environment variables.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
struct Settings {
    muscle_group: MuscleGroup,
    chart_kind: ChartKind,
    selected_exercises: Vec<String>,
    plot_width: f32,
    plot_height: f32,
    spreadsheet_id: Option<String>,
    api_key: Option<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            muscle_group: MuscleGroup::Shoulders,
            chart_kind: ChartKind::GroupedBars,
            selected_exercises: Vec::new(),
            plot_width: default_plot_width(),
            plot_height: default_plot_height(),
            spreadsheet_id: None,
            api_key: None,
        }
    }
}

impl Settings {
    const FILE: &'static str = "gym_sheet_tracker_settings.json";

    fn path() -> Option<std::path::PathBuf> {
        dirs::config_dir().map(|p| p.join(Self::FILE))
    }

    fn load() -> Self {
        if let Some(path) = Self::path() {
            if let Ok(data) = std::fs::read_to_string(&path) {
                if let Ok(settings) = serde_json::from_str(&data) {
                    return settings;
                }
            }
        }
        Self::default()
    }

    fn save(&self) {
        if let Some(path) = Self::path() {
            if let Some(parent) = path.parent() {
                let _ = std::fs::create_dir_all(parent);
            }
            if let Ok(data) = serde_json::to_string_pretty(self) {
                let _ = std::fs::write(path, data);
            }
        }
    }
}

type FetchResult = (u64, Result<Vec<WorkoutRecord>, LoadError>);

struct MyApp {
    settings: Settings,
    config: Option<SheetsConfig>,
    config_error: Option<String>,
    controller: DatasetController,
    /// Distinct exercises of the current dataset, first-appearance order.
    exercises: Vec<String>,
    selected_exercises: Vec<String>,
    tx: mpsc::Sender<FetchResult>,
    rx: mpsc::Receiver<FetchResult>,
    settings_dirty: bool,
}

impl Default for MyApp {
    fn default() -> Self {
        let settings = Settings::load();
        let (tx, rx) = mpsc::channel();
        let (config, config_error) = match SheetsConfig::resolve(
            settings.spreadsheet_id.as_deref(),
            settings.api_key.as_deref(),
        ) {
            Ok(c) => (Some(c), None),
            Err(e) => {
                log::warn!("Sheets configuration incomplete: {e}");
                (None, Some(e.to_string()))
            }
        };
        let selected_exercises = settings.selected_exercises.clone();
        Self {
            settings,
            config,
            config_error,
            controller: DatasetController::new(),
            exercises: Vec::new(),
            selected_exercises,
            tx,
            rx,
            settings_dirty: false,
        }
    }
}

impl MyApp {
    /// Kick off a background fetch for the current muscle group. The worker
    /// reports back over the channel tagged with its request generation.
    fn start_fetch(&mut self) {
        let Some(config) = self.config.clone() else {
            log::warn!("no Sheets configuration, skipping fetch");
            return;
        };
        let generation = self.controller.begin_fetch();
        let sheet = self.settings.muscle_group.sheet_name().to_string();
        let tx = self.tx.clone();
        std::thread::spawn(move || {
            let result = sheets::fetch_rows(&config, &sheet)
                .map_err(LoadError::Fetch)
                .and_then(|rows| parse::parse_rows(&rows).map_err(LoadError::Parse));
            let _ = tx.send((generation, result));
        });
    }

    fn drain_fetch_results(&mut self) {
        let results: Vec<FetchResult> = self.rx.try_iter().collect();
        for (generation, result) in results {
            if self.controller.finish(generation, result) {
                self.apply_loaded_dataset();
            }
        }
    }

    /// Refresh the exercise list and prune the selection to names that still
    /// exist; an emptied selection resets to all exercises.
    fn apply_loaded_dataset(&mut self) {
        self.exercises = chart::unique_exercises(self.controller.records());
        self.selected_exercises
            .retain(|e| self.exercises.contains(e));
        if self.selected_exercises.is_empty() {
            self.selected_exercises = self.exercises.clone();
        }
        info!(
            "dataset ready: {} sets, {} exercises",
            self.controller.records().len(),
            self.exercises.len()
        );
    }

    fn filtered_records(&self) -> Vec<WorkoutRecord> {
        self.controller
            .records()
            .iter()
            .filter(|r| self.selected_exercises.contains(&r.exercise))
            .cloned()
            .collect()
    }

    fn status_text(&self) -> String {
        match self.controller.state() {
            LoadState::Idle => String::new(),
            LoadState::Loading => "Loading\u{2026}".to_string(),
            LoadState::Ready => format!("{} sets loaded", self.controller.records().len()),
            LoadState::Empty => self
                .controller
                .message()
                .unwrap_or("no data available")
                .to_string(),
        }
    }

    fn draw_bar_plot(&self, ctx: &egui::Context, ui: &mut egui::Ui, data: &ChartData) {
        let dates = data.dates.clone();
        let marks = chart::grouped_bar_marks(data);
        let mut hovered: Option<usize> = None;

        let resp = Plot::new("grouped_bar_plot")
            .width(self.settings.plot_width)
            .height(self.settings.plot_height)
            .include_x(-0.5)
            .include_x(data.dates.len().max(1) as f64 - 0.5)
            .include_y(0.0)
            .include_y(data.weight_max)
            .x_axis_formatter(move |mark, _chars, _| {
                let idx = mark.value.round();
                if idx < 0.0 || (mark.value - idx).abs() > 1e-6 {
                    return String::new();
                }
                dates
                    .get(idx as usize)
                    .map(|d| d.format("%Y-%m-%d").to_string())
                    .unwrap_or_default()
            })
            .legend(Legend::default())
            .show(ui, |plot_ui| {
                let pointer = plot_ui.pointer_coordinate();
                for bar_chart in chart::grouped_bar_charts(data) {
                    plot_ui.bar_chart(bar_chart);
                }
                if let Some(ptr) = pointer {
                    hovered = chart::bar_mark_at(&marks, ptr);
                }
            });

        if let Some(idx) = hovered {
            if resp.response.hovered() {
                self.record_tooltip(ctx, "bar_tooltip", &data.records[idx]);
            }
        }
    }

    fn draw_scatter_plot(&self, ctx: &egui::Context, ui: &mut egui::Ui, data: &ChartData) {
        let mut hovered: Option<usize> = None;
        let max_dist = (data.reps_max.max(data.weight_max) * 0.05).max(1.0);

        let resp = Plot::new("scatter_plot")
            .width(self.settings.plot_width)
            .height(self.settings.plot_height)
            .include_x(0.0)
            .include_x(data.reps_max)
            .include_y(0.0)
            .include_y(data.weight_max)
            .legend(Legend::default())
            .show(ui, |plot_ui| {
                let pointer = plot_ui.pointer_coordinate();
                for points in chart::scatter_points(data) {
                    plot_ui.points(points);
                }
                if let Some(ptr) = pointer {
                    hovered = chart::nearest_scatter_record(data, ptr, max_dist);
                }
            });

        if let Some(idx) = hovered {
            if resp.response.hovered() {
                self.record_tooltip(ctx, "scatter_tooltip", &data.records[idx]);
            }
        }
    }

    fn record_tooltip(&self, ctx: &egui::Context, id: &str, record: &WorkoutRecord) {
        egui::show_tooltip_at_pointer(ctx, egui::Id::new(id), |ui| {
            ui.label(format!("Exercise: {}", record.exercise));
            ui.label(format!("Weight: {} kg", record.weight));
            ui.label(format!("Reps: {}", record.reps));
            ui.label(format!("Date: {}", record.date.format("%Y-%m-%d")));
        });
    }
}

impl App for MyApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut Frame) {
        self.drain_fetch_results();

        // Initial load once configuration is in place.
        if self.controller.state() == LoadState::Idle && self.config.is_some() {
            self.start_fetch();
        }
        if self.controller.state() == LoadState::Loading {
            ctx.request_repaint_after(Duration::from_millis(100));
        }

        egui::TopBottomPanel::top("controls").show(ctx, |ui| {
            ui.horizontal(|ui| {
                ui.heading("Gym Tracker");
                ui.separator();

                let before = self.settings.muscle_group;
                egui::ComboBox::from_label("Muscle group")
                    .selected_text(self.settings.muscle_group.label())
                    .show_ui(ui, |ui| {
                        for group in ALL_MUSCLE_GROUPS {
                            ui.selectable_value(
                                &mut self.settings.muscle_group,
                                group,
                                group.label(),
                            );
                        }
                    });
                if self.settings.muscle_group != before {
                    self.settings_dirty = true;
                    self.selected_exercises.clear();
                    self.start_fetch();
                }

                for kind in [ChartKind::GroupedBars, ChartKind::Scatter] {
                    if ui
                        .selectable_value(&mut self.settings.chart_kind, kind, kind.label())
                        .clicked()
                    {
                        self.settings_dirty = true;
                    }
                }

                if ui.button("Refresh").clicked() {
                    self.start_fetch();
                }

                ui.label(self.status_text());
            });
        });

        egui::SidePanel::left("exercise_panel").show(ctx, |ui| {
            ui.heading("Exercises");
            ui.horizontal(|ui| {
                if ui.button("All").clicked() {
                    self.selected_exercises = self.exercises.clone();
                    self.settings_dirty = true;
                }
                if ui.button("None").clicked() {
                    self.selected_exercises.clear();
                    self.settings_dirty = true;
                }
            });
            for exercise in self.exercises.clone() {
                let mut checked = self.selected_exercises.contains(&exercise);
                if ui.checkbox(&mut checked, &exercise).changed() {
                    if checked {
                        self.selected_exercises.push(exercise.clone());
                    } else {
                        self.selected_exercises.retain(|e| *e != exercise);
                    }
                    self.settings_dirty = true;
                }
            }

            ui.separator();
            ui.heading("Summary");
            egui::Grid::new("exercise_summary")
                .striped(true)
                .show(ui, |ui| {
                    ui.label("Exercise");
                    ui.label("Sets");
                    ui.label("Reps");
                    ui.label("Volume");
                    ui.label("Max");
                    ui.end_row();
                    for (exercise, summary) in summarize_exercises(&self.filtered_records()) {
                        ui.label(exercise);
                        ui.label(summary.total_sets.to_string());
                        ui.label(summary.total_reps.to_string());
                        ui.label(format!("{:.1}", summary.total_volume));
                        ui.label(
                            summary
                                .max_weight
                                .map(|w| format!("{w:.1}"))
                                .unwrap_or_else(|| "-".into()),
                        );
                        ui.end_row();
                    }
                });
        });

        egui::CentralPanel::default().show(ctx, |ui| {
            if let Some(err) = &self.config_error {
                ui.colored_label(
                    egui::Color32::LIGHT_RED,
                    format!(
                        "{err}; set {} and {}",
                        config::SHEET_ID_VAR,
                        config::API_KEY_VAR
                    ),
                );
            }
            if self.controller.state() == LoadState::Empty {
                if let Some(message) = self.controller.message() {
                    ui.colored_label(egui::Color32::LIGHT_RED, message);
                }
            }

            // Rebuilt from the current dataset on every repaint; datasets
            // stay small enough that diffing would buy nothing.
            let data = ChartData::from_records(self.filtered_records());
            match self.settings.chart_kind {
                ChartKind::GroupedBars => self.draw_bar_plot(ctx, ui, &data),
                ChartKind::Scatter => self.draw_scatter_plot(ctx, ui, &data),
            }
        });

        if self.settings_dirty {
            self.settings.selected_exercises = self.selected_exercises.clone();
            self.settings.save();
            self.settings_dirty = false;
        }
    }

    fn on_exit(&mut self, _gl: Option<&eframe::glow::Context>) {
        self.settings.selected_exercises = self.selected_exercises.clone();
        self.settings.save();
    }
}

fn main() -> eframe::Result<()> {
    env_logger::init();
    let options = NativeOptions::default();
    eframe::run_native(
        "Gym Tracker",
        options,
        Box::new(|_cc| Box::new(MyApp::default())),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use once_cell::sync::Lazy;
    use std::sync::Mutex;

    static ENV_MUTEX: Lazy<Mutex<()>> = Lazy::new(|| Mutex::new(()));

    fn record(date: &str, exercise: &str, weight: f32, reps: u32) -> WorkoutRecord {
        WorkoutRecord {
            date: NaiveDate::parse_from_str(date, "%Y-%m-%d").unwrap(),
            exercise: exercise.into(),
            weight,
            reps,
        }
    }

    fn app_with_records(records: Vec<WorkoutRecord>) -> MyApp {
        let mut app = MyApp::default();
        app.selected_exercises.clear();
        let generation = app.controller.begin_fetch();
        assert!(app.controller.finish(generation, Ok(records)));
        app.apply_loaded_dataset();
        app
    }

    #[test]
    fn settings_roundtrip() {
        let mut s = Settings::default();
        s.muscle_group = MuscleGroup::Legs;
        s.chart_kind = ChartKind::Scatter;
        s.selected_exercises = vec!["Bench".into()];
        s.plot_width = 640.0;
        s.plot_height = 320.0;
        s.spreadsheet_id = Some("sheet".into());
        s.api_key = Some("key".into());

        let json = serde_json::to_string(&s).unwrap();
        let loaded: Settings = serde_json::from_str(&json).unwrap();
        assert_eq!(s, loaded);
    }

    #[test]
    fn settings_persistence() {
        let _guard = ENV_MUTEX.lock().unwrap();

        let dir = tempfile::tempdir().unwrap();
        let prev_config = std::env::var_os("XDG_CONFIG_HOME");
        unsafe {
            std::env::set_var("XDG_CONFIG_HOME", dir.path());
        }

        let mut s = Settings::load();
        s.muscle_group = MuscleGroup::Back;
        s.save();
        let loaded = Settings::load();
        assert_eq!(loaded.muscle_group, MuscleGroup::Back);

        // Missing fields fall back to defaults.
        let path = Settings::path().unwrap();
        std::fs::write(&path, "{}").unwrap();
        let missing = Settings::load();
        assert_eq!(missing.muscle_group, MuscleGroup::Shoulders);
        assert_eq!(missing.plot_width, 800.0);

        if let Some(val) = prev_config {
            unsafe {
                std::env::set_var("XDG_CONFIG_HOME", val);
            }
        } else {
            unsafe {
                std::env::remove_var("XDG_CONFIG_HOME");
            }
        }
    }

    #[test]
    fn muscle_group_sheet_names() {
        let names: Vec<&str> = ALL_MUSCLE_GROUPS.iter().map(|g| g.sheet_name()).collect();
        assert_eq!(names, vec!["Shoulders", "Front", "Back", "Legs"]);
    }

    #[test]
    fn loaded_dataset_selects_all_exercises() {
        let app = app_with_records(vec![
            record("2024-01-01", "Bench", 50.0, 10),
            record("2024-01-01", "Squat", 80.0, 8),
        ]);
        assert_eq!(app.exercises, vec!["Bench".to_string(), "Squat".to_string()]);
        assert_eq!(app.filtered_records().len(), 2);
    }

    #[test]
    fn exercise_filter_restricts_records() {
        let mut app = app_with_records(vec![
            record("2024-01-01", "Bench", 50.0, 10),
            record("2024-01-01", "Squat", 80.0, 8),
            record("2024-01-02", "Bench", 55.0, 10),
        ]);
        app.selected_exercises = vec!["Bench".into()];
        let filtered = app.filtered_records();
        assert_eq!(filtered.len(), 2);
        assert!(filtered.iter().all(|r| r.exercise == "Bench"));
    }

    #[test]
    fn stale_selection_is_pruned_on_reload() {
        let mut app = app_with_records(vec![record("2024-01-01", "Bench", 50.0, 10)]);
        app.selected_exercises = vec!["Bench".into(), "Cable Row".into()];

        let generation = app.controller.begin_fetch();
        assert!(app.controller.finish(
            generation,
            Ok(vec![record("2024-01-02", "Overhead Press", 30.0, 12)]),
        ));
        app.apply_loaded_dataset();
        // Nothing from the old selection survives, so everything is selected.
        assert_eq!(app.selected_exercises, vec!["Overhead Press".to_string()]);
    }

    #[test]
    fn header_only_fetch_yields_empty_state() {
        let mut app = MyApp::default();
        let generation = app.controller.begin_fetch();
        let header = vec![vec![
            "date".to_string(),
            "exercise".to_string(),
            "weight".to_string(),
            "reps".to_string(),
        ]];
        let result = parse::parse_rows(&header).map_err(LoadError::Parse);
        assert!(app.controller.finish(generation, result));
        app.apply_loaded_dataset();

        assert_eq!(app.controller.state(), LoadState::Empty);
        assert!(app.filtered_records().is_empty());
        assert!(!app.status_text().is_empty());
    }
}
