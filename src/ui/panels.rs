use eframe::egui::{self, Color32, RichText, Ui};

use heart_explorer::chart;
use heart_explorer::config::AGE_STEP;
use heart_explorer::filter;
use heart_explorer::state::{AppState, Change, Session};
use heart_explorer::{ExploreError, SexFilter};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Combo box over `options`; returns the newly picked value, if any.
fn combo(ui: &mut Ui, id: &str, current: &str, options: &[String]) -> Option<String> {
    let mut picked = None;
    egui::ComboBox::from_id_salt(id)
        .selected_text(current)
        .width(ui.available_width() * 0.9)
        .show_ui(ui, |ui: &mut Ui| {
            for option in options {
                if ui.selectable_label(current == option, option).clicked() && current != option {
                    picked = Some(option.clone());
                }
            }
        });
    picked
}

fn directions(ui: &mut Ui, text: &str) {
    ui.label(RichText::new(text).size(14.0));
}

/// Apply queued selector changes once the session borrow has ended.
fn apply_all(state: &mut AppState, changes: Vec<Change>) {
    for change in changes {
        state.apply(change);
    }
}

// ---------------------------------------------------------------------------
// Left side panel – primary filters
// ---------------------------------------------------------------------------

/// Render the sex selector and the age range sliders.
pub fn filter_panel(ui: &mut Ui, state: &mut AppState) {
    ui.heading("Primary filters");
    ui.separator();

    let Some(session) = &state.session else {
        ui.label("No dataset loaded.");
        return;
    };
    let mut changes = Vec::new();
    let dataset = session.explorer().dataset();
    let selections = &session.selections;

    directions(ui, "Select a gender:");
    let mut sex_options = vec!["Any".to_string()];
    sex_options.extend(dataset.sex_values().iter().cloned());
    if let Some(v) = combo(ui, "sex_input", &selections.sex.to_string(), &sex_options) {
        changes.push(Change::Sex(SexFilter::from_selector(&v)));
    }
    ui.add_space(8.0);

    directions(ui, "Select an age range:");
    let (min_age, max_age) = dataset.age_range();
    let (mut low, mut high) = selections.age_range;
    let low_changed = ui
        .add(egui::Slider::new(&mut low, min_age..=max_age).step_by(AGE_STEP as f64).text("from"))
        .changed();
    let high_changed = ui
        .add(egui::Slider::new(&mut high, min_age..=max_age).step_by(AGE_STEP as f64).text("to"))
        .changed();
    if low_changed || high_changed {
        // Dragging one handle past the other pushes it along.
        if low > high {
            if low_changed {
                high = low;
            } else {
                low = high;
            }
        }
        changes.push(Change::AgeRange(low, high));
    }

    ui.separator();
    let kept = filter(dataset, &selections.filters()).len();
    ui.label(format!("{kept} of {} patients selected", dataset.len()));

    apply_all(state, changes);
}

// ---------------------------------------------------------------------------
// Central panel controls
// ---------------------------------------------------------------------------

pub fn categorical_controls(ui: &mut Ui, state: &mut AppState) {
    let Some(session) = &state.session else {
        return;
    };
    ui.heading("Categorical values");
    directions(ui, "Select a categorical predictor:");
    let options = session.explorer().dataset().categorical_predictors();
    let picked = combo(ui, "predictors_cat_input", &session.selections.categorical, options);
    if let Some(v) = picked {
        state.apply(Change::CategoricalPredictor(v));
    }
}

pub fn scatter_controls(ui: &mut Ui, state: &mut AppState) {
    let Some(session) = &state.session else {
        return;
    };
    let mut changes = Vec::new();
    let selections = &session.selections;

    ui.heading("Numerical values");
    ui.label(RichText::new("Heart disease scatter plot").size(16.0));
    directions(ui, "Select two numerical predictors for the scatter plot:");

    let all = session.explorer().dataset().numeric_predictors();
    if let Some(v) = combo(ui, "predictors_num_input1", &selections.scatter_x, all) {
        changes.push(Change::ScatterX(v));
    }
    let second = &session.second_options;
    if let Some(v) = combo(ui, "predictors_num_input2", &selections.scatter_y, second) {
        changes.push(Change::ScatterY(v));
    }

    let mut smoothing = selections.smoothing;
    if ui.checkbox(&mut smoothing, "Lowess (optional)").changed() {
        changes.push(Change::SmoothingToggle(smoothing));
    }

    if session.smoothing_panel_visible {
        directions(ui, "Select the fraction of data used for the lowess (0 to 1):");
        let mut fraction = selections.fraction.clone();
        let invalid = match &session.scatter {
            Ok(view) => matches!(
                view.smoothing_error,
                Some(ExploreError::InvalidSmoothingFraction(_))
            ),
            Err(_) => false,
        };
        let edit = egui::TextEdit::singleline(&mut fraction)
            .text_color_opt(invalid.then_some(Color32::RED));
        if ui.add(edit).changed() {
            changes.push(Change::SmoothingFraction(fraction));
        }
    }

    apply_all(state, changes);
}

pub fn distribution_controls(ui: &mut Ui, state: &mut AppState) {
    let Some(session) = &state.session else {
        return;
    };
    ui.label(RichText::new("Heart disease box plot").size(16.0));
    directions(ui, "Select a numerical predictor for the box plot:");
    let options = session.explorer().dataset().numeric_predictors();
    let picked = combo(ui, "predictors_num_input", &session.selections.distribution, options);
    if let Some(v) = picked {
        state.apply(Change::DistributionPredictor(v));
    }
}

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top menu / toolbar.
pub fn top_bar(ui: &mut Ui, state: &mut AppState) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.menu_button("File", |ui: &mut Ui| {
            if ui.button("Open…").clicked() {
                open_file_dialog(state);
                ui.close_menu();
            }
            ui.add_enabled_ui(state.session.is_some(), |ui: &mut Ui| {
                ui.menu_button("Export Vega-Lite", |ui: &mut Ui| {
                    for (label, file) in [
                        ("Sunburst chart", "sunburst.json"),
                        ("Bar chart", "bar_chart.json"),
                        ("Scatter plot", "scatter_plot.json"),
                        ("Box plot", "box_plot.json"),
                    ] {
                        if ui.button(label).clicked() {
                            export_spec(state, file);
                            ui.close_menu();
                        }
                    }
                });
            });
        });

        ui.separator();
        ui.strong("Heart Disease data exploration dashboard");

        if let Some(msg) = &state.status_message {
            ui.separator();
            ui.label(RichText::new(msg).color(Color32::RED));
        }
    });
}

// ---------------------------------------------------------------------------
// File dialogs
// ---------------------------------------------------------------------------

pub fn open_file_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Open heart disease data")
        .add_filter("Supported files", &["csv", "json", "parquet", "pq"])
        .add_filter("CSV", &["csv"])
        .add_filter("JSON", &["json"])
        .add_filter("Parquet", &["parquet", "pq"])
        .pick_file();

    if let Some(path) = file {
        state.open(&path.to_string_lossy());
    }
}

/// Chart spec of the view exported under `file`, when it rendered.
fn spec_for(session: &Session, file: &str) -> Option<serde_json::Value> {
    match file {
        "sunburst.json" => session.hierarchy.as_ref().ok().map(chart::hierarchy_spec),
        "bar_chart.json" => session.proportions.as_ref().ok().map(chart::proportion_spec),
        "scatter_plot.json" => {
            session.scatter.as_ref().ok().map(|v| chart::scatter_spec(&v.series))
        }
        "box_plot.json" => session.distribution.as_ref().ok().map(chart::distribution_spec),
        _ => None,
    }
}

fn export_spec(state: &mut AppState, file: &str) {
    let Some(spec) = state.session.as_ref().and_then(|s| spec_for(s, file)) else {
        state.status_message = Some(format!("Nothing to export for {file}"));
        return;
    };
    let Some(path) = rfd::FileDialog::new()
        .set_title("Export Vega-Lite spec")
        .set_file_name(file)
        .add_filter("Vega-Lite", &["json"])
        .save_file()
    else {
        return;
    };

    let written = serde_json::to_string_pretty(&spec)
        .map_err(anyhow::Error::from)
        .and_then(|text| std::fs::write(&path, text).map_err(anyhow::Error::from));
    match written {
        Ok(()) => log::info!("Exported {file} to {}", path.display()),
        Err(e) => {
            log::error!("Failed to export {file}: {e:#}");
            state.status_message = Some(format!("Error: {e:#}"));
        }
    }
}
