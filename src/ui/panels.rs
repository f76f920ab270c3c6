use eframe::egui::{self, Color32, RichText, ScrollArea, Ui};
use egui_extras::{Column, TableBuilder};

use crate::color::ACCENT;
use crate::data::model::ExperienceLevel;
use crate::selection::SelectionPhase;
use crate::state::{AppState, Interaction};

// ---------------------------------------------------------------------------
// Left side panel – selection and summary
// ---------------------------------------------------------------------------

/// Render the left panel. Clicking an active chip deselects it.
pub fn side_panel(ui: &mut Ui, state: &AppState) -> Vec<Interaction> {
    let mut events = Vec::new();

    ui.heading("Selection");
    ui.separator();

    if state.dataset.is_none() {
        ui.label("No dataset loaded.");
        return events;
    }

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            if state.selection.phase() == SelectionPhase::Unfiltered {
                ui.label("Nothing selected – click bars or pie slices.");
            } else if ui.button("Clear selection").clicked() {
                events.push(Interaction::ResetSelection);
            }

            // ---- Active experience levels (pie: single-select) ----
            ui.add_space(4.0);
            ui.strong("Experience level");
            for &level in state.selection.experience_levels() {
                let chip = RichText::new(format!("✕ {}", level.label()))
                    .color(state.color_map.color_for(level));
                if ui.selectable_label(true, chip).clicked() {
                    events.push(Interaction::ClickSlice(level));
                }
            }

            // ---- Active job titles (bars: multi-select) ----
            ui.add_space(4.0);
            ui.strong("Job titles");
            for title in state.selection.job_titles() {
                let chip = RichText::new(format!("✕ {title}")).color(ACCENT);
                if ui.selectable_label(true, chip).clicked() {
                    events.push(Interaction::ClickBar(title.clone()));
                }
            }

            ui.separator();
            summary_table(ui, state);
        });

    events
}

/// Count / mean / max salary per experience level of the visible records.
fn summary_table(ui: &mut Ui, state: &AppState) {
    ui.strong("Visible records by level");
    TableBuilder::new(ui)
        .striped(true)
        .column(Column::auto())
        .column(Column::auto())
        .column(Column::auto())
        .column(Column::remainder())
        .header(18.0, |mut header| {
            for title in ["Level", "Count", "Mean", "Max"] {
                header.col(|ui| {
                    ui.strong(title);
                });
            }
        })
        .body(|mut body| {
            for row in &state.views.level_summary {
                let label = ExperienceLevel::parse(&row.key).map_or(row.key.as_str(), |l| l.label());
                body.row(18.0, |mut table_row| {
                    table_row.col(|ui| {
                        ui.label(label);
                    });
                    table_row.col(|ui| {
                        ui.label(row.count.to_string());
                    });
                    table_row.col(|ui| {
                        ui.label(format!("${:.0}", row.mean_salary));
                    });
                    table_row.col(|ui| {
                        ui.label(format!("${:.0}", row.max_salary));
                    });
                });
            }
        });
}

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top menu / toolbar.
pub fn top_bar(ui: &mut Ui, state: &mut AppState) -> Vec<Interaction> {
    let mut events = Vec::new();

    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.menu_button("File", |ui: &mut Ui| {
            if ui.button("Open…").clicked() {
                open_file_dialog(state);
                ui.close_menu();
            }
        });

        ui.separator();

        if let Some(ds) = &state.dataset {
            ui.label(format!(
                "{} records loaded ({} excluded), {} visible",
                ds.len(),
                ds.rejected_total(),
                state.views.visible_indices.len()
            ));
            ui.separator();
            if ui
                .add_enabled(
                    state.selection.phase() == SelectionPhase::Filtered,
                    egui::Button::new("Reset selection"),
                )
                .clicked()
            {
                events.push(Interaction::ResetSelection);
            }
        }

        if let Some(msg) = &state.status_message {
            ui.label(RichText::new(msg).color(Color32::RED));
        }
    });

    events
}

// ---------------------------------------------------------------------------
// File dialog
// ---------------------------------------------------------------------------

pub fn open_file_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Open salary survey")
        .add_filter("Supported files", &["csv", "json", "parquet", "pq"])
        .add_filter("CSV", &["csv"])
        .add_filter("JSON", &["json"])
        .add_filter("Parquet", &["parquet", "pq"])
        .pick_file();

    if let Some(path) = file {
        state.load_path(&path);
    }
}
