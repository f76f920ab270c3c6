use eframe::egui;

use crate::config::ViewerConfig;
use crate::state::{AppState, Interaction};
use crate::ui::{panels, pie, plot};

// ---------------------------------------------------------------------------
// eframe App implementation
// ---------------------------------------------------------------------------

pub struct SalaryLensApp {
    pub state: AppState,
}

impl SalaryLensApp {
    pub fn new(config: ViewerConfig) -> Self {
        let startup_path = config.data_path.clone();
        let mut state = AppState::new(config);
        if let Some(path) = startup_path {
            state.load_path(&path);
        }
        Self { state }
    }
}

impl eframe::App for SalaryLensApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        let mut events: Vec<Interaction> = Vec::new();

        // ---- Top panel: menu bar ----
        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            events.extend(panels::top_bar(ui, &mut self.state));
        });

        // ---- Left side panel: selection + summary ----
        egui::SidePanel::left("selection_panel")
            .default_width(240.0)
            .resizable(true)
            .show(ctx, |ui| {
                events.extend(panels::side_panel(ui, &self.state));
            });

        // ---- Right side panel: pie ----
        egui::SidePanel::right("pie_panel")
            .default_width(280.0)
            .resizable(true)
            .show(ctx, |ui| {
                events.extend(pie::experience_pie(ui, &self.state));
            });

        // ---- Central panel: bars over parallel coordinates ----
        egui::CentralPanel::default().show(ctx, |ui| {
            if self.state.dataset.is_none() {
                ui.centered_and_justified(|ui: &mut egui::Ui| {
                    ui.heading("Open a salary survey to begin  (File → Open…)");
                });
                return;
            }

            let half = (ui.available_height() - 60.0).max(200.0) / 2.0;
            ui.heading("Average Salaries by Job Title");
            events.extend(plot::salary_bar_chart(ui, &self.state, half));

            ui.heading("Parallel Plot of Data Science Jobs");
            events.extend(plot::parallel_plot(ui, &self.state, half));
            if let Some(label) = self.state.hover_label() {
                ui.vertical_centered(|ui: &mut egui::Ui| {
                    ui.label(egui::RichText::new(label).size(20.0));
                });
            }
        });

        // One event at a time, each fully applied before the next.
        for event in events {
            self.state.apply(event);
        }
    }
}
