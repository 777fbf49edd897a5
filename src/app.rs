use eframe::egui;

use heart_explorer::state::AppState;

use crate::ui::{panels, plot};

// ---------------------------------------------------------------------------
// eframe App implementation
// ---------------------------------------------------------------------------

pub struct HeartExplorerApp {
    pub state: AppState,
}

impl eframe::App for HeartExplorerApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // ---- Top panel: menu bar ----
        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            panels::top_bar(ui, &mut self.state);
        });

        // ---- Left side panel: primary filters ----
        egui::SidePanel::left("filter_panel")
            .default_width(240.0)
            .resizable(true)
            .show(ctx, |ui| {
                panels::filter_panel(ui, &mut self.state);
            });

        // ---- Central panel: categorical and numerical columns ----
        egui::CentralPanel::default().show(ctx, |ui| {
            if self.state.session.is_none() {
                ui.centered_and_justified(|ui| {
                    ui.heading("Open a dataset to start exploring  (File → Open…)");
                });
                return;
            }
            ui.columns(2, |columns| {
                egui::ScrollArea::vertical()
                    .id_salt("categorical")
                    .show(&mut columns[0], |ui| {
                        panels::categorical_controls(ui, &mut self.state);
                        plot::categorical_views(ui, &self.state);
                    });
                egui::ScrollArea::vertical()
                    .id_salt("numerical")
                    .show(&mut columns[1], |ui| {
                        panels::scatter_controls(ui, &mut self.state);
                        plot::scatter_view(ui, &self.state);
                        ui.separator();
                        panels::distribution_controls(ui, &mut self.state);
                        plot::distribution_view(ui, &self.state);
                    });
            });
        });
    }
}
