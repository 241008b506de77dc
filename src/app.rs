use eframe::egui::{self, ScrollArea};

use order_insights::config::DashboardConfig;

use crate::state::AppState;
use crate::ui::{charts, panels, table};

// ---------------------------------------------------------------------------
// eframe App implementation
// ---------------------------------------------------------------------------

pub struct DashboardApp {
    pub state: AppState,
}

impl DashboardApp {
    /// Build the app and load the data file once, before the first frame.
    pub fn new(config: DashboardConfig) -> Self {
        let mut state = AppState::new(config);
        state.load();
        Self { state }
    }
}

impl eframe::App for DashboardApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // ---- Top panel: title and counts ----
        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            panels::top_bar(ui, &self.state);
        });

        // ---- Unusable data file: nothing else renders ----
        if let Some(message) = &self.state.load_error {
            let path = self.state.config.data_path.display().to_string();
            egui::CentralPanel::default().show(ctx, |ui| {
                panels::load_error(ui, message, &path);
            });
            return;
        }

        // ---- Left side panel: filters ----
        egui::SidePanel::left("filter_panel")
            .default_width(220.0)
            .resizable(true)
            .show(ctx, |ui| {
                panels::side_panel(ui, &mut self.state);
            });

        // ---- Central panel: KPIs, charts, preview ----
        egui::CentralPanel::default().show(ctx, |ui| {
            ScrollArea::vertical()
                .auto_shrink([false, false])
                .show(ui, |ui| {
                    panels::kpi_row(ui, &self.state);
                    ui.separator();
                    charts::delivery_section(ui, &self.state);
                    ui.separator();
                    charts::payment_section(ui, &self.state);
                    ui.separator();
                    table::preview_table(ui, &self.state);
                });
        });
    }
}
