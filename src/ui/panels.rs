use eframe::egui::{self, Color32, RichText, ScrollArea, Ui};

use order_insights::data::model::Lateness;

use crate::color::lateness_color;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Left side panel – filter widgets
// ---------------------------------------------------------------------------

/// A click in the side panel, applied after the widgets are drawn.
enum FilterAction {
    TogglePayment(String),
    AllPayments,
    NoPayments,
    ToggleLateness(Lateness),
}

/// Render the left filter panel.
pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    ui.heading("Filter data");
    ui.separator();

    let Some(dataset) = &state.dataset else {
        ui.label("No dataset loaded.");
        return;
    };

    let mut actions = Vec::new();

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            // ---- Payment method ----
            let n_selected = state.criteria.payment_types.len();
            let n_total = dataset.payment_types.len();
            ui.strong(format!("Payment method  ({n_selected}/{n_total})"));
            ui.horizontal(|ui: &mut Ui| {
                if ui.small_button("All").clicked() {
                    actions.push(FilterAction::AllPayments);
                }
                if ui.small_button("None").clicked() {
                    actions.push(FilterAction::NoPayments);
                }
            });

            for payment_type in &dataset.payment_types {
                let mut checked = state.criteria.payment_types.contains(payment_type);
                let text = RichText::new(payment_type).color(state.colors.color_for(payment_type));
                if ui.checkbox(&mut checked, text).changed() {
                    actions.push(FilterAction::TogglePayment(payment_type.clone()));
                }
            }
            ui.separator();

            // ---- Delivery status ----
            ui.strong("Delivery status");
            for lateness in Lateness::ALL {
                let mut checked = state.criteria.lateness.contains(&lateness);
                let text = RichText::new(lateness.label()).color(lateness_color(lateness));
                if ui.checkbox(&mut checked, text).changed() {
                    actions.push(FilterAction::ToggleLateness(lateness));
                }
            }
        });

    for action in actions {
        match action {
            FilterAction::TogglePayment(p) => state.toggle_payment_type(&p),
            FilterAction::AllPayments => state.select_all_payment_types(),
            FilterAction::NoPayments => state.select_no_payment_types(),
            FilterAction::ToggleLateness(l) => state.toggle_lateness(l),
        }
    }
}

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top title / status bar.
pub fn top_bar(ui: &mut Ui, state: &AppState) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.strong("E-Commerce Delivery & Payment Dashboard");
        ui.separator();

        if let Some(ds) = &state.dataset {
            ui.label(format!(
                "{} orders loaded, {} visible",
                ds.len(),
                state.visible_indices.len()
            ));
        }

        if let Some(msg) = &state.load_error {
            ui.separator();
            ui.label(RichText::new(msg).color(Color32::RED));
        }
    });
}

// ---------------------------------------------------------------------------
// KPI row
// ---------------------------------------------------------------------------

pub fn kpi_row(ui: &mut Ui, state: &AppState) {
    let Some(kpis) = &state.kpis else {
        return;
    };
    ui.heading("Summary");
    ui.columns(4, |cols| {
        metric(&mut cols[0], "Total orders", &kpis.total_orders);
        metric(&mut cols[1], "Mean review", &kpis.mean_review_score);
        metric(&mut cols[2], "Mean delay (days)", &kpis.mean_delay_days);
        metric(&mut cols[3], "Repeat customers", &kpis.repeat_customer_pct);
    });
}

fn metric(ui: &mut Ui, label: &str, value: &str) {
    ui.group(|ui: &mut Ui| {
        ui.vertical(|ui: &mut Ui| {
            ui.label(RichText::new(label).weak());
            ui.label(RichText::new(value).size(26.0).strong());
        });
    });
}

// ---------------------------------------------------------------------------
// Blocking load error
// ---------------------------------------------------------------------------

pub fn load_error(ui: &mut Ui, message: &str, path: &str) {
    ui.centered_and_justified(|ui: &mut Ui| {
        ui.vertical_centered(|ui: &mut Ui| {
            ui.heading(RichText::new("The dashboard cannot be shown").color(Color32::RED));
            ui.label(message);
            ui.label(format!("Expected the orders file at {path}"));
        });
    });
}
