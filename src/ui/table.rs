use eframe::egui::{RichText, Ui};
use egui_extras::{Column, TableBuilder};

use crate::state::AppState;

const ROW_HEIGHT: f32 = 18.0;

// ---------------------------------------------------------------------------
// Preview table – first rows of the filtered view
// ---------------------------------------------------------------------------

pub fn preview_table(ui: &mut Ui, state: &AppState) {
    let Some(dataset) = &state.dataset else {
        return;
    };
    ui.heading("Preview");

    let rows = state.preview_rows();
    if rows.is_empty() {
        ui.label(RichText::new("No orders match the current filters.").weak());
        return;
    }

    let columns = &dataset.columns;
    TableBuilder::new(ui)
        .striped(true)
        .resizable(true)
        .vscroll(false)
        .columns(Column::auto().at_least(70.0), columns.len())
        .header(ROW_HEIGHT + 2.0, |mut header| {
            for name in columns {
                header.col(|ui| {
                    ui.strong(name);
                });
            }
        })
        .body(|body| {
            body.rows(ROW_HEIGHT, rows.len(), |mut row| {
                let record = rows[row.index()];
                for name in columns {
                    row.col(|ui| {
                        ui.label(record.cell(name));
                    });
                }
            });
        });
}
