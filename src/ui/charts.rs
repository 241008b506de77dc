use std::ops::RangeInclusive;

use eframe::egui::{Color32, RichText, Stroke, Ui};
use egui_plot::{
    Bar, BarChart, BoxElem, BoxPlot, BoxSpread, GridMark, Plot, PlotPoints, PlotUi, Points,
};

use order_insights::data::aggregate::{AggregateSummary, GroupMetric};
use order_insights::data::model::Lateness;

use crate::color::{lateness_color, PaymentColors};
use crate::state::AppState;

const CHART_HEIGHT: f32 = 220.0;

// ---------------------------------------------------------------------------
// Chart sections (central panel)
// ---------------------------------------------------------------------------

/// Delivery performance: lateness split, review by lateness, delay
/// distribution and late rate per payment method.
pub fn delivery_section(ui: &mut Ui, state: &AppState) {
    let Some(summary) = &state.summary else {
        return;
    };
    ui.heading("Delivery performance");

    ui.columns(2, |cols| {
        chart_title(&mut cols[0], "Late vs on-time orders", summary);
        lateness_counts_chart(&mut cols[0], summary);
        chart_title(&mut cols[1], "Mean review by delivery status", summary);
        review_by_lateness_chart(&mut cols[1], summary);
    });

    chart_title(ui, "Delay days distribution", summary);
    delay_histogram_chart(ui, summary);

    chart_title(ui, "Late rate per payment method", summary);
    payment_metric_chart(
        ui,
        "late_rate",
        &summary.late_rate_by_payment,
        &state.colors,
        "Late rate",
    );
}

/// Payment behaviour: order counts, mean basket value, repeat rate and the
/// payment value distribution per method.
pub fn payment_section(ui: &mut Ui, state: &AppState) {
    let Some(summary) = &state.summary else {
        return;
    };
    ui.heading("Payment behaviour");

    ui.columns(2, |cols| {
        chart_title(&mut cols[0], "Orders per payment method", summary);
        orders_by_payment_chart(&mut cols[0], summary, &state.colors);
        chart_title(&mut cols[1], "Mean payment value", summary);
        payment_metric_chart(
            &mut cols[1],
            "payment_value",
            &summary.payment_value_by_payment,
            &state.colors,
            "Payment value",
        );
    });

    chart_title(ui, "Repeat customer rate", summary);
    payment_metric_chart(
        ui,
        "repeat_rate",
        &summary.repeat_rate_by_payment,
        &state.colors,
        "Repeat rate",
    );

    chart_title(ui, "Payment value per payment method", summary);
    payment_value_box_chart(ui, summary, &state.colors);
}

fn chart_title(ui: &mut Ui, title: &str, summary: &AggregateSummary) {
    ui.horizontal(|ui: &mut Ui| {
        ui.strong(title);
        if summary.is_empty() {
            ui.label(RichText::new("(no data)").weak());
        }
    });
}

// ---------------------------------------------------------------------------
// Individual charts
// ---------------------------------------------------------------------------

fn lateness_counts_chart(ui: &mut Ui, summary: &AggregateSummary) {
    let bars: Vec<Bar> = summary
        .lateness_counts
        .iter()
        .enumerate()
        .map(|(i, (lateness, count))| {
            Bar::new(i as f64, *count as f64)
                .name(lateness.label())
                .fill(lateness_color(*lateness))
                .width(0.6)
        })
        .collect();

    category_plot(ui, "lateness_counts", lateness_labels(), "Orders", None, |plot_ui| {
        plot_ui.bar_chart(BarChart::new(bars))
    });
}

fn review_by_lateness_chart(ui: &mut Ui, summary: &AggregateSummary) {
    let bars: Vec<Bar> = summary
        .review_by_lateness
        .iter()
        .enumerate()
        .filter_map(|(i, (lateness, mean))| {
            let mean = (*mean)?;
            Some(
                Bar::new(i as f64, mean)
                    .name(lateness.label())
                    .fill(lateness_color(*lateness))
                    .width(0.6),
            )
        })
        .collect();

    category_plot(
        ui,
        "review_by_lateness",
        lateness_labels(),
        "Review score",
        Some(5.0),
        |plot_ui| plot_ui.bar_chart(BarChart::new(bars)),
    );
}

fn delay_histogram_chart(ui: &mut Ui, summary: &AggregateSummary) {
    let histogram = &summary.delay_histogram;
    let width = histogram.bin_width();
    let bars: Vec<Bar> = histogram
        .bars()
        .map(|(center, count)| Bar::new(center, count as f64).width(width))
        .collect();

    Plot::new("delay_histogram")
        .height(CHART_HEIGHT)
        .allow_scroll(false)
        .include_y(0.0)
        .x_axis_label("Delay days")
        .y_axis_label("Orders")
        .show(ui, |plot_ui| {
            plot_ui.bar_chart(BarChart::new(bars).color(Color32::from_rgb(66, 133, 244)))
        });
}

fn orders_by_payment_chart(ui: &mut Ui, summary: &AggregateSummary, colors: &PaymentColors) {
    let labels: Vec<String> = summary.orders_by_payment.iter().map(|g| g.key.clone()).collect();
    let bars: Vec<Bar> = summary
        .orders_by_payment
        .iter()
        .enumerate()
        .map(|(i, g)| {
            Bar::new(i as f64, g.count as f64)
                .name(&g.key)
                .fill(colors.color_for(&g.key))
                .width(0.6)
        })
        .collect();

    category_plot(ui, "orders_by_payment", labels, "Orders", None, |plot_ui| {
        plot_ui.bar_chart(BarChart::new(bars))
    });
}

/// Ranked bars of one per-payment-type mean, in the order given.
fn payment_metric_chart(
    ui: &mut Ui,
    id: &str,
    groups: &[GroupMetric],
    colors: &PaymentColors,
    y_label: &str,
) {
    let labels: Vec<String> = groups.iter().map(|g| g.key.clone()).collect();
    let bars: Vec<Bar> = groups
        .iter()
        .enumerate()
        .filter_map(|(i, g)| {
            let value = g.value?;
            Some(
                Bar::new(i as f64, value)
                    .name(&g.key)
                    .fill(colors.color_for(&g.key))
                    .width(0.6),
            )
        })
        .collect();

    category_plot(ui, id, labels, y_label, None, |plot_ui| {
        plot_ui.bar_chart(BarChart::new(bars))
    });
}

fn payment_value_box_chart(ui: &mut Ui, summary: &AggregateSummary, colors: &PaymentColors) {
    let groups = &summary.payment_value_distribution;
    let labels: Vec<String> = groups.iter().map(|b| b.key.clone()).collect();

    let boxes: Vec<BoxElem> = groups
        .iter()
        .enumerate()
        .map(|(i, b)| {
            let color = colors.color_for(&b.key);
            BoxElem::new(
                i as f64,
                BoxSpread::new(b.lower_whisker, b.q1, b.median, b.q3, b.upper_whisker),
            )
            .name(&b.key)
            .box_width(0.5)
            .whisker_width(0.3)
            .fill(color.gamma_multiply(0.4))
            .stroke(Stroke::new(1.5, color))
        })
        .collect();

    let outliers: Vec<[f64; 2]> = groups
        .iter()
        .enumerate()
        .flat_map(|(i, b)| b.outliers.iter().map(move |&v| [i as f64, v]))
        .collect();

    category_plot(ui, "payment_value_box", labels, "Payment value", None, |plot_ui| {
        plot_ui.box_plot(BoxPlot::new(boxes));
        plot_ui.points(
            Points::new(PlotPoints::from(outliers))
                .radius(2.5)
                .color(Color32::DARK_GRAY)
                .name("outliers"),
        );
    });
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn lateness_labels() -> Vec<String> {
    Lateness::ALL.iter().map(|l| l.label().to_string()).collect()
}

/// A plot whose x positions 0, 1, 2, ... are labelled by `labels`.
fn category_plot(
    ui: &mut Ui,
    id: &str,
    labels: Vec<String>,
    y_label: &str,
    include_y: Option<f64>,
    build: impl FnOnce(&mut PlotUi),
) {
    let mut plot = Plot::new(id)
        .height(CHART_HEIGHT)
        .allow_scroll(false)
        .allow_drag(false)
        .include_y(0.0)
        .y_axis_label(y_label)
        .x_axis_formatter(move |mark: GridMark, _range: &RangeInclusive<f64>| {
            category_label(&labels, mark.value)
        });
    if let Some(y) = include_y {
        plot = plot.include_y(y);
    }
    plot.show(ui, build);
}

fn category_label(labels: &[String], position: f64) -> String {
    let rounded = position.round();
    if (position - rounded).abs() > 1e-6 || rounded < 0.0 {
        return String::new();
    }
    labels.get(rounded as usize).cloned().unwrap_or_default()
}
