use std::sync::Arc;

use order_insights::config::DashboardConfig;
use order_insights::data::aggregate::{summarize, AggregateSummary};
use order_insights::data::filter::{filtered_indices, FilterCriteria, FilteredView};
use order_insights::data::loader::DataSource;
use order_insights::data::model::{Dataset, Lateness, OrderRecord};
use order_insights::data::pipeline::Kpis;

use crate::color::PaymentColors;

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// The full UI state, independent of rendering.
pub struct AppState {
    pub config: DashboardConfig,

    /// Versioned handle on the data file.
    source: DataSource,

    /// Loaded dataset (None until the startup load succeeds).
    pub dataset: Option<Arc<Dataset>>,

    /// Current payment-type and lateness selections.
    pub criteria: FilterCriteria,

    /// Indices of orders passing the current criteria (cached).
    pub visible_indices: Vec<usize>,

    /// Statistics of the visible orders.
    pub summary: Option<AggregateSummary>,

    /// Headline numbers of `summary`, formatted.
    pub kpis: Option<Kpis>,

    /// Blocking error shown instead of the dashboard.
    pub load_error: Option<String>,

    /// Bar colour per payment type.
    pub colors: PaymentColors,
}

impl AppState {
    pub fn new(config: DashboardConfig) -> Self {
        let source = DataSource::new(config.data_path.clone(), config.numeric_policy);
        Self {
            config,
            source,
            dataset: None,
            criteria: FilterCriteria::default(),
            visible_indices: Vec::new(),
            summary: None,
            kpis: None,
            load_error: None,
            colors: PaymentColors::default(),
        }
    }

    /// Startup load. On failure nothing but the error is rendered.
    pub fn load(&mut self) {
        match self.source.load() {
            Ok(dataset) => self.set_dataset(dataset),
            Err(e) => {
                log::error!("Failed to load data: {e}");
                let kind = if e.is_unavailable() {
                    "Data unavailable"
                } else {
                    "Data rejected"
                };
                self.load_error = Some(format!("{kind}: {e}"));
                self.dataset = None;
                self.summary = None;
                self.kpis = None;
            }
        }
    }

    /// Ingest a newly loaded dataset with everything selected.
    pub fn set_dataset(&mut self, dataset: Arc<Dataset>) {
        self.criteria = FilterCriteria::all(&dataset);
        self.colors = PaymentColors::new(&dataset.payment_types);
        self.dataset = Some(dataset);
        self.load_error = None;
        self.recompute();
    }

    /// Re-run the whole pipeline after a criteria change. The dataset comes
    /// from the source's cache unless the file changed on disk.
    pub fn refilter(&mut self) {
        match self.source.load() {
            Ok(dataset) => {
                let changed = self
                    .dataset
                    .as_ref()
                    .map_or(true, |current| !Arc::ptr_eq(current, &dataset));
                if changed {
                    // Vanished types leave the selection, new ones join it.
                    let previous = self
                        .dataset
                        .as_ref()
                        .map(|d| d.payment_types.clone())
                        .unwrap_or_default();
                    let selected = &mut self.criteria.payment_types;
                    selected.retain(|p| dataset.payment_types.contains(p));
                    selected.extend(dataset.payment_types.difference(&previous).cloned());
                    self.colors = PaymentColors::new(&dataset.payment_types);
                    self.dataset = Some(dataset);
                }
            }
            Err(e) => log::warn!("Keeping previous data, reload failed: {e}"),
        }
        self.recompute();
    }

    fn recompute(&mut self) {
        let Some(ds) = &self.dataset else {
            return;
        };
        self.visible_indices = filtered_indices(ds, &self.criteria);
        let view = FilteredView::from_indices(ds, self.visible_indices.clone());
        let summary = summarize(&view, self.config.histogram_bins);
        log::debug!(
            "{} of {} orders visible",
            summary.total_orders,
            ds.len()
        );
        self.kpis = Some(Kpis::from_summary(&summary));
        self.summary = Some(summary);
    }

    /// First rows of the filtered view for the preview table.
    pub fn preview_rows(&self) -> Vec<&OrderRecord> {
        let Some(ds) = &self.dataset else {
            return Vec::new();
        };
        self.visible_indices
            .iter()
            .take(self.config.preview_rows)
            .map(|&i| &ds.records[i])
            .collect()
    }

    /// Toggle a single payment type in the selection.
    pub fn toggle_payment_type(&mut self, payment_type: &str) {
        let selected = &mut self.criteria.payment_types;
        if !selected.remove(payment_type) {
            selected.insert(payment_type.to_string());
        }
        self.refilter();
    }

    /// Toggle one lateness flag in the selection.
    pub fn toggle_lateness(&mut self, lateness: Lateness) {
        let selected = &mut self.criteria.lateness;
        if !selected.remove(&lateness) {
            selected.insert(lateness);
        }
        self.refilter();
    }

    /// Select every observed payment type.
    pub fn select_all_payment_types(&mut self) {
        if let Some(ds) = &self.dataset {
            self.criteria.payment_types = ds.payment_types.clone();
            self.refilter();
        }
    }

    /// Deselect all payment types (empties the view).
    pub fn select_no_payment_types(&mut self) {
        self.criteria.payment_types.clear();
        self.refilter();
    }
}
