use super::aggregate::{summarize, AggregateSummary, DEFAULT_HISTOGRAM_BINS};
use super::filter::{FilterCriteria, FilteredView};
use super::model::Dataset;

/// Filter the dataset and summarise what is left. Pure: the same inputs
/// always give the same outputs.
pub fn apply<'a>(
    dataset: &'a Dataset,
    criteria: &FilterCriteria,
) -> (FilteredView<'a>, AggregateSummary) {
    apply_with(dataset, criteria, DEFAULT_HISTOGRAM_BINS)
}

pub fn apply_with<'a>(
    dataset: &'a Dataset,
    criteria: &FilterCriteria,
    histogram_bins: usize,
) -> (FilteredView<'a>, AggregateSummary) {
    let view = FilteredView::new(dataset, criteria);
    let summary = summarize(&view, histogram_bins);
    log::debug!(
        "Filtered {} of {} orders ({} payment types, {} lateness flags selected)",
        view.len(),
        dataset.len(),
        criteria.payment_types.len(),
        criteria.lateness.len()
    );
    (view, summary)
}

// ---------------------------------------------------------------------------
// KPI display strings
// ---------------------------------------------------------------------------

/// Shown in place of a mean when the view has no data.
pub const NO_DATA: &str = "N/A";

/// The four headline numbers, formatted for display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Kpis {
    pub total_orders: String,
    pub mean_review_score: String,
    pub mean_delay_days: String,
    pub repeat_customer_pct: String,
}

impl Kpis {
    pub fn from_summary(summary: &AggregateSummary) -> Self {
        let two_dp =
            |v: Option<f64>| v.map_or_else(|| NO_DATA.to_string(), |v| format!("{v:.2}"));
        Kpis {
            total_orders: summary.total_orders.to_string(),
            mean_review_score: two_dp(summary.mean_review_score),
            mean_delay_days: two_dp(summary.mean_delay_days),
            repeat_customer_pct: summary
                .repeat_customer_pct
                .map_or_else(|| NO_DATA.to_string(), |v| format!("{v:.2}%")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::aggregate::round2;
    use crate::data::model::Lateness;
    use crate::data::test_support::{dataset, full_record, sample_dataset};

    #[test]
    fn applying_twice_is_identical() {
        let ds = sample_dataset();
        let mut criteria = FilterCriteria::all(&ds);
        criteria.payment_types.remove("boleto");

        let (view_a, summary_a) = apply(&ds, &criteria);
        let (view_b, summary_b) = apply(&ds, &criteria);
        assert_eq!(view_a, view_b);
        assert_eq!(summary_a, summary_b);
        assert_eq!(format!("{summary_a:?}"), format!("{summary_b:?}"));
    }

    #[test]
    fn kpis_format_two_decimals_and_percent() {
        let ds = sample_dataset();
        let (_, summary) = apply(&ds, &FilterCriteria::all(&ds));
        let kpis = Kpis::from_summary(&summary);
        assert_eq!(kpis.total_orders, "8");
        assert_eq!(kpis.mean_review_score, "3.25");
        // -2.125 is an exact tie and rounds to even.
        assert_eq!(kpis.mean_delay_days, "-2.12");
        assert_eq!(kpis.repeat_customer_pct, "37.50%");
    }

    #[test]
    fn kpi_rounding_happens_once() {
        let ds = dataset(vec![
            full_record("boleto", 0, 4.0, -2.0, 0.0, 10.0),
            full_record("boleto", 0, 4.0, -2.25, 0.0, 10.0),
        ]);
        let (_, summary) = apply(&ds, &FilterCriteria::all(&ds));
        assert_eq!(summary.mean_delay_days, Some(-2.125));
        assert_eq!(Kpis::from_summary(&summary).mean_delay_days, "-2.12");

        let mut records = vec![full_record("voucher", 0, 4.0, 0.0, 0.0, 10.0); 799];
        records.push(full_record("voucher", 0, 4.0, 0.0, 1.0, 10.0));
        let ds = dataset(records);
        let (_, summary) = apply(&ds, &FilterCriteria::all(&ds));
        let exact = 1.0 / 800.0 * 100.0;
        assert_eq!(summary.repeat_customer_pct, Some(round2(exact)));
        assert_eq!(
            Kpis::from_summary(&summary).repeat_customer_pct,
            format!("{exact:.2}%")
        );
    }

    #[test]
    fn kpis_show_no_data_for_empty_view() {
        let ds = sample_dataset();
        let criteria = FilterCriteria {
            payment_types: Default::default(),
            lateness: Lateness::ALL.into_iter().collect(),
        };
        let (view, summary) = apply(&ds, &criteria);
        assert!(view.is_empty());
        let kpis = Kpis::from_summary(&summary);
        assert_eq!(kpis.total_orders, "0");
        assert_eq!(kpis.mean_review_score, NO_DATA);
        assert_eq!(kpis.mean_delay_days, NO_DATA);
        assert_eq!(kpis.repeat_customer_pct, NO_DATA);
    }

    #[test]
    fn custom_bin_count_is_honoured() {
        let ds = sample_dataset();
        let (_, summary) = apply_with(&ds, &FilterCriteria::all(&ds), 7);
        assert_eq!(summary.delay_histogram.counts.len(), 7);
    }
}
