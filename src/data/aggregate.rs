use std::cmp::Ordering;
use std::collections::BTreeMap;

use super::filter::FilteredView;
use super::model::{Lateness, OrderRecord};

/// Bin count of the delay-days histogram.
pub const DEFAULT_HISTOGRAM_BINS: usize = 50;

/// Multiplier of the interquartile range beyond which a value is an outlier.
pub const IQR_FENCE: f64 = 1.5;

// ---------------------------------------------------------------------------
// Chart-ready structures
// ---------------------------------------------------------------------------

/// One bar of a per-payment-type metric. `None` means the group had no
/// usable values for this metric.
#[derive(Debug, Clone, PartialEq)]
pub struct GroupMetric {
    pub key: String,
    pub value: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupCount {
    pub key: String,
    pub count: usize,
}

/// Equal-width histogram.
///
/// The edges come from the min/max of the values it was built from, so two
/// different filter selections generally produce different bin boundaries.
/// Charts rely on this; do not switch to fixed global bins.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Histogram {
    /// `counts.len() + 1` ascending edges; empty when there was no data.
    pub edges: Vec<f64>,
    pub counts: Vec<usize>,
}

impl Histogram {
    /// Bin the finite values. A constant input is widened to `±0.5` around
    /// the value; the last bin is closed on the right.
    pub fn compute(values: impl IntoIterator<Item = f64>, bins: usize) -> Self {
        let finite: Vec<f64> = values.into_iter().filter(|v| v.is_finite()).collect();
        if finite.is_empty() || bins == 0 {
            return Histogram::default();
        }

        let mut lo = finite.iter().copied().fold(f64::INFINITY, f64::min);
        let mut hi = finite.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        if lo == hi {
            lo -= 0.5;
            hi += 0.5;
        }
        let span = hi - lo;

        let edges = (0..=bins)
            .map(|i| lo + span * i as f64 / bins as f64)
            .collect();
        let mut counts = vec![0usize; bins];
        for v in finite {
            let idx = (((v - lo) / span) * bins as f64) as usize;
            counts[idx.min(bins - 1)] += 1;
        }

        Histogram { edges, counts }
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    pub fn total(&self) -> usize {
        self.counts.iter().sum()
    }

    pub fn bin_width(&self) -> f64 {
        match (self.edges.first(), self.edges.last()) {
            (Some(lo), Some(hi)) if !self.counts.is_empty() => (hi - lo) / self.counts.len() as f64,
            _ => 0.0,
        }
    }

    /// `(center, count)` per bin.
    pub fn bars(&self) -> impl Iterator<Item = (f64, usize)> + '_ {
        self.edges
            .windows(2)
            .zip(&self.counts)
            .map(|(w, &c)| ((w[0] + w[1]) / 2.0, c))
    }
}

/// Box-plot statistics of one group, using the 1.5×IQR outlier rule.
#[derive(Debug, Clone, PartialEq)]
pub struct BoxStats {
    pub key: String,
    pub count: usize,
    pub min: f64,
    pub q1: f64,
    pub median: f64,
    pub q3: f64,
    pub max: f64,
    /// Most extreme values still inside the fences.
    pub lower_whisker: f64,
    pub upper_whisker: f64,
    /// Values outside `[q1 - 1.5·IQR, q3 + 1.5·IQR]`, ascending.
    pub outliers: Vec<f64>,
}

impl BoxStats {
    /// `None` when there is no finite value to describe.
    pub fn compute(key: &str, values: impl IntoIterator<Item = f64>) -> Option<Self> {
        let mut sorted: Vec<f64> = values.into_iter().filter(|v| v.is_finite()).collect();
        if sorted.is_empty() {
            return None;
        }
        sorted.sort_by(f64::total_cmp);

        let q1 = quantile(&sorted, 0.25);
        let median = quantile(&sorted, 0.5);
        let q3 = quantile(&sorted, 0.75);
        let iqr = q3 - q1;
        let low_fence = q1 - IQR_FENCE * iqr;
        let high_fence = q3 + IQR_FENCE * iqr;

        let inside = || sorted.iter().copied().filter(|v| (low_fence..=high_fence).contains(v));
        // The quartiles always lie inside the fences, so `inside` is never empty.
        let lower_whisker = inside().next().unwrap_or(q1);
        let upper_whisker = inside().last().unwrap_or(q3);
        let outliers = sorted
            .iter()
            .copied()
            .filter(|v| *v < low_fence || *v > high_fence)
            .collect();

        Some(BoxStats {
            key: key.to_string(),
            count: sorted.len(),
            min: sorted[0],
            q1,
            median,
            q3,
            max: sorted[sorted.len() - 1],
            lower_whisker,
            upper_whisker,
            outliers,
        })
    }
}

// ---------------------------------------------------------------------------
// AggregateSummary
// ---------------------------------------------------------------------------

/// Every statistic the dashboard shows for one filtered view.
///
/// Means are `None` when the view has no usable values ("no data"). Grouped
/// outputs are empty, never missing, when the view is empty.
#[derive(Debug, Clone, PartialEq)]
pub struct AggregateSummary {
    pub total_orders: usize,
    pub mean_review_score: Option<f64>,
    pub mean_delay_days: Option<f64>,
    /// Share of repeat customers ×100, rounded to two decimals by [`round2`].
    pub repeat_customer_pct: Option<f64>,

    /// Both buckets always present, on-time first.
    pub lateness_counts: BTreeMap<Lateness, usize>,
    pub review_by_lateness: BTreeMap<Lateness, Option<f64>>,
    pub delay_histogram: Histogram,
    /// Ascending by late rate.
    pub late_rate_by_payment: Vec<GroupMetric>,
    /// Descending by count.
    pub orders_by_payment: Vec<GroupCount>,
    /// Ascending by mean payment value.
    pub payment_value_by_payment: Vec<GroupMetric>,
    /// Ascending by repeat rate.
    pub repeat_rate_by_payment: Vec<GroupMetric>,
    /// In payment-type order.
    pub payment_value_distribution: Vec<BoxStats>,
}

impl AggregateSummary {
    /// The view had no rows. Not an error: every field holds its
    /// "no data" value.
    pub fn is_empty(&self) -> bool {
        self.total_orders == 0
    }
}

/// Compute the full summary of a view.
pub fn summarize(view: &FilteredView<'_>, histogram_bins: usize) -> AggregateSummary {
    let rows: Vec<&OrderRecord> = view.rows().collect();

    let mut by_lateness: BTreeMap<Lateness, Vec<&OrderRecord>> =
        Lateness::ALL.into_iter().map(|l| (l, Vec::new())).collect();
    let mut by_payment: BTreeMap<&str, Vec<&OrderRecord>> = BTreeMap::new();
    for &row in &rows {
        if let Some(l) = row.is_late {
            by_lateness.entry(l).or_default().push(row);
        }
        by_payment.entry(row.payment_type.as_str()).or_default().push(row);
    }

    let mut orders_by_payment: Vec<GroupCount> = by_payment
        .iter()
        .map(|(key, group)| GroupCount {
            key: key.to_string(),
            count: group.len(),
        })
        .collect();
    orders_by_payment.sort_by(|a, b| b.count.cmp(&a.count));

    AggregateSummary {
        total_orders: rows.len(),
        mean_review_score: mean(rows.iter().map(|r| r.review_score)),
        mean_delay_days: mean(rows.iter().map(|r| r.delay_days)),
        repeat_customer_pct: mean(rows.iter().map(|r| r.is_repeat_customer))
            .map(|m| round2(m * 100.0)),
        lateness_counts: by_lateness.iter().map(|(l, g)| (*l, g.len())).collect(),
        review_by_lateness: by_lateness
            .iter()
            .map(|(l, g)| (*l, mean(g.iter().map(|r| r.review_score))))
            .collect(),
        delay_histogram: Histogram::compute(rows.iter().map(|r| r.delay_days), histogram_bins),
        late_rate_by_payment: group_means(&by_payment, OrderRecord::late_flag),
        orders_by_payment,
        payment_value_by_payment: group_means(&by_payment, |r| r.payment_value),
        repeat_rate_by_payment: group_means(&by_payment, |r| r.is_repeat_customer),
        payment_value_distribution: by_payment
            .iter()
            .filter_map(|(key, group)| BoxStats::compute(key, group.iter().map(|r| r.payment_value)))
            .collect(),
    }
}

/// Mean of `metric` per payment type, ascending. The sort is stable, so equal
/// means keep payment-type order.
fn group_means(
    by_payment: &BTreeMap<&str, Vec<&OrderRecord>>,
    metric: fn(&OrderRecord) -> f64,
) -> Vec<GroupMetric> {
    let mut groups: Vec<GroupMetric> = by_payment
        .iter()
        .map(|(key, group)| GroupMetric {
            key: key.to_string(),
            value: mean(group.iter().map(|r| metric(r))),
        })
        .collect();
    groups.sort_by(|a, b| ascending_missing_last(a.value, b.value));
    groups
}

// ---------------------------------------------------------------------------
// Numeric helpers
// ---------------------------------------------------------------------------

/// Mean of the finite values; `None` if there are none.
pub fn mean(values: impl IntoIterator<Item = f64>) -> Option<f64> {
    let (sum, n) = values
        .into_iter()
        .filter(|v| v.is_finite())
        .fold((0.0, 0usize), |(s, n), v| (s + v, n + 1));
    (n > 0).then(|| sum / n as f64)
}

/// Linear interpolation between closest ranks. `sorted` must be ascending
/// and non-empty.
pub fn quantile(sorted: &[f64], q: f64) -> f64 {
    let pos = q.clamp(0.0, 1.0) * (sorted.len() - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    sorted[lo] + (sorted[hi] - sorted[lo]) * (pos - lo as f64)
}

/// Round to two decimals the way `{:.2}` does: from the exact binary value,
/// exact ties to even. `round2(2.675) == 2.67`, `round2(-2.125) == -2.12`.
pub fn round2(x: f64) -> f64 {
    format!("{x:.2}").parse().unwrap_or(x)
}

fn ascending_missing_last(a: Option<f64>, b: Option<f64>) -> Ordering {
    match (a, b) {
        (Some(x), Some(y)) => x.total_cmp(&y),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::filter::FilterCriteria;
    use crate::data::test_support::{dataset, full_record, sample_dataset};

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    fn keys(groups: &[GroupMetric]) -> Vec<&str> {
        groups.iter().map(|g| g.key.as_str()).collect()
    }

    #[test]
    fn full_view_scalars() {
        let ds = sample_dataset();
        let view = FilteredView::new(&ds, &FilterCriteria::all(&ds));
        let s = summarize(&view, DEFAULT_HISTOGRAM_BINS);

        assert_eq!(s.total_orders, 8);
        assert!(close(s.mean_review_score.unwrap(), 3.25));
        assert!(close(s.mean_delay_days.unwrap(), -2.125));
        assert_eq!(s.repeat_customer_pct, Some(37.5));
    }

    #[test]
    fn lateness_breakdowns_keep_both_buckets_in_fixed_order() {
        let ds = sample_dataset();
        let view = FilteredView::new(&ds, &FilterCriteria::all(&ds));
        let s = summarize(&view, DEFAULT_HISTOGRAM_BINS);

        let counts: Vec<_> = s.lateness_counts.iter().map(|(l, c)| (*l, *c)).collect();
        assert_eq!(counts, vec![(Lateness::OnTime, 5), (Lateness::Late, 3)]);
        assert!(close(s.review_by_lateness[&Lateness::OnTime].unwrap(), 4.2));
        assert!(close(s.review_by_lateness[&Lateness::Late].unwrap(), 5.0 / 3.0));
    }

    #[test]
    fn grouped_metrics_sort_ascending_with_ties_in_key_order() {
        let ds = sample_dataset();
        let view = FilteredView::new(&ds, &FilterCriteria::all(&ds));
        let s = summarize(&view, DEFAULT_HISTOGRAM_BINS);

        // credit_card and voucher both have a 1/3 late rate.
        assert_eq!(keys(&s.late_rate_by_payment), vec!["credit_card", "voucher", "boleto"]);
        assert_eq!(keys(&s.payment_value_by_payment), vec!["boleto", "credit_card", "voucher"]);
        assert_eq!(keys(&s.repeat_rate_by_payment), vec!["credit_card", "voucher", "boleto"]);
        assert!(close(s.payment_value_by_payment[1].value.unwrap(), 98.5));

        let values: Vec<f64> = s.late_rate_by_payment.iter().filter_map(|g| g.value).collect();
        assert!(values.windows(2).all(|w| w[0] <= w[1]));
    }

    #[test]
    fn order_counts_descend_and_partition_the_view() {
        let ds = sample_dataset();
        let view = FilteredView::new(&ds, &FilterCriteria::all(&ds));
        let s = summarize(&view, DEFAULT_HISTOGRAM_BINS);

        let counts: Vec<(&str, usize)> = s
            .orders_by_payment
            .iter()
            .map(|g| (g.key.as_str(), g.count))
            .collect();
        assert_eq!(counts, vec![("credit_card", 3), ("voucher", 3), ("boleto", 2)]);
        assert_eq!(s.orders_by_payment.iter().map(|g| g.count).sum::<usize>(), s.total_orders);
        assert_eq!(s.lateness_counts.values().sum::<usize>(), s.total_orders);
        assert_eq!(s.delay_histogram.total(), s.total_orders);
    }

    #[test]
    fn empty_view_reports_no_data_everywhere() {
        let ds = sample_dataset();
        let view = FilteredView::new(&ds, &FilterCriteria::default());
        let s = summarize(&view, DEFAULT_HISTOGRAM_BINS);

        assert!(s.is_empty());
        assert_eq!(s.mean_review_score, None);
        assert_eq!(s.mean_delay_days, None);
        assert_eq!(s.repeat_customer_pct, None);
        assert_eq!(s.lateness_counts.len(), 2);
        assert!(s.lateness_counts.values().all(|&c| c == 0));
        assert!(s.review_by_lateness.values().all(Option::is_none));
        assert!(s.delay_histogram.is_empty());
        assert!(s.late_rate_by_payment.is_empty());
        assert!(s.orders_by_payment.is_empty());
        assert!(s.payment_value_by_payment.is_empty());
        assert!(s.repeat_rate_by_payment.is_empty());
        assert!(s.payment_value_distribution.is_empty());
    }

    #[test]
    fn missing_values_are_skipped_by_means() {
        let ds = dataset(vec![
            full_record("boleto", 0, f64::NAN, 1.0, 1.0, f64::NAN),
            full_record("boleto", 0, 3.0, f64::NAN, 0.0, f64::NAN),
        ]);
        let view = FilteredView::new(&ds, &FilterCriteria::all(&ds));
        let s = summarize(&view, DEFAULT_HISTOGRAM_BINS);

        assert_eq!(s.total_orders, 2);
        assert_eq!(s.mean_review_score, Some(3.0));
        assert_eq!(s.mean_delay_days, Some(1.0));
        assert_eq!(s.repeat_customer_pct, Some(50.0));
        assert_eq!(s.payment_value_by_payment[0].value, None);
        assert!(s.payment_value_distribution.is_empty());
        assert_eq!(s.delay_histogram.total(), 1);
    }

    #[test]
    fn missing_group_means_sort_last() {
        let ds = dataset(vec![
            full_record("boleto", 0, 4.0, 0.0, 0.0, f64::NAN),
            full_record("voucher", 0, 4.0, 0.0, 0.0, 10.0),
        ]);
        let view = FilteredView::new(&ds, &FilterCriteria::all(&ds));
        let s = summarize(&view, DEFAULT_HISTOGRAM_BINS);
        assert_eq!(keys(&s.payment_value_by_payment), vec!["voucher", "boleto"]);
    }

    #[test]
    fn histogram_edges_follow_the_view() {
        let h = Histogram::compute([-12.0, 9.0, 0.0], 50);
        assert_eq!(h.counts.len(), 50);
        assert_eq!(h.edges.len(), 51);
        assert_eq!(h.edges[0], -12.0);
        assert!(close(h.edges[50], 9.0));
        assert_eq!(h.counts[49], 1, "max lands in the closed last bin");
        assert_eq!(h.counts[0], 1);
        assert!(close(h.bin_width(), 21.0 / 50.0));

        let narrower = Histogram::compute([2.0, 9.0], 50);
        assert_ne!(h.edges, narrower.edges);
    }

    #[test]
    fn histogram_of_constant_values_widens_range() {
        let h = Histogram::compute([3.0, 3.0], 50);
        assert_eq!(h.edges[0], 2.5);
        assert!(close(h.edges[50], 3.5));
        assert_eq!(h.total(), 2);
        assert_eq!(h.counts[25], 2);
        let (center, count) = h.bars().nth(25).unwrap();
        assert!(close(center, 3.01));
        assert_eq!(count, 2);
    }

    #[test]
    fn histogram_skips_non_finite_values() {
        let h = Histogram::compute([f64::NAN, f64::INFINITY], 50);
        assert!(h.is_empty());
        assert_eq!(h.bin_width(), 0.0);
    }

    #[test]
    fn box_stats_flag_iqr_outliers() {
        let b = BoxStats::compute("voucher", [4.0, 1.0, 100.0, 3.0, 2.0]).unwrap();
        assert_eq!(b.count, 5);
        assert_eq!((b.min, b.q1, b.median, b.q3, b.max), (1.0, 2.0, 3.0, 4.0, 100.0));
        assert_eq!(b.lower_whisker, 1.0);
        assert_eq!(b.upper_whisker, 4.0);
        assert_eq!(b.outliers, vec![100.0]);
    }

    #[test]
    fn box_stats_interpolate_quartiles() {
        let b = BoxStats::compute("voucher", [15.0, 20.0, 900.0]).unwrap();
        assert_eq!(b.q1, 17.5);
        assert_eq!(b.median, 20.0);
        assert_eq!(b.q3, 460.0);
        assert!(b.outliers.is_empty());
        assert_eq!(b.upper_whisker, 900.0);
        assert!(BoxStats::compute("empty", [f64::NAN]).is_none());
    }

    #[test]
    fn helpers() {
        assert_eq!(mean(std::iter::empty()), None);
        assert_eq!(mean([1.0, f64::NAN, 3.0]), Some(2.0));
        assert_eq!(quantile(&[7.0], 0.75), 7.0);
        assert_eq!(round2(37.499), 37.5);
    }

    #[test]
    fn round2_ties_go_to_even_on_the_binary_value() {
        assert_eq!(round2(-2.125), -2.12);
        assert_eq!(round2(0.125), 0.12);
        assert_eq!(round2(0.375), 0.38);
        // 2.675 is stored as 2.67499999...
        assert_eq!(round2(2.675), 2.67);
        assert_eq!(round2(12.5), 12.5);
    }

    #[test]
    fn means_ignore_infinities() {
        assert_eq!(mean([f64::INFINITY, f64::NEG_INFINITY, 2.0]), Some(2.0));
        assert_eq!(mean([f64::INFINITY]), None);

        let ds = dataset(vec![
            full_record("boleto", 0, 4.0, f64::INFINITY, 0.0, 10.0),
            full_record("boleto", 1, 2.0, f64::NEG_INFINITY, 1.0, f64::INFINITY),
        ]);
        let view = FilteredView::new(&ds, &FilterCriteria::all(&ds));
        let s = summarize(&view, DEFAULT_HISTOGRAM_BINS);
        assert_eq!(s.mean_delay_days, None);
        assert_eq!(s.payment_value_by_payment[0].value, Some(10.0));
        assert_eq!(s.mean_review_score, Some(3.0));
    }
}
