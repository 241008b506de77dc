use std::collections::BTreeSet;

use super::model::{Dataset, Lateness, OrderRecord};

// ---------------------------------------------------------------------------
// Filter criteria: which payment types and lateness flags are selected
// ---------------------------------------------------------------------------

/// Allowed payment types and allowed lateness flags.
///
/// An empty set on either side selects nothing. There is no implicit
/// "select all" once the user has deselected everything.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterCriteria {
    pub payment_types: BTreeSet<String>,
    pub lateness: BTreeSet<Lateness>,
}

impl FilterCriteria {
    /// Every observed payment type and both lateness flags (show everything).
    pub fn all(dataset: &Dataset) -> Self {
        FilterCriteria {
            payment_types: dataset.payment_types.clone(),
            lateness: Lateness::ALL.into_iter().collect(),
        }
    }

    /// A row passes when its payment type is selected AND its lateness flag
    /// is selected. Rows without a usable flag never pass.
    pub fn matches(&self, record: &OrderRecord) -> bool {
        let payment_ok = self.payment_types.contains(&record.payment_type);
        let lateness_ok = record.is_late.is_some_and(|l| self.lateness.contains(&l));
        payment_ok && lateness_ok
    }
}

/// Return indices of orders that pass the criteria, in dataset order.
pub fn filtered_indices(dataset: &Dataset, criteria: &FilterCriteria) -> Vec<usize> {
    dataset
        .records
        .iter()
        .enumerate()
        .filter(|(_, record)| criteria.matches(record))
        .map(|(i, _)| i)
        .collect()
}

// ---------------------------------------------------------------------------
// FilteredView – a borrowed subset of the dataset
// ---------------------------------------------------------------------------

/// The rows of a [`Dataset`] that satisfy a [`FilterCriteria`]. No identity
/// of its own; rebuilt whenever the criteria change.
#[derive(Debug, Clone, PartialEq)]
pub struct FilteredView<'a> {
    dataset: &'a Dataset,
    indices: Vec<usize>,
}

impl<'a> FilteredView<'a> {
    pub fn new(dataset: &'a Dataset, criteria: &FilterCriteria) -> Self {
        FilteredView {
            dataset,
            indices: filtered_indices(dataset, criteria),
        }
    }

    /// Wrap indices computed earlier (e.g. cached by the UI state).
    pub fn from_indices(dataset: &'a Dataset, indices: Vec<usize>) -> Self {
        FilteredView { dataset, indices }
    }

    pub fn indices(&self) -> &[usize] {
        &self.indices
    }

    pub fn len(&self) -> usize {
        self.indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    pub fn rows(&self) -> impl Iterator<Item = &'a OrderRecord> + '_ {
        let dataset = self.dataset;
        self.indices.iter().map(move |&i| &dataset.records[i])
    }

    /// The first `n` rows, for the tabular preview.
    pub fn preview(&self, n: usize) -> Vec<&'a OrderRecord> {
        self.rows().take(n).collect()
    }
}
