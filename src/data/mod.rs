//! Data layer: core types, loading, filtering and aggregation.
//!
//! Architecture:
//! ```text
//!  main_data.csv
//!        │
//!        ▼
//!   ┌──────────┐
//!   │  loader   │  parse file → Dataset (cached per file version)
//!   └──────────┘
//!        │
//!        ▼
//!   ┌──────────┐
//!   │  filter   │  payment type ∧ lateness → FilteredView
//!   └──────────┘
//!        │
//!        ▼
//!   ┌───────────┐
//!   │ aggregate │  means, counts, histogram, box stats → AggregateSummary
//!   └───────────┘
//! ```
//! `pipeline::apply` runs filter + aggregate in one call.

pub mod aggregate;
pub mod error;
pub mod filter;
pub mod loader;
pub mod model;
pub mod pipeline;

#[cfg(test)]
pub(crate) mod test_support;
