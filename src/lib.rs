//! Delivery and payment behaviour dashboard over a fixed CSV of e-commerce
//! orders. The library holds everything but the egui front-end.

pub mod config;
pub mod data;

pub use data::aggregate::AggregateSummary;
pub use data::error::DataError;
pub use data::filter::{FilterCriteria, FilteredView};
pub use data::loader::{DataSource, NumericPolicy};
pub use data::model::{Dataset, Lateness, OrderRecord};
pub use data::pipeline::{apply, Kpis};
