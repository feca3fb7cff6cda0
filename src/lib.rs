//! RFM scoring and segmentation for retail transaction logs.
//!
//! Transactions are aggregated into per-customer recency, frequency and
//! monetary metrics, scored 1..=5 by quintile against the whole population,
//! and mapped to a named segment through an ordered rule table.

pub mod config;
pub mod error;
pub mod export;
pub mod loader;
pub mod metrics;
pub mod models;
pub mod pipeline;
pub mod report;
pub mod scoring;
pub mod segments;

pub use config::{AnalysisConfig, ColumnMap};
pub use error::{ConfigError, DataError, RfmError};
pub use models::{CustomerMetrics, CustomerScore, SegmentCount, SegmentedCustomer, Transaction};
pub use pipeline::analyze;
pub use segments::{classify, Segment};
