use chrono::NaiveDateTime;
use thiserror::Error;

use crate::scoring::Metric;

/// Any failure that aborts an analysis run.
#[derive(Debug, Error)]
pub enum RfmError {
    #[error(transparent)]
    Data(#[from] DataError),

    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// The transaction data cannot produce trustworthy scores.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DataError {
    #[error("transaction row {row} has no customer id")]
    MissingCustomerId { row: usize },

    #[error(
        "customer {customer_id} last purchased at {last_purchase}, after the reference date {reference_date}"
    )]
    PurchaseAfterReference {
        customer_id: String,
        last_purchase: NaiveDateTime,
        reference_date: NaiveDateTime,
    },

    #[error("{metric} has {distinct} distinct values, quintile scoring needs at least {required}")]
    InsufficientDistinctValues {
        metric: Metric,
        distinct: usize,
        required: usize,
    },

    #[error("{metric} quintile cut point {edge} is shared by adjacent bins")]
    DuplicateQuantileEdge { metric: Metric, edge: f64 },

    #[error("{metric} value {value} is not a finite number")]
    NonFiniteValue { metric: Metric, value: f64 },
}

/// The run was not configured well enough to start.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("reference date not supplied (use --reference-date or RFM_REFERENCE_DATE)")]
    MissingReferenceDate,

    #[error("invalid reference date '{value}', expected YYYY-MM-DD or YYYY-MM-DDTHH:MM:SS")]
    InvalidReferenceDate { value: String },

    #[error("input is missing required columns: {}", .missing.join(", "))]
    MissingColumns { missing: Vec<String> },
}
