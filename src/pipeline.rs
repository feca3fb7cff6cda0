use chrono::NaiveDateTime;

use crate::error::DataError;
use crate::metrics;
use crate::models::{SegmentedCustomer, Transaction};
use crate::scoring;
use crate::segments::classify;

/// Aggregate, score and classify a full transaction log.
///
/// Each stage is materialized before the next starts because scores depend on
/// the whole population. Any data error aborts the run; there is no partial
/// table.
pub fn analyze(
    reference_date: NaiveDateTime,
    transactions: &[Transaction],
) -> Result<Vec<SegmentedCustomer>, DataError> {
    let customers = metrics::aggregate(reference_date, transactions)?;
    tracing::debug!(
        transactions = transactions.len(),
        customers = customers.len(),
        "metrics aggregated"
    );

    let scores = scoring::score_customers(&customers)?;
    tracing::debug!(customers = scores.len(), "quintile scores assigned");

    let table: Vec<SegmentedCustomer> = customers
        .into_iter()
        .zip(scores)
        .map(|(metrics, score)| SegmentedCustomer {
            segment: classify(&score.code),
            customer_id: metrics.customer_id,
            recency: metrics.recency,
            frequency: metrics.frequency,
            monetary: metrics.monetary,
            r: score.r,
            f: score.f,
            m: score.m,
            code: score.code,
        })
        .collect();

    tracing::info!(%reference_date, customers = table.len(), "customers segmented");
    Ok(table)
}
