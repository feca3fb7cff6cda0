use std::collections::{BTreeMap, BTreeSet};

use chrono::NaiveDateTime;

use crate::error::DataError;
use crate::models::{CustomerMetrics, Transaction};

struct Totals<'a> {
    last_purchase: NaiveDateTime,
    invoices: BTreeSet<&'a str>,
    monetary: f64,
}

/// Collapse a transaction log into one metrics record per customer.
///
/// Records come back ordered by customer id: numerically when every id is an
/// integer (`9999` before `10000`), otherwise as strings. A customer whose
/// latest invoice is after `reference_date` fails the whole run instead of
/// getting a negative recency.
pub fn aggregate(
    reference_date: NaiveDateTime,
    transactions: &[Transaction],
) -> Result<Vec<CustomerMetrics>, DataError> {
    let mut customers: BTreeMap<&str, Totals> = BTreeMap::new();

    for (row, tx) in transactions.iter().enumerate() {
        let customer_id = tx.customer_id.trim();
        if customer_id.is_empty() {
            return Err(DataError::MissingCustomerId { row });
        }

        let entry = customers.entry(customer_id).or_insert_with(|| Totals {
            last_purchase: tx.invoice_date,
            invoices: BTreeSet::new(),
            monetary: 0.0,
        });

        entry.last_purchase = entry.last_purchase.max(tx.invoice_date);
        entry.invoices.insert(tx.invoice_id.as_str());
        entry.monetary += tx.line_total();
    }

    let mut metrics = customers
        .into_iter()
        .map(|(customer_id, totals)| {
            if totals.last_purchase > reference_date {
                return Err(DataError::PurchaseAfterReference {
                    customer_id: customer_id.to_string(),
                    last_purchase: totals.last_purchase,
                    reference_date,
                });
            }

            Ok(CustomerMetrics {
                customer_id: customer_id.to_string(),
                recency: recency_days(reference_date, totals.last_purchase),
                frequency: totals.invoices.len(),
                monetary: totals.monetary,
            })
        })
        .collect::<Result<Vec<_>, _>>()?;

    order_numeric_ids(&mut metrics);
    Ok(metrics)
}

/// Stable, so ids with the same value (`0123` and `123`) keep string order.
fn order_numeric_ids(metrics: &mut [CustomerMetrics]) {
    if metrics
        .iter()
        .all(|customer| customer.customer_id.parse::<u64>().is_ok())
    {
        metrics.sort_by_cached_key(|customer| customer.customer_id.parse::<u64>().unwrap_or(0));
    }
}

/// Whole days elapsed, truncated toward zero.
pub fn recency_days(reference_date: NaiveDateTime, last_purchase: NaiveDateTime) -> i64 {
    (reference_date - last_purchase).num_days()
}
