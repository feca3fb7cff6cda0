use chrono::NaiveDateTime;
use serde::Serialize;

use crate::segments::Segment;

#[derive(Debug, Clone, PartialEq)]
pub struct Transaction {
    pub customer_id: String,
    pub invoice_id: String,
    pub invoice_date: NaiveDateTime,
    pub quantity: i64,
    pub unit_price: f64,
}

impl Transaction {
    pub fn line_total(&self) -> f64 {
        self.quantity as f64 * self.unit_price
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CustomerMetrics {
    pub customer_id: String,
    /// Whole days between the reference date and the latest invoice.
    pub recency: i64,
    /// Distinct invoices.
    pub frequency: usize,
    pub monetary: f64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CustomerScore {
    pub customer_id: String,
    pub r: u8,
    pub f: u8,
    pub m: u8,
    pub code: String,
}

impl CustomerScore {
    pub fn new(customer_id: String, r: u8, f: u8, m: u8) -> Self {
        Self {
            customer_id,
            r,
            f,
            m,
            code: format!("{r}{f}{m}"),
        }
    }
}

/// One row of the classified table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SegmentedCustomer {
    #[serde(rename = "CustomerID")]
    pub customer_id: String,
    #[serde(rename = "Recency")]
    pub recency: i64,
    #[serde(rename = "Frequency")]
    pub frequency: usize,
    #[serde(rename = "Monetary")]
    pub monetary: f64,
    #[serde(rename = "R")]
    pub r: u8,
    #[serde(rename = "F")]
    pub f: u8,
    #[serde(rename = "M")]
    pub m: u8,
    #[serde(rename = "RFM")]
    pub code: String,
    #[serde(rename = "Segment")]
    pub segment: Segment,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SegmentCount {
    pub segment: Segment,
    pub count: usize,
    pub share: f64,
}
