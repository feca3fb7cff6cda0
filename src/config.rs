use chrono::{DateTime, NaiveDate, NaiveDateTime};

use crate::error::ConfigError;

pub const REFERENCE_DATE_ENV: &str = "RFM_REFERENCE_DATE";

const DATETIME_FORMATS: [&str; 6] = [
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
    "%m/%d/%Y %H:%M",
    "%m/%d/%Y %H:%M:%S",
];

const DATE_FORMATS: [&str; 2] = ["%Y-%m-%d", "%m/%d/%Y"];

/// Header names for the five transaction fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnMap {
    pub customer_id: String,
    pub invoice_id: String,
    pub invoice_date: String,
    pub quantity: String,
    pub unit_price: String,
}

impl Default for ColumnMap {
    fn default() -> Self {
        Self {
            customer_id: "CustomerID".to_string(),
            invoice_id: "InvoiceNo".to_string(),
            invoice_date: "InvoiceDate".to_string(),
            quantity: "Quantity".to_string(),
            unit_price: "UnitPrice".to_string(),
        }
    }
}

impl ColumnMap {
    pub fn required(&self) -> [&str; 5] {
        [
            self.customer_id.as_str(),
            self.invoice_id.as_str(),
            self.invoice_date.as_str(),
            self.quantity.as_str(),
            self.unit_price.as_str(),
        ]
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisConfig {
    /// Fixed "now" for recency; never wall-clock time.
    pub reference_date: NaiveDateTime,
    pub columns: ColumnMap,
}

impl AnalysisConfig {
    pub fn new(reference_date: Option<&str>, columns: ColumnMap) -> Result<Self, ConfigError> {
        let reference_date = resolve_reference_date(reference_date)?;

        tracing::info!(%reference_date, "analysis configured");
        tracing::debug!(
            customer = %columns.customer_id,
            invoice = %columns.invoice_id,
            date = %columns.invoice_date,
            quantity = %columns.quantity,
            price = %columns.unit_price,
            "column mapping"
        );

        Ok(Self {
            reference_date,
            columns,
        })
    }
}

pub fn resolve_reference_date(value: Option<&str>) -> Result<NaiveDateTime, ConfigError> {
    let value = value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .ok_or(ConfigError::MissingReferenceDate)?;

    parse_datetime(value).ok_or_else(|| ConfigError::InvalidReferenceDate {
        value: value.to_string(),
    })
}

/// Parse the timestamp shapes seen in retail exports. Date-only values mean midnight.
pub fn parse_datetime(value: &str) -> Option<NaiveDateTime> {
    let value = value.trim();

    if let Ok(parsed) = DateTime::parse_from_rfc3339(value) {
        return Some(parsed.naive_utc());
    }

    DATETIME_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(value, format).ok())
        .or_else(|| {
            DATE_FORMATS
                .iter()
                .find_map(|format| NaiveDate::parse_from_str(value, format).ok())
                .and_then(|date| date.and_hms_opt(0, 0, 0))
        })
}
