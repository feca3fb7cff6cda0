use std::io;
use std::path::Path;

use anyhow::Context;
use csv::StringRecord;

use crate::config::{parse_datetime, ColumnMap};
use crate::error::ConfigError;
use crate::models::Transaction;

/// Invoice numbers starting with this mark a cancelled order.
pub const CANCELLATION_PREFIX: char = 'C';

#[derive(Debug, Clone, Default, PartialEq)]
pub struct LoadedTransactions {
    pub transactions: Vec<Transaction>,
    pub rows_read: usize,
    pub missing_customer: usize,
    pub cancelled: usize,
}

struct ColumnIndex {
    customer_id: usize,
    invoice_id: usize,
    invoice_date: usize,
    quantity: usize,
    unit_price: usize,
}

impl ColumnIndex {
    fn locate(headers: &StringRecord, columns: &ColumnMap) -> Result<Self, ConfigError> {
        let find = |name: &str| headers.iter().position(|header| header.trim() == name);

        let missing: Vec<String> = columns
            .required()
            .into_iter()
            .filter(|&name| find(name).is_none())
            .map(str::to_string)
            .collect();
        if !missing.is_empty() {
            return Err(ConfigError::MissingColumns { missing });
        }

        let index = |name: &str| find(name).ok_or_else(|| ConfigError::MissingColumns {
            missing: vec![name.to_string()],
        });

        Ok(Self {
            customer_id: index(columns.customer_id.as_str())?,
            invoice_id: index(columns.invoice_id.as_str())?,
            invoice_date: index(columns.invoice_date.as_str())?,
            quantity: index(columns.quantity.as_str())?,
            unit_price: index(columns.unit_price.as_str())?,
        })
    }
}

pub fn load_csv(path: &Path, columns: &ColumnMap) -> anyhow::Result<LoadedTransactions> {
    let reader = csv::Reader::from_path(path)
        .with_context(|| format!("failed to open {}", path.display()))?;
    read_transactions(reader, columns).with_context(|| format!("failed to load {}", path.display()))
}

/// Read transactions, dropping rows without a customer id and cancelled invoices.
pub fn read_transactions<R: io::Read>(
    mut reader: csv::Reader<R>,
    columns: &ColumnMap,
) -> anyhow::Result<LoadedTransactions> {
    let headers = reader.headers()?.clone();
    let index = ColumnIndex::locate(&headers, columns)?;
    let mut loaded = LoadedTransactions::default();

    for (offset, result) in reader.records().enumerate() {
        // header is line 1
        let line = offset + 2;
        let record = result.with_context(|| format!("line {line}: unreadable record"))?;
        loaded.rows_read += 1;

        let customer_id = normalize_customer_id(record.get(index.customer_id).unwrap_or(""));
        if customer_id.is_empty() {
            loaded.missing_customer += 1;
            continue;
        }

        let invoice_id = record.get(index.invoice_id).unwrap_or("").trim();
        if invoice_id.starts_with(CANCELLATION_PREFIX) {
            loaded.cancelled += 1;
            continue;
        }

        let raw_date = field(&record, index.invoice_date);
        let invoice_date = parse_datetime(raw_date).with_context(|| {
            format!("line {line}: invalid {} '{raw_date}'", columns.invoice_date)
        })?;

        let raw_quantity = field(&record, index.quantity);
        let quantity: i64 = raw_quantity.parse().with_context(|| {
            format!("line {line}: invalid {} '{raw_quantity}'", columns.quantity)
        })?;

        let raw_price = field(&record, index.unit_price);
        let unit_price: f64 = raw_price.parse().with_context(|| {
            format!("line {line}: invalid {} '{raw_price}'", columns.unit_price)
        })?;
        // f64 parsing accepts "NaN" and "inf"
        if !unit_price.is_finite() {
            anyhow::bail!("line {line}: invalid {} '{raw_price}'", columns.unit_price);
        }

        loaded.transactions.push(Transaction {
            customer_id,
            invoice_id: invoice_id.to_string(),
            invoice_date,
            quantity,
            unit_price,
        });
    }

    tracing::info!(
        rows = loaded.rows_read,
        kept = loaded.transactions.len(),
        missing_customer = loaded.missing_customer,
        cancelled = loaded.cancelled,
        "transactions loaded"
    );

    Ok(loaded)
}

fn field(record: &StringRecord, index: usize) -> &str {
    record.get(index).unwrap_or("").trim()
}

/// Spreadsheet exports often store ids as floats, e.g. `17850.0`.
pub fn normalize_customer_id(raw: &str) -> String {
    let trimmed = raw.trim();
    match trimmed.strip_suffix(".0") {
        Some(whole) if !whole.is_empty() && whole.bytes().all(|b| b.is_ascii_digit()) => {
            whole.to_string()
        }
        _ => trimmed.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    const SAMPLE: &str = "\
InvoiceNo,StockCode,Description,Quantity,InvoiceDate,UnitPrice,CustomerID,Country
536365,85123A,WHITE HANGING HEART T-LIGHT HOLDER,6,12/1/2010 8:26,2.55,17850.0,United Kingdom
536366,22633,HAND WARMER UNION JACK,6,12/1/2010 8:28,1.85,17850,United Kingdom
C536379,D,Discount,-1,12/1/2010 9:41,27.5,14527,United Kingdom
536414,22139,RETROSPOT TEA SET,56,12/1/2010 11:52,0,,United Kingdom
536367,84406B,CREAM CUPID HEARTS COAT HANGER,8,2010-12-01T08:34:00,2.75,13047,United Kingdom
";

    fn reader(data: &str) -> csv::Reader<&[u8]> {
        csv::Reader::from_reader(data.as_bytes())
    }

    #[test]
    fn drops_cancellations_and_anonymous_rows() {
        let loaded = read_transactions(reader(SAMPLE), &ColumnMap::default()).unwrap();

        assert_eq!(loaded.rows_read, 5);
        assert_eq!(loaded.cancelled, 1);
        assert_eq!(loaded.missing_customer, 1);
        assert_eq!(loaded.transactions.len(), 3);

        let first = &loaded.transactions[0];
        assert_eq!(first.customer_id, "17850");
        assert_eq!(first.invoice_id, "536365");
        assert_eq!(first.quantity, 6);
        assert_eq!(first.unit_price, 2.55);
        assert_eq!(
            first.invoice_date,
            NaiveDate::from_ymd_opt(2010, 12, 1)
                .unwrap()
                .and_hms_opt(8, 26, 0)
                .unwrap()
        );
        assert_eq!(loaded.transactions[2].customer_id, "13047");
    }

    #[test]
    fn missing_columns_fail_before_rows_are_read() {
        let data = "InvoiceNo,Quantity,InvoiceDate\n536365,6,2010-12-01\n";
        let err = read_transactions(reader(data), &ColumnMap::default()).unwrap_err();
        let config = err.downcast_ref::<ConfigError>().unwrap();
        assert_eq!(
            config,
            &ConfigError::MissingColumns {
                missing: vec!["CustomerID".to_string(), "UnitPrice".to_string()]
            }
        );
    }

    #[test]
    fn custom_column_names_are_honoured() {
        let data = "Invoice,Customer ID,Price,Qty,Date\n489434,13085,6.95,12,2009-12-01 07:45:00\n";
        let columns = ColumnMap {
            customer_id: "Customer ID".to_string(),
            invoice_id: "Invoice".to_string(),
            invoice_date: "Date".to_string(),
            quantity: "Qty".to_string(),
            unit_price: "Price".to_string(),
        };
        let loaded = read_transactions(reader(data), &columns).unwrap();
        assert_eq!(loaded.transactions.len(), 1);
        assert_eq!(loaded.transactions[0].customer_id, "13085");
        assert_eq!(loaded.transactions[0].quantity, 12);
    }

    #[test]
    fn bad_quantity_names_the_line() {
        let data = "InvoiceNo,Quantity,InvoiceDate,UnitPrice,CustomerID\n\
                    536365,six,2010-12-01,2.55,17850\n";
        let err = read_transactions(reader(data), &ColumnMap::default()).unwrap_err();
        assert!(err.to_string().contains("line 2"), "{err}");
        assert!(err.to_string().contains("Quantity"), "{err}");
    }

    #[test]
    fn non_finite_price_names_the_line() {
        for price in ["NaN", "inf", "-infinity"] {
            let data = format!(
                "InvoiceNo,Quantity,InvoiceDate,UnitPrice,CustomerID\n\
                 536365,6,2010-12-01,2.55,17850\n\
                 536366,6,2010-12-01,{price},17850\n"
            );
            let err = read_transactions(reader(&data), &ColumnMap::default()).unwrap_err();
            assert!(err.to_string().contains("line 3"), "{err}");
            assert!(err.to_string().contains("UnitPrice"), "{err}");
        }
    }

    #[test]
    fn customer_ids_lose_float_suffix_only_when_numeric() {
        assert_eq!(normalize_customer_id(" 17850.0 "), "17850");
        assert_eq!(normalize_customer_id("17850"), "17850");
        assert_eq!(normalize_customer_id("A1.0"), "A1.0");
        assert_eq!(normalize_customer_id(".0"), ".0");
        assert_eq!(normalize_customer_id(""), "");
    }
}
