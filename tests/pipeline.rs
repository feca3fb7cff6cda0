//! End-to-end runs from a CSV export to the segmented table.

use std::io::Write;

use chrono::{Duration, NaiveDate, NaiveDateTime};
use rfm_segments::config::ColumnMap;
use rfm_segments::loader::load_csv;
use rfm_segments::report::{count_by_segment, filter_by_segment};
use rfm_segments::{analyze, DataError, Segment, Transaction};
use tempfile::NamedTempFile;

fn reference() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2012, 1, 1)
        .unwrap()
        .and_hms_opt(0, 0, 0)
        .unwrap()
}

/// (customer, recency days, distinct invoices, total spend, expected segment)
///
/// Each metric has ten distinct values, so every quintile holds exactly two
/// customers and the expected R, F and M follow from the value order alone.
fn synthetic_customers() -> Vec<(&'static str, i64, usize, f64, Segment)> {
    vec![
        ("S01", 1, 10, 5000.0, Segment::Champions), // 555
        ("S02", 2, 8, 2000.0, Segment::Champions), // 543
        ("S03", 10, 6, 4000.0, Segment::LoyalCustomers), // 435
        ("S04", 20, 2, 1000.0, Segment::RecentCustomers), // 412
        ("S05", 30, 4, 3000.0, Segment::PotentialLoyalist), // 324
        ("S06", 40, 9, 500.0, Segment::Promising), // 351
        ("S07", 60, 3, 300.0, Segment::AboutToSleep), // 221
        ("S08", 80, 7, 2500.0, Segment::AtRisk), // 244
        ("S09", 200, 1, 1500.0, Segment::Hibernating), // 113
        ("S10", 300, 5, 800.0, Segment::AtRisk), // 132
    ]
}

fn transactions_for(customer: &str, recency: i64, invoices: usize, spend: f64) -> Vec<Transaction> {
    (0..invoices)
        .map(|i| Transaction {
            customer_id: customer.to_string(),
            invoice_id: format!("{customer}-{i:03}"),
            invoice_date: reference() - Duration::days(recency + 5 * i as i64),
            quantity: 1,
            // the first invoice absorbs the remainder so totals stay exact
            unit_price: if i == 0 {
                spend - (invoices - 1) as f64
            } else {
                1.0
            },
        })
        .collect()
}

fn synthetic_log() -> Vec<Transaction> {
    synthetic_customers()
        .into_iter()
        .flat_map(|(id, recency, invoices, spend, _)| transactions_for(id, recency, invoices, spend))
        .collect()
}

#[test]
fn test_hand_computed_segments() {
    let table = analyze(reference(), &synthetic_log()).unwrap();
    let expected = synthetic_customers();
    assert_eq!(table.len(), expected.len());

    let codes = ["555", "543", "435", "412", "324", "351", "221", "244", "113", "132"];
    for ((row, (id, recency, invoices, spend, segment)), code) in
        table.iter().zip(expected).zip(codes)
    {
        assert_eq!(row.customer_id, id);
        assert_eq!(row.recency, recency);
        assert_eq!(row.frequency, invoices);
        assert_eq!(row.monetary, spend);
        assert_eq!(row.code, code, "customer {id}");
        assert_eq!(row.segment, segment, "customer {id}");
    }
}

#[test]
fn test_counts_and_filters() {
    let table = analyze(reference(), &synthetic_log()).unwrap();

    let counts = count_by_segment(&table);
    assert_eq!(counts.len(), Segment::ALL.len());
    let at_risk = counts.iter().find(|c| c.segment == Segment::AtRisk).unwrap();
    assert_eq!(at_risk.count, 2);
    assert!((at_risk.share - 20.0).abs() < 1e-9);

    let champions: Vec<&str> = filter_by_segment(&table, Segment::Champions)
        .iter()
        .map(|c| c.customer_id.as_str())
        .collect();
    assert_eq!(champions, vec!["S01", "S02"]);
}

#[test]
fn test_pipeline_is_deterministic() {
    let log = synthetic_log();
    let mut reversed = log.clone();
    reversed.reverse();

    let first = analyze(reference(), &log).unwrap();
    assert_eq!(first, analyze(reference(), &log).unwrap());
    assert_eq!(first, analyze(reference(), &reversed).unwrap());
}

#[test]
fn test_purchase_after_reference_date() {
    let mut log = synthetic_log();
    log.push(Transaction {
        customer_id: "S05".to_string(),
        invoice_id: "S05-late".to_string(),
        invoice_date: reference() + Duration::days(1),
        quantity: 1,
        unit_price: 10.0,
    });

    let err = analyze(reference(), &log).unwrap_err();
    assert!(matches!(err, DataError::PurchaseAfterReference { .. }));
}

#[test]
fn test_csv_to_segments() {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(
        file,
        "InvoiceNo,StockCode,Description,Quantity,InvoiceDate,UnitPrice,CustomerID,Country"
    )
    .unwrap();

    let customers = [
        ("12346", "2011-01-18T10:01:00", 3, 120.0),
        ("12347", "2011-12-07T15:52:00", 12, 40.0),
        ("12348", "2011-09-25T13:13:00", 6, 55.0),
        ("12349", "2011-11-21T09:51:00", 5, 90.0),
        ("12350", "2011-02-02T16:01:00", 8, 20.0),
        ("12352", "2011-11-03T14:37:00", 9, 75.0),
    ];
    for (i, (customer, date, quantity, price)) in customers.iter().enumerate() {
        writeln!(
            file,
            "{},22423,REGENCY CAKESTAND 3 TIER,{},{},{},{}.0,United Kingdom",
            540000 + i,
            quantity,
            date,
            price,
            customer
        )
        .unwrap();
    }
    // cancelled and anonymous rows never reach the engine
    writeln!(file, "C540100,22423,REGENCY CAKESTAND 3 TIER,-1,2011-12-08T10:00:00,12.75,12347,United Kingdom").unwrap();
    writeln!(file, "540101,22423,REGENCY CAKESTAND 3 TIER,1,2012-03-01T10:00:00,12.75,,United Kingdom").unwrap();
    file.flush().unwrap();

    let loaded = load_csv(file.path(), &ColumnMap::default()).unwrap();
    assert_eq!(loaded.transactions.len(), 6);
    assert_eq!(loaded.cancelled, 1);
    assert_eq!(loaded.missing_customer, 1);

    let table = analyze(reference(), &loaded.transactions).unwrap();
    assert_eq!(table.len(), 6);

    let newest = table.iter().find(|c| c.customer_id == "12347").unwrap();
    assert_eq!(newest.recency, 24);
    assert_eq!(newest.r, 5);

    for row in &table {
        assert_eq!(row.code.len(), 3);
        assert!(row.code.chars().all(|c| ('1'..='5').contains(&c)));
        assert!(Segment::ALL.contains(&row.segment));
    }
}
