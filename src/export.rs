use std::io;

use crate::models::SegmentedCustomer;

/// Column names of the output table, matching the serde renames on
/// `SegmentedCustomer`.
pub const HEADERS: [&str; 9] = [
    "CustomerID",
    "Recency",
    "Frequency",
    "Monetary",
    "R",
    "F",
    "M",
    "RFM",
    "Segment",
];

/// Write the classified table as CSV with a header row, even when it is empty.
pub fn write_csv<W: io::Write>(customers: &[SegmentedCustomer], writer: W) -> anyhow::Result<()> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    if customers.is_empty() {
        csv_writer.write_record(HEADERS)?;
    }
    for customer in customers {
        csv_writer.serialize(customer)?;
    }
    csv_writer.flush()?;
    Ok(())
}

pub fn write_json<W: io::Write>(customers: &[SegmentedCustomer], writer: W) -> anyhow::Result<()> {
    serde_json::to_writer_pretty(writer, customers)?;
    Ok(())
}
