use std::fmt::Write;

use chrono::NaiveDateTime;

use crate::models::{SegmentCount, SegmentedCustomer};
use crate::segments::Segment;

/// Questions the segment table answers, in the order the report asks them.
pub const REPORT_SECTIONS: [(&str, Segment); 6] = [
    ("Best customers", Segment::Champions),
    ("Customers on the verge of churning", Segment::AboutToSleep),
    ("Customers who can become profitable", Segment::PotentialLoyalist),
    ("Lost customers", Segment::Lost),
    ("Customers to retain", Segment::AtRisk),
    (
        "Loyal customers likely to respond to campaigns",
        Segment::LoyalCustomers,
    ),
];

pub fn filter_by_segment(
    customers: &[SegmentedCustomer],
    segment: Segment,
) -> Vec<&SegmentedCustomer> {
    customers
        .iter()
        .filter(|customer| customer.segment == segment)
        .collect()
}

/// One entry per label, zero counts included, in rule order.
pub fn count_by_segment(customers: &[SegmentedCustomer]) -> Vec<SegmentCount> {
    let total = customers.len();
    Segment::ALL
        .into_iter()
        .map(|segment| {
            let count = customers
                .iter()
                .filter(|customer| customer.segment == segment)
                .count();
            SegmentCount {
                segment,
                count,
                share: if total == 0 {
                    0.0
                } else {
                    count as f64 * 100.0 / total as f64
                },
            }
        })
        .collect()
}

pub fn build_report(
    reference_date: NaiveDateTime,
    customers: &[SegmentedCustomer],
    limit: usize,
) -> String {
    let mut counts = count_by_segment(customers);
    counts.retain(|entry| entry.count > 0);
    counts.sort_by(|a, b| b.count.cmp(&a.count));

    let mut output = String::new();

    let _ = writeln!(output, "# RFM Segmentation Report");
    let _ = writeln!(
        output,
        "Generated for {} customers (recency measured from {})",
        customers.len(),
        reference_date
    );
    let _ = writeln!(output);
    let _ = writeln!(output, "## Segment Mix");

    if counts.is_empty() {
        let _ = writeln!(output, "No customers in this run.");
    } else {
        for entry in counts.iter() {
            let _ = writeln!(
                output,
                "- {}: {} customers ({:.1}%)",
                entry.segment, entry.count, entry.share
            );
        }
    }

    for (number, (title, segment)) in REPORT_SECTIONS.iter().enumerate() {
        let members = filter_by_segment(customers, *segment);

        let _ = writeln!(output);
        let _ = writeln!(output, "## {}. {} ({})", number + 1, title, segment);

        if members.is_empty() {
            let _ = writeln!(output, "No customers in this segment.");
            continue;
        }

        for customer in members.iter().take(limit) {
            let _ = writeln!(
                output,
                "- {} ({}) last purchase {} days ago, {} orders, {:.2} spent",
                customer.customer_id,
                customer.code,
                customer.recency,
                customer.frequency,
                customer.monetary
            );
        }
        if members.len() > limit {
            let _ = writeln!(output, "- ... and {} more", members.len() - limit);
        }
    }

    output
}
