//! Rule-table classification of composite RFM codes.

use std::fmt;
use std::ops::RangeInclusive;
use std::str::FromStr;

use serde::{Serialize, Serializer};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Segment {
    Champions,
    LoyalCustomers,
    PotentialLoyalist,
    RecentCustomers,
    Promising,
    CustomersNeedingAttention,
    AboutToSleep,
    AtRisk,
    CantLoseThem,
    Hibernating,
    Lost,
    Unidentified,
}

impl Segment {
    /// Every label, in rule order with `Unidentified` last.
    pub const ALL: [Segment; 12] = [
        Segment::Champions,
        Segment::LoyalCustomers,
        Segment::PotentialLoyalist,
        Segment::RecentCustomers,
        Segment::Promising,
        Segment::CustomersNeedingAttention,
        Segment::AboutToSleep,
        Segment::AtRisk,
        Segment::CantLoseThem,
        Segment::Hibernating,
        Segment::Lost,
        Segment::Unidentified,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Segment::Champions => "Champions",
            Segment::LoyalCustomers => "Loyal Customers",
            Segment::PotentialLoyalist => "Potential Loyalist",
            Segment::RecentCustomers => "Recent Customers",
            Segment::Promising => "Promising",
            Segment::CustomersNeedingAttention => "Customers Needing Attention",
            Segment::AboutToSleep => "About to Sleep",
            Segment::AtRisk => "At Risk",
            Segment::CantLoseThem => "Cant Lose Them",
            Segment::Hibernating => "Hibernating",
            Segment::Lost => "Lost",
            Segment::Unidentified => "Unidentified",
        }
    }
}

impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl Serialize for Segment {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown segment '{0}'")]
pub struct UnknownSegment(pub String);

impl FromStr for Segment {
    type Err = UnknownSegment;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Segment::ALL
            .into_iter()
            .find(|segment| segment.label().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| UnknownSegment(s.to_string()))
    }
}

/// Inclusive digit ranges for R, F and M, plus the segment they select.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SegmentRule {
    pub recency: RangeInclusive<u32>,
    pub frequency: RangeInclusive<u32>,
    pub monetary: RangeInclusive<u32>,
    pub segment: Segment,
}

impl SegmentRule {
    const fn new(
        recency: RangeInclusive<u32>,
        frequency: RangeInclusive<u32>,
        monetary: RangeInclusive<u32>,
        segment: Segment,
    ) -> Self {
        Self {
            recency,
            frequency,
            monetary,
            segment,
        }
    }

    /// True when `code` is exactly three digits and each falls in its range.
    pub fn matches(&self, code: &str) -> bool {
        let mut digits = code.chars().map(|c| c.to_digit(10));
        match (digits.next(), digits.next(), digits.next(), digits.next()) {
            (Some(Some(r)), Some(Some(f)), Some(Some(m)), None) => {
                self.recency.contains(&r)
                    && self.frequency.contains(&f)
                    && self.monetary.contains(&m)
            }
            _ => false,
        }
    }
}

/// Priority order matters: ranges overlap and the first match wins.
pub static SEGMENT_RULES: [SegmentRule; 11] = [
    SegmentRule::new(4..=5, 4..=5, 3..=5, Segment::Champions),
    SegmentRule::new(3..=5, 3..=4, 4..=5, Segment::LoyalCustomers),
    SegmentRule::new(3..=5, 1..=3, 3..=5, Segment::PotentialLoyalist),
    SegmentRule::new(4..=5, 1..=2, 1..=5, Segment::RecentCustomers),
    SegmentRule::new(3..=5, 1..=5, 1..=2, Segment::Promising),
    SegmentRule::new(3..=4, 3..=4, 3..=4, Segment::CustomersNeedingAttention),
    SegmentRule::new(2..=3, 1..=3, 1..=3, Segment::AboutToSleep),
    SegmentRule::new(1..=3, 3..=5, 1..=5, Segment::AtRisk),
    SegmentRule::new(1..=2, 4..=5, 4..=5, Segment::CantLoseThem),
    SegmentRule::new(1..=2, 1..=2, 3..=5, Segment::Hibernating),
    SegmentRule::new(1..=2, 1..=2, 1..=2, Segment::Lost),
];

pub fn classify(code: &str) -> Segment {
    SEGMENT_RULES
        .iter()
        .find(|rule| rule.matches(code))
        .map_or(Segment::Unidentified, |rule| rule.segment)
}
