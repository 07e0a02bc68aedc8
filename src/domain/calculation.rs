use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Store-assigned identifier of a persisted calculation.
///
/// Identifiers are handed out in increasing order and never reused, not even
/// after the history has been cleared.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct CalculationId(pub u64);

impl CalculationId {
    pub fn value(&self) -> u64 {
        self.0
    }

    pub fn next(&self) -> Self {
        Self(self.0 + 1)
    }
}

impl fmt::Display for CalculationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for CalculationId {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim().parse().map(Self)
    }
}

/// The values a caller hands to the store when saving a calculation.
///
/// `id` and `timestamp` are missing on purpose: the store assigns both.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NewCalculation {
    pub bill_amount: Decimal,
    pub tip_percent: u32,
    pub tip_amount: Decimal,
    pub total_amount: Decimal,
}

/// One persisted tip calculation.
///
/// Amounts are kept verbatim as they were computed at save time; nothing is
/// recomputed on read. The serialized form uses camelCase names and stores
/// amounts as floating-point numbers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalculationRecord {
    pub id: CalculationId,
    #[serde(with = "rust_decimal::serde::float")]
    pub bill_amount: Decimal,
    pub tip_percent: u32,
    #[serde(with = "rust_decimal::serde::float")]
    pub tip_amount: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub total_amount: Decimal,
    /// Creation time in epoch milliseconds.
    pub timestamp: i64,
}

impl CalculationRecord {
    pub fn new(id: CalculationId, calculation: NewCalculation, timestamp: i64) -> Self {
        Self {
            id,
            bill_amount: calculation.bill_amount,
            tip_percent: calculation.tip_percent,
            tip_amount: calculation.tip_amount,
            total_amount: calculation.total_amount,
            timestamp,
        }
    }
}

/// Orders records newest first.
///
/// Timestamps come from the wall clock and may collide within a millisecond,
/// so the id breaks ties.
pub fn sort_newest_first(records: &mut [CalculationRecord]) {
    records.sort_by(|a, b| b.timestamp.cmp(&a.timestamp).then(b.id.cmp(&a.id)));
}
