//! Core domain types for cloudcost
//!
//! This module contains the fundamental types used throughout the cloudcost library.
//! These types provide strong typing for billing periods, grouping dimensions,
//! aggregation keys, and flattened cost records.

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use std::fmt;

/// Number of decimal places cost amounts are rounded to before aggregation
pub const COST_DECIMAL_PLACES: u32 = 2;

/// Separator used when several key components form one aggregation key
pub const KEY_SEPARATOR: &str = " / ";

/// Round a cost amount to [`COST_DECIMAL_PLACES`]
///
/// Uses round-half-to-even (banker's rounding).
///
/// # Examples
/// ```
/// use cloudcost_core::types::round_cost;
/// use rust_decimal::Decimal;
/// use std::str::FromStr;
///
/// assert_eq!(round_cost(Decimal::from_str("1.005").unwrap()), Decimal::from_str("1.00").unwrap());
/// assert_eq!(round_cost(Decimal::from_str("1.015").unwrap()), Decimal::from_str("1.02").unwrap());
/// ```
pub fn round_cost(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(COST_DECIMAL_PLACES, RoundingStrategy::MidpointNearestEven)
}

/// Reporting bucket label
///
/// Cost Explorer identifies buckets by their start date in `YYYY-MM-DD` form,
/// so lexicographic order is chronological order.
///
/// # Examples
/// ```
/// use cloudcost_core::types::PeriodLabel;
///
/// let jan = PeriodLabel::new("2024-01-01");
/// let feb = PeriodLabel::new("2024-02-01");
/// assert!(jan < feb);
/// assert_eq!(feb.as_str(), "2024-02-01");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PeriodLabel(String);

impl PeriodLabel {
    /// Create a new PeriodLabel
    pub fn new(label: impl Into<String>) -> Self {
        Self(label.into())
    }

    /// Get the inner string
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PeriodLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Aggregation key: a service, an instance type, or a composite of several keys
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DimensionKey(String);

impl DimensionKey {
    /// Create a new DimensionKey
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    /// Get the inner string
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DimensionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for DimensionKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Billing dimensions the report groups and filters by
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Dimension {
    Service,
    UsageType,
    InstanceType,
    RecordType,
}

impl Dimension {
    /// Name of the dimension as the billing API expects it
    pub fn as_str(&self) -> &'static str {
        match self {
            Dimension::Service => "SERVICE",
            Dimension::UsageType => "USAGE_TYPE",
            Dimension::InstanceType => "INSTANCE_TYPE",
            Dimension::RecordType => "RECORD_TYPE",
        }
    }
}

impl fmt::Display for Dimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Time granularity of billing buckets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Granularity {
    #[default]
    Monthly,
}

impl Granularity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Granularity::Monthly => "MONTHLY",
        }
    }
}

/// Grouping key components of a record, in the order the query requested them
pub type RecordKeys = SmallVec<[(Dimension, String); 2]>;

/// One flattened cost observation
///
/// Produced by flattening a billing response: one record per
/// (time bucket, group) pair. The amount is already rounded.
///
/// # Examples
/// ```
/// use cloudcost_core::types::{CostRecord, Dimension, PeriodLabel};
/// use rust_decimal::Decimal;
///
/// let record = CostRecord::new(
///     PeriodLabel::new("2024-01-01"),
///     [
///         (Dimension::UsageType, "BoxUsage:t3.micro".to_string()),
///         (Dimension::InstanceType, "t3.micro".to_string()),
///     ],
///     Decimal::new(1250, 2),
/// );
///
/// assert_eq!(record.key(Dimension::InstanceType), Some("t3.micro"));
/// assert_eq!(record.dimension_key().as_str(), "BoxUsage:t3.micro / t3.micro");
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct CostRecord {
    /// Bucket this cost belongs to
    pub period: PeriodLabel,
    /// Grouping key values paired with their dimension
    pub keys: RecordKeys,
    /// Cost amount, rounded to two decimal places
    pub amount: Decimal,
}

impl CostRecord {
    /// Create a new record, rounding the amount
    pub fn new(
        period: PeriodLabel,
        keys: impl IntoIterator<Item = (Dimension, String)>,
        amount: Decimal,
    ) -> Self {
        Self {
            period,
            keys: keys.into_iter().collect(),
            amount: round_cost(amount),
        }
    }

    /// Value of a single key component, if the record was grouped by it
    pub fn key(&self, dimension: Dimension) -> Option<&str> {
        self.keys
            .iter()
            .find(|(d, _)| *d == dimension)
            .map(|(_, value)| value.as_str())
    }

    /// All key components joined in query order
    pub fn dimension_key(&self) -> DimensionKey {
        let parts: Vec<&str> = self.keys.iter().map(|(_, v)| v.as_str()).collect();
        DimensionKey::new(parts.join(KEY_SEPARATOR))
    }
}
