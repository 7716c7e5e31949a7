//! Record flattening for billing responses
//!
//! Turns the nested time-bucket → group shape returned by a billing source
//! into flat [`CostRecord`]s, one per (bucket, group) pair. This is the only
//! place raw amount strings are parsed, and a single unparseable amount fails
//! the whole flatten: a report is never built from partial data.
//!
//! # Examples
//!
//! ```
//! use cloudcost::flatten::flatten;
//! use cloudcost_core::provider::{CostGroup, TimeBucket};
//! use cloudcost_core::types::Dimension;
//!
//! let buckets = vec![TimeBucket {
//!     period: "2024-01-01".to_string(),
//!     groups: vec![CostGroup {
//!         keys: vec!["BoxUsage:t3.micro".to_string(), "t3.micro".to_string()],
//!         amount: "7.499".to_string(),
//!     }],
//! }];
//!
//! let records = flatten(&buckets, &[Dimension::UsageType, Dimension::InstanceType]).unwrap();
//! assert_eq!(records.len(), 1);
//! assert_eq!(records[0].key(Dimension::InstanceType), Some("t3.micro"));
//! assert_eq!(records[0].amount.to_string(), "7.50");
//! ```

use cloudcost_core::error::{CloudcostError, Result};
use cloudcost_core::provider::TimeBucket;
use cloudcost_core::types::{CostRecord, Dimension, PeriodLabel, round_cost};
use rust_decimal::Decimal;
use std::collections::BTreeSet;
use std::str::FromStr;
use tracing::debug;

/// Parse a billing amount string into a rounded decimal
///
/// Accepts plain decimals (`"12.3456"`) and scientific notation
/// (`"1.2E-7"`). Returns `None` for anything else.
pub fn parse_amount(raw: &str) -> Option<Decimal> {
    let raw = raw.trim();
    Decimal::from_str(raw)
        .or_else(|_| Decimal::from_scientific(raw))
        .ok()
        .map(round_cost)
}

/// Flatten time buckets into cost records
///
/// `group_by` names the dimensions of each group's keys, in order.
///
/// # Errors
///
/// - [`CloudcostError::MalformedResponse`] if a group carries a different
///   number of keys than `group_by` has dimensions
/// - [`CloudcostError::InvalidAmount`] if an amount is not a number
pub fn flatten(buckets: &[TimeBucket], group_by: &[Dimension]) -> Result<Vec<CostRecord>> {
    let mut records = Vec::with_capacity(buckets.iter().map(|b| b.groups.len()).sum());

    for bucket in buckets {
        let period = PeriodLabel::new(bucket.period.as_str());

        for group in &bucket.groups {
            if group.keys.len() != group_by.len() {
                return Err(CloudcostError::MalformedResponse(format!(
                    "expected {} key(s) per group, got [{}] in period {}",
                    group_by.len(),
                    group.keys.join(", "),
                    bucket.period
                )));
            }

            let amount = parse_amount(&group.amount).ok_or_else(|| {
                CloudcostError::InvalidAmount {
                    period: bucket.period.clone(),
                    keys: group.keys.join(", "),
                    value: group.amount.clone(),
                }
            })?;

            records.push(CostRecord::new(
                period.clone(),
                group_by.iter().copied().zip(group.keys.iter().cloned()),
                amount,
            ));
        }
    }

    debug!(
        "Flattened {} bucket(s) into {} record(s)",
        buckets.len(),
        records.len()
    );
    Ok(records)
}

/// Sorted, deduplicated values of one key component
///
/// Records not grouped by `dimension` contribute nothing.
pub fn distinct_values(records: &[CostRecord], dimension: Dimension) -> Vec<String> {
    records
        .iter()
        .filter_map(|record| record.key(dimension))
        .collect::<BTreeSet<_>>()
        .into_iter()
        .map(str::to_string)
        .collect()
}
