//! Aggregation module for month-over-month cost tables
//!
//! This module turns flat [`CostRecord`]s into [`AggregatedRow`]s: one row per
//! (period, key) pair with the key's cost in the preceding period and the
//! change since then. Instance-type tables additionally carry the key's
//! all-time total.
//!
//! The "previous period" is the last earlier period in which the same key
//! appeared, found with a single ordered pass that remembers the last cost
//! seen per key. A key seen for the first time has a previous cost of zero.
//!
//! # Examples
//!
//! ```
//! use cloudcost::aggregation::{Aggregator, Grouping};
//! use cloudcost_core::types::{CostRecord, Dimension, PeriodLabel};
//! use rust_decimal::Decimal;
//!
//! let records = vec![
//!     CostRecord::new(PeriodLabel::new("2024-01-01"), [(Dimension::Service, "EC2".to_string())], Decimal::from(100)),
//!     CostRecord::new(PeriodLabel::new("2024-02-01"), [(Dimension::Service, "EC2".to_string())], Decimal::from(150)),
//! ];
//!
//! let rows = Aggregator::new(Grouping::By(Dimension::Service)).aggregate(&records);
//! assert_eq!(rows[1].previous_cost, Decimal::from(100));
//! assert_eq!(rows[1].cost_change, Decimal::from(50));
//! ```

use cloudcost_core::aggregation_types::AggregatedRow;
use cloudcost_core::types::{CostRecord, Dimension, DimensionKey, PeriodLabel};
use rust_decimal::Decimal;
use std::collections::{BTreeMap, BTreeSet, HashMap};
use tracing::debug;

/// How records are keyed for aggregation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Grouping {
    /// A single key component, e.g. the service or the instance type
    By(Dimension),
    /// All key components joined, e.g. usage type + instance type
    Composite,
}

impl Grouping {
    /// Aggregation key for a record
    ///
    /// A record that was not grouped by the requested dimension falls back to
    /// its composite key, so no cost is ever dropped.
    pub fn key_for(&self, record: &CostRecord) -> DimensionKey {
        match self {
            Grouping::By(dimension) => record
                .key(*dimension)
                .map(DimensionKey::new)
                .unwrap_or_else(|| record.dimension_key()),
            Grouping::Composite => record.dimension_key(),
        }
    }
}

/// Main aggregation engine
#[derive(Debug, Clone)]
pub struct Aggregator {
    grouping: Grouping,
    include_totals: bool,
}

impl Aggregator {
    /// Create a new Aggregator keyed by `grouping`
    pub fn new(grouping: Grouping) -> Self {
        Self {
            grouping,
            include_totals: false,
        }
    }

    /// Attach each key's all-period total to its rows
    pub fn with_totals(mut self, include_totals: bool) -> Self {
        self.include_totals = include_totals;
        self
    }

    /// Aggregate records into rows ordered by period, then key
    ///
    /// Empty input produces empty output. Output depends only on the input
    /// multiset, not on record order.
    pub fn aggregate(&self, records: &[CostRecord]) -> Vec<AggregatedRow> {
        let mut grouped: BTreeMap<(PeriodLabel, DimensionKey), Decimal> = BTreeMap::new();
        let mut totals: HashMap<DimensionKey, Decimal> = HashMap::new();

        for record in records {
            let key = self.grouping.key_for(record);
            if self.include_totals {
                *totals.entry(key.clone()).or_default() += record.amount;
            }
            *grouped.entry((record.period.clone(), key)).or_default() += record.amount;
        }

        // BTreeMap iteration is period-major, so each key's rows are visited chronologically
        let mut last_seen: HashMap<DimensionKey, Decimal> = HashMap::new();
        let rows: Vec<AggregatedRow> = grouped
            .into_iter()
            .map(|((period, key), cost)| {
                let previous_cost = last_seen.insert(key.clone(), cost).unwrap_or(Decimal::ZERO);
                let total_cost = self
                    .include_totals
                    .then(|| totals.get(&key).copied().unwrap_or_default());
                AggregatedRow {
                    period,
                    key,
                    cost,
                    previous_cost,
                    cost_change: cost - previous_cost,
                    total_cost,
                }
            })
            .collect();

        debug!(
            "Aggregated {} record(s) into {} row(s) over {} key(s)",
            records.len(),
            rows.len(),
            last_seen.len()
        );
        rows
    }
}

/// Distinct periods present in aggregated rows
pub fn periods(rows: &[AggregatedRow]) -> BTreeSet<PeriodLabel> {
    rows.iter().map(|row| row.period.clone()).collect()
}
