//! Report assembly
//!
//! Combines the three aggregated tables, the dropdown lists and the forecast
//! into one [`ReportBundle`]. The latest period observed in the overall
//! dataset is relabelled as the current period; every other period keeps its
//! own label.

use cloudcost_core::aggregation_types::{AggregatedRow, ReportBundle};
use cloudcost_core::error::{CloudcostError, Result};
use cloudcost_core::types::PeriodLabel;
use rust_decimal::Decimal;
use std::collections::{BTreeMap, BTreeSet};

/// Display label of the latest period
pub const CURRENT_PERIOD_LABEL: &str = "Current Period";

/// Inputs to [`assemble`]
#[derive(Debug, Clone, Default)]
pub struct ReportInputs {
    pub overall_summary: Vec<AggregatedRow>,
    pub ec2_summary: Vec<AggregatedRow>,
    pub rds_summary: Vec<AggregatedRow>,
    /// Service names observed in the overall dataset
    pub services: Vec<String>,
    /// Instance types observed in the EC2 dataset
    pub instances: Vec<String>,
    /// Instance types observed in the RDS dataset
    pub rds_instances: Vec<String>,
    /// Periods observed in the overall dataset
    pub periods: BTreeSet<PeriodLabel>,
    pub forecast_cost: Decimal,
}

/// Map each period to its display label
///
/// # Errors
///
/// [`CloudcostError::NoPeriods`] when `periods` is empty.
pub fn period_labels(periods: &BTreeSet<PeriodLabel>) -> Result<BTreeMap<PeriodLabel, String>> {
    let latest = periods.last().ok_or(CloudcostError::NoPeriods)?;
    Ok(periods
        .iter()
        .map(|period| {
            let label = if period == latest {
                CURRENT_PERIOD_LABEL.to_string()
            } else {
                period.to_string()
            };
            (period.clone(), label)
        })
        .collect())
}

fn sorted_unique(values: Vec<String>) -> Vec<String> {
    values
        .into_iter()
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// Build the rendering bundle
pub fn assemble(inputs: ReportInputs) -> Result<ReportBundle> {
    let months = period_labels(&inputs.periods)?;

    Ok(ReportBundle {
        overall_summary: inputs.overall_summary,
        ec2_summary: inputs.ec2_summary,
        rds_summary: inputs.rds_summary,
        months,
        latest_month: CURRENT_PERIOD_LABEL.to_string(),
        instances: sorted_unique(inputs.instances),
        rds_instances: sorted_unique(inputs.rds_instances),
        overall_services: sorted_unique(inputs.services),
        forecast_cost: inputs.forecast_cost,
    })
}
