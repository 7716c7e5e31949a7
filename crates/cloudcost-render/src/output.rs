//! Output formatting module for cloudcost
//!
//! This module provides formatters for a finished `ReportBundle`:
//! - HTML through a Jinja-style template, the report proper
//! - JSON for machine-readable output and integration with other tools
//! - Table format for a quick terminal summary of the current period
//!
//! # Examples
//!
//! ```no_run
//! use cloudcost_render::output::{HtmlRenderer, OutputFormatter};
//! # fn example(bundle: &cloudcost_core::aggregation_types::ReportBundle) -> cloudcost_core::Result<()> {
//! let renderer = HtmlRenderer::embedded();
//! let html = renderer.format_report(bundle)?;
//! std::fs::write("report.html", html)?;
//! # Ok(())
//! # }
//! ```

use cloudcost_core::aggregation_types::{AggregatedRow, ReportBundle, Totals};
use cloudcost_core::error::{CloudcostError, Result};
use colored::Colorize;
use minijinja::{Environment, context};
use prettytable::{Table, format, row};
use rust_decimal::Decimal;
use std::path::Path;
use tracing::debug;

/// Template shipped with the binary
const EMBEDDED_TEMPLATE: &str = include_str!("../templates/report.html.j2");

/// Name the template is registered under; the `.html` suffix turns on HTML auto-escaping
const TEMPLATE_NAME: &str = "report.html";

/// Trait for report formatters
pub trait OutputFormatter {
    /// Format the whole report bundle
    fn format_report(&self, bundle: &ReportBundle) -> Result<String>;
}

/// Format currency with dollar sign, sign first for negatives
fn format_currency(amount: Decimal) -> String {
    if amount.is_sign_negative() && !amount.is_zero() {
        format!("-${:.2}", amount.abs())
    } else {
        format!("${:.2}", amount.abs())
    }
}

/// Same as [`format_currency`] for values coming out of the template engine
fn format_currency_f64(amount: f64) -> String {
    if amount < 0.0 {
        format!("-${:.2}", -amount)
    } else {
        format!("${amount:.2}")
    }
}

/// Renders the HTML report from a template
pub struct HtmlRenderer {
    source: String,
}

impl HtmlRenderer {
    /// Use the embedded default template
    pub fn embedded() -> Self {
        Self {
            source: EMBEDDED_TEMPLATE.to_string(),
        }
    }

    /// Use a template from an in-memory string
    pub fn from_source(source: impl Into<String>) -> Self {
        Self {
            source: source.into(),
        }
    }

    /// Load a template from disk
    pub fn from_path(path: &Path) -> Result<Self> {
        debug!("Loading template from {}", path.display());
        let source = std::fs::read_to_string(path).map_err(|e| {
            CloudcostError::Template(format!("cannot read {}: {e}", path.display()))
        })?;
        Ok(Self::from_source(source))
    }

    fn environment(&self) -> Result<Environment<'_>> {
        let mut env = Environment::new();
        env.add_filter("currency", |amount: Option<f64>| match amount {
            Some(value) => format_currency_f64(value),
            None => "-".to_string(),
        });
        env.add_template(TEMPLATE_NAME, &self.source)
            .map_err(|e| CloudcostError::Template(e.to_string()))?;
        Ok(env)
    }
}

impl OutputFormatter for HtmlRenderer {
    fn format_report(&self, bundle: &ReportBundle) -> Result<String> {
        let env = self.environment()?;
        let template = env
            .get_template(TEMPLATE_NAME)
            .map_err(|e| CloudcostError::Template(e.to_string()))?;

        template
            .render(context! {
                overall_summary => &bundle.overall_summary,
                ec2_summary => &bundle.ec2_summary,
                rds_summary => &bundle.rds_summary,
                months => &bundle.months,
                latest_month => &bundle.latest_month,
                instances => &bundle.instances,
                rds_instances => &bundle.rds_instances,
                overall_services => &bundle.overall_services,
                forecast_cost => &bundle.forecast_cost,
            })
            .map_err(|e| CloudcostError::Template(e.to_string()))
    }
}

/// JSON formatter for machine-readable output
pub struct JsonFormatter;

impl OutputFormatter for JsonFormatter {
    fn format_report(&self, bundle: &ReportBundle) -> Result<String> {
        Ok(serde_json::to_string_pretty(bundle)?)
    }
}

/// Table formatter for the current-period summary
///
/// Shows one row per service for the current period, most expensive first,
/// followed by a totals row and the forecast.
pub struct TableFormatter;

impl TableFormatter {
    fn format_change(change: Decimal) -> String {
        let text = format_currency(change);
        if change > Decimal::ZERO {
            text.red().to_string()
        } else if change < Decimal::ZERO {
            text.green().to_string()
        } else {
            text
        }
    }
}

impl OutputFormatter for TableFormatter {
    fn format_report(&self, bundle: &ReportBundle) -> Result<String> {
        let Some(current) = bundle.current_period() else {
            return Ok("No cost data available".to_string());
        };

        let mut rows: Vec<&AggregatedRow> = bundle
            .overall_summary
            .iter()
            .filter(|row| &row.period == current)
            .collect();
        rows.sort_by(|a, b| b.cost.cmp(&a.cost).then_with(|| a.key.cmp(&b.key)));

        let mut table = Table::new();
        table.set_format(*format::consts::FORMAT_NO_LINESEP_WITH_TITLE);
        table.set_titles(row![
            b -> "Service",
            b -> "Cost",
            b -> "Previous",
            b -> "Change"
        ]);

        for row in &rows {
            table.add_row(row![
                row.key,
                r -> format_currency(row.cost),
                r -> format_currency(row.previous_cost),
                r -> Self::format_change(row.cost_change)
            ]);
        }

        let totals = Totals::from_rows(rows.iter().copied());
        table.add_row(row![
            b -> "TOTAL",
            b -> format_currency(totals.cost),
            b -> format_currency(totals.previous_cost),
            b -> Self::format_change(totals.cost_change)
        ]);

        Ok(format!(
            "{} ({})\n{}Forecast for the current month: {}\n",
            bundle.latest_month,
            current,
            table,
            format_currency(bundle.forecast_cost)
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cloudcost_core::types::{DimensionKey, PeriodLabel};
    use std::collections::BTreeMap;

    fn row(period: &str, key: &str, cost: i64, previous: i64, total: Option<i64>) -> AggregatedRow {
        AggregatedRow {
            period: PeriodLabel::new(period),
            key: DimensionKey::new(key),
            cost: Decimal::new(cost, 2),
            previous_cost: Decimal::new(previous, 2),
            cost_change: Decimal::new(cost - previous, 2),
            total_cost: total.map(|t| Decimal::new(t, 2)),
        }
    }

    fn sample_bundle() -> ReportBundle {
        let mut months = BTreeMap::new();
        months.insert(PeriodLabel::new("2024-01-01"), "2024-01-01".to_string());
        months.insert(PeriodLabel::new("2024-02-01"), "Current Period".to_string());

        ReportBundle {
            overall_summary: vec![
                row("2024-01-01", "AWS Lambda", 1000, 0, None),
                row("2024-02-01", "AWS Lambda", 1500, 1000, None),
                row("2024-02-01", "Amazon S3 <Glacier>", 25000, 0, None),
            ],
            ec2_summary: vec![row("2024-02-01", "t3.micro", 750, 0, Some(750))],
            rds_summary: vec![row("2024-02-01", "db.t3.small", 2000, 0, Some(2000))],
            months,
            latest_month: "Current Period".to_string(),
            instances: vec!["t3.micro".to_string()],
            rds_instances: vec!["db.t3.small".to_string()],
            overall_services: vec!["AWS Lambda".to_string(), "Amazon S3 <Glacier>".to_string()],
            forecast_cost: Decimal::new(12345, 2),
        }
    }

    #[test]
    fn test_html_embedded_template() {
        let html = HtmlRenderer::embedded().format_report(&sample_bundle()).unwrap();

        assert!(html.contains("$123.45"));
        assert!(html.contains(r#"<option value="2024-02-01" selected>Current Period</option>"#));
        assert!(html.contains(r#"<option value="2024-01-01">2024-01-01</option>"#));
        assert!(html.contains("db.t3.small"));
        assert!(html.contains("$7.50"));
        // Service names are HTML-escaped
        assert!(html.contains("Amazon S3 &lt;Glacier&gt;"));
        assert!(!html.contains("Amazon S3 <Glacier>"));
    }

    #[test]
    fn test_html_custom_template_bindings() {
        let renderer = HtmlRenderer::from_source(
            "{{ latest_month }}|{{ instances|join(',') }}|{{ rds_instances|length }}|\
             {{ overall_summary|length }}|{{ ec2_summary[0].total_cost|currency }}|\
             {{ rds_summary[0].key }}|{{ overall_services[0] }}|{{ forecast_cost|currency }}",
        );
        let output = renderer.format_report(&sample_bundle()).unwrap();
        assert_eq!(
            output,
            "Current Period|t3.micro|1|3|$7.50|db.t3.small|AWS Lambda|$123.45"
        );
    }

    #[test]
    fn test_currency_filter_handles_missing_total() {
        let renderer = HtmlRenderer::from_source("{{ overall_summary[0].total_cost|currency }}");
        let output = renderer.format_report(&sample_bundle()).unwrap();
        assert_eq!(output, "-");
    }

    #[test]
    fn test_negative_amounts_put_sign_first() {
        assert_eq!(format_currency(Decimal::new(-500, 2)), "-$5.00");
        assert_eq!(format_currency(Decimal::new(500, 2)), "$5.00");
        assert_eq!(format_currency(Decimal::new(-0, 2)), "$0.00");

        let renderer = HtmlRenderer::from_source("{{ overall_summary[2].cost_change|currency }}");
        let mut bundle = sample_bundle();
        bundle.overall_summary[2].cost_change = Decimal::new(-500, 2);
        assert_eq!(renderer.format_report(&bundle).unwrap(), "-$5.00");
    }

    #[test]
    fn test_invalid_template_is_template_error() {
        let renderer = HtmlRenderer::from_source("{% for row in overall_summary %}");
        let err = renderer.format_report(&sample_bundle()).unwrap_err();
        assert!(matches!(err, CloudcostError::Template(_)));
    }

    #[test]
    fn test_template_from_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("custom.html");
        std::fs::write(&path, "<p>{{ forecast_cost|currency }}</p>").unwrap();

        let output = HtmlRenderer::from_path(&path)
            .unwrap()
            .format_report(&sample_bundle())
            .unwrap();
        assert_eq!(output, "<p>$123.45</p>");
    }

    #[test]
    fn test_missing_template_file() {
        let result = HtmlRenderer::from_path(Path::new("/nonexistent/template.html"));
        assert!(matches!(result, Err(CloudcostError::Template(_))));
    }

    #[test]
    fn test_json_formatter() {
        let output = JsonFormatter.format_report(&sample_bundle()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&output).unwrap();

        assert_eq!(value["latest_month"], "Current Period");
        assert_eq!(value["months"]["2024-02-01"], "Current Period");
        assert_eq!(value["ec2_summary"][0]["total_cost"], 7.5);
        assert!(value["overall_summary"][0].get("total_cost").is_none());
        assert_eq!(value["forecast_cost"], 123.45);
    }

    #[test]
    fn test_table_formatter_current_period_only() {
        let output = TableFormatter.format_report(&sample_bundle()).unwrap();

        assert!(output.starts_with("Current Period (2024-02-01)"));
        assert!(output.contains("Amazon S3 <Glacier>"));
        assert!(output.contains("$250.00"));
        assert!(output.contains("$265.00"));
        assert!(output.contains("$123.45"));
        // The January row must not appear
        assert_eq!(output.matches("AWS Lambda").count(), 1);

        let s3_pos = output.find("Amazon S3").unwrap();
        let lambda_pos = output.find("AWS Lambda").unwrap();
        assert!(s3_pos < lambda_pos);
    }

    #[test]
    fn test_table_formatter_empty_bundle() {
        let mut bundle = sample_bundle();
        bundle.months.clear();
        let output = TableFormatter.format_report(&bundle).unwrap();
        assert_eq!(output, "No cost data available");
    }
}
