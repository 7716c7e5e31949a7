//! cloudcost - Generate a month-over-month AWS cost report

use chrono::Utc;
use clap::Parser;
use cloudcost::{
    cli::Cli,
    error::Result,
    pipeline::{ReportPipeline, write_document},
};
use cloudcost_aws::CostExplorerSource;
use cloudcost_render::{HtmlRenderer, JsonFormatter, OutputFormatter, TableFormatter};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging. The --quiet flag should override RUST_LOG.
    let filter = if cli.quiet {
        tracing_subscriber::EnvFilter::new("warn")
    } else {
        tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("cloudcost=info"))
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    // Fail on bad configuration or template before any query is issued
    let config = cli.billing_config()?;
    let today = Utc::now().date_naive();
    let history_end = cli.history_end(today)?;
    let renderer = match &cli.template {
        Some(path) => HtmlRenderer::from_path(path)?,
        None => HtmlRenderer::embedded(),
    };

    let show_progress = !cli.json && !cli.quiet && is_terminal::is_terminal(std::io::stdout());
    let source = CostExplorerSource::new(&config).await;
    let bundle = ReportPipeline::new()
        .with_lookback_days(cli.lookback_days)
        .with_progress(show_progress)
        .run(&source, history_end, today)
        .await?;

    if cli.json {
        println!("{}", JsonFormatter.format_report(&bundle)?);
    } else {
        let html = renderer.format_report(&bundle)?;
        write_document(&cli.output, &html)?;
        info!("Report covers {} period(s)", bundle.months.len());
        println!("HTML report generated: {}", cli.output.display());
    }

    if cli.summary {
        println!("{}", TableFormatter.format_report(&bundle)?);
    }

    Ok(())
}
