use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::Parser;
use log::info;

mod aggregate;
mod config;
mod report;
mod report_command;
mod time_entry;
mod toggl;

use config::Config;
use report_command::ReportCommand;
use toggl::TogglReportClient;

/// CLI generating a billable-hours HTML report from the Toggl Reports API.
///
/// # Examples
/// ```
/// $ cargo run -- 2016-03-01 2016-03-15
/// ```
#[derive(Debug, Parser)]
#[clap(version, about)]
struct Args {
    #[clap(
        help = "Beginning of report range in YYYY-MM-DD format",
        parse(try_from_str = parse_date),
    )]
    since: NaiveDate,

    #[clap(
        help = "End of report range in YYYY-MM-DD format",
        parse(try_from_str = parse_date),
    )]
    until: NaiveDate,

    #[clap(
        short = 'c',
        long = "config",
        help = "Path to the config file (defaults to the user config directory)"
    )]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    setup_logger().context("Failed to initialize logger")?;

    let config_path = match args.config {
        Some(path) => path,
        None => Config::default_path()?,
    };
    let config = Config::load(&config_path)?;

    let client = TogglReportClient::new(config.api_key.clone());
    let report = ReportCommand::new(&client)
        .run(&config, args.since, args.until)
        .await?;

    std::fs::write(&config.report_file, report)
        .with_context(|| format!("Failed to write report to {}", config.report_file.display()))?;
    info!("Report written to {}", config.report_file.display());

    Ok(())
}

/// Parses a report range bound.
fn parse_date(s: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").with_context(|| format!("Failed to parse date: {}", s))
}

fn setup_logger() -> Result<(), fern::InitError> {
    let colors = fern::colors::ColoredLevelConfig::new()
        .info(fern::colors::Color::Green)
        .warn(fern::colors::Color::Yellow)
        .error(fern::colors::Color::Red);

    fern::Dispatch::new()
        .format(move |out, message, record| {
            out.finish(format_args!(
                "[{}][{}] {}",
                chrono::Local::now().format("%H:%M:%S"),
                colors.color(record.level()),
                message
            ))
        })
        .level(log::LevelFilter::Info)
        .chain(std::io::stdout())
        .apply()?;

    Ok(())
}
