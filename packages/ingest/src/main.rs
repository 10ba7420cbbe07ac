#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! CLI entry point for the rat sighting ingestion tool.

use std::path::PathBuf;

use chrono::{DateTime, Utc};
use clap::{Args, Parser, Subcommand};
use rat_map_ingest::{
    IngestReport, OutputFormat, fetch_and_ingest, ingest_file, write_records, write_summary,
};
use rat_map_sighting_models::ValidationMode;
use rat_map_source::FetchOptions;
use rat_map_source::feed::{DEFAULT_FEED_ID, all_feeds, feed_by_id};
use rat_map_validator::coerce::parse_feed_date;

#[derive(Parser)]
#[command(
    name = "rat_map_ingest",
    about = "NYC 311 rat sighting validation and ingestion tool"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate a saved JSON or CSV snapshot
    Validate {
        /// Path to the snapshot (`.csv` for CSV exports, anything else is JSON)
        path: PathBuf,
        #[command(flatten)]
        output: OutputArgs,
    },
    /// Fetch rows from the live feed and validate them
    Fetch {
        /// Feed identifier (see `feeds`)
        #[arg(long, default_value = DEFAULT_FEED_ID)]
        feed: String,
        /// Maximum number of records to fetch
        #[arg(long)]
        limit: Option<u64>,
        /// Only fetch records created after this date (e.g. "2024-01-01")
        #[arg(long, value_parser = parse_since)]
        since: Option<DateTime<Utc>>,
        /// Socrata application token
        #[arg(long, env = "RAT_MAP_APP_TOKEN", hide_env_values = true)]
        app_token: Option<String>,
        #[command(flatten)]
        output: OutputArgs,
    },
    /// List all configured feeds
    Feeds,
}

#[derive(Args)]
struct OutputArgs {
    /// Reject unknown columns and out-of-vocabulary values
    #[arg(long)]
    strict: bool,
    /// Write accepted records to this file as JSON
    #[arg(long, short)]
    output: Option<PathBuf>,
    /// Write records with upstream column names instead of normalized fields
    #[arg(long)]
    raw: bool,
    /// Write the run summary to this file as JSON
    #[arg(long)]
    summary: Option<PathBuf>,
}

impl OutputArgs {
    const fn mode(&self) -> ValidationMode {
        if self.strict {
            ValidationMode::Strict
        } else {
            ValidationMode::Lenient
        }
    }

    const fn format(&self) -> OutputFormat {
        if self.raw {
            OutputFormat::Raw
        } else {
            OutputFormat::Normalized
        }
    }
}

fn parse_since(s: &str) -> Result<DateTime<Utc>, String> {
    parse_feed_date(s).ok_or_else(|| format!("invalid date: {s}"))
}

fn finish(report: &IngestReport, output: &OutputArgs) -> Result<(), Box<dyn std::error::Error>> {
    if let Some(path) = &output.output {
        write_records(path, &report.records, output.format())?;
    }
    if let Some(path) = &output.summary {
        write_summary(path, &report.summary())?;
    }
    print_summary(report);
    Ok(())
}

fn print_summary(report: &IngestReport) {
    let summary = report.summary();

    println!("Rows:        {}", summary.total_rows);
    println!("Accepted:    {}", summary.accepted);
    println!("Skipped:     {}", summary.rejected);
    println!("Warnings:    {}", summary.warnings);
    println!("Duplicates:  {}", summary.duplicates_collapsed);
    println!("Located:     {}", summary.with_coordinates);
    if let (Some(earliest), Some(latest)) = (summary.earliest_created_at, summary.latest_created_at)
    {
        println!(
            "Created:     {} .. {}",
            earliest.format("%Y-%m-%d %H:%M"),
            latest.format("%Y-%m-%d %H:%M")
        );
    }

    println!();
    println!("{:<20} COUNT", "BOROUGH");
    println!("{}", "-".repeat(30));
    for (borough, count) in &summary.by_borough {
        println!("{borough:<20} {count}");
    }

    println!();
    println!("{:<20} COUNT", "STATUS");
    println!("{}", "-".repeat(30));
    for (status, count) in &summary.by_status {
        println!("{status:<20} {count}");
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    pretty_env_logger::init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Validate { path, output } => {
            let report = ingest_file(&path, output.mode())?;
            finish(&report, &output)?;
        }
        Commands::Fetch {
            feed,
            limit,
            since,
            app_token,
            output,
        } => {
            let feed = feed_by_id(&feed)?;
            let options = FetchOptions {
                since,
                limit,
                app_token,
                ..FetchOptions::default()
            };
            let report = fetch_and_ingest(&feed, &options, output.mode())
                .await
                .inspect_err(|e| log::error!("Feed unreachable: {e}"))?;
            finish(&report, &output)?;
        }
        Commands::Feeds => {
            let feeds = all_feeds()?;
            println!("{:<20} NAME", "ID");
            println!("{}", "-".repeat(50));
            for feed in &feeds {
                println!("{:<20} {}", feed.id(), feed.name());
                if let Some(url) = feed.portal_url() {
                    println!("{:<20} {url}", "");
                }
                if let Some(attribution) = &feed.license.attribution_text {
                    println!("{:<20} {attribution}", "");
                }
            }
        }
    }

    Ok(())
}
