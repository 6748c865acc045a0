//! Tally CLI
//!
//! Runs the report pipeline without the HTTP server:
//! - Generate a daily work report
//! - Print the default configuration

use anyhow::Context;
use clap::{Parser, Subcommand};
use std::fmt::Write as _;
use std::path::PathBuf;
use tally::config::{generate_default_config, Config};
use tally::report::{DailyReport, PersonReport, ReportError, ReportRequest, ReportService};

#[derive(Parser)]
#[command(name = "tally-cli")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Daily work reports from a time-tracking API")]
#[command(long_about = "Tally discovers the base URL, authentication scheme and resource paths of a time-tracking API,\nthen aggregates one day of time entries per person.")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Config file (default: ~/.config/tally/config.toml, /etc/tally/config.toml, ./config.toml)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Generate a daily work report
    Report {
        /// API key identifier
        #[arg(long)]
        key_id: String,
        /// API key secret
        #[arg(long)]
        key_secret: String,
        /// Report date (YYYY-MM-DD)
        #[arg(short, long)]
        date: String,
        /// Base URL of the time-tracking API (default: configured production root)
        #[arg(short, long)]
        base_url: Option<String>,
        /// Expected shift length in hours
        #[arg(short, long)]
        shift_hours: Option<f64>,
        /// Auth scheme (auto, basic, bearer, api-key, api-key-secret)
        #[arg(short, long)]
        auth_mode: Option<String>,
        /// Per-attempt timeout in milliseconds
        #[arg(long)]
        timeout_ms: Option<u64>,
        /// Print the raw JSON payload instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Generate default config file
    InitConfig {
        /// Output path (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Diagnostics go to stderr so stdout stays parseable
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "tally=warn".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Report {
            key_id,
            key_secret,
            date,
            base_url,
            shift_hours,
            auth_mode,
            timeout_ms,
            json,
        } => {
            let config = match &cli.config {
                Some(path) => Config::load_with_env(path)?,
                None => Config::try_load_default()?.0,
            };

            let service = ReportService::new(config.discovery)?;
            let request = ReportRequest {
                api_key_id: Some(key_id),
                api_key_secret: Some(key_secret),
                base_url,
                date: Some(date),
                shift_hours,
                auth_mode,
                timeout_ms,
            };

            let report = match service.generate_report(&request).await {
                Ok(report) => report,
                Err(e) => {
                    eprintln!("Error: {}", e);
                    if let ReportError::Discovery(failure) = &e {
                        eprintln!("Details: {}", failure.details);
                        eprintln!("Tried:");
                        for url in &failure.tried_base_urls {
                            eprintln!("  {}", url);
                        }
                    }
                    std::process::exit(1);
                }
            };

            if json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                print!("{}", render_report(&report));
            }
        }

        Commands::InitConfig { output } => {
            let content = generate_default_config();
            match output {
                Some(path) => {
                    std::fs::write(&path, content)
                        .with_context(|| format!("writing {}", path.display()))?;
                    println!("Config written to {}", path.display());
                }
                None => print!("{}", content),
            }
        }
    }

    Ok(())
}

/// Render the whole report as plain text
fn render_report(report: &DailyReport) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "Source: {}{} ({}), {} people",
        report.base_url, report.people_endpoint, report.auth_strategy, report.people_count
    );

    for person in &report.reports {
        out.push('\n');
        out.push_str(&render_person(person, &report.date));
    }

    if report.reports.is_empty() {
        out.push_str("\nNo people returned\n");
    }

    out
}

/// Render one person's table
fn render_person(person: &PersonReport, date: &str) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{} - Daily Work Report ({})", person.name, date);

    if person.grouped_entries.is_empty() {
        let _ = writeln!(out, "No records for this day");
    } else {
        let _ = writeln!(
            out,
            "{:<24} | {:<8} | {:<8} | {}",
            "Property", "In", "Out", "Total"
        );
        let _ = writeln!(out, "{}", "-".repeat(58));

        for group in &person.grouped_entries {
            let _ = writeln!(
                out,
                "{:<24} | {:<8} | {:<8} | {}",
                group.property,
                group.time_in_formatted,
                group.time_out_formatted,
                group.total_formatted
            );
        }
    }

    let _ = writeln!(out, "Total worked: {}", person.total_formatted);
    let _ = writeln!(out, "Balance: {}", person.balance_formatted);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use tally::report::GroupedEntry;

    fn person(groups: Vec<GroupedEntry>) -> PersonReport {
        PersonReport {
            id: "p1".into(),
            name: "Ada Lovelace".into(),
            total_minutes: groups.iter().map(|g| g.total_minutes).sum(),
            balance_minutes: 0,
            total_formatted: "1h 30m".into(),
            balance_formatted: "6h 30m".into(),
            grouped_entries: groups,
        }
    }

    #[test]
    fn test_render_person_rows() {
        let group = GroupedEntry {
            property: "Office".into(),
            time_in: None,
            time_out: None,
            total_minutes: 90,
            time_in_formatted: "09:00:00".into(),
            time_out_formatted: "10:30:00".into(),
            total_formatted: "1h 30m".into(),
        };

        let text = render_person(&person(vec![group]), "2024-03-04");
        assert!(text.starts_with("Ada Lovelace - Daily Work Report (2024-03-04)\n"));
        assert!(text.contains("Office"));
        assert!(text.contains("09:00:00"));
        assert!(text.contains("Total worked: 1h 30m"));
        assert!(text.contains("Balance: 6h 30m"));
        assert!(!text.contains("No records"));
    }

    #[test]
    fn test_render_person_without_entries() {
        let text = render_person(&person(vec![]), "2024-03-04");
        assert!(text.contains("No records for this day"));
        assert!(!text.contains("Property"));
    }

    #[test]
    fn test_cli_parses_report() {
        let cli = Cli::try_parse_from([
            "tally-cli",
            "report",
            "--key-id",
            "id",
            "--key-secret",
            "secret",
            "--date",
            "2024-03-04",
            "--shift-hours",
            "7.5",
            "--json",
        ])
        .unwrap();

        match cli.command {
            Commands::Report { shift_hours, json, base_url, .. } => {
                assert_eq!(shift_hours, Some(7.5));
                assert!(json);
                assert!(base_url.is_none());
            }
            _ => panic!("expected report command"),
        }
    }
}
