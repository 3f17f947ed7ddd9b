//! incident-sync - Full sync of an incident.io workspace
//!
//! Validates the API key, walks every resource type the incident.io
//! connector exposes and writes the collected resources, entitlements and
//! grants as JSON.

use std::env::VarError;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use xavyo_connector::prelude::*;
use xavyo_connector_incident::{IncidentConfig, IncidentConnector, DEFAULT_PAGE_SIZE};

mod error;

use error::{CliError, CliResult};

/// Sync users, schedules and roles from incident.io
#[derive(Debug, Parser)]
#[command(name = "incident-sync")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// incident.io API key
    #[arg(long, env = "INCIDENT_API_TOKEN", hide_env_values = true)]
    api_token: Option<String>,

    /// API root (defaults to https://api.incident.io/v2)
    #[arg(long, env = "INCIDENT_BASE_URL")]
    base_url: Option<String>,

    /// Items requested per page
    #[arg(long, default_value_t = DEFAULT_PAGE_SIZE)]
    page_size: u32,

    /// Write the sync output here instead of stdout
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Only check that the API key works
    #[arg(long)]
    validate_only: bool,
}

impl Args {
    /// Command line values take precedence over the process environment.
    fn config(&self) -> CliResult<IncidentConfig> {
        let config = IncidentConfig::from_reader(|key| match key {
            "INCIDENT_API_TOKEN" => self.api_token.clone().ok_or(VarError::NotPresent),
            "INCIDENT_BASE_URL" => self.base_url.clone().ok_or(VarError::NotPresent),
            _ => std::env::var(key),
        })?;
        Ok(config)
    }
}

#[tokio::main]
async fn main() {
    // Load .env if present
    let _ = dotenvy::dotenv();

    // Initialize logging; stdout carries the sync output
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,xavyo_connector_incident=debug")),
        )
        .with_writer(io::stderr)
        .init();

    let args = Args::parse();

    match run(args).await {
        Ok(()) => std::process::exit(0),
        Err(e) => {
            e.print();
            std::process::exit(e.exit_code());
        }
    }
}

async fn run(args: Args) -> CliResult<()> {
    let config = args.config()?;

    tracing::info!(
        base_url = %config.base_url,
        page_size = args.page_size,
        "starting incident.io sync"
    );

    let connector = IncidentConnector::new(&config)?;
    connector.validate().await?;

    if args.validate_only {
        tracing::info!("validation only, skipping sync");
        return Ok(());
    }

    let output = SyncRunner::new(args.page_size).run(&connector).await?;

    match &args.output {
        Some(path) => {
            let file = File::create(path)?;
            write_output(BufWriter::new(file), &output)?;
            tracing::info!(path = %path.display(), "sync output written");
        }
        None => write_output(io::stdout().lock(), &output)?,
    }

    Ok(())
}

fn write_output<W: Write>(mut writer: W, output: &SyncOutput) -> CliResult<()> {
    serde_json::to_writer_pretty(&mut writer, output)?;
    writeln!(writer)?;
    writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Args {
        Args::try_parse_from(std::iter::once("incident-sync").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn test_defaults() {
        let args = parse(&["--api-token", "inc_test"]);
        assert_eq!(args.page_size, DEFAULT_PAGE_SIZE);
        assert!(args.output.is_none());
        assert!(!args.validate_only);
    }

    #[test]
    fn test_flags_override_config() {
        let args = parse(&[
            "--api-token",
            "inc_test",
            "--base-url",
            "http://localhost:8080/v2",
            "--page-size",
            "25",
            "--validate-only",
        ]);
        let config = args.config().unwrap();
        assert_eq!(config.base_url, "http://localhost:8080/v2");
        assert_eq!(args.page_size, 25);
        assert!(args.validate_only);
    }

    #[test]
    fn test_invalid_base_url_is_config_error() {
        let args = parse(&["--api-token", "inc_test", "--base-url", "ftp://example.com"]);
        let err = args.config().unwrap_err();
        assert_eq!(err.exit_code(), 1);
        assert!(matches!(err, CliError::Config(_)));
    }

    #[test]
    fn test_write_output_is_json() {
        let mut buf = Vec::new();
        write_output(&mut buf, &SyncOutput::default()).unwrap();
        let value: serde_json::Value = serde_json::from_slice(&buf).unwrap();
        assert!(value["grants"].as_array().unwrap().is_empty());
    }
}
