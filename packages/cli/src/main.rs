#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! CLI entry point for the weekly earthquake significance map.
//!
//! Reads a saved feed dump, runs the requested computation and prints the
//! result as JSON on stdout. Logging goes to stderr via `pretty_env_logger`
//! and is controlled by `RUST_LOG`.

mod feed;

use std::path::PathBuf;

use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand};
use quake_map_quake_models::parse_timestamp;
use quake_map_significance::{EventFilter, Significance, SignificanceConfig, color, markers};
use serde_json::json;

#[derive(Parser)]
#[command(name = "quake_map_cli", about = "Weekly earthquake significance map")]
struct Cli {
    /// Feed dump: a JSON record array or a `{ "data": [...] }` envelope
    #[arg(long, global = true, default_value = "feed.json")]
    input: PathBuf,
    /// TOML configuration overriding the built-in defaults
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List every selectable week with its date range
    Windows,
    /// Cluster the events of one week and print the rendered circles
    Significance {
        /// Zero-based week index counted from the epoch
        #[arg(long, default_value = "0")]
        week: u32,
    },
    /// Filter individual events and print them as map markers
    Events {
        /// Earliest timestamp (RFC 3339 or `YYYY-MM-DD`)
        #[arg(long, value_parser = parse_instant)]
        from: Option<DateTime<Utc>>,
        /// Latest timestamp (RFC 3339 or `YYYY-MM-DD`)
        #[arg(long, value_parser = parse_instant)]
        to: Option<DateTime<Utc>>,
        /// Smallest magnitude
        #[arg(long)]
        min_magnitude: Option<f64>,
        /// Largest magnitude
        #[arg(long)]
        max_magnitude: Option<f64>,
        /// Shallowest depth in kilometers
        #[arg(long)]
        min_depth: Option<f64>,
        /// Deepest depth in kilometers
        #[arg(long)]
        max_depth: Option<f64>,
    },
}

fn parse_instant(s: &str) -> Result<DateTime<Utc>, String> {
    parse_timestamp(s).ok_or_else(|| format!("unrecognized timestamp '{s}'"))
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    pretty_env_logger::init();
    let output = run(Cli::parse())?;
    println!("{}", serde_json::to_string_pretty(&output)?);

    Ok(())
}

fn run(cli: Cli) -> Result<serde_json::Value, Box<dyn std::error::Error>> {
    let config = match &cli.config {
        Some(path) => SignificanceConfig::load(path)?,
        None => SignificanceConfig::default(),
    };
    let significance = Significance::new(config)?;

    let output = match cli.command {
        Commands::Windows => {
            let windows = significance.windows_at(Utc::now());
            let rows: Vec<_> = windows
                .iter()
                .map(|w| {
                    json!({
                        "index": w.index,
                        "label": w.label(),
                        "start": w.start,
                        "end": w.end,
                    })
                })
                .collect();
            serde_json::to_value(rows)?
        }
        Commands::Significance { week } => {
            let events = feed::load(&cli.input)?;
            let map = significance.clusters(&events, week)?;
            log::info!(
                "Week {week} ({}): {} clusters from {} events",
                map.window.label(),
                map.clusters.len(),
                map.event_count
            );
            let legend: Vec<_> = color::legend()
                .into_iter()
                .map(|(magnitude, rgb)| {
                    json!({ "magnitude": magnitude, "color": rgb.to_string() })
                })
                .collect();
            json!({ "map": map, "legend": legend })
        }
        Commands::Events {
            from,
            to,
            min_magnitude,
            max_magnitude,
            min_depth,
            max_depth,
        } => {
            let events = feed::load(&cli.input)?;
            let filter = EventFilter {
                from,
                to,
                min_magnitude,
                max_magnitude,
                min_depth_km: min_depth,
                max_depth_km: max_depth,
            };
            let selected = filter.apply(&events);
            log::info!("{} of {} events match", selected.len(), events.len());
            serde_json::to_value(markers(selected))?
        }
    };

    Ok(output)
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory as _;

    use super::*;

    #[test]
    fn command_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_significance_week() {
        let cli = Cli::try_parse_from(["quake_map_cli", "significance", "--week", "4"]).unwrap();
        assert!(matches!(cli.command, Commands::Significance { week: 4 }));
        assert_eq!(cli.input, PathBuf::from("feed.json"));
    }

    #[test]
    fn parses_event_filters() {
        let cli = Cli::try_parse_from([
            "quake_map_cli",
            "events",
            "--from",
            "2024-09-02",
            "--min-magnitude",
            "4.5",
            "--input",
            "dump.json",
        ])
        .unwrap();
        let Commands::Events {
            from,
            min_magnitude,
            max_depth,
            ..
        } = cli.command
        else {
            panic!("expected events command");
        };
        assert_eq!(
            from.map(|d| d.to_rfc3339()).as_deref(),
            Some("2024-09-02T00:00:00+00:00")
        );
        assert!(min_magnitude.is_some_and(|m| (m - 4.5).abs() < f64::EPSILON));
        assert!(max_depth.is_none());
        assert_eq!(cli.input, PathBuf::from("dump.json"));
    }

    const FEED: &str = r#"{"data": [
        {"_id": "a", "lintang": "6.20 LS", "bujur": "106.81 BT", "magnitude": "4.0",
         "kedalaman": "10 Km", "wilayah": "Jakarta", "datetime": "2024-09-02T03:00:00"},
        {"_id": "b", "lintang": "6.90 LS", "bujur": "107.60 BT", "magnitude": "6.0",
         "kedalaman": "120 Km", "wilayah": "Bandung", "datetime": "2024-09-03T03:00:00"},
        {"_id": "c", "lintang": "3.70 LS", "bujur": "128.18 BT", "magnitude": "7.0",
         "kedalaman": "30 Km", "wilayah": "Ambon", "datetime": "2024-09-10T03:00:00"}
    ]}"#;

    fn run_with_feed(name: &str, args: &[&str]) -> serde_json::Value {
        let path = std::env::temp_dir().join(name);
        std::fs::write(&path, FEED).unwrap();

        let input = path.display().to_string();
        let mut argv = vec!["quake_map_cli", "--input", input.as_str()];
        argv.extend_from_slice(args);
        let output = run(Cli::try_parse_from(argv).unwrap()).unwrap();

        std::fs::remove_file(&path).unwrap();
        output
    }

    #[test]
    fn significance_command_renders_week_zero() {
        let output = run_with_feed(
            "quake_map_cli_significance.json",
            &["significance", "--week", "0"],
        );
        let clusters = output["map"]["clusters"].as_array().unwrap();
        assert_eq!(clusters.len(), 1);
        assert_eq!(clusters[0]["memberCount"], 2);
        assert_eq!(clusters[0]["label"], "Mean Magnitude: 5.00");
        assert_eq!(output["legend"].as_array().unwrap().len(), 3);
    }

    #[test]
    fn events_command_applies_filters() {
        let output = run_with_feed(
            "quake_map_cli_events.json",
            &["events", "--min-magnitude", "5", "--max-depth", "100"],
        );
        let markers = output.as_array().unwrap();
        assert_eq!(markers.len(), 1);
        assert_eq!(markers[0]["id"], "c");
    }

    #[test]
    fn windows_command_starts_at_epoch() {
        let output = run(Cli::try_parse_from(["quake_map_cli", "windows"]).unwrap()).unwrap();
        let windows = output.as_array().unwrap();
        assert!(windows.len() >= 2);
        assert_eq!(windows[0]["index"], 0);
        assert_eq!(windows[0]["label"], "01/09/2024 - 08/09/2024");
    }

    #[test]
    fn missing_feed_is_an_error() {
        let cli = Cli::try_parse_from([
            "quake_map_cli",
            "--input",
            "/definitely/not/here.json",
            "significance",
        ])
        .unwrap();
        assert!(run(cli).is_err());
    }

    #[test]
    fn rejects_bad_timestamp() {
        assert!(Cli::try_parse_from(["quake_map_cli", "events", "--to", "someday"]).is_err());
    }
}
