//! rla: command-line front end for the risk-limiting audit engine.
//!
//! Every subcommand reads a JSON request file and prints a JSON result on
//! stdout. Logs go to stderr.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::Parser;
use rla_audit::{
    assess_risk, draw_sample, estimate_sample_sizes, AuditConfig, RiskRequest, SampleSizeRequest,
    SamplingRequest,
};
use rla_margins::compute_margins;
use rla_types::ContestTally;
use rla_utils::LogFormat;
use serde::de::DeserializeOwned;
use serde::Serialize;

#[derive(Parser)]
#[command(name = "rla", about = "Risk-limiting audit math over JSON files")]
struct Cli {
    /// Path to a TOML configuration file. File settings are the base;
    /// CLI flags and env vars override them.
    #[arg(long, env = "RLA_CONFIG")]
    config: Option<PathBuf>,

    /// Log level: "trace", "debug", "info", "warn", "error".
    #[arg(long, env = "RLA_LOG_LEVEL")]
    log_level: Option<String>,

    /// Log format: "human" or "json".
    #[arg(long, env = "RLA_LOG_FORMAT")]
    log_format: Option<LogFormat>,

    /// BRAVO completion probabilities (comma-separated: "0.7,0.8,0.9").
    #[arg(long, env = "RLA_COMPLETION_QUANTILES", value_delimiter = ',')]
    quantiles: Vec<f64>,

    /// Pretty-print JSON output.
    #[arg(long)]
    pretty: bool,

    /// Subcommand.
    #[command(subcommand)]
    command: Command,
}

#[derive(clap::Subcommand)]
enum Command {
    /// Draw a seeded sample for a sampling request.
    Sample {
        /// Public random seed.
        #[arg(long, env = "RLA_SEED")]
        seed: String,

        /// Number of draws to return.
        #[arg(long)]
        sample_size: usize,

        /// Draws already taken in earlier rounds.
        #[arg(long, default_value_t = 0)]
        already_drawn: usize,

        /// JSON sampling request.
        request: PathBuf,
    },
    /// Compute margins for a JSON map of contest tallies.
    Margins {
        /// JSON object of contest name to tally.
        contests: PathBuf,
    },
    /// Estimate the next round's sample size.
    SampleSize {
        /// JSON sample-size request.
        request: PathBuf,
    },
    /// Measure risk and decide whether the audit can stop.
    Risk {
        /// JSON risk request.
        request: PathBuf,
    },
}

impl Command {
    fn name(&self) -> &'static str {
        match self {
            Self::Sample { .. } => "sample",
            Self::Margins { .. } => "margins",
            Self::SampleSize { .. } => "sample-size",
            Self::Risk { .. } => "risk",
        }
    }
}

fn read_json<T: DeserializeOwned>(path: &Path) -> anyhow::Result<T> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    serde_json::from_str(&content).with_context(|| format!("failed to parse {}", path.display()))
}

fn render<T: Serialize>(value: &T, pretty: bool) -> anyhow::Result<String> {
    let out = if pretty {
        serde_json::to_string_pretty(value)?
    } else {
        serde_json::to_string(value)?
    };
    Ok(out)
}

/// File config, then flag and env overrides.
fn load_config(cli: &Cli) -> anyhow::Result<AuditConfig> {
    let mut config = match &cli.config {
        Some(path) => AuditConfig::from_toml_file(path)
            .with_context(|| format!("failed to load config {}", path.display()))?,
        None => AuditConfig::default(),
    };
    if let Some(level) = &cli.log_level {
        config.log_level = level.clone();
    }
    if let Some(format) = cli.log_format {
        config.log_format = format;
    }
    if !cli.quantiles.is_empty() {
        config.completion_quantiles = cli.quantiles.clone();
        config.validate()?;
    }
    Ok(config)
}

fn run(command: &Command, config: &AuditConfig, pretty: bool) -> anyhow::Result<String> {
    match command {
        Command::Sample {
            seed,
            sample_size,
            already_drawn,
            request,
        } => {
            let request: SamplingRequest = read_json(request)?;
            let draws = draw_sample(seed, &request, *sample_size, *already_drawn)
                .context("failed to draw sample")?;
            render(&draws, pretty)
        }
        Command::Margins { contests } => {
            let contests: BTreeMap<String, ContestTally> = read_json(contests)?;
            let margins = compute_margins(&contests).context("failed to compute margins")?;
            render(&margins, pretty)
        }
        Command::SampleSize { request } => {
            let request: SampleSizeRequest = read_json(request)?;
            let sizes = estimate_sample_sizes(&request, &config.completion_quantiles)
                .context("failed to estimate sample sizes")?;
            render(&sizes, pretty)
        }
        Command::Risk { request } => {
            let request: RiskRequest = read_json(request)?;
            let outcome = assess_risk(&request).context("failed to assess risk")?;
            tracing::info!(stop = outcome.stop(), "risk measured");
            render(&outcome, pretty)
        }
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = load_config(&cli)?;

    rla_utils::init_logging(config.log_format, &config.log_level);
    if let Some(path) = &cli.config {
        tracing::info!("Loaded config from {}", path.display());
    }
    tracing::info!(command = cli.command.name(), "running");

    let out = run(&cli.command, &config, cli.pretty)?;
    println!("{out}");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use std::io::Write;

    fn json_file(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        file.write_all(contents.as_bytes()).expect("write");
        file
    }

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn quantile_flag_overrides_config() {
        let cli = Cli::try_parse_from(["rla", "--quantiles", "0.5,0.95", "margins", "c.json"])
            .expect("should parse");
        let config = load_config(&cli).expect("should load");
        assert_eq!(config.completion_quantiles, vec![0.5, 0.95]);

        let cli = Cli::try_parse_from(["rla", "--quantiles", "1.5", "margins", "c.json"])
            .expect("should parse");
        assert!(load_config(&cli).is_err());
    }

    #[test]
    fn margins_command_prints_shares() {
        let file = json_file(r#"{"test1": {"cand1": 600, "cand2": 400, "ballots": 1000}}"#);
        let command = Command::Margins {
            contests: file.path().to_path_buf(),
        };
        let out = run(&command, &AuditConfig::default(), false).expect("should run");
        let value: serde_json::Value = serde_json::from_str(&out).expect("json");
        assert_eq!(value["test1"]["winners"]["cand1"]["swl"]["cand2"], 0.6);
    }

    #[test]
    fn sample_command_renders_fixed_width_tickets() {
        let file = json_file(
            r#"{"method": "ballot_polling",
                "manifest": [{"jurisdiction": "J1", "batch": "pct 1", "ballots": 20}]}"#,
        );
        let command = Command::Sample {
            seed: "seed".to_string(),
            sample_size: 5,
            already_drawn: 0,
            request: file.path().to_path_buf(),
        };
        let out = run(&command, &AuditConfig::default(), false).expect("should run");
        let draws: Vec<serde_json::Value> = serde_json::from_str(&out).expect("json");
        assert_eq!(draws.len(), 5);
        for draw in draws {
            let ticket = draw["ticket"].as_str().expect("ticket string");
            assert_eq!(ticket.len(), 11);
            assert!(ticket.starts_with("0."));
        }
    }

    #[test]
    fn unreadable_request_reports_path() {
        let command = Command::Risk {
            request: PathBuf::from("/nonexistent/request.json"),
        };
        let err = run(&command, &AuditConfig::default(), false).unwrap_err();
        assert!(err.to_string().contains("/nonexistent/request.json"));
    }
}
