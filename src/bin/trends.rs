//! Trends CLI - Command-line interface for FitTrack Trends
//!
//! Commands:
//! - report: Build the dashboard for a snapshot
//! - validate: Check snapshot records
//! - config: Print the default engine configuration

use chrono::{NaiveDate, Utc};
use clap::{Parser, Subcommand, ValueEnum};
use std::fs;
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use fittrack_trends::dashboard::parse_day;
use fittrack_trends::{
    build_dashboard, failing_record_count, AnalyticsError, Dashboard, EngineConfig, RangeToken,
    RecordIssue, Snapshot, ENGINE_VERSION, PRODUCER_NAME,
};

/// Trends - Deterministic analytics for fitness dashboards
#[derive(Parser)]
#[command(name = "trends")]
#[command(author = "FitTrack")]
#[command(version = ENGINE_VERSION)]
#[command(about = "Turn meal, workout and weight logs into dashboard metrics", long_about = None)]
struct Cli {
    /// Log engine diagnostics to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build the dashboard for a snapshot
    Report {
        /// Snapshot file path (use - for stdin)
        #[arg(short, long, default_value = "-")]
        input: PathBuf,

        /// Output file path (use - for stdout)
        #[arg(short, long, default_value = "-")]
        output: PathBuf,

        /// Range token: 7d, 30d, 90d, 1y or all
        #[arg(short, long, default_value = "30d")]
        range: String,

        /// Reference day (yyyy-MM-dd); defaults to the current day at the configured offset
        #[arg(long)]
        today: Option<String>,

        /// Engine configuration file (JSON)
        #[arg(long)]
        config: Option<PathBuf>,

        /// Output format; pretty when stdout is a terminal, compact otherwise
        #[arg(long)]
        output_format: Option<OutputFormat>,
    },

    /// Check snapshot records for invalid values and future timestamps
    Validate {
        /// Snapshot file path (use - for stdin)
        #[arg(short, long, default_value = "-")]
        input: PathBuf,

        /// Reference day (yyyy-MM-dd)
        #[arg(long)]
        today: Option<String>,

        /// Engine configuration file (JSON)
        #[arg(long)]
        config: Option<PathBuf>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Print the default engine configuration
    Config,
}

#[derive(Clone, Copy, ValueEnum)]
enum OutputFormat {
    /// Compact single-line JSON
    Json,
    /// Pretty-printed JSON
    JsonPretty,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!(
                "{}",
                serde_json::to_string(&CliError::from(e))
                    .unwrap_or_else(|_| "Unknown error".to_string())
            );
            ExitCode::FAILURE
        }
    }
}

/// Install the stderr subscriber; `RUST_LOG` wins over `--verbose`
fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

fn run(cli: Cli) -> Result<(), TrendsCliError> {
    match cli.command {
        Commands::Report {
            input,
            output,
            range,
            today,
            config,
            output_format,
        } => cmd_report(
            &input,
            &output,
            &range,
            today.as_deref(),
            config.as_deref(),
            output_format,
        ),

        Commands::Validate {
            input,
            today,
            config,
            json,
        } => cmd_validate(&input, today.as_deref(), config.as_deref(), json),

        Commands::Config => cmd_config(),
    }
}

fn cmd_report(
    input: &Path,
    output: &Path,
    range: &str,
    today: Option<&str>,
    config: Option<&Path>,
    output_format: Option<OutputFormat>,
) -> Result<(), TrendsCliError> {
    let config = load_config(config)?;
    let range: RangeToken = range.parse()?;
    let today = resolve_today(today, &config)?;
    let snapshot = Snapshot::from_json(&read_input(input)?)?;

    info!(producer = PRODUCER_NAME, %range, %today, "building report");
    let dashboard = build_dashboard(&snapshot, range, today, &config)?;

    let to_stdout = is_stdio(output);
    let format = output_format.unwrap_or(if to_stdout && atty::is(atty::Stream::Stdout) {
        OutputFormat::JsonPretty
    } else {
        OutputFormat::Json
    });
    let rendered = format_output(&dashboard, format)?;

    if to_stdout {
        let mut stdout = io::stdout().lock();
        writeln!(stdout, "{rendered}")?;
    } else {
        fs::write(output, rendered + "\n")?;
        debug!(path = %output.display(), "wrote report");
    }
    Ok(())
}

fn cmd_validate(
    input: &Path,
    today: Option<&str>,
    config: Option<&Path>,
    json: bool,
) -> Result<(), TrendsCliError> {
    let config = load_config(config)?;
    let today = resolve_today(today, &config)?;
    let snapshot = Snapshot::from_json(&read_input(input)?)?;
    let issues = snapshot.validate(today, config.offset()?);

    let report = ValidationReport {
        total_records: snapshot.meals.len() + snapshot.workouts.len() + snapshot.weights.len(),
        invalid_records: failing_record_count(&issues),
        issues,
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("Validation Report");
        println!("=================");
        println!("Meals:    {}", snapshot.meals.len());
        println!("Workouts: {}", snapshot.workouts.len());
        println!("Weights:  {}", snapshot.weights.len());
        println!("Invalid:  {}", report.invalid_records);

        if !report.issues.is_empty() {
            println!("\nIssues:");
            for issue in &report.issues {
                let id = issue.id.map(|id| id.to_string());
                println!(
                    "  - {} {} (index {}): {}",
                    issue.kind,
                    id.as_deref().unwrap_or("-"),
                    issue.index,
                    issue.message
                );
            }
        }
    }

    if report.invalid_records > 0 {
        Err(TrendsCliError::ValidationFailed(report.invalid_records))
    } else {
        Ok(())
    }
}

fn cmd_config() -> Result<(), TrendsCliError> {
    println!("{}", EngineConfig::default().to_json()?);
    Ok(())
}

// Helper functions

fn is_stdio(path: &Path) -> bool {
    path.as_os_str() == "-"
}

fn read_input(input: &Path) -> Result<String, TrendsCliError> {
    if is_stdio(input) {
        let mut buffer = String::new();
        io::stdin().read_to_string(&mut buffer)?;
        Ok(buffer)
    } else {
        Ok(fs::read_to_string(input)?)
    }
}

fn load_config(path: Option<&Path>) -> Result<EngineConfig, TrendsCliError> {
    match path {
        Some(path) => {
            debug!(path = %path.display(), "loading config");
            Ok(EngineConfig::from_json(&fs::read_to_string(path)?)?)
        }
        None => Ok(EngineConfig::default()),
    }
}

/// The given day, or the current day at the configured offset
fn resolve_today(today: Option<&str>, config: &EngineConfig) -> Result<NaiveDate, TrendsCliError> {
    match today {
        Some(day) => Ok(parse_day(day)?),
        None => Ok(Utc::now().with_timezone(&config.offset()?).date_naive()),
    }
}

fn format_output(dashboard: &Dashboard, format: OutputFormat) -> Result<String, TrendsCliError> {
    match format {
        OutputFormat::Json => Ok(dashboard.to_json()?),
        OutputFormat::JsonPretty => Ok(dashboard.to_json_pretty()?),
    }
}

// Error types

#[derive(Debug)]
enum TrendsCliError {
    Io(io::Error),
    Engine(AnalyticsError),
    Json(serde_json::Error),
    ValidationFailed(usize),
}

impl From<io::Error> for TrendsCliError {
    fn from(e: io::Error) -> Self {
        TrendsCliError::Io(e)
    }
}

impl From<AnalyticsError> for TrendsCliError {
    fn from(e: AnalyticsError) -> Self {
        TrendsCliError::Engine(e)
    }
}

impl From<serde_json::Error> for TrendsCliError {
    fn from(e: serde_json::Error) -> Self {
        TrendsCliError::Json(e)
    }
}

#[derive(serde::Serialize)]
struct CliError {
    code: String,
    message: String,
    hint: Option<String>,
}

impl From<TrendsCliError> for CliError {
    fn from(e: TrendsCliError) -> Self {
        match e {
            TrendsCliError::Io(e) => CliError {
                code: "IO_ERROR".to_string(),
                message: e.to_string(),
                hint: Some("Check file paths and permissions".to_string()),
            },
            TrendsCliError::Engine(e) => {
                let (code, hint) = match &e {
                    AnalyticsError::InvalidRange(_) => {
                        ("INVALID_RANGE", "Use one of 7d, 30d, 90d, 1y, all")
                    }
                    AnalyticsError::DateOutOfRange(_) => {
                        ("DATE_OUT_OF_RANGE", "Pick a reference day closer to the present")
                    }
                    AnalyticsError::InvalidValue { .. } => {
                        ("INVALID_VALUE", "Run 'trends validate' for details")
                    }
                    AnalyticsError::InvalidConfig(_) => {
                        ("INVALID_CONFIG", "Run 'trends config' for a valid starting point")
                    }
                    AnalyticsError::JsonError(_) => ("JSON_ERROR", "Check JSON syntax"),
                    AnalyticsError::ParseError(_) => {
                        ("PARSE_ERROR", "Dates are yyyy-MM-dd; records follow the snapshot format")
                    }
                };
                CliError {
                    code: code.to_string(),
                    message: e.to_string(),
                    hint: Some(hint.to_string()),
                }
            }
            TrendsCliError::Json(e) => CliError {
                code: "JSON_ERROR".to_string(),
                message: e.to_string(),
                hint: Some("Check JSON syntax".to_string()),
            },
            TrendsCliError::ValidationFailed(count) => CliError {
                code: "VALIDATION_FAILED".to_string(),
                message: format!("{} records failed validation", count),
                hint: Some("Fix the listed records and retry".to_string()),
            },
        }
    }
}

// Report types

#[derive(serde::Serialize)]
struct ValidationReport {
    total_records: usize,
    invalid_records: usize,
    issues: Vec<RecordIssue>,
}
