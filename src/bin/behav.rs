//! Behav CLI - Command-line interface for Retrieval Summary
//!
//! Commands:
//! - summarize: Summarize one coded export into a latency/duration table
//! - config: Print the default summarizer configuration

use clap::{Parser, Subcommand, ValueEnum};
use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::{info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use retrieval_summary::adapters::{
    EventLogAdapter, JsonEventAdapter, PreambleExportAdapter, TabularExportAdapter,
};
use retrieval_summary::{
    BehaviourSummarizer, MergeMode, PairingMode, ReportEncoder, SummarizerConfig, SummaryError,
    SummaryTable, PRODUCER_NAME, SUMMARY_VERSION,
};

/// Behav - Latency and duration summaries for coded behaviour logs
#[derive(Parser)]
#[command(name = "behav")]
#[command(version = SUMMARY_VERSION)]
#[command(about = "Summarize coded pup-retrieval sessions", long_about = None)]
struct Cli {
    /// Log level (error, warn, info, debug, trace)
    #[arg(long, global = true, default_value = "warn")]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Summarize one export into a latency/duration table
    Summarize {
        /// Input file path (use - for stdin)
        #[arg(short, long)]
        input: PathBuf,

        /// Export layout
        #[arg(short, long, default_value = "preamble")]
        format: InputFormat,

        /// Subject identifier stored in every row
        #[arg(long)]
        id: String,

        /// Condition value for this session (e.g. "P5")
        #[arg(long)]
        condition: String,

        /// Condition column name
        #[arg(long, default_value = "condition")]
        condition_name: String,

        /// Behaviour to summarize (repeat to list several; replaces the configured list)
        #[arg(long = "behaviour", value_name = "NAME")]
        behaviours: Vec<String>,

        /// Load summarizer configuration from a JSON file
        #[arg(long)]
        config: Option<PathBuf>,

        /// Latency reported for behaviours that never occur (seconds)
        #[arg(long)]
        latency_sentinel: Option<f64>,

        /// Fail on behaviours with unequal START/STOP counts
        #[arg(long)]
        strict: bool,

        /// Order-independent retrieval merge
        #[arg(long)]
        classified_merge: bool,

        /// Rows before the header in preamble exports
        #[arg(long)]
        skip_rows: Option<usize>,

        /// Field delimiter (detected when omitted)
        #[arg(long)]
        delimiter: Option<Delimiter>,

        /// Output file path (use - for stdout)
        #[arg(short, long, default_value = "-")]
        output: PathBuf,

        /// Output format
        #[arg(long, default_value = "csv")]
        output_format: OutputFormat,
    },

    /// Print the default summarizer configuration as JSON
    Config,
}

#[derive(Clone, ValueEnum)]
enum InputFormat {
    /// Delimited export with a metadata preamble before the header
    Preamble,
    /// Delimited export with a `Behavior type` column
    Tabular,
    /// JSON array of normalized records
    Json,
}

#[derive(Clone, Copy, ValueEnum)]
enum Delimiter {
    Comma,
    Tab,
}

impl Delimiter {
    fn as_char(self) -> char {
        match self {
            Delimiter::Comma => ',',
            Delimiter::Tab => '\t',
        }
    }
}

#[derive(Clone, ValueEnum)]
enum OutputFormat {
    /// Comma-separated table
    Csv,
    /// JSON report
    Json,
    /// Pretty-printed JSON report
    JsonPretty,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    setup_logging(&cli.log_level);

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

fn setup_logging(log_level: &str) {
    let filter = EnvFilter::try_new(log_level).unwrap_or_else(|_| EnvFilter::new("warn"));
    let layer = fmt::layer()
        .with_target(false)
        .with_writer(io::stderr);

    tracing_subscriber::registry().with(filter).with(layer).init();
}

fn run(cli: Cli) -> Result<(), BehavCliError> {
    match cli.command {
        Commands::Summarize {
            input,
            format,
            id,
            condition,
            condition_name,
            behaviours,
            config,
            latency_sentinel,
            strict,
            classified_merge,
            skip_rows,
            delimiter,
            output,
            output_format,
        } => {
            let mut config = match config {
                Some(path) => SummarizerConfig::from_json(&fs::read_to_string(path)?)?,
                None => SummarizerConfig::default(),
            };
            if !behaviours.is_empty() {
                config.behaviours = behaviours;
            }
            if let Some(sentinel) = latency_sentinel {
                config.latency_sentinel = sentinel;
            }
            if strict {
                config.pairing = PairingMode::Strict;
            }
            if classified_merge {
                config.merge_mode = MergeMode::Classified;
            }
            config.validate()?;

            let adapter = build_adapter(format, skip_rows, delimiter);
            cmd_summarize(
                &input,
                adapter.as_ref(),
                config,
                &id,
                &condition,
                &condition_name,
                &output,
                output_format,
            )
        }

        Commands::Config => {
            println!("{}", SummarizerConfig::default().to_json()?);
            Ok(())
        }
    }
}

fn build_adapter(
    format: InputFormat,
    skip_rows: Option<usize>,
    delimiter: Option<Delimiter>,
) -> Box<dyn EventLogAdapter> {
    match format {
        InputFormat::Preamble => {
            let mut adapter = PreambleExportAdapter::new();
            if let Some(rows) = skip_rows {
                adapter = adapter.with_skip_rows(rows);
            }
            if let Some(d) = delimiter {
                adapter = adapter.with_delimiter(d.as_char());
            }
            Box::new(adapter)
        }
        InputFormat::Tabular => {
            let mut adapter = TabularExportAdapter::new();
            if let Some(d) = delimiter {
                adapter = adapter.with_delimiter(d.as_char());
            }
            Box::new(adapter)
        }
        InputFormat::Json => Box::new(JsonEventAdapter),
    }
}

#[allow(clippy::too_many_arguments)]
fn cmd_summarize(
    input: &Path,
    adapter: &dyn EventLogAdapter,
    config: SummarizerConfig,
    id: &str,
    condition: &str,
    condition_name: &str,
    output: &Path,
    output_format: OutputFormat,
) -> Result<(), BehavCliError> {
    let raw = read_input(input)?;
    let log = adapter.parse(&raw)?;

    if log.is_empty() {
        return Err(BehavCliError::NoEvents);
    }
    info!(events = log.len(), subject = id, "parsed export");

    let summarizer = BehaviourSummarizer::with_config(config);
    let table = SummaryTable::new();
    let table = summarizer.summarize(&log, id, condition, condition_name, table, None)?;

    let output_data = match output_format {
        OutputFormat::Csv => table.to_csv(),
        OutputFormat::Json => ReportEncoder::new().encode_to_json(&table)? + "\n",
        OutputFormat::JsonPretty => ReportEncoder::new().encode_to_json_pretty(&table)? + "\n",
    };

    if output.to_string_lossy() == "-" {
        print!("{}", output_data);
    } else {
        fs::write(output, output_data)?;
        info!(rows = table.len(), path = %output.display(), "wrote summary");
    }

    Ok(())
}

fn read_input(input: &Path) -> Result<String, BehavCliError> {
    if input.to_string_lossy() == "-" {
        if atty::is(atty::Stream::Stdin) {
            warn!("reading export from an interactive terminal; end input with Ctrl-D");
        }
        let mut buffer = String::new();
        io::stdin().read_to_string(&mut buffer)?;
        Ok(buffer)
    } else {
        Ok(fs::read_to_string(input)?)
    }
}

// Error types

#[derive(Debug)]
enum BehavCliError {
    Io(io::Error),
    Summary(SummaryError),
    NoEvents,
}

impl From<io::Error> for BehavCliError {
    fn from(e: io::Error) -> Self {
        BehavCliError::Io(e)
    }
}

impl From<SummaryError> for BehavCliError {
    fn from(e: SummaryError) -> Self {
        BehavCliError::Summary(e)
    }
}

#[derive(serde::Serialize)]
struct CliError {
    producer: &'static str,
    code: String,
    message: String,
    hint: Option<String>,
}

impl From<BehavCliError> for CliError {
    fn from(e: BehavCliError) -> Self {
        let (code, hint) = match &e {
            BehavCliError::Io(_) => ("IO_ERROR", Some("Check file paths and permissions")),
            BehavCliError::NoEvents => ("NO_EVENTS", Some("Ensure the export contains event rows")),
            BehavCliError::Summary(inner) => match inner {
                SummaryError::MissingReferenceEvent(_) => (
                    "MISSING_REFERENCE_EVENT",
                    Some("Code a 'pup intro' event or set reference_behaviour in the config"),
                ),
                SummaryError::MalformedTimestamp { .. } => (
                    "MALFORMED_TIMESTAMP",
                    Some("Time values must be numeric seconds"),
                ),
                SummaryError::MismatchedIntervalCount { .. } => (
                    "MISMATCHED_INTERVALS",
                    Some("Check the coding for missing START/STOP events, or drop --strict"),
                ),
                SummaryError::MissingColumn(_) => (
                    "MISSING_COLUMN",
                    Some("Check --format and --skip-rows match the export layout"),
                ),
                SummaryError::InvalidConfig(_) => ("INVALID_CONFIG", None),
                SummaryError::JsonError(_) => ("JSON_ERROR", Some("Check JSON syntax")),
                SummaryError::ParseError(_) => ("PARSE_ERROR", Some("Check input format")),
            },
        };

        let message = match e {
            BehavCliError::Io(e) => e.to_string(),
            BehavCliError::Summary(e) => e.to_string(),
            BehavCliError::NoEvents => "No events found in input".to_string(),
        };

        CliError {
            producer: PRODUCER_NAME,
            code: code.to_string(),
            message,
            hint: hint.map(str::to_string),
        }
    }
}
