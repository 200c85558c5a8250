use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use glob::glob;
use packetlens_core::{
    CaptureResult, DirectoryStore, IngestError, InsightContext, NgByteOrder, PacketFilter,
    ParseError, ParseOptions, TimelineMode, ingest_upload, parse_capture_with,
};
use serde::Serialize;
use tracing::{debug, info};

#[derive(Parser, Debug)]
#[command(name = "packetlens")]
#[command(version)]
#[command(
    about = "Decode pcap/pcapng captures into per-packet summaries and traffic aggregates.",
    long_about = None,
    after_help = "Examples:\n  packetlens capture analyse trace.pcap -o report.json\n  packetlens capture analyze trace.pcapng --stdout --pretty\n  packetlens capture insight trace.pcap"
)]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Operations on pcap/pcapng inputs.
    Capture {
        #[command(subcommand)]
        command: CaptureCommands,
    },
}

#[derive(Subcommand, Debug)]
enum CaptureCommands {
    /// Analyse a capture file and write the JSON result.
    #[command(alias = "analyze")]
    #[command(
        after_help = "Examples:\n  packetlens capture analyse trace.pcap -o report.json\n  packetlens capture analyze trace.pcapng --stdout\n  packetlens capture analyse trace.pcap -o report.json --store uploads/"
    )]
    Analyse(AnalyseArgs),

    /// Print the summary context handed to a narrative generator.
    Insight {
        /// Path (or single-match glob) of the capture
        input: PathBuf,

        /// Pretty-print JSON output
        #[arg(long)]
        pretty: bool,

        #[command(flatten)]
        decode: DecodeArgs,
    },
}

#[derive(Args, Debug)]
struct AnalyseArgs {
    /// Path (or single-match glob) of the capture
    input: PathBuf,

    /// Output report path (JSON)
    #[arg(short = 'o', long, required_unless_present = "stdout")]
    report: Option<PathBuf>,

    /// Write JSON report to stdout
    #[arg(long, conflicts_with = "report")]
    stdout: bool,

    /// Pretty-print JSON output
    #[arg(long, conflicts_with = "compact")]
    pretty: bool,

    /// Compact JSON output (default)
    #[arg(long)]
    compact: bool,

    /// Suppress non-error output
    #[arg(long)]
    quiet: bool,

    /// Store the raw capture in DIR before parsing and report its key as fileName
    #[arg(long, value_name = "DIR")]
    store: Option<PathBuf>,

    /// Exit with a non-zero code if the capture ended in a truncated record
    #[arg(long)]
    strict: bool,

    /// List anomalous packets after analysis
    #[arg(long)]
    list_anomalies: bool,

    /// Keep only packets whose source, destination, protocol or info contains TEXT (any case)
    #[arg(long, value_name = "TEXT")]
    search: Option<String>,

    /// Keep only packets with this exact protocol label, or "all"
    #[arg(long, value_name = "LABEL")]
    protocol: Option<String>,

    #[command(flatten)]
    decode: DecodeArgs,
}

#[derive(Args, Debug)]
struct DecodeArgs {
    /// Timeline bucketing
    #[arg(long, value_enum, default_value_t = TimelineArg::Clock)]
    timeline: TimelineArg,

    /// Byte order used for pcapng block fields
    #[arg(long, value_enum, default_value_t = ByteOrderArg::Little)]
    pcapng_byte_order: ByteOrderArg,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum TimelineArg {
    /// Wall-clock HH:MM buckets
    Clock,
    /// Date-qualified buckets in capture order
    Chronological,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum ByteOrderArg {
    /// Always little-endian
    Little,
    /// Follow each section header's byte-order magic
    Section,
}

impl DecodeArgs {
    fn options(&self) -> ParseOptions {
        ParseOptions {
            timeline: match self.timeline {
                TimelineArg::Clock => TimelineMode::ClockMinute,
                TimelineArg::Chronological => TimelineMode::Chronological,
            },
            pcapng_byte_order: match self.pcapng_byte_order {
                ByteOrderArg::Little => NgByteOrder::LittleEndian,
                ByteOrderArg::Section => NgByteOrder::SectionHeader,
            },
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let quiet = matches!(
        &cli.command,
        Commands::Capture {
            command: CaptureCommands::Analyse(args),
        } if args.quiet
    );
    init_logging(cli.verbose, quiet);

    let result = match cli.command {
        Commands::Capture { command } => match command {
            CaptureCommands::Analyse(args) => cmd_capture_analyse(args),
            CaptureCommands::Insight {
                input,
                pretty,
                decode,
            } => cmd_capture_insight(input, pretty, decode),
        },
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {}", err.message);
            if let Some(hint) = err.hint {
                eprintln!("hint: {}", hint);
            }
            ExitCode::from(2)
        }
    }
}

fn init_logging(verbose: u8, quiet: bool) {
    let level = if quiet {
        tracing::Level::ERROR
    } else {
        match verbose {
            0 => tracing::Level::WARN,
            1 => tracing::Level::INFO,
            2 => tracing::Level::DEBUG,
            _ => tracing::Level::TRACE,
        }
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

#[derive(Debug)]
struct CliError {
    message: String,
    hint: Option<String>,
}

impl CliError {
    fn new(message: impl Into<String>, hint: Option<String>) -> Self {
        Self {
            message: message.into(),
            hint,
        }
    }
}

impl std::fmt::Display for CliError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for CliError {}

impl From<anyhow::Error> for CliError {
    fn from(err: anyhow::Error) -> Self {
        CliError::new(format!("{err:#}"), None)
    }
}

impl From<ParseError> for CliError {
    fn from(err: ParseError) -> Self {
        let hint = match err {
            ParseError::TruncatedHeader { .. } => "the file is empty or cut off before its header",
            ParseError::UnsupportedFormat { .. } => "expected a pcap or pcapng capture",
        };
        CliError::new(format!("capture analysis failed: {err}"), Some(hint.to_string()))
    }
}

impl From<IngestError> for CliError {
    fn from(err: IngestError) -> Self {
        match err {
            IngestError::Parse(err) => err.into(),
            IngestError::StorageFailure(err) => CliError::new(
                format!("failed to store capture: {err}"),
                Some("check that --store points to a writable directory".to_string()),
            ),
        }
    }
}

fn packet_filter(search: Option<String>, protocol: Option<&str>) -> Result<PacketFilter, CliError> {
    let protocol = match protocol {
        Some(label) => PacketFilter::protocol_choice(label).map_err(|err| {
            CliError::new(
                format!("invalid --protocol: {err}"),
                Some("use a label such as TCP, UDP, HTTPS, ARP, IPv6, IP-47, UNKNOWN or all".to_string()),
            )
        })?,
        None => None,
    };
    Ok(PacketFilter { search, protocol })
}

fn cmd_capture_analyse(args: AnalyseArgs) -> Result<(), CliError> {
    let filter = packet_filter(args.search, args.protocol.as_deref())?;
    let resolved_input = resolve_input_path(&args.input)?;
    let input_abs = fs::canonicalize(&resolved_input)
        .with_context(|| format!("Failed to resolve input path: {}", resolved_input.display()))?;

    let report = match (args.stdout, args.report) {
        (true, _) => None,
        (false, Some(path)) => Some(path),
        (false, None) => {
            return Err(CliError::new(
                "missing output path",
                Some("use -o/--report or --stdout".to_string()),
            ));
        }
    };
    if let Some(report_path) = report.as_ref() {
        ensure_distinct_output(report_path, &input_abs)?;
    }

    let bytes = fs::read(&resolved_input)
        .with_context(|| format!("Failed to read input file: {}", resolved_input.display()))?;
    let options = args.decode.options();
    debug!(input = %resolved_input.display(), size = bytes.len(), ?options, "analysing capture");

    let (json, result) = match args.store.as_ref() {
        Some(root) => {
            let file_name = resolved_input
                .file_name()
                .map(|name| name.to_string_lossy().into_owned())
                .unwrap_or_default();
            let store = DirectoryStore::new(root);
            let mut response = ingest_upload(&store, &file_name, &bytes, &options)?;
            filter.retain(&mut response.result.packets);
            let json = serialize_report(&response, args.pretty, args.compact)?;
            (json, response.result)
        }
        None => {
            let mut result = parse_capture_with(&bytes, &options)?;
            filter.retain(&mut result.packets);
            let json = serialize_report(&result, args.pretty, args.compact)?;
            (json, result)
        }
    };

    match report {
        None => print!("{}", json),
        Some(report) => {
            if let Some(parent) = report.parent() {
                if !parent.as_os_str().is_empty() {
                    fs::create_dir_all(parent).with_context(|| {
                        format!("Failed to create output directory: {}", parent.display())
                    })?;
                }
            }
            fs::write(&report, json)
                .with_context(|| format!("Failed to write report: {}", report.display()))?;
            info!(report = %report.display(), packets = result.stats.total_packets, "report written");
            if !args.quiet {
                eprintln!("OK: report written -> {}", report.display());
            }
        }
    }

    if args.list_anomalies && !args.quiet {
        print_anomalies(&result);
    }
    if args.strict && result.integrity.truncated {
        return Err(CliError::new(
            format!(
                "capture truncated: {} trailing bytes were not decoded",
                result.integrity.skipped_bytes
            ),
            Some("the packets before the damaged record were still reported".to_string()),
        ));
    }
    Ok(())
}

fn cmd_capture_insight(input: PathBuf, pretty: bool, decode: DecodeArgs) -> Result<(), CliError> {
    let resolved_input = resolve_input_path(&input)?;
    let bytes = fs::read(&resolved_input)
        .with_context(|| format!("Failed to read input file: {}", resolved_input.display()))?;
    let result = parse_capture_with(&bytes, &decode.options())?;
    let context = InsightContext::from_result(&result);
    println!("{}", serialize_report(&context, pretty, false)?);
    Ok(())
}

fn ensure_distinct_output(report_path: &Path, input_abs: &Path) -> Result<(), CliError> {
    let report_abs = report_path
        .parent()
        .map(|parent| {
            if parent.as_os_str().is_empty() {
                fs::canonicalize(".")
            } else {
                fs::canonicalize(parent)
            }
        })
        .transpose()
        .with_context(|| format!("Failed to resolve output path: {}", report_path.display()))?;
    if let Some(report_dir) = report_abs {
        let report_target = report_dir.join(
            report_path
                .file_name()
                .ok_or_else(|| anyhow::anyhow!("Invalid report path"))?,
        );
        if report_target == input_abs {
            return Err(CliError::new(
                format!(
                    "report path must differ from input: {}",
                    report_path.display()
                ),
                Some("choose a different output path".to_string()),
            ));
        }
    }
    Ok(())
}

fn serialize_report<T: Serialize>(value: &T, pretty: bool, compact: bool) -> Result<String, CliError> {
    if pretty && compact {
        return Err(CliError::new(
            "cannot use --pretty and --compact together",
            Some("choose one output format".to_string()),
        ));
    }
    if pretty {
        serde_json::to_string_pretty(value)
            .context("JSON serialization failed")
            .map_err(Into::into)
    } else {
        serde_json::to_string(value)
            .context("JSON serialization failed")
            .map_err(Into::into)
    }
}

fn print_anomalies(result: &CaptureResult) {
    eprintln!("Anomalous packets:");
    for packet in result.packets.iter().filter(|packet| packet.is_anomaly) {
        eprintln!(
            "  #{} {} {} {} -> {} ({} bytes)",
            packet.id,
            packet.timestamp,
            packet.protocol,
            packet.source,
            packet.destination,
            packet.length
        );
    }
}

fn resolve_input_path(input: &Path) -> Result<PathBuf, CliError> {
    let pattern = input.to_string_lossy();
    if !is_glob_pattern(&pattern) {
        if !input.is_file() {
            return Err(CliError::new(
                format!("input file not found: {}", input.display()),
                Some("pass the path of a pcap or pcapng capture".to_string()),
            ));
        }
        return Ok(input.to_path_buf());
    }

    let mut matches = Vec::new();
    let paths = glob(&pattern).map_err(|err| {
        CliError::new(
            format!("invalid input pattern '{}'", pattern),
            Some(format!("pattern error: {}", err.msg)),
        )
    })?;
    for entry in paths {
        let path = entry.map_err(|err| {
            CliError::new(
                format!("invalid input pattern '{}'", pattern),
                Some(format!("pattern error: {}", err)),
            )
        })?;
        if path.is_file() {
            matches.push(path);
        }
    }

    match matches.len() {
        0 => Err(CliError::new(
            format!("no files match pattern '{}'", pattern),
            Some("check the path or quote the pattern".to_string()),
        )),
        1 => Ok(matches.remove(0)),
        count => {
            let mut message = format!("multiple files match pattern '{}' ({} matches)", pattern, count);
            let listed = matches
                .iter()
                .take(3)
                .map(|p| p.display().to_string())
                .collect::<Vec<_>>()
                .join(", ");
            message.push_str("; matches: ");
            message.push_str(&listed);
            if count > 3 {
                message.push_str(", ...");
            }
            Err(CliError::new(
                message,
                Some("pass a single capture file, or run once per file".to_string()),
            ))
        }
    }
}

fn is_glob_pattern(input: &str) -> bool {
    input.contains('*') || input.contains('?') || input.contains('[')
}
