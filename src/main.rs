//! volley-stats - live volleyball match statistics
//!
//! CLI entry point with logging setup and global panic handler.

use std::io::{IsTerminal, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use volley_stats::cli::{
    ConfigCommand, ConfigOptions, ExportCommand, ExportOptions, RecordCommand, RecordOptions,
    SummaryCommand, SummaryOptions,
};
use volley_stats::config::{crash_log_path, Config};
use volley_stats::error::exit_codes;

// =============================================================================
// CLI Definition
// =============================================================================

/// volley-stats - live volleyball match statistics
#[derive(Parser)]
#[command(name = "volley-stats")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Record a match: setup, live entry, summary and export
    Record {
        /// Output replies as JSON lines
        #[arg(long, short)]
        json: bool,
        /// Only print rejected commands
        #[arg(long, short)]
        quiet: bool,
        /// Read commands from a file instead of stdin
        #[arg(long)]
        script: Option<PathBuf>,
        /// Directory for exported files
        #[arg(long)]
        out_dir: Option<PathBuf>,
    },

    /// Show totals and percentages of a saved match
    Summary {
        /// Snapshot file written by `save`
        snapshot: PathBuf,
        /// Output as JSON
        #[arg(long, short)]
        json: bool,
        /// Suppress output
        #[arg(long, short)]
        quiet: bool,
        /// Only this set
        #[arg(long)]
        set: Option<u32>,
    },

    /// Export a saved match to xlsx and/or pdf
    Export {
        /// Snapshot file written by `save`
        snapshot: PathBuf,
        /// Output as JSON
        #[arg(long, short)]
        json: bool,
        /// Suppress output
        #[arg(long, short)]
        quiet: bool,
        /// File format (defaults to the configured formats)
        #[arg(long, short, value_enum)]
        format: Option<FormatArg>,
        /// Directory for exported files
        #[arg(long)]
        out_dir: Option<PathBuf>,
    },

    /// Show the effective configuration
    Config {
        /// Output as JSON
        #[arg(long, short)]
        json: bool,
        /// Suppress output
        #[arg(long, short)]
        quiet: bool,
    },
}

/// Export format argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum FormatArg {
    Xlsx,
    Pdf,
    All,
}

impl FormatArg {
    fn as_str(&self) -> &'static str {
        match self {
            FormatArg::Xlsx => "xlsx",
            FormatArg::Pdf => "pdf",
            FormatArg::All => "all",
        }
    }
}

// =============================================================================
// Main Entry Point
// =============================================================================

fn main() -> ExitCode {
    init_tracing();
    setup_panic_handler();

    match run() {
        Ok(code) => code,
        Err(e) => {
            eprintln!("volley-stats error: {}", e);
            ExitCode::from(exit_codes::ERROR as u8)
        }
    }
}

/// Initialize logging on stderr.
///
/// `VOLLEY_LOG` holds the filter directives (default `volley_stats=warn`),
/// `VOLLEY_LOG_FORMAT=json` switches to JSON lines.
fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_env("VOLLEY_LOG")
        .unwrap_or_else(|_| "volley_stats=warn".into());
    let log_format = std::env::var("VOLLEY_LOG_FORMAT").unwrap_or_else(|_| "text".to_string());

    match log_format.as_str() {
        "json" => {
            tracing_subscriber::registry()
                .with(filter)
                .with(
                    tracing_subscriber::fmt::layer()
                        .json()
                        .with_writer(std::io::stderr),
                )
                .init();
        }
        _ => {
            tracing_subscriber::registry()
                .with(filter)
                .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
                .init();
        }
    }
}

/// Set up the global panic handler.
///
/// On panic, logs to ~/.volley/crash.log and exits with code 3.
fn setup_panic_handler() {
    std::panic::set_hook(Box::new(|info| {
        eprintln!("volley-stats panic: {}", info);

        if let Some(crash_log) = crash_log_path() {
            if let Some(parent) = crash_log.parent() {
                let _ = std::fs::create_dir_all(parent);
            }
            if let Ok(mut file) = std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(&crash_log)
            {
                let timestamp = chrono::Utc::now().format("%Y-%m-%d %H:%M:%S UTC");
                let _ = writeln!(file, "[{}] {}", timestamp, info);
            }
        }

        std::process::exit(exit_codes::CRASH);
    }));
}

/// Run the CLI and return the exit code.
fn run() -> Result<ExitCode, Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let cwd = std::env::current_dir()?;

    match cli.command {
        Commands::Record {
            json,
            quiet,
            script,
            out_dir,
        } => run_record(json, quiet, script, out_dir, &cwd),
        Commands::Summary {
            snapshot,
            json,
            quiet,
            set,
        } => run_summary(&snapshot, json, quiet, set),
        Commands::Export {
            snapshot,
            json,
            quiet,
            format,
            out_dir,
        } => run_export(&snapshot, json, quiet, format, out_dir, &cwd),
        Commands::Config { json, quiet } => run_config(json, quiet, &cwd),
    }
}

// =============================================================================
// Command Implementations
// =============================================================================

fn success_to_exit_code(success: bool) -> ExitCode {
    if success {
        ExitCode::from(exit_codes::SUCCESS as u8)
    } else {
        ExitCode::from(exit_codes::ERROR as u8)
    }
}

fn run_record(
    json: bool,
    quiet: bool,
    script: Option<PathBuf>,
    out_dir: Option<PathBuf>,
    cwd: &Path,
) -> Result<ExitCode, Box<dyn std::error::Error>> {
    let config = Config::load_from_cwd(cwd);
    let cmd = RecordCommand::new(config);
    let prompt = script.is_none() && !json && std::io::stdin().is_terminal();
    let options = RecordOptions {
        json,
        quiet,
        script,
        out_dir,
        prompt,
    };

    let output = cmd.run(&options);
    let formatted = cmd.format_output(&output, &options);
    if !formatted.is_empty() {
        eprint!("{}", formatted);
    }

    Ok(success_to_exit_code(output.success))
}

fn run_summary(
    snapshot: &Path,
    json: bool,
    quiet: bool,
    set: Option<u32>,
) -> Result<ExitCode, Box<dyn std::error::Error>> {
    let cmd = SummaryCommand::new();
    let options = SummaryOptions { json, quiet, set };

    let output = cmd.run(snapshot, &options);
    let formatted = cmd.format_output(&output, &options);
    if !formatted.is_empty() {
        print!("{}", formatted);
    }

    Ok(success_to_exit_code(output.success))
}

fn run_export(
    snapshot: &Path,
    json: bool,
    quiet: bool,
    format: Option<FormatArg>,
    out_dir: Option<PathBuf>,
    cwd: &Path,
) -> Result<ExitCode, Box<dyn std::error::Error>> {
    let config = Config::load_from_cwd(cwd);
    let cmd = ExportCommand::new(config);
    let options = ExportOptions {
        json,
        quiet,
        format: format.map(|f| f.as_str().to_string()),
        out_dir,
    };

    let output = cmd.run(snapshot, &options);
    let formatted = cmd.format_output(&output, &options);
    if !formatted.is_empty() {
        print!("{}", formatted);
    }

    Ok(success_to_exit_code(output.success))
}

fn run_config(json: bool, quiet: bool, cwd: &Path) -> Result<ExitCode, Box<dyn std::error::Error>> {
    let config = Config::load_from_cwd(cwd);
    let cmd = ConfigCommand::new(config);
    let options = ConfigOptions { json, quiet };

    let output = cmd.run(&options);
    let formatted = cmd.format_output(&output, &options);
    if !formatted.is_empty() {
        print!("{}", formatted);
    }

    Ok(success_to_exit_code(output.success))
}
