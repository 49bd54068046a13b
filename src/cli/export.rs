//! Export command for volley-stats.
//!
//! Writes spreadsheet and/or document files for a saved match snapshot.

use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::config::Config;
use crate::core::MatchState;
use crate::error::{Result, VolleyError};
use crate::export::{export_formats, ExportFormat, ExportOutcome};
use crate::storage::load_snapshot;

/// Options for the export command.
#[derive(Debug, Clone, Default)]
pub struct ExportOptions {
    /// Output as JSON.
    pub json: bool,
    /// Suppress output.
    pub quiet: bool,
    /// `xlsx`, `pdf` or `all`; `None` uses the configured formats.
    pub format: Option<String>,
    /// Output directory; `None` uses the configured one.
    pub out_dir: Option<PathBuf>,
}

/// Output format for the export command.
#[derive(Debug, Clone, Serialize)]
pub struct ExportOutput {
    /// Whether every requested file was written.
    pub success: bool,
    /// One entry per requested format.
    pub files: Vec<ExportOutcome>,
    /// Error message if the export could not start.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ExportOutput {
    /// Build output from per-format outcomes.
    pub fn from_outcomes(files: Vec<ExportOutcome>) -> Self {
        Self {
            success: files.iter().all(ExportOutcome::is_ok),
            files,
            error: None,
        }
    }

    /// Create a failed output.
    pub fn failure(error: impl Into<String>) -> Self {
        Self {
            success: false,
            files: Vec::new(),
            error: Some(error.into()),
        }
    }
}

/// Resolve a format argument against the configured defaults.
pub fn resolve_formats(requested: Option<&str>, config: &Config) -> Result<Vec<ExportFormat>> {
    match requested.map(str::trim) {
        None | Some("") => {
            let formats = ExportFormat::parse_list(&config.export.formats);
            if formats.is_empty() {
                Ok(ExportFormat::ALL.to_vec())
            } else {
                Ok(formats)
            }
        }
        Some(name) if name.eq_ignore_ascii_case("all") => Ok(ExportFormat::ALL.to_vec()),
        Some(name) => ExportFormat::parse(name).map(|f| vec![f]).ok_or_else(|| {
            VolleyError::usage(format!("unknown export format '{}' (xlsx, pdf, all)", name))
        }),
    }
}

/// Export a match in memory with the given settings.
pub fn export_match(
    state: &MatchState,
    requested: Option<&str>,
    out_dir: &Path,
    config: &Config,
) -> ExportOutput {
    match resolve_formats(requested, config) {
        Ok(formats) => ExportOutput::from_outcomes(export_formats(state, &formats, out_dir)),
        Err(e) => ExportOutput::failure(e.to_string()),
    }
}

/// Render outcomes as one line per format.
pub fn format_outcomes(files: &[ExportOutcome]) -> String {
    files
        .iter()
        .map(|f| match (&f.path, &f.error) {
            (Some(path), _) => format!("{}: wrote {}", f.format, path.display()),
            (None, error) => format!(
                "{}: failed: {}",
                f.format,
                error.as_deref().unwrap_or("unknown error")
            ),
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// The export command implementation.
pub struct ExportCommand {
    config: Config,
}

impl ExportCommand {
    /// Create a new export command.
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    /// Run the export command against a snapshot file.
    pub fn run(&self, snapshot: &Path, options: &ExportOptions) -> ExportOutput {
        let state = match load_snapshot(snapshot) {
            Ok(state) => state,
            Err(e) => return ExportOutput::failure(e.to_string()),
        };
        let out_dir = options
            .out_dir
            .clone()
            .unwrap_or_else(|| self.config.export.output_dir.clone());
        export_match(&state, options.format.as_deref(), &out_dir, &self.config)
    }

    /// Format output based on options.
    pub fn format_output(&self, output: &ExportOutput, options: &ExportOptions) -> String {
        if options.quiet {
            return String::new();
        }

        if options.json {
            return serde_json::to_string_pretty(output).unwrap_or_else(|_| "{}".to_string());
        }

        if let Some(error) = &output.error {
            return format!("Export failed: {}\n", error);
        }
        format!("{}\n", format_outcomes(&output.files))
    }
}
