//! Match exports.
//!
//! Exporters turn a read-only [`MatchState`] into file bytes. Writing the
//! bytes to disk is shared: files land in the output directory under a
//! name derived from the match info, written atomically.
//!
//! Available exporters:
//! - **Spreadsheet**: one sheet per set plus a summary sheet (`.xlsx`)
//! - **Document**: A4 report with summary and per-set tables (`.pdf`)

pub mod document;
pub mod layout;
pub mod spreadsheet;

use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::core::{MatchInfo, MatchState};
use crate::error::{Result, VolleyError};
use crate::util::atomic_write;

pub use document::PdfExporter;
pub use spreadsheet::XlsxExporter;

/// Output format of an exporter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    Xlsx,
    Pdf,
}

impl ExportFormat {
    /// Every format, in the order `export all` produces them.
    pub const ALL: [ExportFormat; 2] = [ExportFormat::Xlsx, ExportFormat::Pdf];

    /// File extension without the dot.
    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Xlsx => "xlsx",
            ExportFormat::Pdf => "pdf",
        }
    }

    /// Parse a format name (case-insensitive).
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "xlsx" | "excel" => Some(ExportFormat::Xlsx),
            "pdf" => Some(ExportFormat::Pdf),
            _ => None,
        }
    }

    /// Parse a list of configured format names, skipping unknown ones.
    pub fn parse_list(names: &[String]) -> Vec<Self> {
        let mut formats = Vec::new();
        for name in names {
            match Self::parse(name) {
                Some(format) if !formats.contains(&format) => formats.push(format),
                Some(_) => {}
                None => tracing::warn!(format = %name, "ignoring unknown export format"),
            }
        }
        formats
    }

    /// The exporter producing this format.
    pub fn exporter(&self) -> Box<dyn Exporter> {
        match self {
            ExportFormat::Xlsx => Box::new(XlsxExporter::new()),
            ExportFormat::Pdf => Box::new(PdfExporter::new()),
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

/// Trait for exporters that render a match to file bytes.
///
/// Exporters only read the match; a failed render leaves nothing behind
/// and can be retried.
pub trait Exporter {
    /// Format this exporter produces.
    fn format(&self) -> ExportFormat;

    /// Render the whole match.
    fn render(&self, state: &MatchState) -> Result<Vec<u8>>;
}

/// File name for an export: `Volley_Stats_<team>_<date>.<ext>`.
///
/// Slashes in the date become dashes. Path separators in the team name
/// are replaced as well so the file always lands in the output directory.
pub fn export_filename(info: &MatchInfo, format: ExportFormat) -> String {
    let team = info.team.replace(['/', '\\'], "-");
    let date = info.date.replace(['/', '\\'], "-");
    format!("Volley_Stats_{}_{}.{}", team, date, format.extension())
}

/// Render with `exporter` and write the file into `dir`.
///
/// Returns the path written.
pub fn write_export(exporter: &dyn Exporter, state: &MatchState, dir: &Path) -> Result<PathBuf> {
    let format = exporter.format();
    let bytes = exporter.render(state)?;
    let path = dir.join(export_filename(&state.match_info, format));
    atomic_write(&path, &bytes)?;
    tracing::info!(format = %format, path = %path.display(), bytes = bytes.len(), "export written");
    Ok(path)
}

/// Result of one format in an export request.
#[derive(Debug, Clone, Serialize)]
pub struct ExportOutcome {
    pub format: ExportFormat,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ExportOutcome {
    /// Whether this format was written.
    pub fn is_ok(&self) -> bool {
        self.error.is_none()
    }
}

/// Export boundary: write every requested format, never failing as a whole.
///
/// A failure in one format is logged and reported in its outcome; the
/// other formats still run and the match is untouched.
pub fn export_formats(state: &MatchState, formats: &[ExportFormat], dir: &Path) -> Vec<ExportOutcome> {
    formats
        .iter()
        .map(|format| {
            let exporter = format.exporter();
            match write_export(exporter.as_ref(), state, dir) {
                Ok(path) => ExportOutcome {
                    format: *format,
                    path: Some(path),
                    error: None,
                },
                Err(e) => {
                    tracing::error!(format = %format, error = %e, "export failed");
                    ExportOutcome {
                        format: *format,
                        path: None,
                        error: Some(e.to_string()),
                    }
                }
            }
        })
        .collect()
}

/// Map a writer library error into an export error.
pub(crate) fn writer_error(context: &str, err: impl fmt::Display) -> VolleyError {
    VolleyError::export(format!("{}: {}", context, err))
}
