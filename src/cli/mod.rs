//! CLI commands for volley-stats.
//!
//! - **record**: live match entry through the wizard (stdin or script)
//! - **summary**: aggregated numbers of a saved snapshot
//! - **export**: spreadsheet/document files for a saved snapshot
//! - **config**: effective configuration

pub mod config_cmd;
pub mod export;
pub mod record;
pub mod summary;

pub use config_cmd::{ConfigCommand, ConfigOptions, ConfigOutput};
pub use export::{ExportCommand, ExportOptions, ExportOutput};
pub use record::{
    Command, RecordCommand, RecordOptions, RecordOutput, RecordSession, Reply, Side,
};
pub use summary::{SummaryCommand, SummaryOptions, SummaryOutput};
