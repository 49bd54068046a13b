//! volley-stats - live volleyball match statistics
//!
//! Records per-player, per-set counters during a match, aggregates them
//! into totals and success percentages, and exports the result as a
//! spreadsheet or a PDF report.

pub mod cli;
pub mod config;
pub mod core;
pub mod error;
pub mod export;
pub mod stats;
pub mod storage;
pub mod util;

pub use config::Config;
pub use core::{
    applicable_categories, is_category_applicable, update_counter, Category, MatchInfo,
    MatchSetup, MatchState, Player, Role, SetScore, StatKey, StatRecord, Wizard, WizardStep,
};
pub use error::{Result, VolleyError};
pub use export::{export_formats, ExportFormat, ExportOutcome, Exporter};
pub use stats::{
    calc_percentage, player_totals, summarize_match, summarize_set, total_faults, MatchSummary,
    Percentage, PlayerSummary,
};
pub use storage::{load_snapshot, save_snapshot};

// CLI commands
pub use cli::{ConfigCommand, ExportCommand, RecordCommand, SummaryCommand};
