//! Match statistics aggregation.
//!
//! Pure functions over [`crate::core::MatchState`]: per-player totals,
//! category totals, rounded percentages and fault accounting, plus the
//! summary structures shown by the CLI and written by the exporters.

pub mod aggregate;

pub use aggregate::{
    calc_percentage, category_total, lead_percentage, player_totals, set_faults, set_record,
    summarize_match, summarize_player, summarize_set, total_faults, totals_over,
    CategorySummary, MatchSummary, Percentage, PlayerSummary, SetLine,
};
