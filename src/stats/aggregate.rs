//! Aggregation over a match.
//!
//! Every function here is a pure read of [`MatchState`]. Nothing is cached:
//! totals are recomputed on each call, so a summary always reflects the
//! latest counter edits.
//!
//! Fault accounting counts missed serves and missed attacks as faults in
//! addition to the explicit `faults.direct` counter:
//!
//! ```text
//! set_faults   = faults.direct + service.missed + attack.missed
//! total_faults = Σ over sets of set_faults
//! ```

use std::fmt;
use std::ops::RangeInclusive;

use serde::{Deserialize, Serialize};

use crate::core::{Category, MatchState, Role, StatRecord};

/// A whole-number percentage in `0..=100`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Percentage(pub u32);

impl Percentage {
    /// The numeric value.
    pub fn value(&self) -> u32 {
        self.0
    }
}

impl fmt::Display for Percentage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}%", self.0)
    }
}

/// `value / total` as a rounded percentage.
///
/// Returns `0%` when `total` is zero. Halves round up, so `1/8` is `13%`
/// and `2/3` is `67%`. Integer arithmetic only.
pub fn calc_percentage(value: u32, total: u32) -> Percentage {
    if total == 0 {
        return Percentage(0);
    }
    let value = u64::from(value);
    let total = u64::from(total);
    // floor(100 * v / t + 1/2)
    let pct = (200 * value + total) / (2 * total);
    Percentage(u32::try_from(pct).unwrap_or(u32::MAX))
}

/// Sum of a category's counters in a record.
pub fn category_total(record: &StatRecord, category: Category) -> u32 {
    record.tally(category).total()
}

/// Lead counter of a category as a percentage of that category's total.
pub fn lead_percentage(record: &StatRecord, category: Category) -> Percentage {
    let tally = record.tally(category);
    calc_percentage(tally.lead(), tally.total())
}

/// Record of one player in one set, zero when absent.
pub fn set_record(state: &MatchState, player: &str, set: u8) -> StatRecord {
    state.record(player, set).copied().unwrap_or_default()
}

/// Counter-wise sum of a player's records over a range of sets.
///
/// Sets outside `1..=set_count` are ignored. Missing records count as zero.
pub fn totals_over(state: &MatchState, player: &str, sets: RangeInclusive<u8>) -> StatRecord {
    let first = (*sets.start()).max(1);
    let last = (*sets.end()).min(state.set_count);
    (first..=last).fold(StatRecord::zero(), |acc, set| {
        acc.merged(&set_record(state, player, set))
    })
}

/// Counter-wise sum of a player's records over every set.
///
/// An unknown player yields an all-zero record.
pub fn player_totals(state: &MatchState, player: &str) -> StatRecord {
    totals_over(state, player, 1..=state.set_count)
}

/// Faults charged to a single record.
pub fn set_faults(record: &StatRecord) -> u32 {
    record
        .faults
        .direct
        .saturating_add(record.service.missed)
        .saturating_add(record.attack.missed)
}

/// Faults charged to a player over the whole match.
pub fn total_faults(state: &MatchState, player: &str) -> u32 {
    state
        .sets()
        .map(|set| set_faults(&set_record(state, player, set)))
        .fold(0u32, u32::saturating_add)
}

// =============================================================================
// Summaries
// =============================================================================

/// Total and lead percentage for one category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategorySummary {
    pub category: Category,
    pub total: u32,
    pub lead: u32,
    pub percentage: Percentage,
}

impl CategorySummary {
    fn of(record: &StatRecord, category: Category) -> Self {
        let tally = record.tally(category);
        Self {
            category,
            total: tally.total(),
            lead: tally.lead(),
            percentage: calc_percentage(tally.lead(), tally.total()),
        }
    }
}

/// Aggregated numbers for one player.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerSummary {
    pub name: String,
    pub role: Role,
    /// Summed counters over the considered sets.
    pub totals: StatRecord,
    /// One entry per category, canonical order.
    pub categories: Vec<CategorySummary>,
    pub total_faults: u32,
}

impl PlayerSummary {
    /// Summary entry for a category.
    pub fn category(&self, category: Category) -> Option<&CategorySummary> {
        self.categories.iter().find(|c| c.category == category)
    }

    fn from_totals(name: &str, role: Role, totals: StatRecord, total_faults: u32) -> Self {
        Self {
            name: name.to_string(),
            role,
            totals,
            categories: Category::ALL
                .iter()
                .map(|category| CategorySummary::of(&totals, *category))
                .collect(),
            total_faults,
        }
    }
}

/// Score line of one set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SetLine {
    pub set: u8,
    pub team: u32,
    pub opponent: u32,
}

/// Aggregated view of a whole match, or of one set of it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchSummary {
    pub team: String,
    pub date: String,
    pub set_count: u8,
    /// Set the summary is restricted to, `None` for the whole match.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub set: Option<u8>,
    pub scores: Vec<SetLine>,
    pub players: Vec<PlayerSummary>,
}

/// Summarize one player over the whole match.
pub fn summarize_player(state: &MatchState, player: &str) -> Option<PlayerSummary> {
    let role = state.player(player)?.role;
    Some(PlayerSummary::from_totals(
        player,
        role,
        player_totals(state, player),
        total_faults(state, player),
    ))
}

/// Summarize every player over the whole match.
pub fn summarize_match(state: &MatchState) -> MatchSummary {
    let players = state
        .players
        .iter()
        .filter_map(|p| summarize_player(state, &p.name))
        .collect();
    build_summary(state, None, players)
}

/// Summarize every player over a single set.
///
/// `set` must already be validated against the match.
pub fn summarize_set(state: &MatchState, set: u8) -> MatchSummary {
    let players = state
        .players
        .iter()
        .map(|p| {
            let record = set_record(state, &p.name, set);
            PlayerSummary::from_totals(&p.name, p.role, record, set_faults(&record))
        })
        .collect();
    build_summary(state, Some(set), players)
}

fn build_summary(state: &MatchState, set: Option<u8>, players: Vec<PlayerSummary>) -> MatchSummary {
    let scores = state
        .sets()
        .filter(|s| set.map_or(true, |only| only == *s))
        .map(|s| {
            let score = state.score(s);
            SetLine {
                set: s,
                team: score.team,
                opponent: score.opponent,
            }
        })
        .collect();

    MatchSummary {
        team: state.match_info.team.clone(),
        date: state.match_info.date.clone(),
        set_count: state.set_count,
        set,
        scores,
        players,
    }
}
