//! Match state types.
//!
//! [`MatchState`] is the single in-memory aggregate for a match: players,
//! set count, match info, one [`StatRecord`] per player per set, and the
//! score of every set. It is created at the start of entry and mutated one
//! cell at a time.

use std::collections::{BTreeMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::core::record::{StatKey, StatRecord};
use crate::core::role::Role;
use crate::error::{Result, VolleyError};

/// Smallest allowed number of sets.
pub const MIN_SETS: u8 = 1;

/// Largest allowed number of sets.
pub const MAX_SETS: u8 = 10;

/// A player on the roster.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Player {
    /// Display name, unique within a match.
    pub name: String,
    /// Court role.
    pub role: Role,
}

impl Player {
    /// Create a new player.
    pub fn new(name: impl Into<String>, role: Role) -> Self {
        Self {
            name: name.into(),
            role,
        }
    }
}

/// Match metadata shown in headers and used for export filenames.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchInfo {
    /// Team name.
    pub team: String,
    /// Match date as entered (free text, usually `dd/mm/yyyy`).
    pub date: String,
}

impl MatchInfo {
    /// Create match info.
    pub fn new(team: impl Into<String>, date: impl Into<String>) -> Self {
        Self {
            team: team.into(),
            date: date.into(),
        }
    }
}

/// Score of one set.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SetScore {
    /// Points for our team.
    pub team: u32,
    /// Points for the opponent.
    pub opponent: u32,
}

impl SetScore {
    /// Create a score from possibly negative input, clamping each side at 0.
    pub fn clamped(team: i64, opponent: i64) -> Self {
        Self {
            team: clamp_score(team),
            opponent: clamp_score(opponent),
        }
    }
}

fn clamp_score(value: i64) -> u32 {
    u32::try_from(value.max(0)).unwrap_or(u32::MAX)
}

/// Full match state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchState {
    /// Roster in entry order.
    pub players: Vec<Player>,
    /// Number of sets, in `MIN_SETS..=MAX_SETS`.
    pub set_count: u8,
    /// Team and date.
    pub match_info: MatchInfo,
    /// Player name → set number → record.
    pub stats: BTreeMap<String, BTreeMap<u8, StatRecord>>,
    /// Set number → score.
    pub scores: BTreeMap<u8, SetScore>,
}

impl MatchState {
    /// Create a state with every record and score zeroed.
    ///
    /// Callers go through setup validation first; this only checks the
    /// structural invariants (set range, unique names).
    pub fn new(players: Vec<Player>, set_count: u8, match_info: MatchInfo) -> Result<Self> {
        if !(MIN_SETS..=MAX_SETS).contains(&set_count) {
            return Err(VolleyError::setup(format!(
                "number of sets must be between {} and {}",
                MIN_SETS, MAX_SETS
            )));
        }

        let mut seen = HashSet::new();
        for player in &players {
            if !seen.insert(player.name.as_str()) {
                return Err(VolleyError::setup(format!(
                    "duplicate player name '{}'",
                    player.name
                )));
            }
        }

        let stats = players
            .iter()
            .map(|player| {
                let sets = (1..=set_count)
                    .map(|set| (set, StatRecord::zero()))
                    .collect();
                (player.name.clone(), sets)
            })
            .collect();

        let scores = (1..=set_count).map(|set| (set, SetScore::default())).collect();

        Ok(Self {
            players,
            set_count,
            match_info,
            stats,
            scores,
        })
    }

    /// Look up a player by name.
    pub fn player(&self, name: &str) -> Option<&Player> {
        self.players.iter().find(|p| p.name == name)
    }

    /// Set numbers in order.
    pub fn sets(&self) -> impl Iterator<Item = u8> {
        1..=self.set_count
    }

    /// Validate a set number against this match.
    pub fn check_set(&self, set: u32) -> Result<u8> {
        match u8::try_from(set) {
            Ok(n) if n >= 1 && n <= self.set_count => Ok(n),
            _ => Err(VolleyError::invalid_set(set, self.set_count)),
        }
    }

    /// The stored record for a player and set, if any.
    pub fn record(&self, player: &str, set: u8) -> Option<&StatRecord> {
        self.stats.get(player).and_then(|sets| sets.get(&set))
    }

    /// Score of a set, `0 - 0` when missing.
    pub fn score(&self, set: u8) -> SetScore {
        self.scores.get(&set).copied().unwrap_or_default()
    }

    /// Move one counter cell by `delta`, flooring at zero.
    ///
    /// Touches exactly one `(player, set, category, counter)` cell and
    /// returns its new value. Unknown players and out-of-range sets are
    /// rejected without modifying anything.
    pub fn update_counter(&mut self, player: &str, set: u32, key: StatKey, delta: i64) -> Result<u32> {
        let set = self.check_set(set)?;
        if self.player(player).is_none() {
            return Err(VolleyError::unknown_player(player));
        }

        let record = self
            .stats
            .entry(player.to_string())
            .or_default()
            .entry(set)
            .or_default();
        let value = record.apply(key, delta);

        tracing::debug!(
            player,
            set,
            category = %key.category(),
            counter = key.counter_name(),
            delta,
            value,
            "counter updated"
        );
        Ok(value)
    }

    /// Replace the score of a set. Negative input is stored as 0.
    pub fn update_set_score(&mut self, set: u32, team: i64, opponent: i64) -> Result<SetScore> {
        let set = self.check_set(set)?;
        let score = SetScore::clamped(team, opponent);
        self.scores.insert(set, score);
        tracing::debug!(set, team = score.team, opponent = score.opponent, "set score updated");
        Ok(score)
    }

    /// Change our team's score, keeping the opponent's.
    pub fn set_team_score(&mut self, set: u32, team: i64) -> Result<SetScore> {
        let current = self.score(self.check_set(set)?);
        self.update_set_score(set, team, i64::from(current.opponent))
    }

    /// Change the opponent's score, keeping ours.
    pub fn set_opponent_score(&mut self, set: u32, opponent: i64) -> Result<SetScore> {
        let current = self.score(self.check_set(set)?);
        self.update_set_score(set, i64::from(current.team), opponent)
    }

    /// Check invariants of a state read from outside (snapshot files).
    pub fn validate(&self) -> Result<()> {
        if !(MIN_SETS..=MAX_SETS).contains(&self.set_count) {
            return Err(VolleyError::serde(format!(
                "set_count {} outside {}..={}",
                self.set_count, MIN_SETS, MAX_SETS
            )));
        }
        if self.players.is_empty() {
            return Err(VolleyError::serde("match has no players"));
        }

        let mut seen = HashSet::new();
        for player in &self.players {
            if player.name.trim().is_empty() {
                return Err(VolleyError::serde("player with empty name"));
            }
            if !seen.insert(player.name.as_str()) {
                return Err(VolleyError::serde(format!(
                    "duplicate player name '{}'",
                    player.name
                )));
            }
        }

        for (name, sets) in &self.stats {
            if !seen.contains(name.as_str()) {
                return Err(VolleyError::serde(format!(
                    "stats recorded for unknown player '{}'",
                    name
                )));
            }
            if let Some(set) = sets.keys().find(|s| **s < 1 || **s > self.set_count) {
                return Err(VolleyError::serde(format!(
                    "stats recorded for set {} of a {}-set match",
                    set, self.set_count
                )));
            }
        }

        if let Some(set) = self.scores.keys().find(|s| **s < 1 || **s > self.set_count) {
            return Err(VolleyError::serde(format!(
                "score recorded for set {} of a {}-set match",
                set, self.set_count
            )));
        }

        Ok(())
    }
}
