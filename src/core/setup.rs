//! Match setup input and validation.
//!
//! Setup is the only place a [`MatchState`] gets built from user input.
//! Validation happens synchronously; nothing is created on error.

use std::fmt::Write;

use chrono::Local;
use serde::{Deserialize, Serialize};

use crate::config::MatchConfig;
use crate::core::role::Role;
use crate::core::state::{MatchInfo, MatchState, Player, MAX_SETS, MIN_SETS};
use crate::error::{Result, VolleyError};

/// A roster line as typed at setup; the name may still be blank.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerDraft {
    pub name: String,
    pub role: Role,
}

impl PlayerDraft {
    /// Create a draft roster line.
    pub fn new(name: impl Into<String>, role: Role) -> Self {
        Self {
            name: name.into(),
            role,
        }
    }
}

/// Setup form contents.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchSetup {
    /// Roster lines, blanks included.
    pub players: Vec<PlayerDraft>,
    /// Requested number of sets.
    pub set_count: i64,
    /// Team name; blank falls back to the configured default.
    pub team: Option<String>,
    /// Match date; blank falls back to today.
    pub date: Option<String>,
}

impl MatchSetup {
    /// Empty setup with the configured default set count.
    pub fn new(config: &MatchConfig) -> Self {
        Self {
            players: Vec::new(),
            set_count: i64::from(config.default_sets),
            team: None,
            date: None,
        }
    }

    /// Add a roster line.
    pub fn add_player(&mut self, name: impl Into<String>, role: Role) {
        self.players.push(PlayerDraft::new(name, role));
    }

    /// Remove roster lines whose trimmed name matches. Returns how many went.
    pub fn remove_player(&mut self, name: &str) -> usize {
        let before = self.players.len();
        let name = name.trim();
        self.players.retain(|p| p.name.trim() != name);
        before - self.players.len()
    }

    /// Validate and build the initial match state.
    pub fn build(&self, config: &MatchConfig) -> Result<MatchState> {
        let players: Vec<Player> = self
            .players
            .iter()
            .filter(|p| !p.name.trim().is_empty())
            .map(|p| Player::new(p.name.trim(), p.role))
            .collect();

        if players.is_empty() {
            return Err(VolleyError::setup("add at least one player"));
        }

        if self.set_count < i64::from(MIN_SETS) || self.set_count > i64::from(MAX_SETS) {
            return Err(VolleyError::setup(format!(
                "number of sets must be between {} and {}",
                MIN_SETS, MAX_SETS
            )));
        }
        let set_count = u8::try_from(self.set_count)
            .map_err(|_| VolleyError::setup("number of sets out of range"))?;

        let team = non_blank(self.team.as_deref())
            .map(str::to_string)
            .unwrap_or_else(|| config.default_team.clone());
        let date = match non_blank(self.date.as_deref()) {
            Some(date) => date.to_string(),
            None => today(&config.date_format)?,
        };

        let state = MatchState::new(players, set_count, MatchInfo::new(team, date))?;
        tracing::info!(
            players = state.players.len(),
            sets = state.set_count,
            team = %state.match_info.team,
            "match created"
        );
        Ok(state)
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

/// Today's local date in the given `strftime` format.
///
/// An unknown specifier is a config error, never a panic.
pub fn today(format: &str) -> Result<String> {
    let mut date = String::new();
    write!(date, "{}", Local::now().format(format))
        .map_err(|_| VolleyError::config(format!("invalid date format '{}'", format)))?;
    Ok(date)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> MatchConfig {
        MatchConfig::default()
    }

    fn setup_with(names: &[&str], sets: i64) -> MatchSetup {
        let mut setup = MatchSetup::new(&config());
        for name in names {
            setup.add_player(*name, Role::ReceiverAttacker);
        }
        setup.set_count = sets;
        setup
    }

    #[test]
    fn test_build_drops_blank_names_and_trims() {
        let setup = setup_with(&["  Alice ", "", "   ", "Bea"], 3);
        let state = setup.build(&config()).unwrap();
        let names: Vec<_> = state.players.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["Alice", "Bea"]);
    }

    #[test]
    fn test_build_requires_a_player() {
        let setup = setup_with(&["", "  "], 3);
        let err = setup.build(&config()).unwrap_err();
        assert!(matches!(err, VolleyError::Setup { .. }));
        assert!(err.to_string().contains("at least one player"));
    }

    #[test]
    fn test_build_checks_set_range() {
        assert!(setup_with(&["Alice"], 0).build(&config()).is_err());
        assert!(setup_with(&["Alice"], 11).build(&config()).is_err());
        assert!(setup_with(&["Alice"], -2).build(&config()).is_err());
        assert_eq!(
            setup_with(&["Alice"], 1).build(&config()).unwrap().set_count,
            1
        );
        assert_eq!(
            setup_with(&["Alice"], 10).build(&config()).unwrap().set_count,
            10
        );
    }

    #[test]
    fn test_build_rejects_duplicates_after_trim() {
        let setup = setup_with(&["Alice", " Alice"], 3);
        assert!(setup.build(&config()).is_err());
    }

    #[test]
    fn test_defaults_for_team_and_date() {
        let mut setup = setup_with(&["Alice"], 3);
        setup.team = Some("   ".to_string());
        let state = setup.build(&config()).unwrap();
        assert_eq!(state.match_info.team, "Mon équipe");
        assert_eq!(state.match_info.date, today("%d/%m/%Y").unwrap());
    }

    #[test]
    fn test_build_with_bad_date_format_is_an_error() {
        let mut cfg = config();
        cfg.date_format = "%Q".to_string();
        let setup = setup_with(&["Alice"], 3);

        let err = setup.build(&cfg).unwrap_err();
        assert!(matches!(err, VolleyError::Config { .. }));
        assert!(err.to_string().contains("%Q"));

        // An explicit date never touches the format
        let mut dated = setup_with(&["Alice"], 3);
        dated.date = Some("12/10/2026".to_string());
        assert_eq!(dated.build(&cfg).unwrap().match_info.date, "12/10/2026");
    }

    #[test]
    fn test_today_formats() {
        assert_eq!(today("%Y").unwrap().len(), 4);
        assert!(today("%Q").is_err());
    }

    #[test]
    fn test_explicit_team_and_date() {
        let mut setup = setup_with(&["Alice"], 5);
        setup.team = Some("Les Aigles".to_string());
        setup.date = Some("12/10/2026".to_string());
        let state = setup.build(&config()).unwrap();
        assert_eq!(state.match_info, MatchInfo::new("Les Aigles", "12/10/2026"));
        assert_eq!(state.set_count, 5);
    }

    #[test]
    fn test_remove_player() {
        let mut setup = setup_with(&["Alice", "Bea"], 3);
        assert_eq!(setup.remove_player(" Alice "), 1);
        assert_eq!(setup.remove_player("Zoé"), 0);
        assert_eq!(setup.players.len(), 1);
    }

    #[test]
    fn test_new_uses_configured_sets() {
        let mut cfg = config();
        cfg.default_sets = 5;
        assert_eq!(MatchSetup::new(&cfg).set_count, 5);
    }
}
