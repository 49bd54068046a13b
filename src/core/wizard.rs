//! Match wizard state machine.
//!
//! The wizard owns the match for its whole life: Setup builds it, Entry
//! mutates it, Summary reads and exports it, and reset throws it away.
//!
//! ```text
//! Setup --start--> Entry --view_summary--> Summary --reset--> Setup
//!                    ^                        |
//!                    +-----back_to_entry------+
//! ```

use serde::{Deserialize, Serialize};

use crate::config::MatchConfig;
use crate::core::record::StatKey;
use crate::core::role::is_category_applicable;
use crate::core::setup::MatchSetup;
use crate::core::state::{MatchState, SetScore};
use crate::error::{Result, VolleyError};

/// Wizard step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum WizardStep {
    /// Roster and match settings are being entered.
    #[default]
    Setup,
    /// Live stat entry.
    Entry,
    /// Read-only review and export.
    Summary,
}

impl WizardStep {
    /// Whether a match exists in this step.
    pub fn has_match(&self) -> bool {
        matches!(self, WizardStep::Entry | WizardStep::Summary)
    }
}

/// Wizard state container.
#[derive(Debug, Clone)]
pub struct Wizard {
    step: WizardStep,
    setup: MatchSetup,
    state: Option<MatchState>,
    current_set: u8,
    config: MatchConfig,
}

impl Wizard {
    /// Create a wizard at the Setup step.
    pub fn new(config: MatchConfig) -> Self {
        Self {
            step: WizardStep::Setup,
            setup: MatchSetup::new(&config),
            state: None,
            current_set: 1,
            config,
        }
    }

    /// Current step.
    pub fn step(&self) -> WizardStep {
        self.step
    }

    /// Setup form (editable only in Setup).
    pub fn setup(&self) -> &MatchSetup {
        &self.setup
    }

    /// Mutable setup form.
    pub fn setup_mut(&mut self) -> Result<&mut MatchSetup> {
        self.require(WizardStep::Setup, "edit setup")?;
        Ok(&mut self.setup)
    }

    /// Match being recorded, if any.
    pub fn state(&self) -> Option<&MatchState> {
        self.state.as_ref()
    }

    /// Set currently selected for entry.
    pub fn current_set(&self) -> u8 {
        self.current_set
    }

    // =========================================================================
    // Transitions
    // =========================================================================

    /// Transition: Setup → Entry
    ///
    /// Validates the setup form and creates the zeroed match. On error the
    /// wizard stays in Setup with the form intact.
    pub fn start(&mut self) -> Result<&MatchState> {
        self.require(WizardStep::Setup, "start the match")?;

        let state = self.setup.build(&self.config)?;
        self.current_set = 1;
        self.step = WizardStep::Entry;
        tracing::info!(step = ?self.step, "wizard transition");
        Ok(&*self.state.insert(state))
    }

    /// Transition: Entry → Summary
    pub fn view_summary(&mut self) -> Result<()> {
        self.require(WizardStep::Entry, "view the summary")?;
        self.step = WizardStep::Summary;
        tracing::info!(step = ?self.step, "wizard transition");
        Ok(())
    }

    /// Transition: Summary → Entry
    pub fn back_to_entry(&mut self) -> Result<()> {
        self.require(WizardStep::Summary, "go back to entry")?;
        self.step = WizardStep::Entry;
        tracing::info!(step = ?self.step, "wizard transition");
        Ok(())
    }

    /// Transition: Summary → Setup
    ///
    /// Discards the match and restores a blank setup form.
    pub fn reset(&mut self) -> Result<()> {
        self.require(WizardStep::Summary, "reset")?;
        self.state = None;
        self.setup = MatchSetup::new(&self.config);
        self.current_set = 1;
        self.step = WizardStep::Setup;
        tracing::info!(step = ?self.step, "wizard transition (match discarded)");
        Ok(())
    }

    // =========================================================================
    // Entry actions
    // =========================================================================

    /// Select the set that entry commands apply to.
    pub fn select_set(&mut self, set: u32) -> Result<u8> {
        self.require(WizardStep::Entry, "select a set")?;
        let set = self.match_ref()?.check_set(set)?;
        self.current_set = set;
        Ok(set)
    }

    /// Move one counter for a player in the current set.
    ///
    /// Categories that do not apply to the player's role are refused.
    pub fn record(&mut self, player: &str, key: StatKey, delta: i64) -> Result<u32> {
        self.require(WizardStep::Entry, "record stats")?;
        let set = u32::from(self.current_set);
        let state = self.match_mut()?;

        let role = state
            .player(player)
            .map(|p| p.role)
            .ok_or_else(|| VolleyError::unknown_player(player))?;
        if !is_category_applicable(role, key.category()) {
            return Err(VolleyError::invalid_state(format!(
                "{} does not apply to {} ({})",
                key.category(),
                player,
                role.label()
            )));
        }

        state.update_counter(player, set, key, delta)
    }

    /// Replace the score of the current set.
    pub fn set_score(&mut self, team: i64, opponent: i64) -> Result<SetScore> {
        self.require(WizardStep::Entry, "edit the score")?;
        let set = u32::from(self.current_set);
        self.match_mut()?.update_set_score(set, team, opponent)
    }

    /// Change our side of the current set's score.
    pub fn set_team_score(&mut self, team: i64) -> Result<SetScore> {
        self.require(WizardStep::Entry, "edit the score")?;
        let set = u32::from(self.current_set);
        self.match_mut()?.set_team_score(set, team)
    }

    /// Change the opponent's side of the current set's score.
    pub fn set_opponent_score(&mut self, opponent: i64) -> Result<SetScore> {
        self.require(WizardStep::Entry, "edit the score")?;
        let set = u32::from(self.current_set);
        self.match_mut()?.set_opponent_score(set, opponent)
    }

    /// Read-only access for summary and export.
    ///
    /// Available in Entry (live totals) and Summary.
    pub fn summary_state(&self) -> Result<&MatchState> {
        self.match_for("read the summary")
    }

    /// Read-only access once a match exists; `action` names the refusal.
    pub fn match_for(&self, action: &str) -> Result<&MatchState> {
        if !self.step.has_match() {
            return Err(self.invalid(action));
        }
        self.match_ref()
    }

    /// Read-only access for export, only from Summary.
    pub fn export_state(&self) -> Result<&MatchState> {
        self.require(WizardStep::Summary, "export")?;
        self.match_ref()
    }

    // =========================================================================
    // Helpers
    // =========================================================================

    fn require(&self, step: WizardStep, action: &str) -> Result<()> {
        if self.step != step {
            return Err(self.invalid(action));
        }
        Ok(())
    }

    fn invalid(&self, action: &str) -> VolleyError {
        VolleyError::invalid_state(format!(
            "cannot {} in {} step",
            action,
            self.step_name()
        ))
    }

    fn step_name(&self) -> &'static str {
        match self.step {
            WizardStep::Setup => "Setup",
            WizardStep::Entry => "Entry",
            WizardStep::Summary => "Summary",
        }
    }

    fn match_ref(&self) -> Result<&MatchState> {
        self.state
            .as_ref()
            .ok_or_else(|| VolleyError::invalid_state("no match in progress"))
    }

    fn match_mut(&mut self) -> Result<&mut MatchState> {
        self.state
            .as_mut()
            .ok_or_else(|| VolleyError::invalid_state("no match in progress"))
    }
}
