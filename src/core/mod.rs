//! Core types and logic for volley-stats.
//!
//! This module contains the stat schema, the role policy, the match state
//! and the wizard state machine that owns it.

pub mod record;
pub mod role;
pub mod setup;
pub mod state;
pub mod wizard;

pub use record::{
    update_counter, AttackCounter, AttackStats, FaultStats, GradeCounter, GradeStats,
    ReceptionCounter, ReceptionStats, ServiceCounter, ServiceStats, StatKey, StatRecord, Tally,
    ALL_KEYS,
};
pub use role::{applicable_categories, is_category_applicable, Category, Role};
pub use setup::{MatchSetup, PlayerDraft};
pub use state::{MatchInfo, MatchState, Player, SetScore, MAX_SETS, MIN_SETS};
pub use wizard::{Wizard, WizardStep};
