//! Summary command for volley-stats.
//!
//! Prints the aggregated numbers of a saved match snapshot. A single-set
//! summary also lists every raw counter of that set.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::core::{applicable_categories, Category, MatchState, Role, StatRecord, ALL_KEYS};
use crate::error::Result;
use crate::stats::{summarize_match, summarize_set, MatchSummary, PlayerSummary};
use crate::storage::load_snapshot;

/// Options for the summary command.
#[derive(Debug, Clone, Default)]
pub struct SummaryOptions {
    /// Output as JSON.
    pub json: bool,
    /// Suppress output.
    pub quiet: bool,
    /// Restrict the summary to one set.
    pub set: Option<u32>,
}

/// Output format for the summary command.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SummaryOutput {
    /// Whether the summary was computed.
    pub success: bool,
    /// The aggregated match.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<MatchSummary>,
    /// Error message if the summary failed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl SummaryOutput {
    /// Create a successful output.
    pub fn success(summary: MatchSummary) -> Self {
        Self {
            success: true,
            summary: Some(summary),
            error: None,
        }
    }

    /// Create a failed output.
    pub fn failure(error: impl Into<String>) -> Self {
        Self {
            success: false,
            summary: None,
            error: Some(error.into()),
        }
    }
}

/// The summary command implementation.
#[derive(Debug, Default)]
pub struct SummaryCommand;

impl SummaryCommand {
    /// Create a new summary command.
    pub fn new() -> Self {
        Self
    }

    /// Run the summary command against a snapshot file.
    pub fn run(&self, snapshot: &Path, options: &SummaryOptions) -> SummaryOutput {
        match load_snapshot(snapshot).and_then(|state| summarize(&state, options.set)) {
            Ok(summary) => SummaryOutput::success(summary),
            Err(e) => SummaryOutput::failure(e.to_string()),
        }
    }

    /// Format output based on options.
    pub fn format_output(&self, output: &SummaryOutput, options: &SummaryOptions) -> String {
        if options.quiet {
            return String::new();
        }

        if options.json {
            return serde_json::to_string_pretty(output).unwrap_or_else(|_| "{}".to_string());
        }

        match (&output.summary, &output.error) {
            (Some(summary), _) => format_summary(summary),
            (None, error) => format!(
                "Summary failed: {}\n",
                error.as_deref().unwrap_or("unknown error")
            ),
        }
    }
}

/// Whole-match summary, or one set of it when `set` is given.
pub fn summarize(state: &MatchState, set: Option<u32>) -> Result<MatchSummary> {
    match set {
        Some(set) => Ok(summarize_set(state, state.check_set(set)?)),
        None => Ok(summarize_match(state)),
    }
}

const REPORTED: [Category; 5] = [
    Category::Service,
    Category::Attack,
    Category::Pass,
    Category::Reception,
    Category::Defense,
];

/// Render a summary as a text table.
pub fn format_summary(summary: &MatchSummary) -> String {
    let mut lines = Vec::new();

    match summary.set {
        Some(set) => lines.push(format!(
            "=== Set {} - {} - {} ===",
            set, summary.team, summary.date
        )),
        None => lines.push(format!("=== {} - {} ===", summary.team, summary.date)),
    }

    let scores: Vec<String> = summary
        .scores
        .iter()
        .map(|s| format!("Set {}: {} - {}", s.set, s.team, s.opponent))
        .collect();
    lines.push(format!("Scores  {}", scores.join(" | ")));
    lines.push(String::new());

    let name_width = summary
        .players
        .iter()
        .map(|p| p.name.chars().count())
        .max()
        .unwrap_or(0)
        .max("Joueur".len());

    let mut header = format!("{:<name_width$}  {:<8}", "Joueur", "Rôle");
    for category in REPORTED {
        header.push_str(&format!("  {:>15}", category.label()));
    }
    header.push_str(&format!("  {:>6}", "Fautes"));
    lines.push(header);

    for player in &summary.players {
        lines.push(format_player_row(player, name_width));
    }

    if summary.set.is_some() {
        lines.push(String::new());
        lines.push("Compteurs".to_string());
        for player in &summary.players {
            lines.push(format!("{} ({})", player.name, player.role.label()));
            lines.extend(counter_lines(&player.totals, player.role));
        }
    }

    lines.push(String::new());
    lines.join("\n")
}

/// One line per category with every raw counter; `-` where the role
/// does not record the category.
pub fn counter_lines(record: &StatRecord, role: Role) -> Vec<String> {
    let applicable = applicable_categories(role);
    Category::ALL
        .into_iter()
        .map(|category| {
            if !applicable.contains(&category) {
                return format!("  {:<10} -", category.id());
            }
            let cells: Vec<String> = ALL_KEYS
                .iter()
                .filter(|key| key.category() == category)
                .map(|key| format!("{} {}", key.counter_name(), record.get(*key)))
                .collect();
            format!("  {:<10} {}", category.id(), cells.join(" | "))
        })
        .collect()
}

fn format_player_row(player: &PlayerSummary, name_width: usize) -> String {
    let mut row = format!("{:<name_width$}  {:<8}", player.name, player.role.label());
    for category in REPORTED {
        let cell = player
            .category(category)
            .map(|c| format!("{} ({})", c.total, c.percentage))
            .unwrap_or_default();
        row.push_str(&format!("  {:>15}", cell));
    }
    row.push_str(&format!("  {:>6}", player.total_faults));
    row
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{AttackCounter, MatchInfo, Player, Role, ServiceCounter, StatKey};
    use crate::storage::save_snapshot;
    use tempfile::TempDir;

    fn saved_match() -> (TempDir, std::path::PathBuf) {
        let temp = TempDir::new().unwrap();
        let mut state = MatchState::new(
            vec![
                Player::new("Alice", Role::ReceiverAttacker),
                Player::new("Lou", Role::Libero),
            ],
            3,
            MatchInfo::new("Les Aigles", "12/10/2026"),
        )
        .unwrap();
        state
            .update_counter("Alice", 1, StatKey::Service(ServiceCounter::Ace), 2)
            .unwrap();
        state
            .update_counter("Alice", 1, StatKey::Service(ServiceCounter::Missed), 1)
            .unwrap();
        state
            .update_counter("Alice", 2, StatKey::Attack(AttackCounter::Scored), 3)
            .unwrap();
        state.update_set_score(1, 25, 20).unwrap();
        let path = save_snapshot(&state, &temp.path().join("match.json")).unwrap();
        (temp, path)
    }

    #[test]
    fn test_summary_whole_match() {
        let (_temp, path) = saved_match();
        let cmd = SummaryCommand::new();
        let output = cmd.run(&path, &SummaryOptions::default());

        assert!(output.success);
        let summary = output.summary.unwrap();
        assert_eq!(summary.players.len(), 2);
        assert_eq!(summary.players[0].total_faults, 1);
    }

    #[test]
    fn test_summary_single_set() {
        let (_temp, path) = saved_match();
        let options = SummaryOptions {
            set: Some(2),
            ..Default::default()
        };
        let output = SummaryCommand::new().run(&path, &options);
        let summary = output.summary.unwrap();
        assert_eq!(summary.set, Some(2));
        assert_eq!(summary.players[0].totals.attack.scored, 3);
        assert_eq!(summary.players[0].totals.service.ace, 0);
    }

    #[test]
    fn test_summary_rejects_bad_set() {
        let (_temp, path) = saved_match();
        let options = SummaryOptions {
            set: Some(4),
            ..Default::default()
        };
        let output = SummaryCommand::new().run(&path, &options);
        assert!(!output.success);
        assert!(output.error.unwrap().contains("invalid set 4"));
    }

    #[test]
    fn test_summary_missing_snapshot() {
        let temp = TempDir::new().unwrap();
        let output = SummaryCommand::new().run(
            &temp.path().join("missing.json"),
            &SummaryOptions::default(),
        );
        assert!(!output.success);
    }

    #[test]
    fn test_format_human_readable() {
        let (_temp, path) = saved_match();
        let cmd = SummaryCommand::new();
        let options = SummaryOptions::default();
        let text = cmd.format_output(&cmd.run(&path, &options), &options);

        assert!(text.contains("Les Aigles - 12/10/2026"));
        assert!(text.contains("Set 1: 25 - 20"));
        assert!(text.contains("Alice"));
        assert!(text.contains("3 (67%)"));
        assert!(text.contains("Libéro"));
        assert!(!text.contains("Compteurs"));
    }

    #[test]
    fn test_format_single_set_lists_raw_counters() {
        let (_temp, path) = saved_match();
        let cmd = SummaryCommand::new();
        let options = SummaryOptions {
            set: Some(1),
            ..Default::default()
        };
        let text = cmd.format_output(&cmd.run(&path, &options), &options);

        assert!(text.contains("=== Set 1 - Les Aigles"));
        assert!(text.contains("Compteurs"));
        assert!(text.contains("ace 2 | difficult 0 | passed 0 | missed 1"));
        assert!(text.contains("Lou (Libéro)"));
        assert!(text.contains("  service    -"));
    }

    #[test]
    fn test_counter_lines_cover_every_counter() {
        let lines = counter_lines(&StatRecord::zero(), Role::ReceiverAttacker);
        assert_eq!(lines.len(), Category::ALL.len());
        let cells: usize = lines.iter().map(|l| l.matches(" 0").count()).sum();
        assert_eq!(cells, ALL_KEYS.len());
    }

    #[test]
    fn test_format_json_and_quiet() {
        let (_temp, path) = saved_match();
        let cmd = SummaryCommand::new();

        let json_options = SummaryOptions {
            json: true,
            ..Default::default()
        };
        let output = cmd.run(&path, &json_options);
        let parsed: serde_json::Value =
            serde_json::from_str(&cmd.format_output(&output, &json_options)).unwrap();
        assert_eq!(parsed["success"], true);
        assert_eq!(parsed["summary"]["team"], "Les Aigles");

        let quiet = SummaryOptions {
            quiet: true,
            ..Default::default()
        };
        assert!(cmd.format_output(&output, &quiet).is_empty());
    }
}
