//! Record command for volley-stats.
//!
//! Drives the match wizard from a line-oriented session, read either from
//! the terminal or from a script file. Each input line is one command; each
//! command produces one reply.
//!
//! ```text
//! setup:    team <name> | date <text> | sets <n> | player <name> <role>
//!           remove <name> | start
//! entry:    set <n> | + <player> <category> <counter> | - <...>
//!           score <team> <opponent> | score team|opponent <n>
//!           board | summary | save <path>
//! summary:  show [set] | entry | export [xlsx|pdf|all] | save <path> | reset
//! anywhere: status | help | quit
//! ```

use std::fs::File;
use std::io::{self, BufRead, BufReader, Write};
use std::path::PathBuf;

use serde::Serialize;

use crate::cli::export::{export_match, format_outcomes};
use crate::cli::summary::{counter_lines, format_summary, summarize};
use crate::config::Config;
use crate::core::{Category, MatchState, Role, StatKey, Wizard, WizardStep};
use crate::error::{Result, VolleyError};
use crate::storage::save_snapshot;

/// A parsed session command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Team(String),
    Date(String),
    Sets(i64),
    Player { name: String, role: Role },
    Remove(String),
    Start,
    Set(u32),
    Adjust {
        player: String,
        key: StatKey,
        delta: i64,
    },
    Score { team: i64, opponent: i64 },
    SideScore { side: Side, value: i64 },
    Board,
    Summary,
    Show(Option<u32>),
    Entry,
    Export(Option<String>),
    Save(PathBuf),
    Reset,
    Status,
    Help,
    Quit,
}

/// One side of a set score.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Team,
    Opponent,
}

impl Command {
    /// Parse one input line.
    ///
    /// Returns `Ok(None)` for blank lines and `#` comments.
    pub fn parse(line: &str) -> Result<Option<Self>> {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            return Ok(None);
        }

        let tokens: Vec<&str> = line.split_whitespace().collect();
        let keyword = tokens[0].to_lowercase();
        let args = &tokens[1..];

        if let Some(delta) = parse_delta(&keyword)? {
            return parse_adjust(delta, args).map(Some);
        }

        let command = match keyword.as_str() {
            "team" => Command::Team(rest(args, "team <name>")?),
            "date" => Command::Date(rest(args, "date <text>")?),
            "sets" => Command::Sets(number(one(args, "sets <n>")?, "set count")?),
            "player" => parse_player(args)?,
            "remove" => Command::Remove(rest(args, "remove <name>")?),
            "start" => Command::Start,
            "set" => Command::Set(number(one(args, "set <n>")?, "set number")?),
            "score" => parse_score(args)?,
            "board" => Command::Board,
            "summary" => Command::Summary,
            "show" => match args {
                [] => Command::Show(None),
                [set] => Command::Show(Some(number(set, "set number")?)),
                _ => return Err(VolleyError::usage("show [set]")),
            },
            "entry" | "back" => Command::Entry,
            "export" => match args {
                [] => Command::Export(None),
                [format] => Command::Export(Some(format.to_string())),
                _ => return Err(VolleyError::usage("export [xlsx|pdf|all]")),
            },
            "save" => Command::Save(PathBuf::from(rest(args, "save <path>")?)),
            "reset" => Command::Reset,
            "status" => Command::Status,
            "help" | "?" => Command::Help,
            "quit" | "exit" => Command::Quit,
            other => {
                return Err(VolleyError::usage(format!(
                    "unknown command '{}' (try 'help')",
                    other
                )))
            }
        };
        Ok(Some(command))
    }
}

/// `+`, `-`, `+3`, `-2`. Returns `None` when the keyword is not a delta.
fn parse_delta(keyword: &str) -> Result<Option<i64>> {
    let (sign, digits) = match keyword.as_bytes().first() {
        Some(b'+') => (1, &keyword[1..]),
        Some(b'-') => (-1, &keyword[1..]),
        _ => return Ok(None),
    };
    if digits.is_empty() {
        return Ok(Some(sign));
    }
    let amount: i64 = number(digits, "step")?;
    Ok(Some(sign * amount))
}

/// `<player…> <category> <counter>`: the last two tokens address the counter.
fn parse_adjust(delta: i64, args: &[&str]) -> Result<Command> {
    if args.len() < 3 {
        return Err(VolleyError::usage("+|- <player> <category> <counter>"));
    }
    let (name, tail) = args.split_at(args.len() - 2);
    let category = Category::parse(tail[0])
        .ok_or_else(|| VolleyError::usage(format!("unknown category '{}'", tail[0])))?;
    let key = StatKey::parse(category, tail[1]).ok_or_else(|| {
        VolleyError::usage(format!("unknown counter '{}' for {}", tail[1], category))
    })?;
    Ok(Command::Adjust {
        player: name.join(" "),
        key,
        delta,
    })
}

/// `<name…> <role>`: the last token is the role.
/// `score <team> <opponent>` or `score team|opponent <n>`.
fn parse_score(args: &[&str]) -> Result<Command> {
    const USAGE: &str = "score <team> <opponent> | score team|opponent <n>";
    match args {
        [side, value] if side.eq_ignore_ascii_case("team") => Ok(Command::SideScore {
            side: Side::Team,
            value: number(value, "team score")?,
        }),
        [side, value] if side.eq_ignore_ascii_case("opponent") => Ok(Command::SideScore {
            side: Side::Opponent,
            value: number(value, "opponent score")?,
        }),
        [team, opponent] => Ok(Command::Score {
            team: number(team, "team score")?,
            opponent: number(opponent, "opponent score")?,
        }),
        _ => Err(VolleyError::usage(USAGE)),
    }
}

fn parse_player(args: &[&str]) -> Result<Command> {
    let Some((role, name)) = args.split_last() else {
        return Err(VolleyError::usage("player <name> <role>"));
    };
    if name.is_empty() {
        return Err(VolleyError::usage("player <name> <role>"));
    }
    let role = Role::parse(role).ok_or_else(|| {
        VolleyError::usage(format!(
            "unknown role '{}' (passeur, libero, r4, central, pointu)",
            role
        ))
    })?;
    Ok(Command::Player {
        name: name.join(" "),
        role,
    })
}

fn rest(args: &[&str], usage: &str) -> Result<String> {
    if args.is_empty() {
        return Err(VolleyError::usage(usage));
    }
    Ok(args.join(" "))
}

fn one<'a>(args: &[&'a str], usage: &str) -> Result<&'a str> {
    match args {
        [value] => Ok(*value),
        _ => Err(VolleyError::usage(usage)),
    }
}

fn number<T: std::str::FromStr>(value: &str, what: &str) -> Result<T> {
    value
        .parse()
        .map_err(|_| VolleyError::usage(format!("invalid {} '{}'", what, value)))
}

/// Answer to a single command.
#[derive(Debug, Clone, Serialize)]
pub struct Reply {
    /// Whether the command was applied.
    pub ok: bool,
    /// Wizard step after the command.
    pub step: WizardStep,
    /// Text shown to the user.
    pub message: String,
    /// Whether the session should end.
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub quit: bool,
    /// Rejected for something other than operator input (disk, export).
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub failure: bool,
}

/// A recording session: the wizard plus what export and save need.
pub struct RecordSession {
    wizard: Wizard,
    config: Config,
    out_dir: PathBuf,
    unsaved: bool,
}

impl RecordSession {
    /// Create a session at the Setup step.
    pub fn new(config: Config, out_dir: PathBuf) -> Self {
        Self {
            wizard: Wizard::new(config.match_defaults.clone()),
            config,
            out_dir,
            unsaved: false,
        }
    }

    /// The wizard driven by this session.
    pub fn wizard(&self) -> &Wizard {
        &self.wizard
    }

    /// Whether entered stats have not been saved to a snapshot yet.
    pub fn has_unsaved_changes(&self) -> bool {
        self.unsaved
    }

    /// Parse and apply one input line.
    ///
    /// Returns `None` for blank lines and comments.
    pub fn execute(&mut self, line: &str) -> Option<Reply> {
        let result = Command::parse(line).and_then(|command| match command {
            Some(command) => self.apply(command).map(Some),
            None => Ok(None),
        });

        match result {
            Ok(None) => None,
            Ok(Some((message, quit))) => Some(self.reply(true, message, quit)),
            Err(e) => {
                let failure = !e.is_user_error();
                if failure {
                    tracing::warn!(line = line.trim(), error = %e, "command failed");
                } else {
                    tracing::debug!(line = line.trim(), error = %e, "command rejected");
                }
                let mut reply = self.reply(false, e.to_string(), false);
                reply.failure = failure;
                Some(reply)
            }
        }
    }

    fn reply(&self, ok: bool, message: String, quit: bool) -> Reply {
        Reply {
            ok,
            step: self.wizard.step(),
            message,
            quit,
            failure: false,
        }
    }

    fn apply(&mut self, command: Command) -> Result<(String, bool)> {
        let message = match command {
            Command::Team(team) => {
                self.wizard.setup_mut()?.team = Some(team.clone());
                format!("team: {}", team)
            }
            Command::Date(date) => {
                self.wizard.setup_mut()?.date = Some(date.clone());
                format!("date: {}", date)
            }
            Command::Sets(sets) => {
                self.wizard.setup_mut()?.set_count = sets;
                format!("sets: {}", sets)
            }
            Command::Player { name, role } => {
                let setup = self.wizard.setup_mut()?;
                setup.add_player(name.clone(), role);
                format!("added {} ({}), {} on roster", name, role.label(), setup.players.len())
            }
            Command::Remove(name) => match self.wizard.setup_mut()?.remove_player(&name) {
                0 => return Err(VolleyError::unknown_player(name)),
                _ => format!("removed {}", name),
            },
            Command::Start => {
                let state = self.wizard.start()?;
                format!(
                    "match started: {} - {}, {} player(s), {} set(s)",
                    state.match_info.team,
                    state.match_info.date,
                    state.players.len(),
                    state.set_count
                )
            }
            Command::Set(set) => {
                let set = self.wizard.select_set(set)?;
                format!("set {} selected", set)
            }
            Command::Adjust { player, key, delta } => {
                let value = self.wizard.record(&player, key, delta)?;
                self.unsaved = true;
                format!(
                    "{} set {}: {}.{} = {}",
                    player,
                    self.wizard.current_set(),
                    key.category(),
                    key.counter_name(),
                    value
                )
            }
            Command::Score { team, opponent } => {
                let score = self.wizard.set_score(team, opponent)?;
                self.unsaved = true;
                format!(
                    "set {} score: {} - {}",
                    self.wizard.current_set(),
                    score.team,
                    score.opponent
                )
            }
            Command::SideScore { side, value } => {
                let score = match side {
                    Side::Team => self.wizard.set_team_score(value)?,
                    Side::Opponent => self.wizard.set_opponent_score(value)?,
                };
                self.unsaved = true;
                format!(
                    "set {} score: {} - {}",
                    self.wizard.current_set(),
                    score.team,
                    score.opponent
                )
            }
            Command::Board => {
                if self.wizard.step() != WizardStep::Entry {
                    return Err(VolleyError::invalid_state(
                        "the board is only available during entry",
                    ));
                }
                format_board(
                    self.wizard.match_for("show the board")?,
                    self.wizard.current_set(),
                )
            }
            Command::Summary => {
                self.wizard.view_summary()?;
                format_summary(&summarize(self.wizard.summary_state()?, None)?)
            }
            Command::Show(set) => {
                if self.wizard.step() != WizardStep::Summary {
                    return Err(VolleyError::invalid_state(
                        "use 'summary' to leave entry first",
                    ));
                }
                format_summary(&summarize(self.wizard.summary_state()?, set)?)
            }
            Command::Entry => {
                self.wizard.back_to_entry()?;
                format!("back to entry, set {}", self.wizard.current_set())
            }
            Command::Export(format) => {
                let state = self.wizard.export_state()?;
                let output = export_match(state, format.as_deref(), &self.out_dir, &self.config);
                if let Some(error) = output.error {
                    return Err(VolleyError::usage(error));
                }
                let text = format_outcomes(&output.files);
                if !output.success {
                    return Err(VolleyError::export(text));
                }
                text
            }
            Command::Save(path) => {
                let path = save_snapshot(self.wizard.match_for("save the match")?, &path)?;
                self.unsaved = false;
                format!("saved {}", path.display())
            }
            Command::Reset => {
                self.wizard.reset()?;
                self.unsaved = false;
                "match discarded, back to setup".to_string()
            }
            Command::Status => self.status(),
            Command::Help => help(self.wizard.step()).to_string(),
            Command::Quit => return Ok(("bye".to_string(), true)),
        };
        Ok((message, false))
    }

    fn status(&self) -> String {
        match self.wizard.state() {
            Some(state) => format!(
                "{}: {} - {}, set {}/{}, {} player(s)",
                step_label(self.wizard.step()),
                state.match_info.team,
                state.match_info.date,
                self.wizard.current_set(),
                state.set_count,
                state.players.len()
            ),
            None => {
                let setup = self.wizard.setup();
                let roster: Vec<String> = setup
                    .players
                    .iter()
                    .map(|p| format!("{} ({})", p.name, p.role.label()))
                    .collect();
                format!(
                    "setup: team {}, date {}, {} set(s), roster [{}]",
                    setup.team.as_deref().unwrap_or("(default)"),
                    setup.date.as_deref().unwrap_or("(today)"),
                    setup.set_count,
                    roster.join(", ")
                )
            }
        }
    }
}

/// Counters of the selected set, one block per player.
fn format_board(state: &MatchState, set: u8) -> String {
    let score = state.score(set);
    let mut lines = vec![format!(
        "Set {}/{}  Score {} - {}",
        set, state.set_count, score.team, score.opponent
    )];

    for player in &state.players {
        lines.push(format!("{} ({})", player.name, player.role.label()));
        let record = state.record(&player.name, set).copied().unwrap_or_default();
        lines.extend(counter_lines(&record, player.role));
    }
    lines.join("\n")
}

fn step_label(step: WizardStep) -> &'static str {
    match step {
        WizardStep::Setup => "setup",
        WizardStep::Entry => "entry",
        WizardStep::Summary => "summary",
    }
}

fn help(step: WizardStep) -> &'static str {
    match step {
        WizardStep::Setup => {
            "team <name> | date <text> | sets <n> | player <name> <role> | remove <name> | start\n\
             roles: passeur, libero, r4, central, pointu"
        }
        WizardStep::Entry => {
            "set <n> | + <player> <category> <counter> | - <player> <category> <counter>\n\
             score <team> <opponent> | score team|opponent <n>\n\
             board | summary | save <path>\n\
             categories: service attack pass reception defense faults"
        }
        WizardStep::Summary => "show [set] | entry | export [xlsx|pdf|all] | save <path> | reset",
    }
}

/// Options for the record command.
#[derive(Debug, Clone, Default)]
pub struct RecordOptions {
    /// One JSON reply per line, and a JSON session report.
    pub json: bool,
    /// Only print rejected commands.
    pub quiet: bool,
    /// Read commands from a file instead of stdin.
    pub script: Option<PathBuf>,
    /// Export directory; `None` uses the configured one.
    pub out_dir: Option<PathBuf>,
    /// Print a prompt before each line.
    pub prompt: bool,
}

/// Output format for the record command.
#[derive(Debug, Clone, Serialize)]
pub struct RecordOutput {
    /// Whether the session ended cleanly.
    pub success: bool,
    /// Commands processed (blank lines and comments excluded).
    pub commands: usize,
    /// Commands rejected.
    pub errors: usize,
    /// Rejections caused by the environment rather than the input.
    pub failures: usize,
    /// Step the wizard ended in.
    pub step: WizardStep,
    /// Error message if the session could not run.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl RecordOutput {
    /// Create a failed output.
    pub fn failure(error: impl Into<String>) -> Self {
        Self {
            success: false,
            commands: 0,
            errors: 0,
            failures: 0,
            step: WizardStep::Setup,
            error: Some(error.into()),
        }
    }
}

/// The record command implementation.
pub struct RecordCommand {
    config: Config,
}

impl RecordCommand {
    /// Create a new record command.
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    /// Run a session on stdin or on the script file.
    pub fn run(&self, options: &RecordOptions) -> RecordOutput {
        let stdout = io::stdout();
        let mut out = stdout.lock();
        match &options.script {
            Some(path) => match File::open(path) {
                Ok(file) => self.run_with(BufReader::new(file), &mut out, options),
                Err(e) => RecordOutput::failure(VolleyError::storage(path, e).to_string()),
            },
            None => self.run_with(io::stdin().lock(), &mut out, options),
        }
    }

    /// Run a session over any reader and writer.
    pub fn run_with<R: BufRead, W: Write>(
        &self,
        input: R,
        out: &mut W,
        options: &RecordOptions,
    ) -> RecordOutput {
        let out_dir = options
            .out_dir
            .clone()
            .unwrap_or_else(|| self.config.export.output_dir.clone());
        let mut session = RecordSession::new(self.config.clone(), out_dir);
        let mut commands = 0;
        let mut errors = 0;
        let mut failures = 0;
        let mut lines = input.lines();

        loop {
            if options.prompt {
                let _ = write!(out, "{}> ", step_label(session.wizard().step()));
                let _ = out.flush();
            }

            let line = match lines.next() {
                Some(Ok(line)) => line,
                Some(Err(e)) => {
                    return RecordOutput {
                        success: false,
                        commands,
                        errors,
                        failures,
                        step: session.wizard().step(),
                        error: Some(e.to_string()),
                    }
                }
                None => break,
            };

            let Some(reply) = session.execute(&line) else {
                continue;
            };
            commands += 1;
            if !reply.ok {
                errors += 1;
            }
            if reply.failure {
                failures += 1;
            }
            if let Err(e) = write_reply(out, &reply, options) {
                tracing::warn!(error = %e, "failed to write reply");
            }
            if reply.quit {
                break;
            }
        }

        if session.has_unsaved_changes() {
            tracing::warn!("session ended with stats that were never saved");
        }

        RecordOutput {
            // Interactive mistakes are answered in place; scripts must be clean.
            success: failures == 0 && (options.script.is_none() || errors == 0),
            commands,
            errors,
            failures,
            step: session.wizard().step(),
            error: None,
        }
    }

    /// Format output based on options.
    pub fn format_output(&self, output: &RecordOutput, options: &RecordOptions) -> String {
        if options.quiet {
            return String::new();
        }

        if options.json {
            return serde_json::to_string_pretty(output).unwrap_or_else(|_| "{}".to_string());
        }

        if let Some(error) = &output.error {
            return format!("Session failed: {}\n", error);
        }
        format!(
            "{} command(s), {} rejected, ended in {}\n",
            output.commands,
            output.errors,
            step_label(output.step)
        )
    }
}

fn write_reply<W: Write>(out: &mut W, reply: &Reply, options: &RecordOptions) -> io::Result<()> {
    if options.json {
        let line = serde_json::to_string(reply).map_err(io::Error::other)?;
        return writeln!(out, "{}", line);
    }
    if reply.ok {
        if !options.quiet {
            writeln!(out, "{}", reply.message)?;
        }
        Ok(())
    } else {
        writeln!(out, "error: {}", reply.message)
    }
}
