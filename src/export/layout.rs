//! Table layouts shared by the exporters.
//!
//! Each function projects the match into a header row and body rows. The
//! writers only decide how cells look; what goes in them is decided here.

use crate::core::{Category, MatchState, Player, StatRecord};
use crate::stats::{lead_percentage, player_totals, set_faults, set_record, total_faults};

/// One table cell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Cell {
    Text(String),
    Number(u32),
}

impl Cell {
    /// Cell content as displayed text.
    pub fn display(&self) -> String {
        match self {
            Cell::Text(s) => s.clone(),
            Cell::Number(n) => n.to_string(),
        }
    }
}

impl From<&str> for Cell {
    fn from(s: &str) -> Self {
        Cell::Text(s.to_string())
    }
}

impl From<u32> for Cell {
    fn from(n: u32) -> Self {
        Cell::Number(n)
    }
}

/// Header row and body rows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Table {
    pub headers: Vec<&'static str>,
    pub rows: Vec<Vec<Cell>>,
}

impl Table {
    fn new(headers: &[&'static str]) -> Self {
        Self {
            headers: headers.to_vec(),
            rows: Vec::new(),
        }
    }

    /// Number of columns.
    pub fn width(&self) -> usize {
        self.headers.len()
    }
}

// =============================================================================
// Spreadsheet
// =============================================================================

/// Header of a per-set sheet.
pub const SET_SHEET_HEADERS: [&str; 19] = [
    "Joueur",
    "Rôle",
    "Service Ace",
    "Service Diff.",
    "Service Passé",
    "Service Raté",
    "Attaque Marqué",
    "Attaque Placé",
    "Attaque Raté",
    "Passe Bonne",
    "Passe Moyen",
    "Passe Mauvaise",
    "Récep. Passeur",
    "Récep. 3m",
    "Récep. Mauvais",
    "Déf. Bonne",
    "Déf. Moyen",
    "Déf. Mauvaise",
    "Fautes Directes",
];

/// Header of the global table on the summary sheet.
pub const SUMMARY_SHEET_HEADERS: [&str; 13] = [
    "Joueur",
    "Rôle",
    "Service Total",
    "Service % Ace",
    "Attaque Total",
    "Attaque % Marqué",
    "Passe Total",
    "Passe % Bonne",
    "Réception Total",
    "Réception % Passeur",
    "Défense Total",
    "Défense % Bonne",
    "Total Fautes",
];

const DETAIL_HEADERS: [&[&str]; 6] = [
    &["Joueur", "Rôle", "Service Ace", "Service Diff.", "Service Passé", "Service Raté"],
    &["Joueur", "Rôle", "Attaque Marqué", "Attaque Placé", "Attaque Raté"],
    &["Joueur", "Rôle", "Passe Bonne", "Passe Moyen", "Passe Mauvaise"],
    &["Joueur", "Rôle", "Récep. Passeur", "Récep. 3m", "Récep. Mauvais"],
    &["Joueur", "Rôle", "Déf. Bonne", "Déf. Moyen", "Déf. Mauvaise"],
    &["Joueur", "Rôle", "Fautes Directes", "Services Ratés", "Attaques Ratées", "Total Fautes"],
];

/// Categories reported as total plus lead percentage, in column order.
const REPORTED: [Category; 5] = [
    Category::Service,
    Category::Attack,
    Category::Pass,
    Category::Reception,
    Category::Defense,
];

fn player_cells(player: &Player) -> Vec<Cell> {
    vec![Cell::from(player.name.as_str()), Cell::from(player.role.label())]
}

fn counter_cells(record: &StatRecord, category: Category) -> impl Iterator<Item = Cell> + '_ {
    record
        .tally(category)
        .counters()
        .into_iter()
        .map(|(_, value)| Cell::Number(value))
}

/// Rows of the sheet for one set: raw counters and the set's fault count.
pub fn set_sheet(state: &MatchState, set: u8) -> Table {
    let mut table = Table::new(&SET_SHEET_HEADERS);
    for player in &state.players {
        let record = set_record(state, &player.name, set);
        let mut row = player_cells(player);
        for category in REPORTED {
            row.extend(counter_cells(&record, category));
        }
        row.push(Cell::Number(set_faults(&record)));
        table.rows.push(row);
    }
    table
}

/// Global table of the summary sheet: totals and percentages as numbers.
pub fn summary_sheet(state: &MatchState) -> Table {
    let mut table = Table::new(&SUMMARY_SHEET_HEADERS);
    for player in &state.players {
        let totals = player_totals(state, &player.name);
        let mut row = player_cells(player);
        for category in REPORTED {
            row.push(Cell::Number(totals.tally(category).total()));
            row.push(Cell::Number(lead_percentage(&totals, category).value()));
        }
        row.push(Cell::Number(total_faults(state, &player.name)));
        table.rows.push(row);
    }
    table
}

/// Per-category breakdown tables of the summary sheet.
pub fn detail_tables(state: &MatchState) -> Vec<Table> {
    let totals: Vec<(&Player, StatRecord)> = state
        .players
        .iter()
        .map(|p| (p, player_totals(state, &p.name)))
        .collect();

    let mut tables: Vec<Table> = REPORTED
        .iter()
        .zip(DETAIL_HEADERS.iter())
        .map(|(category, headers)| {
            let mut table = Table::new(headers);
            for (player, record) in &totals {
                let mut row = player_cells(player);
                row.extend(counter_cells(record, *category));
                table.rows.push(row);
            }
            table
        })
        .collect();

    let mut faults = Table::new(DETAIL_HEADERS[5]);
    for (player, record) in &totals {
        let mut row = player_cells(player);
        row.push(Cell::Number(record.faults.direct));
        row.push(Cell::Number(record.service.missed));
        row.push(Cell::Number(record.attack.missed));
        row.push(Cell::Number(total_faults(state, &player.name)));
        faults.rows.push(row);
    }
    tables.push(faults);
    tables
}

// =============================================================================
// Document
// =============================================================================

/// Header of the global summary table in the document.
pub const SUMMARY_DOC_HEADERS: [&str; 13] = [
    "Joueur",
    "Rôle",
    "Serv.\nTotal",
    "Serv.\n% Ace",
    "Att.\nTotal",
    "Att.\n% Marq.",
    "Pass.\nTotal",
    "Pass.\n% Bon",
    "Récep.\nTotal",
    "Récep.\n% Pass.",
    "Déf.\nTotal",
    "Déf.\n% Bon",
    "Fautes\nTotales",
];

/// Header of a per-set table in the document.
pub const SET_DOC_HEADERS: [&str; 11] = [
    "Joueur",
    "Rôle",
    "Serv.\nAce",
    "Serv.\nDiff.",
    "Serv.\nRaté",
    "Att.\nMarq.",
    "Att.\nRaté",
    "Pass.\nBon",
    "Récep.\nPass.",
    "Déf.\nBon",
    "Fautes",
];

/// Global summary table with percentages rendered as `NN%` text.
pub fn summary_document(state: &MatchState) -> Table {
    let mut table = Table::new(&SUMMARY_DOC_HEADERS);
    for player in &state.players {
        let totals = player_totals(state, &player.name);
        let mut row = player_cells(player);
        for category in REPORTED {
            row.push(Cell::Number(totals.tally(category).total()));
            row.push(Cell::Text(lead_percentage(&totals, category).to_string()));
        }
        row.push(Cell::Number(total_faults(state, &player.name)));
        table.rows.push(row);
    }
    table
}

/// Condensed per-set table of the document.
pub fn set_document(state: &MatchState, set: u8) -> Table {
    let mut table = Table::new(&SET_DOC_HEADERS);
    for player in &state.players {
        let s = set_record(state, &player.name, set);
        let mut row = player_cells(player);
        row.extend(
            [
                s.service.ace,
                s.service.difficult,
                s.service.missed,
                s.attack.scored,
                s.attack.missed,
                s.pass.good,
                s.reception.setter,
                s.defense.good,
                set_faults(&s),
            ]
            .into_iter()
            .map(Cell::Number),
        );
        table.rows.push(row);
    }
    table
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{AttackCounter, MatchInfo, Role, ServiceCounter, StatKey};

    fn alice_match() -> MatchState {
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
        state
            .update_counter("Alice", 2, StatKey::Attack(AttackCounter::Missed), 1)
            .unwrap();
        state
            .update_counter("Alice", 3, StatKey::FaultDirect, 1)
            .unwrap();
        state
    }

    #[test]
    fn test_set_sheet_row() {
        let table = set_sheet(&alice_match(), 1);
        assert_eq!(table.width(), 19);
        assert_eq!(table.rows.len(), 2);

        let alice = &table.rows[0];
        assert_eq!(alice.len(), 19);
        assert_eq!(alice[0], Cell::from("Alice"));
        assert_eq!(alice[1], Cell::from("R4"));
        assert_eq!(alice[2], Cell::Number(2)); // ace
        assert_eq!(alice[5], Cell::Number(1)); // service missed
        assert_eq!(alice[18], Cell::Number(1)); // set faults

        assert_eq!(table.rows[1][1], Cell::from("Libéro"));
    }

    #[test]
    fn test_summary_sheet_row() {
        let table = summary_sheet(&alice_match());
        let alice = &table.rows[0];
        assert_eq!(alice.len(), 13);
        assert_eq!(alice[2], Cell::Number(3)); // service total
        assert_eq!(alice[3], Cell::Number(67)); // % ace
        assert_eq!(alice[4], Cell::Number(4)); // attack total
        assert_eq!(alice[5], Cell::Number(75));
        assert_eq!(alice[12], Cell::Number(3));
    }

    #[test]
    fn test_detail_tables() {
        let tables = detail_tables(&alice_match());
        assert_eq!(tables.len(), 6);
        assert_eq!(tables[0].headers[2], "Service Ace");
        assert_eq!(tables[0].rows[0].len(), 6);
        assert_eq!(tables[3].headers[3], "Récep. 3m");

        let faults = &tables[5];
        assert_eq!(faults.headers.last(), Some(&"Total Fautes"));
        assert_eq!(
            faults.rows[0][2..],
            [
                Cell::Number(1),
                Cell::Number(1),
                Cell::Number(1),
                Cell::Number(3)
            ]
        );
    }

    #[test]
    fn test_summary_document_formats_percentages() {
        let table = summary_document(&alice_match());
        assert_eq!(table.rows[0][3], Cell::Text("67%".to_string()));
        assert_eq!(table.rows[1][3], Cell::Text("0%".to_string()));
    }

    #[test]
    fn test_set_document_row() {
        let table = set_document(&alice_match(), 2);
        assert_eq!(table.width(), 11);
        let alice = &table.rows[0];
        assert_eq!(alice.len(), 11);
        assert_eq!(alice[5], Cell::Number(3)); // attack scored
        assert_eq!(alice[6], Cell::Number(1)); // attack missed
        assert_eq!(alice[10], Cell::Number(1));
    }
}
