//! Spreadsheet exporter (`.xlsx`).
//!
//! Workbook layout:
//! - `Set 1` … `Set n`: title, score, then one row of raw counters per player
//! - `Résumé`: set scores, the global table and one breakdown per category

use rust_xlsxwriter::{Format, Workbook, Worksheet, XlsxError};

use crate::core::MatchState;
use crate::error::Result;
use crate::export::layout::{self, Cell, Table};
use crate::export::{writer_error, ExportFormat, Exporter};

const NAME_WIDTH: f64 = 15.0;
const ROLE_WIDTH: f64 = 12.0;
const SET_STAT_WIDTH: f64 = 12.0;
const SUMMARY_STAT_WIDTH: f64 = 15.0;

/// Name of the summary worksheet.
pub const SUMMARY_SHEET: &str = "Résumé";

/// Writes the match as an Excel workbook.
#[derive(Debug)]
pub struct XlsxExporter {
    header: Format,
}

impl XlsxExporter {
    /// Create an exporter with bold header rows.
    pub fn new() -> Self {
        Self {
            header: Format::new().set_bold(),
        }
    }

    fn build(&self, state: &MatchState) -> std::result::Result<Vec<u8>, XlsxError> {
        let mut workbook = Workbook::new();
        let info = &state.match_info;

        for set in state.sets() {
            let sheet = workbook.add_worksheet();
            sheet.set_name(format!("Set {}", set))?;

            let score = state.score(set);
            sheet.write_string(0, 0, format!("Set {} - {} - {}", set, info.team, info.date))?;
            sheet.write_string(1, 0, format!("Score: {} - {}", score.team, score.opponent))?;

            let table = layout::set_sheet(state, set);
            self.write_table(sheet, 3, &table)?;
            set_widths(sheet, table.width(), SET_STAT_WIDTH)?;
        }

        let sheet = workbook.add_worksheet();
        sheet.set_name(SUMMARY_SHEET)?;
        sheet.write_string(0, 0, format!("Résumé - {} - {}", info.team, info.date))?;

        sheet.write_string_with_format(2, 0, "Scores par set", &self.header)?;
        sheet.write_string(3, 0, "Set")?;
        sheet.write_string(4, 0, "Score")?;
        for set in state.sets() {
            let score = state.score(set);
            let col = u16::from(set);
            sheet.write_string(3, col, format!("Set {}", set))?;
            sheet.write_string(4, col, format!("{} - {}", score.team, score.opponent))?;
        }

        let summary = layout::summary_sheet(state);
        let mut row = self.write_table(sheet, 6, &summary)?;

        row += 1;
        sheet.write_string_with_format(row, 0, "Détails par catégorie", &self.header)?;
        row += 2;
        for table in layout::detail_tables(state) {
            row = self.write_table(sheet, row, &table)? + 1;
        }
        set_widths(sheet, summary.width(), SUMMARY_STAT_WIDTH)?;

        workbook.save_to_buffer()
    }

    /// Write a header row and body rows starting at `first_row`.
    ///
    /// Returns the index of the row after the table.
    fn write_table(
        &self,
        sheet: &mut Worksheet,
        first_row: u32,
        table: &Table,
    ) -> std::result::Result<u32, XlsxError> {
        for (col, header) in (0u16..).zip(table.headers.iter()) {
            sheet.write_string_with_format(first_row, col, *header, &self.header)?;
        }

        let mut row = first_row + 1;
        for cells in &table.rows {
            for (col, cell) in (0u16..).zip(cells.iter()) {
                match cell {
                    Cell::Text(text) => sheet.write_string(row, col, text)?,
                    Cell::Number(n) => sheet.write_number(row, col, f64::from(*n))?,
                };
            }
            row += 1;
        }
        Ok(row)
    }
}

impl Default for XlsxExporter {
    fn default() -> Self {
        Self::new()
    }
}

fn set_widths(sheet: &mut Worksheet, columns: usize, stat_width: f64) -> std::result::Result<(), XlsxError> {
    sheet.set_column_width(0, NAME_WIDTH)?;
    sheet.set_column_width(1, ROLE_WIDTH)?;
    for col in (2u16..).take(columns.saturating_sub(2)) {
        sheet.set_column_width(col, stat_width)?;
    }
    Ok(())
}

impl Exporter for XlsxExporter {
    fn format(&self) -> ExportFormat {
        ExportFormat::Xlsx
    }

    fn render(&self, state: &MatchState) -> Result<Vec<u8>> {
        self.build(state)
            .map_err(|e| writer_error("failed to build workbook", e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{MatchInfo, Player, Role, StatKey, MAX_SETS};

    fn state_with_sets(sets: u8) -> MatchState {
        let mut state = MatchState::new(
            vec![
                Player::new("Alice", Role::ReceiverAttacker),
                Player::new("Chloé", Role::Middle),
            ],
            sets,
            MatchInfo::new("Les Aigles", "12/10/2026"),
        )
        .unwrap();
        state.update_counter("Chloé", 1, StatKey::FaultDirect, 2).unwrap();
        state.update_set_score(1, 25, 18).unwrap();
        state
    }

    #[test]
    fn test_render_produces_zip_container() {
        let bytes = XlsxExporter::new().render(&state_with_sets(3)).unwrap();
        assert!(bytes.len() > 100);
        assert_eq!(&bytes[..2], b"PK");
    }

    #[test]
    fn test_render_max_sets() {
        let bytes = XlsxExporter::new()
            .render(&state_with_sets(MAX_SETS))
            .unwrap();
        assert_eq!(&bytes[..2], b"PK");
    }

    #[test]
    fn test_render_does_not_touch_state() {
        let state = state_with_sets(2);
        let before = state.clone();
        XlsxExporter::new().render(&state).unwrap();
        assert_eq!(state, before);
    }

    #[test]
    fn test_format() {
        assert_eq!(XlsxExporter::new().format(), ExportFormat::Xlsx);
    }
}
