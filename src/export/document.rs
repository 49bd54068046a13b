//! Document exporter (`.pdf`, A4 portrait).
//!
//! Page flow:
//! 1. Title, team and date
//! 2. Set scores
//! 3. Global summary table (grid)
//! 4. One striped table per set; every set after the first starts a page
//!
//! Geometry is expressed in millimetres from the top-left corner and
//! converted to PDF points when operations are emitted. Text uses the
//! standard Helvetica fonts, so nothing is embedded.

use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, Stream};

use crate::core::MatchState;
use crate::error::Result;
use crate::export::layout::{self, Table};
use crate::export::{writer_error, ExportFormat, Exporter};

const PAGE_WIDTH: f32 = 210.0;
const PAGE_HEIGHT: f32 = 297.0;
const MARGIN: f32 = 14.0;
const PT_PER_MM: f32 = 72.0 / 25.4;

/// Summary tables ending below this line push the first set to a new page.
const SUMMARY_BREAK_Y: f32 = 200.0;

const CELL_PADDING: f32 = 2.0;
const NAME_COLUMN: f32 = 25.0;
const ROLE_COLUMN: f32 = 15.0;

type Rgb = [u8; 3];

const BLACK: Rgb = [0, 0, 0];
const WHITE: Rgb = [255, 255, 255];
const SUMMARY_HEAD: Rgb = [73, 80, 87];
const SET_HEAD: Rgb = [34, 139, 230];
const FAULT_FILL: Rgb = [255, 235, 235];
const FAULT_TEXT: Rgb = [220, 53, 69];
const STRIPE: Rgb = [245, 245, 245];
const GRID_LINE: Rgb = [200, 200, 200];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Font {
    Regular,
    Bold,
}

impl Font {
    fn resource(&self) -> &'static [u8] {
        match self {
            Font::Regular => b"F1",
            Font::Bold => b"F2",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Theme {
    Grid,
    Striped,
}

struct TableStyle {
    font_size: f32,
    head_fill: Rgb,
    theme: Theme,
    /// Column drawn with the fault colors.
    highlight: usize,
}

// =============================================================================
// Canvas
// =============================================================================

/// Content operations, one list per page.
struct Canvas {
    pages: Vec<Vec<Operation>>,
}

impl Canvas {
    fn new() -> Self {
        Self {
            pages: vec![Vec::new()],
        }
    }

    fn add_page(&mut self) {
        self.pages.push(Vec::new());
    }

    fn ops(&mut self) -> &mut Vec<Operation> {
        if self.pages.is_empty() {
            self.pages.push(Vec::new());
        }
        let last = self.pages.len() - 1;
        &mut self.pages[last]
    }

    /// Draw text with its baseline at `y`.
    fn text(&mut self, x: f32, y: f32, size: f32, font: Font, color: Rgb, text: &str) {
        let ops = self.ops();
        ops.push(Operation::new("BT", vec![]));
        ops.push(Operation::new("rg", color_operands(color)));
        ops.push(Operation::new(
            "Tf",
            vec![Object::Name(font.resource().to_vec()), real(size)],
        ));
        ops.push(Operation::new("Td", vec![real(x * PT_PER_MM), real(flip(y))]));
        ops.push(Operation::new("Tj", vec![Object::string_literal(win_ansi(text))]));
        ops.push(Operation::new("ET", vec![]));
    }

    fn text_centered(&mut self, y: f32, size: f32, font: Font, text: &str) {
        let x = (PAGE_WIDTH - text_width(text, size)) / 2.0;
        self.text(x.max(MARGIN), y, size, font, BLACK, text);
    }

    fn fill_rect(&mut self, x: f32, y: f32, w: f32, h: f32, color: Rgb) {
        let ops = self.ops();
        ops.push(Operation::new("rg", color_operands(color)));
        ops.push(Operation::new("re", rect_operands(x, y, w, h)));
        ops.push(Operation::new("f", vec![]));
    }

    fn stroke_rect(&mut self, x: f32, y: f32, w: f32, h: f32, color: Rgb) {
        let ops = self.ops();
        ops.push(Operation::new("RG", color_operands(color)));
        ops.push(Operation::new("w", vec![real(0.1 * PT_PER_MM)]));
        ops.push(Operation::new("re", rect_operands(x, y, w, h)));
        ops.push(Operation::new("S", vec![]));
    }
}

fn real(value: f32) -> Object {
    Object::Real(value.into())
}

/// Top-down millimetres to bottom-up points.
fn flip(y: f32) -> f32 {
    (PAGE_HEIGHT - y) * PT_PER_MM
}

fn color_operands(color: Rgb) -> Vec<Object> {
    color
        .iter()
        .map(|c| real(f32::from(*c) / 255.0))
        .collect()
}

fn rect_operands(x: f32, y: f32, w: f32, h: f32) -> Vec<Object> {
    vec![
        real(x * PT_PER_MM),
        real(flip(y + h)),
        real(w * PT_PER_MM),
        real(h * PT_PER_MM),
    ]
}

/// Encode text for a WinAnsi font. Characters outside Latin-1 become `?`.
fn win_ansi(text: &str) -> Vec<u8> {
    text.chars()
        .map(|c| match c {
            ' '..='~' | '\u{A0}'..='\u{FF}' => u8::try_from(u32::from(c)).unwrap_or(b'?'),
            _ => b'?',
        })
        .collect()
}

/// Helvetica advance widths for ASCII 32..=126, in 1/1000 em.
const HELVETICA_WIDTHS: [u16; 95] = [
    278, 278, 355, 556, 556, 889, 667, 191, 333, 333, 389, 584, 278, 333, 278, 278, // ' '..'/'
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, // '0'..'9'
    278, 278, 584, 584, 584, 556, 1015, // ':'..'@'
    667, 667, 722, 722, 667, 611, 778, 722, 278, 500, 667, 556, 833, // 'A'..'M'
    722, 778, 667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, // 'N'..'Z'
    278, 278, 278, 469, 556, 333, // '['..'`'
    556, 556, 500, 556, 556, 278, 556, 556, 222, 222, 500, 222, 833, // 'a'..'m'
    556, 556, 556, 556, 333, 500, 278, 556, 500, 722, 500, 500, 500, // 'n'..'z'
    334, 260, 334, 584, // '{'..'~'
];

/// Approximate rendered width in millimetres.
fn text_width(text: &str, size: f32) -> f32 {
    let units: u32 = text
        .chars()
        .map(|c| {
            let code = u32::from(c);
            if (32..=126).contains(&code) {
                usize::try_from(code - 32)
                    .ok()
                    .and_then(|i| HELVETICA_WIDTHS.get(i))
                    .map_or(556, |w| u32::from(*w))
            } else {
                556
            }
        })
        .sum();
    units as f32 / 1000.0 * size / PT_PER_MM
}

/// Cut text so it fits in `max_width` millimetres.
fn fit(text: &str, size: f32, max_width: f32) -> String {
    let mut out = String::new();
    for c in text.chars() {
        out.push(c);
        if text_width(&out, size) > max_width {
            out.pop();
            break;
        }
    }
    out
}

// =============================================================================
// Tables
// =============================================================================

fn column_widths(columns: usize) -> Vec<f32> {
    let rest = columns.saturating_sub(2).max(1);
    let available = PAGE_WIDTH - 2.0 * MARGIN - NAME_COLUMN - ROLE_COLUMN;
    let stat = available / rest as f32;
    (0..columns)
        .map(|i| match i {
            0 => NAME_COLUMN,
            1 => ROLE_COLUMN,
            _ => stat,
        })
        .collect()
}

fn line_height(size: f32) -> f32 {
    size * 1.15 / PT_PER_MM
}

/// Cell origin and width: `(x, y, width)`.
type CellBox = (f32, f32, f32);

fn draw_cell_text(
    canvas: &mut Canvas,
    (x, y, width): CellBox,
    lines: &[&str],
    style: &TableStyle,
    font: Font,
    color: Rgb,
) {
    let line_h = line_height(style.font_size);
    let ascent = style.font_size * 0.8 / PT_PER_MM;
    for (i, line) in lines.iter().enumerate() {
        let text = fit(line, style.font_size, width - 2.0 * CELL_PADDING);
        let baseline = y + CELL_PADDING + ascent + line_h * i as f32;
        canvas.text(x + CELL_PADDING, baseline, style.font_size, font, color, &text);
    }
}

fn draw_header(canvas: &mut Canvas, table: &Table, widths: &[f32], style: &TableStyle, y: f32) -> f32 {
    let lines = table
        .headers
        .iter()
        .map(|h| h.lines().count())
        .max()
        .unwrap_or(1);
    let height = lines as f32 * line_height(style.font_size) + 2.0 * CELL_PADDING;
    let total: f32 = widths.iter().sum();

    canvas.fill_rect(MARGIN, y, total, height, style.head_fill);
    let mut x = MARGIN;
    for (header, width) in table.headers.iter().zip(widths) {
        let parts: Vec<&str> = header.lines().collect();
        if style.theme == Theme::Grid {
            canvas.stroke_rect(x, y, *width, height, GRID_LINE);
        }
        draw_cell_text(canvas, (x, y, *width), &parts, style, Font::Bold, WHITE);
        x += width;
    }
    y + height
}

/// Draw a table starting at `y`; returns the y below its last row.
///
/// Rows that would cross the bottom margin continue on a new page, which
/// repeats the header.
fn draw_table(canvas: &mut Canvas, table: &Table, style: &TableStyle, y: f32) -> f32 {
    let widths = column_widths(table.width());
    let row_height = line_height(style.font_size) + 2.0 * CELL_PADDING;
    let bottom = PAGE_HEIGHT - MARGIN;

    let mut y = draw_header(canvas, table, &widths, style, y);
    for (index, row) in table.rows.iter().enumerate() {
        if y + row_height > bottom {
            canvas.add_page();
            y = draw_header(canvas, table, &widths, style, MARGIN);
        }

        let mut x = MARGIN;
        for (col, (cell, width)) in row.iter().zip(&widths).enumerate() {
            let highlighted = col == style.highlight;
            let fill = if highlighted {
                Some(FAULT_FILL)
            } else if style.theme == Theme::Striped && index % 2 == 1 {
                Some(STRIPE)
            } else {
                None
            };
            if let Some(color) = fill {
                canvas.fill_rect(x, y, *width, row_height, color);
            }
            if style.theme == Theme::Grid {
                canvas.stroke_rect(x, y, *width, row_height, GRID_LINE);
            }

            let color = if highlighted { FAULT_TEXT } else { BLACK };
            let text = cell.display();
            draw_cell_text(
                canvas,
                (x, y, *width),
                &[text.as_str()],
                style,
                Font::Regular,
                color,
            );
            x += width;
        }
        y += row_height;
    }
    y
}

// =============================================================================
// Exporter
// =============================================================================

/// Writes the match as a PDF report.
#[derive(Debug, Default)]
pub struct PdfExporter;

impl PdfExporter {
    /// Create the exporter.
    pub fn new() -> Self {
        Self
    }

    fn draw(&self, state: &MatchState) -> Canvas {
        let mut canvas = Canvas::new();
        let info = &state.match_info;

        canvas.text_centered(15.0, 18.0, Font::Bold, "Statistiques de Match - Volleyball");
        canvas.text(MARGIN, 25.0, 11.0, Font::Regular, BLACK, &format!("Équipe: {}", info.team));
        canvas.text(MARGIN, 31.0, 11.0, Font::Regular, BLACK, &format!("Date: {}", info.date));

        let mut y = 40.0;
        canvas.text(MARGIN, y, 12.0, Font::Bold, BLACK, "Scores par set");
        y += 7.0;
        for set in state.sets() {
            let score = state.score(set);
            let line = format!("Set {}: {} - {}", set, score.team, score.opponent);
            canvas.text(MARGIN, y, 10.0, Font::Regular, BLACK, &line);
            y += 6.0;
        }

        y += 5.0;
        canvas.text(MARGIN, y, 12.0, Font::Bold, BLACK, "Résumé global");
        y += 5.0;

        let summary_style = TableStyle {
            font_size: 7.0,
            head_fill: SUMMARY_HEAD,
            theme: Theme::Grid,
            highlight: 12,
        };
        let mut y = draw_table(&mut canvas, &layout::summary_document(state), &summary_style, y);

        let set_style = TableStyle {
            font_size: 8.0,
            head_fill: SET_HEAD,
            theme: Theme::Striped,
            highlight: 10,
        };
        for set in state.sets() {
            if set > 1 || y > SUMMARY_BREAK_Y {
                canvas.add_page();
                y = 20.0;
            } else {
                y += 10.0;
            }

            let score = state.score(set);
            let heading = format!("Set {} - Score: {} - {}", set, score.team, score.opponent);
            canvas.text(MARGIN, y, 12.0, Font::Bold, BLACK, &heading);
            y += 5.0;
            y = draw_table(&mut canvas, &layout::set_document(state, set), &set_style, y);
        }

        canvas
    }

    fn assemble(&self, state: &MatchState, canvas: Canvas) -> Result<Vec<u8>> {
        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();

        let regular_id = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Helvetica",
            "Encoding" => "WinAnsiEncoding",
        });
        let bold_id = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Helvetica-Bold",
            "Encoding" => "WinAnsiEncoding",
        });
        let resources_id = doc.add_object(dictionary! {
            "Font" => dictionary! {
                "F1" => regular_id,
                "F2" => bold_id,
            },
        });

        let mut kids: Vec<Object> = Vec::new();
        for operations in canvas.pages {
            let content = Content { operations };
            let data = content
                .encode()
                .map_err(|e| writer_error("failed to encode page content", e))?;
            let content_id = doc.add_object(Stream::new(dictionary! {}, data));
            let page_id = doc.add_object(dictionary! {
                "Type" => "Page",
                "Parent" => pages_id,
                "Contents" => content_id,
            });
            kids.push(page_id.into());
        }

        let count = i64::try_from(kids.len()).unwrap_or(i64::MAX);
        let pages = dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => Object::Integer(count),
            "Resources" => resources_id,
            "MediaBox" => vec![
                Object::Integer(0),
                Object::Integer(0),
                real(PAGE_WIDTH * PT_PER_MM),
                real(PAGE_HEIGHT * PT_PER_MM),
            ],
        };
        doc.objects.insert(pages_id, Object::Dictionary(pages));

        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        let info_id = doc.add_object(dictionary! {
            "Title" => Object::string_literal(win_ansi(&format!(
                "Volley Stats - {} - {}",
                state.match_info.team, state.match_info.date
            ))),
            "Producer" => Object::string_literal(concat!("volley-stats ", env!("CARGO_PKG_VERSION"))),
        });
        doc.trailer.set("Root", catalog_id);
        doc.trailer.set("Info", info_id);
        doc.compress();

        let mut buffer = Vec::new();
        doc.save_to(&mut buffer)
            .map_err(|e| writer_error("failed to write document", e))?;
        Ok(buffer)
    }

    /// Number of pages the match renders to.
    pub fn page_count(&self, state: &MatchState) -> usize {
        self.draw(state).pages.len()
    }
}

impl Exporter for PdfExporter {
    fn format(&self) -> ExportFormat {
        ExportFormat::Pdf
    }

    fn render(&self, state: &MatchState) -> Result<Vec<u8>> {
        let canvas = self.draw(state);
        let pages = canvas.pages.len();
        let bytes = self.assemble(state, canvas)?;
        tracing::debug!(pages, bytes = bytes.len(), "document rendered");
        Ok(bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{MatchInfo, Player, Role, MAX_SETS};

    fn state(players: usize, sets: u8) -> MatchState {
        let roster = (0..players)
            .map(|i| Player::new(format!("Joueuse {}", i + 1), Role::ALL[i % Role::ALL.len()]))
            .collect();
        MatchState::new(roster, sets, MatchInfo::new("Les Aigles", "12/10/2026")).unwrap()
    }

    #[test]
    fn test_render_produces_pdf() {
        let bytes = PdfExporter::new().render(&state(6, 3)).unwrap();
        assert!(bytes.starts_with(b"%PDF-1.5"));
        let tail = String::from_utf8_lossy(&bytes[bytes.len().saturating_sub(32)..]).to_string();
        assert!(tail.contains("%%EOF"));
    }

    #[test]
    fn test_one_page_per_later_set() {
        // Small roster: set 1 shares the first page with the summary
        assert_eq!(PdfExporter::new().page_count(&state(4, 3)), 3);
        assert_eq!(PdfExporter::new().page_count(&state(4, 1)), 1);
    }

    #[test]
    fn test_long_summary_pushes_first_set() {
        // The summary table ends below the break line
        let pages = PdfExporter::new().page_count(&state(20, 2));
        assert_eq!(pages, 3);
    }

    #[test]
    fn test_overflowing_table_continues() {
        let pages = PdfExporter::new().page_count(&state(80, 1));
        assert!(pages > 2, "got {} pages", pages);
    }

    #[test]
    fn test_max_sets_renders() {
        let bytes = PdfExporter::new().render(&state(12, MAX_SETS)).unwrap();
        assert!(bytes.starts_with(b"%PDF"));
    }

    #[test]
    fn test_win_ansi_encoding() {
        assert_eq!(win_ansi("Équipe"), vec![0xC9, b'q', b'u', b'i', b'p', b'e']);
        assert_eq!(win_ansi("Zoë ✓"), vec![b'Z', b'o', 0xEB, b' ', b'?']);
    }

    #[test]
    fn test_fit_truncates_to_width() {
        let long = "Une joueuse au nom vraiment très long";
        let cut = fit(long, 7.0, 21.0);
        assert!(cut.len() < long.len());
        assert!(text_width(&cut, 7.0) <= 21.0);
        assert_eq!(fit("Alice", 7.0, 21.0), "Alice");
    }

    #[test]
    fn test_column_widths_fill_page() {
        let widths = column_widths(13);
        let total: f32 = widths.iter().sum();
        assert!((total - (PAGE_WIDTH - 2.0 * MARGIN)).abs() < 0.01);
        assert_eq!(widths[0], NAME_COLUMN);
    }
}
