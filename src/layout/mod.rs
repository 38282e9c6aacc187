//! Format-agnostic description of report sheets.
//!
//! The layout functions emit ordered [`CellInstruction`]s; the writer in
//! [`crate::io::excel_write`] turns them into worksheet calls. Rows and
//! columns are zero-based.

pub mod attendance;
pub mod grades;

use serde::Serialize;

use crate::model::{StudentRecord, format_number};

pub use attendance::{AttendanceSummary, attendance_sheet};
pub use grades::{LayoutOptions, grade_sheet};

pub const HEADER_FILL: u32 = 0x4472C4;
pub const CATEGORY_FILL: u32 = 0xB4C6E7;
pub const WEIGHT_FILL: u32 = 0xFCE4D6;
pub const FINAL_FILL: u32 = 0x70AD47;
pub const POSITIVE_FILL: u32 = 0xC6EFCE;
pub const ZERO_FILL: u32 = 0xFFC7CE;
pub const EXCUSED_FILL: u32 = 0xFFEB9C;
pub const WHITE: u32 = 0xFFFFFF;

/// Value written into a cell.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", content = "value")]
pub enum CellContent {
    Text(String),
    Number(f64),
    /// Styled cell without a value (borders and fills only).
    Blank,
}

impl From<&str> for CellContent {
    fn from(value: &str) -> Self {
        CellContent::Text(value.to_string())
    }
}

impl From<String> for CellContent {
    fn from(value: String) -> Self {
        CellContent::Text(value)
    }
}

impl From<f64> for CellContent {
    fn from(value: f64) -> Self {
        CellContent::Number(value)
    }
}

/// Visual style of a cell. Colors are `0xRRGGBB`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct CellStyle {
    pub bold: bool,
    pub font_size: Option<f64>,
    pub font_color: Option<u32>,
    pub fill: Option<u32>,
    pub border: bool,
    pub centered: bool,
}

impl CellStyle {
    pub const PLAIN: CellStyle = CellStyle {
        bold: false,
        font_size: None,
        font_color: None,
        fill: None,
        border: false,
        centered: false,
    };

    pub const fn bold(mut self, size: f64) -> Self {
        self.bold = true;
        self.font_size = Some(size);
        self
    }

    pub const fn font_color(mut self, color: u32) -> Self {
        self.font_color = Some(color);
        self
    }

    pub const fn fill(mut self, color: u32) -> Self {
        self.fill = Some(color);
        self
    }

    pub const fn bordered(mut self) -> Self {
        self.border = true;
        self
    }

    pub const fn centered(mut self) -> Self {
        self.centered = true;
        self
    }
}

/// White bold text on the blue header fill.
pub const HEADER_STYLE: CellStyle = CellStyle::PLAIN
    .bold(12.0)
    .font_color(WHITE)
    .fill(HEADER_FILL)
    .bordered();

pub const LABEL_STYLE: CellStyle = CellStyle::PLAIN.bold(12.0);

pub const BODY_STYLE: CellStyle = CellStyle::PLAIN.bordered();

pub const VALUE_STYLE: CellStyle = CellStyle::PLAIN.bordered().centered();

/// One styled cell write. `merge_through` spans the cell to that column on
/// the same row.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CellInstruction {
    pub row: u32,
    pub col: u16,
    pub content: CellContent,
    pub style: CellStyle,
    pub merge_through: Option<u16>,
}

/// Everything needed to render one student's sheet.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SheetLayout {
    pub name: String,
    /// Width of each column starting at column 0.
    pub column_widths: Vec<f64>,
    pub cells: Vec<CellInstruction>,
}

/// Ordered sheets of one report.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ReportWorkbook {
    pub sheets: Vec<SheetLayout>,
}

/// Cursor that appends instructions row by row.
#[derive(Debug, Default)]
pub(crate) struct Grid {
    cells: Vec<CellInstruction>,
    row: u32,
}

impl Grid {
    pub(crate) fn put(&mut self, col: u16, content: impl Into<CellContent>, style: CellStyle) {
        self.cells.push(CellInstruction {
            row: self.row,
            col,
            content: content.into(),
            style,
            merge_through: None,
        });
    }

    /// Writes a banner spanning columns `0..=last_col` of the current row.
    pub(crate) fn banner(&mut self, last_col: u16, text: impl Into<CellContent>, style: CellStyle) {
        self.cells.push(CellInstruction {
            row: self.row,
            col: 0,
            content: text.into(),
            style,
            merge_through: Some(last_col),
        });
    }

    pub(crate) fn next_row(&mut self) {
        self.row += 1;
    }

    /// Writes the ID / First Name / Last Name block followed by a blank row.
    pub(crate) fn identity_block(&mut self, student: &StudentRecord) {
        for (label, value) in [
            ("ID:", &student.id),
            ("First Name:", &student.first_name),
            ("Last Name:", &student.last_name),
        ] {
            self.put(0, label, LABEL_STYLE);
            self.put(1, value.as_str(), LABEL_STYLE);
            self.next_row();
        }
        self.next_row();
    }

    pub(crate) fn finish(self, name: String, column_widths: &[f64]) -> SheetLayout {
        SheetLayout {
            name,
            column_widths: column_widths.to_vec(),
            cells: self.cells,
        }
    }
}

/// Rounds half away from zero to two decimals.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Renders a percentage rounded to two decimals without padding zeros, e.g.
/// `45.0%`, `45.5%` or `66.67%`. Whole values keep one decimal.
pub fn format_percent(value: f64) -> String {
    let rounded = round2(value);
    if rounded == rounded.trunc() {
        format!("{rounded:.1}%")
    } else {
        format!("{rounded}%")
    }
}

/// Renders a configured weight, e.g. `25%` or `12.5%`.
pub fn format_weight(value: f64) -> String {
    format!("{}%", format_number(value))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn percent_and_weight_formatting() {
        assert_eq!(format_percent(45.0), "45.0%");
        assert_eq!(format_percent(45.5), "45.5%");
        assert_eq!(format_percent(200.0 / 3.0), "66.67%");
        assert_eq!(format_percent(99.999), "100.0%");
        assert_eq!(format_percent(0.0), "0.0%");
        assert_eq!(format_weight(25.0), "25%");
        assert_eq!(format_weight(12.5), "12.5%");
        assert_eq!(round2(33.335_1), 33.34);
    }

    #[test]
    fn header_style_is_white_on_blue() {
        assert!(HEADER_STYLE.bold);
        assert_eq!(HEADER_STYLE.font_color, Some(WHITE));
        assert_eq!(HEADER_STYLE.fill, Some(HEADER_FILL));
        assert!(!HEADER_STYLE.centered);
    }
}
