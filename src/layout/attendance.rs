use serde::Serialize;

use crate::model::StudentRecord;

use super::{
    BODY_STYLE, CellStyle, FINAL_FILL, Grid, HEADER_STYLE, POSITIVE_FILL, SheetLayout,
    VALUE_STYLE, ZERO_FILL,
};

pub const ATTENDANCE_COLUMN_WIDTHS: [f64; 2] = [25.0, 15.0];

const RATE_STYLE: CellStyle = CellStyle::PLAIN.bold(12.0).fill(FINAL_FILL).bordered();

/// Totals of one student's attendance columns. Only values equal to `1`
/// count as present; every selected column counts as a day.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct AttendanceSummary {
    pub present: usize,
    pub total: usize,
    /// Present days over total days, as a percentage; 0 without days.
    pub rate: f64,
}

impl AttendanceSummary {
    pub fn from_values<'a>(values: impl IntoIterator<Item = &'a f64>) -> Self {
        let mut present = 0;
        let mut total = 0;
        for value in values {
            if *value == 1.0 {
                present += 1;
            }
            total += 1;
        }
        let rate = if total > 0 {
            present as f64 / total as f64 * 100.0
        } else {
            0.0
        };
        Self {
            present,
            total,
            rate,
        }
    }
}

/// Lays out one student's attendance sheet from `(date column, value)` pairs.
pub fn attendance_sheet(
    name: String,
    student: &StudentRecord,
    records: &[(String, f64)],
) -> SheetLayout {
    let mut grid = Grid::default();
    grid.identity_block(student);

    grid.put(0, "Date", HEADER_STYLE.centered());
    grid.put(1, "Attendance", HEADER_STYLE.centered());
    grid.next_row();

    for (date, value) in records {
        grid.put(0, date.as_str(), BODY_STYLE);
        let style = if *value == 1.0 {
            VALUE_STYLE.fill(POSITIVE_FILL)
        } else if *value == 0.0 {
            VALUE_STYLE.fill(ZERO_FILL)
        } else {
            VALUE_STYLE
        };
        grid.put(1, *value, style);
        grid.next_row();
    }
    grid.next_row();

    let summary = AttendanceSummary::from_values(records.iter().map(|(_, value)| value));
    grid.banner(1, "ATTENDANCE SUMMARY", HEADER_STYLE);
    grid.next_row();

    grid.put(0, "Days Present:", BODY_STYLE);
    grid.put(1, summary.present as f64, VALUE_STYLE);
    grid.next_row();

    grid.put(0, "Total Days:", BODY_STYLE);
    grid.put(1, summary.total as f64, VALUE_STYLE);
    grid.next_row();

    grid.put(0, "Attendance Rate:", RATE_STYLE);
    grid.put(1, format!("{:.1}%", summary.rate), RATE_STYLE.centered());

    grid.finish(name, &ATTENDANCE_COLUMN_WIDTHS)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::CellContent;

    fn student() -> StudentRecord {
        StudentRecord {
            row_index: 0,
            id: "17".into(),
            first_name: "Ana".into(),
            last_name: "Lopez".into(),
        }
    }

    #[test]
    fn summary_counts_only_exact_presence() {
        let summary = AttendanceSummary::from_values(&[1.0, 0.0, 0.5, 1.0]);
        assert_eq!(summary.present, 2);
        assert_eq!(summary.total, 4);
        assert!((summary.rate - 50.0).abs() < 1e-9);

        let empty = AttendanceSummary::from_values(&[]);
        assert_eq!(empty.rate, 0.0);
    }

    #[test]
    fn sheet_colors_present_and_absent_days() {
        let records = vec![
            ("09/05/2024".to_string(), 1.0),
            ("09/06/2024".to_string(), 0.0),
            ("09/09/2024".to_string(), 0.5),
        ];
        let sheet = attendance_sheet("Lopez, Ana".into(), &student(), &records);

        let value_at = |row: u32| {
            sheet
                .cells
                .iter()
                .find(|cell| cell.row == row && cell.col == 1)
                .expect("cell")
        };
        assert_eq!(value_at(5).style.fill, Some(POSITIVE_FILL));
        assert_eq!(value_at(6).style.fill, Some(ZERO_FILL));
        assert_eq!(value_at(7).style.fill, None);
        assert_eq!(value_at(7).content, CellContent::Number(0.5));

        let banner = sheet
            .cells
            .iter()
            .find(|cell| cell.content == CellContent::Text("ATTENDANCE SUMMARY".into()))
            .expect("banner");
        assert_eq!((banner.row, banner.merge_through), (9, Some(1)));
        assert_eq!(value_at(10).content, CellContent::Number(1.0));
        assert_eq!(value_at(11).content, CellContent::Number(3.0));
        assert_eq!(value_at(12).content, CellContent::Text("33.3%".into()));
        assert_eq!(sheet.column_widths, vec![25.0, 15.0]);
    }
}
